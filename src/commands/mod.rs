//! Command handlers for the CLI application.
//!
//! - `run`: live simulation
//! - `inspect`: descriptor dump and scripted scenario
//! - `config`: config file management

pub mod config;
pub mod inspect;
pub mod run;

/// Lowercase hex, space separated
pub fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}
