//! Virtual HID game controller
//!
//! Glue between configuration, the dispatch engine in `emucontroller-core`
//! and the gamepad personality in `emucontroller-gamepad`.

pub mod config;
pub mod controller;
pub mod scenario;
pub mod simulator;

pub use config::{ConfigError, ControllerConfig};
pub use controller::{build_device, DeviceDescription, EmuController};
pub use scenario::{run_scenario, ScenarioStep};
pub use simulator::{SimulationOptions, SimulationStats};
