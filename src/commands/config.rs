use std::path::Path;

use anyhow::Result;
use emu_controller::ControllerConfig;

pub fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    ControllerConfig::default().save(path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

pub fn show(config: &ControllerConfig) -> Result<()> {
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
