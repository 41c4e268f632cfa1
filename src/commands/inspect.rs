use anyhow::Result;
use emu_controller::{run_scenario, ControllerConfig, EmuController};

use super::hex;

pub fn descriptor(config: &ControllerConfig, json: bool) -> Result<()> {
    let controller = EmuController::new(config)?;
    let desc = controller.describe()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&desc)?);
        return Ok(());
    }

    println!("HID descriptor:    {}", hex(&desc.hid_descriptor));
    println!(
        "Attributes:        VID {:04x}  PID {:04x}  version {:04x}",
        desc.vendor_id, desc.product_id, desc.version
    );
    println!("Manufacturer:      {}", desc.manufacturer);
    println!("Product:           {}", desc.product);
    println!("Serial number:     {}", desc.serial_number);
    println!("Report descriptor ({} bytes):", desc.report_descriptor.len());
    for chunk in desc.report_descriptor.chunks(16) {
        println!("  {}", hex(chunk));
    }
    Ok(())
}

pub fn scenario(config: &ControllerConfig, json: bool) -> Result<()> {
    let controller = EmuController::new(config)?;
    let steps = run_scenario(&controller);

    if json {
        println!("{}", serde_json::to_string_pretty(&steps)?);
        return Ok(());
    }

    for (i, step) in steps.iter().enumerate() {
        let status = match step.status {
            Some(s) => format!("0x{s:08X}"),
            None => "-".to_string(),
        };
        println!(
            "{:>2}. {:<28} {:<10} status {:<10} bytes {:<4} queued {}",
            i + 1,
            step.step,
            format!("{:?}", step.state),
            status,
            step.bytes,
            step.pending_reads
        );
        if !step.output.is_empty() {
            println!("      {}", hex(&step.output));
        }
    }
    Ok(())
}
