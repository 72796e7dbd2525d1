use anyhow::Result;

use ember_engine::device::{BootstrapConfig, SmokeTestConfig};
use ember_engine::logging::{LoggingConfig, init_logging};
use ember_engine::window::{Runtime, WindowConfig};

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let report = Runtime::run(
        WindowConfig::default(),
        BootstrapConfig::default(),
        SmokeTestConfig::default(),
    )?;

    println!();
    println!("  GPU pipeline alive");
    println!("  markers recorded : {}", report.markers);
    println!("  buffers submitted: {}", report.submissions);
    println!("  device polls     : {} ({} failed)", report.polls, report.poll_errors);
    println!();

    log::info!("probe complete");
    Ok(())
}
