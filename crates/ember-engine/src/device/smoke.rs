//! One-shot command submission proving the encoder → queue path works.

use super::context::GpuContext;
use super::driver::GpuDriver;
use super::error::BootstrapError;

/// Debug markers recorded into the smoke-test command buffer.
pub const DEBUG_MARKERS: [&str; 2] = ["Do one thing", "Do another thing"];

#[derive(Debug, Clone)]
pub struct SmokeTestConfig {
    /// How many times the device is polled after submission.
    ///
    /// Destroying the device right after a submit, without letting the backend
    /// process it, is a use-after-submit hazard on every backend.
    pub poll_iterations: u32,
    /// Label of the encoder, inherited by the command buffer it produces.
    pub encoder_label: String,
}

impl Default for SmokeTestConfig {
    fn default() -> Self {
        Self {
            poll_iterations: 5,
            encoder_label: "ember smoke encoder".to_string(),
        }
    }
}

/// What the smoke test did.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SmokeTestReport {
    pub markers: usize,
    pub submissions: usize,
    pub polls: u32,
    /// Polls that returned an error.
    pub poll_errors: u32,
}

/// Records, submits and flushes one trivial command buffer.
pub fn run_smoke_test<D: GpuDriver, W>(
    driver: &D,
    ctx: &GpuContext<D, W>,
    config: &SmokeTestConfig,
) -> Result<SmokeTestReport, BootstrapError> {
    let (Some(device), Some(queue)) = (ctx.device(), ctx.queue()) else {
        return Err(BootstrapError::ResourceUnavailable("bootstrapped device"));
    };

    let mut encoder = driver.create_command_encoder(device, &config.encoder_label);
    for marker in DEBUG_MARKERS {
        driver.insert_debug_marker(&mut encoder, marker);
    }
    let commands = driver.finish(encoder);

    log::info!("submitting command...");
    driver.submit(queue, commands);
    log::info!("command submitted");

    let mut poll_errors = 0;
    for _ in 0..config.poll_iterations {
        log::debug!("polling device...");
        if let Err(e) = driver.poll(device) {
            log::warn!("device poll failed: {e}");
            poll_errors += 1;
        }
    }

    Ok(SmokeTestReport {
        markers: DEBUG_MARKERS.len(),
        submissions: 1,
        polls: config.poll_iterations,
        poll_errors,
    })
}
