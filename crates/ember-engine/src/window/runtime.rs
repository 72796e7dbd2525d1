use anyhow::{Context, Result};

use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::device::{
    BootstrapConfig, BootstrapError, Bootstrapper, GpuContext, SCREEN_HEIGHT, SCREEN_WIDTH,
    SmokeTestConfig, SmokeTestReport, WgpuDriver, run_smoke_test,
};

/// Window configuration.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub size: PhysicalSize<u32>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Learn WebGPU".to_string(),
            size: PhysicalSize::new(SCREEN_WIDTH, SCREEN_HEIGHT),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window, bootstraps the GPU context, runs the smoke test, tears
    /// everything down and returns once the event loop has exited.
    pub fn run(
        window: WindowConfig,
        gpu: BootstrapConfig,
        smoke: SmokeTestConfig,
    ) -> Result<SmokeTestReport> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let mut state = ProbeState {
            window,
            gpu,
            smoke,
            outcome: None,
        };

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        let outcome = state
            .outcome
            .context("event loop exited before a window was created")?;

        outcome.context("GPU probe failed")
    }
}

struct ProbeState {
    window: WindowConfig,
    gpu: BootstrapConfig,
    smoke: SmokeTestConfig,
    outcome: Option<std::result::Result<SmokeTestReport, BootstrapError>>,
}

impl ProbeState {
    fn create_window(&self, event_loop: &ActiveEventLoop) -> std::result::Result<Window, BootstrapError> {
        let attrs = Window::default_attributes()
            .with_title(self.window.title.clone())
            .with_inner_size(self.window.size)
            .with_resizable(false);

        event_loop.create_window(attrs).map_err(|e| {
            log::error!("window could not be created: {e}");
            BootstrapError::Allocation { what: "window" }
        })
    }

    fn probe(&self, window: Window) -> std::result::Result<SmokeTestReport, BootstrapError> {
        let driver = WgpuDriver::new();
        let mut ctx = GpuContext::<WgpuDriver, _>::new(window);

        // On failure `ctx` is dropped here, destroying the window.
        Bootstrapper::new(&driver, self.gpu.clone()).run(&mut ctx)?;

        let report = run_smoke_test(&driver, &ctx, &self.smoke);
        ctx.teardown();
        report
    }
}

impl ApplicationHandler for ProbeState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.outcome.is_some() {
            return;
        }

        let outcome = self
            .create_window(event_loop)
            .and_then(|window| self.probe(window));

        match &outcome {
            Ok(report) => log::info!("probe finished: {report:?}"),
            Err(e) => log::error!("probe failed: {e}"),
        }

        self.outcome = Some(outcome);
        event_loop.exit();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if let WindowEvent::CloseRequested = event {
            event_loop.exit();
        }
    }
}
