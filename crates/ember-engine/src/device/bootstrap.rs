//! Ordered bootstrap: instance, surface, adapter, device, surface configuration, queue.

use std::io::{self, Write};

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use super::context::GpuContext;
use super::driver::{AdapterRequest, DeviceCallbacks, DeviceRequest, GpuDriver};
use super::error::{BootstrapError, InspectError, RequestKind};
use super::init::BootstrapConfig;
use super::inspect;
use super::request::{request_adapter_sync, request_device_sync};
use super::surface;

/// Progress of the bootstrap sequence.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BootstrapState {
    Uninitialized,
    InstanceCreated,
    SurfaceCreated,
    AdapterAcquired,
    DeviceAcquired,
    SurfaceConfigured,
    QueueAcquired,
    Ready,
    Failed,
}

/// Drives a [`GpuContext`] from empty to ready.
///
/// Every failure halts forward progress and releases whatever was acquired so
/// far in reverse order; the context is left empty. Nothing is retried.
pub struct Bootstrapper<'a, D: GpuDriver> {
    driver: &'a D,
    config: BootstrapConfig,
    callbacks: DeviceCallbacks,
    report: Box<dyn Write + 'a>,
    history: Vec<BootstrapState>,
    inspection_errors: Vec<InspectError>,
}

impl<'a, D: GpuDriver> Bootstrapper<'a, D> {
    pub fn new(driver: &'a D, config: BootstrapConfig) -> Self {
        Self {
            driver,
            config,
            callbacks: DeviceCallbacks::logging(),
            report: Box::new(io::stdout()),
            history: vec![BootstrapState::Uninitialized],
            inspection_errors: Vec::new(),
        }
    }

    /// Replaces the device error/loss callbacks (logging by default).
    pub fn with_device_callbacks(mut self, callbacks: DeviceCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    /// Redirects capability reports (stdout by default).
    pub fn with_report(mut self, sink: impl Write + 'a) -> Self {
        self.report = Box::new(sink);
        self
    }

    pub fn state(&self) -> BootstrapState {
        self.history
            .last()
            .copied()
            .unwrap_or(BootstrapState::Uninitialized)
    }

    /// Every state visited so far, starting with `Uninitialized`.
    pub fn history(&self) -> &[BootstrapState] {
        &self.history
    }

    /// Capability inspections that were aborted. They never fail the bootstrap.
    pub fn inspection_errors(&self) -> &[InspectError] {
        &self.inspection_errors
    }

    fn inspection_failed(&mut self, target: &str, err: InspectError) {
        log::warn!("{target} capability inspection aborted: {err}");
        self.inspection_errors.push(err);
    }

    fn advance(&mut self, next: BootstrapState) {
        log::debug!("bootstrap: {:?} -> {next:?}", self.state());
        self.history.push(next);
    }

    fn fail(&mut self, err: BootstrapError) -> BootstrapError {
        log::error!("bootstrap failed in {:?}: {err}", self.state());
        self.history.push(BootstrapState::Failed);
        err
    }

    /// Runs the full sequence against `ctx`.
    ///
    /// On success `ctx` holds surface, device and queue. On failure `ctx` holds
    /// only its window.
    pub fn run<W>(&mut self, ctx: &mut GpuContext<D, W>) -> Result<(), BootstrapError>
    where
        W: HasWindowHandle + HasDisplayHandle,
    {
        if !ctx.is_empty() {
            return Err(self.fail(BootstrapError::AlreadyBootstrapped));
        }

        let driver = self.driver;

        // Instance
        let Some(instance) = driver.create_instance(self.config.instance) else {
            return Err(self.fail(BootstrapError::Allocation { what: "GPU instance" }));
        };
        log::info!("GPU instance: {instance:?}");
        self.advance(BootstrapState::InstanceCreated);

        // Surface, before the adapter so the adapter can be matched to it.
        let surface = match surface::create_surface(driver, &instance, ctx.window()) {
            Ok(s) => s,
            Err(e) => {
                drop(instance);
                return Err(self.fail(e.into()));
            }
        };
        self.advance(BootstrapState::SurfaceCreated);

        // Adapter
        log::info!("requesting adapter...");
        let adapter_request = AdapterRequest {
            power_preference: self.config.power_preference,
            force_fallback_adapter: self.config.force_fallback_adapter,
            compatible_surface: Some(&surface),
        };
        let adapter = match request_adapter_sync(driver, &instance, &adapter_request, &self.config.wait) {
            Ok(a) => a,
            Err(failure) => {
                drop(surface);
                drop(instance);
                return Err(self.fail(BootstrapError::Request {
                    kind: RequestKind::Adapter,
                    failure,
                }));
            }
        };
        log::info!("got adapter: {adapter:?}");
        self.advance(BootstrapState::AdapterAcquired);

        if self.config.inspect_capabilities {
            if let Err(e) = inspect::inspect_adapter(driver, &adapter, self.report.as_mut()) {
                self.inspection_failed("adapter", e);
            }
        }

        // The adapter keeps the underlying instance alive.
        drop(instance);

        // Device
        log::info!("requesting device...");
        let device_request = DeviceRequest {
            label: self.config.device_label.clone(),
            required_features: self.config.required_features,
            required_limits: self.config.required_limits.clone(),
            callbacks: self.callbacks.clone(),
        };
        let device = match request_device_sync(driver, &adapter, &device_request, &self.config.wait) {
            Ok(d) => d,
            Err(failure) => {
                drop(adapter);
                drop(surface);
                return Err(self.fail(BootstrapError::Request {
                    kind: RequestKind::Device,
                    failure,
                }));
            }
        };
        log::info!("got device: {device:?}");
        self.advance(BootstrapState::DeviceAcquired);

        drop(adapter);

        // Surface configuration needs the device.
        driver.configure_surface(&surface, &device, &self.config.surface_settings());
        self.advance(BootstrapState::SurfaceConfigured);

        if self.config.inspect_capabilities {
            if let Err(e) = inspect::inspect_device(driver, &device, self.report.as_mut()) {
                self.inspection_failed("device", e);
            }
        }

        // Queue
        let Some(queue) = driver.queue(&device) else {
            drop(device);
            drop(surface);
            return Err(self.fail(BootstrapError::ResourceUnavailable("command queue")));
        };
        driver.on_submitted_work_done(
            &queue,
            Box::new(|| log::info!("queued work finished")),
        );
        self.advance(BootstrapState::QueueAcquired);

        ctx.install(surface, device, queue);
        self.advance(BootstrapState::Ready);
        log::info!("GPU context ready");

        Ok(())
    }
}
