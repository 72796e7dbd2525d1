use std::fmt;
use std::sync::Arc;

use super::error::{DeviceErrorKind, DeviceLossReason, RequestFailure};
use super::init::{InstanceOptions, SurfaceSettings};
use super::inspect::{AdapterProperties, FeatureName, TextureLimits};
use super::surface::SurfaceDescriptor;

/// Completion callback for an asynchronous adapter/device request.
///
/// The driver may invoke it inline, before the request call returns, or later
/// from one of its own threads.
pub type RequestCallback<T> = Box<dyn FnOnce(Result<T, RequestFailure>) + Send + 'static>;

/// Handler for errors nobody captured through an error scope.
pub type ErrorHandler = Arc<dyn Fn(DeviceErrorKind, String) + Send + Sync + 'static>;

/// Handler for device loss.
pub type LossHandler = Arc<dyn Fn(DeviceLossReason, String) + Send + Sync + 'static>;

/// Callbacks the driver installs on a device before handing it out.
#[derive(Clone)]
pub struct DeviceCallbacks {
    pub on_error: ErrorHandler,
    pub on_lost: LossHandler,
}

impl DeviceCallbacks {
    /// Callbacks that only report through the logger.
    pub fn logging() -> Self {
        Self {
            on_error: Arc::new(|kind, message| {
                log::error!("uncaptured device error ({kind:?}): {message}");
            }),
            on_lost: Arc::new(|reason, message| {
                log::error!("device lost ({reason:?}): {message}");
            }),
        }
    }
}

impl Default for DeviceCallbacks {
    fn default() -> Self {
        Self::logging()
    }
}

impl fmt::Debug for DeviceCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceCallbacks").finish_non_exhaustive()
    }
}

/// Adapter selection options.
#[derive(Debug)]
pub struct AdapterRequest<'a, S> {
    pub power_preference: wgpu::PowerPreference,
    pub force_fallback_adapter: bool,

    /// The adapter must be able to present to this surface.
    pub compatible_surface: Option<&'a S>,
}

/// Device creation options.
#[derive(Debug, Clone)]
pub struct DeviceRequest {
    pub label: String,
    pub required_features: wgpu::Features,
    pub required_limits: wgpu::Limits,
    pub callbacks: DeviceCallbacks,
}

/// The native GPU API the bootstrap sequence is written against.
///
/// Handles are released by dropping them. Callers control release order by
/// dropping explicitly; implementations must not keep handles alive on the
/// caller's behalf beyond what the underlying API itself does.
pub trait GpuDriver {
    type Instance: fmt::Debug;
    type Surface;
    /// Completed adapters and devices are read from the request slot by the
    /// waiting thread, so both must be `Sync`.
    type Adapter: fmt::Debug + Send + Sync + 'static;
    type Device: fmt::Debug + Send + Sync + 'static;
    type Queue;
    type Encoder;
    type CommandBuffer;

    /// Creates the top-level instance. `None` means the driver could not
    /// allocate one.
    fn create_instance(&self, options: InstanceOptions) -> Option<Self::Instance>;

    /// Creates an unconfigured presentation surface for `target`.
    fn create_surface(
        &self,
        instance: &Self::Instance,
        target: &SurfaceDescriptor,
    ) -> Result<Self::Surface, String>;

    /// Starts an adapter request. `on_complete` runs exactly once.
    fn request_adapter(
        &self,
        instance: &Self::Instance,
        request: &AdapterRequest<'_, Self::Surface>,
        on_complete: RequestCallback<Self::Adapter>,
    );

    /// Starts a device request. The driver installs `request.callbacks` before
    /// the device reaches `on_complete`. `on_complete` runs exactly once.
    fn request_device(
        &self,
        adapter: &Self::Adapter,
        request: &DeviceRequest,
        on_complete: RequestCallback<Self::Device>,
    );

    /// Hands control back to the host between checks of a cooperative wait.
    fn yield_to_host(&self) {}

    fn configure_surface(
        &self,
        surface: &Self::Surface,
        device: &Self::Device,
        settings: &SurfaceSettings,
    );

    /// Returns the device's command queue, if it has one.
    fn queue(&self, device: &Self::Device) -> Option<Self::Queue>;

    /// Registers a one-shot callback for when submitted work completes.
    fn on_submitted_work_done(&self, queue: &Self::Queue, callback: Box<dyn FnOnce() + Send>);

    fn create_command_encoder(&self, device: &Self::Device, label: &str) -> Self::Encoder;

    fn insert_debug_marker(&self, encoder: &mut Self::Encoder, label: &str);

    /// Finishes recording. The encoder is consumed and the buffer carries the
    /// encoder's label.
    fn finish(&self, encoder: Self::Encoder) -> Self::CommandBuffer;

    /// Submits one command buffer. The buffer is consumed.
    fn submit(&self, queue: &Self::Queue, buffer: Self::CommandBuffer);

    /// Processes pending backend work once without blocking.
    fn poll(&self, device: &Self::Device) -> Result<(), String>;

    fn adapter_limits(&self, adapter: &Self::Adapter) -> Option<TextureLimits>;

    fn device_limits(&self, device: &Self::Device) -> Option<TextureLimits>;

    /// Writes the adapter's optional features into `dest` and returns how many
    /// there are. With `None`, only the count is returned.
    fn adapter_features(&self, adapter: &Self::Adapter, dest: Option<&mut [FeatureName]>) -> usize;

    /// Same contract as [`GpuDriver::adapter_features`], for a device.
    fn device_features(&self, device: &Self::Device, dest: Option<&mut [FeatureName]>) -> usize;

    fn adapter_properties(&self, adapter: &Self::Adapter) -> AdapterProperties;
}
