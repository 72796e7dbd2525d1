//! GPU context bootstrap.
//!
//! This module is responsible for:
//! - bridging callback-driven adapter/device requests into blocking calls
//! - selecting the platform surface descriptor for a window
//! - driving instance → surface → adapter → device → queue in order
//! - the one-shot command smoke test and ordered teardown

mod bootstrap;
mod context;
mod driver;
mod error;
mod init;
mod inspect;
mod request;
mod smoke;
mod surface;
#[cfg(not(target_arch = "wasm32"))]
mod wgpu_driver;

#[cfg(test)]
pub(crate) mod mock;

pub use bootstrap::{BootstrapState, Bootstrapper};
pub use context::GpuContext;
pub use driver::{
    AdapterRequest, DeviceCallbacks, DeviceRequest, ErrorHandler, GpuDriver, LossHandler,
    RequestCallback,
};
pub use error::{
    BootstrapError, DeviceErrorKind, DeviceLossReason, ErrorKind, InspectError, RequestFailure,
    RequestKind, RequestStatus,
};
pub use init::{BootstrapConfig, InstanceOptions, SCREEN_HEIGHT, SCREEN_WIDTH, SurfaceSettings};
pub use inspect::{AdapterProperties, FeatureName, TextureLimits, inspect_adapter, inspect_device};
pub use request::{
    Completer, PendingRequest, WaitPolicy, WaitStrategy, request_adapter_sync, request_device_sync,
};
pub use smoke::{DEBUG_MARKERS, SmokeTestConfig, SmokeTestReport, run_smoke_test};
pub use surface::{
    AppleView, LinuxBackend, PlatformFamily, SurfaceDescriptor, SurfaceError, create_surface,
};
#[cfg(not(target_arch = "wasm32"))]
pub use wgpu_driver::{WgpuDevice, WgpuDriver};
