use std::sync::{Arc, Mutex};

use super::driver::{AdapterRequest, DeviceRequest, GpuDriver, RequestCallback};
use super::error::{DeviceErrorKind, DeviceLossReason, RequestFailure, RequestStatus};
use super::init::{InstanceOptions, SurfaceSettings};
use super::inspect::{AdapterProperties, FeatureName, TextureLimits};
use super::surface::SurfaceDescriptor;

/// Logical device plus the queue wgpu creates alongside it.
///
/// The queue is handed out once through [`GpuDriver::queue`]; after that the
/// caller holds this crate's only reference to it. wgpu itself still keeps
/// the queue alive until the device is gone.
#[derive(Debug)]
pub struct WgpuDevice {
    pub device: wgpu::Device,
    queue: Mutex<Option<wgpu::Queue>>,
}

/// [`GpuDriver`] backed by wgpu, native targets only.
///
/// Requests are resolved with `pollster` inside the call, so completion
/// callbacks run before `request_*` returns. A browser main thread cannot
/// block that way.
#[derive(Debug, Default)]
pub struct WgpuDriver;

impl WgpuDriver {
    pub fn new() -> Self {
        Self
    }
}

/// Every enabled feature, WebGPU standard flags first, then wgpu-native ones.
fn feature_names(features: wgpu::Features) -> impl Iterator<Item = FeatureName> {
    let webgpu = features.features_webgpu.iter_names().map(|(name, _)| name);
    let native = features.features_wgpu.iter_names().map(|(name, _)| name);
    webgpu.chain(native).map(FeatureName)
}

fn write_features(features: wgpu::Features, dest: Option<&mut [FeatureName]>) -> usize {
    let present = feature_names(features);

    match dest {
        None => present.count(),
        Some(dest) => dest.iter_mut().zip(present).map(|(slot, name)| *slot = name).count(),
    }
}

fn take_once<T>(slot: &Mutex<Option<T>>) -> Option<T> {
    slot.lock().ok()?.take()
}

fn map_error(error: &wgpu::Error) -> DeviceErrorKind {
    match error {
        wgpu::Error::OutOfMemory { .. } => DeviceErrorKind::OutOfMemory,
        wgpu::Error::Validation { .. } => DeviceErrorKind::Validation,
        _ => DeviceErrorKind::Internal,
    }
}

fn map_loss(reason: wgpu::DeviceLostReason) -> DeviceLossReason {
    match reason {
        wgpu::DeviceLostReason::Destroyed => DeviceLossReason::Destroyed,
        _ => DeviceLossReason::Unknown,
    }
}

impl GpuDriver for WgpuDriver {
    type Instance = wgpu::Instance;
    type Surface = wgpu::Surface<'static>;
    type Adapter = wgpu::Adapter;
    type Device = WgpuDevice;
    type Queue = wgpu::Queue;
    type Encoder = wgpu::CommandEncoder;
    type CommandBuffer = wgpu::CommandBuffer;

    fn create_instance(&self, options: InstanceOptions) -> Option<wgpu::Instance> {
        let instance = match options {
            InstanceOptions::Unspecified => wgpu::Instance::default(),
            InstanceOptions::Descriptor {
                backends,
                immediate_validation,
            } => {
                let flags = if immediate_validation {
                    wgpu::InstanceFlags::debugging()
                } else {
                    wgpu::InstanceFlags::from_build_config()
                };
                wgpu::Instance::new(&wgpu::InstanceDescriptor {
                    backends,
                    flags: flags.with_env(),
                    ..Default::default()
                })
            }
        };
        Some(instance)
    }

    fn create_surface(
        &self,
        instance: &wgpu::Instance,
        target: &SurfaceDescriptor,
    ) -> Result<wgpu::Surface<'static>, String> {
        // SAFETY: the descriptor's handles come from a window owned by the
        // `GpuContext` that will also own this surface, and the context
        // releases the surface before the window.
        unsafe {
            let target = wgpu::SurfaceTargetUnsafe::from_window(target).map_err(|e| e.to_string())?;
            instance.create_surface_unsafe(target).map_err(|e| e.to_string())
        }
    }

    fn request_adapter(
        &self,
        instance: &wgpu::Instance,
        request: &AdapterRequest<'_, wgpu::Surface<'static>>,
        on_complete: RequestCallback<wgpu::Adapter>,
    ) {
        let options = wgpu::RequestAdapterOptions {
            power_preference: request.power_preference,
            force_fallback_adapter: request.force_fallback_adapter,
            compatible_surface: request.compatible_surface,
        };

        let outcome = pollster::block_on(instance.request_adapter(&options))
            .map_err(|e| RequestFailure::new(RequestStatus::Unavailable, e.to_string()));
        on_complete(outcome);
    }

    fn request_device(
        &self,
        adapter: &wgpu::Adapter,
        request: &DeviceRequest,
        on_complete: RequestCallback<WgpuDevice>,
    ) {
        let descriptor = wgpu::DeviceDescriptor {
            label: Some(&request.label),
            required_features: request.required_features,
            required_limits: request.required_limits.clone(),
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        };

        let outcome = pollster::block_on(adapter.request_device(&descriptor))
            .map(|(device, queue)| {
                let on_lost = Arc::clone(&request.callbacks.on_lost);
                device.set_device_lost_callback(move |reason, message| on_lost(map_loss(reason), message));

                let on_error = Arc::clone(&request.callbacks.on_error);
                device.on_uncaptured_error(Arc::new(move |error: wgpu::Error| {
                    on_error(map_error(&error), error.to_string())
                }));

                WgpuDevice {
                    device,
                    queue: Mutex::new(Some(queue)),
                }
            })
            .map_err(|e| RequestFailure::new(RequestStatus::Error, e.to_string()));

        on_complete(outcome);
    }

    fn configure_surface(
        &self,
        surface: &wgpu::Surface<'static>,
        device: &WgpuDevice,
        settings: &SurfaceSettings,
    ) {
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: settings.format,
            width: settings.width.max(1),
            height: settings.height.max(1),
            present_mode: settings.present_mode,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device.device, &config);
    }

    fn queue(&self, device: &WgpuDevice) -> Option<wgpu::Queue> {
        take_once(&device.queue)
    }

    fn on_submitted_work_done(&self, queue: &wgpu::Queue, callback: Box<dyn FnOnce() + Send>) {
        queue.on_submitted_work_done(callback);
    }

    fn create_command_encoder(&self, device: &WgpuDevice, label: &str) -> wgpu::CommandEncoder {
        device
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) })
    }

    fn insert_debug_marker(&self, encoder: &mut wgpu::CommandEncoder, label: &str) {
        encoder.insert_debug_marker(label);
    }

    fn finish(&self, encoder: wgpu::CommandEncoder) -> wgpu::CommandBuffer {
        encoder.finish()
    }

    fn submit(&self, queue: &wgpu::Queue, buffer: wgpu::CommandBuffer) {
        queue.submit(std::iter::once(buffer));
    }

    fn poll(&self, device: &WgpuDevice) -> Result<(), String> {
        device
            .device
            .poll(wgpu::PollType::Poll)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    fn adapter_limits(&self, adapter: &wgpu::Adapter) -> Option<TextureLimits> {
        Some(TextureLimits::from(&adapter.limits()))
    }

    fn device_limits(&self, device: &WgpuDevice) -> Option<TextureLimits> {
        Some(TextureLimits::from(&device.device.limits()))
    }

    fn adapter_features(&self, adapter: &wgpu::Adapter, dest: Option<&mut [FeatureName]>) -> usize {
        write_features(adapter.features(), dest)
    }

    fn device_features(&self, device: &WgpuDevice, dest: Option<&mut [FeatureName]>) -> usize {
        write_features(device.device.features(), dest)
    }

    fn adapter_properties(&self, adapter: &wgpu::Adapter) -> AdapterProperties {
        let info = adapter.get_info();
        AdapterProperties {
            vendor_id: info.vendor,
            device_id: info.device,
            name: info.name,
            driver: info.driver,
            driver_description: info.driver_info,
            adapter_type: format!("{:?}", info.device_type),
            backend_type: format!("{:?}", info.backend),
        }
    }
}
