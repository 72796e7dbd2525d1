//! Recording driver used by the unit tests.

use std::num::NonZeroIsize;
use std::ptr::NonNull;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use raw_window_handle::{
    AppKitDisplayHandle, AppKitWindowHandle, DisplayHandle, HandleError, HasDisplayHandle,
    HasWindowHandle, RawDisplayHandle, RawWindowHandle, Win32WindowHandle, WindowHandle,
    WindowsDisplayHandle, XlibDisplayHandle, XlibWindowHandle,
};

use super::driver::{AdapterRequest, DeviceCallbacks, DeviceRequest, GpuDriver, RequestCallback};
use super::error::{DeviceErrorKind, DeviceLossReason, RequestFailure, RequestStatus};
use super::init::{InstanceOptions, SurfaceSettings};
use super::inspect::{AdapterProperties, FeatureName, TextureLimits};
use super::surface::SurfaceDescriptor;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum Handle {
    Instance,
    Surface,
    Adapter,
    Device,
    Queue,
    Encoder,
    CommandBuffer,
    Window,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Event {
    CreateInstance,
    CreateSurface(&'static str),
    RequestAdapter { compatible_surface: bool },
    RequestDevice { label: String },
    DeviceCallbacksInstalled,
    ConfigureSurface(SurfaceSettings),
    GetQueue,
    WorkDoneRegistered,
    CreateEncoder(String),
    DebugMarker(String),
    Finish,
    Submit,
    Poll,
    Released(Handle),
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Journal(Arc<Mutex<Vec<Event>>>);

impl Journal {
    pub(crate) fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }
}

/// A driver-owned object; dropping it records its release.
#[derive(Debug)]
pub(crate) struct MockHandle {
    kind: Handle,
    journal: Journal,
}

impl MockHandle {
    fn new(kind: Handle, journal: &Journal) -> Self {
        Self {
            kind,
            journal: journal.clone(),
        }
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        self.journal.push(Event::Released(self.kind));
    }
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub(crate) enum Outcome {
    #[default]
    Succeed,
    Fail(&'static str),
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub(crate) enum Delivery {
    /// The callback runs before the request call returns.
    #[default]
    Inline,
    /// The callback runs on another thread after a delay.
    Thread(Duration),
}

type WorkDone = Box<dyn FnOnce() + Send>;

#[derive(Default)]
pub(crate) struct MockDriver {
    pub journal: Journal,
    pub instance_fails: bool,
    pub surface_fails: bool,
    pub adapter: Outcome,
    pub device: Outcome,
    pub queue_missing: bool,
    pub poll_fails: bool,
    pub delivery: Delivery,
    pub features: Vec<FeatureName>,
    pub feature_count_override: Option<usize>,
    pub callbacks: Arc<Mutex<Option<DeviceCallbacks>>>,
    pub work_done: Arc<Mutex<Vec<WorkDone>>>,
}

impl MockDriver {
    pub(crate) fn journal(&self) -> Vec<Event> {
        self.journal.events()
    }

    pub(crate) fn adapter_handle(&self, _instance: &MockHandle) -> MockHandle {
        MockHandle::new(Handle::Adapter, &self.journal)
    }

    pub(crate) fn device_handle(&self) -> MockHandle {
        MockHandle::new(Handle::Device, &self.journal)
    }

    pub(crate) fn window(&self) -> FakeWindow {
        FakeWindow {
            journal: self.journal.clone(),
        }
    }

    /// Raises an asynchronous device error through the installed callback.
    pub(crate) fn raise_device_error(&self, kind: DeviceErrorKind, message: &str) {
        if let Some(cb) = self.callbacks.lock().unwrap().as_ref() {
            (cb.on_error)(kind, message.to_string());
        }
    }

    pub(crate) fn lose_device(&self, reason: DeviceLossReason, message: &str) {
        if let Some(cb) = self.callbacks.lock().unwrap().as_ref() {
            (cb.on_lost)(reason, message.to_string());
        }
    }

    fn deliver<T: Send + 'static>(&self, outcome: Result<T, RequestFailure>, on_complete: RequestCallback<T>) {
        match self.delivery {
            Delivery::Inline => on_complete(outcome),
            Delivery::Thread(delay) => {
                thread::spawn(move || {
                    thread::sleep(delay);
                    on_complete(outcome);
                });
            }
        }
    }

    fn feature_query(&self, dest: Option<&mut [FeatureName]>) -> usize {
        match dest {
            None => self.feature_count_override.unwrap_or(self.features.len()),
            Some(dest) => dest.iter_mut().zip(&self.features).map(|(slot, f)| *slot = *f).count(),
        }
    }
}

impl GpuDriver for MockDriver {
    type Instance = MockHandle;
    type Surface = MockHandle;
    type Adapter = MockHandle;
    type Device = MockHandle;
    type Queue = MockHandle;
    type Encoder = MockHandle;
    type CommandBuffer = MockHandle;

    fn create_instance(&self, _options: InstanceOptions) -> Option<MockHandle> {
        self.journal.push(Event::CreateInstance);
        (!self.instance_fails).then(|| MockHandle::new(Handle::Instance, &self.journal))
    }

    fn create_surface(&self, _instance: &MockHandle, target: &SurfaceDescriptor) -> Result<MockHandle, String> {
        self.journal.push(Event::CreateSurface(target.name()));
        if self.surface_fails {
            return Err("surface rejected".to_string());
        }
        Ok(MockHandle::new(Handle::Surface, &self.journal))
    }

    fn request_adapter(
        &self,
        _instance: &MockHandle,
        request: &AdapterRequest<'_, MockHandle>,
        on_complete: RequestCallback<MockHandle>,
    ) {
        self.journal.push(Event::RequestAdapter {
            compatible_surface: request.compatible_surface.is_some(),
        });
        let outcome = match self.adapter {
            Outcome::Succeed => Ok(MockHandle::new(Handle::Adapter, &self.journal)),
            Outcome::Fail(msg) => Err(RequestFailure::new(RequestStatus::Unavailable, msg)),
        };
        self.deliver(outcome, on_complete);
    }

    fn request_device(
        &self,
        _adapter: &MockHandle,
        request: &DeviceRequest,
        on_complete: RequestCallback<MockHandle>,
    ) {
        self.journal.push(Event::RequestDevice {
            label: request.label.clone(),
        });
        let outcome = match self.device {
            Outcome::Succeed => {
                *self.callbacks.lock().unwrap() = Some(request.callbacks.clone());
                self.journal.push(Event::DeviceCallbacksInstalled);
                Ok(MockHandle::new(Handle::Device, &self.journal))
            }
            Outcome::Fail(msg) => Err(RequestFailure::new(RequestStatus::Error, msg)),
        };
        self.deliver(outcome, on_complete);
    }

    fn configure_surface(&self, _surface: &MockHandle, _device: &MockHandle, settings: &SurfaceSettings) {
        self.journal.push(Event::ConfigureSurface(*settings));
    }

    fn queue(&self, _device: &MockHandle) -> Option<MockHandle> {
        self.journal.push(Event::GetQueue);
        (!self.queue_missing).then(|| MockHandle::new(Handle::Queue, &self.journal))
    }

    fn on_submitted_work_done(&self, _queue: &MockHandle, callback: WorkDone) {
        self.journal.push(Event::WorkDoneRegistered);
        self.work_done.lock().unwrap().push(callback);
    }

    fn create_command_encoder(&self, _device: &MockHandle, label: &str) -> MockHandle {
        self.journal.push(Event::CreateEncoder(label.to_string()));
        MockHandle::new(Handle::Encoder, &self.journal)
    }

    fn insert_debug_marker(&self, _encoder: &mut MockHandle, label: &str) {
        self.journal.push(Event::DebugMarker(label.to_string()));
    }

    fn finish(&self, encoder: MockHandle) -> MockHandle {
        self.journal.push(Event::Finish);
        drop(encoder);
        MockHandle::new(Handle::CommandBuffer, &self.journal)
    }

    fn submit(&self, _queue: &MockHandle, buffer: MockHandle) {
        self.journal.push(Event::Submit);
        drop(buffer);
        let pending: Vec<WorkDone> = self.work_done.lock().unwrap().drain(..).collect();
        for callback in pending {
            callback();
        }
    }

    fn poll(&self, _device: &MockHandle) -> Result<(), String> {
        self.journal.push(Event::Poll);
        if self.poll_fails {
            return Err("device lost".to_string());
        }
        Ok(())
    }

    fn adapter_limits(&self, _adapter: &MockHandle) -> Option<TextureLimits> {
        Some(TextureLimits {
            max_texture_dimension_1d: 8192,
            max_texture_dimension_2d: 8192,
            max_texture_dimension_3d: 2048,
            max_texture_array_layers: 256,
        })
    }

    fn device_limits(&self, adapter: &MockHandle) -> Option<TextureLimits> {
        self.adapter_limits(adapter)
    }

    fn adapter_features(&self, _adapter: &MockHandle, dest: Option<&mut [FeatureName]>) -> usize {
        self.feature_query(dest)
    }

    fn device_features(&self, _device: &MockHandle, dest: Option<&mut [FeatureName]>) -> usize {
        self.feature_query(dest)
    }

    fn adapter_properties(&self, _adapter: &MockHandle) -> AdapterProperties {
        AdapterProperties {
            vendor_id: 0x10de,
            device_id: 0x2684,
            name: "Mock GPU".to_string(),
            driver: "mock".to_string(),
            driver_description: "recording driver".to_string(),
            adapter_type: "DiscreteGpu".to_string(),
            backend_type: "Mock".to_string(),
        }
    }
}

/// Window stand-in exposing handles for the host platform family.
pub(crate) struct FakeWindow {
    journal: Journal,
}

impl Drop for FakeWindow {
    fn drop(&mut self) {
        self.journal.push(Event::Released(Handle::Window));
    }
}

impl HasWindowHandle for FakeWindow {
    fn window_handle(&self) -> Result<WindowHandle<'_>, HandleError> {
        let raw = if cfg!(target_os = "windows") {
            RawWindowHandle::Win32(Win32WindowHandle::new(NonZeroIsize::MIN))
        } else if cfg!(any(target_os = "macos", target_os = "ios")) {
            RawWindowHandle::AppKit(AppKitWindowHandle::new(NonNull::dangling()))
        } else {
            RawWindowHandle::Xlib(XlibWindowHandle::new(0x2a))
        };
        Ok(unsafe { WindowHandle::borrow_raw(raw) })
    }
}

impl HasDisplayHandle for FakeWindow {
    fn display_handle(&self) -> Result<DisplayHandle<'_>, HandleError> {
        let raw = if cfg!(target_os = "windows") {
            RawDisplayHandle::Windows(WindowsDisplayHandle::new())
        } else if cfg!(any(target_os = "macos", target_os = "ios")) {
            RawDisplayHandle::AppKit(AppKitDisplayHandle::new())
        } else {
            RawDisplayHandle::Xlib(XlibDisplayHandle::new(None, 0))
        };
        Ok(unsafe { DisplayHandle::borrow_raw(raw) })
    }
}
