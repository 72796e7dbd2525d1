use super::driver::GpuDriver;

/// Owns the window and the GPU handles bound to it.
///
/// This type is the low-level rendering context:
/// - created empty around a window
/// - populated by [`Bootstrapper::run`](super::Bootstrapper::run)
/// - released by [`GpuContext::teardown`]
///
/// `device` and `queue` are either both present or both absent.
///
/// Fields drop in declaration order, so an implicit drop releases queue,
/// device, surface and window in the same order as `teardown`.
pub struct GpuContext<D: GpuDriver, W> {
    /// Command queue of `device`.
    queue: Option<D::Queue>,

    /// Logical device.
    device: Option<D::Device>,

    /// Surface bound to the window; created from its raw handles, so it must
    /// be released before the window.
    surface: Option<D::Surface>,

    window: W,
}

impl<D: GpuDriver, W> GpuContext<D, W> {
    /// Creates an empty context that owns `window`.
    pub fn new(window: W) -> Self {
        Self {
            queue: None,
            device: None,
            surface: None,
            window,
        }
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    /// Returns the logical device, once bootstrap has completed.
    pub fn device(&self) -> Option<&D::Device> {
        self.device.as_ref()
    }

    /// Returns the command queue, once bootstrap has completed.
    pub fn queue(&self) -> Option<&D::Queue> {
        self.queue.as_ref()
    }

    pub fn surface(&self) -> Option<&D::Surface> {
        self.surface.as_ref()
    }

    /// Whether the device, queue and surface are all present.
    pub fn is_ready(&self) -> bool {
        self.device.is_some() && self.queue.is_some() && self.surface.is_some()
    }

    /// Whether no GPU handle is held.
    pub fn is_empty(&self) -> bool {
        self.device.is_none() && self.queue.is_none() && self.surface.is_none()
    }

    /// Stores the handles produced by a completed bootstrap.
    pub(crate) fn install(&mut self, surface: D::Surface, device: D::Device, queue: D::Queue) {
        debug_assert!(self.is_empty());
        self.surface = Some(surface);
        self.device = Some(device);
        self.queue = Some(queue);
    }

    /// Releases queue, device, surface, then the window.
    pub fn teardown(self) {
        let Self {
            queue,
            device,
            surface,
            window,
        } = self;

        if let Some(queue) = queue {
            log::debug!("releasing queue");
            drop(queue);
        }
        if let Some(device) = device {
            log::debug!("releasing device");
            drop(device);
        }
        if let Some(surface) = surface {
            log::debug!("releasing surface");
            drop(surface);
        }

        log::debug!("destroying window");
        drop(window);

        log::info!("GPU context torn down");
    }
}
