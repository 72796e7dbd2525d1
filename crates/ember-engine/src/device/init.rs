use super::request::WaitPolicy;

/// Target surface width in physical pixels.
pub const SCREEN_WIDTH: u32 = 640;

/// Target surface height in physical pixels.
pub const SCREEN_HEIGHT: u32 = 480;

/// How the GPU instance is created.
///
/// Browser WebGPU ignores instance descriptors and expects none at all, so the
/// `wasm32` target must use `Unspecified`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum InstanceOptions {
    /// Let the implementation pick everything.
    Unspecified,

    /// Explicit backend selection.
    Descriptor {
        backends: wgpu::Backends,

        /// Validate every call immediately instead of deferring errors to the
        /// next device tick.
        immediate_validation: bool,
    },
}

impl InstanceOptions {
    /// Options appropriate for the compilation target.
    pub fn for_target() -> Self {
        if cfg!(target_arch = "wasm32") {
            InstanceOptions::Unspecified
        } else {
            InstanceOptions::Descriptor {
                backends: wgpu::Backends::all(),
                immediate_validation: cfg!(debug_assertions),
            }
        }
    }
}

impl Default for InstanceOptions {
    fn default() -> Self {
        Self::for_target()
    }
}

/// Parameters applied to the surface once a device exists.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SurfaceSettings {
    pub format: wgpu::TextureFormat,
    pub width: u32,
    pub height: u32,
    pub present_mode: wgpu::PresentMode,
}

/// Initialization parameters for the bootstrap sequence.
///
/// Keep this structure stable and minimal. Add configuration flags only when a
/// concrete platform or backend requirement exists.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub instance: InstanceOptions,

    /// Surface width in physical pixels.
    pub width: u32,

    /// Surface height in physical pixels.
    pub height: u32,

    /// Fixed pixel format used to configure the surface.
    pub surface_format: wgpu::TextureFormat,

    /// Present mode (swap behavior).
    ///
    /// FIFO is the only mode every backend is required to support.
    pub present_mode: wgpu::PresentMode,

    pub power_preference: wgpu::PowerPreference,

    pub force_fallback_adapter: bool,

    /// Label attached to the device; shows up in driver error messages.
    pub device_label: String,

    /// Required wgpu features.
    ///
    /// Favor an empty set for portability unless a feature is strictly necessary.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,

    /// How the adapter/device waits block.
    pub wait: WaitPolicy,

    /// Print adapter and device capabilities while bootstrapping.
    pub inspect_capabilities: bool,
}

impl BootstrapConfig {
    pub(crate) fn surface_settings(&self) -> SurfaceSettings {
        SurfaceSettings {
            format: self.surface_format,
            width: self.width,
            height: self.height,
            present_mode: self.present_mode,
        }
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            instance: InstanceOptions::for_target(),
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
            surface_format: wgpu::TextureFormat::Bgra8Unorm,
            present_mode: wgpu::PresentMode::Fifo,
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            device_label: "ember device".to_string(),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            wait: WaitPolicy::default(),
            inspect_capabilities: true,
        }
    }
}
