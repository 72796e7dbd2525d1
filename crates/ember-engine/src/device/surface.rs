//! Platform-specific presentation surface selection.

use std::ffi::{c_int, c_ulong, c_void};
use std::fmt;
use std::num::NonZeroIsize;
use std::ptr::NonNull;

use raw_window_handle::{
    AppKitDisplayHandle, AppKitWindowHandle, DisplayHandle, HandleError, HasDisplayHandle,
    HasWindowHandle, RawDisplayHandle, RawWindowHandle, UiKitDisplayHandle, UiKitWindowHandle,
    WaylandDisplayHandle, WaylandWindowHandle, Win32WindowHandle, WindowHandle,
    WindowsDisplayHandle, XlibDisplayHandle, XlibWindowHandle,
};

use super::driver::GpuDriver;

/// Host platform family, fixed at compile time.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PlatformFamily {
    Windows,
    Apple,
    /// Linux and the BSDs: X11 or Wayland, decided at run time.
    Linux,
    Unsupported,
}

impl PlatformFamily {
    pub const fn current() -> Self {
        if cfg!(target_os = "windows") {
            PlatformFamily::Windows
        } else if cfg!(any(target_os = "macos", target_os = "ios")) {
            PlatformFamily::Apple
        } else if cfg!(any(
            target_os = "linux",
            target_os = "freebsd",
            target_os = "dragonfly",
            target_os = "netbsd",
            target_os = "openbsd"
        )) {
            PlatformFamily::Linux
        } else {
            PlatformFamily::Unsupported
        }
    }
}

/// Windowing backend active on a Linux host.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LinuxBackend {
    X11,
    Wayland,
}

impl LinuxBackend {
    /// The same binary may run under either backend; the live display decides.
    pub fn detect(display: &RawDisplayHandle) -> Option<Self> {
        match display {
            RawDisplayHandle::Wayland(_) => Some(LinuxBackend::Wayland),
            RawDisplayHandle::Xlib(_) | RawDisplayHandle::Xcb(_) => Some(LinuxBackend::X11),
            _ => None,
        }
    }
}

/// Which Apple view kind backs a Metal surface.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppleView {
    AppKit,
    UiKit,
}

/// Native handles needed to build a presentation surface on one platform.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceDescriptor {
    Win32 {
        hwnd: NonZeroIsize,
        hinstance: Option<NonZeroIsize>,
    },
    Metal {
        view: NonNull<c_void>,
        kind: AppleView,
    },
    Xlib {
        display: Option<NonNull<c_void>>,
        screen: c_int,
        window: c_ulong,
    },
    Wayland {
        display: NonNull<c_void>,
        surface: NonNull<c_void>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("window handles are not available")]
    Handle(#[from] HandleError),

    #[error("no surface support for this platform")]
    UnsupportedPlatform,

    #[error("{family:?} host cannot present to a {found} window")]
    HandleMismatch {
        family: PlatformFamily,
        found: &'static str,
    },

    #[error("driver refused the surface: {0}")]
    Driver(String),
}

impl SurfaceDescriptor {
    /// Picks exactly one descriptor variant for `family` from a window's handles.
    pub fn select(
        family: PlatformFamily,
        display: RawDisplayHandle,
        window: RawWindowHandle,
    ) -> Result<Self, SurfaceError> {
        let mismatch = || SurfaceError::HandleMismatch {
            family,
            found: window_kind(&window),
        };

        match family {
            PlatformFamily::Windows => match window {
                RawWindowHandle::Win32(h) => Ok(SurfaceDescriptor::Win32 {
                    hwnd: h.hwnd,
                    hinstance: h.hinstance,
                }),
                _ => Err(mismatch()),
            },

            PlatformFamily::Apple => match window {
                RawWindowHandle::AppKit(h) => Ok(SurfaceDescriptor::Metal {
                    view: h.ns_view,
                    kind: AppleView::AppKit,
                }),
                RawWindowHandle::UiKit(h) => Ok(SurfaceDescriptor::Metal {
                    view: h.ui_view,
                    kind: AppleView::UiKit,
                }),
                _ => Err(mismatch()),
            },

            PlatformFamily::Linux => match (LinuxBackend::detect(&display), display, window) {
                (Some(LinuxBackend::Wayland), RawDisplayHandle::Wayland(d), RawWindowHandle::Wayland(w)) => {
                    Ok(SurfaceDescriptor::Wayland {
                        display: d.display,
                        surface: w.surface,
                    })
                }
                (Some(LinuxBackend::X11), RawDisplayHandle::Xlib(d), RawWindowHandle::Xlib(w)) => {
                    Ok(SurfaceDescriptor::Xlib {
                        display: d.display,
                        screen: d.screen,
                        window: w.window,
                    })
                }
                _ => Err(mismatch()),
            },

            PlatformFamily::Unsupported => Err(SurfaceError::UnsupportedPlatform),
        }
    }

    /// Short variant name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            SurfaceDescriptor::Win32 { .. } => "win32",
            SurfaceDescriptor::Metal { .. } => "metal",
            SurfaceDescriptor::Xlib { .. } => "xlib",
            SurfaceDescriptor::Wayland { .. } => "wayland",
        }
    }

    fn raw_window(&self) -> RawWindowHandle {
        match *self {
            SurfaceDescriptor::Win32 { hwnd, hinstance } => {
                let mut h = Win32WindowHandle::new(hwnd);
                h.hinstance = hinstance;
                RawWindowHandle::Win32(h)
            }
            SurfaceDescriptor::Metal { view, kind: AppleView::AppKit } => {
                RawWindowHandle::AppKit(AppKitWindowHandle::new(view))
            }
            SurfaceDescriptor::Metal { view, kind: AppleView::UiKit } => {
                RawWindowHandle::UiKit(UiKitWindowHandle::new(view))
            }
            SurfaceDescriptor::Xlib { window, .. } => RawWindowHandle::Xlib(XlibWindowHandle::new(window)),
            SurfaceDescriptor::Wayland { surface, .. } => {
                RawWindowHandle::Wayland(WaylandWindowHandle::new(surface))
            }
        }
    }

    fn raw_display(&self) -> RawDisplayHandle {
        match *self {
            SurfaceDescriptor::Win32 { .. } => RawDisplayHandle::Windows(WindowsDisplayHandle::new()),
            SurfaceDescriptor::Metal { kind: AppleView::AppKit, .. } => {
                RawDisplayHandle::AppKit(AppKitDisplayHandle::new())
            }
            SurfaceDescriptor::Metal { kind: AppleView::UiKit, .. } => {
                RawDisplayHandle::UiKit(UiKitDisplayHandle::new())
            }
            SurfaceDescriptor::Xlib { display, screen, .. } => {
                RawDisplayHandle::Xlib(XlibDisplayHandle::new(display, screen))
            }
            SurfaceDescriptor::Wayland { display, .. } => {
                RawDisplayHandle::Wayland(WaylandDisplayHandle::new(display))
            }
        }
    }
}

impl fmt::Display for SurfaceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// A descriptor is only built from a live window and only lives for the
// duration of surface creation, so the handles it re-exposes stay valid.
impl HasWindowHandle for SurfaceDescriptor {
    fn window_handle(&self) -> Result<WindowHandle<'_>, HandleError> {
        Ok(unsafe { WindowHandle::borrow_raw(self.raw_window()) })
    }
}

impl HasDisplayHandle for SurfaceDescriptor {
    fn display_handle(&self) -> Result<DisplayHandle<'_>, HandleError> {
        Ok(unsafe { DisplayHandle::borrow_raw(self.raw_display()) })
    }
}

fn window_kind(window: &RawWindowHandle) -> &'static str {
    match window {
        RawWindowHandle::Win32(_) => "win32",
        RawWindowHandle::AppKit(_) => "appkit",
        RawWindowHandle::UiKit(_) => "uikit",
        RawWindowHandle::Xlib(_) => "xlib",
        RawWindowHandle::Xcb(_) => "xcb",
        RawWindowHandle::Wayland(_) => "wayland",
        _ => "other",
    }
}

/// Builds an unconfigured presentation surface for `window`.
///
/// Configuration needs a device and happens later in the bootstrap sequence.
pub fn create_surface<D, W>(
    driver: &D,
    instance: &D::Instance,
    window: &W,
) -> Result<D::Surface, SurfaceError>
where
    D: GpuDriver,
    W: HasWindowHandle + HasDisplayHandle,
{
    let display = window.display_handle()?.as_raw();
    let raw_window = window.window_handle()?.as_raw();

    let descriptor = SurfaceDescriptor::select(PlatformFamily::current(), display, raw_window)?;
    log::debug!("creating {descriptor} surface");

    driver
        .create_surface(instance, &descriptor)
        .map_err(SurfaceError::Driver)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ptr(addr: usize) -> NonNull<c_void> {
        NonNull::new(addr as *mut c_void).unwrap()
    }

    fn xlib() -> (RawDisplayHandle, RawWindowHandle) {
        (
            RawDisplayHandle::Xlib(XlibDisplayHandle::new(Some(ptr(0x10)), 0)),
            RawWindowHandle::Xlib(XlibWindowHandle::new(0x2a)),
        )
    }

    fn wayland() -> (RawDisplayHandle, RawWindowHandle) {
        (
            RawDisplayHandle::Wayland(WaylandDisplayHandle::new(ptr(0x20))),
            RawWindowHandle::Wayland(WaylandWindowHandle::new(ptr(0x30))),
        )
    }

    fn win32() -> (RawDisplayHandle, RawWindowHandle) {
        let mut h = Win32WindowHandle::new(NonZeroIsize::new(0x40).unwrap());
        h.hinstance = NonZeroIsize::new(0x50);
        (RawDisplayHandle::Windows(WindowsDisplayHandle::new()), RawWindowHandle::Win32(h))
    }

    fn appkit() -> (RawDisplayHandle, RawWindowHandle) {
        (
            RawDisplayHandle::AppKit(AppKitDisplayHandle::new()),
            RawWindowHandle::AppKit(AppKitWindowHandle::new(ptr(0x60))),
        )
    }

    // ── selection ─────────────────────────────────────────────────────────

    #[test]
    fn windows_selects_win32() {
        let (d, w) = win32();
        let desc = SurfaceDescriptor::select(PlatformFamily::Windows, d, w).unwrap();
        assert_eq!(
            desc,
            SurfaceDescriptor::Win32 {
                hwnd: NonZeroIsize::new(0x40).unwrap(),
                hinstance: NonZeroIsize::new(0x50),
            }
        );
    }

    #[test]
    fn apple_selects_metal_for_appkit_and_uikit() {
        let (d, w) = appkit();
        let desc = SurfaceDescriptor::select(PlatformFamily::Apple, d, w).unwrap();
        assert_eq!(desc, SurfaceDescriptor::Metal { view: ptr(0x60), kind: AppleView::AppKit });

        let d = RawDisplayHandle::UiKit(UiKitDisplayHandle::new());
        let w = RawWindowHandle::UiKit(UiKitWindowHandle::new(ptr(0x70)));
        let desc = SurfaceDescriptor::select(PlatformFamily::Apple, d, w).unwrap();
        assert_eq!(desc, SurfaceDescriptor::Metal { view: ptr(0x70), kind: AppleView::UiKit });
    }

    #[test]
    fn linux_picks_backend_from_live_display() {
        let (d, w) = xlib();
        assert_eq!(LinuxBackend::detect(&d), Some(LinuxBackend::X11));
        assert_eq!(
            SurfaceDescriptor::select(PlatformFamily::Linux, d, w).unwrap(),
            SurfaceDescriptor::Xlib { display: Some(ptr(0x10)), screen: 0, window: 0x2a }
        );

        let (d, w) = wayland();
        assert_eq!(LinuxBackend::detect(&d), Some(LinuxBackend::Wayland));
        assert_eq!(
            SurfaceDescriptor::select(PlatformFamily::Linux, d, w).unwrap(),
            SurfaceDescriptor::Wayland { display: ptr(0x20), surface: ptr(0x30) }
        );
    }

    #[test]
    fn each_family_accepts_exactly_one_handle_set() {
        let families = [PlatformFamily::Windows, PlatformFamily::Apple, PlatformFamily::Linux];
        let handle_sets = [win32(), appkit(), xlib(), wayland()];

        for family in families {
            let accepted: Vec<&'static str> = handle_sets
                .iter()
                .filter_map(|(d, w)| SurfaceDescriptor::select(family, *d, *w).ok())
                .map(|desc| desc.name())
                .collect();

            let expected: &[&str] = match family {
                PlatformFamily::Windows => &["win32"],
                PlatformFamily::Apple => &["metal"],
                PlatformFamily::Linux => &["xlib", "wayland"],
                PlatformFamily::Unsupported => &[],
            };
            assert_eq!(accepted, expected, "{family:?}");
        }
    }

    // ── rejection ─────────────────────────────────────────────────────────

    #[test]
    fn mixed_linux_handles_are_rejected() {
        let (d, _) = wayland();
        let (_, w) = xlib();
        let err = SurfaceDescriptor::select(PlatformFamily::Linux, d, w).unwrap_err();
        assert!(matches!(err, SurfaceError::HandleMismatch { found: "xlib", .. }));
    }

    #[test]
    fn foreign_handles_are_rejected() {
        let (d, w) = xlib();
        let err = SurfaceDescriptor::select(PlatformFamily::Windows, d, w).unwrap_err();
        assert!(matches!(
            err,
            SurfaceError::HandleMismatch { family: PlatformFamily::Windows, found: "xlib" }
        ));
    }

    #[test]
    fn unsupported_platform_has_no_surface() {
        let (d, w) = xlib();
        assert!(matches!(
            SurfaceDescriptor::select(PlatformFamily::Unsupported, d, w),
            Err(SurfaceError::UnsupportedPlatform)
        ));
    }

    // ── handle re-exposure ────────────────────────────────────────────────

    #[test]
    fn descriptor_reexposes_its_handles() {
        let (d, w) = wayland();
        let desc = SurfaceDescriptor::select(PlatformFamily::Linux, d, w).unwrap();
        assert_eq!(desc.window_handle().unwrap().as_raw(), w);
        assert_eq!(desc.display_handle().unwrap().as_raw(), d);

        let (d, w) = win32();
        let desc = SurfaceDescriptor::select(PlatformFamily::Windows, d, w).unwrap();
        assert_eq!(desc.window_handle().unwrap().as_raw(), w);
    }
}
