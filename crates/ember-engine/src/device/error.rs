use std::fmt;

use super::surface::SurfaceError;

/// Why an adapter or device request did not produce a handle.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RequestStatus {
    /// No adapter/device satisfies the request on this host.
    Unavailable,
    /// The driver reported an error while servicing the request.
    Error,
    /// The completion callback was dropped without ever firing.
    Abandoned,
    /// The configured wait timeout elapsed first.
    TimedOut,
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RequestStatus::Unavailable => "unavailable",
            RequestStatus::Error => "error",
            RequestStatus::Abandoned => "abandoned",
            RequestStatus::TimedOut => "timed out",
        };
        f.write_str(s)
    }
}

/// Failure reported by the completion callback of an asynchronous request.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
#[error("{status}: {message}")]
pub struct RequestFailure {
    pub status: RequestStatus,
    pub message: String,
}

impl RequestFailure {
    pub fn new(status: RequestStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// Which asynchronous request failed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RequestKind {
    Adapter,
    Device,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKind::Adapter => f.write_str("adapter"),
            RequestKind::Device => f.write_str("device"),
        }
    }
}

/// Coarse failure category, independent of the payload carried by the error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorKind {
    AllocationFailure,
    RequestFailure,
    ResourceUnavailable,
    SurfaceUnavailable,
    AlreadyBootstrapped,
}

/// Errors that halt bootstrap or the smoke test.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// The instance or the window could not be created.
    #[error("could not create {what}")]
    Allocation { what: &'static str },

    /// An adapter or device request completed with a failure status.
    #[error("{kind} request failed: {failure}")]
    Request {
        kind: RequestKind,
        #[source]
        failure: RequestFailure,
    },

    /// A handle the sequence depends on is missing.
    #[error("{0} is unavailable")]
    ResourceUnavailable(&'static str),

    #[error("surface creation failed")]
    Surface(#[from] SurfaceError),

    #[error("context is already bootstrapped")]
    AlreadyBootstrapped,
}

impl BootstrapError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BootstrapError::Allocation { .. } => ErrorKind::AllocationFailure,
            BootstrapError::Request { .. } => ErrorKind::RequestFailure,
            BootstrapError::ResourceUnavailable(_) => ErrorKind::ResourceUnavailable,
            BootstrapError::Surface(_) => ErrorKind::SurfaceUnavailable,
            BootstrapError::AlreadyBootstrapped => ErrorKind::AlreadyBootstrapped,
        }
    }
}

/// Errors raised while building a capability report.
#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    /// The feature-list buffer could not be allocated.
    #[error("failed to allocate {target} feature list (count={count})")]
    Allocation { target: &'static str, count: usize },

    #[error("failed to write capability report")]
    Io(#[from] std::io::Error),
}

/// Category of an error raised asynchronously by a live device.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DeviceErrorKind {
    Validation,
    OutOfMemory,
    Internal,
}

/// Why a device was lost.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DeviceLossReason {
    Destroyed,
    Unknown,
}
