//! Blocking wrappers around callback-driven adapter/device requests.

use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::{Duration, Instant};

use super::driver::{AdapterRequest, DeviceRequest, GpuDriver};
use super::error::{RequestFailure, RequestStatus};

/// How a blocking wait spends its time until the request completes.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum WaitStrategy {
    /// Busy-wait, yielding the thread between checks.
    Spin,

    /// Return control to the host between checks.
    ///
    /// Only useful with drivers whose requests make progress inside
    /// [`GpuDriver::yield_to_host`](super::GpuDriver::yield_to_host) or on
    /// another thread. Opt-in; never the default.
    Cooperative { interval: Duration },
}

/// Wait strategy plus an optional upper bound.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct WaitPolicy {
    pub strategy: WaitStrategy,

    /// `None` waits forever; a stalled driver then stalls the caller.
    pub timeout: Option<Duration>,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            strategy: WaitStrategy::Spin,
            timeout: None,
        }
    }
}

type Slot<T> = OnceLock<Result<T, RequestFailure>>;

/// Waiting side of a single asynchronous request.
///
/// The slot is written once by the matching [`Completer`]; the write is visible
/// to this side as soon as [`PendingRequest::is_completed`] returns `true`.
pub struct PendingRequest<T> {
    slot: Arc<Slot<T>>,
}

/// Completing side of a single asynchronous request.
///
/// `complete` consumes the completer, so a request cannot be completed twice.
/// Dropping a completer without calling `complete` records an
/// [`RequestStatus::Abandoned`] failure.
pub struct Completer<T> {
    slot: Option<Arc<Slot<T>>>,
}

impl<T> PendingRequest<T> {
    /// Allocates an empty slot and the completer bound to it.
    pub fn new() -> (Self, Completer<T>) {
        let slot = Arc::new(OnceLock::new());
        let completer = Completer {
            slot: Some(Arc::clone(&slot)),
        };
        (Self { slot }, completer)
    }

    pub fn is_completed(&self) -> bool {
        self.slot.get().is_some()
    }

    /// Blocks until the request completes or `policy.timeout` elapses.
    ///
    /// `yield_to_host` runs between checks when the strategy is cooperative.
    pub fn wait(self, policy: &WaitPolicy, mut yield_to_host: impl FnMut()) -> Result<T, RequestFailure> {
        let deadline = policy.timeout.map(|t| Instant::now() + t);

        while !self.is_completed() {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(RequestFailure::new(
                    RequestStatus::TimedOut,
                    format!("no completion after {:?}", policy.timeout.unwrap_or_default()),
                ));
            }

            match policy.strategy {
                WaitStrategy::Spin => {
                    std::hint::spin_loop();
                    thread::yield_now();
                }
                WaitStrategy::Cooperative { interval } => {
                    yield_to_host();
                    thread::sleep(interval);
                }
            }
        }

        self.take()
    }

    fn take(self) -> Result<T, RequestFailure> {
        let mut slot = self.slot;
        // The completer drops its reference right after publishing.
        loop {
            match Arc::try_unwrap(slot) {
                Ok(cell) => {
                    return cell.into_inner().unwrap_or_else(|| {
                        Err(RequestFailure::new(RequestStatus::Abandoned, "empty request slot"))
                    });
                }
                Err(shared) => {
                    slot = shared;
                    std::hint::spin_loop();
                }
            }
        }
    }
}

impl<T> Completer<T> {
    pub fn complete(mut self, outcome: Result<T, RequestFailure>) {
        if let Some(slot) = self.slot.take() {
            publish(&slot, outcome);
        }
    }
}

impl<T> Drop for Completer<T> {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.take() {
            publish(
                &slot,
                Err(RequestFailure::new(
                    RequestStatus::Abandoned,
                    "request callback dropped before completion",
                )),
            );
        }
    }
}

fn publish<T>(slot: &Slot<T>, outcome: Result<T, RequestFailure>) {
    if slot.set(outcome).is_err() {
        log::error!("request completed twice; second result discarded");
        debug_assert!(false, "request completed twice");
    }
}

/// Requests an adapter and blocks until the driver answers.
///
/// Failures are logged and returned; the caller decides whether to continue.
pub fn request_adapter_sync<D: GpuDriver>(
    driver: &D,
    instance: &D::Instance,
    request: &AdapterRequest<'_, D::Surface>,
    policy: &WaitPolicy,
) -> Result<D::Adapter, RequestFailure> {
    let (pending, completer) = PendingRequest::new();
    driver.request_adapter(
        instance,
        request,
        Box::new(move |outcome| completer.complete(outcome)),
    );

    pending
        .wait(policy, || driver.yield_to_host())
        .inspect_err(|failure| log::error!("could not get GPU adapter: {failure}"))
}

/// Requests a device and blocks until the driver answers.
pub fn request_device_sync<D: GpuDriver>(
    driver: &D,
    adapter: &D::Adapter,
    request: &DeviceRequest,
    policy: &WaitPolicy,
) -> Result<D::Device, RequestFailure> {
    let (pending, completer) = PendingRequest::new();
    driver.request_device(
        adapter,
        request,
        Box::new(move |outcome| completer.complete(outcome)),
    );

    pending
        .wait(policy, || driver.yield_to_host())
        .inspect_err(|failure| log::error!("could not get GPU device: {failure}"))
}
