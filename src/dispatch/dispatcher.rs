//! Request submission, plugin interception, and cancellation.
//!
//! Lifecycle of one asynchronous request:
//!
//! ```text
//! Submitted -> Running -> Completed | Cancelled
//! ```
//!
//! Transitions of a single request are strictly ordered; completions of
//! independently submitted requests are not ordered at all. The terminal
//! response is delivered to the caller-supplied receiver exactly once,
//! whichever of completion and cancellation wins the race.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::dispatch::handle::RequestHandle;
use crate::dispatch::service::{NotificationHandler, ResponseReceiver, ToolingService, UidHandlers};
use crate::plugin::PluginRegistry;
use crate::protocol::{Request, Response};

/// One-shot responder for a claimed request.
///
/// A claiming handler must invoke [`complete`](Completion::complete) exactly
/// once, even on internal failure (synthesize an error response rather than
/// never completing). A second invocation is logged and dropped; it never
/// causes a second delivery.
#[derive(Clone)]
pub struct Completion {
    handle: RequestHandle,
    slot: CompletionSlot,
    inflight: Option<Arc<Mutex<HashMap<RequestHandle, Inflight>>>>,
}

impl Completion {
    #[cfg(test)]
    pub(crate) fn for_tests(receiver: ResponseReceiver) -> Self {
        Self {
            handle: RequestHandle::new(0),
            slot: CompletionSlot::new(receiver),
            inflight: None,
        }
    }

    pub fn complete(&self, response: Response) {
        if let Some(inflight) = &self.inflight {
            inflight.lock().unwrap().remove(&self.handle);
        }
        if !self.slot.complete(response) {
            warn!(handle = %self.handle, "completion after terminal state dropped");
        }
    }
}

/// Receiver storage guaranteeing exactly-once delivery.
#[derive(Clone)]
struct CompletionSlot {
    receiver: Arc<Mutex<Option<ResponseReceiver>>>,
}

impl CompletionSlot {
    fn new(receiver: ResponseReceiver) -> Self {
        Self {
            receiver: Arc::new(Mutex::new(Some(receiver))),
        }
    }

    /// Delivers `response` if nothing has been delivered yet. Returns
    /// whether this call won the delivery.
    fn complete(&self, response: Response) -> bool {
        let receiver = self.receiver.lock().unwrap().take();
        match receiver {
            Some(receiver) => {
                receiver(response);
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Owner {
    /// Submitted, not yet offered to the handlers. Nothing to forward a
    /// cancel to yet.
    Routing,
    /// Claimed by a registered plugin handler.
    Plugin,
    /// Forwarded to the backend service.
    Service,
}

struct Inflight {
    slot: CompletionSlot,
    owner: Owner,
}

/// Routes requests to registered plugin handlers or the backend service and
/// tracks in-flight handles for cancellation.
pub struct Dispatcher {
    service: Arc<dyn ToolingService>,
    registry: Arc<PluginRegistry>,
    inflight: Arc<Mutex<HashMap<RequestHandle, Inflight>>>,
    handle_seq: AtomicU64,
}

impl Dispatcher {
    pub fn new(service: Arc<dyn ToolingService>, registry: Arc<PluginRegistry>) -> Self {
        Self {
            service,
            registry,
            inflight: Arc::new(Mutex::new(HashMap::new())),
            handle_seq: AtomicU64::new(0),
        }
    }

    /// Generates a process-unique handle value for the next submission.
    /// Callers may also mint their own values, as long as a value is not
    /// reused while its prior request is in flight.
    pub fn fresh_handle(&self) -> RequestHandle {
        RequestHandle::new(self.handle_seq.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Blocks until a response is produced. Synchronous requests are offered
    /// to the plugin handlers first, like asynchronous ones, but carry no
    /// cancellable bookkeeping.
    pub fn send_sync(&self, request: &Request) -> Response {
        let shared = Arc::new(request.clone());
        let handle = self.fresh_handle();

        let (tx, rx) = std::sync::mpsc::channel();
        let completion = Completion {
            handle,
            slot: CompletionSlot::new(Box::new(move |response| {
                let _ = tx.send(response);
            })),
            inflight: None,
        };

        if self.registry.offer_request(&shared, handle, completion) {
            debug!(%handle, "synchronous request claimed by plugin");
            // A dropped completion closes the channel; surface that as a
            // failure instead of hanging the caller.
            return rx.recv().unwrap_or_else(|_| {
                Response::failed("plugin dropped the completion without responding")
            });
        }

        self.service.send_request_sync(request)
    }

    /// Returns immediately. `receiver` is invoked exactly once with the
    /// final response, on an unspecified execution context.
    pub fn send_async(&self, request: Request, handle: RequestHandle, receiver: ResponseReceiver) {
        let shared = Arc::new(request);
        let slot = CompletionSlot::new(receiver);

        self.inflight.lock().unwrap().insert(
            handle,
            Inflight {
                slot: slot.clone(),
                owner: Owner::Routing,
            },
        );
        debug!(%handle, "request submitted");

        let completion = Completion {
            handle,
            slot: slot.clone(),
            inflight: Some(self.inflight.clone()),
        };

        if self.registry.offer_request(&shared, handle, completion) {
            debug!(%handle, "request claimed by plugin");
            if let Some(entry) = self.inflight.lock().unwrap().get_mut(&handle) {
                entry.owner = Owner::Plugin;
            }
            return;
        }

        // Claim the service route, unless a cancel won the race while the
        // handlers were being consulted; the terminal response is already
        // delivered then and the service must never see the handle.
        match self.inflight.lock().unwrap().get_mut(&handle) {
            Some(entry) => entry.owner = Owner::Service,
            None => {
                debug!(%handle, "request cancelled while routing");
                return;
            }
        }

        debug!(%handle, "request forwarded to service");
        let service_completion = Completion {
            handle,
            slot,
            inflight: Some(self.inflight.clone()),
        };
        self.service.send_request(
            shared,
            handle,
            Box::new(move |response| service_completion.complete(response)),
        );
    }

    /// Best-effort cancellation. A no-op for unknown handles and for
    /// requests that already reached a terminal state; only the first call
    /// for a live handle has effect.
    ///
    /// Policy: cancellation delivers the `RequestCancelled` terminal
    /// response immediately, so the receiver is guaranteed exactly one
    /// invocation even if the backend never acknowledges. A completion that
    /// later arrives from the backend for this handle is dropped.
    pub fn cancel(&self, handle: RequestHandle) {
        let entry = self.inflight.lock().unwrap().remove(&handle);
        let Some(entry) = entry else {
            debug!(%handle, "cancel for unknown or completed request");
            return;
        };

        debug!(%handle, "cancelling request");

        // Observers hear about every cancellation, including requests the
        // plugin never claimed; they ignore handles they don't recognize.
        self.registry.notify_cancellation(handle);

        if entry.owner == Owner::Service {
            self.service.cancel_request(handle);
        }

        entry.slot.complete(Response::cancelled());
    }

    /// Installs the process-wide notification path on the backend service.
    pub fn set_notification_handler(&self, handler: Option<NotificationHandler>) {
        self.service.set_notification_handler(handler);
    }

    /// Installs identifier bridging on the backend. In-process services
    /// ignore this: the shared table already is their namespace.
    pub fn set_uid_handlers(&self, handlers: UidHandlers) {
        self.service.set_uid_handlers(handlers);
    }

    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_handles_are_unique_and_nonzero() {
        let registry = Arc::new(PluginRegistry::new(Default::default()));
        let service = Arc::new(crate::dispatch::service::InProcessService::new(Arc::new(
            crate::dispatch::service::EchoLogic,
        ))
        .unwrap());
        let dispatcher = Dispatcher::new(service, registry);

        let a = dispatcher.fresh_handle();
        let b = dispatcher.fresh_handle();
        assert_ne!(a, b);
        assert_ne!(a.raw(), 0);
    }

    #[test]
    fn completion_slot_delivers_once() {
        let (tx, rx) = std::sync::mpsc::channel();
        let slot = CompletionSlot::new(Box::new(move |response: Response| {
            let _ = tx.send(response);
        }));

        assert!(slot.complete(Response::cancelled()));
        assert!(!slot.complete(Response::failed("late")));

        let delivered = rx.try_recv().unwrap();
        assert_eq!(
            delivered.error_kind(),
            Some(crate::protocol::ErrorKind::RequestCancelled)
        );
        assert!(rx.try_recv().is_err());
    }
}
