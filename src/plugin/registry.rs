use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use crate::dispatch::{Completion, RequestHandle};
use crate::plugin::PluginHostInfo;
use crate::protocol::{CustomBufferKind, Request, VariantFuncs};

/// Decides whether to claim a request. Returning `true` claims it; the
/// handler then owns producing exactly one response through the
/// [`Completion`]. Returning `false` declines, and the request falls
/// through to the next handler or the backend service.
pub type CancellableRequestHandler =
    Box<dyn Fn(&Arc<Request>, RequestHandle, Completion) -> bool + Send + Sync + 'static>;

/// Observes every cancellation, claimed or not. Observers ignore handles
/// they don't recognize.
pub type CancellationObserver = Box<dyn Fn(RequestHandle) + Send + Sync + 'static>;

/// Registration surface handed to plugins at initialization.
///
/// Handlers are consulted in registration order and the first claimer
/// wins. Registrations are expected during startup; both lists are behind
/// read-write locks so late registration is safe, just unusual.
pub struct PluginRegistry {
    host_info: PluginHostInfo,
    handlers: RwLock<Vec<CancellableRequestHandler>>,
    observers: RwLock<Vec<CancellationObserver>>,
}

impl PluginRegistry {
    pub fn new(host_info: PluginHostInfo) -> Self {
        Self {
            host_info,
            handlers: RwLock::new(Vec::new()),
            observers: RwLock::new(Vec::new()),
        }
    }

    pub fn host_info(&self) -> PluginHostInfo {
        self.host_info
    }

    pub fn register_cancellable_request_handler(&self, handler: CancellableRequestHandler) {
        self.handlers.write().unwrap().push(handler);
    }

    pub fn register_cancellation_observer(&self, observer: CancellationObserver) {
        self.observers.write().unwrap().push(observer);
    }

    /// Publishes an accessor table for `kind`. Plugins must use kinds at or
    /// above [`PluginHostInfo::custom_buffer_start`]; lower values are
    /// accepted but logged, since they can collide with the host's own
    /// buffers.
    pub fn register_custom_buffer(&self, kind: CustomBufferKind, funcs: VariantFuncs) {
        if kind.raw() < self.host_info.custom_buffer_start {
            warn!(
                kind = kind.raw(),
                reserved_below = self.host_info.custom_buffer_start,
                "custom buffer kind lies in the host-reserved range"
            );
        }
        crate::protocol::variant::register_custom_buffer_funcs(kind, funcs);
    }

    /// Offers `request` to each handler in registration order. Returns
    /// whether any handler claimed it.
    pub(crate) fn offer_request(
        &self,
        request: &Arc<Request>,
        handle: RequestHandle,
        completion: Completion,
    ) -> bool {
        let handlers = self.handlers.read().unwrap();
        for (index, handler) in handlers.iter().enumerate() {
            if handler(request, handle, completion.clone()) {
                debug!(%handle, handler = index, "request claimed");
                return true;
            }
        }
        false
    }

    pub(crate) fn notify_cancellation(&self, handle: RequestHandle) {
        for observer in self.observers.read().unwrap().iter() {
            observer(handle);
        }
    }
}
