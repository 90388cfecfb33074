//! Shared plumbing for the E2E tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::time::Duration;

use async_trait::async_trait;

use idekitd::cancel::CancellationToken;
use idekitd::dispatch::{Dispatcher, EchoLogic, InProcessService, ResponseReceiver, ServiceLogic};
use idekitd::plugin::{PluginHostInfo, PluginRegistry};
use idekitd::protocol::{Request, Response, Value};
use idekitd::uid::{Uid, uid};

pub const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Dispatcher over the echo backend with an empty plugin registry.
pub fn echo_dispatcher() -> Dispatcher {
    dispatcher_with(Arc::new(EchoLogic))
}

pub fn dispatcher_with(logic: Arc<dyn ServiceLogic>) -> Dispatcher {
    let service = Arc::new(InProcessService::new(logic).expect("runtime should start"));
    let registry = Arc::new(PluginRegistry::new(PluginHostInfo::default()));
    Dispatcher::new(service, registry)
}

/// One-entry dictionary request keyed by an interned identifier.
pub fn dictionary_request(key: &str, value: impl Into<Value>) -> Request {
    Request::dictionary([(uid(key), value.into())])
}

/// A receiver that forwards the response into a channel, plus the channel's
/// reading end.
pub fn response_channel() -> (ResponseReceiver, Receiver<Response>) {
    let (tx, rx) = channel();
    let receiver: ResponseReceiver = Box::new(move |response| {
        let _ = tx.send(response);
    });
    (receiver, rx)
}

pub fn recv_response(rx: &Receiver<Response>) -> Response {
    rx.recv_timeout(RECV_TIMEOUT)
        .expect("a response should arrive")
}

pub fn assert_no_response(rx: &Receiver<Response>) {
    assert!(
        rx.recv_timeout(Duration::from_millis(200)).is_err(),
        "no further response should arrive"
    );
}

/// Logic that spins until its cancellation token fires, to keep a request
/// in flight for as long as a test needs.
pub struct StallLogic {
    pub started: Arc<AtomicUsize>,
}

impl StallLogic {
    pub fn new() -> Self {
        Self {
            started: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl ServiceLogic for StallLogic {
    async fn evaluate(&self, _request: &Request, token: &CancellationToken) -> Response {
        self.started.fetch_add(1, Ordering::SeqCst);
        while !token.is_cancelled() {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        Response::cancelled()
    }
}

/// Echo logic that counts how many requests reached it.
pub struct CountingLogic {
    pub evaluations: Arc<AtomicUsize>,
}

impl CountingLogic {
    pub fn new() -> Self {
        Self {
            evaluations: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl ServiceLogic for CountingLogic {
    async fn evaluate(&self, request: &Request, _token: &CancellationToken) -> Response {
        self.evaluations.fetch_add(1, Ordering::SeqCst);
        Response::from_value(request.as_value().clone())
    }
}

/// Collects cancellation notifications from an observer registration.
pub fn observed_handles(registry: &PluginRegistry) -> Receiver<idekitd::dispatch::RequestHandle> {
    let (tx, rx): (Sender<idekitd::dispatch::RequestHandle>, _) = channel();
    registry.register_cancellation_observer(Box::new(move |handle| {
        let _ = tx.send(handle);
    }));
    rx
}

pub fn interned(s: &str) -> Uid {
    uid(s)
}
