//! Backend service boundary.
//!
//! A [`ToolingService`] is the five-entry-point surface the dispatcher
//! adapts over: synchronous send, asynchronous send, cancel, the
//! process-wide notification path, and identifier bridging. The crate ships
//! [`InProcessService`], which hosts a [`ServiceLogic`] on its own tokio
//! runtime; out-of-process transports implement the same trait.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::cancel::CancellationToken;
use crate::config;
use crate::dispatch::handle::RequestHandle;
use crate::protocol::{Request, Response};
use crate::uid::Uid;

/// Invoked exactly once with the final response of an asynchronous request,
/// on whatever execution context the backend completes on.
pub type ResponseReceiver = Box<dyn FnOnce(Response) + Send + 'static>;

/// Process-wide notification path. Transport-level failures
/// (`ConnectionInterrupted`) arrive here, never at a request receiver.
pub type NotificationHandler = Box<dyn Fn(Response) + Send + Sync + 'static>;

/// Identifier bridging for services whose identifier namespace is not the
/// in-process table. In-process services leave both sides `None`: the
/// shared table already is the canonical namespace.
#[derive(Default)]
pub struct UidHandlers {
    pub uid_from_str: Option<Box<dyn Fn(&str) -> Option<Uid> + Send + Sync>>,
    pub str_from_uid: Option<Box<dyn Fn(Uid) -> Option<String> + Send + Sync>>,
}

/// The backend service surface the dispatcher is a thin adapter over.
pub trait ToolingService: Send + Sync {
    /// Blocks the calling context until a response is produced. No handle is
    /// involved; a synchronous request cannot be cancelled.
    fn send_request_sync(&self, request: &Request) -> Response;

    /// Returns immediately; `receiver` is invoked exactly once with the
    /// final response.
    fn send_request(&self, request: Arc<Request>, handle: RequestHandle, receiver: ResponseReceiver);

    /// Best-effort: asks the backend to stop work on `handle`. There is no
    /// bound on how quickly in-flight work stops.
    fn cancel_request(&self, handle: RequestHandle);

    fn set_notification_handler(&self, handler: Option<NotificationHandler>);

    fn set_uid_handlers(&self, _handlers: UidHandlers) {}
}

/// Request evaluation logic hosted by an [`InProcessService`].
#[async_trait]
pub trait ServiceLogic: Send + Sync {
    async fn evaluate(&self, request: &Request, token: &CancellationToken) -> Response;
}

/// Hosts a [`ServiceLogic`] on a dedicated multi-thread tokio runtime.
pub struct InProcessService {
    logic: Arc<dyn ServiceLogic>,
    runtime: tokio::runtime::Runtime,
    inflight: Arc<Mutex<HashMap<RequestHandle, CancellationToken>>>,
    notification_handler: Arc<Mutex<Option<NotificationHandler>>>,
}

impl InProcessService {
    pub fn new(logic: Arc<dyn ServiceLogic>) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(config::DEFAULT_SERVICE_THREADS)
            .thread_name("idekitd-service")
            .enable_all()
            .build()?;

        info!("in-process service started");

        Ok(Self {
            logic,
            runtime,
            inflight: Arc::new(Mutex::new(HashMap::new())),
            notification_handler: Arc::new(Mutex::new(None)),
        })
    }

    /// Reports a transport-level interruption on the notification path.
    /// In-process hosts have no transport to lose, but embedders of remote
    /// services reuse this to fan the event out.
    pub fn notify_connection_interrupted(&self) {
        let handler = self.notification_handler.lock().unwrap();
        match &*handler {
            Some(handler) => handler(Response::interrupted()),
            None => debug!("connection interrupted with no notification handler installed"),
        }
    }
}

impl ToolingService for InProcessService {
    fn send_request_sync(&self, request: &Request) -> Response {
        let (tx, rx) = std::sync::mpsc::channel();
        let logic = self.logic.clone();
        let request = request.clone();
        let token = CancellationToken::new();

        self.runtime.spawn(async move {
            let response = logic.evaluate(&request, &token).await;
            let _ = tx.send(response);
        });

        rx.recv().unwrap_or_else(|_| {
            error!("service worker dropped without replying");
            Response::failed("service worker dropped without replying")
        })
    }

    fn send_request(
        &self,
        request: Arc<Request>,
        handle: RequestHandle,
        receiver: ResponseReceiver,
    ) {
        let token = CancellationToken::new();
        self.inflight.lock().unwrap().insert(handle, token.clone());

        let logic = self.logic.clone();
        let inflight = self.inflight.clone();

        self.runtime.spawn(async move {
            let response = logic.evaluate(&request, &token).await;
            inflight.lock().unwrap().remove(&handle);
            receiver(response);
        });
    }

    fn cancel_request(&self, handle: RequestHandle) {
        let token = self.inflight.lock().unwrap().get(&handle).cloned();
        match token {
            Some(token) => {
                debug!(%handle, "cancelling in-flight service request");
                token.cancel();
            }
            None => debug!(%handle, "cancel for unknown or finished request"),
        }
    }

    fn set_notification_handler(&self, handler: Option<NotificationHandler>) {
        *self.notification_handler.lock().unwrap() = handler;
    }
}

/// Default built-in handling: echoes the request tree back as the response
/// payload. Doubles as the reference backend for tests and the CLI.
pub struct EchoLogic;

#[async_trait]
impl ServiceLogic for EchoLogic {
    async fn evaluate(&self, request: &Request, token: &CancellationToken) -> Response {
        if token.is_cancelled() {
            return Response::cancelled();
        }
        Response::from_value(request.as_value().clone())
    }
}
