//! Dispatch layer
//! - handle.rs: caller-chosen request handles
//! - service.rs: backend service boundary + in-process host
//! - dispatcher.rs: submission, plugin interception, cancellation

pub mod dispatcher;
pub mod handle;
pub mod service;

pub use dispatcher::{Completion, Dispatcher};
pub use handle::RequestHandle;
pub use service::{
    EchoLogic, InProcessService, NotificationHandler, ResponseReceiver, ServiceLogic,
    ToolingService, UidHandlers,
};
