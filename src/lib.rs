//! Tagged-value protocol and cancellable request dispatch for IDE tooling
//! services.
//!
//! - [`uid`]: process-global identifier interning
//! - [`protocol`]: the value tree, tagged read-only views, custom buffers,
//!   requests, responses
//! - [`parser`]: YAML text to request values
//! - [`dispatch`]: synchronous and cancellable asynchronous submission
//! - [`plugin`]: in-process extension registry
//! - [`completion`]: code-completion overlay conventions

pub mod cancel;
pub mod completion;
pub mod config;
pub mod dispatch;
pub mod log;
pub mod parser;
pub mod plugin;
pub mod protocol;
pub mod uid;

pub use cancel::CancellationToken;
pub use dispatch::{Dispatcher, InProcessService, RequestHandle, ServiceLogic, ToolingService};
pub use plugin::{PluginHostInfo, PluginRegistry};
pub use protocol::{Request, Response, Value, Variant};
pub use uid::{Uid, uid};
