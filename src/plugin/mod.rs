//! Extension points for in-process plugins.
//!
//! - [`PluginRegistry`]: request handlers, cancellation observers, and
//!   custom buffer registration
//! - [`PluginHostInfo`]: what the host tells a plugin at initialization

mod registry;

pub use registry::{CancellableRequestHandler, CancellationObserver, PluginRegistry};

/// Facts the host hands each plugin when it initializes.
#[derive(Debug, Clone, Copy)]
pub struct PluginHostInfo {
    /// True when the host is a client-side front end with no backend
    /// service of its own. Plugins typically only register request
    /// handlers on the service side.
    pub client_only: bool,
    /// First custom buffer kind value reserved for plugins. Kinds below
    /// this value belong to the host.
    pub custom_buffer_start: u64,
}

impl Default for PluginHostInfo {
    fn default() -> Self {
        Self {
            client_only: false,
            custom_buffer_start: crate::config::DEFAULT_CUSTOM_BUFFER_START,
        }
    }
}
