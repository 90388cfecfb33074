//! Request handles.

/// Opaque token identifying one in-flight asynchronous request.
///
/// The handle value is chosen by the *caller* before submission (the
/// dispatcher offers an atomic generator, see
/// [`Dispatcher::fresh_handle`](crate::dispatch::Dispatcher::fresh_handle)).
/// A handle is valid from submission until the completion receiver has
/// returned; reusing a value is only valid after the prior request using it
/// reached a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestHandle(u64);

impl RequestHandle {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RequestHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
