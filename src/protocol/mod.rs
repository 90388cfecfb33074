//! Protocol layer
//! - error.rs: error taxonomy (ErrorKind, BuildError)
//! - value.rs: owned value tree backing requests and responses
//! - variant.rs: read-only tagged view + custom buffer accessor dispatch
//! - request.rs: mutable request builder
//! - response.rs: immutable response and its builder

pub mod error;
pub mod request;
pub mod response;
pub mod value;
pub mod variant;

pub use error::{BuildError, ErrorKind};
pub use request::Request;
pub use response::{Response, ResponseBuilder};
pub use value::Value;
pub use variant::{CustomBuffer, CustomBufferKind, Variant, VariantFuncs, VariantType};
