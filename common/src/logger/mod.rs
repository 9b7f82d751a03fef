//! Process-wide tracing bootstrap and the span helpers shared by the
//! controller and the binary.

mod init;
mod span;
mod trace_id;

pub use init::{LogOptions, init_logger};
pub use span::{child_span, root_span};
pub use trace_id::TraceId;
