use tracing::{Span, field};

use super::TraceId;

/// Root span for one controller run. `domain` is the cgroup being managed.
pub fn root_span(name: &'static str, trace_id: &TraceId, domain: &str) -> Span {
    tracing::info_span!(
        "root",
        name = %name,
        trace_id = %trace_id,
        domain = %domain,
        ticks = field::Empty
    )
}

/// Child span (inherits trace_id and domain from the current root).
pub fn child_span(name: &'static str) -> Span {
    tracing::debug_span!("child", name = %name)
}
