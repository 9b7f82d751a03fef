use std::fmt;

use uuid::Uuid;

/// Correlation ID attached to every event of one controller run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceId(Uuid);

impl Default for TraceId {
    fn default() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.as_hyphenated(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_differ_and_render_hyphenated() {
        let a = TraceId::default();
        let b = TraceId::default();
        assert_ne!(a, b);
        assert_eq!(a.to_string().len(), 36);
        assert_eq!(Uuid::parse_str(&a.to_string()).unwrap(), a.0);
    }
}
