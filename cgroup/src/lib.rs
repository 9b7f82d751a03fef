//! Access to a single cgroup v2 memory domain.
//!
//! The controller only sees the [`StatSource`] and [`ReclaimSink`] traits;
//! [`CgroupFs`] is the implementation backed by the cgroup pseudo-files.

pub mod errors;
pub mod fs;
pub mod model;
pub mod parse;
pub mod source;

pub use errors::CgroupError;
pub use fs::CgroupFs;
pub use model::{CounterSnapshot, PressureStats};
pub use source::{ReclaimSink, StatSource};
