//! Feedback controller for proactive memory reclaim in one cgroup.
//!
//! Each tick flows one way:
//! `StatSource -> estimator -> damper -> policy -> ReclaimSink`,
//! driven by [`engine::ControlLoop`].

pub mod config;
pub mod damper;
pub mod engine;
pub mod error;
pub mod estimator;
pub mod metrics;
pub mod policy;
pub mod state;
pub mod types;

pub use config::{ConfigError, ControllerConfig, load_config};
pub use engine::ControlLoop;
pub use error::ControllerError;
pub use types::{Decision, TickOutcome};
