use cgroup::CgroupError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to read {what}: {source}")]
    ReadFailure {
        what: &'static str,
        #[source]
        source: CgroupError,
    },

    #[error("reclaim of {bytes} bytes failed: {source}")]
    ReclaimFailure {
        bytes: u64,
        #[source]
        source: CgroupError,
    },
}
