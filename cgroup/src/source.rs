use async_trait::async_trait;

use crate::errors::CgroupError;
use crate::model::CounterSnapshot;

/// Read side of a memory domain.
#[async_trait]
pub trait StatSource: Send + Sync {
    /// Current memory usage in bytes.
    async fn current_usage(&self) -> Result<u64, CgroupError>;

    /// Short-window "some" pressure. Implementations return an error
    /// instead of a negative sentinel; a returned value is always finite
    /// and `>= 0`.
    async fn pressure_some(&self) -> Result<f64, CgroupError>;

    async fn counter_snapshot(&self) -> Result<CounterSnapshot, CgroupError>;
}

/// Write side of a memory domain.
#[async_trait]
pub trait ReclaimSink: Send + Sync {
    /// Ask the kernel to reclaim `bytes` from the domain.
    async fn request_reclaim(&self, bytes: u64) -> Result<(), CgroupError>;
}
