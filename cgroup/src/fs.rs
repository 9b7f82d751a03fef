//! cgroup v2 filesystem backend.
//!
//! Reads `memory.current`, `memory.pressure` and `memory.stat` and writes
//! `memory.reclaim` under one cgroup directory. Every call opens the file
//! afresh; nothing is cached between ticks.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::errors::CgroupError;
use crate::model::{CounterSnapshot, PressureStats};
use crate::parse::{parse_counter_snapshot, parse_pressure_some, parse_usage};
use crate::source::{ReclaimSink, StatSource};

const MEMORY_CURRENT: &str = "memory.current";
const MEMORY_PRESSURE: &str = "memory.pressure";
const MEMORY_STAT: &str = "memory.stat";
const MEMORY_RECLAIM: &str = "memory.reclaim";

#[derive(Debug, Clone)]
pub struct CgroupFs {
    root: PathBuf,
}

impl CgroupFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full `some` line of `memory.pressure`.
    pub async fn pressure_stats(&self) -> Result<PressureStats, CgroupError> {
        let path = self.root.join(MEMORY_PRESSURE);
        let content = read(&path).await?;

        let stats = parse_pressure_some(content.as_bytes())
            .ok_or_else(|| CgroupError::MissingPressure { path: path.clone() })?;

        if !stats.avg10.is_finite() || stats.avg10 < 0.0 {
            return Err(CgroupError::InvalidPressure {
                path,
                value: stats.avg10,
            });
        }

        debug!(
            avg10 = stats.avg10,
            avg60 = stats.avg60,
            avg300 = stats.avg300,
            total = stats.total,
            "pressure sampled"
        );

        Ok(stats)
    }
}

async fn read(path: &Path) -> Result<String, CgroupError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CgroupError::io(path, e))
}

#[async_trait]
impl StatSource for CgroupFs {
    async fn current_usage(&self) -> Result<u64, CgroupError> {
        let path = self.root.join(MEMORY_CURRENT);
        let content = read(&path).await?;

        parse_usage(content.as_bytes()).ok_or_else(|| CgroupError::Parse {
            path,
            detail: format!("expected a byte count, got {:?}", content.trim()),
        })
    }

    async fn pressure_some(&self) -> Result<f64, CgroupError> {
        Ok(self.pressure_stats().await?.avg10)
    }

    async fn counter_snapshot(&self) -> Result<CounterSnapshot, CgroupError> {
        let path = self.root.join(MEMORY_STAT);
        let content = read(&path).await?;
        let snap = parse_counter_snapshot(content.as_bytes());

        debug!(pswpin = snap.pswpin, pswpout = snap.pswpout, "swap counters");

        Ok(snap)
    }
}

#[async_trait]
impl ReclaimSink for CgroupFs {
    #[instrument(skip(self), fields(root = %self.root.display()), level = "debug")]
    async fn request_reclaim(&self, bytes: u64) -> Result<(), CgroupError> {
        let path = self.root.join(MEMORY_RECLAIM);
        tokio::fs::write(&path, bytes.to_string())
            .await
            .map_err(|e| CgroupError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    fn domain_with(files: &[(&str, &str)]) -> (tempfile::TempDir, CgroupFs) {
        let dir = tempdir().unwrap();
        for (name, content) in files {
            fs::write(dir.path().join(name), content).unwrap();
        }
        let cg = CgroupFs::new(dir.path());
        (dir, cg)
    }

    #[tokio::test]
    async fn reads_usage_pressure_and_counters() {
        let (_dir, cg) = domain_with(&[
            (MEMORY_CURRENT, "209715200\n"),
            (
                MEMORY_PRESSURE,
                "some avg10=0.05 avg60=0.02 avg300=0.00 total=4242\nfull avg10=0.00 avg60=0.00 avg300=0.00 total=0\n",
            ),
            (MEMORY_STAT, "pgscan 10\npgsteal 9\nworkingset_activate_file 1\n"),
        ]);

        assert_eq!(cg.current_usage().await.unwrap(), 209_715_200);
        assert_eq!(cg.pressure_some().await.unwrap(), 0.05);

        let snap = cg.counter_snapshot().await.unwrap();
        assert_eq!(snap.pgscan, 10);
        assert_eq!(snap.pgsteal, 9);
        assert_eq!(snap.refault_file, 1);
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let (_dir, cg) = domain_with(&[]);

        let err = cg.current_usage().await.unwrap_err();
        assert!(matches!(err, CgroupError::Io { .. }));
    }

    #[tokio::test]
    async fn unparseable_usage_is_parse_error() {
        let (_dir, cg) = domain_with(&[(MEMORY_CURRENT, "lots\n")]);

        let err = cg.current_usage().await.unwrap_err();
        assert!(matches!(err, CgroupError::Parse { .. }));
    }

    #[tokio::test]
    async fn pressure_without_some_line_is_missing() {
        let (_dir, cg) = domain_with(&[(
            MEMORY_PRESSURE,
            "full avg10=0.00 avg60=0.00 avg300=0.00 total=0\n",
        )]);

        let err = cg.pressure_some().await.unwrap_err();
        assert!(matches!(err, CgroupError::MissingPressure { .. }));
    }

    #[tokio::test]
    async fn negative_pressure_is_rejected() {
        let (_dir, cg) = domain_with(&[(
            MEMORY_PRESSURE,
            "some avg10=-1.00 avg60=0.00 avg300=0.00 total=0\n",
        )]);

        let err = cg.pressure_some().await.unwrap_err();
        assert!(matches!(err, CgroupError::InvalidPressure { value, .. } if value == -1.0));
    }

    #[tokio::test]
    async fn reclaim_writes_decimal_bytes() {
        let (dir, cg) = domain_with(&[(MEMORY_RECLAIM, "")]);

        cg.request_reclaim(4_194_304).await.unwrap();

        let written = fs::read_to_string(dir.path().join(MEMORY_RECLAIM)).unwrap();
        assert_eq!(written, "4194304");
    }

    #[tokio::test]
    async fn reclaim_into_missing_domain_fails() {
        let cg = CgroupFs::new("/nonexistent/cgroup/for/tests");

        let err = cg.request_reclaim(4096).await.unwrap_err();
        assert!(matches!(err, CgroupError::Io { .. }));
    }
}
