use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CgroupError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {detail}")]
    Parse { path: PathBuf, detail: String },

    #[error("no `some` line in {path}")]
    MissingPressure { path: PathBuf },

    #[error("invalid pressure value {value} in {path}")]
    InvalidPressure { path: PathBuf, value: f64 },
}

impl CgroupError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
