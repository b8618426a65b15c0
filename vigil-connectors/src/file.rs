//! File replay transport

use std::fs::File;
use std::path::PathBuf;

use log::info;

use crate::{ConnectorError, ConnectorResult, LineStream, TransportStream};

/// Recorded capture to replay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileConfig {
    /// Capture path
    pub path: PathBuf,
}

/// Open a capture for replay
pub fn open(config: &FileConfig) -> ConnectorResult<TransportStream> {
    let file = File::open(&config.path).map_err(|source| ConnectorError::Io {
        target: config.path.display().to_string(),
        source,
    })?;
    info!("Replaying capture {}", config.path.display());
    Ok(LineStream::new(file).boxed())
}
