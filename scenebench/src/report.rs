//! Writes comparison results into report files
//!
//! Results are written to disk as JSON lines: a single run header followed by
//! one line per scene that produced a complete sample series. External
//! plotters and reporters read this file; scenebench itself never charts or
//! prints results.

use std::{
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use scenebench_capture::json;
use tracing::debug;

/// Errors produced by [`Writer`]
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Wrapper around [`std::io::Error`].
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Wrapper around [`serde_json::Error`].
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug)]
/// Writes a run's report file, one JSON object per line.
pub struct Writer {
    fp: BufWriter<std::fs::File>,
    path: PathBuf,
    scenes_recorded: usize,
}

impl Writer {
    /// Create the report file and write the run [`json::Header`] as its
    /// first line.
    ///
    /// # Errors
    ///
    /// Function will return an error if the report file cannot be created or
    /// written.
    pub fn create(path: &Path, header: &json::Header) -> Result<Self, Error> {
        let fp = std::fs::File::create(path)?;
        let mut writer = Self {
            fp: BufWriter::new(fp),
            path: path.to_path_buf(),
            scenes_recorded: 0,
        };
        writer.record(header)?;
        Ok(writer)
    }

    /// Append one scene's results to the report.
    ///
    /// # Errors
    ///
    /// Function will return an error if the line cannot be serialized or
    /// written.
    pub fn record_scene(&mut self, line: &json::SceneLine) -> Result<(), Error> {
        debug!(
            "recording scene {legend} to {path}",
            legend = line.legend(),
            path = self.path.display()
        );
        self.record(line)?;
        self.scenes_recorded += 1;
        Ok(())
    }

    /// Number of scene lines written so far.
    #[must_use]
    pub fn scenes_recorded(&self) -> usize {
        self.scenes_recorded
    }

    fn record<T: serde::Serialize>(&mut self, value: &T) -> Result<(), Error> {
        let pyld = serde_json::to_string(value)?;
        self.fp.write_all(pyld.as_bytes())?;
        self.fp.write_all(b"\n")?;
        self.fp.flush()?;
        Ok(())
    }
}
