use std::{
    fs,
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::{
    admission::{ports::FailureSink, types::FailureRecord},
    kernel::{KernelError, error::persistence_error},
};

/// JSON-lines failure log; one object per FAILURE evaluation.
#[derive(Debug, Clone)]
pub struct JsonlFailureLog {
    path: PathBuf,
}

impl JsonlFailureLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read_records(&self) -> Result<Vec<FailureRecord>, KernelError> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(persistence_error(format!(
                    "failed to open failure log '{}': {err}",
                    self.path.display()
                )));
            }
        };

        let mut records = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|err| {
                persistence_error(format!(
                    "failed to read failure log '{}': {err}",
                    self.path.display()
                ))
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line).map_err(|err| {
                persistence_error(format!(
                    "failed to parse line {} of failure log '{}': {err}",
                    index + 1,
                    self.path.display()
                ))
            })?;
            records.push(record);
        }
        Ok(records)
    }
}

impl FailureSink for JsonlFailureLog {
    fn append(&self, record: &FailureRecord) -> Result<(), KernelError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|err| {
                persistence_error(format!(
                    "failed to create failure log directory '{}': {err}",
                    parent.display()
                ))
            })?;
        }

        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|err| {
                persistence_error(format!(
                    "failed to open failure log '{}': {err}",
                    self.path.display()
                ))
            })?;

        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, record).map_err(|err| {
            persistence_error(format!(
                "failed to serialize failure record for '{}': {err}",
                self.path.display()
            ))
        })?;
        writer.write_all(b"\n").map_err(|err| {
            persistence_error(format!(
                "failed to finalize failure record in '{}': {err}",
                self.path.display()
            ))
        })?;
        writer.flush().map_err(|err| {
            persistence_error(format!(
                "failed to flush failure log '{}': {err}",
                self.path.display()
            ))
        })?;

        Ok(())
    }
}
