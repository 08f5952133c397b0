//! Trial tables on disk
//!
//! Features:
//! - One file per valid trial, named by trial number, midpoint and step count
//! - CSV rows keyed by ball id (initial features, midpoint features, labels)
//! - Pretty JSON of the full table, including final-state records

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::PersistError;
use crate::settings::OutputFormat;
use crate::sim::TrialTable;

/// File name for trial `number` of `steps` steps
pub fn trial_file_name(number: usize, steps: u32, format: OutputFormat) -> String {
    format!(
        "trial_{number}_mtime_{}_time_{steps}.{}",
        steps / 2,
        format.extension()
    )
}

/// Write a trial table as CSV: header, then one row per ball in id order
pub fn write_csv<W: Write>(mut writer: W, table: &TrialTable) -> Result<(), PersistError> {
    writeln!(writer, "{}", TrialTable::header().join(","))?;
    for row in &table.rows {
        let mut fields = vec![row.id.to_string()];
        fields.extend(row.initial.values().iter().map(f64::to_string));
        fields.extend(row.midpoint.values().iter().map(f64::to_string));
        let label = row.label();
        fields.push(label.x.to_string());
        fields.push(label.y.to_string());
        writeln!(writer, "{}", fields.join(","))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write a trial table as pretty-printed JSON
pub fn write_json<W: Write>(mut writer: W, table: &TrialTable) -> Result<(), PersistError> {
    serde_json::to_writer_pretty(&mut writer, table)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Directory receiving one file per trial
#[derive(Debug, Clone)]
pub struct OutputDir {
    root: PathBuf,
}

impl OutputDir {
    /// Create the directory (and parents) if missing
    pub fn create(root: impl Into<PathBuf>) -> Result<Self, PersistError> {
        let root = root.into();
        if !root.exists() {
            fs::create_dir_all(&root).map_err(|source| PersistError::Io {
                path: root.clone(),
                source,
            })?;
            log::info!("Created output directory {}", root.display());
        }
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Write one trial table, returning the file path
    pub fn save(
        &self,
        number: usize,
        table: &TrialTable,
        format: OutputFormat,
    ) -> Result<PathBuf, PersistError> {
        let path = self
            .root
            .join(trial_file_name(number, table.step_limit, format));
        let file = File::create(&path).map_err(|source| PersistError::Io {
            path: path.clone(),
            source,
        })?;
        let writer = BufWriter::new(file);
        match format {
            OutputFormat::Csv => write_csv(writer, table)?,
            OutputFormat::Json => write_json(writer, table)?,
        }
        log::debug!("Wrote {}", path.display());
        Ok(path)
    }
}
