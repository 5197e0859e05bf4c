//! Saving the scan history to disk.

use crate::error::ExportError;
use crate::history::Snapshot;
use lidar_data::ScanFrame;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Supported export file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// One array of 360-integer arrays.
    Json,
    /// One row of 360 integers per frame, no header.
    Csv,
}

impl ExportFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    /// Detects the format from a file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ExportError> {
        let path = path.as_ref();
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| ExportError::UnknownFormat(path.to_path_buf()))
    }
}

/// Writes `snapshot` to `path`.
///
/// The data goes to a temporary file next to `path` which is renamed into
/// place once complete. On failure `path` is left untouched.
pub fn export<P: AsRef<Path>>(
    snapshot: &Snapshot,
    path: P,
    format: ExportFormat,
) -> Result<(), ExportError> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file = NamedTempFile::new_in(dir).map_err(|e| ExportError::io(dir, e))?;

    let mut writer = BufWriter::new(file);
    let frames = snapshot.iter().map(|f| f.as_ref()).collect::<Vec<_>>();
    match format {
        ExportFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, &frames)?;
            writeln!(writer).map_err(|e| ExportError::io(path, e))?;
        }
        ExportFormat::Csv => write_csv(&mut writer, &frames).map_err(|e| ExportError::io(path, e))?,
    }

    let file = writer
        .into_inner()
        .map_err(|e| ExportError::io(path, e.into_error()))?;
    file.as_file()
        .sync_all()
        .map_err(|e| ExportError::io(path, e))?;
    file.persist(path)
        .map_err(|e| ExportError::io(path, e.error))?;

    log::info!(
        "Exported {} frames to {} as {:?}",
        frames.len(),
        path.display(),
        format
    );
    Ok(())
}

fn write_csv<W: Write>(writer: &mut W, frames: &[&ScanFrame]) -> std::io::Result<()> {
    for frame in frames {
        let row = frame
            .distances()
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(",");
        writeln!(writer, "{}", row)?;
    }
    Ok(())
}
