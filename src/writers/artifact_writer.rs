use crate::error::Result;
use crate::models::{ConsistencyVerdict, MonthlyDataset, MonthlyVocabulary};
use crate::utils::constants::MONTH_COLUMN;
use serde::Serialize;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Writes per-station artifacts.
///
/// Every write goes to a temporary file next to the destination and is
/// renamed into place once complete, so readers never see a partial file.
pub struct ArtifactWriter;

impl ArtifactWriter {
    pub fn write_vocabulary(vocabulary: &MonthlyVocabulary, path: &Path) -> Result<()> {
        write_atomically(path, |writer| {
            writer.write_all(vocabulary.to_line().as_bytes())?;
            Ok(())
        })
    }

    /// CSV with a `Month` key column followed by the dataset's canonical columns
    pub fn write_monthly_dataset(dataset: &MonthlyDataset, path: &Path) -> Result<()> {
        write_atomically(path, |writer| {
            let mut csv_writer = csv::Writer::from_writer(writer);

            let mut header = Vec::with_capacity(dataset.columns.len() + 1);
            header.push(MONTH_COLUMN.to_string());
            header.extend(dataset.columns.iter().map(|c| c.to_string()));
            csv_writer.write_record(&header)?;

            for row in &dataset.rows {
                let mut fields = Vec::with_capacity(row.values.len() + 1);
                fields.push(row.month.to_string());
                fields.extend(
                    row.values
                        .iter()
                        .map(|v| v.map(|v| v.to_string()).unwrap_or_default()),
                );
                csv_writer.write_record(&fields)?;
            }

            csv_writer.flush()?;
            Ok(())
        })
    }

    /// Classification on line one, comma-joined scores on line two
    pub fn write_verdict(verdict: &ConsistencyVerdict, path: &Path) -> Result<()> {
        write_atomically(path, |writer| {
            writeln!(writer, "{}", verdict.classification)?;
            write!(writer, "{}", verdict.score_line())?;
            Ok(())
        })
    }

    pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
        write_atomically(path, |writer| {
            serde_json::to_writer_pretty(&mut *writer, value)?;
            writer.write_all(b"\n")?;
            Ok(())
        })
    }
}

fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&mut NamedTempFile>) -> Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut temp_file = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(&mut temp_file);
        write(&mut writer)?;
        writer.flush()?;
    }

    temp_file.persist(path).map_err(|e| e.error)?;
    debug!(path = %path.display(), "Wrote artifact");
    Ok(())
}
