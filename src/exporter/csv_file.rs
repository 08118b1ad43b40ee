use crate::exporter::table::ExportTable;
use crate::model::ExportError;
use csv::WriterBuilder;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Writes the table as delimited text to any writer.
pub fn write_rows<W: Write>(
    out: W,
    table: &ExportTable,
    delimiter: u8,
    notification_threshold: usize,
) -> Result<(), ExportError> {
    let mut writer = WriterBuilder::new().delimiter(delimiter).from_writer(out);
    writer.write_record(&table.header)?;

    let total = table.rows.len();
    for (i, row) in table.rows.iter().enumerate() {
        writer.write_record(row)?;
        let written = i + 1;
        if notification_threshold > 0 && written % notification_threshold == 0 {
            info!("Wrote offer {} of {}", written, total);
        }
    }

    writer.flush()?;
    Ok(())
}

/// Writes the table to `path`. The data goes to a sibling temp file first and
/// is renamed into place, so a failed export leaves no partial file behind.
pub fn write_table(
    path: &Path,
    table: &ExportTable,
    delimiter: u8,
    notification_threshold: usize,
) -> Result<(), ExportError> {
    info!("Started writing offers to {}", path.display());
    let tmp = temp_path(path);

    let result = fs::File::create(&tmp)
        .map_err(ExportError::from)
        .and_then(|file| write_rows(file, table, delimiter, notification_threshold))
        .and_then(|_| fs::rename(&tmp, path).map_err(ExportError::from));

    if result.is_err() {
        if let Err(e) = fs::remove_file(&tmp) {
            warn!("Failed to remove temporary export {}: {}", tmp.display(), e);
        }
    } else {
        info!("Finished writing all {} offers!", table.rows.len());
    }
    result
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "offers.csv".into());
    name.push(".tmp");
    path.with_file_name(name)
}
