use crate::core::io::xvg::XvgData;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CsvExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Column headers for CSV export: `x` followed by the series legends.
pub fn headers(data: &XvgData) -> Vec<String> {
    std::iter::once("x".to_string())
        .chain((0..data.num_series()).map(|i| data.series_label(i)))
        .collect()
}

pub fn write_csv(data: &XvgData, writer: impl Write) -> Result<(), CsvExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    if data.num_columns() > 0 {
        wtr.write_record(headers(data))?;
    }
    for row in data.rows() {
        wtr.write_record(row.iter().map(|v| v.to_string()))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_csv_to_path(data: &XvgData, path: &Path) -> Result<(), CsvExportError> {
    let file = std::fs::File::create(path)?;
    write_csv(data, file)
}
