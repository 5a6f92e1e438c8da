use crate::core::io::traits::DataFile;
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use thiserror::Error;

const DEFAULT_COMMENT: &str = "This file was written by gmxana";

/// Header information of an XVG file, taken from its `@` directives and `#` comments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XvgMetadata {
    pub title: Option<String>,
    pub xaxis_label: Option<String>,
    pub yaxis_label: Option<String>,
    /// Legends keyed by data set index; set `s0` describes column 1.
    pub legends: BTreeMap<usize, String>,
    pub comments: Vec<String>,
}

/// Column-oriented numeric data of one XVG data set.
///
/// Column 0 holds the abscissa (usually time in ps), every further column one series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XvgData {
    columns: Vec<Vec<f64>>,
    pub metadata: XvgMetadata,
}

#[derive(Debug, Error)]
pub enum XvgError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: invalid number '{value}'")]
    InvalidNumber { line: usize, value: String },
    #[error("Inconsistent row on line {line}: expected {expected} fields, found {found}")]
    InconsistentRow {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("Columns must have equal lengths (column {column} has {found}, expected {expected})")]
    RaggedColumns {
        column: usize,
        expected: usize,
        found: usize,
    },
}

impl XvgData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a data set from columns that must all have the same length.
    pub fn from_columns(columns: Vec<Vec<f64>>) -> Result<Self, XvgError> {
        if let Some(expected) = columns.first().map(Vec::len) {
            if let Some((column, c)) = columns
                .iter()
                .enumerate()
                .find(|(_, c)| c.len() != expected)
            {
                return Err(XvgError::RaggedColumns {
                    column,
                    expected,
                    found: c.len(),
                });
            }
        }
        Ok(Self {
            columns,
            metadata: XvgMetadata::default(),
        })
    }

    pub fn with_metadata(mut self, metadata: XvgMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Option<&[f64]> {
        self.columns.get(index).map(Vec::as_slice)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<f64>> + '_ {
        (0..self.row_count()).map(move |i| self.columns.iter().map(|c| c[i]).collect())
    }

    /// Returns `(x, y)` pairs of column 0 against series `index` (column `index + 1`).
    pub fn series(&self, index: usize) -> Option<Vec<(f64, f64)>> {
        let x = self.columns.first()?;
        let y = self.columns.get(index + 1)?;
        Some(x.iter().copied().zip(y.iter().copied()).collect())
    }

    pub fn num_series(&self) -> usize {
        self.columns.len().saturating_sub(1)
    }

    /// Legend of series `index`, falling back to `y<index>`.
    pub fn series_label(&self, index: usize) -> String {
        self.metadata
            .legends
            .get(&index)
            .cloned()
            .unwrap_or_else(|| format!("y{}", index))
    }

    /// Applies `f` to every value of one column; returns `false` if the column is absent.
    pub fn transform_column(&mut self, index: usize, f: impl Fn(f64) -> f64) -> bool {
        match self.columns.get_mut(index) {
            Some(column) => {
                column.iter_mut().for_each(|v| *v = f(*v));
                true
            }
            None => false,
        }
    }
}

fn quoted(text: &str) -> String {
    match (text.find('"'), text.rfind('"')) {
        (Some(start), Some(end)) if end > start => text[start + 1..end].to_string(),
        _ => text.trim().to_string(),
    }
}

fn parse_directive(directive: &str, metadata: &mut XvgMetadata) {
    let mut tokens = directive.split_whitespace();
    let Some(first) = tokens.next() else {
        return;
    };
    let second = tokens.next();
    match (first, second) {
        ("title", _) => metadata.title = Some(quoted(directive)),
        ("xaxis", Some("label")) => metadata.xaxis_label = Some(quoted(directive)),
        ("yaxis", Some("label")) => metadata.yaxis_label = Some(quoted(directive)),
        (set, Some("legend")) if set.starts_with('s') => {
            if let Ok(index) = set[1..].parse::<usize>() {
                metadata.legends.insert(index, quoted(directive));
            }
        }
        _ => {}
    }
}

pub struct XvgFile;

impl DataFile for XvgFile {
    type Data = XvgData;
    type Error = XvgError;

    fn read_from(reader: &mut impl BufRead) -> Result<Self::Data, Self::Error> {
        let mut metadata = XvgMetadata::default();
        let mut columns: Vec<Vec<f64>> = Vec::new();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;
            let trimmed = line.trim();

            if trimmed.is_empty() {
                continue;
            }
            if let Some(comment) = trimmed.strip_prefix('#') {
                metadata.comments.push(comment.trim().to_string());
                continue;
            }
            if let Some(directive) = trimmed.strip_prefix('@') {
                parse_directive(directive.trim(), &mut metadata);
                continue;
            }
            // Only the first data set is read.
            if trimmed.starts_with('&') {
                break;
            }

            let values = trimmed
                .split_whitespace()
                .map(|field| {
                    field.parse::<f64>().map_err(|_| XvgError::InvalidNumber {
                        line: line_num,
                        value: field.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            if columns.is_empty() {
                columns = vec![Vec::new(); values.len()];
            } else if values.len() != columns.len() {
                return Err(XvgError::InconsistentRow {
                    line: line_num,
                    expected: columns.len(),
                    found: values.len(),
                });
            }
            for (column, value) in columns.iter_mut().zip(values) {
                column.push(value);
            }
        }

        Ok(XvgData { columns, metadata })
    }

    fn write_to(data: &Self::Data, writer: &mut impl Write) -> Result<(), Self::Error> {
        let meta = &data.metadata;
        if meta.comments.is_empty() {
            writeln!(writer, "# {}", DEFAULT_COMMENT)?;
        } else {
            for comment in &meta.comments {
                writeln!(writer, "# {}", comment)?;
            }
        }
        if let Some(title) = &meta.title {
            writeln!(writer, "@    title \"{}\"", title)?;
        }
        if let Some(label) = &meta.xaxis_label {
            writeln!(writer, "@    xaxis  label \"{}\"", label)?;
        }
        if let Some(label) = &meta.yaxis_label {
            writeln!(writer, "@    yaxis  label \"{}\"", label)?;
        }
        for (index, legend) in &meta.legends {
            writeln!(writer, "@ s{} legend \"{}\"", index, legend)?;
        }
        for row in data.rows() {
            let line = row
                .iter()
                .map(|v| format!("{:>14.6}", v))
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(writer, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const MINDIST_OUTPUT: &str = r#"# This file was created by gmx mindist
# Command line:
#   gmx mindist -s md.tpr -f md.xtc
@    title "Distance"
@    xaxis  label "Time (ps)"
@    yaxis  label "Distance (nm)"
@TYPE xy
@ s0 legend "Na1_site"
@ s1 legend "A38_O"
    0.000000    0.312000    0.455000
   10.000000    0.298000    0.470000
   20.000000    0.305000    0.460000
"#;

    fn read(text: &str) -> Result<XvgData, XvgError> {
        XvgFile::read_from(&mut Cursor::new(text))
    }

    #[test]
    fn read_from_parses_columns_and_directives() {
        let data = read(MINDIST_OUTPUT).unwrap();

        assert_eq!(data.num_columns(), 3);
        assert_eq!(data.row_count(), 3);
        assert_eq!(data.column(0).unwrap(), &[0.0, 10.0, 20.0]);
        assert_eq!(data.column(2).unwrap(), &[0.455, 0.470, 0.460]);
        assert_eq!(data.metadata.title.as_deref(), Some("Distance"));
        assert_eq!(data.metadata.xaxis_label.as_deref(), Some("Time (ps)"));
        assert_eq!(data.metadata.yaxis_label.as_deref(), Some("Distance (nm)"));
        assert_eq!(data.series_label(0), "Na1_site");
        assert_eq!(data.series_label(1), "A38_O");
        assert_eq!(data.metadata.comments.len(), 3);
    }

    #[test]
    fn read_from_stops_at_data_set_terminator() {
        let data = read("0 1\n1 2\n&\n0 5 6\n").unwrap();
        assert_eq!(data.row_count(), 2);
        assert_eq!(data.num_columns(), 2);
    }

    #[test]
    fn read_from_rejects_rows_with_a_different_width() {
        let err = read("0 1\n1 2 3\n").unwrap_err();
        assert!(matches!(
            err,
            XvgError::InconsistentRow {
                line: 2,
                expected: 2,
                found: 3
            }
        ));
    }

    #[test]
    fn read_from_reports_invalid_numbers_with_line() {
        let err = read("# header\n0 abc\n").unwrap_err();
        match err {
            XvgError::InvalidNumber { line, value } => {
                assert_eq!(line, 2);
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_input_yields_empty_data() {
        let data = read("# nothing here\n@ title \"x\"\n").unwrap();
        assert!(data.is_empty());
        assert_eq!(data.num_series(), 0);
        assert!(data.series(0).is_none());
    }

    #[test]
    fn written_file_reads_back_with_metadata() {
        let mut metadata = XvgMetadata::default();
        metadata.title = Some("Contacts".into());
        metadata.legends.insert(0, "site".into());
        let data = XvgData::from_columns(vec![vec![0.0, 2.0], vec![3.0, 4.0]])
            .unwrap()
            .with_metadata(metadata);

        let mut buffer = Vec::new();
        XvgFile::write_to(&data, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("# This file was written by gmxana"));
        assert!(text.contains("@ s0 legend \"site\""));

        let back = read(&text).unwrap();
        assert_eq!(back.columns(), data.columns());
        assert_eq!(back.metadata.title.as_deref(), Some("Contacts"));
        assert_eq!(back.series_label(0), "site");
    }

    #[test]
    fn from_columns_rejects_ragged_columns() {
        let err = XvgData::from_columns(vec![vec![0.0, 1.0], vec![1.0]]).unwrap_err();
        assert!(matches!(
            err,
            XvgError::RaggedColumns {
                column: 1,
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn series_pairs_first_column_with_requested_series() {
        let data = read(MINDIST_OUTPUT).unwrap();
        let series = data.series(1).unwrap();
        assert_eq!(series[1], (10.0, 0.470));
        assert_eq!(data.series_label(5), "y5");
    }

    #[test]
    fn transform_column_converts_time_units() {
        let mut data = read(MINDIST_OUTPUT).unwrap();
        assert!(data.transform_column(0, |t| t * 0.001));
        assert_eq!(data.column(0).unwrap(), &[0.0, 0.01, 0.02]);
        assert!(!data.transform_column(9, |t| t));
    }
}
