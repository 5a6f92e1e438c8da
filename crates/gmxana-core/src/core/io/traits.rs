use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing tabular data files.
///
/// Implementors handle format-specific parsing and serialization of a single
/// in-memory data type.
pub trait DataFile {
    /// The in-memory representation of the file contents.
    type Data;

    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads data from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_from(reader: &mut impl BufRead) -> Result<Self::Data, Self::Error>;

    /// Writes data to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_to(data: &Self::Data, writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Reads data from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self::Data, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Writes data to a file path, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(data: &Self::Data, path: P) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(data, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
