use crate::core::models::dipole::PointStore;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing point-dipole file formats.
///
/// Implementors handle format-specific parsing and serialization, while this trait
/// supplies the path-based conveniences shared by every format.
pub trait PointFile {
    /// Options controlling how records are read (limits, validation policy).
    type Options;

    /// Summary information produced alongside the loaded points.
    type Report;

    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads a point store from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails under the given options or I/O fails.
    fn read_from(
        reader: &mut impl BufRead,
        options: &Self::Options,
    ) -> Result<(PointStore, Self::Report), Self::Error>;

    /// Writes every point of `store` to a writer.
    fn write_to(store: &PointStore, writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Reads a point store from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(
        path: P,
        options: &Self::Options,
    ) -> Result<(PointStore, Self::Report), Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader, options)
    }

    /// Writes a point store to a file path, creating or truncating the file.
    fn write_to_path<P: AsRef<Path>>(store: &PointStore, path: P) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(store, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
