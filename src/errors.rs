use thiserror::Error;

use crate::{align::AlignmentError, detrend::FitError, reader::ReadError};

/// Errors raised when parsing observation files or datasets
#[derive(Debug, Error)]
pub enum ParsingError {
    #[error("missing file marker")]
    MissingMarker,
    #[error("invalid version")]
    VersionFormat,
    #[error("unsupported version {0}")]
    UnsupportedVersion(u16),
    #[error("invalid receiver identifier")]
    ReceiverFormat,
    #[error("invalid day of year")]
    DayOfYearFormat,
    #[error("invalid year")]
    YearFormat,
    #[error("invalid satellite identifier \"{0}\"")]
    SatelliteFormat(String),
    #[error("invalid observation time grid")]
    ObsTimesFormat,
    #[error("invalid numeric field")]
    InvalidNumber,
    #[error("line {0}: unexpected number of fields")]
    FieldCount(usize),
    #[error("row {0} out of bounds")]
    RowOutOfBounds(usize),
    #[error("unterminated receiver record \"{0}\"")]
    UnterminatedRecord(String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised when formatting a dataset
#[derive(Debug, Error)]
pub enum FormattingError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("record \"{receiver}\" has {got} satellites, dataset has {expected}")]
    SatelliteMismatch {
        receiver: String,
        expected: usize,
        got: usize,
    },
    #[error("record \"{receiver}\" has {got} rows, dataset has {expected}")]
    RowMismatch {
        receiver: String,
        expected: usize,
        got: usize,
    },
}

/// Campaign processing errors.
///
/// Only [Error::Io] and [Error::Formatting] abort a campaign,
/// the others are downgraded to diagnostics for a single receiver and satellite.
#[derive(Debug, Error)]
pub enum Error {
    /// One day could not be read for a receiver
    #[error("missing day: {0}")]
    MissingDay(#[from] ReadError),
    /// An interval is too short to support the polynomial
    #[error("insufficient data: {0}")]
    InsufficientData(#[from] FitError),
    /// The two days do not share a time grid
    #[error("alignment error: {0}")]
    Alignment(#[from] AlignmentError),
    #[error("dataset i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("dataset formatting error: {0}")]
    Formatting(#[from] FormattingError),
    #[error("dataset parsing error: {0}")]
    Parsing(#[from] ParsingError),
}
