//! Calibrated TEC observation readers
use gnss_rs::prelude::SV;
use thiserror::Error;

use crate::{day::RawDay, errors::ParsingError, window::ObservationWindow};

mod directory;
mod parsing;

pub use directory::DirectoryReader;
pub use parsing::{ObservationFile, ObservationRow};

/// Mean Earth radius (km)
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Thin shell ionosphere height (km)
pub const IONOSPHERIC_SHELL_HEIGHT_KM: f64 = 350.0;

/// Observation reading errors.
/// Any of them means the day is missing for that receiver and satellite.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("{receiver} day {doy}: not available")]
    NotAvailable { receiver: String, doy: u16 },
    #[error("{receiver} day {doy}: no {sv} samples")]
    NoSamples { receiver: String, doy: u16, sv: SV },
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing error: {0}")]
    Parsing(#[from] ParsingError),
}

/// [DayRequest] describes one day of observations of one satellite
#[derive(Debug, Clone, PartialEq)]
pub struct DayRequest<'a> {
    /// Receiver identifier
    pub receiver: &'a str,
    /// Day of year
    pub doy: u16,
    /// Satellite
    pub sv: SV,
    /// Samples outside this window are dropped
    pub window: ObservationWindow,
    /// Samples below this elevation (degrees) are dropped
    pub elevation_mask_deg: f64,
}

/// [DayReader] provides calibrated TEC and pierce points
/// for a receiver, day and satellite.
pub trait DayReader {
    /// Reads the [RawDay] described by this [DayRequest].
    fn read_day(&self, request: &DayRequest) -> Result<RawDay, ReadError>;
}

impl<R: DayReader + ?Sized> DayReader for &R {
    fn read_day(&self, request: &DayRequest) -> Result<RawDay, ReadError> {
        (**self).read_day(request)
    }
}

/// Thin shell mapping: converts slant TEC observed at this elevation
/// to vertical TEC at the pierce point.
pub fn slant_to_vertical(stec: f64, elevation_deg: f64) -> f64 {
    let sin_z = EARTH_RADIUS_KM * elevation_deg.to_radians().cos()
        / (EARTH_RADIUS_KM + IONOSPHERIC_SHELL_HEIGHT_KM);
    stec * (1.0 - sin_z * sin_z).sqrt()
}

#[cfg(test)]
mod test {
    use super::slant_to_vertical;

    #[test]
    fn mapping_function() {
        assert!((slant_to_vertical(10.0, 90.0) - 10.0).abs() < 1.0E-9);

        let low = slant_to_vertical(10.0, 20.0);
        let high = slant_to_vertical(10.0, 60.0);
        assert!(low < high);
        assert!(high < 10.0);
        assert!(low > 3.0);
    }
}
