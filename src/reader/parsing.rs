use gnss_rs::prelude::SV;
use hifitime::prelude::Epoch;
use scan_fmt::scan_fmt;

use crate::{
    day::{Lla, RawDay},
    errors::ParsingError,
    reader::slant_to_vertical,
    window::ObservationWindow,
};

use std::{
    io::{BufRead, BufReader, Read},
    str::FromStr,
};

const MARKER: &str = "TEC OBSERVATION FILE";

/// One line of an [ObservationFile]
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRow {
    /// Sampling [Epoch]
    pub epoch: Epoch,
    /// Satellite
    pub sv: SV,
    /// Calibrated slant TEC (TECu)
    pub stec: f64,
    /// Satellite elevation (degrees)
    pub elevation_deg: f64,
    /// Pierce point
    pub ipp: Lla,
}

/// [ObservationFile] holds the calibrated slant TEC of one receiver
/// for one day, all satellites.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationFile {
    /// Receiver identifier
    pub receiver: String,
    /// Year
    pub year: i32,
    /// Day of year
    pub doy: u16,
    /// Observations, in file order
    pub rows: Vec<ObservationRow>,
}

fn parse_row(line: &str, line_number: usize) -> Result<ObservationRow, ParsingError> {
    let items = line.split_ascii_whitespace().collect::<Vec<_>>();
    if items.len() != 7 {
        return Err(ParsingError::FieldCount(line_number));
    }

    let number = |s: &str| s.parse::<f64>().or(Err(ParsingError::InvalidNumber));

    let epoch = Epoch::from_unix_seconds(number(items[0])?);

    let sv = SV::from_str(items[1]).or(Err(ParsingError::SatelliteFormat(items[1].to_string())))?;

    Ok(ObservationRow {
        epoch,
        sv,
        stec: number(items[2])?,
        elevation_deg: number(items[3])?,
        ipp: Lla {
            lat_deg: number(items[4])?,
            lon_deg: number(items[5])?,
            alt_km: number(items[6])?,
        },
    })
}

impl ObservationFile {
    /// Parse [ObservationFile] from any [Read]able input.
    pub fn parse<R: Read>(reader: &mut BufReader<R>) -> Result<Self, ParsingError> {
        let mut lines = reader.lines().enumerate();

        let (_, first) = lines.next().ok_or(ParsingError::MissingMarker)?;
        if !first?.trim().eq(MARKER) {
            return Err(ParsingError::MissingMarker);
        }

        let mut file = Self::default();
        let mut labels = false;

        for (i, line) in lines {
            let line = line?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if labels {
                file.rows.push(parse_row(line, i + 1)?);
            } else if line.starts_with("RCVR = ") {
                file.receiver =
                    scan_fmt!(line, "RCVR = {}", String).ok_or(ParsingError::ReceiverFormat)?;
            } else if line.starts_with("YEAR = ") {
                file.year = scan_fmt!(line, "YEAR = {d}", i32).ok_or(ParsingError::YearFormat)?;
            } else if line.starts_with("DOY = ") {
                file.doy = scan_fmt!(line, "DOY = {d}", u16).ok_or(ParsingError::DayOfYearFormat)?;
            } else if line.starts_with("EPOCH") {
                // column labels conclude the header
                labels = true;
            }
        }

        Ok(file)
    }

    /// Extracts the [RawDay] of this satellite, restricted to the
    /// [ObservationWindow] and elevation mask. Rows are sorted chronologically
    /// and repeated epochs are dropped.
    pub fn satellite_day(
        &self,
        sv: SV,
        window: &ObservationWindow,
        elevation_mask_deg: f64,
        vertical: bool,
    ) -> RawDay {
        let mut rows = self
            .rows
            .iter()
            .filter(|row| {
                row.sv == sv
                    && window.contains(row.epoch)
                    && row.elevation_deg >= elevation_mask_deg
            })
            .collect::<Vec<_>>();

        rows.sort_by(|a, b| a.epoch.cmp(&b.epoch));
        rows.dedup_by(|a, b| a.epoch == b.epoch);

        let mut raw = RawDay::default();
        for row in rows {
            raw.epochs.push(row.epoch);
            raw.ipp.push(row.ipp);
            raw.tec.push(if vertical {
                slant_to_vertical(row.stec, row.elevation_deg)
            } else {
                row.stec
            });
        }
        raw
    }
}
