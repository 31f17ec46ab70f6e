//! Scatter map frames
use gnss_rs::prelude::SV;
use strum_macros::{Display, EnumString};

use crate::{
    dataset::{Dataset, DatasetReader},
    differential::ReceiverRecord,
    errors::ParsingError,
    window::MasterTimes,
};

use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
    rc::Rc,
};

/// Quantity colouring the map
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Display, EnumString)]
pub enum MapQuantity {
    /// Differential TEC
    #[default]
    #[strum(to_string = "dtec", serialize = "tec")]
    Dtec,
    /// Eclipse day residual
    #[strum(to_string = "res", serialize = "residual")]
    Residual,
}

impl MapQuantity {
    /// Value of this quantity at this row and column
    fn value(&self, record: &ReceiverRecord, row: usize, col: usize) -> f64 {
        match self {
            Self::Dtec => record.dtec.get(row, col),
            Self::Residual => record.res.get(row, col),
        }
    }
}

/// One coloured point of a [MapFrame]
#[derive(Debug, Clone, PartialEq)]
pub struct MapPoint {
    pub receiver: Rc<str>,
    pub sv: SV,
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub value: f64,
}

/// [MapFrame] gathers every receiver point at one master time
#[derive(Debug, Clone, PartialEq)]
pub struct MapFrame {
    /// Master time row
    pub row: usize,
    /// Posix timestamp of that row
    pub time: i64,
    /// Plotted points
    pub points: Vec<MapPoint>,
}

/// [FrameSelector] picks the master time rows to be rendered,
/// and gathers their points.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FrameSelector {
    /// Observation sampling, in master rows
    pub decimate: usize,
    /// Render one frame every `skip` observation samples
    pub skip: usize,
}

impl Default for FrameSelector {
    fn default() -> Self {
        Self {
            decimate: 30,
            skip: 2,
        }
    }
}

impl FrameSelector {
    /// Builds a new [FrameSelector]
    pub fn new(decimate: usize, skip: usize) -> Self {
        Self { decimate, skip }
    }

    /// Frame rows of this record: from its first to its last row holding
    /// a pierce point, every `decimate * skip` rows.
    fn record_rows(&self, record: &ReceiverRecord) -> Option<Vec<usize>> {
        let step = (self.decimate * self.skip).max(1);

        let mut finite = (0..record.rows()).filter(|row| record.lat.row_has_data(*row));
        let first = finite.next()?;
        let last = finite.last().unwrap_or(first);

        Some((first..=last).step_by(step).collect())
    }

    // Row used for this record: the requested row if it holds a pierce point,
    // otherwise the first row holding one within +/- decimate/2.
    fn source_row(&self, record: &ReceiverRecord, row: usize) -> Option<usize> {
        if record.lat.row_has_data(row) {
            return Some(row);
        }

        let half = self.decimate / 2;
        let start = row.saturating_sub(half);
        let end = (row + half).min(record.rows());

        (start..end).find(|r| record.lat.row_has_data(*r))
    }

    fn push_points(&self, record: &ReceiverRecord, frame: &mut MapFrame, quantity: MapQuantity) {
        if frame.row >= record.rows() {
            return;
        }

        let Some(source) = self.source_row(record, frame.row) else {
            return;
        };

        let receiver: Rc<str> = Rc::from(record.receiver.as_str());

        for (col, sv) in record.satellites.iter().enumerate() {
            let lat_deg = record.lat.get(source, col);
            let lon_deg = record.lon.get(source, col);
            let value = quantity.value(record, source, col);

            if lat_deg.is_finite() && lon_deg.is_finite() && value.is_finite() {
                frame.points.push(MapPoint {
                    receiver: receiver.clone(),
                    sv: *sv,
                    lat_deg,
                    lon_deg,
                    value,
                });
            }
        }
    }

    // Frame rows are set by the first record holding a pierce point.
    // Records preceding it hold none and contribute nothing.
    fn accumulate(
        &self,
        obstimes: &MasterTimes,
        record: &ReceiverRecord,
        quantity: MapQuantity,
        frames: &mut Vec<MapFrame>,
    ) {
        if frames.is_empty() {
            if let Some(rows) = self.record_rows(record) {
                *frames = rows
                    .into_iter()
                    .map(|row| MapFrame {
                        row,
                        time: obstimes.time(row),
                        points: Vec::new(),
                    })
                    .collect();
            }
        }

        for frame in frames.iter_mut() {
            self.push_points(record, frame, quantity);
        }
    }

    /// Gathers every [MapFrame] of this [Dataset]
    pub fn frames(&self, dataset: &Dataset, quantity: MapQuantity) -> Vec<MapFrame> {
        let mut frames = Vec::new();
        for record in dataset.records.iter() {
            self.accumulate(&dataset.obstimes, record, quantity, &mut frames);
        }
        frames
    }

    /// Gathers every [MapFrame] while streaming the records,
    /// so only one record is held in memory at a time.
    pub fn stream_frames<B: BufRead>(
        &self,
        reader: DatasetReader<B>,
        quantity: MapQuantity,
    ) -> Result<Vec<MapFrame>, ParsingError> {
        let obstimes = reader.obstimes();
        let mut frames = Vec::new();
        for record in reader {
            self.accumulate(&obstimes, &record?, quantity, &mut frames);
        }
        Ok(frames)
    }
}

/// [TotalityPath] holds the northern and southern limits of totality,
/// as (latitude, longitude) degrees.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TotalityPath {
    pub north: Vec<(f64, f64)>,
    pub south: Vec<(f64, f64)>,
}

impl TotalityPath {
    /// Parses a [TotalityPath] from rows of
    /// `north_lat north_lon south_lat south_lon`. `#` lines are comments.
    pub fn parse<R: Read>(reader: &mut BufReader<R>) -> Result<Self, ParsingError> {
        let mut path = Self::default();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let values = line
                .split_ascii_whitespace()
                .map(|item| item.parse::<f64>().or(Err(ParsingError::InvalidNumber)))
                .collect::<Result<Vec<_>, _>>()?;

            if values.len() != 4 {
                return Err(ParsingError::FieldCount(i + 1));
            }

            path.north.push((values[0], values[1]));
            path.south.push((values[2], values[3]));
        }

        Ok(path)
    }

    /// Parses a [TotalityPath] from this local file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ParsingError> {
        let fd = File::open(path)?;
        let mut reader = BufReader::new(fd);
        Self::parse(&mut reader)
    }
}
