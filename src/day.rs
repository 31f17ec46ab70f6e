//! Single day processing
use gnss_rs::prelude::SV;
use hifitime::prelude::Epoch;

use crate::{
    config::Config,
    detrend::{trim_edges, FitError, Interval, PolynomialDetrender, Segmenter},
    errors::Error,
    reader::{DayReader, DayRequest},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Ionospheric pierce point coordinates
#[derive(Debug, Copy, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Lla {
    /// Latitude (degrees)
    pub lat_deg: f64,
    /// Longitude (degrees)
    pub lon_deg: f64,
    /// Altitude (km)
    pub alt_km: f64,
}

/// [RawDay] is the calibrated TEC of one receiver, satellite and day,
/// already restricted to the elevation mask and observation window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDay {
    /// Sampling [Epoch]s, strictly increasing
    pub epochs: Vec<Epoch>,
    /// TEC (TECu), NaN where missing
    pub tec: Vec<f64>,
    /// Pierce point of each sample
    pub ipp: Vec<Lla>,
}

impl RawDay {
    /// Number of samples
    pub fn len(&self) -> usize {
        self.tec.len()
    }

    /// True if this day holds no sample
    pub fn is_empty(&self) -> bool {
        self.tec.is_empty()
    }
}

/// [DaySeries] is a processed day: TEC, trend and residual
/// co-indexed with the native sampling [Epoch]s.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySeries {
    /// Receiver identifier
    pub receiver: String,
    /// Satellite
    pub sv: SV,
    /// Day of year actually read
    pub doy: u16,
    /// Sampling [Epoch]s
    pub epochs: Vec<Epoch>,
    /// Raw TEC
    pub tec: Vec<f64>,
    /// Polynomial trend, NaN outside fitted intervals and edges
    pub trend: Vec<f64>,
    /// TEC - trend
    pub residual: Vec<f64>,
    /// Pierce points
    pub ipp: Vec<Lla>,
    /// [Interval]s found in this day
    pub intervals: Vec<Interval>,
    /// [Interval]s too short to be fitted
    pub rejected: Vec<(Interval, FitError)>,
}

impl DaySeries {
    /// Number of samples
    pub fn len(&self) -> usize {
        self.tec.len()
    }

    /// True if this day holds no sample
    pub fn is_empty(&self) -> bool {
        self.tec.is_empty()
    }
}

/// [DayProcessor] chains segmentation, detrending and edge trimming.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DayProcessor {
    segmenter: Segmenter,
    detrender: PolynomialDetrender,
    edge_margin: usize,
}

impl DayProcessor {
    /// Builds a new [DayProcessor]
    pub fn new(segmenter: Segmenter, detrender: PolynomialDetrender, edge_margin: usize) -> Self {
        Self {
            segmenter,
            detrender,
            edge_margin,
        }
    }

    /// Builds the [DayProcessor] described by this [Config]
    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.segmenter(), cfg.detrender(), cfg.edge_margin)
    }

    /// Processes a [RawDay].
    pub fn process(&self, receiver: &str, sv: SV, doy: u16, raw: RawDay) -> DaySeries {
        let segmentation = self.segmenter.segment(&raw.tec);

        let detrended = self.detrender.detrend(&raw.tec, &segmentation.intervals);

        let mut trend = detrended.trend;
        trim_edges(&mut trend, self.edge_margin);

        let residual = raw
            .tec
            .iter()
            .zip(trend.iter())
            .map(|(tec, trend)| tec - trend)
            .collect();

        DaySeries {
            receiver: receiver.to_string(),
            sv,
            doy,
            epochs: raw.epochs,
            tec: raw.tec,
            trend,
            residual,
            ipp: raw.ipp,
            intervals: segmentation.intervals,
            rejected: detrended.rejected,
        }
    }

    /// Reads then processes one day of one receiver and satellite.
    /// The [SpecialCaseRule](crate::config::SpecialCaseRule)s of the [Config]
    /// select the day of year actually read.
    pub fn process_day<R: DayReader>(
        &self,
        reader: &R,
        cfg: &Config,
        receiver: &str,
        doy: u16,
        sv: SV,
    ) -> Result<DaySeries, Error> {
        let doy = cfg.effective_day(receiver, doy);

        let request = DayRequest {
            receiver,
            doy,
            sv,
            window: cfg.window(doy),
            elevation_mask_deg: cfg.elevation_mask_deg,
        };

        let raw = reader.read_day(&request)?;
        Ok(self.process(receiver, sv, doy, raw))
    }
}
