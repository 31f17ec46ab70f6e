#![cfg_attr(docrs, feature(doc_cfg))]

//! Differential Total Electron Content (dTEC) signatures of a solar eclipse.
//!
//! A campaign compares, receiver per receiver and satellite per satellite,
//! the vertical TEC observed on the eclipse day with the TEC observed on a
//! quiet reference day:
//!
//! - each day is split into gap free [Interval](detrend::Interval)s,
//! detrended with a fixed order polynomial and trimmed at its edges
//! ([DayProcessor](day::DayProcessor)),
//! - both days are brought onto a common time grid
//! ([TwoDayAligner](align::TwoDayAligner)),
//! - the cross day difference is scattered into a [ReceiverRecord](differential::ReceiverRecord)
//! sharing the campaign [MasterTimes](window::MasterTimes).
//!
//! [Campaign](campaign::Campaign) drives the whole process and streams one record
//! per receiver into a [Dataset](dataset::Dataset) file.

pub mod align;
pub mod campaign;
pub mod config;
pub mod dataset;
pub mod day;
pub mod detrend;
pub mod differential;
pub mod errors;
pub mod map;
pub mod reader;
pub mod report;
pub mod window;

#[cfg(test)]
mod tests;

pub mod prelude {
    pub use crate::align::{AlignedDay, AlignedPair, TwoDayAligner};
    pub use crate::campaign::Campaign;
    pub use crate::config::{Config, DayPair, SpecialCaseRule, SpecialCases};
    pub use crate::dataset::{Dataset, DatasetReader, DatasetWriter};
    pub use crate::day::{DayProcessor, DaySeries, Lla, RawDay};
    pub use crate::detrend::{Interval, PolynomialDetrender, Segmenter};
    pub use crate::differential::{differential, ReceiverRecord};
    pub use crate::errors::Error;
    pub use crate::map::{FrameSelector, MapFrame, MapQuantity, TotalityPath};
    pub use crate::reader::{DayReader, DayRequest, DirectoryReader};
    pub use crate::report::{Diagnostic, DiagnosticKind, Report};
    pub use crate::window::{MasterTimes, ObservationWindow};

    pub use gnss_rs::prelude::{Constellation, SV};
    pub use hifitime::prelude::{Duration, Epoch, TimeScale, Unit};
}
