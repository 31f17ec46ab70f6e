//! Differential TEC dataset.
//!
//! A dataset is a text file made of a header
//! ```text
//! DTEC DATASET VERSION = 1
//! SATELLITES = G02 G05 G06
//! OBSTIMES = 1503327600 1 21600
//! ```
//! (`OBSTIMES` gives the first posix timestamp, resolution in seconds and number of rows),
//! then one block per receiver
//! ```text
//! RCVR = mnab
//! 120 44.1 NaN NaN -94.2 NaN NaN 0.02 NaN NaN 0.4 NaN NaN
//! END OF RCVR
//! ```
//! Each block line is a row index followed by the latitude, longitude, residual
//! and differential TEC of every satellite. Rows without any finite value are omitted.
use gnss_rs::prelude::SV;

use crate::{differential::ReceiverRecord, errors::ParsingError, window::MasterTimes};

use std::{fs::File, io::BufReader, path::Path};

#[cfg(feature = "flate2")]
use flate2::read::GzDecoder;

mod formatting;
mod parsing;

pub use formatting::DatasetWriter;
pub use parsing::DatasetReader;

/// Current dataset revision
pub const VERSION: u16 = 1;

pub(crate) const VERSION_MARKER: &str = "DTEC DATASET VERSION = ";
pub(crate) const END_OF_RECORD: &str = "END OF RCVR";

/// [Dataset] holds the [MasterTimes] and every [ReceiverRecord] of a campaign.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Shared observation times
    pub obstimes: MasterTimes,
    /// Satellites, one column per satellite in every record
    pub satellites: Vec<SV>,
    /// [ReceiverRecord]s, in file order
    pub records: Vec<ReceiverRecord>,
}

impl Dataset {
    /// Returns [ReceiverRecord] of this receiver
    pub fn record(&self, receiver: &str) -> Option<&ReceiverRecord> {
        self.records.iter().find(|rec| rec.receiver == receiver)
    }

    /// Iterates all receiver identifiers
    pub fn receivers(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|rec| rec.receiver.as_str())
    }

    /// Parses [Dataset] from this local file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ParsingError> {
        let fd = File::open(path)?;
        let mut reader = BufReader::new(fd);
        Self::parse(&mut reader)
    }

    /// Parses [Dataset] from this gzip compressed local file
    #[cfg(feature = "flate2")]
    #[cfg_attr(docrs, doc(cfg(feature = "flate2")))]
    pub fn from_gzip_file<P: AsRef<Path>>(path: P) -> Result<Self, ParsingError> {
        let fd = File::open(path)?;
        let mut reader = BufReader::new(GzDecoder::new(fd));
        Self::parse(&mut reader)
    }
}
