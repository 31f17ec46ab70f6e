//! Cross day differential and receiver records
use gnss_rs::prelude::SV;

use crate::{align::AlignedPair, day::DaySeries, window::MasterTimes};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Eclipse day TEC minus reference day TEC, for every slot of the [AlignedPair].
/// NaN propagates from either day.
pub fn differential(aligned: &AlignedPair) -> Vec<f64> {
    aligned
        .eclipse
        .tec
        .iter()
        .zip(aligned.reference.tec.iter())
        .map(|(eclipse, reference)| eclipse - reference)
        .collect()
}

/// Row major `[row, column]` array, NaN filled at creation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Grid {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Grid {
    /// Allocates a NaN filled [Grid]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![f64::NAN; rows * cols],
        }
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Value at this row and column
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    /// Overwrites value at this row and column
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    /// Complete row
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Mutable access to a complete row
    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        &mut self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Iterates one column, top to bottom
    pub fn column(&self, col: usize) -> impl Iterator<Item = f64> + '_ {
        (0..self.rows).map(move |row| self.get(row, col))
    }

    /// True if this row holds at least one finite value
    pub fn row_has_data(&self, row: usize) -> bool {
        self.row(row).iter().any(|v| v.is_finite())
    }
}

/// [ReceiverRecord] accumulates, for one receiver, the eclipse day
/// pierce points, residual and differential TEC of every satellite.
/// Each quantity is a `[master time, satellite]` [Grid].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReceiverRecord {
    /// Receiver identifier
    pub receiver: String,
    /// Satellites, one per column
    pub satellites: Vec<SV>,
    /// Pierce point latitude (degrees)
    pub lat: Grid,
    /// Pierce point longitude (degrees)
    pub lon: Grid,
    /// Eclipse day residual
    pub res: Grid,
    /// Differential TEC
    pub dtec: Grid,
}

impl ReceiverRecord {
    /// Allocates a NaN filled [ReceiverRecord]
    pub fn new(receiver: &str, satellites: &[SV], rows: usize) -> Self {
        let cols = satellites.len();
        Self {
            receiver: receiver.to_string(),
            satellites: satellites.to_vec(),
            lat: Grid::new(rows, cols),
            lon: Grid::new(rows, cols),
            res: Grid::new(rows, cols),
            dtec: Grid::new(rows, cols),
        }
    }

    /// Number of rows (master times)
    pub fn rows(&self) -> usize {
        self.lat.rows()
    }

    /// Column of this satellite
    pub fn column(&self, sv: SV) -> Option<usize> {
        self.satellites.iter().position(|s| *s == sv)
    }

    /// True if this row holds at least one finite value, in any quantity
    pub fn row_has_data(&self, row: usize) -> bool {
        self.lat.row_has_data(row)
            || self.lon.row_has_data(row)
            || self.res.row_has_data(row)
            || self.dtec.row_has_data(row)
    }

    /// Scatters the eclipse day pierce points and residual into this column.
    /// Samples whose [Epoch](hifitime::Epoch) does not belong to the [MasterTimes]
    /// are dropped. Returns the number of rows written.
    pub fn scatter_day(&mut self, col: usize, master: &MasterTimes, day: &DaySeries) -> usize {
        let mut written = 0;
        for (i, epoch) in day.epochs.iter().enumerate() {
            if let Some(row) = master.index_of_f64(epoch.to_unix_seconds()) {
                if row >= self.rows() {
                    continue;
                }
                self.lat.set(row, col, day.ipp[i].lat_deg);
                self.lon.set(row, col, day.ipp[i].lon_deg);
                self.res.set(row, col, day.residual[i]);
                written += 1;
            }
        }
        written
    }

    /// Scatters differential TEC, co-indexed with the [AlignedPair] grid,
    /// into this column. Returns the number of rows written.
    pub fn scatter_differential(
        &mut self,
        col: usize,
        master: &MasterTimes,
        aligned: &AlignedPair,
        dtec: &[f64],
    ) -> usize {
        let mut written = 0;
        for (t, value) in aligned.times.iter().zip(dtec.iter()) {
            if let Some(row) = master.index_of(*t) {
                if row >= self.rows() {
                    continue;
                }
                self.dtec.set(row, col, *value);
                written += 1;
            }
        }
        written
    }
}
