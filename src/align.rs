//! Two day alignment
use log::debug;
use thiserror::Error;

use crate::day::DaySeries;

use std::collections::BTreeMap;

/// Seconds per hour
const SECONDS_PER_HOUR: i64 = 3600;

/// Alignment errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlignmentError {
    /// One of the days holds no sample
    #[error("{0} day holds no samples")]
    EmptyDay(&'static str),
    /// The two days do not share any grid slot
    #[error("no overlapping epochs between both days")]
    NoOverlap,
    #[error("invalid sampling interval")]
    NullSamplingInterval,
}

/// TEC, trend and residual of one day, resampled onto an [AlignedPair] grid
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedDay {
    pub tec: Vec<f64>,
    pub trend: Vec<f64>,
    pub residual: Vec<f64>,
}

impl AlignedDay {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            tec: Vec::with_capacity(capacity),
            trend: Vec::with_capacity(capacity),
            residual: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, day: &DaySeries, index: Option<usize>) {
        match index {
            Some(i) => {
                self.tec.push(day.tec[i]);
                self.trend.push(day.trend[i]);
                self.residual.push(day.residual[i]);
            },
            None => {
                self.tec.push(f64::NAN);
                self.trend.push(f64::NAN);
                self.residual.push(f64::NAN);
            },
        }
    }

    /// Number of grid slots
    pub fn len(&self) -> usize {
        self.tec.len()
    }

    /// True if no grid slot exists
    pub fn is_empty(&self) -> bool {
        self.tec.is_empty()
    }
}

/// [AlignedPair] holds both days on a common grid, expressed
/// in the eclipse day clock (posix seconds).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedPair {
    /// Eclipse day posix time of each grid slot
    pub times: Vec<i64>,
    /// Eclipse day, co-indexed with `times`
    pub eclipse: AlignedDay,
    /// Reference day, co-indexed with `times`
    pub reference: AlignedDay,
}

impl AlignedPair {
    /// Number of grid slots
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// True if no grid slot exists
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// [TwoDayAligner] matches the eclipse day and the reference day
/// onto a shared posix time grid.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TwoDayAligner {
    /// Grid resolution (s)
    pub sample_interval_s: u32,
}

impl Default for TwoDayAligner {
    fn default() -> Self {
        Self {
            sample_interval_s: 30,
        }
    }
}

impl TwoDayAligner {
    /// Builds a [TwoDayAligner] at desired grid resolution (s)
    pub fn new(sample_interval_s: u32) -> Self {
        Self { sample_interval_s }
    }

    // Maps each grid slot to its first sample. Later samples landing
    // in an occupied slot are dropped.
    fn slots(&self, day: &DaySeries, offset_s: i64) -> BTreeMap<i64, usize> {
        let dt = self.sample_interval_s as f64;
        let mut slots = BTreeMap::new();

        for (i, epoch) in day.epochs.iter().enumerate() {
            let t = epoch.to_unix_seconds() + offset_s as f64;
            let slot = (t / dt).round() as i64;
            slots.entry(slot).or_insert(i);
        }

        slots
    }

    /// Aligns both days. The reference day is first shifted forward
    /// by `hour_correction` hours so both days share the same clock.
    ///
    /// The common grid spans every slot from the latest first sample to the
    /// earliest last sample of both days. Slots missing in one day are NaN
    /// in that day. Each slot is timed by its eclipse day sample, or by the
    /// slot itself when the eclipse day has none.
    pub fn align(
        &self,
        eclipse: &DaySeries,
        reference: &DaySeries,
        hour_correction: i64,
    ) -> Result<AlignedPair, AlignmentError> {
        if self.sample_interval_s == 0 {
            return Err(AlignmentError::NullSamplingInterval);
        }

        let eclipse_slots = self.slots(eclipse, 0);
        let reference_slots = self.slots(reference, hour_correction * SECONDS_PER_HOUR);

        let (e_first, e_last) = match (
            eclipse_slots.keys().next(),
            eclipse_slots.keys().next_back(),
        ) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Err(AlignmentError::EmptyDay("eclipse")),
        };

        let (r_first, r_last) = match (
            reference_slots.keys().next(),
            reference_slots.keys().next_back(),
        ) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Err(AlignmentError::EmptyDay("reference")),
        };

        let first = e_first.max(r_first);
        let last = e_last.min(r_last);

        if first > last {
            debug!(
                "{}({}) - no overlap between day {} and day {} (+{}h)",
                eclipse.receiver, eclipse.sv, eclipse.doy, reference.doy, hour_correction
            );
            return Err(AlignmentError::NoOverlap);
        }

        let size = (last - first + 1) as usize;
        let dt = self.sample_interval_s as i64;

        let mut pair = AlignedPair {
            times: Vec::with_capacity(size),
            eclipse: AlignedDay::with_capacity(size),
            reference: AlignedDay::with_capacity(size),
        };

        for slot in first..=last {
            let index = eclipse_slots.get(&slot).copied();

            // eclipse sample time, so differential rows match its pierce points
            let time = match index {
                Some(i) => eclipse.epochs[i].to_unix_seconds().round() as i64,
                None => slot * dt,
            };

            pair.times.push(time);
            pair.eclipse.push(eclipse, index);
            pair.reference.push(reference, reference_slots.get(&slot).copied());
        }

        Ok(pair)
    }
}
