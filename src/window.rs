//! Observation windows and master time grid
use hifitime::prelude::{Duration, Epoch, Unit};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// [ObservationWindow] restricts a day of observations
/// to the `[start, end]` time span.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObservationWindow {
    /// Window start [Epoch]
    pub start: Epoch,
    /// Window end [Epoch]
    pub end: Epoch,
}

impl ObservationWindow {
    /// Builds an [ObservationWindow] spanning `[start_hour, end_hour]` (UTC)
    /// of that particular day of year (1 = January 1st).
    /// ```
    /// use eclipse_dtec::prelude::ObservationWindow;
    ///
    /// let window = ObservationWindow::from_day_of_year(2017, 233, 15, 21);
    /// assert_eq!(window.duration().to_seconds(), 6.0 * 3600.0);
    /// ```
    pub fn from_day_of_year(year: i32, doy: u16, start_hour: u8, end_hour: u8) -> Self {
        let midnight = day_of_year_midnight(year, doy);
        Self {
            start: midnight + start_hour as f64 * Unit::Hour,
            end: midnight + end_hour as f64 * Unit::Hour,
        }
    }

    /// Total [Duration] of this [ObservationWindow]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// True if this [Epoch] lies within this [ObservationWindow]
    pub fn contains(&self, t: Epoch) -> bool {
        t >= self.start && t <= self.end
    }

    /// Builds the [MasterTimes] grid covering `[start, end)` at desired resolution.
    pub fn master_times(&self, resolution_s: u32) -> MasterTimes {
        let start = self.start.to_unix_seconds().round() as i64;
        let end = self.end.to_unix_seconds().round() as i64;
        let resolution_s = resolution_s.max(1);
        let len = ((end - start).max(0) as u64).div_ceil(resolution_s as u64) as usize;
        MasterTimes {
            start,
            resolution_s,
            len,
        }
    }
}

/// Returns UTC midnight of that day of year (1 = January 1st)
pub fn day_of_year_midnight(year: i32, doy: u16) -> Epoch {
    Epoch::from_gregorian_utc_at_midnight(year, 1, 1) + (doy.max(1) - 1) as f64 * Unit::Day
}

/// [MasterTimes] is the ascending, fixed resolution posix time grid
/// shared by every receiver of a campaign (`obstimes`).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MasterTimes {
    /// First posix timestamp (s)
    pub start: i64,
    /// Grid resolution (s)
    pub resolution_s: u32,
    /// Number of timestamps
    pub len: usize,
}

impl MasterTimes {
    /// Number of timestamps
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if this grid holds no timestamp
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Posix timestamp of the i-th row
    pub fn time(&self, i: usize) -> i64 {
        self.start + i as i64 * self.resolution_s as i64
    }

    /// Iterates all posix timestamps, ascending
    pub fn times(&self) -> impl Iterator<Item = i64> + '_ {
        (0..self.len).map(|i| self.time(i))
    }

    /// Returns row index of this exact posix timestamp, if it belongs to the grid
    pub fn index_of(&self, t: i64) -> Option<usize> {
        let dt = t - self.start;
        let res = self.resolution_s as i64;
        if dt < 0 || dt % res != 0 {
            return None;
        }
        let index = (dt / res) as usize;
        if index < self.len {
            Some(index)
        } else {
            None
        }
    }

    /// Same as [Self::index_of] for a floating point timestamp,
    /// which must be integral to match.
    pub fn index_of_f64(&self, t: f64) -> Option<usize> {
        let rounded = t.round();
        if (t - rounded).abs() > 1.0E-6 {
            return None;
        }
        self.index_of(rounded as i64)
    }
}

#[cfg(test)]
mod test {
    use super::{day_of_year_midnight, MasterTimes, ObservationWindow};
    use hifitime::prelude::{Epoch, Unit};

    #[test]
    fn day_of_year() {
        assert_eq!(
            day_of_year_midnight(2017, 233),
            Epoch::from_gregorian_utc_at_midnight(2017, 8, 21)
        );
        assert_eq!(
            day_of_year_midnight(2017, 1),
            Epoch::from_gregorian_utc_at_midnight(2017, 1, 1)
        );
    }

    #[test]
    fn eclipse_window() {
        let window = ObservationWindow::from_day_of_year(2017, 233, 15, 21);
        let midnight = Epoch::from_gregorian_utc_at_midnight(2017, 8, 21);

        assert_eq!(window.start, midnight + 15.0 * Unit::Hour);
        assert_eq!(window.end, midnight + 21.0 * Unit::Hour);
        assert!(window.contains(midnight + 18.0 * Unit::Hour));
        assert!(!window.contains(midnight + 22.0 * Unit::Hour));

        let master = window.master_times(1);
        assert_eq!(master.len(), 6 * 3600);
        assert_eq!(master.start, window.start.to_unix_seconds().round() as i64);

        let master = window.master_times(30);
        assert_eq!(master.len(), 720);
    }

    #[test]
    fn exact_membership() {
        let master = MasterTimes {
            start: 1_000,
            resolution_s: 30,
            len: 10,
        };
        assert_eq!(master.index_of(1_000), Some(0));
        assert_eq!(master.index_of(1_030), Some(1));
        assert_eq!(master.index_of(1_015), None);
        assert_eq!(master.index_of(970), None);
        assert_eq!(master.index_of(1_300), None);
        assert_eq!(master.index_of(1_270), Some(9));
        assert_eq!(master.index_of_f64(1_060.0), Some(2));
        assert_eq!(master.index_of_f64(1_060.5), None);
        assert_eq!(master.times().last(), Some(1_270));
    }
}
