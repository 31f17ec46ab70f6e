//! Interval segmentation
use itertools::Itertools;
use log::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default maximal gap (in samples) tolerated inside an [Interval]
pub const DEFAULT_MAX_GAP: usize = 16;

/// Default maximal jump (in TECu) tolerated between two consecutive valid samples
pub const DEFAULT_MAX_JUMP: f64 = 1.0;

/// [Interval] is a contiguous run of samples, described
/// as the half-open index range `[start, end)` into its series.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Interval {
    /// First sample
    pub start: usize,
    /// One past the last sample
    pub end: usize,
}

impl Interval {
    /// Number of samples covered by this [Interval]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True if this [Interval] covers nothing
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Index range of this [Interval]
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// Result of a [Segmenter] pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Segmentation {
    /// Indices of all finite samples
    pub valid: Vec<usize>,
    /// Maximal runs, sorted and non overlapping
    pub intervals: Vec<Interval>,
}

/// [Segmenter] splits a TEC series into [Interval]s
/// that contain neither data gaps nor jumps.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Segmenter {
    /// A new [Interval] starts when the index distance between
    /// two consecutive valid samples exceeds this value.
    pub max_gap: usize,
    /// A new [Interval] starts when the absolute difference between
    /// two consecutive valid samples exceeds this value.
    pub max_jump: f64,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self {
            max_gap: DEFAULT_MAX_GAP,
            max_jump: DEFAULT_MAX_JUMP,
        }
    }
}

impl Segmenter {
    /// Builds a [Segmenter] with desired gap and jump thresholds
    pub fn new(max_gap: usize, max_jump: f64) -> Self {
        Self { max_gap, max_jump }
    }

    /// Returns a new [Segmenter] with desired gap tolerance (in samples)
    pub fn with_max_gap(&self, max_gap: usize) -> Self {
        let mut s = *self;
        s.max_gap = max_gap;
        s
    }

    /// Returns a new [Segmenter] with desired jump tolerance
    pub fn with_max_jump(&self, max_jump: f64) -> Self {
        let mut s = *self;
        s.max_jump = max_jump;
        s
    }

    /// Scans the series and returns the valid samples and [Interval]s.
    /// A lone valid sample never forms an [Interval].
    pub fn segment(&self, tec: &[f64]) -> Segmentation {
        let valid = tec
            .iter()
            .enumerate()
            .filter_map(|(i, v)| if v.is_finite() { Some(i) } else { None })
            .collect::<Vec<_>>();

        let mut intervals = Vec::new();

        let Some(&first) = valid.first() else {
            return Segmentation { valid, intervals };
        };

        let mut start = first;
        let mut last = first;

        for (&prev, &i) in valid.iter().tuple_windows() {
            let gap = i - prev;
            let jump = (tec[i] - tec[prev]).abs();

            if gap > self.max_gap || jump > self.max_jump {
                debug!("interval break @{} (gap={}, jump={:.3})", i, gap, jump);
                Self::close(&mut intervals, start, last);
                start = i;
            }
            last = i;
        }

        Self::close(&mut intervals, start, last);

        Segmentation { valid, intervals }
    }

    fn close(intervals: &mut Vec<Interval>, start: usize, last: usize) {
        if last > start {
            intervals.push(Interval {
                start,
                end: last + 1,
            });
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Interval, Segmenter};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn smooth_series(len: usize) -> Vec<f64> {
        (0..len).map(|i| 20.0 + 0.01 * i as f64).collect()
    }

    #[test]
    fn gap_splits_series() {
        let mut tec = smooth_series(100);
        for value in tec.iter_mut().take(60).skip(40) {
            *value = f64::NAN;
        }

        let seg = Segmenter::new(16, 1.0).segment(&tec);

        assert_eq!(
            seg.intervals,
            vec![
                Interval { start: 0, end: 40 },
                Interval {
                    start: 60,
                    end: 100
                }
            ]
        );
        assert_eq!(seg.valid.len(), 80);
    }

    #[test]
    fn tolerated_gap() {
        let mut tec = smooth_series(100);
        for value in tec.iter_mut().take(50).skip(40) {
            *value = f64::NAN;
        }

        let seg = Segmenter::new(16, 1.0).segment(&tec);
        assert_eq!(seg.intervals, vec![Interval { start: 0, end: 100 }]);
    }

    #[test]
    fn max_gap_boundary() {
        let segmenter = Segmenter::default().with_max_gap(16).with_max_jump(1.0);
        assert_eq!(segmenter, Segmenter::new(16, 1.0));

        // 15 missing samples: index distance of 16
        let mut tec = smooth_series(100);
        for value in tec.iter_mut().take(55).skip(40) {
            *value = f64::NAN;
        }
        let seg = segmenter.segment(&tec);
        assert_eq!(seg.intervals, vec![Interval { start: 0, end: 100 }]);

        // 16 missing samples: index distance of 17
        let mut tec = smooth_series(100);
        for value in tec.iter_mut().take(56).skip(40) {
            *value = f64::NAN;
        }
        let seg = segmenter.segment(&tec);
        assert_eq!(
            seg.intervals,
            vec![
                Interval { start: 0, end: 40 },
                Interval {
                    start: 56,
                    end: 100
                }
            ]
        );

        // a tighter gap tolerance splits the 15 missing samples
        let mut tec = smooth_series(100);
        for value in tec.iter_mut().take(55).skip(40) {
            *value = f64::NAN;
        }
        let seg = segmenter.with_max_gap(15).segment(&tec);
        assert_eq!(seg.intervals.len(), 2);
    }

    #[test]
    fn jump_splits_series() {
        let mut tec = smooth_series(50);
        for value in tec.iter_mut().skip(30) {
            *value += 5.0;
        }

        let seg = Segmenter::default().segment(&tec);
        assert_eq!(
            seg.intervals,
            vec![
                Interval { start: 0, end: 30 },
                Interval { start: 30, end: 50 }
            ]
        );
    }

    #[test]
    fn empty_and_invalid_series() {
        let seg = Segmenter::default().segment(&[]);
        assert!(seg.intervals.is_empty());
        assert!(seg.valid.is_empty());

        let seg = Segmenter::default().segment(&[f64::NAN; 32]);
        assert!(seg.intervals.is_empty());
        assert!(seg.valid.is_empty());

        let mut tec = [f64::NAN; 32];
        tec[12] = 10.0;
        let seg = Segmenter::default().segment(&tec);
        assert!(seg.intervals.is_empty());
        assert_eq!(seg.valid, vec![12]);
    }

    #[test]
    fn intervals_sorted_and_disjoint() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let segmenter = Segmenter::new(4, 0.5);

        for _ in 0..50 {
            let len = rng.gen_range(0..400);
            let mut value = 20.0;
            let tec = (0..len)
                .map(|_| {
                    value += rng.gen_range(-0.6..0.6);
                    if rng.gen_bool(0.1) {
                        f64::NAN
                    } else {
                        value
                    }
                })
                .collect::<Vec<_>>();

            let seg = segmenter.segment(&tec);

            for interval in seg.intervals.iter() {
                assert!(interval.len() >= 2);
                assert!(tec[interval.start].is_finite());
                assert!(tec[interval.end - 1].is_finite());
            }
            for pair in seg.intervals.windows(2) {
                assert!(pair[0].end <= pair[1].start, "{:?}", pair);
            }
        }
    }
}
