//! Campaign configuration
use gnss_rs::prelude::{Constellation, SV};
use thiserror::Error;

use crate::{
    detrend::{PolynomialDetrender, Segmenter, DEFAULT_EDGE_MARGIN},
    window::{MasterTimes, ObservationWindow},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::str::FromStr;

/// GPS satellites processed in the 2017 campaign
const DEFAULT_GPS_PRN: [u8; 8] = [2, 5, 6, 12, 17, 19, 24, 25];

/// Default clock correction applied to the reference day (hours)
pub const DEFAULT_HOUR_CORRECTION: i64 = 24;

#[derive(Debug, Error, PartialEq)]
pub enum RuleParsingError {
    #[error("expecting prefix:day:substitute_day:hours")]
    Format,
    #[error("invalid day of year")]
    DayOfYear,
    #[error("invalid hour correction")]
    HourCorrection,
}

/// [DayPair] is the couple of days being compared
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DayPair {
    /// Quiet (non eclipse) day of year
    pub reference: u16,
    /// Eclipse day of year
    pub eclipse: u16,
}

impl Default for DayPair {
    fn default() -> Self {
        Self {
            reference: 232,
            eclipse: 233,
        }
    }
}

impl DayPair {
    /// Days in processing order: reference first, eclipse last
    pub fn days(&self) -> [u16; 2] {
        [self.reference, self.eclipse]
    }
}

/// [SpecialCaseRule] substitutes the day of year read for receivers
/// whose identifier starts with `prefix`, and overrides the clock correction
/// applied to their reference day.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpecialCaseRule {
    /// Receiver identifier prefix
    pub prefix: String,
    /// Day of year this rule applies to
    pub day: u16,
    /// Day of year actually read
    pub substitute_day: u16,
    /// Clock correction (hours) applied to the reference day
    pub hour_correction: i64,
}

impl SpecialCaseRule {
    /// True if this rule applies to this receiver
    pub fn matches_receiver(&self, receiver: &str) -> bool {
        receiver.starts_with(&self.prefix)
    }
}

impl FromStr for SpecialCaseRule {
    type Err = RuleParsingError;

    /// Parses `prefix:day:substitute_day:hours`, for example `mn:232:231:48`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let items = s.trim().split(':').collect::<Vec<_>>();
        if items.len() != 4 || items[0].is_empty() {
            return Err(RuleParsingError::Format);
        }

        let day = items[1]
            .parse::<u16>()
            .or(Err(RuleParsingError::DayOfYear))?;

        let substitute_day = items[2]
            .parse::<u16>()
            .or(Err(RuleParsingError::DayOfYear))?;

        let hour_correction = items[3]
            .parse::<i64>()
            .or(Err(RuleParsingError::HourCorrection))?;

        Ok(Self {
            prefix: items[0].to_string(),
            day,
            substitute_day,
            hour_correction,
        })
    }
}

impl std::fmt::Display for SpecialCaseRule {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.prefix, self.day, self.substitute_day, self.hour_correction
        )
    }
}

/// [SpecialCases] is the table of per campaign calibration quirks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpecialCases {
    rules: Vec<SpecialCaseRule>,
}

impl SpecialCases {
    /// 2017 campaign table: Minnesota ("mn") receivers read day 231
    /// in place of day 232, corrected by 48 hours.
    pub fn eclipse_2017() -> Self {
        Self::default().with_rule(SpecialCaseRule {
            prefix: "mn".to_string(),
            day: 232,
            substitute_day: 231,
            hour_correction: 48,
        })
    }

    /// Returns a new table with this additional [SpecialCaseRule]
    pub fn with_rule(&self, rule: SpecialCaseRule) -> Self {
        let mut s = self.clone();
        s.rules.push(rule);
        s
    }

    /// Iterates all [SpecialCaseRule]s
    pub fn rules(&self) -> impl Iterator<Item = &SpecialCaseRule> {
        self.rules.iter()
    }

    /// Returns the first [SpecialCaseRule] matching this receiver and day of year
    pub fn resolve(&self, receiver: &str, doy: u16) -> Option<&SpecialCaseRule> {
        self.rules
            .iter()
            .find(|rule| rule.day == doy && rule.matches_receiver(receiver))
    }

    /// Day of year to be read for this receiver
    pub fn effective_day(&self, receiver: &str, doy: u16) -> u16 {
        self.resolve(receiver, doy)
            .map(|rule| rule.substitute_day)
            .unwrap_or(doy)
    }
}

/// Campaign [Config]uration. The [Default] reproduces the
/// August 21st 2017 total solar eclipse campaign.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Campaign year
    pub year: i32,
    /// Compared days
    pub days: DayPair,
    /// Observation window start (UTC hour)
    pub start_hour: u8,
    /// Observation window end (UTC hour)
    pub end_hour: u8,
    /// Elevation mask (degrees)
    pub elevation_mask_deg: f64,
    /// Detrending polynomial order
    pub polynomial_order: usize,
    /// Satellites to process
    pub satellites: Vec<SV>,
    /// Maximal gap (samples) within an interval
    pub max_gap: usize,
    /// Maximal jump (TECu) within an interval
    pub max_jump: f64,
    /// Observation sampling interval (s)
    pub sample_interval_s: u32,
    /// [MasterTimes] resolution (s)
    pub master_resolution_s: u32,
    /// Samples invalidated at both ends of each daily trend
    pub edge_margin: usize,
    /// Clock correction (hours) applied to the reference day
    pub hour_correction: i64,
    /// Convert slant TEC to vertical TEC
    pub vertical: bool,
    /// Output dataset name
    pub output_name: String,
    /// Per receiver calibration quirks
    pub special_cases: SpecialCases,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            year: 2017,
            days: DayPair::default(),
            start_hour: 15,
            end_hour: 21,
            elevation_mask_deg: 40.0,
            polynomial_order: PolynomialDetrender::default().order,
            satellites: DEFAULT_GPS_PRN
                .iter()
                .map(|prn| SV::new(Constellation::GPS, *prn))
                .collect(),
            max_gap: Segmenter::default().max_gap,
            max_jump: Segmenter::default().max_jump,
            sample_interval_s: 30,
            master_resolution_s: 1,
            edge_margin: DEFAULT_EDGE_MARGIN,
            hour_correction: DEFAULT_HOUR_CORRECTION,
            vertical: true,
            output_name: "dtec".to_string(),
            special_cases: SpecialCases::eclipse_2017(),
        }
    }
}

impl Config {
    /// Returns a new [Config] with desired year and [DayPair]
    pub fn with_days(&self, year: i32, days: DayPair) -> Self {
        let mut s = self.clone();
        s.year = year;
        s.days = days;
        s
    }

    /// Returns a new [Config] with desired observation window (UTC hours)
    pub fn with_hours(&self, start_hour: u8, end_hour: u8) -> Self {
        let mut s = self.clone();
        s.start_hour = start_hour;
        s.end_hour = end_hour;
        s
    }

    /// Returns a new [Config] with desired elevation mask (degrees)
    pub fn with_elevation_mask(&self, mask_deg: f64) -> Self {
        let mut s = self.clone();
        s.elevation_mask_deg = mask_deg;
        s
    }

    /// Returns a new [Config] with desired polynomial order
    pub fn with_polynomial_order(&self, order: usize) -> Self {
        let mut s = self.clone();
        s.polynomial_order = order;
        s
    }

    /// Returns a new [Config] with desired satellites
    pub fn with_satellites(&self, satellites: &[SV]) -> Self {
        let mut s = self.clone();
        s.satellites = satellites.to_vec();
        s
    }

    /// Returns a new [Config] with desired gap (samples) and jump (TECu) thresholds
    pub fn with_thresholds(&self, max_gap: usize, max_jump: f64) -> Self {
        let mut s = self.clone();
        s.max_gap = max_gap;
        s.max_jump = max_jump;
        s
    }

    /// Returns a new [Config] with desired sampling interval (s)
    pub fn with_sample_interval(&self, interval_s: u32) -> Self {
        let mut s = self.clone();
        s.sample_interval_s = interval_s;
        s
    }

    /// Returns a new [Config] with desired [MasterTimes] resolution (s)
    pub fn with_master_resolution(&self, resolution_s: u32) -> Self {
        let mut s = self.clone();
        s.master_resolution_s = resolution_s;
        s
    }

    /// Returns a new [Config] with desired edge margin (samples)
    pub fn with_edge_margin(&self, margin: usize) -> Self {
        let mut s = self.clone();
        s.edge_margin = margin;
        s
    }

    /// Returns a new [Config] with desired default clock correction (hours)
    pub fn with_hour_correction(&self, hours: i64) -> Self {
        let mut s = self.clone();
        s.hour_correction = hours;
        s
    }

    /// Returns a new [Config] with vertical TEC conversion enabled or not
    pub fn with_vertical(&self, vertical: bool) -> Self {
        let mut s = self.clone();
        s.vertical = vertical;
        s
    }

    /// Returns a new [Config] with desired output name
    pub fn with_output_name(&self, name: &str) -> Self {
        let mut s = self.clone();
        s.output_name = name.to_string();
        s
    }

    /// Returns a new [Config] with desired [SpecialCases] table
    pub fn with_special_cases(&self, special_cases: SpecialCases) -> Self {
        let mut s = self.clone();
        s.special_cases = special_cases;
        s
    }

    /// [Segmenter] described by this [Config]
    pub fn segmenter(&self) -> Segmenter {
        Segmenter::default()
            .with_max_gap(self.max_gap)
            .with_max_jump(self.max_jump)
    }

    /// [PolynomialDetrender] described by this [Config]
    pub fn detrender(&self) -> PolynomialDetrender {
        PolynomialDetrender::new(self.polynomial_order)
    }

    /// [ObservationWindow] of this day of year
    pub fn window(&self, doy: u16) -> ObservationWindow {
        ObservationWindow::from_day_of_year(self.year, doy, self.start_hour, self.end_hour)
    }

    /// Campaign [MasterTimes], spanning the eclipse day window
    pub fn master_times(&self) -> MasterTimes {
        self.window(self.days.eclipse).master_times(self.master_resolution_s)
    }

    /// Day of year actually read for this receiver
    pub fn effective_day(&self, receiver: &str, doy: u16) -> u16 {
        self.special_cases.effective_day(receiver, doy)
    }

    /// Clock correction (hours) applied to the reference day of this receiver
    pub fn hour_correction(&self, receiver: &str) -> i64 {
        self.special_cases
            .resolve(receiver, self.days.reference)
            .map(|rule| rule.hour_correction)
            .unwrap_or(self.hour_correction)
    }
}
