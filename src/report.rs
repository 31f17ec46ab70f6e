//! Campaign diagnostics
use gnss_rs::prelude::SV;
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;

/// Kind of [Diagnostic]
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    AsRefStr,
    Display,
    EnumString,
    EnumIter,
)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DiagnosticKind {
    /// One day could not be read or processed
    #[strum(serialize = "missing-day")]
    MissingDay,
    /// Some intervals were too short to be fitted
    #[strum(serialize = "insufficient-data")]
    InsufficientData,
    /// Both days exist but could not be aligned
    #[strum(serialize = "alignment")]
    Alignment,
    /// Fewer than two valid days: no differential TEC
    #[strum(serialize = "incomplete-day-pair")]
    IncompleteDayPair,
}

/// [Diagnostic] reports a recoverable failure for one processing unit
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Diagnostic {
    /// [DiagnosticKind]
    pub kind: DiagnosticKind,
    /// Receiver identifier
    pub receiver: String,
    /// Satellite, if relevant
    pub sv: Option<SV>,
    /// Day of year, if relevant
    pub doy: Option<u16>,
    /// Human readable description
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.receiver)?;
        if let Some(sv) = self.sv {
            write!(f, "({})", sv)?;
        }
        if let Some(doy) = self.doy {
            write!(f, " day {}", doy)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Campaign [Report]
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Report {
    /// Receivers written to the dataset, in processing order
    pub receivers: Vec<String>,
    /// Every [Diagnostic], in processing order
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    /// Merges the outcome of one receiver
    pub fn push_receiver(&mut self, receiver: &str, diagnostics: Vec<Diagnostic>) {
        self.receivers.push(receiver.to_string());
        self.diagnostics.extend(diagnostics);
    }

    /// Iterates [Diagnostic]s of this [DiagnosticKind]
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }

    /// Number of [Diagnostic]s per [DiagnosticKind], every kind included
    pub fn counts(&self) -> BTreeMap<DiagnosticKind, usize> {
        DiagnosticKind::iter()
            .map(|kind| (kind, self.of_kind(kind).count()))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::{Diagnostic, DiagnosticKind, Report};
    use gnss_rs::prelude::{Constellation, SV};
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn kinds() {
        for kind in DiagnosticKind::iter() {
            assert_eq!(DiagnosticKind::from_str(kind.as_ref()).unwrap(), kind);
        }
        assert_eq!(DiagnosticKind::MissingDay.to_string(), "missing-day");
    }

    #[test]
    fn report() {
        let mut report = Report::default();
        report.push_receiver(
            "mnab",
            vec![
                Diagnostic {
                    kind: DiagnosticKind::MissingDay,
                    receiver: "mnab".to_string(),
                    sv: Some(SV::new(Constellation::GPS, 2)),
                    doy: Some(231),
                    message: "not available".to_string(),
                },
                Diagnostic {
                    kind: DiagnosticKind::IncompleteDayPair,
                    receiver: "mnab".to_string(),
                    sv: Some(SV::new(Constellation::GPS, 2)),
                    doy: None,
                    message: "one day is missing".to_string(),
                },
            ],
        );
        report.push_receiver("wiab", Vec::new());

        assert_eq!(report.receivers, vec!["mnab", "wiab"]);
        assert_eq!(report.of_kind(DiagnosticKind::MissingDay).count(), 1);
        assert_eq!(report.counts()[&DiagnosticKind::Alignment], 0);
        assert_eq!(report.counts()[&DiagnosticKind::IncompleteDayPair], 1);
        assert_eq!(
            report.diagnostics[0].to_string(),
            "[missing-day] mnab(G02) day 231: not available"
        );
    }
}
