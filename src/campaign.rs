//! Campaign driver
use gnss_rs::prelude::SV;
use log::{info, warn};

use crate::{
    align::TwoDayAligner,
    config::Config,
    dataset::DatasetWriter,
    day::{DayProcessor, DaySeries},
    differential::{differential, ReceiverRecord},
    errors::Error,
    reader::DayReader,
    report::{Diagnostic, DiagnosticKind, Report},
    window::MasterTimes,
};

use std::io::Write;

/// [Campaign] processes receivers one by one, satellite per satellite,
/// and streams one [ReceiverRecord] per receiver.
///
/// Each receiver is processed independently of the others:
/// the processing order does not affect any record.
pub struct Campaign<'a, R: DayReader> {
    config: &'a Config,
    reader: R,
    processor: DayProcessor,
    aligner: TwoDayAligner,
}

impl<'a, R: DayReader> Campaign<'a, R> {
    /// Builds a new [Campaign]
    pub fn new(config: &'a Config, reader: R) -> Self {
        Self {
            config,
            reader,
            processor: DayProcessor::from_config(config),
            aligner: TwoDayAligner::new(config.sample_interval_s),
        }
    }

    /// Campaign [MasterTimes]
    pub fn master_times(&self) -> MasterTimes {
        self.config.master_times()
    }

    fn diagnostic(
        kind: DiagnosticKind,
        receiver: &str,
        sv: SV,
        doy: Option<u16>,
        message: String,
    ) -> Diagnostic {
        let diag = Diagnostic {
            kind,
            receiver: receiver.to_string(),
            sv: Some(sv),
            doy,
            message,
        };
        warn!("{}", diag);
        diag
    }

    /// Processes both days of this satellite and fills its column.
    fn process_satellite(
        &self,
        receiver: &str,
        sv: SV,
        col: usize,
        master: &MasterTimes,
        record: &mut ReceiverRecord,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let days = self.config.days;

        let mut eclipse: Option<DaySeries> = None;
        let mut reference: Option<DaySeries> = None;

        for doy in days.days() {
            match self
                .processor
                .process_day(&self.reader, self.config, receiver, doy, sv)
            {
                Ok(day) => {
                    if !day.rejected.is_empty() {
                        diagnostics.push(Self::diagnostic(
                            DiagnosticKind::InsufficientData,
                            receiver,
                            sv,
                            Some(day.doy),
                            format!("{} interval(s) left unfitted", day.rejected.len()),
                        ));
                    }
                    if doy == days.eclipse {
                        record.scatter_day(col, master, &day);
                        eclipse = Some(day);
                    } else {
                        reference = Some(day);
                    }
                },
                Err(e) => {
                    diagnostics.push(Self::diagnostic(
                        DiagnosticKind::MissingDay,
                        receiver,
                        sv,
                        Some(self.config.effective_day(receiver, doy)),
                        e.to_string(),
                    ));
                },
            }
        }

        let (Some(eclipse), Some(reference)) = (eclipse, reference) else {
            diagnostics.push(Self::diagnostic(
                DiagnosticKind::IncompleteDayPair,
                receiver,
                sv,
                None,
                "one day is missing".to_string(),
            ));
            return;
        };

        let hour_correction = self.config.hour_correction(receiver);

        match self.aligner.align(&eclipse, &reference, hour_correction) {
            Ok(aligned) => {
                let dtec = differential(&aligned);
                record.scatter_differential(col, master, &aligned, &dtec);
            },
            Err(e) => {
                diagnostics.push(Self::diagnostic(
                    DiagnosticKind::Alignment,
                    receiver,
                    sv,
                    None,
                    Error::from(e).to_string(),
                ));
            },
        }
    }

    /// Processes every satellite of this receiver.
    /// Failures are downgraded to NaN and [Diagnostic]s.
    pub fn process_receiver(
        &self,
        receiver: &str,
        master: &MasterTimes,
    ) -> (ReceiverRecord, Vec<Diagnostic>) {
        let mut record = ReceiverRecord::new(receiver, &self.config.satellites, master.len());
        let mut diagnostics = Vec::new();

        for (col, sv) in self.config.satellites.iter().enumerate() {
            self.process_satellite(receiver, *sv, col, master, &mut record, &mut diagnostics);
        }

        (record, diagnostics)
    }

    /// Processes all receivers sequentially, writing each record as soon
    /// as it is complete. Only dataset I/O failures abort.
    pub fn run<W: Write>(
        &self,
        receivers: &[String],
        writer: &mut DatasetWriter<W>,
    ) -> Result<Report, Error> {
        let master = self.master_times();
        let mut report = Report::default();

        for (i, receiver) in receivers.iter().enumerate() {
            info!(
                "------------ {} {} out of {} ------------",
                receiver,
                i + 1,
                receivers.len()
            );

            let (record, diagnostics) = self.process_receiver(receiver, &master);
            writer.write_record(&record)?;
            report.push_receiver(receiver, diagnostics);
        }

        writer.flush()?;
        Ok(report)
    }
}
