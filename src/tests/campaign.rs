#[cfg(test)]
mod test {
    use crate::{
        campaign::Campaign,
        config::Config,
        dataset::{Dataset, DatasetWriter},
        report::DiagnosticKind,
        tests::toolkit::{synthetic_day, MemoryReader},
    };
    use gnss_rs::prelude::{Constellation, SV};
    use hifitime::prelude::Unit;
    use std::io::BufReader;

    fn g02() -> SV {
        SV::new(Constellation::GPS, 2)
    }

    fn config() -> Config {
        Config::default().with_satellites(&[g02()])
    }

    #[test]
    fn complete_day_pair() {
        let cfg = config();
        let reader = MemoryReader::default()
            .with_day("p001", 232, g02(), synthetic_day(2017, 232, 720, 0.0))
            .with_day("p001", 233, g02(), synthetic_day(2017, 233, 720, 0.0));

        let campaign = Campaign::new(&cfg, &reader);
        let master = campaign.master_times();
        assert_eq!(master.len(), 21_600);

        let (record, diagnostics) = campaign.process_receiver("p001", &master);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);

        // identical days: null differential on every 30s row
        for row in (0..21_600).step_by(30) {
            assert_eq!(record.dtec.get(row, 0), 0.0, "row {}", row);
            assert!(record.lat.get(row, 0).is_finite());
        }
        assert!(record.dtec.get(15, 0).is_nan());

        // trimmed edges
        assert!(record.res.get(0, 0).is_nan());
        assert!(record.res.get(300, 0).is_finite());
    }

    #[test]
    fn off_grid_receiver() {
        let cfg = config();

        let mut eclipse = synthetic_day(2017, 233, 720, 0.0);
        let mut reference = synthetic_day(2017, 232, 720, 0.0);
        for epoch in eclipse.epochs.iter_mut().chain(reference.epochs.iter_mut()) {
            *epoch = *epoch + 15.0 * Unit::Second;
        }

        let reader = MemoryReader::default()
            .with_day("p001", 232, g02(), reference)
            .with_day("p001", 233, g02(), eclipse);

        let campaign = Campaign::new(&cfg, &reader);
        let (record, diagnostics) = campaign.process_receiver("p001", &campaign.master_times());
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);

        // differential shares the pierce point rows
        let rows = (0..record.rows())
            .filter(|row| record.dtec.get(*row, 0).is_finite())
            .collect::<Vec<_>>();

        assert_eq!(rows.len(), 720);
        assert_eq!(rows[0], 15);
        assert!(rows.iter().all(|row| record.lat.get(*row, 0).is_finite()));
    }

    #[test]
    fn single_day_receiver() {
        let cfg = config();
        let reader = MemoryReader::default().with_day(
            "wiab",
            233,
            g02(),
            synthetic_day(2017, 233, 720, 0.0),
        );

        let campaign = Campaign::new(&cfg, &reader);
        let master = campaign.master_times();

        let (record, diagnostics) = campaign.process_receiver("wiab", &master);

        assert!(record.dtec.column(0).all(|v| v.is_nan()));
        assert_eq!(record.lat.column(0).filter(|v| v.is_finite()).count(), 720);

        let kinds = diagnostics.iter().map(|d| d.kind).collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![DiagnosticKind::MissingDay, DiagnosticKind::IncompleteDayPair]
        );
        assert_eq!(diagnostics[0].doy, Some(232));
        assert_eq!(diagnostics[0].sv, Some(g02()));
    }

    #[test]
    fn special_case_receiver() {
        let cfg = config();
        let reader = MemoryReader::default()
            .with_day("mnab", 231, g02(), synthetic_day(2017, 231, 720, 0.0))
            .with_day("mnab", 233, g02(), synthetic_day(2017, 233, 720, 0.0))
            .with_day("mncd", 232, g02(), synthetic_day(2017, 232, 720, 0.0))
            .with_day("mncd", 233, g02(), synthetic_day(2017, 233, 720, 0.0));

        let campaign = Campaign::new(&cfg, &reader);
        let master = campaign.master_times();

        // 231 read in place of 232, aligned with a 48h correction
        let (record, diagnostics) = campaign.process_receiver("mnab", &master);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        assert_eq!(record.dtec.get(0, 0), 0.0);

        // day 232 is never read for this receiver
        let (record, diagnostics) = campaign.process_receiver("mncd", &master);
        assert!(record.dtec.column(0).all(|v| v.is_nan()));
        assert_eq!(diagnostics[0].kind, DiagnosticKind::MissingDay);
        assert_eq!(diagnostics[0].doy, Some(231));

        // other receivers are not affected
        assert_eq!(cfg.hour_correction("p001"), 24);
    }

    #[test]
    fn short_interval() {
        let cfg = config();

        let mut raw = synthetic_day(2017, 233, 720, 0.0);
        for value in raw.tec.iter_mut().take(40).skip(5) {
            *value = f64::NAN;
        }

        let reader = MemoryReader::default()
            .with_day("p001", 232, g02(), synthetic_day(2017, 232, 720, 0.0))
            .with_day("p001", 233, g02(), raw);

        let campaign = Campaign::new(&cfg, &reader);
        let (record, diagnostics) = campaign.process_receiver("p001", &campaign.master_times());

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::InsufficientData);
        assert_eq!(diagnostics[0].doy, Some(233));

        // raw TEC differential remains available
        assert_eq!(record.dtec.get(0, 0), 0.0);
        assert!(record.dtec.get(10 * 30, 0).is_nan());
        assert!(record.res.get(0, 0).is_nan());
    }

    #[test]
    fn campaign_dataset() {
        let cfg = config();
        let reader = MemoryReader::default()
            .with_day("p001", 232, g02(), synthetic_day(2017, 232, 720, 0.1))
            .with_day("p001", 233, g02(), synthetic_day(2017, 233, 720, 0.1))
            .with_day("wiab", 233, g02(), synthetic_day(2017, 233, 720, 0.0));

        let campaign = Campaign::new(&cfg, &reader);

        let receivers = vec!["wiab".to_string(), "p001".to_string(), "none".to_string()];

        let mut writer =
            DatasetWriter::new(Vec::new(), campaign.master_times(), &cfg.satellites).unwrap();

        let report = campaign.run(&receivers, &mut writer).unwrap();
        assert_eq!(report.receivers, receivers);
        assert_eq!(report.of_kind(DiagnosticKind::IncompleteDayPair).count(), 2);
        assert_eq!(report.counts()[&DiagnosticKind::MissingDay], 3);

        let content = writer.finish().unwrap();
        let dataset = Dataset::parse(&mut BufReader::new(content.as_slice())).unwrap();

        assert_eq!(dataset.obstimes, campaign.master_times());
        assert_eq!(dataset.receivers().collect::<Vec<_>>(), vec!["wiab", "p001", "none"]);

        let p001 = dataset.record("p001").unwrap();
        assert_eq!(p001.dtec.column(0).filter(|v| v.is_finite()).count(), 720);
        assert!(p001.dtec.column(0).filter(|v| v.is_finite()).all(|v| v.abs() < 0.2));

        let none = dataset.record("none").unwrap();
        assert!((0..none.rows()).all(|row| !none.row_has_data(row)));
    }
}
