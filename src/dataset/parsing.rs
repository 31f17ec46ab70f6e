use gnss_rs::prelude::SV;
use scan_fmt::scan_fmt;

use crate::{
    dataset::{Dataset, END_OF_RECORD, VERSION, VERSION_MARKER},
    differential::{Grid, ReceiverRecord},
    errors::ParsingError,
    window::MasterTimes,
};

use std::{
    fs::File,
    io::{BufRead, BufReader, Lines, Read},
    iter::Enumerate,
    path::Path,
    str::FromStr,
};

#[cfg(feature = "flate2")]
use flate2::read::GzDecoder;

fn parse_version(s: &str) -> Result<u16, ParsingError> {
    if !s.starts_with(VERSION_MARKER) {
        return Err(ParsingError::MissingMarker);
    }
    s[VERSION_MARKER.len()..]
        .trim()
        .parse::<u16>()
        .or(Err(ParsingError::VersionFormat))
}

fn parse_satellites(s: &str) -> Result<Vec<SV>, ParsingError> {
    let content = s
        .strip_prefix("SATELLITES =")
        .ok_or(ParsingError::SatelliteFormat(s.to_string()))?;

    content
        .split_ascii_whitespace()
        .map(|item| SV::from_str(item).or(Err(ParsingError::SatelliteFormat(item.to_string()))))
        .collect()
}

fn parse_obstimes(s: &str) -> Result<MasterTimes, ParsingError> {
    let (start, resolution_s, len) = scan_fmt!(s, "OBSTIMES = {d} {d} {d}", i64, u32, usize);
    match (start, resolution_s, len) {
        (Some(start), Some(resolution_s), Some(len)) if resolution_s > 0 => Ok(MasterTimes {
            start,
            resolution_s,
            len,
        }),
        _ => Err(ParsingError::ObsTimesFormat),
    }
}

fn fill_row(grid: &mut Grid, row: usize, values: &[f64]) {
    grid.row_mut(row).copy_from_slice(values);
}

/// [DatasetReader] streams the [ReceiverRecord]s of a dataset,
/// one at a time, once its header has been parsed.
pub struct DatasetReader<B: BufRead> {
    lines: Enumerate<Lines<B>>,
    obstimes: MasterTimes,
    satellites: Vec<SV>,
    done: bool,
}

impl<B: BufRead> DatasetReader<B> {
    /// Parses the dataset header
    pub fn new(reader: B) -> Result<Self, ParsingError> {
        let mut lines = reader.lines().enumerate();

        let mut next_line = || -> Result<String, ParsingError> {
            let (_, line) = lines.next().ok_or(ParsingError::MissingMarker)?;
            Ok(line?)
        };

        let version = parse_version(next_line()?.trim())?;
        if version > VERSION {
            return Err(ParsingError::UnsupportedVersion(version));
        }

        let satellites = parse_satellites(next_line()?.trim())?;
        let obstimes = parse_obstimes(next_line()?.trim())?;

        Ok(Self {
            lines,
            obstimes,
            satellites,
            done: false,
        })
    }

    /// Dataset [MasterTimes]
    pub fn obstimes(&self) -> MasterTimes {
        self.obstimes
    }

    /// Dataset satellites
    pub fn satellites(&self) -> &[SV] {
        &self.satellites
    }

    fn next_record(&mut self) -> Result<Option<ReceiverRecord>, ParsingError> {
        let nsv = self.satellites.len();
        let mut current: Option<ReceiverRecord> = None;

        for (i, line) in self.lines.by_ref() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() {
                continue;
            }

            if let Some(receiver) = line.strip_prefix("RCVR = ") {
                if let Some(record) = current.take() {
                    return Err(ParsingError::UnterminatedRecord(record.receiver));
                }
                current = Some(ReceiverRecord::new(
                    receiver.trim(),
                    &self.satellites,
                    self.obstimes.len(),
                ));
            } else if line.eq(END_OF_RECORD) {
                if let Some(record) = current.take() {
                    return Ok(Some(record));
                }
            } else if let Some(record) = current.as_mut() {
                let items = line.split_ascii_whitespace().collect::<Vec<_>>();
                if items.len() != 1 + 4 * nsv {
                    return Err(ParsingError::FieldCount(i + 1));
                }

                let row = items[0]
                    .parse::<usize>()
                    .or(Err(ParsingError::InvalidNumber))?;

                if row >= self.obstimes.len() {
                    return Err(ParsingError::RowOutOfBounds(row));
                }

                let values = items[1..]
                    .iter()
                    .map(|item| item.parse::<f64>().or(Err(ParsingError::InvalidNumber)))
                    .collect::<Result<Vec<_>, _>>()?;

                fill_row(&mut record.lat, row, &values[..nsv]);
                fill_row(&mut record.lon, row, &values[nsv..2 * nsv]);
                fill_row(&mut record.res, row, &values[2 * nsv..3 * nsv]);
                fill_row(&mut record.dtec, row, &values[3 * nsv..]);
            }
        }

        match current {
            Some(record) => Err(ParsingError::UnterminatedRecord(record.receiver)),
            None => Ok(None),
        }
    }
}

impl DatasetReader<BufReader<File>> {
    /// Opens this local dataset file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ParsingError> {
        let fd = File::open(path)?;
        Self::new(BufReader::new(fd))
    }
}

#[cfg(feature = "flate2")]
#[cfg_attr(docrs, doc(cfg(feature = "flate2")))]
impl DatasetReader<BufReader<GzDecoder<File>>> {
    /// Opens this gzip compressed local dataset file
    pub fn from_gzip_file<P: AsRef<Path>>(path: P) -> Result<Self, ParsingError> {
        let fd = File::open(path)?;
        Self::new(BufReader::new(GzDecoder::new(fd)))
    }
}

impl<B: BufRead> Iterator for DatasetReader<B> {
    type Item = Result<ReceiverRecord, ParsingError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            },
            Err(e) => {
                self.done = true;
                Some(Err(e))
            },
        }
    }
}

impl Dataset {
    /// Parse [Dataset] from any [Read]able input.
    /// Every record is retained: prefer [DatasetReader] on large campaigns.
    pub fn parse<R: Read>(reader: &mut BufReader<R>) -> Result<Self, ParsingError> {
        let mut reader = DatasetReader::new(reader)?;
        let records = reader.by_ref().collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            obstimes: reader.obstimes,
            satellites: reader.satellites,
            records,
        })
    }
}

#[cfg(test)]
mod test {
    use super::{parse_obstimes, parse_satellites, parse_version};
    use crate::{
        dataset::{Dataset, DatasetWriter},
        differential::ReceiverRecord,
        errors::ParsingError,
        window::MasterTimes,
    };
    use gnss_rs::prelude::{Constellation, SV};
    use std::io::BufReader;

    #[test]
    fn header_fields() {
        assert_eq!(parse_version("DTEC DATASET VERSION = 1").unwrap(), 1);
        assert!(parse_version("TEC OBSERVATION FILE").is_err());

        assert_eq!(
            parse_satellites("SATELLITES = G02 G25").unwrap(),
            vec![SV::new(Constellation::GPS, 2), SV::new(Constellation::GPS, 25)]
        );

        assert_eq!(
            parse_obstimes("OBSTIMES = 1503327600 1 21600").unwrap(),
            MasterTimes {
                start: 1_503_327_600,
                resolution_s: 1,
                len: 21_600,
            }
        );
        assert!(parse_obstimes("OBSTIMES = 1503327600 0 21600").is_err());
    }

    #[test]
    fn written_dataset_is_parsed_back() {
        let svs = [SV::new(Constellation::GPS, 12), SV::new(Constellation::GPS, 17)];
        let master = MasterTimes {
            start: 1_503_327_600,
            resolution_s: 1,
            len: 100,
        };

        let mut mnab = ReceiverRecord::new("mnab", &svs, 100);
        mnab.lat.set(10, 0, 44.123456789);
        mnab.lon.set(10, 0, -94.5);
        mnab.res.set(10, 0, 0.0125);
        mnab.dtec.set(40, 1, -1.75);

        let wiab = ReceiverRecord::new("wiab", &svs, 100);

        let mut writer = DatasetWriter::new(Vec::new(), master, &svs).unwrap();
        writer.write_record(&mnab).unwrap();
        writer.write_record(&wiab).unwrap();
        let content = writer.finish().unwrap();

        let dataset = Dataset::parse(&mut BufReader::new(content.as_slice())).unwrap();

        assert_eq!(dataset.obstimes, master);
        assert_eq!(dataset.satellites, svs.to_vec());
        assert_eq!(dataset.receivers().collect::<Vec<_>>(), vec!["mnab", "wiab"]);

        let parsed = dataset.record("mnab").unwrap();
        assert_eq!(parsed.lat.get(10, 0), 44.123456789);
        assert_eq!(parsed.lon.get(10, 0), -94.5);
        assert_eq!(parsed.res.get(10, 0), 0.0125);
        assert_eq!(parsed.dtec.get(40, 1), -1.75);
        assert!(parsed.dtec.get(10, 0).is_nan());
        assert!(parsed.lat.get(40, 0).is_nan());

        let parsed = dataset.record("wiab").unwrap();
        assert!((0..100).all(|row| !parsed.row_has_data(row)));
    }

    #[test]
    fn unterminated_record() {
        let content = "DTEC DATASET VERSION = 1
SATELLITES = G02
OBSTIMES = 0 1 10
RCVR = mnab
3 1.0 2.0 3.0 4.0
";
        assert!(matches!(
            Dataset::parse(&mut BufReader::new(content.as_bytes())),
            Err(ParsingError::UnterminatedRecord(_))
        ));
    }
}
