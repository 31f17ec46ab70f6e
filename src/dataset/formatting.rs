use gnss_rs::prelude::SV;
use itertools::Itertools;

use crate::{
    dataset::{END_OF_RECORD, VERSION, VERSION_MARKER},
    differential::{Grid, ReceiverRecord},
    errors::FormattingError,
    window::MasterTimes,
};

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

#[cfg(feature = "flate2")]
use flate2::{write::GzEncoder, Compression};

/// [DatasetWriter] streams [ReceiverRecord]s into a dataset,
/// so records need not be retained once written.
pub struct DatasetWriter<W: Write> {
    writer: BufWriter<W>,
    obstimes: MasterTimes,
    satellites: Vec<SV>,
}

fn push_row(line: &mut String, grid: &Grid, row: usize) {
    for value in grid.row(row) {
        line.push(' ');
        line.push_str(&value.to_string());
    }
}

impl<W: Write> DatasetWriter<W> {
    /// Creates a new [DatasetWriter] and formats the dataset header.
    pub fn new(
        writer: W,
        obstimes: MasterTimes,
        satellites: &[SV],
    ) -> Result<Self, FormattingError> {
        let mut writer = BufWriter::new(writer);

        writeln!(writer, "{}{}", VERSION_MARKER, VERSION)?;
        writeln!(
            writer,
            "SATELLITES = {}",
            satellites.iter().map(|sv| sv.to_string()).join(" ")
        )?;
        writeln!(
            writer,
            "OBSTIMES = {} {} {}",
            obstimes.start, obstimes.resolution_s, obstimes.len
        )?;

        Ok(Self {
            writer,
            obstimes,
            satellites: satellites.to_vec(),
        })
    }

    /// Formats this [ReceiverRecord].
    pub fn write_record(&mut self, record: &ReceiverRecord) -> Result<(), FormattingError> {
        if record.satellites.len() != self.satellites.len() {
            return Err(FormattingError::SatelliteMismatch {
                receiver: record.receiver.clone(),
                expected: self.satellites.len(),
                got: record.satellites.len(),
            });
        }

        if record.rows() != self.obstimes.len() {
            return Err(FormattingError::RowMismatch {
                receiver: record.receiver.clone(),
                expected: self.obstimes.len(),
                got: record.rows(),
            });
        }

        writeln!(self.writer, "RCVR = {}", record.receiver)?;

        let mut line = String::with_capacity(16 * 4 * self.satellites.len());

        for row in 0..record.rows() {
            if !record.row_has_data(row) {
                continue;
            }

            line.clear();
            line.push_str(&row.to_string());

            push_row(&mut line, &record.lat, row);
            push_row(&mut line, &record.lon, row);
            push_row(&mut line, &record.res, row);
            push_row(&mut line, &record.dtec, row);

            writeln!(self.writer, "{}", line)?;
        }

        writeln!(self.writer, "{}", END_OF_RECORD)?;
        Ok(())
    }

    /// Flushes all pending content
    pub fn flush(&mut self) -> Result<(), FormattingError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flushes and returns the underlying writer
    pub fn finish(self) -> Result<W, FormattingError> {
        let writer = self.writer.into_inner().map_err(|e| e.into_error())?;
        Ok(writer)
    }
}

impl DatasetWriter<File> {
    /// Creates a new dataset file
    pub fn create<P: AsRef<Path>>(
        path: P,
        obstimes: MasterTimes,
        satellites: &[SV],
    ) -> Result<Self, FormattingError> {
        let fd = File::create(path)?;
        Self::new(fd, obstimes, satellites)
    }
}

#[cfg(feature = "flate2")]
#[cfg_attr(docrs, doc(cfg(feature = "flate2")))]
impl DatasetWriter<GzEncoder<File>> {
    /// Creates a new gzip compressed dataset file
    pub fn create_gzip<P: AsRef<Path>>(
        path: P,
        obstimes: MasterTimes,
        satellites: &[SV],
    ) -> Result<Self, FormattingError> {
        let fd = File::create(path)?;
        Self::new(GzEncoder::new(fd, Compression::default()), obstimes, satellites)
    }
}
