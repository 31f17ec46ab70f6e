use log::debug;

use crate::{
    day::RawDay,
    reader::{DayReader, DayRequest, ObservationFile, ReadError},
};

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

#[cfg(feature = "flate2")]
use flate2::read::GzDecoder;

/// Observation file extension
const EXTENSION: &str = "tec";

/// [DirectoryReader] reads [ObservationFile]s stored as
/// `{root}/{doy:03}/{receiver}{doy:03}0.tec`, one directory per day of year.
/// With the `flate2` feature, `.tec.gz` files are read as well.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryReader {
    root: PathBuf,
    vertical: bool,
}

impl DirectoryReader {
    /// Builds a [DirectoryReader] rooted at this path.
    /// Slant TEC is converted to vertical TEC by default.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            vertical: true,
        }
    }

    /// Returns a new [DirectoryReader] with vertical conversion enabled or not
    pub fn with_vertical(&self, vertical: bool) -> Self {
        let mut s = self.clone();
        s.vertical = vertical;
        s
    }

    /// Directory holding all files of that day of year
    pub fn day_directory(&self, doy: u16) -> PathBuf {
        self.root.join(format!("{:03}", doy))
    }

    /// File name of this receiver and day of year
    pub fn file_name(receiver: &str, doy: u16) -> String {
        format!("{}{:03}0.{}", receiver, doy, EXTENSION)
    }

    /// Recovers the receiver identifier from a file name of that day of year
    /// ```
    /// use eclipse_dtec::prelude::DirectoryReader;
    ///
    /// assert_eq!(
    ///     DirectoryReader::receiver_from_file_name("mnab2330.tec", 233),
    ///     Some("mnab".to_string()),
    /// );
    /// assert_eq!(DirectoryReader::receiver_from_file_name("mnab2320.tec", 233), None);
    /// ```
    pub fn receiver_from_file_name(file_name: &str, doy: u16) -> Option<String> {
        let file_name = file_name.strip_suffix(".gz").unwrap_or(file_name);
        let suffix = format!("{:03}0.{}", doy, EXTENSION);
        let receiver = file_name.strip_suffix(&suffix)?;
        if receiver.is_empty() {
            None
        } else {
            Some(receiver.to_string())
        }
    }

    /// Path of this receiver and day of year
    pub fn path(&self, receiver: &str, doy: u16) -> PathBuf {
        self.day_directory(doy).join(Self::file_name(receiver, doy))
    }

    /// Opens and parses the [ObservationFile] of this receiver and day of year
    pub fn open(&self, receiver: &str, doy: u16) -> Result<ObservationFile, ReadError> {
        let path = self.path(receiver, doy);

        if path.exists() {
            debug!("parsing {}", path.display());
            let fd = File::open(&path)?;
            let mut reader = BufReader::new(fd);
            return Ok(ObservationFile::parse(&mut reader)?);
        }

        #[cfg(feature = "flate2")]
        {
            let mut gz = path.clone().into_os_string();
            gz.push(".gz");
            let gz = PathBuf::from(gz);
            if gz.exists() {
                debug!("parsing {}", gz.display());
                let fd = File::open(&gz)?;
                let mut reader = BufReader::new(GzDecoder::new(fd));
                return Ok(ObservationFile::parse(&mut reader)?);
            }
        }

        Err(ReadError::NotAvailable {
            receiver: receiver.to_string(),
            doy,
        })
    }
}

impl DayReader for DirectoryReader {
    fn read_day(&self, request: &DayRequest) -> Result<RawDay, ReadError> {
        let file = self.open(request.receiver, request.doy)?;

        let raw = file.satellite_day(
            request.sv,
            &request.window,
            request.elevation_mask_deg,
            self.vertical,
        );

        if raw.is_empty() {
            return Err(ReadError::NoSamples {
                receiver: request.receiver.to_string(),
                doy: request.doy,
                sv: request.sv,
            });
        }

        Ok(raw)
    }
}
