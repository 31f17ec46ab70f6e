use gnss_rs::prelude::SV;
use hifitime::prelude::Unit;
use rand::{distributions::Alphanumeric, rngs::StdRng, Rng, SeedableRng};

use crate::{
    day::{Lla, RawDay},
    reader::{DayReader, DayRequest, ReadError},
    window::ObservationWindow,
};

use std::collections::HashMap;

/// Random lowercase name, for temporary files and directories
pub fn random_name(size: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(size)
        .map(|c| (c as char).to_ascii_lowercase())
        .collect()
}

/// Smooth TEC day sampled every 30s from 15:00 UTC,
/// with uniform noise of this amplitude (TECu).
pub fn synthetic_day(year: i32, doy: u16, size: usize, noise: f64) -> RawDay {
    let window = ObservationWindow::from_day_of_year(year, doy, 15, 21);
    let mut rng = StdRng::seed_from_u64(doy as u64);

    let mut day = RawDay::default();

    for i in 0..size {
        let x = i as f64;

        let mut tec = 20.0 + 0.02 * x - 5.0E-5 * x * x;
        if noise > 0.0 {
            tec += rng.gen_range(-noise..noise);
        }

        day.epochs.push(window.start + (30 * i) as f64 * Unit::Second);
        day.tec.push(tec);
        day.ipp.push(Lla {
            lat_deg: 40.0 + 0.01 * x,
            lon_deg: -100.0 + 0.02 * x,
            alt_km: 350.0,
        });
    }

    day
}

/// In memory [DayReader]
#[derive(Debug, Default, Clone)]
pub struct MemoryReader {
    days: HashMap<(String, u16, SV), RawDay>,
}

impl MemoryReader {
    pub fn with_day(&self, receiver: &str, doy: u16, sv: SV, day: RawDay) -> Self {
        let mut s = self.clone();
        s.days.insert((receiver.to_string(), doy, sv), day);
        s
    }
}

impl DayReader for MemoryReader {
    fn read_day(&self, request: &DayRequest) -> Result<RawDay, ReadError> {
        let has_day = self
            .days
            .keys()
            .any(|(rx, doy, _)| rx == request.receiver && *doy == request.doy);

        if !has_day {
            return Err(ReadError::NotAvailable {
                receiver: request.receiver.to_string(),
                doy: request.doy,
            });
        }

        self.days
            .get(&(request.receiver.to_string(), request.doy, request.sv))
            .cloned()
            .ok_or(ReadError::NoSamples {
                receiver: request.receiver.to_string(),
                doy: request.doy,
                sv: request.sv,
            })
    }
}
