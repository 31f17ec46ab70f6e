use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use eclipse_dtec::prelude::{Config, DayPair, MapQuantity, SpecialCaseRule, SpecialCases, SV};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Differential TEC signatures of a solar eclipse",
    long_about = "Builds differential TEC datasets from a GNSS receiver campaign, and renders them as scatter maps.
Set RUST_LOG=debug for a detailed log."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Process every receiver of a campaign into a dataset
    Process(ProcessArgs),
    /// Render one scatter map per frame of a dataset
    Map(MapArgs),
}

#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Root directory, holding one `DOY` directory per day of year
    #[arg(short, long)]
    pub root: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Dataset name
    #[arg(long, default_value = "dtec")]
    pub name: String,

    /// Gzip compress the dataset
    #[arg(long)]
    pub gzip: bool,

    /// Process these receivers only. Defaults to every receiver
    /// found in the eclipse day directory.
    #[arg(long, value_delimiter = ',')]
    pub receivers: Vec<String>,

    /// Campaign year
    #[arg(long, default_value_t = 2017)]
    pub year: i32,

    /// Eclipse day of year
    #[arg(long, default_value_t = 233)]
    pub eclipse_day: u16,

    /// Reference (quiet) day of year
    #[arg(long, default_value_t = 232)]
    pub reference_day: u16,

    /// Observation window start (UTC hour)
    #[arg(long, default_value_t = 15)]
    pub start_hour: u8,

    /// Observation window end (UTC hour)
    #[arg(long, default_value_t = 21)]
    pub end_hour: u8,

    /// Elevation mask (degrees)
    #[arg(long, default_value_t = 40.0)]
    pub elevation_mask: f64,

    /// Detrending polynomial order
    #[arg(long, default_value_t = 10)]
    pub order: usize,

    /// Satellites to process, for example G02,G05
    #[arg(long, value_delimiter = ',')]
    pub satellites: Vec<SV>,

    /// Largest tolerated gap between valid samples (samples)
    #[arg(long, default_value_t = 16)]
    pub max_gap: usize,

    /// Largest tolerated TEC jump between valid samples (TECu)
    #[arg(long, default_value_t = 1.0)]
    pub max_jump: f64,

    /// Samples nulled at both ends of each day
    #[arg(long, default_value_t = 10)]
    pub edge_margin: usize,

    /// Observation sampling interval (s)
    #[arg(long, default_value_t = 30)]
    pub sample_interval: u32,

    /// Master time grid resolution (s)
    #[arg(long, default_value_t = 1)]
    pub master_resolution: u32,

    /// Clock correction applied to the reference day (hours)
    #[arg(long, default_value_t = 24)]
    pub hour_correction: i64,

    /// Keep slant TEC, do not map to vertical TEC
    #[arg(long)]
    pub slant: bool,

    /// Special case rule `prefix:day:substitute_day:hours`,
    /// added to the 2017 campaign table
    #[arg(long = "rule")]
    pub rules: Vec<SpecialCaseRule>,

    /// Do not apply the 2017 campaign special cases
    #[arg(long)]
    pub no_default_rules: bool,
}

impl ProcessArgs {
    /// [Config] described by these arguments
    pub fn config(&self) -> Config {
        let mut special_cases = if self.no_default_rules {
            SpecialCases::default()
        } else {
            SpecialCases::eclipse_2017()
        };

        for rule in self.rules.iter() {
            special_cases = special_cases.with_rule(rule.clone());
        }

        let mut cfg = Config::default()
            .with_days(
                self.year,
                DayPair {
                    reference: self.reference_day,
                    eclipse: self.eclipse_day,
                },
            )
            .with_hours(self.start_hour, self.end_hour)
            .with_elevation_mask(self.elevation_mask)
            .with_polynomial_order(self.order)
            .with_thresholds(self.max_gap, self.max_jump)
            .with_edge_margin(self.edge_margin)
            .with_sample_interval(self.sample_interval)
            .with_master_resolution(self.master_resolution)
            .with_hour_correction(self.hour_correction)
            .with_vertical(!self.slant)
            .with_output_name(&self.name)
            .with_special_cases(special_cases);

        if !self.satellites.is_empty() {
            cfg = cfg.with_satellites(&self.satellites);
        }

        cfg
    }
}

#[derive(Args, Debug)]
pub struct MapArgs {
    /// Dataset file (`.gz` files are decompressed)
    #[arg(short, long)]
    pub dataset: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = "maps")]
    pub output: PathBuf,

    /// Mapped quantity: dtec or res
    #[arg(short, long, default_value = "dtec")]
    pub quantity: MapQuantity,

    /// Observation sampling, in master rows
    #[arg(long, default_value_t = 30)]
    pub decimate: usize,

    /// Render one frame every `skip` observation samples
    #[arg(long, default_value_t = 2)]
    pub skip: usize,

    /// Totality path limits: `north_lat north_lon south_lat south_lon` rows
    #[arg(long)]
    pub totality: Option<PathBuf>,

    /// Colour scale lower limit. Defaults to -1 TECu for dtec, -0.2 TECu for res.
    #[arg(long, allow_hyphen_values = true)]
    pub cmin: Option<f64>,

    /// Colour scale upper limit. Defaults to 1 TECu for dtec, 0.2 TECu for res.
    #[arg(long, allow_hyphen_values = true)]
    pub cmax: Option<f64>,
}

impl MapArgs {
    /// Colour scale limits
    pub fn color_limits(&self) -> (f64, f64) {
        let (cmin, cmax) = match self.quantity {
            MapQuantity::Dtec => (-1.0, 1.0),
            MapQuantity::Residual => (-0.2, 0.2),
        };
        (self.cmin.unwrap_or(cmin), self.cmax.unwrap_or(cmax))
    }
}
