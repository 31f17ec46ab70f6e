//! Eclipse differential TEC command line tool
mod cli;
mod plot;

use clap::Parser;
use env_logger::{Builder, Target};
use itertools::Itertools;
use log::{error, info, warn};
use walkdir::WalkDir;

use eclipse_dtec::prelude::{
    Campaign, Config, DatasetReader, DatasetWriter, DirectoryReader, FrameSelector, Report,
    TotalityPath,
};

use cli::{Cli, Command, MapArgs, ProcessArgs};
use plot::MapPlotter;

use std::{error::Error, fs, path::Path};

/// Every receiver holding a file in the eclipse day directory, sorted
fn discover_receivers(reader: &DirectoryReader, cfg: &Config) -> Vec<String> {
    let doy = cfg.days.eclipse;
    let directory = reader.day_directory(doy);

    WalkDir::new(&directory)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("{}: {}", directory.display(), e);
                None
            },
        })
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let file_name = entry.file_name().to_str()?;
            DirectoryReader::receiver_from_file_name(file_name, doy)
        })
        .sorted()
        .dedup()
        .collect()
}

fn summary(report: &Report) {
    info!("{} receivers processed", report.receivers.len());
    for (kind, count) in report.counts() {
        info!("{}: {}", kind, count);
    }
}

fn process(args: &ProcessArgs) -> Result<(), Box<dyn Error>> {
    let cfg = args.config();
    let reader = DirectoryReader::new(&args.root).with_vertical(cfg.vertical);

    let receivers = if args.receivers.is_empty() {
        discover_receivers(&reader, &cfg)
    } else {
        args.receivers.clone()
    };

    if receivers.is_empty() {
        return Err(format!(
            "no receiver found in {}",
            reader.day_directory(cfg.days.eclipse).display()
        )
        .into());
    }

    info!(
        "processing {} receivers: days {} and {} of {}",
        receivers.len(),
        cfg.days.reference,
        cfg.days.eclipse,
        cfg.year
    );

    for rule in cfg.special_cases.rules() {
        info!("special case {}", rule);
    }

    fs::create_dir_all(&args.output)?;

    let campaign = Campaign::new(&cfg, &reader);
    let master = campaign.master_times();

    let report = if args.gzip {
        let path = args.output.join(format!("{}.txt.gz", cfg.output_name));
        let mut writer = DatasetWriter::create_gzip(&path, master, &cfg.satellites)?;
        let report = campaign.run(&receivers, &mut writer)?;
        writer.finish()?.finish()?;
        info!("{} has been generated", path.display());
        report
    } else {
        let path = args.output.join(format!("{}.txt", cfg.output_name));
        let mut writer = DatasetWriter::create(&path, master, &cfg.satellites)?;
        let report = campaign.run(&receivers, &mut writer)?;
        writer.finish()?;
        info!("{} has been generated", path.display());
        report
    };

    summary(&report);
    Ok(())
}

fn map(args: &MapArgs) -> Result<(), Box<dyn Error>> {
    let gzip = args
        .dataset
        .extension()
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    let totality = match &args.totality {
        Some(path) => Some(TotalityPath::from_file(path)?),
        None => None,
    };

    let selector = FrameSelector::new(args.decimate, args.skip);
    let plotter = MapPlotter::new(args.quantity, args.color_limits(), totality.as_ref());

    let output = Path::new(&args.output);
    fs::create_dir_all(output)?;

    let frames = if gzip {
        let reader = DatasetReader::from_gzip_file(&args.dataset)?;
        selector.stream_frames(reader, args.quantity)?
    } else {
        let reader = DatasetReader::from_file(&args.dataset)?;
        selector.stream_frames(reader, args.quantity)?
    };

    info!("rendering {} {} frames", frames.len(), args.quantity);

    for frame in frames.iter() {
        plotter.render(frame, output);
    }

    Ok(())
}

pub fn main() {
    let mut builder = Builder::from_default_env();
    builder
        .target(Target::Stdout)
        .format_timestamp_secs()
        .format_module_path(false)
        .init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Command::Process(args) => process(args),
        Command::Map(args) => map(args),
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}
