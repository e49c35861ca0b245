//! Command line front-end: summarise, check, and export GoPro telemetry.

use std::path::{Path, PathBuf};

use clap::Parser;
use indicatif::ProgressBar;

use gpmf_telemetry::{
    batch,
    export,
    files,
    ExtractOptions,
    FourCC,
    GoProFileType,
    Gpmf,
    GpmfError,
    Statistics,
};

/// Extract GPMF telemetry from GoPro recordings.
#[derive(Parser)]
#[command(name = "gpmf-extract", version, about)]
struct Cli {
    /// GoPro MP4/LRV, raw GPMF file, or a directory of clips.
    input: PathBuf,

    /// Print the device name only.
    #[arg(long)]
    device: bool,

    /// Only check whether telemetry is present.
    #[arg(long)]
    check: bool,

    /// Write one CSV file per stream to this directory.
    #[arg(long, value_name = "DIR")]
    csv: Option<PathBuf>,

    /// Write GPS as GeoJSON to this file.
    #[arg(long, value_name = "FILE")]
    geojson: Option<PathBuf>,

    /// Write GPS as a GPX track to this file.
    #[arg(long, value_name = "FILE")]
    gpx: Option<PathBuf>,

    /// Write GPS as a KML path to this file.
    #[arg(long, value_name = "FILE")]
    kml: Option<PathBuf>,

    /// Print distance, speed and altitude statistics.
    #[arg(long)]
    stats: bool,

    /// Override the estimated sample rate for a stream, e.g. `GYRO=400`.
    #[arg(long, value_name = "FOURCC=HZ", value_parser = parse_rate)]
    rate: Vec<(FourCC, f64)>,

    /// Keep every n-th sample when exporting.
    #[arg(long, default_value = "1")]
    step: usize,

    /// Debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_rate(arg: &str) -> Result<(FourCC, f64), String> {
    let (fourcc, hz) = arg.split_once('=')
        .ok_or_else(|| format!("expected FOURCC=HZ, got '{arg}'"))?;
    if fourcc.is_empty() || fourcc.len() > 4 {
        return Err(format!("'{fourcc}' is not a FourCC"));
    }
    let hz: f64 = hz.parse()
        .map_err(|_| format!("'{hz}' is not a sample rate"))?;
    Ok((FourCC::from_str(fourcc), hz))
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .format_timestamp(None)
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), GpmfError> {
    let options = cli.rate.iter()
        .fold(ExtractOptions::default(), |opts, (fourcc, hz)| opts.with_rate(*fourcc, *hz));

    if cli.input.is_dir() {
        return run_batch(cli, &options);
    }

    if cli.check {
        let found = gpmf_telemetry::has_telemetry(&cli.input);
        println!("{}: {}", cli.input.display(), if found { "telemetry" } else { "no telemetry" });
        return Ok(());
    }

    if cli.device {
        let name = gpmf_telemetry::device_name(&cli.input);
        println!("{}", name.as_deref().unwrap_or("Unknown"));
        return Ok(());
    }

    let gpmf = Gpmf::with_options(&cli.input, &options)?;
    print_summary(&cli.input, &gpmf);

    if let Some(dir) = &cli.csv {
        std::fs::create_dir_all(dir)?;
        let basename = cli.input.file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "gpmf".to_owned());
        for path in export::csv_to_dir(&gpmf, dir, &basename, cli.step)? {
            println!("Wrote {}", path.display());
        }
    }

    if let Some(path) = &cli.geojson {
        export::write_geojson(&gpmf, path, cli.step)?;
        println!("Wrote {}", path.display());
    }

    if let Some(path) = &cli.gpx {
        export::write_gpx(&gpmf, path, cli.step)?;
        println!("Wrote {}", path.display());
    }

    if let Some(path) = &cli.kml {
        export::write_kml(&gpmf, path, cli.step)?;
        println!("Wrote {}", path.display());
    }

    if cli.stats {
        print_statistics(&gpmf.statistics());
    }

    Ok(())
}

fn run_batch(cli: &Cli, options: &ExtractOptions) -> Result<(), GpmfError> {
    let paths = files::find_recordings(&cli.input, GoProFileType::Any);
    println!("Found {} clips in {}", paths.len(), cli.input.display());

    let progress = ProgressBar::new(paths.len() as u64);
    let results = batch::extract_many(&paths, options, Some(&progress));
    progress.finish_and_clear();

    let mut failed = 0;
    for (path, result) in results.iter() {
        match result {
            Ok(gpmf) => print_summary(path, gpmf),
            Err(err) => {
                failed += 1;
                println!("{}: {err}", path.display());
            }
        }
    }
    println!("{} of {} clips extracted", results.len() - failed, results.len());

    Ok(())
}

fn print_summary(path: &Path, gpmf: &Gpmf) {
    println!("{} [{}]", path.display(), gpmf.device.as_deref().unwrap_or("Unknown device"));
    for stream in gpmf.iter() {
        println!("  {} {:>8} samples  {:>2} elements  ~{:>5} Hz  {:>8.1} s",
            stream.fourcc(),
            stream.len(),
            stream.elements_per_sample(),
            stream.sample_rate(),
            stream.duration().as_seconds_f64(),
        );
    }
}

fn print_statistics(stats: &Statistics) {
    let opt = |v: Option<f64>| v.map_or("-".to_owned(), |v| format!("{v:.1}"));
    println!("  duration      {:.1} s", stats.duration.as_seconds_f64());
    println!("  distance      {:.1} m", stats.distance);
    println!("  speed         max {:.2} m/s, avg {:.2} m/s", stats.max_speed, stats.avg_speed);
    println!("  altitude      {} - {} m", opt(stats.min_altitude), opt(stats.max_altitude));
    println!("  max g-force   {}", opt(stats.max_g_force()));
    println!("  iso           {} - {}", opt(stats.min_iso), opt(stats.max_iso));
    println!("  white balance {} K", opt(stats.avg_white_balance));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_argument() {
        assert_eq!(parse_rate("GPS5=10").unwrap(), (FourCC::GPS5, 10.0));
        assert_eq!(parse_rate("ACCL=197.5").unwrap(), (FourCC::ACCL, 197.5));
        assert_eq!(parse_rate("HUE=1").unwrap().0, FourCC::from_str("HUE "));
        assert!(parse_rate("GPS5").is_err());
        assert!(parse_rate("GPS5X=10").is_err());
        assert!(parse_rate("GPS5=fast").is_err());
    }
}
