use clap::Parser;
use colored::*;
use log::info;
use overshape::{load_osm_file, validate_args, Args, OverpassConverter};
use std::fs;
use std::process::ExitCode;

fn print_banner() {
    let version: &str = env!("CARGO_PKG_VERSION");
    eprintln!(
        "{} {}",
        "overshape".bright_white().bold(),
        format!("version {version}").dimmed()
    );
}

fn setup_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("{} Loading data from file...", "[1/3]".bold());
    let result = load_osm_file(&args.file)?;
    info!(
        "Loaded {} elements from {}",
        result.total_count(),
        args.file.display()
    );

    eprintln!("{} Converting {} data...", "[2/3]".bold(), args.kind);
    let converter = OverpassConverter::new(&result).annotated(args.annotate);
    let geojson = if args.all {
        let (collection, failures) = converter.feature_collection(args.kind, args.mode);
        if !failures.is_empty() {
            eprintln!(
                "{}",
                format!(
                    "Warning: {} of {} {}s could not be converted",
                    failures.len(),
                    failures.len() + collection.features.len(),
                    args.kind
                )
                .yellow()
            );
        }
        geojson::GeoJson::FeatureCollection(collection)
    } else {
        let feature = converter.feature(args.kind, args.id, args.mode)?;
        geojson::GeoJson::Feature(feature.export())
    };

    eprintln!("{} Writing GeoJSON...", "[3/3]".bold());
    let text = if args.compact {
        serde_json::to_string(&geojson)?
    } else {
        serde_json::to_string_pretty(&geojson)?
    };

    match &args.output {
        Some(path) => {
            fs::write(path, text)?;
            info!("GeoJSON written to {}", path.display());
        }
        None => println!("{text}"),
    }

    Ok(())
}

fn main() -> ExitCode {
    let args: Args = Args::parse();
    setup_logging(args.debug);
    print_banner();

    if let Err(e) = validate_args(&args) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
