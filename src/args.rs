use crate::element::{ElementKind, OsmId};
use crate::relation_geometry::AssemblyMode;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments parser
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Overpass JSON file to convert (required)
    #[arg(long, env = "OVERSHAPE_FILE")]
    pub file: PathBuf,

    /// Kind of element to convert
    #[arg(long, value_enum, default_value_t = ElementKind::Relation)]
    pub kind: ElementKind,

    /// Element id (optional, defaults to the only element of that kind)
    #[arg(long, conflicts_with = "all")]
    pub id: Option<OsmId>,

    /// Convert every element of that kind into a FeatureCollection
    #[arg(long)]
    pub all: bool,

    /// How relations are assembled: closed areas or raw member lines
    #[arg(long, value_enum, default_value_t = AssemblyMode::Polygon)]
    pub mode: AssemblyMode,

    /// File to write GeoJSON to (optional, defaults to stdout)
    #[arg(long, env = "OVERSHAPE_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Add @type and @id tags naming the source element
    #[arg(long)]
    pub annotate: bool,

    /// Write compact instead of pretty-printed JSON
    #[arg(long)]
    pub compact: bool,

    /// Enable debug logging (optional)
    #[arg(long)]
    pub debug: bool,
}

/// Validates CLI arguments after parsing.
/// The input file must exist, and line mode only applies to relations.
pub fn validate_args(args: &Args) -> Result<(), String> {
    if !args.file.exists() {
        return Err(format!("File does not exist: {}", args.file.display()));
    }
    if !args.file.is_file() {
        return Err(format!("Path is not a file: {}", args.file.display()));
    }

    if args.mode == AssemblyMode::LineSoup && args.kind != ElementKind::Relation {
        return Err(format!(
            "--mode lines only applies to relations, not to {}s.",
            args.kind
        ));
    }

    if let Some(ref output) = args.output {
        if output.is_dir() {
            return Err(format!("Output path is a directory: {}", output.display()));
        }
    }

    Ok(())
}
