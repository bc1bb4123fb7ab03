use std::path::PathBuf;

/// Region weight-mask CLI (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "regionmask", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Build a weight mask from a region file
    Generate(GenerateArgs),

    /// Validate a region file and summarize its contents
    Inspect(InspectArgs),
}

#[derive(clap::Args, Debug)]
pub struct GenerateArgs {
    /// Region source (.shp, .geojson or .json)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub regions: PathBuf,

    /// TOML configuration file; flags below override its values
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Attribute holding the region identifier, defaults to "FIPS"
    #[arg(long)]
    pub id_field: Option<String>,

    /// EPSG code of the region source, if not already WGS84 lon/lat
    #[arg(long)]
    pub source_epsg: Option<u32>,

    /// Latitude range, defaults to the regions' extent
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"], allow_negative_numbers = true)]
    pub lat_range: Option<Vec<f64>>,

    /// Longitude range, defaults to the regions' extent
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"], allow_negative_numbers = true)]
    pub lon_range: Option<Vec<f64>>,

    /// Number of latitude steps, defaults to 100
    #[arg(long)]
    pub lat_steps: Option<usize>,

    /// Number of longitude steps, defaults to 100
    #[arg(long)]
    pub lon_steps: Option<usize>,

    /// Output mask file (.csv, .parquet or .json), defaults to "./mask.csv"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct InspectArgs {
    /// Region source (.shp, .geojson or .json)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub regions: PathBuf,

    /// Attribute holding the region identifier, defaults to "FIPS"
    #[arg(long)]
    pub id_field: Option<String>,

    /// EPSG code of the region source, if not already WGS84 lon/lat
    #[arg(long)]
    pub source_epsg: Option<u32>,
}
