use std::path::PathBuf;

use anyhow::Result;
use regionmask::{GridOptions, MaskConfig, MaskGenerator};

/// Pair up a two-value range flag; clap guarantees exactly two values.
fn range(values: &Option<Vec<f64>>) -> Option<(f64, f64)> {
    values.as_deref().and_then(|v| match v {
        [min, max] => Some((*min, *max)),
        _ => None,
    })
}

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::GenerateArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => MaskConfig::from_file(path)?,
        None => MaskConfig::default(),
    };
    if let Some(id_field) = &args.id_field { config.id_field = id_field.clone() }
    if let Some(epsg) = args.source_epsg { config.source_epsg = Some(epsg) }
    config.grid = config.grid.merge(&GridOptions {
        lat_range: range(&args.lat_range),
        lon_range: range(&args.lon_range),
        lat_steps: args.lat_steps,
        lon_steps: args.lon_steps,
    });

    let out_path: PathBuf = args.output.clone().unwrap_or("./mask.csv".into());
    tracing::debug!(?config, output = %out_path.display(), "resolved configuration");

    println!("[generate] loading regions from {}", args.regions.display());
    let generator = MaskGenerator::from_path(&args.regions, &config)?;
    println!("[generate] {} regions keyed by '{}'", generator.catalog().len(), generator.id_field());

    let (spec, mask) = generator.generate(&config.grid)?;
    let (lat_min, lat_max) = spec.lat_range();
    let (lon_min, lon_max) = spec.lon_range();
    println!(
        "[generate] grid {}x{} over lat [{lat_min}, {lat_max}], lon [{lon_min}, {lon_max}]",
        spec.lat_steps(), spec.lon_steps(),
    );

    let region_count = mask.regions().len();
    println!(
        "[generate] {} of {} cells assigned to {} regions ({} regions without cells)",
        spec.point_count() - mask.unassigned_count(), spec.point_count(), region_count,
        generator.catalog().len() - region_count,
    );

    println!("[generate] writing mask to {}", out_path.display());
    mask.write(&out_path)?;

    Ok(())
}
