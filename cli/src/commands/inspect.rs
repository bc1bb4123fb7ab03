use anyhow::Result;
use regionmask::{io::region_columns, MaskConfig, MaskGenerator, DEFAULT_ID_FIELD};

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::InspectArgs) -> Result<()> {
    let config = MaskConfig {
        id_field: args.id_field.clone().unwrap_or(DEFAULT_ID_FIELD.to_string()),
        source_epsg: args.source_epsg,
        ..Default::default()
    };

    let columns = region_columns(&args.regions)?;
    println!("[inspect] columns: {}", columns.join(", "));

    let generator = MaskGenerator::from_path(&args.regions, &config)?;
    let catalog = generator.catalog();
    println!("[inspect] {} regions keyed by '{}'", catalog.len(), config.id_field);

    match catalog.bounds() {
        Some(b) => println!(
            "[inspect] bounds: lon [{}, {}], lat [{}, {}]",
            b.min_lon, b.max_lon, b.min_lat, b.max_lat,
        ),
        None => println!("[inspect] bounds: none (no region has a geometry)"),
    }

    Ok(())
}
