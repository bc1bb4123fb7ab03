use std::collections::BTreeSet;

use geo::{polygon, MultiPolygon, Polygon};
use regionmask::{
    GridOptions, GridSpec, MaskConfig, MaskError, MaskGenerator, Region, RegionCatalog, RegionId, WeightMask,
};

const TOLERANCE: f64 = 1e-9;

fn square(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> MultiPolygon<f64> {
    let polygon: Polygon<f64> = polygon![
        (x: min_lon, y: min_lat), (x: max_lon, y: min_lat), (x: max_lon, y: max_lat),
        (x: min_lon, y: max_lat), (x: min_lon, y: min_lat)
    ];
    MultiPolygon(vec![polygon])
}

fn generator(regions: Vec<Region>) -> MaskGenerator {
    MaskGenerator::new(RegionCatalog::new(regions).unwrap(), "FIPS")
}

fn grid(lat_range: (f64, f64), lon_range: (f64, f64), lat_steps: usize, lon_steps: usize) -> GridOptions {
    GridOptions {
        lat_range: Some(lat_range),
        lon_range: Some(lon_range),
        lat_steps: Some(lat_steps),
        lon_steps: Some(lon_steps),
    }
}

fn assert_weights_sum_to_one(mask: &WeightMask) {
    for (region, sum) in mask.weight_sums() {
        assert!((sum - 1.0).abs() < TOLERANCE, "weights of {region} sum to {sum}");
    }
}

#[test]
fn adjacent_squares_tile_the_grid() {
    let generator = generator(vec![
        Region::new("A", square(0.0, 0.0, 1.0, 1.0)),
        Region::new("B", square(1.0, 0.0, 2.0, 1.0)),
    ]);
    let (spec, mask) = generator.generate(&grid((0.0, 1.0), (0.0, 2.0), 4, 4)).unwrap();

    assert_eq!(spec.shape(), (4, 4));
    assert_eq!(mask.unassigned_count(), 0);
    assert_eq!(mask.regions(), vec![RegionId::from("A"), RegionId::from("B")]);
    assert_eq!(mask.region_counts()[&RegionId::from("A")], 8);
    assert_eq!(mask.region_counts()[&RegionId::from("B")], 8);
    assert_weights_sum_to_one(&mask);

    // Longitudes 0 and 2/3 fall in A, 4/3 and 2 in B.
    for i in 0..4 {
        assert_eq!(mask.region_ids()[(i, 1)], Some(RegionId::from("A")));
        assert_eq!(mask.region_ids()[(i, 2)], Some(RegionId::from("B")));
    }
}

#[test]
fn single_region_covers_every_point() {
    let generator = generator(vec![Region::new("01001", square(-1.0, -1.0, 1.0, 1.0))]);
    let (_, mask) = generator.generate(&grid((-1.0, 1.0), (-1.0, 1.0), 3, 3)).unwrap();

    assert!(mask.region_ids().iter().all(|id| id.as_ref() == Some(&RegionId::from("01001"))));
    assert!(mask.weights().iter().all(|&w| w == 1.0 / 9.0));
}

#[test]
fn points_outside_the_region_are_unassigned() {
    let generator = generator(vec![Region::new("A", square(0.0, 0.0, 1.0, 1.0))]);
    let (_, mask) = generator.generate(&grid((0.0, 1.0), (0.0, 2.0), 3, 5)).unwrap();

    // Longitudes 0, 0.5 and 1 are inside (the edge counts), 1.5 and 2 are not.
    assert_eq!(mask.region_counts()[&RegionId::from("A")], 9);
    assert_eq!(mask.unassigned_count(), 6);
    for cell in mask.cells().filter(|cell| cell.lon > 1.0) {
        assert_eq!(cell.region, None);
        assert_eq!(cell.weight, 0.0);
    }
    assert_weights_sum_to_one(&mask);
}

#[test]
fn duplicate_identifiers_fail_before_any_mask() {
    let err = RegionCatalog::new(vec![
        Region::new("A", square(0.0, 0.0, 1.0, 1.0)),
        Region::new("A", square(1.0, 0.0, 2.0, 1.0)),
    ]).unwrap_err();
    assert_eq!(err, MaskError::DuplicateIdentifier(RegionId::from("A")));
}

#[test]
fn repeated_runs_are_bit_identical() {
    let generator = generator(vec![
        Region::new("A", square(0.0, 0.0, 1.0, 1.0)),
        Region::new("B", square(1.0, 0.0, 2.0, 1.0)),
    ]);
    let options = grid((-0.5, 1.5), (-0.5, 2.5), 17, 23);

    let (_, first) = generator.generate(&options).unwrap();
    let (_, second) = generator.generate(&options).unwrap();

    assert_eq!(first.region_ids(), second.region_ids());
    let bits = |mask: &WeightMask| mask.weights().iter().map(|w| w.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&first), bits(&second));
}

#[test]
fn single_row_and_single_column_grids() {
    let generator = generator(vec![Region::new("A", square(0.0, 0.0, 1.0, 1.0))]);

    let (_, row) = generator.generate(&grid((0.0, 1.0), (0.0, 1.0), 1, 5)).unwrap();
    assert_eq!(row.shape(), (1, 5));
    assert_eq!(row.lat().to_vec(), vec![0.0]);
    assert_weights_sum_to_one(&row);

    let (_, column) = generator.generate(&grid((0.0, 1.0), (0.0, 1.0), 4, 1)).unwrap();
    assert_eq!(column.shape(), (4, 1));
    assert_weights_sum_to_one(&column);
}

#[test]
fn every_point_gets_at_most_one_region() {
    let generator = generator(vec![
        Region::new("A", square(0.0, 0.0, 1.0, 1.0)),
        Region::new("B", square(1.0, 0.0, 2.0, 1.0)),
        Region::new("C", square(0.0, 1.0, 2.0, 2.0)),
    ]);
    let spec = generator.grid_spec(&grid((-0.25, 2.25), (-0.25, 2.25), 11, 11)).unwrap();
    let points = generator.grid_points(&spec);
    let assignments = generator.assign(&points);

    assert_eq!(assignments.len(), points.len());
    assert_eq!(assignments.assigned_count() + assignments.unassigned_count(), points.len());
    for (a, point) in assignments.iter().zip(&points) {
        assert_eq!(a.point, *point);
    }

    let mask = generator.weight_mask(&assignments, &spec).unwrap();
    let ids = mask.region_ids().iter().flatten().cloned().collect::<BTreeSet<_>>();
    assert_eq!(ids.len(), 3);
    assert_eq!(mask.unassigned_count(), assignments.unassigned_count());
}

#[test]
fn grid_defaults_to_catalog_extent() {
    let generator = generator(vec![
        Region::new("A", square(-3.0, 10.0, -1.0, 12.0)),
        Region::new("B", square(-1.0, 11.0, 4.0, 15.0)),
    ]);
    let spec = generator.grid_spec(&GridOptions::default()).unwrap();

    assert_eq!(spec, GridSpec::new((10.0, 15.0), (-3.0, 4.0), 100, 100).unwrap());
    assert_eq!(spec.latitudes().first(), Some(&10.0));
    assert_eq!(spec.latitudes().last(), Some(&15.0));
    assert_eq!(spec.longitudes().last(), Some(&4.0));
}

#[test]
fn weighted_sum_recovers_region_means() {
    let generator = generator(vec![
        Region::new("A", square(0.0, 0.0, 1.0, 1.0)),
        Region::new("B", square(1.0, 0.0, 2.0, 1.0)),
    ]);
    let (_, mask) = generator.generate(&grid((0.0, 1.0), (0.0, 2.0), 4, 4)).unwrap();

    // A field equal to 3 everywhere in A and 7 everywhere in B.
    let field = mask.region_ids().mapv(|id| match id.as_ref().map(RegionId::as_str) {
        Some("A") => 3.0,
        Some("B") => 7.0,
        _ => 0.0,
    });
    let means = mask.aggregate(field.view()).unwrap();

    assert!((means[&RegionId::from("A")] - 3.0).abs() < TOLERANCE);
    assert!((means[&RegionId::from("B")] - 7.0).abs() < TOLERANCE);
}

#[test]
fn geojson_source_to_csv_mask() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("counties.geojson");
    std::fs::write(&source, r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"GEOID": "01001"},
             "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 1], [0, 0]]]}},
            {"type": "Feature", "properties": {"GEOID": "01003"},
             "geometry": {"type": "Polygon", "coordinates": [[[1, 0], [2, 0], [2, 1], [1, 1], [1, 0]]]}}
        ]
    }"#).unwrap();

    let config = MaskConfig { id_field: "GEOID".to_string(), ..Default::default() };
    let generator = MaskGenerator::from_path(&source, &config).unwrap();
    assert_eq!(generator.catalog().len(), 2);

    let (_, mask) = generator.generate(&grid((0.0, 1.0), (0.0, 2.0), 4, 4)).unwrap();
    let output = dir.path().join("mask.csv");
    mask.write(&output).unwrap();

    let reread = WeightMask::read(&output).unwrap();
    assert_eq!(reread, mask);
    assert_eq!(reread.regions(), vec![RegionId::from("01001"), RegionId::from("01003")]);
}

#[test]
fn missing_id_field_aborts_loading() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("counties.geojson");
    std::fs::write(&source, r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {"GEOID": "01001"},
         "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}}
    ]}"#).unwrap();

    let err = MaskGenerator::from_path(&source, &MaskConfig::default()).unwrap_err();
    assert!(matches!(err.downcast_ref::<MaskError>(), Some(MaskError::Validation { .. })));
}

#[test]
fn unresolvable_grid_fails_before_assignment() {
    let generator = generator(vec![Region::new("A", square(0.0, 0.0, 1.0, 1.0))]);
    let err = generator.generate(&grid((1.0, 1.0 + 1e-15), (0.0, 1.0), 100, 2)).unwrap_err();
    assert!(matches!(err, MaskError::InvalidGridSpec(_)));
}
