//! Aggregation behaviour on hand-checkable layouts.
//!
//! Target cells are built as exact 1000 m squares in UTM 19S and stored in
//! lon/lat like generated cells, so the working CRS sees them as squares.

use area_weighting::derived::wind_speed;
use area_weighting::{aggregate, aggregate_batches, AggregationConfig, AggregationError};
use grid_common::{Cell, Crs, Grid, SourceBatch, SourceFeature};
use projection::Transformer;
use test_utils::{assert_approx_eq, fixed_timestamp, next_timestamp, rect, square};

const E0: f64 = 300_000.0;
const N0: f64 = 6_300_000.0;

fn utm19s() -> Crs {
    Crs::parse("EPSG:32719")
}

fn config() -> AggregationConfig {
    AggregationConfig {
        working_crs: Some(utm19s()),
        ..Default::default()
    }
}

/// A cell covering the UTM square [e, e + size] x [n, n + size].
fn utm_cell(code: &str, e: f64, n: f64, size: f64) -> Cell {
    let to_wgs = Transformer::new(&utm19s(), &Crs::Wgs84).unwrap();
    let corners = [(e, n + size), (e + size, n + size), (e + size, n), (e, n)];
    let samples: Vec<[f64; 2]> = corners
        .iter()
        .map(|&(x, y)| {
            let (lon, lat) = to_wgs.transform(x, y).unwrap();
            [lon, lat]
        })
        .collect();
    Cell::from_samples(code, "las-rosas", &samples, grid_common::ROUND_DIGITS).unwrap()
}

fn one_cell_grid() -> Grid {
    Grid::new(10, vec![utm_cell("P000", E0, N0, 1000.0)])
}

fn attrs(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn utm_batch(features: Vec<SourceFeature>) -> SourceBatch {
    SourceBatch::new(utm19s(), fixed_timestamp(), features)
}

fn feature(polygon: geo::Polygon<f64>) -> SourceFeature {
    SourceFeature::new(polygon, fixed_timestamp())
}

#[test]
fn test_two_halves_average_to_fifteen() {
    let batch = utm_batch(vec![
        feature(rect(E0, N0, E0 + 500.0, N0 + 1000.0)).with_attribute("t", 10.0),
        feature(rect(E0 + 500.0, N0, E0 + 1000.0, N0 + 1000.0)).with_attribute("t", 20.0),
    ]);

    let out = aggregate(&one_cell_grid(), batch, &attrs(&["t"]), &config()).unwrap();
    let cell = &out.cells[0];
    assert_approx_eq!(cell.mean("t").unwrap(), 15.0, 1e-8);
    assert_approx_eq!(cell.weight("t"), 1.0, 1e-8);
    assert_approx_eq!(cell.coverage, 1.0, 1e-8);
    assert!(out.warnings.is_empty());
}

#[test]
fn test_partial_cover_keeps_value_and_reports_weight() {
    let batch = utm_batch(vec![
        feature(rect(E0, N0, E0 + 300.0, N0 + 1000.0)).with_attribute("t", 5.0)
    ]);

    let out = aggregate(&one_cell_grid(), batch, &attrs(&["t"]), &config()).unwrap();
    let cell = &out.cells[0];
    assert_approx_eq!(cell.mean("t").unwrap(), 5.0, 1e-9);
    assert_approx_eq!(cell.weight("t"), 0.3, 1e-8);
    assert!(out.warnings.is_empty());
}

#[test]
fn test_uncovered_cell_is_missing_not_zero() {
    let grid = Grid::new(
        10,
        vec![
            utm_cell("P000", E0, N0, 1000.0),
            utm_cell("P001", E0 + 5000.0, N0, 1000.0),
        ],
    );
    let batch = utm_batch(vec![
        feature(square(E0, N0, 1000.0))
            .with_attribute("t", 0.0)
            .with_attribute("u", 1.0)
    ]);

    let out = aggregate(&grid, batch, &attrs(&["t", "u"]), &config()).unwrap();
    assert_eq!(out.cells.len(), 2);
    assert_eq!(out.cells[0].cell.code, "P000");
    // A measured zero stays a zero
    assert_eq!(out.cells[0].mean("t"), Some(0.0));

    let uncovered = &out.cells[1];
    assert_eq!(uncovered.cell.code, "P001");
    assert_eq!(uncovered.mean("t"), None);
    assert_eq!(uncovered.mean("u"), None);
    assert_eq!(uncovered.weight("t"), 0.0);
    assert_eq!(uncovered.coverage, 0.0);
    assert_eq!(out.missing_cells(), 1);
}

#[test]
fn test_coverage_equals_covered_fraction() {
    // 20% + 25% with a gap in between
    let batch = utm_batch(vec![
        feature(rect(E0, N0, E0 + 200.0, N0 + 1000.0)).with_attribute("t", 1.0),
        feature(rect(E0 + 500.0, N0, E0 + 1000.0, N0 + 500.0)).with_attribute("t", 2.0),
        feature(rect(E0 + 2000.0, N0, E0 + 3000.0, N0 + 1000.0)).with_attribute("t", 99.0),
    ]);

    let out = aggregate(&one_cell_grid(), batch, &attrs(&["t"]), &config()).unwrap();
    let cell = &out.cells[0];
    assert_approx_eq!(cell.coverage, 0.45, 1e-8);
    assert_approx_eq!(cell.mean("t").unwrap(), (1.0 * 0.2 + 2.0 * 0.25) / 0.45, 1e-8);
}

#[test]
fn test_weights_are_per_attribute() {
    let batch = utm_batch(vec![
        feature(rect(E0, N0, E0 + 500.0, N0 + 1000.0))
            .with_attribute("t", 10.0)
            .with_attribute("u", 1.0),
        feature(rect(E0 + 500.0, N0, E0 + 1000.0, N0 + 1000.0)).with_attribute("t", 20.0),
    ]);

    let out = aggregate(&one_cell_grid(), batch, &attrs(&["t", "u"]), &config()).unwrap();
    let cell = &out.cells[0];
    assert_approx_eq!(cell.mean("t").unwrap(), 15.0, 1e-8);
    assert_approx_eq!(cell.mean("u").unwrap(), 1.0, 1e-12);
    assert_approx_eq!(cell.weight("u"), 0.5, 1e-8);
    assert_approx_eq!(cell.coverage, 1.0, 1e-8);
}

#[test]
fn test_overlapping_sources_warn_but_normalise() {
    let batch = utm_batch(vec![
        feature(square(E0, N0, 1000.0)).with_attribute("t", 10.0),
        feature(square(E0, N0, 1000.0)).with_attribute("t", 20.0),
    ]);

    let out = aggregate(&one_cell_grid(), batch, &attrs(&["t"]), &config()).unwrap();
    assert_approx_eq!(out.cells[0].mean("t").unwrap(), 15.0, 1e-8);
    assert_approx_eq!(out.cells[0].coverage, 2.0, 1e-8);
    assert_eq!(out.warnings.len(), 1);
    assert_eq!(out.warnings[0].code, "P000");
    assert_eq!(out.warnings[0].timestamp, fixed_timestamp());
}

#[test]
fn test_rerun_is_bitwise_identical() {
    let grid = Grid::new(
        10,
        (0..4)
            .map(|i| utm_cell(&format!("P00{}", i), E0 + 700.0 * i as f64, N0, 700.0))
            .collect(),
    );
    let batch = test_utils::source_lattice(E0 - 100.0, N0 - 100.0, 333.0, 10, 4, utm19s(), fixed_timestamp(), |c, r| {
        vec![("t", 280.0 + c as f64 * 0.37 + r as f64 * 1.13)]
    });

    let a = aggregate(&grid, batch.clone(), &attrs(&["t"]), &config()).unwrap();
    let b = aggregate(&grid, batch, &attrs(&["t"]), &config()).unwrap();
    for (x, y) in a.cells.iter().zip(&b.cells) {
        assert_eq!(
            x.mean("t").map(f64::to_bits),
            y.mean("t").map(f64::to_bits)
        );
        assert_eq!(x.coverage.to_bits(), y.coverage.to_bits());
    }
}

#[test]
fn test_batches_match_individual_runs() {
    let grid = one_cell_grid();
    let batches = vec![
        utm_batch(vec![feature(square(E0, N0, 1000.0)).with_attribute("t", 1.0)]),
        SourceBatch::new(
            utm19s(),
            next_timestamp(),
            vec![SourceFeature::new(square(E0, N0, 1000.0), next_timestamp()).with_attribute("t", 2.0)],
        ),
        utm_batch(vec![]),
    ];

    let results = aggregate_batches(&grid, batches.clone(), &attrs(&["t"]), &config());
    assert_eq!(results.len(), 3);

    let first = results[0].as_ref().unwrap();
    let alone = aggregate(&grid, batches[0].clone(), &attrs(&["t"]), &config()).unwrap();
    assert_eq!(first, &alone);

    let second = results[1].as_ref().unwrap();
    assert_eq!(second.cells[0].timestamp, next_timestamp());
    assert_approx_eq!(second.cells[0].mean("t").unwrap(), 2.0, 1e-9);

    assert!(matches!(results[2], Err(AggregationError::EmptyInput(_))));
}

#[test]
fn test_wind_speed_after_aggregation() {
    let batch = utm_batch(vec![feature(square(E0, N0, 1000.0))
        .with_attribute("u", 3.0)
        .with_attribute("v", 4.0)]);
    let out = aggregate(&one_cell_grid(), batch, &attrs(&["u", "v"]), &config()).unwrap();
    let cell = &out.cells[0];
    assert_approx_eq!(wind_speed(cell.mean("u"), cell.mean("v")).unwrap(), 5.0, 1e-9);

    let batch = utm_batch(vec![feature(square(E0, N0, 1000.0)).with_attribute("v", 4.0)]);
    let out = aggregate(&one_cell_grid(), batch, &attrs(&["u", "v"]), &config()).unwrap();
    let cell = &out.cells[0];
    assert_eq!(wind_speed(cell.mean("u"), cell.mean("v")), None);
}

#[test]
fn test_geographic_sources_are_reprojected() {
    // Same two halves, expressed in lon/lat
    let to_wgs = Transformer::new(&utm19s(), &Crs::Wgs84).unwrap();
    let half = |e0: f64, e1: f64| {
        let ring: Vec<(f64, f64)> = [(e0, N0), (e1, N0), (e1, N0 + 1000.0), (e0, N0 + 1000.0), (e0, N0)]
            .iter()
            .map(|&(x, y)| to_wgs.transform(x, y).unwrap())
            .collect();
        geo::Polygon::new(geo::LineString::from(ring), vec![])
    };
    let batch = SourceBatch::new(
        Crs::Wgs84,
        fixed_timestamp(),
        vec![
            feature(half(E0, E0 + 500.0)).with_attribute("t", 10.0),
            feature(half(E0 + 500.0, E0 + 1000.0)).with_attribute("t", 20.0),
        ],
    );

    let out = aggregate(&one_cell_grid(), batch, &attrs(&["t"]), &config()).unwrap();
    assert_approx_eq!(out.cells[0].mean("t").unwrap(), 15.0, 1e-6);
    assert_approx_eq!(out.cells[0].coverage, 1.0, 1e-6);
}

#[test]
fn test_default_working_crs_is_local_utm() {
    let batch = utm_batch(vec![feature(square(E0, N0, 1000.0)).with_attribute("t", 7.0)]);
    let out = aggregate(
        &one_cell_grid(),
        batch,
        &attrs(&["t"]),
        &AggregationConfig::default(),
    )
    .unwrap();
    assert_approx_eq!(out.cells[0].mean("t").unwrap(), 7.0, 1e-9);
    assert_approx_eq!(out.cells[0].coverage, 1.0, 1e-6);
}

#[test]
fn test_empty_inputs() {
    let grid = one_cell_grid();
    let batch = || utm_batch(vec![feature(square(E0, N0, 1000.0)).with_attribute("t", 1.0)]);

    let empty_grid = Grid::new(10, vec![]);
    assert!(matches!(
        aggregate(&empty_grid, batch(), &attrs(&["t"]), &config()),
        Err(AggregationError::EmptyInput(_))
    ));
    assert!(matches!(
        aggregate(&grid, utm_batch(vec![]), &attrs(&["t"]), &config()),
        Err(AggregationError::EmptyInput(_))
    ));
    assert!(matches!(
        aggregate(&grid, batch(), &[], &config()),
        Err(AggregationError::EmptyInput(_))
    ));
}

#[test]
fn test_duplicate_codes_rejected() {
    let grid = Grid::new(
        10,
        vec![
            utm_cell("P000", E0, N0, 1000.0),
            utm_cell("P000", E0 + 1000.0, N0, 1000.0),
        ],
    );
    let batch = utm_batch(vec![feature(square(E0, N0, 1000.0)).with_attribute("t", 1.0)]);
    assert_eq!(
        aggregate(&grid, batch, &attrs(&["t"]), &config()).unwrap_err(),
        AggregationError::DuplicateCode("P000".to_string())
    );
}

#[test]
fn test_crs_mismatch() {
    let batch = || utm_batch(vec![feature(square(E0, N0, 1000.0)).with_attribute("t", 1.0)]);

    let geographic = AggregationConfig {
        working_crs: Some(Crs::Wgs84),
        ..Default::default()
    };
    assert!(matches!(
        aggregate(&one_cell_grid(), batch(), &attrs(&["t"]), &geographic),
        Err(AggregationError::CrsMismatch(_))
    ));

    let mut unknown = batch();
    unknown.crs = Crs::parse("EPSG:2154");
    assert!(matches!(
        aggregate(&one_cell_grid(), unknown, &attrs(&["t"]), &config()),
        Err(AggregationError::CrsMismatch(_))
    ));
}
