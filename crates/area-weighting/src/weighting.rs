//! Area-weighted means of source attributes on target cells.

use std::collections::BTreeMap;

use geo::{Area, Polygon};
use grid_common::{Cell, Grid, SourceBatch, WeightedCell, WeightedValue};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::overlay::{Overlap, SourceIndex};
use crate::reproject::{project_cells, project_sources, working_crs};
use crate::{AggregationConfig, AggregationError, Result, WeightOverflowWarning};

/// Result of aggregating one source batch.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationOutput {
    /// One record per target cell, in grid order.
    pub cells: Vec<WeightedCell>,
    /// Cells whose overlap weights sum past `1 + epsilon`.
    pub warnings: Vec<WeightOverflowWarning>,
}

impl AggregationOutput {
    /// Cells without any overlapping source feature.
    pub fn missing_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.coverage == 0.0).count()
    }
}

/// Aggregate one batch onto the target grid.
///
/// # Arguments
/// * `target` - Cells in EPSG:4326 with unique codes
/// * `batch` - Source features sharing one timestamp and CRS
/// * `attributes` - Attribute names to aggregate
/// * `config` - Working CRS and thresholds
///
/// # Returns
/// Every target cell, in grid order, with one [`WeightedValue`] per
/// attribute. A cell that no source carrying an attribute overlaps gets a
/// missing mean for that attribute, never zero.
///
/// # Errors
/// * `EmptyInput` if the grid, the batch or the attribute list is empty
/// * `DuplicateCode` if two target cells share a code
/// * `CrsMismatch` if the inputs cannot be projected into a common planar CRS
pub fn aggregate(
    target: &Grid,
    batch: SourceBatch,
    attributes: &[String],
    config: &AggregationConfig,
) -> Result<AggregationOutput> {
    if target.is_empty() {
        return Err(AggregationError::empty_input("target grid has no cells"));
    }
    if batch.is_empty() {
        return Err(AggregationError::empty_input(format!(
            "source batch at {} has no features",
            batch.timestamp.to_rfc3339()
        )));
    }
    if attributes.is_empty() {
        return Err(AggregationError::empty_input("no attributes to aggregate"));
    }
    if let Some(code) = target.duplicate_code() {
        return Err(AggregationError::DuplicateCode(code.to_string()));
    }

    let crs = working_crs(target, config)?;
    let cell_polygons = project_cells(target, &crs)?;
    let index = SourceIndex::new(project_sources(&batch, &crs)?);

    debug!(
        working_crs = %crs,
        cells = target.len(),
        sources = index.len(),
        timestamp = %batch.timestamp.to_rfc3339(),
        "Projected inputs"
    );

    let cells: Vec<WeightedCell> = target
        .cells
        .par_iter()
        .zip(cell_polygons.par_iter())
        .map(|(cell, polygon)| weigh_cell(cell, polygon, &index, &batch, attributes, config))
        .collect();

    let limit = 1.0 + config.overflow_epsilon;
    let warnings: Vec<WeightOverflowWarning> = cells
        .iter()
        .filter(|c| c.coverage > limit)
        .map(|c| WeightOverflowWarning {
            code: c.cell.code.clone(),
            timestamp: batch.timestamp,
            weight: c.coverage,
        })
        .collect();

    for warning in &warnings {
        warn!(
            code = %warning.code,
            weight = warning.weight,
            timestamp = %warning.timestamp.to_rfc3339(),
            "Overlap weights exceed 1; source features overlap"
        );
    }

    let output = AggregationOutput { cells, warnings };
    info!(
        timestamp = %batch.timestamp.to_rfc3339(),
        cells = output.cells.len(),
        missing = output.missing_cells(),
        warnings = output.warnings.len(),
        "Aggregated batch"
    );
    Ok(output)
}

/// Aggregate independent batches in parallel, one result per batch in input
/// order. The grid is shared read-only across workers.
pub fn aggregate_batches(
    target: &Grid,
    batches: Vec<SourceBatch>,
    attributes: &[String],
    config: &AggregationConfig,
) -> Vec<Result<AggregationOutput>> {
    batches
        .into_par_iter()
        .map(|batch| aggregate(target, batch, attributes, config))
        .collect()
}

fn weigh_cell(
    cell: &Cell,
    polygon: &Polygon<f64>,
    index: &SourceIndex,
    batch: &SourceBatch,
    attributes: &[String],
    config: &AggregationConfig,
) -> WeightedCell {
    let cell_area = polygon.unsigned_area();
    let overlaps: Vec<Overlap> = if cell_area > 0.0 {
        index.overlaps(polygon, config.min_intersection_area)
    } else {
        warn!(code = %cell.code, "Cell has zero area in the working CRS");
        Vec::new()
    };

    let mut coverage = 0.0;
    // (Σ value·weight, Σ weight) per attribute
    let mut sums: Vec<(f64, f64)> = vec![(0.0, 0.0); attributes.len()];

    for overlap in &overlaps {
        let weight = overlap.area / cell_area;
        coverage += weight;

        let feature = &batch.features[overlap.source];
        for (name, (weighted, total)) in attributes.iter().zip(sums.iter_mut()) {
            if let Some(value) = feature.value(name) {
                *weighted += value * weight;
                *total += weight;
            }
        }
    }

    let values: BTreeMap<String, WeightedValue> = attributes
        .iter()
        .zip(sums)
        .map(|(name, (weighted, total))| {
            let value = if total > 0.0 {
                WeightedValue {
                    mean: Some(weighted / total),
                    weight: total,
                }
            } else {
                WeightedValue::missing()
            };
            (name.clone(), value)
        })
        .collect();

    WeightedCell {
        cell: cell.clone(),
        timestamp: batch.timestamp,
        values,
        coverage,
    }
}
