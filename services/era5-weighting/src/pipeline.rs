//! Per-zone, per-timestamp weighting runs and their output files.

use anyhow::{bail, Context, Result};
use area_weighting::reproject::project_sources;
use area_weighting::zones::zone_memberships;
use area_weighting::{aggregate_batches, DerivedRecord, WeightOverflowWarning};
use chrono::{DateTime, Utc};
use geo::{MultiPolygon, Rect};
use grid_common::geojson::optional_number;
use grid_common::{
    Cell, Crs, Feature, FeatureCollection, Grid, SourceBatch, SourceFeature, WeightedCell,
    WeightedValue, Zone,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::WeightingConfig;

/// Weighted cells of every processed zone for one timestamp.
#[derive(Debug, Clone)]
pub struct TimestampOutput {
    pub timestamp: DateTime<Utc>,
    pub features: Vec<Feature>,
    pub warnings: Vec<WeightOverflowWarning>,
}

impl TimestampOutput {
    fn empty(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            features: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn collection(&self) -> FeatureCollection {
        FeatureCollection::new(self.features.clone())
    }

    /// Output file name, e.g. `weighted_20230203T120000Z.geojson`.
    pub fn file_name(&self) -> String {
        format!("weighted_{}.geojson", self.timestamp.format("%Y%m%dT%H%M%SZ"))
    }
}

/// Aggregate every batch onto the grid, zone by zone.
///
/// Each zone runs on its own sub-grid so its working CRS is estimated from
/// its own extent, and only against the source features that intersect it.
/// Batches sharing a timestamp are routed together, so per-zone files in
/// different CRSs can be weighed in one run. `zone` restricts the run to one
/// label. Outputs are in timestamp order; within an output, features follow
/// zone then cell order.
pub fn weigh(
    grid: &Grid,
    batches: Vec<SourceBatch>,
    config: &WeightingConfig,
    zone: Option<&str>,
) -> Result<Vec<TimestampOutput>> {
    if batches.is_empty() {
        bail!("no source batches to weigh");
    }

    let labels = match zone {
        Some(label) if grid.zones().contains(&label) => vec![label],
        Some(label) => bail!("zone '{}' is not in the grid", label),
        None => grid.zones(),
    };
    let sub_grids: Vec<Grid> = labels.iter().map(|label| grid.for_zone(label)).collect();
    let shapes = labels
        .iter()
        .zip(&sub_grids)
        .map(|(label, sub_grid)| zone_shape(label, sub_grid))
        .collect::<Result<Vec<Zone>>>()?;

    let mut groups: BTreeMap<DateTime<Utc>, Vec<SourceBatch>> = BTreeMap::new();
    for batch in batches {
        groups.entry(batch.timestamp).or_default().push(batch);
    }

    // Per zone, the sources it sees at each timestamp
    let mut routed: Vec<Vec<Option<SourceBatch>>> =
        vec![Vec::with_capacity(groups.len()); labels.len()];
    for (timestamp, group) in &groups {
        for (z, batch) in route_sources(*timestamp, group, &shapes)?.into_iter().enumerate() {
            routed[z].push(batch);
        }
    }

    let attributes = config.attribute_names();
    let mut outputs: Vec<TimestampOutput> =
        groups.keys().map(|ts| TimestampOutput::empty(*ts)).collect();

    for ((label, sub_grid), zone_batches) in labels.iter().zip(&sub_grids).zip(routed) {
        let covered: Vec<bool> = zone_batches.iter().map(Option::is_some).collect();
        let present: Vec<SourceBatch> = zone_batches.into_iter().flatten().collect();
        let weighed = present.len();
        let mut results =
            aggregate_batches(sub_grid, present, &attributes, &config.aggregation).into_iter();

        for (output, has_sources) in outputs.iter_mut().zip(covered) {
            if !has_sources {
                let timestamp = output.timestamp;
                output.features.extend(
                    sub_grid
                        .iter()
                        .map(|cell| to_feature(&uncovered(cell, timestamp, &attributes), config)),
                );
                continue;
            }
            let result = results
                .next()
                .context("aggregation returned fewer results than batches")?
                .with_context(|| {
                    format!(
                        "Weighting failed for zone '{}' at {}",
                        label,
                        output.timestamp.to_rfc3339()
                    )
                })?;
            output
                .features
                .extend(result.cells.iter().map(|cell| to_feature(cell, config)));
            output.warnings.extend(result.warnings);
        }

        info!(
            zone = *label,
            cells = sub_grid.len(),
            timestamps = outputs.len(),
            with_sources = weighed,
            "Weighted zone"
        );
    }

    Ok(outputs)
}

/// Degrees added around a zone's extent when picking its sources. Source
/// edges that are straight in a projected CRS bow slightly in lon/lat.
const ZONE_MARGIN_DEG: f64 = 0.01;

/// Padded lon/lat extent of a zone's cells, used to pick the sources it sees.
fn zone_shape(label: &str, sub_grid: &Grid) -> Result<Zone> {
    let b = sub_grid
        .bounds()
        .with_context(|| format!("zone '{}' has no extent", label))?;
    let rect = Rect::new(
        (b.min_x - ZONE_MARGIN_DEG, b.min_y - ZONE_MARGIN_DEG),
        (b.max_x + ZONE_MARGIN_DEG, b.max_y + ZONE_MARGIN_DEG),
    );
    Ok(Zone::new(label, MultiPolygon::new(vec![rect.to_polygon()])))
}

/// Split one timestamp's batches between zones.
///
/// Features are located in lon/lat and kept for every zone they intersect.
/// A zone whose features all come from one CRS gets them untouched in that
/// CRS; one fed from several CRSs gets them in EPSG:4326.
fn route_sources(
    timestamp: DateTime<Utc>,
    group: &[SourceBatch],
    shapes: &[Zone],
) -> Result<Vec<Option<SourceBatch>>> {
    let mut located = Vec::new();
    let mut origin = Vec::new();
    for (b, batch) in group.iter().enumerate() {
        let polygons = project_sources(batch, &Crs::Wgs84).with_context(|| {
            format!(
                "Failed to locate {} sources at {}",
                batch.crs,
                timestamp.to_rfc3339()
            )
        })?;
        for (i, polygon) in polygons.into_iter().enumerate() {
            located.push(SourceFeature::new(polygon, timestamp));
            origin.push((b, i));
        }
    }

    let mut selected: Vec<Vec<usize>> = vec![Vec::new(); shapes.len()];
    for (z, k) in zone_memberships(&located, shapes) {
        selected[z].push(k);
    }

    let routed = selected
        .into_iter()
        .zip(shapes)
        .map(|(picked, shape)| {
            let (first, _) = *origin.get(*picked.first()?)?;
            let crs = &group[first].crs;
            let single_crs = picked.iter().all(|&k| group[origin[k].0].crs == *crs);

            let features: Vec<SourceFeature> = picked
                .iter()
                .map(|&k| {
                    let (b, i) = origin[k];
                    let feature = group[b].features[i].clone();
                    if single_crs {
                        feature
                    } else {
                        SourceFeature {
                            polygon: located[k].polygon.clone(),
                            ..feature
                        }
                    }
                })
                .collect();

            let crs = if single_crs {
                crs.clone()
            } else {
                debug!(zone = %shape.label, "Zone sources span several CRSs, using EPSG:4326");
                Crs::Wgs84
            };
            Some(SourceBatch::new(crs, timestamp, features))
        })
        .collect();
    Ok(routed)
}

/// A cell no source feature reaches: every attribute missing.
fn uncovered(cell: &Cell, timestamp: DateTime<Utc>, attributes: &[String]) -> WeightedCell {
    WeightedCell {
        cell: cell.clone(),
        timestamp,
        values: attributes
            .iter()
            .map(|a| (a.clone(), WeightedValue::missing()))
            .collect(),
        coverage: 0.0,
    }
}

fn to_feature(cell: &WeightedCell, config: &WeightingConfig) -> Feature {
    let feature = Feature::from_weighted(cell);
    if !config.derived {
        return feature;
    }
    DerivedRecord::from_weighted(cell, &config.meteo)
        .properties()
        .into_iter()
        .fold(feature, |f, (name, value)| {
            f.with_property(name, optional_number(value))
        })
}

/// Write one GeoJSON file per timestamp into `dir`, plus
/// `weight_warnings.json` when any cell overflowed. Returns the files
/// written.
pub fn write_outputs(dir: &Path, outputs: &[TimestampOutput]) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let mut written = Vec::with_capacity(outputs.len() + 1);
    for output in outputs {
        let path = dir.join(output.file_name());
        let json = output.collection().to_json()?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }

    let warnings: Vec<&WeightOverflowWarning> =
        outputs.iter().flat_map(|o| o.warnings.iter()).collect();
    if !warnings.is_empty() {
        warn!(
            count = warnings.len(),
            "Some cells are covered by overlapping sources"
        );
        let path = dir.join("weight_warnings.json");
        let json = serde_json::to_string_pretty(&warnings)?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }

    info!(dir = %dir.display(), files = written.len(), "Wrote weighted outputs");
    Ok(written)
}
