//! GeoJSON adapters around the engine.
//!
//! Converts feature collections into [`SourceUnit`]/[`TargetUnit`] records and
//! flattens [`AggregatedUnit`]s back into features. All conversions work on
//! in-memory `serde_json::Value`s.
//!
//! Only one outer ring per feature is used: holes are kept on the polygon but
//! never consulted, and a MultiPolygon contributes only its first polygon.
//! A geometry with no rings or no polygons becomes an empty polygon, which the
//! engine treats as covering nothing.

use std::collections::BTreeMap;

use geo::{Coord, LineString, Polygon};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::{AggregationError, Result, UnitKind};
use crate::models::{AggregatedUnit, MetricRecord, SourceUnit, TargetUnit};

/// Metric entry as it appears under a tract's `metrics` property
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawMetric {
    name: Option<String>,
    code: Option<String>,
    count: f64,
    rate: f64,
}

fn features(collection: &Value) -> Result<&Vec<Value>> {
    collection
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| AggregationError::GeoJson("expected a FeatureCollection".to_string()))
}

/// String or numeric property rendered as a string
fn string_property(feature: &Value, key: &str) -> Option<String> {
    match &feature["properties"][key] {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number_property(feature: &Value, key: &str) -> Option<f64> {
    match &feature["properties"][key] {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_ring(ring: &Value, kind: UnitKind, id: &str) -> Result<LineString<f64>> {
    let positions = ring
        .as_array()
        .ok_or_else(|| AggregationError::GeoJson(format!("{kind} {id}: ring is not an array")))?;

    let coords = positions
        .iter()
        .enumerate()
        .map(|(index, position)| {
            let lon = position.get(0).and_then(Value::as_f64);
            let lat = position.get(1).and_then(Value::as_f64);
            match (lon, lat) {
                (Some(x), Some(y)) => Ok(Coord { x, y }),
                _ => Err(AggregationError::InvalidCoordinate {
                    kind,
                    id: id.to_string(),
                    index,
                }),
            }
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(LineString::new(coords))
}

fn empty_polygon() -> Polygon<f64> {
    Polygon::new(LineString::new(vec![]), vec![])
}

fn parse_rings(rings: &Value, kind: UnitKind, id: &str) -> Result<Polygon<f64>> {
    let rings = rings.as_array().ok_or_else(|| {
        AggregationError::GeoJson(format!("{kind} {id}: polygon is not an array"))
    })?;
    let Some((outer, holes)) = rings.split_first() else {
        debug!("{} {}: polygon has no rings", kind, id);
        return Ok(empty_polygon());
    };

    let exterior = parse_ring(outer, kind, id)?;
    let interiors = holes
        .iter()
        .map(|hole| parse_ring(hole, kind, id))
        .collect::<Result<Vec<_>>>()?;
    if !interiors.is_empty() {
        debug!(
            "{} {}: ignoring {} interior ring(s)",
            kind,
            id,
            interiors.len()
        );
    }

    Ok(Polygon::new(exterior, interiors))
}

/// Parse a GeoJSON `Polygon` or `MultiPolygon` geometry object.
pub fn parse_polygon(geometry: &Value, kind: UnitKind, id: &str) -> Result<Polygon<f64>> {
    let geo_type = geometry.get("type").and_then(Value::as_str);
    let coordinates = geometry.get("coordinates").ok_or_else(|| {
        AggregationError::GeoJson(format!("{kind} {id}: geometry has no coordinates"))
    })?;

    match geo_type {
        Some("Polygon") => parse_rings(coordinates, kind, id),
        Some("MultiPolygon") => {
            let polygons = coordinates.as_array().ok_or_else(|| {
                AggregationError::GeoJson(format!("{kind} {id}: multipolygon is not an array"))
            })?;
            if polygons.len() > 1 {
                debug!(
                    "{} {}: using first of {} polygons",
                    kind,
                    id,
                    polygons.len()
                );
            }
            match polygons.first() {
                Some(first) => parse_rings(first, kind, id),
                None => {
                    debug!("{} {}: multipolygon has no polygons", kind, id);
                    Ok(empty_polygon())
                }
            }
        }
        other => Err(AggregationError::GeoJson(format!(
            "{kind} {id}: unsupported geometry type {other:?}"
        ))),
    }
}

fn feature_geometry(feature: &Value, kind: UnitKind, id: &str) -> Result<Polygon<f64>> {
    let geometry = feature
        .get("geometry")
        .filter(|g| !g.is_null())
        .ok_or_else(|| {
            AggregationError::GeoJson(format!("{kind} {id}: feature has no geometry"))
        })?;
    parse_polygon(geometry, kind, id)
}

/// Read tracts from a FeatureCollection.
///
/// Expected properties: `id`, `population`, `density` and `metrics`
/// (metric id -> `{name, code, count, rate}`). Missing statistics default to
/// zero or empty.
pub fn tracts_from_feature_collection(collection: &Value) -> Result<Vec<SourceUnit>> {
    features(collection)?
        .iter()
        .enumerate()
        .map(|(i, feature)| {
            let id = string_property(feature, "id").unwrap_or_else(|| format!("tract-{i}"));

            let population = number_property(feature, "population").unwrap_or(0.0);
            if population < 0.0 {
                return Err(AggregationError::GeoJson(format!(
                    "tract {id}: negative population {population}"
                )));
            }
            let density = number_property(feature, "density").unwrap_or(0.0);
            let geometry = feature_geometry(feature, UnitKind::Tract, &id)?;

            let mut tract = SourceUnit::new(id, population.round() as u64, density, geometry);

            if let Some(metrics) = feature["properties"]["metrics"].as_object() {
                for (metric_id, raw) in metrics {
                    let raw: RawMetric = serde_json::from_value(raw.clone()).map_err(|e| {
                        AggregationError::GeoJson(format!(
                            "tract {}: metric {metric_id}: {e}",
                            tract.id
                        ))
                    })?;
                    let record = MetricRecord::new(
                        raw.name.unwrap_or_else(|| metric_id.clone()),
                        raw.code.unwrap_or_default(),
                        raw.count,
                        raw.rate,
                    );
                    tract.metrics.insert(metric_id.clone(), record);
                }
            }

            Ok(tract)
        })
        .collect()
}

/// Read target units from a FeatureCollection.
///
/// `id_key`/`name_key` name the properties holding the unit id and display
/// name (e.g. `ward` and `ward_name`); the name falls back to the id.
pub fn units_from_feature_collection(
    collection: &Value,
    id_key: &str,
    name_key: &str,
) -> Result<Vec<TargetUnit>> {
    features(collection)?
        .iter()
        .enumerate()
        .map(|(i, feature)| {
            let id = string_property(feature, id_key).unwrap_or_else(|| format!("unit-{i}"));
            let name = string_property(feature, name_key).unwrap_or_else(|| id.clone());
            let geometry = feature_geometry(feature, UnitKind::Target, &id)?;
            Ok(TargetUnit::new(id, name, geometry))
        })
        .collect()
}

fn ring_coordinates(ring: &LineString<f64>) -> Value {
    Value::Array(ring.0.iter().map(|c| json!([c.x, c.y])).collect())
}

fn polygon_geometry(polygon: &Polygon<f64>) -> Value {
    if polygon.exterior().0.is_empty() {
        return json!({ "type": "Polygon", "coordinates": [] });
    }
    let mut rings = vec![ring_coordinates(polygon.exterior())];
    rings.extend(polygon.interiors().iter().map(ring_coordinates));
    json!({ "type": "Polygon", "coordinates": rings })
}

/// Flatten one aggregated unit into feature properties
pub fn unit_properties(unit: &AggregatedUnit) -> Map<String, Value> {
    let mut props = Map::new();
    props.insert("id".to_string(), json!(unit.id));
    props.insert("name".to_string(), json!(unit.name));
    props.insert("population".to_string(), json!(unit.population));
    props.insert("density".to_string(), json!(unit.density));
    props.insert("quality_score".to_string(), json!(unit.quality_score));
    props.insert("tract_count".to_string(), json!(unit.tract_ids.len()));
    props.insert("tract_ids".to_string(), json!(unit.tract_ids));

    let metrics: BTreeMap<&str, Value> = unit
        .metrics
        .iter()
        .map(|(metric_id, record)| (metric_id.as_str(), json!(record)))
        .collect();
    props.insert("metrics".to_string(), json!(metrics));

    for (metric_id, record) in &unit.metrics {
        props.insert(format!("{metric_id}_count"), json!(record.count));
        props.insert(format!("{metric_id}_rate"), json!(record.rate));
    }

    props
}

/// Build a FeatureCollection from pipeline output.
///
/// `targets` must be the slice the units were aggregated from; geometry is
/// matched by position.
pub fn feature_collection(units: &[AggregatedUnit], targets: &[TargetUnit]) -> Value {
    let features: Vec<Value> = units
        .iter()
        .zip(targets)
        .map(|(unit, target)| {
            json!({
                "type": "Feature",
                "geometry": polygon_geometry(&target.geometry),
                "properties": unit_properties(unit),
            })
        })
        .collect();

    json!({ "type": "FeatureCollection", "features": features })
}
