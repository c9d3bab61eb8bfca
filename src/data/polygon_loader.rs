use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::constants::DEFAULT_WEIGHT;
use crate::data::poi::Coordinate;
use crate::error::{LocatorError, LocatorResult};
use crate::utils::logging::{self, FileIOType, OperationCategory};

/// First ring of one feature, plus the demand weight read from its properties.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRing {
    pub ring: Vec<Coordinate>,
    pub weight: f64,
}

pub fn load_polygon_ring<P: AsRef<Path>>(path: P) -> LocatorResult<Vec<Coordinate>> {
    let _timing = logging::start_timing("load_polygon_ring",
        OperationCategory::FileIO { subcategory: FileIOType::PolygonLoad });

    let path = path.as_ref();
    let file = File::open(path)?;
    let ring = read_polygon_ring(BufReader::new(file))?;
    info!("Loaded polygon ring with {} coordinates from {}", ring.len(), path.display());
    Ok(ring)
}

pub fn read_polygon_ring(mut reader: impl Read) -> LocatorResult<Vec<Coordinate>> {
    let mut buffer = String::new();
    reader.read_to_string(&mut buffer)?;
    parse_polygon_ring(&buffer)
}

/// Extracts `features[0].geometry.coordinates[0]`.
pub fn parse_polygon_ring(json: &str) -> LocatorResult<Vec<Coordinate>> {
    let document: Value = serde_json::from_str(json)?;
    first_ring(features_of(&document)?)
}

/// The polygon ring together with the features usable as weighted demand.
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    pub ring: Vec<Coordinate>,
    pub features: Vec<FeatureRing>,
}

/// Reads the file once and extracts both the polygon ring and the demand features.
pub fn load_site<P: AsRef<Path>>(path: P, weight_property: &str) -> LocatorResult<Site> {
    let _timing = logging::start_timing("load_site",
        OperationCategory::FileIO { subcategory: FileIOType::PolygonLoad });

    let path = path.as_ref();
    let mut buffer = String::new();
    File::open(path)?.read_to_string(&mut buffer)?;
    let site = parse_site(&buffer, weight_property)?;
    info!("Loaded a {}-coordinate ring and {} demand features from {}",
          site.ring.len(), site.features.len(), path.display());
    Ok(site)
}

/// Only the first feature has to hold a polygon ring. Later features without
/// one (points, lines, empty rings) are left out of the demand with a warning.
pub fn parse_site(json: &str, weight_property: &str) -> LocatorResult<Site> {
    let document: Value = serde_json::from_str(json)?;
    let features = features_of(&document)?;
    let ring = first_ring(features)?;
    Ok(Site {
        ring,
        features: demand_features(features, weight_property),
    })
}

pub fn parse_feature_rings(json: &str, weight_property: &str) -> LocatorResult<Vec<FeatureRing>> {
    Ok(parse_site(json, weight_property)?.features)
}

fn first_ring(features: &[Value]) -> LocatorResult<Vec<Coordinate>> {
    let first = features
        .first()
        .ok_or_else(|| LocatorError::Parse("`features` is empty".to_string()))?;
    feature_ring(first, 0)
}

fn demand_features(features: &[Value], weight_property: &str) -> Vec<FeatureRing> {
    features
        .iter()
        .enumerate()
        .filter_map(|(index, feature)| match feature_ring(feature, index) {
            Ok(ring) if ring.is_empty() => {
                warn!("Feature {} has an empty ring, leaving it out of the demand", index);
                None
            }
            Ok(ring) => Some(FeatureRing {
                ring,
                weight: feature_weight(feature, index, weight_property),
            }),
            Err(e) => {
                warn!("Feature {} has no polygon ring, leaving it out of the demand: {}", index, e);
                None
            }
        })
        .collect()
}

fn features_of(document: &Value) -> LocatorResult<&[Value]> {
    document
        .get("features")
        .ok_or_else(|| LocatorError::Parse("missing `features`".to_string()))?
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| LocatorError::Parse("`features` is not an array".to_string()))
}

fn feature_ring(feature: &Value, index: usize) -> LocatorResult<Vec<Coordinate>> {
    let geometry = feature
        .get("geometry")
        .filter(|g| !g.is_null())
        .ok_or_else(|| LocatorError::Parse(format!("missing `features[{}].geometry`", index)))?;
    let coordinates = geometry
        .get("coordinates")
        .and_then(Value::as_array)
        .ok_or_else(|| LocatorError::Parse(format!("missing `features[{}].geometry.coordinates`", index)))?;

    // MultiPolygon nests one level deeper; take the outer ring of its first polygon
    let is_multi = geometry.get("type").and_then(Value::as_str) == Some("MultiPolygon");
    let mut ring = coordinates.first();
    let mut path = format!("features[{}].geometry.coordinates[0]", index);
    if is_multi {
        ring = ring.and_then(Value::as_array).and_then(|polygon| polygon.first());
        path.push_str("[0]");
    }

    let ring = ring
        .and_then(Value::as_array)
        .ok_or_else(|| LocatorError::Parse(format!("missing ring at `{}`", path)))?;

    let coords = ring
        .iter()
        .enumerate()
        .map(|(i, position)| parse_position(position, &path, i))
        .collect::<LocatorResult<Vec<_>>>()?;

    debug!("Feature {} ring has {} positions", index, coords.len());
    Ok(coords)
}

fn parse_position(position: &Value, path: &str, i: usize) -> LocatorResult<Coordinate> {
    let invalid = || LocatorError::Parse(format!("`{}[{}]` is not a [lon, lat] position", path, i));
    let values = position.as_array().ok_or_else(invalid)?;
    if values.len() < 2 {
        return Err(invalid());
    }
    let x = values[0].as_f64().ok_or_else(invalid)?;
    let y = values[1].as_f64().ok_or_else(invalid)?;
    Ok(Coordinate::new(x, y))
}

fn feature_weight(feature: &Value, index: usize, weight_property: &str) -> f64 {
    match feature.get("properties").and_then(|p| p.get(weight_property)) {
        None | Some(Value::Null) => DEFAULT_WEIGHT,
        Some(value) => value.as_f64().unwrap_or_else(|| {
            warn!("Feature {} property `{}` is not numeric ({}), using weight {}",
                  index, weight_property, value, DEFAULT_WEIGHT);
            DEFAULT_WEIGHT
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SQUARE: &str = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {"population": 1200},
            "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]}
        }]
    }"#;

    #[test]
    fn extracts_first_ring_of_first_feature() {
        let ring = parse_polygon_ring(SQUARE).unwrap();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[1], Coordinate::new(1.0, 0.0));
    }

    #[test]
    fn reads_from_any_reader() {
        let ring = read_polygon_ring(Cursor::new(SQUARE)).unwrap();
        assert_eq!(ring[2], Coordinate::new(1.0, 1.0));
    }

    #[test]
    fn missing_features_is_a_parse_error() {
        let err = parse_polygon_ring(r#"{"type": "FeatureCollection"}"#).unwrap_err();
        assert!(matches!(err, LocatorError::Parse(ref m) if m.contains("features")));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(parse_polygon_ring("{\"features\": ["), Err(LocatorError::Parse(_))));
    }

    #[test]
    fn empty_features_is_a_parse_error() {
        assert!(matches!(parse_polygon_ring(r#"{"features": []}"#), Err(LocatorError::Parse(_))));
    }

    #[test]
    fn null_geometry_is_a_parse_error() {
        let json = r#"{"features": [{"type": "Feature", "geometry": null}]}"#;
        let err = parse_polygon_ring(json).unwrap_err();
        assert!(matches!(err, LocatorError::Parse(ref m) if m.contains("geometry")));
    }

    #[test]
    fn short_position_is_rejected() {
        let json = r#"{"features": [{"geometry": {"coordinates": [[[0,0],[1],[1,1]]]}}]}"#;
        let err = parse_polygon_ring(json).unwrap_err();
        assert!(matches!(err, LocatorError::Parse(ref m) if m.contains("[1]")));
    }

    #[test]
    fn altitude_is_ignored() {
        let json = r#"{"features": [{"geometry": {"coordinates": [[[0,0,10],[2,0,10],[2,2,10]]]}}]}"#;
        let ring = parse_polygon_ring(json).unwrap();
        assert_eq!(ring[1], Coordinate::new(2.0, 0.0));
    }

    #[test]
    fn multipolygon_uses_first_outer_ring() {
        let json = r#"{"features": [{"geometry": {"type": "MultiPolygon",
            "coordinates": [[[[5,5],[6,5],[6,6]]], [[[9,9],[10,9],[10,10]]]]}}]}"#;
        let ring = parse_polygon_ring(json).unwrap();
        assert_eq!(ring, vec![
            Coordinate::new(5.0, 5.0),
            Coordinate::new(6.0, 5.0),
            Coordinate::new(6.0, 6.0),
        ]);
    }

    #[test]
    fn feature_weights_come_from_the_named_property() {
        let json = r#"{"features": [
            {"properties": {"population": 300}, "geometry": {"coordinates": [[[0,0],[1,0],[1,1]]]}},
            {"properties": {"population": "n/a"}, "geometry": {"coordinates": [[[2,2],[3,2],[3,3]]]}},
            {"geometry": {"coordinates": [[[4,4],[5,4],[5,5]]]}}
        ]}"#;
        let rings = parse_feature_rings(json, "population").unwrap();
        let weights: Vec<f64> = rings.iter().map(|r| r.weight).collect();
        assert_eq!(weights, vec![300.0, 1.0, 1.0]);
    }

    #[test]
    fn point_features_after_the_polygon_are_skipped() {
        let json = r#"{"features": [
            {"geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]}},
            {"geometry": {"type": "Point", "coordinates": [0.5, 0.5]}},
            {"geometry": {"type": "LineString", "coordinates": [[0,0],[1,1]]}}
        ]}"#;
        let site = parse_site(json, "population").unwrap();
        assert_eq!(site.ring.len(), 5);
        assert_eq!(site.features.len(), 1);
        assert_eq!(site.features[0].ring, site.ring);
    }

    #[test]
    fn empty_rings_are_left_out_of_the_demand() {
        let json = r#"{"features": [
            {"geometry": {"coordinates": [[[0,0],[2,0],[2,2]]]}},
            {"properties": {"population": 9}, "geometry": {"coordinates": [[]]}}
        ]}"#;
        let rings = parse_feature_rings(json, "population").unwrap();
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].weight, 1.0);
    }

    #[test]
    fn bad_first_feature_still_fails_the_site() {
        let json = r#"{"features": [
            {"geometry": {"type": "Point", "coordinates": [0.5, 0.5]}},
            {"geometry": {"coordinates": [[[0,0],[1,0],[1,1]]]}}
        ]}"#;
        assert!(matches!(parse_site(json, "population"), Err(LocatorError::Parse(_))));
    }
}
