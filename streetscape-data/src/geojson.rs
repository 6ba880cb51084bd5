//! GeoJSON export of the published feature collection.
//!
//! Output follows RFC 7946: WGS84 positions, exterior rings
//! counter-clockwise and holes clockwise. Single-part regions are written
//! as `Polygon`, the rest as `MultiPolygon`. Feature order and property
//! order are fixed, so identical collections serialise to identical bytes.

use std::io::{BufWriter, Write};

use camino::{Utf8Path, Utf8PathBuf};
use geo::orient::{Direction, Orient};
use geo::{LineString, MultiPolygon, Polygon};
use serde::Serialize;
use streetscape_core::{Access, AccessSource, SpaceFeature, SpaceFeatureCollection, SpaceType};
use thiserror::Error;

/// Errors raised while writing GeoJSON.
#[derive(Debug, Error)]
pub enum GeoJsonError {
    /// Serialisation or the underlying writer failed.
    #[error("failed to write GeoJSON: {0}")]
    Serialize(#[from] serde_json::Error),
    /// The output file could not be created or flushed.
    #[error("failed to write GeoJSON file at {path}")]
    Io {
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
        /// Output file.
        path: Utf8PathBuf,
    },
}

type Position = [f64; 2];
type Ring = Vec<Position>;

#[derive(Serialize)]
struct FeatureCollection<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    features: Vec<Feature<'a>>,
}

#[derive(Serialize)]
struct Feature<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    geometry: Geometry,
    properties: Properties<'a>,
}

#[derive(Serialize)]
#[serde(tag = "type", content = "coordinates")]
enum Geometry {
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
}

#[derive(Serialize)]
struct Properties<'a> {
    space_type: SpaceType,
    access: Access,
    viz_category: &'a str,
    access_derived_from: AccessSource,
    osm_id: Option<String>,
}

fn ring(line: &LineString<f64>) -> Ring {
    line.coords().map(|c| [c.x, c.y]).collect()
}

fn polygon_rings(polygon: &Polygon<f64>) -> Vec<Ring> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(ring)
        .collect()
}

fn geometry(shape: &MultiPolygon<f64>) -> Geometry {
    let oriented = shape.orient(Direction::Default);
    match oriented.0.as_slice() {
        [single] => Geometry::Polygon(polygon_rings(single)),
        parts => Geometry::MultiPolygon(parts.iter().map(polygon_rings).collect()),
    }
}

impl<'a> From<&'a SpaceFeature> for Feature<'a> {
    fn from(feature: &'a SpaceFeature) -> Self {
        Self {
            kind: "Feature",
            geometry: geometry(&feature.geometry),
            properties: Properties {
                space_type: feature.space_type,
                access: feature.access,
                viz_category: &feature.viz_category,
                access_derived_from: feature.access_derived_from,
                osm_id: feature.osm_id.map(|id| id.to_string()),
            },
        }
    }
}

/// Serialise `collection` as a GeoJSON `FeatureCollection`.
///
/// # Errors
/// Returns [`GeoJsonError::Serialize`] when serialisation or the writer
/// fails.
///
/// # Examples
/// ```
/// use streetscape_core::SpaceFeatureCollection;
/// use streetscape_data::write_geojson;
///
/// let mut out = Vec::new();
/// write_geojson(&mut out, &SpaceFeatureCollection::default())?;
/// assert_eq!(out, b"{\"type\":\"FeatureCollection\",\"features\":[]}\n");
/// # Ok::<(), streetscape_data::GeoJsonError>(())
/// ```
pub fn write_geojson<W: Write>(
    mut writer: W,
    collection: &SpaceFeatureCollection,
) -> Result<(), GeoJsonError> {
    let document = FeatureCollection {
        kind: "FeatureCollection",
        features: collection.iter().map(Feature::from).collect(),
    };
    serde_json::to_writer(&mut writer, &document)?;
    writer
        .write_all(b"\n")
        .map_err(serde_json::Error::io)?;
    Ok(())
}

/// Write `collection` to `path`, creating parent directories as needed.
///
/// # Errors
/// Returns [`GeoJsonError::Io`] when the file cannot be created or flushed
/// and [`GeoJsonError::Serialize`] when serialisation fails.
pub fn write_geojson_file(
    path: &Utf8Path,
    collection: &SpaceFeatureCollection,
) -> Result<(), GeoJsonError> {
    let io_error = |source| GeoJsonError::Io {
        source,
        path: path.to_path_buf(),
    };
    let file = streetscape_fs::create_file(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    write_geojson(&mut writer, collection)?;
    writer.flush().map_err(io_error)
}
