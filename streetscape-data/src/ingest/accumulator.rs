//! Internal accumulator for OpenStreetMap (OSM) PBF ingestion.
//!
//! Each decoded block fills its own accumulator; accumulators merge in any
//! order, and way geometry is only built once every node is known.
use std::collections::HashMap;

use geo::{Coord, LineString, Point, Polygon};
use log::debug;
use osmpbf::Element;
use streetscape_core::{BoundingBox, ElementGeometry, ElementId, OsmElement, Tags};

use super::tags::collect_tags;
use super::{OsmIngestSummary, OsmLoadReport};

/// Closed ways need at least this many references to enclose an area.
const MIN_AREA_REFS: usize = 4;

#[derive(Debug, Default)]
pub(super) struct OsmElementAccumulator {
    summary: OsmIngestSummary,
    nodes: HashMap<i64, Coord<f64>>,
    points: Vec<OsmElement>,
    ways: Vec<WayCandidate>,
}

impl OsmElementAccumulator {
    pub(super) fn process_element(&mut self, element: Element<'_>) {
        match element {
            Element::Node(node) => {
                self.process_node(node.id(), node.lon(), node.lat(), node.tags());
            }
            Element::DenseNode(node) => {
                self.process_node(node.id(), node.lon(), node.lat(), node.tags());
            }
            Element::Way(way) => self.process_way(way.id(), way.refs(), way.tags()),
            Element::Relation(_) => self.summary.record_relation(),
        }
    }

    fn process_node<'a, T>(&mut self, raw_id: i64, lon: f64, lat: f64, tags: T)
    where
        T: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let location = validated_coord(lon, lat);
        self.summary.record_node(location);
        let Some(location) = location else {
            return;
        };
        self.nodes.insert(raw_id, location);

        let tags = collect_tags(tags);
        if !tags.is_empty() {
            self.points.push(OsmElement::new(
                ElementId::node(raw_id),
                ElementGeometry::Point(Point(location)),
                tags,
            ));
        }
    }

    fn process_way<'a, R, T>(&mut self, raw_id: i64, refs: R, tags: T)
    where
        R: IntoIterator<Item = i64>,
        T: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.summary.record_way();
        let tags = collect_tags(tags);
        if tags.is_empty() {
            return;
        }
        self.ways.push(WayCandidate {
            id: raw_id,
            refs: refs.into_iter().collect(),
            tags,
        });
    }

    pub(super) fn combine(mut self, other: Self) -> Self {
        self.summary = self.summary.combine(other.summary);
        for (id, coord) in other.nodes {
            self.nodes.entry(id).or_insert(coord);
        }
        self.points.extend(other.points);
        self.ways.extend(other.ways);
        self
    }

    pub(super) fn into_report(self, bbox: &BoundingBox) -> OsmLoadReport {
        let Self {
            summary,
            nodes,
            points: mut elements,
            ways,
        } = self;
        let mut skipped_ways = 0;
        for way in ways {
            match way.geometry(&nodes) {
                Some(geometry) => {
                    elements.push(OsmElement::new(ElementId::way(way.id), geometry, way.tags));
                }
                None => {
                    debug!("way/{} has unresolved node references", way.id);
                    skipped_ways += 1;
                }
            }
        }
        elements.retain(|element| {
            element
                .geometry
                .bounding_rect()
                .is_some_and(|rect| bbox.intersects_rect(&rect))
        });
        elements.sort_by_key(|element| element.id);
        OsmLoadReport {
            summary,
            elements,
            skipped_ways,
        }
    }
}

#[derive(Debug)]
struct WayCandidate {
    id: i64,
    refs: Vec<i64>,
    tags: Tags,
}

impl WayCandidate {
    /// Area for a closed ring, line otherwise; `None` when a node is missing.
    fn geometry(&self, nodes: &HashMap<i64, Coord<f64>>) -> Option<ElementGeometry> {
        let coords: Vec<Coord<f64>> = self
            .refs
            .iter()
            .map(|id| nodes.get(id).copied())
            .collect::<Option<_>>()?;
        if coords.len() < 2 {
            return None;
        }
        let closed = self.refs.len() >= MIN_AREA_REFS && self.refs.first() == self.refs.last();
        let line = LineString::new(coords);
        Some(if closed {
            ElementGeometry::Area(Polygon::new(line, Vec::new()))
        } else {
            ElementGeometry::Line(line)
        })
    }
}

pub(super) fn validated_coord(lon: f64, lat: f64) -> Option<Coord<f64>> {
    (lon.is_finite()
        && lat.is_finite()
        && (-180.0..=180.0).contains(&lon)
        && (-90.0..=90.0).contains(&lat))
    .then_some(Coord { x: lon, y: lat })
}
