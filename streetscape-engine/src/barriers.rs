//! Barrier access and inaccessible enclosures.
//!
//! A fence, wall, motorway or railway blocks movement unless something
//! crosses it. Each access barrier therefore takes its access from the
//! entrances touching it. Private barriers and buildings together enclose
//! areas nobody can reach; those become private yard candidates unless an
//! existing areal element already describes them.

use geo::algorithm::buffer::Buffer;
use geo::{Area, BooleanOps, Geometry, Intersects, MultiPolygon, Polygon};
use log::debug;
use streetscape_core::{Access, AccessSource, ElementGeometry, OsmElement, ShapeKind};

use crate::buffer::{Footprint, buffer_line_square};
use crate::geometry::{area, envelope, is_void, union_all};
use crate::index::EnvelopeIndex;
use crate::roles::{is_access_barrier, is_entrance};

/// Access of a barrier given the entrances crossing it.
///
/// `entrances` holds the access of each crossing entrance; `touching(i, j)`
/// reports whether entrances `i` and `j` intersect each other. When several
/// entrances cross, an entrance touching a private one is discarded
/// together with it: an untagged path ending at a private gate grants
/// nothing.
///
/// # Examples
/// ```
/// use streetscape_core::Access;
/// use streetscape_engine::barriers::barrier_access_from_entrances;
///
/// assert_eq!(barrier_access_from_entrances(&[], |_, _| false), Access::Private);
/// assert_eq!(barrier_access_from_entrances(&[None], |_, _| false), Access::Public);
/// ```
#[must_use]
pub fn barrier_access_from_entrances(
    entrances: &[Option<Access>],
    touching: impl Fn(usize, usize) -> bool,
) -> Access {
    match entrances {
        [] => Access::Private,
        [single] => single.unwrap_or(Access::Public),
        _ => {
            let private = |i: usize| entrances[i] == Some(Access::Private);
            let mut dropped = vec![false; entrances.len()];
            for i in 0..entrances.len() {
                for j in i + 1..entrances.len() {
                    if (private(i) || private(j)) && touching(i, j) {
                        dropped[i] = true;
                        dropped[j] = true;
                    }
                }
            }
            let kept = || {
                entrances
                    .iter()
                    .zip(&dropped)
                    .filter(|(_, gone)| !**gone)
                    .map(|(access, _)| *access)
            };
            if kept().any(|a| matches!(a, None | Some(Access::Public | Access::Undefined))) {
                Access::Public
            } else if kept().any(|a| a == Some(Access::Restricted)) {
                Access::Restricted
            } else {
                Access::Private
            }
        }
    }
}

fn as_geometry(geometry: &ElementGeometry) -> Geometry<f64> {
    match geometry {
        ElementGeometry::Point(point) => Geometry::Point(*point),
        ElementGeometry::Line(line) => Geometry::LineString(line.clone()),
        ElementGeometry::Area(polygon) => Geometry::Polygon(polygon.clone()),
    }
}

/// Give every access barrier without access the access its entrances grant.
///
/// Returns the number of barriers written.
pub fn assign_barrier_access(elements: &mut [OsmElement]) -> usize {
    let entrances: Vec<(Geometry<f64>, Option<Access>)> = elements
        .iter()
        .filter(|e| is_entrance(e))
        .map(|e| (as_geometry(&e.geometry), e.access()))
        .collect();
    let index = EnvelopeIndex::new(
        elements
            .iter()
            .filter(|e| is_entrance(e))
            .map(|e| e.geometry.bounding_rect()),
    );

    let mut written = 0;
    for barrier in elements.iter_mut().filter(|e| is_access_barrier(e)) {
        if barrier.access().is_some() {
            continue;
        }
        let Some(rect) = barrier.geometry.bounding_rect() else {
            continue;
        };
        let shape = as_geometry(&barrier.geometry);
        let crossing: Vec<usize> = index
            .intersecting(&rect)
            .into_iter()
            .filter(|&i| shape.intersects(&entrances[i].0))
            .collect();
        let accesses: Vec<Option<Access>> = crossing.iter().map(|&i| entrances[i].1).collect();
        let access = barrier_access_from_entrances(&accesses, |a, b| {
            entrances[crossing[a]].0.intersects(&entrances[crossing[b]].0)
        });
        debug!(
            "barrier {} crossed by {} entrance(s) -> {access}",
            barrier.id,
            crossing.len()
        );
        if barrier.set_access(access, AccessSource::BarrierEntrances) {
            written += 1;
        }
    }
    written
}

/// Areas fully enclosed by private barriers and buildings.
///
/// Barrier geometries and building footprints are grown by `buffer` so
/// touching outlines close, unioned, and every hole of the union becomes
/// one enclosure, grown back by `buffer`.
#[must_use]
pub fn enclosed_areas(
    private_barriers: &[&ElementGeometry],
    buildings: &[&MultiPolygon<f64>],
    buffer: f64,
) -> Vec<MultiPolygon<f64>> {
    let mut parts: Vec<MultiPolygon<f64>> = private_barriers
        .iter()
        .filter_map(|geometry| match geometry {
            ElementGeometry::Line(line) => Some(buffer_line_square(line, buffer)),
            ElementGeometry::Area(polygon) => Some(polygon.buffer(buffer)),
            ElementGeometry::Point(_) => None,
        })
        .collect();
    parts.extend(buildings.iter().map(|footprint| footprint.buffer(buffer)));

    union_all(parts)
        .iter()
        .flat_map(|polygon| polygon.interiors().iter())
        .map(|ring| Polygon::new(ring.clone(), Vec::new()).buffer(buffer))
        .filter(|enclosure| !is_void(enclosure))
        .collect()
}

/// Drop enclosures an areal footprint already describes.
///
/// An enclosure overlapping an areal footprint by at least `threshold` of
/// both areas is discarded; the footprint becomes private unless its access
/// is already known. Returns the enclosures that remain.
pub fn absorb_enclosures(
    enclosures: Vec<MultiPolygon<f64>>,
    footprints: &mut [Footprint],
    threshold: f64,
) -> Vec<MultiPolygon<f64>> {
    let index = EnvelopeIndex::new(footprints.iter().map(|f| {
        if f.shape == ShapeKind::Area {
            envelope(&f.element.geometry)
        } else {
            None
        }
    }));

    enclosures
        .into_iter()
        .filter(|enclosure| {
            let Some(rect) = envelope(enclosure) else {
                return false;
            };
            let enclosure_area = area(enclosure);
            for position in index.intersecting(&rect) {
                let footprint = &mut footprints[position];
                let element_area = area(&footprint.element.geometry);
                if element_area <= 0.0 {
                    continue;
                }
                let shared = footprint.element.geometry.intersection(enclosure).unsigned_area();
                if shared / enclosure_area >= threshold && shared / element_area >= threshold {
                    if footprint.element.access.is_none() {
                        footprint.element.access = Some(Access::Private);
                        footprint.element.access_source = Some(AccessSource::Enclosure);
                    }
                    return false;
                }
            }
            true
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use streetscape_core::test_support::{area_way, line_way, rectangle, tagged_node};
    use streetscape_core::{ElementId, GeometryElement, GeometrySource, SpaceType};

    #[rstest]
    #[case(&[], Access::Private)]
    #[case(&[Some(Access::Restricted)], Access::Restricted)]
    #[case(&[None, Some(Access::Private)], Access::Public)]
    #[case(&[Some(Access::Private), Some(Access::Private)], Access::Private)]
    #[case(&[Some(Access::Restricted), Some(Access::Private)], Access::Restricted)]
    fn apart_entrances_decide_independently(
        #[case] entrances: &[Option<Access>],
        #[case] expected: Access,
    ) {
        assert_eq!(barrier_access_from_entrances(entrances, |_, _| false), expected);
    }

    #[test]
    fn path_through_private_gate_grants_nothing() {
        let entrances = [None, Some(Access::Private)];
        assert_eq!(barrier_access_from_entrances(&entrances, |_, _| true), Access::Private);
    }

    fn fenced_yard() -> Vec<OsmElement> {
        let ring = [(0.0, 0.0), (20.0, 0.0), (20.0, 20.0), (0.0, 20.0), (0.0, 0.0)];
        vec![
            line_way(1, &ring, &[("barrier", "fence")]),
            tagged_node(2, 10.0, 0.0, &[("barrier", "gate"), ("access", "private")]),
        ]
    }

    #[test]
    fn private_gate_closes_fence() {
        let mut elements = fenced_yard();
        elements[1].set_access(Access::Private, AccessSource::Tags);
        assert_eq!(assign_barrier_access(&mut elements), 1);
        assert_eq!(elements[0].access(), Some(Access::Private));
        assert_eq!(elements[0].access_source(), Some(AccessSource::BarrierEntrances));
    }

    #[test]
    fn open_gate_opens_fence() {
        let mut elements = fenced_yard();
        assign_barrier_access(&mut elements);
        assert_eq!(elements[0].access(), Some(Access::Public));
    }

    #[test]
    fn tagged_barrier_access_is_kept() {
        let mut elements = fenced_yard();
        elements[0].set_access(Access::Restricted, AccessSource::Tags);
        assert_eq!(assign_barrier_access(&mut elements), 0);
        assert_eq!(elements[0].access(), Some(Access::Restricted));
    }

    #[test]
    fn closed_fence_encloses_its_yard() {
        let fence = fenced_yard().remove(0);
        let enclosures = enclosed_areas(&[&fence.geometry], &[], 0.001);
        assert_eq!(enclosures.len(), 1);
        assert!((area(&enclosures[0]) - 400.0).abs() < 0.1);
    }

    #[test]
    fn fence_and_buildings_close_a_courtyard() {
        let fence = line_way(1, &[(0.0, 0.0), (0.0, 10.0)], &[("barrier", "wall")]);
        let west = MultiPolygon::new(vec![rectangle(-5.0, -5.0, 15.0, 0.0)]);
        let east = MultiPolygon::new(vec![rectangle(10.0, 0.0, 15.0, 15.0)]);
        let north = MultiPolygon::new(vec![rectangle(-5.0, 10.0, 15.0, 15.0)]);
        let enclosures = enclosed_areas(&[&fence.geometry], &[&west, &east, &north], 0.001);
        assert_eq!(enclosures.len(), 1);
        assert!((area(&enclosures[0]) - 100.0).abs() < 0.1);
    }

    #[test]
    fn open_line_encloses_nothing() {
        let fence = line_way(1, &[(0.0, 0.0), (100.0, 0.0)], &[("barrier", "fence")]);
        assert!(enclosed_areas(&[&fence.geometry], &[], 0.001).is_empty());
    }

    #[test]
    fn garden_absorbs_matching_enclosure() {
        let garden = area_way(5, rectangle(0.0, 0.0, 20.0, 20.0), &[("leisure", "garden")]);
        let mut footprints = vec![Footprint {
            element: GeometryElement::from_element(
                &garden,
                MultiPolygon::new(vec![rectangle(0.0, 0.0, 20.0, 20.0)]),
            ),
            shape: ShapeKind::Area,
        }];
        let enclosure = MultiPolygon::new(vec![rectangle(-0.001, -0.001, 20.001, 20.001)]);
        let remaining = absorb_enclosures(vec![enclosure], &mut footprints, 0.95);
        assert!(remaining.is_empty());
        assert_eq!(footprints[0].element.access, Some(Access::Private));
        assert_eq!(footprints[0].element.access_source, Some(AccessSource::Enclosure));
        assert_eq!(footprints[0].element.source, GeometrySource::Osm(ElementId::way(5)));
    }

    #[test]
    fn small_feature_leaves_enclosure_in_place() {
        let mut footprints = vec![Footprint {
            element: GeometryElement::synthetic(
                0,
                MultiPolygon::new(vec![rectangle(0.0, 0.0, 2.0, 2.0)]),
                SpaceType::Playground,
                None,
                None,
            ),
            shape: ShapeKind::Area,
        }];
        let enclosure = MultiPolygon::new(vec![rectangle(0.0, 0.0, 20.0, 20.0)]);
        let remaining = absorb_enclosures(vec![enclosure], &mut footprints, 0.95);
        assert_eq!(remaining.len(), 1);
        assert_eq!(footprints[0].element.access, None);
    }
}
