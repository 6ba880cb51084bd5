//! Building clipping.
//!
//! Building footprints are removed from the mapped area, except where a
//! `tunnel=building_passage` way runs through them. Each passage is linked
//! to the buildings it overlaps; a passage linked to no building is kept as
//! ordinary space and reported.

use geo::{Area, BooleanOps, MultiPolygon};
use log::{debug, warn};
use streetscape_core::{ElementId, RunWarning};

use crate::buffer::Footprint;
use crate::geometry::{empty, envelope, union_all};
use crate::index::EnvelopeIndex;

/// Outcome of clipping buildings against their passages.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingClip {
    /// Union of everything removed from the mapped area.
    pub removed: MultiPolygon<f64>,
    /// Per-building footprints with passages cut out, in input order.
    pub footprints: Vec<(ElementId, MultiPolygon<f64>)>,
    /// Passages that overlap no building.
    pub warnings: Vec<RunWarning>,
}

/// Subtract passages from the buildings they cross.
///
/// `buildings` holds repaired building outlines; `passages` holds the
/// buffered passage footprints. Passages stay in the candidate set either
/// way; this only decides how much of each building is removed.
#[must_use]
pub fn clip_buildings(
    buildings: &[(ElementId, MultiPolygon<f64>)],
    passages: &[Footprint],
) -> BuildingClip {
    let index = EnvelopeIndex::new(buildings.iter().map(|(_, shape)| envelope(shape)));
    let mut linked: Vec<Vec<&MultiPolygon<f64>>> = vec![Vec::new(); buildings.len()];
    let mut warnings = Vec::new();

    for passage in passages {
        let geometry = &passage.element.geometry;
        let Some(rect) = envelope(geometry) else {
            continue;
        };
        let mut hits = 0usize;
        for position in index.intersecting(&rect) {
            let (_, building) = &buildings[position];
            if building.intersection(geometry).unsigned_area() > 0.0 {
                linked[position].push(geometry);
                hits += 1;
            }
        }
        if hits == 0 {
            if let Some(id) = passage.element.origin() {
                warn!("building passage {id} does not overlap any building");
                warnings.push(RunWarning::PassageOutsideBuilding { passage: id });
            }
        }
    }

    let footprints: Vec<(ElementId, MultiPolygon<f64>)> = buildings
        .iter()
        .zip(linked)
        .map(|((id, building), cuts)| {
            if cuts.is_empty() {
                return (*id, building.clone());
            }
            debug!("cutting {} passage(s) out of building {id}", cuts.len());
            let opening = union_all(cuts.into_iter().cloned().collect());
            (*id, building.difference(&opening))
        })
        .collect();

    let removed = if footprints.is_empty() {
        empty()
    } else {
        union_all(footprints.iter().map(|(_, shape)| shape.clone()).collect())
    };

    BuildingClip {
        removed,
        footprints,
        warnings,
    }
}
