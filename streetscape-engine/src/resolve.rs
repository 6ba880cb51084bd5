//! Overlap resolution: from overlapping candidates to a partition.
//!
//! Candidates are sorted by priority rank, then by area (smaller first),
//! then by source. A fold threads the remaining ground through the sorted
//! list; each candidate claims whatever of its footprint is still free and
//! the claim is emitted as regions, one per connected component. What is
//! left at the end becomes `undefined` ground. Fragments smaller than the
//! minimum area are merged into their largest neighbour.

use std::cmp::Ordering;

use geo::algorithm::buffer::Buffer;
use geo::{BooleanOps, Intersects, MultiPolygon};
use log::debug;
use streetscape_core::{
    Access, AccessSource, BoundingBox, ClassifiedRegion, ConfigurationError, GeometryElement,
    MappingConfig, SpaceType,
};

use crate::geometry::{area, envelope, expand};
use crate::index::EnvelopeIndex;

struct Ranked<'a> {
    rank: usize,
    area: f64,
    candidate: &'a GeometryElement,
    clipped: MultiPolygon<f64>,
}

impl Ranked<'_> {
    fn order(&self, other: &Self) -> Ordering {
        self.rank
            .cmp(&other.rank)
            .then_with(|| self.area.total_cmp(&other.area))
            .then_with(|| self.candidate.source.cmp(&other.candidate.source))
    }
}

/// Partition the bounding box into classified regions.
///
/// `removed` is the area taken out of the map, usually building footprints.
/// Candidates without a space type are treated as `undefined`.
///
/// # Errors
/// Returns [`ConfigurationError::MissingPriority`] when a candidate's space
/// type has no rank in `config.priority`.
pub fn resolve(
    candidates: &[GeometryElement],
    removed: &MultiPolygon<f64>,
    bbox: &BoundingBox,
    config: &MappingConfig,
) -> Result<Vec<ClassifiedRegion>, ConfigurationError> {
    let frame = MultiPolygon::new(vec![bbox.to_polygon()]);
    let mut ranked = candidates
        .iter()
        .map(|candidate| {
            let space_type = candidate.space_type.unwrap_or(SpaceType::Undefined);
            let rank = config
                .priority_rank(space_type)
                .ok_or(ConfigurationError::MissingPriority(space_type))?;
            let clipped = candidate.geometry.intersection(&frame);
            Ok(Ranked {
                rank,
                area: area(&clipped),
                candidate,
                clipped,
            })
        })
        .collect::<Result<Vec<_>, ConfigurationError>>()?;
    ranked.sort_by(Ranked::order);

    let mut remaining = frame.difference(removed);
    let mut regions = Vec::new();
    for entry in &ranked {
        if entry.area <= 0.0 {
            continue;
        }
        let claim = remaining.intersection(&entry.clipped);
        if area(&claim) <= 0.0 {
            continue;
        }
        remaining = remaining.difference(&entry.clipped);
        let candidate = entry.candidate;
        regions.extend(claim.into_iter().map(|polygon| ClassifiedRegion {
            geometry: MultiPolygon::new(vec![polygon]),
            space_type: candidate.space_type.unwrap_or(SpaceType::Undefined),
            access: candidate.access.unwrap_or(Access::Undefined),
            access_source: candidate.access_source.unwrap_or(AccessSource::Unresolved),
            origin: candidate.origin(),
        }));
    }

    let claimed = regions.len();
    regions.extend(remaining.into_iter().map(|polygon| ClassifiedRegion {
        geometry: MultiPolygon::new(vec![polygon]),
        space_type: SpaceType::Undefined,
        access: Access::Undefined,
        access_source: AccessSource::Unresolved,
        origin: None,
    }));
    debug!(
        "resolved {} candidate(s) into {claimed} claimed and {} leftover region(s)",
        ranked.len(),
        regions.len() - claimed
    );

    Ok(merge_slivers(regions, config.min_area, config.adjacency_tolerance))
}

/// Merge regions below `min_area` into their largest bordering neighbour.
///
/// Neighbours are regions whose geometry touches the fragment, or failing
/// that, lies within `tolerance` of it. Equal areas go to the region
/// emitted first. A fragment with no neighbour is kept.
#[must_use]
pub fn merge_slivers(
    mut regions: Vec<ClassifiedRegion>,
    min_area: f64,
    tolerance: f64,
) -> Vec<ClassifiedRegion> {
    let areas: Vec<f64> = regions.iter().map(|r| area(&r.geometry)).collect();
    let is_sliver: Vec<bool> = areas.iter().map(|a| *a < min_area).collect();
    if !is_sliver.contains(&true) {
        return regions;
    }
    let index = EnvelopeIndex::new(regions.iter().map(|r| envelope(&r.geometry)));

    let mut absorbed = vec![false; regions.len()];
    for sliver in (0..regions.len()).filter(|&i| is_sliver[i]) {
        let Some(rect) = envelope(&regions[sliver].geometry) else {
            absorbed[sliver] = true;
            continue;
        };
        let near: Vec<usize> = index
            .intersecting(&expand(rect, tolerance))
            .into_iter()
            .filter(|&i| i != sliver && !is_sliver[i])
            .collect();
        let touching = |i: &usize| regions[sliver].geometry.intersects(&regions[*i].geometry);
        let mut neighbours: Vec<usize> = near.iter().copied().filter(touching).collect();
        if neighbours.is_empty() {
            let grown = regions[sliver].geometry.buffer(tolerance);
            neighbours = near
                .into_iter()
                .filter(|&i| grown.intersects(&regions[i].geometry))
                .collect();
        }
        let Some(target) = neighbours.into_iter().reduce(|best, i| {
            if areas[i] > areas[best] { i } else { best }
        }) else {
            debug!("sliver region #{sliver} has no neighbour; keeping it");
            continue;
        };
        let merged = regions[target].geometry.union(&regions[sliver].geometry);
        regions[target].geometry = merged;
        absorbed[sliver] = true;
    }

    regions
        .into_iter()
        .zip(absorbed)
        .filter_map(|(region, gone)| (!gone).then_some(region))
        .collect()
}
