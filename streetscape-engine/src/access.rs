//! Access inference for regions the resolver left undefined.
//!
//! Three sources are tried in order: the default for the region's space
//! type, the single known region whose outline contains it, and the
//! plurality of its known neighbours. Containment and adjacency run in
//! rounds against a snapshot of the previous round, so an answer found in
//! one round can feed the next without depending on region order.

use geo::algorithm::buffer::Buffer;
use geo::{BooleanOps, Intersects, MultiPolygon};
use log::{debug, warn};
use streetscape_core::{Access, AccessSource, ClassifiedRegion, MappingConfig, RunWarning};

use crate::geometry::{area, envelope, expand, outline};
use crate::index::EnvelopeIndex;

/// Fill undefined access in place and report what stays undefined.
pub fn infer_access(regions: &mut [ClassifiedRegion], config: &MappingConfig) -> Vec<RunWarning> {
    for region in regions.iter_mut().filter(|r| !r.access.is_known()) {
        if let Some(access) = config.access_defaults.get(&region.space_type) {
            region.access = *access;
            region.access_source = AccessSource::SpaceTypeDefault;
        }
    }

    let index = EnvelopeIndex::new(regions.iter().map(|r| envelope(&r.geometry)));
    let outlines: Vec<MultiPolygon<f64>> = regions.iter().map(|r| outline(&r.geometry)).collect();
    let mut round = 0;
    loop {
        let snapshot: Vec<Access> = regions.iter().map(|r| r.access).collect();
        let updates: Vec<(usize, Access, AccessSource)> = (0..regions.len())
            .filter(|&i| !snapshot[i].is_known())
            .filter_map(|i| {
                infer_one(i, regions, &snapshot, &outlines, &index, config)
                    .map(|(access, source)| (i, access, source))
            })
            .collect();
        if updates.is_empty() {
            break;
        }
        round += 1;
        debug!("access inference round {round} resolved {} region(s)", updates.len());
        for (i, access, source) in updates {
            regions[i].access = access;
            regions[i].access_source = source;
        }
    }

    regions
        .iter_mut()
        .enumerate()
        .filter(|(_, r)| !r.access.is_known())
        .map(|(i, region)| {
            region.access = Access::Undefined;
            region.access_source = AccessSource::Unresolved;
            warn!("access of {} region #{i} remains undefined", region.space_type);
            RunWarning::UnresolvedAccess {
                region: i,
                space_type: region.space_type,
            }
        })
        .collect()
}

fn infer_one(
    target: usize,
    regions: &[ClassifiedRegion],
    snapshot: &[Access],
    outlines: &[MultiPolygon<f64>],
    index: &EnvelopeIndex,
    config: &MappingConfig,
) -> Option<(Access, AccessSource)> {
    let geometry = &regions[target].geometry;
    let rect = envelope(geometry)?;
    let nearby: Vec<usize> = index
        .intersecting(&expand(rect, config.adjacency_tolerance))
        .into_iter()
        .filter(|&j| j != target && snapshot[j].is_known())
        .collect();

    let containers: Vec<usize> = nearby
        .iter()
        .copied()
        .filter(|&j| area(&geometry.difference(&outlines[j])) < config.min_area)
        .collect();
    if let [container] = containers.as_slice() {
        return Some((snapshot[*container], AccessSource::Containment));
    }

    let grown = geometry.buffer(config.adjacency_tolerance);
    let neighbours = nearby
        .into_iter()
        .filter(|&j| grown.intersects(&regions[j].geometry))
        .map(|j| snapshot[j]);
    plurality(neighbours).map(|access| (access, AccessSource::Adjacency))
}

/// Most frequent known access; exact ties go to the more restrictive value.
#[must_use]
pub fn plurality(accesses: impl IntoIterator<Item = Access>) -> Option<Access> {
    const ORDER: [Access; 3] = [Access::Public, Access::Restricted, Access::Private];
    let mut counts = [0usize; 3];
    for access in accesses {
        if let Some(rank) = access.restrictiveness() {
            counts[usize::from(rank)] += 1;
        }
    }
    let best = *counts.iter().max()?;
    if best == 0 {
        return None;
    }
    ORDER
        .iter()
        .zip(counts)
        .rev()
        .find(|(_, count)| *count == best)
        .map(|(access, _)| *access)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use streetscape_core::SpaceType;
    use streetscape_core::test_support::rectangle;

    #[fixture]
    fn config() -> MappingConfig {
        MappingConfig::default()
    }

    fn region(geometry: MultiPolygon<f64>, space_type: SpaceType, access: Access) -> ClassifiedRegion {
        ClassifiedRegion {
            geometry,
            space_type,
            access,
            access_source: AccessSource::Tags,
            origin: None,
        }
    }

    fn square(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![rectangle(min_x, min_y, max_x, max_y)])
    }

    #[rstest]
    #[case(vec![], None)]
    #[case(vec![Access::Public, Access::Public, Access::Private], Some(Access::Public))]
    #[case(vec![Access::Public, Access::Private], Some(Access::Private))]
    #[case(vec![Access::Restricted, Access::Public], Some(Access::Restricted))]
    #[case(vec![Access::Undefined], None)]
    fn plurality_breaks_ties_towards_restriction(
        #[case] accesses: Vec<Access>,
        #[case] expected: Option<Access>,
    ) {
        assert_eq!(plurality(accesses), expected);
    }

    #[rstest]
    fn space_type_default_comes_first(config: MappingConfig) {
        let mut regions = vec![region(square(0.0, 0.0, 10.0, 10.0), SpaceType::Street, Access::Undefined)];
        assert!(infer_access(&mut regions, &config).is_empty());
        assert_eq!(regions[0].access, Access::Public);
        assert_eq!(regions[0].access_source, AccessSource::SpaceTypeDefault);
    }

    #[rstest]
    fn enclosed_region_inherits_its_container(config: MappingConfig) {
        let ring = square(0.0, 0.0, 30.0, 30.0).difference(&square(10.0, 10.0, 20.0, 20.0));
        let mut regions = vec![
            region(ring, SpaceType::PrivateYard, Access::Private),
            region(square(10.0, 10.0, 20.0, 20.0), SpaceType::Undefined, Access::Undefined),
        ];
        assert!(infer_access(&mut regions, &config).is_empty());
        assert_eq!(regions[1].access, Access::Private);
        assert_eq!(regions[1].access_source, AccessSource::Containment);
    }

    #[rstest]
    fn neighbours_vote_when_nothing_contains(config: MappingConfig) {
        let mut regions = vec![
            region(square(0.0, 0.0, 10.0, 10.0), SpaceType::Park, Access::Public),
            region(square(10.0, 0.0, 20.0, 10.0), SpaceType::Undefined, Access::Undefined),
            region(square(20.0, 0.0, 30.0, 10.0), SpaceType::Park, Access::Public),
            region(square(10.0, 10.0, 20.0, 20.0), SpaceType::Undefined, Access::Private),
        ];
        infer_access(&mut regions, &config);
        assert_eq!(regions[1].access, Access::Public);
        assert_eq!(regions[1].access_source, AccessSource::Adjacency);
    }

    #[rstest]
    fn answers_propagate_across_rounds(config: MappingConfig) {
        let mut regions = vec![
            region(square(0.0, 0.0, 10.0, 10.0), SpaceType::Park, Access::Restricted),
            region(square(10.0, 0.0, 20.0, 10.0), SpaceType::Undefined, Access::Undefined),
            region(square(20.0, 0.0, 30.0, 10.0), SpaceType::Undefined, Access::Undefined),
        ];
        assert!(infer_access(&mut regions, &config).is_empty());
        assert_eq!(regions[2].access, Access::Restricted);
    }

    #[rstest]
    fn isolated_region_is_reported(config: MappingConfig) {
        let mut regions = vec![region(square(0.0, 0.0, 10.0, 10.0), SpaceType::Undefined, Access::Undefined)];
        let warnings = infer_access(&mut regions, &config);
        assert_eq!(
            warnings,
            vec![RunWarning::UnresolvedAccess {
                region: 0,
                space_type: SpaceType::Undefined
            }]
        );
        assert_eq!(regions[0].access_source, AccessSource::Unresolved);
    }
}
