//! Assembly of the published feature collection.

use geo::MapCoords;
use streetscape_core::{ClassifiedRegion, Projection, SpaceFeature, SpaceFeatureCollection};

/// Reproject regions to WGS84 and wrap them as features, keeping their order.
#[must_use]
pub fn assemble(regions: &[ClassifiedRegion], projection: &dyn Projection) -> SpaceFeatureCollection {
    let features = regions
        .iter()
        .map(|region| SpaceFeature {
            geometry: region.geometry.map_coords(|c| projection.inverse(c)),
            space_type: region.space_type,
            access: region.access,
            viz_category: region.viz_category(),
            access_derived_from: region.access_source,
            osm_id: region.origin,
        })
        .collect();
    SpaceFeatureCollection { features }
}
