//! End-to-end mapping of one bounding box.
//!
//! [`map_public_space`] runs every stage in sequence over the elements of a
//! single bounding box. Independent boxes share nothing, so [`map_many`]
//! fans them out over the rayon thread pool.

use geo::MultiPolygon;
use log::{debug, info, warn};
use rayon::prelude::*;
use streetscape_core::{
    Access, AccessSource, BoundingBox, ClassifiedRegion, ConfigurationError, ElementGeometry,
    ElementId, GeometryElement, GeometryError, MappingConfig, OsmElement, Projection, RunWarning,
    SpaceFeatureCollection, SpaceType,
};
use thiserror::Error;

use crate::access::infer_access;
use crate::assembly::assemble;
use crate::barriers::{absorb_enclosures, assign_barrier_access, enclosed_areas};
use crate::buffer::{Footprint, element_footprint, repair_polygon};
use crate::buildings::clip_buildings;
use crate::classify::classify;
use crate::coverage::{CoverageViolation, verify};
use crate::resolve::resolve;
use crate::roles::{
    demote_false_area, is_access_barrier, is_building, is_building_passage, is_entrance,
    is_ground_level, is_relevant,
};

/// Fatal errors that abort a run without output.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The configuration cannot classify the input deterministically.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// The resolved regions do not partition the bounding box.
    #[error("coverage invariant violated: {0}")]
    CoverageInvariantViolation(#[from] CoverageViolation),
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingOutcome {
    /// Published features in WGS84, in resolver order.
    pub features: SpaceFeatureCollection,
    /// Regions in working coordinates, in resolver order.
    pub regions: Vec<ClassifiedRegion>,
    /// Non-fatal conditions worth reviewing.
    pub warnings: Vec<RunWarning>,
}

/// Elements and the working-coordinate box of one independent run.
#[derive(Debug, Clone)]
pub struct MappingJob {
    /// Elements in working coordinates.
    pub elements: Vec<OsmElement>,
    /// Area of interest in working coordinates.
    pub bbox: BoundingBox,
}

/// Classify the ground-level space inside `bbox`.
///
/// `elements` must already be in the working coordinate reference;
/// `projection` maps the result back to WGS84.
///
/// # Errors
/// Returns [`PipelineError::Configuration`] for an invalid configuration or
/// an unranked space type, and
/// [`PipelineError::CoverageInvariantViolation`] when the resolved regions
/// fail the coverage check.
///
/// # Examples
/// ```
/// use geo::{Rect, coord};
/// use streetscape_core::{
///     BoundingBox, ElementGeometry, ElementId, MappingConfig, OsmElement, PlanarIdentity,
///     SpaceType, Tags,
/// };
/// use streetscape_engine::map_public_space;
///
/// let bbox = BoundingBox::new(0.0, 0.0, 100.0, 100.0)?;
/// let square = Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 100.0, y: 100.0 });
/// let park = OsmElement::new(
///     ElementId::way(1),
///     ElementGeometry::Area(square.to_polygon()),
///     Tags::from([("leisure", "park")]),
/// );
/// let outcome = map_public_space(vec![park], &bbox, &MappingConfig::default(), &PlanarIdentity)?;
/// assert_eq!(outcome.regions.len(), 1);
/// assert_eq!(outcome.regions[0].space_type, SpaceType::Park);
/// assert_eq!(outcome.features.iter().next().map(|f| f.viz_category.as_str()), Some("park_public"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn map_public_space(
    elements: Vec<OsmElement>,
    bbox: &BoundingBox,
    config: &MappingConfig,
    projection: &dyn Projection,
) -> Result<MappingOutcome, PipelineError> {
    config.validate()?;
    let input_count = elements.len();
    let mut warnings: Vec<RunWarning> = Vec::new();

    let mut kept = select_elements(elements, bbox, &mut warnings);
    debug!("{} of {input_count} element(s) selected", kept.len());

    for element in kept.iter_mut().filter(|e| !is_building(e)) {
        let found = classify(&element.tags, element.shape());
        if let Some(space_type) = found.space_type {
            element.set_space_type(space_type);
        }
        if let Some(access) = found.access {
            element.set_access(access, AccessSource::Tags);
        }
    }
    let barriers = assign_barrier_access(&mut kept);
    debug!("{barriers} barrier(s) took access from their entrances");

    let (buildings, others): (Vec<OsmElement>, Vec<OsmElement>) =
        kept.into_iter().partition(is_building);

    let mut outlines: Vec<(ElementId, MultiPolygon<f64>)> = Vec::with_capacity(buildings.len());
    for building in &buildings {
        if let ElementGeometry::Area(polygon) = &building.geometry {
            match repair_polygon(building.id, polygon, config.snap_tolerance) {
                Ok(shape) => outlines.push((building.id, shape)),
                Err(err) => record_geometry_error(err, &mut warnings),
            }
        }
    }

    let (mut footprints, passages) = build_footprints(&others, config, &mut warnings);
    debug!(
        "{} footprint(s), {} building(s), {} passage(s)",
        footprints.len(),
        outlines.len(),
        passages.len()
    );

    let clip = clip_buildings(&outlines, &passages);
    warnings.extend(clip.warnings);

    let private_barriers: Vec<&ElementGeometry> = others
        .iter()
        .filter(|e| is_access_barrier(e) && e.access() == Some(Access::Private))
        .map(|e| &e.geometry)
        .collect();
    let building_shapes: Vec<&MultiPolygon<f64>> = clip.footprints.iter().map(|(_, s)| s).collect();
    let enclosures = enclosed_areas(&private_barriers, &building_shapes, config.enclosure.buffer);
    let enclosures =
        absorb_enclosures(enclosures, &mut footprints, config.enclosure.overlap_threshold);
    debug!("{} inaccessible enclosure(s) become private yards", enclosures.len());

    let mut candidates: Vec<GeometryElement> = footprints.into_iter().map(|f| f.element).collect();
    candidates.extend((0u32..).zip(enclosures).map(|(index, geometry)| {
        GeometryElement::synthetic(
            index,
            geometry,
            SpaceType::PrivateYard,
            Some(Access::Private),
            Some(AccessSource::Enclosure),
        )
    }));
    apply_access_overrides(&mut candidates, config);

    let mut regions = resolve(&candidates, &clip.removed, bbox, config)?;
    let report = verify(&regions, &clip.removed, bbox, config.min_area)?;
    debug!(
        "coverage ok: {:.3} region + {:.3} removed of {:.3}",
        report.region_area, report.removed_area, report.bbox_area
    );

    warnings.extend(infer_access(&mut regions, config));
    let features = assemble(&regions, projection);
    info!(
        "mapped {input_count} element(s) into {} region(s) with {} warning(s)",
        regions.len(),
        warnings.len()
    );

    Ok(MappingOutcome {
        features,
        regions,
        warnings,
    })
}

/// Map independent bounding boxes in parallel, keeping job order.
#[must_use]
pub fn map_many(
    jobs: Vec<MappingJob>,
    config: &MappingConfig,
    projection: &dyn Projection,
) -> Vec<Result<MappingOutcome, PipelineError>> {
    jobs.into_par_iter()
        .map(|job| map_public_space(job.elements, &job.bbox, config, projection))
        .collect()
}

fn select_elements(
    elements: Vec<OsmElement>,
    bbox: &BoundingBox,
    warnings: &mut Vec<RunWarning>,
) -> Vec<OsmElement> {
    let mut kept = Vec::with_capacity(elements.len());
    for mut element in elements {
        let inside = element
            .geometry
            .bounding_rect()
            .is_some_and(|rect| bbox.intersects_rect(&rect));
        if !inside || element.tags.is_empty() {
            continue;
        }
        if !element.geometry.is_finite() {
            record_geometry_error(GeometryError::NonFinite { id: element.id }, warnings);
            continue;
        }
        if !is_ground_level(&element.tags) {
            debug!("{} is off ground level; skipping", element.id);
            continue;
        }
        if !is_building(&element) && !is_relevant(&element.tags) {
            debug!("{} carries no relevant tags; skipping", element.id);
            warnings.push(RunWarning::UnclassifiedElement { id: element.id });
            continue;
        }
        demote_false_area(&mut element);
        kept.push(element);
    }
    kept
}

fn build_footprints(
    elements: &[OsmElement],
    config: &MappingConfig,
    warnings: &mut Vec<RunWarning>,
) -> (Vec<Footprint>, Vec<Footprint>) {
    let mut footprints = Vec::new();
    let mut passages = Vec::new();
    for element in elements {
        let passage = is_building_passage(&element.tags);
        let roleless = element.space_type().is_none()
            && element.access().is_none()
            && !passage
            && !is_access_barrier(element)
            && !is_entrance(element);
        if roleless {
            warn!("{} matched no classification rule", element.id);
            warnings.push(RunWarning::UnclassifiedElement { id: element.id });
            continue;
        }
        match element_footprint(element, &config.widths, config.snap_tolerance) {
            Ok(Some(footprint)) => {
                if passage {
                    passages.push(footprint.clone());
                }
                footprints.push(footprint);
            }
            Ok(None) => {}
            Err(err) => record_geometry_error(err, warnings),
        }
    }
    (footprints, passages)
}

fn apply_access_overrides(candidates: &mut [GeometryElement], config: &MappingConfig) {
    for candidate in candidates {
        let Some(space_type) = candidate.space_type else {
            continue;
        };
        if let Some(access) = config.access_overrides.get(&space_type) {
            candidate.access = Some(*access);
            candidate.access_source = Some(AccessSource::Override);
        }
    }
}

fn record_geometry_error(err: GeometryError, warnings: &mut Vec<RunWarning>) {
    warn!("dropping element: {err}");
    warnings.push(err.into());
}
