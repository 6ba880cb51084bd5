//! Post-resolution coverage check.
//!
//! The regions of a run plus the removed building area must add up to the
//! bounding box, and no two regions may overlap by more than the minimum
//! area. A failure here means the resolver is wrong, not the input.

use geo::{BooleanOps, MultiPolygon};
use streetscape_core::{BoundingBox, ClassifiedRegion};
use thiserror::Error;

use crate::geometry::{area, envelope};
use crate::index::EnvelopeIndex;

/// Relative slack for floating-point noise in area sums.
const RELATIVE_SLACK: f64 = 1e-6;

/// Coverage figures for a run that passed the check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverageReport {
    /// Area of the bounding box.
    pub bbox_area: f64,
    /// Sum of region areas.
    pub region_area: f64,
    /// Removed area inside the bounding box.
    pub removed_area: f64,
}

/// The resolved regions do not partition the bounding box.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CoverageViolation {
    /// Regions and removed area do not add up to the bounding box.
    #[error(
        "regions cover {covered:.3} of {expected:.3} square units (tolerance {tolerance:.3})"
    )]
    AreaMismatch {
        /// Region area plus removed area.
        covered: f64,
        /// Bounding box area.
        expected: f64,
        /// Allowed difference.
        tolerance: f64,
    },
    /// Two regions overlap with positive area.
    #[error("regions #{first} and #{second} overlap by {overlap:.6} square units")]
    Overlap {
        /// Earlier region index.
        first: usize,
        /// Later region index.
        second: usize,
        /// Shared area.
        overlap: f64,
    },
}

/// Check that `regions` and `removed` partition `bbox`.
///
/// # Errors
/// Returns [`CoverageViolation`] on an area mismatch beyond
/// `min_area` per region, or on any pairwise overlap above `min_area`.
pub fn verify(
    regions: &[ClassifiedRegion],
    removed: &MultiPolygon<f64>,
    bbox: &BoundingBox,
    min_area: f64,
) -> Result<CoverageReport, CoverageViolation> {
    let frame = MultiPolygon::new(vec![bbox.to_polygon()]);
    let bbox_area = bbox.area();
    let region_area: f64 = regions.iter().map(|r| area(&r.geometry)).sum();
    let removed_area = area(&removed.intersection(&frame));
    let covered = region_area + removed_area;
    let tolerance = min_area * regions.len().max(1) as f64 + RELATIVE_SLACK * bbox_area;
    if (covered - bbox_area).abs() > tolerance {
        return Err(CoverageViolation::AreaMismatch {
            covered,
            expected: bbox_area,
            tolerance,
        });
    }

    let index = EnvelopeIndex::new(regions.iter().map(|r| envelope(&r.geometry)));
    for (first, region) in regions.iter().enumerate() {
        let Some(rect) = envelope(&region.geometry) else {
            continue;
        };
        for second in index.intersecting(&rect).into_iter().filter(|&j| j > first) {
            let overlap = area(&region.geometry.intersection(&regions[second].geometry));
            if overlap > min_area {
                return Err(CoverageViolation::Overlap {
                    first,
                    second,
                    overlap,
                });
            }
        }
    }

    Ok(CoverageReport {
        bbox_area,
        region_area,
        removed_area,
    })
}
