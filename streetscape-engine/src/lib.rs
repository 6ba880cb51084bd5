//! Classification pipeline for outdoor ground-level space.
//!
//! The engine turns tagged OpenStreetMap elements, already in a planar
//! working coordinate reference, into a partition of a bounding box. Each
//! region of the partition carries exactly one space type and one access
//! level. Stages run in this order:
//!
//! 1. [`classify`] maps tags onto space type and access with a static rule
//!    table; [`roles`] decides which elements are buildings, passages,
//!    barriers or entrances.
//! 2. [`barriers`] derives barrier access from entrances and finds areas
//!    enclosed by private barriers and buildings.
//! 3. [`buffer`] repairs areas and turns lines and point barriers into
//!    footprints.
//! 4. [`buildings`] removes building interiors except along passages.
//! 5. [`resolve`] folds the prioritised footprints into disjoint regions,
//!    checked by [`coverage`].
//! 6. [`access`] fills the remaining undefined access values.
//! 7. [`assembly`] reprojects regions into the published collection.
//!
//! [`map_public_space`] runs all of them for one bounding box.

#![forbid(unsafe_code)]

pub mod access;
pub mod assembly;
pub mod barriers;
pub mod buffer;
pub mod buildings;
pub mod classify;
pub mod coverage;
pub(crate) mod geometry;
pub(crate) mod index;
pub mod pipeline;
pub mod resolve;
pub mod roles;

pub use access::infer_access;
pub use assembly::assemble;
pub use buffer::Footprint;
pub use buildings::BuildingClip;
pub use classify::{Classification, Rule, RULES, ShapeFilter, TagPattern, classify, classify_with};
pub use coverage::{CoverageReport, CoverageViolation};
pub use pipeline::{MappingJob, MappingOutcome, PipelineError, map_many, map_public_space};
pub use resolve::resolve;
