//! Non-fatal conditions collected during a run.

use thiserror::Error;

use crate::element::ElementId;
use crate::space::SpaceType;

/// An element whose geometry could not be repaired.
///
/// The element is dropped and the run continues.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GeometryError {
    /// A coordinate was NaN or infinite.
    #[error("{id} has non-finite coordinates")]
    NonFinite {
        /// Offending element.
        id: ElementId,
    },
    /// A ring or line had too few distinct coordinates after snapping.
    #[error("{id} has only {found} distinct coordinates")]
    TooFewCoordinates {
        /// Offending element.
        id: ElementId,
        /// Coordinates remaining after cleaning.
        found: usize,
    },
    /// Repair left a polygon without area.
    #[error("{id} collapsed to zero area during repair")]
    Collapsed {
        /// Offending element.
        id: ElementId,
    },
}

impl GeometryError {
    /// Element the error refers to.
    #[must_use]
    pub const fn id(&self) -> ElementId {
        match self {
            Self::NonFinite { id } | Self::TooFewCoordinates { id, .. } | Self::Collapsed { id } => {
                *id
            }
        }
    }
}

/// A condition worth reviewing that did not stop the run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RunWarning {
    /// An element was dropped because its geometry was irreparable.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    /// An element matched no classification rule and plays no other role.
    #[error("{id} matched no classification rule")]
    UnclassifiedElement {
        /// Unmatched element.
        id: ElementId,
    },
    /// A building passage overlapped none of the buildings near it.
    #[error("building passage {passage} lies outside every building; ignored")]
    PassageOutsideBuilding {
        /// Ignored passage.
        passage: ElementId,
    },
    /// Access inference could not resolve a region.
    #[error("access of {space_type} region #{region} remains undefined")]
    UnresolvedAccess {
        /// Index of the region in resolver output order.
        region: usize,
        /// Space type of the region.
        space_type: SpaceType,
    },
}
