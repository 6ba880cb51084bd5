//! Resolved regions and the published feature collection.

use geo::MultiPolygon;

use crate::element::ElementId;
use crate::space::{Access, AccessSource, SpaceType};

/// A disjoint piece of the bounding box with exactly one classification.
///
/// Geometry is in working coordinates. The regions of one run cover the
/// bounding box minus removed building footprints, without overlaps.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRegion {
    /// Polygonal extent in working coordinates.
    pub geometry: MultiPolygon<f64>,
    /// Space type.
    pub space_type: SpaceType,
    /// Access, `Undefined` until inference resolves it.
    pub access: Access,
    /// Provenance of `access`.
    pub access_source: AccessSource,
    /// OpenStreetMap element the region was carved from, if any.
    pub origin: Option<ElementId>,
}

impl ClassifiedRegion {
    /// Combined styling category, `"{space_type}_{access}"`.
    ///
    /// # Examples
    /// ```
    /// use geo::MultiPolygon;
    /// use streetscape_core::{Access, AccessSource, ClassifiedRegion, SpaceType};
    ///
    /// let region = ClassifiedRegion {
    ///     geometry: MultiPolygon::new(Vec::new()),
    ///     space_type: SpaceType::GreenSpace,
    ///     access: Access::Public,
    ///     access_source: AccessSource::SpaceTypeDefault,
    ///     origin: None,
    /// };
    /// assert_eq!(region.viz_category(), "green_space_public");
    /// ```
    #[must_use]
    pub fn viz_category(&self) -> String {
        format!("{}_{}", self.space_type, self.access)
    }
}

/// One published polygon feature in geographic coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct SpaceFeature {
    /// Polygonal extent in WGS84 degrees.
    pub geometry: MultiPolygon<f64>,
    /// Space type.
    pub space_type: SpaceType,
    /// Access.
    pub access: Access,
    /// Combined styling category.
    pub viz_category: String,
    /// Provenance of `access`.
    pub access_derived_from: AccessSource,
    /// OpenStreetMap element the feature was carved from, if any.
    pub osm_id: Option<ElementId>,
}

/// Ordered collection of published features.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpaceFeatureCollection {
    /// Features in resolver insertion order.
    pub features: Vec<SpaceFeature>,
}

impl SpaceFeatureCollection {
    /// Number of features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the collection holds no features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Iterate over features in order.
    pub fn iter(&self) -> std::slice::Iter<'_, SpaceFeature> {
        self.features.iter()
    }
}

impl<'a> IntoIterator for &'a SpaceFeatureCollection {
    type Item = &'a SpaceFeature;
    type IntoIter = std::slice::Iter<'a, SpaceFeature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.iter()
    }
}
