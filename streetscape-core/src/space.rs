//! Closed enumerations describing what a piece of ground is and who may use it.
//!
//! # Examples
//! ```
//! use streetscape_core::{Access, SpaceType};
//!
//! assert_eq!(SpaceType::PrivateYard.as_str(), "private_yard");
//! assert_eq!(Access::Restricted.to_string(), "restricted");
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Functional classification of a region of ground-level space.
///
/// The set is closed; configuration can reorder it through the priority
/// table but cannot extend it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SpaceType {
    /// Carriageway of a road, including estimated cycle lanes and parking strips.
    Street,
    /// Tram or railway track bed.
    Rail,
    /// Footways, paths, steps and other pedestrian ways.
    WalkingArea,
    /// Pedestrian squares and plazas.
    Square,
    /// Platforms and public transport shelters.
    PublicTransportStop,
    /// Parking lots and parking spaces.
    Parking,
    /// Construction sites.
    Construction,
    /// Parks and gardens.
    Park,
    /// Playgrounds.
    Playground,
    /// Dog parks.
    DogPark,
    /// Pitches, sports centres and tracks.
    SportsArea,
    /// Grass, meadows and other undifferentiated green space.
    GreenSpace,
    /// Forests and woods.
    Forest,
    /// Water bodies and fountains.
    Water,
    /// Cemeteries and grave yards.
    Cemetery,
    /// Allotment gardens.
    Allotments,
    /// Beer gardens and outdoor seating.
    OutdoorSeating,
    /// Farmland and other agricultural land.
    Agriculture,
    /// Footprint of a fence, wall, hedge or similar barrier.
    Barrier,
    /// Ground enclosed by private barriers and buildings.
    PrivateYard,
    /// Ground no element accounted for.
    Undefined,
}

impl SpaceType {
    /// Every space type, in declaration order.
    pub const ALL: [Self; 21] = [
        Self::Street,
        Self::Rail,
        Self::WalkingArea,
        Self::Square,
        Self::PublicTransportStop,
        Self::Parking,
        Self::Construction,
        Self::Park,
        Self::Playground,
        Self::DogPark,
        Self::SportsArea,
        Self::GreenSpace,
        Self::Forest,
        Self::Water,
        Self::Cemetery,
        Self::Allotments,
        Self::OutdoorSeating,
        Self::Agriculture,
        Self::Barrier,
        Self::PrivateYard,
        Self::Undefined,
    ];

    /// Return the space type as a snake-case `&str`.
    ///
    /// # Examples
    /// ```
    /// use streetscape_core::SpaceType;
    ///
    /// assert_eq!(SpaceType::PublicTransportStop.as_str(), "public_transport_stop");
    /// ```
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Street => "street",
            Self::Rail => "rail",
            Self::WalkingArea => "walking_area",
            Self::Square => "square",
            Self::PublicTransportStop => "public_transport_stop",
            Self::Parking => "parking",
            Self::Construction => "construction",
            Self::Park => "park",
            Self::Playground => "playground",
            Self::DogPark => "dog_park",
            Self::SportsArea => "sports_area",
            Self::GreenSpace => "green_space",
            Self::Forest => "forest",
            Self::Water => "water",
            Self::Cemetery => "cemetery",
            Self::Allotments => "allotments",
            Self::OutdoorSeating => "outdoor_seating",
            Self::Agriculture => "agriculture",
            Self::Barrier => "barrier",
            Self::PrivateYard => "private_yard",
            Self::Undefined => "undefined",
        }
    }
}

impl std::fmt::Display for SpaceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SpaceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|space_type| space_type.as_str() == wanted)
            .ok_or_else(|| format!("unknown space type '{s}'"))
    }
}

/// Who may enter a region.
///
/// Known values are ordered by increasing restrictiveness:
/// `Public < Restricted < Private`. `Undefined` sits outside that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Access {
    /// Open to everyone.
    Public,
    /// Open with conditions such as fees, opening hours or age limits.
    Restricted,
    /// Closed to the general public.
    Private,
    /// Not known.
    Undefined,
}

impl Access {
    /// Return the access value as a lowercase `&str`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Restricted => "restricted",
            Self::Private => "private",
            Self::Undefined => "undefined",
        }
    }

    /// Rank of the value on the restrictiveness scale.
    ///
    /// # Examples
    /// ```
    /// use streetscape_core::Access;
    ///
    /// assert!(Access::Private.restrictiveness() > Access::Public.restrictiveness());
    /// assert_eq!(Access::Undefined.restrictiveness(), None);
    /// ```
    #[must_use]
    pub const fn restrictiveness(self) -> Option<u8> {
        match self {
            Self::Public => Some(0),
            Self::Restricted => Some(1),
            Self::Private => Some(2),
            Self::Undefined => None,
        }
    }

    /// Whether the value is one of the three known levels.
    #[must_use]
    pub const fn is_known(self) -> bool {
        self.restrictiveness().is_some()
    }

    /// The more restrictive of two values; a known value beats `Undefined`.
    #[must_use]
    pub fn most_restrictive(self, other: Self) -> Self {
        match (self.restrictiveness(), other.restrictiveness()) {
            (Some(a), Some(b)) if b > a => other,
            (None, Some(_)) => other,
            _ => self,
        }
    }
}

impl std::fmt::Display for Access {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Access {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "restricted" => Ok(Self::Restricted),
            "private" => Ok(Self::Private),
            "undefined" => Ok(Self::Undefined),
            _ => Err(format!("unknown access '{s}'")),
        }
    }
}

/// Provenance of a region's access value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AccessSource {
    /// Read from the element's own tags.
    Tags,
    /// Derived from the entrances crossing a barrier.
    BarrierEntrances,
    /// Set because the element fills an area enclosed by private barriers.
    Enclosure,
    /// Forced by a configured access override.
    Override,
    /// Taken from the default for the region's space type.
    SpaceTypeDefault,
    /// Inherited from the single known region containing it.
    Containment,
    /// Inherited from the plurality of bordering regions.
    Adjacency,
    /// Nothing resolved the value.
    Unresolved,
}

impl AccessSource {
    /// Return the source as a snake-case `&str`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tags => "tags",
            Self::BarrierEntrances => "barrier_entrances",
            Self::Enclosure => "enclosure",
            Self::Override => "override",
            Self::SpaceTypeDefault => "space_type_default",
            Self::Containment => "containment",
            Self::Adjacency => "adjacency",
            Self::Unresolved => "unresolved",
        }
    }
}

impl std::fmt::Display for AccessSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[rstest]
    fn space_type_names_round_trip() {
        for space_type in SpaceType::ALL {
            assert_eq!(SpaceType::from_str(space_type.as_str()), Ok(space_type));
        }
    }

    #[test]
    fn parsing_rejects_unknown_space_type() {
        let err = SpaceType::from_str("moat").unwrap_err();
        assert!(err.contains("unknown space type"));
    }

    #[rstest]
    #[case(Access::Public, Access::Private, Access::Private)]
    #[case(Access::Restricted, Access::Public, Access::Restricted)]
    #[case(Access::Undefined, Access::Public, Access::Public)]
    #[case(Access::Private, Access::Undefined, Access::Private)]
    #[case(Access::Undefined, Access::Undefined, Access::Undefined)]
    fn most_restrictive_prefers_known_and_stricter(
        #[case] a: Access,
        #[case] b: Access,
        #[case] expected: Access,
    ) {
        assert_eq!(a.most_restrictive(b), expected);
    }

    #[test]
    fn undefined_is_not_known() {
        assert!(!Access::Undefined.is_known());
        assert!(Access::Restricted.is_known());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&SpaceType::DogPark).unwrap();
        assert_eq!(json, "\"dog_park\"");
        let source: AccessSource = serde_json::from_str("\"barrier_entrances\"").unwrap();
        assert_eq!(source, AccessSource::BarrierEntrances);
    }
}
