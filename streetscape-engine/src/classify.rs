//! Tag classifier: an ordered rule table mapping tags to a space type and access.
//!
//! Each [`Rule`] pairs a [`TagPattern`] with a [`ShapeFilter`] and may set a
//! space type, an access value or both. Rules are evaluated in table order
//! and each output field keeps the first value any matching rule offers, so a
//! rule that only sets access never blocks a later rule from setting the
//! space type.
//!
//! # Examples
//! ```
//! use streetscape_core::{Access, ShapeKind, SpaceType, Tags};
//! use streetscape_engine::classify;
//!
//! let tags = Tags::from([("leisure", "playground"), ("access", "private")]);
//! let result = classify(&tags, ShapeKind::Area);
//! assert_eq!(result.space_type, Some(SpaceType::Playground));
//! assert_eq!(result.access, Some(Access::Private));
//! ```

use streetscape_core::{Access, ShapeKind, SpaceType, Tags};

/// Access values treated as open to the public.
pub const ACCESS_YES: &[&str] = &["yes", "public", "permissive", "bus", "destination"];
/// Access values treated as closed to the public.
pub const ACCESS_NO: &[&str] = &["private", "no", "permit", "children", "customers", "key", "military"];
/// Highway values used by pedestrians.
pub const PEDESTRIAN_HIGHWAYS: &[&str] =
    &["footway", "steps", "path", "pedestrian", "living_street", "track"];

/// A predicate over a tag map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagPattern {
    /// The key is present with any value.
    Present(&'static str),
    /// The key carries exactly this value.
    Equals(&'static str, &'static str),
    /// The key carries one of these values.
    OneOf(&'static str, &'static [&'static str]),
    /// The key is present with a value other than these.
    PresentExcept(&'static str, &'static [&'static str]),
    /// Every sub-pattern matches.
    AllOf(&'static [TagPattern]),
    /// At least one sub-pattern matches.
    AnyOf(&'static [TagPattern]),
    /// The sub-pattern does not match.
    Not(&'static TagPattern),
}

impl TagPattern {
    /// Whether `tags` satisfy the pattern.
    #[must_use]
    pub fn matches(&self, tags: &Tags) -> bool {
        match *self {
            Self::Present(key) => tags.has(key),
            Self::Equals(key, value) => tags.is(key, value),
            Self::OneOf(key, values) => tags.is_one_of(key, values),
            Self::PresentExcept(key, values) => {
                tags.get(key).is_some_and(|value| !values.contains(&value))
            }
            Self::AllOf(patterns) => patterns.iter().all(|p| p.matches(tags)),
            Self::AnyOf(patterns) => patterns.iter().any(|p| p.matches(tags)),
            Self::Not(pattern) => !pattern.matches(tags),
        }
    }
}

/// Geometry shapes a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeFilter {
    /// Every shape.
    Any,
    /// Areas only.
    Areal,
    /// Lines only.
    Linear,
    /// Lines and areas.
    Extended,
}

impl ShapeFilter {
    /// Whether `shape` passes the filter.
    #[must_use]
    pub const fn accepts(self, shape: ShapeKind) -> bool {
        match self {
            Self::Any => true,
            Self::Areal => matches!(shape, ShapeKind::Area),
            Self::Linear => matches!(shape, ShapeKind::Line),
            Self::Extended => !matches!(shape, ShapeKind::Point),
        }
    }
}

/// One row of the rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    /// Tags the rule matches.
    pub pattern: TagPattern,
    /// Shapes the rule applies to.
    pub shape: ShapeFilter,
    /// Space type the rule assigns, if any.
    pub space_type: Option<SpaceType>,
    /// Access the rule assigns, if any.
    pub access: Option<Access>,
}

impl Rule {
    const fn space(pattern: TagPattern, shape: ShapeFilter, space_type: SpaceType) -> Self {
        Self {
            pattern,
            shape,
            space_type: Some(space_type),
            access: None,
        }
    }

    const fn access(pattern: TagPattern, access: Access) -> Self {
        Self {
            pattern,
            shape: ShapeFilter::Any,
            space_type: None,
            access: Some(access),
        }
    }
}

/// Result of classifying one tag map. Both fields may be `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Classification {
    /// Candidate space type.
    pub space_type: Option<SpaceType>,
    /// Candidate access.
    pub access: Option<Access>,
}

impl Classification {
    /// Whether no rule matched.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.space_type.is_none() && self.access.is_none()
    }
}

use ShapeFilter::{Any, Areal, Extended, Linear};
use SpaceType as S;
use TagPattern::{AllOf, AnyOf, Equals, Not, OneOf, Present, PresentExcept};

/// Tags marking a crossing of a road or track.
pub const CROSSING: TagPattern = AnyOf(&[
    PresentExcept("crossing", &["no"]),
    Equals("highway", "crossing"),
    Equals("footway", "crossing"),
    Equals("railway", "crossing"),
]);

const CONSTRUCTION: TagPattern = AnyOf(&[
    Present("construction"),
    Present("construction:highway"),
    Equals("landuse", "construction"),
    Equals("highway", "construction"),
    Equals("railway", "construction"),
]);

const PLATFORM: TagPattern = AnyOf(&[
    Equals("public_transport", "platform"),
    Equals("railway", "platform"),
    Equals("highway", "platform"),
    Equals("shelter_type", "public_transport"),
]);

const PARKING: TagPattern = AnyOf(&[
    OneOf("amenity", &["parking", "parking_space", "motorcycle_parking"]),
    Present("parking"),
    Present("motorcycle_parking"),
    Present("parking_space"),
]);

const RESTRICTION_MARKERS: TagPattern = AnyOf(&[
    PresentExcept("fee", &["no"]),
    PresentExcept("opening_hours", &["no", "24/7"]),
    PresentExcept("max_age", &["no"]),
    PresentExcept("min_age", &["no"]),
    PresentExcept("female", &["no"]),
    PresentExcept("male", &["no"]),
    PresentExcept("charge", &["no"]),
    PresentExcept("seasonal", &["no"]),
]);

/// The classification rule table, in evaluation order.
pub static RULES: &[Rule] = &[
    // access
    Rule::access(OneOf("access", ACCESS_NO), Access::Private),
    Rule::access(OneOf("foot", ACCESS_NO), Access::Private),
    Rule::access(OneOf("parking_space", ACCESS_NO), Access::Private),
    Rule::access(RESTRICTION_MARKERS, Access::Restricted),
    Rule::access(OneOf("access", ACCESS_YES), Access::Public),
    Rule::access(OneOf("foot", ACCESS_YES), Access::Public),
    // traffic and construction
    Rule::space(CONSTRUCTION, Any, S::Construction),
    Rule::space(PLATFORM, Extended, S::PublicTransportStop),
    Rule::space(Equals("amenity", "bus_station"), Areal, S::PublicTransportStop),
    Rule::space(PARKING, Areal, S::Parking),
    Rule::space(OneOf("railway", &["tram", "rail"]), Linear, S::Rail),
    Rule::space(Equals("landuse", "railway"), Areal, S::Rail),
    Rule::space(
        AnyOf(&[Equals("place", "square"), Equals("highway", "pedestrian")]),
        Areal,
        S::Square,
    ),
    Rule::space(
        AllOf(&[OneOf("highway", PEDESTRIAN_HIGHWAYS), Not(&CROSSING)]),
        Extended,
        S::WalkingArea,
    ),
    Rule::space(Equals("man_made", "pier"), Areal, S::WalkingArea),
    Rule::space(PresentExcept("highway", &["corridor", "proposed"]), Extended, S::Street),
    // barriers
    Rule::space(PresentExcept("barrier", &["gate", "entrance", "kerb"]), Any, S::Barrier),
    // leisure
    Rule::space(OneOf("leisure", &["park", "garden"]), Areal, S::Park),
    Rule::space(Equals("leisure", "playground"), Areal, S::Playground),
    Rule::space(Equals("leisure", "dog_park"), Areal, S::DogPark),
    Rule::space(Equals("leisure", "outdoor_seating"), Areal, S::OutdoorSeating),
    Rule::space(
        OneOf(
            "leisure",
            &[
                "pitch",
                "sports_centre",
                "track",
                "stadium",
                "fitness_station",
                "swimming_pool",
                "miniature_golf",
                "horse_riding",
                "water_park",
            ],
        ),
        Areal,
        S::SportsArea,
    ),
    Rule::space(
        OneOf(
            "leisure",
            &["nature_reserve", "recreation_ground", "common", "village_green"],
        ),
        Areal,
        S::GreenSpace,
    ),
    // amenity
    Rule::space(Equals("amenity", "fountain"), Areal, S::Water),
    Rule::space(Equals("amenity", "grave_yard"), Areal, S::Cemetery),
    Rule::space(Equals("amenity", "biergarten"), Areal, S::OutdoorSeating),
    Rule::space(Equals("amenity", "public_bath"), Areal, S::SportsArea),
    // natural
    Rule::space(Equals("natural", "wood"), Areal, S::Forest),
    Rule::space(OneOf("natural", &["water", "wetland"]), Areal, S::Water),
    Rule::space(
        OneOf(
            "natural",
            &["grassland", "heath", "scrub", "meadow", "sand", "beach", "scree"],
        ),
        Areal,
        S::GreenSpace,
    ),
    // landuse
    Rule::space(Equals("landuse", "forest"), Areal, S::Forest),
    Rule::space(OneOf("landuse", &["reservoir", "basin"]), Areal, S::Water),
    Rule::space(Equals("landuse", "cemetery"), Areal, S::Cemetery),
    Rule::space(Equals("landuse", "allotments"), Areal, S::Allotments),
    Rule::space(
        OneOf(
            "landuse",
            &[
                "farmland",
                "farmyard",
                "orchard",
                "vineyard",
                "plant_nursery",
                "greenhouse_horticulture",
            ],
        ),
        Areal,
        S::Agriculture,
    ),
    Rule::space(
        OneOf(
            "landuse",
            &[
                "grass",
                "meadow",
                "village_green",
                "greenfield",
                "recreation_ground",
                "brownfield",
                "flowerbed",
            ],
        ),
        Areal,
        S::GreenSpace,
    ),
];

/// Classify `tags` on a geometry of `shape` with the built-in [`RULES`].
#[must_use]
pub fn classify(tags: &Tags, shape: ShapeKind) -> Classification {
    classify_with(RULES, tags, shape)
}

/// Classify `tags` on a geometry of `shape` with a custom rule table.
#[must_use]
pub fn classify_with(rules: &[Rule], tags: &Tags, shape: ShapeKind) -> Classification {
    let mut result = Classification::default();
    for rule in rules {
        if result.space_type.is_some() && result.access.is_some() {
            break;
        }
        if !rule.shape.accepts(shape) || !rule.pattern.matches(tags) {
            continue;
        }
        if result.space_type.is_none() {
            result.space_type = rule.space_type;
        }
        if result.access.is_none() {
            result.access = rule.access;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs.iter().copied().collect()
    }

    #[rstest]
    #[case(&[("highway", "footway")], ShapeKind::Line, Some(S::WalkingArea))]
    #[case(&[("highway", "footway"), ("footway", "crossing")], ShapeKind::Line, Some(S::Street))]
    #[case(&[("highway", "pedestrian")], ShapeKind::Area, Some(S::Square))]
    #[case(&[("highway", "residential")], ShapeKind::Line, Some(S::Street))]
    #[case(&[("highway", "bus_stop")], ShapeKind::Point, None)]
    #[case(&[("highway", "construction")], ShapeKind::Line, Some(S::Construction))]
    #[case(&[("railway", "tram")], ShapeKind::Line, Some(S::Rail))]
    #[case(&[("landuse", "railway")], ShapeKind::Area, Some(S::Rail))]
    #[case(&[("public_transport", "platform")], ShapeKind::Area, Some(S::PublicTransportStop))]
    #[case(&[("amenity", "parking")], ShapeKind::Area, Some(S::Parking))]
    #[case(&[("barrier", "fence")], ShapeKind::Line, Some(S::Barrier))]
    #[case(&[("barrier", "bollard")], ShapeKind::Point, Some(S::Barrier))]
    #[case(&[("barrier", "gate")], ShapeKind::Point, None)]
    #[case(&[("leisure", "park")], ShapeKind::Area, Some(S::Park))]
    #[case(&[("leisure", "park")], ShapeKind::Line, None)]
    #[case(&[("leisure", "pitch")], ShapeKind::Area, Some(S::SportsArea))]
    #[case(&[("natural", "wood")], ShapeKind::Area, Some(S::Forest))]
    #[case(&[("landuse", "grass")], ShapeKind::Area, Some(S::GreenSpace))]
    #[case(&[("amenity", "biergarten")], ShapeKind::Area, Some(S::OutdoorSeating))]
    #[case(&[("name", "Nothing to see")], ShapeKind::Area, None)]
    fn space_types_follow_rule_table(
        #[case] pairs: &[(&str, &str)],
        #[case] shape: ShapeKind,
        #[case] expected: Option<SpaceType>,
    ) {
        assert_eq!(classify(&tags(pairs), shape).space_type, expected);
    }

    #[rstest]
    #[case(&[("access", "private")], Some(Access::Private))]
    #[case(&[("access", "customers"), ("fee", "yes")], Some(Access::Private))]
    #[case(&[("foot", "no"), ("access", "yes")], Some(Access::Private))]
    #[case(&[("access", "yes"), ("fee", "yes")], Some(Access::Restricted))]
    #[case(&[("opening_hours", "Mo-Fr 08:00-18:00")], Some(Access::Restricted))]
    #[case(&[("opening_hours", "24/7")], None)]
    #[case(&[("fee", "no"), ("access", "permissive")], Some(Access::Public))]
    #[case(&[("foot", "designated")], None)]
    fn access_follows_vocabulary(
        #[case] pairs: &[(&str, &str)],
        #[case] expected: Option<Access>,
    ) {
        assert_eq!(classify(&tags(pairs), ShapeKind::Area).access, expected);
    }

    #[test]
    fn fields_are_resolved_independently() {
        let result = classify(
            &tags(&[("leisure", "playground"), ("min_age", "6")]),
            ShapeKind::Area,
        );
        assert_eq!(result.space_type, Some(S::Playground));
        assert_eq!(result.access, Some(Access::Restricted));
    }

    #[test]
    fn earlier_rule_wins_for_each_field() {
        let rules = [
            Rule::space(Present("a"), Any, S::Park),
            Rule::space(Present("a"), Any, S::Forest),
        ];
        let result = classify_with(&rules, &tags(&[("a", "1")]), ShapeKind::Area);
        assert_eq!(result.space_type, Some(S::Park));
    }

    #[test]
    fn unmatched_tags_yield_empty_classification() {
        assert!(classify(&tags(&[("shop", "bakery")]), ShapeKind::Area).is_empty());
    }
}
