//! Structural roles an element can play besides its classification.
//!
//! Roles decide which stage consumes an element: buildings and passages feed
//! the building clipper, access barriers and entrances feed barrier access
//! analysis, and the filters decide whether an element enters the pipeline
//! at all.

use streetscape_core::{ElementGeometry, OsmElement, ShapeKind, Tags};

use crate::classify::CROSSING;

const BUILDING_KEYS: &[&str] = &["building", "building:part", "building:levels"];

const RELEVANT_KEYS: &[&str] = &[
    "highway",
    "public_transport",
    "railway",
    "barrier",
    "amenity",
    "leisure",
    "natural",
    "parking",
    "embankment",
    "landuse",
    "footway",
    "bridge",
    "place",
    "construction",
    "parking_space",
    "man_made",
];

const RELEVANT_AMENITIES: &[&str] = &[
    "fountain",
    "shelter",
    "parking",
    "parking_space",
    "bus_station",
    "grave_yard",
    "biergarten",
    "motorcycle_parking",
    "public_bath",
];

const IRRELEVANT_VALUES: &[(&str, &[&str])] = &[
    ("natural", &["tree_row"]),
    ("parking", &["underground"]),
    (
        "landuse",
        &["commercial", "retail", "residential", "industrial", "education"],
    ),
    (
        "place",
        &["neighbourhood", "city_block", "locality", "quarter"],
    ),
    ("indoor", &["yes", "room"]),
    ("highway", &["corridor", "proposed"]),
];

/// Whether the element is a building footprint.
///
/// Only areas count; `building=roof` and `building=no` never do.
#[must_use]
pub fn is_building(element: &OsmElement) -> bool {
    element.shape() == ShapeKind::Area
        && BUILDING_KEYS.iter().any(|key| element.tags.has(key))
        && !element.tags.is_one_of("building", &["roof", "no"])
}

/// Whether the element is a highway running through a building.
#[must_use]
pub fn is_building_passage(tags: &Tags) -> bool {
    tags.has("highway") && tags.is("tunnel", "building_passage")
}

/// Whether the tags describe a crossing.
#[must_use]
pub fn is_crossing(tags: &Tags) -> bool {
    CROSSING.matches(tags)
}

/// Whether the element can grant passage through a barrier.
#[must_use]
pub fn is_entrance(element: &OsmElement) -> bool {
    let tags = &element.tags;
    (element.shape() == ShapeKind::Line && tags.has("highway") && !tags.is("highway", "motorway"))
        || is_crossing(tags)
        || tags.is("railway", "railway_crossing")
        || tags.is("barrier", "gate")
}

/// Whether the element blocks movement unless an entrance crosses it.
///
/// Motorways and non-embedded railways only count without a `layer` tag,
/// since a layer suggests a way under or over them.
#[must_use]
pub fn is_access_barrier(element: &OsmElement) -> bool {
    let tags = &element.tags;
    match element.shape() {
        ShapeKind::Line => {
            (tags.has("barrier") && !tags.is("barrier", "gate"))
                || (tags.is("highway", "motorway") && !tags.has("layer"))
                || (tags.is("railway", "rail") && !tags.has("layer") && !tags.is("embedded", "yes"))
        }
        ShapeKind::Area => tags.is("landuse", "railway"),
        ShapeKind::Point => false,
    }
}

/// Whether the tags place the element at ground level.
///
/// A numeric `level` list without level 0 is off the ground; unparsable
/// levels are ignored.
#[must_use]
pub fn is_ground_level(tags: &Tags) -> bool {
    if let Some(level) = tags.get("level") {
        let parsed: Result<Vec<f64>, _> = level.split(';').map(|l| l.trim().parse::<f64>()).collect();
        return match parsed {
            Ok(levels) => levels.iter().any(|l| *l == 0.0),
            Err(_) => true,
        };
    }
    !(tags.is("tunnel", "yes")
        || tags.is("parking", "underground")
        || tags.is("location", "underground"))
}

/// Whether the tags matter for ground-level public space at all.
#[must_use]
pub fn is_relevant(tags: &Tags) -> bool {
    if !RELEVANT_KEYS.iter().any(|key| tags.has(key)) || tags.has("boundary") {
        return false;
    }
    if IRRELEVANT_VALUES
        .iter()
        .any(|(key, values)| tags.is_one_of(key, values))
    {
        return false;
    }
    !tags.has("amenity") || tags.is_one_of("amenity", RELEVANT_AMENITIES)
}

/// Whether a closed way was read as an area but describes a line.
///
/// Closed highways and fences are lines unless tagged `area=yes`.
#[must_use]
pub fn is_false_area(element: &OsmElement) -> bool {
    element.shape() == ShapeKind::Area
        && (element.tags.has("highway") || element.tags.is("barrier", "fence"))
        && !element.tags.is("area", "yes")
}

/// Turn a false area into its outline.
pub fn demote_false_area(element: &mut OsmElement) {
    if !is_false_area(element) {
        return;
    }
    if let ElementGeometry::Area(polygon) = &element.geometry {
        element.geometry = ElementGeometry::Line(polygon.exterior().clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use streetscape_core::test_support::{area_way, line_way, rectangle, tagged_node};

    #[rstest]
    #[case(&[("building", "yes")], true)]
    #[case(&[("building:part", "yes")], true)]
    #[case(&[("building", "roof")], false)]
    #[case(&[("building:levels", "3"), ("building", "no")], false)]
    fn building_detection(#[case] tags: &[(&str, &str)], #[case] expected: bool) {
        let element = area_way(1, rectangle(0.0, 0.0, 1.0, 1.0), tags);
        assert_eq!(is_building(&element), expected);
    }

    #[test]
    fn building_lines_are_not_buildings() {
        let element = line_way(1, &[(0.0, 0.0), (1.0, 0.0)], &[("building", "yes")]);
        assert!(!is_building(&element));
    }

    #[rstest]
    #[case(&[("level", "1")], false)]
    #[case(&[("level", "0;1")], true)]
    #[case(&[("level", "-1")], false)]
    #[case(&[("level", "ground")], true)]
    #[case(&[("tunnel", "yes")], false)]
    #[case(&[("tunnel", "building_passage")], true)]
    #[case(&[("parking", "underground")], false)]
    #[case(&[("location", "underground")], false)]
    #[case(&[], true)]
    fn ground_level_filter(#[case] tags: &[(&str, &str)], #[case] expected: bool) {
        let tags: Tags = tags.iter().copied().collect();
        assert_eq!(is_ground_level(&tags), expected);
    }

    #[rstest]
    #[case(&[("highway", "footway")], true)]
    #[case(&[("shop", "bakery")], false)]
    #[case(&[("landuse", "residential")], false)]
    #[case(&[("landuse", "grass"), ("boundary", "administrative")], false)]
    #[case(&[("amenity", "bench")], false)]
    #[case(&[("amenity", "fountain")], true)]
    #[case(&[("highway", "corridor")], false)]
    #[case(&[("leisure", "park"), ("indoor", "room")], false)]
    fn relevance_filter(#[case] tags: &[(&str, &str)], #[case] expected: bool) {
        let tags: Tags = tags.iter().copied().collect();
        assert_eq!(is_relevant(&tags), expected);
    }

    #[rstest]
    #[case(line_way(1, &[(0.0, 0.0), (1.0, 0.0)], &[("barrier", "fence")]), true)]
    #[case(line_way(2, &[(0.0, 0.0), (1.0, 0.0)], &[("highway", "motorway")]), true)]
    #[case(line_way(3, &[(0.0, 0.0), (1.0, 0.0)], &[("highway", "motorway"), ("layer", "1")]), false)]
    #[case(line_way(4, &[(0.0, 0.0), (1.0, 0.0)], &[("railway", "rail"), ("embedded", "yes")]), false)]
    #[case(area_way(5, rectangle(0.0, 0.0, 1.0, 1.0), &[("landuse", "railway")]), true)]
    #[case(tagged_node(6, 0.0, 0.0, &[("barrier", "bollard")]), false)]
    fn access_barrier_detection(#[case] element: OsmElement, #[case] expected: bool) {
        assert_eq!(is_access_barrier(&element), expected);
    }

    #[rstest]
    #[case(line_way(1, &[(0.0, 0.0), (1.0, 0.0)], &[("highway", "service")]), true)]
    #[case(line_way(2, &[(0.0, 0.0), (1.0, 0.0)], &[("highway", "motorway")]), false)]
    #[case(tagged_node(3, 0.0, 0.0, &[("barrier", "gate")]), true)]
    #[case(tagged_node(4, 0.0, 0.0, &[("highway", "crossing")]), true)]
    #[case(tagged_node(5, 0.0, 0.0, &[("barrier", "bollard")]), false)]
    fn entrance_detection(#[case] element: OsmElement, #[case] expected: bool) {
        assert_eq!(is_entrance(&element), expected);
    }

    #[test]
    fn closed_highway_becomes_line() {
        let mut element = area_way(1, rectangle(0.0, 0.0, 5.0, 5.0), &[("highway", "service")]);
        demote_false_area(&mut element);
        assert_eq!(element.shape(), ShapeKind::Line);
    }

    #[test]
    fn highway_area_stays_area() {
        let mut element = area_way(
            1,
            rectangle(0.0, 0.0, 5.0, 5.0),
            &[("highway", "pedestrian"), ("area", "yes")],
        );
        demote_false_area(&mut element);
        assert_eq!(element.shape(), ShapeKind::Area);
    }
}
