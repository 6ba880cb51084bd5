//! Mapping configuration: widths, tolerances, priorities and access tables.
//!
//! Every run treats its [`MappingConfig`] as immutable input. The defaults
//! carry regional values for central European streets; a JSON file may
//! override any subset of fields.
//!
//! # Examples
//! ```
//! use streetscape_core::{MappingConfig, SpaceType};
//!
//! let config = MappingConfig::default();
//! assert!(config.validate().is_ok());
//! assert!(config.priority_rank(SpaceType::Barrier) < config.priority_rank(SpaceType::Park));
//! ```

use std::collections::{BTreeMap, BTreeSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::projection::ETRS89_LAEA_EPSG;
use crate::space::{Access, SpaceType};

/// Fatal configuration problems.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigurationError {
    /// A candidate carried a space type the priority table does not rank.
    #[error("space type `{0}` has no entry in the priority table")]
    MissingPriority(SpaceType),
    /// A space type was ranked twice.
    #[error("space type `{0}` appears more than once in the priority table")]
    DuplicatePriority(SpaceType),
    /// A numeric setting was negative, zero where it must be positive, or not finite.
    #[error("configuration value `{field}` is invalid: {value}")]
    InvalidValue {
        /// Dotted path of the offending field.
        field: String,
        /// Offending value.
        value: f64,
    },
    /// The working reference is not one the mapper can project into.
    #[error("working CRS EPSG:{0} is not supported")]
    UnsupportedCrs(u32),
}

/// Default roadway widths for one highway type, in metres.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LaneWidths {
    /// Width of a two-way roadway.
    pub bidirectional: f64,
    /// Width of a one-way roadway.
    pub unidirectional: f64,
}

impl LaneWidths {
    /// Pair of widths.
    #[must_use]
    pub const fn new(bidirectional: f64, unidirectional: f64) -> Self {
        Self {
            bidirectional,
            unidirectional,
        }
    }
}

/// Widths used to turn lines and points into footprints, in metres.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WidthConfig {
    /// Default roadway widths keyed by `highway` value.
    pub highway: BTreeMap<String, LaneWidths>,
    /// Roadway widths for highway values missing from `highway`.
    pub highway_fallback: LaneWidths,
    /// Added cycle infrastructure keyed by tag key, then tag value.
    pub cycleway: BTreeMap<String, BTreeMap<String, f64>>,
    /// Highway values assumed to carry street-side parking.
    pub streetside_parking_highways: Vec<String>,
    /// Width added for street-side parking.
    pub streetside_parking: f64,
    /// Width of pedestrian ways whose highway value has no table entry.
    pub pedestrian_way: f64,
    /// Tram track gauge.
    pub tram_gauge: f64,
    /// Extra track-bed width added to the tram gauge.
    pub tram_extra: f64,
    /// Railway track gauge.
    pub train_gauge: f64,
    /// Extra track-bed width added to the railway gauge.
    pub train_extra: f64,
    /// Total width of linear barriers keyed by `barrier` value.
    pub barrier: BTreeMap<String, f64>,
    /// Width of linear barriers missing from `barrier`.
    pub barrier_fallback: f64,
    /// Diameter of point barriers such as bollards.
    pub point_barrier: f64,
}

impl Default for WidthConfig {
    fn default() -> Self {
        let highway = [
            ("footway", 1.8, 1.0),
            ("service", 4.5, 3.0),
            ("residential", 4.5, 3.0),
            ("steps", 2.0, 1.5),
            ("tertiary", 4.8, 3.1),
            ("primary", 5.5, 3.1),
            ("cycleway", 2.0, 1.5),
            ("secondary", 4.8, 3.1),
            ("path", 1.5, 1.0),
            ("motorway_link", 6.5, 3.23),
            ("platform", 2.0, 1.5),
            ("pedestrian", 2.0, 2.0),
            ("motorway", 6.5, 3.25),
            ("living_street", 4.5, 3.0),
            ("unclassified", 4.5, 3.0),
            ("primary_link", 5.5, 3.1),
            ("track", 3.0, 2.5),
            ("secondary_link", 4.8, 3.1),
            ("construction", 5.5, 3.1),
        ]
        .into_iter()
        .map(|(name, bi, uni)| (name.to_owned(), LaneWidths::new(bi, uni)))
        .collect();

        let cycle_lane = 1.6;
        let cycle_track = 1.6;
        let cycleway = [
            (
                "cycleway",
                vec![
                    ("lane", cycle_lane),
                    ("opposite", 1.0),
                    ("track", cycle_track),
                    ("opposite_lane", cycle_lane),
                    ("opposite_track", cycle_track),
                ],
            ),
            ("cycleway:right", vec![("lane", cycle_lane), ("track", cycle_track)]),
            ("cycleway:left", vec![("lane", cycle_lane), ("track", cycle_track)]),
            (
                "cycleway:both",
                vec![("lane", 2.0 * cycle_lane), ("track", 2.0 * cycle_track)],
            ),
        ]
        .into_iter()
        .map(|(key, values)| {
            let values = values
                .into_iter()
                .map(|(value, width)| (value.to_owned(), width))
                .collect();
            (key.to_owned(), values)
        })
        .collect();

        let barrier = [
            ("fence", 0.5),
            ("wall", 0.5),
            ("retaining_wall", 0.5),
            ("hedge", 1.0),
            ("city_wall", 2.0),
            ("guard_rail", 0.3),
            ("handrail", 0.1),
            ("kerb", 0.2),
        ]
        .into_iter()
        .map(|(name, width)| (name.to_owned(), width))
        .collect();

        Self {
            highway,
            highway_fallback: LaneWidths::new(4.8, 3.1),
            cycleway,
            streetside_parking_highways: ["residential", "tertiary", "living_street", "secondary", "primary"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            streetside_parking: 6.5,
            pedestrian_way: 1.6,
            tram_gauge: 1.435,
            tram_extra: 0.5,
            train_gauge: 1.435,
            train_extra: 1.5,
            barrier,
            barrier_fallback: 0.5,
            point_barrier: 0.5,
        }
    }
}

/// Detection of ground enclosed by private barriers and buildings.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EnclosureConfig {
    /// Buffer applied to barriers and buildings so touching outlines close.
    pub buffer: f64,
    /// Share of both areas an element must overlap to absorb an enclosure.
    pub overlap_threshold: f64,
}

impl Default for EnclosureConfig {
    fn default() -> Self {
        Self {
            buffer: 0.001,
            overlap_threshold: 0.95,
        }
    }
}

/// Immutable inputs for one mapping run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MappingConfig {
    /// EPSG code of the planar working reference.
    pub working_epsg: u32,
    /// Regions smaller than this many square metres are degenerate.
    pub min_area: f64,
    /// Grid size, in metres, coordinates snap to during polygon repair.
    pub snap_tolerance: f64,
    /// Distance, in metres, within which two regions count as bordering.
    pub adjacency_tolerance: f64,
    /// Space types from highest to lowest precedence.
    pub priority: Vec<SpaceType>,
    /// Access assumed for a space type when nothing else sets it.
    pub access_defaults: BTreeMap<SpaceType, Access>,
    /// Access forced onto every candidate of a space type.
    pub access_overrides: BTreeMap<SpaceType, Access>,
    /// Buffer widths.
    pub widths: WidthConfig,
    /// Enclosed-area detection.
    pub enclosure: EnclosureConfig,
}

impl Default for MappingConfig {
    fn default() -> Self {
        use SpaceType as S;
        let priority = vec![
            S::Barrier,
            S::PublicTransportStop,
            S::WalkingArea,
            S::Square,
            S::Rail,
            S::Street,
            S::Parking,
            S::Construction,
            S::Playground,
            S::DogPark,
            S::OutdoorSeating,
            S::SportsArea,
            S::Water,
            S::Cemetery,
            S::Allotments,
            S::Agriculture,
            S::PrivateYard,
            S::Park,
            S::Forest,
            S::GreenSpace,
            S::Undefined,
        ];
        let access_defaults = [
            (S::Street, Access::Public),
            (S::WalkingArea, Access::Public),
            (S::Square, Access::Public),
            (S::PublicTransportStop, Access::Public),
            (S::Park, Access::Public),
            (S::Playground, Access::Public),
            (S::DogPark, Access::Public),
            (S::GreenSpace, Access::Public),
            (S::Forest, Access::Public),
            (S::Cemetery, Access::Public),
            (S::SportsArea, Access::Restricted),
            (S::OutdoorSeating, Access::Restricted),
            (S::Rail, Access::Private),
            (S::Construction, Access::Private),
            (S::Water, Access::Private),
            (S::Allotments, Access::Private),
            (S::Agriculture, Access::Private),
            (S::Barrier, Access::Private),
            (S::PrivateYard, Access::Private),
        ]
        .into_iter()
        .collect();
        Self {
            working_epsg: ETRS89_LAEA_EPSG,
            min_area: 0.01,
            snap_tolerance: 0.001,
            adjacency_tolerance: 0.05,
            priority,
            access_defaults,
            access_overrides: BTreeMap::from([(S::Parking, Access::Private)]),
            widths: WidthConfig::default(),
            enclosure: EnclosureConfig::default(),
        }
    }
}

impl MappingConfig {
    /// Position of `space_type` in the priority table; lower ranks win.
    #[must_use]
    pub fn priority_rank(&self, space_type: SpaceType) -> Option<usize> {
        self.priority.iter().position(|&s| s == space_type)
    }

    /// Check tolerances, widths and the priority table.
    ///
    /// # Errors
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let mut seen = BTreeSet::new();
        for &space_type in &self.priority {
            if !seen.insert(space_type) {
                return Err(ConfigurationError::DuplicatePriority(space_type));
            }
        }

        non_negative("min_area", self.min_area)?;
        non_negative("snap_tolerance", self.snap_tolerance)?;
        non_negative("adjacency_tolerance", self.adjacency_tolerance)?;
        non_negative("enclosure.buffer", self.enclosure.buffer)?;
        let threshold = self.enclosure.overlap_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ConfigurationError::InvalidValue {
                field: "enclosure.overlap_threshold".to_owned(),
                value: threshold,
            });
        }

        let widths = &self.widths;
        for (name, lanes) in &widths.highway {
            positive(&format!("widths.highway.{name}.bidirectional"), lanes.bidirectional)?;
            positive(&format!("widths.highway.{name}.unidirectional"), lanes.unidirectional)?;
        }
        positive("widths.highway_fallback.bidirectional", widths.highway_fallback.bidirectional)?;
        positive("widths.highway_fallback.unidirectional", widths.highway_fallback.unidirectional)?;
        for (key, values) in &widths.cycleway {
            for (value, width) in values {
                non_negative(&format!("widths.cycleway.{key}.{value}"), *width)?;
            }
        }
        for (name, width) in &widths.barrier {
            positive(&format!("widths.barrier.{name}"), *width)?;
        }
        non_negative("widths.streetside_parking", widths.streetside_parking)?;
        positive("widths.pedestrian_way", widths.pedestrian_way)?;
        positive("widths.tram_gauge", widths.tram_gauge)?;
        non_negative("widths.tram_extra", widths.tram_extra)?;
        positive("widths.train_gauge", widths.train_gauge)?;
        non_negative("widths.train_extra", widths.train_extra)?;
        positive("widths.barrier_fallback", widths.barrier_fallback)?;
        positive("widths.point_barrier", widths.point_barrier)?;

        if self.working_epsg != ETRS89_LAEA_EPSG {
            return Err(ConfigurationError::UnsupportedCrs(self.working_epsg));
        }
        Ok(())
    }
}

fn non_negative(field: &str, value: f64) -> Result<(), ConfigurationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidValue {
            field: field.to_owned(),
            value,
        })
    }
}

fn positive(field: &str, value: f64) -> Result<(), ConfigurationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidValue {
            field: field.to_owned(),
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn config() -> MappingConfig {
        MappingConfig::default()
    }

    #[rstest]
    fn defaults_rank_every_space_type(config: MappingConfig) {
        for space_type in SpaceType::ALL {
            assert!(config.priority_rank(space_type).is_some(), "{space_type} unranked");
        }
    }

    #[rstest]
    fn private_yard_outranks_green_space(config: MappingConfig) {
        assert!(
            config.priority_rank(SpaceType::PrivateYard) < config.priority_rank(SpaceType::GreenSpace)
        );
    }

    #[rstest]
    fn duplicate_priority_is_rejected(mut config: MappingConfig) {
        config.priority.push(SpaceType::Park);
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::DuplicatePriority(SpaceType::Park))
        );
    }

    #[rstest]
    #[case(-1.0)]
    #[case(f64::NAN)]
    fn invalid_min_area_is_rejected(mut config: MappingConfig, #[case] min_area: f64) {
        config.min_area = min_area;
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::InvalidValue { field, .. }) if field == "min_area"
        ));
    }

    #[rstest]
    fn zero_barrier_width_is_rejected(mut config: MappingConfig) {
        config.widths.barrier.insert("fence".into(), 0.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::InvalidValue { field, .. }) if field == "widths.barrier.fence"
        ));
    }

    #[rstest]
    fn other_working_crs_is_rejected(mut config: MappingConfig) {
        config.working_epsg = 25_833;
        assert_eq!(config.validate(), Err(ConfigurationError::UnsupportedCrs(25_833)));
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn partial_json_keeps_remaining_defaults() {
        let json = r#"{ "min_area": 0.5, "widths": { "barrier": { "fence": 0.3 } } }"#;
        let config: MappingConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.min_area, 0.5);
        assert_eq!(config.widths.barrier.get("fence"), Some(&0.3));
        assert_eq!(config.widths.pedestrian_way, 1.6);
        assert_eq!(config.priority, MappingConfig::default().priority);
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn access_tables_use_snake_case_keys() {
        let json = r#"{ "access_overrides": { "sports_area": "private" } }"#;
        let config: MappingConfig = serde_json::from_str(json).unwrap();
        assert_eq!(
            config.access_overrides.get(&SpaceType::SportsArea),
            Some(&Access::Private)
        );
    }
}
