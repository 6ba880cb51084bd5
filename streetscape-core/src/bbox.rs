//! Rectangular area of interest for a mapping run.

use geo::{Coord, Polygon, Rect, coord};
use thiserror::Error;

use crate::projection::Projection;

/// Edge subdivisions used when projecting a box.
const PROJECTION_EDGE_STEPS: u32 = 16;

/// Errors returned when constructing a [`BoundingBox`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BoundingBoxError {
    /// A coordinate was NaN or infinite.
    #[error("bounding box coordinates must be finite")]
    NonFinite,
    /// The minimum was not strictly below the maximum on an axis.
    #[error("bounding box {axis} range is empty: min {min} is not below max {max}")]
    EmptyRange {
        /// Axis name, `x` or `y`.
        axis: &'static str,
        /// Supplied minimum.
        min: f64,
        /// Supplied maximum.
        max: f64,
    },
    /// A geographic coordinate fell outside longitude/latitude limits.
    #[error("{axis} value {value} lies outside [{limit_low}, {limit_high}]")]
    OutOfRange {
        /// Axis name, `longitude` or `latitude`.
        axis: &'static str,
        /// Offending value.
        value: f64,
        /// Lowest permitted value.
        limit_low: f64,
        /// Highest permitted value.
        limit_high: f64,
    },
    /// Text did not hold four comma-separated numbers.
    #[error("expected `left,bottom,right,top`, got '{0}'")]
    Malformed(String),
}

/// Axis-aligned rectangle with strictly positive extent on both axes.
///
/// # Examples
/// ```
/// use streetscape_core::BoundingBox;
///
/// # fn main() -> Result<(), streetscape_core::BoundingBoxError> {
/// let bbox = BoundingBox::new(0.0, 0.0, 100.0, 50.0)?;
/// assert_eq!(bbox.area(), 5_000.0);
/// assert!(BoundingBox::new(1.0, 0.0, 1.0, 5.0).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    min: Coord<f64>,
    max: Coord<f64>,
}

impl BoundingBox {
    /// Validate and construct a box from its corners.
    ///
    /// # Errors
    /// Fails when any value is not finite or when a minimum is not strictly
    /// below its maximum.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self, BoundingBoxError> {
        if ![min_x, min_y, max_x, max_y].iter().all(|v| v.is_finite()) {
            return Err(BoundingBoxError::NonFinite);
        }
        if min_x >= max_x {
            return Err(BoundingBoxError::EmptyRange {
                axis: "x",
                min: min_x,
                max: max_x,
            });
        }
        if min_y >= max_y {
            return Err(BoundingBoxError::EmptyRange {
                axis: "y",
                min: min_y,
                max: max_y,
            });
        }
        Ok(Self {
            min: coord! { x: min_x, y: min_y },
            max: coord! { x: max_x, y: max_y },
        })
    }

    /// Validate and construct a geographic box from WGS84 degrees.
    ///
    /// # Errors
    /// Fails as [`BoundingBox::new`] does, and when a longitude lies outside
    /// `[-180, 180]` or a latitude outside `[-90, 90]`.
    pub fn from_wgs84(left: f64, bottom: f64, right: f64, top: f64) -> Result<Self, BoundingBoxError> {
        let checks = [
            ("longitude", left, 180.0),
            ("latitude", bottom, 90.0),
            ("longitude", right, 180.0),
            ("latitude", top, 90.0),
        ];
        for (axis, value, limit) in checks {
            if value.is_finite() && !(-limit..=limit).contains(&value) {
                return Err(BoundingBoxError::OutOfRange {
                    axis,
                    value,
                    limit_low: -limit,
                    limit_high: limit,
                });
            }
        }
        Self::new(left, bottom, right, top)
    }

    /// Lower-left corner.
    #[must_use]
    pub const fn min(&self) -> Coord<f64> {
        self.min
    }

    /// Upper-right corner.
    #[must_use]
    pub const fn max(&self) -> Coord<f64> {
        self.max
    }

    /// Extent along the x axis.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Extent along the y axis.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Planar area of the box.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// The box as a `geo` rectangle.
    #[must_use]
    pub fn rect(&self) -> Rect<f64> {
        Rect::new(self.min, self.max)
    }

    /// The box as a counter-clockwise polygon.
    #[must_use]
    pub fn to_polygon(&self) -> Polygon<f64> {
        self.rect().to_polygon()
    }

    /// Whether `other` shares any point with the box.
    #[must_use]
    pub fn intersects_rect(&self, other: &Rect<f64>) -> bool {
        other.min().x <= self.max.x
            && other.max().x >= self.min.x
            && other.min().y <= self.max.y
            && other.max().y >= self.min.y
    }

    /// Smallest box in working coordinates enclosing the projected outline.
    ///
    /// Each edge is subdivided before projecting so curved edges in the
    /// target reference stay inside the result.
    ///
    /// # Errors
    /// Fails when the projection yields non-finite coordinates.
    pub fn project(&self, projection: &dyn Projection) -> Result<Self, BoundingBoxError> {
        let corners = [
            self.min,
            coord! { x: self.max.x, y: self.min.y },
            self.max,
            coord! { x: self.min.x, y: self.max.y },
            self.min,
        ];
        let mut low = coord! { x: f64::INFINITY, y: f64::INFINITY };
        let mut high = coord! { x: f64::NEG_INFINITY, y: f64::NEG_INFINITY };
        for edge in corners.windows(2) {
            let [start, end] = edge else { continue };
            for step in 0..PROJECTION_EDGE_STEPS {
                let t = f64::from(step) / f64::from(PROJECTION_EDGE_STEPS);
                let projected = projection.forward(*start + (*end - *start) * t);
                low = coord! { x: low.x.min(projected.x), y: low.y.min(projected.y) };
                high = coord! { x: high.x.max(projected.x), y: high.y.max(projected.y) };
            }
        }
        Self::new(low.x, low.y, high.x, high.y)
    }
}

impl std::str::FromStr for BoundingBox {
    type Err = BoundingBoxError;

    /// Parse `left,bottom,right,top` WGS84 degrees.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values: Vec<f64> = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|_| BoundingBoxError::Malformed(s.to_owned()))?;
        match values.as_slice() {
            [left, bottom, right, top] => Self::from_wgs84(*left, *bottom, *right, *top),
            _ => Err(BoundingBoxError::Malformed(s.to_owned())),
        }
    }
}
