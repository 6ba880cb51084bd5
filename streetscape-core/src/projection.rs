//! Projection between WGS84 and the planar working coordinate reference.
//!
//! Buffer widths and area tolerances are metres, so every geometry is moved
//! into an equal-area projection before the pipeline runs and moved back
//! for publication. The default working reference is ETRS89 / LAEA Europe
//! (EPSG:3035), implemented here for the GRS80 ellipsoid.
//!
//! # Examples
//! ```
//! use geo::coord;
//! use streetscape_core::{LambertAzimuthalEqualArea, Projection};
//!
//! let laea = LambertAzimuthalEqualArea::etrs89_europe();
//! let projected = laea.forward(coord! { x: 5.0, y: 50.0 });
//! assert!((projected.x - 3_962_799.45).abs() < 0.01);
//! assert!((projected.y - 2_999_718.85).abs() < 0.01);
//! ```

use geo::{Coord, coord};

use crate::config::ConfigurationError;

/// EPSG code of geographic WGS84 coordinates.
pub const WGS84_EPSG: u32 = 4326;
/// EPSG code of ETRS89 / LAEA Europe.
pub const ETRS89_LAEA_EPSG: u32 = 3035;

const MAX_LATITUDE_ITERATIONS: usize = 16;
const LATITUDE_EPSILON: f64 = 1e-15;

/// Converts coordinates between WGS84 and a planar working reference.
///
/// `forward` takes `x = longitude`, `y = latitude` in degrees; `inverse`
/// undoes it. Implementations must be pure so independent runs can share
/// one projection across threads.
pub trait Projection: Send + Sync {
    /// EPSG code of the working reference.
    fn epsg(&self) -> u32;

    /// Geographic degrees to working coordinates.
    fn forward(&self, geographic: Coord<f64>) -> Coord<f64>;

    /// Working coordinates to geographic degrees.
    fn inverse(&self, projected: Coord<f64>) -> Coord<f64>;
}

/// A projection that leaves coordinates untouched.
///
/// Useful when input geometry is already planar, for instance in tests that
/// lay out scenes directly in metres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanarIdentity;

impl Projection for PlanarIdentity {
    fn epsg(&self) -> u32 {
        0
    }

    fn forward(&self, geographic: Coord<f64>) -> Coord<f64> {
        geographic
    }

    fn inverse(&self, projected: Coord<f64>) -> Coord<f64> {
        projected
    }
}

/// Ellipsoidal oblique Lambert azimuthal equal-area projection.
#[derive(Debug, Clone, PartialEq)]
pub struct LambertAzimuthalEqualArea {
    epsg: u32,
    eccentricity: f64,
    eccentricity_sq: f64,
    origin_longitude: f64,
    origin_latitude: f64,
    false_easting: f64,
    false_northing: f64,
    q_polar: f64,
    sin_beta0: f64,
    cos_beta0: f64,
    authalic_radius: f64,
    d: f64,
}

impl LambertAzimuthalEqualArea {
    /// Build a projection on the ellipsoid `(semi_major, inverse_flattening)`
    /// centred on `(origin_latitude, origin_longitude)` degrees.
    #[must_use]
    pub fn new(
        epsg: u32,
        semi_major: f64,
        inverse_flattening: f64,
        origin_latitude: f64,
        origin_longitude: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let flattening = 1.0 / inverse_flattening;
        let eccentricity_sq = flattening * (2.0 - flattening);
        let eccentricity = eccentricity_sq.sqrt();
        let phi0 = origin_latitude.to_radians();
        let q_polar = authalic_q(1.0, eccentricity, eccentricity_sq);
        let q0 = authalic_q(phi0.sin(), eccentricity, eccentricity_sq);
        let beta0 = (q0 / q_polar).clamp(-1.0, 1.0).asin();
        let authalic_radius = semi_major * (q_polar / 2.0).sqrt();
        let d = semi_major * phi0.cos()
            / (1.0 - eccentricity_sq * phi0.sin().powi(2)).sqrt()
            / (authalic_radius * beta0.cos());
        Self {
            epsg,
            eccentricity,
            eccentricity_sq,
            origin_longitude: origin_longitude.to_radians(),
            origin_latitude: phi0,
            false_easting,
            false_northing,
            q_polar,
            sin_beta0: beta0.sin(),
            cos_beta0: beta0.cos(),
            authalic_radius,
            d,
        }
    }

    /// ETRS89 / LAEA Europe (EPSG:3035) on GRS80.
    #[must_use]
    pub fn etrs89_europe() -> Self {
        Self::new(
            ETRS89_LAEA_EPSG,
            6_378_137.0,
            298.257_222_101,
            52.0,
            10.0,
            4_321_000.0,
            3_210_000.0,
        )
    }

    /// Geodetic latitude for an authalic `q`, by fixed-point iteration.
    fn latitude_from_q(&self, q: f64) -> f64 {
        let e = self.eccentricity;
        let e2 = self.eccentricity_sq;
        if q.abs() >= self.q_polar - LATITUDE_EPSILON {
            return std::f64::consts::FRAC_PI_2.copysign(q);
        }
        let mut phi = (q / 2.0).clamp(-1.0, 1.0).asin();
        for _ in 0..MAX_LATITUDE_ITERATIONS {
            let sin_phi = phi.sin();
            let one_minus = 1.0 - e2 * sin_phi * sin_phi;
            let delta = one_minus * one_minus / (2.0 * phi.cos())
                * (q / (1.0 - e2) - sin_phi / one_minus
                    + (1.0 / (2.0 * e)) * ((1.0 - e * sin_phi) / (1.0 + e * sin_phi)).ln());
            phi += delta;
            if delta.abs() < LATITUDE_EPSILON {
                break;
            }
        }
        phi
    }
}

impl Projection for LambertAzimuthalEqualArea {
    fn epsg(&self) -> u32 {
        self.epsg
    }

    fn forward(&self, geographic: Coord<f64>) -> Coord<f64> {
        let phi = geographic.y.to_radians();
        let lambda = geographic.x.to_radians() - self.origin_longitude;
        let q = authalic_q(phi.sin(), self.eccentricity, self.eccentricity_sq);
        let beta = (q / self.q_polar).clamp(-1.0, 1.0).asin();
        let (sin_beta, cos_beta) = beta.sin_cos();
        let b = self.authalic_radius
            * (2.0
                / (1.0
                    + self.sin_beta0 * sin_beta
                    + self.cos_beta0 * cos_beta * lambda.cos()))
            .sqrt();
        coord! {
            x: self.false_easting + b * self.d * cos_beta * lambda.sin(),
            y: self.false_northing
                + (b / self.d)
                    * (self.cos_beta0 * sin_beta - self.sin_beta0 * cos_beta * lambda.cos()),
        }
    }

    fn inverse(&self, projected: Coord<f64>) -> Coord<f64> {
        let east = projected.x - self.false_easting;
        let north = projected.y - self.false_northing;
        let rho = ((east / self.d).powi(2) + (self.d * north).powi(2)).sqrt();
        if rho < f64::EPSILON {
            return coord! {
                x: self.origin_longitude.to_degrees(),
                y: self.origin_latitude.to_degrees(),
            };
        }
        let c = 2.0 * (rho / (2.0 * self.authalic_radius)).clamp(-1.0, 1.0).asin();
        let (sin_c, cos_c) = c.sin_cos();
        let sin_beta = (cos_c * self.sin_beta0 + self.d * north * sin_c * self.cos_beta0 / rho)
            .clamp(-1.0, 1.0);
        let lambda = self.origin_longitude
            + (east * sin_c).atan2(
                self.d * rho * self.cos_beta0 * cos_c
                    - self.d * self.d * north * self.sin_beta0 * sin_c,
            );
        let phi = self.latitude_from_q(self.q_polar * sin_beta);
        coord! { x: lambda.to_degrees(), y: phi.to_degrees() }
    }
}

/// Authalic `q` for `sin(phi)` on an ellipsoid of eccentricity `e`.
fn authalic_q(sin_phi: f64, e: f64, e2: f64) -> f64 {
    let es = e * sin_phi;
    (1.0 - e2) * (sin_phi / (1.0 - es * es) - (1.0 / (2.0 * e)) * ((1.0 - es) / (1.0 + es)).ln())
}

/// Projection for a working-reference EPSG code.
///
/// # Errors
/// Returns [`ConfigurationError::UnsupportedCrs`] for any code other than
/// EPSG:3035.
pub fn projection_for_epsg(epsg: u32) -> Result<Box<dyn Projection>, ConfigurationError> {
    match epsg {
        ETRS89_LAEA_EPSG => Ok(Box::new(LambertAzimuthalEqualArea::etrs89_europe())),
        other => Err(ConfigurationError::UnsupportedCrs(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn laea() -> LambertAzimuthalEqualArea {
        LambertAzimuthalEqualArea::etrs89_europe()
    }

    #[rstest]
    fn origin_maps_to_false_origin(laea: LambertAzimuthalEqualArea) {
        let projected = laea.forward(coord! { x: 10.0, y: 52.0 });
        assert!((projected.x - 4_321_000.0).abs() < 1e-6);
        assert!((projected.y - 3_210_000.0).abs() < 1e-6);
    }

    #[rstest]
    fn inverse_of_false_origin_is_projection_centre(laea: LambertAzimuthalEqualArea) {
        let geographic = laea.inverse(coord! { x: 4_321_000.0, y: 3_210_000.0 });
        assert!((geographic.x - 10.0).abs() < 1e-12);
        assert!((geographic.y - 52.0).abs() < 1e-12);
    }

    #[rstest]
    #[case(16.37, 48.21)]
    #[case(-9.14, 38.72)]
    #[case(24.94, 60.17)]
    fn inverse_recovers_european_capitals(
        laea: LambertAzimuthalEqualArea,
        #[case] lon: f64,
        #[case] lat: f64,
    ) {
        let back = laea.inverse(laea.forward(coord! { x: lon, y: lat }));
        assert!((back.x - lon).abs() < 1e-9);
        assert!((back.y - lat).abs() < 1e-9);
    }

    #[rstest]
    #[case(ETRS89_LAEA_EPSG, true)]
    #[case(WGS84_EPSG, false)]
    #[case(25_833, false)]
    fn only_laea_europe_is_supported(#[case] epsg: u32, #[case] supported: bool) {
        assert_eq!(projection_for_epsg(epsg).is_ok(), supported);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]
        #[test]
        fn projected_round_trip_is_stable(x in 2_500_000.0f64..7_000_000.0, y in 1_400_000.0f64..5_400_000.0) {
            let laea = LambertAzimuthalEqualArea::etrs89_europe();
            let start = coord! { x: x, y: y };
            let again = laea.forward(laea.inverse(start));
            prop_assert!((again.x - start.x).abs() < 1e-5, "x drifted: {} -> {}", start.x, again.x);
            prop_assert!((again.y - start.y).abs() < 1e-5, "y drifted: {} -> {}", start.y, again.y);
        }
    }
}
