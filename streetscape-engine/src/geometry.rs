//! Small polygon helpers shared by the pipeline stages.

use geo::{Area, BooleanOps, BoundingRect, Coord, MultiPolygon, Polygon, Rect, coord};

/// An empty multipolygon.
pub(crate) fn empty() -> MultiPolygon<f64> {
    MultiPolygon::new(Vec::new())
}

/// Planar area of a multipolygon.
pub(crate) fn area(geometry: &MultiPolygon<f64>) -> f64 {
    geometry.unsigned_area()
}

/// Whether the multipolygon has no area at all.
pub(crate) fn is_void(geometry: &MultiPolygon<f64>) -> bool {
    geometry.0.is_empty() || area(geometry) <= 0.0
}

/// Union of many multipolygons, merged pairwise so each pass halves the work.
pub(crate) fn union_all(parts: Vec<MultiPolygon<f64>>) -> MultiPolygon<f64> {
    let mut layer: Vec<MultiPolygon<f64>> = parts.into_iter().filter(|p| !p.0.is_empty()).collect();
    while layer.len() > 1 {
        let mut next = Vec::with_capacity(layer.len().div_ceil(2));
        let mut pairs = layer.into_iter();
        while let Some(first) = pairs.next() {
            match pairs.next() {
                Some(second) => next.push(first.union(&second)),
                None => next.push(first),
            }
        }
        layer = next;
    }
    layer.pop().unwrap_or_else(empty)
}

/// Polygon with its holes filled.
pub(crate) fn outline(geometry: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    let shells = geometry
        .iter()
        .map(|polygon| MultiPolygon::new(vec![Polygon::new(polygon.exterior().clone(), Vec::new())]))
        .collect();
    union_all(shells)
}

/// Envelope of a multipolygon, `None` when empty.
pub(crate) fn envelope(geometry: &MultiPolygon<f64>) -> Option<Rect<f64>> {
    geometry.bounding_rect()
}

/// Rectangle grown by `margin` on every side.
pub(crate) fn expand(rect: Rect<f64>, margin: f64) -> Rect<f64> {
    let grow = coord! { x: margin, y: margin };
    Rect::new(rect.min() - grow, rect.max() + grow)
}

/// Coordinate rounded to a grid of size `step`; a zero step leaves it alone.
pub(crate) fn snap(c: Coord<f64>, step: f64) -> Coord<f64> {
    if step > 0.0 {
        coord! { x: (c.x / step).round() * step, y: (c.y / step).round() * step }
    } else {
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use streetscape_core::test_support::rectangle;

    fn square(min: f64, max: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![rectangle(min, min, max, max)])
    }

    #[test]
    fn union_all_merges_overlaps() {
        let merged = union_all(vec![square(0.0, 2.0), square(1.0, 3.0), square(10.0, 11.0)]);
        assert!((area(&merged) - 8.0).abs() < 1e-9);
        assert_eq!(merged.0.len(), 2);
    }

    #[test]
    fn union_all_of_nothing_is_empty() {
        assert!(is_void(&union_all(Vec::new())));
    }

    #[test]
    fn outline_fills_holes() {
        let ring = square(0.0, 10.0).difference(&square(2.0, 8.0));
        assert!((area(&ring) - 64.0).abs() < 1e-9);
        assert!((area(&outline(&ring)) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn snap_rounds_to_grid() {
        let snapped = snap(coord! { x: 1.0004, y: -2.0006 }, 0.001);
        assert!((snapped.x - 1.0).abs() < 1e-12);
        assert!((snapped.y + 2.001).abs() < 1e-12);
    }
}
