//! R*-tree over geometry envelopes, used to find candidate pairs cheaply.

use geo::Rect;
use rstar::{AABB, RTree, RTreeObject};

/// Envelope of the geometry at position `index` in some slice.
#[derive(Debug, Clone, Copy, PartialEq)]
struct IndexedEnvelope {
    index: usize,
    min: [f64; 2],
    max: [f64; 2],
}

impl RTreeObject for IndexedEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

/// Spatial lookup from a rectangle to the positions of intersecting envelopes.
#[derive(Debug)]
pub(crate) struct EnvelopeIndex {
    tree: RTree<IndexedEnvelope>,
}

impl EnvelopeIndex {
    /// Index envelopes by their position; `None` entries are skipped.
    pub(crate) fn new(envelopes: impl IntoIterator<Item = Option<Rect<f64>>>) -> Self {
        let entries = envelopes
            .into_iter()
            .enumerate()
            .filter_map(|(index, rect)| {
                rect.map(|r| IndexedEnvelope {
                    index,
                    min: [r.min().x, r.min().y],
                    max: [r.max().x, r.max().y],
                })
            })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Positions whose envelope touches `rect`, in ascending order.
    pub(crate) fn intersecting(&self, rect: &Rect<f64>) -> Vec<usize> {
        let query = AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]);
        let mut hits: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&query)
            .map(|entry| entry.index)
            .collect();
        hits.sort_unstable();
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::coord;

    fn rect(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Rect<f64> {
        Rect::new(coord! { x: min_x, y: min_y }, coord! { x: max_x, y: max_y })
    }

    #[test]
    fn returns_sorted_positions_of_hits() {
        let index = EnvelopeIndex::new([
            Some(rect(5.0, 5.0, 6.0, 6.0)),
            None,
            Some(rect(0.0, 0.0, 1.0, 1.0)),
            Some(rect(0.5, 0.5, 5.5, 5.5)),
        ]);
        assert_eq!(index.intersecting(&rect(0.9, 0.9, 5.1, 5.1)), vec![0, 2, 3]);
        assert!(index.intersecting(&rect(20.0, 20.0, 21.0, 21.0)).is_empty());
    }
}
