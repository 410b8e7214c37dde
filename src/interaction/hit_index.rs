use indexmap::IndexMap;
use ordered_float::OrderedFloat;

use crate::core::Point;

use super::hit_shapes::{DistanceMode, HitArea};

/// Closest shape found by a nearest-shape query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitCandidate<'a> {
    pub area: &'a HitArea,
    pub distance: f64,
}

/// Append-only, per-series bucketed index of plotted shapes.
///
/// Buckets are rebuilt wholesale every render pass; shapes are never mutated
/// after insertion. Later series sit on top, so queries walk buckets in
/// reverse insertion order.
#[derive(Debug, Clone, Default)]
pub struct HitIndex {
    buckets: IndexMap<usize, Vec<HitArea>>,
}

impl HitIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, area: HitArea, series_index: usize) {
        self.buckets.entry(series_index).or_default().push(area);
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    /// Drops one series' shapes before it is plotted again.
    pub fn clear_series(&mut self, series_index: usize) {
        self.buckets.shift_remove(&series_index);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn series_areas(&self, series_index: usize) -> &[HitArea] {
        self.buckets
            .get(&series_index)
            .map_or(&[][..], Vec::as_slice)
    }

    /// Topmost shape containing `point`.
    #[must_use]
    pub fn containing(&self, point: Point) -> Option<&HitArea> {
        self.buckets
            .values()
            .rev()
            .flat_map(|areas| areas.iter().rev())
            .find(|area| area.shape.contains(point))
    }

    /// Nearest shape across all series. A containing shape wins immediately.
    /// Polylines are only considered when `include_lines` is set.
    #[must_use]
    pub fn nearest(
        &self,
        point: Point,
        mode: DistanceMode,
        include_lines: bool,
    ) -> Option<HitCandidate<'_>> {
        if let Some(area) = self.containing(point) {
            return Some(HitCandidate {
                area,
                distance: 0.0,
            });
        }
        self.buckets
            .values()
            .rev()
            .flat_map(|areas| areas.iter().rev())
            .filter(|area| include_lines || !area.shape.is_polyline())
            .map(|area| (OrderedFloat(area.shape.distance(point, mode)), area))
            .min_by_key(|(distance, _)| *distance)
            .map(|(distance, area)| HitCandidate {
                area,
                distance: distance.0,
            })
    }

    /// Nearest shape within one series, lines included.
    #[must_use]
    pub fn nearest_in_series(
        &self,
        point: Point,
        series_index: usize,
        mode: DistanceMode,
    ) -> Option<HitCandidate<'_>> {
        self.series_areas(series_index)
            .iter()
            .map(|area| (OrderedFloat(area.shape.distance(point, mode)), area))
            .min_by_key(|(distance, _)| *distance)
            .map(|(distance, area)| HitCandidate {
                area,
                distance: distance.0,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DataPoint, Rect};
    use crate::interaction::HitShape;

    fn rect_area(series: usize, point: usize, left: f64) -> HitArea {
        HitArea::new(
            HitShape::Rect(Rect::new(left, 0.0, 10.0, 10.0)),
            DataPoint::new(series, point, point as f64, 1.0),
        )
    }

    #[test]
    fn later_series_win_overlapping_containment() {
        let mut index = HitIndex::new();
        index.add(rect_area(0, 0, 0.0), 0);
        index.add(rect_area(1, 0, 5.0), 1);
        let hit = index.containing(Point::new(7.0, 5.0)).expect("hit");
        assert_eq!(hit.tag.series_index, 1);
    }

    #[test]
    fn nearest_skips_lines_unless_requested() {
        let mut index = HitIndex::new();
        index.add(rect_area(0, 0, 100.0), 0);
        index.add(
            HitArea::new(
                HitShape::Polyline(vec![Point::new(0.0, 20.0), Point::new(50.0, 20.0)]),
                DataPoint::new(1, 0, 0.0, 0.0),
            ),
            1,
        );
        let query = Point::new(10.0, 21.0);
        let without = index.nearest(query, DistanceMode::Xy, false).expect("rect");
        assert_eq!(without.area.tag.series_index, 0);
        let with = index.nearest(query, DistanceMode::Xy, true).expect("line");
        assert_eq!(with.area.tag.series_index, 1);
        assert_eq!(with.distance, 1.0);
    }

    #[test]
    fn clear_series_removes_only_that_bucket() {
        let mut index = HitIndex::new();
        index.add(rect_area(0, 0, 0.0), 0);
        index.add(rect_area(1, 0, 0.0), 1);
        index.clear_series(0);
        assert_eq!(index.len(), 1);
        assert!(index.series_areas(0).is_empty());
        assert!(index.nearest_in_series(Point::new(0.0, 0.0), 1, DistanceMode::Xy).is_some());
    }
}
