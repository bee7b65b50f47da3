//! Quadrant occupancy over the winning slots of one ticket.
//!
//! Each winning icon is split into four quadrants at its midpoints. A winning ticket
//! counts as revealed only once a scratch has landed in every quadrant of every
//! winning icon, so the player has to sweep each icon's full extent.

use crate::config::{Layout, Point, Rect, SLOT_COUNT};

/// Quadrant of `p` inside `bounds`: 0 top-left, 1 top-right, 2 bottom-left,
/// 3 bottom-right. Points exactly on a midpoint belong to the top/left half.
pub fn quadrant_of(bounds: Rect, p: Point) -> usize {
    let local_x = p.x - bounds.x;
    let local_y = p.y - bounds.y;
    let mut q = 0;
    if local_x > bounds.w / 2.0 {
        q += 1;
    }
    if local_y > bounds.h / 2.0 {
        q += 2;
    }
    q
}

#[derive(Clone, Debug)]
pub struct HotspotTracker {
    winning_slots: Vec<usize>,
    quadrants: [[bool; 4]; SLOT_COUNT],
    completed: bool,
}

impl HotspotTracker {
    pub fn new(winning_slots: Vec<usize>) -> Self {
        Self {
            winning_slots,
            quadrants: [[false; 4]; SLOT_COUNT],
            completed: false,
        }
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn quadrants(&self, slot: usize) -> [bool; 4] {
        self.quadrants[slot]
    }

    /// Marked quadrants across all winning slots.
    pub fn progress(&self) -> usize {
        self.winning_slots
            .iter()
            .map(|&s| self.quadrants[s].iter().filter(|&&q| q).count())
            .sum()
    }

    /// Record a scratch at `p`. Returns `true` on the one call that completes the
    /// reveal; every call after that is a no-op, as is any call on a losing ticket.
    pub fn record_scratch(&mut self, layout: &Layout, p: Point) -> bool {
        if self.completed || self.winning_slots.is_empty() {
            return false;
        }
        for &slot in &self.winning_slots {
            let bounds = layout.slot_bounds(slot);
            if bounds.contains(p) {
                self.quadrants[slot][quadrant_of(bounds, p)] = true;
            }
        }
        let all_scratched = self
            .winning_slots
            .iter()
            .all(|&s| self.quadrants[s].iter().all(|&q| q));
        if all_scratched {
            self.completed = true;
        }
        all_scratched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A point inside quadrant `q` of `bounds`.
    fn point_in(bounds: Rect, q: usize) -> Point {
        let fx = if q % 2 == 1 { 0.75 } else { 0.25 };
        let fy = if q >= 2 { 0.75 } else { 0.25 };
        Point::new(bounds.x + bounds.w * fx, bounds.y + bounds.h * fy)
    }

    #[test]
    fn test_quadrant_mapping_every_slot() {
        let layout = Layout::default();
        for slot in 0..SLOT_COUNT {
            let b = layout.slot_bounds(slot);
            for q in 0..4 {
                assert_eq!(quadrant_of(b, point_in(b, q)), q);
            }
            assert_eq!(quadrant_of(b, Point::new(b.x, b.y)), 0);
            assert_eq!(quadrant_of(b, Point::new(b.x + b.w, b.y)), 1);
            assert_eq!(quadrant_of(b, Point::new(b.x, b.y + b.h)), 2);
            assert_eq!(quadrant_of(b, Point::new(b.x + b.w, b.y + b.h)), 3);
            assert_eq!(quadrant_of(b, b.center()), 0);
        }
    }

    #[test]
    fn test_loser_tracker_never_changes() {
        let layout = Layout::default();
        let mut t = HotspotTracker::new(Vec::new());
        for slot in 0..SLOT_COUNT {
            let b = layout.slot_bounds(slot);
            for q in 0..4 {
                assert!(!t.record_scratch(&layout, point_in(b, q)));
            }
        }
        assert!(!t.completed());
        assert!((0..SLOT_COUNT).all(|s| t.quadrants(s) == [false; 4]));
    }

    #[test]
    fn test_completion_fires_once() {
        let layout = Layout::default();
        let slots = vec![1, 6, 11];
        let mut t = HotspotTracker::new(slots.clone());
        let mut fired = 0;
        for &slot in &slots[..2] {
            let b = layout.slot_bounds(slot);
            for q in 0..4 {
                fired += t.record_scratch(&layout, point_in(b, q)) as usize;
            }
        }
        assert_eq!(fired, 0);
        assert_eq!(t.progress(), 8);

        let b = layout.slot_bounds(11);
        for q in 0..3 {
            fired += t.record_scratch(&layout, point_in(b, q)) as usize;
        }
        assert_eq!(fired, 0);
        let last = point_in(b, 3);
        assert!(t.record_scratch(&layout, last));
        assert!(t.completed());
        for _ in 0..10 {
            assert!(!t.record_scratch(&layout, last));
        }
    }

    #[test]
    fn test_non_winning_slot_is_ignored() {
        let layout = Layout::default();
        let mut t = HotspotTracker::new(vec![0, 1, 2]);
        let b = layout.slot_bounds(7);
        for q in 0..4 {
            t.record_scratch(&layout, point_in(b, q));
        }
        assert_eq!(t.quadrants(7), [false; 4]);
        assert_eq!(t.progress(), 0);
    }
}
