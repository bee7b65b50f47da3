//! Ticket generation & reveal engine.
//!
//! A [`Ticket`] is a pure state machine: it never renders and never schedules
//! anything. Callers feed it pointer positions (already in native surface
//! coordinates) and react to the [`TicketSignal`]s it returns. [`TicketBooth`] owns
//! the shared outcome schedule and routes strokes to exactly one ticket.

use std::fmt;

use rand::Rng;

use crate::config::{Layout, Point, ScratchConfig};

pub mod booth;
pub mod deck;
pub mod hotspot;
pub mod prize;
pub mod schedule;
pub mod surface;

pub use booth::TicketBooth;
pub use deck::{Grid, IconCatalog, IconId, generate_grid};
pub use hotspot::{HotspotTracker, quadrant_of};
pub use prize::{PrizeBook, decorative_code};
pub use schedule::{Draw, OutcomeScheduler};
pub use surface::{Disc, ScratchMark, ScratchSurface, to_native};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TicketId(pub u32);

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle phase. Construction is atomic, so a ticket is observed first as
/// `Interactive`. Being revealed is tracked separately since scratching carries on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TicketPhase {
    Interactive,
    Closing,
    Closed,
}

/// Notifications for the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TicketSignal {
    /// Every quadrant of every winning icon is uncovered. Emitted once per ticket;
    /// presentation should celebrate after `delay_ms`.
    Revealed { ticket: TicketId, delay_ms: u32 },
    /// The ticket has left the screen.
    Closed { ticket: TicketId, was_winner: bool },
}

/// Result of a pointer event that actually erased something.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scratch {
    pub mark: ScratchMark,
    pub signal: Option<TicketSignal>,
}

pub struct Ticket {
    id: TicketId,
    index: u64,
    is_winner: bool,
    grid: Grid,
    prize_text: String,
    layout: Layout,
    reveal_delay_ms: u32,
    surface: ScratchSurface,
    hotspots: HotspotTracker,
    phase: TicketPhase,
}

impl Ticket {
    pub fn new(
        id: TicketId,
        draw: Draw,
        grid: Grid,
        prize_text: String,
        layout: Layout,
        scratch: ScratchConfig,
        reveal_delay_ms: u32,
    ) -> Self {
        let surface = ScratchSurface::new(layout.surface_w, layout.surface_h, scratch);
        let hotspots = HotspotTracker::new(grid.winning_slots.clone());
        Self {
            id,
            index: draw.index,
            is_winner: draw.is_winner,
            grid,
            prize_text,
            layout,
            reveal_delay_ms,
            surface,
            hotspots,
            phase: TicketPhase::Interactive,
        }
    }

    pub fn id(&self) -> TicketId {
        self.id
    }

    /// Position of this ticket in the spawn sequence.
    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn is_winner(&self) -> bool {
        self.is_winner
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn winning_slots(&self) -> &[usize] {
        &self.grid.winning_slots
    }

    pub fn prize_text(&self) -> &str {
        &self.prize_text
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn phase(&self) -> TicketPhase {
        self.phase
    }

    pub fn completed(&self) -> bool {
        self.hotspots.completed()
    }

    pub fn hotspots(&self) -> &HotspotTracker {
        &self.hotspots
    }

    pub fn surface(&self) -> &ScratchSurface {
        &self.surface
    }

    pub fn is_interactive(&self) -> bool {
        self.phase == TicketPhase::Interactive
    }

    pub fn pointer_down<R: Rng + ?Sized>(&mut self, at: Point, rng: &mut R) -> Option<Scratch> {
        if !self.is_interactive() {
            return None;
        }
        self.surface.begin_stroke();
        self.scratch(at, rng)
    }

    pub fn pointer_move<R: Rng + ?Sized>(&mut self, at: Point, rng: &mut R) -> Option<Scratch> {
        if !self.is_interactive() {
            return None;
        }
        self.scratch(at, rng)
    }

    pub fn pointer_up(&mut self) {
        self.surface.end_stroke();
    }

    fn scratch<R: Rng + ?Sized>(&mut self, at: Point, rng: &mut R) -> Option<Scratch> {
        let mark = self.surface.scratch(at, rng)?;
        Some(Scratch {
            mark,
            signal: self.record_scratch(at),
        })
    }

    /// Feed one scratch position to the hotspot tracker.
    pub fn record_scratch(&mut self, at: Point) -> Option<TicketSignal> {
        if !self.is_winner || self.completed() || !self.is_interactive() {
            return None;
        }
        if !self.hotspots.record_scratch(&self.layout, at) {
            return None;
        }
        tracing::info!(ticket = %self.id, "winning icons fully revealed");
        Some(TicketSignal::Revealed {
            ticket: self.id,
            delay_ms: self.reveal_delay_ms,
        })
    }

    /// User dismissal. Returns `false` if the ticket was already leaving.
    pub fn begin_close(&mut self) -> bool {
        if self.phase != TicketPhase::Interactive {
            return false;
        }
        self.surface.end_stroke();
        self.phase = TicketPhase::Closing;
        true
    }

    /// Dismissal effect finished. Only the first call after `begin_close` signals.
    pub fn finish_close(&mut self) -> Option<TicketSignal> {
        if self.phase != TicketPhase::Closing {
            return None;
        }
        self.phase = TicketPhase::Closed;
        tracing::debug!(ticket = %self.id, winner = self.is_winner, "ticket closed");
        Some(TicketSignal::Closed {
            ticket: self.id,
            was_winner: self.is_winner,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn catalog() -> IconCatalog {
        IconCatalog::new(["A", "B", "C", "D", "E", "F", "G"].map(String::from).to_vec()).unwrap()
    }

    fn ticket(is_winner: bool, rng: &mut StdRng) -> Ticket {
        let grid = generate_grid(is_winner, &catalog(), rng);
        Ticket::new(
            TicketId(1),
            Draw { index: 0, is_winner },
            grid,
            "PRIZE".to_string(),
            Layout::default(),
            ScratchConfig::default(),
            3000,
        )
    }

    fn quadrant_point(layout: &Layout, slot: usize, q: usize) -> Point {
        let b = layout.slot_bounds(slot);
        let fx = if q % 2 == 1 { 0.75 } else { 0.25 };
        let fy = if q >= 2 { 0.75 } else { 0.25 };
        Point::new(b.x + b.w * fx, b.y + b.h * fy)
    }

    #[test]
    fn test_move_without_down_does_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut t = ticket(true, &mut rng);
        assert!(t.pointer_move(Point::new(200.0, 500.0), &mut rng).is_none());
        assert_eq!(t.surface().cleared_fraction(), 0.0);
    }

    #[test]
    fn test_winner_reveal_signals_once() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut t = ticket(true, &mut rng);
        let layout = t.layout().clone();
        let slots = t.winning_slots().to_vec();
        let mut signals = Vec::new();
        t.pointer_down(quadrant_point(&layout, slots[0], 0), &mut rng);
        for &slot in &slots {
            for q in 0..4 {
                let s = t.pointer_move(quadrant_point(&layout, slot, q), &mut rng).unwrap();
                signals.extend(s.signal);
            }
        }
        assert_eq!(
            signals,
            vec![TicketSignal::Revealed {
                ticket: TicketId(1),
                delay_ms: 3000
            }]
        );
        assert!(t.completed());
        assert!(t.record_scratch(quadrant_point(&layout, slots[2], 3)).is_none());
    }

    #[test]
    fn test_loser_never_reveals() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut t = ticket(false, &mut rng);
        t.pointer_down(Point::new(0.0, 0.0), &mut rng);
        for y in (0..1024).step_by(20) {
            for x in (0..817).step_by(20) {
                let s = t.pointer_move(Point::new(x as f64, y as f64), &mut rng).unwrap();
                assert!(s.signal.is_none());
            }
        }
        assert!(!t.completed());
        assert_eq!(t.hotspots().progress(), 0);
    }

    #[test]
    fn test_closed_ticket_ignores_scratches() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut t = ticket(true, &mut rng);
        let layout = t.layout().clone();
        let slots = t.winning_slots().to_vec();
        assert!(t.begin_close());
        for &slot in &slots {
            assert!(t.record_scratch(quadrant_point(&layout, slot, 0)).is_none());
        }
        assert!(t.finish_close().is_some());
        for &slot in &slots {
            for q in 0..4 {
                assert!(t.record_scratch(quadrant_point(&layout, slot, q)).is_none());
            }
        }
        assert_eq!(t.phase(), TicketPhase::Closed);
        assert!(!t.completed());
        assert_eq!(t.hotspots().progress(), 0);
    }

    #[test]
    fn test_close_lifecycle() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut t = ticket(true, &mut rng);
        assert!(t.finish_close().is_none());
        assert!(t.begin_close());
        assert!(!t.begin_close());
        assert_eq!(t.phase(), TicketPhase::Closing);
        assert!(t.pointer_down(Point::new(200.0, 500.0), &mut rng).is_none());
        assert_eq!(
            t.finish_close(),
            Some(TicketSignal::Closed {
                ticket: TicketId(1),
                was_winner: true
            })
        );
        assert!(t.finish_close().is_none());
        assert_eq!(t.phase(), TicketPhase::Closed);
    }

    #[test]
    fn test_close_ends_stroke() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut t = ticket(false, &mut rng);
        t.pointer_down(Point::new(100.0, 100.0), &mut rng);
        assert!(t.surface().stroke_active());
        t.begin_close();
        assert!(!t.surface().stroke_active());
    }
}
