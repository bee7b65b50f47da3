//! Spawns tickets and routes pointer input between them.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::deck::{IconCatalog, generate_grid};
use super::prize::{PrizeBook, decorative_code};
use super::schedule::OutcomeScheduler;
use super::{Scratch, Ticket, TicketId, TicketSignal};
use crate::config::{EngineConfig, Point};
use crate::error::{Result, ScratchError};

pub struct TicketBooth<R: Rng = StdRng> {
    config: EngineConfig,
    catalog: IconCatalog,
    schedule: OutcomeScheduler,
    prizes: PrizeBook,
    rng: R,
    /// Live tickets in stacking order; the last one is on top.
    tickets: Vec<Ticket>,
    next_id: u32,
    /// Ticket that owns the current pointer stroke.
    stroke_owner: Option<TicketId>,
}

impl TicketBooth<StdRng> {
    /// Booth seeded from the platform entropy source.
    pub fn from_entropy(config: EngineConfig, prizes: PrizeBook) -> Result<Self> {
        Self::new(config, prizes, StdRng::from_entropy())
    }
}

impl<R: Rng> TicketBooth<R> {
    /// Validates `config` up front: a bad catalog fails here, never at spawn time.
    pub fn new(config: EngineConfig, prizes: PrizeBook, mut rng: R) -> Result<Self> {
        config.validate()?;
        let catalog = IconCatalog::new(config.icons.clone())?;
        let schedule = OutcomeScheduler::new(config.schedule.clone(), &mut rng);
        tracing::info!(
            icons = catalog.len(),
            first_winner = schedule.next_win_at(),
            "ticket booth ready"
        );
        Ok(Self::assemble(config, catalog, schedule, prizes, rng))
    }

    /// Like [`TicketBooth::new`] with a fixed first winner index.
    pub fn with_first_winner(
        config: EngineConfig,
        prizes: PrizeBook,
        rng: R,
        next_win_at: u64,
    ) -> Result<Self> {
        config.validate()?;
        let catalog = IconCatalog::new(config.icons.clone())?;
        let schedule = OutcomeScheduler::with_next_win(config.schedule.clone(), next_win_at);
        Ok(Self::assemble(config, catalog, schedule, prizes, rng))
    }

    fn assemble(
        config: EngineConfig,
        catalog: IconCatalog,
        schedule: OutcomeScheduler,
        prizes: PrizeBook,
        rng: R,
    ) -> Self {
        Self {
            config,
            catalog,
            schedule,
            prizes,
            rng,
            tickets: Vec::new(),
            next_id: 0,
            stroke_owner: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &IconCatalog {
        &self.catalog
    }

    pub fn schedule(&self) -> &OutcomeScheduler {
        &self.schedule
    }

    /// Live tickets, bottom to top.
    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    pub fn ticket(&self, id: TicketId) -> Result<&Ticket> {
        self.tickets
            .iter()
            .find(|t| t.id() == id)
            .ok_or(ScratchError::TicketNotFound(id))
    }

    fn ticket_mut(&mut self, id: TicketId) -> Option<&mut Ticket> {
        self.tickets.iter_mut().find(|t| t.id() == id)
    }

    pub fn stroke_owner(&self) -> Option<TicketId> {
        self.stroke_owner
    }

    /// Create the next ticket and place it on top of the stack.
    pub fn spawn(&mut self) -> TicketId {
        let draw = self.schedule.draw(&mut self.rng);
        let prize_text = if draw.is_winner {
            self.prizes.next_prize()
        } else {
            decorative_code(&mut self.rng)
        };
        let grid = generate_grid(draw.is_winner, &self.catalog, &mut self.rng);

        let id = TicketId(self.next_id);
        self.next_id += 1;
        tracing::info!(
            ticket = %id,
            index = draw.index,
            winner = draw.is_winner,
            next_winner = self.schedule.next_win_at(),
            "ticket spawned"
        );
        self.tickets.push(Ticket::new(
            id,
            draw,
            grid,
            prize_text,
            self.config.layout.clone(),
            self.config.scratch.clone(),
            self.config.timing.reveal_delay_ms,
        ));
        id
    }

    /// Start a stroke on `id`, taking the stroke away from any other ticket.
    pub fn pointer_down(&mut self, id: TicketId, at: Point) -> Option<Scratch> {
        self.pointer_up();
        let rng = &mut self.rng;
        let ticket = self.tickets.iter_mut().find(|t| t.id() == id)?;
        let scratch = ticket.pointer_down(at, rng);
        if ticket.surface().stroke_active() {
            self.stroke_owner = Some(id);
        }
        scratch
    }

    /// Continue the stroke; ignored unless `id` owns it.
    pub fn pointer_move(&mut self, id: TicketId, at: Point) -> Option<Scratch> {
        if self.stroke_owner != Some(id) {
            return None;
        }
        let rng = &mut self.rng;
        let ticket = self.tickets.iter_mut().find(|t| t.id() == id)?;
        ticket.pointer_move(at, rng)
    }

    /// End the current stroke, whichever ticket owns it.
    pub fn pointer_up(&mut self) {
        if let Some(owner) = self.stroke_owner.take() {
            if let Some(ticket) = self.ticket_mut(owner) {
                ticket.pointer_up();
            }
        }
    }

    /// Begin dismissing `id`. Returns the delay before [`TicketBooth::finish_close`]
    /// should be called, or `None` if the ticket is unknown or already leaving.
    pub fn close(&mut self, id: TicketId) -> Option<u32> {
        if self.stroke_owner == Some(id) {
            self.stroke_owner = None;
        }
        let ticket = self.ticket_mut(id)?;
        if !ticket.begin_close() {
            return None;
        }
        Some(self.config.timing.close_delay_ms)
    }

    /// Remove a closing ticket from the stack and report how it went.
    pub fn finish_close(&mut self, id: TicketId) -> Option<TicketSignal> {
        let pos = self.tickets.iter().position(|t| t.id() == id)?;
        let signal = self.tickets[pos].finish_close()?;
        self.tickets.remove(pos);
        Some(signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PrizeConfig;

    fn booth(first_winner: u64) -> TicketBooth<StdRng> {
        let cfg = EngineConfig::default();
        let prizes = PrizeBook::offline(&cfg.prizes);
        TicketBooth::with_first_winner(cfg, prizes, StdRng::seed_from_u64(7), first_winner).unwrap()
    }

    #[test]
    fn test_rejects_small_catalog_at_startup() {
        let cfg = EngineConfig {
            icons: vec!["A".into(), "B".into()],
            ..EngineConfig::default()
        };
        let prizes = PrizeBook::offline(&PrizeConfig::default());
        assert!(matches!(
            TicketBooth::new(cfg, prizes, StdRng::seed_from_u64(0)),
            Err(ScratchError::CatalogTooSmall { .. })
        ));
    }

    #[test]
    fn test_spawn_order_and_prize_text() {
        let mut b = booth(2);
        let ids: Vec<TicketId> = (0..4).map(|_| b.spawn()).collect();
        let winners: Vec<bool> = ids.iter().map(|&id| b.ticket(id).unwrap().is_winner()).collect();
        assert_eq!(winners, vec![false, false, true, false]);
        assert_eq!(b.ticket(ids[2]).unwrap().prize_text(), "OFFLINE-MODE");
        assert_eq!(b.ticket(ids[0]).unwrap().prize_text().len(), 17);
        assert!(b.schedule().next_win_at() >= 4);
        assert_eq!(b.tickets().last().unwrap().id(), ids[3]);
    }

    #[test]
    fn test_move_routed_only_to_stroke_owner() {
        let mut b = booth(0);
        let a = b.spawn();
        let c = b.spawn();
        assert!(b.pointer_down(a, Point::new(100.0, 100.0)).is_some());
        assert!(b.pointer_move(c, Point::new(100.0, 100.0)).is_none());
        assert!(!b.ticket(c).unwrap().surface().is_cleared(Point::new(100.0, 100.0)));
        assert!(b.pointer_move(a, Point::new(140.0, 100.0)).is_some());

        b.pointer_down(c, Point::new(300.0, 300.0));
        assert_eq!(b.stroke_owner(), Some(c));
        assert!(!b.ticket(a).unwrap().surface().stroke_active());
        assert!(b.pointer_move(a, Point::new(300.0, 300.0)).is_none());

        b.pointer_up();
        assert_eq!(b.stroke_owner(), None);
        assert!(b.pointer_move(c, Point::new(310.0, 300.0)).is_none());
    }

    #[test]
    fn test_close_mid_stroke_and_late_events() {
        let mut b = booth(0);
        let id = b.spawn();
        b.pointer_down(id, Point::new(100.0, 100.0));
        assert_eq!(b.close(id), Some(700));
        assert_eq!(b.close(id), None);
        assert_eq!(b.stroke_owner(), None);
        assert!(b.pointer_move(id, Point::new(120.0, 100.0)).is_none());
        assert_eq!(
            b.finish_close(id),
            Some(TicketSignal::Closed {
                ticket: id,
                was_winner: true
            })
        );
        assert!(b.tickets().is_empty());
        assert!(b.finish_close(id).is_none());
        assert!(b.pointer_down(id, Point::new(100.0, 100.0)).is_none());
        b.pointer_up();
        assert!(matches!(b.ticket(id), Err(ScratchError::TicketNotFound(_))));
    }

    #[test]
    fn test_finish_close_requires_close() {
        let mut b = booth(5);
        let id = b.spawn();
        assert!(b.finish_close(id).is_none());
        assert_eq!(b.tickets().len(), 1);
    }
}
