//! Decides which ticket index is the next guaranteed winner.
//!
//! Pseudo-random only. The schedule is consulted once per spawn and never touches
//! tickets that already exist.

use rand::Rng;

use crate::config::ScheduleConfig;

/// Outcome handed to a freshly spawned ticket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Draw {
    pub index: u64,
    pub is_winner: bool,
}

#[derive(Clone, Debug)]
pub struct OutcomeScheduler {
    config: ScheduleConfig,
    tickets_opened: u64,
    next_win_at: u64,
}

impl OutcomeScheduler {
    pub fn new<R: Rng + ?Sized>(config: ScheduleConfig, rng: &mut R) -> Self {
        let next_win_at = config.first_win_min + rng.gen_range(0..config.first_win_spread);
        Self::with_next_win(config, next_win_at)
    }

    /// Start with a fixed first winner index.
    pub fn with_next_win(config: ScheduleConfig, next_win_at: u64) -> Self {
        Self {
            config,
            tickets_opened: 0,
            next_win_at,
        }
    }

    pub fn tickets_opened(&self) -> u64 {
        self.tickets_opened
    }

    pub fn next_win_at(&self) -> u64 {
        self.next_win_at
    }

    /// Whether the ticket about to be spawned wins.
    pub fn should_win(&self) -> bool {
        self.tickets_opened == self.next_win_at
    }

    /// Record a spawn. A win re-arms the schedule at least `cooldown` tickets later.
    pub fn advance<R: Rng + ?Sized>(&mut self, was_winner: bool, rng: &mut R) {
        if was_winner {
            self.next_win_at =
                self.tickets_opened + self.config.cooldown + rng.gen_range(0..self.config.gap_spread);
            tracing::debug!(
                winner = self.tickets_opened,
                next = self.next_win_at,
                "outcome schedule re-armed"
            );
        }
        self.tickets_opened += 1;
    }

    /// Read-then-advance in one step; the only way a spawn should consult the schedule.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Draw {
        let draw = Draw {
            index: self.tickets_opened,
            is_winner: self.should_win(),
        };
        self.advance(draw.is_winner, rng);
        draw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_first_winner_in_default_range() {
        let mut seen = std::collections::HashSet::new();
        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let s = OutcomeScheduler::new(ScheduleConfig::default(), &mut rng);
            assert!((2..=4).contains(&s.next_win_at()));
            seen.insert(s.next_win_at());
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_fixed_start_wins_at_index_two() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut s = OutcomeScheduler::with_next_win(ScheduleConfig::default(), 2);
        let draws: Vec<Draw> = (0..4).map(|_| s.draw(&mut rng)).collect();
        assert_eq!(
            draws.iter().map(|d| d.is_winner).collect::<Vec<_>>(),
            vec![false, false, true, false]
        );
        assert_eq!(draws[2].index, 2);
        assert!(s.next_win_at() >= 4);
        assert!(s.next_win_at() <= 7);
        assert_eq!(s.tickets_opened(), 4);
    }

    #[test]
    fn test_winners_respect_cooldown() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut s = OutcomeScheduler::new(ScheduleConfig::default(), &mut rng);
            let winners: Vec<u64> = (0..500)
                .map(|_| s.draw(&mut rng))
                .filter(|d| d.is_winner)
                .map(|d| d.index)
                .collect();
            assert!(winners.len() > 50);
            for pair in winners.windows(2) {
                let gap = pair[1] - pair[0];
                assert!((2..=5).contains(&gap), "gap {gap} out of range");
            }
        }
    }

    #[test]
    fn test_should_win_does_not_advance() {
        let s = OutcomeScheduler::with_next_win(ScheduleConfig::default(), 0);
        assert!(s.should_win());
        assert!(s.should_win());
        assert_eq!(s.tickets_opened(), 0);
    }

    #[test]
    fn test_losing_advance_keeps_target() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut s = OutcomeScheduler::with_next_win(ScheduleConfig::default(), 3);
        s.advance(false, &mut rng);
        s.advance(false, &mut rng);
        assert_eq!(s.next_win_at(), 3);
        assert_eq!(s.tickets_opened(), 2);
    }
}
