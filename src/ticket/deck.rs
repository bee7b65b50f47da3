//! Icon layout for a single ticket.
//!
//! Both outcomes draw from a "pair deck": two copies of every eligible icon,
//! uniformly shuffled. A pair deck can never put the same icon on three slots, so a
//! losing grid never shows a triple and a winning grid shows exactly one.

use rand::Rng;
use rand::seq::SliceRandom;
use rand::seq::index;

use crate::config::{MIN_CATALOG_SIZE, SLOT_COUNT};
use crate::error::{Result, ScratchError};

/// Number of matching icons on a winning ticket.
pub const WINNING_RUN: usize = 3;

/// Index of an icon in its [`IconCatalog`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IconId(pub usize);

/// Ordered, validated set of distinct icon names.
#[derive(Clone, Debug)]
pub struct IconCatalog {
    names: Vec<String>,
}

impl IconCatalog {
    pub fn new(names: Vec<String>) -> Result<Self> {
        if names.len() < MIN_CATALOG_SIZE {
            return Err(ScratchError::CatalogTooSmall {
                min: MIN_CATALOG_SIZE,
                have: names.len(),
            });
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(ScratchError::DuplicateIcon(name.clone()));
            }
        }
        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, id: IconId) -> &str {
        &self.names[id.0]
    }

    pub fn ids(&self) -> impl Iterator<Item = IconId> + '_ {
        (0..self.names.len()).map(IconId)
    }

    /// Two copies of every icon except `exclude`, uniformly shuffled.
    fn pair_deck<R: Rng + ?Sized>(&self, exclude: Option<IconId>, rng: &mut R) -> Vec<IconId> {
        let mut deck: Vec<IconId> = self
            .ids()
            .filter(|id| Some(*id) != exclude)
            .flat_map(|id| [id, id])
            .collect();
        // Fisher-Yates
        deck.shuffle(rng);
        deck
    }
}

/// A generated icon layout. `winning_slots` is sorted and empty for losers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    pub icons: [IconId; SLOT_COUNT],
    pub winning_slots: Vec<usize>,
}

impl Grid {
    /// Icon shared by the winning slots, if any.
    pub fn winning_icon(&self) -> Option<IconId> {
        self.winning_slots.first().map(|&s| self.icons[s])
    }

    /// How many slots each catalog icon occupies.
    pub fn counts(&self, catalog_len: usize) -> Vec<usize> {
        let mut counts = vec![0usize; catalog_len];
        for icon in self.icons {
            counts[icon.0] += 1;
        }
        counts
    }
}

/// Build the 12-slot layout for one ticket.
pub fn generate_grid<R: Rng + ?Sized>(is_winner: bool, catalog: &IconCatalog, rng: &mut R) -> Grid {
    if is_winner {
        winning_grid(catalog, rng)
    } else {
        losing_grid(catalog, rng)
    }
}

fn winning_grid<R: Rng + ?Sized>(catalog: &IconCatalog, rng: &mut R) -> Grid {
    let win_icon = IconId(rng.gen_range(0..catalog.len()));

    // Direct draw of 3 distinct slots out of 12.
    let mut winning_slots = index::sample(rng, SLOT_COUNT, WINNING_RUN).into_vec();
    winning_slots.sort_unstable();

    let deck = catalog.pair_deck(Some(win_icon), rng);
    // Catalog validation guarantees 2 * (len - 1) >= SLOT_COUNT - WINNING_RUN.
    debug_assert!(deck.len() >= SLOT_COUNT - WINNING_RUN);
    let mut fillers = deck.into_iter();
    let mut icons = [win_icon; SLOT_COUNT];
    for (slot, icon) in icons.iter_mut().enumerate() {
        if winning_slots.contains(&slot) {
            continue;
        }
        match fillers.next() {
            Some(filler) => *icon = filler,
            None => unreachable!("pair deck shorter than the non-winning slots"),
        }
    }

    Grid {
        icons,
        winning_slots,
    }
}

fn losing_grid<R: Rng + ?Sized>(catalog: &IconCatalog, rng: &mut R) -> Grid {
    let deck = catalog.pair_deck(None, rng);
    let mut icons = [IconId(0); SLOT_COUNT];
    icons.copy_from_slice(&deck[..SLOT_COUNT]);
    Grid {
        icons,
        winning_slots: Vec::new(),
    }
}
