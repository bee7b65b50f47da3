//! Scratch Ticket core crate.
//!
//! An animated scratch-off lottery ticket widget. The engine under [`ticket`]
//! decides outcomes, lays out icons and tracks how much of each winning icon has
//! been scratched free; [`scene`] puts tickets on a canvas in the page and turns
//! engine signals into DOM events. Intro, dialogue, audio and confetti belong to
//! the page and listen for `scratcher:revealed` / `scratcher:closed`.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod logging;
pub mod scene;
pub mod ticket;

pub use config::{EngineConfig, Layout, Point, Rect};
pub use error::{Result, ScratchError};
pub use ticket::{Ticket, TicketBooth, TicketId, TicketPhase, TicketSignal};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logging::init();
}

// -----------------------------------------------------------------------------
// Default icon catalog. Artwork lives at `img/icons/<NAME>.png`.
// -----------------------------------------------------------------------------

pub const ICON_CATALOG: &[&str] = &["BONE", "FOOT", "JAW", "RIB", "SKULL", "SPIKE", "SPINE"];
