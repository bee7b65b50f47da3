//! Engine configuration.
//!
//! Every value has a default matching the shipped ticket artwork (817x1024 native
//! surface, 3x4 icon grid, seven skeleton icons). A JSON document may override any
//! subset of fields; call [`EngineConfig::validate`] once at startup so a bad catalog
//! or layout fails before the first ticket is ever requested.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScratchError};
use crate::ticket::IconCatalog;

/// Rows of icon slots on a ticket.
pub const GRID_ROWS: usize = 3;
/// Columns of icon slots on a ticket.
pub const GRID_COLS: usize = 4;
/// Total icon slots on a ticket (row-major: slot = row * GRID_COLS + col).
pub const SLOT_COUNT: usize = GRID_ROWS * GRID_COLS;

/// Smallest catalog for which a pair deck can fill every slot of a losing ticket
/// (2 * 6 >= 12) and every non-winning slot of a winning ticket (2 * 5 >= 9).
pub const MIN_CATALOG_SIZE: usize = SLOT_COUNT / 2;

/// A point in native surface coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle (top-left origin).
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Inclusive on all four edges.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }

    /// `other` lies fully inside `self` and has finite coordinates.
    pub fn encloses(&self, other: &Rect) -> bool {
        let finite = [other.x, other.y, other.w, other.h].iter().all(|v| v.is_finite());
        finite
            && other.w >= 0.0
            && other.h >= 0.0
            && other.x >= self.x
            && other.y >= self.y
            && other.x + other.w <= self.x + self.w
            && other.y + other.h <= self.y + self.h
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

/// Pixel layout of the ticket artwork.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub surface_w: u32,
    pub surface_h: u32,
    /// Top edge of each slot row.
    pub rows: [f64; GRID_ROWS],
    /// Left edge of each slot column.
    pub cols: [f64; GRID_COLS],
    pub icon_w: f64,
    pub icon_h: f64,
    pub text_box: Rect,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            surface_w: 817,
            surface_h: 1024,
            rows: [467.0, 589.0, 711.0],
            cols: [91.0, 251.0, 411.0, 571.0],
            icon_w: 160.0,
            icon_h: 122.0,
            text_box: Rect::new(91.0, 862.0, 637.0, 98.0),
        }
    }
}

impl Layout {
    /// Bounding rectangle of a slot. Panics if `slot >= SLOT_COUNT`.
    pub fn slot_bounds(&self, slot: usize) -> Rect {
        let row = slot / GRID_COLS;
        let col = slot % GRID_COLS;
        Rect::new(self.cols[col], self.rows[row], self.icon_w, self.icon_h)
    }

    fn validate(&self) -> Result<()> {
        if self.surface_w == 0 || self.surface_h == 0 {
            return Err(ScratchError::InvalidLayout(format!(
                "surface must be non-empty, got {}x{}",
                self.surface_w, self.surface_h
            )));
        }
        if !(self.icon_w > 0.0 && self.icon_h > 0.0) {
            return Err(ScratchError::InvalidLayout(format!(
                "icon size must be positive, got {}x{}",
                self.icon_w, self.icon_h
            )));
        }
        let surface = Rect::new(0.0, 0.0, self.surface_w as f64, self.surface_h as f64);
        for slot in 0..SLOT_COUNT {
            let b = self.slot_bounds(slot);
            if !surface.encloses(&b) {
                return Err(ScratchError::InvalidLayout(format!(
                    "slot {slot} at {b:?} lies outside the {}x{} surface",
                    self.surface_w, self.surface_h
                )));
            }
        }
        if !surface.encloses(&self.text_box) {
            return Err(ScratchError::InvalidLayout(format!(
                "text box {:?} lies outside the {}x{} surface",
                self.text_box, self.surface_w, self.surface_h
            )));
        }
        Ok(())
    }
}

/// Winner scheduling knobs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// First winner index is `first_win_min + uniform(0..first_win_spread)`.
    pub first_win_min: u64,
    pub first_win_spread: u64,
    /// After a win at index `i`, the next winner is `i + cooldown + uniform(0..gap_spread)`.
    pub cooldown: u64,
    pub gap_spread: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            first_win_min: 2,
            first_win_spread: 3,
            cooldown: 2,
            gap_spread: 4,
        }
    }
}

impl ScheduleConfig {
    fn validate(&self) -> Result<()> {
        if self.cooldown < 2 {
            return Err(ScratchError::InvalidSchedule(format!(
                "cooldown must be at least 2, got {}",
                self.cooldown
            )));
        }
        if self.first_win_spread == 0 || self.gap_spread == 0 {
            return Err(ScratchError::InvalidSchedule(
                "spreads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Brush used when a pointer drags across the cover.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScratchConfig {
    pub radius: f64,
    pub jitter_radius: f64,
    /// Jitter disc centre is offset by `uniform[-jitter_spread, jitter_spread)` per axis.
    pub jitter_spread: f64,
    /// Side length, in native pixels, of one cell of the erasure mask.
    pub mask_cell: u32,
}

impl Default for ScratchConfig {
    fn default() -> Self {
        Self {
            radius: 30.0,
            jitter_radius: 20.0,
            jitter_spread: 20.0,
            mask_cell: 4,
        }
    }
}

impl ScratchConfig {
    fn validate(&self) -> Result<()> {
        if self.mask_cell == 0 {
            return Err(ScratchError::InvalidScratch(
                "mask cell must be at least 1 pixel".to_string(),
            ));
        }
        if self.radius < 0.0 || self.jitter_radius < 0.0 || self.jitter_spread < 0.0 {
            return Err(ScratchError::InvalidScratch(
                "radii and spread must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Deferred-callback delays, in milliseconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub reveal_delay_ms: u32,
    pub close_delay_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            reveal_delay_ms: 3000,
            close_delay_ms: 700,
        }
    }
}

/// Where prize codes come from and what to show when they don't.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrizeConfig {
    pub url: String,
    pub key: String,
    pub missing_sentinel: String,
    pub offline_sentinel: String,
}

impl Default for PrizeConfig {
    fn default() -> Self {
        Self {
            url: "data.json".to_string(),
            key: "xmas".to_string(),
            missing_sentinel: "ERROR-NO-DATA".to_string(),
            offline_sentinel: "OFFLINE-MODE".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub ticket_base: String,
    pub ticket_cover: String,
    /// `{NAME}` is replaced by the icon identifier.
    pub icon_template: String,
    pub font: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            ticket_base: "img/ticket_base.png".to_string(),
            ticket_cover: "img/ticket_covered.png".to_string(),
            icon_template: "img/icons/{NAME}.png".to_string(),
            font: "40px 'VT323'".to_string(),
        }
    }
}

impl AssetConfig {
    pub fn icon_path(&self, name: &str) -> String {
        self.icon_template.replace("{NAME}", name)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub icons: Vec<String>,
    pub layout: Layout,
    pub schedule: ScheduleConfig,
    pub scratch: ScratchConfig,
    pub timing: TimingConfig,
    pub prizes: PrizeConfig,
    pub assets: AssetConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            icons: crate::ICON_CATALOG.iter().map(|s| s.to_string()).collect(),
            layout: Layout::default(),
            schedule: ScheduleConfig::default(),
            scratch: ScratchConfig::default(),
            timing: TimingConfig::default(),
            prizes: PrizeConfig::default(),
            assets: AssetConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON override on top of the defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn validate(&self) -> Result<()> {
        IconCatalog::new(self.icons.clone())?;
        self.layout.validate()?;
        self.schedule.validate()?;
        self.scratch.validate()?;
        Ok(())
    }
}
