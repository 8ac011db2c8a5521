//! Core identifiers and small value types shared across the engine.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Dense, non-negative agent identifier. Stable for the lifetime of a run.
pub type AgentId = u32;

/// Integer grid coordinate. The grid is not toroidal; positions are clamped
/// to `[0, N)` in both axes by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev (square/"king move") distance.
    pub fn chebyshev_distance(self, other: Position) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Manhattan distance.
    pub fn manhattan_distance(self, other: Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// Radius metric fixed at spatial-index construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceMetric {
    Chebyshev,
    Manhattan,
}

impl DistanceMetric {
    pub fn distance(self, a: Position, b: Position) -> i32 {
        match self {
            DistanceMetric::Chebyshev => a.chebyshev_distance(b),
            DistanceMetric::Manhattan => a.manhattan_distance(b),
        }
    }
}

/// One of the three goods an agent may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Good {
    A,
    B,
    M,
}

/// Non-negative holdings of A, B, and (optionally used) M.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub a: u32,
    pub b: u32,
    pub m: u32,
}

impl Inventory {
    pub fn new(a: u32, b: u32, m: u32) -> Self {
        Self { a, b, m }
    }

    pub fn get(&self, good: Good) -> u32 {
        match good {
            Good::A => self.a,
            Good::B => self.b,
            Good::M => self.m,
        }
    }
}

/// One of the three tradeable pairs. Ordering here is also the tie-break
/// order used by the bargaining protocol (§4.9 step 4: A↔B < A↔M < B↔M).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub enum ExchangePair {
    AB,
    AM,
    BM,
}

impl ExchangePair {
    pub const ALL_IN_PRIORITY_ORDER: [ExchangePair; 3] =
        [ExchangePair::AB, ExchangePair::AM, ExchangePair::BM];

    /// The two goods involved, as (priced good, unit-of-account good).
    pub fn goods(self) -> (Good, Good) {
        match self {
            ExchangePair::AB => (Good::A, Good::B),
            ExchangePair::AM => (Good::A, Good::M),
            ExchangePair::BM => (Good::B, Good::M),
        }
    }
}

/// Scenario-wide filter over which exchange pairs are visible to the quote
/// engine and bargaining protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExchangeRegime {
    BarterOnly,
    MoneyOnly,
    Mixed,
}

impl ExchangeRegime {
    /// Pairs the regime permits, in bargaining tie-break order.
    pub fn allowed_pairs(self) -> &'static [ExchangePair] {
        match self {
            ExchangeRegime::BarterOnly => &[ExchangePair::AB],
            ExchangeRegime::MoneyOnly => &[ExchangePair::AM, ExchangePair::BM],
            ExchangeRegime::Mixed => &ExchangePair::ALL_IN_PRIORITY_ORDER,
        }
    }

    /// Parses the scenario-config spelling of a regime. Kept as an
    /// explicit parse (rather than relying on serde's enum matching) so an
    /// unrecognized value surfaces as `ConfigError::RegimeUnknown` during
    /// `ScenarioConfig::validate`, not as a raw deserialize error.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s {
            "barter_only" => Ok(ExchangeRegime::BarterOnly),
            "money_only" => Ok(ExchangeRegime::MoneyOnly),
            "mixed" => Ok(ExchangeRegime::Mixed),
            other => Err(ConfigError::RegimeUnknown(other.to_string())),
        }
    }
}

/// Per-tick global flag controlled by the mode scheduler (§4.11).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Forage,
    Trade,
    Both,
}

impl Mode {
    pub fn forage_active(self) -> bool {
        matches!(self, Mode::Forage | Mode::Both)
    }

    pub fn trade_active(self) -> bool {
        matches!(self, Mode::Trade | Mode::Both)
    }
}
