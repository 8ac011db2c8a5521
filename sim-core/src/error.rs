//! Error taxonomy (§7).
//!
//! `NumericEdge` is intentionally absent here: it is handled inline by the
//! utility code via epsilon-shifts and sentinel bounds and never escapes
//! `crate::utility`. `CooldownRejection` is likewise absent: it is ordinary
//! control flow (`bargain::Outcome::Cooldown`), not an error.

use thiserror::Error;

use crate::types::AgentId;

/// Scenario validation failures. Raised before a `Simulation` is
/// constructed; never recovered from.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("unsupported scenario schema version: {0}")]
    SchemaVersionUnsupported(String),

    #[error("utility mix weights sum to {sum}, expected 1.0 within tolerance")]
    InvalidWeightSum { sum: f64 },

    #[error("invalid utility parameters for variant {variant}: {reason}")]
    InvalidUtilityParams { variant: String, reason: String },

    #[error("initial inventory for agent {agent_id} violates Stone-Geary subsistence: {reason}")]
    SubsistenceViolation { agent_id: AgentId, reason: String },

    #[error("resource density {density} is out of range [0, 1]")]
    DensityOutOfRange { density: f64 },

    #[error("initial inventory for agent {agent_id} is negative: {good}={amount}")]
    InventoryNegative {
        agent_id: AgentId,
        good: &'static str,
        amount: i64,
    },

    #[error("unknown exchange regime: {0}")]
    RegimeUnknown(String),
}

/// Asserted invariants from §8. A violation is fatal: the tick driver
/// flushes telemetry and then propagates (or panics in debug builds, per
/// §7) — this type is what it propagates with.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InvariantViolation {
    #[error("agent {agent_id} has negative inventory: A={a} B={b} M={m}")]
    NegativeInventory { agent_id: AgentId, a: i64, b: i64, m: i64 },

    #[error("pairing asymmetric: {a} points to {b:?} but {b} points to {a_back:?}")]
    AsymmetricPairing {
        a: AgentId,
        b: AgentId,
        a_back: Option<AgentId>,
    },

    #[error("conservation violated for good {good}: delta_i={delta_i} delta_j={delta_j}")]
    ConservationViolated {
        good: &'static str,
        delta_i: i64,
        delta_j: i64,
    },

    #[error("cell at ({x},{y}) is absent from the harvested active set but amount {amount} < original {original}")]
    StaleHarvestedSet {
        x: i32,
        y: i32,
        amount: u32,
        original: u32,
    },

    #[error("trade executed between {buyer} and {seller} did not strictly improve utility for {offender}")]
    NonImprovingTrade {
        buyer: AgentId,
        seller: AgentId,
        offender: AgentId,
    },

    #[error("target position for agent {agent_id} is out of grid bounds: ({x},{y})")]
    TargetOutOfBounds { agent_id: AgentId, x: i32, y: i32 },
}

/// A telemetry sink SHOULD NOT throw; if it does, the driver logs once per
/// sink and continues. This type carries the sink's own error message only.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("telemetry sink error: {0}")]
pub struct TelemetrySinkError(pub String);
