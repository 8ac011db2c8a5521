//! Deterministic agent-based economic sandbox
//!
//! This crate simulates a population of agents scattered across a 2D grid who
//! forage resources, perceive their neighbors, pick trading partners, and
//! settle bilateral trades through a compensating-block bargaining protocol.
//! Given the same seed and scenario, a run reproduces bit-identical agent
//! trajectories.
//!
//! ## Agents
//!
//! Each **agent** holds an inventory of two priced goods (`A`, `B`) and an
//! optional unit-of-account good (`M`), a utility function drawn from one of
//! five functional forms, and a position on the grid. Agents are mechanical —
//! there is no player or AI control here, only the rules in this crate:
//!
//! - **Perception** builds a local view of neighboring agents and resource
//!   cells within vision radius.
//! - **Decision/Search** picks a movement target — a resource to forage or an
//!   agent to approach for trade — via a pluggable [`search::SearchProtocol`].
//! - **Matching** pairs adjacent, mutually interested agents for the tick via
//!   a pluggable [`matching::MatchingProtocol`].
//! - **Bargaining** searches the paired agents' exchange pairs for the best
//!   mutually-improving integer trade block via a pluggable
//!   [`bargain::BargainingProtocol`], or cools the pairing down if none
//!   exists.
//!
//! ## World
//!
//! The [`world::World`] owns the agent roster, the resource [`grid::Grid`],
//! the [`spatial::SpatialIndex`], and the run's [`rng::RngStreams`]. It is
//! built once from a validated [`scenario::ScenarioConfig`] and then mutated
//! tick by tick by the [`tick::Simulation`] driver.
//!
//! ## Mode schedule
//!
//! A [`mode::ModeScheduler`] alternates the world between foraging and
//! trading ticks (or runs both every tick), so a scenario can model, say, a
//! morning foraging bout followed by an afternoon market.
//!
//! ## Telemetry
//!
//! The [`telemetry::TelemetrySink`] trait is the crate's only output seam —
//! callers observe a run through its callbacks rather than by reaching into
//! `World` between ticks. [`telemetry::NullSink`] discards everything;
//! [`telemetry::TracingSink`] logs through `tracing`, gated by the
//! `instrument` feature.
//!
//! ## Module structure
//!
//! - `types`      Core type definitions (IDs, goods, exchange pairs, regimes)
//! - `utility`    Five utility functional forms behind one dispatch enum
//! - `money`      Unit-of-account utility and money regime parameters
//! - `quotes`     Per-agent reservation quotes derived from utility + inventory
//! - `grid`       Resource cells, harvesting, and regeneration
//! - `spatial`    Neighbor and occupancy queries over agent positions
//! - `agent`      Per-agent state carried across ticks
//! - `perception` Builds each agent's local view of neighbors and resources
//! - `search`     Movement-target decision protocol
//! - `matching`   Trading-partner pairing protocol
//! - `bargain`    Compensating-block bargaining protocol
//! - `movement`   Applies a decided target to an agent's position
//! - `mode`       Forage/trade mode scheduling
//! - `rng`        Deterministic per-subsystem RNG sub-streams
//! - `scenario`   Scenario configuration and validation
//! - `error`      Typed configuration and invariant-violation errors
//! - `telemetry`  Pluggable run-observation sink
//! - `tick`       Simulation construction and the ten-phase tick loop
//! - `world`      World state container

pub mod agent;
pub mod bargain;
pub mod error;
pub mod grid;
#[cfg(feature = "instrument")]
pub use instrument;
pub mod matching;
pub mod mode;
pub mod money;
pub mod movement;
pub mod perception;
pub mod quotes;
pub mod rng;
pub mod scenario;
pub mod search;
pub mod spatial;
pub mod telemetry;
pub mod tick;
pub mod types;
pub mod utility;
pub mod world;

// Re-export commonly used types at the crate root

// Core types
pub use types::{
    AgentId, DistanceMetric, ExchangePair, ExchangeRegime, Good, Inventory, Mode, Position,
};

// Agents
pub use agent::Agent;

// Utility
pub use utility::{Ces, Linear, Quadratic, StoneGeary, Translog, Utility, DEMAND_INFINITY};

// Money
pub use money::{MoneyParams, MoneyUtilityForm};

// Quotes
pub use quotes::{compute_quotes, filter_quotes_by_regime, Quote, QuoteSet};

// Grid
pub use grid::{Cell, Grid, ResourceKind};

// Spatial
pub use spatial::SpatialIndex;

// Perception
pub use perception::{perceive, PerceptionCache, VisibleAgent, VisibleResource};

// Search
pub use search::{SearchContext, SearchProtocol, TargetIntent};

// Matching
pub use matching::MatchingProtocol;

// Bargain
pub use bargain::{BargainingProtocol, Outcome, TradeRecord};

// Movement
pub use movement::move_agent;

// Mode
pub use mode::{ModeSchedule, ModeScheduler};

// RNG
pub use rng::RngStreams;

// Scenario
pub use scenario::ScenarioConfig;

// Errors
pub use error::{ConfigError, InvariantViolation, TelemetrySinkError};

// Telemetry
pub use telemetry::{LogConfig, LogLevel, NullSink, TelemetrySink, TracingSink};

// World
pub use world::World;

// Tick
pub use tick::{new_simulation, Simulation, SimulationBuilder};
