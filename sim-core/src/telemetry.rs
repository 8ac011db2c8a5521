//! Telemetry sink interface (§6): the only boundary the core writes
//! through. Buffering, batching, and persistence are concerns of the sink
//! adapter, never of this crate — `TelemetrySink` methods take borrowed
//! data and return nothing the driver acts on.
//!
//! The reference `TracingSink` emits one `tracing::info!` event per
//! callback, gated behind `feature = "instrument"` exactly as the teacher
//! crate gates its own tracing calls, at a target string matching the
//! method name (`"trade_executed"`, `"decision"`, …). The `instrument`
//! crate's `DataFrameSubscriber` turns those targets into column-oriented
//! tables for tests; a non-tracing embedder implements `TelemetrySink`
//! directly against its own store (SQLite, append-only log, …) without the
//! core knowing the difference.

use crate::types::{AgentId, ExchangePair, ExchangeRegime, Mode, Position};

/// `STANDARD` covers trades, decisions, and cadenced snapshots. `DEBUG`
/// adds the per-iteration bargaining diagnostics from `on_trade_attempt`.
/// A legacy `SUMMARY` spelling maps to `STANDARD` rather than erroring,
/// since it names no information `STANDARD` doesn't already carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Standard,
    Debug,
}

impl LogLevel {
    pub fn parse(s: &str) -> Self {
        match s {
            "DEBUG" => LogLevel::Debug,
            _ => LogLevel::Standard,
        }
    }

    fn wants_trade_attempts(self) -> bool {
        self == LogLevel::Debug
    }
}

/// Snapshot cadence configuration. Zero disables the corresponding stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogConfig {
    pub level: LogLevel,
    pub agent_snapshot_frequency: u64,
    pub resource_snapshot_frequency: u64,
}

impl LogConfig {
    pub fn standard() -> Self {
        Self { level: LogLevel::Standard, agent_snapshot_frequency: 0, resource_snapshot_frequency: 0 }
    }

    fn due(frequency: u64, tick: u64) -> bool {
        frequency != 0 && tick % frequency == 0
    }
}

/// Per-iteration bargaining diagnostics (§6 `on_trade_attempt`). Mirrors
/// the payload shape of the original `_trade_attempt_logger.py`: buyer and
/// seller inventory/utility before and after the candidate block, plus
/// the feasibility flags that decided whether it was kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeAttempt {
    pub tick: u64,
    pub buyer_id: AgentId,
    pub seller_id: AgentId,
    pub pair: ExchangePair,
    pub price: f64,
    pub da: u32,
    pub d_unit: u32,
    pub buyer_utility_before: f64,
    pub buyer_utility_after: f64,
    pub seller_utility_before: f64,
    pub seller_utility_after: f64,
    pub buyer_feasible: bool,
    pub seller_feasible: bool,
    pub accepted: bool,
}

/// The narrow interface the tick driver writes through. A sink SHOULD NOT
/// throw (§7); the default methods are no-ops so an embedder only
/// overrides the streams it cares about.
pub trait TelemetrySink {
    fn on_run_start(&mut self, _scenario_fingerprint: u64, _seed: u64) {}
    fn on_tick_state(&mut self, _tick: u64, _mode: Mode, _regime: ExchangeRegime) {}
    fn on_mode_change(&mut self, _tick: u64, _old_mode: Mode, _new_mode: Mode) {}
    fn on_agent_snapshot(
        &mut self,
        _tick: u64,
        _agent_id: AgentId,
        _pos: Position,
        _a: u32,
        _b: u32,
        _m: u32,
        _utility_tag: &str,
        _target_pos: Option<Position>,
    ) {
    }
    fn on_resource_snapshot(&mut self, _tick: u64, _pos: Position, _resource: Option<&str>, _amount: u32) {}
    #[allow(clippy::too_many_arguments)]
    fn on_decision(
        &mut self,
        _tick: u64,
        _agent_id: AgentId,
        _chosen_partner_id: Option<AgentId>,
        _surplus: f64,
        _target_type: &str,
        _target_pos: Option<Position>,
        _num_neighbors: usize,
    ) {
    }
    fn on_trade_attempt(&mut self, _attempt: &TradeAttempt) {}
    #[allow(clippy::too_many_arguments)]
    fn on_trade_executed(
        &mut self,
        _tick: u64,
        _buyer_id: AgentId,
        _seller_id: AgentId,
        _pos: Position,
        _da: u32,
        _d_unit: u32,
        _price: f64,
        _pair: ExchangePair,
        _buyer_lambda: f64,
        _seller_lambda: f64,
    ) {
    }
    fn on_run_end(&mut self, _tick: u64) {}

    /// Flushes any buffered state. MUST be idempotent — a second call is a
    /// no-op. The default is already idempotent since it does nothing.
    fn close(&mut self) {}
}

/// Sink that discards everything. Useful for scenarios (benchmarks, fuzz
/// harnesses) that want the tick driver's invariant checks without paying
/// for any telemetry construction.
#[derive(Debug, Default)]
pub struct NullSink;

impl TelemetrySink for NullSink {}

/// Reference sink: one `tracing::info!` event per callback, each at a
/// target matching the callback's concern so a `tracing::Subscriber` (the
/// `instrument` crate's `DataFrameSubscriber`, or any other) can route
/// rows into per-concern tables without this crate knowing about tables.
///
/// `closed` guards idempotent `close()` per §6; a `TelemetrySink::close`
/// called twice emits `on_run_end` only once.
#[derive(Debug)]
pub struct TracingSink {
    config: LogConfig,
    closed: bool,
}

impl TracingSink {
    pub fn new(config: LogConfig) -> Self {
        Self { config, closed: false }
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new(LogConfig::standard())
    }
}

impl TelemetrySink for TracingSink {
    fn on_run_start(&mut self, scenario_fingerprint: u64, seed: u64) {
        #[cfg(feature = "instrument")]
        tracing::info!(target: "run_start", scenario_fingerprint = scenario_fingerprint, seed = seed);
        #[cfg(not(feature = "instrument"))]
        let _ = (scenario_fingerprint, seed);
    }

    fn on_tick_state(&mut self, tick: u64, mode: Mode, regime: ExchangeRegime) {
        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "tick_state",
            tick = tick,
            mode = mode_tag(mode),
            regime = regime_tag(regime),
        );
        #[cfg(not(feature = "instrument"))]
        let _ = (tick, mode, regime);
    }

    fn on_mode_change(&mut self, tick: u64, old_mode: Mode, new_mode: Mode) {
        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "mode_change",
            tick = tick,
            old_mode = mode_tag(old_mode),
            new_mode = mode_tag(new_mode),
        );
        #[cfg(not(feature = "instrument"))]
        let _ = (tick, old_mode, new_mode);
    }

    fn on_agent_snapshot(
        &mut self,
        tick: u64,
        agent_id: AgentId,
        pos: Position,
        a: u32,
        b: u32,
        m: u32,
        utility_tag: &str,
        target_pos: Option<Position>,
    ) {
        if !LogConfig::due(self.config.agent_snapshot_frequency, tick) {
            return;
        }
        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "agent_snapshot",
            tick = tick,
            agent_id = agent_id,
            x = pos.x,
            y = pos.y,
            a = a,
            b = b,
            m = m,
            utility = utility_tag,
            target_x = target_pos.map(|p| p.x).unwrap_or(-1),
            target_y = target_pos.map(|p| p.y).unwrap_or(-1),
        );
        #[cfg(not(feature = "instrument"))]
        let _ = (tick, agent_id, pos, a, b, m, utility_tag, target_pos);
    }

    fn on_resource_snapshot(&mut self, tick: u64, pos: Position, resource: Option<&str>, amount: u32) {
        if !LogConfig::due(self.config.resource_snapshot_frequency, tick) {
            return;
        }
        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "resource_snapshot",
            tick = tick,
            x = pos.x,
            y = pos.y,
            resource = resource.unwrap_or("none"),
            amount = amount,
        );
        #[cfg(not(feature = "instrument"))]
        let _ = (tick, pos, resource, amount);
    }

    fn on_decision(
        &mut self,
        tick: u64,
        agent_id: AgentId,
        chosen_partner_id: Option<AgentId>,
        surplus: f64,
        target_type: &str,
        target_pos: Option<Position>,
        num_neighbors: usize,
    ) {
        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "decision",
            tick = tick,
            agent_id = agent_id,
            chosen_partner_id = chosen_partner_id.map(|id| id as i64).unwrap_or(-1),
            surplus = surplus,
            target_type = target_type,
            target_x = target_pos.map(|p| p.x).unwrap_or(-1),
            target_y = target_pos.map(|p| p.y).unwrap_or(-1),
            num_neighbors = num_neighbors as u64,
        );
        #[cfg(not(feature = "instrument"))]
        let _ = (tick, agent_id, chosen_partner_id, surplus, target_type, target_pos, num_neighbors);
    }

    fn on_trade_attempt(&mut self, attempt: &TradeAttempt) {
        if !self.config.level.wants_trade_attempts() {
            return;
        }
        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "trade_attempt",
            tick = attempt.tick,
            buyer_id = attempt.buyer_id,
            seller_id = attempt.seller_id,
            pair = pair_tag(attempt.pair),
            price = attempt.price,
            da = attempt.da,
            d_unit = attempt.d_unit,
            buyer_utility_before = attempt.buyer_utility_before,
            buyer_utility_after = attempt.buyer_utility_after,
            seller_utility_before = attempt.seller_utility_before,
            seller_utility_after = attempt.seller_utility_after,
            buyer_feasible = attempt.buyer_feasible,
            seller_feasible = attempt.seller_feasible,
            accepted = attempt.accepted,
        );
        #[cfg(not(feature = "instrument"))]
        let _ = attempt;
    }

    fn on_trade_executed(
        &mut self,
        tick: u64,
        buyer_id: AgentId,
        seller_id: AgentId,
        pos: Position,
        da: u32,
        d_unit: u32,
        price: f64,
        pair: ExchangePair,
        buyer_lambda: f64,
        seller_lambda: f64,
    ) {
        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "trade_executed",
            tick = tick,
            buyer_id = buyer_id,
            seller_id = seller_id,
            x = pos.x,
            y = pos.y,
            da = da,
            d_unit = d_unit,
            price = price,
            pair = pair_tag(pair),
            buyer_lambda = buyer_lambda,
            seller_lambda = seller_lambda,
        );
        #[cfg(not(feature = "instrument"))]
        let _ = (tick, buyer_id, seller_id, pos, da, d_unit, price, pair, buyer_lambda, seller_lambda);
    }

    fn on_run_end(&mut self, tick: u64) {
        #[cfg(feature = "instrument")]
        tracing::info!(target: "run_end", tick = tick);
        #[cfg(not(feature = "instrument"))]
        let _ = tick;
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
    }
}

fn mode_tag(mode: Mode) -> &'static str {
    match mode {
        Mode::Forage => "forage",
        Mode::Trade => "trade",
        Mode::Both => "both",
    }
}

fn regime_tag(regime: ExchangeRegime) -> &'static str {
    match regime {
        ExchangeRegime::BarterOnly => "barter_only",
        ExchangeRegime::MoneyOnly => "money_only",
        ExchangeRegime::Mixed => "mixed",
    }
}

fn pair_tag(pair: ExchangePair) -> &'static str {
    match pair {
        ExchangePair::AB => "a_in_b",
        ExchangePair::AM => "a_in_m",
        ExchangePair::BM => "b_in_m",
    }
}
