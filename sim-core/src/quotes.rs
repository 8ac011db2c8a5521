//! Quote engine (§4.3).
//!
//! Quotes may be mutated ONLY during Housekeeping, and only for agents
//! whose `inventory_changed` flag is set — this module computes quotes but
//! does not decide when to call itself; `tick::housekeeping` owns that.

use serde::{Deserialize, Serialize};

use crate::money::MoneyParams;
use crate::types::{ExchangePair, ExchangeRegime, Inventory};
use crate::utility::Utility;

/// Ask/bid plus the underlying reservation bounds they were derived from,
/// for one direction of one exchange pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub ask: f64,
    pub bid: f64,
    pub p_min: f64,
    pub p_max: f64,
}

impl Quote {
    fn from_bounds(p_min: f64, p_max: f64, spread: f64) -> Self {
        Self {
            ask: (p_min * (1.0 + spread)).max(0.0),
            bid: (p_max * (1.0 - spread)).max(0.0),
            p_min,
            p_max,
        }
    }
}

/// All four directional quotes an agent could publish, before regime
/// filtering. `None` means "not computed for this pair" (money pairs are
/// `None` whenever `m_0`/`lambda` make them meaningless — in practice they
/// are always `Some` once an agent has a utility function).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteSet {
    pub a_in_b: Option<Quote>,
    pub b_in_a: Option<Quote>,
    pub a_in_m: Option<Quote>,
    pub b_in_m: Option<Quote>,
}

impl QuoteSet {
    /// The default quote used before an agent has ever computed one
    /// (`Agent::new` leaves `inventory_changed = true` specifically so
    /// Housekeeping overwrites this on tick 0).
    pub fn default_unit() -> Self {
        Self {
            a_in_b: Some(Quote { ask: 1.0, bid: 1.0, p_min: 1.0, p_max: 1.0 }),
            b_in_a: Some(Quote { ask: 1.0, bid: 1.0, p_min: 1.0, p_max: 1.0 }),
            a_in_m: None,
            b_in_m: None,
        }
    }

    pub fn get(&self, pair: ExchangePair) -> Option<Quote> {
        match pair {
            ExchangePair::AB => self.a_in_b,
            ExchangePair::AM => self.a_in_m,
            ExchangePair::BM => self.b_in_m,
        }
    }
}

/// Reciprocal of a reservation bound, guarding the degenerate cases: a
/// non-positive value (including the Quadratic "no trade" sentinel, where
/// `p_min > p_max`) means there is no finite reciprocal price, so the
/// reciprocal pair is likewise marked no-trade rather than blowing up.
fn guarded_reciprocal(p_min: f64, p_max: f64, eps: f64) -> (f64, f64) {
    if p_min > p_max || p_min <= 0.0 || p_max <= 0.0 {
        // No-trade sentinel, mirrored: reciprocal direction refuses too.
        return (1.0, -1.0);
    }
    let recip_min = if p_max < eps { crate::utility::DEMAND_INFINITY } else { 1.0 / p_max };
    let recip_max = if p_min < eps { crate::utility::DEMAND_INFINITY } else { 1.0 / p_min };
    (recip_min, recip_max)
}

/// Compute all four directional quotes from an agent's utility, inventory,
/// and money parameters (§4.3). Regime filtering is a separate step so the
/// full set remains available for diagnostics even when a pair is hidden.
pub fn compute_quotes(
    utility: &Utility,
    inventory: Inventory,
    lambda_money: f64,
    money: Option<&MoneyParams>,
    spread: f64,
    epsilon: f64,
    money_scale: f64,
) -> QuoteSet {
    let (a, b) = (inventory.a, inventory.b);
    let (p_min_ab, p_max_ab) = utility.reservation_bounds_a_in_b(a, b, epsilon);
    let a_in_b = Quote::from_bounds(p_min_ab, p_max_ab, spread);

    let (p_min_ba, p_max_ba) = guarded_reciprocal(p_min_ab, p_max_ab, epsilon);
    let b_in_a = Quote::from_bounds(p_min_ba, p_max_ba, spread);

    let (a_in_m, b_in_m) = if money.is_some() && lambda_money > 0.0 {
        let mu_a = utility.mu_a(a, b, epsilon);
        let mu_b = utility.mu_b(a, b, epsilon);
        let price_a_in_m = (mu_a / lambda_money) * money_scale;
        let price_b_in_m = (mu_b / lambda_money) * money_scale;
        (
            Some(Quote::from_bounds(price_a_in_m, price_a_in_m, spread)),
            Some(Quote::from_bounds(price_b_in_m, price_b_in_m, spread)),
        )
    } else {
        (None, None)
    };

    QuoteSet { a_in_b: Some(a_in_b), b_in_a: Some(b_in_a), a_in_m, b_in_m }
}

/// Visible subset of a quote set under a regime filter (§4.3). An unknown
/// regime string is validated away by `ScenarioConfig::validate`, so the
/// only way to observe "unknown" here is a caller bypassing validation —
/// the typed `ExchangeRegime` makes that variant unrepresentable, so this
/// function is total over the enum and never needs a warning branch.
pub fn filter_quotes_by_regime(quotes: QuoteSet, regime: ExchangeRegime) -> QuoteSet {
    match regime {
        ExchangeRegime::BarterOnly => QuoteSet {
            a_in_b: quotes.a_in_b,
            b_in_a: quotes.b_in_a,
            a_in_m: None,
            b_in_m: None,
        },
        ExchangeRegime::MoneyOnly => QuoteSet {
            a_in_b: None,
            b_in_a: None,
            a_in_m: quotes.a_in_m,
            b_in_m: quotes.b_in_m,
        },
        ExchangeRegime::Mixed => quotes,
    }
}
