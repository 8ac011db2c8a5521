//! Exercises the quote engine the way `tick::Simulation`'s Housekeeping
//! phase does: compute, then filter by regime, across money and barter
//! configurations.

use sim_core::{
    compute_quotes, filter_quotes_by_regime, ExchangeRegime, Inventory, Linear, MoneyParams, MoneyUtilityForm, Utility,
};

fn linear(v_a: f64, v_b: f64) -> Utility {
    Utility::Linear(Linear::new(v_a, v_b).unwrap())
}

#[test]
fn zero_spread_collapses_ask_and_bid_to_the_reservation_bound() {
    let u = linear(2.0, 1.0);
    let quotes = compute_quotes(&u, Inventory::new(10, 10, 0), 1.0, None, 0.0, 1e-12, 1.0);
    let q = quotes.a_in_b.unwrap();
    assert_eq!(q.ask, q.p_min);
    assert_eq!(q.bid, q.p_max);
}

#[test]
fn money_quotes_scale_with_money_scale_factor() {
    let u = linear(2.0, 1.0);
    let money = MoneyParams { form: MoneyUtilityForm::Linear, lambda: 1.0, m_0: 0.0 };
    let q1 = compute_quotes(&u, Inventory::new(10, 10, 5), 1.0, Some(&money), 0.0, 1e-12, 1.0);
    let q2 = compute_quotes(&u, Inventory::new(10, 10, 5), 1.0, Some(&money), 0.0, 1e-12, 2.0);
    let p1 = q1.a_in_m.unwrap().ask;
    let p2 = q2.a_in_m.unwrap().ask;
    assert!((p2 - 2.0 * p1).abs() < 1e-9);
}

#[test]
fn zero_lambda_money_suppresses_money_quotes_even_with_money_configured() {
    let u = linear(2.0, 1.0);
    let money = MoneyParams { form: MoneyUtilityForm::Linear, lambda: 1.0, m_0: 0.0 };
    let quotes = compute_quotes(&u, Inventory::new(10, 10, 5), 0.0, Some(&money), 0.0, 1e-12, 1.0);
    assert!(quotes.a_in_m.is_none());
    assert!(quotes.b_in_m.is_none());
}

#[test]
fn mixed_regime_passes_every_quote_through_unfiltered() {
    let u = linear(2.0, 1.0);
    let money = MoneyParams { form: MoneyUtilityForm::Linear, lambda: 1.0, m_0: 0.0 };
    let quotes = compute_quotes(&u, Inventory::new(10, 10, 5), 1.0, Some(&money), 0.05, 1e-12, 1.0);
    let filtered = filter_quotes_by_regime(quotes, ExchangeRegime::Mixed);
    assert_eq!(filtered, quotes);
}

#[test]
fn barter_only_and_money_only_partition_the_same_underlying_quote_set() {
    let u = linear(2.0, 1.0);
    let money = MoneyParams { form: MoneyUtilityForm::Linear, lambda: 1.0, m_0: 0.0 };
    let quotes = compute_quotes(&u, Inventory::new(10, 10, 5), 1.0, Some(&money), 0.05, 1e-12, 1.0);
    let barter = filter_quotes_by_regime(quotes, ExchangeRegime::BarterOnly);
    let money_only = filter_quotes_by_regime(quotes, ExchangeRegime::MoneyOnly);
    assert_eq!(barter.a_in_b, quotes.a_in_b);
    assert!(barter.a_in_m.is_none());
    assert_eq!(money_only.a_in_m, quotes.a_in_m);
    assert!(money_only.a_in_b.is_none());
}
