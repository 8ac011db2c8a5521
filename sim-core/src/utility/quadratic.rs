//! Quadratic (bliss-point / satiation) utility:
//! `U = -σA(A-A*)² - σB(B-B*)² - γ(A-A*)(B-B*)`.
//!
//! Marginal utility can be negative past the bliss point, and the MRS is
//! undefined exactly at it; reservation bounds fall back to the sentinels
//! named in §4.1 rather than dividing by zero.

use serde::{Deserialize, Serialize};

/// `p_min > p_max` — no price makes this agent willing to trade A for B.
pub const NO_TRADE_SENTINEL: (f64, f64) = (1.0, -1.0);
/// "Demand infinity": the agent is satiated in B and has positive MU in A.
pub const DEMAND_INFINITY_SENTINEL: f64 = super::DEMAND_INFINITY;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quadratic {
    pub a_star: f64,
    pub b_star: f64,
    pub sigma_a: f64,
    pub sigma_b: f64,
    pub gamma: f64,
}

impl Quadratic {
    pub fn new(a_star: f64, b_star: f64, sigma_a: f64, sigma_b: f64, gamma: f64) -> Result<Self, String> {
        if gamma < 0.0 {
            return Err("quadratic gamma must be non-negative".to_string());
        }
        Ok(Self { a_star, b_star, sigma_a, sigma_b, gamma })
    }

    pub fn u_goods(&self, a: u32, b: u32) -> f64 {
        let da = a as f64 - self.a_star;
        let db = b as f64 - self.b_star;
        -self.sigma_a * da * da - self.sigma_b * db * db - self.gamma * da * db
    }

    pub fn mu_a(&self, a: u32, b: u32, _eps: f64) -> f64 {
        let da = a as f64 - self.a_star;
        let db = b as f64 - self.b_star;
        -2.0 * self.sigma_a * da - self.gamma * db
    }

    pub fn mu_b(&self, a: u32, b: u32, _eps: f64) -> f64 {
        let da = a as f64 - self.a_star;
        let db = b as f64 - self.b_star;
        -2.0 * self.sigma_b * db - self.gamma * da
    }

    /// `MU_A / MU_B`; undefined (NaN) exactly at the bliss point, where
    /// callers must consult `reservation_bounds_a_in_b` instead.
    pub fn mrs_a_in_b(&self, a: u32, b: u32, eps: f64) -> f64 {
        self.mu_a(a, b, eps) / self.mu_b(a, b, eps)
    }

    pub fn reservation_bounds_a_in_b(&self, a: u32, b: u32, eps: f64) -> (f64, f64) {
        let mu_a = self.mu_a(a, b, eps);
        let mu_b = self.mu_b(a, b, eps);
        if mu_a > 0.0 && mu_b > 0.0 {
            let mrs = mu_a / mu_b;
            (mrs, mrs)
        } else if mu_a <= 0.0 && mu_b > 0.0 {
            (eps, eps)
        } else if mu_b <= 0.0 && mu_a > 0.0 {
            (DEMAND_INFINITY_SENTINEL, DEMAND_INFINITY_SENTINEL)
        } else {
            NO_TRADE_SENTINEL
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bliss_point_has_zero_marginal_utility_both_goods() {
        let u = Quadratic::new(10.0, 10.0, 5.0, 5.0, 0.0).unwrap();
        assert_eq!(u.mu_a(10, 10, 1e-12), 0.0);
        assert_eq!(u.mu_b(10, 10, 1e-12), 0.0);
    }

    #[test]
    fn bliss_point_reservation_bounds_are_no_trade_sentinel() {
        let u = Quadratic::new(10.0, 10.0, 5.0, 5.0, 0.0).unwrap();
        let (p_min, p_max) = u.reservation_bounds_a_in_b(10, 10, 1e-12);
        assert!(p_min > p_max, "expected no-trade sentinel, got ({p_min}, {p_max})");
    }

    #[test]
    fn below_bliss_in_both_goods_gives_positive_mrs() {
        let u = Quadratic::new(10.0, 10.0, 5.0, 5.0, 0.0).unwrap();
        let (p_min, p_max) = u.reservation_bounds_a_in_b(5, 5, 1e-12);
        assert_eq!(p_min, p_max);
        assert!(p_min > 0.0);
    }

    #[test]
    fn satiated_in_a_wants_to_give_it_away() {
        // Far past bliss in A, below bliss in B: MU_A <= 0 < MU_B.
        let u = Quadratic::new(10.0, 10.0, 5.0, 5.0, 0.0).unwrap();
        let (p_min, p_max) = u.reservation_bounds_a_in_b(30, 5, 1e-12);
        assert_eq!(p_min, 1e-12);
        assert_eq!(p_max, 1e-12);
    }

    #[test]
    fn satiated_in_b_demands_infinity_for_a() {
        let u = Quadratic::new(10.0, 10.0, 5.0, 5.0, 0.0).unwrap();
        let (p_min, p_max) = u.reservation_bounds_a_in_b(5, 30, 1e-12);
        assert_eq!(p_min, DEMAND_INFINITY_SENTINEL);
        assert_eq!(p_max, DEMAND_INFINITY_SENTINEL);
    }
}
