//! Translog utility:
//! `ln U = α0 + αA·ln A + αB·ln B + ½βAA·(ln A)² + ½βBB·(ln B)² + βAB·(ln A)(ln B)`,
//! `U = exp(ln U)`.

use serde::{Deserialize, Serialize};

use super::eps_shift;

/// `ln U` is clamped at this value before exponentiating, per §4.1.
const LN_U_CLAMP: f64 = 700.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Translog {
    pub alpha_0: f64,
    pub alpha_a: f64,
    pub alpha_b: f64,
    pub beta_aa: f64,
    pub beta_bb: f64,
    pub beta_ab: f64,
}

impl Translog {
    pub fn new(
        alpha_0: f64,
        alpha_a: f64,
        alpha_b: f64,
        beta_aa: f64,
        beta_bb: f64,
        beta_ab: f64,
    ) -> Result<Self, String> {
        if alpha_a <= 0.0 || alpha_b <= 0.0 {
            return Err("translog alpha_a and alpha_b must be positive".to_string());
        }
        Ok(Self { alpha_0, alpha_a, alpha_b, beta_aa, beta_bb, beta_ab })
    }

    fn ln_u(&self, a: u32, b: u32, eps: f64) -> f64 {
        let a_safe = eps_shift(a as f64, eps);
        let b_safe = eps_shift(b as f64, eps);
        let ln_a = a_safe.ln();
        let ln_b = b_safe.ln();
        let raw = self.alpha_0
            + self.alpha_a * ln_a
            + self.alpha_b * ln_b
            + 0.5 * self.beta_aa * ln_a * ln_a
            + 0.5 * self.beta_bb * ln_b * ln_b
            + self.beta_ab * ln_a * ln_b;
        raw.min(LN_U_CLAMP)
    }

    pub fn u_goods(&self, a: u32, b: u32) -> f64 {
        self.ln_u(a, b, 1e-12).exp()
    }

    pub fn mu_a(&self, a: u32, b: u32, eps: f64) -> f64 {
        self.u_goods_eps(a, b, eps) / eps_shift(a as f64, eps)
            * self.log_slope_a(a, b, eps)
    }

    pub fn mu_b(&self, a: u32, b: u32, eps: f64) -> f64 {
        self.u_goods_eps(a, b, eps) / eps_shift(b as f64, eps)
            * self.log_slope_b(a, b, eps)
    }

    fn u_goods_eps(&self, a: u32, b: u32, eps: f64) -> f64 {
        self.ln_u(a, b, eps).exp()
    }

    fn log_slope_a(&self, a: u32, b: u32, eps: f64) -> f64 {
        let ln_a = eps_shift(a as f64, eps).ln();
        let ln_b = eps_shift(b as f64, eps).ln();
        self.alpha_a + self.beta_aa * ln_a + self.beta_ab * ln_b
    }

    fn log_slope_b(&self, a: u32, b: u32, eps: f64) -> f64 {
        let ln_a = eps_shift(a as f64, eps).ln();
        let ln_b = eps_shift(b as f64, eps).ln();
        self.alpha_b + self.beta_bb * ln_b + self.beta_ab * ln_a
    }

    /// `MRS = (B/A) · (αA + βAA·lnA + βAB·lnB) / (αB + βBB·lnB + βAB·lnA)`,
    /// i.e. the ratio of `MU_A/MU_B` computed entirely in log-space so the
    /// shared `exp(ln U)` factor cancels before it can overflow.
    pub fn mrs_a_in_b(&self, a: u32, b: u32, eps: f64) -> f64 {
        let a_safe = eps_shift(a as f64, eps);
        let b_safe = eps_shift(b as f64, eps);
        let numerator = self.log_slope_a(a, b, eps);
        let denominator = self.log_slope_b(a, b, eps);
        (b_safe / a_safe) * (numerator / denominator)
    }

    pub fn reservation_bounds_a_in_b(&self, a: u32, b: u32, eps: f64) -> (f64, f64) {
        let mrs = self.mrs_a_in_b(a, b, eps);
        (mrs, mrs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_nonpositive_alpha() {
        assert!(Translog::new(0.0, 0.0, 1.0, 0.0, 0.0, 0.0).is_err());
    }

    #[test]
    fn symmetric_params_equal_goods_mrs_is_one() {
        let u = Translog::new(0.0, 0.5, 0.5, 0.0, 0.0, 0.0).unwrap();
        let mrs = u.mrs_a_in_b(10, 10, 1e-12);
        assert!((mrs - 1.0).abs() < 1e-9);
    }

    #[test]
    fn clamp_prevents_overflow_at_extreme_inventory() {
        let u = Translog::new(0.0, 5.0, 5.0, 2.0, 2.0, 1.0).unwrap();
        let util = u.u_goods(1_000_000, 1_000_000);
        assert!(util.is_finite());
    }

    #[test]
    fn zero_inventory_does_not_panic() {
        let u = Translog::new(0.0, 0.5, 0.5, 0.0, 0.0, 0.0).unwrap();
        let util = u.u_goods(0, 10);
        assert!(util.is_finite());
    }
}
