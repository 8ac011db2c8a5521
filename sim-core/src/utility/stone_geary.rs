//! Stone-Geary (subsistence) utility: `U = αA·ln(A-γA) + αB·ln(B-γB)`.
//!
//! Below subsistence in either good the reservation-bound sentinels of
//! §4.1 take over rather than differentiating through a log singularity.

use serde::{Deserialize, Serialize};

use super::{eps_shift, DEMAND_INFINITY};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoneGeary {
    pub alpha_a: f64,
    pub alpha_b: f64,
    pub gamma_a: f64,
    pub gamma_b: f64,
}

impl StoneGeary {
    pub fn new(alpha_a: f64, alpha_b: f64, gamma_a: f64, gamma_b: f64) -> Result<Self, String> {
        if alpha_a <= 0.0 || alpha_b <= 0.0 {
            return Err("stone-geary alpha_a and alpha_b must be positive".to_string());
        }
        if gamma_a < 0.0 || gamma_b < 0.0 {
            return Err("stone-geary gamma_a and gamma_b must be non-negative".to_string());
        }
        Ok(Self { alpha_a, alpha_b, gamma_a, gamma_b })
    }

    fn below_subsistence_a(&self, a: u32) -> bool {
        (a as f64) <= self.gamma_a
    }

    fn below_subsistence_b(&self, b: u32) -> bool {
        (b as f64) <= self.gamma_b
    }

    pub fn u_goods(&self, a: u32, b: u32) -> f64 {
        let excess_a = eps_shift(a as f64 - self.gamma_a, 1e-12);
        let excess_b = eps_shift(b as f64 - self.gamma_b, 1e-12);
        self.alpha_a * excess_a.ln() + self.alpha_b * excess_b.ln()
    }

    pub fn mu_a(&self, a: u32, _b: u32, eps: f64) -> f64 {
        self.alpha_a / eps_shift(a as f64 - self.gamma_a, eps)
    }

    pub fn mu_b(&self, _a: u32, b: u32, eps: f64) -> f64 {
        self.alpha_b / eps_shift(b as f64 - self.gamma_b, eps)
    }

    /// `(αA/αB)·(B-γB)/(A-γA)`, epsilon-shifting both excesses.
    pub fn mrs_a_in_b(&self, a: u32, b: u32, eps: f64) -> f64 {
        let excess_a = eps_shift(a as f64 - self.gamma_a, eps);
        let excess_b = eps_shift(b as f64 - self.gamma_b, eps);
        (self.alpha_a / self.alpha_b) * (excess_b / excess_a)
    }

    pub fn reservation_bounds_a_in_b(&self, a: u32, b: u32, eps: f64) -> (f64, f64) {
        let below_a = self.below_subsistence_a(a);
        let below_b = self.below_subsistence_b(b);
        if below_a && below_b {
            (1.0, 1.0)
        } else if below_a || below_b {
            (DEMAND_INFINITY, DEMAND_INFINITY)
        } else {
            let mrs = self.mrs_a_in_b(a, b, eps);
            (mrs, mrs)
        }
    }
}
