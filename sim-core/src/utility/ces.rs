//! CES (constant elasticity of substitution) utility: `U = [wA·A^ρ + wB·B^ρ]^(1/ρ)`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ces {
    pub rho: f64,
    pub w_a: f64,
    pub w_b: f64,
}

impl Ces {
    pub fn new(rho: f64, w_a: f64, w_b: f64) -> Result<Self, String> {
        if rho == 1.0 {
            return Err("CES utility cannot have rho=1.0".to_string());
        }
        if w_a <= 0.0 || w_b <= 0.0 {
            return Err("CES weights must be positive".to_string());
        }
        Ok(Self { rho, w_a, w_b })
    }

    pub fn u_goods(&self, a: u32, b: u32) -> f64 {
        if a == 0 && b == 0 {
            return 0.0;
        }
        // For negative rho, zero inventory in either good drives utility to 0.
        if self.rho < 0.0 && (a == 0 || b == 0) {
            return 0.0;
        }
        let term_a = if a > 0 { self.w_a * (a as f64).powf(self.rho) } else { 0.0 };
        let term_b = if b > 0 { self.w_b * (b as f64).powf(self.rho) } else { 0.0 };
        let total = term_a + term_b;
        if total <= 0.0 {
            return 0.0;
        }
        total.powf(1.0 / self.rho)
    }

    /// `(wA/wB)·(A/B)^(ρ-1)`, epsilon-shifting the ratio only when A or B is zero.
    pub fn mrs_a_in_b(&self, a: u32, b: u32, eps: f64) -> f64 {
        let (a_safe, b_safe) = if a == 0 || b == 0 {
            (a as f64 + eps, b as f64 + eps)
        } else {
            (a as f64, b as f64)
        };
        (self.w_a / self.w_b) * (a_safe / b_safe).powf(self.rho - 1.0)
    }

    /// Numerically differentiated marginal utilities, used only for the
    /// total-utility pre/post comparisons in bargaining; the closed-form
    /// MRS above is authoritative for pricing.
    pub fn mu_a(&self, a: u32, b: u32, _eps: f64) -> f64 {
        self.u_goods(a + 1, b) - self.u_goods(a, b)
    }

    pub fn mu_b(&self, a: u32, b: u32, _eps: f64) -> f64 {
        self.u_goods(a, b + 1) - self.u_goods(a, b)
    }

    /// Analytic-MRS variant: bounds collapse to `(mrs, mrs)`.
    pub fn reservation_bounds_a_in_b(&self, a: u32, b: u32, eps: f64) -> (f64, f64) {
        let mrs = self.mrs_a_in_b(a, b, eps);
        (mrs, mrs)
    }
}
