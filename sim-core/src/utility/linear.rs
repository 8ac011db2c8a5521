//! Linear utility: `U = vA·A + vB·B`, constant marginal rate of substitution.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Linear {
    pub v_a: f64,
    pub v_b: f64,
}

impl Linear {
    pub fn new(v_a: f64, v_b: f64) -> Result<Self, String> {
        if v_a <= 0.0 || v_b <= 0.0 {
            return Err("linear utility values must be positive".to_string());
        }
        Ok(Self { v_a, v_b })
    }

    pub fn u_goods(&self, a: u32, b: u32) -> f64 {
        self.v_a * a as f64 + self.v_b * b as f64
    }

    pub fn mu_a(&self, _a: u32, _b: u32, _eps: f64) -> f64 {
        self.v_a
    }

    pub fn mu_b(&self, _a: u32, _b: u32, _eps: f64) -> f64 {
        self.v_b
    }

    pub fn mrs_a_in_b(&self, _a: u32, _b: u32, _eps: f64) -> f64 {
        self.v_a / self.v_b
    }

    pub fn reservation_bounds_a_in_b(&self, a: u32, b: u32, eps: f64) -> (f64, f64) {
        let mrs = self.mrs_a_in_b(a, b, eps);
        (mrs, mrs)
    }
}
