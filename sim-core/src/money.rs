//! Money utility and `u_total` (§4.2).

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoneyUtilityForm {
    Linear,
    Log,
}

impl MoneyUtilityForm {
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s {
            "linear" => Ok(MoneyUtilityForm::Linear),
            "log" => Ok(MoneyUtilityForm::Log),
            other => Err(ConfigError::InvalidUtilityParams {
                variant: "money".to_string(),
                reason: format!("unknown money_utility_form: {other}"),
            }),
        }
    }
}

/// Per-agent money parameters: marginal value `lambda`, and (for the log
/// form) the wealth-effect offset `m_0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoneyParams {
    pub form: MoneyUtilityForm,
    pub lambda: f64,
    pub m_0: f64,
}

impl MoneyParams {
    pub fn u_money(&self, m: u32, eps: f64) -> f64 {
        match self.form {
            MoneyUtilityForm::Linear => self.lambda * m as f64,
            MoneyUtilityForm::Log => {
                self.lambda * (m as f64 + self.m_0).max(eps).ln()
            }
        }
    }

    /// `λ` (constant, no wealth effect) for linear; `λ / (M + M0)`
    /// (diminishing) for log.
    pub fn mu_money(&self, m: u32, eps: f64) -> f64 {
        match self.form {
            MoneyUtilityForm::Linear => self.lambda,
            MoneyUtilityForm::Log => self.lambda / (m as f64 + self.m_0).max(eps),
        }
    }
}

/// `u_total = u_goods(A,B) + u_money(M)`.
pub fn u_total(u_goods: f64, money: &MoneyParams, m: u32, eps: f64) -> f64 {
    u_goods + money.u_money(m, eps)
}
