//! Scenario configuration and validation (§6).
//!
//! `ScenarioConfig` is the deserialized, still-unchecked shape of a run.
//! `validate()` is the single gate between "parsed JSON" and "a
//! `Simulation` may be constructed" — every check here mirrors one from
//! the original scenario builder's validator, ported to fail closed with a
//! typed `ConfigError` instead of a string exception.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::money::MoneyUtilityForm;
use crate::types::{AgentId, ExchangeRegime, Mode};
use crate::utility::{Ces, Linear, Quadratic, StoneGeary, Translog};

const SUPPORTED_SCHEMA_VERSION: &str = "1";
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum UtilityParamsConfig {
    Ces { rho: f64, w_a: f64, w_b: f64 },
    Linear { v_a: f64, v_b: f64 },
    Quadratic { a_star: f64, b_star: f64, sigma_a: f64, sigma_b: f64, gamma: f64 },
    Translog { alpha_0: f64, alpha_a: f64, alpha_b: f64, beta_aa: f64, beta_bb: f64, beta_ab: f64 },
    StoneGeary { alpha_a: f64, alpha_b: f64, gamma_a: f64, gamma_b: f64 },
}

impl UtilityParamsConfig {
    fn variant_tag(&self) -> &'static str {
        match self {
            UtilityParamsConfig::Ces { .. } => "ces",
            UtilityParamsConfig::Linear { .. } => "linear",
            UtilityParamsConfig::Quadratic { .. } => "quadratic",
            UtilityParamsConfig::Translog { .. } => "translog",
            UtilityParamsConfig::StoneGeary { .. } => "stone_geary",
        }
    }

    /// Validates this variant's own parameter constraints by attempting to
    /// construct it, translating the variant's own error message into a
    /// `ConfigError`.
    fn validate(&self) -> Result<(), ConfigError> {
        let reason_of = |e: String| ConfigError::InvalidUtilityParams { variant: self.variant_tag().to_string(), reason: e };
        match self {
            UtilityParamsConfig::Ces { rho, w_a, w_b } => {
                Ces::new(*rho, *w_a, *w_b).map(|_| ()).map_err(reason_of)
            }
            UtilityParamsConfig::Linear { v_a, v_b } => Linear::new(*v_a, *v_b).map(|_| ()).map_err(reason_of),
            UtilityParamsConfig::Quadratic { a_star, b_star, sigma_a, sigma_b, gamma } => {
                Quadratic::new(*a_star, *b_star, *sigma_a, *sigma_b, *gamma).map(|_| ()).map_err(reason_of)
            }
            UtilityParamsConfig::Translog { alpha_0, alpha_a, alpha_b, beta_aa, beta_bb, beta_ab } => {
                Translog::new(*alpha_0, *alpha_a, *alpha_b, *beta_aa, *beta_bb, *beta_ab).map(|_| ()).map_err(reason_of)
            }
            UtilityParamsConfig::StoneGeary { alpha_a, alpha_b, gamma_a, gamma_b } => {
                StoneGeary::new(*alpha_a, *alpha_b, *gamma_a, *gamma_b).map(|_| ()).map_err(reason_of)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtilityMixEntry {
    pub weight: f64,
    pub params: UtilityParamsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoneyConfig {
    pub form: String,
    pub m_0: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    pub width: i32,
    pub height: i32,
    pub resource_density: f64,
    /// Units each seeded cell starts with (and regenerates back toward).
    pub resource_amount: u32,
    pub growth_rate: u32,
    pub max_amount: u32,
    pub regen_cooldown: u64,
    pub forage_rate: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentInitConfig {
    pub agent_id: AgentId,
    pub initial_a: i64,
    pub initial_b: i64,
    pub initial_m: i64,
    pub lambda_money: f64,
    pub vision_radius: i32,
    pub move_budget_per_tick: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeScheduleConfig {
    pub forage_ticks: u64,
    pub trade_ticks: u64,
    pub start_mode: Mode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub schema_version: String,
    pub seed: u64,
    pub grid: GridConfig,
    pub utility_mix: Vec<UtilityMixEntry>,
    pub agents: Vec<AgentInitConfig>,
    pub regime: String,
    pub money: Option<MoneyConfig>,
    pub spread: f64,
    pub epsilon: f64,
    pub money_scale: f64,
    pub interaction_radius: i32,
    pub max_block_size: u32,
    pub trade_cooldown_ticks: u64,
    pub beta: f64,
    pub mode_schedule: Option<ModeScheduleConfig>,
}

impl ScenarioConfig {
    /// Runs every check from §6 and returns the first failure, if any.
    /// Never mutates `self`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.schema_version != SUPPORTED_SCHEMA_VERSION {
            return Err(ConfigError::SchemaVersionUnsupported(self.schema_version.clone()));
        }

        let weight_sum: f64 = self.utility_mix.iter().map(|u| u.weight).sum();
        if (weight_sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::InvalidWeightSum { sum: weight_sum });
        }
        for entry in &self.utility_mix {
            entry.params.validate()?;
        }

        if !(0.0..=1.0).contains(&self.grid.resource_density) {
            return Err(ConfigError::DensityOutOfRange { density: self.grid.resource_density });
        }

        ExchangeRegime::parse(&self.regime)?;

        if let Some(money) = &self.money {
            MoneyUtilityForm::parse(&money.form)?;
        }

        for agent in &self.agents {
            if agent.initial_a < 0 {
                return Err(ConfigError::InventoryNegative { agent_id: agent.agent_id, good: "A", amount: agent.initial_a });
            }
            if agent.initial_b < 0 {
                return Err(ConfigError::InventoryNegative { agent_id: agent.agent_id, good: "B", amount: agent.initial_b });
            }
            if agent.initial_m < 0 {
                return Err(ConfigError::InventoryNegative { agent_id: agent.agent_id, good: "M", amount: agent.initial_m });
            }
        }

        // Stone-Geary subsistence: an agent assigned a Stone-Geary utility
        // (every agent, under the current single-variant-per-agent
        // population model) must start with at least one good above its
        // subsistence floor, or every quote it could ever publish is the
        // degenerate "can't trade, can't be priced" sentinel (§4.1).
        for entry in &self.utility_mix {
            if let UtilityParamsConfig::StoneGeary { gamma_a, gamma_b, .. } = &entry.params {
                for agent in &self.agents {
                    let above_a = agent.initial_a as f64 >= *gamma_a;
                    let above_b = agent.initial_b as f64 >= *gamma_b;
                    if !above_a && !above_b {
                        return Err(ConfigError::SubsistenceViolation {
                            agent_id: agent.agent_id,
                            reason: format!(
                                "holds A={} B={}, below subsistence floor gamma_a={} gamma_b={} in both goods",
                                agent.initial_a, agent.initial_b, gamma_a, gamma_b
                            ),
                        });
                    }
                }
            }
        }

        Ok(())
    }
}
