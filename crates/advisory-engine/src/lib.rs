#![deny(warnings)]

//! Advisory rule engine: five persona agents over a county context.
//!
//! Each agent is a priority-ordered decision list; the first matching rule
//! wins and yields one canned recommendation string. Four agents are pure
//! functions of the record and scenario flags; the sentiment agent draws a
//! bounded jitter from a seeded RNG owned by [`Advisor`].

use advisory_core::{AdvisoryMessage, AgentId, EvaluationContext, UnknownAgentError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Half-width of the uniform jitter applied to farmer sentiment.
pub const SENTIMENT_JITTER: f32 = 0.03;

/// Jittered sentiment below this reads as low morale.
pub const LOW_MORALE_CUTOFF: f32 = 0.52;

/// Jittered sentiment at or above this reads as positive.
pub const POSITIVE_CUTOFF: f32 = 0.60;

/// Counties whose ports let logistics reroute rather than buffer.
pub const COASTAL_HUBS: [&str; 2] = ["Cork", "Wexford"];

/// Engine tunables. The poverty threshold is the one constant the source
/// material never settled on; 0.28 is the adopted value.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Seed for the deterministic jitter RNG.
    pub rng_seed: u64,
    /// Food-poverty level above which a subsidy cut reads as acute.
    pub acute_poverty_threshold: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            rng_seed: 42,
            acute_poverty_threshold: 0.28,
        }
    }
}

/// Sentiment band after jittering. Bands partition [0, 1]: `[0, 0.52)`,
/// `[0.52, 0.60)`, `[0.60, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SentimentBand {
    LowMorale,
    Mixed,
    Positive,
}

/// Band a jittered sentiment value. Total over the unit interval.
pub fn sentiment_band(s: f32) -> SentimentBand {
    if s < LOW_MORALE_CUTOFF {
        SentimentBand::LowMorale
    } else if s < POSITIVE_CUTOFF {
        SentimentBand::Mixed
    } else {
        SentimentBand::Positive
    }
}

/// Stateless-per-call evaluator. Holds only the config and the jitter RNG;
/// the RNG is touched exclusively by the sentiment agent, so evaluation
/// order of the other four never consumes randomness.
pub struct Advisor {
    cfg: EngineConfig,
    rng: ChaCha8Rng,
}

impl Advisor {
    pub fn new(cfg: EngineConfig) -> Self {
        Advisor {
            rng: ChaCha8Rng::seed_from_u64(cfg.rng_seed),
            cfg,
        }
    }

    /// Shorthand for a default config with the given seed.
    pub fn seeded(seed: u64) -> Self {
        Advisor::new(EngineConfig {
            rng_seed: seed,
            ..Default::default()
        })
    }

    /// Evaluate one agent against the context. Total for every [`AgentId`];
    /// message construction only interpolates the county name.
    pub fn evaluate(&mut self, agent: AgentId, ctx: &EvaluationContext<'_>) -> AdvisoryMessage {
        let text = match agent {
            AgentId::Soil => self.soil(ctx),
            AgentId::Logistics => self.logistics(ctx),
            AgentId::FoodSecurity => self.food_security(ctx),
            AgentId::LandUse => self.land_use(ctx),
            AgentId::Sentiment => self.sentiment(ctx),
        };
        debug!(%agent, county = %ctx.record.name, "advisory produced");
        AdvisoryMessage { agent, text }
    }

    /// Evaluate an agent named by an untyped identifier, as supplied by the
    /// UI layer. Fails with [`UnknownAgentError`] outside the fixed set.
    pub fn evaluate_named(
        &mut self,
        name: &str,
        ctx: &EvaluationContext<'_>,
    ) -> Result<AdvisoryMessage, UnknownAgentError> {
        let agent: AgentId = name.parse()?;
        Ok(self.evaluate(agent, ctx))
    }

    /// Run all five agents in the fixed dashboard order.
    pub fn evaluate_all(&mut self, ctx: &EvaluationContext<'_>) -> Vec<AdvisoryMessage> {
        AgentId::ALL
            .iter()
            .map(|&agent| self.evaluate(agent, ctx))
            .collect()
    }

    fn soil(&self, ctx: &EvaluationContext<'_>) -> String {
        let r = ctx.record;
        if ctx.flags.climate_shock && r.soil_carbon < 2.8 {
            if r.soil_carbon < 2.5 {
                format!(
                    "Severe drought stress in {}: soil carbon critically depleted. \
                     Emergency irrigation and organic-matter triage.",
                    r.name
                )
            } else {
                format!(
                    "Drought pressure building in {}. Accelerate cover cropping \
                     before carbon declines further.",
                    r.name
                )
            }
        } else if r.nitrogen_level > 70.0 {
            format!(
                "Nitrogen overload in {}. Shift to leguminous rotation to curb leaching.",
                r.name
            )
        } else if r.soil_carbon < 2.6 {
            format!("Soil carbon low in {}. Urgent need for cover cropping.", r.name)
        } else {
            format!(
                "{} is balanced. Maintain eco-stability through smart practices.",
                r.name
            )
        }
    }

    fn logistics(&self, ctx: &EvaluationContext<'_>) -> String {
        let name = ctx.record.name.as_str();
        if ctx.flags.export_block {
            if COASTAL_HUBS.contains(&name) {
                format!(
                    "Export block hits {name} hard: reroute perishables through \
                     inland consolidation hubs."
                )
            } else {
                format!("Export block active. Build cold-chain buffers in {name} while ports clear.")
            }
        } else {
            format!("{name} logistics flow stable. Monitor seasonal bottlenecks.")
        }
    }

    fn food_security(&self, ctx: &EvaluationContext<'_>) -> String {
        let r = ctx.record;
        if ctx.flags.subsidy_cut {
            if r.food_poverty_index > self.cfg.acute_poverty_threshold {
                format!(
                    "Subsidy cut lands on already-stressed households in {}. \
                     Activate emergency food vouchers.",
                    r.name
                )
            } else {
                format!(
                    "Subsidy cut absorbed so far in {}. Pre-position safety-net \
                     funding before winter.",
                    r.name
                )
            }
        } else if r.food_poverty_index > 0.3 {
            format!("Food poverty high in {}. Activate safety net subsidies.", r.name)
        } else {
            format!("{} food affordability acceptable. Watch CPI next quarter.", r.name)
        }
    }

    // Flags are deliberately ignored: land-use advice depends only on soil
    // carbon and nitrogen.
    fn land_use(&self, ctx: &EvaluationContext<'_>) -> String {
        let r = ctx.record;
        if r.soil_carbon >= 3.0 {
            format!(
                "Carbon-rich soils in {} favor afforestation. Prioritize native \
                 broadleaf planting.",
                r.name
            )
        } else if r.nitrogen_level > 70.0 {
            format!(
                "High nitrogen in {}: install riparian buffer strips before conversion.",
                r.name
            )
        } else {
            format!(
                "{} suited to mixed-use pilots. Trial agroforestry on marginal parcels.",
                r.name
            )
        }
    }

    fn sentiment(&mut self, ctx: &EvaluationContext<'_>) -> String {
        let name = ctx.record.name.as_str();
        let s = self.jittered_sentiment(ctx.record.farmer_sentiment);
        match sentiment_band(s) {
            SentimentBand::LowMorale => {
                format!("Farmer morale low in {name}. Propose co-creation forums.")
            }
            SentimentBand::Mixed => {
                format!(
                    "Sentiment in {name} is mixed. Keep listening sessions running \
                     through the season."
                )
            }
            SentimentBand::Positive => {
                format!("Sentiment in {name} improving. Reward engagement in policy cycles.")
            }
        }
    }

    /// Draw `base + uniform(-JITTER, +JITTER)`, clamped to the unit interval
    /// so banding stays total. This is the engine's only side effect.
    fn jittered_sentiment(&mut self, base: f32) -> f32 {
        let jitter: f32 = self.rng.gen_range(-SENTIMENT_JITTER..=SENTIMENT_JITTER);
        (base + jitter).clamp(0.0, 1.0)
    }
}
