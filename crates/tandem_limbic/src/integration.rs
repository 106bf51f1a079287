//! Attention integration across the two domains.
//!
//! Two competing hypotheses about how parallel arousal streams should be
//! combined:
//! - Weighted: continuous softmax blend
//! - Gated: winner-take-all with an equal-split dead zone
//!
//! The gated variant is discontinuous at the threshold on purpose; the
//! abrupt regime switch is what the experiment measures.

use serde::{Deserialize, Serialize};
use tandem_core::IntegrationStrategy;

use crate::error::ArousalError;

/// Attention split over (navigation, social). Always sums to 1.
///
/// Held in f64 so a heavily out-weighted domain keeps a positive share
/// instead of underflowing to zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttentionWeights {
    pub state: f64,
    pub agent: f64,
}

impl AttentionWeights {
    pub const EVEN: AttentionWeights = AttentionWeights {
        state: 0.5,
        agent: 0.5,
    };

    /// Weighted sum of the two domains' updates.
    pub fn blend(&self, state_update: f64, agent_update: f64) -> f64 {
        self.state * state_update + self.agent * agent_update
    }
}

impl From<AttentionWeights> for (f64, f64) {
    fn from(w: AttentionWeights) -> Self {
        (w.state, w.agent)
    }
}

/// Stateless combination policies.
pub struct ArousalIntegrator;

impl ArousalIntegrator {
    /// Softmax over `[a_state, a_agent] / temperature`.
    ///
    /// Low temperature approaches winner-take-all, high temperature
    /// approaches an even split.
    pub fn weighted_integration(
        a_state: f32,
        a_agent: f32,
        temperature: f32,
    ) -> Result<AttentionWeights, ArousalError> {
        if !(temperature.is_finite() && temperature > 0.0) {
            return Err(ArousalError::InvalidTemperature(temperature));
        }

        // Shift by the max so exp() can't overflow
        let temperature = f64::from(temperature);
        let s = f64::from(a_state) / temperature;
        let a = f64::from(a_agent) / temperature;
        let m = s.max(a);
        let es = (s - m).exp();
        let ea = (a - m).exp();
        let total = es + ea;

        Ok(AttentionWeights {
            state: es / total,
            agent: ea / total,
        })
    }

    /// All attention to the more aroused domain, unless the two are closer
    /// than `threshold`, in which case split evenly.
    pub fn gated_integration(a_state: f32, a_agent: f32, threshold: f32) -> AttentionWeights {
        let diff = (a_state - a_agent).abs();

        if diff < threshold {
            AttentionWeights::EVEN
        } else if a_state > a_agent {
            AttentionWeights {
                state: 1.0,
                agent: 0.0,
            }
        } else {
            AttentionWeights {
                state: 0.0,
                agent: 1.0,
            }
        }
    }

    /// Dispatch to the configured strategy.
    pub fn integrate(
        strategy: &IntegrationStrategy,
        a_state: f32,
        a_agent: f32,
    ) -> Result<AttentionWeights, ArousalError> {
        match *strategy {
            IntegrationStrategy::Weighted { temperature } => {
                Self::weighted_integration(a_state, a_agent, temperature)
            }
            IntegrationStrategy::Gated { threshold } => {
                Ok(Self::gated_integration(a_state, a_agent, threshold))
            }
        }
    }
}
