//! Domain Arousal - attention intensity from prediction error and salience
//!
//! Arousal is a computational signal for resource allocation, nothing more:
//! - Rises with surprise (prediction error magnitude)
//! - Rises with salience (reward magnitude)
//! - Rises with time pressure (elapsed fraction of the episode)
//! - Falls again past a stress threshold (inverted-U)
//!
//! ```text
//! arousal = clip(base × surprise × salience × time_pressure × stress_penalty, 0, 1)
//! ```

use serde::{Deserialize, Serialize};
use tandem_core::ArousalConfig;

use crate::error::ArousalError;

/// Guard against NaN and Infinity leaking into the history.
#[inline]
fn sanitize_f32(v: f32, fallback: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        tracing::warn!("NaN/Inf arousal computed, falling back to {}", fallback);
        fallback
    }
}

#[inline]
fn saturate(v: f32) -> f32 {
    v.clamp(f32::MIN, f32::MAX)
}

/// Summary of a monitor's arousal history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArousalStatistics {
    pub mean: f32,
    /// Population standard deviation
    pub std: f32,
    pub min: f32,
    pub max: f32,
    #[serde(rename = "final")]
    pub final_arousal: f32,
}

/// Arousal tracker for one feedback domain.
///
/// Histories are append-only. `reset()` rebases the scalar between episodes
/// and leaves them alone; `clear_history()` is the only way to empty them.
#[derive(Debug, Clone)]
pub struct ArousalMonitor {
    /// Label only ("navigation", "social")
    domain: String,
    config: ArousalConfig,

    current_arousal: f32,
    arousal_history: Vec<f32>,

    /// Per-step multiplicative components, for ablation analysis
    surprise_history: Vec<f32>,
    salience_history: Vec<f32>,
    stress_history: Vec<f32>,
}

impl ArousalMonitor {
    pub fn new(domain: impl Into<String>, config: ArousalConfig) -> Self {
        Self {
            domain: domain.into(),
            current_arousal: config.base_arousal,
            config,
            arousal_history: Vec::new(),
            surprise_history: Vec::new(),
            salience_history: Vec::new(),
            stress_history: Vec::new(),
        }
    }

    pub fn with_defaults(domain: impl Into<String>) -> Self {
        Self::new(domain, ArousalConfig::default())
    }

    /// Compute this step's arousal and record it.
    ///
    /// Depends only on the inputs and the configuration, never on the
    /// previous arousal value.
    pub fn compute_arousal(
        &mut self,
        prediction_error: f32,
        reward_magnitude: f32,
        time_remaining: f32,
        max_time: f32,
    ) -> Result<f32, ArousalError> {
        if !(max_time.is_finite() && max_time > 0.0) {
            return Err(ArousalError::InvalidMaxTime(max_time));
        }
        for (signal, value) in [
            ("prediction_error", prediction_error),
            ("reward_magnitude", reward_magnitude),
            ("time_remaining", time_remaining),
        ] {
            if !value.is_finite() {
                return Err(ArousalError::NonFiniteSignal { signal, value });
            }
        }
        let cfg = &self.config;

        // Finite inputs can still overflow the product; saturate instead
        let surprise_boost = saturate(1.0 + prediction_error.abs() * cfg.surprise_sensitivity);
        let salience_boost = saturate(1.0 + reward_magnitude.abs() * cfg.salience_sensitivity);

        let time_fraction = time_remaining / max_time;
        let time_pressure = saturate(1.0 + (1.0 - time_fraction) * cfg.time_pressure_factor);

        let raw = saturate(cfg.base_arousal * surprise_boost * salience_boost * time_pressure);

        let stress_penalty = if raw > cfg.stress_threshold {
            let excess = (raw - cfg.stress_threshold) / cfg.stress_threshold;
            1.0 / (1.0 + excess.powi(2))
        } else {
            1.0
        };

        let arousal = sanitize_f32((raw * stress_penalty).clamp(0.0, 1.0), cfg.base_arousal);

        if stress_penalty < 1.0 {
            tracing::trace!(
                "[{}] stress damping: raw {:.3} -> {:.3}",
                self.domain,
                raw,
                arousal
            );
        }

        self.surprise_history.push(surprise_boost);
        self.salience_history.push(salience_boost);
        self.stress_history.push(stress_penalty);

        self.current_arousal = arousal;
        self.arousal_history.push(arousal);

        Ok(arousal)
    }

    /// Scale a learning rate by arousal: `base_lr × (1 + arousal)`.
    ///
    /// Uses the current arousal when `arousal` is `None`. Supplied values are
    /// clamped to [0, 1], so the result stays within `[base_lr, 2 × base_lr]`.
    pub fn learning_rate_multiplier(&self, base_lr: f32, arousal: Option<f32>) -> f32 {
        base_lr * (1.0 + self.resolve(arousal))
    }

    /// Scale an ε-greedy rate by arousal, capped to a valid probability.
    pub fn exploration_bonus(&self, base_epsilon: f32, arousal: Option<f32>) -> f32 {
        (base_epsilon * (1.0 + self.resolve(arousal))).clamp(0.0, 1.0)
    }

    fn resolve(&self, arousal: Option<f32>) -> f32 {
        arousal.map_or(self.current_arousal, |a| a.clamp(0.0, 1.0))
    }

    /// Rebase the current arousal to baseline. History is kept.
    pub fn reset(&mut self) {
        self.current_arousal = self.config.base_arousal;
    }

    /// Drop all recorded history. The current arousal is kept.
    pub fn clear_history(&mut self) {
        self.arousal_history.clear();
        self.surprise_history.clear();
        self.salience_history.clear();
        self.stress_history.clear();
    }

    /// Summary statistics over the whole history.
    ///
    /// An empty history reports the baseline for every field and zero spread.
    pub fn statistics(&self) -> ArousalStatistics {
        let base = self.config.base_arousal;
        let Some(&last) = self.arousal_history.last() else {
            return ArousalStatistics {
                mean: base,
                std: 0.0,
                min: base,
                max: base,
                final_arousal: base,
            };
        };

        let n = self.arousal_history.len() as f32;
        let mean = self.arousal_history.iter().sum::<f32>() / n;
        let variance = self
            .arousal_history
            .iter()
            .map(|a| (a - mean).powi(2))
            .sum::<f32>()
            / n;
        let (min, max) = self
            .arousal_history
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &a| {
                (lo.min(a), hi.max(a))
            });

        ArousalStatistics {
            mean,
            std: variance.sqrt(),
            min,
            max,
            final_arousal: last,
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn config(&self) -> &ArousalConfig {
        &self.config
    }

    pub fn current_arousal(&self) -> f32 {
        self.current_arousal
    }

    pub fn arousal_history(&self) -> &[f32] {
        &self.arousal_history
    }

    pub fn surprise_history(&self) -> &[f32] {
        &self.surprise_history
    }

    pub fn salience_history(&self) -> &[f32] {
        &self.salience_history
    }

    pub fn stress_history(&self) -> &[f32] {
        &self.stress_history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    #[test]
    fn test_quiet_step_returns_baseline() {
        let mut monitor = ArousalMonitor::with_defaults("navigation");
        let a = monitor.compute_arousal(0.0, 0.0, 50.0, 50.0).unwrap();
        assert!((a - 0.3).abs() < EPS);
        assert_eq!(monitor.surprise_history(), &[1.0]);
        assert_eq!(monitor.salience_history(), &[1.0]);
        assert_eq!(monitor.stress_history(), &[1.0]);
    }

    #[test]
    fn test_components_follow_formula() {
        let mut monitor = ArousalMonitor::with_defaults("social");
        // surprise 1 + 1*0.5 = 1.5, salience 1 + 2*0.3 = 1.6,
        // time 1 + (1 - 0.5)*0.2 = 1.1, raw 0.3*1.5*1.6*1.1 = 0.792
        let a = monitor.compute_arousal(-1.0, -2.0, 25.0, 50.0).unwrap();
        assert!((a - 0.792).abs() < 1e-5);
        assert!((monitor.surprise_history()[0] - 1.5).abs() < EPS);
        assert!((monitor.salience_history()[0] - 1.6).abs() < EPS);
        assert_eq!(monitor.stress_history()[0], 1.0);
        assert_eq!(monitor.current_arousal(), a);
    }

    #[test]
    fn test_stress_penalty_inverted_u() {
        let mut monitor = ArousalMonitor::with_defaults("social");
        // surprise 1 + 5*0.5 = 3.5, salience 1 + 5.1*0.3 = 2.53, time 1.0
        // raw = 0.3*3.5*2.53 = 2.6565, excess = (2.6565-0.8)/0.8 = 2.3206
        let a = monitor.compute_arousal(5.0, 5.1, 50.0, 50.0).unwrap();
        let excess: f32 = (2.6565 - 0.8) / 0.8;
        let expected = 2.6565 / (1.0 + excess * excess);
        assert!((a - expected).abs() < 1e-4, "{} vs {}", a, expected);
        assert!(monitor.stress_history()[0] < 1.0);
        // Damped below a moderate level
        let moderate = monitor.compute_arousal(1.0, 1.0, 50.0, 50.0).unwrap();
        assert!(a < moderate);
    }

    #[test]
    fn test_invalid_max_time_leaves_monitor_untouched() {
        let mut monitor = ArousalMonitor::with_defaults("navigation");
        assert_eq!(
            monitor.compute_arousal(1.0, 1.0, 0.0, 0.0),
            Err(ArousalError::InvalidMaxTime(0.0))
        );
        assert!(monitor.compute_arousal(1.0, 1.0, 0.0, -5.0).is_err());
        assert!(monitor.compute_arousal(1.0, 1.0, 0.0, f32::NAN).is_err());
        assert!(monitor.arousal_history().is_empty());
        assert_eq!(monitor.current_arousal(), 0.3);
    }

    #[test]
    fn test_non_finite_signal_rejected_before_recording() {
        let mut monitor = ArousalMonitor::with_defaults("navigation");
        assert_eq!(
            monitor.compute_arousal(f32::INFINITY, 0.0, 50.0, 50.0),
            Err(ArousalError::NonFiniteSignal {
                signal: "prediction_error",
                value: f32::INFINITY,
            })
        );
        assert!(matches!(
            monitor.compute_arousal(0.0, f32::NAN, 50.0, 50.0),
            Err(ArousalError::NonFiniteSignal { signal: "reward_magnitude", .. })
        ));
        assert!(matches!(
            monitor.compute_arousal(0.0, 0.0, f32::NEG_INFINITY, 50.0),
            Err(ArousalError::NonFiniteSignal { signal: "time_remaining", .. })
        ));
        assert!(monitor.arousal_history().is_empty());
        assert!(monitor.surprise_history().is_empty());
        assert_eq!(monitor.current_arousal(), 0.3);
    }

    #[test]
    fn test_overflowing_signal_is_fully_damped() {
        let mut monitor = ArousalMonitor::with_defaults("social");
        let a = monitor
            .compute_arousal(f32::MAX, f32::MAX, 50.0, 50.0)
            .unwrap();
        // Far past the stress threshold the inverted-U drives arousal to zero
        assert!((0.0..=1.0).contains(&a));
        assert!(a < 0.3);
        for history in [
            monitor.arousal_history(),
            monitor.surprise_history(),
            monitor.salience_history(),
            monitor.stress_history(),
        ] {
            assert_eq!(history.len(), 1);
            assert!(history[0].is_finite());
        }
    }

    #[test]
    fn test_learning_rate_and_exploration() {
        let mut monitor = ArousalMonitor::with_defaults("navigation");
        assert!((monitor.learning_rate_multiplier(0.1, None) - 0.13).abs() < EPS);
        assert!((monitor.learning_rate_multiplier(0.1, Some(1.0)) - 0.2).abs() < EPS);
        // Out-of-range input is clamped
        assert!((monitor.learning_rate_multiplier(0.1, Some(3.0)) - 0.2).abs() < EPS);
        assert!((monitor.learning_rate_multiplier(0.1, Some(-1.0)) - 0.1).abs() < EPS);

        assert!((monitor.exploration_bonus(0.1, Some(0.5)) - 0.15).abs() < EPS);
        assert_eq!(monitor.exploration_bonus(0.8, Some(1.0)), 1.0);

        monitor.compute_arousal(2.0, 0.0, 50.0, 50.0).unwrap();
        let a = monitor.current_arousal();
        assert!((monitor.exploration_bonus(0.2, None) - 0.2 * (1.0 + a)).abs() < EPS);
    }

    #[test]
    fn test_reset_keeps_history_and_clear_keeps_scalar() {
        let mut monitor = ArousalMonitor::with_defaults("social");
        monitor.compute_arousal(2.0, 1.0, 10.0, 50.0).unwrap();
        monitor.compute_arousal(0.5, 0.0, 5.0, 50.0).unwrap();
        let last = monitor.current_arousal();

        monitor.reset();
        assert_eq!(monitor.current_arousal(), 0.3);
        assert_eq!(monitor.arousal_history().len(), 2);

        monitor.compute_arousal(1.0, 1.0, 5.0, 50.0).unwrap();
        let current = monitor.current_arousal();
        monitor.clear_history();
        assert!(monitor.arousal_history().is_empty());
        assert!(monitor.stress_history().is_empty());
        assert_eq!(monitor.current_arousal(), current);
        assert_ne!(last, 0.3);
    }

    #[test]
    fn test_statistics_empty_history() {
        let monitor = ArousalMonitor::new(
            "navigation",
            ArousalConfig {
                base_arousal: 0.4,
                ..ArousalConfig::default()
            },
        );
        let stats = monitor.statistics();
        assert_eq!(
            stats,
            ArousalStatistics {
                mean: 0.4,
                std: 0.0,
                min: 0.4,
                max: 0.4,
                final_arousal: 0.4,
            }
        );
    }

    #[test]
    fn test_statistics_over_history() {
        let mut monitor = ArousalMonitor::with_defaults("navigation");
        monitor.compute_arousal(0.0, 0.0, 50.0, 50.0).unwrap(); // 0.3
        monitor.compute_arousal(-1.0, -2.0, 25.0, 50.0).unwrap(); // 0.792

        let stats = monitor.statistics();
        assert!((stats.mean - 0.546).abs() < 1e-5);
        assert!((stats.std - 0.246).abs() < 1e-5);
        assert!((stats.min - 0.3).abs() < EPS);
        assert!((stats.max - 0.792).abs() < 1e-5);
        assert!((stats.final_arousal - 0.792).abs() < 1e-5);
    }

    #[test]
    fn test_statistics_serialize_with_final_key() {
        let monitor = ArousalMonitor::with_defaults("social");
        let json = serde_json::to_value(monitor.statistics()).unwrap();
        assert!(json.get("final").is_some());
        assert!(json.get("final_arousal").is_none());
    }
}
