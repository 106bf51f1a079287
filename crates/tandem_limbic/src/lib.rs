//! # Tandem Limbic
//!
//! Fast scalar signals that decide where learning attention goes. One
//! [`ArousalMonitor`] runs per feedback domain:
//!
//! - **navigation** ("state"): wall collisions, wasted interactions, the goal
//! - **social** ("agent"): hostile NPC encounters
//!
//! The [`ArousalIntegrator`] then turns the pair of arousal values into
//! [`AttentionWeights`] that a learner uses to blend its two update streams.
//!
//! ## Signal path
//!
//! 1. Driver steps the environment and derives per-domain prediction errors
//! 2. Each monitor maps (error, reward, time left) to arousal in [0, 1]
//! 3. The integrator combines both arousals (weighted or gated)

mod arousal;
mod error;
mod integration;

pub use arousal::{ArousalMonitor, ArousalStatistics};
pub use error::ArousalError;
pub use integration::{ArousalIntegrator, AttentionWeights};
