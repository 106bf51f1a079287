//! # Tandem Core
//!
//! The environment half of the two-domain arousal testbed: a small social
//! gridworld whose reward splits cleanly into a navigation source and a
//! social source, plus the configuration shared by the whole workspace.
//!
//! Drivers own the composition: reset the [`GridEnvironment`], step it,
//! read the per-domain errors from each [`Transition`], and feed them to
//! the arousal monitors in `tandem_limbic`.

pub mod config;
mod error;
mod grid;
pub mod state;

pub use config::{ArousalConfig, GridConfig, IntegrationStrategy, TandemConfig};
pub use error::GridError;
pub use grid::{GridEnvironment, MAX_GRID_SIZE};
pub use state::{Action, GridState, NpcMood, Position, StepInfo, Transition};
