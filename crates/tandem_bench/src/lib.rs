//! tandem_bench — trajectory simulation for the arousal testbed.
//!
//! Plays the external driver role: one environment, one arousal monitor per
//! domain, one integration strategy, composed only through their public
//! operations. Validates end-to-end behaviour over whole episodes:
//! - Solvability (a goal-directed heuristic reaches the goal)
//! - Domain attribution (each mistake raises its own domain's arousal)
//! - Reproducibility (same seed, same trajectory)

use anyhow::Result;
use tandem_core::{
    Action, GridEnvironment, GridError, GridState, IntegrationStrategy, NpcMood, TandemConfig,
    Transition,
};
use tandem_limbic::{ArousalIntegrator, ArousalMonitor, AttentionWeights};

/// Per-domain signals derived from one transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainSignals {
    pub navigation_error: f32,
    pub social_error: f32,
    /// Everything except the NPC interaction payoff
    pub navigation_reward: f32,
    pub social_reward: f32,
}

impl DomainSignals {
    pub fn from_transition(t: &Transition) -> Self {
        let social_reward = if t.action == Action::Interact && t.state.is_adjacent_to_npc() {
            t.state.npc_mood_actual.interaction_reward()
        } else {
            0.0
        };
        Self {
            navigation_error: t.info.state_error,
            social_error: t.info.agent_error,
            navigation_reward: t.reward - social_reward,
            social_reward,
        }
    }
}

/// One step of a trial: the transition plus what the arousal layer made of it.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    pub transition: Transition,
    pub arousal_state: f32,
    pub arousal_agent: f32,
    pub weights: AttentionWeights,
}

#[derive(Debug, Clone)]
pub struct EpisodeSummary {
    pub total_reward: f32,
    pub records: Vec<StepRecord>,
}

impl EpisodeSummary {
    pub fn steps(&self) -> usize {
        self.records.len()
    }

    pub fn reached_goal(&self) -> bool {
        self.records.last().is_some_and(|r| {
            r.transition.done && r.transition.next_state.agent_pos == r.transition.state.goal_pos
        })
    }
}

/// A single experimental trial: environment + navigation/social monitors.
pub struct Trial {
    env: GridEnvironment,
    navigation: ArousalMonitor,
    social: ArousalMonitor,
    strategy: IntegrationStrategy,
}

impl Trial {
    pub fn new(config: &TandemConfig) -> Result<Self> {
        Ok(Self {
            env: GridEnvironment::new(config.grid.clone())?,
            navigation: ArousalMonitor::new("navigation", config.navigation.clone()),
            social: ArousalMonitor::new("social", config.social.clone()),
            strategy: config.integration,
        })
    }

    /// Reset the environment and rebase both monitors. Histories carry over.
    pub fn start_episode(&mut self) -> GridState {
        self.navigation.reset();
        self.social.reset();
        self.env.reset()
    }

    /// Step the environment and run the arousal layer on the result.
    pub fn step(&mut self, action: Action) -> Result<StepRecord> {
        let transition = self.env.step(action)?;
        let signals = DomainSignals::from_transition(&transition);

        let max_time = self.env.config().max_steps as f32;
        let remaining = max_time - transition.next_state.steps as f32;

        let arousal_state = self.navigation.compute_arousal(
            signals.navigation_error,
            signals.navigation_reward,
            remaining,
            max_time,
        )?;
        let arousal_agent = self.social.compute_arousal(
            signals.social_error,
            signals.social_reward,
            remaining,
            max_time,
        )?;
        let weights = ArousalIntegrator::integrate(&self.strategy, arousal_state, arousal_agent)?;

        Ok(StepRecord {
            transition,
            arousal_state,
            arousal_agent,
            weights,
        })
    }

    /// Play the current episode to termination.
    pub fn play<P>(&mut self, mut policy: P) -> Result<EpisodeSummary>
    where
        P: FnMut(&GridState) -> Action,
    {
        let mut state = self.env.state().cloned().ok_or(GridError::NotInitialized)?;
        let mut records = Vec::new();
        let mut total_reward = 0.0;

        loop {
            let record = self.step(policy(&state))?;
            total_reward += record.transition.reward;
            state = record.transition.next_state.clone();
            let done = record.transition.done;
            records.push(record);
            if done {
                break;
            }
        }

        tracing::debug!(
            "Episode {} done: {} steps, total reward {:.2}",
            self.env.episode_count(),
            records.len(),
            total_reward
        );

        Ok(EpisodeSummary {
            total_reward,
            records,
        })
    }

    pub fn run_episode<P>(&mut self, policy: P) -> Result<EpisodeSummary>
    where
        P: FnMut(&GridState) -> Action,
    {
        self.start_episode();
        self.play(policy)
    }

    pub fn env(&self) -> &GridEnvironment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut GridEnvironment {
        &mut self.env
    }

    pub fn navigation(&self) -> &ArousalMonitor {
        &self.navigation
    }

    pub fn social(&self) -> &ArousalMonitor {
        &self.social
    }
}

/// Move toward the goal, query the NPC once when adjacent, and step away
/// from it when it is known to be hostile.
pub fn goal_directed_policy(state: &GridState) -> Action {
    let (agent, npc, goal) = (state.agent_pos, state.npc_pos, state.goal_pos);

    if state.is_adjacent_to_npc() {
        match state.npc_mood_estimate {
            Some(NpcMood::Hostile) => {
                return if agent.x < npc.x {
                    Action::Left
                } else if agent.x > npc.x {
                    Action::Right
                } else if agent.y < npc.y {
                    Action::Up
                } else {
                    Action::Down
                };
            }
            None => return Action::Interact,
            Some(_) => {}
        }
    }

    if agent.x < goal.x {
        Action::Right
    } else if agent.x > goal.x {
        Action::Left
    } else if agent.y < goal.y {
        Action::Down
    } else {
        Action::Up
    }
}
