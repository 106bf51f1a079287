//! SimpleSocialGridWorld: two-domain episodic environment
//!
//! Reward is decomposed into two separable sources so that each domain can
//! drive its own arousal signal:
//! - Navigation: step cost, wall collisions, reaching the goal
//! - Social: interacting with an NPC whose mood is only revealed on contact
//!
//! The NPC mood drifts every `mood_change_frequency` episodes, always to a
//! different mood, so a learner has to re-assess the social domain.
//!
//! ## Reward rules (applied additively, in order)
//!
//! 1. Step cost: -0.1
//! 2. Interact: adjacent → mood reward (hostile -5, friendly +1, neutral 0);
//!    out of reach → -0.5
//! 3. Move: out of bounds → -1, stay in place
//! 4. Goal reached: +10, episode ends
//! 5. Timeout at `max_steps`: episode ends

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::GridConfig;
use crate::error::GridError;
use crate::state::{Action, GridState, NpcMood, Position, StepInfo, Transition};

const STEP_COST: f32 = 0.1;
const WASTED_INTERACT_PENALTY: f32 = 0.5;
const WALL_PENALTY: f32 = 1.0;
const GOAL_REWARD: f32 = 10.0;
/// Hostile interactions at or beyond this count end the episode.
const HOSTILE_INTERACTION_LIMIT: u32 = 3;
/// Largest accepted side length. Keeps coordinates in `i32` and `render()`
/// allocations small.
pub const MAX_GRID_SIZE: u32 = 1024;

/// Deterministic episodic gridworld.
///
/// Owns its random source: two environments built from the same seed and
/// driven with the same actions produce identical transitions.
pub struct GridEnvironment {
    config: GridConfig,
    rng: ChaCha8Rng,
    episode_count: u64,
    current_mood: NpcMood,
    /// `None` until the first `reset()`
    state: Option<GridState>,
    episode_done: bool,
    /// Final-step reward of every finished episode
    reward_history: Vec<f32>,
}

impl GridEnvironment {
    /// Build an environment, rejecting layouts the state machine can't run.
    pub fn new(config: GridConfig) -> Result<Self, GridError> {
        Self::validate(&config)?;

        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Ok(Self {
            config,
            rng,
            episode_count: 0,
            current_mood: NpcMood::Neutral,
            state: None,
            episode_done: false,
            reward_history: Vec::new(),
        })
    }

    fn validate(config: &GridConfig) -> Result<(), GridError> {
        let invalid = |msg: String| Err(GridError::InvalidConfig(msg));

        if config.size == 0 {
            return invalid("size must be at least 1".into());
        }
        if config.size > MAX_GRID_SIZE {
            return invalid(format!(
                "size {} exceeds the maximum of {}",
                config.size, MAX_GRID_SIZE
            ));
        }
        if !config.goal_position.in_bounds(config.size) {
            return invalid(format!(
                "goal_position {} outside {}x{} grid",
                config.goal_position, config.size, config.size
            ));
        }
        if !config.npc_position.in_bounds(config.size) {
            return invalid(format!(
                "npc_position {} outside {}x{} grid",
                config.npc_position, config.size, config.size
            ));
        }
        // Goal and NPC on distinct in-bounds cells implies size >= 2, which
        // leaves at least two free start cells.
        if config.goal_position == config.npc_position {
            return invalid("goal_position and npc_position must differ".into());
        }
        if config.mood_change_frequency == 0 {
            return invalid("mood_change_frequency must be positive".into());
        }
        if config.max_steps == 0 {
            return invalid("max_steps must be positive".into());
        }
        Ok(())
    }

    /// Start a new episode.
    ///
    /// Draws a new NPC mood on every `mood_change_frequency`-th episode and
    /// places the agent uniformly on any cell other than the goal and the NPC.
    pub fn reset(&mut self) -> GridState {
        self.episode_count += 1;

        if self.episode_count % self.config.mood_change_frequency == 0 {
            self.update_npc_mood();
        }

        let agent_pos = self.random_start();

        let state = GridState {
            agent_pos,
            goal_pos: self.config.goal_position,
            npc_pos: self.config.npc_position,
            npc_mood_actual: self.current_mood,
            npc_mood_estimate: None,
            interaction_count: 0,
            steps: 0,
        };

        tracing::debug!(
            "Episode {} reset: agent at {}, npc {}",
            self.episode_count,
            agent_pos,
            self.current_mood
        );

        self.state = Some(state.clone());
        self.episode_done = false;
        state
    }

    /// Apply one action and return the resulting transition.
    pub fn step(&mut self, action: Action) -> Result<Transition, GridError> {
        let state = self.state.clone().ok_or(GridError::NotInitialized)?;
        if self.episode_done {
            return Err(GridError::EpisodeFinished);
        }

        let mut reward = 0.0f32;
        let mut done = false;
        let mut info = StepInfo::default();

        // Always paid, whatever else happens
        reward -= STEP_COST;

        let prev_pos = state.agent_pos;
        let mut new_pos = prev_pos;
        let mut mood_estimate = state.npc_mood_estimate;
        let mut interaction_count = state.interaction_count;

        match action.delta() {
            None => {
                if state.is_adjacent_to_npc() {
                    let mood = state.npc_mood_actual;
                    mood_estimate = Some(mood);
                    reward += mood.interaction_reward();
                    if mood == NpcMood::Hostile {
                        info.agent_error = -NpcMood::Hostile.interaction_reward();
                    }

                    interaction_count += 1;
                    if interaction_count >= HOSTILE_INTERACTION_LIMIT && mood == NpcMood::Hostile {
                        done = true;
                    }
                } else {
                    // Out of reach: a positional misjudgment, not a social one
                    reward -= WASTED_INTERACT_PENALTY;
                    info.state_error = WASTED_INTERACT_PENALTY;
                }
            }
            Some(delta) => {
                let candidate = prev_pos.offset(delta);
                if candidate.in_bounds(self.config.size) {
                    new_pos = candidate;
                } else {
                    reward -= WALL_PENALTY;
                    info.state_error = WALL_PENALTY;
                }
            }
        }

        // Both positions are checked; they only differ after a real move.
        if prev_pos == state.goal_pos || new_pos == state.goal_pos {
            reward += GOAL_REWARD;
            done = true;
        }

        let steps = state.steps + 1;
        if steps >= self.config.max_steps {
            done = true;
        }

        let next_state = GridState {
            agent_pos: new_pos,
            goal_pos: state.goal_pos,
            npc_pos: state.npc_pos,
            npc_mood_actual: state.npc_mood_actual,
            npc_mood_estimate: mood_estimate,
            interaction_count,
            steps,
        };

        tracing::trace!(
            "step {:?}: {} -> {}, reward {:.2}, done {}",
            action,
            prev_pos,
            new_pos,
            reward,
            done
        );

        self.state = Some(next_state.clone());
        self.episode_done = done;

        if done {
            self.reward_history.push(reward);
            tracing::debug!(
                "Episode {} finished after {} steps (final reward {:.2})",
                self.episode_count,
                steps,
                reward
            );
        }

        Ok(Transition {
            state,
            action,
            reward,
            next_state,
            done,
            info,
        })
    }

    /// Human-readable grid dump for debugging. Not a stable format.
    pub fn render(&self) -> String {
        let Some(state) = &self.state else {
            return "Environment not initialized. Call reset().".to_string();
        };

        let size = self.config.size as usize;
        let mut grid = vec![vec!['.'; size]; size];

        // Later glyphs win when cells coincide
        for (pos, glyph) in [
            (state.goal_pos, 'G'),
            (state.npc_pos, 'N'),
            (state.agent_pos, 'A'),
        ] {
            grid[pos.y as usize][pos.x as usize] = glyph;
        }

        let rows: Vec<String> = grid
            .iter()
            .map(|row| {
                row.iter()
                    .map(|c| c.to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();

        let mut mood_line = format!("NPC: {}", state.npc_mood_actual);
        if let Some(estimate) = state.npc_mood_estimate {
            mood_line.push_str(&format!(" (Agent believes: {})", estimate));
        }

        format!("{}\n{}\nSteps: {}", rows.join("\n"), mood_line, state.steps)
    }

    /// Move the agent within the live episode.
    ///
    /// Scenario setup for drivers and tests (e.g. start next to the NPC).
    pub fn place_agent(&mut self, pos: Position) -> Result<(), GridError> {
        let size = self.config.size;
        let npc = self.config.npc_position;
        let state = self.state.as_mut().ok_or(GridError::NotInitialized)?;
        if !pos.in_bounds(size) || pos == npc {
            return Err(GridError::InvalidPlacement { x: pos.x, y: pos.y });
        }
        state.agent_pos = pos;
        Ok(())
    }

    /// Force the NPC mood until the next scheduled mood draw.
    ///
    /// Scenario setup for drivers and tests. The mood only changes between
    /// episodes, so this is refused once the live episode has taken a step.
    /// Called right after `reset()`, it also rewrites the fresh episode.
    pub fn override_mood(&mut self, mood: NpcMood) -> Result<(), GridError> {
        match self.state.as_mut() {
            Some(state) if state.steps > 0 && !self.episode_done => {
                return Err(GridError::EpisodeInProgress);
            }
            Some(state) if state.steps == 0 => state.npc_mood_actual = mood,
            _ => {}
        }
        self.current_mood = mood;
        Ok(())
    }

    pub fn state(&self) -> Option<&GridState> {
        self.state.as_ref()
    }

    pub fn episode_count(&self) -> u64 {
        self.episode_count
    }

    pub fn current_mood(&self) -> NpcMood {
        self.current_mood
    }

    pub fn reward_history(&self) -> &[f32] {
        &self.reward_history
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    fn update_npc_mood(&mut self) {
        let candidates = self.current_mood.others();
        let next = candidates[self.rng.gen_range(0..candidates.len())];
        tracing::debug!(
            "NPC mood change at episode {}: {} -> {}",
            self.episode_count,
            self.current_mood,
            next
        );
        self.current_mood = next;
    }

    fn random_start(&mut self) -> Position {
        // validate() caps size at MAX_GRID_SIZE
        let size = i32::try_from(self.config.size).unwrap_or(i32::MAX);
        loop {
            let pos = Position::new(self.rng.gen_range(0..size), self.rng.gen_range(0..size));
            if pos != self.config.goal_position && pos != self.config.npc_position {
                return pos;
            }
        }
    }
}
