//! Gridworld state model
//!
//! The observation is decomposed along the two feedback domains:
//! - Navigation ("state" domain): `agent_pos`, `goal_pos`
//! - Social ("agent" domain): `npc_mood_estimate`, `interaction_count`
//!
//! Every value here is plain data. The environment produces a fresh
//! [`GridState`] on each transition instead of mutating the previous one.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Grid coordinate. `x` is the column, `y` the row, `(0, 0)` is top-left.
///
/// Serialized as a two-element array so configs can write `[2, 2]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan(&self, other: &Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn offset(&self, (dx, dy): (i32, i32)) -> Position {
        Position::new(self.x + dx, self.y + dy)
    }

    pub fn in_bounds(&self, size: u32) -> bool {
        let size = size as i64;
        (0..size).contains(&(self.x as i64)) && (0..size).contains(&(self.y as i64))
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl From<Position> for (i32, i32) {
    fn from(p: Position) -> Self {
        (p.x, p.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Discrete actions available to the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    /// Approach and query the NPC. Only has an effect when adjacent.
    Interact,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Up,
        Action::Down,
        Action::Left,
        Action::Right,
        Action::Interact,
    ];

    /// Position delta for movement actions; `None` for `Interact`.
    pub fn delta(self) -> Option<(i32, i32)> {
        match self {
            Action::Up => Some((0, -1)),
            Action::Down => Some((0, 1)),
            Action::Left => Some((-1, 0)),
            Action::Right => Some((1, 0)),
            Action::Interact => None,
        }
    }
}

/// NPC disposition. Hidden from the agent until an adjacent interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NpcMood {
    Friendly,
    Neutral,
    Hostile,
}

impl NpcMood {
    pub const ALL: [NpcMood; 3] = [NpcMood::Friendly, NpcMood::Neutral, NpcMood::Hostile];

    /// Reward paid for an adjacent interaction in this mood.
    pub fn interaction_reward(self) -> f32 {
        match self {
            NpcMood::Friendly => 1.0,
            NpcMood::Neutral => 0.0,
            NpcMood::Hostile => -5.0,
        }
    }

    /// The two moods different from `self`, in declaration order.
    pub fn others(self) -> [NpcMood; 2] {
        match self {
            NpcMood::Friendly => [NpcMood::Neutral, NpcMood::Hostile],
            NpcMood::Neutral => [NpcMood::Friendly, NpcMood::Hostile],
            NpcMood::Hostile => [NpcMood::Friendly, NpcMood::Neutral],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NpcMood::Friendly => "FRIENDLY",
            NpcMood::Neutral => "NEUTRAL",
            NpcMood::Hostile => "HOSTILE",
        }
    }
}

impl fmt::Display for NpcMood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Complete environment snapshot for one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridState {
    pub agent_pos: Position,
    pub goal_pos: Position,
    pub npc_pos: Position,
    /// Ground truth, not meant for the agent's policy.
    pub npc_mood_actual: NpcMood,
    /// Agent's belief about the NPC; `None` until an adjacent interaction.
    pub npc_mood_estimate: Option<NpcMood>,
    pub interaction_count: u32,
    pub steps: u32,
}

impl GridState {
    pub fn is_adjacent_to_npc(&self) -> bool {
        self.agent_pos.manhattan(&self.npc_pos) == 1
    }

    pub fn distance_to_goal(&self) -> u32 {
        self.agent_pos.manhattan(&self.goal_pos)
    }
}

/// Per-domain error magnitudes for one step.
///
/// At most one field is nonzero: a single action can only be a navigation
/// mistake or a social one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StepInfo {
    /// Navigation mistakes: wall collisions, interacting out of reach.
    pub state_error: f32,
    /// Social mistakes: engaging a hostile NPC.
    pub agent_error: f32,
}

/// Experience tuple handed back by [`GridEnvironment::step`](crate::GridEnvironment::step).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub state: GridState,
    pub action: Action,
    pub reward: f32,
    pub next_state: GridState,
    pub done: bool,
    pub info: StepInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_bounds() {
        assert!(Position::new(0, 0).in_bounds(5));
        assert!(Position::new(4, 4).in_bounds(5));
        assert!(!Position::new(5, 0).in_bounds(5));
        assert!(!Position::new(0, -1).in_bounds(5));
        assert!(!Position::new(0, 0).in_bounds(0));
    }

    #[test]
    fn test_manhattan() {
        let npc = Position::new(2, 2);
        assert_eq!(Position::new(2, 1).manhattan(&npc), 1);
        assert_eq!(Position::new(1, 1).manhattan(&npc), 2);
        assert_eq!(npc.manhattan(&npc), 0);
    }

    #[test]
    fn test_action_deltas() {
        assert_eq!(Action::Up.delta(), Some((0, -1)));
        assert_eq!(Action::Down.delta(), Some((0, 1)));
        assert_eq!(Action::Left.delta(), Some((-1, 0)));
        assert_eq!(Action::Right.delta(), Some((1, 0)));
        assert_eq!(Action::Interact.delta(), None);
    }

    #[test]
    fn test_mood_others_excludes_self() {
        for mood in NpcMood::ALL {
            let others = mood.others();
            assert!(!others.contains(&mood));
            assert_ne!(others[0], others[1]);
        }
    }

    #[test]
    fn test_position_serializes_as_pair() {
        let json = serde_json::to_string(&Position::new(3, 1)).unwrap();
        assert_eq!(json, "[3,1]");
        let back: Position = serde_json::from_str("[0,4]").unwrap();
        assert_eq!(back, Position::new(0, 4));
    }
}
