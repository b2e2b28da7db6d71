use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ai::eval::Evaluation;
use crate::types::Side;

pub const DEFAULT_MAX_DEPTH: u8 = 20;
const INTERACTIVE_BUDGET_MS: u64 = 1_000;

/// Search agent settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Plies explored below the current position.
    pub max_depth: u8,
    /// When set, deepen iteratively from depth 1 and keep the last depth that
    /// finished inside the budget. Depth 1 always finishes.
    pub time_budget_ms: Option<u64>,
    pub evaluation: Evaluation,
}

impl SearchConfig {
    pub fn with_depth(max_depth: u8) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }

    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_ms.map(Duration::from_millis)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            time_budget_ms: None,
            evaluation: Evaluation::default(),
        }
    }
}

/// Which registered side opens the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FirstMover {
    /// The first side passed to registration moves first.
    #[default]
    SideA,
    /// Chosen by a generator seeded with `seed`.
    Random { seed: u64 },
}

/// Settings for a host-constructed match (dark is side A).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub search: SearchConfig,
    pub first_mover: FirstMover,
    /// Side played by the search agent, if any.
    pub automated: Option<Side>,
}

impl MatchConfig {
    /// Light is automated and answers within a one-second budget.
    pub fn interactive() -> Self {
        Self {
            search: SearchConfig {
                time_budget_ms: Some(INTERACTIVE_BUDGET_MS),
                ..SearchConfig::default()
            },
            ..Self::default()
        }
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            first_mover: FirstMover::SideA,
            automated: Some(Side::Light),
        }
    }
}
