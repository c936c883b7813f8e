use serde::{Deserialize, Serialize};

use crate::models::recommendation::{RecommendationItem, ALL_STATES};

/// List-level filter over already fetched results. Never touches the network.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ResultFilter {
    /// State name, or "all".
    #[serde(default = "all_states")]
    pub state: String,
    /// Destination type, or empty for any.
    #[serde(rename = "type", default)]
    pub kind: String,
}

fn all_states() -> String {
    ALL_STATES.to_string()
}

impl Default for ResultFilter {
    fn default() -> Self {
        Self {
            state: all_states(),
            kind: String::new(),
        }
    }
}

impl ResultFilter {
    pub fn new(state: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            kind: kind.into(),
        }
    }

    pub fn matches(&self, item: &RecommendationItem) -> bool {
        let state_ok = self.state.eq_ignore_ascii_case(ALL_STATES)
            || item.state.to_lowercase() == self.state.to_lowercase();
        let kind_ok =
            self.kind.is_empty() || item.kind.to_lowercase() == self.kind.to_lowercase();
        state_ok && kind_ok
    }

    pub fn apply<'a>(&self, results: &'a [RecommendationItem]) -> Vec<&'a RecommendationItem> {
        results.iter().filter(|item| self.matches(item)).collect()
    }
}

/// Distinct states in first-seen order.
pub fn available_states(results: &[RecommendationItem]) -> Vec<String> {
    let mut states: Vec<String> = Vec::new();
    for item in results {
        if !states.contains(&item.state) {
            states.push(item.state.clone());
        }
    }
    states
}
