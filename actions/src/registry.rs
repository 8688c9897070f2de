//! The ordered action registry.
//!
//! A registry is immutable: every configuration reload builds a new one and
//! the old one is dropped wholesale.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::action::{Action, ActionSettings, SHOW_CONTENTS_ACTION};
use crate::error::{ActionError, Result};

/// Actions offered for a match, in configured order.
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    actions: Vec<Action>,
}

impl ActionRegistry {
    /// Build the registry from settings.
    ///
    /// Duplicate names keep their first occurrence. The show-contents action,
    /// when enabled, always comes last and owns its name; a configured action
    /// with that name is dropped.
    pub fn build(settings: &ActionSettings) -> Self {
        let mut actions = Vec::new();
        let mut seen = HashSet::new();

        if settings.show_actions {
            for definition in &settings.definitions {
                if settings.show_raw_content_action && definition.name == SHOW_CONTENTS_ACTION {
                    warn!("Ignoring action {SHOW_CONTENTS_ACTION:?}: the name is reserved");
                    continue;
                }
                if !seen.insert(definition.name.as_str()) {
                    debug!("Skipping duplicate action: {}", definition.name);
                    continue;
                }
                actions.push(Action::from_definition(definition, actions.len()));
            }
        }

        if settings.show_raw_content_action {
            actions.push(Action::show_contents(actions.len()));
        }

        info!("Built action registry with {} actions", actions.len());
        Self { actions }
    }

    /// Get an action by name.
    pub fn get(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.name == name)
    }

    /// Get an action by name, as an owned snapshot for a retrieval.
    pub fn require(&self, name: &str) -> Result<Action> {
        self.get(name)
            .cloned()
            .ok_or_else(|| ActionError::NotFound(name.to_string()))
    }

    /// Iterate actions in order.
    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    /// The actions as a slice.
    pub fn as_slice(&self) -> &[Action] {
        &self.actions
    }

    /// Number of actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether no actions are offered.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
