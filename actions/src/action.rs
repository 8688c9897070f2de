//! Action definitions and the runtime action type.

use serde::{Deserialize, Serialize};

/// Icon used when a definition leaves its icon empty.
pub const DEFAULT_ACTION_ICON: &str = "object-unlocked";

/// Name of the synthetic action that shows a whole file.
pub const SHOW_CONTENTS_ACTION: &str = "show-file-contents";

/// Icon of the synthetic show-contents action.
pub const SHOW_CONTENTS_ICON: &str = "document-new";

/// A persisted `{name, icon, regex}` triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDefinition {
    /// Unique display name.
    pub name: String,

    /// Theme icon name; empty means the default icon.
    #[serde(default)]
    pub icon: String,

    /// Extraction pattern; the first capture group is the value.
    pub regex: String,
}

impl ActionDefinition {
    /// Create a new definition.
    pub fn new(name: impl Into<String>, icon: impl Into<String>, regex: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: icon.into(),
            regex: regex.into(),
        }
    }
}

/// Everything the registry is built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionSettings {
    /// Offer the configured extraction actions.
    pub show_actions: bool,

    /// Offer the trailing show-contents action.
    pub show_raw_content_action: bool,

    /// Definitions in configured order.
    pub definitions: Vec<ActionDefinition>,
}

/// What an action does with decrypted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionRule {
    /// Copy the first capture group of `pattern`.
    Extract {
        /// Multi-line regular expression.
        pattern: String,
    },

    /// Display the whole decrypted text instead of copying.
    ShowContents,
}

/// An action offered for every match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    /// Unique name, also the identity.
    pub name: String,

    /// Theme icon name.
    pub icon: String,

    /// Extraction rule.
    pub rule: ActionRule,

    /// Position in the registry.
    pub order: usize,
}

impl Action {
    /// Build an extraction action from its definition.
    pub fn from_definition(definition: &ActionDefinition, order: usize) -> Self {
        let icon = if definition.icon.trim().is_empty() {
            DEFAULT_ACTION_ICON.to_string()
        } else {
            definition.icon.clone()
        };

        Self {
            name: definition.name.clone(),
            icon,
            rule: ActionRule::Extract {
                pattern: definition.regex.clone(),
            },
            order,
        }
    }

    /// The synthetic show-contents action.
    pub fn show_contents(order: usize) -> Self {
        Self {
            name: SHOW_CONTENTS_ACTION.to_string(),
            icon: SHOW_CONTENTS_ICON.to_string(),
            rule: ActionRule::ShowContents,
            order,
        }
    }

    /// Whether this is the show-contents action.
    pub fn shows_contents(&self) -> bool {
        self.rule == ActionRule::ShowContents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_icon_falls_back() {
        let action = Action::from_definition(&ActionDefinition::new("user", " ", "user: (.+)"), 0);

        assert_eq!(action.icon, DEFAULT_ACTION_ICON);
        assert_eq!(
            action.rule,
            ActionRule::Extract {
                pattern: "user: (.+)".to_string()
            }
        );
    }

    #[test]
    fn test_definition_icon_defaults_to_empty() {
        let definition: ActionDefinition =
            serde_json::from_str(r#"{"name": "user", "regex": "user: (.+)"}"#).unwrap();

        assert_eq!(definition, ActionDefinition::new("user", "", "user: (.+)"));
    }
}
