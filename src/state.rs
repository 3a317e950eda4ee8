//! Selection state and the interactions that move it.
//!
//! Every transition is a pure function from one state value to the next. The
//! host keeps the single live instance and re-renders after each call.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use tracing::debug;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ActionError {
    #[error("Unknown tab: {0}")]
    UnknownTab(String),
    #[error("Unknown action: {0}")]
    UnknownAction(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Schema,
    Operations,
    Workflow,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Schema, Tab::Operations, Tab::Workflow];

    pub fn as_str(self) -> &'static str {
        match self {
            Tab::Schema => "schema",
            Tab::Operations => "operations",
            Tab::Workflow => "workflow",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tab::Schema => "Database Schema",
            Tab::Operations => "Procedures & Triggers",
            Tab::Workflow => "Library Workflows",
        }
    }
}

impl FromStr for Tab {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "schema" => Ok(Tab::Schema),
            "operations" => Ok(Tab::Operations),
            "workflow" => Ok(Tab::Workflow),
            _ => Err(ActionError::UnknownTab(s.to_string())),
        }
    }
}

/// Focused entity or procedure. Never both.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum Selection {
    #[default]
    None,
    Entity(String),
    Operation(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionState {
    pub tab: Tab,
    pub selection: Selection,
    pub relationships_visible: bool,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self {
            tab: Tab::Schema,
            selection: Selection::Entity("books".to_string()),
            relationships_visible: true,
        }
    }
}

impl SelectionState {
    pub fn select_tab(self, tab: Tab) -> Self {
        Self { tab, ..self }
    }

    pub fn select_entity(self, key: &str) -> Self {
        Self {
            selection: Selection::Entity(key.to_string()),
            ..self
        }
    }

    pub fn select_operation(self, name: &str) -> Self {
        Self {
            selection: Selection::Operation(name.to_string()),
            ..self
        }
    }

    pub fn toggle_relationships(self) -> Self {
        Self {
            relationships_visible: !self.relationships_visible,
            ..self
        }
    }

    pub fn active_entity(&self) -> Option<&str> {
        match &self.selection {
            Selection::Entity(key) => Some(key),
            _ => None,
        }
    }

    pub fn active_operation(&self) -> Option<&str> {
        match &self.selection {
            Selection::Operation(name) => Some(name),
            _ => None,
        }
    }

    pub fn apply(self, action: &Action) -> Self {
        let next = match action {
            Action::SelectTab(tab) => self.select_tab(*tab),
            Action::SelectEntity(key) => self.select_entity(key),
            Action::SelectOperation(name) => self.select_operation(name),
            Action::ToggleRelationships => self.toggle_relationships(),
        };
        debug!(%action, tab = next.tab.as_str(), selection = ?next.selection, "state transition");
        next
    }
}

/// One user interaction, as encoded in rendered markup (`data-action`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SelectTab(Tab),
    SelectEntity(String),
    SelectOperation(String),
    ToggleRelationships,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::SelectTab(tab) => write!(f, "tab:{}", tab.as_str()),
            Action::SelectEntity(key) => write!(f, "entity:{}", key),
            Action::SelectOperation(name) => write!(f, "operation:{}", name),
            Action::ToggleRelationships => f.write_str("toggle-relationships"),
        }
    }
}

impl FromStr for Action {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "toggle-relationships" {
            return Ok(Action::ToggleRelationships);
        }
        match s.split_once(':') {
            Some(("tab", tab)) => Ok(Action::SelectTab(tab.parse()?)),
            Some(("entity", key)) => Ok(Action::SelectEntity(key.to_string())),
            Some(("operation", name)) => Ok(Action::SelectOperation(name.to_string())),
            _ => Err(ActionError::UnknownAction(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = SelectionState::default();
        assert_eq!(state.tab, Tab::Schema);
        assert_eq!(state.active_entity(), Some("books"));
        assert_eq!(state.active_operation(), None);
        assert!(state.relationships_visible);
    }

    #[test]
    fn test_selecting_entity_clears_operation() {
        let state = SelectionState::default()
            .select_operation("issue_book")
            .select_entity("loans");
        assert_eq!(state.active_entity(), Some("loans"));
        assert_eq!(state.active_operation(), None);
    }

    #[test]
    fn test_selecting_operation_clears_entity() {
        let state = SelectionState::default().select_operation("return_book");
        assert_eq!(state.active_operation(), Some("return_book"));
        assert_eq!(state.active_entity(), None);
    }

    #[test]
    fn test_double_toggle_restores_visibility() {
        let state = SelectionState::default();
        let toggled = state.clone().toggle_relationships();
        assert!(!toggled.relationships_visible);
        assert_eq!(toggled.toggle_relationships(), state);
    }

    #[test]
    fn test_tab_does_not_touch_selection() {
        let state = SelectionState::default().select_tab(Tab::Operations);
        assert_eq!(state.tab, Tab::Operations);
        assert_eq!(state.active_entity(), Some("books"));
        assert!(state.relationships_visible);
    }

    #[test]
    fn test_parse_actions() {
        assert_eq!(
            "tab:workflow".parse::<Action>(),
            Ok(Action::SelectTab(Tab::Workflow))
        );
        assert_eq!(
            "entity:book_authors".parse::<Action>(),
            Ok(Action::SelectEntity("book_authors".into()))
        );
        assert_eq!(
            "entity:".parse::<Action>(),
            Ok(Action::SelectEntity(String::new()))
        );
        assert_eq!(
            "operation:issue_book".parse::<Action>(),
            Ok(Action::SelectOperation("issue_book".into()))
        );
        assert_eq!(
            "toggle-relationships".parse::<Action>(),
            Ok(Action::ToggleRelationships)
        );
        assert_eq!(
            "tab:settings".parse::<Action>(),
            Err(ActionError::UnknownTab("settings".into()))
        );
        assert!(matches!(
            "explode".parse::<Action>(),
            Err(ActionError::UnknownAction(_))
        ));
    }

    #[test]
    fn test_action_display_round_trips() {
        for action in [
            Action::SelectTab(Tab::Operations),
            Action::SelectEntity("fines".into()),
            Action::SelectOperation("renew_loan".into()),
            Action::ToggleRelationships,
        ] {
            assert_eq!(action.to_string().parse::<Action>(), Ok(action));
        }
    }

    #[test]
    fn test_apply_dispatches() {
        let state = SelectionState::default()
            .apply(&Action::SelectTab(Tab::Operations))
            .apply(&Action::SelectOperation("issue_book".into()))
            .apply(&Action::ToggleRelationships);
        assert_eq!(state.tab, Tab::Operations);
        assert_eq!(state.active_operation(), Some("issue_book"));
        assert!(!state.relationships_visible);
    }
}
