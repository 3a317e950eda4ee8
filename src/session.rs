//! The one live selection state, owned by whichever host drives the UI.

use tracing::debug;

use crate::catalog::Catalog;
use crate::html::HtmlRenderer;
use crate::layout::LayoutEngine;
use crate::state::{Action, ActionError, SelectionState};
use crate::svg::SvgRenderer;
use crate::view_model::{self, ViewModel};

pub struct Session<'a> {
    catalog: &'a Catalog,
    engine: LayoutEngine,
    html: HtmlRenderer,
    state: SelectionState,
}

impl<'a> Session<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self::with_state(catalog, SelectionState::default())
    }

    pub fn with_state(catalog: &'a Catalog, state: SelectionState) -> Self {
        Self {
            catalog,
            engine: LayoutEngine::default(),
            html: HtmlRenderer::default(),
            state,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn apply(&mut self, action: &Action) {
        self.state = std::mem::take(&mut self.state).apply(action);
    }

    /// Parse and apply an encoded action such as `entity:books`.
    pub fn dispatch(&mut self, encoded: &str) -> Result<(), ActionError> {
        let action: Action = encoded.parse()?;
        self.apply(&action);
        Ok(())
    }

    pub fn view_model(&self) -> ViewModel {
        ViewModel::build(self.catalog, &self.engine, &self.state)
    }

    pub fn render_html(&self) -> String {
        let html = self.html.render(&self.view_model());
        debug!(bytes = html.len(), tab = self.state.tab.as_str(), "rendered markup");
        html
    }

    /// Schema diagram alone, regardless of the active tab.
    pub fn render_svg(&self) -> String {
        let diagram = view_model::diagram(&self.catalog.schema, &self.engine, &self.state);
        SvgRenderer::default().render(&diagram)
    }

    pub fn view_model_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.view_model())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Tab;

    #[test]
    fn test_dispatch_sequence() {
        let catalog = Catalog::load().unwrap();
        let mut session = Session::new(&catalog);

        session.dispatch("entity:book_authors").unwrap();
        assert!(session.render_html().contains("<h3>Book_Authors Table</h3>"));

        session.dispatch("entity:books").unwrap();
        assert_eq!(session.state().active_entity(), Some("books"));
        assert_eq!(session.state().active_operation(), None);

        session.dispatch("tab:operations").unwrap();
        session.dispatch("operation:issue_book").unwrap();
        assert_eq!(session.state().tab, Tab::Operations);
        assert_eq!(session.state().active_entity(), None);
        assert!(session.render_html().contains("Stored Procedure: issue_book"));
    }

    #[test]
    fn test_bad_action_leaves_state_alone() {
        let catalog = Catalog::load().unwrap();
        let mut session = Session::new(&catalog);
        assert!(session.dispatch("tab:admin").is_err());
        assert_eq!(session.state(), &SelectionState::default());
    }

    #[test]
    fn test_stale_operation_renders_no_panel() {
        let catalog = Catalog::load().unwrap();
        let mut session = Session::new(&catalog);
        session.dispatch("tab:operations").unwrap();
        session.dispatch("operation:burn_book").unwrap();
        let html = session.render_html();
        assert!(!html.contains("Stored Procedure:"));
        assert!(html.contains("<h3>Stored Procedures</h3>"));
    }

    #[test]
    fn test_svg_available_from_any_tab() {
        let catalog = Catalog::load().unwrap();
        let mut session = Session::new(&catalog);
        session.dispatch("tab:workflow").unwrap();
        assert!(session.render_svg().contains(">Books</text>"));
    }

    #[test]
    fn test_view_model_json() {
        let catalog = Catalog::load().unwrap();
        let session = Session::new(&catalog);
        let json = session.view_model_json().unwrap();
        assert!(json.contains(r#""title":"Library Management System Database Visualization""#));
    }
}
