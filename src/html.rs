//! Markup for the whole visualizer. Interactive elements carry a
//! `data-action` attribute holding the [`Action`](crate::state::Action)
//! dispatched when they are clicked; the entity dropdown carries
//! `data-action-prefix` and the chosen value is appended to it. `mount`
//! listens for both on the root element.

use std::fmt::{self, Write};

use crate::svg::{SvgRenderer, escape_xml};
use crate::view_model::{
    EntityDetail, OperationsTab, ProcedureDetail, SchemaTab, TabBody, ViewModel, WorkflowTab,
};
use crate::workflow::{FlowStep, Span, Workflow};

const STYLE: &str = r#"
  .library-erd { font-family: sans-serif; max-width: 72rem; margin: 0 auto; }
  .library-erd header { background: linear-gradient(to right, #1d4ed8, #7e22ce); color: #fff; padding: 1rem; }
  .library-erd nav button { padding: .5rem 1rem; border: none; background: none; color: #6b7280; cursor: pointer; }
  .library-erd nav button.active { color: #2563eb; border-bottom: 2px solid #2563eb; }
  .library-erd .panel { padding: 1rem; }
  .library-erd .card { padding: .75rem; border: 1px solid #e5e7eb; border-radius: .25rem; margin-bottom: .5rem; }
  .library-erd .card.selected { background: #dbeafe; border-color: #3b82f6; }
  .library-erd .diagram { height: 24rem; overflow: auto; border: 1px solid #e5e7eb; border-radius: .5rem; }
  .library-erd table { width: 100%; border-collapse: collapse; }
  .library-erd td, .library-erd th { border: 1px solid #e5e7eb; padding: .5rem; text-align: left; }
  .library-erd .swatch { display: inline-block; width: 1rem; height: 1rem; border-radius: 50%; margin-right: .25rem; }
  .library-erd .flow-step { color: #fff; padding: .5rem; border-radius: .25rem; display: inline-block; }
  .library-erd pre { background: #f3f4f6; padding: .5rem; font-size: .75rem; overflow-x: auto; }
"#;

#[derive(Default)]
pub struct HtmlRenderer {
    svg: SvgRenderer,
}

impl HtmlRenderer {
    /// Markup fragment suitable for `innerHTML`.
    pub fn render(&self, vm: &ViewModel) -> String {
        Fragment { renderer: self, vm }.to_string()
    }

    /// Standalone page wrapping the fragment.
    pub fn render_document(&self, vm: &ViewModel) -> String {
        format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
            escape_xml(vm.title),
            STYLE,
            self.render(vm)
        )
    }

    fn write_fragment(&self, out: &mut impl Write, vm: &ViewModel) -> fmt::Result {
        writeln!(out, r#"<div class="library-erd">"#)?;
        writeln!(
            out,
            r#"<header><h2>{}</h2><p>{}</p><p class="byline">{}</p></header>"#,
            escape_xml(vm.title),
            escape_xml(vm.subtitle),
            escape_xml(vm.byline)
        )?;

        writeln!(out, "<nav>")?;
        for tab in &vm.tabs {
            writeln!(
                out,
                r#"<button class="{}" data-action="{}">{}</button>"#,
                if tab.active { "tab active" } else { "tab" },
                escape_xml(&tab.action),
                escape_xml(tab.label)
            )?;
        }
        writeln!(out, "</nav>")?;

        match &vm.body {
            TabBody::Schema(tab) => self.write_schema_tab(out, tab)?,
            TabBody::Operations(tab) => self.write_operations_tab(out, tab)?,
            TabBody::Workflow(tab) => write_workflow_tab(out, tab)?,
        }

        writeln!(out, "</div>")
    }

    fn write_schema_tab(&self, out: &mut impl Write, tab: &SchemaTab) -> fmt::Result {
        writeln!(out, r#"<section class="panel schema">"#)?;

        writeln!(out, r#"<div class="controls">"#)?;
        writeln!(
            out,
            r#"<button class="toggle" aria-pressed="{}" data-action="{}">{}</button>"#,
            tab.toggle.pressed,
            escape_xml(&tab.toggle.action),
            tab.toggle.label
        )?;
        writeln!(out, r#"<select data-action-prefix="entity:">"#)?;
        write_option(out, "", tab.dropdown.placeholder, tab.dropdown.selected.is_empty())?;
        for option in &tab.dropdown.options {
            write_option(
                out,
                &option.key,
                &option.label,
                option.key == tab.dropdown.selected,
            )?;
        }
        writeln!(out, "</select>")?;
        writeln!(out, "</div>")?;

        write!(out, r#"<div class="legend"><strong>Table Types:</strong>"#)?;
        for entry in &tab.legend {
            write!(
                out,
                r#" <span><span class="swatch" style="background: {}"></span>{}</span>"#,
                entry.color, entry.label
            )?;
        }
        writeln!(out, "</div>")?;

        writeln!(out, r#"<div class="diagram">"#)?;
        out.write_str(&self.svg.render(&tab.diagram))?;
        writeln!(out, "</div>")?;

        if let Some(detail) = &tab.detail {
            write_entity_detail(out, detail)?;
        }

        writeln!(out, "</section>")
    }

    fn write_operations_tab(&self, out: &mut impl Write, tab: &OperationsTab) -> fmt::Result {
        writeln!(out, r#"<section class="panel operations">"#)?;

        writeln!(out, "<h3>Stored Procedures</h3>")?;
        for card in &tab.procedures {
            writeln!(
                out,
                r#"<div class="{}" data-action="{}"><h4>{}</h4><p>{}</p></div>"#,
                if card.selected { "card procedure selected" } else { "card procedure" },
                escape_xml(&card.action),
                escape_xml(&card.name),
                escape_xml(&card.description)
            )?;
        }

        writeln!(out, "<h3>Triggers</h3>")?;
        for card in &tab.triggers {
            writeln!(
                out,
                r#"<div class="card trigger"><h4>{}</h4><p class="summary">{}</p><p>{}</p><pre>{}</pre></div>"#,
                escape_xml(&card.name),
                escape_xml(&card.summary),
                escape_xml(&card.description),
                escape_xml(&card.effect)
            )?;
        }

        writeln!(out, "<h3>Views</h3>")?;
        for card in &tab.views {
            write!(
                out,
                r#"<div class="card view"><h4>{}</h4><p>{}</p><p><strong>Tables:</strong> {}</p>"#,
                escape_xml(&card.name),
                escape_xml(&card.description),
                escape_xml(&card.tables)
            )?;
            if let Some(filters) = &card.filters {
                write!(out, "<p><strong>Filters:</strong> {}</p>", escape_xml(filters))?;
            }
            if let Some(calculations) = &card.calculations {
                write!(
                    out,
                    "<p><strong>Calculations:</strong> {}</p>",
                    escape_xml(calculations)
                )?;
            }
            writeln!(out, "</div>")?;
        }

        if let Some(detail) = &tab.detail {
            write_procedure_detail(out, detail)?;
        }

        writeln!(out, "</section>")
    }
}

struct Fragment<'a> {
    renderer: &'a HtmlRenderer,
    vm: &'a ViewModel,
}

impl fmt::Display for Fragment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.renderer.write_fragment(f, self.vm)
    }
}

fn write_option(out: &mut impl Write, value: &str, label: &str, selected: bool) -> fmt::Result {
    writeln!(
        out,
        r#"<option value="{}"{}>{}</option>"#,
        escape_xml(value),
        if selected { " selected" } else { "" },
        escape_xml(label)
    )
}

fn write_entity_detail(out: &mut impl Write, detail: &EntityDetail) -> fmt::Result {
    writeln!(out, r#"<div class="detail entity">"#)?;
    writeln!(out, "<h3>{} Table</h3>", escape_xml(&detail.name))?;
    writeln!(
        out,
        "<p><strong>Primary Key:</strong> {}</p>",
        escape_xml(&detail.primary_key)
    )?;

    writeln!(out, "<h4>Columns:</h4>")?;
    writeln!(
        out,
        "<table><thead><tr><th>Name</th><th>Type</th><th>Description</th></tr></thead><tbody>"
    )?;
    for field in &detail.fields {
        writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_xml(&field.name),
            escape_xml(&field.typ),
            escape_xml(&field.description)
        )?;
    }
    writeln!(out, "</tbody></table>")?;

    writeln!(out, "<h4>Relationships:</h4>")?;
    writeln!(out, "<ul>")?;
    for rel in &detail.relationships {
        writeln!(
            out,
            r#"<li><strong>{}</strong> relationship with <button class="link" data-action="{}">{}</button> via {}</li>"#,
            rel.cardinality,
            escape_xml(&rel.action),
            escape_xml(&rel.target_label),
            escape_xml(&rel.via)
        )?;
    }
    writeln!(out, "</ul>")?;
    writeln!(out, "</div>")
}

fn write_procedure_detail(out: &mut impl Write, detail: &ProcedureDetail) -> fmt::Result {
    writeln!(out, r#"<div class="detail procedure">"#)?;
    writeln!(out, "<h3>Stored Procedure: {}</h3>", escape_xml(&detail.name))?;
    writeln!(out, "<p>{}</p>", escape_xml(&detail.description))?;

    writeln!(out, "<h4>Parameters:</h4>")?;
    writeln!(out, "<ul>")?;
    for param in &detail.parameters {
        writeln!(out, "<li>{}</li>", escape_xml(param))?;
    }
    writeln!(out, "</ul>")?;

    writeln!(out, "<h4>Implementation Steps:</h4>")?;
    writeln!(out, "<ol>")?;
    for step in &detail.steps {
        writeln!(out, "<li>{}</li>", escape_xml(step))?;
    }
    writeln!(out, "</ol>")?;
    writeln!(out, "</div>")
}

fn write_workflow_tab(out: &mut impl Write, tab: &WorkflowTab) -> fmt::Result {
    writeln!(out, r#"<section class="panel workflow">"#)?;
    writeln!(out, "<h3>{}</h3>", escape_xml(tab.heading))?;
    for flow in &tab.flows {
        write_flow(out, flow)?;
    }
    writeln!(out, "</section>")
}

fn write_flow(out: &mut impl Write, flow: &Workflow) -> fmt::Result {
    writeln!(out, r#"<div class="flow">"#)?;
    writeln!(out, "<h4>{}</h4>", escape_xml(flow.title))?;
    for (i, step) in flow.steps.iter().enumerate() {
        if i > 0 {
            writeln!(out, r#"<div class="arrow">&darr;</div>"#)?;
        }
        match step {
            FlowStep::Step { label, caption } => {
                write!(
                    out,
                    r#"<div class="step"><div class="flow-step" style="background: {}">{}</div><div class="caption">"#,
                    flow.tone.color(),
                    escape_xml(label)
                )?;
                for span in caption {
                    match span {
                        Span::Text(text) => out.write_str(&escape_xml(text))?,
                        Span::Code(code) => write!(out, "<code>{}</code>", escape_xml(code))?,
                    }
                }
                writeln!(out, "</div></div>")?;
            }
            FlowStep::Branch { label, outcomes } => {
                write!(
                    out,
                    r#"<div class="step branch"><div class="flow-step" style="background: {}">{}</div>"#,
                    flow.tone.color(),
                    escape_xml(label)
                )?;
                for outcome in outcomes {
                    write!(
                        out,
                        r#"<div class="outcome"><div class="flow-step" style="background: {c}">{}</div><div class="arrow">&darr;</div><div class="flow-step" style="background: {c}">{}</div></div>"#,
                        escape_xml(outcome.answer),
                        escape_xml(outcome.result),
                        c = outcome.tone.color()
                    )?;
                }
                writeln!(out, "</div>")?;
            }
        }
    }
    writeln!(out, "</div>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::layout::LayoutEngine;
    use crate::state::{SelectionState, Tab};

    fn render(state: &SelectionState) -> String {
        let catalog = Catalog::load().unwrap();
        let vm = ViewModel::build(&catalog, &LayoutEngine::default(), state);
        HtmlRenderer::default().render(&vm)
    }

    #[test]
    fn test_schema_tab_markup() {
        let html = render(&SelectionState::default());
        assert!(html.contains(r#"<button class="tab active" data-action="tab:schema">Database Schema</button>"#));
        assert!(html.contains(r#"data-action="toggle-relationships">Hide Relationships</button>"#));
        assert!(html.contains(r#"<option value="books" selected>Books</option>"#));
        assert!(html.contains(r#"<option value="">Select a table...</option>"#));
        assert!(html.contains("<h3>Books Table</h3>"));
        assert!(html.contains(r#"<button class="link" data-action="entity:publishers">Publishers</button> via publisher_id"#));
        assert!(html.contains("<svg"));
    }

    #[test]
    fn test_header_carries_byline() {
        let html = render(&SelectionState::default());
        assert!(html.contains(r#"<p class="byline">Author: ammunraj</p></header>"#));
    }

    #[test]
    fn test_placeholder_selected_when_nothing_is() {
        let html = render(&SelectionState::default().select_entity(""));
        assert!(html.contains(r#"<option value="" selected>Select a table...</option>"#));
        assert!(!html.contains(r#"class="detail entity""#));
    }

    #[test]
    fn test_operations_tab_markup() {
        let state = SelectionState::default()
            .select_tab(Tab::Operations)
            .select_operation("issue_book");
        let html = render(&state);
        assert!(html.contains(r#"<div class="card procedure selected" data-action="operation:issue_book">"#));
        assert!(html.contains("<h3>Stored Procedure: issue_book</h3>"));
        assert_eq!(html.matches(r#"class="card procedure"#).count(), 5);
        assert!(html.contains("AFTER UPDATE on loans"));
        assert!(html.contains("<pre>IF NEW.returned = TRUE AND OLD.returned = FALSE THEN\n"));
        assert!(html.contains("<strong>Filters:</strong> books.available_copies &gt; 0"));
        assert!(!html.contains("<svg"));
    }

    #[test]
    fn test_workflow_tab_markup() {
        let html = render(&SelectionState::default().select_tab(Tab::Workflow));
        assert!(html.contains("<h4>Book Checkout Process</h4>"));
        assert!(html.contains("<h4>Book Return Process</h4>"));
        assert!(html.contains("<code>after_loan_insert</code> trigger"));
        assert!(html.contains(">Create Fine</div>"));
        assert!(!html.contains("data-action=\"entity:"));
    }

    #[test]
    fn test_document_wraps_fragment() {
        let catalog = Catalog::load().unwrap();
        let vm = ViewModel::build(&catalog, &LayoutEngine::default(), &SelectionState::default());
        let doc = HtmlRenderer::default().render_document(&vm);
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains(r#"<div class="library-erd">"#));
    }
}
