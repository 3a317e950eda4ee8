use crate::measure::TextMetrics;
use crate::view_model::{Connector, Diagram, DiagramNode};
use std::fmt::{self, Write};

pub struct SvgRenderer {
    metrics: TextMetrics,
    edge_color: &'static str,
    edge_width: f64,
    corner_radius: f64,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self {
            metrics: TextMetrics::default(),
            edge_color: "#aaa",
            edge_width: 1.5,
            corner_radius: 5.0,
        }
    }
}

impl SvgRenderer {
    pub fn render(&self, diagram: &Diagram) -> String {
        SvgDocument {
            renderer: self,
            diagram,
        }
        .to_string()
    }

    fn write_diagram(&self, svg: &mut impl Write, diagram: &Diagram) -> fmt::Result {
        writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}" class="schema-diagram">"#,
            diagram.width, diagram.height, diagram.width, diagram.height
        )?;
        writeln!(
            svg,
            r##"<rect x="0" y="0" width="{}" height="{}" fill="#fff" />"##,
            diagram.width, diagram.height
        )?;

        // Connectors first (behind nodes)
        for connector in &diagram.connectors {
            self.write_connector(svg, connector)?;
        }

        for node in &diagram.nodes {
            self.write_node(svg, node)?;
        }

        writeln!(svg, "<defs>")?;
        writeln!(
            svg,
            r#"<marker id="arrowhead" viewBox="0 0 10 10" refX="5" refY="5" markerWidth="6" markerHeight="6" orient="auto-start-reverse">"#
        )?;
        writeln!(
            svg,
            r#"<path d="M 0 0 L 10 5 L 0 10 z" fill="{}" />"#,
            self.edge_color
        )?;
        writeln!(svg, "</marker>")?;
        writeln!(svg, "</defs>")?;

        writeln!(svg, "</svg>")
    }

    fn write_connector(&self, svg: &mut impl Write, connector: &Connector) -> fmt::Result {
        let dash = match connector.stroke.dasharray() {
            Some(pattern) => format!(r#" stroke-dasharray="{}""#, pattern),
            None => String::new(),
        };
        writeln!(
            svg,
            r#"<path class="connector" data-from="{}" data-to="{}" d="{}" stroke="{}" stroke-width="{}" fill="none" marker-end="url(#arrowhead)"{} />"#,
            escape_xml(&connector.from),
            escape_xml(&connector.to),
            connector.path,
            self.edge_color,
            self.edge_width,
            dash
        )
    }

    fn write_node(&self, svg: &mut impl Write, node: &DiagramNode) -> fmt::Result {
        writeln!(
            svg,
            r#"<g class="entity" data-action="{}" transform="translate({}, {})" style="cursor: pointer">"#,
            escape_xml(&node.action),
            node.x,
            node.y
        )?;

        let (stroke, stroke_width) = if node.selected {
            ("#000", 2)
        } else {
            ("none", 0)
        };
        writeln!(
            svg,
            r#"<rect width="{}" height="{}" rx="{r}" ry="{r}" fill="{}" stroke="{}" stroke-width="{}" />"#,
            node.width,
            node.height,
            node.fill,
            stroke,
            stroke_width,
            r = self.corner_radius
        )?;

        let label = self.metrics.fit(&node.label, node.width);
        writeln!(
            svg,
            r#"<text x="{}" y="{}" text-anchor="middle" fill="white" font-weight="{}">{}</text>"#,
            node.width / 2.0,
            node.height / 2.0 + 5.0,
            if node.selected { "bold" } else { "normal" },
            escape_xml(&label)
        )?;

        writeln!(svg, "</g>")
    }
}

struct SvgDocument<'a> {
    renderer: &'a SvgRenderer,
    diagram: &'a Diagram,
}

impl fmt::Display for SvgDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.renderer.write_diagram(f, self.diagram)
    }
}

pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::layout::LayoutEngine;
    use crate::state::SelectionState;
    use crate::view_model::diagram;

    fn render(state: &SelectionState) -> String {
        let catalog = Catalog::load().unwrap();
        let d = diagram(&catalog.schema, &LayoutEngine::default(), state);
        SvgRenderer::default().render(&d)
    }

    #[test]
    fn test_render_basic() {
        let svg = render(&SelectionState::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"width="800" height="700""#));
        assert!(svg.contains(">Event_Attendees</text>"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_render_connectors() {
        let svg = render(&SelectionState::default());
        assert_eq!(svg.matches(r#"class="connector""#).count(), 34);
        assert!(svg.contains(r#"d="M400,250 C525,250 525,150 650,150""#));
        assert!(svg.contains(r#"stroke-dasharray="5,5""#));
        assert!(svg.contains(r#"marker-end="url(#arrowhead)""#));
    }

    #[test]
    fn test_hidden_connectors() {
        let svg = render(&SelectionState::default().toggle_relationships());
        assert!(!svg.contains(r#"class="connector""#));
        assert_eq!(svg.matches(r#"class="entity""#).count(), 13);
    }

    #[test]
    fn test_selected_node_highlight() {
        let svg = render(&SelectionState::default());
        assert!(svg.contains(r#"data-action="entity:books" transform="translate(340, 230)""#));
        assert_eq!(svg.matches(r##"stroke="#000" stroke-width="2""##).count(), 1);
        assert_eq!(svg.matches(r#"font-weight="bold""#).count(), 1);
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
    }
}
