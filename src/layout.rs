//! Diagram geometry: fixed entity positions, grid fallback and S-curve
//! connectors.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::schema::{Cardinality, SchemaRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Cubic Bézier from `start` to `end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PathSpec {
    pub start: Point,
    pub control1: Point,
    pub control2: Point,
    pub end: Point,
}

impl PathSpec {
    /// Control points share the horizontal midpoint and keep each endpoint's y.
    pub fn s_curve(start: Point, end: Point) -> Self {
        let mid_x = (start.x + end.x) / 2.0;
        Self {
            start,
            control1: Point::new(mid_x, start.y),
            control2: Point::new(mid_x, end.y),
            end,
        }
    }
}

/// SVG path data, e.g. `M400,250 C525,250 525,150 650,150`.
impl fmt::Display for PathSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "M{},{} C{},{} {},{} {},{}",
            self.start.x,
            self.start.y,
            self.control1.x,
            self.control1.y,
            self.control2.x,
            self.control2.y,
            self.end.x,
            self.end.y
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stroke {
    Solid,
    Dashed,
}

impl Stroke {
    /// Dashed whenever the cardinality tag mentions `many`.
    pub fn for_cardinality(cardinality: Cardinality) -> Self {
        if cardinality.as_str().contains("many") {
            Self::Dashed
        } else {
            Self::Solid
        }
    }

    pub fn dasharray(self) -> Option<&'static str> {
        match self {
            Self::Solid => None,
            Self::Dashed => Some("5,5"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub id: String,
    /// Centre of the node box.
    pub center: Point,
    pub width: f64,
    pub height: f64,
}

impl LayoutNode {
    /// Top-left corner of the node box.
    pub fn origin(&self) -> Point {
        Point::new(
            self.center.x - self.width / 2.0,
            self.center.y - self.height / 2.0,
        )
    }
}

#[derive(Debug, Clone)]
pub struct LayoutEdge {
    pub from: String,
    pub to: String,
    pub path: PathSpec,
    pub stroke: Stroke,
    /// Index of the relationship within its declaring entity.
    pub rel_index: usize,
}

#[derive(Debug, Clone)]
pub struct Layout {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
    pub width: f64,
    pub height: f64,
}

pub const DEFAULT_POSITIONS: [(&str, Point); 13] = [
    ("books", Point::new(400.0, 250.0)),
    ("authors", Point::new(150.0, 150.0)),
    ("publishers", Point::new(650.0, 150.0)),
    ("categories", Point::new(650.0, 350.0)),
    ("book_authors", Point::new(250.0, 250.0)),
    ("book_categories", Point::new(550.0, 300.0)),
    ("members", Point::new(250.0, 450.0)),
    ("staff", Point::new(550.0, 450.0)),
    ("loans", Point::new(400.0, 350.0)),
    ("reservations", Point::new(150.0, 350.0)),
    ("fines", Point::new(400.0, 450.0)),
    ("events", Point::new(650.0, 550.0)),
    ("event_attendees", Point::new(400.0, 550.0)),
];

pub struct LayoutEngine {
    positions: HashMap<String, Point>,
    pub(crate) canvas_width: f64,
    pub(crate) canvas_height: f64,
    pub(crate) node_width: f64,
    pub(crate) node_height: f64,
    grid_origin: Point,
    grid_columns: usize,
    grid_spacing_x: f64,
    grid_spacing_y: f64,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self {
            positions: DEFAULT_POSITIONS
                .iter()
                .map(|(key, p)| (key.to_string(), *p))
                .collect(),
            canvas_width: 800.0,
            canvas_height: 700.0,
            node_width: 120.0,
            node_height: 40.0,
            grid_origin: Point::new(100.0, 100.0),
            grid_columns: 5,
            grid_spacing_x: 150.0,
            grid_spacing_y: 100.0,
        }
    }
}

impl LayoutEngine {
    /// Engine with no fixed positions; every entity lands on the grid.
    pub fn grid_only() -> Self {
        Self {
            positions: HashMap::new(),
            ..Self::default()
        }
    }

    pub fn with_position(mut self, key: &str, point: Point) -> Self {
        self.positions.insert(key.to_string(), point);
        self
    }

    /// Fixed point for known keys, otherwise a grid slot derived from `index`.
    pub fn position_of(&self, key: &str, index: usize) -> Point {
        if let Some(p) = self.positions.get(key) {
            return *p;
        }
        let col = (index % self.grid_columns) as f64;
        let row = (index / self.grid_columns) as f64;
        Point::new(
            self.grid_origin.x + col * self.grid_spacing_x,
            self.grid_origin.y + row * self.grid_spacing_y,
        )
    }

    /// Position using the entity's registration order. Keys the registry does
    /// not know take the next free ordinal.
    pub fn position_in(&self, schema: &SchemaRegistry, key: &str) -> Point {
        let index = schema.ordinal(key).unwrap_or(schema.len());
        self.position_of(key, index)
    }

    pub fn connector_path(&self, schema: &SchemaRegistry, source: &str, target: &str) -> PathSpec {
        PathSpec::s_curve(
            self.position_in(schema, source),
            self.position_in(schema, target),
        )
    }

    /// Place every entity and route every relationship.
    pub fn layout(&self, schema: &SchemaRegistry) -> Layout {
        let nodes: Vec<LayoutNode> = schema
            .entities()
            .iter()
            .enumerate()
            .map(|(i, e)| LayoutNode {
                id: e.key.clone(),
                center: self.position_of(&e.key, i),
                width: self.node_width,
                height: self.node_height,
            })
            .collect();

        let edges: Vec<LayoutEdge> = schema
            .entities()
            .iter()
            .flat_map(|e| {
                e.relationships
                    .iter()
                    .enumerate()
                    .map(move |(i, rel)| (e, i, rel))
            })
            .map(|(e, i, rel)| LayoutEdge {
                from: e.key.clone(),
                to: rel.to.clone(),
                path: self.connector_path(schema, &e.key, &rel.to),
                stroke: Stroke::for_cardinality(rel.cardinality),
                rel_index: i,
            })
            .collect();

        // Grid fallbacks can fall outside the default canvas.
        let (max_x, max_y) = nodes.iter().fold((0.0_f64, 0.0_f64), |(mx, my), n| {
            (
                mx.max(n.center.x + n.width / 2.0),
                my.max(n.center.y + n.height / 2.0),
            )
        });

        Layout {
            nodes,
            edges,
            width: self.canvas_width.max(max_x),
            height: self.canvas_height.max(max_y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn test_fixed_position() {
        let engine = LayoutEngine::default();
        assert_eq!(engine.position_of("books", 0), Point::new(400.0, 250.0));
        // Index is ignored for known keys.
        assert_eq!(engine.position_of("books", 42), Point::new(400.0, 250.0));
    }

    #[test]
    fn test_position_is_deterministic() {
        let engine = LayoutEngine::default();
        for key in ["loans", "ghost"] {
            assert_eq!(engine.position_of(key, 7), engine.position_of(key, 7));
        }
    }

    #[test]
    fn test_grid_fallback() {
        let engine = LayoutEngine::default();
        assert_eq!(engine.position_of("ghost", 0), Point::new(100.0, 100.0));
        assert_eq!(engine.position_of("ghost", 4), Point::new(700.0, 100.0));
        assert_eq!(engine.position_of("ghost", 5), Point::new(100.0, 200.0));
        assert_eq!(engine.position_of("ghost", 13), Point::new(550.0, 300.0));
    }

    #[test]
    fn test_path_for_unregistered_key_uses_grid() {
        let catalog = Catalog::load().unwrap();
        let engine = LayoutEngine::default();
        let path = engine.connector_path(&catalog.schema, "books", "shelves");
        // 13 registered entities, so the unknown key takes ordinal 13.
        assert_eq!(path.end, Point::new(550.0, 300.0));
        assert!(path.end.x.is_finite() && path.end.y.is_finite());
    }

    #[test]
    fn test_connector_path_string() {
        let catalog = Catalog::load().unwrap();
        let engine = LayoutEngine::default();
        let path = engine.connector_path(&catalog.schema, "books", "publishers");
        assert_eq!(path.to_string(), "M400,250 C525,250 525,150 650,150");

        let path = engine.connector_path(&catalog.schema, "books", "book_authors");
        assert_eq!(path.to_string(), "M400,250 C325,250 325,250 250,250");

        let path = engine.connector_path(&catalog.schema, "book_categories", "books");
        assert_eq!(path.to_string(), "M550,300 C475,300 475,250 400,250");
    }

    #[test]
    fn test_connector_path_is_mirrored_when_swapped() {
        let catalog = Catalog::load().unwrap();
        let engine = LayoutEngine::default();
        let keys: Vec<&str> = catalog.schema.entities().iter().map(|e| e.key.as_str()).collect();
        for a in &keys {
            for b in &keys {
                let fwd = engine.connector_path(&catalog.schema, a, b);
                let rev = engine.connector_path(&catalog.schema, b, a);
                assert_eq!(fwd.start, rev.end);
                assert_eq!(fwd.end, rev.start);
                assert_eq!(fwd.control1, rev.control2);
                assert_eq!(fwd.control2, rev.control1);
                assert_eq!(fwd.to_string(), engine.connector_path(&catalog.schema, a, b).to_string());
            }
        }
    }

    #[test]
    fn test_stroke_policy() {
        assert_eq!(Stroke::for_cardinality(Cardinality::ManyToOne), Stroke::Dashed);
        assert_eq!(Stroke::for_cardinality(Cardinality::OneToMany), Stroke::Dashed);
        assert_eq!(Stroke::Dashed.dasharray(), Some("5,5"));
        assert_eq!(Stroke::Solid.dasharray(), None);
    }

    #[test]
    fn test_layout_covers_every_entity_and_relationship() {
        let catalog = Catalog::load().unwrap();
        let layout = LayoutEngine::default().layout(&catalog.schema);
        let rel_count: usize = catalog
            .schema
            .entities()
            .iter()
            .map(|e| e.relationships.len())
            .sum();
        assert_eq!(layout.nodes.len(), 13);
        assert_eq!(layout.edges.len(), rel_count);
        assert_eq!((layout.width, layout.height), (800.0, 700.0));

        let books = &layout.nodes[0];
        assert_eq!(books.origin(), Point::new(340.0, 230.0));
    }

    #[test]
    fn test_grid_only_layout_grows_canvas() {
        let catalog = Catalog::load().unwrap();
        let layout = LayoutEngine::grid_only().layout(&catalog.schema);
        // Ordinal 12 sits at row 2, column 2.
        assert_eq!(layout.nodes[12].center, Point::new(400.0, 300.0));
        assert_eq!(layout.width, 800.0);

        let engine = LayoutEngine::default().with_position("books", Point::new(900.0, 800.0));
        let layout = engine.layout(&catalog.schema);
        assert_eq!((layout.width, layout.height), (960.0, 820.0));
    }
}
