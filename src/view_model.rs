//! Everything the visualizer shows, derived from the catalog, the layout and
//! the selection state. Renderers only read from here.

use serde::Serialize;

use crate::catalog::Catalog;
use crate::layout::{LayoutEngine, Stroke};
use crate::operations::OperationsRegistry;
use crate::schema::{EntityCategory, SchemaRegistry, SemanticType};
use crate::state::{Action, SelectionState, Tab};
use crate::workflow::{self, Workflow};

pub const TITLE: &str = "Library Management System Database Visualization";
pub const SUBTITLE: &str = "Interactive exploration of database structure and functionality";
pub const BYLINE: &str = "Author: ammunraj";

#[derive(Debug, Clone, Serialize)]
pub struct ViewModel {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub byline: &'static str,
    pub tabs: Vec<TabButton>,
    pub body: TabBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct TabButton {
    pub tab: Tab,
    pub label: &'static str,
    pub active: bool,
    pub action: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "tab", rename_all = "lowercase")]
pub enum TabBody {
    Schema(SchemaTab),
    Operations(OperationsTab),
    Workflow(WorkflowTab),
}

#[derive(Debug, Clone, Serialize)]
pub struct SchemaTab {
    pub toggle: ToggleControl,
    pub dropdown: Dropdown,
    pub legend: Vec<LegendEntry>,
    pub diagram: Diagram,
    pub detail: Option<EntityDetail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToggleControl {
    pub label: &'static str,
    pub pressed: bool,
    pub action: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dropdown {
    pub placeholder: &'static str,
    /// Key of the active entity, empty when none is selected.
    pub selected: String,
    pub options: Vec<DropdownOption>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DropdownOption {
    pub key: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LegendEntry {
    pub category: EntityCategory,
    pub label: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagram {
    pub width: f64,
    pub height: f64,
    pub nodes: Vec<DiagramNode>,
    /// Empty while relationships are hidden.
    pub connectors: Vec<Connector>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagramNode {
    pub key: String,
    pub label: String,
    /// Top-left corner of the node box.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: &'static str,
    pub selected: bool,
    pub action: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Connector {
    pub from: String,
    pub to: String,
    pub path: String,
    pub stroke: Stroke,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntityDetail {
    pub key: String,
    pub name: String,
    pub primary_key: String,
    pub fields: Vec<FieldRow>,
    pub relationships: Vec<RelationshipLink>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldRow {
    pub name: String,
    #[serde(rename = "type")]
    pub typ: String,
    pub semantic: SemanticType,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RelationshipLink {
    pub cardinality: &'static str,
    pub target: String,
    /// Target display name, or the raw key when the target is unknown.
    pub target_label: String,
    pub via: String,
    pub action: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OperationsTab {
    pub procedures: Vec<ProcedureCard>,
    pub triggers: Vec<TriggerCard>,
    pub views: Vec<ViewCard>,
    pub detail: Option<ProcedureDetail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcedureCard {
    pub name: String,
    pub description: String,
    pub selected: bool,
    pub action: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TriggerCard {
    pub name: String,
    /// `<timing> on <table>`
    pub summary: String,
    pub description: String,
    pub effect: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewCard {
    pub name: String,
    pub description: String,
    pub tables: String,
    pub filters: Option<String>,
    pub calculations: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcedureDetail {
    pub name: String,
    pub description: String,
    pub parameters: Vec<String>,
    pub steps: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowTab {
    pub heading: &'static str,
    pub flows: Vec<Workflow>,
}

impl ViewModel {
    pub fn build(catalog: &Catalog, engine: &LayoutEngine, state: &SelectionState) -> Self {
        let tabs = Tab::ALL
            .iter()
            .map(|&tab| TabButton {
                tab,
                label: tab.label(),
                active: tab == state.tab,
                action: Action::SelectTab(tab).to_string(),
            })
            .collect();

        let body = match state.tab {
            Tab::Schema => TabBody::Schema(schema_tab(&catalog.schema, engine, state)),
            Tab::Operations => TabBody::Operations(operations_tab(&catalog.operations, state)),
            Tab::Workflow => TabBody::Workflow(WorkflowTab {
                heading: "Common Library Workflows",
                flows: workflow::all(),
            }),
        };

        Self {
            title: TITLE,
            subtitle: SUBTITLE,
            byline: BYLINE,
            tabs,
            body,
        }
    }
}

pub fn schema_tab(schema: &SchemaRegistry, engine: &LayoutEngine, state: &SelectionState) -> SchemaTab {
    let active = state.active_entity();

    SchemaTab {
        toggle: ToggleControl {
            label: if state.relationships_visible {
                "Hide Relationships"
            } else {
                "Show Relationships"
            },
            pressed: state.relationships_visible,
            action: Action::ToggleRelationships.to_string(),
        },
        dropdown: Dropdown {
            placeholder: "Select a table...",
            selected: active.unwrap_or_default().to_string(),
            options: schema
                .entities()
                .iter()
                .map(|e| DropdownOption {
                    key: e.key.clone(),
                    label: e.name.clone(),
                })
                .collect(),
        },
        legend: EntityCategory::ALL
            .iter()
            .map(|&category| LegendEntry {
                category,
                label: category.label(),
                color: category.color(),
            })
            .collect(),
        diagram: diagram(schema, engine, state),
        detail: active.and_then(|key| entity_detail(schema, key)),
    }
}

pub fn diagram(schema: &SchemaRegistry, engine: &LayoutEngine, state: &SelectionState) -> Diagram {
    let layout = engine.layout(schema);
    let active = state.active_entity();

    let nodes = layout
        .nodes
        .iter()
        .filter_map(|n| {
            let entity = schema.get(&n.id)?;
            let origin = n.origin();
            Some(DiagramNode {
                key: entity.key.clone(),
                label: entity.name.clone(),
                x: origin.x,
                y: origin.y,
                width: n.width,
                height: n.height,
                fill: entity.category.color(),
                selected: active == Some(entity.key.as_str()),
                action: Action::SelectEntity(entity.key.clone()).to_string(),
            })
        })
        .collect();

    let connectors = if state.relationships_visible {
        layout
            .edges
            .iter()
            .map(|e| Connector {
                from: e.from.clone(),
                to: e.to.clone(),
                path: e.path.to_string(),
                stroke: e.stroke,
            })
            .collect()
    } else {
        Vec::new()
    };

    Diagram {
        width: layout.width,
        height: layout.height,
        nodes,
        connectors,
    }
}

/// Detail panel for an entity. `None` for unknown keys.
pub fn entity_detail(schema: &SchemaRegistry, key: &str) -> Option<EntityDetail> {
    let entity = schema.get(key)?;

    Some(EntityDetail {
        key: entity.key.clone(),
        name: entity.name.clone(),
        primary_key: entity.primary_key.to_string(),
        fields: entity
            .fields
            .iter()
            .map(|f| FieldRow {
                name: f.name.clone(),
                typ: f.typ.to_string(),
                semantic: f.typ.semantic(),
                description: f.description.clone(),
            })
            .collect(),
        relationships: entity
            .relationships
            .iter()
            .map(|r| RelationshipLink {
                cardinality: r.cardinality.as_str(),
                target: r.to.clone(),
                target_label: schema.display_name(&r.to).to_string(),
                via: r.via.clone(),
                action: Action::SelectEntity(r.to.clone()).to_string(),
            })
            .collect(),
    })
}

pub fn operations_tab(ops: &OperationsRegistry, state: &SelectionState) -> OperationsTab {
    let active = state.active_operation();

    OperationsTab {
        procedures: ops
            .procedures()
            .iter()
            .map(|p| ProcedureCard {
                name: p.name.clone(),
                description: p.description.clone(),
                selected: active == Some(p.name.as_str()),
                action: Action::SelectOperation(p.name.clone()).to_string(),
            })
            .collect(),
        triggers: ops
            .triggers()
            .iter()
            .map(|t| TriggerCard {
                name: t.name.clone(),
                summary: format!("{} on {}", t.timing, t.table),
                description: t.description.clone(),
                effect: t.effect.clone(),
            })
            .collect(),
        views: ops
            .views()
            .iter()
            .map(|v| ViewCard {
                name: v.name.clone(),
                description: v.description.clone(),
                tables: v.tables.join(", "),
                filters: v.filters.as_ref().map(|f| f.join(", ")),
                calculations: v.calculations.as_ref().map(|c| c.join(", ")),
            })
            .collect(),
        detail: active.and_then(|name| procedure_detail(ops, name)),
    }
}

/// Detail panel for a procedure. `None` for stale or unknown names.
pub fn procedure_detail(ops: &OperationsRegistry, name: &str) -> Option<ProcedureDetail> {
    let procedure = ops.procedure(name)?;
    Some(ProcedureDetail {
        name: procedure.name.clone(),
        description: procedure.description.clone(),
        parameters: procedure.parameters.clone(),
        steps: procedure.steps.clone(),
    })
}
