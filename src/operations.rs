//! Stored procedures, triggers and views. Documentation only; nothing here
//! is ever executed.

use crate::schema::SchemaRegistry;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum OperationsError {
    #[error("Trigger {trigger} is attached to unregistered table {table}")]
    UnknownTriggerTable { trigger: String, table: String },
    #[error("View {view} reads from unregistered table {table}")]
    UnknownViewTable { view: String, table: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Procedure {
    pub name: String,
    pub parameters: Vec<String>,
    pub description: String,
    pub steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    pub name: String,
    pub table: String,
    /// Open set: `AFTER INSERT`, `AFTER UPDATE`, ...
    pub timing: String,
    pub description: String,
    /// Pseudo-SQL shown verbatim.
    pub effect: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlView {
    pub name: String,
    pub description: String,
    pub tables: Vec<String>,
    pub filters: Option<Vec<String>>,
    pub calculations: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct OperationsRegistry {
    procedures: Vec<Procedure>,
    triggers: Vec<Trigger>,
    views: Vec<SqlView>,
}

impl OperationsRegistry {
    pub fn new(procedures: Vec<Procedure>, triggers: Vec<Trigger>, views: Vec<SqlView>) -> Self {
        Self {
            procedures,
            triggers,
            views,
        }
    }

    pub fn procedures(&self) -> &[Procedure] {
        &self.procedures
    }

    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    pub fn views(&self) -> &[SqlView] {
        &self.views
    }

    /// Look up a procedure by name. `None` for stale or unknown names.
    pub fn procedure(&self, name: &str) -> Option<&Procedure> {
        self.procedures.iter().find(|p| p.name == name)
    }

    pub fn validate(&self, schema: &SchemaRegistry) -> Result<(), OperationsError> {
        for trigger in &self.triggers {
            if !schema.contains(&trigger.table) {
                return Err(OperationsError::UnknownTriggerTable {
                    trigger: trigger.name.clone(),
                    table: trigger.table.clone(),
                });
            }
        }
        for view in &self.views {
            if let Some(table) = view.tables.iter().find(|t| !schema.contains(t)) {
                return Err(OperationsError::UnknownViewTable {
                    view: view.name.clone(),
                    table: table.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn procedure(name: &str) -> Procedure {
        Procedure {
            name: name.to_string(),
            parameters: vec!["id".into()],
            description: String::new(),
            steps: vec!["do it".into()],
        }
    }

    #[test]
    fn test_procedure_lookup() {
        let ops = OperationsRegistry::new(vec![procedure("a"), procedure("b")], vec![], vec![]);
        assert_eq!(ops.procedure("b").map(|p| p.name.as_str()), Some("b"));
        assert!(ops.procedure("stale").is_none());
    }

    #[test]
    fn test_unknown_trigger_table() {
        let ops = OperationsRegistry::new(
            vec![],
            vec![Trigger {
                name: "t".into(),
                table: "ghost".into(),
                timing: "AFTER INSERT".into(),
                description: String::new(),
                effect: String::new(),
            }],
            vec![],
        );
        let schema = SchemaRegistry::default();
        assert_eq!(
            ops.validate(&schema),
            Err(OperationsError::UnknownTriggerTable {
                trigger: "t".into(),
                table: "ghost".into()
            })
        );
    }

    #[test]
    fn test_unknown_view_table() {
        let ops = OperationsRegistry::new(
            vec![],
            vec![],
            vec![SqlView {
                name: "v".into(),
                description: String::new(),
                tables: vec!["ghost".into()],
                filters: None,
                calculations: None,
            }],
        );
        assert!(matches!(
            ops.validate(&SchemaRegistry::default()),
            Err(OperationsError::UnknownViewTable { .. })
        ));
    }
}
