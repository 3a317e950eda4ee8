//! Plain-text rendering of the detail panels and operation listings, for
//! terminals.

use std::fmt::{self, Write};

use crate::measure::{columns, pad_right, truncate_columns};
use crate::view_model::{EntityDetail, OperationsTab, ProcedureDetail};

/// Descriptions wider than this are shortened in column tables.
const MAX_DESCRIPTION_COLS: usize = 60;

pub fn entity_detail(detail: &EntityDetail) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_entity_detail(&mut out, detail);
    out
}

pub fn procedure_detail(detail: &ProcedureDetail) -> String {
    let mut out = String::new();
    let _ = write_procedure_detail(&mut out, detail);
    out
}

pub fn operations(tab: &OperationsTab) -> String {
    let mut out = String::new();
    let _ = write_operations(&mut out, tab);
    out
}

fn write_entity_detail(out: &mut impl Write, detail: &EntityDetail) -> fmt::Result {
    writeln!(out, "{} Table", detail.name)?;
    writeln!(out, "Primary Key: {}", detail.primary_key)?;
    writeln!(out)?;

    let rows: Vec<[String; 3]> = detail
        .fields
        .iter()
        .map(|f| {
            [
                f.name.clone(),
                f.typ.clone(),
                truncate_columns(&f.description, MAX_DESCRIPTION_COLS),
            ]
        })
        .collect();
    write_table(out, ["Name", "Type", "Description"], &rows)?;

    writeln!(out)?;
    writeln!(out, "Relationships:")?;
    for rel in &detail.relationships {
        writeln!(
            out,
            "  - {} relationship with {} via {}",
            rel.cardinality, rel.target_label, rel.via
        )?;
    }
    Ok(())
}

fn write_procedure_detail(out: &mut impl Write, detail: &ProcedureDetail) -> fmt::Result {
    writeln!(out, "Stored Procedure: {}", detail.name)?;
    writeln!(out, "{}", detail.description)?;
    writeln!(out)?;
    writeln!(out, "Parameters:")?;
    for param in &detail.parameters {
        writeln!(out, "  - {}", param)?;
    }
    writeln!(out)?;
    writeln!(out, "Implementation Steps:")?;
    for (i, step) in detail.steps.iter().enumerate() {
        writeln!(out, "  {}. {}", i + 1, step)?;
    }
    Ok(())
}

fn write_operations(out: &mut impl Write, tab: &OperationsTab) -> fmt::Result {
    writeln!(out, "Stored Procedures")?;
    let rows: Vec<[String; 2]> = tab
        .procedures
        .iter()
        .map(|p| [p.name.clone(), p.description.clone()])
        .collect();
    write_table(out, ["Name", "Description"], &rows)?;

    writeln!(out)?;
    writeln!(out, "Triggers")?;
    for trigger in &tab.triggers {
        writeln!(out, "  {} ({})", trigger.name, trigger.summary)?;
        writeln!(out, "    {}", trigger.description)?;
        for line in trigger.effect.lines() {
            writeln!(out, "    | {}", line)?;
        }
    }

    writeln!(out)?;
    writeln!(out, "Views")?;
    for view in &tab.views {
        writeln!(out, "  {}: {}", view.name, view.description)?;
        writeln!(out, "    Tables: {}", view.tables)?;
        if let Some(filters) = &view.filters {
            writeln!(out, "    Filters: {}", filters)?;
        }
        if let Some(calculations) = &view.calculations {
            writeln!(out, "    Calculations: {}", calculations)?;
        }
    }
    Ok(())
}

fn write_table<const N: usize>(
    out: &mut impl Write,
    headers: [&str; N],
    rows: &[[String; N]],
) -> fmt::Result {
    let mut widths: [usize; N] = headers.map(columns);
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(columns(cell));
        }
    }

    let line = |cells: [&str; N]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, w)| pad_right(cell, w))
            .collect();
        padded.join("  ").trim_end().to_string()
    };

    writeln!(out, "{}", line(headers))?;
    writeln!(out, "{}", line(widths.map(|w| "-".repeat(w)).each_ref().map(|s| s.as_str())))?;
    for row in rows {
        writeln!(out, "{}", line(row.each_ref().map(|s| s.as_str())))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::view_model::{self, operations_tab};
    use crate::state::SelectionState;

    #[test]
    fn test_books_table_text() {
        let catalog = Catalog::load().unwrap();
        let detail = view_model::entity_detail(&catalog.schema, "books").unwrap();
        let text = entity_detail(&detail);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Books Table");
        assert_eq!(lines[1], "Primary Key: book_id");
        assert!(lines[3].starts_with("Name              Type"));
        assert!(text.contains("isbn              VARCHAR(20)   International Standard Book Number"));
        assert!(text.contains("  - many-to-one relationship with Publishers via publisher_id"));
    }

    #[test]
    fn test_procedure_text() {
        let catalog = Catalog::load().unwrap();
        let detail = view_model::procedure_detail(&catalog.operations, "issue_book").unwrap();
        let text = procedure_detail(&detail);
        assert!(text.starts_with("Stored Procedure: issue_book\n"));
        assert!(text.contains("  - loan_days\n"));
        assert!(text.contains("  5. Trigger updates available_copies in books table\n"));
    }

    #[test]
    fn test_operations_text() {
        let catalog = Catalog::load().unwrap();
        let tab = operations_tab(&catalog.operations, &SelectionState::default());
        let text = operations(&tab);
        assert!(text.contains("after_loan_update (AFTER UPDATE on loans)"));
        assert!(text.contains("    | END IF;"));
        assert!(text.contains("    Calculations: (books.total_copies - books.available_copies) AS checked_out_copies"));
    }
}
