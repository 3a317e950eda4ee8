//! The library-management catalog: every table, procedure, trigger and view
//! the visualizer shows.

use std::sync::OnceLock;

use tracing::{info, warn};

use crate::operations::{OperationsError, OperationsRegistry, Procedure, SqlView, Trigger};
use crate::schema::{
    Cardinality, Entity, EntityCategory, Field, FieldType, PrimaryKey, Relationship, SchemaError,
    SchemaRegistry,
};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Invalid schema: {0}")]
    Schema(#[from] SchemaError),
    #[error("Invalid operations: {0}")]
    Operations(#[from] OperationsError),
}

#[derive(Debug, Clone)]
pub struct Catalog {
    pub schema: SchemaRegistry,
    pub operations: OperationsRegistry,
}

impl Catalog {
    /// Assemble a catalog and run the startup validation pass.
    pub fn new(schema: SchemaRegistry, operations: OperationsRegistry) -> Result<Self, CatalogError> {
        schema.validate()?;
        operations.validate(&schema)?;

        for m in schema.inverse_mismatches() {
            warn!(
                from = %m.from,
                to = %m.to,
                via = %m.via,
                cardinality = %m.cardinality,
                "relationship has no mirrored descriptor on its target"
            );
        }

        Ok(Self { schema, operations })
    }

    /// Build the library catalog from the hard-coded definitions.
    pub fn load() -> Result<Self, CatalogError> {
        let catalog = Self::new(
            SchemaRegistry::new(library_entities())?,
            OperationsRegistry::new(library_procedures(), library_triggers(), library_views()),
        )?;
        info!(
            entities = catalog.schema.len(),
            procedures = catalog.operations.procedures().len(),
            triggers = catalog.operations.triggers().len(),
            views = catalog.operations.views().len(),
            "catalog loaded"
        );
        Ok(catalog)
    }
}

static LIBRARY: OnceLock<Catalog> = OnceLock::new();

/// Process-wide catalog, built and validated on first use.
pub fn library() -> Result<&'static Catalog, CatalogError> {
    if let Some(catalog) = LIBRARY.get() {
        return Ok(catalog);
    }
    let catalog = Catalog::load()?;
    Ok(LIBRARY.get_or_init(|| catalog))
}

fn field(name: &str, typ: FieldType, description: &str) -> Field {
    Field::new(name, typ, description)
}

fn many_to_one(to: &str, via: &str) -> Relationship {
    Relationship {
        to: to.to_string(),
        cardinality: Cardinality::ManyToOne,
        via: via.to_string(),
    }
}

fn one_to_many(to: &str, via: &str) -> Relationship {
    Relationship {
        to: to.to_string(),
        cardinality: Cardinality::OneToMany,
        via: via.to_string(),
    }
}

fn single(name: &str) -> PrimaryKey {
    PrimaryKey::Single(name.to_string())
}

fn composite(names: &[&str]) -> PrimaryKey {
    PrimaryKey::Composite(names.iter().map(|s| s.to_string()).collect())
}

fn entity(
    key: &str,
    name: &str,
    primary_key: PrimaryKey,
    category: EntityCategory,
    fields: Vec<Field>,
    relationships: Vec<Relationship>,
) -> Entity {
    Entity {
        key: key.to_string(),
        name: name.to_string(),
        primary_key,
        category,
        fields,
        relationships,
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn library_entities() -> Vec<Entity> {
    use EntityCategory::*;
    use FieldType::*;

    vec![
        entity(
            "books",
            "Books",
            single("book_id"),
            Core,
            vec![
                field("book_id", Int, "Primary key - unique identifier for each book"),
                field(
                    "isbn",
                    Varchar(20),
                    "International Standard Book Number - unique identifier in publishing",
                ),
                field("title", Varchar(255), "Book title"),
                field("publisher_id", Int, "Foreign key to publishers table"),
                field("publication_date", Date, "Date when the book was published"),
                field("total_copies", Int, "Total number of copies owned by the library"),
                field(
                    "available_copies",
                    Int,
                    "Number of copies currently available for checkout",
                ),
            ],
            vec![
                many_to_one("publishers", "publisher_id"),
                one_to_many("book_authors", "book_id"),
                one_to_many("book_categories", "book_id"),
                one_to_many("loans", "book_id"),
                one_to_many("reservations", "book_id"),
            ],
        ),
        entity(
            "authors",
            "Authors",
            single("author_id"),
            Core,
            vec![
                field("author_id", Int, "Primary key - unique identifier for each author"),
                field("first_name", Varchar(50), "Author's first name"),
                field("last_name", Varchar(50), "Author's last name"),
                field("birth_date", Date, "Author's date of birth"),
                field("nationality", Varchar(50), "Author's nationality"),
            ],
            vec![one_to_many("book_authors", "author_id")],
        ),
        entity(
            "book_authors",
            "Book_Authors",
            composite(&["book_id", "author_id"]),
            Junction,
            vec![
                field(
                    "book_id",
                    Int,
                    "Part of composite primary key and foreign key to books table",
                ),
                field(
                    "author_id",
                    Int,
                    "Part of composite primary key and foreign key to authors table",
                ),
            ],
            vec![
                many_to_one("books", "book_id"),
                many_to_one("authors", "author_id"),
            ],
        ),
        entity(
            "publishers",
            "Publishers",
            single("publisher_id"),
            Reference,
            vec![
                field(
                    "publisher_id",
                    Int,
                    "Primary key - unique identifier for each publisher",
                ),
                field("name", Varchar(100), "Publisher name"),
                field("address", Text, "Publisher address"),
                field("phone", Varchar(20), "Publisher phone number"),
                field("email", Varchar(100), "Publisher email"),
            ],
            vec![one_to_many("books", "publisher_id")],
        ),
        entity(
            "categories",
            "Categories",
            single("category_id"),
            Reference,
            vec![
                field(
                    "category_id",
                    Int,
                    "Primary key - unique identifier for each category",
                ),
                field(
                    "name",
                    Varchar(50),
                    "Category name (e.g. Fiction, Science, History)",
                ),
                field("description", Text, "Category description"),
            ],
            vec![one_to_many("book_categories", "category_id")],
        ),
        entity(
            "book_categories",
            "Book_Categories",
            composite(&["book_id", "category_id"]),
            Junction,
            vec![
                field(
                    "book_id",
                    Int,
                    "Part of composite primary key and foreign key to books table",
                ),
                field(
                    "category_id",
                    Int,
                    "Part of composite primary key and foreign key to categories table",
                ),
            ],
            vec![
                many_to_one("books", "book_id"),
                many_to_one("categories", "category_id"),
            ],
        ),
        entity(
            "members",
            "Members",
            single("member_id"),
            Core,
            vec![
                field("member_id", Int, "Primary key - unique identifier for each member"),
                field("first_name", Varchar(50), "Member's first name"),
                field("last_name", Varchar(50), "Member's last name"),
                field("email", Varchar(100), "Member's email address"),
                field("membership_date", Date, "Date when membership started"),
                field("membership_expiry", Date, "Date when membership expires"),
                field(
                    "membership_status",
                    Enum,
                    "Status: Active, Expired, or Suspended",
                ),
            ],
            vec![
                one_to_many("loans", "member_id"),
                one_to_many("reservations", "member_id"),
                one_to_many("event_attendees", "member_id"),
                one_to_many("fines", "member_id"),
            ],
        ),
        entity(
            "staff",
            "Staff",
            single("staff_id"),
            Core,
            vec![
                field(
                    "staff_id",
                    Int,
                    "Primary key - unique identifier for each staff member",
                ),
                field("first_name", Varchar(50), "Staff member's first name"),
                field("last_name", Varchar(50), "Staff member's last name"),
                field("position", Varchar(50), "Job title or position"),
                field(
                    "is_admin",
                    Boolean,
                    "Whether the staff member has administrative privileges",
                ),
            ],
            vec![
                one_to_many("loans", "issued_by_staff_id"),
                one_to_many("loans", "received_by_staff_id"),
                one_to_many("fines", "collected_by_staff_id"),
                one_to_many("events", "organized_by_staff_id"),
            ],
        ),
        entity(
            "loans",
            "Loans",
            single("loan_id"),
            Transaction,
            vec![
                field("loan_id", Int, "Primary key - unique identifier for each loan"),
                field("book_id", Int, "Foreign key to books table"),
                field("member_id", Int, "Foreign key to members table"),
                field("loan_date", Date, "Date when the book was borrowed"),
                field("due_date", Date, "Date when the book is due to be returned"),
                field(
                    "return_date",
                    Date,
                    "Date when the book was actually returned (NULL if not returned)",
                ),
                field("returned", Boolean, "Whether the book has been returned"),
                field(
                    "loan_status",
                    Enum,
                    "Status: Active, Returned, Overdue, or Lost",
                ),
                field(
                    "issued_by_staff_id",
                    Int,
                    "Foreign key to staff table - who issued the book",
                ),
                field(
                    "received_by_staff_id",
                    Int,
                    "Foreign key to staff table - who received the return",
                ),
                field(
                    "fine_amount",
                    Decimal,
                    "Amount of fine for late return (if any)",
                ),
            ],
            vec![
                many_to_one("books", "book_id"),
                many_to_one("members", "member_id"),
                many_to_one("staff", "issued_by_staff_id"),
                many_to_one("staff", "received_by_staff_id"),
                one_to_many("fines", "loan_id"),
            ],
        ),
        entity(
            "reservations",
            "Reservations",
            single("reservation_id"),
            Transaction,
            vec![
                field(
                    "reservation_id",
                    Int,
                    "Primary key - unique identifier for each reservation",
                ),
                field("book_id", Int, "Foreign key to books table"),
                field("member_id", Int, "Foreign key to members table"),
                field(
                    "reservation_date",
                    Timestamp,
                    "Date and time when the reservation was made",
                ),
                field("expiry_date", Date, "Date when the reservation expires"),
                field(
                    "status",
                    Enum,
                    "Status: Pending, Fulfilled, Cancelled, or Expired",
                ),
            ],
            vec![
                many_to_one("books", "book_id"),
                many_to_one("members", "member_id"),
            ],
        ),
        entity(
            "fines",
            "Fines",
            single("fine_id"),
            Transaction,
            vec![
                field("fine_id", Int, "Primary key - unique identifier for each fine"),
                field("loan_id", Int, "Foreign key to loans table"),
                field("member_id", Int, "Foreign key to members table"),
                field("fine_amount", Decimal, "Amount of the fine"),
                field("reason", Text, "Reason for the fine"),
                field("issue_date", Date, "Date when the fine was issued"),
                field(
                    "payment_date",
                    Date,
                    "Date when the fine was paid (NULL if not paid)",
                ),
                field("paid", Boolean, "Whether the fine has been paid"),
                field(
                    "collected_by_staff_id",
                    Int,
                    "Foreign key to staff table - who collected the payment",
                ),
            ],
            vec![
                many_to_one("loans", "loan_id"),
                many_to_one("members", "member_id"),
                many_to_one("staff", "collected_by_staff_id"),
            ],
        ),
        entity(
            "events",
            "Events",
            single("event_id"),
            Event,
            vec![
                field("event_id", Int, "Primary key - unique identifier for each event"),
                field("title", Varchar(255), "Event title"),
                field("description", Text, "Event description"),
                field("start_date", Date, "Date when the event starts"),
                field("start_time", Time, "Time when the event starts"),
                field("end_date", Date, "Date when the event ends"),
                field("end_time", Time, "Time when the event ends"),
                field("location", Varchar(100), "Event location"),
                field("max_attendees", Int, "Maximum number of attendees allowed"),
                field(
                    "organized_by_staff_id",
                    Int,
                    "Foreign key to staff table - who organized the event",
                ),
            ],
            vec![
                many_to_one("staff", "organized_by_staff_id"),
                one_to_many("event_attendees", "event_id"),
            ],
        ),
        entity(
            "event_attendees",
            "Event_Attendees",
            composite(&["event_id", "member_id"]),
            Junction,
            vec![
                field(
                    "event_id",
                    Int,
                    "Part of composite primary key and foreign key to events table",
                ),
                field(
                    "member_id",
                    Int,
                    "Part of composite primary key and foreign key to members table",
                ),
                field(
                    "registration_date",
                    Timestamp,
                    "Date and time when the member registered for the event",
                ),
                field(
                    "attended",
                    Boolean,
                    "Whether the member actually attended the event",
                ),
            ],
            vec![
                many_to_one("events", "event_id"),
                many_to_one("members", "member_id"),
            ],
        ),
    ]
}

pub fn library_procedures() -> Vec<Procedure> {
    vec![
        Procedure {
            name: "issue_book".into(),
            parameters: strings(&["book_id", "member_id", "staff_id", "loan_days"]),
            description: "Issues a book to a member".into(),
            steps: strings(&[
                "Check if book is available",
                "Check if member is active",
                "Calculate due date",
                "Create loan record",
                "Trigger updates available_copies in books table",
            ]),
        },
        Procedure {
            name: "return_book".into(),
            parameters: strings(&["loan_id", "staff_id"]),
            description: "Processes a book return".into(),
            steps: strings(&[
                "Get loan details",
                "Calculate any fines for late return",
                "Update loan record to returned status",
                "Create fine record if needed",
                "Trigger updates available_copies in books table",
            ]),
        },
        Procedure {
            name: "search_books".into(),
            parameters: strings(&[
                "title",
                "author_name",
                "category_name",
                "publisher_name",
                "available_only",
            ]),
            description: "Searches for books based on various criteria".into(),
            steps: strings(&[
                "Join multiple tables (books, authors, categories, publishers)",
                "Filter by any provided criteria",
                "Return matching books with related information",
            ]),
        },
        Procedure {
            name: "renew_loan".into(),
            parameters: strings(&["loan_id", "renewal_days"]),
            description: "Extends the due date for an active loan".into(),
            steps: strings(&[
                "Check if loan is active",
                "Calculate new due date",
                "Update loan record with new due date",
                "Add note about renewal",
            ]),
        },
        Procedure {
            name: "add_book".into(),
            parameters: strings(&[
                "isbn",
                "title",
                "publisher_id",
                "publication_date",
                "edition",
                "pages",
                "language",
                "description",
                "shelf_location",
                "total_copies",
                "author_ids",
                "category_ids",
            ]),
            description: "Adds a new book to the library".into(),
            steps: strings(&[
                "Insert book record",
                "Parse author_ids string into individual IDs",
                "Create book-author associations",
                "Parse category_ids string into individual IDs",
                "Create book-category associations",
            ]),
        },
    ]
}

pub fn library_triggers() -> Vec<Trigger> {
    vec![
        Trigger {
            name: "after_loan_insert".into(),
            table: "loans".into(),
            timing: "AFTER INSERT".into(),
            description: "Decrements the available_copies count when a book is borrowed".into(),
            effect: "UPDATE books SET available_copies = available_copies - 1 WHERE book_id = NEW.book_id;"
                .into(),
        },
        Trigger {
            name: "after_loan_update".into(),
            table: "loans".into(),
            timing: "AFTER UPDATE".into(),
            description: "Increments the available_copies count when a book is returned".into(),
            effect: "IF NEW.returned = TRUE AND OLD.returned = FALSE THEN\n  UPDATE books SET available_copies = available_copies + 1 WHERE book_id = NEW.book_id;\nEND IF;"
                .into(),
        },
    ]
}

pub fn library_views() -> Vec<SqlView> {
    vec![
        SqlView {
            name: "vw_available_books".into(),
            description: "Shows all books that are currently available for checkout".into(),
            tables: strings(&[
                "books",
                "book_authors",
                "authors",
                "publishers",
                "book_categories",
                "categories",
            ]),
            filters: Some(strings(&["books.available_copies > 0"])),
            calculations: None,
        },
        SqlView {
            name: "vw_overdue_loans".into(),
            description: "Shows all loans that are past their due date and not returned".into(),
            tables: strings(&["loans", "books", "members"]),
            filters: Some(strings(&[
                "loans.returned = FALSE",
                "loans.due_date < CURRENT_DATE",
            ])),
            calculations: Some(strings(&[
                "DATEDIFF(CURRENT_DATE, loans.due_date) AS days_overdue",
                "DATEDIFF(CURRENT_DATE, loans.due_date) * 0.50 AS estimated_fine",
            ])),
        },
        SqlView {
            name: "vw_book_inventory".into(),
            description: "Shows complete inventory information for all books".into(),
            tables: strings(&[
                "books",
                "book_authors",
                "authors",
                "publishers",
                "book_categories",
                "categories",
            ]),
            filters: None,
            calculations: Some(strings(&[
                "(books.total_copies - books.available_copies) AS checked_out_copies",
            ])),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SemanticType;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_library_loads() {
        let catalog = Catalog::load().unwrap();
        assert_eq!(catalog.schema.len(), 13);
        assert_eq!(catalog.operations.procedures().len(), 5);
        assert_eq!(catalog.operations.triggers().len(), 2);
        assert_eq!(catalog.operations.views().len(), 3);
    }

    #[test]
    fn test_every_relationship_target_is_registered() {
        let catalog = Catalog::load().unwrap();
        for entity in catalog.schema.entities() {
            for rel in &entity.relationships {
                assert!(
                    catalog.schema.contains(&rel.to),
                    "{} -> {} is dangling",
                    entity.key,
                    rel.to
                );
            }
        }
    }

    #[test]
    fn test_authored_relationships_are_mirrored() {
        let catalog = Catalog::load().unwrap();
        assert!(catalog.schema.inverse_mismatches().is_empty());
    }

    // Stricter than the data strictly needs: a dangling target aborts
    // startup instead of drawing a connector to nowhere.
    #[test]
    fn test_dangling_reference_rejected_at_startup() {
        let mut entities = library_entities();
        entities[0].relationships.push(many_to_one("shelves", "book_id"));
        let schema = SchemaRegistry::new(entities).unwrap();
        let err = Catalog::new(schema, OperationsRegistry::default()).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Schema(SchemaError::UnknownTarget { .. })
        ));
    }

    #[test]
    fn test_books_fields() {
        let catalog = Catalog::load().unwrap();
        let books = catalog.schema.get("books").unwrap();
        let fields: Vec<(&str, String)> = books
            .fields
            .iter()
            .map(|f| (f.name.as_str(), f.typ.to_string()))
            .collect();
        assert_eq!(
            fields,
            vec![
                ("book_id", "INT".to_string()),
                ("isbn", "VARCHAR(20)".to_string()),
                ("title", "VARCHAR(255)".to_string()),
                ("publisher_id", "INT".to_string()),
                ("publication_date", "DATE".to_string()),
                ("total_copies", "INT".to_string()),
                ("available_copies", "INT".to_string()),
            ]
        );
        assert_eq!(books.fields[4].typ.semantic(), SemanticType::Date);
    }

    #[test]
    fn test_staff_keeps_both_loan_relationships() {
        let catalog = Catalog::load().unwrap();
        let staff = catalog.schema.get("staff").unwrap();
        let to_loans: Vec<&str> = staff
            .relationships
            .iter()
            .filter(|r| r.to == "loans")
            .map(|r| r.via.as_str())
            .collect();
        assert_eq!(to_loans, vec!["issued_by_staff_id", "received_by_staff_id"]);
    }

    #[test]
    fn test_shared_catalog_is_reused() {
        let a = library().unwrap();
        let b = library().unwrap();
        assert!(std::ptr::eq(a, b));
    }
}
