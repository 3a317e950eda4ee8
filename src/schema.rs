//! Entity, field and relationship types plus the registry that holds them.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SchemaError {
    #[error("Entity registered twice: {0}")]
    DuplicateEntity(String),
    #[error("Relationship {from} -> {to} targets an unregistered entity")]
    UnknownTarget { from: String, to: String },
    #[error("Relationship {from} -> {to} joins via {via}, which neither side declares")]
    UnknownJoinField { from: String, to: String, via: String },
    #[error("Primary key of {entity} names undeclared field {field}")]
    UnknownKeyField { entity: String, field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    Integer,
    Text,
    Date,
    Time,
    Timestamp,
    Boolean,
    Enumerated,
    Decimal,
}

/// Column type as written in the schema (`VARCHAR(255)`, `INT`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Int,
    Varchar(u16),
    Text,
    Date,
    Time,
    Timestamp,
    Boolean,
    Enum,
    Decimal,
}

impl FieldType {
    pub fn semantic(self) -> SemanticType {
        match self {
            Self::Int => SemanticType::Integer,
            Self::Varchar(_) | Self::Text => SemanticType::Text,
            Self::Date => SemanticType::Date,
            Self::Time => SemanticType::Time,
            Self::Timestamp => SemanticType::Timestamp,
            Self::Boolean => SemanticType::Boolean,
            Self::Enum => SemanticType::Enumerated,
            Self::Decimal => SemanticType::Decimal,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => f.write_str("INT"),
            Self::Varchar(len) => write!(f, "VARCHAR({})", len),
            Self::Text => f.write_str("TEXT"),
            Self::Date => f.write_str("DATE"),
            Self::Time => f.write_str("TIME"),
            Self::Timestamp => f.write_str("TIMESTAMP"),
            Self::Boolean => f.write_str("BOOLEAN"),
            Self::Enum => f.write_str("ENUM"),
            Self::Decimal => f.write_str("DECIMAL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub typ: FieldType,
    pub description: String,
}

impl Field {
    pub fn new(name: &str, typ: FieldType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            typ,
            description: description.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PrimaryKey {
    Single(String),
    Composite(Vec<String>),
}

impl PrimaryKey {
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Self::Single(name) => vec![name.as_str()],
            Self::Composite(names) => names.iter().map(|s| s.as_str()).collect(),
        }
    }
}

impl fmt::Display for PrimaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fields().join(", "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Cardinality {
    #[serde(rename = "many-to-one")]
    ManyToOne,
    #[serde(rename = "one-to-many")]
    OneToMany,
}

impl Cardinality {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ManyToOne => "many-to-one",
            Self::OneToMany => "one-to-many",
        }
    }

    pub fn inverse(self) -> Self {
        match self {
            Self::ManyToOne => Self::OneToMany,
            Self::OneToMany => Self::ManyToOne,
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub to: String,
    pub cardinality: Cardinality,
    pub via: String,
}

/// Diagram colouring group. Display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityCategory {
    Core,
    Junction,
    Transaction,
    Reference,
    Event,
}

impl EntityCategory {
    pub const ALL: [EntityCategory; 5] = [
        Self::Core,
        Self::Junction,
        Self::Transaction,
        Self::Reference,
        Self::Event,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Core => "Core",
            Self::Junction => "Junction",
            Self::Transaction => "Transaction",
            Self::Reference => "Reference",
            Self::Event => "Event",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::Core => "#2563eb",
            Self::Junction => "#9333ea",
            Self::Transaction => "#16a34a",
            Self::Reference => "#ca8a04",
            Self::Event => "#dc2626",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub key: String,
    pub name: String,
    pub primary_key: PrimaryKey,
    pub category: EntityCategory,
    pub fields: Vec<Field>,
    pub relationships: Vec<Relationship>,
}

impl Entity {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A relationship with no mirrored descriptor on its target.
#[derive(Debug, Clone, PartialEq)]
pub struct InverseMismatch {
    pub from: String,
    pub to: String,
    pub via: String,
    pub cardinality: Cardinality,
}

/// Read-only, ordered collection of entities.
///
/// Registration order is significant: it is the ordinal index used by the
/// layout grid fallback and the order of the entity dropdown.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    entities: Vec<Entity>,
    index: HashMap<String, usize>,
}

impl SchemaRegistry {
    /// Build a registry, rejecting duplicate keys. Reference checks happen in
    /// [`SchemaRegistry::validate`].
    pub fn new(entities: Vec<Entity>) -> Result<Self, SchemaError> {
        let mut index = HashMap::with_capacity(entities.len());
        for (i, entity) in entities.iter().enumerate() {
            if index.insert(entity.key.clone(), i).is_some() {
                return Err(SchemaError::DuplicateEntity(entity.key.clone()));
            }
        }
        Ok(Self { entities, index })
    }

    pub fn get(&self, key: &str) -> Option<&Entity> {
        self.index.get(key).map(|&i| &self.entities[i])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn ordinal(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Display name for a key, falling back to the raw key.
    pub fn display_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.get(key).map(|e| e.name.as_str()).unwrap_or(key)
    }

    /// Check that every reference inside the registry resolves.
    pub fn validate(&self) -> Result<(), SchemaError> {
        for entity in &self.entities {
            for key_field in entity.primary_key.fields() {
                if entity.field(key_field).is_none() {
                    return Err(SchemaError::UnknownKeyField {
                        entity: entity.key.clone(),
                        field: key_field.to_string(),
                    });
                }
            }

            for rel in &entity.relationships {
                let target = self.get(&rel.to).ok_or_else(|| SchemaError::UnknownTarget {
                    from: entity.key.clone(),
                    to: rel.to.clone(),
                })?;

                if entity.field(&rel.via).is_none() && target.field(&rel.via).is_none() {
                    return Err(SchemaError::UnknownJoinField {
                        from: entity.key.clone(),
                        to: rel.to.clone(),
                        via: rel.via.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Relationships whose target does not declare the mirrored relationship
    /// (same join field, opposite cardinality). Reported only; the data is
    /// kept as authored.
    pub fn inverse_mismatches(&self) -> Vec<InverseMismatch> {
        let declared: HashSet<(&str, &str, &str, Cardinality)> = self
            .entities
            .iter()
            .flat_map(|e| {
                e.relationships
                    .iter()
                    .map(move |r| (e.key.as_str(), r.to.as_str(), r.via.as_str(), r.cardinality))
            })
            .collect();

        let mut mismatches = Vec::new();
        for entity in &self.entities {
            for rel in &entity.relationships {
                let mirrored = (
                    rel.to.as_str(),
                    entity.key.as_str(),
                    rel.via.as_str(),
                    rel.cardinality.inverse(),
                );
                if !declared.contains(&mirrored) {
                    mismatches.push(InverseMismatch {
                        from: entity.key.clone(),
                        to: rel.to.clone(),
                        via: rel.via.clone(),
                        cardinality: rel.cardinality,
                    });
                }
            }
        }
        mismatches
    }
}
