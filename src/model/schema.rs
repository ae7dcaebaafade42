use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One introspected column.
///
/// Immutable after introspection; the compiler looks up the matching
/// [`ForeignKeySpec`] in [`SchemaModel::foreign_keys`] instead of holding a
/// back-reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Raw column name as reported by the database.
    pub name: String,
    /// Raw, engine-specific type string (e.g. `varchar(45)`, `int unsigned`).
    pub column_type: String,
    /// Whether the column accepts NULL.
    #[serde(default)]
    pub allow_null: bool,
    /// Raw textual default value, engine-specific form.
    #[serde(default)]
    pub default_value: Option<String>,
    /// Whether the column carries a single-column unique constraint.
    #[serde(default)]
    pub unique: bool,
    /// Whether the column is part of the primary key.
    #[serde(default)]
    pub primary_key: bool,
    /// Explicit auto-increment flag from introspection.
    #[serde(default)]
    pub auto_increment: bool,
    /// Element type for array and range columns, spatial subtype for
    /// geometry/geography columns.
    #[serde(default)]
    pub element_type: Option<String>,
    /// Enumeration literals when introspection reports them structurally
    /// (Postgres); textual `enum(...)` types carry them in `column_type`.
    #[serde(default)]
    pub enum_values: Option<Vec<String>>,
    /// Column comment, if any.
    #[serde(default)]
    pub comment: Option<String>,
}

/// Foreign-key and key-constraint metadata for one column.
///
/// The introspection step also records plain primary-key and unique
/// constraints here with `is_foreign_key == false`; the inference engine
/// consults those siblings when deciding cardinality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeySpec {
    /// Schema of the referencing table, if qualified.
    #[serde(default)]
    pub source_schema: Option<String>,
    /// Referencing (child) table, local name.
    pub source_table: String,
    /// Referencing column.
    pub source_column: String,
    /// Schema of the referenced table, if qualified.
    #[serde(default)]
    pub target_schema: Option<String>,
    /// Referenced (parent) table, local name. Empty for non-FK constraints.
    #[serde(default)]
    pub target_table: String,
    /// Referenced column. Empty for non-FK constraints.
    #[serde(default)]
    pub target_column: String,
    /// True when this row describes an actual foreign key.
    #[serde(default)]
    pub is_foreign_key: bool,
    /// True when the source column is part of the table's primary key.
    #[serde(default)]
    pub is_primary_key: bool,
    /// Unique-constraint marker: the constraint name when the source column
    /// is unique. Two columns sharing one marker form a composite constraint.
    #[serde(default)]
    pub is_unique: Option<String>,
    /// True when the column value is produced by a database sequence.
    #[serde(default)]
    pub is_serial_key: bool,
    /// Identity generation mode (`ALWAYS` / `BY DEFAULT`) for identity columns.
    #[serde(default)]
    pub generation: Option<String>,
}

/// One field of an index definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexField {
    /// Indexed column name.
    pub attribute: String,
    /// Optional collation.
    #[serde(default)]
    pub collate: Option<String>,
    /// Optional prefix length.
    #[serde(default)]
    pub length: Option<u32>,
    /// Sort order (`ASC` / `DESC`).
    #[serde(default)]
    pub order: Option<String>,
}

/// One introspected index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    /// Index name.
    pub name: String,
    /// Whether the index is unique.
    #[serde(default)]
    pub unique: bool,
    /// Index type or access method (`BTREE`, `FULLTEXT`, `SPATIAL`, ...).
    #[serde(default)]
    pub index_type: Option<String>,
    /// Indexed fields, in index order.
    #[serde(default)]
    pub fields: Vec<IndexField>,
}

/// A directed, cardinality-tagged link between two entities, derived from a
/// foreign key. Produced exclusively by [`crate::relate::infer_relations`]
/// and immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// Referencing column, recased to the property casing.
    pub parent_id: String,
    /// Referenced (parent) entity name.
    pub parent_model: String,
    /// Property on the child entity navigating to the parent.
    pub parent_prop: String,
    /// Qualified referenced table name.
    pub parent_table: String,
    /// Referencing (child) entity name.
    pub child_model: String,
    /// Property on the parent entity navigating to the child(ren).
    pub child_prop: String,
    /// Qualified referencing table name.
    pub child_table: String,
    /// For many-to-many: the junction's other foreign-key column, recased.
    #[serde(default)]
    pub child_id: Option<String>,
    /// For many-to-many: the junction entity name.
    #[serde(default)]
    pub join_model: Option<String>,
    /// One-to-one cardinality (single-column primary or unique foreign key).
    pub is_one: bool,
    /// Many-to-many relationship routed through a junction table.
    pub is_m2m: bool,
}

/// The full introspected schema for one run.
///
/// Built once by the upstream introspection step, mutated exactly once by the
/// inference engine (append-only `relations`), then read-only for the
/// compiler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaModel {
    /// Qualified table name -> columns in introspection order.
    #[serde(default)]
    pub tables: BTreeMap<String, Vec<ColumnDescriptor>>,
    /// Qualified table name -> column name -> key metadata.
    #[serde(default)]
    pub foreign_keys: BTreeMap<String, BTreeMap<String, ForeignKeySpec>>,
    /// Qualified table name -> index definitions.
    #[serde(default)]
    pub indexes: BTreeMap<String, Vec<IndexSpec>>,
    /// Qualified table name -> whether the table carries triggers.
    #[serde(default)]
    pub has_trigger: BTreeMap<String, bool>,
    /// Inferred relationships, sorted by `(parent_table, child_table)`.
    /// Empty until the inference engine runs.
    #[serde(default)]
    pub relations: Vec<Relationship>,
}

impl SchemaModel {
    /// Look up the key metadata recorded for a column, if any.
    pub fn foreign_key(&self, table: &str, column: &str) -> Option<&ForeignKeySpec> {
        self.foreign_keys.get(table).and_then(|fks| fks.get(column))
    }

    /// Columns of `table` that are part of its primary key.
    pub fn primary_key_columns(&self, table: &str) -> Vec<&ColumnDescriptor> {
        self.tables
            .get(table)
            .map(|cols| cols.iter().filter(|c| c.primary_key).collect())
            .unwrap_or_default()
    }
}
