use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::model::names::{join_qualified, split_qualified, Namer};
use crate::model::schema::{ForeignKeySpec, Relationship, SchemaModel};

/// A junction table whose primary key spans more than two foreign keys, so no
/// many-to-many relationship could be inferred from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JunctionWarning {
    /// Qualified junction table name.
    pub table: String,
    /// The foreign-key column that triggered the check.
    pub column: String,
    /// The other primary-key foreign-key columns of the table.
    pub candidates: Vec<String>,
}

impl fmt::Display for JunctionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "table `{}` joins more than two tables through its primary key ({}, {}); no many-to-many relationship inferred",
            self.table,
            self.column,
            self.candidates.join(", ")
        )
    }
}

/// Infer relationships from the recorded foreign keys and append them to
/// `model.relations`, sorted by `(parent_table, child_table)`.
///
/// Tables and columns are visited in lexicographic order, so two runs over
/// the same schema produce identical relations and identical aliases.
pub fn infer_relations(model: &mut SchemaModel, namer: &Namer<'_>) -> Vec<JunctionWarning> {
    let mut builder = RelationBuilder::new(namer);
    for (table, fk_map) in &model.foreign_keys {
        for (column, spec) in fk_map {
            if spec.is_foreign_key {
                builder.add_relation(table, column, spec, fk_map);
            }
        }
    }
    let (mut relations, warnings) = builder.finish();
    relations.sort_by(|a, b| {
        (&a.parent_table, &a.child_table).cmp(&(&b.parent_table, &b.child_table))
    });
    model.relations = relations;
    warnings
}

/// Accumulates relationships while tracking which navigation-property names
/// are already taken on each referenced table.
struct RelationBuilder<'a> {
    namer: &'a Namer<'a>,
    relations: Vec<Relationship>,
    used_names: BTreeSet<String>,
    warnings: Vec<JunctionWarning>,
}

impl<'a> RelationBuilder<'a> {
    fn new(namer: &'a Namer<'a>) -> Self {
        Self {
            namer,
            relations: Vec::new(),
            used_names: BTreeSet::new(),
            warnings: Vec::new(),
        }
    }

    fn finish(self) -> (Vec<Relationship>, Vec<JunctionWarning>) {
        (self.relations, self.warnings)
    }

    fn add_relation(
        &mut self,
        table: &str,
        column: &str,
        spec: &ForeignKeySpec,
        fk_map: &BTreeMap<String, ForeignKeySpec>,
    ) {
        let (schema, _) = split_qualified(table);
        let child_model = self.namer.model_name(&spec.source_table);
        let parent_model = self.namer.model_name(&spec.target_table);
        let parent_table =
            join_qualified(spec.target_schema.as_deref().or(schema), &spec.target_table);
        let child_table =
            join_qualified(spec.source_schema.as_deref().or(schema), &spec.source_table);

        let parent_prop = self.parent_alias(column, &spec.target_table, &spec.source_table, false);
        let child_alias = self.child_alias(column, &spec.source_table, &spec.target_table);
        let is_one = is_one_to_one(column, spec, fk_map);
        let child_prop = if is_one {
            self.namer.singularize(&child_alias)
        } else {
            self.namer.pluralize(&child_alias)
        };
        let parent_id = self.namer.prop_name(column);

        self.relations.push(Relationship {
            parent_id: parent_id.clone(),
            parent_model: parent_model.clone(),
            parent_prop: parent_prop.clone(),
            parent_table: parent_table.clone(),
            child_model: child_model.clone(),
            child_prop,
            child_table,
            child_id: None,
            join_model: None,
            is_one,
            is_m2m: false,
        });

        if !spec.is_primary_key {
            return;
        }
        let siblings: Vec<&ForeignKeySpec> = fk_map
            .values()
            .filter(|k| k.is_foreign_key && k.is_primary_key && k.source_column != column)
            .collect();
        match siblings.len() {
            0 => {}
            1 => {
                // One many-to-many per junction table, anchored at the
                // lexicographically first foreign-key column.
                let other = siblings[0];
                if column < other.source_column.as_str() {
                    let other_prop = self.parent_alias(
                        &other.source_column,
                        &other.target_table,
                        &other.source_table,
                        true,
                    );
                    self.relations.push(Relationship {
                        parent_id,
                        parent_model,
                        parent_prop: self.namer.pluralize(&parent_prop),
                        parent_table,
                        child_model: self.namer.model_name(&other.target_table),
                        child_prop: self.namer.pluralize(&other_prop),
                        child_table: join_qualified(
                            other.target_schema.as_deref().or(schema),
                            &other.target_table,
                        ),
                        child_id: Some(self.namer.prop_name(&other.source_column)),
                        join_model: Some(child_model),
                        is_one,
                        is_m2m: true,
                    });
                }
            }
            _ => {
                let first = !fk_map.values().any(|k| {
                    k.is_foreign_key && k.is_primary_key && k.source_column.as_str() < column
                });
                if first {
                    self.warnings.push(JunctionWarning {
                        table: table.to_string(),
                        column: column.to_string(),
                        candidates: siblings.iter().map(|k| k.source_column.clone()).collect(),
                    });
                }
            }
        }
    }

    /// Alias for the navigation from the referencing table to `referenced`.
    ///
    /// Names are claimed per referenced table, so the same foreign-key column
    /// name appearing in two different tables still yields distinct aliases;
    /// the second claim is suffixed with the owning table.
    fn parent_alias(
        &mut self,
        fk_column: &str,
        referenced: &str,
        owning: &str,
        is_m2m: bool,
    ) -> String {
        let mut name = trim_id(fk_column).to_string();
        if name == fk_column || is_m2m {
            name = format!("{fk_column}_{referenced}");
        }
        if self.used_names.contains(&format!("{referenced}.{name}")) {
            name = format!("{name}_{owning}");
        }
        self.used_names.insert(format!("{referenced}.{name}"));
        self.namer.recase(self.namer.case_prop, &name, true)
    }

    /// Alias for the navigation from `referenced` back to the owning table.
    fn child_alias(&mut self, fk_column: &str, owning: &str, referenced: &str) -> String {
        let mut name = owning.to_string();
        if self.used_names.contains(&format!("{referenced}.{name}")) {
            name = format!("{}_{owning}", trim_id(fk_column));
        }
        self.used_names.insert(format!("{referenced}.{name}"));
        self.namer.recase(self.namer.case_prop, &name, true)
    }
}

/// A foreign key is one-to-one when it is the whole primary key, or carries a
/// unique constraint not shared with any other column.
fn is_one_to_one(
    column: &str,
    spec: &ForeignKeySpec,
    fk_map: &BTreeMap<String, ForeignKeySpec>,
) -> bool {
    if spec.is_primary_key {
        return !fk_map
            .values()
            .any(|k| k.is_primary_key && k.source_column != column);
    }
    if spec.is_unique.is_some() {
        return !fk_map
            .values()
            .any(|k| k.is_unique == spec.is_unique && k.source_column != column);
    }
    false
}

/// Strip a trailing `id`/`Id`/`ID` (when the name is longer than the suffix
/// plus one character) and any trailing underscore: `customer_id` becomes
/// `customer`, while `id` itself is untouched.
fn trim_id(name: &str) -> &str {
    let trimmed = if name.len() > 3 && name.to_ascii_lowercase().ends_with("id") {
        &name[..name.len() - 2]
    } else {
        name
    };
    trimmed.trim_end_matches('_')
}
