//! Typed-dialect extras: the attribute interface, creation-attribute types,
//! class fields, association mixins, and the import set they require.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

use crate::generator::render::{quote_name, Indent};
use crate::model::names::{join_qualified, split_qualified, upper_first, Namer};
use crate::model::schema::{ColumnDescriptor, Relationship, SchemaModel};
use crate::typemap::map_column_type;

use super::ir::EntityIr;

/// Everything between the module imports and the `Model.init({` call.
pub(crate) fn render_preamble(
    out: &mut String,
    entity: &EntityIr,
    model: &SchemaModel,
    namer: &Namer<'_>,
    sp: &Indent,
) {
    let (mixins, needed) = association_mixins(entity, model, namer, sp);

    for (fk_table, names) in &needed {
        let (_, local) = split_qualified(fk_table);
        let stem = namer.file_stem(local);
        let names = names.iter().cloned().collect::<Vec<_>>().join(", ");
        writeln!(out, "import type {{ {names} }} from './{stem}';").unwrap();
    }

    let model_name = &entity.model_name;
    writeln!(out, "\nexport interface {model_name}Attributes {{").unwrap();
    render_attribute_fields(out, entity, model, namer, sp, true);
    out.push_str("}\n\n");

    if entity.primary_keys.is_empty() {
        writeln!(
            out,
            "export type {model_name}CreationAttributes = {model_name}Attributes;\n"
        )
        .unwrap();
    } else {
        let keys = entity
            .primary_keys
            .iter()
            .map(|key| format!("\"{key}\""))
            .collect::<Vec<_>>()
            .join(" | ");
        writeln!(out, "export type {model_name}Pk = {keys};").unwrap();
        writeln!(out, "export type {model_name}Id = {model_name}[{model_name}Pk];").unwrap();
        writeln!(
            out,
            "export type {model_name}CreationAttributes = Optional<{model_name}Attributes, {model_name}Pk>;\n"
        )
        .unwrap();
    }

    writeln!(
        out,
        "export class {model_name} extends Model<{model_name}Attributes, {model_name}CreationAttributes> implements {model_name}Attributes {{"
    )
    .unwrap();
    render_attribute_fields(out, entity, model, namer, sp, false);
    out.push('\n');
    out.push_str(&mixins);
    out.push('\n');
    writeln!(
        out,
        "{}static initModel(sequelize: Sequelize.Sequelize): typeof {model_name} {{",
        sp.at(1)
    )
    .unwrap();
}

/// One declaration per introspected column, housekeeping columns included:
/// the attribute types describe the table, not the subset the `init` call
/// manages explicitly.
fn render_attribute_fields(
    out: &mut String,
    entity: &EntityIr,
    model: &SchemaModel,
    namer: &Namer<'_>,
    sp: &Indent,
    interface: bool,
) {
    let columns = model
        .tables
        .get(&entity.table)
        .map(Vec::as_slice)
        .unwrap_or_default();
    for column in columns {
        let name = quote_name(&namer.prop_name(&column.name));
        let marker = if is_optional(column) {
            "?"
        } else if interface {
            ""
        } else {
            "!"
        };
        writeln!(out, "{}{name}{marker}: {};", sp.at(2), ts_type(column)).unwrap();
    }
}

fn is_optional(column: &ColumnDescriptor) -> bool {
    column.allow_null || column.default_value.is_some()
}

fn ts_type(column: &ColumnDescriptor) -> String {
    map_column_type(
        &column.column_type,
        column.element_type.as_deref(),
        column.enum_values.as_deref(),
    )
    .map(|descriptor| descriptor.ts_type())
    .unwrap_or_else(|| "any".to_string())
}

/// Typed accessor/mutator stubs for every relationship touching the table,
/// plus the sibling types each stub forces us to import.
fn association_mixins(
    entity: &EntityIr,
    model: &SchemaModel,
    namer: &Namer<'_>,
    sp: &Indent,
) -> (String, BTreeMap<String, BTreeSet<String>>) {
    let table = schema_qualified_for_relations(&entity.table, &model.relations);
    let mut needed: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut text = String::new();
    let pad = sp.at(3);

    for rel in &model.relations {
        if rel.is_m2m {
            if rel.parent_table != table && rel.child_table != table {
                continue;
            }
            let (this_model, other, prop, other_table) = if rel.parent_table == table {
                (&rel.parent_model, &rel.child_model, &rel.child_prop, &rel.child_table)
            } else {
                (&rel.child_model, &rel.parent_model, &rel.parent_prop, &rel.parent_table)
            };
            let child_id = rel.child_id.as_deref().unwrap_or_default();
            let singular = upper_first(&namer.singularize(prop));
            let plural = upper_first(prop);
            writeln!(
                text,
                "{pad}// {this_model} belongsToMany {other} via {} and {child_id}",
                rel.parent_id
            )
            .unwrap();
            writeln!(text, "{pad}{prop}!: {other}[];").unwrap();
            writeln!(text, "{pad}get{plural}!: Sequelize.BelongsToManyGetAssociationsMixin<{other}>;").unwrap();
            writeln!(text, "{pad}set{plural}!: Sequelize.BelongsToManySetAssociationsMixin<{other}, {other}Id>;").unwrap();
            writeln!(text, "{pad}add{singular}!: Sequelize.BelongsToManyAddAssociationMixin<{other}, {other}Id>;").unwrap();
            writeln!(text, "{pad}add{plural}!: Sequelize.BelongsToManyAddAssociationsMixin<{other}, {other}Id>;").unwrap();
            writeln!(text, "{pad}create{singular}!: Sequelize.BelongsToManyCreateAssociationMixin<{other}>;").unwrap();
            writeln!(text, "{pad}remove{singular}!: Sequelize.BelongsToManyRemoveAssociationMixin<{other}, {other}Id>;").unwrap();
            writeln!(text, "{pad}remove{plural}!: Sequelize.BelongsToManyRemoveAssociationsMixin<{other}, {other}Id>;").unwrap();
            writeln!(text, "{pad}has{singular}!: Sequelize.BelongsToManyHasAssociationMixin<{other}, {other}Id>;").unwrap();
            writeln!(text, "{pad}has{plural}!: Sequelize.BelongsToManyHasAssociationsMixin<{other}, {other}Id>;").unwrap();
            writeln!(text, "{pad}count{plural}!: Sequelize.BelongsToManyCountAssociationsMixin;").unwrap();
            let entry = needed.entry(other_table.clone()).or_default();
            entry.insert(other.clone());
            entry.insert(format!("{other}Id"));
            continue;
        }

        if rel.child_table == table {
            let parent = &rel.parent_model;
            let accessor = upper_first(&rel.parent_prop);
            writeln!(
                text,
                "{pad}// {} belongsTo {parent} via {}",
                rel.child_model, rel.parent_id
            )
            .unwrap();
            writeln!(text, "{pad}{}!: {parent};", rel.parent_prop).unwrap();
            writeln!(text, "{pad}get{accessor}!: Sequelize.BelongsToGetAssociationMixin<{parent}>;").unwrap();
            writeln!(text, "{pad}set{accessor}!: Sequelize.BelongsToSetAssociationMixin<{parent}, {parent}Id>;").unwrap();
            writeln!(text, "{pad}create{accessor}!: Sequelize.BelongsToCreateAssociationMixin<{parent}>;").unwrap();
            let entry = needed.entry(rel.parent_table.clone()).or_default();
            entry.insert(parent.clone());
            entry.insert(format!("{parent}Id"));
        }

        if rel.parent_table == table {
            let child = &rel.child_model;
            let entry = needed.entry(rel.child_table.clone()).or_default();
            if rel.is_one {
                let accessor = upper_first(&rel.child_prop);
                writeln!(
                    text,
                    "{pad}// {} hasOne {child} via {}",
                    rel.parent_model, rel.parent_id
                )
                .unwrap();
                writeln!(text, "{pad}{}!: {child};", rel.child_prop).unwrap();
                writeln!(text, "{pad}get{accessor}!: Sequelize.HasOneGetAssociationMixin<{child}>;").unwrap();
                writeln!(text, "{pad}set{accessor}!: Sequelize.HasOneSetAssociationMixin<{child}, {child}Id>;").unwrap();
                writeln!(text, "{pad}create{accessor}!: Sequelize.HasOneCreateAssociationMixin<{child}CreationAttributes>;").unwrap();
                entry.insert(child.clone());
                entry.insert(format!("{child}Id"));
                entry.insert(format!("{child}CreationAttributes"));
            } else {
                let singular = upper_first(&namer.singularize(&rel.child_prop));
                let plural = upper_first(&rel.child_prop);
                writeln!(
                    text,
                    "{pad}// {} hasMany {child} via {}",
                    rel.parent_model, rel.parent_id
                )
                .unwrap();
                writeln!(text, "{pad}{}!: {child}[];", rel.child_prop).unwrap();
                writeln!(text, "{pad}get{plural}!: Sequelize.HasManyGetAssociationsMixin<{child}>;").unwrap();
                writeln!(text, "{pad}set{plural}!: Sequelize.HasManySetAssociationsMixin<{child}, {child}Id>;").unwrap();
                writeln!(text, "{pad}add{singular}!: Sequelize.HasManyAddAssociationMixin<{child}, {child}Id>;").unwrap();
                writeln!(text, "{pad}add{plural}!: Sequelize.HasManyAddAssociationsMixin<{child}, {child}Id>;").unwrap();
                writeln!(text, "{pad}create{singular}!: Sequelize.HasManyCreateAssociationMixin<{child}>;").unwrap();
                writeln!(text, "{pad}remove{singular}!: Sequelize.HasManyRemoveAssociationMixin<{child}, {child}Id>;").unwrap();
                writeln!(text, "{pad}remove{plural}!: Sequelize.HasManyRemoveAssociationsMixin<{child}, {child}Id>;").unwrap();
                writeln!(text, "{pad}has{singular}!: Sequelize.HasManyHasAssociationMixin<{child}, {child}Id>;").unwrap();
                writeln!(text, "{pad}has{plural}!: Sequelize.HasManyHasAssociationsMixin<{child}, {child}Id>;").unwrap();
                writeln!(text, "{pad}count{plural}!: Sequelize.HasManyCountAssociationsMixin;").unwrap();
                entry.insert(child.clone());
                entry.insert(format!("{child}Id"));
            }
        }
    }

    needed.remove(&table);
    (text, needed)
}

/// Qualify an unqualified table with the schema the relations carry, so
/// mixin lookups match relation data introspected with a default schema.
fn schema_qualified_for_relations(table: &str, relations: &[Relationship]) -> String {
    if !table.contains('.') && !relations.iter().any(|rel| rel.child_table == table) {
        if let Some(first) = relations.iter().find(|rel| !rel.child_table.is_empty()) {
            let (schema, _) = split_qualified(&first.child_table);
            if let Some(schema) = schema {
                return join_qualified(Some(schema), table);
            }
        }
    }
    table.to_string()
}
