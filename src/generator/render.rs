use std::fmt::Write;

use crate::generator::entity::{Dialect, GeneratorOptions};
use crate::generator::ir::{AssociationIr, DefaultValue, EntityIr, ExtraValue, FieldIr, UniqueIr};
use crate::generator::typescript;
use crate::model::names::Namer;
use crate::model::schema::SchemaModel;
use crate::typemap::Validation;

/// Indentation helper: one unit per nesting level, spaces or tabs.
pub(crate) struct Indent {
    unit: String,
}

impl Indent {
    pub(crate) fn new(options: &GeneratorOptions) -> Self {
        let unit = if options.spaces { " " } else { "\t" };
        Self {
            unit: unit.repeat(options.indentation),
        }
    }

    pub(crate) fn at(&self, level: usize) -> String {
        self.unit.repeat(level)
    }
}

/// Render one entity into source text for the selected dialect.
///
/// The full model is needed because the TypeScript preamble renders mixins
/// for every relationship touching the table, not just this entity's own
/// association block.
pub fn render_entity(
    entity: &EntityIr,
    model: &SchemaModel,
    options: &GeneratorOptions,
    namer: &Namer<'_>,
) -> String {
    let sp = Indent::new(options);
    let mut out = String::new();

    match options.dialect {
        Dialect::Es5 => {
            out.push_str("const Sequelize = require('sequelize');\n");
            out.push_str("module.exports = function(sequelize, DataTypes) {\n");
            writeln!(
                out,
                "{}return sequelize.define('{}', {{",
                sp.at(1),
                entity.model_name
            )
            .unwrap();
        }
        Dialect::Es6 => {
            out.push_str("const Sequelize = require('sequelize');\n");
            out.push_str("module.exports = (sequelize, DataTypes) => {\n");
            writeln!(
                out,
                "{}return {}.init(sequelize, DataTypes);",
                sp.at(1),
                entity.model_name
            )
            .unwrap();
            out.push_str("}\n\n");
            writeln!(out, "class {} extends Sequelize.Model {{", entity.model_name).unwrap();
            writeln!(out, "{}static init(sequelize, DataTypes) {{", sp.at(1)).unwrap();
            writeln!(out, "{}super.init({{", sp.at(1)).unwrap();
        }
        Dialect::Esm => {
            out.push_str("import _sequelize from 'sequelize';\n");
            out.push_str("const { Model, Sequelize } = _sequelize;\n\n");
            writeln!(out, "export default class {} extends Model {{", entity.model_name).unwrap();
            writeln!(out, "{}static init(sequelize, DataTypes) {{", sp.at(1)).unwrap();
            writeln!(out, "{}super.init({{", sp.at(1)).unwrap();
        }
        Dialect::Custom => {
            out.push_str("import { Model } from 'sequelize';\n\n");
            writeln!(out, "export default class {} extends Model {{", entity.model_name).unwrap();
            writeln!(out, "{}static init(sequelize, DataTypes) {{", sp.at(1)).unwrap();
            writeln!(out, "{}super.init(", sp.at(2)).unwrap();
            writeln!(out, "{}{{", sp.at(3)).unwrap();
        }
        Dialect::Ts => {
            out.push_str("import * as Sequelize from 'sequelize';\n");
            out.push_str("import { DataTypes, Model, Optional } from 'sequelize';\n");
            typescript::render_preamble(&mut out, entity, model, namer, &sp);
            writeln!(out, "{}{}.init({{", sp.at(2), entity.model_name).unwrap();
        }
    }

    for field in &entity.fields {
        render_field(&mut out, field, &sp);
    }

    writeln!(out, "{}}},", sp.at(3)).unwrap();
    writeln!(out, "{}{{", sp.at(3)).unwrap();
    writeln!(out, "{}sequelize,", sp.at(4)).unwrap();
    writeln!(out, "{}modelName: '{}',", sp.at(4), entity.options.model_name).unwrap();
    if let Some(schema) = &entity.options.schema {
        writeln!(out, "{}schema: '{schema}',", sp.at(4)).unwrap();
    }
    if entity.options.has_trigger {
        writeln!(out, "{}hasTrigger: true,", sp.at(4)).unwrap();
    }
    if entity.options.timestamps == Some(false) {
        writeln!(out, "{}timestamps: false,", sp.at(4)).unwrap();
    }
    if entity.options.paranoid {
        writeln!(out, "{}paranoid: true,", sp.at(4)).unwrap();
    }
    for (key, value) in &entity.options.extra {
        match value {
            ExtraValue::Bool(flag) => writeln!(out, "{}{key}: {flag},", sp.at(4)).unwrap(),
            ExtraValue::Text(text) => writeln!(out, "{}{key}: '{text}',", sp.at(4)).unwrap(),
            ExtraValue::TableName(table) => {
                writeln!(out, "{}name: {{", sp.at(4)).unwrap();
                writeln!(out, "{}singular: '{table}',", sp.at(5)).unwrap();
                writeln!(out, "{}plural: '{table}'", sp.at(5)).unwrap();
                writeln!(out, "{}}},", sp.at(4)).unwrap();
            }
        }
    }
    render_indexes(&mut out, entity, &sp);
    writeln!(out, "{}}}", sp.at(3)).unwrap();
    writeln!(out, "{});", sp.at(2)).unwrap();

    if options.dialect == Dialect::Es5 {
        out.push_str("};\n");
    } else {
        writeln!(out, "{}return {};", sp.at(2), entity.model_name).unwrap();
        writeln!(out, "{}}}", sp.at(1)).unwrap();
        out.push('\n');
        render_association_block(&mut out, &entity.associations);
        out.push_str("}\n");
    }

    out
}

fn render_field(out: &mut String, field: &FieldIr, sp: &Indent) {
    writeln!(out, "{}{}: {{", sp.at(4), quote_name(&field.prop)).unwrap();
    writeln!(out, "{}type: {},", sp.at(5), field.descriptor.render()).unwrap();
    writeln!(out, "{}allowNull: {},", sp.at(5), field.allow_null).unwrap();
    if let Some(default) = &field.default {
        writeln!(out, "{}defaultValue: {},", sp.at(5), render_default(default)).unwrap();
    }
    if field.auto_increment {
        writeln!(out, "{}autoIncrement: true,", sp.at(5)).unwrap();
        if field.auto_increment_identity {
            writeln!(out, "{}autoIncrementIdentity: true,", sp.at(5)).unwrap();
        }
    }
    if field.primary_key {
        writeln!(out, "{}primaryKey: true,", sp.at(5)).unwrap();
    }
    if let Some(reference) = &field.references {
        writeln!(out, "{}references: {{", sp.at(5)).unwrap();
        writeln!(out, "{}model: '{}',", sp.at(6), reference.table).unwrap();
        writeln!(out, "{}key: '{}',", sp.at(6), reference.key).unwrap();
        writeln!(out, "{}}},", sp.at(5)).unwrap();
    }
    if let Some(comment) = &field.comment {
        writeln!(out, "{}comment: '{comment}',", sp.at(5)).unwrap();
    }
    if let Some(unique) = &field.unique {
        match unique {
            UniqueIr::Flag => writeln!(out, "{}unique: true,", sp.at(5)).unwrap(),
            UniqueIr::Named(name) => writeln!(out, "{}unique: '{name}',", sp.at(5)).unwrap(),
        }
    }
    if field.field_alias {
        writeln!(out, "{}field: '{}',", sp.at(5), field.column).unwrap();
    }
    if !field.validations.is_empty() {
        writeln!(out, "{}validate: {{", sp.at(5)).unwrap();
        for rule in &field.validations {
            render_validation(out, rule, sp);
        }
        writeln!(out, "{}}},", sp.at(5)).unwrap();
    }
    writeln!(out, "{}}},", sp.at(4)).unwrap();
}

fn render_validation(out: &mut String, rule: &Validation, sp: &Indent) {
    match rule {
        Validation::NotNull { msg } => write_rule(out, sp, "notNull", None, msg),
        Validation::IsInt { msg } => write_rule(out, sp, "isInt", None, msg),
        Validation::IsDecimal { msg } => write_rule(out, sp, "isDecimal", None, msg),
        Validation::IsAlpha { msg } => write_rule(out, sp, "isAlpha", None, msg),
        Validation::IsDate { msg } => write_rule(out, sp, "isDate", None, msg),
        Validation::Len { min, max, msg } => write_rule(out, sp, "len", Some((*min, *max)), msg),
    }
}

fn write_rule(out: &mut String, sp: &Indent, name: &str, args: Option<(u32, u32)>, msg: &str) {
    writeln!(out, "{}{name}: {{", sp.at(6)).unwrap();
    if let Some((min, max)) = args {
        writeln!(out, "{}args: [{min}, {max}],", sp.at(7)).unwrap();
    }
    writeln!(out, "{}msg: '{msg}',", sp.at(7)).unwrap();
    writeln!(out, "{}}},", sp.at(6)).unwrap();
}

fn render_default(value: &DefaultValue) -> String {
    match value {
        DefaultValue::Bool(flag) => flag.to_string(),
        DefaultValue::Raw(text) => text.clone(),
        DefaultValue::UuidV4 => "DataTypes.UUIDV4".to_string(),
        DefaultValue::Fn(name) => format!("Sequelize.Sequelize.fn('{name}')"),
        DefaultValue::Literal(text) => format!("Sequelize.Sequelize.literal('{text}')"),
        DefaultValue::Str(text) => format!("'{text}'"),
    }
}

fn render_indexes(out: &mut String, entity: &EntityIr, sp: &Indent) {
    if entity.indexes.is_empty() {
        return;
    }
    writeln!(out, "{}indexes: [", sp.at(4)).unwrap();
    for index in &entity.indexes {
        writeln!(out, "{}{{", sp.at(5)).unwrap();
        if !index.name.is_empty() {
            writeln!(out, "{}name: '{}',", sp.at(6), index.name).unwrap();
        }
        if index.unique {
            writeln!(out, "{}unique: true,", sp.at(6)).unwrap();
        }
        if let Some(kind) = &index.index_type {
            if matches!(kind.as_str(), "UNIQUE" | "FULLTEXT" | "SPATIAL") {
                writeln!(out, "{}type: '{kind}',", sp.at(6)).unwrap();
            } else {
                writeln!(out, "{}using: '{kind}',", sp.at(6)).unwrap();
            }
        }
        let fields = index
            .fields
            .iter()
            .map(|field| {
                let mut part = format!("{{ name: '{}'", field.attribute);
                if let Some(collate) = &field.collate {
                    write!(part, ", collate: '{collate}'").unwrap();
                }
                if let Some(length) = field.length {
                    write!(part, ", length: {length}").unwrap();
                }
                if let Some(order) = field.order.as_deref().filter(|order| *order != "ASC") {
                    write!(part, ", order: '{order}'").unwrap();
                }
                part.push_str(" }");
                part
            })
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(out, "{}fields: [{fields}],", sp.at(6)).unwrap();
        writeln!(out, "{}}},", sp.at(5)).unwrap();
    }
    writeln!(out, "{}],", sp.at(4)).unwrap();
}

/// The `static associate(models)` hook used by the class dialects.
fn render_association_block(out: &mut String, associations: &[AssociationIr]) {
    out.push_str("  static associate(models) {\n");
    for association in associations {
        match association {
            AssociationIr::BelongsToMany {
                other_model,
                through,
                foreign_key,
                other_key,
                ..
            } => {
                writeln!(out, "    this.belongsToMany(models.{other_model}, {{").unwrap();
                writeln!(out, "      through: '{through}',").unwrap();
                writeln!(out, "      foreignKey: '{foreign_key}',").unwrap();
                writeln!(out, "      otherKey: '{other_key}',").unwrap();
                out.push_str("    });\n");
            }
            AssociationIr::BelongsTo {
                parent_model,
                alias,
                foreign_key,
            } => {
                let alias = alias
                    .as_ref()
                    .map(|name| format!("as: '{name}', "))
                    .unwrap_or_default();
                writeln!(
                    out,
                    "    this.belongsTo(models.{parent_model}, {{ {alias}foreignKey: '{foreign_key}' }});"
                )
                .unwrap();
            }
            AssociationIr::Has {
                one,
                child_model,
                alias,
                foreign_key,
            } => {
                let method = if *one { "hasOne" } else { "hasMany" };
                let alias = alias
                    .as_ref()
                    .map(|name| format!("as: '{name}', "))
                    .unwrap_or_default();
                writeln!(
                    out,
                    "    this.{method}(models.{child_model}, {{ {alias}foreignKey: '{foreign_key}' }});"
                )
                .unwrap();
            }
        }
    }
    out.push_str("  }\n");
}

/// Quote a property name when it is not a valid bare identifier.
pub(crate) fn quote_name(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        format!("'{name}'")
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '$' || first == '_' || first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '$' || c == '_' || c.is_ascii_alphanumeric())
}
