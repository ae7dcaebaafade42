//! The aggregate artifact: one module that imports every entity, initializes
//! each, applies all association declarations, and re-exports the set.

use std::fmt::Write;

use crate::generator::entity::{Dialect, GeneratorOptions};
use crate::generator::ir::{m2m_covers, m2m_joins};
use crate::model::names::{split_qualified, Namer};
use crate::model::schema::SchemaModel;

/// Cross-entity association declarations, dialect-independent.
///
/// Ordering and dedup rules match the per-table association blocks:
/// belongsToMany first, then belongsTo/has pairs for relations not already
/// covered by a many-to-many.
pub fn render_associations(
    model: &SchemaModel,
    options: &GeneratorOptions,
    namer: &Namer<'_>,
) -> String {
    let relations = &model.relations;
    let mut many = String::new();
    let mut rest = String::new();

    for rel in relations {
        if rel.is_m2m {
            let join = rel.join_model.as_deref().unwrap_or_default();
            let child_id = rel.child_id.as_deref().unwrap_or_default();
            writeln!(
                many,
                "  {}.belongsToMany({}, {{ as: '{}', through: {join}, foreignKey: \"{}\", otherKey: \"{child_id}\" }});",
                rel.parent_model, rel.child_model, rel.child_prop, rel.parent_id
            )
            .unwrap();
            writeln!(
                many,
                "  {}.belongsToMany({}, {{ as: '{}', through: {join}, foreignKey: \"{child_id}\", otherKey: \"{}\" }});",
                rel.child_model, rel.parent_model, rel.parent_prop, rel.parent_id
            )
            .unwrap();
            continue;
        }

        if !m2m_covers(relations, &rel.parent_model, &rel.child_model) {
            let alias = if options.no_alias && rel.parent_model.eq_ignore_ascii_case(&rel.parent_prop)
            {
                String::new()
            } else {
                format!("as: \"{}\", ", rel.parent_prop)
            };
            writeln!(
                rest,
                "  {}.belongsTo({}, {{ {alias}foreignKey: \"{}\"}});",
                rel.child_model, rel.parent_model, rel.parent_id
            )
            .unwrap();
        }
        if !m2m_joins(relations, &rel.child_model) {
            let method = if rel.is_one { "hasOne" } else { "hasMany" };
            let default_alias = namer.pluralize(&rel.child_model.to_lowercase());
            let alias = if options.no_alias && default_alias.eq_ignore_ascii_case(&rel.child_prop) {
                String::new()
            } else {
                format!("as: \"{}\", ", rel.child_prop)
            };
            writeln!(
                rest,
                "  {}.{method}({}, {{ {alias}foreignKey: \"{}\"}});",
                rel.parent_model, rel.child_model, rel.parent_id
            )
            .unwrap();
        }
    }

    many + &rest
}

/// Render the aggregate index module for the selected dialect.
pub fn render_index_file(
    model: &SchemaModel,
    options: &GeneratorOptions,
    namer: &Namer<'_>,
) -> String {
    let mut locals: Vec<&str> = model
        .tables
        .keys()
        .map(|table| split_qualified(table).1)
        .collect();
    locals.sort_unstable();
    let entries: Vec<(String, String)> = locals
        .iter()
        .map(|local| (namer.file_stem(local), namer.model_name(local)))
        .collect();

    let assoc = render_associations(model, options, namer);

    match options.dialect {
        Dialect::Ts => ts_init(&entries, &assoc),
        Dialect::Esm => esm_init(&entries, &assoc),
        Dialect::Custom => custom_init(&entries, &assoc),
        Dialect::Es5 | Dialect::Es6 => es5_init(&entries, &assoc),
    }
}

fn ts_init(entries: &[(String, String)], assoc: &str) -> String {
    let mut out = String::from("import type { Sequelize, Model } from \"sequelize\";\n");
    for (stem, name) in entries {
        writeln!(out, "import {{ {name} }} from \"./{stem}\";").unwrap();
        writeln!(
            out,
            "import type {{ {name}Attributes, {name}CreationAttributes }} from \"./{stem}\";"
        )
        .unwrap();
    }
    out.push_str("\nexport {\n");
    for (_, name) in entries {
        writeln!(out, "  {name},").unwrap();
    }
    out.push_str("};\n");
    out.push_str("\nexport type {\n");
    for (_, name) in entries {
        writeln!(out, "  {name}Attributes,").unwrap();
        writeln!(out, "  {name}CreationAttributes,").unwrap();
    }
    out.push_str("};\n\n");
    out.push_str("export function initModels(sequelize: Sequelize) {\n");
    for (_, name) in entries {
        writeln!(out, "  {name}.initModel(sequelize);").unwrap();
    }
    out.push('\n');
    out.push_str(assoc);
    out.push_str("\n  return {\n");
    for (_, name) in entries {
        writeln!(out, "    {name}: {name},").unwrap();
    }
    out.push_str("  };\n}\n");
    out
}

fn es5_init(entries: &[(String, String)], assoc: &str) -> String {
    let mut out = String::from("var DataTypes = require(\"sequelize\").DataTypes;\n");
    for (stem, name) in entries {
        writeln!(out, "var _{name} = require(\"./{stem}\");").unwrap();
    }
    out.push_str("\nfunction initModels(sequelize) {\n");
    for (_, name) in entries {
        writeln!(out, "  var {name} = _{name}(sequelize, DataTypes);").unwrap();
    }
    out.push('\n');
    out.push_str(assoc);
    out.push_str("\n  return {\n");
    for (_, name) in entries {
        writeln!(out, "    {name},").unwrap();
    }
    out.push_str("  };\n}\n");
    out.push_str("module.exports = initModels;\n");
    out.push_str("module.exports.initModels = initModels;\n");
    out.push_str("module.exports.default = initModels;\n");
    out
}

fn esm_init(entries: &[(String, String)], assoc: &str) -> String {
    let mut out = String::from("import _sequelize from \"sequelize\";\n");
    out.push_str("const DataTypes = _sequelize.DataTypes;\n");
    for (stem, name) in entries {
        writeln!(out, "import _{name} from \"./{stem}.js\";").unwrap();
    }
    out.push_str("\nexport default function initModels(sequelize) {\n");
    for (_, name) in entries {
        writeln!(out, "  var {name} = _{name}.init(sequelize, DataTypes);").unwrap();
    }
    out.push('\n');
    out.push_str(assoc);
    out.push_str("\n  return {\n");
    for (_, name) in entries {
        writeln!(out, "    {name},").unwrap();
    }
    out.push_str("  };\n}\n");
    out
}

fn custom_init(entries: &[(String, String)], assoc: &str) -> String {
    let mut out = String::from("import Sequelize from 'sequelize';\n\n");
    out.push_str("import {\n");
    out.push_str("  DB,\n");
    out.push_str("  USER,\n");
    out.push_str("  PASSWORD,\n");
    out.push_str("  HOST,\n");
    out.push_str("  dialect as _dialect,\n");
    out.push_str("  pool as _pool,\n");
    out.push_str("} from '../config/db.config.js';\n\n");
    for (stem, name) in entries {
        writeln!(out, "import {name} from './{stem}.js';").unwrap();
    }
    out.push_str("\nconst sequelize = new Sequelize(DB, USER, PASSWORD, {\n");
    out.push_str("  host: HOST,\n");
    out.push_str("  dialect: _dialect,\n\n");
    out.push_str("  pool: {\n");
    out.push_str("    max: _pool.max,\n");
    out.push_str("    min: _pool.min,\n");
    out.push_str("    acquire: _pool.acquire,\n");
    out.push_str("    idle: _pool.idle,\n");
    out.push_str("  },\n");
    out.push_str("});\n\n");
    out.push_str("const models = {\n");
    for (stem, name) in entries {
        writeln!(out, "  {stem}: {name}.init(sequelize, Sequelize),").unwrap();
    }
    out.push_str("};\n\n");
    out.push_str("Object.values(models)\n");
    out.push_str("  .filter((model) => typeof model.associate === 'function')\n");
    out.push_str("  .forEach((model) => model.associate(models));\n\n");
    out.push_str("const db = {\n");
    out.push_str("  ...models,\n");
    out.push_str("  sequelize,\n");
    out.push_str("};\n\n");
    out.push_str("module.exports = db;\n");
    out
}

#[cfg(test)]
mod tests {
    use crate::model::names::EnglishInflector;
    use crate::model::schema::Relationship;

    use super::*;

    fn relation() -> Relationship {
        Relationship {
            parent_id: "buyer_id".to_string(),
            parent_model: "Customer".to_string(),
            parent_prop: "buyer".to_string(),
            parent_table: "customers".to_string(),
            child_model: "Order".to_string(),
            child_prop: "orders".to_string(),
            child_table: "orders".to_string(),
            child_id: None,
            join_model: None,
            is_one: false,
            is_m2m: false,
        }
    }

    #[test]
    fn no_alias_drops_redundant_clauses_only() {
        let mut model = SchemaModel::default();
        model.relations.push(relation());
        let inflector = EnglishInflector;
        let options = GeneratorOptions {
            no_alias: true,
            ..GeneratorOptions::default()
        };
        let namer = options.namer(&inflector);

        let text = render_associations(&model, &options, &namer);
        // The parent alias "buyer" differs from the model name, so it is
        // kept; the child alias equals the pluralized model name and is not.
        assert!(text
            .contains("Order.belongsTo(Customer, { as: \"buyer\", foreignKey: \"buyer_id\"});"));
        assert!(text.contains("Customer.hasMany(Order, { foreignKey: \"buyer_id\"});"));
    }
}
