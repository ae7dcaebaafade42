use std::collections::BTreeMap;

use clap::ValueEnum;
use serde_json::Value;
use thiserror::Error;

use crate::generator::ir::{
    build_associations, DefaultValue, EntityIr, ExtraValue, FieldIr, ReferenceIr, TableOptionsIr,
    UniqueIr,
};
use crate::generator::render;
use crate::model::names::{split_qualified, Case, Inflect, Namer};
use crate::model::schema::{ColumnDescriptor, SchemaModel};
use crate::typemap::validation::{validation_rules, Validation};
use crate::typemap::{mapper, map_column_type};

/// Output source-text style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Dialect {
    /// Legacy `require` module exporting a `sequelize.define` call.
    #[default]
    Es5,
    /// ES2015 class with a CommonJS wrapper.
    Es6,
    /// ES module exporting the class directly.
    Esm,
    /// TypeScript with typed attributes and association mixins.
    Ts,
    /// Project-template class with a `static associate` hook.
    Custom,
}

impl Dialect {
    /// File extension for generated sources.
    pub fn extension(self) -> &'static str {
        match self {
            Dialect::Ts => "ts",
            _ => "js",
        }
    }
}

/// Database engine the schema was introspected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Engine {
    /// `PostgreSQL`
    #[default]
    Postgres,
    /// MySQL / MariaDB
    MySql,
    /// Microsoft SQL Server
    Mssql,
    /// SQLite
    Sqlite,
}

impl Engine {
    /// Whether tables can be qualified with a schema.
    pub fn has_schema(self) -> bool {
        matches!(self, Engine::Postgres | Engine::Mssql)
    }

    /// Whether a primary-key column may carry a `field:` alias. Engines with
    /// case-insensitive column resolution would otherwise request the same
    /// column twice in a join condition.
    pub fn can_alias_pk(self) -> bool {
        matches!(self, Engine::Postgres | Engine::Sqlite)
    }

    /// Engine-specific heuristic recognizing database-generated key defaults.
    fn serial_default(self, default: &str) -> bool {
        match self {
            Engine::Postgres => default.starts_with("nextval"),
            Engine::Mssql => default.to_ascii_lowercase().contains("identity"),
            Engine::MySql | Engine::Sqlite => false,
        }
    }
}

/// Rendering configuration for one generation run.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Output dialect.
    pub dialect: Dialect,
    /// Source database engine.
    pub engine: Engine,
    /// Casing for entity names.
    pub case_model: Case,
    /// Casing for property names.
    pub case_prop: Case,
    /// Casing for file-name stems.
    pub case_file: Case,
    /// Singularize entity names.
    pub singularize: bool,
    /// Drop association alias clauses that equal the default name.
    pub no_alias: bool,
    /// Indentation width, in characters per level.
    pub indentation: usize,
    /// Indent with spaces instead of tabs.
    pub spaces: bool,
    /// Free-form table options merged into every entity; the keys
    /// `timestamps`, `paranoid`, `name`, `createdAt`, `updatedAt`, and
    /// `deletedAt` are consulted when recognizing housekeeping columns.
    pub additional: BTreeMap<String, Value>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            engine: Engine::default(),
            case_model: Case::None,
            case_prop: Case::None,
            case_file: Case::None,
            singularize: false,
            no_alias: false,
            indentation: 2,
            spaces: false,
            additional: BTreeMap::new(),
        }
    }
}

impl GeneratorOptions {
    /// Naming surface shared with the inference engine.
    pub fn namer<'a>(&self, inflector: &'a dyn Inflect) -> Namer<'a> {
        Namer {
            case_model: self.case_model,
            case_prop: self.case_prop,
            case_file: self.case_file,
            singularize_models: self.singularize,
            inflector,
        }
    }

    fn additional_str(&self, key: &str) -> Option<&str> {
        self.additional.get(key).and_then(Value::as_str)
    }

    fn additional_flag(&self, key: &str) -> Option<bool> {
        self.additional.get(key).and_then(Value::as_bool)
    }

    /// Timestamp columns are auto-managed unless explicitly disabled.
    fn timestamps_managed(&self) -> bool {
        self.additional_flag("timestamps") != Some(false)
    }

    fn is_timestamp_field(&self, field: &str) -> bool {
        if !self.timestamps_managed() {
            return false;
        }
        let created = self.additional_str("createdAt");
        let updated = self.additional_str("updatedAt");
        (created.is_none() && field.eq_ignore_ascii_case("createdat"))
            || created == Some(field)
            || (updated.is_none() && field.eq_ignore_ascii_case("updatedat"))
            || updated == Some(field)
    }

    fn is_paranoid_field(&self, field: &str) -> bool {
        if !self.timestamps_managed() || self.additional_flag("paranoid") == Some(false) {
            return false;
        }
        let deleted = self.additional_str("deletedAt");
        (deleted.is_none() && field.eq_ignore_ascii_case("deletedat")) || deleted == Some(field)
    }
}

/// Fatal generation failures.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The raw type string matched none of the type mapper's rules. Guessing
    /// a default here would emit mistyped models, so generation stops.
    #[error("unrecognized column type `{raw_type}` for column `{column}` of table `{table}`")]
    UnrecognizedColumnType {
        /// Qualified table name.
        table: String,
        /// Raw column name.
        column: String,
        /// The raw type string as introspected.
        raw_type: String,
    },
}

/// Render every table of the model into source text, keyed by qualified
/// table name. Compilation of one table is side-effect-free, so output is
/// deterministic for a given model and configuration.
pub fn generate_text(
    model: &SchemaModel,
    options: &GeneratorOptions,
    inflector: &dyn Inflect,
) -> Result<BTreeMap<String, String>, GenerateError> {
    let namer = options.namer(inflector);
    let mut text = BTreeMap::new();
    for table in model.tables.keys() {
        let entity = build_entity(model, table, options, &namer)?;
        text.insert(
            table.clone(),
            render::render_entity(&entity, model, options, &namer),
        );
    }
    Ok(text)
}

/// Resolve one table into its intermediate representation.
pub fn build_entity(
    model: &SchemaModel,
    table: &str,
    options: &GeneratorOptions,
    namer: &Namer<'_>,
) -> Result<EntityIr, GenerateError> {
    let (schema, local) = split_qualified(table);
    let columns = model.tables.get(table).map(Vec::as_slice).unwrap_or_default();

    let mut timestamps = options.additional_flag("timestamps") == Some(true);
    let mut paranoid = false;
    let mut fields = Vec::new();
    let mut primary_keys = Vec::new();

    for column in columns {
        timestamps |= options.is_timestamp_field(&column.name);
        paranoid |= options.is_paranoid_field(&column.name);
        if column.primary_key {
            primary_keys.push(namer.prop_name(&column.name));
        }
        if options.timestamps_managed()
            && (options.is_timestamp_field(&column.name) || options.is_paranoid_field(&column.name))
        {
            continue;
        }
        fields.push(build_field(model, table, column, options, namer)?);
    }

    let mut extra = Vec::new();
    for (key, value) in &options.additional {
        match key.as_str() {
            "name" => extra.push((key.clone(), ExtraValue::TableName(table.to_string()))),
            "timestamps" | "paranoid" => {}
            _ => {
                let value = match value {
                    Value::Bool(flag) => ExtraValue::Bool(*flag),
                    Value::String(text) => ExtraValue::Text(text.clone()),
                    other => ExtraValue::Text(other.to_string()),
                };
                extra.push((key.clone(), value));
            }
        }
    }

    Ok(EntityIr {
        table: table.to_string(),
        table_local: local.to_string(),
        schema: schema.map(str::to_string),
        model_name: namer.model_name(local),
        file_stem: namer.file_stem(local),
        fields,
        options: TableOptionsIr {
            model_name: local.to_string(),
            schema: schema
                .filter(|_| options.engine.has_schema())
                .map(str::to_string),
            has_trigger: model.has_trigger.get(table).copied().unwrap_or(false),
            timestamps: if timestamps { None } else { Some(false) },
            paranoid,
            extra,
        },
        indexes: model.indexes.get(table).cloned().unwrap_or_default(),
        associations: build_associations(
            &model.relations,
            &namer.model_name(local),
            namer,
            options.no_alias,
        ),
        primary_keys,
    })
}

fn build_field(
    model: &SchemaModel,
    table: &str,
    column: &ColumnDescriptor,
    options: &GeneratorOptions,
    namer: &Namer<'_>,
) -> Result<FieldIr, GenerateError> {
    let fk = model.foreign_key(table, &column.name);
    let descriptor = map_column_type(
        &column.column_type,
        column.element_type.as_deref(),
        column.enum_values.as_deref(),
    )
    .ok_or_else(|| GenerateError::UnrecognizedColumnType {
        table: table.to_string(),
        column: column.name.clone(),
        raw_type: column.column_type.clone(),
    })?;

    let prop = namer.prop_name(&column.name);
    let raw_type = column.column_type.trim().to_ascii_lowercase();

    let serial = fk.is_some_and(|key| key.is_serial_key)
        || column
            .default_value
            .as_deref()
            .is_some_and(|default| options.engine.serial_default(default));
    let auto_increment = serial || column.auto_increment;
    let auto_increment_identity = auto_increment
        && options.engine == Engine::Postgres
        && fk.is_some_and(|key| {
            key.is_primary_key
                && matches!(key.generation.as_deref(), Some("ALWAYS") | Some("BY DEFAULT"))
        });

    let mut validations = validation_rules(&column.column_type, &prop);
    if !column.allow_null {
        validations.push(Validation::NotNull {
            msg: format!("\"{prop}\" cannot be empty."),
        });
    }

    let unique = if column.unique {
        Some(UniqueIr::Flag)
    } else {
        fk.and_then(|key| key.is_unique.as_ref())
            .map(|name| UniqueIr::Named(name.replace('"', "\\\"")))
    };

    let field_alias = column.name != prop
        && (!column.primary_key
            || options.engine.can_alias_pk()
            || column.name.to_uppercase() != prop.to_uppercase());

    Ok(FieldIr {
        prop,
        column: column.name.clone(),
        descriptor,
        allow_null: column.allow_null,
        primary_key: column.primary_key && fk.map_or(true, |key| key.is_primary_key),
        auto_increment,
        auto_increment_identity,
        references: fk
            .filter(|key| key.is_foreign_key)
            .map(|key| ReferenceIr {
                table: key.target_table.clone(),
                key: key.target_column.clone(),
            }),
        default: if serial {
            None
        } else {
            normalize_default(column, &raw_type, options.engine)
        },
        comment: column
            .comment
            .as_deref()
            .filter(|comment| !comment.is_empty())
            .map(escape_special),
        unique,
        field_alias,
        validations,
    })
}

/// Normalize a raw textual default into an emittable form.
fn normalize_default(
    column: &ColumnDescriptor,
    raw_type: &str,
    engine: Engine,
) -> Option<DefaultValue> {
    let raw = column.default_value.as_deref()?;
    if engine == Engine::Mssql
        && (raw.eq_ignore_ascii_case("(newid())") || raw == "(NULL)" || raw == "NULL")
    {
        return None;
    }

    let escaped = escape_special(raw);

    if mapper::is_boolean_type(raw_type) {
        let lowered = escaped.to_ascii_lowercase();
        return Some(DefaultValue::Bool(
            lowered.contains('1') || lowered.contains("true"),
        ));
    }
    if mapper::is_array_type(raw_type) {
        let body = escaped.strip_prefix('{').unwrap_or(&escaped);
        let body = body.strip_suffix('}').unwrap_or(body);
        let quoted_elements = !body.is_empty()
            && column
                .element_type
                .as_deref()
                .is_some_and(|element| mapper::is_string_type(&element.to_ascii_lowercase()));
        let body = if quoted_elements {
            body.split(',')
                .map(|element| format!("\"{element}\""))
                .collect::<Vec<_>>()
                .join(",")
        } else {
            body.to_string()
        };
        return Some(DefaultValue::Raw(format!("[{body}]")));
    }
    if mapper::is_number_type(raw_type) || raw_type.starts_with("json") {
        return Some(DefaultValue::Raw(escaped.replace(['(', ')'], "")));
    }
    if raw_type == "uuid"
        && (escaped == "gen_random_uuid()" || escaped == "uuid_generate_v4()")
    {
        return Some(DefaultValue::UuidV4);
    }
    if escaped.ends_with("()") || escaped.ends_with("())") {
        return Some(DefaultValue::Fn(escaped.replace(['(', ')'], "")));
    }
    if raw_type.starts_with("date") || raw_type.starts_with("timestamp") {
        let lowered = escaped.to_ascii_lowercase();
        if matches!(
            lowered.as_str(),
            "current_timestamp" | "current_date" | "current_time" | "localtime" | "localtimestamp"
        ) {
            return Some(DefaultValue::Literal(escaped));
        }
        return Some(DefaultValue::Str(escaped));
    }
    Some(DefaultValue::Str(escaped))
}

/// Escape characters that would break single-quoted source literals.
pub(crate) fn escape_special(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('/', "\\/")
        .replace('\u{8}', "\\b")
        .replace('\u{c}', "\\f")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}
