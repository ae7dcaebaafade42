use crate::model::names::{pluralize, Namer};
use crate::model::schema::{IndexSpec, Relationship};
use crate::typemap::{TypeDescriptor, Validation};

/// Everything the per-dialect renderers need to emit one entity source file.
#[derive(Debug, Clone)]
pub struct EntityIr {
    /// Qualified table name.
    pub table: String,
    /// Local table name without the schema segment.
    pub table_local: String,
    /// Schema segment, when qualified.
    pub schema: Option<String>,
    /// Recased entity name.
    pub model_name: String,
    /// Recased file-name stem.
    pub file_stem: String,
    /// Fields in introspection order, housekeeping columns already dropped.
    pub fields: Vec<FieldIr>,
    /// Table-level options.
    pub options: TableOptionsIr,
    /// Index definitions, introspection order.
    pub indexes: Vec<IndexSpec>,
    /// Associations incident on this entity, belongsToMany first.
    pub associations: Vec<AssociationIr>,
    /// Recased property names of the primary-key columns.
    pub primary_keys: Vec<String>,
}

/// One rendered field attribute block.
#[derive(Debug, Clone)]
pub struct FieldIr {
    /// Recased property name.
    pub prop: String,
    /// Raw column name.
    pub column: String,
    /// Canonical type.
    pub descriptor: TypeDescriptor,
    /// `allowNull` attribute.
    pub allow_null: bool,
    /// `primaryKey` attribute (suppressed for non-key FK constraint rows).
    pub primary_key: bool,
    /// `autoIncrement` attribute (explicit flag or serial-key heuristic).
    pub auto_increment: bool,
    /// Postgres identity hint, emitted alongside `autoIncrement`.
    pub auto_increment_identity: bool,
    /// `references` attribute, when the column is a foreign key.
    pub references: Option<ReferenceIr>,
    /// Normalized default value, `None` when absent or database-generated.
    pub default: Option<DefaultValue>,
    /// Column comment, escaped for single-quoted emission.
    pub comment: Option<String>,
    /// `unique` attribute.
    pub unique: Option<UniqueIr>,
    /// Emit a `field:` alias back to the raw column name.
    pub field_alias: bool,
    /// Validation rules, type-derived first, then not-null.
    pub validations: Vec<Validation>,
}

/// `references: { model, key }` payload.
#[derive(Debug, Clone)]
pub struct ReferenceIr {
    /// Referenced table.
    pub table: String,
    /// Referenced column.
    pub key: String,
}

/// A default value after engine-specific normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultValue {
    /// Boolean literal coerced from a textual truthy pattern.
    Bool(bool),
    /// Emitted verbatim: numbers, JSON, re-quoted array literals.
    Raw(String),
    /// A recognized UUID generator, emitted as `DataTypes.UUIDV4`.
    UuidV4,
    /// A database function call, wrapped in `Sequelize.Sequelize.fn`.
    Fn(String),
    /// A date/time keyword, wrapped in `Sequelize.Sequelize.literal`.
    Literal(String),
    /// Everything else, single-quoted.
    Str(String),
}

/// `unique` attribute payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UniqueIr {
    /// Plain `unique: true`.
    Flag,
    /// Named constraint, `unique: '<name>'`.
    Named(String),
}

/// Table-level options rendered after the field list.
#[derive(Debug, Clone)]
pub struct TableOptionsIr {
    /// `modelName`: always the raw local table name.
    pub model_name: String,
    /// `schema`, only for engines with schema support.
    pub schema: Option<String>,
    /// `hasTrigger: true` when the table carries triggers.
    pub has_trigger: bool,
    /// `Some(false)` when timestamp management must be disabled.
    pub timestamps: Option<bool>,
    /// `paranoid: true` when a soft-delete column was recognized.
    pub paranoid: bool,
    /// Remaining user-supplied options, alphabetical.
    pub extra: Vec<(String, ExtraValue)>,
}

/// A user-supplied table option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtraValue {
    /// Booleans are emitted unquoted.
    Bool(bool),
    /// Everything else is emitted single-quoted.
    Text(String),
    /// The reserved `name` key: forces a singular/plural override equal to
    /// the qualified table name.
    TableName(String),
}

/// One association declaration scoped to a single entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssociationIr {
    /// `belongsToMany` through a junction entity.
    BelongsToMany {
        /// The entity on the far side of the junction.
        other_model: String,
        /// Navigation alias (plural), used by the aggregate renderer.
        alias: String,
        /// Junction entity name.
        through: String,
        /// This side's junction column.
        foreign_key: String,
        /// The far side's junction column.
        other_key: String,
    },
    /// `belongsTo` the referenced entity.
    BelongsTo {
        /// Referenced entity.
        parent_model: String,
        /// Alias clause, dropped when redundant under `no_alias`.
        alias: Option<String>,
        /// Referencing column.
        foreign_key: String,
    },
    /// `hasOne` / `hasMany` the referencing entity.
    Has {
        /// `hasOne` when true, `hasMany` otherwise.
        one: bool,
        /// Referencing entity.
        child_model: String,
        /// Alias clause, dropped when redundant under `no_alias`.
        alias: Option<String>,
        /// Referencing column.
        foreign_key: String,
    },
}

/// True when a many-to-many relationship already links the two entities, in
/// either orientation.
pub(crate) fn m2m_covers(relations: &[Relationship], parent: &str, child: &str) -> bool {
    relations.iter().any(|rel| {
        rel.is_m2m
            && ((rel.parent_model == parent && rel.child_model == child)
                || (rel.parent_model == child && rel.child_model == parent))
    })
}

/// True when the entity is the junction of some many-to-many relationship.
pub(crate) fn m2m_joins(relations: &[Relationship], model: &str) -> bool {
    relations
        .iter()
        .any(|rel| rel.is_m2m && rel.join_model.as_deref() == Some(model))
}

/// Associations incident on `model`, belongsToMany first.
///
/// A `belongsTo` is omitted when a many-to-many already covers the same pair
/// of entities, and a `hasOne`/`hasMany` is omitted when its child is the
/// junction of a many-to-many, so the generated declarations never conflict.
pub fn build_associations(
    relations: &[Relationship],
    model: &str,
    namer: &Namer<'_>,
    no_alias: bool,
) -> Vec<AssociationIr> {
    let mut many = Vec::new();
    let mut rest = Vec::new();

    for rel in relations {
        if rel.is_m2m {
            let join = rel.join_model.as_deref().unwrap_or_default();
            let child_id = rel.child_id.as_deref().unwrap_or_default();
            if rel.parent_model == model {
                many.push(AssociationIr::BelongsToMany {
                    other_model: namer.prop_name(&rel.child_model),
                    alias: rel.child_prop.clone(),
                    through: namer.prop_name(join),
                    foreign_key: rel.parent_id.clone(),
                    other_key: child_id.to_string(),
                });
            } else if rel.child_model == model {
                many.push(AssociationIr::BelongsToMany {
                    other_model: namer.prop_name(&rel.parent_model),
                    alias: rel.parent_prop.clone(),
                    through: namer.prop_name(join),
                    foreign_key: child_id.to_string(),
                    other_key: rel.parent_id.clone(),
                });
            }
            continue;
        }

        if rel.child_model == model && !m2m_covers(relations, &rel.parent_model, &rel.child_model)
        {
            let alias = if no_alias && rel.parent_model.eq_ignore_ascii_case(&rel.parent_prop) {
                None
            } else {
                Some(rel.parent_prop.clone())
            };
            rest.push(AssociationIr::BelongsTo {
                parent_model: namer.prop_name(&rel.parent_model),
                alias,
                foreign_key: rel.parent_id.clone(),
            });
        }

        if rel.parent_model == model && !m2m_joins(relations, &rel.child_model) {
            let default_alias = pluralize(namer.inflector, &rel.child_model.to_lowercase());
            let alias = if no_alias && default_alias.eq_ignore_ascii_case(&rel.child_prop) {
                None
            } else {
                Some(rel.child_prop.clone())
            };
            rest.push(AssociationIr::Has {
                one: rel.is_one,
                child_model: namer.prop_name(&rel.child_model),
                alias,
                foreign_key: rel.parent_id.clone(),
            });
        }
    }

    many.append(&mut rest);
    many
}
