use crate::typemap::mapper::first_number;

/// A single validation constraint attached to a generated field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// Not-null check with its message (derived from `allowNull: false`).
    NotNull {
        /// Validation failure message.
        msg: String,
    },
    /// Integer-format check.
    IsInt {
        /// Validation failure message.
        msg: String,
    },
    /// Decimal-format check.
    IsDecimal {
        /// Validation failure message.
        msg: String,
    },
    /// Length-range check.
    Len {
        /// Minimum accepted length.
        min: u32,
        /// Maximum accepted length.
        max: u32,
        /// Validation failure message.
        msg: String,
    },
    /// Letters-only check.
    IsAlpha {
        /// Validation failure message.
        msg: String,
    },
    /// Date-format check.
    IsDate {
        /// Validation failure message.
        msg: String,
    },
}

/// Derive validation constraints from a raw column type string.
///
/// A parallel, independently ordered mapping from the same raw strings the
/// type mapper consumes. Two oddities are kept on purpose because generated
/// projects depend on them: unsigned integers get `isInt` while signed ones
/// get `isDecimal`, and `iso`-prefixed field names get an exact-length,
/// letters-only pair instead of the usual length range.
pub fn validation_rules(raw: &str, field_name: &str) -> Vec<Validation> {
    let ty = raw.trim().to_ascii_lowercase();

    if matches!(
        ty.as_str(),
        "boolean" | "bit" | "bit(1)" | "tinyint(1)" | "tinyint"
    ) {
        return Vec::new();
    }
    if matches!(
        ty.as_str(),
        "numrange" | "int4range" | "int8range" | "daterange" | "tsrange" | "tstzrange"
    ) {
        return Vec::new();
    }

    if ["bigint", "smallint", "mediumint", "tinyint", "int"]
        .iter()
        .any(|p| ty.starts_with(p))
    {
        return if ty.contains("unsigned") {
            vec![Validation::IsInt {
                msg: format!("\"{field_name}\" must be an integer."),
            }]
        } else {
            vec![Validation::IsDecimal {
                msg: format!("\"{field_name}\" must be decimal."),
            }]
        };
    }

    if ty == "nvarchar(max)" || ty == "varchar(max)" {
        return Vec::new();
    }
    if ["varchar", "string", "varying"].iter().any(|p| ty.contains(p)) {
        let Some(length) = first_number(&ty) else {
            return Vec::new();
        };
        return if field_name.starts_with("iso") {
            vec![
                Validation::Len {
                    min: length,
                    max: length,
                    msg: format!("\"{field_name}\" must be exactly {length} characters."),
                },
                Validation::IsAlpha {
                    msg: format!("\"{field_name}\" must contain letters only."),
                },
            ]
        } else {
            vec![Validation::Len {
                min: 1,
                max: length,
                msg: format!(
                    "\"{field_name}\" must be no more than {length} characters in length."
                ),
            }]
        };
    }

    if ty == "date" {
        return vec![Validation::IsDate {
            msg: format!("\"{field_name}\" must be a date-only string in the format YYYY-MM-DD."),
        }];
    }
    if ty.starts_with("date") || ty.starts_with("timestamp") {
        return vec![Validation::IsDate {
            msg: format!("\"{field_name}\" must be a date in the format YYYY-MM-DD 00:00:00."),
        }];
    }

    Vec::new()
}
