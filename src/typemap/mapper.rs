//! Ordered, first-match-wins mapping from raw column type strings to the
//! canonical type system.
//!
//! The match order matters: several patterns are substrings of others
//! (`timestamp` vs `time`, `jsonb` vs `json`), so rearranging the chain
//! changes the outcome. The order mirrors the precedence the generated
//! models have always relied on.

/// Integer width family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntKind {
    /// `tinyint`
    Tiny,
    /// `smallint`
    Small,
    /// `mediumint`
    Medium,
    /// `int` / `integer`
    Int,
    /// `bigint`
    Big,
}

impl IntKind {
    fn data_type(self) -> &'static str {
        match self {
            IntKind::Tiny => "TINYINT",
            IntKind::Small => "SMALLINT",
            IntKind::Medium => "MEDIUMINT",
            IntKind::Int => "INTEGER",
            IntKind::Big => "BIGINT",
        }
    }
}

/// Canonical description of a column type, produced per field during
/// compilation and consumed by both the field renderer and the TypeScript
/// attribute renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    /// Boolean-like column (`boolean`, `bit`, `bit(1)`, `tinyint(1)`).
    Boolean,
    /// Integer family with optional display modifiers.
    Integer {
        /// Width family.
        kind: IntKind,
        /// `unsigned` modifier present in the raw type.
        unsigned: bool,
        /// `zerofill` modifier present in the raw type.
        zerofill: bool,
    },
    /// Bounded or unbounded variable-length string.
    String {
        /// Declared maximum length, when bounded.
        length: Option<u32>,
    },
    /// Fixed-length character column.
    Char {
        /// Declared length.
        length: Option<u32>,
    },
    /// Single-precision float (`real`).
    Real,
    /// Unbounded text column.
    Text {
        /// Length hint carried by some engines (`text(255)`).
        length: Option<u32>,
    },
    /// Date without time of day.
    DateOnly,
    /// Date and time.
    DateTime {
        /// Fractional-seconds precision, when declared.
        length: Option<u32>,
    },
    /// Time of day.
    Time,
    /// Floating-point number.
    Float {
        /// `(precision, scale)` when declared.
        precision: Option<(u32, u32)>,
    },
    /// Fixed-point decimal.
    Decimal {
        /// `(precision, scale)` when declared.
        precision: Option<(u32, u32)>,
    },
    /// Double-precision float.
    Double {
        /// `(precision, scale)` when declared.
        precision: Option<(u32, u32)>,
    },
    /// UUID / uniqueidentifier.
    Uuid,
    /// Binary JSON.
    Jsonb,
    /// JSON document.
    Json,
    /// Spatial geometry with an optional subtype (`point`, `polygon`, ...).
    Geometry {
        /// Subtype from element-type metadata.
        subtype: Option<String>,
    },
    /// Spatial geography with an optional subtype.
    Geography {
        /// Subtype from element-type metadata.
        subtype: Option<String>,
    },
    /// Array of a canonical element type.
    ArrayOf(Box<TypeDescriptor>),
    /// Range over a canonical element type.
    RangeOf(Box<TypeDescriptor>),
    /// Binary blob (`binary`, `image`, `blob`).
    Blob,
    /// Key-value map (`hstore`).
    Hstore,
    /// Enumeration with its literal values, unquoted.
    Enum {
        /// Allowed literal values.
        values: Vec<String>,
    },
}

/// Map a raw column type string to a canonical [`TypeDescriptor`].
///
/// `element_type` carries the element type for arrays/ranges and the subtype
/// for spatial columns; `enum_values` carries structurally introspected
/// enumeration literals. Returns `None` for unrecognized types — callers must
/// fail loudly rather than fall back to a guessed default.
pub fn map_column_type(
    raw: &str,
    element_type: Option<&str>,
    enum_values: Option<&[String]>,
) -> Option<TypeDescriptor> {
    let ty = raw.trim().to_ascii_lowercase();

    if matches!(ty.as_str(), "boolean" | "bit" | "bit(1)" | "tinyint(1)") {
        return Some(TypeDescriptor::Boolean);
    }

    match ty.as_str() {
        "numrange" => {
            return Some(TypeDescriptor::RangeOf(Box::new(TypeDescriptor::Decimal {
                precision: None,
            })))
        }
        "int4range" => {
            return Some(TypeDescriptor::RangeOf(Box::new(TypeDescriptor::Integer {
                kind: IntKind::Int,
                unsigned: false,
                zerofill: false,
            })))
        }
        "int8range" => {
            return Some(TypeDescriptor::RangeOf(Box::new(TypeDescriptor::Integer {
                kind: IntKind::Big,
                unsigned: false,
                zerofill: false,
            })))
        }
        "daterange" => return Some(TypeDescriptor::RangeOf(Box::new(TypeDescriptor::DateOnly))),
        "tsrange" | "tstzrange" => {
            return Some(TypeDescriptor::RangeOf(Box::new(TypeDescriptor::DateTime {
                length: None,
            })))
        }
        _ => {}
    }

    const INT_PREFIXES: [(&str, IntKind); 5] = [
        ("bigint", IntKind::Big),
        ("smallint", IntKind::Small),
        ("mediumint", IntKind::Medium),
        ("tinyint", IntKind::Tiny),
        ("int", IntKind::Int),
    ];
    for (prefix, kind) in INT_PREFIXES {
        if ty.starts_with(prefix) {
            return Some(TypeDescriptor::Integer {
                kind,
                unsigned: ty.contains("unsigned"),
                zerofill: ty.contains("zerofill"),
            });
        }
    }

    if ty == "nvarchar(max)" || ty == "varchar(max)" {
        return Some(TypeDescriptor::Text { length: None });
    }
    if ["varchar", "string", "varying"].iter().any(|p| ty.contains(p)) {
        return Some(TypeDescriptor::String {
            length: paren_length(&ty),
        });
    }
    if ty.starts_with("nchar") || ty.starts_with("char") {
        return Some(TypeDescriptor::Char {
            length: paren_length(&ty),
        });
    }
    if ty.starts_with("real") {
        return Some(TypeDescriptor::Real);
    }
    if ty.ends_with("text") {
        return Some(TypeDescriptor::Text {
            length: paren_length(&ty),
        });
    }
    if ty == "date" {
        return Some(TypeDescriptor::DateOnly);
    }
    if ty.starts_with("date") || ty.starts_with("timestamp") {
        return Some(TypeDescriptor::DateTime {
            length: paren_length(&ty),
        });
    }
    if ty.starts_with("time") {
        return Some(TypeDescriptor::Time);
    }
    if ty.starts_with("float") {
        return Some(TypeDescriptor::Float {
            precision: paren_precision(&ty),
        });
    }
    if ty.starts_with("decimal") || ty.starts_with("numeric") {
        return Some(TypeDescriptor::Decimal {
            precision: paren_precision(&ty),
        });
    }
    if ty.starts_with("money") {
        return Some(TypeDescriptor::Decimal {
            precision: Some((19, 4)),
        });
    }
    if ty.starts_with("smallmoney") {
        return Some(TypeDescriptor::Decimal {
            precision: Some((10, 4)),
        });
    }
    if ty.starts_with("double") {
        return Some(TypeDescriptor::Double {
            precision: paren_precision(&ty),
        });
    }
    if ty.starts_with("uuid") || ty.starts_with("uniqueidentifier") {
        return Some(TypeDescriptor::Uuid);
    }
    if ty.starts_with("jsonb") {
        return Some(TypeDescriptor::Jsonb);
    }
    if ty.starts_with("json") {
        return Some(TypeDescriptor::Json);
    }
    if ty.starts_with("geometry") {
        return Some(TypeDescriptor::Geometry {
            subtype: element_type.map(str::to_string),
        });
    }
    if ty.starts_with("geography") {
        return Some(TypeDescriptor::Geography {
            subtype: element_type.map(str::to_string),
        });
    }
    if ty.starts_with("array") {
        let element = map_column_type(element_type?, None, enum_values)?;
        return Some(TypeDescriptor::ArrayOf(Box::new(element)));
    }
    if ty.contains("binary") || ty.contains("image") || ty.contains("blob") {
        return Some(TypeDescriptor::Blob);
    }
    if ty.starts_with("hstore") {
        return Some(TypeDescriptor::Hstore);
    }
    if ty.starts_with("enum") {
        let values = match enum_values {
            Some(values) => values.to_vec(),
            None => parse_textual_enum(&ty),
        };
        return Some(TypeDescriptor::Enum { values });
    }

    None
}

/// Literal values of a textual `enum('a','b','c')` type string.
fn parse_textual_enum(ty: &str) -> Vec<String> {
    let inner = ty
        .strip_prefix("enum(")
        .and_then(|rest| rest.strip_suffix(')'))
        .unwrap_or("");
    inner
        .split(',')
        .map(|v| v.trim().trim_matches('\'').to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

impl TypeDescriptor {
    /// The `DataTypes.*` attribute expression for this type.
    pub fn render(&self) -> String {
        match self {
            TypeDescriptor::Boolean => "DataTypes.BOOLEAN".to_string(),
            TypeDescriptor::Integer {
                kind,
                unsigned,
                zerofill,
            } => {
                let mut out = format!("DataTypes.{}", kind.data_type());
                if *unsigned {
                    out.push_str(".UNSIGNED");
                }
                if *zerofill {
                    out.push_str(".ZEROFILL");
                }
                out
            }
            TypeDescriptor::String { length } => match length {
                Some(n) => format!("DataTypes.STRING({n})"),
                None => "DataTypes.STRING".to_string(),
            },
            TypeDescriptor::Char { length } => match length {
                Some(n) => format!("DataTypes.CHAR({n})"),
                None => "DataTypes.CHAR".to_string(),
            },
            TypeDescriptor::Real => "DataTypes.REAL".to_string(),
            TypeDescriptor::Text { length } => match length {
                Some(n) => format!("DataTypes.TEXT({n})"),
                None => "DataTypes.TEXT".to_string(),
            },
            TypeDescriptor::DateOnly => "DataTypes.DATEONLY".to_string(),
            TypeDescriptor::DateTime { length } => match length {
                Some(n) => format!("DataTypes.DATE({n})"),
                None => "DataTypes.DATE".to_string(),
            },
            TypeDescriptor::Time => "DataTypes.TIME".to_string(),
            TypeDescriptor::Float { precision } => render_precise("FLOAT", *precision),
            TypeDescriptor::Decimal { precision } => render_precise("DECIMAL", *precision),
            TypeDescriptor::Double { precision } => render_precise("DOUBLE", *precision),
            TypeDescriptor::Uuid => "DataTypes.UUID".to_string(),
            TypeDescriptor::Jsonb => "DataTypes.JSONB".to_string(),
            TypeDescriptor::Json => "DataTypes.JSON".to_string(),
            TypeDescriptor::Geometry { subtype } => match subtype {
                Some(sub) => format!("DataTypes.GEOMETRY({sub})"),
                None => "DataTypes.GEOMETRY".to_string(),
            },
            TypeDescriptor::Geography { subtype } => match subtype {
                Some(sub) => format!("DataTypes.GEOGRAPHY({sub})"),
                None => "DataTypes.GEOGRAPHY".to_string(),
            },
            TypeDescriptor::ArrayOf(element) => format!("DataTypes.ARRAY({})", element.render()),
            TypeDescriptor::RangeOf(element) => format!("DataTypes.RANGE({})", element.render()),
            TypeDescriptor::Blob => "DataTypes.BLOB".to_string(),
            TypeDescriptor::Hstore => "DataTypes.HSTORE".to_string(),
            TypeDescriptor::Enum { values } => {
                let literals = values
                    .iter()
                    .map(|v| format!("'{}'", v.replace('\'', "\\'")))
                    .collect::<Vec<_>>()
                    .join(",");
                format!("DataTypes.ENUM({literals})")
            }
        }
    }

    /// The TypeScript-facing type for this descriptor.
    pub fn ts_type(&self) -> String {
        match self {
            TypeDescriptor::Boolean => "boolean".to_string(),
            TypeDescriptor::Integer { .. }
            | TypeDescriptor::Real
            | TypeDescriptor::Float { .. }
            | TypeDescriptor::Decimal { .. }
            | TypeDescriptor::Double { .. } => "number".to_string(),
            TypeDescriptor::DateTime { .. } => "Date".to_string(),
            TypeDescriptor::String { .. }
            | TypeDescriptor::Char { .. }
            | TypeDescriptor::Text { .. }
            | TypeDescriptor::DateOnly
            | TypeDescriptor::Time
            | TypeDescriptor::Uuid => "string".to_string(),
            TypeDescriptor::ArrayOf(element) | TypeDescriptor::RangeOf(element) => {
                format!("{}[]", element.ts_type())
            }
            TypeDescriptor::Enum { values } => {
                if values.is_empty() {
                    "string".to_string()
                } else {
                    values
                        .iter()
                        .map(|v| format!("\"{v}\""))
                        .collect::<Vec<_>>()
                        .join(" | ")
                }
            }
            TypeDescriptor::Jsonb
            | TypeDescriptor::Json
            | TypeDescriptor::Geometry { .. }
            | TypeDescriptor::Geography { .. }
            | TypeDescriptor::Blob
            | TypeDescriptor::Hstore => "any".to_string(),
        }
    }
}

fn render_precise(name: &str, precision: Option<(u32, u32)>) -> String {
    match precision {
        Some((p, s)) => format!("DataTypes.{name}({p},{s})"),
        None => format!("DataTypes.{name}"),
    }
}

/// First parenthesized single number in a type string, e.g. `varchar(45)`.
pub(crate) fn paren_length(ty: &str) -> Option<u32> {
    let mut rest = ty;
    while let Some(open) = rest.find('(') {
        let tail = &rest[open + 1..];
        if let Some(close) = tail.find(')') {
            let body = &tail[..close];
            if !body.is_empty() && body.bytes().all(|b| b.is_ascii_digit()) {
                return body.parse().ok();
            }
            rest = &tail[close + 1..];
        } else {
            return None;
        }
    }
    None
}

/// First parenthesized `(precision,scale)` pair in a type string.
pub(crate) fn paren_precision(ty: &str) -> Option<(u32, u32)> {
    let mut rest = ty;
    while let Some(open) = rest.find('(') {
        let tail = &rest[open + 1..];
        if let Some(close) = tail.find(')') {
            let body = &tail[..close];
            if let Some((p, s)) = body.split_once(',') {
                let p = p.trim();
                let s = s.trim();
                if !p.is_empty()
                    && !s.is_empty()
                    && p.bytes().all(|b| b.is_ascii_digit())
                    && s.bytes().all(|b| b.is_ascii_digit())
                {
                    if let (Ok(p), Ok(s)) = (p.parse(), s.parse()) {
                        return Some((p, s));
                    }
                }
            }
            rest = &tail[close + 1..];
        } else {
            return None;
        }
    }
    None
}

/// First run of digits anywhere in a type string (validation lengths).
pub(crate) fn first_number(ty: &str) -> Option<u32> {
    let start = ty.find(|c: char| c.is_ascii_digit())?;
    let digits: String = ty[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// True for raw types whose default values are numeric literals.
pub(crate) fn is_number_type(ty: &str) -> bool {
    [
        "smallint",
        "mediumint",
        "tinyint",
        "int",
        "bigint",
        "float",
        "money",
        "smallmoney",
        "double",
        "decimal",
        "numeric",
        "real",
    ]
    .iter()
    .any(|p| ty.starts_with(p))
}

/// True for raw types whose values are textual.
pub(crate) fn is_string_type(ty: &str) -> bool {
    [
        "char",
        "nchar",
        "string",
        "varying",
        "varchar",
        "nvarchar",
        "text",
        "longtext",
        "mediumtext",
        "tinytext",
        "ntext",
        "uuid",
        "uniqueidentifier",
        "date",
        "time",
    ]
    .iter()
    .any(|p| ty.starts_with(p))
}

/// True for array and range raw types.
pub(crate) fn is_array_type(ty: &str) -> bool {
    ty.starts_with("array") || ty.ends_with("range")
}

/// True for boolean-like raw types considered when coercing defaults.
pub(crate) fn is_boolean_type(ty: &str) -> bool {
    matches!(ty, "bit(1)" | "bit" | "boolean")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varchar_with_length_maps_to_bounded_string() {
        assert_eq!(
            map_column_type("varchar(45)", None, None),
            Some(TypeDescriptor::String { length: Some(45) })
        );
        assert_eq!(
            map_column_type("character varying(255)", None, None),
            Some(TypeDescriptor::String { length: Some(255) })
        );
    }

    #[test]
    fn timestamp_wins_over_time_prefix() {
        assert_eq!(
            map_column_type("timestamp without time zone", None, None),
            Some(TypeDescriptor::DateTime { length: None })
        );
        assert_eq!(map_column_type("time", None, None), Some(TypeDescriptor::Time));
    }

    #[test]
    fn textual_enum_values_are_unquoted() {
        assert_eq!(
            map_column_type("enum('a','b','c')", None, None),
            Some(TypeDescriptor::Enum {
                values: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            })
        );
    }

    #[test]
    fn structured_enum_values_take_precedence() {
        let values = vec!["red".to_string(), "green".to_string()];
        assert_eq!(
            map_column_type("enum", None, Some(&values)),
            Some(TypeDescriptor::Enum { values }),
        );
    }

    #[test]
    fn array_recurses_on_element_metadata() {
        assert_eq!(
            map_column_type("array", Some("varchar(10)"), None),
            Some(TypeDescriptor::ArrayOf(Box::new(TypeDescriptor::String {
                length: Some(10),
            })))
        );
        assert_eq!(map_column_type("array", None, None), None);
    }

    #[test]
    fn unrecognized_type_yields_none() {
        assert_eq!(map_column_type("frobnicator", None, None), None);
    }

    #[test]
    fn paren_helpers_scan_past_non_numeric_groups() {
        assert_eq!(paren_length("varchar(45)"), Some(45));
        assert_eq!(paren_length("enum('a')"), None);
        assert_eq!(paren_precision("decimal(10,2) unsigned"), Some((10, 2)));
        assert_eq!(paren_precision("decimal"), None);
        assert_eq!(first_number("varchar(45)"), Some(45));
    }

    #[test]
    fn render_round_trips_kind_and_width() {
        let cases = [
            ("boolean", "DataTypes.BOOLEAN"),
            ("tinyint(1)", "DataTypes.BOOLEAN"),
            ("int unsigned zerofill", "DataTypes.INTEGER.UNSIGNED.ZEROFILL"),
            ("bigint", "DataTypes.BIGINT"),
            ("nvarchar(max)", "DataTypes.TEXT"),
            ("varchar(45)", "DataTypes.STRING(45)"),
            ("nchar(3)", "DataTypes.CHAR(3)"),
            ("real", "DataTypes.REAL"),
            ("mediumtext", "DataTypes.TEXT"),
            ("date", "DataTypes.DATEONLY"),
            ("datetime(6)", "DataTypes.DATE(6)"),
            ("time with time zone", "DataTypes.TIME"),
            ("float(10,2)", "DataTypes.FLOAT(10,2)"),
            ("numeric(12,4)", "DataTypes.DECIMAL(12,4)"),
            ("money", "DataTypes.DECIMAL(19,4)"),
            ("smallmoney", "DataTypes.DECIMAL(10,4)"),
            ("double precision", "DataTypes.DOUBLE"),
            ("uuid", "DataTypes.UUID"),
            ("uniqueidentifier", "DataTypes.UUID"),
            ("jsonb", "DataTypes.JSONB"),
            ("json", "DataTypes.JSON"),
            ("varbinary(16)", "DataTypes.BLOB"),
            ("hstore", "DataTypes.HSTORE"),
            ("int4range", "DataTypes.RANGE(DataTypes.INTEGER)"),
            ("tstzrange", "DataTypes.RANGE(DataTypes.DATE)"),
        ];
        for (raw, expected) in cases {
            let descriptor = map_column_type(raw, None, None)
                .unwrap_or_else(|| panic!("'{raw}' should map"));
            assert_eq!(descriptor.render(), expected, "raw type '{raw}'");
        }
    }

    #[test]
    fn geometry_carries_subtype_from_element_metadata() {
        let descriptor = map_column_type("geometry", Some("point"), None).unwrap();
        assert_eq!(descriptor.render(), "DataTypes.GEOMETRY(point)");
    }

    #[test]
    fn ts_types_follow_kind() {
        assert_eq!(map_column_type("bigint", None, None).unwrap().ts_type(), "number");
        assert_eq!(map_column_type("timestamp", None, None).unwrap().ts_type(), "Date");
        assert_eq!(map_column_type("date", None, None).unwrap().ts_type(), "string");
        assert_eq!(map_column_type("jsonb", None, None).unwrap().ts_type(), "any");
        assert_eq!(
            map_column_type("array", Some("text"), None).unwrap().ts_type(),
            "string[]"
        );
        assert_eq!(
            map_column_type("enum('a','b')", None, None).unwrap().ts_type(),
            "\"a\" | \"b\""
        );
    }
}
