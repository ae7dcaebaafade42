use clap::ValueEnum;
use heck::{ToLowerCamelCase, ToPascalCase, ToShoutySnakeCase, ToSnakeCase};

/// Split a potentially schema-qualified name into `(schema, local)`.
///
/// Splits on the first `.`; a name without a separator has no schema.
pub fn split_qualified(name: &str) -> (Option<&str>, &str) {
    match name.split_once('.') {
        Some((schema, local)) if !schema.is_empty() => (Some(schema), local),
        _ => (None, name),
    }
}

/// Join a schema and a local name back into a qualified name.
pub fn join_qualified(schema: Option<&str>, local: &str) -> String {
    match schema {
        Some(s) if !s.is_empty() => format!("{s}.{local}"),
        _ => local.to_string(),
    }
}

/// Identifier casing mode for generated entity, property, and file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Case {
    /// Keep the raw identifier untouched.
    #[default]
    None,
    /// `camelCase`
    Camel,
    /// `snake_case`
    Snake,
    /// `PascalCase`
    Pascal,
    /// `UPPER_SNAKE_CASE`
    UpperSnake,
}

/// Re-case an identifier. Empty input yields an empty string, never an error.
pub fn recase(case: Case, value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    match case {
        Case::None => value.to_string(),
        Case::Camel => value.to_lower_camel_case(),
        Case::Snake => value.to_snake_case(),
        Case::Pascal => value.to_pascal_case(),
        Case::UpperSnake => value.to_shouty_snake_case(),
    }
}

/// Singular/plural transform injected into naming decisions.
///
/// Consumed as a black box: the engine only relies on `pluralize` and
/// `singularize` being deterministic.
pub trait Inflect {
    /// Plural form of `word`.
    fn pluralize(&self, word: &str) -> String;
    /// Singular form of `word`.
    fn singularize(&self, word: &str) -> String;
}

/// Words whose singular and plural forms are identical.
const INVARIANT_WORDS: &[&str] = &[
    "equipment",
    "fish",
    "information",
    "series",
    "sheep",
    "species",
];

/// Heuristic English inflector, the default [`Inflect`] implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishInflector;

impl Inflect for EnglishInflector {
    fn pluralize(&self, word: &str) -> String {
        if INVARIANT_WORDS.contains(&word.to_ascii_lowercase().as_str()) {
            return word.to_string();
        }
        if word.ends_with('s')
            || word.ends_with('x')
            || word.ends_with('z')
            || word.ends_with("ch")
            || word.ends_with("sh")
        {
            format!("{word}es")
        } else if word.ends_with('y')
            && !word.ends_with("ay")
            && !word.ends_with("ey")
            && !word.ends_with("oy")
            && !word.ends_with("uy")
        {
            format!("{}ies", &word[..word.len() - 1])
        } else {
            format!("{word}s")
        }
    }

    fn singularize(&self, word: &str) -> String {
        if INVARIANT_WORDS.contains(&word.to_ascii_lowercase().as_str()) {
            return word.to_string();
        }
        if let Some(stem) = word.strip_suffix("ies") {
            return format!("{stem}y");
        }
        for suffix in ["sses", "xes", "zes", "ches", "shes"] {
            if word.ends_with(suffix) {
                return word[..word.len() - 2].to_string();
            }
        }
        if word.ends_with("ss") {
            return word.to_string();
        }
        if let Some(stem) = word.strip_suffix('s') {
            return stem.to_string();
        }
        word.to_string()
    }
}

/// Pluralize with a guard: when the inflector's plural form equals its
/// singular form (invariant words such as "fish"), append a literal `s` so
/// that singular and plural property names never collide.
pub fn pluralize(inflector: &dyn Inflect, word: &str) -> String {
    let mut plural = inflector.pluralize(word);
    if plural == inflector.singularize(word) {
        plural.push('s');
    }
    plural
}

/// Singularize via the injected inflector.
pub fn singularize(inflector: &dyn Inflect, word: &str) -> String {
    inflector.singularize(word)
}

/// Uppercase the first character, leaving the rest untouched.
pub fn upper_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Naming options shared by the inference engine and the compiler.
pub struct Namer<'a> {
    /// Casing for entity (model) names.
    pub case_model: Case,
    /// Casing for property names.
    pub case_prop: Case,
    /// Casing for file-name stems.
    pub case_file: Case,
    /// Whether entity names are singularized.
    pub singularize_models: bool,
    /// Injected inflector.
    pub inflector: &'a dyn Inflect,
}

impl Namer<'_> {
    /// Re-case, optionally singularizing first.
    pub fn recase(&self, case: Case, value: &str, singularize_first: bool) -> String {
        if value.is_empty() {
            return String::new();
        }
        if singularize_first {
            recase(case, &singularize(self.inflector, value))
        } else {
            recase(case, value)
        }
    }

    /// Entity name for a local table name.
    pub fn model_name(&self, table: &str) -> String {
        self.recase(self.case_model, table, self.singularize_models)
    }

    /// Property name for a raw column name.
    pub fn prop_name(&self, column: &str) -> String {
        self.recase(self.case_prop, column, false)
    }

    /// File-name stem for a local table name.
    pub fn file_stem(&self, table: &str) -> String {
        self.recase(self.case_file, table, self.singularize_models)
    }

    /// Guarded plural form.
    pub fn pluralize(&self, word: &str) -> String {
        pluralize(self.inflector, word)
    }

    /// Singular form.
    pub fn singularize(&self, word: &str) -> String {
        singularize(self.inflector, word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_qualified_handles_missing_schema() {
        assert_eq!(split_qualified("public.orders"), (Some("public"), "orders"));
        assert_eq!(split_qualified("orders"), (None, "orders"));
    }

    #[test]
    fn join_qualified_omits_absent_schema() {
        assert_eq!(join_qualified(Some("public"), "orders"), "public.orders");
        assert_eq!(join_qualified(None, "orders"), "orders");
    }

    #[test]
    fn recase_covers_all_modes() {
        assert_eq!(recase(Case::None, "order_items"), "order_items");
        assert_eq!(recase(Case::Camel, "order_items"), "orderItems");
        assert_eq!(recase(Case::Snake, "OrderItems"), "order_items");
        assert_eq!(recase(Case::Pascal, "order_items"), "OrderItems");
        assert_eq!(recase(Case::UpperSnake, "order_items"), "ORDER_ITEMS");
        assert_eq!(recase(Case::Pascal, ""), "");
    }

    #[test]
    fn pluralize_guard_never_matches_singular() {
        let inflector = EnglishInflector;
        assert_eq!(pluralize(&inflector, "fish"), "fishs");
        assert_ne!(
            pluralize(&inflector, "sheep"),
            singularize(&inflector, "sheep")
        );
    }

    #[test]
    fn english_inflector_common_forms() {
        let inflector = EnglishInflector;
        assert_eq!(inflector.pluralize("order"), "orders");
        assert_eq!(inflector.pluralize("category"), "categories");
        assert_eq!(inflector.pluralize("address"), "addresses");
        assert_eq!(inflector.pluralize("box"), "boxes");
        assert_eq!(inflector.singularize("orders"), "order");
        assert_eq!(inflector.singularize("categories"), "category");
        assert_eq!(inflector.singularize("addresses"), "address");
        assert_eq!(inflector.singularize("courses"), "course");
        assert_eq!(inflector.singularize("class"), "class");
    }

    #[test]
    fn namer_singularizes_before_recasing() {
        let inflector = EnglishInflector;
        let namer = Namer {
            case_model: Case::Pascal,
            case_prop: Case::None,
            case_file: Case::Snake,
            singularize_models: true,
            inflector: &inflector,
        };
        assert_eq!(namer.model_name("student_courses"), "StudentCourse");
        assert_eq!(namer.file_stem("student_courses"), "student_course");
    }
}
