#![allow(dead_code)]

use std::collections::BTreeMap;

use schemagen::model::schema::{ColumnDescriptor, ForeignKeySpec, SchemaModel};

pub(crate) fn column(name: &str, column_type: &str) -> ColumnDescriptor {
    ColumnDescriptor {
        name: name.to_string(),
        column_type: column_type.to_string(),
        allow_null: true,
        default_value: None,
        unique: false,
        primary_key: false,
        auto_increment: false,
        element_type: None,
        enum_values: None,
        comment: None,
    }
}

pub(crate) fn pk_column(name: &str, column_type: &str) -> ColumnDescriptor {
    ColumnDescriptor {
        allow_null: false,
        primary_key: true,
        ..column(name, column_type)
    }
}

pub(crate) fn foreign_key(
    source_table: &str,
    source_column: &str,
    target_table: &str,
    target_column: &str,
) -> ForeignKeySpec {
    ForeignKeySpec {
        source_schema: None,
        source_table: source_table.to_string(),
        source_column: source_column.to_string(),
        target_schema: None,
        target_table: target_table.to_string(),
        target_column: target_column.to_string(),
        is_foreign_key: true,
        is_primary_key: false,
        is_unique: None,
        is_serial_key: false,
        generation: None,
    }
}

pub(crate) fn insert_foreign_keys(
    model: &mut SchemaModel,
    table: &str,
    keys: Vec<ForeignKeySpec>,
) {
    let mut map = BTreeMap::new();
    for key in keys {
        map.insert(key.source_column.clone(), key);
    }
    model.foreign_keys.insert(table.to_string(), map);
}

/// `customers (id)` and `orders (id, customer_id -> customers.id)`.
pub(crate) fn orders_customers_model() -> SchemaModel {
    let mut model = SchemaModel::default();
    model
        .tables
        .insert("customers".to_string(), vec![pk_column("id", "int"), column("name", "varchar(45)")]);
    model.tables.insert(
        "orders".to_string(),
        vec![
            pk_column("id", "int"),
            column("customer_id", "int"),
            column("total", "decimal(10,2)"),
        ],
    );
    insert_foreign_keys(
        &mut model,
        "orders",
        vec![foreign_key("orders", "customer_id", "customers", "id")],
    );
    model
}

/// `students`, `courses`, and the junction `student_courses` with a
/// composite primary key over its two foreign keys.
pub(crate) fn junction_model() -> SchemaModel {
    let mut model = SchemaModel::default();
    model
        .tables
        .insert("students".to_string(), vec![pk_column("id", "int")]);
    model
        .tables
        .insert("courses".to_string(), vec![pk_column("id", "int")]);
    model.tables.insert(
        "student_courses".to_string(),
        vec![pk_column("student_id", "int"), pk_column("course_id", "int")],
    );
    let mut student_fk = foreign_key("student_courses", "student_id", "students", "id");
    student_fk.is_primary_key = true;
    let mut course_fk = foreign_key("student_courses", "course_id", "courses", "id");
    course_fk.is_primary_key = true;
    insert_foreign_keys(&mut model, "student_courses", vec![student_fk, course_fk]);
    model
}
