mod support;

use std::collections::BTreeMap;

use schemagen::generator::{
    build_entity, generate_text, render_associations, render_index_file, Dialect, Engine,
    GenerateError, GeneratorOptions,
};
use schemagen::model::names::{Case, EnglishInflector};
use schemagen::model::schema::{IndexField, IndexSpec, SchemaModel};
use schemagen::relate::infer_relations;

fn base_options(dialect: Dialect) -> GeneratorOptions {
    GeneratorOptions {
        dialect,
        case_model: Case::Pascal,
        case_file: Case::Snake,
        singularize: true,
        spaces: true,
        ..GeneratorOptions::default()
    }
}

fn generate(model: &mut SchemaModel, options: &GeneratorOptions) -> BTreeMap<String, String> {
    let inflector = EnglishInflector;
    let namer = options.namer(&inflector);
    infer_relations(model, &namer);
    generate_text(model, options, &inflector).unwrap()
}

#[test]
fn es5_module_wraps_a_define_call() {
    let mut model = support::orders_customers_model();
    let options = base_options(Dialect::Es5);
    let text = generate(&mut model, &options);
    let source = &text["orders"];

    assert!(source.starts_with("const Sequelize = require('sequelize');\n"));
    assert!(source.contains("module.exports = function(sequelize, DataTypes) {"));
    assert!(source.contains("return sequelize.define('Order', {"));
    assert!(source.contains("type: DataTypes.INTEGER,"));
    assert!(source.contains("primaryKey: true,"));
    assert!(source.contains("model: 'customers',"));
    assert!(source.contains("key: 'id',"));
    assert!(source.contains("modelName: 'orders',"));
    assert!(source.contains("timestamps: false,"));
    assert!(source.ends_with("};\n"));
    assert!(!source.contains("static associate"));
}

#[test]
fn validations_follow_type_then_nullability() {
    let mut model = support::orders_customers_model();
    let options = base_options(Dialect::Es5);
    let text = generate(&mut model, &options);

    let customers = &text["customers"];
    assert!(customers.contains("len: {"));
    assert!(customers.contains("args: [1, 45],"));
    assert!(customers
        .contains("msg: '\"name\" must be no more than 45 characters in length.',"));
    assert!(customers.contains("msg: '\"id\" cannot be empty.',"));
    let type_rule = customers.find("isDecimal: {").unwrap();
    let not_null = customers.find("notNull: {").unwrap();
    assert!(type_rule < not_null);
}

#[test]
fn class_dialects_emit_an_associate_hook() {
    let mut model = support::junction_model();
    let options = base_options(Dialect::Es6);
    let text = generate(&mut model, &options);

    let courses = &text["courses"];
    assert!(courses.starts_with("const Sequelize = require('sequelize');\n"));
    assert!(courses.contains("class Course extends Sequelize.Model {"));
    assert!(courses.contains("static init(sequelize, DataTypes) {"));
    assert!(courses.contains("return Course;"));
    assert!(courses.contains("static associate(models) {"));
    assert!(courses.contains("this.belongsToMany(models.Student, {"));
    assert!(courses.contains("through: 'StudentCourse',"));
    assert!(courses.contains("foreignKey: 'course_id',"));
    assert!(courses.contains("otherKey: 'student_id',"));
    // The direct relation to the junction is covered by the many-to-many.
    assert!(!courses.contains("hasMany"));

    let junction = &text["student_courses"];
    assert!(junction
        .contains("this.belongsTo(models.Course, { as: 'course', foreignKey: 'course_id' });"));
    assert!(junction
        .contains("this.belongsTo(models.Student, { as: 'student', foreignKey: 'student_id' });"));
}

#[test]
fn esm_and_custom_headers_differ() {
    let mut model = support::orders_customers_model();

    let esm = generate(&mut model, &base_options(Dialect::Esm));
    let source = &esm["customers"];
    assert!(source.starts_with("import _sequelize from 'sequelize';\n"));
    assert!(source.contains("export default class Customer extends Model {"));

    let custom = generate(&mut model, &base_options(Dialect::Custom));
    let source = &custom["customers"];
    assert!(source.starts_with("import { Model } from 'sequelize';\n"));
    assert!(source.contains("super.init("));
    assert!(source.contains("static associate(models) {"));
}

#[test]
fn typescript_preamble_types_the_table_and_its_relations() {
    let mut model = support::orders_customers_model();
    let options = base_options(Dialect::Ts);
    let text = generate(&mut model, &options);

    let orders = &text["orders"];
    assert!(orders.starts_with("import * as Sequelize from 'sequelize';\n"));
    assert!(orders.contains("import type { Customer, CustomerId } from './customer';"));
    assert!(orders.contains("export interface OrderAttributes {"));
    assert!(orders.contains("id: number;"));
    assert!(orders.contains("customer_id?: number;"));
    assert!(orders.contains("export type OrderPk = \"id\";"));
    assert!(orders.contains("export type OrderId = Order[OrderPk];"));
    assert!(orders
        .contains("export type OrderCreationAttributes = Optional<OrderAttributes, OrderPk>;"));
    assert!(orders.contains(
        "export class Order extends Model<OrderAttributes, OrderCreationAttributes> implements OrderAttributes {"
    ));
    assert!(orders.contains("customer!: Customer;"));
    assert!(orders.contains("getCustomer!: Sequelize.BelongsToGetAssociationMixin<Customer>;"));
    assert!(orders.contains("static initModel(sequelize: Sequelize.Sequelize): typeof Order {"));
    assert!(orders.contains("Order.init({"));

    let customers = &text["customers"];
    assert!(customers.contains("import type { Order, OrderId } from './order';"));
    assert!(customers.contains("orders!: Order[];"));
    assert!(customers.contains("getOrders!: Sequelize.HasManyGetAssociationsMixin<Order>;"));
    assert!(customers.contains("addOrder!: Sequelize.HasManyAddAssociationMixin<Order, OrderId>;"));
    assert!(customers.contains("name?: string;"));
}

#[test]
fn unknown_column_type_stops_generation() {
    let mut model = SchemaModel::default();
    model.tables.insert(
        "widgets".to_string(),
        vec![support::column("payload", "mystery")],
    );
    let options = base_options(Dialect::Es5);
    let inflector = EnglishInflector;

    let err = generate_text(&model, &options, &inflector).unwrap_err();
    match err {
        GenerateError::UnrecognizedColumnType {
            table,
            column,
            raw_type,
        } => {
            assert_eq!(table, "widgets");
            assert_eq!(column, "payload");
            assert_eq!(raw_type, "mystery");
        }
    }
}

#[test]
fn housekeeping_columns_are_managed_not_rendered() {
    let mut model = SchemaModel::default();
    model.tables.insert(
        "posts".to_string(),
        vec![
            support::pk_column("id", "int"),
            support::column("title", "varchar(80)"),
            support::column("createdAt", "timestamp"),
            support::column("updatedAt", "timestamp"),
            support::column("deletedAt", "timestamp"),
        ],
    );
    let options = base_options(Dialect::Es5);
    let inflector = EnglishInflector;
    let namer = options.namer(&inflector);

    let entity = build_entity(&model, "posts", &options, &namer).unwrap();
    let props: Vec<&str> = entity.fields.iter().map(|f| f.prop.as_str()).collect();
    assert_eq!(props, vec!["id", "title"]);
    assert_eq!(entity.options.timestamps, None);
    assert!(entity.options.paranoid);
    assert_eq!(entity.primary_keys, vec!["id"]);

    let mut disabled = options.clone();
    disabled
        .additional
        .insert("timestamps".to_string(), serde_json::Value::Bool(false));
    let entity = build_entity(&model, "posts", &disabled, &namer).unwrap();
    assert_eq!(entity.fields.len(), 5);
    assert_eq!(entity.options.timestamps, Some(false));
    assert!(!entity.options.paranoid);
    assert!(entity.options.extra.is_empty());
}

#[test]
fn mssql_primary_keys_keep_their_casing_without_an_alias() {
    let mut model = SchemaModel::default();
    model.tables.insert(
        "People".to_string(),
        vec![
            support::pk_column("ID", "int"),
            support::column("FullName", "varchar(45)"),
        ],
    );
    let options = GeneratorOptions {
        engine: Engine::Mssql,
        case_prop: Case::Camel,
        ..base_options(Dialect::Es5)
    };
    let inflector = EnglishInflector;
    let namer = options.namer(&inflector);

    let entity = build_entity(&model, "People", &options, &namer).unwrap();
    let id = &entity.fields[0];
    assert_eq!(id.prop, "id");
    assert!(!id.field_alias, "a case-only rename of a key column stays raw");
    let full_name = &entity.fields[1];
    assert_eq!(full_name.prop, "fullName");
    assert!(full_name.field_alias);
}

#[test]
fn indexes_render_type_or_access_method() {
    let mut model = support::orders_customers_model();
    model.indexes.insert(
        "orders".to_string(),
        vec![
            IndexSpec {
                name: "orders_total_idx".to_string(),
                unique: false,
                index_type: Some("BTREE".to_string()),
                fields: vec![IndexField {
                    attribute: "total".to_string(),
                    collate: None,
                    length: None,
                    order: Some("DESC".to_string()),
                }],
            },
            IndexSpec {
                name: "orders_customer_uq".to_string(),
                unique: true,
                index_type: Some("UNIQUE".to_string()),
                fields: vec![IndexField {
                    attribute: "customer_id".to_string(),
                    collate: None,
                    length: None,
                    order: Some("ASC".to_string()),
                }],
            },
        ],
    );
    let options = base_options(Dialect::Es5);
    let text = generate(&mut model, &options);
    let source = &text["orders"];

    assert!(source.contains("indexes: ["));
    assert!(source.contains("name: 'orders_total_idx',"));
    assert!(source.contains("using: 'BTREE',"));
    assert!(source.contains("fields: [{ name: 'total', order: 'DESC' }],"));
    assert!(source.contains("name: 'orders_customer_uq',"));
    assert!(source.contains("unique: true,"));
    assert!(source.contains("type: 'UNIQUE',"));
    // ASC is the engine default and never spelled out.
    assert!(source.contains("fields: [{ name: 'customer_id' }],"));
}

#[test]
fn additional_options_are_merged_into_every_table() {
    let mut model = support::orders_customers_model();
    let mut options = base_options(Dialect::Es5);
    options
        .additional
        .insert("freezeTableName".to_string(), serde_json::Value::Bool(true));
    options
        .additional
        .insert("name".to_string(), serde_json::Value::Bool(true));
    let text = generate(&mut model, &options);
    let source = &text["orders"];

    assert!(source.contains("freezeTableName: true,"));
    assert!(source.contains("name: {"));
    assert!(source.contains("singular: 'orders',"));
    assert!(source.contains("plural: 'orders'"));
}

#[test]
fn aggregate_associations_render_both_junction_directions() {
    let mut model = support::junction_model();
    let options = base_options(Dialect::Es5);
    let inflector = EnglishInflector;
    let namer = options.namer(&inflector);
    infer_relations(&mut model, &namer);

    let text = render_associations(&model, &options, &namer);
    assert!(text.contains(
        "Course.belongsToMany(Student, { as: 'student_id_students', through: StudentCourse, foreignKey: \"course_id\", otherKey: \"student_id\" });"
    ));
    assert!(text.contains(
        "Student.belongsToMany(Course, { as: 'courses', through: StudentCourse, foreignKey: \"student_id\", otherKey: \"course_id\" });"
    ));
    assert!(text
        .contains("StudentCourse.belongsTo(Course, { as: \"course\", foreignKey: \"course_id\"});"));
    assert!(!text.contains("hasMany(StudentCourse"));
    // Junction declarations always precede the direct pairs.
    let many = text.find("belongsToMany").unwrap();
    let direct = text.find("StudentCourse.belongsTo").unwrap();
    assert!(many < direct);
}

#[test]
fn generation_is_deterministic() {
    let mut first = support::junction_model();
    let mut second = first.clone();
    let options = base_options(Dialect::Ts);

    assert_eq!(
        generate(&mut first, &options),
        generate(&mut second, &options)
    );
}

#[test]
fn index_file_shape_follows_the_dialect() {
    let mut model = support::orders_customers_model();
    let inflector = EnglishInflector;

    let options = base_options(Dialect::Es5);
    let namer = options.namer(&inflector);
    infer_relations(&mut model, &namer);

    let es5 = render_index_file(&model, &options, &namer);
    assert!(es5.starts_with("var DataTypes = require(\"sequelize\").DataTypes;\n"));
    assert!(es5.contains("var _Customer = require(\"./customer\");"));
    assert!(es5.contains("var Customer = _Customer(sequelize, DataTypes);"));
    assert!(es5.contains("Order.belongsTo(Customer, { as: \"customer\", foreignKey: \"customer_id\"});"));
    assert!(es5.contains("Customer.hasMany(Order, { as: \"orders\", foreignKey: \"customer_id\"});"));
    assert!(es5.ends_with(
        "module.exports = initModels;\nmodule.exports.initModels = initModels;\nmodule.exports.default = initModels;\n"
    ));

    let ts = render_index_file(&model, &base_options(Dialect::Ts), &namer);
    assert!(ts.contains("import { Customer } from \"./customer\";"));
    assert!(ts.contains(
        "import type { CustomerAttributes, CustomerCreationAttributes } from \"./customer\";"
    ));
    assert!(ts.contains("export function initModels(sequelize: Sequelize) {"));
    assert!(ts.contains("Customer.initModel(sequelize);"));
    assert!(ts.contains("    Customer: Customer,"));

    let esm = render_index_file(&model, &base_options(Dialect::Esm), &namer);
    assert!(esm.contains("import _Customer from \"./customer.js\";"));
    assert!(esm.contains("var Customer = _Customer.init(sequelize, DataTypes);"));
    assert!(esm.contains("export default function initModels(sequelize) {"));

    let custom = render_index_file(&model, &base_options(Dialect::Custom), &namer);
    assert!(custom.contains("} from '../config/db.config.js';"));
    assert!(custom.contains("import Customer from './customer.js';"));
    assert!(custom.contains("  customer: Customer.init(sequelize, Sequelize),"));
    assert!(custom.ends_with("module.exports = db;\n"));
}
