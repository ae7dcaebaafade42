//! CLI entry point for `schemagen`.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use schemagen::generator::{self, Dialect, Engine, GeneratorOptions};
use schemagen::model::names::{Case, EnglishInflector};
use schemagen::model::schema::SchemaModel;
use schemagen::output::writer;
use schemagen::relate;

#[derive(Parser)]
#[command(
    name = "schemagen",
    about = "Generate Sequelize model sources from an introspected database schema"
)]
struct Cli {
    /// Schema model JSON document
    input: PathBuf,

    /// Output directory
    #[arg(long, default_value = "models")]
    output_dir: PathBuf,

    /// Output dialect
    #[arg(long, value_enum, default_value_t = Dialect::Es5)]
    lang: Dialect,

    /// Source database engine
    #[arg(long, value_enum, default_value_t = Engine::Postgres)]
    engine: Engine,

    /// Casing for entity names
    #[arg(long, value_enum, default_value_t = Case::None)]
    case_model: Case,

    /// Casing for property names
    #[arg(long, value_enum, default_value_t = Case::None)]
    case_prop: Case,

    /// Casing for file-name stems
    #[arg(long, value_enum, default_value_t = Case::None)]
    case_file: Case,

    /// Singularize entity names
    #[arg(long)]
    singularize: bool,

    /// Drop association alias clauses that equal the default name
    #[arg(long)]
    no_alias: bool,

    /// Indentation width, characters per level
    #[arg(long, default_value_t = 2)]
    indentation: usize,

    /// Indent with spaces instead of tabs
    #[arg(long)]
    spaces: bool,

    /// JSON file with additional table options
    #[arg(long)]
    additional: Option<PathBuf>,

    /// Print generated sources to stdout instead of writing files
    #[arg(long)]
    no_write: bool,
}

fn main() {
    let cli = Cli::parse();

    let content = match std::fs::read_to_string(&cli.input) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.input.display());
            process::exit(2);
        }
    };
    let mut model: SchemaModel = match serde_json::from_str(&content) {
        Ok(model) => model,
        Err(e) => {
            eprintln!("Error parsing schema model: {e}");
            process::exit(2);
        }
    };

    let additional: BTreeMap<String, serde_json::Value> = match &cli.additional {
        Some(path) => {
            let content = match std::fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    eprintln!("Error reading {}: {e}", path.display());
                    process::exit(2);
                }
            };
            match serde_json::from_str(&content) {
                Ok(values) => values,
                Err(e) => {
                    eprintln!("Error parsing additional options: {e}");
                    process::exit(2);
                }
            }
        }
        None => BTreeMap::new(),
    };

    let options = GeneratorOptions {
        dialect: cli.lang,
        engine: cli.engine,
        case_model: cli.case_model,
        case_prop: cli.case_prop,
        case_file: cli.case_file,
        singularize: cli.singularize,
        no_alias: cli.no_alias,
        indentation: cli.indentation,
        spaces: cli.spaces,
        additional,
    };

    let inflector = EnglishInflector;
    let namer = options.namer(&inflector);

    let warnings = relate::infer_relations(&mut model, &namer);
    for warning in &warnings {
        eprintln!("Warning: {warning}");
    }

    let text = match generator::generate_text(&model, &options, &inflector) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(2);
        }
    };

    if cli.no_write {
        for (table, source) in &text {
            println!("// {table}");
            println!("{source}");
        }
        println!("// index.{}", options.dialect.extension());
        println!("{}", generator::render_index_file(&model, &options, &namer));
        return;
    }

    match writer::write_output(&cli.output_dir, &text, &model, &options, &namer) {
        Ok(written) => {
            eprintln!(
                "Wrote {} files to {}",
                written.len(),
                cli.output_dir.display()
            );
        }
        Err(e) => {
            eprintln!("Error writing output: {e}");
            process::exit(2);
        }
    }
}
