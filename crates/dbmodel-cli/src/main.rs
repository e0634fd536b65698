//! DBModel Command-Line Client
//!
//! Builds a model from a raw parser bundle (JSON) and prints its export,
//! normalized or summary view.

mod error;
mod formatter;

use clap::{Parser, ValueEnum};
use dbmodel_core::{Database, EnumBindingPolicy, ModelConfig};
use error::CliError;
use formatter::View;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// When enums are bound to fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Binding {
    /// Bind each enum when it is inserted
    OnInsert,
    /// Bind all enums after construction
    AfterConstruction,
}

impl From<Binding> for EnumBindingPolicy {
    fn from(binding: Binding) -> Self {
        match binding {
            Binding::OnInsert => EnumBindingPolicy::OnEnumInsert,
            Binding::AfterConstruction => EnumBindingPolicy::AfterConstruction,
        }
    }
}

/// DBModel Command-Line Client
#[derive(Parser, Debug)]
#[command(name = "dbmodel")]
#[command(version, about = "Build and inspect schema models from parser output")]
pub struct Args {
    /// Raw bundle JSON file, or `-` for stdin
    pub input: PathBuf,

    /// Output view
    #[arg(long, default_value = "export", value_enum)]
    pub view: View,

    /// Print JSON on a single line
    #[arg(long)]
    pub compact: bool,

    /// Model config JSON file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Schema for records that name none
    #[arg(long)]
    pub default_schema: Option<String>,

    /// First identifier issued for every entity kind
    #[arg(long)]
    pub id_base: Option<u32>,

    /// When enums are bound to fields
    #[arg(long, value_enum)]
    pub enum_binding: Option<Binding>,

    /// DSL source the bundle was parsed from, for error snippets
    #[arg(long)]
    pub source: Option<PathBuf>,
}

impl Args {
    /// Config file settings, overridden by command-line flags.
    fn model_config(&self) -> Result<ModelConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => {
                let text = read_path(path)?;
                serde_json::from_str(&text).map_err(|source| CliError::Config {
                    path: path.clone(),
                    source,
                })?
            }
            None => ModelConfig::default(),
        };

        if let Some(name) = &self.default_schema {
            config = config.with_default_schema_name(name.clone());
        }
        if let Some(base) = self.id_base {
            config = config.with_id_base(base);
        }
        if let Some(binding) = self.enum_binding {
            config = config.with_enum_binding(binding.into());
        }
        Ok(config)
    }
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dbmodel_cli=info")),
        )
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            let source = args.source.as_deref().and_then(|p| read_path(p).ok());
            eprintln!("{}", e.report(source.as_deref()));
            std::process::exit(1);
        }
    }
}

fn run(args: &Args) -> Result<String, CliError> {
    let config = args.model_config()?;
    debug!(?config, "Model config");

    let json = read_input(&args.input)?;
    let db = Database::from_json_with_config(&json, config)?;
    info!(
        input = %args.input.display(),
        schemas = db.schemas().len(),
        view = %args.view,
        "Model built"
    );

    Ok(formatter::render(&db, args.view, args.compact)?)
}

fn read_input(path: &Path) -> Result<String, CliError> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| CliError::read(path, e))?;
        Ok(text)
    } else {
        read_path(path)
    }
}

fn read_path(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|e| CliError::read(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn args(input: &Path) -> Args {
        Args::parse_from(["dbmodel", input.to_str().unwrap()])
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::parse_from([
            "dbmodel",
            "model.json",
            "--view",
            "normalize",
            "--compact",
            "--default-schema",
            "dbo",
            "--enum-binding",
            "after-construction",
        ]);

        assert_eq!(args.view, View::Normalize);
        assert!(args.compact);
        let config = args.model_config().unwrap();
        assert_eq!(config.default_schema_name, "dbo");
        assert_eq!(config.enum_binding, EnumBindingPolicy::AfterConstruction);
    }

    #[test]
    fn test_run_export() {
        let bundle = write_temp(r#"{"tables": [{"name": "users"}]}"#);
        let output = run(&args(bundle.path())).unwrap();

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["schemas"][0]["name"], "public");
        assert_eq!(value["schemas"][0]["tables"][0]["name"], "users");
    }

    #[test]
    fn test_config_file_with_override() {
        let config = write_temp(r#"{"default_schema_name": "dbo", "id_base": 10}"#);
        let bundle = write_temp(r#"{"tables": [{"name": "users"}]}"#);

        let mut args = args(bundle.path());
        args.config = Some(config.path().to_path_buf());
        args.id_base = Some(100);
        args.view = View::Normalize;

        let value: serde_json::Value = serde_json::from_str(&run(&args).unwrap()).unwrap();
        assert_eq!(value["schemas"]["100"]["name"], "dbo");
    }

    #[test]
    fn test_semantic_error() {
        let bundle = write_temp(r#"{"tables": [{"name": "users"}, {"name": "users"}]}"#);
        let err = run(&args(bundle.path())).unwrap_err();

        assert!(matches!(err, CliError::Model(_)));
        assert!(err.report(None).contains("already exists"));
    }

    #[test]
    fn test_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(&args(&dir.path().join("missing.json"))).unwrap_err();
        assert!(matches!(err, CliError::Read { .. }));
    }

    #[test]
    fn test_bad_config() {
        let config = write_temp("{not json");
        let mut args = args(Path::new("-"));
        args.config = Some(config.path().to_path_buf());

        assert!(matches!(args.model_config(), Err(CliError::Config { .. })));
    }
}
