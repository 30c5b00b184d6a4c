//! CLI: validate runtime values or literals against a union from a schema document.
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;

use crate::ast::{Source, parse_literal};
use crate::config::{CompiledSchema, SchemaDocument};
use crate::union::{UnionError, UnionInputType};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// resolve and validate tagged-union input values against a JSON schema document
#[derive(Parser, Debug)]
#[command(name = "union-input", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// validate runtime JSON values
    Value(ValueOut),
    /// validate literals written in query syntax
    Literal(LiteralOut),
    /// print the compiled schema
    Describe(DescribeOut),
}

#[derive(Args, Debug, Clone)]
struct SchemaSettings {
    /// schema document (.json)
    #[arg(long)]
    schema: PathBuf,

    /// union to resolve against
    #[arg(long = "type", value_name = "UNION")]
    type_name: String,
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /variables/hero)
    #[arg(long)]
    json_pointer: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct ValueOut {
    #[command(flatten)]
    schema_settings: SchemaSettings,

    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json report (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct LiteralOut {
    #[command(flatten)]
    schema_settings: SchemaSettings,

    /// literal text, e.g. '{_type_: "jedi", _value_: {name: "Yoda"}}'
    #[arg(short, long, num_args = 1.., required_unless_present = "input", conflicts_with = "input")]
    expr: Vec<String>,

    /// files holding one literal each; literal paths or quoted glob patterns
    #[arg(short, long, num_args = 1..)]
    input: Vec<String>,

    /// output .json report (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct DescribeOut {
    /// schema document (.json)
    #[arg(long)]
    schema: PathBuf,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

/// One input document, before validation.
#[derive(Debug)]
struct Document {
    source: String,
    index: usize,
    body: DocumentBody,
}

#[derive(Debug)]
enum DocumentBody {
    Value(Value),
    Literal(String),
    /// Could not be read or selected; reported as a rejection.
    Broken(String),
}

#[derive(Serialize, Debug)]
struct Outcome {
    source: String,
    index: usize,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<Rejection>,
}

#[derive(Serialize, Debug)]
struct Rejection {
    kind: String,
    message: String,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl SchemaSettings {
    fn load(&self) -> anyhow::Result<CompiledSchema> {
        let schema = SchemaDocument::load(&self.schema)?;
        if schema.union(&self.type_name).is_none() {
            let known = schema.unions.keys().cloned().collect::<Vec<_>>().join(", ");
            bail!(
                "\"{}\" is not a union in {} (unions: {known})",
                self.type_name,
                self.schema.display()
            );
        }
        Ok(schema)
    }
}

impl InputSettings {
    fn load_process(&self) -> anyhow::Result<Vec<Document>> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .map_err(|error| anyhow!("failed to resolve input file paths: {error}"))?;
        let mut documents = Vec::new();
        for source_path in source_paths {
            let source = source_path.to_string_lossy().to_string();
            let text = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read source file {source}"))?;
            let bodies: Vec<Result<Value, String>> = if self.ndjson {
                text.lines()
                    .filter(|line| !line.trim().is_empty())
                    .map(|line| serde_json::from_str(line).map_err(|e| e.to_string()))
                    .collect()
            } else {
                vec![serde_json::from_str(&text).map_err(|e| e.to_string())]
            };
            for (index, body) in bodies.into_iter().enumerate() {
                let body = match body.map(|value| self.select(value)) {
                    Ok(Ok(value)) => DocumentBody::Value(value),
                    Ok(Err(message)) | Err(message) => DocumentBody::Broken(message),
                };
                documents.push(Document {
                    source: source.clone(),
                    index,
                    body,
                });
            }
        }
        Ok(documents)
    }

    fn select(&self, value: Value) -> Result<Value, String> {
        let Some(pointer) = self.json_pointer.as_ref() else {
            return Ok(value);
        };
        value
            .pointer(pointer)
            .cloned()
            .ok_or_else(|| format!("JSON pointer {pointer} selects nothing"))
    }
}

impl LiteralOut {
    fn documents(&self) -> anyhow::Result<Vec<Document>> {
        if !self.expr.is_empty() {
            return Ok(self
                .expr
                .iter()
                .enumerate()
                .map(|(index, text)| Document {
                    source: "<expr>".to_string(),
                    index,
                    body: DocumentBody::Literal(text.clone()),
                })
                .collect());
        }
        let source_paths = resolve_file_path_patterns(&self.input)
            .map_err(|error| anyhow!("failed to resolve input file paths: {error}"))?;
        source_paths
            .into_iter()
            .map(|path| {
                let source = path.to_string_lossy().to_string();
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read source file {source}"))?;
                Ok(Document {
                    source,
                    index: 0,
                    body: DocumentBody::Literal(text),
                })
            })
            .collect()
    }
}

impl Document {
    fn check(self, union: &UnionInputType, schema: &CompiledSchema) -> Outcome {
        let result = match self.body {
            DocumentBody::Value(value) => union
                .parse_value(&value, &schema.registry)
                .map_err(Rejection::from),
            DocumentBody::Literal(text) => {
                let source = Source::new(&self.source, text);
                match parse_literal(&source) {
                    Ok(node) => union
                        .parse_literal(&node, &source, &schema.registry)
                        .map_err(Rejection::from),
                    Err(error) => {
                        let (line, col) = source.line_col(error.span().start);
                        Err(Rejection {
                            kind: "LiteralSyntax".to_string(),
                            message: format!("{}:{line}:{col}: {error}", source.name),
                        })
                    }
                }
            }
            DocumentBody::Broken(message) => Err(Rejection {
                kind: "InvalidDocument".to_string(),
                message,
            }),
        };
        match result {
            Ok(value) => Outcome {
                source: self.source,
                index: self.index,
                ok: true,
                value: Some(value),
                error: None,
            },
            Err(rejection) => {
                tracing::debug!(source = %self.source, index = self.index, kind = %rejection.kind, "rejected");
                Outcome {
                    source: self.source,
                    index: self.index,
                    ok: false,
                    value: None,
                    error: Some(rejection),
                }
            }
        }
    }
}

impl From<UnionError> for Rejection {
    fn from(error: UnionError) -> Self {
        tracing::trace!(
            union = error.union_name(),
            kind = error.kind(),
            "union rejected input"
        );
        Rejection {
            kind: error.kind().to_string(),
            message: error.to_string(),
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    /// Run the selected command. `Ok(false)` means some input was rejected.
    pub fn run(&self) -> anyhow::Result<bool> {
        match &self.cmd {
            Command::Value(target) => {
                let schema = target.schema_settings.load()?;
                let documents = target.input_settings.load_process()?;
                validate_all(
                    &schema,
                    &target.schema_settings.type_name,
                    documents,
                    target.out.as_deref(),
                )
            }
            Command::Literal(target) => {
                let schema = target.schema_settings.load()?;
                let documents = target.documents()?;
                validate_all(
                    &schema,
                    &target.schema_settings.type_name,
                    documents,
                    target.out.as_deref(),
                )
            }
            Command::Describe(target) => {
                let schema = SchemaDocument::load(&target.schema)?;
                let src = serde_json::to_string_pretty(&schema.describe())?;
                write_output(target.out.as_deref(), &src)?;
                Ok(true)
            }
        }
    }
}

/// Install the global `tracing` subscriber; `RUST_LOG` overrides the `warn` default.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn validate_all(
    schema: &CompiledSchema,
    type_name: &str,
    documents: Vec<Document>,
    out: Option<&Path>,
) -> anyhow::Result<bool> {
    let union = schema
        .union(type_name)
        .ok_or_else(|| anyhow!("\"{type_name}\" is not a union"))?;
    tracing::info!(union = type_name, documents = documents.len(), "validating");

    let outcomes: Vec<Outcome> = documents
        .into_par_iter()
        .map(|document| document.check(union, schema))
        .collect();

    let src = serde_json::to_string_pretty(&outcomes)?;
    write_output(out, &src)?;

    let rejected = outcomes.iter().filter(|o| !o.ok).count();
    let accepted = outcomes.len() - rejected;
    for outcome in outcomes.iter().filter(|o| !o.ok) {
        if let Some(error) = outcome.error.as_ref() {
            eprintln!(
                "{} {}#{} {}: {}",
                "rejected".red().bold(),
                outcome.source,
                outcome.index,
                error.kind.yellow(),
                error.message
            );
        }
    }
    eprintln!(
        "{}: {} accepted, {} rejected",
        type_name.bold(),
        accepted.to_string().green(),
        if rejected == 0 {
            rejected.to_string().normal()
        } else {
            rejected.to_string().red()
        },
    );
    Ok(rejected == 0)
}

fn write_output(out: Option<&Path>, src: &str) -> anyhow::Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, src)
                .with_context(|| format!("failed to write {}", out.display()))?;
        }
        None => println!("{src}"),
    }
    Ok(())
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                return Err(format!("glob pattern matched no files: {pattern}").into());
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn schema() -> CompiledSchema {
        SchemaDocument::from_json_str(
            r#"{"types": [
                {"kind": "object", "name": "jedi", "fields": {"name": "String", "saberColor": "String"}},
                {"kind": "object", "name": "sith", "fields": {"name": "String", "doubleBlade": "Boolean"}},
                {"kind": "union", "name": "heroUnion", "inputTypes": ["jedi", "sith"]}
            ]}"#,
        )
        .unwrap()
        .build()
        .unwrap()
    }

    fn check(body: DocumentBody) -> Outcome {
        let schema = schema();
        let union = schema.union("heroUnion").unwrap();
        Document {
            source: "test".into(),
            index: 0,
            body,
        }
        .check(union, &schema)
    }

    #[test]
    fn accepted_values_are_echoed() {
        let value = json!({"_type_": "sith", "_value_": {"doubleBlade": true}});
        let outcome = check(DocumentBody::Value(value.clone()));
        assert!(outcome.ok);
        assert_eq!(outcome.value, Some(value));
    }

    #[test]
    fn literal_syntax_errors_carry_position() {
        let outcome = check(DocumentBody::Literal(
            "{_type_: \"jedi\",\n  _value_: {name: }}".into(),
        ));
        let error = outcome.error.unwrap();
        assert_eq!(error.kind, "LiteralSyntax");
        assert!(error.message.starts_with("test:2:"), "{}", error.message);
    }

    #[test]
    fn rejections_report_the_error_kind() {
        let outcome = check(DocumentBody::Literal(
            r#"{_type_: "droid", _value_: {}}"#.into(),
        ));
        assert!(!outcome.ok);
        assert_eq!(outcome.error.unwrap().kind, "UnknownDiscriminatorValue");
    }

    #[test]
    fn plain_paths_pass_through_unglobbed() {
        let paths = resolve_file_path_patterns(["a.json", "dir/b.json"]).unwrap();
        assert_eq!(
            paths,
            vec![PathBuf::from("a.json"), PathBuf::from("dir/b.json")]
        );
    }
}
