//! Runs the JSON fixture suites under `fixtures/`.
//!
//! Each suite declares a schema document, the union under test and a list of
//! cases. A case expects either `"ok"` or the kind of error it must fail with.
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use colored::Colorize;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use union_input::path_de::from_str_with_path;
use union_input::{SchemaDocument, Source, parse_literal};

#[derive(Parser, Debug)]
struct Settings {
    /// only run cases whose `suite/case` name matches
    #[arg(long)]
    filter: Option<String>,

    /// fixture directory
    #[arg(default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/../fixtures"))]
    dir: PathBuf,
}

#[derive(Deserialize, Debug)]
struct Suite {
    schema: SchemaDocument,
    #[serde(rename = "type")]
    type_name: String,
    cases: Vec<Case>,
}

#[derive(Deserialize, Debug)]
struct Case {
    name: String,
    #[serde(default)]
    mode: Mode,
    input: Value,
    expect: String,
}

#[derive(Deserialize, Debug, Default, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum Mode {
    #[default]
    Value,
    Literal,
}

fn main() -> anyhow::Result<()> {
    let settings = Settings::parse();
    let filter = settings.filter.as_deref().map(Regex::new).transpose()?;

    let mut paths = std::fs::read_dir(&settings.dir)
        .with_context(|| format!("failed to read {}", settings.dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect::<Vec<_>>();
    paths.sort();

    let (mut passed, mut failed) = (0usize, 0usize);
    for path in paths {
        let suite_name = path
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let src = std::fs::read_to_string(&path)?;
        let suite: Suite = from_str_with_path(&src)
            .with_context(|| format!("invalid fixture {}", path.display()))?;
        let schema = suite
            .schema
            .build()
            .with_context(|| format!("invalid schema in {}", path.display()))?;
        let union = schema
            .union(&suite.type_name)
            .with_context(|| format!("{}: no union named {}", path.display(), suite.type_name))?;

        for case in &suite.cases {
            let full_name = format!("{suite_name}/{}", case.name);
            if filter.as_ref().is_some_and(|re| !re.is_match(&full_name)) {
                continue;
            }
            let outcome = match case.mode {
                Mode::Value => union
                    .parse_value(&case.input, &schema.registry)
                    .map(|_| ())
                    .map_err(|e| e.kind().to_string()),
                Mode::Literal => {
                    let text = case.input.as_str().unwrap_or_default();
                    let source = Source::new(&full_name, text);
                    match parse_literal(&source) {
                        Ok(node) => union
                            .parse_literal(&node, &source, &schema.registry)
                            .map(|_| ())
                            .map_err(|e| e.kind().to_string()),
                        Err(_) => Err("LiteralSyntax".to_string()),
                    }
                }
            };
            let actual = match &outcome {
                Ok(()) => "ok",
                Err(kind) => kind.as_str(),
            };
            if actual == case.expect {
                passed += 1;
                println!("{} {full_name}", "pass".green());
            } else {
                failed += 1;
                println!(
                    "{} {full_name}: expected {}, got {actual}",
                    "FAIL".red().bold(),
                    case.expect
                );
            }
        }
    }

    println!("{passed} passed, {failed} failed");
    if failed > 0 {
        bail!("{failed} fixture case(s) failed");
    }
    Ok(())
}
