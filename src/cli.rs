//! Minimal CLI: mine → (schema | dump)
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use crate::catalog::Category;
use crate::corpus::{self, CorpusConfig};
use crate::diag::Diagnostic;
use crate::emit::{self, EmitOptions};
use crate::manifest::Manifest;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// mine a builder/parser corpus and emit the query-DSL schema document
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// mine both categories and write the full schema document
    Schema(SchemaOut),
    /// mine one type and print its record plus diagnostics
    Dump(DumpOut),
}

#[derive(Args, Debug, Clone)]
struct CorpusSettings {
    /// directory holding the builder/parser sources
    #[arg(long)]
    src: PathBuf,

    /// pre-generated reflective manifest (JSON)
    #[arg(long)]
    manifest: PathBuf,
}

impl CorpusSettings {
    fn config(&self) -> CorpusConfig {
        CorpusConfig {
            src_dir: self.src.clone(),
            manifest_path: self.manifest.clone(),
        }
    }
}

#[derive(clap::Parser, Debug)]
struct SchemaOut {
    #[command(flatten)]
    corpus: CorpusSettings,

    /// corpus version, stamped into the default output file name
    #[arg(long, default_value = "1.7.2")]
    version: String,

    /// output path (stdout if omitted); a directory gets the stamped
    /// default name `qb-model-<version>.json` appended
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// emit compact instead of pretty-printed JSON
    #[arg(long)]
    compact: bool,

    /// also emit internal field identifiers for diagnostics
    #[arg(long)]
    java_fields: bool,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct DumpOut {
    #[command(flatten)]
    corpus: CorpusSettings,

    /// which category namespace to mine
    #[arg(long, value_enum)]
    category: CategoryArg,

    /// wire name of the type to dump
    #[arg(long)]
    type_name: String,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy)]
enum CategoryArg {
    Query,
    Filter,
}

impl From<CategoryArg> for Category {
    fn from(value: CategoryArg) -> Self {
        match value {
            CategoryArg::Query => Category::Query,
            CategoryArg::Filter => Category::Filter,
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Schema(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }

                let extraction = corpus::mine(&target.corpus.config())?;
                report_diagnostics(&extraction.diags);

                let opts = EmitOptions { internal_ids: target.java_fields };
                let doc = emit::emit_document(&extraction.queries, &extraction.filters, &opts);
                let doc_src = if target.compact {
                    serde_json::to_string(&doc)
                } else {
                    serde_json::to_string_pretty(&doc)
                }
                .context("failed to serialize the schema document")?;

                match target.out.as_ref() {
                    Some(out) => {
                        let out = if out.is_dir() {
                            out.join(format!("qb-model-{}.json", target.version))
                        } else {
                            out.clone()
                        };
                        if let Some(parent) = out.parent() {
                            std::fs::create_dir_all(parent).with_context(|| {
                                format!("failed to create output directory {}", parent.display())
                            })?;
                        }
                        std::fs::write(&out, &doc_src)
                            .with_context(|| format!("failed to write {}", out.display()))?;
                        eprintln!("wrote {}", out.display());
                    }
                    None => println!("{doc_src}"),
                }
                Ok(())
            }
            Command::Dump(target) => {
                let config = target.corpus.config();
                let manifest = Manifest::load(&config.manifest_path)?;
                let category: Category = target.category.into();
                let (types, diags) = corpus::mine_category(&config, category, &manifest)?;

                let Some(record) = types.get(&target.type_name) else {
                    bail!(
                        "no {} type named {} (extracted: {})",
                        category.section(),
                        target.type_name,
                        types.keys().cloned().collect::<Vec<_>>().join(", ")
                    );
                };
                let doc = emit::emit_type(record, &EmitOptions { internal_ids: true });
                println!("{}", serde_json::to_string_pretty(&doc)?);

                // unresolved fields are invisible in the document; list them here
                let unresolved: Vec<&str> = record
                    .fields
                    .iter()
                    .filter(|(_, f)| f.external_name.is_none())
                    .map(|(key, _)| key.as_str())
                    .collect();
                if !unresolved.is_empty() {
                    eprintln!(
                        "{} never observed serialized: {}",
                        "note:".cyan().bold(),
                        unresolved.join(", ")
                    );
                }
                report_diagnostics(&diags);
                Ok(())
            }
        }
    }
}

fn report_diagnostics(diags: &[Diagnostic]) {
    for d in diags {
        eprintln!("{} {d}", "warning:".yellow().bold());
    }
    if !diags.is_empty() {
        eprintln!("{} diagnostic(s); extraction continued", diags.len());
    }
}
