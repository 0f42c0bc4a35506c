//! `ontunion`: loads an ontology document together with its `owl:imports`
//! closure and inspects, writes or validates the assembled model.
//!
//! **Subcommands:**
//! - `load`: prints the import closure, one ontology per line
//! - `dump`: writes the model's statements as N-Triples or Turtle
//! - `check`: runs the conformance validators
//!
//! **Usage:**
//! ```text
//! ontunion [--config <file>] [--catalog-dir <dir>] [--strict] [--reasoner transitive] <command> <file>
//! ```
//!
//! Imports are looked up in the catalog (`--catalog-dir` and the `[catalog]`
//! table of the config file). Logging goes to stderr and is controlled by
//! `RUST_LOG` (default: `ontunion=info`).

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ontunion::config::ReasonerKind;
use ontunion::graph::hierarchy::flat_hierarchy;
use ontunion::serializer::{ntriples, turtle};
use ontunion::{
    parser, DocumentGraphRepository, GraphRepository, ModelFactory, OntConfig, OntModel, OntologyNaming,
    UnionGraph,
};
use ontunion_conformance::{validators, ConformanceReport, Severity};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Assemble ontologies with their import closure.
#[derive(Parser)]
#[command(
    name = "ontunion",
    about = "Load ontology documents and resolve their owl:imports closure"
)]
struct Cli {
    /// Configuration file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory scanned recursively for imported ontology documents.
    #[arg(long, global = true)]
    catalog_dir: Option<PathBuf>,

    /// Fail on imports missing from the catalog instead of substituting
    /// empty placeholder ontologies.
    #[arg(long, global = true)]
    strict: bool,

    /// Reasoner bound over the assembled model.
    #[arg(long, global = true, value_enum)]
    reasoner: Option<ReasonerArg>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the import closure of an ontology document.
    Load {
        /// Ontology document (.ttl or .nt).
        file: PathBuf,
    },
    /// Write the statements of the assembled model.
    Dump {
        /// Ontology document (.ttl or .nt).
        file: PathBuf,

        /// Output syntax.
        #[arg(long, value_enum, default_value = "ttl")]
        format: Format,

        /// Output file (default: stdout).
        #[arg(long)]
        out: Option<PathBuf>,

        /// Only the document's own statements, without imports.
        #[arg(long)]
        base_only: bool,
    },
    /// Validate the assembled model, its repository and the catalog.
    Check {
        /// Ontology document (.ttl or .nt).
        file: PathBuf,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ReasonerArg {
    /// Transitive `rdfs:subClassOf` and `rdfs:subPropertyOf`.
    Transitive,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// N-Triples.
    Nt,
    /// Turtle.
    Ttl,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = effective_config(&cli)?;

    match &cli.command {
        Command::Load { file } => {
            let (model, catalog) = assemble(file, &config)?;
            print_closure(&model, &catalog);
        }
        Command::Dump {
            file,
            format,
            out,
            base_only,
        } => {
            let (model, _) = assemble(file, &config)?;
            let graph = if *base_only {
                model.base_graph()
            } else {
                model.graph()
            };
            let text = match format {
                Format::Nt => ntriples::to_ntriples(&**graph),
                Format::Ttl => turtle::to_turtle(&**graph),
            };
            match out {
                Some(path) => {
                    fs::write(path, text)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!(path = %path.display(), "wrote model");
                }
                None => print!("{text}"),
            }
        }
        Command::Check { file, json } => {
            let (model, catalog) = assemble(file, &config)?;
            let mut report = ontunion_conformance::run_all(model.union_graph(), &*catalog);
            if let Some(dir) = &config.catalog_dir {
                report.extend(validators::documents::validate(dir, &ontunion::HeaderNaming)?);
            }
            if *json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).context("Failed to encode report")?
                );
            } else {
                print_report(&report);
            }
            if !report.all_passed() {
                eprintln!(
                    "Conformance FAILED: {} check(s) did not pass.",
                    report.failure_count()
                );
                process::exit(1);
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ontunion=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// The config file, if any, overridden by command-line flags.
fn effective_config(cli: &Cli) -> Result<OntConfig> {
    let mut config = match &cli.config {
        Some(path) => OntConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => OntConfig::default(),
    };
    if let Some(dir) = &cli.catalog_dir {
        config.catalog_dir = Some(dir.clone());
    }
    if cli.strict {
        config.imports.ignore_unresolved_imports = false;
    }
    if let Some(ReasonerArg::Transitive) = cli.reasoner {
        config.reasoner = Some(ReasonerKind::Transitive);
    }
    Ok(config)
}

fn assemble(file: &Path, config: &OntConfig) -> Result<(OntModel, Rc<DocumentGraphRepository>)> {
    let catalog = Rc::new(config.repository().context("Failed to read the catalog")?);
    let repository: Rc<dyn GraphRepository> = catalog.clone();
    let graph = parser::read_file(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let model = ModelFactory::new(config.imports)
        .create_model(Some(Rc::new(graph)), &config.specification(), &repository)
        .with_context(|| format!("Failed to assemble {}", file.display()))?;
    info!(
        ontologies = flat_hierarchy(model.union_graph()).len(),
        profile = %model.profile(),
        inferred = model.is_inferred(),
        "assembled model"
    );
    Ok((model, catalog))
}

fn print_closure(model: &OntModel, catalog: &DocumentGraphRepository) {
    let naming = ontunion::HeaderNaming;
    for union in flat_hierarchy(model.union_graph()) {
        let base = union.base_graph();
        let name = naming
            .find_name(&**base)
            .map_or_else(|| "(anonymous)".to_owned(), |n| n.to_string());
        let marker = if is_placeholder(model, catalog, &union) {
            "  [placeholder]"
        } else {
            ""
        };
        println!("{name}  {} triples{marker}", base.size());
    }
}

/// Imports of the closure are loaded from catalog documents; anything else
/// below the root was synthesized for an unresolved import.
fn is_placeholder(model: &OntModel, catalog: &DocumentGraphRepository, union: &Rc<UnionGraph>) -> bool {
    if Rc::ptr_eq(union, model.union_graph()) {
        return false;
    }
    ontunion::HeaderNaming
        .find_name(&**union.base_graph())
        .is_none_or(|name| catalog.mapping(&name.to_id()).is_none())
}

fn print_report(report: &ConformanceReport) {
    println!("Ontunion Conformance Report");
    println!("===========================");
    println!();

    for result in &report.results {
        let status = match result.severity {
            Severity::Pass => "PASS",
            Severity::Warning => "WARN",
            Severity::Failure => "FAIL",
        };
        match &result.subject {
            Some(subject) => println!("[{status}] {} {subject}: {}", result.validator, result.message),
            None => println!("[{status}] {}: {}", result.validator, result.message),
        }
        for detail in &result.details {
            println!("       {detail}");
        }
    }

    println!();
    let passed = report.results.len() - report.failure_count() - report.warning_count();
    println!(
        "Summary: {} passed, {} warnings, {} failed",
        passed,
        report.warning_count(),
        report.failure_count()
    );
}
