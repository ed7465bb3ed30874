//! sheetc CLI - compile workbook snapshots into calculation code

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use sheetc::prelude::*;
use sheetc::DependencyGraph;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sheetc")]
#[command(
    author,
    version,
    about = "Compile a spreadsheet snapshot into TypeScript or Python"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate calculation code from a workbook snapshot
    #[command(alias = "gen")]
    Generate {
        /// Workbook JSON file (the input contract)
        #[arg(short, long)]
        workbook: PathBuf,

        /// Configuration JSON file (target, inputTabs, outputTabs)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Target language (typescript, python); overrides the config file
        #[arg(short, long)]
        target: Option<String>,

        /// Comma-separated input tabs; overrides the config file
        #[arg(long, value_delimiter = ',')]
        input_tabs: Vec<String>,

        /// Comma-separated output tabs; overrides the config file
        #[arg(long, value_delimiter = ',')]
        output_tabs: Vec<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Show information about a workbook snapshot
    Info {
        /// Workbook JSON file
        #[arg(short, long)]
        workbook: PathBuf,
    },

    /// Show dependencies and dependents of one cell
    Deps {
        /// Workbook JSON file
        #[arg(short, long)]
        workbook: PathBuf,

        /// Canonical cell id, e.g. "Calc!B2"
        #[arg(short, long)]
        cell: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sheetc=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            workbook,
            config,
            target,
            input_tabs,
            output_tabs,
            out,
        } => generate_command(
            &workbook,
            config.as_deref(),
            target.as_deref(),
            input_tabs,
            output_tabs,
            out.as_deref(),
        ),
        Commands::Info { workbook } => info_command(&workbook),
        Commands::Deps { workbook, cell } => deps_command(&workbook, &cell),
    }
}

fn load_workbook(path: &Path) -> Result<Workbook> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    load_workbook_json(&json).with_context(|| format!("failed to load '{}'", path.display()))
}

fn generate_command(
    workbook_path: &Path,
    config_path: Option<&Path>,
    target: Option<&str>,
    input_tabs: Vec<String>,
    output_tabs: Vec<String>,
    out: Option<&Path>,
) -> Result<()> {
    let workbook = load_workbook(workbook_path)?;

    let mut options = match config_path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read '{}'", path.display()))?;
            load_config_json(&json)
                .with_context(|| format!("failed to load '{}'", path.display()))?
        }
        None => {
            let Some(target) = target else {
                bail!("either --config or --target is required");
            };
            GenerateOptions::new(
                target
                    .parse()
                    .map_err(|e: String| anyhow::anyhow!(e))?,
            )
        }
    };

    if let Some(target) = target {
        options.target = target.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    }
    if !input_tabs.is_empty() {
        options.input_tabs = input_tabs;
    }
    if !output_tabs.is_empty() {
        options.output_tabs = output_tabs;
    }
    if options.output_tabs.is_empty() {
        bail!("no output tabs configured (use --output-tabs or the config file)");
    }

    options.banner = Some(format!(
        "Generated by sheetc {} on {} from {}. Do not edit.",
        env!("CARGO_PKG_VERSION"),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        workbook_path.display(),
    ));

    let output = compile(&workbook, &options).context("compilation failed")?;

    tracing::info!(
        formulas = output.stats.formula_count,
        parse_failures = output.stats.parse_failures,
        cycle_members = output.stats.cycle_members,
        ordered = output.stats.ordered_cells,
        "compiled workbook"
    );

    match out {
        Some(path) => {
            fs::write(path, &output.source)
                .with_context(|| format!("failed to write '{}'", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => print!("{}", output.source),
    }

    Ok(())
}

fn info_command(workbook_path: &Path) -> Result<()> {
    let workbook = load_workbook(workbook_path)?;

    println!("sheets: {}", workbook.sheet_count());
    for sheet in workbook.sheets() {
        println!(
            "  {}: {} cells, {} formulas",
            sheet.name(),
            sheet.len(),
            sheet.formula_cells().count()
        );
    }
    println!("named ranges: {}", workbook.named_ranges().len());

    let mut stats = CompileStats::default();
    let formulas = sheetc::parse_workbook(&workbook, &mut stats)?;
    let graph = DependencyGraph::build(&formulas);

    println!("formula cells: {}", stats.formula_count);
    println!("parse failures: {}", stats.parse_failures);

    let cycles = graph.cycle_members();
    if cycles.is_empty() {
        println!("circular references: none");
    } else {
        println!("circular references: {}", cycles.join(", "));
    }

    let missing: Vec<String> = missing_sheets(&workbook).into_iter().collect();
    if missing.is_empty() {
        println!("unresolved sheet references: none");
    } else {
        println!("unresolved sheet references: {}", missing.join(", "));
    }

    Ok(())
}

fn deps_command(workbook_path: &Path, cell: &str) -> Result<()> {
    let workbook = load_workbook(workbook_path)?;

    let mut stats = CompileStats::default();
    let formulas = sheetc::parse_workbook(&workbook, &mut stats)?;
    let graph = DependencyGraph::build(&formulas);

    match graph.node(cell) {
        Some(node) => {
            println!("{} depends on:", cell);
            for dep in &node.dependencies {
                println!("  {}", dep);
            }
        }
        None => println!("{} has no formula", cell),
    }

    let dependents = graph.direct_dependents(cell);
    if dependents.is_empty() {
        println!("no cells depend on {}", cell);
    } else {
        println!("cells depending on {}:", cell);
        for id in dependents {
            println!("  {}", id);
        }
    }

    let transitive = graph.transitive_dependents(cell);
    if !transitive.is_empty() {
        println!("transitively affected: {}", transitive.len());
    }

    Ok(())
}
