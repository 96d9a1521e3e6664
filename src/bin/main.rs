use std::{
    collections::HashSet,
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use crossterm::style::Stylize;
use serde_json::json;
use simplify_core::{
    evaluation::{GoldTable, SupervisedEvaluation},
    logging::Telemetry,
    persistence::{load_frequencies, load_taxonomy, save_frequencies, save_taxonomy},
    LoadedResources, Settings, Simplifier, Variant,
};

#[derive(Parser, Debug)]
#[command(name = "simplify", version, about = "Lexical simplification of scientific and medical terms")]
struct Cli {
    /// Settings file (simplifier parameters, resource paths, logging).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory that relative resource paths are resolved against.
    #[arg(long, global = true)]
    resources: Option<PathBuf>,
    /// JSON-lines log file; overrides the settings file.
    #[arg(long, global = true)]
    log: Option<PathBuf>,
    /// Overrides the configured simplifier variant.
    #[arg(long, global = true, value_enum)]
    variant: Option<VariantArg>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ranked substitutions for a single word.
    Word {
        word: String,
        /// Text preceding the word.
        #[arg(long)]
        context: Option<String>,
    },
    /// Rewrites a text file line by line (`-` reads stdin).
    Text {
        input: PathBuf,
        /// Sentence-level beam search instead of greedy replacement.
        #[arg(long)]
        beam: bool,
    },
    /// Scores the simplifier against the gold substitution table.
    Evaluate {
        /// Overrides the configured gold table.
        #[arg(long)]
        gold: Option<PathBuf>,
    },
    /// Converts a JSON or TSV resource into the binary format.
    Pack {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, value_enum)]
        kind: PackKind,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PackKind {
    Taxonomy,
    Frequencies,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum VariantArg {
    SimpleScience,
    HierarchySimple,
    HierarchyPbs,
    PoincareSimple,
    PoincarePbs,
}

impl From<VariantArg> for Variant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::SimpleScience => Variant::SimpleScience,
            VariantArg::HierarchySimple => Variant::HierarchySimple,
            VariantArg::HierarchyPbs => Variant::HierarchyPbs,
            VariantArg::PoincareSimple => Variant::PoincareSimple,
            VariantArg::PoincarePbs => Variant::PoincarePbs,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = match &cli.config {
        Some(path) => Settings::from_path(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(variant) = cli.variant {
        settings.simplifier.variant = variant.into();
    }
    if let Some(log) = &cli.log {
        settings.log.path = Some(log.clone());
    }
    let telemetry = match &settings.log.path {
        Some(path) => Telemetry::to_file("simplify", path, settings.log.level)
            .with_context(|| format!("failed to open log file {}", path.display()))?,
        None => Telemetry::disabled("simplify"),
    };

    match cli.command {
        Commands::Pack { input, output, kind } => pack(&input, &output, kind, &telemetry),
        Commands::Word { word, context } => {
            let loaded = load(&settings, cli.resources.as_deref(), &telemetry)?;
            let simplifier = build(&settings, &loaded, &telemetry)?;
            let trace = simplifier.simplify_word_traced(&word, context.as_deref());
            println!(
                "{} generated {} / selected {} / ranked {}",
                trace.word.as_str().bold(),
                trace.counts.generated,
                trace.counts.selected,
                trace.counts.ranked
            );
            if trace.candidates.is_empty() {
                println!("{}", "no substitutions".dark_grey());
            }
            for (i, candidate) in trace.candidates.iter().enumerate() {
                println!("  {:>2}. {}", i + 1, candidate.as_str().green());
            }
            Ok(())
        }
        Commands::Text { input, beam } => {
            let loaded = load(&settings, cli.resources.as_deref(), &telemetry)?;
            let simplifier = build(&settings, &loaded, &telemetry)?;
            let text = read_input(&input)?;
            for line in text.lines() {
                let tokens: Vec<&str> = line.split_whitespace().collect();
                if tokens.is_empty() {
                    println!();
                    continue;
                }
                let output = if beam {
                    simplifier.simplify_text_beam(&tokens)?
                } else {
                    simplifier.simplify_text(&tokens)?
                };
                println!("{}", highlight(&tokens, &output));
            }
            Ok(())
        }
        Commands::Evaluate { gold } => {
            let Some(gold_path) = gold.or_else(|| settings.resources.gold.clone()) else {
                bail!("no gold table configured; pass --gold or set resources.gold");
            };
            let gold_path = resolve(cli.resources.as_deref(), &gold_path);
            let gold = GoldTable::from_path(&gold_path)
                .with_context(|| format!("failed to load gold table {}", gold_path.display()))?;
            let loaded = load(&settings, cli.resources.as_deref(), &telemetry)?;
            let simplifier = build(&settings, &loaded, &telemetry)?;
            let report = SupervisedEvaluation::run(&simplifier, &gold);
            telemetry.info("evaluation.report", json!(report));
            println!("{}", settings.simplifier.variant.name().bold());
            println!("  potential  {:.4}", report.potential);
            println!("  precision  {:.4}", report.precision);
            println!("  f1         {:.4}", report.f1);
            println!(
                "  evaluated  {} ({} without candidates)",
                report.evaluated, report.without_candidates
            );
            Ok(())
        }
    }
}

fn load(settings: &Settings, base: Option<&Path>, telemetry: &Telemetry) -> Result<LoadedResources> {
    LoadedResources::load(&settings.resources, base, &settings.simplifier, telemetry)
        .context("failed to load resources")
}

fn build<'a>(settings: &Settings, loaded: &'a LoadedResources, telemetry: &Telemetry) -> Result<Simplifier<'a>> {
    let resources = loaded.resources()?;
    Simplifier::builder(settings.simplifier.clone(), resources)
        .telemetry(telemetry.clone())
        .build()
        .with_context(|| format!("cannot assemble the {} simplifier", settings.simplifier.variant.name()))
}

fn resolve(base: Option<&Path>, path: &Path) -> PathBuf {
    match base {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_path_buf(),
    }
}

fn read_input(input: &Path) -> Result<String> {
    if input.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text).context("failed to read stdin")?;
        Ok(text)
    } else {
        fs::read_to_string(input).with_context(|| format!("failed to read {}", input.display()))
    }
}

/// Marks every output token that did not appear in the input.
fn highlight(input: &[&str], output: &[String]) -> String {
    let original: HashSet<&str> = input.iter().copied().collect();
    output
        .iter()
        .map(|token| {
            if original.contains(token.as_str()) {
                token.clone()
            } else {
                token.as_str().green().bold().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn pack(input: &Path, output: &Path, kind: PackKind, telemetry: &Telemetry) -> Result<()> {
    match kind {
        PackKind::Taxonomy => {
            let table = load_taxonomy(input).with_context(|| format!("failed to read {}", input.display()))?;
            save_taxonomy(&table, output).with_context(|| format!("failed to write {}", output.display()))?;
            telemetry.info("pack.taxonomy", json!({ "input": input, "output": output, "nodes": table.len() }));
            println!("packed {} taxonomy nodes into {}", table.len(), output.display());
        }
        PackKind::Frequencies => {
            let table = load_frequencies(input).with_context(|| format!("failed to read {}", input.display()))?;
            save_frequencies(&table, output).with_context(|| format!("failed to write {}", output.display()))?;
            telemetry.info("pack.frequencies", json!({ "input": input, "output": output, "words": table.len() }));
            println!("packed {} word frequencies into {}", table.len(), output.display());
        }
    }
    Ok(())
}
