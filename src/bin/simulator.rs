use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::style::Stylize;
use simplify_core::{
    core::ranker::RankerKind, logging::Telemetry, LoadedResources, Settings, Simplifier, SimplifyError, Variant,
};

#[derive(Parser, Debug)]
#[command(name = "simulator", about = "Interactive console for the simplification pipeline")]
struct Args {
    /// Settings file (simplifier parameters, resource paths, logging).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory that relative resource paths are resolved against.
    #[arg(long)]
    resources: Option<PathBuf>,
}

const VARIANTS: [Variant; 5] = [
    Variant::SimpleScience,
    Variant::HierarchySimple,
    Variant::HierarchyPbs,
    Variant::PoincareSimple,
    Variant::PoincarePbs,
];

fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = match &args.config {
        Some(path) => Settings::from_path(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    let telemetry = match &settings.log.path {
        Some(path) => Telemetry::to_file("simulator", path, settings.log.level)?,
        None => Telemetry::disabled("simulator"),
    };
    let loaded = LoadedResources::load(&settings.resources, args.resources.as_deref(), &settings.simplifier, &telemetry)
        .context("failed to load resources")?;

    println!("Simplification simulator. Type a word or a sentence; ':variant NAME' switches, 'exit' quits.");
    println!("---------------------------------------------------------------");

    let mut simplifier = build(&settings, &loaded, &telemetry);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    print_prompt(&settings, &mut stdout)?;

    for line in stdin.lock().lines() {
        let input = line?;
        let input = input.trim();
        match input {
            "" => {}
            "exit" => break,
            s if s.starts_with(":variant") => {
                let name = s.trim_start_matches(":variant").trim();
                match VARIANTS.iter().find(|v| v.name() == name) {
                    Some(variant) => {
                        settings.simplifier.variant = *variant;
                        simplifier = build(&settings, &loaded, &telemetry);
                    }
                    None => {
                        let names: Vec<&str> = VARIANTS.iter().map(Variant::name).collect();
                        println!("unknown variant '{}'; one of: {}", name, names.join(", "));
                    }
                }
            }
            s => match &simplifier {
                Ok(simplifier) => run(simplifier, s),
                Err(e) => println!("{} {}", "cannot simplify:".red(), e),
            },
        }
        print_prompt(&settings, &mut stdout)?;
    }
    Ok(())
}

fn build<'a>(
    settings: &Settings,
    loaded: &'a LoadedResources,
    telemetry: &Telemetry,
) -> std::result::Result<Simplifier<'a>, SimplifyError> {
    Simplifier::builder(settings.simplifier.clone(), loaded.resources()?)
        .telemetry(telemetry.clone())
        .build()
}

fn run(simplifier: &Simplifier<'_>, input: &str) {
    let tokens: Vec<&str> = input.split_whitespace().collect();
    if let [word] = tokens.as_slice() {
        let trace = simplifier.simplify_word_traced(word, None);
        println!(
            "\n{}  generated {}  selected {}  ranked {}",
            trace.word.as_str().bold(),
            trace.counts.generated,
            trace.counts.selected,
            trace.counts.ranked
        );
        if trace.candidates.is_empty() {
            println!("No substitutions found.");
        }
        for (i, candidate) in trace.candidates.iter().enumerate() {
            println!("  :{}: {}", i + 1, candidate);
        }
        return;
    }

    let output = match simplifier.ranker_kind() {
        RankerKind::Similarity => simplifier.simplify_text(&tokens),
        RankerKind::PartialBeamSearch => simplifier.simplify_text_beam(&tokens),
    };
    match output {
        Ok(output) => println!("\n{}", output.join(" ").green()),
        Err(e) => println!("{} {}", "cannot simplify:".red(), e),
    }
}

fn print_prompt(settings: &Settings, stdout: &mut io::Stdout) -> io::Result<()> {
    print!("\n[{}] > ", settings.simplifier.variant.name());
    stdout.flush()
}
