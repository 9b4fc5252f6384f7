//! Runs JSON fixture files against the serializer and reports per-case results.
mod fixture;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use colored::Colorize;
use rayon::prelude::*;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
struct CommandLineInterface {
    /// Fixture files. May be literal paths or quoted glob patterns.
    #[arg(default_value = "fixtures/*.json")]
    inputs: Vec<String>,

    /// only run cases whose name contains this
    #[arg(long)]
    filter: Option<String>,

    /// stop scheduling new cases after the first failure
    #[arg(long, default_value_t = false)]
    fail_fast: bool,

    /// -v for debug, -vv for trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

struct Outcome {
    file: String,
    case: String,
    result: anyhow::Result<()>,
}

fn main() -> anyhow::Result<()> {
    let cli = CommandLineInterface::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).init();

    let paths = resolve_file_path_patterns(&cli.inputs)?;
    info!(files = paths.len(), "loading fixtures");

    let stop = AtomicBool::new(false);
    let mut outcomes = Vec::new();
    for path in &paths {
        let loaded = fixture::load(path)?;
        let file = path.display().to_string();
        debug!(%file, cases = loaded.cases.len(), "loaded");

        let selected: Vec<_> = loaded
            .cases
            .iter()
            .filter(|case| cli.filter.as_ref().is_none_or(|needle| case.name.contains(needle.as_str())))
            .collect();
        let results: Vec<Outcome> = selected
            .par_iter()
            .filter(|_| !stop.load(Ordering::Relaxed))
            .map(|case| {
                let result = case.run(&loaded.serializer);
                if result.is_err() && cli.fail_fast {
                    stop.store(true, Ordering::Relaxed);
                }
                Outcome { file: file.clone(), case: case.name.clone(), result }
            })
            .collect();
        outcomes.extend(results);
        if stop.load(Ordering::Relaxed) {
            warn!("fail-fast: skipping remaining fixtures");
            break;
        }
    }

    let mut failed = 0usize;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(()) => println!("{} {} :: {}", "PASS".green().bold(), outcome.file.dimmed(), outcome.case),
            Err(error) => {
                failed += 1;
                println!("{} {} :: {}", "FAIL".red().bold(), outcome.file.dimmed(), outcome.case);
                println!("     {error:#}");
            }
        }
    }
    let summary = format!("{} passed, {} failed", outcomes.len() - failed, failed);
    if failed > 0 {
        println!("{}", summary.red());
        std::process::exit(1);
    }
    println!("{}", summary.green());
    Ok(())
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'['))
    }

    let mut out = Vec::<PathBuf>::new();
    for raw in patterns {
        let pattern = raw.as_ref();
        if !has_glob_chars(pattern) {
            out.push(PathBuf::from(pattern));
            continue;
        }
        let before = out.len();
        for entry in glob::glob(pattern)? {
            out.push(entry?);
        }
        if out.len() == before {
            anyhow::bail!("glob pattern matched no files: {pattern}");
        }
    }
    out.sort();
    out.dedup();
    Ok(out)
}
