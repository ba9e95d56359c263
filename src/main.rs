// SPDX-License-Identifier: PMPL-1.0-or-later

//! pastwatch: temporal-consistency checking for biographical wiki pages
//!
//! Loads the scraper's output document, runs the requested inference slices
//! against it, prints the per-page wiki markup, and optionally persists a
//! machine-readable report.

mod checkers;
mod engine;
mod report;
mod types;

use crate::checkers::CheckerKind;
use crate::engine::DEFAULT_MAX_DERIVED;
use crate::report::{InferenceReport, ReportOutputFormat};
use crate::types::ScrapeResult;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

macro_rules! qprintln {
    ($quiet:expr, $($arg:tt)+) => {
        if !$quiet {
            println!($($arg)+);
        }
    };
}

#[derive(Parser)]
#[command(name = "pastwatch")]
#[command(version = "0.3.0")]
#[command(about = "Temporal-consistency checking for biographical wiki pages")]
#[command(long_about = None)]
#[command(disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, default_value_t = false, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run inference checkers against a scrape document
    Check {
        /// Scrape document produced by the wiki scraper (json/yaml)
        #[arg(value_name = "SCRAPE")]
        scrape: PathBuf,

        /// Checker(s) to run (default: all)
        #[arg(long = "checker", value_enum, action = clap::ArgAction::Append)]
        checkers: Vec<CheckerKind>,

        /// Run the checkers on a thread pool, one knowledge base each
        #[arg(long, default_value_t = false)]
        parallel: bool,

        /// Abort a checker once it has derived this many facts
        #[arg(long, default_value_t = DEFAULT_MAX_DERIVED)]
        max_derived: usize,

        /// Print the per-page wiki markup blocks
        #[arg(long, default_value_t = false)]
        markup: bool,

        /// Write the report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report file format
        #[arg(long, value_enum, default_value_t = ReportOutputFormat::Json)]
        output_format: ReportOutputFormat,
    },

    /// Print the rulebase of the selected checkers
    Rules {
        /// Checker(s) to list (default: all)
        #[arg(long = "checker", value_enum, action = clap::ArgAction::Append)]
        checkers: Vec<CheckerKind>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            scrape,
            checkers,
            parallel,
            max_derived,
            markup,
            output,
            output_format,
        } => run_check(
            &scrape,
            checkers,
            parallel,
            max_derived,
            markup,
            output,
            output_format,
            cli.quiet,
        ),
        Commands::Rules { checkers } => run_rules(checkers),
    }
}

fn selected_kinds(checkers: Vec<CheckerKind>) -> Vec<CheckerKind> {
    if checkers.is_empty() {
        CheckerKind::all()
    } else {
        checkers
    }
}

#[allow(clippy::too_many_arguments)]
fn run_check(
    scrape_path: &PathBuf,
    checkers: Vec<CheckerKind>,
    parallel: bool,
    max_derived: usize,
    markup: bool,
    output: Option<PathBuf>,
    output_format: ReportOutputFormat,
    quiet: bool,
) -> Result<()> {
    let kinds = selected_kinds(checkers);

    let scrape = ScrapeResult::load(scrape_path)?;
    let urls: Vec<String> = scrape.data.iter().map(|page| page.url.clone()).collect();
    qprintln!(
        quiet,
        "Loaded {} page(s) from {}",
        urls.len(),
        scrape_path.display()
    );

    let results = checkers::run_all(&kinds, &scrape, max_derived, parallel)?;
    let findings = report::findings(&results);
    let (page_reports, clean_pages) = report::group_by_page(&urls, &findings);

    if !quiet {
        report::print_summary(&results, &findings, &clean_pages);
    }

    if markup {
        for page in &page_reports {
            println!("== {} ==", page.url);
            println!("{}", page.markup());
            println!();
        }
    }

    if let Some(path) = output {
        let inference_report = InferenceReport::build(
            urls.len(),
            &results,
            &findings,
            &page_reports,
            &clean_pages,
        );
        report::save_report(&inference_report, &path, output_format)
            .with_context(|| format!("writing report to {}", path.display()))?;
        qprintln!(quiet, "Report written to {}", path.display());
    }

    Ok(())
}

fn run_rules(checkers: Vec<CheckerKind>) -> Result<()> {
    for kind in selected_kinds(checkers) {
        let checker = checkers::Checker::new(kind)?;
        println!("# {}", kind.label());
        for rule in checker.rules() {
            println!("{}", rule);
        }
        println!();
    }
    Ok(())
}
