//! Query command - search documents, snippets and references.

use crate::app::App;
use crate::OutputFormat;
use margin_core::{Config, SearchResult};
use std::time::Instant;

/// Run the query command.
pub fn run(config: Config, criteria: &str, output: OutputFormat) -> anyhow::Result<()> {
    let app = App::new(config)?;

    if !app.load_stored()? {
        eprintln!("No stored index. Run 'margin index' to search documents.");
    }

    let start = Instant::now();
    let results = app.worker.search(criteria).wait()?;
    let elapsed = start.elapsed();

    match output {
        OutputFormat::Text => {
            print_results(&results);

            eprintln!();
            eprintln!(
                "Found {} results in {:.3}ms",
                results.len(),
                elapsed.as_secs_f64() * 1000.0
            );
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
    }

    Ok(())
}

/// Print results as numbered lines.
pub fn print_results(results: &[SearchResult]) {
    for (i, result) in results.iter().enumerate() {
        match result {
            SearchResult::Document { starts, ends, .. } => {
                println!("{:>3}. {} ({}..{})", i + 1, result, starts, ends);
            }
            _ => println!("{:>3}. {}", i + 1, result),
        }
    }
}
