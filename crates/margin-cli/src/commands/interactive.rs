//! Interactive command - search line by line from a prompt.
//!
//! Every line is a query. Lines starting with `:` are commands:
//!
//! - `:insert N` prints the insertable text of snippet result N
//! - `:add PATH` indexes more files and stores the new snapshot
//! - `:quit` exits (so does end of input)

use crate::app::App;
use crate::commands::index::collect_documents;
use crate::commands::query::print_results;
use margin_core::{Config, SearchResult};
use std::io::{self, BufRead, Write};
use std::path::Path;

/// Run the interactive command.
pub fn run(config: Config) -> anyhow::Result<()> {
    let app = App::new(config)?;
    if !app.load_stored()? {
        println!("No stored index. Use ':add PATH' to index files.");
    }
    println!("Type a query, ':insert N', ':add PATH' or ':quit'.");

    let mut last_results: Vec<SearchResult> = Vec::new();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let line = line.trim();

        match line.split_once(' ').unwrap_or((line, "")) {
            (":quit" | ":q", _) => break,
            (":insert", arg) => match arg.trim().parse::<usize>() {
                Ok(n) => insert(&app, &last_results, n),
                Err(_) => println!("Usage: :insert N"),
            },
            (":add", arg) if !arg.trim().is_empty() => {
                let mut documents = Vec::new();
                collect_documents(Path::new(arg.trim()), &mut documents)?;
                let added = documents.len();
                match app.add_documents(documents) {
                    Ok(()) => println!("Added {} documents.", added),
                    Err(e) => println!("Could not add documents: {}", e),
                }
            }
            _ => {
                let results = app.worker.search(line).wait()?;
                print_results(&results);
                last_results = results;
            }
        }
    }

    Ok(())
}

fn insert(app: &App, results: &[SearchResult], n: usize) {
    match n.checked_sub(1).and_then(|i| results.get(i)) {
        Some(SearchResult::Snippet { text }) => print!("{}", app.snippets.insertable(text)),
        Some(_) => println!("Result {} is not a snippet.", n),
        None => println!("No result {}.", n),
    }
}
