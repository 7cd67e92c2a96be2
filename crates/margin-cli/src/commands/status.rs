//! Status command - show index status and statistics.

use crate::app::App;
use margin_core::Config;

/// Run the status command.
pub fn run(config: Config) -> anyhow::Result<()> {
    let app = App::new(config)?;
    let from_disk = app.load_stored()?;
    let stats = app.worker.stats().wait()?;

    println!("Margin Index Status");
    println!("===================");
    println!();

    if !from_disk {
        println!("No stored index. Run 'margin index <paths>' to build one.");
    } else {
        println!("Summary:");
        println!("  Documents:     {}", stats.document_count);
        println!("  Text size:     {} bytes", stats.total_bytes);
        println!(
            "  Snapshot size: {} bytes",
            app.snapshot_file
                .read()?
                .map(|snapshot| snapshot.len())
                .unwrap_or(0)
        );

        if let Some(updated) = stats.last_updated {
            println!(
                "  Loaded at:     {}",
                updated
                    .with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M:%S")
            );
        }
    }

    println!();
    println!("Corpora:");
    println!(
        "  Snippets:   {} (query with '{}:<prefix>')",
        app.snippets.len(),
        app.snippets.marker()
    );
    match &app.config.corpus.references_path {
        Some(path) => println!("  References: {}", path.display()),
        None => println!("  References: none configured"),
    }

    // Show data directory
    println!();
    println!("Data directory: {}", app.config.snapshot_dir()?.display());

    Ok(())
}
