//! Index command - add files to the document index.

use crate::app::App;
use margin_core::{Config, Document};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, warn};

/// Run the index command.
pub fn run(config: Config, paths: Vec<PathBuf>, fresh: bool) -> anyhow::Result<()> {
    let app = App::new(config)?;

    if fresh {
        app.start_empty()?;
    } else if app.load_stored()? {
        let stats = app.worker.stats().wait()?;
        println!("Extending index with {} documents.", stats.document_count);
    }

    let start = Instant::now();

    let mut documents = Vec::new();
    for path in &paths {
        collect_documents(path, &mut documents)?;
    }

    if documents.is_empty() {
        println!("No readable text files found.");
        return Ok(());
    }

    let added = documents.len();
    app.add_documents(documents)?;

    let elapsed = start.elapsed();
    let stats = app.worker.stats().wait()?;

    println!();
    println!("Indexing complete!");
    println!("  Added:     {}", added);
    println!("  Documents: {}", stats.document_count);
    println!("  Bytes:     {}", stats.total_bytes);
    println!("  Time:      {:.2}s", elapsed.as_secs_f64());
    println!("  Saved to:  {}", app.snapshot_file.path().display());

    Ok(())
}

/// Collect text files under `path`, walking directories recursively.
///
/// Hidden directories are skipped. Files that are not valid UTF-8 are
/// skipped with a warning.
pub(crate) fn collect_documents(path: &Path, out: &mut Vec<Document>) -> anyhow::Result<()> {
    if path.is_dir() {
        let mut entries = fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()?;
        entries.sort();

        for entry in entries {
            if entry.is_dir() && is_hidden(&entry) {
                debug!(path = %entry.display(), "Skipping hidden directory");
                continue;
            }
            collect_documents(&entry, out)?;
        }
        return Ok(());
    }

    match fs::read_to_string(path) {
        Ok(text) => out.push(Document::new(path.display().to_string(), text)),
        Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable file"),
    }
    Ok(())
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_collect_walks_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("sub/deeper")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join("a.md"), "alpha").unwrap();
        fs::write(root.join("sub/b.md"), "beta").unwrap();
        fs::write(root.join("sub/deeper/c.md"), "gamma").unwrap();
        fs::write(root.join(".git/config"), "hidden").unwrap();
        fs::write(root.join("binary.bin"), [0xff, 0xfe, 0x00]).unwrap();

        let mut documents = Vec::new();
        collect_documents(root, &mut documents).unwrap();

        let texts: Vec<&str> = documents.iter().map(|d| d.text.as_str()).collect();
        assert_eq!(texts, vec!["alpha", "beta", "gamma"]);
        assert!(documents[0].path.ends_with("a.md"));
    }

    #[test]
    fn test_collect_single_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("note.txt");
        fs::write(&file, "hello").unwrap();

        let mut documents = Vec::new();
        collect_documents(&file, &mut documents).unwrap();
        assert_eq!(documents, vec![Document::new(file.display().to_string(), "hello")]);
    }
}
