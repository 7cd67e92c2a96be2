//! Clear command - delete the stored snapshot and its backup.

use crate::snapshot_file::SnapshotFile;
use margin_core::Config;
use std::io::{self, BufRead, Write};

/// Run the clear command.
pub fn run(config: Config, yes: bool) -> anyhow::Result<()> {
    let snapshot_file = SnapshotFile::new(config.snapshot_dir()?);
    let path = snapshot_file.path();

    if !snapshot_file.exists() {
        println!("Nothing stored at {}.", path.display());
        return Ok(());
    }

    if !yes && !confirm(&format!("Delete {} and its backup?", path.display()))? {
        println!("Kept the stored index.");
        return Ok(());
    }

    snapshot_file.clear()?;
    println!("Deleted {}. The next 'margin index' starts empty.", path.display());

    Ok(())
}

fn confirm(question: &str) -> anyhow::Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(accepts(&answer))
}

/// Only an explicit yes deletes; anything else, including a bare Enter, keeps.
fn accepts(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use margin_core::IndexSnapshot;
    use tempfile::TempDir;

    #[test]
    fn test_accepts() {
        assert!(accepts("y\n"));
        assert!(accepts("  YES "));
        assert!(!accepts("\n"));
        assert!(!accepts("no"));
        assert!(!accepts("yep"));
    }

    #[test]
    fn test_run_without_prompt_deletes_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.general.snapshot_path = Some(temp_dir.path().to_path_buf());

        let snapshot_file = SnapshotFile::new(temp_dir.path());
        snapshot_file.write(&IndexSnapshot::empty()).unwrap();

        run(config.clone(), true).unwrap();
        assert!(!snapshot_file.exists());

        // Nothing left to clear
        run(config, true).unwrap();
    }
}
