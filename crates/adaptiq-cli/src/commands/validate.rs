//! The `adaptiq validate` command.

use std::path::PathBuf;

use anyhow::Result;

use adaptiq_core::parser::{load_pool, load_pool_directory, validate_pool};

pub fn execute(pool_path: PathBuf) -> Result<()> {
    // A directory is played as one merged pool, so it is checked as one.
    if pool_path.is_dir() {
        for file_pool in load_pool_directory(&pool_path)? {
            println!("Pool: {} ({} questions)", file_pool.name, file_pool.len());
        }
    }
    let pool = load_pool(&pool_path)?;
    if pool_path.is_dir() {
        println!("Merged: {} ({} questions)", pool.name, pool.len());
    } else {
        println!("Pool: {} ({} questions)", pool.name, pool.len());
    }

    let warnings = validate_pool(&pool);
    for w in &warnings {
        let prefix = w
            .question_id
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("All question pools valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
