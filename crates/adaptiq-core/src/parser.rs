//! Question pool parser.
//!
//! Loads question pools from TOML or JSON files and directories, and
//! validates them. Both formats share one nested shape,
//! `questions → mode → difficulty → [question]`:
//!
//! ```toml
//! [pool]
//! id = "capitals"
//! name = "Capitals"
//!
//! [[questions.multipleChoice.easy]]
//! id = "france"
//! prompt = "What is the capital of France?"
//! choices = ["Paris", "Rome"]
//! answer = "Paris"
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Difficulty, Mode, Question, QuestionPool};

/// Intermediate structure shared by TOML and JSON pool files.
#[derive(Debug, Deserialize)]
struct PoolFile {
    pool: PoolHeader,
    #[serde(default)]
    questions: BTreeMap<String, BTreeMap<String, Vec<QuestionRecord>>>,
}

#[derive(Debug, Deserialize)]
struct PoolHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct QuestionRecord {
    id: String,
    prompt: String,
    #[serde(default)]
    choices: Vec<String>,
    answer: String,
}

/// Parse a single pool file. The format is picked from the extension:
/// `.json` is JSON, anything else TOML.
pub fn parse_pool(path: &Path) -> Result<QuestionPool> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question pool file: {}", path.display()))?;

    parse_pool_str(&content, path)
}

/// Parse pool file contents (useful for testing).
pub fn parse_pool_str(content: &str, source_path: &Path) -> Result<QuestionPool> {
    let parsed: PoolFile = if source_path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(content)
            .with_context(|| format!("failed to parse JSON: {}", source_path.display()))?
    } else {
        toml::from_str(content)
            .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?
    };

    let mut pool = QuestionPool::new(parsed.pool.id, parsed.pool.name);
    pool.description = parsed.pool.description;

    for (mode_key, by_tier) in parsed.questions {
        let mode: Mode = mode_key
            .parse()
            .map_err(|e: String| anyhow::anyhow!("{}: {}", source_path.display(), e))?;

        for (tier_key, records) in by_tier {
            let difficulty: Difficulty = tier_key
                .parse()
                .map_err(|e: String| anyhow::anyhow!("{}: {}", source_path.display(), e))?;

            pool.ensure_bucket(mode, difficulty);
            for record in records {
                pool.insert(Question {
                    id: record.id,
                    mode,
                    difficulty,
                    prompt: record.prompt,
                    choices: record.choices,
                    answer: record.answer,
                });
            }
        }
    }

    Ok(pool)
}

/// Recursively load all `.toml` and `.json` pool files from a directory.
pub fn load_pool_directory(dir: &Path) -> Result<Vec<QuestionPool>> {
    let mut pools = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            pools.extend(load_pool_directory(&path)?);
        } else if path
            .extension()
            .is_some_and(|ext| ext == "toml" || ext == "json")
        {
            match parse_pool(&path) {
                Ok(pool) => pools.push(pool),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(pools)
}

/// Load a pool from a file, or merge every pool found in a directory.
pub fn load_pool(path: &Path) -> Result<QuestionPool> {
    if !path.is_dir() {
        return parse_pool(path);
    }

    let pools = load_pool_directory(path)?;
    anyhow::ensure!(
        !pools.is_empty(),
        "no question pools found in {}",
        path.display()
    );

    let mut merged = QuestionPool::new(
        pools.iter().map(|p| p.id.as_str()).collect::<Vec<_>>().join("+"),
        pools.iter().map(|p| p.name.as_str()).collect::<Vec<_>>().join(" + "),
    );
    for pool in pools {
        merged.merge(pool);
    }
    Ok(merged)
}

/// A warning from pool validation.
#[derive(Debug, Clone)]
pub struct PoolWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Check a pool's structure: every (mode, difficulty) bucket present and
/// non-empty, and question ids unique. Question text is not inspected.
pub fn validate_pool(pool: &QuestionPool) -> Vec<PoolWarning> {
    let mut warnings = Vec::new();

    // Every bucket selection can reach must exist
    for mode in Mode::ALL {
        for difficulty in Difficulty::ALL {
            match pool.get(mode, difficulty) {
                None => warnings.push(PoolWarning {
                    question_id: None,
                    message: format!("no questions for mode: {mode} and difficulty: {difficulty}"),
                }),
                Some([]) => warnings.push(PoolWarning {
                    question_id: None,
                    message: format!("empty bucket for mode: {mode} and difficulty: {difficulty}"),
                }),
                Some(_) => {}
            }
        }
    }

    let mut seen_ids = HashSet::new();
    for question in pool.iter() {
        if !seen_ids.insert(&question.id) {
            warnings.push(PoolWarning {
                question_id: Some(question.id.clone()),
                message: format!("duplicate question ID: {}", question.id),
            });
        }
    }

    warnings
}
