//! The `adaptiq init` command.

use std::path::Path;

use anyhow::{Context, Result};

pub fn execute() -> Result<()> {
    if Path::new("adaptiq.toml").exists() {
        println!("adaptiq.toml already exists, skipping.");
    } else {
        std::fs::write("adaptiq.toml", SAMPLE_CONFIG).context("failed to write adaptiq.toml")?;
        println!("Created adaptiq.toml");
    }

    std::fs::create_dir_all("question-sets")?;
    let example_path = Path::new("question-sets/example.toml");
    if example_path.exists() {
        println!("question-sets/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_POOL)
            .context("failed to write question-sets/example.toml")?;
        println!("Created question-sets/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Add your own questions to question-sets/example.toml");
    println!("  2. Run: adaptiq validate --pool question-sets/example.toml");
    println!("  3. Run: adaptiq play");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# adaptiq configuration

pool = "question-sets/example.toml"
# seed = 42
predictor_timeout_ms = 2000
halt_on_prediction_error = false

# Keep the player at their tier unless a built-in rule moves them.
[predictor]
type = "hold"

# Or ask a remote difficulty model:
# [predictor]
# type = "http"
# url = "http://localhost:8000/predict"
# api_key = "${ADAPTIQ_PREDICTOR_KEY}"
"#;

const EXAMPLE_POOL: &str = r#"[pool]
id = "example"
name = "Example Pool"
description = "A small pool to get started"

[[questions.multipleChoice.easy]]
id = "mc-easy-color"
prompt = "What color do you get by mixing blue and yellow?"
choices = ["Green", "Purple", "Orange"]
answer = "Green"

[[questions.multipleChoice.easy]]
id = "mc-easy-legs"
prompt = "How many legs does a spider have?"
choices = ["Six", "Eight", "Ten"]
answer = "Eight"

[[questions.multipleChoice.normal]]
id = "mc-normal-planet"
prompt = "Which planet is closest to the Sun?"
choices = ["Venus", "Mercury", "Mars"]
answer = "Mercury"

[[questions.multipleChoice.hard]]
id = "mc-hard-element"
prompt = "Which element has the chemical symbol W?"
choices = ["Tungsten", "Wolfram-oxide", "Vanadium"]
answer = "Tungsten"

[[questions.fillInTheBlank.easy]]
id = "fb-easy-week"
prompt = "There are ___ days in a week."
answer = "seven"

[[questions.fillInTheBlank.easy]]
id = "fb-easy-ice"
prompt = "Frozen water is called ___."
answer = "ice"

[[questions.fillInTheBlank.normal]]
id = "fb-normal-capital"
prompt = "The capital of Canada is ___."
answer = "Ottawa"

[[questions.fillInTheBlank.hard]]
id = "fb-hard-author"
prompt = "The novel 'One Hundred Years of Solitude' was written by Gabriel García ___."
answer = "Márquez"
"#;
