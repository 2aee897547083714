//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const GENERAL: &str = "../../question-sets/general.toml";

fn adaptiq() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("adaptiq").unwrap();
    cmd.env_remove("ADAPTIQ_PREDICTOR_URL");
    cmd
}

#[test]
fn validate_general_pool() {
    adaptiq()
        .arg("validate")
        .arg("--pool")
        .arg(GENERAL)
        .assert()
        .success()
        .stdout(predicate::str::contains("General Knowledge (24 questions)"))
        .stdout(predicate::str::contains("All question pools valid"));
}

#[test]
fn validate_directory() {
    adaptiq()
        .arg("validate")
        .arg("--pool")
        .arg("../../question-sets")
        .assert()
        .success()
        .stdout(predicate::str::contains("General Knowledge"));
}

#[test]
fn validate_reports_warnings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(
        &path,
        r#"
[pool]
id = "broken"
name = "Broken"

[[questions.multipleChoice.easy]]
id = "q1"
prompt = "Pick one"
choices = ["a", "b"]
answer = "a"

[[questions.fillInTheBlank.hard]]
id = "q1"
prompt = "Fill ___"
answer = "in"
"#,
    )
    .unwrap();

    adaptiq()
        .arg("validate")
        .arg("--pool")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("[q1] WARNING: duplicate question ID: q1"))
        .stdout(predicate::str::contains("no questions for mode: fillInTheBlank and difficulty: easy"))
        .stdout(predicate::str::contains("warning(s) found"));
}

#[test]
fn validate_directory_checks_the_merged_pool() {
    let dir = TempDir::new().unwrap();
    let mut a = String::from("[pool]\nid = \"a\"\nname = \"A\"\n");
    let mut b = String::from("[pool]\nid = \"b\"\nname = \"B\"\n");
    for tier in ["easy", "normal", "hard"] {
        a.push_str(&format!(
            "\n[[questions.multipleChoice.{tier}]]\nid = \"dup-{tier}\"\nprompt = \"?\"\nchoices = [\"x\", \"y\"]\nanswer = \"x\"\n"
        ));
        b.push_str(&format!(
            "\n[[questions.fillInTheBlank.{tier}]]\nid = \"dup-{tier}\"\nprompt = \"___\"\nanswer = \"x\"\n"
        ));
    }
    std::fs::write(dir.path().join("a.toml"), a).unwrap();
    std::fs::write(dir.path().join("b.toml"), b).unwrap();

    // Together the files cover every bucket, but they reuse the same ids.
    adaptiq()
        .arg("validate")
        .arg("--pool")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Merged: A + B (6 questions)"))
        .stdout(predicate::str::contains("[dup-easy] WARNING: duplicate question ID: dup-easy"))
        .stdout(predicate::str::contains("no questions for mode").not())
        .stdout(predicate::str::contains("3 warning(s) found."));
}

#[test]
fn validate_nonexistent_file() {
    adaptiq()
        .arg("validate")
        .arg("--pool")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn simulate_plays_to_game_over() {
    adaptiq()
        .arg("simulate")
        .arg("--pool")
        .arg(GENERAL)
        .arg("--accuracy")
        .arg("1.0")
        .arg("--seed")
        .arg("7")
        .assert()
        .success()
        .stdout(predicate::str::contains("Game over!"))
        .stdout(predicate::str::contains("Difficulty"))
        .stdout(predicate::str::contains("Score:"));
}

#[test]
fn simulate_is_reproducible_with_seed() {
    let run = || {
        let output = adaptiq()
            .arg("simulate")
            .arg("--pool")
            .arg(GENERAL)
            .arg("--seed")
            .arg("42")
            .output()
            .unwrap();
        assert!(output.status.success());
        String::from_utf8(output.stdout).unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn simulate_respects_round_limit() {
    adaptiq()
        .arg("simulate")
        .arg("--pool")
        .arg(GENERAL)
        .arg("--rounds")
        .arg("3")
        .arg("--seed")
        .arg("1")
        .assert()
        .success()
        .stdout(predicate::str::contains("Session ended."))
        .stdout(predicate::str::contains("Round   3"))
        .stdout(predicate::str::contains("Round   4").not());
}

#[test]
fn simulate_writes_json_summary() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out").join("summary.json");

    adaptiq()
        .arg("simulate")
        .arg("--pool")
        .arg(GENERAL)
        .arg("--seed")
        .arg("3")
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Summary written to"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(json["pool_id"], "general");
    assert_eq!(json["game_over"], true);
    assert!(json["score"].is_u64());
    assert!(json["history"].as_array().is_some_and(|h| !h.is_empty()));
}

#[test]
fn simulate_rejects_bad_accuracy() {
    adaptiq()
        .arg("simulate")
        .arg("--pool")
        .arg(GENERAL)
        .arg("--accuracy")
        .arg("1.5")
        .assert()
        .failure()
        .stderr(predicate::str::contains("accuracy must be between"));
}

#[test]
fn simulate_without_pool_fails() {
    let dir = TempDir::new().unwrap();
    adaptiq()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .arg("simulate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no question pool given"));
}

#[test]
fn simulate_halts_on_missing_bucket() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("partial.toml");
    std::fs::write(
        &path,
        r#"
[pool]
id = "partial"
name = "Partial"

[[questions.multipleChoice.easy]]
id = "q1"
prompt = "Pick one"
choices = ["a", "b"]
answer = "a"
"#,
    )
    .unwrap();

    adaptiq()
        .arg("simulate")
        .arg("--pool")
        .arg(&path)
        .arg("--seed")
        .arg("5")
        .assert()
        .failure()
        .stderr(predicate::str::contains("questions not found for mode"));
}

#[test]
fn simulate_reports_unreachable_predictor() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("adaptiq.toml");
    std::fs::write(
        &config,
        format!(
            "pool = {:?}\nhalt_on_prediction_error = true\n\n[predictor]\ntype = \"http\"\nurl = \"http://127.0.0.1:1/predict\"\n",
            std::fs::canonicalize(GENERAL).unwrap()
        ),
    )
    .unwrap();

    adaptiq()
        .arg("simulate")
        .arg("--config")
        .arg(&config)
        .arg("--accuracy")
        .arg("0.0")
        .arg("--seed")
        .arg("2")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error predicting difficulty"));
}

#[test]
fn play_reads_answers_from_stdin() {
    adaptiq()
        .arg("play")
        .arg("--pool")
        .arg(GENERAL)
        .arg("--seed")
        .arg("11")
        .write_stdin("not it\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Round 1"))
        .stdout(predicate::str::contains("Wrong. The answer was:"))
        .stdout(predicate::str::contains("Session ended."))
        .stdout(predicate::str::contains("Score: 0"));
}

#[test]
fn play_ends_on_closed_stdin() {
    adaptiq()
        .arg("play")
        .arg("--pool")
        .arg(GENERAL)
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("Session ended."));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    adaptiq()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created adaptiq.toml"))
        .stdout(predicate::str::contains("Created question-sets/example.toml"));

    assert!(dir.path().join("adaptiq.toml").exists());
    assert!(dir.path().join("question-sets/example.toml").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    adaptiq().current_dir(dir.path()).arg("init").assert().success();

    adaptiq()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn init_output_is_playable() {
    let dir = TempDir::new().unwrap();

    adaptiq().current_dir(dir.path()).arg("init").assert().success();

    adaptiq()
        .current_dir(dir.path())
        .arg("validate")
        .arg("--pool")
        .arg("question-sets/example.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("All question pools valid"));

    adaptiq()
        .current_dir(dir.path())
        .arg("simulate")
        .arg("--seed")
        .arg("9")
        .assert()
        .success()
        .stdout(predicate::str::contains("Example Pool"));
}

#[test]
fn help_output() {
    adaptiq()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Adaptive difficulty quiz engine"));
}

#[test]
fn version_output() {
    adaptiq()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("adaptiq"));
}
