mod common;

use std::io::Write;
use std::process::Command;

use anyhow::Result;
use serde_json::Value;

fn admin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_punocracy-admin"))
}

#[test]
fn import_of_missing_file_fails() -> Result<()> {
    let output = admin()
        .args(["words", "import", "/definitely/not/here.csv"])
        .env("DATABASE_URL", "postgres://punocracy@127.0.0.1:1/punocracy")
        .output()?;
    assert!(!output.status.success());
    Ok(())
}

#[tokio::test]
async fn import_then_look_up() -> Result<()> {
    if common::test_pool().await?.is_none() {
        return Ok(());
    }
    let sfx = common::unique_suffix();

    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "xa{sfx}, xb{sfx}")?;
    writeln!(file, "# not a group")?;
    writeln!(file, "xc{sfx},xd{sfx},xe{sfx}")?;
    file.flush()?;

    let output = admin()
        .arg("--json")
        .args(["words", "import"])
        .arg(file.path())
        .output()?;
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let body: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(body["groups"], 2);
    assert_eq!(body["inserted"], 5);

    let output = admin()
        .args(["--json", "words", "homophones", &format!("xc{sfx}")])
        .output()?;
    assert!(output.status.success());
    let body: Value = serde_json::from_slice(&output.stdout)?;
    let words: Vec<&str> = body["homophones"]
        .as_array()
        .map(|a| a.iter().filter_map(|w| w["word"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(words, vec![format!("xd{sfx}"), format!("xe{sfx}")]);

    let output = admin()
        .args(["--json", "words", "ids", &format!("xa{sfx}"), &format!("xb{sfx}")])
        .output()?;
    assert!(output.status.success());
    let body: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(body["ids"].as_array().map(Vec::len), Some(2));
    Ok(())
}
