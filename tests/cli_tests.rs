use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

const FIXTURE: &str = r#"{
  "pages": [
    {
      "id": "page-home",
      "slug": "home",
      "sections": [
        { "__typename": "ComponentCta", "id": "a1" },
        { "__typename": "ComponentList", "id": "b1" },
        null,
        { "__typename": "ComponentCta", "id": "a2" },
        { "__typename": "ComponentCta", "id": "draft" }
      ]
    }
  ],
  "entries": [
    { "__typename": "ComponentCta", "id": "a1", "fields": { "headline": "First" } },
    { "__typename": "ComponentCta", "id": "a2", "fields": { "headline": "Second" } },
    { "__typename": "ComponentList", "id": "b1", "fields": { "title": "Things" } }
  ]
}"#;

/// Writes the fixture into a fresh directory that also serves as the working
/// directory, so no stray `.env` is picked up.
fn fixture_dir() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pages.json");
    std::fs::write(&path, FIXTURE).unwrap();
    (dir, path)
}

fn cms_pages(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("cms-pages").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .env_remove("CMS_PREVIEW")
        .env_remove("CMS_MAX_IDS_PER_BATCH");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    cms_pages(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("types"));
}

#[test]
fn test_types_lists_every_content_type() {
    let dir = TempDir::new().unwrap();
    cms_pages(&dir)
        .arg("types")
        .assert()
        .success()
        .stdout(predicate::str::contains("ComponentHeroBanner"))
        .stdout(predicate::str::contains("componentCtaCollection"))
        .stdout(predicate::str::contains("ComponentTextBlock"));
}

#[test]
fn test_types_json() {
    let dir = TempDir::new().unwrap();
    let output = cms_pages(&dir).args(["types", "--json"]).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let types = json.as_array().unwrap();
    assert_eq!(types.len(), 5);
    assert_eq!(types[1]["typename"], "ComponentCta");
}

#[test]
fn test_resolve_from_fixture_keeps_author_order() {
    let (dir, fixture) = fixture_dir();
    let output = cms_pages(&dir)
        .arg("--fixture")
        .arg(&fixture)
        .args(["resolve", "home", "--json"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["id"], "page-home");
    let ids: Vec<&str> = json["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["a1", "b1", "a2"]);
    assert_eq!(json["items"][1]["fields"]["title"], "Things");
    assert_eq!(json["items"][0]["fields"]["__typename"], "ComponentCta");
}

#[test]
fn test_resolve_text_output_with_stats() {
    let (dir, fixture) = fixture_dir();
    cms_pages(&dir)
        .arg("--fixture")
        .arg(&fixture)
        .args(["resolve", "home", "--stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("page-home (home, en-US): 3 items"))
        .stdout(predicate::str::contains("4 refs, 2 types, 2 batches, 1 dropped"));
}

#[test]
fn test_resolve_json_with_stats_wraps_document() {
    let (dir, fixture) = fixture_dir();
    let output = cms_pages(&dir)
        .arg("--fixture")
        .arg(&fixture)
        .args(["resolve", "home", "--json", "--stats"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["document"]["id"], "page-home");
    assert_eq!(json["document"]["items"].as_array().unwrap().len(), 3);
    assert_eq!(json["stats"]["refs"], 4);
    assert_eq!(json["stats"]["dropped"], 1);
}

#[test]
fn test_plan_from_fixture() {
    let (dir, fixture) = fixture_dir();
    cms_pages(&dir)
        .arg("--fixture")
        .arg(&fixture)
        .args(["plan", "home"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 requests"))
        .stdout(predicate::str::contains("ComponentCta"));
}

#[test]
fn test_missing_page_exits_with_2() {
    let (dir, fixture) = fixture_dir();
    cms_pages(&dir)
        .arg("--fixture")
        .arg(&fixture)
        .args(["resolve", "nowhere"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no page with slug 'nowhere'"));
}

#[test]
fn test_missing_credentials_exit_with_1() {
    let dir = TempDir::new().unwrap();
    cms_pages(&dir)
        .env_remove("CONTENTFUL_SPACE_ID")
        .env_remove("CONTENTFUL_ACCESS_TOKEN")
        .args(["resolve", "home"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("CONTENTFUL_SPACE_ID"));
}

#[test]
fn test_bad_fixture_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();

    cms_pages(&dir)
        .arg("--fixture")
        .arg(&path)
        .args(["plan", "home"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid fixture"));
}
