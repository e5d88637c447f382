#![allow(deprecated)]
use assert_cmd::Command;
use mockito::{Matcher, Server, ServerGuard};
use predicates::prelude::*;
use tempfile::TempDir;

const TOKEN_ENV: &str = "PAINPOINTS_TEST_TOKEN_NEVER_SET";

fn painpoints(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("painpoints").unwrap();
    cmd.current_dir(dir.path())
        .env("PAINPOINTS_ROOT", dir.path())
        .env_remove(TOKEN_ENV);
    cmd
}

/// Write painpoints.yaml pointing at the mock content host.
fn init_against(dir: &TempDir, server: &ServerGuard) {
    let yaml = format!(
        "content:\n  api_base: {}\n  owner: acme\n  repo: site\n  token_env: {TOKEN_ENV}\n",
        server.url()
    );
    std::fs::write(dir.path().join("painpoints.yaml"), yaml).unwrap();
}

fn mock_listing(server: &mut ServerGuard, dir: &str, files: &[&str], dirs: &[&str]) {
    let url = server.url();
    let mut items: Vec<serde_json::Value> = files
        .iter()
        .map(|name| {
            serde_json::json!({
                "name": name,
                "path": format!("{dir}/{name}"),
                "type": "file",
                "download_url": format!("{url}/raw/{dir}/{name}"),
            })
        })
        .collect();
    items.extend(dirs.iter().map(|name| {
        serde_json::json!({ "name": name, "path": format!("{dir}/{name}"), "type": "dir" })
    }));
    server
        .mock("GET", format!("/repos/acme/site/contents/{dir}").as_str())
        .with_status(200)
        .with_body(serde_json::Value::Array(items).to_string())
        .create();
}

fn mock_file(server: &mut ServerGuard, path: &str, body: &str) {
    server
        .mock("GET", format!("/raw/{path}").as_str())
        .with_status(200)
        .with_body(body)
        .create();
}

fn mock_absent(server: &mut ServerGuard, dir: &str) {
    server
        .mock("GET", format!("/repos/acme/site/contents/{dir}").as_str())
        .with_status(404)
        .create();
}

fn seed_p1(server: &mut ServerGuard) {
    mock_listing(server, "pain-points/p1", &["p1.yaml"], &["updates", "sub-pain-points"]);
    mock_file(
        server,
        "pain-points/p1/p1.yaml",
        "title: Timecards\nbaseDemandScore: 5\nbaseProgressScore: 2\n",
    );
    mock_listing(server, "pain-points/p1/updates", &["update-a.yaml", "broken.yaml"], &[]);
    mock_file(
        server,
        "pain-points/p1/updates/update-a.yaml",
        "date: 2024-02-01\ndescription: first\ndemandDelta: -1\n",
    );
    mock_file(server, "pain-points/p1/updates/broken.yaml", "date: [unclosed\n");
    let subs = "pain-points/p1/sub-pain-points";
    mock_listing(server, subs, &["s1.yaml"], &["s1"]);
    mock_file(server, &format!("{subs}/s1.yaml"), "title: Weekly totals\n");
    mock_listing(server, &format!("{subs}/s1/updates"), &["update-b.yaml"], &[]);
    mock_file(
        server,
        &format!("{subs}/s1/updates/update-b.yaml"),
        "date: 2024-03-01\ndescription: second\nprogressDelta: 4\n",
    );
    server
        .mock("GET", "/repos/acme/site/commits")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"[{"commit":{"author":{"date":"2024-01-01T00:00:00Z"}}}]"#)
        .create();
}

// ---------------------------------------------------------------------------
// painpoints init / config
// ---------------------------------------------------------------------------

#[test]
fn init_writes_config() {
    let dir = TempDir::new().unwrap();
    painpoints(&dir)
        .args(["init", "--owner", "acme", "--repo", "site", "--branch", "main"])
        .assert()
        .success()
        .stdout(predicate::str::contains("created: painpoints.yaml"));

    let text = std::fs::read_to_string(dir.path().join("painpoints.yaml")).unwrap();
    let value: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();
    assert_eq!(value["content"]["owner"], "acme");
    assert_eq!(value["content"]["branch"], "main");
    assert_eq!(value["content"]["root"], "pain-points");
}

#[test]
fn init_keeps_existing_config_without_force() {
    let dir = TempDir::new().unwrap();
    painpoints(&dir)
        .args(["init", "--owner", "acme", "--repo", "site"])
        .assert()
        .success();
    painpoints(&dir)
        .args(["init", "--owner", "other", "--repo", "site"])
        .assert()
        .success()
        .stdout(predicate::str::contains("exists"));

    let text = std::fs::read_to_string(dir.path().join("painpoints.yaml")).unwrap();
    assert!(text.contains("acme"));

    painpoints(&dir)
        .args(["init", "--owner", "other", "--repo", "site", "--force"])
        .assert()
        .success();
    let text = std::fs::read_to_string(dir.path().join("painpoints.yaml")).unwrap();
    assert!(text.contains("other"));
}

#[test]
fn config_validate_flags_missing_repo() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("painpoints.yaml"), "content:\n  owner: acme\n").unwrap();
    painpoints(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error]"))
        .stderr(predicate::str::contains("config validation found errors"));
}

#[test]
fn config_show_reports_token_state() {
    let dir = TempDir::new().unwrap();
    let server = Server::new();
    init_against(&dir, &server);
    painpoints(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("acme/site"))
        .stdout(predicate::str::contains("unset"));
}

#[test]
fn commands_fail_without_config() {
    let dir = TempDir::new().unwrap();
    painpoints(&dir)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("painpoints init"));
}

// ---------------------------------------------------------------------------
// painpoints list / show
// ---------------------------------------------------------------------------

#[test]
fn list_prints_table() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new();
    init_against(&dir, &server);
    mock_listing(&mut server, "pain-points", &[], &["p1"]);
    mock_listing(&mut server, "pain-points/p1", &["p1.yaml"], &[]);
    mock_file(&mut server, "pain-points/p1/p1.yaml", "title: Timecards\n");

    painpoints(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("p1"))
        .stdout(predicate::str::contains("Timecards"));
}

#[test]
fn show_json_carries_derived_scores() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new();
    init_against(&dir, &server);
    seed_p1(&mut server);

    let output = painpoints(&dir)
        .args(["show", "p1", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["view"]["currentDemandScore"], 4);
    assert_eq!(json["view"]["currentProgressScore"], 2);
    let sources: Vec<_> = json["timeline"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["sourceId"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(sources, ["s1", "p1"]);
}

#[test]
fn show_text_lists_timeline() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new();
    init_against(&dir, &server);
    seed_p1(&mut server);

    painpoints(&dir)
        .args(["show", "p1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4 (medium)"))
        .stdout(predicate::str::contains("Weekly totals"))
        .stdout(predicate::str::contains("2024-03-01"));
}

#[test]
fn show_unknown_sub_fails() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new();
    init_against(&dir, &server);
    seed_p1(&mut server);

    painpoints(&dir)
        .args(["show", "p1", "--sub", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sub-pain-point not found: p1/nope"));
}

#[test]
fn show_missing_pain_point_fails() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new();
    init_against(&dir, &server);
    mock_absent(&mut server, "pain-points/ghost");
    mock_absent(&mut server, "pain-points/ghost/updates");
    mock_absent(&mut server, "pain-points/ghost/sub-pain-points");

    painpoints(&dir)
        .args(["show", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pain point not found: ghost"));
}

// ---------------------------------------------------------------------------
// painpoints create / update / sub create
// ---------------------------------------------------------------------------

#[test]
fn update_without_token_fails() {
    let dir = TempDir::new().unwrap();
    let server = Server::new();
    init_against(&dir, &server);

    painpoints(&dir)
        .args(["update", "p1", "--description", "more asks", "--demand", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(TOKEN_ENV));
}

#[test]
fn create_with_token_flag_puts_file() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new();
    init_against(&dir, &server);
    let put = server
        .mock("PUT", "/repos/acme/site/contents/pain-points/slow-exports/slow-exports.yaml")
        .match_header("authorization", "Bearer secret")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "message": "Add pain point slow-exports",
        })))
        .with_status(201)
        .with_body("{}")
        .create();

    painpoints(&dir)
        .args([
            "create", "--title", "Slow exports", "--demand", "6", "--tag", "reports", "--token",
            "secret",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created pain point 'slow-exports'"));
    put.assert();
}

#[test]
fn sub_update_with_negative_delta() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new();
    init_against(&dir, &server);
    let put = server
        .mock(
            "PUT",
            Matcher::Regex(r"^/repos/acme/site/contents/pain-points/p1/sub-pain-points/s1/updates/update-2".into()),
        )
        .match_body(Matcher::PartialJson(serde_json::json!({
            "message": "Add update to s1",
        })))
        .with_status(201)
        .with_body("{}")
        .create();

    painpoints(&dir)
        .args([
            "update", "p1", "--sub", "s1", "--description", "fewer complaints", "--demand", "-2",
            "--date", "2024-04-01", "--token", "secret", "--json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"slug\": \"s1\""));
    put.assert();
}

#[test]
fn sub_create_rejects_bad_parent_slug() {
    let dir = TempDir::new().unwrap();
    let server = Server::new();
    init_against(&dir, &server);

    painpoints(&dir)
        .args(["sub", "create", "Bad Parent", "--title", "Offline", "--token", "secret"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid slug"));
}
