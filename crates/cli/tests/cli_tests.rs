//! CLI integration tests
use predicates::prelude::*;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("sitecarve")
}

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

#[test]
fn test_cli_file_input() {
    cmd()
        .args(["extract", &get_fixture_path("page.html")])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<h1>Old Fashioned</h1>"))
        .stdout(predicate::str::contains("<br />"))
        .stdout(predicate::str::contains("header").not())
        .stdout(predicate::str::contains("Field Notes</p>").not());
}

#[test]
fn test_cli_content_field_trigger() {
    cmd()
        .args(["extract", &get_fixture_path("content_field.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("<ul><li>One</li><li>Two</li></ul>"))
        .stdout(predicate::str::contains("Footer").not());
}

#[test]
fn test_cli_stdin_input() {
    let html = std::fs::read_to_string(get_fixture_path("page.html")).unwrap();
    cmd()
        .args(["extract", "-"])
        .write_stdin(html)
        .assert()
        .success()
        .stdout(predicate::str::contains("Orange peel"));
}

#[test]
fn test_cli_empty_region_prints_nothing() {
    cmd()
        .args(["extract", "-"])
        .write_stdin(r#"<div id="mainContent">  </div>"#)
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Region is empty"));
}

#[test]
fn test_cli_custom_trigger() {
    cmd()
        .args(["extract", "--trigger", "class=sqs-block-content", &get_fixture_path("page.html")])
        .assert()
        .success()
        .stdout(predicate::str::diff("<p>Orange peel, not cherry.<br />Always.</p>\n"));
}

#[test]
fn test_cli_invalid_trigger() {
    cmd()
        .args(["extract", "--trigger", "mainContent", &get_fixture_path("page.html")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --trigger"));
}

#[test]
fn test_cli_no_region() {
    cmd()
        .args(["extract", &get_fixture_path("no_region.html")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No content region matched"));
}

#[test]
fn test_cli_unclosed_region_warns() {
    cmd()
        .args(["extract", &get_fixture_path("unclosed.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("<p>Cut off mid-page"))
        .stderr(predicate::str::contains("not closed"));
}

#[test]
fn test_cli_json_output() {
    let output = cmd().args(["extract", "--json", &get_fixture_path("unclosed.html")]).output().unwrap();
    assert!(output.status.success());

    let region: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(region["complete"], false);
    assert!(region["token_count"].as_u64().unwrap() >= 2);
    assert!(region["content"].as_str().unwrap().starts_with("<p>"));
}

#[test]
fn test_cli_clean() {
    cmd()
        .args(["extract", "--clean", "--base-url", "https://www.example.com", &get_fixture_path("page.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"<a href="/alcohol/negroni">"#));
}

#[test]
fn test_cli_base_url_requires_clean() {
    cmd()
        .args(["extract", "--base-url", "https://www.example.com", &get_fixture_path("page.html")])
        .assert()
        .failure();
}

#[test]
fn test_cli_output_file() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("region.html");

    cmd()
        .args(["extract", "-o", output.to_str().unwrap(), &get_fixture_path("page.html")])
        .assert()
        .success()
        .stderr(predicate::str::contains("Output written to"));

    let written = std::fs::read_to_string(output).unwrap();
    assert!(written.contains("Stir with ice &amp; strain."));
}

#[test]
fn test_cli_invalid_file() {
    cmd().args(["extract", "nonexistent.html"]).assert().failure();
}

#[test]
fn test_cli_verbose() {
    cmd()
        .args(["-v", "extract", &get_fixture_path("page.html")])
        .assert()
        .success()
        .stderr(predicate::str::contains("sitecarve"))
        .stderr(predicate::str::contains("Tokens:"));
}

#[test]
fn test_cli_organize_without_rules() {
    let tmp = TempDir::new().unwrap();
    cmd()
        .current_dir(tmp.path())
        .args(["organize", "--base-url", "https://www.example.com", "--output-root", ".", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"pages_updated\": 0"));
}

#[test]
fn test_cli_organize_with_config() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    std::fs::create_dir_all(root.join("images/alcohol-negroni")).unwrap();
    std::fs::create_dir_all(root.join("alcohol/negroni")).unwrap();
    std::fs::write(root.join("images/alcohol-negroni/n-12345678.jpg"), "jpg").unwrap();
    std::fs::write(
        root.join("alcohol/negroni/index.html"),
        r#"<img src="/images/alcohol-negroni/n-12345678.jpg" alt="Negroni">"#,
    )
    .unwrap();
    std::fs::write(
        root.join("sitecarve.toml"),
        "base_url = \"https://www.example.com\"\n\n[[taxonomy]]\nsection = \"alcohol\"\nlayout = \"single\"\nfolder = \"alcohol\"\n",
    )
    .unwrap();

    cmd().current_dir(root).arg("organize").assert().success().stderr(predicate::str::contains("moved 1 images"));

    assert!(root.join("images/alcohol/negroni.jpg").exists());
    let page = std::fs::read_to_string(root.join("alcohol/negroni/index.html")).unwrap();
    assert_eq!(page, r#"<img src="/images/alcohol/negroni.jpg" alt="Negroni">"#);
}

#[test]
fn test_cli_site_command_needs_configuration() {
    let tmp = TempDir::new().unwrap();
    cmd()
        .current_dir(tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path())
        .env("HOME", tmp.path())
        .arg("organize")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No site configuration found"));
}

#[test]
fn test_cli_completions() {
    cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sitecarve"));
}
