use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

mod helpers;
use helpers::*;

fn bin_cmd() -> Command {
    let mut cmd = Command::cargo_bin("relocale").expect("binary built");
    cmd.env_remove("RUST_LOG")
        .env_remove("RELOCALE_LOG_DIR")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn help_works() {
    bin_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Reconfigure the locale set of a multi-locale static site",
        ));
}

#[test]
fn status_text_and_json() {
    let site = fixture_site();
    bin_cmd()
        .args(["status", "--root"])
        .arg(&site)
        .assert()
        .success()
        .stdout(predicate::str::contains("Default locale: en"))
        .stdout(predicate::str::contains("astro.config.mjs"));

    let out = bin_cmd()
        .args(["status", "--format", "json", "--root"])
        .arg(&site)
        .output()
        .expect("run status");
    assert!(out.status.success());
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).expect("valid json");
    assert_eq!(json["default_locale"], "en");
    assert_eq!(json["locales"], serde_json::json!(["en", "fr"]));
}

#[test]
fn configure_adds_a_locale_everywhere() {
    let dir = site_copy();
    let r = dir.path();
    bin_cmd()
        .args(["configure", "--default", "en", "--locales", "fr,de", "--yes", "--root"])
        .arg(r)
        .assert()
        .success()
        .stdout(predicate::str::contains("updated"));

    let astro = read(r, "astro.config.mjs");
    assert_contains(&astro, "defaultLocale: \"en\",");
    assert_contains(&astro, "\"de\"");
    let settings = read(r, "src/config/siteSettings.json.ts");
    assert_contains(&settings, "de: \"DE\",");
    let data = read(r, "src/config/translationData.json.ts");
    assert_contains(&data, "import navDataDe from \"./de/navData.json\";");
    assert_contains(&data, "navData: navDataDe,");
    assert_contains(&read(r, "keystatic.config.tsx"), "blogDE: Collections.Blog(\"de\"),");

    assert!(r.join("src/config/de/siteData.json.ts").exists());
    assert!(r.join("src/content/blog/de/first-post/index.mdx").exists());
    assert!(r.join("src/content/blog/fr/first-post/index.mdx").exists());
    assert_contains(&read(r, "src/pages/de/index.astro"), "useTranslations(\"de\")");
    assert_contains(&read(r, "src/pages/fr/index.astro"), "useTranslations(\"fr\")");
}

#[test]
fn configure_single_locale_removes_the_others() {
    let dir = site_copy();
    let r = dir.path();
    bin_cmd()
        .args(["configure", "--default", "en", "--yes", "--root"])
        .arg(r)
        .assert()
        .success();

    assert_contains(&read(r, "astro.config.mjs"), "locales: [\"en\"],");
    let data = read(r, "src/config/translationData.json.ts");
    assert!(!data.contains("Bienvenue"), "fr block left in:\n{data}");
    assert!(!data.contains("./fr/"), "fr import left in:\n{data}");
    assert!(!read(r, "keystatic.config.tsx").contains("blogFR"));
    assert!(!r.join("src/content/blog/fr").exists());
    assert!(!r.join("src/config/fr").exists());
    assert!(!r.join("src/pages/fr").exists());
    assert!(r.join("src/content/blog/en/first-post/index.mdx").exists());
}

#[test]
fn dry_run_json_reports_the_plan_and_writes_nothing() {
    let dir = site_copy();
    let r = dir.path();
    let before = read(r, "astro.config.mjs");
    let out = bin_cmd()
        .args([
            "configure",
            "--default",
            "en",
            "--locales",
            "fr,de",
            "--dry-run",
            "--format",
            "json",
            "--root",
        ])
        .arg(r)
        .output()
        .expect("run configure");
    assert!(out.status.success());
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).expect("valid json");
    assert_eq!(json["dry_run"], true);
    assert_eq!(json["diff"]["to_add"], serde_json::json!(["de"]));
    let ops = json["operations"].as_array().expect("operations");
    assert!(ops
        .iter()
        .any(|op| op["kind"] == "copy" && op["to"] == "src/content/blog/de"));

    assert_eq!(read(r, "astro.config.mjs"), before);
    assert!(!r.join("src/content/blog/de").exists());
}

#[test]
fn interactive_decline_changes_nothing() {
    let dir = site_copy();
    let r = dir.path();
    let before = read(r, "src/config/siteSettings.json.ts");
    bin_cmd()
        .args(["configure", "--root"])
        .arg(r)
        .write_stdin("y\nen\nde\nn\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Please re-run relocale"));

    assert_eq!(read(r, "src/config/siteSettings.json.ts"), before);
    assert!(!r.join("src/config/de").exists());
}

#[test]
fn interactive_empty_confirmation_changes_nothing() {
    let dir = site_copy();
    let r = dir.path();
    let before = read(r, "src/config/siteSettings.json.ts");
    bin_cmd()
        .args(["configure", "--root"])
        .arg(r)
        .write_stdin("y\nen\nde\n\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Please re-run relocale"));

    assert_eq!(read(r, "src/config/siteSettings.json.ts"), before);
    assert!(!r.join("src/config/de").exists());
    assert!(!r.join("src/content/blog/de").exists());
}

#[test]
fn interactive_invalid_default_is_asked_again() {
    let dir = site_copy();
    let r = dir.path();
    bin_cmd()
        .args(["configure", "--root"])
        .arg(r)
        .write_stdin("n\nenglish\nfr\ny\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("invalid locale format"));

    let astro = read(r, "astro.config.mjs");
    assert_contains(&astro, "defaultLocale: \"fr\",");
    assert_contains(&astro, "locales: [\"fr\"],");
    assert!(!r.join("src/content/blog/en").exists());
    assert!(r.join("src/content/blog/fr/first-post/index.mdx").exists());
}

#[test]
fn invalid_default_is_rejected() {
    let dir = site_copy();
    bin_cmd()
        .args(["configure", "--default", "english", "--yes", "--root"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid locale format"));
}

#[test]
fn config_file_can_disable_the_cms_pass() {
    let dir = site_copy();
    let r = dir.path();
    fs::write(r.join("relocale.toml"), "cms_schema = \"\"\n").unwrap();
    let before = read(r, "keystatic.config.tsx");
    bin_cmd()
        .args(["configure", "--default", "en", "--locales", "fr,de", "--yes", "--root"])
        .arg(r)
        .assert()
        .success();
    assert_eq!(read(r, "keystatic.config.tsx"), before);
    assert!(r.join("src/content/blog/de").exists());
}

#[test]
fn schema_dumps_report_schemas() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("schemas");
    bin_cmd()
        .args(["schema", "--out-dir"])
        .arg(&out_dir)
        .assert()
        .success();
    for name in [
        "locale_status.schema.json",
        "diff_report.schema.json",
        "run_summary.schema.json",
    ] {
        let text = fs::read_to_string(out_dir.join(name)).unwrap();
        let _: serde_json::Value = serde_json::from_str(&text).unwrap();
    }
}
