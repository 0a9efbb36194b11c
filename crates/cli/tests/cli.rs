use assert_cmd::Command;
use tempfile::TempDir;

fn catalog(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("catalog").unwrap();
    let url = format!("sqlite://{}", config_dir.path().join("catalog.db").display());
    cmd.env_remove("CATALOG_ENV")
        .env_remove("CATALOG_CONFIG_DIR")
        .env("CATALOG_DATABASE__URL", url)
        .env("RUST_LOG", "warn")
        .arg("--config-dir")
        .arg(config_dir.path());
    cmd
}

#[test]
fn help_lists_subcommands() {
    let output = Command::cargo_bin("catalog")
        .unwrap()
        .arg("--help")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    for command in ["serve", "migrate", "openapi"] {
        assert!(stdout.contains(command), "missing {command} in help");
    }
}

#[test]
fn migrate_applies_each_migration_once() {
    let dir = TempDir::new().unwrap();

    let first = catalog(&dir).arg("migrate").output().unwrap();
    assert!(first.status.success(), "{}", String::from_utf8_lossy(&first.stderr));
    assert!(String::from_utf8_lossy(&first.stdout).contains("applied 6 migration(s)"));
    assert!(dir.path().join("catalog.db").exists());

    let second = catalog(&dir).arg("migrate").output().unwrap();
    assert!(second.status.success());
    assert!(String::from_utf8_lossy(&second.stdout).contains("applied 0 migration(s)"));
}

#[test]
fn openapi_prints_every_module() {
    let dir = TempDir::new().unwrap();
    let output = catalog(&dir).arg("openapi").output().unwrap();
    assert!(output.status.success());

    let document: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    for path in [
        "/api/countries",
        "/api/categories/{id}/books",
        "/api/books/{id}/rating",
        "/api/reviewers/{id}/reviewer",
        "/api/reviews/books/{id}",
    ] {
        assert!(document["paths"].get(path).is_some(), "missing {path}");
    }
}

#[test]
fn unknown_environment_fails() {
    let dir = TempDir::new().unwrap();
    catalog(&dir)
        .args(["--env", "moon", "migrate"])
        .assert()
        .failure();
}
