//! End-to-end tests for the `init` command.

mod common;
use common::prelude::*;

/// init creates a starter configuration that parses.
#[test]
fn test_init_creates_config() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .arg("init")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Created .legacy-link.yaml"));

    assert!(fixture.config_path().exists());

    // The generated file is a valid configuration
    fixture.command().arg("ls").assert().code(0);
}

/// init over an existing file fails without --force in a non-interactive
/// session (the confirmation prompt cannot be answered).
#[test]
fn test_init_existing_without_force_fails_non_interactive() {
    let fixture = TestFixture::new().with_config("environment: old\ntasks: []\n");

    fixture.command().arg("init").assert().code(1);

    // The existing file is untouched
    let content = std::fs::read_to_string(fixture.config_path()).unwrap();
    assert!(content.contains("environment: old"));
}

/// init --force overwrites an existing file.
#[test]
fn test_init_force_overwrites() {
    let fixture = TestFixture::new().with_config("environment: old\ntasks: []\n");

    fixture
        .command()
        .arg("init")
        .arg("--force")
        .assert()
        .code(0);

    let content = std::fs::read_to_string(fixture.config_path()).unwrap();
    assert!(content.contains("environment: dev"));
    assert!(content.contains("tasks:"));
}

/// init --path writes to the given location.
#[test]
fn test_init_custom_path() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .arg("init")
        .arg("--path")
        .arg("custom.yaml")
        .assert()
        .code(0);

    assert!(fixture.path().join("custom.yaml").exists());
    assert!(!fixture.config_path().exists());
}
