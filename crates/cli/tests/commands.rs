use assert_cmd::Command;

fn bookstall() -> Command {
    let mut command = Command::cargo_bin("bookstall").unwrap();
    command
        .env("BOOKSTALL_ENV", "local")
        .env("BOOKSTALL_CONFIG_DIR", "does-not-exist")
        .env_remove("BOOKSTALL_SERVER__PORT")
        .env_remove("BOOKSTALL_CATALOG__BASE_URL");
    command
}

fn stdout_of(command: &mut Command) -> String {
    let output = command.output().unwrap();
    assert!(output.status.success(), "command failed: {output:?}");
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn price_prints_the_base_price() {
    let stdout = stdout_of(bookstall().args(["price", "9780140328721"]));
    assert_eq!(stdout.trim(), "4004");
}

#[test]
fn price_uses_the_raw_text() {
    let stdout = stdout_of(bookstall().args(["price", "978-0-14-032872-1"]));
    assert_eq!(stdout.trim(), "1340");
}

#[test]
fn unpriced_identifier_still_exits_cleanly() {
    let stdout = stdout_of(bookstall().args(["price", "9780140328722"]));
    assert_eq!(stdout.trim(), "no price");
}

#[test]
fn normalize_prints_both_forms() {
    let stdout = stdout_of(bookstall().args(["normalize", "0-14-032872-6"]));
    assert!(stdout.contains("isbn10: 0140328726"));
    assert!(stdout.contains("isbn13: 9780140328721"));
}

#[test]
fn normalize_rejects_invalid_isbn() {
    let output = bookstall().args(["normalize", "123"]).output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn normalize_rejects_isbn13_without_isbn10_form() {
    let output = bookstall()
        .args(["normalize", "9791090636071"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn config_prints_effective_settings() {
    let stdout = stdout_of(bookstall().arg("config"));
    let settings: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(settings["server"]["port"], 8080);
    assert_eq!(settings["catalog"]["base_url"], "https://openlibrary.org");
    assert_eq!(settings["catalog"]["timeout_ms"], 3000);
}
