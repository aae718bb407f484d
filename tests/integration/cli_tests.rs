//! Exit behavior of the `crawler` binary for bad arguments

use std::process::Command;

fn crawler() -> Command {
    Command::new(env!("CARGO_BIN_EXE_crawler"))
}

#[test]
fn test_missing_positionals_exit_non_zero() {
    let output = crawler()
        .arg("https://example.com")
        .output()
        .expect("run crawler");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.to_lowercase().contains("usage"));
}

#[test]
fn test_non_positive_concurrency_rejected() {
    let output = crawler()
        .args(["https://example.com", "0", "10"])
        .output()
        .expect("run crawler");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("max_concurrency"));
    assert!(stderr.contains("usage: crawler"));
}

#[test]
fn test_unparseable_base_url_rejected() {
    let output = crawler()
        .args(["not a url", "2", "10"])
        .output()
        .expect("run crawler");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error parsing base URL"));
}

#[test]
fn test_unknown_option_rejected() {
    let output = crawler()
        .args(["https://example.com", "2", "10", "colour=blue"])
        .output()
        .expect("run crawler");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("colour"));
}
