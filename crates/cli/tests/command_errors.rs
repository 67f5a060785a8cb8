use std::fs;

use gene_report::commands::{inventory_command, report_command, ReportOptions};
use tempfile::tempdir;

fn options_with_key() -> ReportOptions {
    ReportOptions {
        api_key: Some("test-key".to_string()),
        base_url: None,
        output: None,
    }
}

#[test]
fn report_errors_when_binary_is_missing() {
    let temp = tempdir().unwrap();
    let missing = temp.path().join("missing.bin");
    let inv = temp.path().join("functions.json");
    fs::write(&inv, r#"[{"start": 16, "end": 32, "name": "f"}]"#).unwrap();

    let err = report_command(
        missing.to_str().unwrap(),
        inv.to_str().unwrap(),
        "0x400000",
        options_with_key(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("Failed to open binary"), "unexpected error: {err}");
}

#[test]
fn report_errors_when_inventory_is_missing() {
    let temp = tempdir().unwrap();
    let bin = temp.path().join("sample.bin");
    fs::write(&bin, b"payload").unwrap();

    let err = report_command(
        bin.to_str().unwrap(),
        temp.path().join("missing.json").to_str().unwrap(),
        "0x400000",
        options_with_key(),
    )
    .unwrap_err();
    assert!(
        err.to_string().contains("Failed to read function inventory"),
        "unexpected error: {err}"
    );
}

#[test]
fn report_errors_when_inventory_is_empty() {
    let temp = tempdir().unwrap();
    let bin = temp.path().join("sample.bin");
    let inv = temp.path().join("functions.json");
    fs::write(&bin, b"payload").unwrap();
    fs::write(&inv, "[]").unwrap();

    let err = report_command(
        bin.to_str().unwrap(),
        inv.to_str().unwrap(),
        "0x400000",
        options_with_key(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("contains no functions"), "unexpected error: {err}");
}

#[test]
fn report_errors_on_malformed_image_base() {
    let temp = tempdir().unwrap();
    let bin = temp.path().join("sample.bin");
    let inv = temp.path().join("functions.json");
    fs::write(&bin, b"payload").unwrap();
    fs::write(&inv, r#"[{"start": 16, "end": 32, "name": "f"}]"#).unwrap();

    let err = report_command(
        bin.to_str().unwrap(),
        inv.to_str().unwrap(),
        "not-a-number",
        options_with_key(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("--image-base"), "unexpected error: {err}");
}

#[test]
fn inventory_errors_on_unparsable_json() {
    let temp = tempdir().unwrap();
    let inv = temp.path().join("functions.json");
    fs::write(&inv, "not-json").unwrap();

    let err = inventory_command(inv.to_str().unwrap()).unwrap_err();
    assert!(
        err.to_string().contains("Failed to parse function inventory JSON"),
        "unexpected error: {err}"
    );
}

#[test]
fn inventory_errors_when_a_range_is_inverted() {
    let temp = tempdir().unwrap();
    let inv = temp.path().join("functions.json");
    fs::write(&inv, r#"[{"start": 64, "end": 32, "name": "f"}]"#).unwrap();

    let err = inventory_command(inv.to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("end"), "unexpected error: {err}");
}

#[test]
fn inventory_errors_on_bad_hex_address() {
    let temp = tempdir().unwrap();
    let inv = temp.path().join("functions.json");
    fs::write(&inv, r#"[{"start": "0xzz", "end": 32, "name": "f"}]"#).unwrap();

    let err = inventory_command(inv.to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("start address"), "unexpected error: {err}");
}

#[test]
fn sha256_file_errors_with_context() {
    let temp = tempdir().unwrap();
    let missing = temp.path().join("missing.bin");
    let err = gene_report::sha256_file(&missing).unwrap_err();
    assert!(err.to_string().contains("Failed to open binary for hashing"));
}
