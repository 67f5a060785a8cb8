use std::collections::BTreeMap;
use std::fs;

use gene_core::export::{export, render};
use gene_core::model::{CorrelationMap, FunctionRecord};
use tempfile::tempdir;

fn sample_map() -> CorrelationMap {
    let mut map = BTreeMap::new();
    map.insert(
        "0x401000".to_string(),
        FunctionRecord {
            relative_address: 0x1000,
            function_address: 0x401000,
            function_name: "decrypt_config".to_string(),
            software_type: vec!["malware".to_string(), "trojan".to_string()],
            code_reuse: vec!["Family.A".to_string(), "Family.B".to_string()],
        },
    );
    map.insert(
        "0x40f000".to_string(),
        FunctionRecord {
            relative_address: 0xf000,
            function_address: 0x40f000,
            function_name: String::new(),
            software_type: vec!["library".to_string()],
            code_reuse: vec![],
        },
    );
    map
}

#[test]
fn render_is_byte_identical_across_runs() {
    let map = sample_map();
    let first = render(&map, false).unwrap();
    let second = render(&map, false).unwrap();
    assert_eq!(first, second);
}

#[test]
fn software_type_is_comma_joined() {
    let document = render(&sample_map(), false).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&document).unwrap();
    assert_eq!(parsed["genes"][0]["software_type"], "malware,trojan");
}

#[test]
fn code_reuse_keeps_the_full_ordered_sequence() {
    let document = render(&sample_map(), false).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&document).unwrap();
    assert_eq!(
        parsed["genes"][0]["code_reuse"],
        serde_json::json!(["Family.A", "Family.B"])
    );
}

#[test]
fn unresolved_names_are_omitted_not_fatal() {
    let document = render(&sample_map(), false).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&document).unwrap();

    let genes = parsed["genes"].as_array().unwrap();
    assert_eq!(genes.len(), 2, "the unresolved entry is still exported");
    assert!(genes[0].get("function_name").is_some());
    assert!(genes[1].get("function_name").is_none(), "empty names are skipped");
    assert_eq!(genes[1]["function_address"], "0x40f000");
}

#[test]
fn partial_flag_is_disclosed_in_the_artifact() {
    let partial = render(&sample_map(), true).unwrap();
    let complete = render(&sample_map(), false).unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&partial).unwrap();
    assert_eq!(parsed["partial_result"], true);
    let parsed: serde_json::Value = serde_json::from_str(&complete).unwrap();
    assert_eq!(parsed["partial_result"], false);
}

#[test]
fn export_writes_the_rendered_document() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("genes.json");
    let map = sample_map();

    export(&map, true, &path).unwrap();

    let written = fs::read_to_string(&path).unwrap();
    assert_eq!(written, render(&map, true).unwrap());
    assert!(written.ends_with('\n'));
}

#[test]
fn export_fails_with_path_context_when_unwritable() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("no_such_dir").join("genes.json");

    let err = export(&sample_map(), false, &path).unwrap_err();
    assert!(err.to_string().contains("Failed to write gene report"));
}

#[test]
fn empty_map_renders_an_empty_gene_list() {
    let document = render(&BTreeMap::new(), false).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&document).unwrap();
    assert_eq!(parsed["genes"].as_array().unwrap().len(), 0);
}
