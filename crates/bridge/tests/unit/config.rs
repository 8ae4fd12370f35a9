//! # Configuration Store Tests
//!
//! Dotted-path traversal, typed accessors and the core count.

use serde_json::json;
use stackbridge_core::common::LookupError;
use stackbridge_core::config::scalar_text;
use stackbridge_core::{BridgeError, ConfigStore};

use crate::common::{L2Setup, config};

#[test]
fn test_lookup_mixes_keys_and_indices() {
    let config = config(2, L2Setup::None);
    assert_eq!(config.int("system.cpu.1.issueWidth"), Ok(8));
    assert_eq!(config.int("system.mem_ctrls.0.dram.burst_length"), Ok(8));
    assert_eq!(config.string("system.cpu.0.isa.0.type"), Ok("X86ISA"));
}

#[test]
fn test_lookup_reports_failing_segment() {
    let config = config(1, L2Setup::None);
    assert_eq!(
        config.lookup("system.cpu.0.missing.key"),
        Err(LookupError::MissingKey {
            path: "system.cpu.0.missing.key".to_owned(),
            segment: "missing".to_owned(),
        })
    );
    assert_eq!(
        config.lookup("system.cpu.3.issueWidth"),
        Err(LookupError::BadIndex {
            path: "system.cpu.3.issueWidth".to_owned(),
            segment: "3".to_owned(),
        })
    );
}

#[test]
fn test_numeric_segment_on_mapping_is_bad_index() {
    let config = config(1, L2Setup::None);
    assert!(matches!(config.lookup("system.0"), Err(LookupError::BadIndex { .. })));
}

#[test]
fn test_typed_accessors() {
    let config = ConfigStore::from_value(json!({
        "a": { "int": 4, "whole": 8.0, "frac": 0.5, "text": "O3", "flag": true, "seq": [1, 2, 3] }
    }));
    assert_eq!(config.int("a.int"), Ok(4));
    assert_eq!(config.int("a.whole"), Ok(8));
    assert!(matches!(config.int("a.frac"), Err(LookupError::WrongType { .. })));
    assert_eq!(config.float("a.frac"), Ok(0.5));
    assert_eq!(config.len_of("a.seq"), Ok(3));
    assert!(matches!(config.string("a.int"), Err(LookupError::WrongType { .. })));
    assert!(config.contains("a.seq.2"));
    assert!(!config.contains("a.seq.3"));
}

#[test]
fn test_scalar_text() {
    assert_eq!(scalar_text(&json!(64)), Some("64".to_owned()));
    assert_eq!(scalar_text(&json!(1.0)), Some("1.0".to_owned()));
    assert_eq!(scalar_text(&json!(0.9)), Some("0.9".to_owned()));
    assert_eq!(scalar_text(&json!(true)), Some("1".to_owned()));
    assert_eq!(scalar_text(&json!(false)), Some("0".to_owned()));
    assert_eq!(scalar_text(&json!("system.clk_domain")), Some("system.clk_domain".to_owned()));
    assert_eq!(scalar_text(&json!(null)), None);
    assert_eq!(scalar_text(&json!([1])), None);
}

#[test]
fn test_num_cores() {
    assert_eq!(config(4, L2Setup::None).num_cores().unwrap(), 4);
}

#[test]
fn test_num_cores_missing_or_empty_is_fatal() {
    let missing = ConfigStore::from_value(json!({ "system": {} }));
    assert!(matches!(missing.num_cores(), Err(BridgeError::MissingSection { .. })));

    let empty = ConfigStore::from_value(json!({ "system": { "cpu": [] } }));
    assert!(matches!(empty.num_cores(), Err(BridgeError::MissingSection { .. })));
}

#[test]
fn test_parse_rejects_invalid_json() {
    assert!(matches!(ConfigStore::parse("{ not json"), Err(BridgeError::ConfigSyntax(_))));
}
