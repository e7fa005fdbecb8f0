//! Fuzz-style stress tests for FFI surface.
//!
//! Validates that rapid-fire calls, extreme inputs, malformed JSON,
//! and concurrent access don't cause crashes, panics, or memory issues.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::thread;

use dungeon_core::bridge::*;

// ============================================================
// Helpers
// ============================================================

fn cstr(s: &str) -> CString {
    CString::new(s).unwrap()
}

fn is_valid_json(ptr: *mut c_char) -> bool {
    if ptr.is_null() {
        return false;
    }
    let s = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap_or("");
    let valid = serde_json::from_str::<serde_json::Value>(s).is_ok();
    free_string(ptr);
    valid
}

fn ptr_to_string(ptr: *mut c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    let s = unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .unwrap_or("")
        .to_owned();
    free_string(ptr);
    s
}

// ============================================================
// Rapid-fire stress: call FFI functions N times in tight loops
// ============================================================

const RAPID_ITERS: u64 = 200;

#[test]
fn stress_generate_simple_rapid() {
    for i in 0..RAPID_ITERS {
        let ptr = dungeon_generate_simple(i * 7919, 32, 32, 4, 4, 2, 2);
        assert!(is_valid_json(ptr), "seed {} failed", i * 7919);
    }
}

#[test]
fn stress_generate_json_rapid() {
    for i in 0..RAPID_ITERS {
        let config = format!(
            r#"{{"dungeon_size":{{"x":{},"y":{}}},"minimum_room_size":{{"x":5,"y":4}},"path_width":2,"partition_depth":1,"seed":{}}}"#,
            10 + i % 40,
            8 + i % 30,
            i
        );
        let json = cstr(&config);
        let ptr = dungeon_generate(json.as_ptr());
        assert!(is_valid_json(ptr), "config {config} failed");
    }
}

#[test]
fn stress_validate_parameter_sweep() {
    // Mix of valid and invalid sizes; must never crash
    for size in -4..40 {
        for depth in 0..4 {
            let config = format!(
                r#"{{"dungeon_size":{{"x":{size},"y":{size}}},"minimum_room_size":{{"x":4,"y":4}},"partition_depth":{depth}}}"#
            );
            let json = cstr(&config);
            let code = dungeon_validate_config(json.as_ptr());
            let expected = if size >= 4 << depth { 0 } else { 1 };
            assert_eq!(code, expected, "size {size} depth {depth}");
        }
    }
}

#[test]
fn stress_level_seed_sweep() {
    let mut seen = std::collections::HashSet::new();
    for level in 0..1000 {
        seen.insert(dungeon_level_seed(42, level));
    }
    assert_eq!(seen.len(), 1000);
}

// ============================================================
// Malformed input
// ============================================================

#[test]
fn stress_garbage_json() {
    let inputs = [
        "{{{{",
        "\"just a string\"",
        "{\"dungeon_size\": {\"x\": \"a\"}}",
        "{\"partition_depth\": -3}",
        "{\"minimum_room_size\": null}",
        "\u{0}",
    ];
    for input in inputs {
        let Ok(json) = CString::new(input) else {
            continue;
        };
        assert!(dungeon_generate(json.as_ptr()).is_null(), "accepted {input:?}");
        assert!(dungeon_render_ascii(json.as_ptr()).is_null());
    }
}

#[test]
fn stress_log_messages_all_levels() {
    let target = cstr("stress");
    for level in 0..10 {
        let message = cstr(&format!("level {level}"));
        logging_log_message(level, target.as_ptr(), message.as_ptr());
    }
}

// ============================================================
// Concurrency
// ============================================================

#[test]
fn stress_concurrent_generation_is_identical() {
    let config = cstr(r#"{"seed": 1234}"#);
    let expected = ptr_to_string(dungeon_generate(config.as_ptr()));
    assert!(!expected.is_empty());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            thread::spawn(|| {
                let config = cstr(r#"{"seed": 1234}"#);
                ptr_to_string(dungeon_generate(config.as_ptr()))
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn stress_concurrent_mixed_calls() {
    let handles: Vec<_> = (0..4u64)
        .map(|t| {
            thread::spawn(move || {
                for i in 0..25 {
                    let ptr = dungeon_generate_simple(t * 1000 + i, 24, 24, 4, 4, 2, 1);
                    assert!(is_valid_json(ptr));
                    assert!(is_valid_json(dungeon_default_config()));
                    assert!(!ptr_to_string(get_version()).is_empty());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}
