//! Integration Test: Layering and production-code hygiene
//!
//! **Policy**: The conductor core is UI-agnostic and never blocks the
//! runtime. Production code propagates errors instead of panicking.

use architectural_enforcement::{find_violations, production_sources};

const CORE: &str = "conductor/core/src";
const TUI: &str = "tui/src";

fn report(violations: &[String], what: &str) {
    if !violations.is_empty() {
        for violation in violations {
            eprintln!("  ❌ {violation}");
        }
        panic!("\nFound {} {what} violation(s).", violations.len());
    }
}

#[test]
fn test_sources_are_found() {
    assert!(!production_sources(CORE).is_empty());
    assert!(!production_sources(TUI).is_empty());
}

#[test]
fn test_core_has_no_ui_dependencies() {
    let files = production_sources(CORE);
    let violations = find_violations(&files, &["ratatui::", "crossterm::", "use ratatui", "use crossterm"]);
    report(&violations, "UI dependency");
}

#[test]
fn test_no_thread_sleep() {
    let mut files = production_sources(CORE);
    files.extend(production_sources(TUI));
    let violations = find_violations(&files, &["std::thread::sleep", "thread::sleep("]);
    report(&violations, "blocking sleep");
}

#[test]
fn test_no_unwrap_in_production() {
    let mut files = production_sources(CORE);
    files.extend(production_sources(TUI));
    let violations = find_violations(&files, &[".unwrap()", ".expect("]);
    report(&violations, "unwrap/expect");
}
