//! Hygiene: source-scan budgets for production code.
//!
//! Scans `src/` (excluding `*_test.rs`) for patterns that crash the server
//! or drop errors silently. Comment lines are ignored. Budgets only go down.

use std::fs;
use std::path::Path;

struct Budget {
    pattern: &'static str,
    max: usize,
}

/// Panics: a request handler must never take the process down.
const PANICS: [Budget; 6] = [
    Budget { pattern: ".unwrap()", max: 0 },
    Budget { pattern: ".expect(", max: 0 },
    Budget { pattern: "panic!(", max: 0 },
    Budget { pattern: "unreachable!(", max: 0 },
    Budget { pattern: "todo!(", max: 0 },
    Budget { pattern: "unimplemented!(", max: 0 },
];

/// Silent loss: errors discarded without being inspected or logged.
const SILENT_LOSS: [Budget; 2] = [Budget { pattern: "let _ =", max: 0 }, Budget { pattern: ".ok()", max: 0 }];

const STRUCTURE: [Budget; 2] = [
    Budget { pattern: "#[allow(dead_code)]", max: 0 },
    Budget { pattern: "std::env::set_var", max: 0 },
];

struct SourceFile {
    path: String,
    content: String,
}

fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect_rs_files(Path::new("src"), &mut files);
    files
}

fn collect_rs_files(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rs_files(&path, out);
            continue;
        }
        let path_str = path.to_string_lossy().to_string();
        if !path_str.ends_with(".rs") || path_str.ends_with("_test.rs") {
            continue;
        }
        if let Ok(content) = fs::read_to_string(&path) {
            out.push(SourceFile { path: path_str, content });
        }
    }
}

/// Lines containing `pattern`, per file, skipping comments.
fn hits(files: &[SourceFile], pattern: &str) -> Vec<(String, usize)> {
    files
        .iter()
        .filter_map(|file| {
            let count = file
                .content
                .lines()
                .filter(|line| !line.trim_start().starts_with("//"))
                .filter(|line| line.contains(pattern))
                .count();
            (count > 0).then(|| (file.path.clone(), count))
        })
        .collect()
}

fn check(budgets: &[Budget]) {
    let files = source_files();
    assert!(!files.is_empty(), "no sources found; run from the crate root");

    let mut failures = Vec::new();
    for budget in budgets {
        let found = hits(&files, budget.pattern);
        let count: usize = found.iter().map(|(_, c)| c).sum();
        if count > budget.max {
            let detail: Vec<String> = found.iter().map(|(path, c)| format!("  {path}: {c}")).collect();
            failures.push(format!("`{}`: found {count}, max {}\n{}", budget.pattern, budget.max, detail.join("\n")));
        }
    }
    assert!(failures.is_empty(), "hygiene budget exceeded:\n{}", failures.join("\n"));
}

#[test]
fn panic_budgets() {
    check(&PANICS);
}

#[test]
fn silent_loss_budgets() {
    check(&SILENT_LOSS);
}

#[test]
fn structure_budgets() {
    check(&STRUCTURE);
}
