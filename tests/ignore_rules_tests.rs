use codepack::candidate::CandidatePath;
use codepack::errors::PackError;
use codepack::ignore::{compile, load_rules, matches, IgnoreRule, RuleSet};
use tempfile::tempdir;
use tracing_test::traced_test;

fn path(raw: &str) -> CandidatePath {
    CandidatePath::new(raw).unwrap_or_else(|| panic!("invalid test path {}", raw))
}

fn ignored(rules: &RuleSet, raw: &str) -> bool {
    rules.matches(&path(raw), false)
}

#[test]
fn test_bare_pattern_matches_at_any_depth() {
    let rules = RuleSet::compile(["*.log", "Cargo.lock"]);

    assert!(ignored(&rules, "run.log"));
    assert!(ignored(&rules, "a/b/c/notes.log"));
    assert!(ignored(&rules, "crates/core/Cargo.lock"));
    assert!(!ignored(&rules, "run.log.txt"));
    assert!(!ignored(&rules, "src/main.rs"));
}

#[test]
fn test_later_negation_wins() {
    let rules = RuleSet::compile(["*.log", "!keep.log"]);
    assert!(ignored(&rules, "a/drop.log"));
    assert!(!ignored(&rules, "a/keep.log"));
    assert!(!ignored(&rules, "keep.log"));

    let reversed = compile(["!keep.log", "*.log"]);
    assert!(
        matches(&path("keep.log"), false, &reversed),
        "an earlier negation must not override a later exclusion"
    );
}

#[test]
fn test_directory_anchor_matches_by_prefix() {
    let rules = RuleSet::compile(["b/"]);

    assert!(rules.matches(&path("b"), true));
    assert!(!rules.matches(&path("b"), false), "a file named b is not a directory");
    assert!(ignored(&rules, "b/c.py"));
    assert!(ignored(&rules, "b/deep/er/file.txt"));
    assert!(ignored(&rules, "a/b/c.py"), "a bare directory name matches at any depth");
    assert!(!ignored(&rules, "bb/c.py"));
    assert!(!ignored(&rules, "a/bb/c.py"));

    let rooted = RuleSet::compile(["/b/"]);
    assert!(ignored(&rooted, "b/c.py"));
    assert!(!ignored(&rooted, "a/b/c.py"));

    let nested = RuleSet::compile(["src/gen/"]);
    assert!(ignored(&nested, "src/gen/out.rs"));
    assert!(!ignored(&nested, "lib/src/gen/out.rs"));
}

#[test]
fn test_trailing_double_star_matches_contents_only() {
    let rules = RuleSet::compile(["foo/**"]);

    assert!(!rules.matches(&path("foo"), true));
    assert!(rules.matches(&path("foo/sub"), true));
    assert!(ignored(&rules, "foo/a.txt"));
    assert!(ignored(&rules, "foo/sub/b.txt"));
    assert!(!ignored(&rules, "foo"));
    assert!(!ignored(&rules, "bar/foo/a.txt"));
}

#[test]
fn test_glob_directory_anchor_matches_nested_directories() {
    let rules = RuleSet::compile(["**/__pycache__/"]);

    assert!(rules.matches(&path("__pycache__"), true));
    assert!(rules.matches(&path("pkg/sub/__pycache__"), true));
    assert!(ignored(&rules, "pkg/__pycache__/mod.cpython-312.pyc"));
    assert!(!ignored(&rules, "pkg/__pycache__"), "a file with the same name is kept");

    let unprefixed = RuleSet::compile(["*.egg-info/"]);
    assert!(unprefixed.matches(&path("lib/pkg.egg-info"), true));
    assert!(ignored(&unprefixed, "lib/pkg.egg-info/PKG-INFO"));
}

#[test]
fn test_single_star_stays_within_a_segment() {
    let rules = RuleSet::compile(["src/*.rs"]);
    assert!(ignored(&rules, "src/main.rs"));
    assert!(!ignored(&rules, "src/bin/tool.rs"));
    assert!(!ignored(&rules, "lib/src/main.rs"));

    let recursive = RuleSet::compile(["src/**/*.rs"]);
    assert!(ignored(&recursive, "src/main.rs"));
    assert!(ignored(&recursive, "src/bin/deep/tool.rs"));
    assert!(!ignored(&recursive, "src/bin/README.md"));
}

#[test]
fn test_leading_slash_roots_the_pattern() {
    let rules = RuleSet::compile(["/TODO.md"]);
    assert!(rules.rules()[0].is_rooted);
    assert!(ignored(&rules, "TODO.md"));
    assert!(!ignored(&rules, "docs/TODO.md"));
}

#[test]
fn test_files_under_an_ignored_directory_are_ignored() {
    let rules = RuleSet::compile(["logs"]);
    assert!(ignored(&rules, "logs/today.txt"));
    assert!(ignored(&rules, "service/logs/today.txt"));
    assert!(!ignored(&rules, "logbook/today.txt"));
}

#[test]
fn test_comments_and_blank_lines_are_dropped() {
    let rules = RuleSet::compile(["# build output", "", "    ", "\t"]);
    assert!(rules.is_empty());
    assert!(rules.warnings().is_empty());
    assert!(!ignored(&rules, "anything.txt"));
}

#[test]
fn test_escaped_markers_are_literal() {
    let rules = RuleSet::compile(["\\#notes.txt", "\\!important.txt"]);
    assert!(ignored(&rules, "#notes.txt"));
    assert!(ignored(&rules, "docs/!important.txt"));
    assert!(rules.rules().iter().all(|rule| !rule.is_negation));
}

#[test]
fn test_rule_flags() {
    let rule = IgnoreRule::parse("!/build/").unwrap_or_else(|e| panic!("parse failed: {}", e));
    assert_eq!(rule.raw, "!/build/");
    assert!(rule.is_negation);
    assert!(rule.is_dir_anchor);
    assert!(rule.is_rooted);

    let rule = IgnoreRule::parse("*.tmp").unwrap_or_else(|e| panic!("parse failed: {}", e));
    assert!(!rule.is_negation);
    assert!(!rule.is_dir_anchor);
    assert!(!rule.is_rooted);
}

#[test]
#[traced_test]
fn test_malformed_lines_are_skipped_with_warning() {
    let rules = RuleSet::compile(["[abc", "*.tmp", "!", "/"]);

    assert_eq!(rules.rules().len(), 1, "only '*.tmp' should compile");
    assert!(ignored(&rules, "x/cache.tmp"));

    let warnings = rules.warnings();
    assert_eq!(warnings.len(), 3);
    assert_eq!(warnings[0].line_number, 1);
    assert_eq!(warnings[0].line, "[abc");
    assert_eq!(warnings[1].line_number, 3);
    assert_eq!(warnings[1].reason, "pattern is empty");
    assert!(logs_contain("Skipping ignore pattern '[abc'"));
}

#[test]
fn test_from_file_reads_patterns() {
    let dir = tempdir().unwrap();
    let ignore_path = dir.path().join(".llmignore");
    std::fs::write(&ignore_path, "# generated\n*.log\n\nbuild/\n!build/keep.txt\n").unwrap();

    let rules = RuleSet::from_file(&ignore_path).unwrap();
    assert_eq!(rules.rules().len(), 3);
    assert!(ignored(&rules, "tmp/out.log"));
    assert!(ignored(&rules, "build/a.o"));
    assert!(!ignored(&rules, "build/keep.txt"));
}

#[test]
fn test_missing_ignore_file_is_a_config_error() {
    let dir = tempdir().unwrap();
    let result = RuleSet::from_file(&dir.path().join("nope.ignore"));
    assert!(
        matches!(result, Err(PackError::ConfigError(_))),
        "expected ConfigError, got {:?}",
        result
    );
}

#[test]
fn test_default_patterns_can_be_negated_by_the_ignore_file() {
    let dir = tempdir().unwrap();
    let ignore_path = dir.path().join("extra.ignore");
    std::fs::write(&ignore_path, "!Cargo.lock\n").unwrap();

    let defaults_only = load_rules(None, true).unwrap();
    assert!(ignored(&defaults_only, "Cargo.lock"));
    assert!(defaults_only.matches(&path("target"), true));
    assert!(defaults_only.matches(&path("app/bin"), true));

    let combined = load_rules(Some(&ignore_path), true).unwrap();
    assert!(!ignored(&combined, "Cargo.lock"));
    assert!(ignored(&combined, "target/debug/app"));

    let nothing = load_rules(None, false).unwrap();
    assert!(nothing.is_empty());
}

#[test]
#[traced_test]
fn test_warning_line_numbers_refer_to_the_ignore_file() {
    let dir = tempdir().unwrap();
    let ignore_path = dir.path().join(".llmignore");
    std::fs::write(&ignore_path, "*.tmp\n[abc\n").unwrap();

    let rules = load_rules(Some(&ignore_path), true).unwrap();
    let warnings = rules.warnings();

    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].line_number, 2);
    assert_eq!(warnings[0].line, "[abc");
    assert!(logs_contain("Skipping ignore pattern '[abc' on line 2"));
    assert!(ignored(&rules, "x/cache.tmp"));
    assert!(ignored(&rules, "Cargo.lock"));
}

#[test]
fn test_candidate_path_normalization() {
    assert_eq!(CandidatePath::new("./a/./b.txt").map(|p| p.to_string()), Some("a/b.txt".to_owned()));
    assert_eq!(CandidatePath::new("a//b/").map(|p| p.to_string()), Some("a/b".to_owned()));
    assert_eq!(CandidatePath::new("a/../b").map(|p| p.to_string()), Some("b".to_owned()));
    assert_eq!(CandidatePath::new("a\\b.rs").map(|p| p.to_string()), Some("a/b.rs".to_owned()));
    assert!(CandidatePath::new("../escape.txt").is_none());
    assert!(CandidatePath::new("/etc/passwd").is_none());
    assert!(CandidatePath::new("").is_none());
    assert!(CandidatePath::new(".").is_none());
}
