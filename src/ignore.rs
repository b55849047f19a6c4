use crate::candidate::CandidatePath;
use crate::errors::PackError;
use glob::{MatchOptions, Pattern};
use std::fmt;
use std::path::Path;
use tracing::{debug, trace, warn};

pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    "target/",
    "node_modules/",
    "*.pyc",
    "**/__pycache__/",
    "Cargo.lock",
    "package-lock.json",
    "yarn.lock",
    "uv.lock",
    "dist/",
    "build/",
    // Node.js
    "pnpm-lock.yaml",
    // Ruby
    "Gemfile.lock",
    "vendor/",
    // Java
    "*.class",
    // C#/.NET
    "**/bin/",
    "**/obj/",
    // PHP
    "composer.lock",
    // Go
    "go.sum",
];

const SEGMENT_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone)]
enum Segment {
    /// `**`: zero or more whole path segments.
    AnyDepth,
    Glob(Pattern),
}

#[derive(Debug, Clone)]
enum RuleMatcher {
    /// Literal directory anchor: the directory itself and everything below it.
    /// A single-segment, unrooted anchor (`build/`) may start at any depth.
    DirPrefix { parts: Vec<String>, any_depth: bool },
    Segments(Vec<Segment>),
}

#[derive(Debug, Clone)]
pub struct IgnoreRule {
    pub raw: String,
    pub is_negation: bool,
    pub is_dir_anchor: bool,
    pub is_rooted: bool,
    matcher: RuleMatcher,
}

/// A skipped ignore line. Collected, never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternWarning {
    pub line_number: usize,
    pub line: String,
    pub reason: String,
}

impl fmt::Display for PatternWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: '{}': {}", self.line_number, self.line, self.reason)
    }
}

impl IgnoreRule {
    /// Compiles one non-blank, non-comment line.
    pub fn parse(line: &str) -> Result<Self, String> {
        let raw = line.trim();
        let (is_negation, body) = if raw.starts_with("\\#") || raw.starts_with("\\!") {
            (false, &raw[1..])
        } else if let Some(rest) = raw.strip_prefix('!') {
            (true, rest)
        } else {
            (false, raw)
        };

        let is_dir_anchor = body.ends_with('/');
        let body = body.trim_end_matches('/');
        let any_depth = !body.contains('/');
        let is_rooted = body.starts_with('/');
        let body = body.trim_start_matches('/');

        let parts: Vec<&str> = body.split('/').filter(|part| !part.is_empty()).collect();
        if parts.is_empty() {
            return Err("pattern is empty".to_owned());
        }

        let literal = parts
            .iter()
            .all(|part| !part.contains(|c: char| matches!(c, '*' | '?' | '[')));
        let matcher = if is_dir_anchor && literal {
            RuleMatcher::DirPrefix {
                parts: parts.iter().map(|part| part.to_string()).collect(),
                any_depth,
            }
        } else {
            let mut segments = Vec::with_capacity(parts.len() + 1);
            if any_depth {
                segments.push(Segment::AnyDepth);
            }
            for part in parts {
                if part == "**" {
                    segments.push(Segment::AnyDepth);
                } else {
                    let pattern = Pattern::new(part).map_err(|e| e.msg.to_owned())?;
                    segments.push(Segment::Glob(pattern));
                }
            }
            RuleMatcher::Segments(segments)
        };

        Ok(IgnoreRule {
            raw: raw.to_owned(),
            is_negation,
            is_dir_anchor,
            is_rooted,
            matcher,
        })
    }

    /// True when this rule applies to `segments` (the path itself or one of
    /// its ancestor directories).
    pub fn applies_to(&self, segments: &[&str], is_dir: bool) -> bool {
        let own_depth = if is_dir {
            segments.len()
        } else {
            segments.len().saturating_sub(1)
        };

        match &self.matcher {
            RuleMatcher::DirPrefix { parts, any_depth } => {
                if parts.len() > own_depth {
                    return false;
                }
                let last_start = if *any_depth { own_depth - parts.len() } else { 0 };
                (0..=last_start).any(|start| {
                    parts
                        .iter()
                        .zip(&segments[start..])
                        .all(|(want, got)| want == got)
                })
            }
            RuleMatcher::Segments(parts) => {
                let deepest = if self.is_dir_anchor {
                    own_depth
                } else {
                    segments.len()
                };
                (1..=deepest).any(|depth| match segments.get(..depth) {
                    Some(prefix) => match_segments(parts, prefix),
                    None => false,
                })
            }
        }
    }
}

fn match_segments(parts: &[Segment], path: &[&str]) -> bool {
    match parts.split_first() {
        None => path.is_empty(),
        // A trailing `**` covers what is inside, never the directory itself.
        Some((Segment::AnyDepth, [])) => !path.is_empty(),
        Some((Segment::AnyDepth, rest)) => (0..=path.len())
            .any(|skip| path.get(skip..).is_some_and(|tail| match_segments(rest, tail))),
        Some((Segment::Glob(pattern), rest)) => match path.split_first() {
            Some((head, tail)) => {
                pattern.matches_with(head, SEGMENT_OPTIONS) && match_segments(rest, tail)
            }
            None => false,
        },
    }
}

/// Ordered ignore rules for one run. Read-only once compiled.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<IgnoreRule>,
    warnings: Vec<PatternWarning>,
}

impl RuleSet {
    pub fn compile<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rule_set = RuleSet::default();
        rule_set.extend_from_lines(lines);
        debug!("Compiled {} ignore rules", rule_set.rules.len());
        rule_set
    }

    /// Appends the rules of one source. Warning line numbers count from that
    /// source's first line.
    fn extend_from_lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (index, line) in lines.into_iter().enumerate() {
            let line = line.as_ref().trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match IgnoreRule::parse(line) {
                Ok(rule) => {
                    trace!("Compiled ignore rule: {:?}", rule.raw);
                    self.rules.push(rule);
                }
                Err(reason) => {
                    warn!("Skipping ignore pattern '{}' on line {}: {}", line, index + 1, reason);
                    self.warnings.push(PatternWarning {
                        line_number: index + 1,
                        line: line.to_owned(),
                        reason,
                    });
                }
            }
        }
    }

    /// Reads an ignore file. A missing or undecodable file is a configuration error.
    pub fn from_file(path: &Path) -> Result<Self, PackError> {
        let content = read_ignore_file(path)?;
        Ok(Self::compile(content.lines()))
    }

    /// Last matching rule wins; `false` when nothing matches.
    pub fn matches(&self, path: &CandidatePath, is_dir: bool) -> bool {
        let segments = path.segments();
        let mut ignored = false;
        for rule in &self.rules {
            if rule.applies_to(&segments, is_dir) {
                trace!("{} matched by '{}'", path, rule.raw);
                ignored = !rule.is_negation;
            }
        }
        ignored
    }

    pub fn rules(&self) -> &[IgnoreRule] {
        &self.rules
    }

    pub fn warnings(&self) -> &[PatternWarning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

pub fn compile<I, S>(lines: I) -> RuleSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    RuleSet::compile(lines)
}

pub fn matches(path: &CandidatePath, is_dir: bool, rules: &RuleSet) -> bool {
    rules.matches(path, is_dir)
}

/// Builds the run's rule set: built-in defaults first, so the ignore file can
/// negate them.
pub fn load_rules(ignore_file: Option<&Path>, use_defaults: bool) -> Result<RuleSet, PackError> {
    let mut rule_set = RuleSet::default();
    if use_defaults {
        rule_set.extend_from_lines(DEFAULT_IGNORE_PATTERNS);
    }
    if let Some(path) = ignore_file {
        let content = read_ignore_file(path)?;
        rule_set.extend_from_lines(content.lines());
    }
    debug!("Compiled {} ignore rules", rule_set.rules.len());
    Ok(rule_set)
}

fn read_ignore_file(path: &Path) -> Result<String, PackError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        PackError::ConfigError(format!("cannot read ignore file {}: {}", path.display(), e))
    })?;
    debug!("Loaded ignore file: {}", path.display());
    Ok(content)
}
