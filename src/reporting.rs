use crate::aggregate::{AggregationRecord, RecordBody};
use crate::candidate::CandidatePath;
use crate::errors::ReadError;
use crate::trie::{Trie, TrieNode};
use crate::utils::{format_thousands, human_readable_size};
use serde::Serialize;
use std::fmt::{self, Write};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileError {
    pub path: CandidatePath,
    pub reason: ReadError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileStat {
    pub path: CandidatePath,
    pub lines: usize,
    pub bytes: u64,
}

/// Totals for one aggregation run, in output order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub file_count: usize,
    pub total_lines: usize,
    pub total_bytes_written: u64,
    pub errors: Vec<FileError>,
    pub files: Vec<FileStat>,
}

impl RunReport {
    pub fn record(&mut self, record: &AggregationRecord) {
        self.file_count += 1;
        self.total_lines += record.line_count;
        if let RecordBody::Failed(reason) = &record.body {
            self.errors.push(FileError {
                path: record.path.clone(),
                reason: reason.clone(),
            });
        }
        self.files.push(FileStat {
            path: record.path.clone(),
            lines: record.line_count,
            bytes: record.content_bytes(),
        });
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

/// Renders the run summary. `verbose` adds the error listing and a per-directory
/// line breakdown.
pub fn summarize(report: &RunReport, verbose: bool) -> String {
    let mut out = String::new();
    // Formatting into a String cannot fail.
    write_summary(&mut out, report, verbose).ok();
    out
}

pub fn write_summary<W: Write>(out: &mut W, report: &RunReport, verbose: bool) -> fmt::Result {
    writeln!(out, "Processed {} files", format_thousands(report.file_count))?;
    writeln!(out, "Total lines: {}", format_thousands(report.total_lines))?;
    writeln!(
        out,
        "Output size: {}",
        human_readable_size(report.total_bytes_written)
    )?;
    writeln!(out, "Read errors: {}", report.error_count())?;

    if !verbose {
        return Ok(());
    }

    if !report.errors.is_empty() {
        writeln!(out, "\n--- Read Errors ---")?;
        for error in &report.errors {
            writeln!(out, "{} [{}]", error.path, error.reason)?;
        }
    }

    if !report.files.is_empty() {
        let mut trie = Trie::new();
        for file in &report.files {
            trie.insert(&file.path, file.lines);
        }
        let root = trie.get_root();
        writeln!(
            out,
            "\n--- Files ---\nOverall ({} lines)",
            format_thousands(root.calculate_total_lines())
        )?;
        write_tree(out, root, "")?;
    }
    Ok(())
}

fn write_tree<W: Write>(out: &mut W, node: &TrieNode, prefix: &str) -> fmt::Result {
    let count = node.children.len();
    for (i, (name, child)) in node.children.iter().enumerate() {
        let is_last = i + 1 == count;
        let connector = if is_last { "┗━━" } else { "┣━━" };

        match child.line_count {
            Some(lines) if child.children.is_empty() => {
                writeln!(
                    out,
                    "{}{} {} ({} lines)",
                    prefix,
                    connector,
                    name,
                    format_thousands(lines)
                )?;
            }
            _ => {
                writeln!(
                    out,
                    "{}{} 📂 {} ({} lines)",
                    prefix,
                    connector,
                    name,
                    format_thousands(child.calculate_total_lines())
                )?;
                let child_prefix = format!("{}{}    ", prefix, if is_last { " " } else { "┃" });
                write_tree(out, child, &child_prefix)?;
            }
        }
    }
    Ok(())
}
