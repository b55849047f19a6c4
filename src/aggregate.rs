use crate::candidate::CandidatePath;
use crate::errors::{PackError, ReadError};
use crate::reporting::RunReport;
use crate::selection::SelectionResult;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

pub const FENCE: &str = "```";
pub const NON_UTF8_PLACEHOLDER: &str = "[Skipped non-UTF-8 file]";

pub fn error_placeholder(error: &ReadError) -> String {
    match error {
        ReadError::NonUtf8 => NON_UTF8_PLACEHOLDER.to_owned(),
        ReadError::Io(reason) => format!("[Error reading file: {}]", reason),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordBody {
    Text,
    Failed(ReadError),
}

/// One file's block. Contents are never held in memory: the file is checked
/// line by line before anything is written, then streamed to the sink.
#[derive(Debug, Clone)]
pub struct AggregationRecord {
    pub path: CandidatePath,
    pub language_tag: String,
    pub body: RecordBody,
    pub line_count: usize,
    content_bytes: u64,
}

impl AggregationRecord {
    /// Validates the file as UTF-8 and counts its lines.
    pub fn scan(root: &Path, path: &CandidatePath) -> Self {
        let (body, line_count, content_bytes) = match scan_lines(&path.to_path(root)) {
            Ok((lines, bytes)) => (RecordBody::Text, lines, bytes),
            Err(error) => (RecordBody::Failed(error), 0, 0),
        };

        AggregationRecord {
            path: path.clone(),
            language_tag: path.extension(),
            body,
            line_count,
            content_bytes,
        }
    }

    /// Writes the block. Errors are sink failures only; a file that changes or
    /// disappears after [`scan`](Self::scan) turns the record into a failure
    /// and its placeholder line closes the content.
    pub fn write_to<W: Write + ?Sized>(&mut self, root: &Path, sink: &mut W) -> io::Result<()> {
        writeln!(sink, "{}", self.path)?;
        writeln!(sink, "{}{}", FENCE, self.language_tag)?;
        if self.body == RecordBody::Text {
            match stream_lines(&self.path.to_path(root), sink)? {
                Ok((lines, bytes)) => {
                    self.line_count = lines;
                    self.content_bytes = bytes;
                }
                Err(error) => {
                    warn!("{} changed while being read: {}", self.path, error);
                    self.line_count = 0;
                    self.content_bytes = 0;
                    self.body = RecordBody::Failed(error);
                }
            }
        }
        if let RecordBody::Failed(error) = &self.body {
            writeln!(sink, "{}", error_placeholder(error))?;
        }
        writeln!(sink, "{}", FENCE)?;
        writeln!(sink)
    }

    pub fn content_bytes(&self) -> u64 {
        self.content_bytes
    }
}

fn scan_lines(path: &Path) -> Result<(usize, u64), ReadError> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut line = Vec::new();
    let mut lines = 0;
    let mut bytes = 0;
    loop {
        line.clear();
        let n = reader.read_until(b'\n', &mut line)?;
        if n == 0 {
            return Ok((lines, bytes));
        }
        // '\n' never occurs inside a multi-byte sequence, so per-line checks
        // are equivalent to checking the whole file.
        std::str::from_utf8(&line).map_err(|_| ReadError::NonUtf8)?;
        lines += 1;
        bytes += n as u64;
    }
}

/// Outer error: the sink failed. Inner error: the file did.
fn stream_lines<W: Write + ?Sized>(
    path: &Path,
    sink: &mut W,
) -> io::Result<Result<(usize, u64), ReadError>> {
    let mut reader = match File::open(path) {
        Ok(file) => BufReader::new(file),
        Err(e) => return Ok(Err(ReadError::from(e))),
    };
    let mut line = Vec::new();
    let mut lines = 0;
    let mut bytes = 0;
    loop {
        line.clear();
        let n = match reader.read_until(b'\n', &mut line) {
            Ok(n) => n,
            Err(e) => return Ok(Err(ReadError::from(e))),
        };
        if n == 0 {
            return Ok(Ok((lines, bytes)));
        }
        if std::str::from_utf8(&line).is_err() {
            return Ok(Err(ReadError::NonUtf8));
        }
        sink.write_all(&line)?;
        if !line.ends_with(b"\n") {
            sink.write_all(b"\n")?;
        }
        lines += 1;
        bytes += n as u64;
    }
}

struct CountingWriter<'a, W: Write + ?Sized> {
    inner: &'a mut W,
    written: u64,
}

impl<W: Write + ?Sized> Write for CountingWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Streams selected files into a sink, one fenced block per file.
#[derive(Debug, Clone)]
pub struct Aggregator {
    root: PathBuf,
    cancel: Option<Arc<AtomicBool>>,
}

impl Aggregator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Aggregator {
            root: root.into(),
            cancel: None,
        }
    }

    /// Stops between records once `flag` is set.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Only sink failures are errors; unreadable files are recorded in the
    /// report and rendered as a placeholder line.
    pub fn aggregate<W: Write + ?Sized>(
        &self,
        selection: &SelectionResult,
        sink: &mut W,
    ) -> Result<RunReport, PackError> {
        let mut writer = CountingWriter {
            inner: sink,
            written: 0,
        };
        let mut report = RunReport::default();

        for path in selection.included() {
            if self.is_cancelled() {
                return Err(PackError::Cancelled(format!(
                    "stopped after {} of {} files",
                    report.file_count,
                    selection.included_count()
                )));
            }

            debug!("Processing file: {}", path);
            let mut record = AggregationRecord::scan(&self.root, path);
            if let RecordBody::Failed(error) = &record.body {
                warn!("Failed to read file {}: {}", path, error);
            }
            record
                .write_to(&self.root, &mut writer)
                .map_err(|e| PackError::OutputError(e.to_string()))?;
            trace!("Wrote {} lines for {}", record.line_count, path);
            report.record(&record);
        }

        writer
            .flush()
            .map_err(|e| PackError::OutputError(e.to_string()))?;
        report.total_bytes_written = writer.written;
        Ok(report)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|flag| flag.load(Ordering::Relaxed))
            .unwrap_or(false)
    }
}

pub fn aggregate<W: Write + ?Sized>(
    root: &Path,
    selection: &SelectionResult,
    sink: &mut W,
) -> Result<RunReport, PackError> {
    Aggregator::new(root).aggregate(selection, sink)
}
