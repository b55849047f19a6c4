use crate::config::OutputTarget;
use crate::errors::PackError;
use arboard::Clipboard;
use chrono::{DateTime, Local};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

enum SinkKind {
    File {
        writer: BufWriter<NamedTempFile>,
        destination: PathBuf,
    },
    Stdout(io::Stdout),
    Clipboard(Vec<u8>),
}

/// Where the document goes. File targets are staged in a temporary file next
/// to the destination and only appear under their final name in [`finish`].
///
/// [`finish`]: OutputSink::finish
pub struct OutputSink {
    kind: SinkKind,
}

impl OutputSink {
    pub fn open(target: &OutputTarget, root: &Path) -> Result<Self, PackError> {
        let kind = match target {
            OutputTarget::Directory(dir) => {
                let destination = dir.join(timestamped_name(root, Local::now()));
                staged_file(destination)?
            }
            OutputTarget::File(path) => staged_file(path.clone())?,
            OutputTarget::Stdout => SinkKind::Stdout(io::stdout()),
            OutputTarget::Clipboard => SinkKind::Clipboard(Vec::new()),
        };
        Ok(OutputSink { kind })
    }

    pub fn writer(&mut self) -> &mut dyn Write {
        match &mut self.kind {
            SinkKind::File { writer, .. } => writer,
            SinkKind::Stdout(stdout) => stdout,
            SinkKind::Clipboard(buffer) => buffer,
        }
    }

    /// Publishes the document. Returns the artifact path for file targets.
    pub fn finish(self) -> Result<Option<PathBuf>, PackError> {
        match self.kind {
            SinkKind::File {
                writer,
                destination,
            } => {
                let staged = writer
                    .into_inner()
                    .map_err(|e| PackError::OutputError(e.error().to_string()))?;
                staged
                    .persist(&destination)
                    .map_err(|e| PackError::OutputError(e.error.to_string()))?;
                info!("Wrote {}", destination.display());
                Ok(Some(destination))
            }
            SinkKind::Stdout(mut stdout) => {
                stdout
                    .flush()
                    .map_err(|e| PackError::OutputError(e.to_string()))?;
                Ok(None)
            }
            SinkKind::Clipboard(buffer) => {
                let text = String::from_utf8(buffer)
                    .map_err(|e| PackError::OutputError(e.to_string()))?;
                let mut clipboard =
                    Clipboard::new().map_err(|e| PackError::ClipboardError(e.to_string()))?;
                clipboard
                    .set_text(text)
                    .map_err(|e| PackError::ClipboardError(e.to_string()))?;
                info!("Output copied to clipboard.");
                Ok(None)
            }
        }
    }
}

fn staged_file(destination: PathBuf) -> Result<SinkKind, PackError> {
    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(|e| {
        PackError::ConfigError(format!("cannot create output directory {}: {}", dir.display(), e))
    })?;
    let staged = NamedTempFile::new_in(&dir).map_err(|e| {
        PackError::ConfigError(format!("output location {} is not writable: {}", dir.display(), e))
    })?;
    debug!("Staging output in {}", staged.path().display());
    Ok(SinkKind::File {
        writer: BufWriter::new(staged),
        destination,
    })
}

/// `<root-name>_<YYYY-MM-DD_HHMMSS>.md`
pub fn timestamped_name(root: &Path, now: DateTime<Local>) -> String {
    let name = root
        .canonicalize()
        .ok()
        .and_then(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "project".to_owned());
    format!("{}_{}.md", name, now.format("%Y-%m-%d_%H%M%S"))
}
