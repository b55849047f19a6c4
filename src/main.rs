use clap::{Parser, ValueEnum};
use codepack::config::{FileSource, OutputTarget, PackConfig};
use codepack::logger::initialize_logger;
use codepack::pack::PackOutcome;
use codepack::utils::format_thousands;
use codepack::{pack_project, summarize};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Root of the project to pack
    #[arg(default_value = ".")]
    project_folder: PathBuf,
    /// Directory for the timestamped output file
    #[arg(env = "CODEPACK_OUTPUT_DIR", default_value = ".")]
    output_folder: PathBuf,
    #[arg(short = 'o', long, help = "Write to this exact file instead of a timestamped one", conflicts_with_all = ["stdout", "clipboard"])]
    output: Option<PathBuf>,
    #[arg(long, help = "Write the document to stdout", conflicts_with = "clipboard")]
    stdout: bool,
    #[arg(short = 'c', long, help = "Copy the document to the clipboard")]
    clipboard: bool,
    #[arg(short = 'i', long = "gitignore", env = "CODEPACK_IGNORE_FILE", help = "Path to a .gitignore-style file (like .llmignore)")]
    ignore_file: Option<PathBuf>,
    #[arg(long, help = "Also ignore common build outputs, dependency folders and lock files")]
    default_ignores: bool,
    #[arg(short = 's', long, value_enum, default_value_t = Source::Walk)]
    source: Source,
    #[arg(short = 'f', long = "file", num_args = 1.., help = "Pack exactly these files (overrides --source)")]
    files: Vec<String>,
    #[arg(long, help = "Show detailed output and read errors")]
    debug: bool,
    #[arg(long, help = "Print the run report as JSON")]
    json: bool,
    #[arg(long, help = "List the selected files without writing anything")]
    dry_run: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    /// Walk the project directory
    Walk,
    /// Use `git ls-files`
    Git,
}

impl CliArgs {
    fn into_config(self) -> PackConfig {
        let source = if !self.files.is_empty() {
            FileSource::Explicit(self.files)
        } else {
            match self.source {
                Source::Walk => FileSource::Walk,
                Source::Git => FileSource::Git,
            }
        };
        let output = if self.stdout {
            OutputTarget::Stdout
        } else if self.clipboard {
            OutputTarget::Clipboard
        } else if let Some(path) = self.output {
            OutputTarget::File(path)
        } else {
            OutputTarget::Directory(self.output_folder)
        };

        PackConfig {
            root: self.project_folder,
            ignore_file: self.ignore_file,
            use_default_ignores: self.default_ignores,
            source,
            output,
            verbose: self.debug,
            dry_run: self.dry_run,
        }
    }
}

fn print_outcome(outcome: &PackOutcome, config: &PackConfig, json: bool) -> Result<(), String> {
    let Some(report) = &outcome.report else {
        for path in outcome.selection.included() {
            println!("{}", path);
        }
        println!(
            "{} files selected, {} excluded",
            format_thousands(outcome.selection.included_count()),
            format_thousands(outcome.selection.excluded_count())
        );
        return Ok(());
    };

    let text = if json {
        serde_json::to_string_pretty(report).map_err(|e| e.to_string())?
    } else {
        let mut text = format!(
            "Packed {}\n{}",
            config.root.display(),
            summarize(report, config.verbose)
        );
        if let Some(destination) = &outcome.destination {
            text.push_str(&format!("Output: {}\n", destination.display()));
        }
        text
    };

    // Keep stdout clean when it carries the document itself.
    if config.output == OutputTarget::Stdout {
        eprintln!("{}", text.trim_end());
    } else {
        println!("{}", text.trim_end());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli_args = CliArgs::parse();
    initialize_logger(cli_args.debug);
    let json = cli_args.json;
    let config = cli_args.into_config();

    match pack_project(config.clone()).await {
        Ok(outcome) => match print_outcome(&outcome, &config, json) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error printing report: {}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
