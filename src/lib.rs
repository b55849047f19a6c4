pub mod aggregate;
pub mod candidate;
pub mod config;
pub mod errors;
pub mod ignore;
pub mod lister;
pub mod logger;
pub mod output;
pub mod pack;
pub mod reporting;
pub mod selection;
pub mod trie;
pub mod utils;
pub mod walk;

pub use aggregate::{aggregate, Aggregator};
pub use candidate::CandidatePath;
pub use config::{FileSource, OutputTarget, PackConfig};
pub use errors::PackError;
pub use ignore::RuleSet;
pub use pack::pack_project;
pub use reporting::{summarize, RunReport};
pub use selection::SelectionResult;
