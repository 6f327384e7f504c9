pub mod cli;
pub mod error;
pub mod export;
pub mod ladder;
pub mod report;
pub mod truth_table;
pub mod units;

// Re-export commonly used types
pub use error::{LadderError, Result};
pub use ladder::{
    analyze, compute_output, compute_thevenin, Analysis, InputVoltages, LadderConfig, LogicLevels,
    OutputResult, TheveninResult,
};
pub use report::{display_results, format_report, format_truth_table};
pub use truth_table::{enumerate_truth_table, TruthRow};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
