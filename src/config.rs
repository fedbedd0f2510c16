// Run configuration: pipeline toggles plus where input and output live.
use clap::ValueEnum;
use std::time::Duration;

pub const DEFAULT_OUTPUT: &str = "rrt.json";
pub const SHEET_ID_VAR: &str = "SHEET_ID";
/// The published export carries a grouped role header above the column
/// header; both come before the data rows.
pub const DEFAULT_SKIP_ROWS: usize = 2;

/// How the aggregator decides a row starts a new division.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ChangePolicy {
    /// Any difference from the open division's raw label.
    Raw,
    /// Only when the label no longer starts with the open division's
    /// rebuilt `"<name> <suffix>"` label.
    Reconstructed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DuplicatePolicy {
    /// Warn and drop the repeated ward.
    Skip,
    /// Abort the run.
    Fail,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineOptions {
    pub change_policy: ChangePolicy,
    pub duplicates: DuplicatePolicy,
    pub resolve_names: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            change_policy: ChangePolicy::Reconstructed,
            duplicates: DuplicatePolicy::Skip,
            resolve_names: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    Sheet(String),
    File(String),
}

#[derive(Clone, Debug)]
pub struct RunConfig {
    pub source: Source,
    pub skip_rows: usize,
    pub output: String,
    pub pretty: bool,
    pub directory_url: String,
    pub timeout: Option<Duration>,
    pub preview: usize,
    pub pipeline: PipelineOptions,
}
