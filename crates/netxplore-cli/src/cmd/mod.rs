pub mod analyze;
pub mod communities;
pub mod compare;
pub mod completions;
pub mod parse;

use std::path::Path;

use anyhow::Context;
use clap::Args;
use netxplore_core::config::{AnalysisConfig, resolve_config};
use netxplore_core::error::AnalysisError;
use netxplore_core::filter::{FilterSpec, RawFilterParams};
use netxplore_graph::{NetworkAnalysis, analyze_file};

use crate::output::{CliError, OutputMode, render_error};

/// Filter flags shared by every analysis subcommand.
#[derive(Args, Debug, Clone, Default)]
#[command(next_help_heading = "Filters")]
pub struct FilterArgs {
    /// Keep messages at or after this date (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub start_date: Option<String>,

    /// Time of day for --start-date (HH:MM or HH:MM:SS).
    #[arg(long, value_name = "TIME")]
    pub start_time: Option<String>,

    /// Keep messages at or before this date (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub end_date: Option<String>,

    /// Time of day for --end-date (HH:MM or HH:MM:SS).
    #[arg(long, value_name = "TIME")]
    pub end_time: Option<String>,

    /// Keep at most N messages after the time filter.
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Which end of the transcript --limit keeps: first or last.
    #[arg(long, value_name = "END")]
    pub limit_type: Option<String>,

    /// Drop messages shorter than N characters.
    #[arg(long, value_name = "N")]
    pub min_length: Option<usize>,

    /// Drop messages longer than N characters.
    #[arg(long, value_name = "N")]
    pub max_length: Option<usize>,

    /// Comma-separated keywords; a message must contain at least one.
    #[arg(long, value_name = "LIST")]
    pub keywords: Option<String>,

    /// Drop participants with fewer than N messages.
    #[arg(long, value_name = "N")]
    pub min_messages: Option<usize>,

    /// Drop participants with more than N messages.
    #[arg(long, value_name = "N")]
    pub max_messages: Option<usize>,

    /// Keep only the N most active participants.
    #[arg(long, value_name = "N")]
    pub active_users: Option<usize>,

    /// Comma-separated allow-list of participants.
    #[arg(long, value_name = "LIST")]
    pub selected_users: Option<String>,

    /// Keep only messages from this participant.
    #[arg(long, value_name = "NAME")]
    pub username: Option<String>,

    /// Replace participant names with User_N / Phone_N pseudonyms.
    #[arg(long)]
    pub anonymize: bool,
}

impl FilterArgs {
    #[must_use]
    pub fn to_raw(&self) -> RawFilterParams {
        RawFilterParams {
            start_date: self.start_date.clone(),
            start_time: self.start_time.clone(),
            end_date: self.end_date.clone(),
            end_time: self.end_time.clone(),
            limit: self.limit,
            limit_type: self.limit_type.clone(),
            min_length: self.min_length,
            max_length: self.max_length,
            keywords: self.keywords.clone(),
            min_messages: self.min_messages,
            max_messages: self.max_messages,
            active_users: self.active_users,
            selected_users: self.selected_users.clone(),
            username: self.username.clone(),
            anonymize: self.anonymize,
        }
    }

    /// Validate the flags, rendering a structured error on failure.
    ///
    /// # Errors
    ///
    /// Returns an error if any filter parameter is malformed.
    pub fn to_spec(&self, output: OutputMode) -> anyhow::Result<FilterSpec> {
        match FilterSpec::from_params(&self.to_raw()) {
            Ok(spec) => Ok(spec),
            Err(err) => {
                render_error(output, &CliError::from(&err))?;
                anyhow::bail!("{err}");
            }
        }
    }
}

/// Load the effective configuration for a command run.
///
/// # Errors
///
/// Returns an error if an explicit or discovered config file is malformed.
pub fn load_config(explicit: Option<&Path>, project_root: &Path) -> anyhow::Result<AnalysisConfig> {
    resolve_config(explicit, project_root).context("Failed to load configuration")
}

/// Analyze one transcript, rendering a structured error on failure.
///
/// # Errors
///
/// Returns an error if the transcript is missing or unreadable.
pub fn analyze_or_report(
    path: &Path,
    spec: &FilterSpec,
    config: &AnalysisConfig,
    output: OutputMode,
) -> anyhow::Result<NetworkAnalysis> {
    analyze_file(path, spec, config).or_else(|err| report(output, &err))
}

/// Render `err` as a structured error and fail the command.
///
/// # Errors
///
/// Always returns an error.
pub fn report<T>(output: OutputMode, err: &AnalysisError) -> anyhow::Result<T> {
    render_error(output, &CliError::from(err))?;
    anyhow::bail!("{err}")
}
