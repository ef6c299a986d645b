//! `netx parse`: parse a transcript and report what was recognized.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use netxplore_core::config::AnalysisConfig;
use netxplore_core::model::{Language, Message, ParticipantStat, TranscriptFormat};
use netxplore_core::parser::{ParseReport, SkipReason, parse_as, parse_transcript};
use netxplore_core::source::read_transcript;
use serde::Serialize;

use crate::cmd::report;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Transcript grammar override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Chat,
    Talk,
}

impl From<FormatArg> for TranscriptFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Chat => Self::ChatExport,
            FormatArg::Talk => Self::TalkPage,
        }
    }
}

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Transcript file to parse.
    pub file: PathBuf,

    /// Skip format detection and parse with this grammar.
    #[arg(long = "as", value_enum, value_name = "FORMAT")]
    pub as_format: Option<FormatArg>,

    /// Include every parsed message in the output.
    #[arg(long)]
    pub messages: bool,
}

/// Summary of one parse run.
#[derive(Debug, Serialize)]
pub struct ParseSummary {
    pub path: String,
    pub format: TranscriptFormat,
    pub language: Language,
    pub source_hash: String,
    pub total_lines: usize,
    pub message_count: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
    /// Senders in first-seen order.
    pub participants: Vec<ParticipantStat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<Message>>,
}

impl ParseSummary {
    fn new(path: &Path, source_hash: String, report: ParseReport, keep_messages: bool) -> Self {
        Self {
            path: path.display().to_string(),
            format: report.format,
            language: report.language,
            source_hash,
            total_lines: report.total_lines,
            message_count: report.messages.len(),
            skipped: report.skip_counts(),
            participants: sender_counts(&report.messages),
            messages: keep_messages.then_some(report.messages),
        }
    }
}

fn sender_counts(messages: &[Message]) -> Vec<ParticipantStat> {
    let mut counts: Vec<ParticipantStat> = Vec::new();
    let mut index: BTreeMap<&str, usize> = BTreeMap::new();
    for msg in messages {
        if let Some(&i) = index.get(msg.sender.as_str()) {
            counts[i].message_count += 1;
        } else {
            index.insert(msg.sender.as_str(), counts.len());
            counts.push(ParticipantStat {
                sender_id: msg.sender.clone(),
                message_count: 1,
            });
        }
    }
    counts
}

/// Execute `netx parse <file>`.
///
/// # Errors
///
/// Returns an error if the transcript cannot be read or output fails.
pub fn run_parse(
    args: &ParseArgs,
    config: &AnalysisConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let transcript = read_transcript(&args.file).or_else(|err| report(output, &err))?;
    let parsed = match args.as_format {
        Some(format) => parse_as(&transcript.text, format.into()),
        None => parse_transcript(&transcript.text, &config.parser),
    };
    let summary = ParseSummary::new(
        &transcript.path,
        transcript.source_hash,
        parsed,
        args.messages,
    );

    render_mode(output, &summary, render_text, render_pretty)
}

fn render_text(summary: &ParseSummary, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        w,
        "{}\t{}\tlang={}\tlines={}\tmessages={}\tskipped={}",
        summary.path,
        summary.format,
        summary.language,
        summary.total_lines,
        summary.message_count,
        summary.skipped.values().sum::<usize>()
    )?;
    for p in &summary.participants {
        writeln!(w, "{}\t{}", p.sender_id, p.message_count)?;
    }
    if let Some(messages) = &summary.messages {
        for msg in messages {
            writeln!(
                w,
                "{}\t{}\t{}\t{}",
                msg.line_no, msg.sender, msg.language, msg.content
            )?;
        }
    }
    Ok(())
}

fn render_pretty(summary: &ParseSummary, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Transcript {}", summary.path))?;
    pretty_kv(w, "Format", summary.format.to_string())?;
    pretty_kv(w, "Language", summary.language.to_string())?;
    pretty_kv(w, "Source", &summary.source_hash)?;
    pretty_kv(w, "Lines", summary.total_lines.to_string())?;
    pretty_kv(w, "Messages", summary.message_count.to_string())?;
    for (reason, count) in &summary.skipped {
        pretty_kv(w, &format!("Skipped {reason}"), count.to_string())?;
    }

    writeln!(w)?;
    pretty_section(w, "Participants")?;
    if summary.participants.is_empty() {
        writeln!(w, "(none)")?;
    }
    for p in &summary.participants {
        writeln!(w, "{:<32} {:>6}", p.sender_id, p.message_count)?;
    }

    if let Some(messages) = &summary.messages {
        writeln!(w)?;
        pretty_section(w, "Messages")?;
        for msg in messages {
            let when = msg
                .timestamp
                .map_or_else(|| "-".to_string(), |ts| ts.format("%Y-%m-%d %H:%M").to_string());
            writeln!(w, "{:>5}  {when:<16}  {}: {}", msg.line_no, msg.sender, msg.content)?;
        }
    }
    Ok(())
}
