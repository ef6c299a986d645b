//! Message filter pipeline.
//!
//! Stages run in a fixed order over one parsed transcript:
//!
//! 1. temporal bounds (inclusive)
//! 2. `limit` first/last selection
//! 3. content filters: length, `username`, `keywords`
//! 4. per-sender counting and consecutive-sender edge accumulation
//! 5. population filters: message-count bounds, top-K activity, allow-list
//! 6. anonymization
//!
//! Counting and edges are keyed on raw sender identities; anonymization
//! only changes how surviving participants are displayed.

pub mod anonymize;
pub mod spec;

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, instrument};

use crate::model::{Message, ParticipantStat};

pub use anonymize::AnonymizationMap;
pub use spec::{FilterSpec, LimitType, RawFilterParams};

/// Accumulated interaction weight between two raw senders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairWeight {
    /// Sender of the earlier message when the pair was first seen.
    pub source: String,
    pub target: String,
    pub weight: u32,
}

/// Everything the graph builder needs from one filter run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOutcome {
    /// Messages that passed the temporal, limit, and content stages.
    pub retained: Vec<Message>,
    /// Message counts over `retained`, in first-seen order.
    pub counts: Vec<ParticipantStat>,
    /// Consecutive-sender pairs over `retained`, in first-seen order.
    pub edges: Vec<PairWeight>,
    /// Raw senders that survived the population filters, in first-seen order.
    pub participants: Vec<String>,
    /// Present when the filter requested anonymization.
    pub anonymizer: Option<AnonymizationMap>,
}

impl FilterOutcome {
    /// Display identifier for a raw sender.
    #[must_use]
    pub fn display_name<'a>(&'a self, sender: &'a str) -> &'a str {
        self.anonymizer
            .as_ref()
            .map_or(sender, |map| map.display(sender))
    }

    /// Message count for a raw sender, 0 if it never passed the content stage.
    #[must_use]
    pub fn message_count(&self, sender: &str) -> usize {
        self.counts
            .iter()
            .find(|stat| stat.sender_id == sender)
            .map_or(0, |stat| stat.message_count)
    }

    /// Edges whose endpoints both survived the population filters.
    pub fn kept_edges(&self) -> impl Iterator<Item = &PairWeight> {
        let kept: HashSet<&str> = self.participants.iter().map(String::as_str).collect();
        self.edges
            .iter()
            .filter(move |edge| kept.contains(edge.source.as_str()) && kept.contains(edge.target.as_str()))
    }
}

/// Run every stage of the pipeline.
#[instrument(skip_all, fields(input = messages.len()))]
pub fn run(messages: &[Message], spec: &FilterSpec) -> FilterOutcome {
    let timed = apply_time_bounds(messages, spec);
    let selected = apply_limit(timed, spec);
    let retained: Vec<Message> = selected
        .into_iter()
        .filter(|msg| passes_content(msg, spec))
        .cloned()
        .collect();
    debug!(retained = retained.len(), "content filters applied");

    let counts = count_messages(&retained);
    let edges = accumulate_edges(&retained);
    let participants = apply_population_filters(&counts, spec);
    debug!(
        senders = counts.len(),
        participants = participants.len(),
        edges = edges.len(),
        "population filters applied"
    );

    let anonymizer = spec
        .anonymize
        .then(|| AnonymizationMap::from_senders(participants.iter().map(String::as_str)));

    FilterOutcome {
        retained,
        counts,
        edges,
        participants,
        anonymizer,
    }
}

fn apply_time_bounds<'a>(messages: &'a [Message], spec: &FilterSpec) -> Vec<&'a Message> {
    if !spec.has_time_bounds() {
        return messages.iter().collect();
    }
    messages
        .iter()
        .filter(|msg| msg.timestamp.is_some_and(|ts| spec.contains_time(ts)))
        .collect()
}

fn apply_limit<'a>(mut messages: Vec<&'a Message>, spec: &FilterSpec) -> Vec<&'a Message> {
    let Some(limit) = spec.limit else {
        return messages;
    };
    if messages.len() > limit {
        match spec.limit_type {
            LimitType::First => messages.truncate(limit),
            LimitType::Last => {
                messages.drain(..messages.len() - limit);
            }
        }
    }
    messages
}

fn passes_content(msg: &Message, spec: &FilterSpec) -> bool {
    let len = msg.content_len();
    if spec.min_length.is_some_and(|min| len < min) {
        return false;
    }
    if spec.max_length.is_some_and(|max| len > max) {
        return false;
    }
    if let Some(username) = &spec.username {
        if msg.sender.to_lowercase() != username.to_lowercase() {
            return false;
        }
    }
    if !spec.keywords.is_empty() {
        let body = msg.content.to_lowercase();
        if !spec.keywords.iter().any(|kw| body.contains(kw.as_str())) {
            return false;
        }
    }
    true
}

fn count_messages(messages: &[Message]) -> Vec<ParticipantStat> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<ParticipantStat> = Vec::new();
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

fn accumulate_edges(messages: &[Message]) -> Vec<PairWeight> {
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    let mut edges: Vec<PairWeight> = Vec::new();

    for pair in messages.windows(2) {
        let (prev, curr) = (pair[0].sender.as_str(), pair[1].sender.as_str());
        if prev == curr {
            continue;
        }
        let key = if prev < curr { (prev, curr) } else { (curr, prev) };
        if let Some(&i) = index.get(&key) {
            edges[i].weight += 1;
        } else {
            index.insert(key, edges.len());
            edges.push(PairWeight {
                source: prev.to_string(),
                target: curr.to_string(),
                weight: 1,
            });
        }
    }
    edges
}

fn apply_population_filters(counts: &[ParticipantStat], spec: &FilterSpec) -> Vec<String> {
    let mut kept: Vec<&ParticipantStat> = counts
        .iter()
        .filter(|stat| spec.min_messages.is_none_or(|min| stat.message_count >= min))
        .filter(|stat| spec.max_messages.is_none_or(|max| stat.message_count <= max))
        .collect();

    if let Some(k) = spec.active_users_top_k {
        let mut ranked = kept.clone();
        ranked.sort_by(|a, b| {
            b.message_count
                .cmp(&a.message_count)
                .then_with(|| a.sender_id.cmp(&b.sender_id))
        });
        let top: HashSet<&str> = ranked
            .iter()
            .take(k)
            .map(|stat| stat.sender_id.as_str())
            .collect();
        kept.retain(|stat| top.contains(stat.sender_id.as_str()));
    }

    if !spec.selected_users.is_empty() {
        kept.retain(|stat| {
            let lower = stat.sender_id.to_lowercase();
            spec.selected_users.iter().any(|user| *user == lower)
        });
    }

    kept.into_iter().map(|stat| stat.sender_id.clone()).collect()
}
