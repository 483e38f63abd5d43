// src/domain/aggregates.rs

//! Read-side projections for the dashboard and reports. Everything here is a
//! pure function over a full snapshot; nothing is maintained incrementally.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::entities::{Appointment, Conversation};
use crate::domain::vocab::{Channel, ConversationStatus, Tone};

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub waiting: usize,
    pub in_progress: usize,
    pub resolved: usize,
    pub pending: usize,
    /// Statuses outside the known four.
    pub other: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.waiting + self.in_progress + self.resolved + self.pending + self.other
    }
}

pub fn count_by_status<'a, I>(convs: I) -> StatusCounts
where
    I: IntoIterator<Item = &'a Conversation>,
{
    let mut counts = StatusCounts::default();
    for conv in convs {
        match conv.status {
            ConversationStatus::Waiting => counts.waiting += 1,
            ConversationStatus::InProgress => counts.in_progress += 1,
            ConversationStatus::Resolved => counts.resolved += 1,
            ConversationStatus::Pending => counts.pending += 1,
            ConversationStatus::Unknown(_) => counts.other += 1,
        }
    }
    counts
}

/// Appointments whose `data_hora` starts with `today` as `YYYY-MM-DD`.
pub fn count_on_day<'a, I>(appointments: I, today: NaiveDate) -> usize
where
    I: IntoIterator<Item = &'a Appointment>,
{
    let prefix = today.format("%Y-%m-%d").to_string();
    appointments
        .into_iter()
        .filter(|a| a.date_time.starts_with(&prefix))
        .count()
}

/// Mean minutes to first response over every conversation.
///
/// A conversation without the field counts as 0 minutes and still counts in
/// the denominator. Unrounded; `0.0` for an empty set.
pub fn mean_first_response(convs: &[&Conversation]) -> f64 {
    if convs.is_empty() {
        return 0.0;
    }
    let sum: f64 = convs
        .iter()
        .map(|c| c.first_response_minutes.unwrap_or(0.0))
        .sum();
    sum / convs.len() as f64
}

/// Dashboard card: whole minutes.
pub fn avg_first_response_minutes(convs: &[&Conversation]) -> i64 {
    mean_first_response(convs).round() as i64
}

/// Reports card: one decimal.
pub fn avg_first_response_report(convs: &[&Conversation]) -> f64 {
    round1(mean_first_response(convs))
}

/// Percentage of resolved conversations, one decimal, `0.0` when empty.
pub fn resolution_rate(convs: &[&Conversation]) -> f64 {
    if convs.is_empty() {
        return 0.0;
    }
    let resolved = convs
        .iter()
        .filter(|c| c.status == ConversationStatus::Resolved)
        .count();
    round1(resolved as f64 / convs.len() as f64 * 100.0)
}

/// Mean rating over rated conversations only, one decimal, `0.0` when none.
pub fn avg_satisfaction(convs: &[&Conversation]) -> f64 {
    let rated: Vec<f64> = convs
        .iter()
        .filter_map(|c| c.satisfaction)
        .filter(|r| r.is_finite() && *r > 0.0)
        .collect();
    if rated.is_empty() {
        return 0.0;
    }
    round1(rated.iter().sum::<f64>() / rated.len() as f64)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelShare {
    pub channel: Channel,
    pub label: String,
    pub tone: Tone,
    pub count: usize,
    pub percentage: u32,
}

/// Conversations per channel, most used first. Ties keep first-seen order.
pub fn channel_distribution(convs: &[&Conversation]) -> Vec<ChannelShare> {
    let mut counts: Vec<(Channel, usize)> = Vec::new();
    for conv in convs {
        match counts.iter_mut().find(|(ch, _)| *ch == conv.channel) {
            Some((_, n)) => *n += 1,
            None => counts.push((conv.channel.clone(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    let total = convs.len().max(1) as f64;
    counts
        .into_iter()
        .map(|(channel, count)| ChannelShare {
            label: channel.label().to_string(),
            tone: channel.tone(),
            percentage: (count as f64 / total * 100.0).round() as u32,
            channel,
            count,
        })
        .collect()
}

/// Qualitative grade shown under the average response time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseGrade {
    Excellent,
    Good,
    NeedsImprovement,
}

impl ResponseGrade {
    pub fn for_minutes(minutes: i64) -> Self {
        if minutes < 5 {
            ResponseGrade::Excellent
        } else if minutes < 10 {
            ResponseGrade::Good
        } else {
            ResponseGrade::NeedsImprovement
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResponseGrade::Excellent => "Excelente",
            ResponseGrade::Good => "Bom",
            ResponseGrade::NeedsImprovement => "Melhorar",
        }
    }
}
