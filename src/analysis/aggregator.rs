//! Feedback aggregation and statistics.
//!
//! This module rolls up user and feedback records into an
//! [`AnalyticsSummary`]. Every function here is pure: inputs are borrowed,
//! the reference time is passed in, and missing optional fields simply drop
//! the record out of the statistic they feed.

use crate::models::{
    AnalyticsSummary, FeedbackRecord, Priority, RecentActivity, Sentiment, SentimentDistribution,
    UserRecord,
};
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Trailing window for `recentActivity`, in days.
pub const RECENT_WINDOW_DAYS: i64 = 7;

/// Default trailing window for the single-user view, in days.
pub const DEFAULT_USER_WINDOW_DAYS: i64 = 30;

/// Largest accepted trailing window, in days.
pub const MAX_WINDOW_DAYS: i64 = 36_500;

/// Bucket for feedback without a category.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Start of the trailing `days`-day window ending at `now`.
///
/// Returns `None` when the start falls before the earliest representable
/// instant; such a window is unbounded.
pub fn window_start(now: DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
    TimeDelta::try_days(days).and_then(|delta| now.checked_sub_signed(delta))
}

fn created_after(created_at: DateTime<Utc>, start: Option<DateTime<Utc>>) -> bool {
    start.map_or(true, |start| created_at > start)
}

/// Feedback created inside the trailing `days`-day window ending at `now`.
pub fn restrict_to_window(
    feedback: &[FeedbackRecord],
    now: DateTime<Utc>,
    days: i64,
) -> Vec<FeedbackRecord> {
    let start = window_start(now, days);
    feedback
        .iter()
        .filter(|f| created_after(f.created_at, start))
        .cloned()
        .collect()
}

/// Aggregate statistics over all supplied users and feedback.
///
/// `newUsers` and `newFeedback` are limited to the trailing seven days;
/// `processedFeedback` counts processed records across the whole input.
pub fn aggregate(
    users: &[UserRecord],
    feedback: &[FeedbackRecord],
    now: DateTime<Utc>,
) -> AnalyticsSummary {
    let since = window_start(now, RECENT_WINDOW_DAYS);

    AnalyticsSummary {
        total_users: users.len(),
        total_feedback: feedback.len(),
        average_rating: average_rating(feedback),
        sentiment_distribution: sentiment_distribution(feedback),
        feedback_by_category: feedback_by_category(feedback),
        recent_activity: RecentActivity {
            new_users: users
                .iter()
                .filter(|u| created_after(u.created_at, since))
                .count(),
            new_feedback: count_created_since(feedback, since),
            processed_feedback: count_processed(feedback),
        },
    }
}

/// Aggregate one user's feedback over the trailing `window_days`.
///
/// The feedback set is first restricted to the window, then the same
/// reducers as [`aggregate`] run over it. `recentActivity` is computed over
/// the last seven days of the restricted set. No user records are in scope,
/// so `totalUsers` and `newUsers` are zero.
pub fn aggregate_user_scoped(
    feedback: &[FeedbackRecord],
    now: DateTime<Utc>,
    window_days: i64,
) -> AnalyticsSummary {
    let scoped = restrict_to_window(feedback, now, window_days);

    let recent_start = window_start(now, RECENT_WINDOW_DAYS);
    let recent: Vec<&FeedbackRecord> = scoped
        .iter()
        .filter(|f| created_after(f.created_at, recent_start))
        .collect();

    AnalyticsSummary {
        total_users: 0,
        total_feedback: scoped.len(),
        average_rating: average_rating(&scoped),
        sentiment_distribution: sentiment_distribution(&scoped),
        feedback_by_category: feedback_by_category(&scoped),
        recent_activity: RecentActivity {
            new_users: 0,
            new_feedback: recent.len(),
            processed_feedback: recent.iter().filter(|f| f.processed).count(),
        },
    }
}

/// Mean rating over records carrying a valid 1-5 rating, 0 when none do.
pub fn average_rating(feedback: &[FeedbackRecord]) -> f64 {
    let (sum, count) = feedback
        .iter()
        .filter_map(FeedbackRecord::valid_rating)
        .fold((0i64, 0usize), |(sum, count), r| (sum + r, count + 1));

    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

/// Partition feedback by sentiment. Untagged records count as neutral.
pub fn sentiment_distribution(feedback: &[FeedbackRecord]) -> SentimentDistribution {
    let mut dist = SentimentDistribution::default();

    for record in feedback {
        match record.sentiment() {
            Sentiment::Positive => dist.positive += 1,
            Sentiment::Negative => dist.negative += 1,
            Sentiment::Neutral => dist.neutral += 1,
        }
    }

    dist
}

/// Histogram of feedback per category.
///
/// Records with no category (or a blank one) are counted under
/// [`UNCATEGORIZED`], so the counts always sum to `feedback.len()`.
pub fn feedback_by_category(feedback: &[FeedbackRecord]) -> BTreeMap<String, usize> {
    let mut grouped: BTreeMap<String, usize> = BTreeMap::new();

    for record in feedback {
        let key = match record.category.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => UNCATEGORIZED.to_string(),
        };
        *grouped.entry(key).or_default() += 1;
    }

    grouped
}

/// Count records created strictly after `since`. `None` counts everything.
pub fn count_created_since(feedback: &[FeedbackRecord], since: Option<DateTime<Utc>>) -> usize {
    feedback
        .iter()
        .filter(|f| created_after(f.created_at, since))
        .count()
}

fn count_processed(feedback: &[FeedbackRecord]) -> usize {
    feedback.iter().filter(|f| f.processed).count()
}

/// Roll-up of the AI analysis attached to processed feedback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightSummary {
    /// Records carrying an analysis.
    pub analyzed: usize,
    pub high_priority: usize,
    pub medium_priority: usize,
    pub low_priority: usize,
    /// Most frequent keywords, most common first.
    pub top_keywords: Vec<(String, usize)>,
}

/// Summarize AI analysis results. Records without analysis are skipped.
pub fn ai_insights(feedback: &[FeedbackRecord], top_n: usize) -> InsightSummary {
    let mut insights = InsightSummary::default();
    let mut keyword_counts: HashMap<String, usize> = HashMap::new();

    for analysis in feedback.iter().filter_map(|f| f.ai_analysis.as_ref()) {
        insights.analyzed += 1;

        match analysis.priority {
            Some(Priority::High) => insights.high_priority += 1,
            Some(Priority::Medium) => insights.medium_priority += 1,
            Some(Priority::Low) => insights.low_priority += 1,
            None => {}
        }

        for keyword in &analysis.keywords {
            let normalized = keyword.trim().to_lowercase();
            if !normalized.is_empty() {
                *keyword_counts.entry(normalized).or_default() += 1;
            }
        }
    }

    let mut keywords: Vec<_> = keyword_counts.into_iter().collect();
    keywords.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    keywords.truncate(top_n);
    insights.top_keywords = keywords;

    insights
}

/// Feedback counts per UTC day for the last `days` days, oldest first.
///
/// `days` is capped at [`MAX_WINDOW_DAYS`].
pub fn daily_feedback_counts(
    feedback: &[FeedbackRecord],
    now: DateTime<Utc>,
    days: u32,
) -> Vec<(NaiveDate, usize)> {
    let days = i64::from(days).min(MAX_WINDOW_DAYS);
    if days == 0 {
        return Vec::new();
    }

    let today = now.date_naive();
    let first = TimeDelta::try_days(days - 1)
        .and_then(|delta| today.checked_sub_signed(delta))
        .unwrap_or(NaiveDate::MIN);

    let mut counts: BTreeMap<NaiveDate, usize> = first
        .iter_days()
        .take_while(|day| *day <= today)
        .take(days as usize)
        .map(|day| (day, 0))
        .collect();

    for record in feedback {
        if let Some(count) = counts.get_mut(&record.created_at.date_naive()) {
            *count += 1;
        }
    }

    counts.into_iter().collect()
}
