//! Analytics report generation.
//!
//! This module renders an [`AnalyticsReport`] as Markdown or JSON.

use crate::analysis::{InsightSummary, RECENT_WINDOW_DAYS};
use crate::models::{AnalyticsSummary, Priority, Sentiment};
use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Metadata about the analytics report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    /// What was aggregated, e.g. "All users" or "User u_123".
    pub scope: String,
    /// Reference time the windows were computed from.
    pub as_of: DateTime<Utc>,
    /// Date range filter, if any, in human-readable form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    /// Trailing window applied before aggregation (single-user view).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_days: Option<i64>,
    /// Source of the records.
    pub data_dir: String,
}

/// A complete analytics report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub metadata: ReportMetadata,
    pub summary: AnalyticsSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights: Option<InsightSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub daily_activity: Vec<(NaiveDate, usize)>,
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &AnalyticsReport) -> String {
    let mut output = String::new();

    output.push_str("# Pulsedesk Analytics Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_overview_section(&report.summary));
    output.push_str(&generate_sentiment_section(&report.summary));
    output.push_str(&generate_category_section(&report.summary));
    output.push_str(&generate_activity_section(&report.summary));

    if let Some(ref insights) = report.insights {
        output.push_str(&generate_insights_section(insights));
    }

    output.push_str(&generate_daily_section(&report.daily_activity));
    output.push_str(&generate_footer());

    output
}

fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Scope:** {}\n", metadata.scope));
    section.push_str(&format!(
        "- **As Of:** {}\n",
        metadata.as_of.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if let Some(ref range) = metadata.range {
        section.push_str(&format!("- **Date Range:** {}\n", range));
    }
    if let Some(days) = metadata.window_days {
        section.push_str(&format!("- **Window:** last {} days\n", days));
    }
    section.push_str(&format!("- **Data Source:** `{}`\n", metadata.data_dir));
    section.push('\n');

    section
}

fn generate_overview_section(summary: &AnalyticsSummary) -> String {
    let mut section = String::new();

    section.push_str("## Overview\n\n");
    section.push_str("| Users | Feedback | Average Rating |\n");
    section.push_str("|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {:.1} |\n\n",
        summary.total_users,
        summary.total_feedback,
        summary.rounded_average_rating()
    ));

    section
}

fn generate_sentiment_section(summary: &AnalyticsSummary) -> String {
    let dist = &summary.sentiment_distribution;
    let mut section = String::new();

    section.push_str("## Sentiment\n\n");
    section.push_str("| Sentiment | Count | Share |\n");
    section.push_str("|:---|:---:|:---:|\n");

    let rows = [
        (Sentiment::Positive, dist.positive),
        (Sentiment::Negative, dist.negative),
        (Sentiment::Neutral, dist.neutral),
    ];
    for (sentiment, count) in rows {
        section.push_str(&format!(
            "| {} {} | {} | {:.1}% |\n",
            sentiment.emoji(),
            sentiment,
            count,
            dist.percentage(sentiment)
        ));
    }
    section.push('\n');

    section
}

fn generate_category_section(summary: &AnalyticsSummary) -> String {
    let mut section = String::new();

    section.push_str("## Feedback by Category\n\n");

    if summary.feedback_by_category.is_empty() {
        section.push_str("No feedback in this period.\n\n");
        return section;
    }

    section.push_str("| Category | Count |\n");
    section.push_str("|:---|:---:|\n");

    let mut categories: Vec<_> = summary.feedback_by_category.iter().collect();
    categories.sort_by_key(|(_, count)| std::cmp::Reverse(*count));

    for (category, count) in categories {
        section.push_str(&format!("| {} | {} |\n", category, count));
    }
    section.push('\n');

    section
}

fn generate_activity_section(summary: &AnalyticsSummary) -> String {
    let activity = &summary.recent_activity;
    let mut section = String::new();

    section.push_str(&format!(
        "## Recent Activity (last {} days)\n\n",
        RECENT_WINDOW_DAYS
    ));
    section.push_str(&format!("- **New Users:** {}\n", activity.new_users));
    section.push_str(&format!("- **New Feedback:** {}\n", activity.new_feedback));
    section.push_str(&format!(
        "- **Processed Feedback:** {}\n\n",
        activity.processed_feedback
    ));

    section
}

fn generate_insights_section(insights: &InsightSummary) -> String {
    let mut section = String::new();

    section.push_str("## AI Insights\n\n");

    if insights.analyzed == 0 {
        section.push_str("No feedback has been analyzed yet.\n\n");
        return section;
    }

    section.push_str(&format!(
        "- **Analyzed Feedback:** {}\n",
        insights.analyzed
    ));
    let priorities: Vec<String> = [
        (Priority::High, insights.high_priority),
        (Priority::Medium, insights.medium_priority),
        (Priority::Low, insights.low_priority),
    ]
    .iter()
    .map(|(priority, count)| format!("{} {}", priority, count))
    .collect();
    section.push_str(&format!("- **Priority:** {}\n\n", priorities.join(" | ")));

    if !insights.top_keywords.is_empty() {
        section.push_str("### Top Keywords\n\n");
        for (i, (keyword, count)) in insights.top_keywords.iter().enumerate() {
            section.push_str(&format!("{}. {} ({})\n", i + 1, keyword, count));
        }
        section.push('\n');
    }

    section
}

fn generate_daily_section(daily: &[(NaiveDate, usize)]) -> String {
    if daily.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Daily Feedback\n\n");
    section.push_str("| Date | Feedback |\n");
    section.push_str("|:---|:---:|\n");
    for (date, count) in daily {
        section.push_str(&format!("| {} | {} |\n", date.format("%Y-%m-%d"), count));
    }
    section.push('\n');

    section
}

fn generate_footer() -> String {
    "---\n\n*Report generated by Pulsedesk*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &AnalyticsReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RecentActivity, SentimentDistribution};
    use chrono::TimeZone;

    fn create_test_report() -> AnalyticsReport {
        let metadata = ReportMetadata {
            scope: "All users".to_string(),
            as_of: Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap(),
            range: Some("2026-09-01 to 2026-10-18".to_string()),
            window_days: None,
            data_dir: "data".to_string(),
        };

        AnalyticsReport {
            metadata,
            summary: AnalyticsSummary {
                total_users: 12,
                total_feedback: 4,
                average_rating: 3.666_666,
                sentiment_distribution: SentimentDistribution {
                    positive: 2,
                    negative: 1,
                    neutral: 1,
                },
                feedback_by_category: [("bug".to_string(), 3), ("uncategorized".to_string(), 1)]
                    .into_iter()
                    .collect(),
                recent_activity: RecentActivity {
                    new_users: 2,
                    new_feedback: 3,
                    processed_feedback: 1,
                },
            },
            insights: Some(InsightSummary {
                analyzed: 2,
                high_priority: 1,
                medium_priority: 1,
                low_priority: 0,
                top_keywords: vec![("checkout".to_string(), 2)],
            }),
            daily_activity: vec![(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(), 3)],
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report();
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("# Pulsedesk Analytics Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("| 12 | 4 | 3.7 |"));
        assert!(markdown.contains("| 🟢 Positive | 2 | 50.0% |"));
        assert!(markdown.contains("| bug | 3 |"));
        assert!(markdown.contains("- **Processed Feedback:** 1"));
        assert!(markdown.contains("- **Priority:** High 1 | Medium 1 | Low 0"));
        assert!(markdown.contains("1. checkout (2)"));
        assert!(markdown.contains("| 2026-10-18 | 3 |"));
    }

    #[test]
    fn test_markdown_without_optional_sections() {
        let mut report = create_test_report();
        report.insights = None;
        report.daily_activity.clear();
        report.summary.feedback_by_category.clear();

        let markdown = generate_markdown_report(&report);
        assert!(!markdown.contains("## AI Insights"));
        assert!(!markdown.contains("## Daily Feedback"));
        assert!(markdown.contains("No feedback in this period."));
    }

    #[test]
    fn test_generate_metadata_section() {
        let mut metadata = create_test_report().metadata;
        metadata.window_days = Some(30);

        let section = generate_metadata_section(&metadata);
        assert!(section.contains("All users"));
        assert!(section.contains("2026-10-18 12:00:00 UTC"));
        assert!(section.contains("last 30 days"));
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report();
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"totalFeedback\": 4"));
        assert!(json.contains("\"sentimentDistribution\""));
        assert!(json.contains("\"processedFeedback\": 1"));
        assert!(json.contains("\"dailyActivity\""));
    }
}
