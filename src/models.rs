//! Data models for the feedback back office.
//!
//! This module contains the records exported from the document store
//! (users, feedback, websites), the widget configuration value object, and
//! the derived analytics summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Sentiment tag of a feedback record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "Positive"),
            Sentiment::Negative => write!(f, "Negative"),
            Sentiment::Neutral => write!(f, "Neutral"),
        }
    }
}

impl Sentiment {
    /// Classify a raw sentiment tag. Missing or unrecognized tags are neutral.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag.map(|t| t.trim().to_lowercase()).as_deref() {
            Some("positive") => Sentiment::Positive,
            Some("negative") => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }

    /// Returns an emoji representation of the sentiment.
    pub fn emoji(&self) -> &'static str {
        match self {
            Sentiment::Positive => "🟢",
            Sentiment::Negative => "🔴",
            Sentiment::Neutral => "⚪",
        }
    }
}

/// Priority assigned by the AI processing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "Low"),
            Priority::Medium => write!(f, "Medium"),
            Priority::High => write!(f, "High"),
        }
    }
}

/// Output of the out-of-band AI processing step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysis {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

/// A single piece of feedback submitted through the widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    pub id: String,
    /// Owning user.
    pub user_id: String,
    #[serde(default)]
    pub content: String,
    /// Star rating, 1 to 5. Non-integer values load as no rating.
    #[serde(
        default,
        deserialize_with = "lenient_rating",
        skip_serializing_if = "Option::is_none"
    )]
    pub rating: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Raw sentiment tag as stored. Use [`FeedbackRecord::sentiment`] to classify.
    #[serde(
        default,
        rename = "sentiment",
        skip_serializing_if = "Option::is_none"
    )]
    pub sentiment_tag: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub processed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<AiAnalysis>,
}

impl FeedbackRecord {
    /// Classified sentiment of this record.
    pub fn sentiment(&self) -> Sentiment {
        Sentiment::from_tag(self.sentiment_tag.as_deref())
    }

    /// The rating, if present and within 1..=5.
    pub fn valid_rating(&self) -> Option<i64> {
        self.rating.filter(|r| (1..=5).contains(r))
    }
}

/// Accept any JSON value for a rating, keeping only whole numbers.
fn lenient_rating<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| {
        v.as_i64()
            .or_else(|| v.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
    }))
}

/// A portal user, created at signup.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    /// Identity-provider subject id.
    pub external_id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub api_key: String,
    #[serde(default = "WidgetConfig::recommended")]
    pub widget_config: WidgetConfig,
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("external_id", &self.external_id)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("website", &self.website)
            .field("created_at", &self.created_at)
            .field("last_login", &self.last_login)
            .field("is_active", &self.is_active)
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

/// A website registered by a user; each carries its own widget config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Website {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default = "WidgetConfig::recommended")]
    pub widget_config: WidgetConfig,
}

fn default_true() -> bool {
    true
}

/// Widget configuration. Every leaf is optional so that a partial
/// configuration (a patch) can be expressed and validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WidgetConfig {
    pub theme: ThemeConfig,
    pub position: PositionConfig,
    pub size: SizeConfig,
    pub text: TextConfig,
    pub behavior: BehaviorConfig,
    pub branding: BrandingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PositionConfig {
    /// e.g. "bottom-right".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_x: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_y: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SizeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit_button: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thank_you_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_button: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BehaviorConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_show: Option<bool>,
    /// Milliseconds before the widget opens itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_show_delay: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collect_email: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collect_rating: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_categories: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<CategoryOption>,
}

/// A selectable feedback category in the widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryOption {
    pub value: String,
    pub label: String,
}

impl CategoryOption {
    fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BrandingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_powered_by: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

impl WidgetConfig {
    /// The fully populated configuration new users start with.
    pub fn recommended() -> Self {
        Self {
            theme: ThemeConfig {
                primary_color: Some("#4F46E5".to_string()),
                secondary_color: Some("#818CF8".to_string()),
                background_color: Some("#FFFFFF".to_string()),
                text_color: Some("#1F2937".to_string()),
                font_family: Some("Inter, sans-serif".to_string()),
                font_size: Some("14px".to_string()),
                border_radius: Some("8px".to_string()),
            },
            position: PositionConfig {
                placement: Some("bottom-right".to_string()),
                offset_x: Some("20px".to_string()),
                offset_y: Some("20px".to_string()),
            },
            size: SizeConfig {
                width: Some("360px".to_string()),
                height: Some("480px".to_string()),
            },
            text: TextConfig {
                title: Some("Send us feedback".to_string()),
                subtitle: Some("We read every message.".to_string()),
                placeholder: Some("Tell us what you think...".to_string()),
                submit_button: Some("Send".to_string()),
                thank_you_message: Some("Thanks for your feedback!".to_string()),
                trigger_button: Some("Feedback".to_string()),
                error_message: Some("Something went wrong. Please try again.".to_string()),
            },
            behavior: BehaviorConfig {
                auto_show: Some(false),
                auto_show_delay: Some(5000),
                collect_email: Some(false),
                collect_rating: Some(true),
                show_categories: Some(true),
                categories: vec![
                    CategoryOption::new("bug", "Bug report"),
                    CategoryOption::new("feature-request", "Feature request"),
                    CategoryOption::new("general", "General"),
                ],
            },
            branding: BrandingConfig {
                show_powered_by: Some(true),
                company_name: None,
                logo_url: None,
            },
        }
    }
}

/// Sentiment counts. Always sums to the number of aggregated records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl SentimentDistribution {
    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }

    /// Share of `sentiment` as a percentage of the total (0 when empty).
    pub fn percentage(&self, sentiment: Sentiment) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let count = match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Negative => self.negative,
            Sentiment::Neutral => self.neutral,
        };
        count as f64 / total as f64 * 100.0
    }
}

/// Activity counts for the trailing window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    pub new_users: usize,
    pub new_feedback: usize,
    pub processed_feedback: usize,
}

/// Summary statistics rolled up from user and feedback records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_users: usize,
    pub total_feedback: usize,
    /// Unrounded mean over rated records.
    pub average_rating: f64,
    pub sentiment_distribution: SentimentDistribution,
    pub feedback_by_category: BTreeMap<String, usize>,
    pub recent_activity: RecentActivity,
}

impl AnalyticsSummary {
    /// Average rating rounded to one decimal, as shown to users.
    pub fn rounded_average_rating(&self) -> f64 {
        (self.average_rating * 10.0).round() / 10.0
    }
}
