//! Widget configuration validation.
//!
//! Every rule runs on every call; violations accumulate in a fixed order
//! (colors, dimensions, text, categories, delay) instead of stopping at the
//! first one. Fields that are not set are not checked.

use crate::models::WidgetConfig;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Upper bound for `behavior.autoShowDelay`, in milliseconds.
pub const MAX_AUTO_SHOW_DELAY_MS: i64 = 60_000;

/// Result of validating a widget configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub errors: Vec<String>,
    /// The configuration as submitted, unmodified.
    pub config: WidgetConfig,
}

fn hex_color_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid hex color pattern"))
}

fn pixel_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+(\.\d+)?px$").expect("valid pixel pattern"))
}

fn injection_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)<script|javascript:|\bon[a-z]+\s*=").expect("valid injection pattern")
    })
}

fn category_value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^[a-z0-9_-]+$").expect("valid category pattern"))
}

/// Validate a (possibly partial) widget configuration.
pub fn validate_widget_config(config: &WidgetConfig) -> ValidationOutcome {
    let mut errors = Vec::new();

    let colors = [
        ("Primary color", &config.theme.primary_color),
        ("Secondary color", &config.theme.secondary_color),
        ("Background color", &config.theme.background_color),
        ("Text color", &config.theme.text_color),
    ];
    for (label, value) in colors {
        if let Some(value) = value {
            if !hex_color_re().is_match(value) {
                errors.push(format!(
                    "{} must be a valid hex color (e.g. #1A2B3C), got '{}'",
                    label, value
                ));
            }
        }
    }

    let dimensions = [
        ("Horizontal offset", &config.position.offset_x),
        ("Vertical offset", &config.position.offset_y),
        ("Width", &config.size.width),
        ("Height", &config.size.height),
        ("Font size", &config.theme.font_size),
        ("Border radius", &config.theme.border_radius),
    ];
    for (label, value) in dimensions {
        if let Some(value) = value {
            if !pixel_re().is_match(value) {
                errors.push(format!(
                    "{} must be a pixel value (e.g. 20px), got '{}'",
                    label, value
                ));
            }
        }
    }

    let text = &config.text;
    let texts = [
        ("Title", &text.title),
        ("Subtitle", &text.subtitle),
        ("Placeholder", &text.placeholder),
        ("Submit button text", &text.submit_button),
        ("Thank-you message", &text.thank_you_message),
        ("Trigger button text", &text.trigger_button),
        ("Error message", &text.error_message),
    ];
    for (label, value) in texts {
        if let Some(value) = value {
            if injection_re().is_match(value) {
                errors.push(format!("{} contains disallowed script content", label));
            }
        }
    }

    for (i, category) in config.behavior.categories.iter().enumerate() {
        let n = i + 1;
        if category.value.trim().is_empty() || category.label.trim().is_empty() {
            errors.push(format!("Category {}: value and label are required", n));
            continue;
        }
        if !category_value_re().is_match(&category.value) {
            errors.push(format!(
                "Category {}: value '{}' may only contain letters, numbers, hyphens and underscores",
                n, category.value
            ));
        }
    }

    if let Some(delay) = config.behavior.auto_show_delay {
        if !(0..=MAX_AUTO_SHOW_DELAY_MS).contains(&delay) {
            errors.push(format!(
                "Auto-show delay must be between 0 and {} milliseconds, got {}",
                MAX_AUTO_SHOW_DELAY_MS, delay
            ));
        }
    }

    ValidationOutcome {
        valid: errors.is_empty(),
        errors,
        config: config.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategoryOption;

    fn parse(json: &str) -> WidgetConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_recommended_config_is_valid() {
        let outcome = validate_widget_config(&WidgetConfig::recommended());
        assert!(outcome.valid, "{:?}", outcome.errors);
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn test_empty_patch_is_valid() {
        assert!(validate_widget_config(&WidgetConfig::default()).valid);
    }

    #[test]
    fn test_invalid_primary_color() {
        let outcome = validate_widget_config(&parse(r#"{"theme":{"primaryColor":"blue"}}"#));
        assert!(!outcome.valid);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].contains("Primary color"));
    }

    #[test]
    fn test_valid_primary_color() {
        let outcome =
            validate_widget_config(&parse(r##"{"theme":{"primaryColor":"#1A2B3C"}}"##));
        assert!(outcome.valid);
        assert!(!outcome.errors.iter().any(|e| e.contains("color")));
    }

    #[test]
    fn test_short_hex_rejected() {
        let outcome = validate_widget_config(&parse(r##"{"theme":{"textColor":"#FFF"}}"##));
        assert!(outcome.errors[0].contains("Text color"));
    }

    #[test]
    fn test_pixel_dimensions() {
        let outcome = validate_widget_config(&parse(
            r#"{"size":{"width":"360px","height":"50%"},"theme":{"fontSize":"14.5px","borderRadius":"8"}}"#,
        ));
        assert_eq!(outcome.errors.len(), 2);
        assert!(outcome.errors.iter().any(|e| e.starts_with("Height")));
        assert!(outcome.errors.iter().any(|e| e.starts_with("Border radius")));
    }

    #[test]
    fn test_script_injection_patterns() {
        let outcome = validate_widget_config(&parse(
            r#"{"text":{
                "title":"<SCRIPT>alert(1)</script>",
                "subtitle":"click javascript:void(0)",
                "placeholder":"<img src=x onerror=alert(1)>",
                "submitButton":"Send it"
            }}"#,
        ));
        assert_eq!(outcome.errors.len(), 3);
        assert!(outcome.errors[0].starts_with("Title"));
        assert!(outcome.errors[1].starts_with("Subtitle"));
        assert!(outcome.errors[2].starts_with("Placeholder"));
    }

    #[test]
    fn test_plain_text_with_on_word_is_allowed() {
        let outcome = validate_widget_config(&parse(
            r#"{"text":{"title":"Once upon a time","subtitle":"Tell us what's on your mind"}}"#,
        ));
        assert!(outcome.valid, "{:?}", outcome.errors);
    }

    #[test]
    fn test_categories() {
        let mut config = WidgetConfig::default();
        config.behavior.categories = vec![
            CategoryOption {
                value: "Feature_Request-2".to_string(),
                label: "Feature".to_string(),
            },
            CategoryOption {
                value: "".to_string(),
                label: "Empty".to_string(),
            },
            CategoryOption {
                value: "has space".to_string(),
                label: "Bad".to_string(),
            },
        ];

        let outcome = validate_widget_config(&config);
        assert_eq!(
            outcome.errors,
            vec![
                "Category 2: value and label are required".to_string(),
                "Category 3: value 'has space' may only contain letters, numbers, hyphens and underscores"
                    .to_string(),
            ]
        );
    }

    #[test]
    fn test_category_value_with_surrounding_spaces() {
        let mut config = WidgetConfig::default();
        config.behavior.categories = vec![CategoryOption {
            value: " bug ".to_string(),
            label: "Bug".to_string(),
        }];

        let outcome = validate_widget_config(&config);

        assert!(!outcome.valid);
        assert_eq!(
            outcome.errors,
            vec![
                "Category 1: value ' bug ' may only contain letters, numbers, hyphens and underscores"
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_auto_show_delay_range() {
        let outcome = validate_widget_config(&parse(r#"{"behavior":{"autoShowDelay":70000}}"#));
        assert!(!outcome.valid);
        assert!(outcome.errors[0].contains("Auto-show delay"));

        let outcome = validate_widget_config(&parse(r#"{"behavior":{"autoShowDelay":30000}}"#));
        assert!(outcome.valid);

        let outcome = validate_widget_config(&parse(r#"{"behavior":{"autoShowDelay":-1}}"#));
        assert!(!outcome.valid);
    }

    #[test]
    fn test_errors_accumulate_and_input_is_echoed() {
        let config = parse(
            r#"{"theme":{"primaryColor":"red","secondaryColor":"green"},"behavior":{"autoShowDelay":99999}}"#,
        );
        let outcome = validate_widget_config(&config);

        assert!(!outcome.valid);
        assert_eq!(outcome.errors.len(), 3);
        assert!(outcome.errors[0].contains("Primary color"));
        assert!(outcome.errors[1].contains("Secondary color"));
        assert!(outcome.errors[2].contains("Auto-show delay"));
        assert_eq!(outcome.config, config);
    }

    #[test]
    fn test_sample_widget_files() {
        let valid = validate_widget_config(&parse(include_str!("../../fixtures/widget_valid.json")));
        assert!(valid.valid, "{:?}", valid.errors);

        let invalid =
            validate_widget_config(&parse(include_str!("../../fixtures/widget_invalid.json")));
        assert!(!invalid.valid);
        assert_eq!(invalid.errors.len(), 5);
    }
}
