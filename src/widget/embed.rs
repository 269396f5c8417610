//! Widget SDK selection and embed snippet generation.
//!
//! The widget script is either served by a locally running build (for
//! development) or loaded from the versioned CDN bundle. The choice is made
//! once at startup from configuration.

use crate::config::{EmbedConfig, SdkSource};

/// A source for the widget SDK script.
pub trait EmbedSdk {
    /// Short name shown in logs and output.
    fn name(&self) -> &'static str;

    /// URL of the script to load.
    fn script_src(&self) -> String;

    /// HTML snippet that loads the widget for one website.
    fn snippet(&self, api_key: &str, website_id: &str) -> String {
        format!(
            "<script src=\"{}\" data-api-key=\"{}\" data-website-id=\"{}\" async></script>",
            self.script_src(),
            api_key,
            website_id
        )
    }
}

/// SDK served by a local development build.
#[derive(Debug, Clone)]
pub struct LocalSdk {
    pub base_url: String,
}

impl EmbedSdk for LocalSdk {
    fn name(&self) -> &'static str {
        "local"
    }

    fn script_src(&self) -> String {
        format!("{}/widget.js", self.base_url.trim_end_matches('/'))
    }
}

/// SDK loaded from the published CDN bundle.
#[derive(Debug, Clone)]
pub struct PackagedSdk {
    pub cdn_url: String,
    pub version: String,
}

impl EmbedSdk for PackagedSdk {
    fn name(&self) -> &'static str {
        "packaged"
    }

    fn script_src(&self) -> String {
        format!(
            "{}/{}/widget.min.js",
            self.cdn_url.trim_end_matches('/'),
            self.version
        )
    }
}

/// Build the SDK selected by configuration.
pub fn select_sdk(config: &EmbedConfig) -> Box<dyn EmbedSdk> {
    match config.sdk {
        SdkSource::Local => Box::new(LocalSdk {
            base_url: config.local_url.clone(),
        }),
        SdkSource::Packaged => Box::new(PackagedSdk {
            cdn_url: config.cdn_url.clone(),
            version: config.version.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_local_sdk() {
        let config = EmbedConfig {
            sdk: SdkSource::Local,
            local_url: "http://localhost:5173/".to_string(),
            ..EmbedConfig::default()
        };

        let sdk = select_sdk(&config);
        assert_eq!(sdk.name(), "local");
        assert_eq!(sdk.script_src(), "http://localhost:5173/widget.js");
    }

    #[test]
    fn test_select_packaged_sdk() {
        let config = EmbedConfig {
            sdk: SdkSource::Packaged,
            cdn_url: "https://cdn.example.com/pulsedesk".to_string(),
            version: "2.1.0".to_string(),
            ..EmbedConfig::default()
        };

        let sdk = select_sdk(&config);
        assert_eq!(sdk.name(), "packaged");
        assert_eq!(
            sdk.script_src(),
            "https://cdn.example.com/pulsedesk/2.1.0/widget.min.js"
        );
    }

    #[test]
    fn test_snippet_contains_identifiers() {
        let sdk = LocalSdk {
            base_url: "http://localhost:5173".to_string(),
        };
        let snippet = sdk.snippet("pk_test", "site-1");

        assert!(snippet.starts_with("<script src=\"http://localhost:5173/widget.js\""));
        assert!(snippet.contains("data-api-key=\"pk_test\""));
        assert!(snippet.contains("data-website-id=\"site-1\""));
    }
}
