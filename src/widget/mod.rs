//! Widget configuration validation and SDK embedding.

pub mod embed;
pub mod validator;

pub use embed::select_sdk;
pub use validator::validate_widget_config;
