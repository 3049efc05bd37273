//! Site configuration (blog.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Main blog configuration
///
/// Passed explicitly to every component that talks to the content store or
/// renders content; nothing below `Blog::new` reads the process environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogConfig {
    // Site
    pub title: String,
    pub description: String,
    pub timezone: String,
    pub date_format: String,

    // Content store
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    pub token: Option<String>,
    pub use_cdn: bool,

    // Pages
    pub revalidate_secs: u64,

    // Comments
    pub comment_endpoint: Option<String>,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            title: "Medium App".to_string(),
            description: "It is easy and free to post your thinking on any topic and connect with millions of readers".to_string(),
            timezone: String::new(),
            date_format: "%-m/%-d/%Y, %-I:%M:%S %p".to_string(),

            project_id: String::new(),
            dataset: "production".to_string(),
            api_version: "2021-10-21".to_string(),
            token: None,
            use_cdn: false,

            revalidate_secs: 60,

            comment_endpoint: None,
        }
    }
}

impl BlogConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: BlogConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply overrides from environment variables
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    fn apply_vars<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |keys: &[&str]| {
            keys.iter()
                .filter_map(|key| var(*key))
                .find(|value| !value.is_empty())
        };

        if let Some(project_id) = first(&["SANITY_PROJECT_ID", "NEXT_PUBLIC_SANITY_PROJECT_ID"]) {
            self.project_id = project_id;
        }
        if let Some(dataset) = first(&["SANITY_DATASET", "NEXT_PUBLIC_SANITY_DATASET"]) {
            self.dataset = dataset;
        }
        if let Some(token) = first(&["SANITY_API_TOKEN"]) {
            self.token = Some(token);
        }
    }

    /// How long a rendered detail page is served before it is regenerated
    pub fn revalidate(&self) -> Duration {
        Duration::from_secs(self.revalidate_secs)
    }

    /// Parsed display timezone, if one is configured
    pub fn tz(&self) -> Option<chrono_tz::Tz> {
        if self.timezone.is_empty() {
            return None;
        }
        match self.timezone.parse() {
            Ok(tz) => Some(tz),
            Err(_) => {
                tracing::warn!("Unknown timezone {:?}, using UTC", self.timezone);
                None
            }
        }
    }
}
