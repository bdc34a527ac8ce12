// ABOUTME: Article value returned by the reader, holding merged content and resolved metadata.
// ABOUTME: Includes a Markdown document formatter and presence helpers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An extracted article.
///
/// `html` is always the sanitized merged root; `content` is the same article
/// in the representation the reader was configured for.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Article {
    pub url: String,
    pub domain: String,
    pub title: String,
    pub byline: Option<String>,
    pub excerpt: Option<String>,
    pub content: String,
    pub html: String,
    pub text: String,
    pub lead_image_url: Option<String>,
    pub site_name: Option<String>,
    pub language: Option<String>,
    pub date_published: Option<DateTime<Utc>>,
    pub word_count: usize,
}

impl Article {
    /// Format the article as a standalone Markdown document.
    pub fn format_markdown(&self) -> String {
        let mut parts = Vec::new();

        if !self.title.is_empty() {
            parts.push(format!("# {}", self.title));
        }

        let mut meta = Vec::new();
        if let Some(byline) = self.byline.as_deref().filter(|b| !b.is_empty()) {
            meta.push(format!("By {}", byline));
        }
        if let Some(site) = self.site_name.as_deref().filter(|s| !s.is_empty()) {
            meta.push(site.to_string());
        }
        if let Some(date) = self.date_published {
            meta.push(date.format("%Y-%m-%d").to_string());
        }
        if !meta.is_empty() {
            parts.push(meta.join(" | "));
        }

        if !self.url.is_empty() {
            parts.push(format!("Source: {}", self.url));
        }

        if let Some(excerpt) = self.excerpt.as_deref().filter(|e| !e.is_empty()) {
            parts.push(format!("> {}", excerpt));
        }

        if self.has_image() {
            parts.push(format!(
                "![Lead Image]({})",
                self.lead_image_url.as_deref().unwrap_or_default()
            ));
        }

        if !parts.is_empty() && !self.content.is_empty() {
            parts.push("---".to_string());
        }

        if !self.content.is_empty() {
            parts.push(self.content.clone());
        }

        parts.join("\n\n")
    }

    /// True when the article carries neither a title nor any text.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.text.trim().is_empty()
    }

    pub fn has_byline(&self) -> bool {
        self.byline.as_ref().map_or(false, |b| !b.is_empty())
    }

    pub fn has_image(&self) -> bool {
        self.lead_image_url
            .as_ref()
            .map_or(false, |u| !u.is_empty())
    }
}
