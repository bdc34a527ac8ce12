// ABOUTME: Resolves article metadata (title, byline, excerpt, lead image, dates) from the source document.
// ABOUTME: Selectors are tried in priority order; the first non-empty value wins.

//! Metadata resolution.
//!
//! Everything here reads the parsed source document, except the lead image and
//! excerpt fallbacks which look at the merged article content.

use chrono::{DateTime, NaiveDate, Utc};
use scraper::{Html, Selector};
use url::Url;

use crate::formats::excerpt;

const TITLE_SELECTORS: &[(&str, Option<&str>)] = &[
    ("title", None),
    ("meta[property='og:title']", Some("content")),
    ("meta[name='title']", Some("content")),
    ("h1", None),
    ("h2", None),
];

const BYLINE_SELECTORS: &[(&str, Option<&str>)] = &[
    ("meta[name='author']", Some("content")),
    ("meta[property='article:author']", Some("content")),
    (".byline", None),
    (".author", None),
    ("[itemprop='author']", None),
];

const EXCERPT_SELECTORS: &[&str] = &[
    "meta[name='description']",
    "meta[property='og:description']",
];

const IMAGE_SELECTORS: &[&str] = &["meta[property='og:image']", "meta[name='twitter:image']"];

const SITE_NAME_SELECTORS: &[&str] = &[
    "meta[property='og:site_name']",
    "meta[name='application-name']",
];

const DATE_META_SELECTORS: &[&str] = &[
    "meta[property='article:published_time']",
    "meta[name='date']",
    "meta[itemprop='datePublished']",
];

// Date-only formats tried before dateparser so midnight stays on the same day.
const LOOSE_DATE_PATTERNS: &[&str] = &[
    "%b %e, %Y",
    "%e %b %Y",
    "%b %d, %Y",
    "%d %b %Y",
    "%B %e, %Y",
    "%e %B %Y",
    "%B %d, %Y",
    "%d %B %Y",
    "%Y-%m-%d",
];

/// Metadata gathered for one article.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub title: String,
    pub byline: Option<String>,
    pub excerpt: Option<String>,
    pub lead_image_url: Option<String>,
    pub site_name: Option<String>,
    pub language: Option<String>,
    pub date_published: Option<DateTime<Utc>>,
}

impl Metadata {
    /// Resolve metadata from the source document and the cleaned article.
    pub fn resolve(doc: &Html, content_html: &str, text: &str, base: &Url) -> Self {
        Self {
            title: title(doc).unwrap_or_default(),
            byline: byline(doc),
            excerpt: first_attr(doc, EXCERPT_SELECTORS, "content")
                .map(|e| normalize_whitespace(&e))
                .or_else(|| excerpt(text)),
            lead_image_url: lead_image_url(doc, content_html, base),
            site_name: first_attr(doc, SITE_NAME_SELECTORS, "content"),
            language: language(doc),
            date_published: date_published(doc),
        }
    }
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First non-empty attribute value across `selectors`, tried in order.
fn first_attr(doc: &Html, selectors: &[&str], attr: &str) -> Option<String> {
    selectors
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .find_map(|sel| {
            doc.select(&sel).find_map(|el| {
                el.value()
                    .attr(attr)
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
            })
        })
}

/// First non-empty value from `(selector, attr)` pairs; `None` attr means element text.
fn first_value(doc: &Html, selectors: &[(&str, Option<&str>)]) -> Option<String> {
    for (css, attr) in selectors {
        let Ok(sel) = Selector::parse(css) else {
            continue;
        };
        for el in doc.select(&sel) {
            let value = match attr {
                Some(attr) => el.value().attr(attr).map(normalize_whitespace),
                None => Some(normalize_whitespace(&el.text().collect::<String>())),
            };
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                return Some(value);
            }
        }
    }
    None
}

pub fn title(doc: &Html) -> Option<String> {
    first_value(doc, TITLE_SELECTORS)
}

/// Author line with a leading "By " removed.
pub fn byline(doc: &Html) -> Option<String> {
    let raw = first_value(doc, BYLINE_SELECTORS)?;
    let stripped = match raw.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("by ") => raw[3..].trim().to_string(),
        _ => raw,
    };
    (!stripped.is_empty()).then_some(stripped)
}

/// Social image meta first, then the first image in the article content.
pub fn lead_image_url(doc: &Html, content_html: &str, base: &Url) -> Option<String> {
    let raw = first_attr(doc, IMAGE_SELECTORS, "content").or_else(|| {
        let fragment = Html::parse_fragment(content_html);
        first_attr(&fragment, &["img[src]"], "src")
    })?;
    Some(
        base.join(&raw)
            .map(|u| u.to_string())
            .unwrap_or(raw),
    )
}

/// Primary language subtag: "en_US" and "EN-gb" both become "en".
pub fn normalize_lang(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .split(|c| c == '-' || c == '_')
        .next()
        .unwrap_or("")
        .to_string()
}

pub fn language(doc: &Html) -> Option<String> {
    [
        first_attr(doc, &["html"], "lang"),
        first_attr(doc, &["meta[property='og:locale']", "meta[name='language']"], "content"),
    ]
    .into_iter()
    .flatten()
    .map(|l| normalize_lang(&l))
    .find(|l| !l.is_empty())
}

/// Parse a date string: RFC 3339, then loose date-only forms, then dateparser.
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for pat in LOOSE_DATE_PATTERNS {
        if let Ok(date) = NaiveDate::parse_from_str(s, pat) {
            let naive = date.and_hms_opt(0, 0, 0)?;
            return Some(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
        }
    }

    dateparser::parse(s).ok().map(|dt| dt.with_timezone(&Utc))
}

pub fn date_published(doc: &Html) -> Option<DateTime<Utc>> {
    let meta = DATE_META_SELECTORS
        .iter()
        .filter_map(|sel| first_attr(doc, std::slice::from_ref(sel), "content"));
    let time_attr = first_attr(doc, &["time[datetime]"], "datetime");
    let time_text = first_value(doc, &[("time", None)]);

    meta.chain(time_attr)
        .chain(time_text)
        .find_map(|candidate| parse_date(&candidate))
}
