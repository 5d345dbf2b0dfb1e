//! Posting extraction. Strategies run in order over the parsed page and each may
//! fill any field; per field, the first non-empty value wins.
//!
//! 1. JSON-LD `JobPosting` objects
//! 2. board-specific CSS selectors
//! 3. raw page text (`article`, then `main`, then `body`) as description

use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

use crate::scraping::{JobBoard, JobPosting};

const TITLE_PLACEHOLDER: &str = "(Title not found)";
const COMPANY_PLACEHOLDER: &str = "(Company not found)";
const LOCATION_PLACEHOLDER: &str = "(Location not found)";
const DESCRIPTION_PLACEHOLDER: &str = "(Description not found)";

/// Fields a single strategy managed to find.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PartialPosting {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl PartialPosting {
    /// Fills each field still empty in `self` from `other`.
    fn merge(&mut self, other: PartialPosting) {
        fill(&mut self.title, other.title);
        fill(&mut self.company, other.company);
        fill(&mut self.location, other.location);
        fill(&mut self.description, other.description);
    }

    fn is_complete(&self) -> bool {
        self.title.is_some()
            && self.company.is_some()
            && self.location.is_some()
            && self.description.is_some()
    }
}

fn fill(slot: &mut Option<String>, candidate: Option<String>) {
    if slot.is_none() {
        *slot = candidate.filter(|v| !v.trim().is_empty());
    }
}

pub trait ExtractionStrategy {
    fn extract(&self, document: &Html) -> PartialPosting;
}

/// Reads `<script type="application/ld+json">` blocks describing a `JobPosting`.
pub struct JsonLdStrategy;

impl ExtractionStrategy for JsonLdStrategy {
    fn extract(&self, document: &Html) -> PartialPosting {
        let Ok(selector) = Selector::parse(r#"script[type="application/ld+json"]"#) else {
            return PartialPosting::default();
        };

        document
            .select(&selector)
            .filter_map(|script| {
                let raw: String = script.text().collect();
                serde_json::from_str::<Value>(&raw).ok()
            })
            .find_map(|value| find_job_posting(&value).map(posting_from_json_ld))
            .unwrap_or_default()
    }
}

fn is_job_posting(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(t)) => t == "JobPosting",
        Some(Value::Array(types)) => types.iter().any(|t| t == "JobPosting"),
        _ => false,
    }
}

fn find_job_posting(value: &Value) -> Option<&Value> {
    match value {
        Value::Array(items) => items.iter().find_map(find_job_posting),
        Value::Object(_) if is_job_posting(value) => Some(value),
        Value::Object(map) => map.get("@graph").and_then(find_job_posting),
        _ => None,
    }
}

fn posting_from_json_ld(posting: &Value) -> PartialPosting {
    let str_at = |v: Option<&Value>| v.and_then(Value::as_str).map(|s| s.trim().to_string());

    let location = match posting.get("jobLocation") {
        Some(Value::Array(places)) => places.first(),
        other => other,
    }
    .and_then(|place| place.get("address"))
    .and_then(|address| address.get("addressLocality"));

    PartialPosting {
        title: str_at(posting.get("title")),
        company: str_at(posting.get("hiringOrganization").and_then(|o| o.get("name"))),
        location: str_at(location),
        description: str_at(posting.get("description")).map(|html| html_to_text(&html)),
    }
}

/// First non-empty text under any of the selectors, tried in order.
pub struct SelectorStrategy {
    pub title: &'static [&'static str],
    pub company: &'static [&'static str],
    pub location: &'static [&'static str],
    pub description: &'static [&'static str],
    /// Words marking a `<span>` that holds the location, when no selector matched.
    pub location_labels: &'static [&'static str],
}

impl SelectorStrategy {
    pub fn for_board(board: JobBoard) -> Self {
        match board {
            JobBoard::LinkedIn => SelectorStrategy {
                title: &["h1.top-card-layout__title", "h1.text-heading-xlarge", "h1"],
                company: &[
                    "a.topcard__org-name-link",
                    "span.text-heading-small",
                    "span.topcard__flavor",
                ],
                location: &[
                    "span.topcard__flavor--bullet",
                    "span.jobs-unified-top-card__bullet",
                    "span.jobs-unified-top-card__location",
                ],
                description: &[
                    "div.show-more-less-html__markup",
                    "div.jobs-description__container",
                    "div.jobs-box__html-content",
                ],
                location_labels: &[],
            },
            JobBoard::WelcomeToTheJungle => SelectorStrategy {
                title: &["h1"],
                company: &["a[data-testid='company-link']"],
                location: &[],
                description: &[],
                location_labels: &["lieu", "location"],
            },
        }
    }

    fn labelled_span(&self, document: &Html) -> Option<String> {
        if self.location_labels.is_empty() {
            return None;
        }
        let selector = Selector::parse("span").ok()?;
        document
            .select(&selector)
            .map(inline_text)
            .find(|text| {
                let lower = text.to_lowercase();
                self.location_labels.iter().any(|label| lower.contains(label))
            })
    }
}

impl ExtractionStrategy for SelectorStrategy {
    fn extract(&self, document: &Html) -> PartialPosting {
        PartialPosting {
            title: first_match(document, self.title, inline_text),
            company: first_match(document, self.company, inline_text),
            location: first_match(document, self.location, inline_text)
                .or_else(|| self.labelled_span(document)),
            description: first_match(document, self.description, block_text),
        }
    }
}

/// Uses the visible text of the main content area as the description.
pub struct RawTextStrategy;

impl ExtractionStrategy for RawTextStrategy {
    fn extract(&self, document: &Html) -> PartialPosting {
        PartialPosting {
            description: first_match(document, &["article", "main", "body"], block_text),
            ..PartialPosting::default()
        }
    }
}

fn first_match(
    document: &Html,
    selectors: &[&str],
    text_of: fn(ElementRef<'_>) -> String,
) -> Option<String> {
    selectors.iter().find_map(|raw| {
        let selector = Selector::parse(raw).ok()?;
        document
            .select(&selector)
            .map(text_of)
            .find(|text| !text.is_empty())
    })
}

/// Text nodes joined by single spaces.
fn inline_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text nodes one per line, skipping script and style contents.
fn block_text(element: ElementRef<'_>) -> String {
    let mut lines = Vec::new();
    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let in_code = node
            .parent()
            .and_then(|p| p.value().as_element())
            .is_some_and(|el| matches!(el.name(), "script" | "style" | "noscript"));
        let text = text.trim();
        if !in_code && !text.is_empty() {
            lines.push(text.to_string());
        }
    }
    lines.join("\n")
}

/// Strips markup from an HTML fragment, one text node per line.
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    block_text(fragment.root_element())
}

/// Drops leading page chrome: when a line mentions the title, the description
/// starts at that line.
fn trim_to_title(description: &str, title: &str) -> String {
    let needle = title.trim().to_lowercase();
    if needle.is_empty() {
        return description.to_string();
    }
    let lines: Vec<&str> = description.lines().collect();
    match lines
        .iter()
        .position(|line| line.to_lowercase().contains(&needle))
    {
        Some(start) => lines[start..].join("\n").trim().to_string(),
        None => description.to_string(),
    }
}

pub fn strategies_for(board: JobBoard) -> Vec<Box<dyn ExtractionStrategy>> {
    vec![
        Box::new(JsonLdStrategy),
        Box::new(SelectorStrategy::for_board(board)),
        Box::new(RawTextStrategy),
    ]
}

/// Runs the strategy chain for `board` over `html` and fills any gaps with placeholders.
pub fn extract_posting(html: &str, board: JobBoard) -> JobPosting {
    let document = Html::parse_document(html);
    let mut found = PartialPosting::default();

    for strategy in strategies_for(board) {
        found.merge(strategy.extract(&document));
        if found.is_complete() {
            break;
        }
    }

    let description = match (&found.description, &found.title) {
        (Some(description), Some(title)) => Some(trim_to_title(description, title)),
        (description, _) => description.clone(),
    };

    JobPosting {
        title: found.title.unwrap_or_else(|| TITLE_PLACEHOLDER.to_string()),
        company: found.company.unwrap_or_else(|| COMPANY_PLACEHOLDER.to_string()),
        location: found.location.unwrap_or_else(|| LOCATION_PLACEHOLDER.to_string()),
        description: description
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| DESCRIPTION_PLACEHOLDER.to_string()),
    }
}
