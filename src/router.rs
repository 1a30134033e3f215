//! Page search routing
//!
//! A query typed into the page search box either jumps to a page section or,
//! when no section claims it, becomes a chat message for the Nexus.

use std::time::Duration;
use thiserror::Error;

/// How long a section keeps its highlight after being jumped to
pub const HIGHLIGHT_DURATION: Duration = Duration::from_secs(2);

/// The page has no element for the requested section
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Section not found: {0}")]
pub struct SectionNotFound(pub String);

/// Capability to bring a page section into view
pub trait SectionNavigator: Send + Sync {
    /// Scroll the section to the top of the viewport and highlight it
    fn scroll_to_section(&self, section_id: &str) -> Result<(), SectionNotFound>;
}

impl<T: SectionNavigator + ?Sized> SectionNavigator for std::sync::Arc<T> {
    fn scroll_to_section(&self, section_id: &str) -> Result<(), SectionNotFound> {
        (**self).scroll_to_section(section_id)
    }
}

/// A section and the keywords that lead to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionEntry {
    pub section_id: String,
    pub keywords: Vec<String>,
}

impl SectionEntry {
    fn matches(&self, normalized_query: &str) -> bool {
        self.keywords.iter().any(|k| normalized_query.contains(k.as_str()))
    }
}

/// Ordered keyword table; earlier entries take priority
#[derive(Debug, Clone, Default)]
pub struct SectionTable {
    entries: Vec<SectionEntry>,
}

impl SectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a section at the lowest priority
    pub fn with_section(mut self, section_id: &str, keywords: &[&str]) -> Self {
        self.entries.push(SectionEntry {
            section_id: section_id.to_string(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        });
        self
    }

    /// The landing page's sections
    pub fn landing_page() -> Self {
        Self::new()
            .with_section("home", &["home", "main", "intro", "welcome", "start"])
            .with_section(
                "tours",
                &["tour", "city", "nyc", "paris", "tokyo", "travel", "trip", "urban"],
            )
            .with_section(
                "consultation",
                &["consult", "service", "expert", "advice", "strategic", "help"],
            )
            .with_section(
                "software",
                &["software", "code", "app", "nexus", "suite", "develop", "os"],
            )
            .with_section(
                "vip",
                &["vip", "price", "member", "cost", "matrix", "elite", "pricing", "membership"],
            )
            .with_section(
                "testimonials",
                &["testim", "review", "client", "signal", "feedback", "say"],
            )
            .with_section(
                "contact",
                &["contact", "email", "mail", "comm", "broadcast", "signal", "message", "talk"],
            )
            .with_section("about", &["about", "company", "group", "mission", "team", "ayfj"])
    }

    /// First section whose keywords occur in the query, case-insensitively
    pub fn resolve(&self, query: &str) -> Option<&SectionEntry> {
        let normalized = query.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }
        self.entries.iter().find(|entry| entry.matches(&normalized))
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[SectionEntry] {
        &self.entries
    }
}

/// What a routed query turned into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Blank query, nothing happened
    Ignored,
    /// The section was scrolled into view
    Navigated { section_id: String },
    /// No section took the query; the original text goes to the chat
    Forwarded { text: String },
}

/// Interprets page search queries
#[derive(Debug, Clone)]
pub struct CommandRouter {
    table: SectionTable,
}

impl CommandRouter {
    pub fn new(table: SectionTable) -> Self {
        Self { table }
    }

    pub fn route(&self, query: &str, navigator: &dyn SectionNavigator) -> RouteOutcome {
        if query.trim().is_empty() {
            return RouteOutcome::Ignored;
        }

        if let Some(entry) = self.table.resolve(query) {
            match navigator.scroll_to_section(&entry.section_id) {
                Ok(()) => {
                    return RouteOutcome::Navigated {
                        section_id: entry.section_id.clone(),
                    };
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Matched section is not on the page, forwarding to chat");
                }
            }
        }

        RouteOutcome::Forwarded {
            text: query.to_string(),
        }
    }
}

impl Default for CommandRouter {
    fn default() -> Self {
        Self::new(SectionTable::landing_page())
    }
}
