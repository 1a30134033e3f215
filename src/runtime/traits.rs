//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use super::SseEvent;
use crate::llm::{LlmError, LlmRequest, LlmResponse, LlmService};
use crate::router::{SectionNavigator, SectionNotFound, HIGHLIGHT_DURATION};
use async_trait::async_trait;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Client for making LLM requests
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send the conversation and wait for the reply
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Get the model ID
    #[allow(dead_code)] // API completeness
    fn model_id(&self) -> &str;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: LlmClient + ?Sized> LlmClient for Arc<T> {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        (**self).complete(request).await
    }

    fn model_id(&self) -> &str {
        (**self).model_id()
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Adapter to use an `LlmService` as `LlmClient`
///
/// Without a configured service every request fails with an auth error,
/// which the dispatcher turns into a connection-failure turn.
pub struct ServiceLlmClient {
    service: Option<Arc<dyn LlmService>>,
    model_id: String,
}

impl ServiceLlmClient {
    pub fn new(service: Arc<dyn LlmService>) -> Self {
        let model_id = service.model_id().to_string();
        Self {
            service: Some(service),
            model_id,
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            service: None,
            model_id: "unconfigured".to_string(),
        }
    }
}

#[async_trait]
impl LlmClient for ServiceLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let service = self
            .service
            .as_ref()
            .ok_or_else(|| LlmError::auth("No Gemini API key configured"))?;
        service.complete(request).await
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Section ids present on the rendered landing page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSections {
    ids: BTreeSet<String>,
}

impl PageSections {
    /// Collect the `id` of every `<section>` element in the page markup
    pub fn from_html(html: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(r#"(?i)<section\b[^>]*?\bid\s*=\s*["']([^"']+)["']"#)?;
        let ids = pattern
            .captures_iter(html)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .collect();
        Ok(Self { ids })
    }

    pub fn contains(&self, section_id: &str) -> bool {
        self.ids.contains(section_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

/// Navigator that asks connected pages to scroll via the session stream
pub struct PageNavigator {
    sections: Arc<PageSections>,
    broadcast_tx: broadcast::Sender<SseEvent>,
}

impl PageNavigator {
    pub fn new(sections: Arc<PageSections>, broadcast_tx: broadcast::Sender<SseEvent>) -> Self {
        Self {
            sections,
            broadcast_tx,
        }
    }
}

impl SectionNavigator for PageNavigator {
    fn scroll_to_section(&self, section_id: &str) -> Result<(), SectionNotFound> {
        if !self.sections.contains(section_id) {
            return Err(SectionNotFound(section_id.to_string()));
        }
        // No subscribers is fine: the page may reconnect and read the snapshot
        let _ = self.broadcast_tx.send(SseEvent::Scroll {
            section_id: section_id.to_string(),
            highlight_ms: u64::try_from(HIGHLIGHT_DURATION.as_millis()).unwrap_or(u64::MAX),
        });
        Ok(())
    }
}
