//! AYFJ Nexus - landing page server with a grounded chat assistant
//!
//! Serves the AYFJ Group landing page and runs one Nexus chat session per
//! visitor, backed by Gemini with Google Search grounding.

mod api;
mod config;
mod conversation;
mod llm;
mod persona;
mod router;
mod runtime;
mod session;
mod state_machine;

use api::{create_router, get_index_html, AppState};
use config::NexusConfig;
use llm::{GeminiService, LlmService, LoggingService};
use router::CommandRouter;
use runtime::{LlmClient, PageSections, ServiceLlmClient, SessionManager};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ayfj_nexus=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = NexusConfig::from_env()?;
    let persona = persona::load_persona(config.persona_file.as_deref());

    // Model client
    let llm_client: Arc<dyn LlmClient> = match config.api_key.clone() {
        Some(api_key) => {
            let gemini = GeminiService::new(
                api_key,
                &config.model,
                &config.api_base,
                config.request_timeout,
            )?;
            let service: Arc<dyn LlmService> = Arc::new(LoggingService::new(Arc::new(gemini)));
            tracing::info!(
                model = %config.model,
                timeout_secs = config.request_timeout.as_secs(),
                "Gemini client initialized"
            );
            Arc::new(ServiceLlmClient::new(service))
        }
        None => {
            tracing::warn!("No Gemini API key configured. Set GEMINI_API_KEY; chat requests will fail.");
            Arc::new(ServiceLlmClient::unconfigured())
        }
    };

    // Sections the router may scroll to
    let page = get_index_html().unwrap_or_default();
    let sections = PageSections::from_html(&page)?;
    if sections.ids().next().is_none() {
        tracing::warn!("Landing page has no sections; every search goes to the chat");
    } else {
        tracing::info!(sections = ?sections.ids().collect::<Vec<_>>(), "Landing page loaded");
    }

    let sessions = SessionManager::new(
        llm_client,
        Arc::new(CommandRouter::default()),
        Arc::new(sections),
        persona,
        config.max_turns,
    )
    .with_idle_timeout(config.session_idle_timeout);
    let state = AppState::new(sessions);
    state.sessions.spawn_idle_sweeper();

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(compression);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("AYFJ Nexus server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
