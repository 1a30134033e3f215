//! Persona instruction sent with every model request

use std::fs;
use std::path::Path;

/// Built-in persona for the Nexus chat
pub const NEXUS_PERSONA: &str = r#"You are the AYFJ NEXUS Core (v6.0-ULTRA).
AYFJ Group is an elite cybersecurity collective and professional services provider.

Motto: "Secure. Collaborative. Future-Focused."

CAPABILITIES:
1. Cybersecurity Intelligence: Provide real-time data on vulnerabilities and threats (use Google Search).
2. Urban Innovation: Information on AYFJ City Tours in NYC, Paris, and Tokyo.
3. Tech Consultation: Expert advice on software architecture and digital protection.
4. Logistics Security: VIP travel, hotel, and flight security protocols.

When a user asks to "visit" a site or find "news", use your search tool.
Always provide grounding sources as clickable links.
Maintain a professional, highly intelligent, "command-center" persona."#;

/// Load the persona, preferring a non-empty override file
pub fn load_persona(override_path: Option<&Path>) -> String {
    let Some(path) = override_path else {
        return NEXUS_PERSONA.to_owned();
    };

    match fs::read_to_string(path) {
        Ok(value) if !value.trim().is_empty() => {
            tracing::info!(path = %path.display(), "Loaded persona override");
            value
        }
        Ok(_) => {
            tracing::warn!(path = %path.display(), "Persona override is empty, using built-in persona");
            NEXUS_PERSONA.to_owned()
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read persona override, using built-in persona");
            NEXUS_PERSONA.to_owned()
        }
    }
}
