//! Static guidance texts and the choice between them.

use serde::{Deserialize, Serialize};

use super::config::MemoryConfig;
use super::validator::{validate, ValidationReport};

/// Full setup instructions, returned while the memory system is incomplete.
pub const SETUP_PROMPT: &str = include_str!("prompts/setup.md");

/// Short status text, returned once the memory system is configured.
pub const ACTIVE_PROMPT: &str = include_str!("prompts/active.md");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptType {
    Active,
    Setup,
}

impl PromptType {
    pub fn for_status(configured: bool) -> Self {
        if configured {
            PromptType::Active
        } else {
            PromptType::Setup
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            PromptType::Active => ACTIVE_PROMPT,
            PromptType::Setup => SETUP_PROMPT,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PromptType::Active => "active",
            PromptType::Setup => "setup",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptResponse {
    pub prompt: String,
    pub prompt_type: PromptType,
    pub system_status: ValidationReport,
}

/// Picks the prompt for an already computed validation report.
pub fn select_prompt(status: ValidationReport) -> PromptResponse {
    let prompt_type = PromptType::for_status(status.configured);
    PromptResponse {
        prompt: prompt_type.text().to_string(),
        prompt_type,
        system_status: status,
    }
}

/// Validates `config` and returns the matching prompt.
pub fn prompt_for_current_state(config: &MemoryConfig) -> PromptResponse {
    let response = select_prompt(validate(config));
    tracing::info!(
        "Returning {} prompt for {}",
        response.prompt_type.as_str(),
        config.base_path.display()
    );
    response
}
