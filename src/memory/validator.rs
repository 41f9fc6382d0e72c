//! Existence checks that decide whether the memory system is configured.

use serde::{Deserialize, Serialize};

use super::config::{
    MemoryConfig, KNOWN_ISSUES_FILE, MEMORY_RULE_FILE, PROJECT_KNOWLEDGE_FILE,
    WORKING_MEMORY_FILE,
};

/// Result of validating a memory base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True only when all three directories and the three core files exist
    pub configured: bool,
    pub directories: DirectoryStatus,
    pub core_files: CoreFileStatus,
    pub base_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryStatus {
    pub short_term: bool,
    pub long_term: bool,
    pub rules: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreFileStatus {
    pub project_knowledge: bool,
    pub known_issues: bool,
    pub working_memory: bool,
    /// Reported for the agent's benefit; does not affect `configured`
    pub memory_rule: bool,
}

impl ValidationReport {
    /// Names of the required components that are absent, in a stable order.
    pub fn missing_components(&self) -> Vec<&'static str> {
        let checks = [
            (self.directories.short_term, "short-term directory"),
            (self.directories.long_term, "long-term directory"),
            (self.directories.rules, "rules directory"),
            (self.core_files.project_knowledge, PROJECT_KNOWLEDGE_FILE),
            (self.core_files.known_issues, KNOWN_ISSUES_FILE),
            (self.core_files.working_memory, WORKING_MEMORY_FILE),
        ];

        checks
            .into_iter()
            .filter(|(present, _)| !present)
            .map(|(_, name)| name)
            .collect()
    }
}

/// Checks the memory layout under `config`. Absence is reported, never raised.
pub fn validate(config: &MemoryConfig) -> ValidationReport {
    tracing::info!(
        "Validating memory system at {}",
        config.base_path.display()
    );

    let short_term = config.short_term_path();
    let long_term = config.long_term_path();
    let rules = config.rules_path();

    let directories = DirectoryStatus {
        short_term: short_term.exists(),
        long_term: long_term.exists(),
        rules: rules.exists(),
    };
    let core_files = CoreFileStatus {
        project_knowledge: long_term.join(PROJECT_KNOWLEDGE_FILE).exists(),
        known_issues: long_term.join(KNOWN_ISSUES_FILE).exists(),
        working_memory: short_term.join(WORKING_MEMORY_FILE).exists(),
        memory_rule: rules.join(MEMORY_RULE_FILE).exists(),
    };

    let configured = directories.short_term
        && directories.long_term
        && directories.rules
        && core_files.project_knowledge
        && core_files.known_issues
        && core_files.working_memory;

    let report = ValidationReport {
        configured,
        directories,
        core_files,
        base_path: config.base_path.to_string_lossy().into_owned(),
    };

    if report.configured {
        tracing::info!("Memory system is fully configured");
    } else {
        tracing::warn!(
            "Memory system incomplete - missing: {}",
            report.missing_components().join(", ")
        );
    }

    report
}
