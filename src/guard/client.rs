// Constitutional client
//
// Puts the truth guard in front of a language-model backend: a prompt that
// carries a known misinformation claim gets the corrective response and is
// never sent to the backend.

use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;

use super::decision::{Correction, GuardDecision, TruthGuard};
use crate::logging::AuditLogger;
use crate::providers::LlmProvider;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reply {
    Corrected(Correction),
    Forwarded { provider: String, text: String },
}

impl Reply {
    pub fn text(&self) -> &str {
        match self {
            Reply::Corrected(correction) => &correction.response,
            Reply::Forwarded { text, .. } => text,
        }
    }

    pub fn was_corrected(&self) -> bool {
        matches!(self, Reply::Corrected(_))
    }
}

pub struct ConstitutionalClient {
    guard: TruthGuard,
    provider: Arc<dyn LlmProvider>,
    audit: Option<AuditLogger>,
}

impl ConstitutionalClient {
    pub fn new(guard: TruthGuard, provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            guard,
            provider,
            audit: None,
        }
    }

    pub fn with_audit_logger(mut self, logger: AuditLogger) -> Self {
        self.audit = Some(logger);
        self
    }

    pub fn guard(&self) -> &TruthGuard {
        &self.guard
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Run the guard only, recording the decision
    pub fn check(&mut self, prompt: &str) -> Result<GuardDecision> {
        let decision = self.guard.check(prompt);
        if let Some(audit) = self.audit.as_mut() {
            audit.log_decision(prompt, &decision, self.provider.name())?;
        }
        Ok(decision)
    }

    /// Answer a prompt: corrective response on a hit, backend otherwise
    pub async fn respond(&mut self, prompt: &str) -> Result<Reply> {
        match self.check(prompt)? {
            GuardDecision::Corrected(correction) => Ok(Reply::Corrected(correction)),
            GuardDecision::Forward => {
                let text = self.provider.generate(prompt).await?;
                Ok(Reply::Forwarded {
                    provider: self.provider.name().to_string(),
                    text,
                })
            }
        }
    }

    /// Write any buffered audit entries
    pub fn flush_audit(&mut self) -> Result<()> {
        match self.audit.as_mut() {
            Some(audit) => audit.flush(),
            None => Ok(()),
        }
    }
}
