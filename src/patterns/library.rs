// Custom rule library
//
// Rules are context-aware matches with a corrective response attached.
// They come from the config file or from a standalone JSON rule pack.

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::matcher::TruthSeekingMatcher;
use super::types::{PatternMatch, PatternType};
use crate::errors::AtlesError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rule {
    pub name: String,
    /// Concept groups; each needs at least one (synonym-expanded) hit
    pub concepts: Vec<Vec<String>>,
    /// Extra regex over normalized text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    pub response: String,
}

impl Rule {
    /// Reject rules that could never match or would only ever warn
    pub fn validate(&self) -> std::result::Result<(), AtlesError> {
        if self.name.trim().is_empty() {
            return Err(AtlesError::invalid_rule("<unnamed>", "rule name is empty"));
        }
        let blank_group = |group: &Vec<String>| group.iter().all(|word| word.trim().is_empty());
        if self.concepts.is_empty() || self.concepts.iter().any(blank_group) {
            return Err(AtlesError::invalid_rule(
                &self.name,
                "every rule needs at least one non-empty concept group",
            ));
        }
        if self.response.trim().is_empty() {
            return Err(AtlesError::invalid_rule(&self.name, "response is empty"));
        }
        if let Some(pattern) = &self.pattern {
            Regex::new(pattern)
                .map_err(|e| AtlesError::invalid_rule(&self.name, format!("invalid pattern: {}", e)))?;
        }
        Ok(())
    }

    /// Evaluate against `text`; a hit is tagged [`PatternType::Custom`]
    pub fn evaluate(&self, matcher: &TruthSeekingMatcher, text: &str) -> PatternMatch {
        let groups: Vec<Vec<&str>> = self
            .concepts
            .iter()
            .map(|group| group.iter().map(String::as_str).collect())
            .collect();
        let groups: Vec<&[&str]> = groups.iter().map(Vec::as_slice).collect();

        matcher
            .context_match(text, &groups, self.pattern.as_deref())
            .with_type(PatternType::Custom)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleLibrary {
    pub rules: Vec<Rule>,
}

impl RuleLibrary {
    /// Load a rule pack from a JSON file (`{"rules": [...]}`)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read rules file: {}", path.display()))?;

        let library: RuleLibrary = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse rules file: {}", path.display()))?;

        Ok(library)
    }

    pub fn validate(&self) -> std::result::Result<(), AtlesError> {
        self.rules.iter().try_for_each(Rule::validate)
    }

    pub fn get_rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn rule_names(&self) -> Vec<String> {
        self.rules.iter().map(|r| r.name.clone()).collect()
    }

    pub fn extend(&mut self, other: RuleLibrary) {
        self.rules.extend(other.rules);
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
