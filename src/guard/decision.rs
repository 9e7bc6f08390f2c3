// Guard decision logic

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;

use crate::config::TruthSeekingConfig;
use crate::errors::AtlesError;
use crate::patterns::{PatternMatch, Rule, RuleLibrary, Scenario, SynonymTable, TruthSeekingMatcher};

/// A detector hit and the text that replaces the backend answer
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Correction {
    /// Scenario name or custom rule name
    pub rule: String,
    pub pattern_match: PatternMatch,
    pub response: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GuardDecision {
    Corrected(Correction),
    Forward,
}

impl GuardDecision {
    pub fn as_str(&self) -> &str {
        match self {
            GuardDecision::Corrected(_) => "corrected",
            GuardDecision::Forward => "forward",
        }
    }

    pub fn correction(&self) -> Option<&Correction> {
        match self {
            GuardDecision::Corrected(c) => Some(c),
            GuardDecision::Forward => None,
        }
    }
}

/// Runs built-in scenarios, then custom rules; first hit wins
#[derive(Debug, Clone)]
pub struct TruthGuard {
    matcher: TruthSeekingMatcher,
    enabled: bool,
    scenarios: Vec<Scenario>,
    responses: HashMap<Scenario, String>,
    rules: Vec<Rule>,
    max_distance: Option<usize>,
}

impl TruthGuard {
    /// Guard with every built-in scenario and default responses
    pub fn new(matcher: TruthSeekingMatcher) -> Self {
        Self {
            matcher,
            enabled: true,
            scenarios: Scenario::ALL.to_vec(),
            responses: HashMap::new(),
            rules: Vec::new(),
            max_distance: None,
        }
    }

    /// Build from the `[truth_seeking]` config section, loading the rule
    /// pack if one is configured
    pub fn from_config(config: &TruthSeekingConfig) -> Result<Self> {
        let synonyms = SynonymTable::with_extra_groups(&config.synonyms);
        let mut guard = Self::new(TruthSeekingMatcher::new(synonyms))
            .with_scenarios(config.scenarios.clone());
        guard.enabled = config.enabled;
        guard.max_distance = config.max_distance;

        for (name, response) in &config.responses {
            let scenario = name.parse::<Scenario>().map_err(AtlesError::config)?;
            guard.responses.insert(scenario, response.clone());
        }

        let mut library = RuleLibrary {
            rules: config.rules.clone(),
        };
        if let Some(path) = &config.rules_file {
            library.extend(RuleLibrary::load_from_file(path)?);
        }
        for rule in library.rules {
            guard.add_rule(rule)?;
        }

        tracing::debug!(
            enabled = guard.enabled,
            scenarios = guard.scenarios.len(),
            rules = guard.rules.len(),
            "Truth guard configured"
        );

        Ok(guard)
    }

    pub fn with_scenarios(mut self, scenarios: Vec<Scenario>) -> Self {
        let mut unique = Vec::with_capacity(scenarios.len());
        for scenario in scenarios {
            if !unique.contains(&scenario) {
                unique.push(scenario);
            }
        }
        self.scenarios = unique;
        self
    }

    pub fn with_response(mut self, scenario: Scenario, response: impl Into<String>) -> Self {
        self.responses.insert(scenario, response.into());
        self
    }

    /// Add a custom rule after validating it
    pub fn add_rule(&mut self, rule: Rule) -> std::result::Result<(), AtlesError> {
        rule.validate()?;
        if self.rules.iter().any(|r| r.name == rule.name) {
            return Err(AtlesError::invalid_rule(&rule.name, "duplicate rule name"));
        }
        self.rules.push(rule);
        Ok(())
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn matcher(&self) -> &TruthSeekingMatcher {
        &self.matcher
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn max_distance(&self) -> Option<usize> {
        self.max_distance
    }

    pub fn response_for(&self, scenario: Scenario) -> &str {
        self.responses
            .get(&scenario)
            .map(String::as_str)
            .unwrap_or_else(|| scenario.default_response())
    }

    /// Decide whether a prompt gets corrected or forwarded
    pub fn check(&self, text: &str) -> GuardDecision {
        if !self.enabled {
            tracing::info!("Guard decision: FORWARD (truth seeking disabled)");
            return GuardDecision::Forward;
        }

        for scenario in &self.scenarios {
            let result = self.matcher.detect(*scenario, text);
            if result.matched {
                tracing::info!(
                    "Guard decision: CORRECTED ({}, confidence {:.2})",
                    scenario,
                    result.confidence
                );
                return GuardDecision::Corrected(Correction {
                    rule: scenario.as_str().to_string(),
                    pattern_match: result,
                    response: self.response_for(*scenario).to_string(),
                });
            }
        }

        for rule in &self.rules {
            let result = rule.evaluate(&self.matcher, text);
            if result.matched {
                tracing::info!("Guard decision: CORRECTED (rule {})", rule.name);
                return GuardDecision::Corrected(Correction {
                    rule: rule.name.clone(),
                    pattern_match: result,
                    response: rule.response.clone(),
                });
            }
        }

        tracing::info!("Guard decision: FORWARD (no misinformation pattern)");
        GuardDecision::Forward
    }

    /// Every enabled scenario and rule with its result, for diagnostics
    pub fn evaluate_all(&self, text: &str) -> Vec<(String, PatternMatch)> {
        let scenarios = self
            .scenarios
            .iter()
            .map(|s| (s.as_str().to_string(), self.matcher.detect(*s, text)));
        let rules = self
            .rules
            .iter()
            .map(|r| (r.name.clone(), r.evaluate(&self.matcher, text)));
        scenarios.chain(rules).collect()
    }
}

impl Default for TruthGuard {
    fn default() -> Self {
        Self::new(TruthSeekingMatcher::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::PatternType;
    use std::collections::BTreeMap;

    fn moon_rule() -> Rule {
        Rule {
            name: "moon_cheese".to_string(),
            concepts: vec![vec!["moon".to_string()], vec!["cheese".to_string()]],
            pattern: None,
            response: "The Moon is made of rock.".to_string(),
        }
    }

    #[test]
    fn test_decision_as_str() {
        assert_eq!(GuardDecision::Forward.as_str(), "forward");
    }

    #[test]
    fn test_check_corrects_scenarios() {
        let guard = TruthGuard::default();

        let decision = guard.check("World War II ended in 1944");
        let correction = decision.correction().expect("expected correction");
        assert_eq!(correction.rule, "wwii_1944");
        assert_eq!(correction.response, Scenario::Wwii1944.default_response());

        let decision = guard.check("Pi equals exactly 3.0");
        assert_eq!(decision.correction().unwrap().rule, "pi_equals_3");
    }

    #[test]
    fn test_check_forwards_clean_prompts() {
        let guard = TruthGuard::default();
        assert_eq!(guard.check("How do I learn Rust?"), GuardDecision::Forward);
        assert_eq!(guard.check("Pi is approximately 3.14159"), GuardDecision::Forward);
        assert_eq!(guard.check(""), GuardDecision::Forward);
    }

    #[test]
    fn test_check_forwards_pi_questions() {
        let guard = TruthGuard::default();
        for prompt in [
            "The radius is 3 cm, what is the area using pi?",
            "What is pi times 3?",
            "Pi Day is 3/14",
        ] {
            assert_eq!(guard.check(prompt), GuardDecision::Forward, "{}", prompt);
        }

        let decision = guard.check("I am almost sure pi equals 3");
        assert_eq!(decision.correction().unwrap().rule, "pi_equals_3");
    }

    #[test]
    fn test_disabled_guard_forwards() {
        let mut guard = TruthGuard::default();
        guard.set_enabled(false);
        assert_eq!(guard.check("World War II ended in 1944"), GuardDecision::Forward);
    }

    #[test]
    fn test_scenario_subset() {
        let guard = TruthGuard::default().with_scenarios(vec![Scenario::PiEquals3, Scenario::PiEquals3]);
        assert_eq!(guard.scenarios(), &[Scenario::PiEquals3]);
        assert_eq!(guard.check("World War II ended in 1944"), GuardDecision::Forward);
    }

    #[test]
    fn test_response_override() {
        let guard = TruthGuard::default().with_response(Scenario::PiEquals3, "Nope.");
        let decision = guard.check("pi = 3");
        assert_eq!(decision.correction().unwrap().response, "Nope.");
    }

    #[test]
    fn test_custom_rule() {
        let mut guard = TruthGuard::default();
        guard.add_rule(moon_rule()).unwrap();

        let decision = guard.check("Is the moon made of cheese?");
        let correction = decision.correction().unwrap();
        assert_eq!(correction.rule, "moon_cheese");
        assert_eq!(correction.pattern_match.pattern_type, PatternType::Custom);

        assert!(matches!(
            guard.add_rule(moon_rule()),
            Err(AtlesError::InvalidRule { .. })
        ));
    }

    #[test]
    fn test_from_config_with_synonyms() {
        let mut synonyms = BTreeMap::new();
        synonyms.insert("moon".to_string(), vec!["luna".to_string()]);

        let mut responses = BTreeMap::new();
        responses.insert("wwii_1944".to_string(), "1945.".to_string());

        let config = TruthSeekingConfig {
            synonyms,
            responses,
            rules: vec![moon_rule()],
            max_distance: Some(25),
            ..TruthSeekingConfig::default()
        };

        let guard = TruthGuard::from_config(&config).unwrap();
        assert_eq!(guard.max_distance(), Some(25));
        assert_eq!(guard.check("luna is cheese").correction().unwrap().rule, "moon_cheese");
        assert_eq!(guard.check("WW2 ended in 1944").correction().unwrap().response, "1945.");
    }

    #[test]
    fn test_evaluate_all() {
        let mut guard = TruthGuard::default();
        guard.add_rule(moon_rule()).unwrap();

        let results = guard.evaluate_all("pi = 3");
        assert_eq!(results.len(), 4);
        let hits: Vec<&str> = results
            .iter()
            .filter(|(_, m)| m.matched)
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(hits, vec!["pi_equals_3"]);
    }
}
