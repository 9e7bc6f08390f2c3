// Subcommand handling

use anyhow::Result;
use serde_json::json;

use super::args::Command;
use crate::config::Config;
use crate::guard::{ConstitutionalClient, GuardDecision, Reply, TruthGuard};
use crate::logging::AuditLogger;
use crate::patterns::{normalize, PatternMatch};
use crate::providers::create_provider;

/// Run a subcommand and return what should be printed
pub async fn handle_command(command: &Command, config: &Config, as_json: bool) -> Result<String> {
    match command {
        Command::Check { text } => {
            let mut client = build_client(config)?;
            let decision = client.check(&text.join(" "))?;
            client.flush_audit()?;
            Ok(format_decision(&decision, as_json))
        }
        Command::Ask { prompt } => {
            let mut client = build_client(config)?;
            let reply = client.respond(&prompt.join(" ")).await?;
            client.flush_audit()?;
            Ok(format_reply(&reply, as_json))
        }
        Command::Expand { words } => {
            let guard = TruthGuard::from_config(&config.truth_seeking)?;
            let expanded = guard.matcher().expand_with_synonyms(words.as_slice());
            if as_json {
                Ok(json!(expanded).to_string())
            } else {
                Ok(expanded.into_iter().collect::<Vec<_>>().join("\n"))
            }
        }
        Command::Normalize { text } => {
            let normalized = normalize(&text.join(" "));
            if as_json {
                Ok(json!({ "normalized": normalized }).to_string())
            } else {
                Ok(normalized)
            }
        }
        Command::Flex {
            text,
            require,
            context,
        } => {
            let guard = TruthGuard::from_config(&config.truth_seeking)?;
            let required: Vec<&str> = require.iter().map(String::as_str).collect();
            let context: Vec<&str> = context.iter().map(String::as_str).collect();
            let result = guard.matcher().flexible_match(
                &text.join(" "),
                &required,
                (!context.is_empty()).then_some(context.as_slice()),
                guard.max_distance(),
            );
            Ok(format_match(&result, as_json))
        }
        Command::Exact { pattern, text } => {
            let guard = TruthGuard::from_config(&config.truth_seeking)?;
            let result = guard.matcher().match_exact_pattern(&text.join(" "), pattern);
            Ok(format_match(&result, as_json))
        }
        Command::Scenarios => {
            let guard = TruthGuard::from_config(&config.truth_seeking)?;
            Ok(format_scenarios(&guard, as_json))
        }
    }
}

fn build_client(config: &Config) -> Result<ConstitutionalClient> {
    let guard = TruthGuard::from_config(&config.truth_seeking)?;
    let provider = create_provider(&config.backend)?;
    let mut client = ConstitutionalClient::new(guard, provider);

    if let Some(path) = &config.logging.audit_log {
        client = client.with_audit_logger(AuditLogger::new(path.clone())?);
    }

    Ok(client)
}

fn format_decision(decision: &GuardDecision, as_json: bool) -> String {
    match (decision, as_json) {
        (GuardDecision::Corrected(correction), true) => {
            json!({ "decision": "corrected", "correction": correction }).to_string()
        }
        (GuardDecision::Forward, true) => json!({ "decision": "forward" }).to_string(),
        (GuardDecision::Corrected(correction), false) => format!(
            "CORRECTED [{}] (confidence {:.2})\n{}",
            correction.rule, correction.pattern_match.confidence, correction.response
        ),
        (GuardDecision::Forward, false) => "FORWARD (no misinformation pattern)".to_string(),
    }
}

fn format_reply(reply: &Reply, as_json: bool) -> String {
    if as_json {
        return json!(reply).to_string();
    }
    reply.text().to_string()
}

fn format_match(result: &PatternMatch, as_json: bool) -> String {
    if as_json {
        return json!(result).to_string();
    }
    match (&result.matched_pattern, result.matched) {
        (Some(what), true) => format!(
            "MATCH {} (confidence {:.2}): {}",
            result.pattern_type, result.confidence, what
        ),
        _ => format!("NO MATCH {}", result.pattern_type),
    }
}

fn format_scenarios(guard: &TruthGuard, as_json: bool) -> String {
    if as_json {
        let scenarios: Vec<_> = guard
            .scenarios()
            .iter()
            .map(|s| json!({ "name": s.as_str(), "description": s.description() }))
            .collect();
        let rules: Vec<_> = guard.rules().iter().map(|r| r.name.clone()).collect();
        return json!({
            "enabled": guard.is_enabled(),
            "scenarios": scenarios,
            "rules": rules,
        })
        .to_string();
    }

    let mut output = format!(
        "Truth seeking: {}\n\nScenarios:\n",
        if guard.is_enabled() { "enabled" } else { "disabled" }
    );
    for (i, scenario) in guard.scenarios().iter().enumerate() {
        output.push_str(&format!(
            "  {}. {} - {}\n",
            i + 1,
            scenario,
            scenario.description()
        ));
    }

    if !guard.rules().is_empty() {
        output.push_str("\nCustom rules:\n");
        for (i, rule) in guard.rules().iter().enumerate() {
            output.push_str(&format!("  {}. {}\n", i + 1, rule.name));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_config() -> Config {
        let mut config = Config::default();
        config.backend.provider = "none".to_string();
        config
    }

    fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[tokio::test]
    async fn test_check_command() {
        let command = Command::Check {
            text: words("World War II ended in 1944"),
        };
        let output = handle_command(&command, &offline_config(), false).await.unwrap();
        assert!(output.starts_with("CORRECTED [wwii_1944]"));

        let command = Command::Check {
            text: words("What is Rust?"),
        };
        let output = handle_command(&command, &offline_config(), true).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["decision"], "forward");
    }

    #[tokio::test]
    async fn test_ask_with_null_backend() {
        let command = Command::Ask {
            prompt: words("Pi equals exactly 3.0"),
        };
        let output = handle_command(&command, &offline_config(), true).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["kind"], "corrected");
        assert_eq!(value["rule"], "pi_equals_3");
    }

    #[tokio::test]
    async fn test_expand_and_normalize() {
        let command = Command::Expand {
            words: vec!["wwii".to_string()],
        };
        let output = handle_command(&command, &offline_config(), false).await.unwrap();
        assert!(output.lines().any(|l| l == "second world war"));

        let command = Command::Normalize {
            text: vec!["  HELLO\t".to_string(), "World ".to_string()],
        };
        let output = handle_command(&command, &offline_config(), false).await.unwrap();
        assert_eq!(output, "hello world");
    }

    #[tokio::test]
    async fn test_flex_and_exact() {
        let command = Command::Flex {
            text: words("The second world war concluded"),
            require: vec!["wwii".to_string(), "ended".to_string()],
            context: vec![],
        };
        let output = handle_command(&command, &offline_config(), false).await.unwrap();
        assert!(output.starts_with("MATCH flexible"));

        let command = Command::Exact {
            pattern: "[".to_string(),
            text: words("anything"),
        };
        let output = handle_command(&command, &offline_config(), false).await.unwrap();
        assert_eq!(output, "NO MATCH exact");
    }

    #[tokio::test]
    async fn test_scenarios_listing() {
        let output = handle_command(&Command::Scenarios, &offline_config(), false)
            .await
            .unwrap();
        assert!(output.contains("1. wwii_1944"));
        assert!(output.contains("3. pi_equals_3"));
    }
}
