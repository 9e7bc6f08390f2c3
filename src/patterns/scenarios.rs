// Built-in misinformation detectors
//
// Each detector is concept presence plus value discrimination. All of
// them fail closed: anything ambiguous is a non-match.

use once_cell::sync::Lazy;
use regex::{Match, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use super::matcher::{normalize, TruthSeekingMatcher};
use super::types::{PatternMatch, PatternType};

static YEAR_1944: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b1944\b").expect("static regex"));

static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("static regex"));

// Group 1 present means "three point ..." which spells out a decimal
static THREE_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bthree\b(\s+point\b)?").expect("static regex"));

/// Widest gap, in words, between pi and a three claim
const MAX_CLAIM_GAP_WORDS: usize = 4;

/// Fractional digits of pi
const PI_FRACTION: &str = "14159265358979323846264338327950288419716939937510";

/// The three built-in detectors
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Scenario {
    #[serde(rename = "wwii_1944")]
    Wwii1944,
    #[serde(rename = "tesla_evs_shutdown")]
    TeslaEvsShutdown,
    #[serde(rename = "pi_equals_3")]
    PiEquals3,
}

impl Scenario {
    /// Evaluation order used by the guard
    pub const ALL: [Scenario; 3] = [
        Scenario::Wwii1944,
        Scenario::TeslaEvsShutdown,
        Scenario::PiEquals3,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Wwii1944 => "wwii_1944",
            Scenario::TeslaEvsShutdown => "tesla_evs_shutdown",
            Scenario::PiEquals3 => "pi_equals_3",
        }
    }

    pub fn pattern_type(&self) -> PatternType {
        match self {
            Scenario::Wwii1944 => PatternType::Wwii1944,
            Scenario::TeslaEvsShutdown => PatternType::TeslaEvsShutdown,
            Scenario::PiEquals3 => PatternType::PiEquals3,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Scenario::Wwii1944 => "Claims that World War II ended in 1944",
            Scenario::TeslaEvsShutdown => "Claims that Tesla is shutting down its electric vehicles",
            Scenario::PiEquals3 => "Claims that pi is exactly 3",
        }
    }

    /// Corrective text returned instead of forwarding the prompt
    pub fn default_response(&self) -> &'static str {
        match self {
            Scenario::Wwii1944 => {
                "World War II did not end in 1944. The war in Europe ended on 8 May 1945 \
                 (V-E Day), and the war in the Pacific ended with Japan's formal surrender \
                 on 2 September 1945."
            }
            Scenario::TeslaEvsShutdown => {
                "I have no reliable information that Tesla is shutting down its electric \
                 vehicle business. Electric vehicles remain Tesla's core product line; please \
                 check an official Tesla source before relying on that claim."
            }
            Scenario::PiEquals3 => {
                "Pi is not equal to 3. It is an irrational number, approximately 3.14159, \
                 whose decimal expansion never ends and never repeats."
            }
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "wwii_1944" => Ok(Scenario::Wwii1944),
            "tesla_evs_shutdown" => Ok(Scenario::TeslaEvsShutdown),
            "pi_equals_3" => Ok(Scenario::PiEquals3),
            other => Err(format!("unknown scenario '{}'", other)),
        }
    }
}

impl TruthSeekingMatcher {
    pub fn detect(&self, scenario: Scenario, text: &str) -> PatternMatch {
        match scenario {
            Scenario::Wwii1944 => self.wwii_1944(text),
            Scenario::TeslaEvsShutdown => self.tesla_evs_shutdown(text),
            Scenario::PiEquals3 => self.pi_equals_3(text),
        }
    }

    /// "World War II ended in 1944"
    ///
    /// WWII context plus 1944 is enough; an ending phrase just before the
    /// year raises confidence from 0.9 to 1.0.
    pub fn wwii_1944(&self, text: &str) -> PatternMatch {
        let normalized = normalize(text);
        let Some(war) = self.concept_present(&normalized, "wwii") else {
            return PatternMatch::miss(PatternType::Wwii1944);
        };

        if let Some(m) = self.ended_near_1944.find(&normalized) {
            debug!("WWII/1944 claim with ending phrase: {}", m.as_str());
            return PatternMatch::hit(
                PatternType::Wwii1944,
                format!("{} + {}", war, m.as_str()),
                1.0,
            );
        }

        if YEAR_1944.is_match(&normalized) {
            debug!("WWII/1944 claim without ending phrase");
            return PatternMatch::hit(PatternType::Wwii1944, format!("{} + 1944", war), 0.9);
        }

        PatternMatch::miss(PatternType::Wwii1944)
    }

    /// "Tesla is shutting down EVs"
    pub fn tesla_evs_shutdown(&self, text: &str) -> PatternMatch {
        let normalized = normalize(text);

        let subject = self
            .concept_present(&normalized, "tesla")
            .or_else(|| self.concept_present(&normalized, "elon musk"));
        let shutdown = self.concept_present(&normalized, "shutting down");
        let vehicles = self.concept_present(&normalized, "evs");

        let (Some(subject), Some(shutdown), Some(vehicles)) = (subject, shutdown, vehicles) else {
            return PatternMatch::miss(PatternType::TeslaEvsShutdown);
        };

        let description = format!("{} + {} + {}", subject, shutdown, vehicles);
        match self.concept_present(&normalized, "announced") {
            Some(announced) => PatternMatch::hit(
                PatternType::TeslaEvsShutdown,
                format!("{} + {}", description, announced),
                1.0,
            ),
            None => PatternMatch::hit(PatternType::TeslaEvsShutdown, description, 0.9),
        }
    }

    /// "Pi equals 3"
    ///
    /// Needs pi, then an equality phrase, then a three claim, in that order
    /// and at most [`MAX_CLAIM_GAP_WORDS`] words apart. A hedge
    /// ("approximately", "about", ...) between pi and the claim suppresses
    /// that pairing, as does any correct decimal approximation of pi in the
    /// text. Bare "is" only counts when it is the whole gap ("pi is 3") and
    /// gives 0.9 confidence.
    pub fn pi_equals_3(&self, text: &str) -> PatternMatch {
        let normalized = normalize(text);

        let pis = self.concept_spans(&normalized, "pi");
        if pis.is_empty() {
            return PatternMatch::miss(PatternType::PiEquals3);
        }

        if let Some(token) = numeric_tokens(&normalized).find(|m| is_pi_approximation(m.as_str())) {
            debug!("Correct pi approximation present: {}", token.as_str());
            return PatternMatch::miss(PatternType::PiEquals3);
        }

        let claims = three_claims(&normalized);
        let equals = self.concept_spans(&normalized, "equals");
        let hedges = self.concept_spans(&normalized, "approximately");

        for &(pi_start, pi_end, pi) in &pis {
            for &(claim_start, claim_end, ref claim) in &claims {
                if claim_start < pi_end {
                    continue;
                }
                let gap_text = &normalized[pi_end..claim_start];
                if gap_text.split_whitespace().count() > MAX_CLAIM_GAP_WORDS {
                    break;
                }

                let gap = (pi_end, claim_start);
                if let Some(hedge) = hedges.iter().find(|span| inside(span, gap)) {
                    debug!("Pi claim hedged by '{}'", hedge.2);
                    continue;
                }

                let strong = equals
                    .iter()
                    .filter(|span| inside(span, gap))
                    .map(|span| span.2)
                    .filter(|form| *form != "is")
                    .max_by_key(|form| form.len());
                let (phrase, confidence) = match strong {
                    Some(form) => (form, 1.0),
                    None if gap_text.trim() == "is" => ("is", 0.9),
                    None => continue,
                };

                debug!(
                    "Pi claim at {}..{}: {}",
                    pi_start,
                    claim_end,
                    &normalized[pi_start..claim_end]
                );
                return PatternMatch::hit(
                    PatternType::PiEquals3,
                    format!("{} + {} + {}", pi, phrase, claim),
                    confidence,
                );
            }
        }

        PatternMatch::miss(PatternType::PiEquals3)
    }
}

fn inside(span: &(usize, usize, &str), gap: (usize, usize)) -> bool {
    span.0 >= gap.0 && span.1 <= gap.1
}

/// Claims of exactly three as `(start, end, token)`, ordered by position:
/// standalone 3-valued numbers and the word "three" not spelling a decimal
fn three_claims(normalized: &str) -> Vec<(usize, usize, String)> {
    let numbers = numeric_tokens(normalized)
        .filter(|m| is_exactly_three(m.as_str()))
        .map(|m| (m.start(), m.end(), m.as_str().to_string()));
    let words = THREE_WORD
        .captures_iter(normalized)
        .filter(|caps| caps.get(1).is_none())
        .filter_map(|caps| caps.get(0))
        .map(|m| (m.start(), m.end(), "three".to_string()));

    let mut claims: Vec<_> = numbers.chain(words).collect();
    claims.sort_unstable();
    claims
}

/// Standalone numbers in normalized text. Digits glued to letters ("mp3",
/// "3d") or to a preceding dot are not numbers for this purpose.
fn numeric_tokens(normalized: &str) -> impl Iterator<Item = Match<'_>> {
    NUMBER.find_iter(normalized).filter_map(move |m| {
        let before = normalized[..m.start()].chars().next_back();
        let after = normalized[m.end()..].chars().next();
        let glued_before = before.is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '.');
        let glued_after = after.is_some_and(|c| c.is_alphanumeric() || c == '_');
        (!glued_before && !glued_after).then_some(m)
    })
}

fn split_number(token: &str) -> (&str, &str) {
    match token.split_once('.') {
        Some((int, frac)) => (int, frac),
        None => (token, ""),
    }
}

fn integer_part_is_three(int: &str) -> bool {
    int.trim_start_matches('0') == "3"
}

/// 3, 3.0, 3.00, 03
fn is_exactly_three(token: &str) -> bool {
    let (int, frac) = split_number(token);
    integer_part_is_three(int) && frac.chars().all(|c| c == '0')
}

/// Pi truncated or rounded to the token's precision, with at least two
/// fractional digits: 3.14, 3.141, 3.142, 3.1416, 3.14159, ...
fn is_pi_approximation(token: &str) -> bool {
    let (int, frac) = split_number(token);
    if !integer_part_is_three(int) || frac.len() < 2 {
        return false;
    }

    if frac.len() >= PI_FRACTION.len() {
        return frac.starts_with(PI_FRACTION);
    }

    let truncated = &PI_FRACTION[..frac.len()];
    frac == truncated || frac == round_fraction(frac.len())
}

/// Pi's fraction rounded half-up to `digits` places. A carry out of the
/// fraction is impossible for pi at any supported precision.
fn round_fraction(digits: usize) -> String {
    let mut out: Vec<u8> = PI_FRACTION.as_bytes()[..digits].to_vec();
    if PI_FRACTION.as_bytes()[digits] >= b'5' {
        for d in out.iter_mut().rev() {
            if *d == b'9' {
                *d = b'0';
            } else {
                *d += 1;
                break;
            }
        }
    }
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> TruthSeekingMatcher {
        TruthSeekingMatcher::default()
    }

    #[test]
    fn test_wwii_1944_positive() {
        let m = matcher();
        let result = m.wwii_1944("World War II ended in 1944");
        assert!(result.matched);
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.pattern_type, PatternType::Wwii1944);

        assert!(m.wwii_1944("WWII concluded 1944").matched);
        assert!(m.wwii_1944("The Second World War... it ended in 1944").matched);
    }

    #[test]
    fn test_wwii_1944_without_ending_phrase() {
        let result = matcher().wwii_1944("ww2 was over by 1944, right?");
        assert!(result.matched);

        let result = matcher().wwii_1944("Tell me about WW2 in 1944");
        assert!(result.matched);
        assert_eq!(result.confidence, 0.9);
    }

    #[test]
    fn test_wwii_1944_negative() {
        let m = matcher();
        assert!(!m.wwii_1944("World War II ended in 1945").matched);
        assert!(!m.wwii_1944("The war ended in 1944").matched);
        assert!(!m.wwii_1944("").matched);
        assert!(!m.wwii_1944("World War II ended in 19445").matched);
    }

    #[test]
    fn test_tesla_positive() {
        let m = matcher();
        let result = m.tesla_evs_shutdown("Elon Musk announced Tesla shutting down EVs yesterday");
        assert!(result.matched);
        assert_eq!(result.confidence, 1.0);

        let result = m.tesla_evs_shutdown("Tesla is discontinuing electric cars");
        assert!(result.matched);
        assert_eq!(result.confidence, 0.9);

        assert!(m.tesla_evs_shutdown("Musk will shut down EV production").matched);
    }

    #[test]
    fn test_tesla_negative() {
        let m = matcher();
        assert!(!m.tesla_evs_shutdown("Tesla is expanding EV production").matched);
        assert!(!m.tesla_evs_shutdown("Ford is shutting down EVs").matched);
        assert!(!m.tesla_evs_shutdown("Tesla is shutting down a factory").matched);
        assert!(!m.tesla_evs_shutdown("").matched);
    }

    #[test]
    fn test_pi_positive() {
        let m = matcher();
        let result = m.pi_equals_3("Pi equals exactly 3.0");
        assert!(result.matched);
        assert_eq!(result.confidence, 1.0);

        assert!(m.pi_equals_3("pi = 3").matched);
        assert!(m.pi_equals_3("π equals three").matched);

        let result = m.pi_equals_3("Pi is 3");
        assert!(result.matched);
        assert_eq!(result.confidence, 0.9);
    }

    #[test]
    fn test_pi_correct_values_not_flagged() {
        let m = matcher();
        assert!(!m.pi_equals_3("Pi is approximately 3.14159").matched);
        assert!(!m.pi_equals_3("Pi equals 3.14").matched);
        assert!(!m.pi_equals_3("pi = 3.141").matched);
        assert!(!m.pi_equals_3("pi = 3.1416").matched);
        assert!(!m.pi_equals_3("Pi equals three point one four").matched);
        assert!(!m.pi_equals_3("Pi equals 3, well 3.14 really").matched);
    }

    #[test]
    fn test_pi_hedged_not_flagged() {
        let m = matcher();
        assert!(!m.pi_equals_3("pi is approximately 3").matched);
        assert!(!m.pi_equals_3("Pi is about 3").matched);
        assert!(!m.pi_equals_3("pi is ≈ 3").matched);
    }

    #[test]
    fn test_pi_unrelated_is_and_three_not_flagged() {
        let m = matcher();
        assert!(!m.pi_equals_3("The radius is 3 cm, what is the area using pi?").matched);
        assert!(!m.pi_equals_3("What is pi times 3?").matched);
        assert!(!m.pi_equals_3("Pi Day is 3/14").matched);
        assert!(!m.pi_equals_3("3 equals pi").matched);
        assert!(
            !m.pi_equals_3("pi shows up in many formulas and the answer is 3").matched
        );
    }

    #[test]
    fn test_pi_hedge_outside_claim_still_flagged() {
        let m = matcher();
        let result = m.pi_equals_3("Everyone is talking about how pi equals 3");
        assert!(result.matched);
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.matched_pattern.as_deref(), Some("pi + equals + 3"));

        assert!(m.pi_equals_3("I am almost sure pi equals 3").matched);
        assert!(m.pi_equals_3("pi = 3, roughly speaking").matched);
    }

    #[test]
    fn test_pi_hedge_inside_claim_suppresses() {
        let m = matcher();
        assert!(!m.pi_equals_3("pi equals about 3").matched);
        assert!(!m.pi_equals_3("pi is roughly three").matched);
        assert!(!m.pi_equals_3("pi is nearly equal to 3").matched);
    }

    #[test]
    fn test_pi_second_pairing_can_match() {
        let m = matcher();
        // First pi is hedged, the second one is not
        let result = m.pi_equals_3("pi is about 3, no wait, pi = 3");
        assert!(result.matched);
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_pi_other_values_not_flagged() {
        let m = matcher();
        assert!(!m.pi_equals_3("pi equals 3.150").matched);
        assert!(!m.pi_equals_3("pi equals 4").matched);
        assert!(!m.pi_equals_3("my mp3 player equals pi").matched);
        assert!(!m.pi_equals_3("three equals three").matched);
        assert!(!m.pi_equals_3("").matched);
    }

    #[test]
    fn test_case_invariance() {
        let m = matcher();
        let cases = [
            ("WORLD WAR II ENDED IN 1944", "world war ii ended in 1944"),
            (
                "ELON MUSK ANNOUNCED TESLA SHUTTING DOWN EVS",
                "elon musk announced tesla shutting down evs",
            ),
            ("PI EQUALS EXACTLY 3.0", "pi equals exactly 3.0"),
            ("PI IS APPROXIMATELY 3.14159", "pi is approximately 3.14159"),
        ];
        for (upper, lower) in cases {
            for scenario in Scenario::ALL {
                assert_eq!(
                    m.detect(scenario, upper).matched,
                    m.detect(scenario, lower).matched,
                    "{} differs for {:?}",
                    scenario,
                    upper
                );
            }
        }
    }

    #[test]
    fn test_punctuation_robustness() {
        let m = matcher();
        let positives = [
            (Scenario::Wwii1944, "World War II ended in 1944"),
            (
                Scenario::TeslaEvsShutdown,
                "Elon Musk announced Tesla shutting down EVs",
            ),
            (Scenario::PiEquals3, "Pi equals exactly 3.0"),
        ];
        for (scenario, text) in positives {
            for suffix in [".", "!", "?", "..."] {
                let input = format!("{}{}", text, suffix);
                assert!(m.detect(scenario, &input).matched, "lost match for {:?}", input);
            }
        }
    }

    #[test]
    fn test_pi_approximation_policy() {
        assert!(is_pi_approximation("3.14"));
        assert!(is_pi_approximation("3.141"));
        assert!(is_pi_approximation("3.142"));
        assert!(is_pi_approximation("3.1416"));
        assert!(is_pi_approximation("3.14159"));
        assert!(!is_pi_approximation("3.1"));
        assert!(!is_pi_approximation("3.150"));
        assert!(!is_pi_approximation("3.15"));
        assert!(!is_pi_approximation("4.14"));
    }

    #[test]
    fn test_exactly_three() {
        assert!(is_exactly_three("3"));
        assert!(is_exactly_three("3.0"));
        assert!(is_exactly_three("3.000"));
        assert!(!is_exactly_three("3.01"));
        assert!(!is_exactly_three("33"));
        assert!(!is_exactly_three("13"));
    }

    #[test]
    fn test_scenario_names_round_trip() {
        for scenario in Scenario::ALL {
            assert_eq!(scenario.as_str().parse::<Scenario>().unwrap(), scenario);
        }
        assert!("moon_landing".parse::<Scenario>().is_err());
    }
}
