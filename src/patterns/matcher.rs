// Truth-seeking phrase matcher
//
// General-purpose flexible / context-aware / exact matching over
// normalized text. The scenario detectors in scenarios.rs are built on
// the same primitives.

use regex::Regex;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, warn};

use super::synonyms::SynonymTable;
use super::types::{PatternMatch, PatternType};

/// Lowercase, collapse whitespace runs to one space, trim
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Regex source for a term with word boundaries on its word-char edges.
///
/// `\b` cannot anchor a non-word edge ("=", "≈"), so those
/// edges are matched literally.
pub(crate) fn bounded_term(term: &str) -> String {
    let mut source = String::with_capacity(term.len() + 4);
    if term.chars().next().is_some_and(is_word_char) {
        source.push_str(r"\b");
    }
    source.push_str(&regex::escape(term));
    if term.chars().last().is_some_and(is_word_char) {
        source.push_str(r"\b");
    }
    source
}

/// Stateless matcher over an immutable synonym table
///
/// Term regexes for every form in the table are compiled once at
/// construction; ad-hoc terms are compiled per call.
#[derive(Debug, Clone)]
pub struct TruthSeekingMatcher {
    synonyms: SynonymTable,
    term_patterns: HashMap<String, Regex>,
    pub(crate) ended_near_1944: Regex,
}

impl TruthSeekingMatcher {
    pub fn new(synonyms: SynonymTable) -> Self {
        let term_patterns = synonyms
            .all_forms()
            .filter(|form| !form.is_empty())
            .filter_map(|form| {
                Regex::new(&bounded_term(form))
                    .ok()
                    .map(|re| (form.to_string(), re))
            })
            .collect();

        let ended_near_1944 = build_ended_near_1944(&synonyms);

        Self {
            synonyms,
            term_patterns,
            ended_near_1944,
        }
    }

    pub fn synonyms(&self) -> &SynonymTable {
        &self.synonyms
    }

    /// See [`SynonymTable::expand_with_synonyms`]
    pub fn expand_with_synonyms<S: AsRef<str>>(&self, words: &[S]) -> BTreeSet<String> {
        self.synonyms.expand_with_synonyms(words)
    }

    /// Word-boundary presence of `term` in already-normalized text
    pub fn contains_term(&self, normalized: &str, term: &str) -> bool {
        if term.is_empty() {
            return false;
        }
        match self.term_patterns.get(term) {
            Some(re) => re.is_match(normalized),
            None => Regex::new(&bounded_term(term))
                .map(|re| re.is_match(normalized))
                .unwrap_or(false),
        }
    }

    /// Surface forms of `concept` present in normalized text, by exact
    /// synonym-set membership (no loose expansion)
    pub(crate) fn concept_hits<'a>(&'a self, normalized: &str, concept: &str) -> Vec<&'a str> {
        self.synonyms
            .synonyms_for(concept)
            .map(|forms| {
                forms
                    .iter()
                    .map(String::as_str)
                    .filter(|form| self.contains_term(normalized, form))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every occurrence of a form of `concept` as `(start, end, form)`,
    /// ordered by position
    pub(crate) fn concept_spans<'a>(
        &'a self,
        normalized: &str,
        concept: &str,
    ) -> Vec<(usize, usize, &'a str)> {
        let Some(forms) = self.synonyms.synonyms_for(concept) else {
            return Vec::new();
        };

        let mut spans: Vec<(usize, usize, &str)> = forms
            .iter()
            .filter_map(|form| self.term_patterns.get(form).map(|re| (form.as_str(), re)))
            .flat_map(move |(form, re)| {
                re.find_iter(normalized)
                    .map(move |m| (m.start(), m.end(), form))
            })
            .collect();
        spans.sort_unstable();
        spans
    }

    /// Longest surface form of `concept` present in normalized text
    pub(crate) fn concept_present<'a>(&'a self, normalized: &str, concept: &str) -> Option<&'a str> {
        self.concept_hits(normalized, concept)
            .into_iter()
            .max_by_key(|form| form.len())
    }

    /// Flexible match: every required word must be hit by at least one of
    /// its synonyms; if context words are given, at least one of them (or
    /// their synonyms) must be present too.
    ///
    /// `max_distance` is accepted as a tuning knob but does not affect the
    /// result.
    pub fn flexible_match(
        &self,
        text: &str,
        required_words: &[&str],
        context_words: Option<&[&str]>,
        max_distance: Option<usize>,
    ) -> PatternMatch {
        let normalized = normalize(text);
        if normalized.is_empty() || required_words.is_empty() {
            return PatternMatch::miss(PatternType::Flexible);
        }

        let expanded = self.expand_with_synonyms(required_words);
        let found: HashSet<&str> = expanded
            .iter()
            .map(String::as_str)
            .filter(|word| self.contains_term(&normalized, word))
            .collect();

        debug!(
            ?required_words,
            ?max_distance,
            found = found.len(),
            "Flexible match candidates"
        );

        let mut satisfied = Vec::with_capacity(required_words.len());
        for word in required_words {
            let group = self.expand_with_synonyms(&[*word]);
            match group.iter().find(|g| found.contains(g.as_str())) {
                Some(hit) => satisfied.push(hit.clone()),
                None => {
                    debug!("Required word '{}' has no synonym hit", word);
                    return PatternMatch::miss(PatternType::Flexible);
                }
            }
        }

        if let Some(context) = context_words {
            let context_hit = self
                .expand_with_synonyms(context)
                .into_iter()
                .find(|word| self.contains_term(&normalized, word));
            match context_hit {
                Some(hit) => satisfied.push(hit),
                None => {
                    debug!("No context word present");
                    return PatternMatch::miss(PatternType::Flexible);
                }
            }
        }

        PatternMatch::hit(PatternType::Flexible, satisfied.join(" + "), 1.0)
    }

    /// Context-aware match: every concept group needs at least one synonym
    /// hit, and `required_pattern` (if any) must also match.
    ///
    /// No groups means no match.
    pub fn context_match(
        &self,
        text: &str,
        key_concepts: &[&[&str]],
        required_pattern: Option<&str>,
    ) -> PatternMatch {
        let normalized = normalize(text);
        if normalized.is_empty() || key_concepts.is_empty() {
            return PatternMatch::miss(PatternType::ContextAware);
        }

        let mut hits = Vec::with_capacity(key_concepts.len());
        for group in key_concepts {
            let hit = self
                .expand_with_synonyms(*group)
                .into_iter()
                .find(|word| self.contains_term(&normalized, word));
            match hit {
                Some(word) => hits.push(word),
                None => return PatternMatch::miss(PatternType::ContextAware),
            }
        }

        if let Some(pattern) = required_pattern {
            match compile_user_pattern(pattern) {
                Some(re) if re.is_match(&normalized) => hits.push(format!("/{}/", pattern)),
                _ => return PatternMatch::miss(PatternType::ContextAware),
            }
        }

        PatternMatch::hit(PatternType::ContextAware, hits.join(" + "), 1.0)
    }

    /// Ad-hoc regex over normalized text. An invalid pattern is logged and
    /// treated as a non-match.
    pub fn match_exact_pattern(&self, text: &str, pattern: &str) -> PatternMatch {
        let normalized = normalize(text);
        let Some(re) = compile_user_pattern(pattern) else {
            return PatternMatch::miss(PatternType::Exact);
        };

        match re.find(&normalized) {
            Some(m) => PatternMatch::hit(PatternType::Exact, m.as_str(), 1.0),
            None => PatternMatch::miss(PatternType::Exact),
        }
    }
}

impl Default for TruthSeekingMatcher {
    fn default() -> Self {
        Self::new(SynonymTable::builtin())
    }
}

fn compile_user_pattern(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!("Invalid pattern {:?}: {}", pattern, e);
            None
        }
    }
}

/// An "ended" form followed by 1944 with at most three words between.
fn build_ended_near_1944(synonyms: &SynonymTable) -> Regex {
    let mut forms: Vec<&str> = synonyms
        .synonyms_for("ended")
        .map(|forms| forms.iter().map(String::as_str).collect())
        .unwrap_or_default();
    // Longest first so multi-word forms win the alternation
    forms.sort_by_key(|form| std::cmp::Reverse(form.len()));

    let alternation = if forms.is_empty() {
        r"\bended\b".to_string()
    } else {
        forms
            .iter()
            .map(|form| bounded_term(form))
            .collect::<Vec<_>>()
            .join("|")
    };

    let source = format!(r"(?:{})(?:\W+\w+){{0,3}}?\W+1944\b", alternation);
    Regex::new(&source).unwrap_or_else(|e| {
        warn!("Falling back to plain ending pattern: {}", e);
        Regex::new(r"\bended\b(?:\W+\w+){0,3}?\W+1944\b").expect("static regex")
    })
}
