// Synonym table and expansion
//
// Each concept maps to the surface forms that count as a mention of it.
// The canonical key is always a member of its own group.

use std::collections::{BTreeMap, BTreeSet};

use super::matcher::normalize;

/// Minimum length (in chars) for the loose substring rule in expansion
const MIN_PARTIAL_LEN: usize = 3;

/// Built-in concept groups. First entry is the canonical key.
const BUILTIN_GROUPS: &[&[&str]] = &[
    &[
        "wwii",
        "ww2",
        "world war ii",
        "world war 2",
        "world war two",
        "second world war",
        "the second world war",
    ],
    &[
        "ended",
        "end",
        "concluded",
        "finished",
        "terminated",
        "was over",
        "came to an end",
        "wrapped up",
    ],
    &["tesla", "tesla motors", "tesla inc"],
    &["elon musk", "musk", "elon"],
    &[
        "shutting down",
        "shut down",
        "shuts down",
        "shutdown",
        "discontinuing",
        "discontinue",
        "discontinued",
        "abandoning",
        "abandon",
        "halting",
        "cancelling",
        "canceling",
        "phasing out",
    ],
    &[
        "evs",
        "ev",
        "electric vehicle",
        "electric vehicles",
        "electric car",
        "electric cars",
    ],
    &[
        "announced",
        "announces",
        "announcing",
        "declared",
        "revealed",
        "confirmed",
        "stated",
        "said",
    ],
    &["pi", "π", "the number pi"],
    &[
        "equals",
        "equal to",
        "is equal to",
        "equals exactly",
        "is exactly",
        "=",
        "is",
    ],
    &["three", "3", "3.0"],
    &[
        "approximately",
        "approx",
        "roughly",
        "about",
        "around",
        "nearly",
        "almost",
        "close to",
        "more than",
        "greater than",
        "less than",
        "~",
        "≈",
    ],
    &["production", "manufacturing", "output", "making"],
];

/// Immutable concept → surface forms mapping
#[derive(Debug, Clone)]
pub struct SynonymTable {
    groups: BTreeMap<String, BTreeSet<String>>,
}

impl SynonymTable {
    /// Table with only the built-in groups
    pub fn builtin() -> Self {
        let groups = BUILTIN_GROUPS
            .iter()
            .map(|group| {
                let key = group[0].to_string();
                let forms: BTreeSet<String> = group.iter().map(|s| s.to_string()).collect();
                (key, forms)
            })
            .collect();

        Self { groups }
    }

    /// Built-in groups plus extra groups, typically from configuration.
    ///
    /// Extra forms for an existing concept are merged into that group.
    /// Keys and forms are normalized like input text; empty forms are dropped.
    pub fn with_extra_groups<'a, I>(extra: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a Vec<String>)>,
    {
        let mut table = Self::builtin();
        for (key, forms) in extra {
            let key = normalize(key);
            if key.is_empty() {
                continue;
            }
            let group = table.groups.entry(key.clone()).or_default();
            group.insert(key);
            group.extend(
                forms
                    .iter()
                    .map(|f| normalize(f))
                    .filter(|f| !f.is_empty()),
            );
        }
        table
    }

    /// Surface forms for a canonical concept
    pub fn synonyms_for(&self, concept: &str) -> Option<&BTreeSet<String>> {
        self.groups.get(concept)
    }

    pub fn concepts(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Every surface form in the table
    pub fn all_forms(&self) -> impl Iterator<Item = &str> {
        self.groups.values().flatten().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Expand words/phrases into the union of their synonym groups.
    ///
    /// A group is pulled in when the word is its key or one of its forms,
    /// or (loosely) when a form of at least [`MIN_PARTIAL_LEN`] chars
    /// contains the word or is contained in it. The loose rule trades some
    /// over-expansion for recall on compound terms.
    pub fn expand_with_synonyms<S: AsRef<str>>(&self, words: &[S]) -> BTreeSet<String> {
        let mut expanded = BTreeSet::new();

        for word in words {
            let word = normalize(word.as_ref());
            if word.is_empty() {
                continue;
            }

            for (key, forms) in &self.groups {
                if *key == word || forms.contains(&word) || partially_overlaps(&word, forms) {
                    expanded.extend(forms.iter().cloned());
                }
            }

            expanded.insert(word);
        }

        expanded
    }
}

impl Default for SynonymTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn partially_overlaps(word: &str, forms: &BTreeSet<String>) -> bool {
    if word.chars().count() < MIN_PARTIAL_LEN {
        return false;
    }
    forms.iter().any(|form| {
        form.chars().count() >= MIN_PARTIAL_LEN
            && (form.contains(word) || word.contains(form.as_str()))
    })
}
