//! Voice catalog ranking.
//!
//! Each language gets an ordered table of (pattern, priority) rules. The
//! winner is the candidate of the highest-priority rule that matches any
//! voice; among a rule's candidates a non-default voice is preferred.

use std::sync::Mutex;

use regex::Regex;
use tracing::{debug, info};

use vetassist_core::language::language_of;
use vetassist_core::types::Voice;

/// One ranking rule.
#[derive(Debug, Clone)]
pub struct VoiceRule {
    pub pattern: Regex,
    pub priority: u8,
    /// Also test the pattern against the voice name, not just its lang tag.
    pub match_name: bool,
    pub description: &'static str,
}

impl VoiceRule {
    fn new(pattern: &str, priority: u8, match_name: bool, description: &'static str) -> Option<Self> {
        Regex::new(pattern).ok().map(|pattern| Self {
            pattern,
            priority,
            match_name,
            description,
        })
    }

    fn matches(&self, voice: &Voice) -> bool {
        self.pattern.is_match(&voice.lang) || (self.match_name && self.pattern.is_match(&voice.name))
    }
}

/// Marathi has few native voices; Devanagari-capable Hindi voices rank next.
fn marathi_rules() -> Vec<VoiceRule> {
    [
        (r"(?i)^mr-IN", 10, "Native Marathi India"),
        (r"(?i)marathi.*india", 9, "Marathi India voice"),
        (r"(?i)^mr", 8, "Marathi voice"),
        (r"(?i)^hi-IN.*(?:female|google|microsoft)", 7, "Premium Hindi India"),
        (r"(?i)^hi-IN", 6, "Hindi India voice"),
        (r"(?i)india.*devanagari", 5, "India Devanagari voice"),
        (r"(?i)^hi", 4, "Hindi voice"),
        (r"(?i)en-IN", 3, "English India"),
    ]
    .into_iter()
    .filter_map(|(p, priority, desc)| VoiceRule::new(p, priority, true, desc))
    .collect()
}

/// Exact locale, then same language, then any English voice.
fn locale_rules(locale: &str) -> Vec<VoiceRule> {
    let exact = format!("(?i)^{}$", regex::escape(locale));
    let family = format!("(?i)^{}", regex::escape(language_of(locale)));
    [
        (exact.as_str(), 10, "Exact locale"),
        (family.as_str(), 6, "Same language"),
        (r"(?i)^en", 1, "English fallback"),
    ]
    .into_iter()
    .filter_map(|(p, priority, desc)| VoiceRule::new(p, priority, false, desc))
    .collect()
}

/// Ranking table for chat language `language` speaking in `locale`.
pub fn rules_for(language: &str, locale: &str) -> Vec<VoiceRule> {
    if language == "mr" {
        marathi_rules()
    } else {
        locale_rules(locale)
    }
}

/// Pick the best voice from `catalog` under `rules`.
pub fn select_voice(catalog: &[Voice], rules: &[VoiceRule]) -> Option<(Voice, u8)> {
    let mut best: Option<(&Voice, &VoiceRule)> = None;
    for rule in rules {
        if best.is_some_and(|(_, b)| b.priority >= rule.priority) {
            continue;
        }
        let mut candidates = catalog.iter().filter(|v| rule.matches(v));
        let Some(first) = candidates.next() else {
            continue;
        };
        let preferred = if first.is_default {
            candidates.find(|v| !v.is_default).unwrap_or(first)
        } else {
            first
        };
        best = Some((preferred, rule));
    }
    best.map(|(voice, rule)| {
        debug!(
            voice = %voice.name,
            lang = %voice.lang,
            priority = rule.priority,
            rule = rule.description,
            "Voice ranked"
        );
        (voice.clone(), rule.priority)
    })
}

/// Selected voice, cached per chat language and locale.
#[derive(Debug, Default)]
pub struct VoiceSelector {
    cached: Mutex<Option<(String, String, Option<Voice>)>>,
}

impl VoiceSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached voice for `language` and `locale`, ranking
    /// `catalog` on a miss.
    ///
    /// An empty catalog is never cached, so a late-loading catalog is
    /// picked up on the next call.
    pub fn select(&self, language: &str, locale: &str, catalog: &[Voice]) -> Option<Voice> {
        let mut cached = self.cached.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((lang, loc, voice)) = cached.as_ref() {
            if lang == language && loc == locale {
                return voice.clone();
            }
        }

        let voice = select_voice(catalog, &rules_for(language, locale)).map(|(v, _)| v);
        match &voice {
            Some(v) => info!(language = %language, voice = %v.name, lang = %v.lang, "Selected voice"),
            None => info!(language = %language, "No suitable voice, using platform default"),
        }
        if !catalog.is_empty() {
            *cached = Some((language.to_string(), locale.to_string(), voice.clone()));
        }
        voice
    }

    /// Forget the cached choice, e.g. after the catalog changed.
    pub fn invalidate(&self) {
        *self.cached.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

// =============================================================================
// Tests
// =============================================================================
