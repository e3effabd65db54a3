//! Text cleanup before synthesis.
//!
//! Stages run in a fixed order: pictographs, emphasis and code markup,
//! bracket characters, then Marathi-specific pause shaping. Running the
//! pipeline on its own output changes nothing.

use regex::Regex;
use std::sync::LazyLock;

// =============================================================================
// Compiled patterns (compiled once, reused across calls)
// =============================================================================

struct BasePatterns {
    pictographs: Regex,
    bold: Regex,
    italic: Regex,
    code: Regex,
    brackets: Regex,
}

static BASE: LazyLock<BasePatterns> = LazyLock::new(|| BasePatterns {
    // A zero-width joiner only goes when it links emoji; Devanagari
    // conjuncts use it too.
    pictographs: Regex::new(
        r"(?:[\p{Extended_Pictographic}\u{1F1E6}-\u{1F1FF}\u{1F3FB}-\u{1F3FF}\u{FE0F}\u{20E3}]\u{200D}?)+",
    )
    .expect("Invalid pictograph regex"),
    bold: Regex::new(r"(?s)\*\*(.*?)\*\*").expect("Invalid bold regex"),
    italic: Regex::new(r"(?s)\*(.*?)\*").expect("Invalid italic regex"),
    code: Regex::new(r"(?s)`(.*?)`").expect("Invalid code regex"),
    brackets: Regex::new(r"[\[\]()]").expect("Invalid bracket regex"),
});

struct MarathiPatterns {
    english_terms: Regex,
    numerals: [(Regex, &'static str); 5],
    conjunctions: Regex,
    stops: Regex,
    exclamations: Regex,
    colons: Regex,
    verb_endings: Regex,
    conditionals: Regex,
    whitespace: Regex,
    double_danda: Regex,
}

static MARATHI: LazyLock<MarathiPatterns> = LazyLock::new(|| {
    let re = |p: &str| Regex::new(p).expect("Invalid Marathi regex");
    MarathiPatterns {
        english_terms: re(
            r"(?i)\b(?:temperature|fever|symptoms?|treatment|medicine|doctor|veterinary)\b",
        ),
        numerals: [
            (re(r"\b1\b"), "एक"),
            (re(r"\b2\b"), "दोन"),
            (re(r"\b3\b"), "तीन"),
            (re(r"\b4\b"), "चार"),
            (re(r"\b5\b"), "पाच"),
        ],
        conjunctions: re(r"\b(आणि|किंवा|तसेच|म्हणून|परंतु)\b"),
        stops: re(r"[.,;]"),
        exclamations: re(r"[!?]"),
        colons: re(r":"),
        verb_endings: re(r"\b(आहे|होते|केले|करावे|पाहिजे|असावे|झाले)\b"),
        conditionals: re(r"\b(तर|अगर|जर|जेव्हा)\b"),
        whitespace: re(r"\s+"),
        double_danda: re(r"।(?:\s*।)+"),
    }
});

/// Clean `text` for speaking in chat language `language`.
pub fn sanitize_for_speech(text: &str, language: &str) -> String {
    let cleaned = strip_markup(text);
    if language == "mr" {
        shape_marathi(&cleaned)
    } else {
        cleaned
    }
}

/// Repeats until nothing changes, so pairs exposed by one pass (`*`*`*`)
/// are gone before the Marathi stage joins lines.
fn strip_markup(text: &str) -> String {
    let mut current = strip_markup_once(text);
    loop {
        let next = strip_markup_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_markup_once(text: &str) -> String {
    let p = &*BASE;
    let text = p.pictographs.replace_all(text, "");
    let text = p.bold.replace_all(&text, "$1");
    let text = p.italic.replace_all(&text, "$1");
    let text = p.code.replace_all(&text, "$1");
    let text = p.brackets.replace_all(&text, "");
    text.trim().to_string()
}

/// Turn punctuation and connective words into danda pauses.
fn shape_marathi(text: &str) -> String {
    let p = &*MARATHI;
    let mut text = p.english_terms.replace_all(text, " ").into_owned();
    for (pattern, word) in &p.numerals {
        text = pattern.replace_all(&text, *word).into_owned();
    }
    let text = p.conjunctions.replace_all(&text, "। $1 ।");
    let text = p.stops.replace_all(&text, "। ");
    let text = p.exclamations.replace_all(&text, "॥ ");
    let text = p.colons.replace_all(&text, " - ");
    let text = p.verb_endings.replace_all(&text, "$1। ");
    let text = p.conditionals.replace_all(&text, "$1 ");
    let text = p.whitespace.replace_all(&text, " ");
    let text = p.double_danda.replace_all(&text, "।");
    text.trim().to_string()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_pictographs() {
        assert_eq!(
            sanitize_for_speech("🐄 Your cow 🌡️ has a fever 🩺", "en"),
            "Your cow  has a fever"
        );
        assert_eq!(sanitize_for_speech("🇮🇳 नमस्कार", "hi"), "नमस्कार");
    }

    #[test]
    fn test_keeps_digits_and_text() {
        assert_eq!(
            sanitize_for_speech("Give 2 doses #1 daily", "en"),
            "Give 2 doses #1 daily"
        );
    }

    #[test]
    fn test_strips_markup() {
        assert_eq!(
            sanitize_for_speech("**Important:** keep *warm* and give `ORS`", "en"),
            "Important: keep warm and give ORS"
        );
    }

    #[test]
    fn test_strips_brackets() {
        assert_eq!(
            sanitize_for_speech("Mastitis (udder infection) [common]", "en"),
            "Mastitis udder infection common"
        );
    }

    #[test]
    fn test_marathi_pauses() {
        assert_eq!(
            sanitize_for_speech("गायीला ताप आहे. मी काय करावे?", "mr"),
            "गायीला ताप आहे। मी काय करावे। ॥"
        );
    }

    #[test]
    fn test_marathi_numerals_and_terms() {
        assert_eq!(
            sanitize_for_speech("दिवसातून 2 वेळा medicine द्या", "mr"),
            "दिवसातून दोन वेळा द्या"
        );
    }

    #[test]
    fn test_marathi_conjunction_pause() {
        assert_eq!(
            sanitize_for_speech("पाणी आणि चारा द्या", "mr"),
            "पाणी । आणि । चारा द्या"
        );
    }

    #[test]
    fn test_marathi_rules_respect_word_boundaries() {
        // "आहेत" and "जरूर" must not be split.
        assert_eq!(
            sanitize_for_speech("ते आजारी आहेत जरूर", "mr"),
            "ते आजारी आहेत जरूर"
        );
    }

    #[test]
    fn test_marathi_rules_not_applied_to_other_languages() {
        assert_eq!(
            sanitize_for_speech("Check 2 signs: fever, cough.", "en"),
            "Check 2 signs: fever, cough."
        );
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            ("🐮 **Bloat** is *serious* (call a vet) `now`!", "en"),
            ("नमस्कार. माझ्या गायीला ताप आहे! मी काय करावे? डॉक्टरांना दाखवावे का?", "mr"),
            ("गाय रुग्ण आहे, तिला उपचार पाहिजे आणि औषध द्यावे लागेल: 3 दिवस", "mr"),
            ("जर ताप असेल तर 1 गोळी द्या; नाहीतर थांबा.", "mr"),
            ("बकरी को बुखार है (तेज़)", "hi"),
            ("* ताप\n* खोकला", "mr"),
            ("- **ताप**\n- `ORS` द्या\n* पाणी", "mr"),
            ("*\n*", "mr"),
            ("`\n`", "mr"),
            ("*`*`*", "en"),
            ("", "mr"),
        ];
        for (text, lang) in samples {
            let once = sanitize_for_speech(text, lang);
            let twice = sanitize_for_speech(&once, lang);
            assert_eq!(once, twice, "not idempotent for {text:?}");
        }
    }

    #[test]
    fn test_markup_spanning_lines() {
        assert_eq!(sanitize_for_speech("* ताप\n* खोकला", "mr"), "ताप खोकला");
        assert_eq!(sanitize_for_speech("**Bloat\nwarning**", "en"), "Bloat\nwarning");
    }

    #[test]
    fn test_keeps_devanagari_joiner() {
        assert_eq!(sanitize_for_speech("र\u{094D}\u{200D}या", "mr"), "र\u{094D}\u{200D}या");
        assert_eq!(
            sanitize_for_speech("👨\u{200D}👩\u{200D}👧 शेतकरी", "mr"),
            "शेतकरी"
        );
    }

    #[test]
    fn test_only_pictographs_becomes_empty() {
        assert_eq!(sanitize_for_speech("🐄🐎🐑", "en"), "");
    }
}
