//! Chat-language to speech-locale mapping.

/// Locale used for any chat language missing from [`LOCALE_TABLE`].
pub const DEFAULT_VOICE_LOCALE: &str = "en-US";

/// Fixed mapping from chat language codes to speech locales.
pub const LOCALE_TABLE: &[(&str, &str)] = &[
    ("en", "en-US"),
    ("hi", "hi-IN"),
    ("mr", "mr-IN"),
    ("te", "te-IN"),
    ("ta", "ta-IN"),
    ("bn", "bn-IN"),
    ("gu", "gu-IN"),
    ("kn", "kn-IN"),
    ("ml", "ml-IN"),
    ("pa", "pa-IN"),
    ("es", "es-ES"),
    ("fr", "fr-FR"),
    ("de", "de-DE"),
];

/// Speech locale for a chat language code, falling back to
/// [`DEFAULT_VOICE_LOCALE`] for unknown codes.
pub fn voice_locale_for(language: &str) -> &'static str {
    LOCALE_TABLE
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(language))
        .map(|(_, locale)| *locale)
        .unwrap_or(DEFAULT_VOICE_LOCALE)
}

/// Whether `locale` is one of the locales the table can produce.
pub fn is_known_locale(locale: &str) -> bool {
    LOCALE_TABLE
        .iter()
        .any(|(_, known)| known.eq_ignore_ascii_case(locale))
}

/// The language part of a locale tag (`"hi-IN"` -> `"hi"`).
pub fn language_of(locale: &str) -> &str {
    locale
        .split(['-', '_'])
        .next()
        .unwrap_or(locale)
}

/// Locale to retry with when synthesis fails for `language`.
///
/// Marathi falls back to Hindi (same script); other Indian languages fall
/// back to Indian English; everything else to the default locale.
pub fn fallback_locale_for(language: &str) -> &'static str {
    match language {
        "mr" => "hi-IN",
        "hi" | "te" | "ta" | "bn" | "gu" | "kn" | "ml" | "pa" => "en-IN",
        _ => DEFAULT_VOICE_LOCALE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_languages_map() {
        assert_eq!(voice_locale_for("en"), "en-US");
        assert_eq!(voice_locale_for("mr"), "mr-IN");
        assert_eq!(voice_locale_for("pa"), "pa-IN");
        assert_eq!(voice_locale_for("de"), "de-DE");
    }

    #[test]
    fn test_unknown_language_falls_back() {
        assert_eq!(voice_locale_for("xx"), DEFAULT_VOICE_LOCALE);
        assert_eq!(voice_locale_for(""), DEFAULT_VOICE_LOCALE);
    }

    #[test]
    fn test_every_mapping_is_known_locale() {
        for (code, _) in LOCALE_TABLE {
            assert!(is_known_locale(voice_locale_for(code)));
        }
        assert!(is_known_locale(DEFAULT_VOICE_LOCALE));
        assert!(!is_known_locale("xx-YY"));
    }

    #[test]
    fn test_language_of() {
        assert_eq!(language_of("hi-IN"), "hi");
        assert_eq!(language_of("en_GB"), "en");
        assert_eq!(language_of("fr"), "fr");
    }

    #[test]
    fn test_fallback_locale() {
        assert_eq!(fallback_locale_for("mr"), "hi-IN");
        assert_eq!(fallback_locale_for("ta"), "en-IN");
        assert_eq!(fallback_locale_for("es"), "en-US");
    }
}
