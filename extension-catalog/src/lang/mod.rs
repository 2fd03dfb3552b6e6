//! Language tag normalization and display.
//!
//! Extension metadata declares its language as free text ("English",
//! "pt-br", "Mandarin", ...). This module canonicalizes those labels to
//! IETF-style tags and maps tags to human-readable names and flag emoji.
//!
//! All three lookups share one table so the columns cannot drift apart,
//! but they keep distinct fallback rules: normalization passes unknown
//! input through lower-cased, display falls back to title-casing the tag,
//! and emoji lookup falls back to `None`.

/// Canonical tag assigned to `null`/empty language metadata.
pub const DEFAULT_TAG: &str = "en";

/// Synthetic tag for extensions serving multiple languages.
pub const MULTI_TAG: &str = "multi";

/// One row of the language table: canonical tag, display name, flag emoji.
struct LanguageInfo {
    tag: &'static str,
    name: &'static str,
    emoji: &'static str,
}

/// Canonical language table. The `multi` row is synthetic and handled
/// before table lookup in [`display_name`] and [`emoji`].
const LANGUAGES: &[LanguageInfo] = &[
    LanguageInfo { tag: "en", name: "English", emoji: "🇬🇧" },
    LanguageInfo { tag: "zh", name: "Chinese", emoji: "🇨🇳" },
    LanguageInfo { tag: "hi", name: "Hindi", emoji: "🇮🇳" },
    LanguageInfo { tag: "es", name: "Spanish", emoji: "🇪🇸" },
    LanguageInfo { tag: "fr", name: "French", emoji: "🇫🇷" },
    LanguageInfo { tag: "ar", name: "Arabic", emoji: "🇸🇦" },
    LanguageInfo { tag: "bn", name: "Bengali", emoji: "🇧🇩" },
    LanguageInfo { tag: "ru", name: "Russian", emoji: "🇷🇺" },
    LanguageInfo { tag: "pt", name: "Portuguese", emoji: "🇵🇹" },
    LanguageInfo { tag: "ur", name: "Urdu", emoji: "🇵🇰" },
    LanguageInfo { tag: "id", name: "Indonesian", emoji: "🇮🇩" },
    LanguageInfo { tag: "de", name: "German", emoji: "🇩🇪" },
    LanguageInfo { tag: "ja", name: "Japanese", emoji: "🇯🇵" },
    LanguageInfo { tag: "sw", name: "Swahili", emoji: "🇰🇪" },
    LanguageInfo { tag: "mr", name: "Marathi", emoji: "🇮🇳" },
    LanguageInfo { tag: "te", name: "Telugu", emoji: "🇮🇳" },
    LanguageInfo { tag: "tr", name: "Turkish", emoji: "🇹🇷" },
    LanguageInfo { tag: "ta", name: "Tamil", emoji: "🇮🇳" },
    LanguageInfo { tag: "ko", name: "Korean", emoji: "🇰🇷" },
    LanguageInfo { tag: "vi", name: "Vietnamese", emoji: "🇻🇳" },
    LanguageInfo { tag: "it", name: "Italian", emoji: "🇮🇹" },
    LanguageInfo { tag: "th", name: "Thai", emoji: "🇹🇭" },
    LanguageInfo { tag: "gu", name: "Gujarati", emoji: "🇮🇳" },
    LanguageInfo { tag: "fa", name: "Persian", emoji: "🇮🇷" },
    LanguageInfo { tag: "pl", name: "Polish", emoji: "🇵🇱" },
    LanguageInfo { tag: "uk", name: "Ukrainian", emoji: "🇺🇦" },
    LanguageInfo { tag: "ml", name: "Malayalam", emoji: "🇮🇳" },
    LanguageInfo { tag: "kn", name: "Kannada", emoji: "🇮🇳" },
    LanguageInfo { tag: "or", name: "Odia", emoji: "🇮🇳" },
    LanguageInfo { tag: "my", name: "Burmese", emoji: "🇲🇲" },
    LanguageInfo { tag: "pa", name: "Punjabi", emoji: "🇮🇳" },
    LanguageInfo { tag: "nl", name: "Dutch", emoji: "🇳🇱" },
    LanguageInfo { tag: "ro", name: "Romanian", emoji: "🇷🇴" },
    LanguageInfo { tag: "hu", name: "Hungarian", emoji: "🇭🇺" },
    LanguageInfo { tag: "el", name: "Greek", emoji: "🇬🇷" },
    LanguageInfo { tag: "cs", name: "Czech", emoji: "🇨🇿" },
    LanguageInfo { tag: "sv", name: "Swedish", emoji: "🇸🇪" },
    LanguageInfo { tag: "fi", name: "Finnish", emoji: "🇫🇮" },
    LanguageInfo { tag: "da", name: "Danish", emoji: "🇩🇰" },
    LanguageInfo { tag: "no", name: "Norwegian", emoji: "🇳🇴" },
    LanguageInfo { tag: "he", name: "Hebrew", emoji: "🇮🇱" },
    LanguageInfo { tag: "sk", name: "Slovak", emoji: "🇸🇰" },
    LanguageInfo { tag: "bg", name: "Bulgarian", emoji: "🇧🇬" },
    LanguageInfo { tag: "hr", name: "Croatian", emoji: "🇭🇷" },
    LanguageInfo { tag: "sr", name: "Serbian", emoji: "🇷🇸" },
    LanguageInfo { tag: "lt", name: "Lithuanian", emoji: "🇱🇹" },
    LanguageInfo { tag: "sl", name: "Slovenian", emoji: "🇸🇮" },
    LanguageInfo { tag: "et", name: "Estonian", emoji: "🇪🇪" },
    LanguageInfo { tag: "lv", name: "Latvian", emoji: "🇱🇻" },
];

/// Free-text synonyms accepted by [`normalize`], mapped to canonical tags.
const SYNONYMS: &[(&str, &str)] = &[
    ("english", "en"),
    ("chinese", "zh"),
    ("mandarin", "zh"),
    ("japanese", "ja"),
    ("korean", "ko"),
    ("spanish", "es"),
    ("french", "fr"),
    ("german", "de"),
    ("italian", "it"),
    ("portuguese", "pt"),
    ("pt-br", "pt"),
    ("russian", "ru"),
    ("arabic", "ar"),
    ("indonesian", "id"),
    ("vietnamese", "vi"),
    ("multi", "multi"),
    ("all", "multi"),
    ("universal", "multi"),
];

/// Normalizes a raw language label to a canonical tag.
///
/// Input is trimmed and lower-cased, then looked up in the synonym table.
/// Unknown input passes through unchanged (lower-cased). `None` or empty
/// input normalizes to [`DEFAULT_TAG`].
#[must_use]
pub fn normalize(raw: Option<&str>) -> String {
    let trimmed = raw.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return DEFAULT_TAG.to_string();
    }

    let lower = trimmed.to_lowercase();
    SYNONYMS
        .iter()
        .find(|(synonym, _)| *synonym == lower)
        .map(|(_, tag)| (*tag).to_string())
        .unwrap_or(lower)
}

/// Returns the human-readable name for a canonical tag.
///
/// `multi` maps to a fixed literal; unknown tags are title-cased verbatim.
#[must_use]
pub fn display_name(tag: &str) -> String {
    if tag == MULTI_TAG {
        return "Multi-Language".to_string();
    }

    LANGUAGES
        .iter()
        .find(|info| info.tag == tag)
        .map(|info| info.name.to_string())
        .unwrap_or_else(|| title_case(tag))
}

/// Returns the flag emoji for a canonical tag, or `None` when unknown.
#[must_use]
pub fn emoji(tag: &str) -> Option<&'static str> {
    if tag == MULTI_TAG {
        return Some("🌐");
    }

    LANGUAGES
        .iter()
        .find(|info| info.tag == tag)
        .map(|info| info.emoji)
}

/// Returns true if `tag` is a canonical tag from the language table
/// (including the synthetic `multi`).
#[must_use]
pub fn is_known_tag(tag: &str) -> bool {
    tag == MULTI_TAG || LANGUAGES.iter().any(|info| info.tag == tag)
}

/// Title-cases each whitespace-separated word of the input.
fn title_case(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_synonym() {
        assert_eq!(normalize(Some("English")), "en");
        assert_eq!(normalize(Some("  Mandarin ")), "zh");
        assert_eq!(normalize(Some("ALL")), "multi");
    }

    #[test]
    fn test_normalize_passthrough() {
        assert_eq!(normalize(Some("PT-PT")), "pt-pt");
    }

    #[test]
    fn test_normalize_empty_defaults_to_english() {
        assert_eq!(normalize(None), "en");
        assert_eq!(normalize(Some("  ")), "en");
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("en"), "English");
        assert_eq!(display_name("multi"), "Multi-Language");
        assert_eq!(display_name("klingon dialect"), "Klingon Dialect");
    }

    #[test]
    fn test_emoji() {
        assert_eq!(emoji("ja"), Some("🇯🇵"));
        assert_eq!(emoji("multi"), Some("🌐"));
        assert_eq!(emoji("zz"), None);
    }

    #[test]
    fn test_is_known_tag() {
        assert!(is_known_tag("en"));
        assert!(is_known_tag("multi"));
        assert!(!is_known_tag("zz"));
    }
}
