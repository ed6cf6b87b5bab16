//! Text transformation engine
//!
//! A closed registry of named transforms behind one lookup. Registration
//! order is part of the contract: it is the order reported back to callers
//! in every result record. Unknown names fall back to identity - a bad
//! transform name is never an error, the input just passes through.
//!
//! All transforms except `ai` are pure, total, and deterministic. `ai`
//! delegates to an external LLM endpoint through [`AiTransformer`] and is
//! the only transform that can fail.

use std::sync::Arc;

use crate::ai::AiTransformer;
use crate::{Error, Result};

/// Registry names in registration order
pub const TRANSFORM_NAMES: [&str; 9] = [
    "reverse",
    "uppercase",
    "lowercase",
    "leetspeak",
    "spongebob",
    "emojify",
    "pirate",
    "uwu",
    "ai",
];

/// Trigger words and their emoji, applied in this order
const EMOJI_TABLE: [(&str, &str); 10] = [
    ("happy", "😊"),
    ("sad", "😢"),
    ("love", "❤️"),
    ("fire", "🔥"),
    ("cool", "😎"),
    ("party", "🎉"),
    ("pizza", "🍕"),
    ("star", "⭐"),
    ("sun", "☀️"),
    ("moon", "🌙"),
];

/// Whole-word pirate substitutions, applied in this order
const PIRATE_TABLE: [(&str, &str); 6] = [
    ("you", "ye"),
    ("my", "me"),
    ("is", "be"),
    ("the", "th'"),
    ("hello", "ahoy"),
    ("friend", "matey"),
];

/// A registered transform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Character sequence reversed end-to-end
    Reverse,
    /// Every letter uppercased
    Uppercase,
    /// Every letter lowercased
    Lowercase,
    /// a/e/i/o/s/t substituted with digits, case-insensitive
    Leetspeak,
    /// Alternating case by character index, lowercase first
    Spongebob,
    /// Trigger words followed by their emoji
    Emojify,
    /// Whole-word pirate vocabulary plus a flag suffix
    Pirate,
    /// Softened consonants plus an uwu suffix
    Uwu,
    /// Delegated to an external LLM endpoint
    Ai,
}

impl Transform {
    /// Look up a transform by registry name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "reverse" => Some(Self::Reverse),
            "uppercase" => Some(Self::Uppercase),
            "lowercase" => Some(Self::Lowercase),
            "leetspeak" => Some(Self::Leetspeak),
            "spongebob" => Some(Self::Spongebob),
            "emojify" => Some(Self::Emojify),
            "pirate" => Some(Self::Pirate),
            "uwu" => Some(Self::Uwu),
            "ai" => Some(Self::Ai),
            _ => None,
        }
    }

    /// Registry name of this transform
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Reverse => "reverse",
            Self::Uppercase => "uppercase",
            Self::Lowercase => "lowercase",
            Self::Leetspeak => "leetspeak",
            Self::Spongebob => "spongebob",
            Self::Emojify => "emojify",
            Self::Pirate => "pirate",
            Self::Uwu => "uwu",
            Self::Ai => "ai",
        }
    }

    /// The pure function for this transform, or `None` for `ai`
    #[must_use]
    pub fn pure(self) -> Option<fn(&str) -> String> {
        match self {
            Self::Reverse => Some(reverse),
            Self::Uppercase => Some(uppercase),
            Self::Lowercase => Some(lowercase),
            Self::Leetspeak => Some(leetspeak),
            Self::Spongebob => Some(spongebob),
            Self::Emojify => Some(emojify),
            Self::Pirate => Some(pirate),
            Self::Uwu => Some(uwu),
            Self::Ai => None,
        }
    }
}

/// All registry names in registration order, as owned strings for the
/// result record
#[must_use]
pub fn available_transforms() -> Vec<String> {
    TRANSFORM_NAMES.iter().map(ToString::to_string).collect()
}

/// The transformation engine: the closed registry plus the optional AI
/// collaborator. Shared read-only across request handlers.
#[derive(Clone)]
pub struct Engine {
    ai: Option<Arc<dyn AiTransformer>>,
}

impl Engine {
    /// Engine without an AI collaborator; requesting `ai` is then a
    /// configuration error.
    #[must_use]
    pub fn new() -> Self {
        Self { ai: None }
    }

    /// Engine with an AI collaborator for the `ai` transform
    #[must_use]
    pub fn with_ai(ai: Arc<dyn AiTransformer>) -> Self {
        Self { ai: Some(ai) }
    }

    /// Apply the named transform to `text`.
    ///
    /// Unknown names yield the input unchanged. Only the `ai` transform
    /// can fail: either unconfigured (`Error::Config`) or a failed
    /// external call (`Error::Ai`).
    pub async fn apply(&self, text: &str, name: &str) -> Result<String> {
        match Transform::from_name(name) {
            None => Ok(text.to_string()),
            Some(transform) => match transform.pure() {
                Some(f) => Ok(f(text)),
                None => match &self.ai {
                    Some(client) => client.transform(text).await,
                    None => Err(Error::Config(
                        "ai transform requested but no AI endpoint is configured".to_string(),
                    )),
                },
            },
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

fn reverse(text: &str) -> String {
    text.chars().rev().collect()
}

fn uppercase(text: &str) -> String {
    text.to_uppercase()
}

fn lowercase(text: &str) -> String {
    text.to_lowercase()
}

fn leetspeak(text: &str) -> String {
    text.chars()
        .map(|c| match c.to_ascii_lowercase() {
            'a' => '4',
            'e' => '3',
            'i' => '1',
            'o' => '0',
            's' => '5',
            't' => '7',
            _ => c,
        })
        .collect()
}

fn spongebob(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, c) in text.chars().enumerate() {
        if i % 2 == 0 {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
    }
    out
}

fn emojify(text: &str) -> String {
    let mut out = text.to_string();
    for (trigger, emoji) in EMOJI_TABLE {
        out = append_after_matches(&out, trigger, emoji);
    }
    out
}

fn pirate(text: &str) -> String {
    let mut out = text.to_string();
    for (word, replacement) in PIRATE_TABLE {
        out = replace_whole_word(&out, word, replacement);
    }
    out.push_str(" ☠️");
    out
}

fn uwu(text: &str) -> String {
    let softened: String = text
        .chars()
        .map(|c| match c {
            'r' | 'l' => 'w',
            'R' | 'L' => 'W',
            other => other,
        })
        .collect();

    // n followed by a vowel gains a y, matching the vowel's case
    let chars: Vec<char> = softened.chars().collect();
    let mut out = String::with_capacity(softened.len());
    for (i, &c) in chars.iter().enumerate() {
        out.push(c);
        if c == 'n' || c == 'N' {
            match chars.get(i + 1) {
                Some(&v) if "aeiou".contains(v) => out.push('y'),
                Some(&v) if "AEIOU".contains(v) => out.push('Y'),
                _ => {}
            }
        }
    }

    let mut out = out.replace("ove", "uv");
    out.push_str(" uwu");
    out
}

/// Append `" " + suffix` after every case-insensitive occurrence of the
/// ASCII `needle`. Matches are literal substrings, not whole words.
fn append_after_matches(text: &str, needle: &str, suffix: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let nlen = needle.len();
    let mut i = 0;
    while i < text.len() {
        let rest = &text[i..];
        // Matched bytes are all ASCII, so the slice stays on char boundaries.
        if rest.len() >= nlen && rest.as_bytes()[..nlen].eq_ignore_ascii_case(needle.as_bytes()) {
            out.push_str(&rest[..nlen]);
            out.push(' ');
            out.push_str(suffix);
            i += nlen;
        } else if let Some(c) = rest.chars().next() {
            out.push(c);
            i += c.len_utf8();
        } else {
            break;
        }
    }
    out
}

/// Replace every case-insensitive whole-word occurrence of the ASCII
/// `word`. Word boundaries are non-alphanumeric neighbors or the ends of
/// the string.
fn replace_whole_word(text: &str, word: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let wlen = word.len();
    let mut prev_alnum = false;
    let mut i = 0;
    while i < text.len() {
        let rest = &text[i..];
        let bounded = !prev_alnum
            && rest.len() >= wlen
            && rest.as_bytes()[..wlen].eq_ignore_ascii_case(word.as_bytes())
            && rest[wlen..].chars().next().is_none_or(|c| !c.is_alphanumeric());
        if bounded {
            out.push_str(replacement);
            prev_alnum = true;
            i += wlen;
        } else if let Some(c) = rest.chars().next() {
            out.push(c);
            prev_alnum = c.is_alphanumeric();
            i += c.len_utf8();
        } else {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use super::*;

    struct ShoutingAi;

    #[async_trait]
    impl AiTransformer for ShoutingAi {
        async fn transform(&self, text: &str) -> Result<String> {
            Ok(format!("{}!!!", text.to_uppercase()))
        }
    }

    struct BrokenAi;

    #[async_trait]
    impl AiTransformer for BrokenAi {
        async fn transform(&self, _text: &str) -> Result<String> {
            Err(Error::Ai("model endpoint unreachable".to_string()))
        }
    }

    #[tokio::test]
    async fn unknown_name_is_identity() {
        let engine = Engine::new();
        let out = engine.apply("Hello", "sparkle").await.unwrap();
        assert_eq!(out, "Hello");
    }

    #[tokio::test]
    async fn registered_names_round_trip() {
        for name in TRANSFORM_NAMES {
            let transform = Transform::from_name(name).unwrap();
            assert_eq!(transform.name(), name);
        }
        assert!(Transform::from_name("reversed").is_none());
    }

    #[tokio::test]
    async fn pure_transforms_are_deterministic() {
        let engine = Engine::new();
        for name in TRANSFORM_NAMES.iter().copied().filter(|n| *n != "ai") {
            let a = engine.apply("The quick brown Fox", name).await.unwrap();
            let b = engine.apply("The quick brown Fox", name).await.unwrap();
            assert_eq!(a, b, "{name} must be deterministic");
        }
    }

    #[test]
    fn reverse_is_an_involution() {
        for s in ["", "a", "hello world", "αβγ δε", "no\u{308}l"] {
            assert_eq!(reverse(&reverse(s)), s);
        }
        assert_eq!(reverse("abc"), "cba");
    }

    #[test]
    fn case_transforms_are_idempotent() {
        for s in ["MiXeD Case 123", "ÅNGSTRÖM", ""] {
            assert_eq!(uppercase(&uppercase(s)), uppercase(s));
            assert_eq!(lowercase(&lowercase(s)), lowercase(s));
        }
    }

    #[test]
    fn leetspeak_substitutes_both_cases() {
        assert_eq!(leetspeak("test"), "7357");
        assert_eq!(leetspeak("TEST"), "7357");
        assert_eq!(leetspeak("Leet Is Cool"), "L337 15 C00l");
    }

    #[test]
    fn spongebob_alternates_from_lowercase() {
        assert_eq!(spongebob("abcd"), "aBcD");
        assert_eq!(spongebob("HELLO"), "hElLo");
        // non-letters still advance the index
        assert_eq!(spongebob("ab cd"), "aB Cd");
    }

    #[test]
    fn emojify_appends_after_each_trigger() {
        let out = emojify("I am happy and cool");
        assert!(out.contains("happy 😊"), "got: {out}");
        assert!(out.contains("cool 😎"), "got: {out}");
    }

    #[test]
    fn emojify_matches_substrings_case_insensitively() {
        let out = emojify("HAPPY unhappy");
        assert_eq!(out, "HAPPY 😊 unhappy 😊");
    }

    #[test]
    fn pirate_replaces_whole_words_and_appends_flag() {
        let out = pirate("Hello my friend");
        assert!(out.ends_with(" ☠️"), "got: {out}");
        let lower = out.to_lowercase();
        for word in ["hello", "my", "friend"] {
            assert!(!lower.contains(word), "whole-word {word} survived: {out}");
        }
        assert_eq!(out, "ahoy me matey ☠️");
    }

    #[test]
    fn pirate_leaves_embedded_words_alone() {
        // "is" inside "island" and "this" is not a whole word
        let out = pirate("this island is mystery");
        assert_eq!(out, "this island be mystery ☠️");
    }

    #[test]
    fn uwu_softens_and_suffixes() {
        assert_eq!(uwu("love"), "wuv uwu");
        assert_eq!(uwu("hello world"), "hewwo wowwd uwu");
        assert_eq!(uwu("nano NAno"), "nyanyo NYAnyo uwu");
        assert_eq!(uwu("Really"), "Weawwy uwu");
    }

    #[tokio::test]
    async fn ai_without_endpoint_is_a_config_error() {
        let engine = Engine::new();
        let err = engine.apply("hi", "ai").await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn ai_delegates_to_the_collaborator() {
        let engine = Engine::with_ai(Arc::new(ShoutingAi));
        let out = engine.apply("hi", "ai").await.unwrap();
        assert_eq!(out, "HI!!!");
    }

    #[tokio::test]
    async fn ai_failure_propagates() {
        let engine = Engine::with_ai(Arc::new(BrokenAi));
        let err = engine.apply("hi", "ai").await.unwrap_err();
        assert!(matches!(err, Error::Ai(_)));
    }
}
