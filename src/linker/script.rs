//! Script classification and word-boundary rules
//!
//! Latin text needs whitespace/punctuation around a match, CJK text does not.
//! Hangul sits in between: it is a letter for boundary purposes, but Korean
//! matches skip boundary checks and get particle handling instead.

use std::sync::OnceLock;

use regex::Regex;

// ==================== CHARACTER CLASSES ====================

/// Han ideographs (CJK unified + extensions + compatibility) and the
/// iteration marks that belong to the Han script.
pub fn is_han(c: char) -> bool {
    matches!(c,
        '\u{3005}' | '\u{3007}' | '\u{3021}'..='\u{3029}' | '\u{3038}'..='\u{303B}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{4E00}'..='\u{9FFF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{20000}'..='\u{2A6DF}'
        | '\u{2A700}'..='\u{2EBEF}'
        | '\u{30000}'..='\u{3134F}'
    )
}

pub fn is_hiragana(c: char) -> bool {
    matches!(c, '\u{3041}'..='\u{309F}' | '\u{1B001}'..='\u{1B11F}')
}

/// Katakana, including the prolonged sound mark and halfwidth forms.
pub fn is_katakana(c: char) -> bool {
    matches!(c,
        '\u{30A0}'..='\u{30FF}'
        | '\u{31F0}'..='\u{31FF}'
        | '\u{32D0}'..='\u{32FE}'
        | '\u{3300}'..='\u{3357}'
        | '\u{FF66}'..='\u{FF9D}'
    )
}

pub fn is_hangul(c: char) -> bool {
    matches!(c,
        '\u{1100}'..='\u{11FF}'
        | '\u{3131}'..='\u{318E}'
        | '\u{A960}'..='\u{A97F}'
        | '\u{AC00}'..='\u{D7AF}'
        | '\u{D7B0}'..='\u{D7FF}'
        | '\u{FFA0}'..='\u{FFDC}'
    )
}

/// Han, Hiragana or Katakana. Hangul is deliberately excluded.
pub fn is_cjk(c: char) -> bool {
    is_han(c) || is_hiragana(c) || is_katakana(c)
}

/// Word boundary predicate.
///
/// `None` (string edge), any Han/Kana character, whitespace, and anything
/// outside `[letter, digit, _, /, -]` count as a boundary.
pub fn is_word_boundary(c: Option<char>) -> bool {
    match c {
        None => true,
        Some(c) if is_cjk(c) => true,
        Some(c) if c.is_whitespace() => true,
        Some(c) => !(c.is_alphanumeric() || c == '_' || c == '/' || c == '-'),
    }
}

/// Relaxed acceptance shape used during trie descent: only Han, Kana,
/// Hangul, whitespace and ASCII digits.
pub fn is_cjk_shaped(text: &str) -> bool {
    !text.is_empty() && text.chars().all(is_cjk_shape_char)
}

/// Same as [`is_cjk_shaped`] over a char slice, without allocating.
pub fn is_cjk_shaped_chars(chars: &[char]) -> bool {
    !chars.is_empty() && chars.iter().copied().all(is_cjk_shape_char)
}

fn is_cjk_shape_char(c: char) -> bool {
    is_cjk(c) || is_hangul(c) || c.is_whitespace() || c.is_ascii_digit()
}

// ==================== SHAPE RULES ====================

fn date_re() -> &'static Regex {
    static DATE_RE: OnceLock<Regex> = OnceLock::new();
    DATE_RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern compiles"))
}

fn month_re() -> &'static Regex {
    static MONTH_RE: OnceLock<Regex> = OnceLock::new();
    MONTH_RE.get_or_init(|| Regex::new(r"^[0-9]{1,2}$").expect("month pattern compiles"))
}

/// Strict `YYYY-MM-DD` shape (ASCII digits only, no calendar validation).
pub fn is_date_like(text: &str) -> bool {
    text.is_ascii() && date_re().is_match(text)
}

/// A bare 1-2 digit number in 1..=12, which would collide with month notes.
pub fn is_month_number(text: &str) -> bool {
    month_re().is_match(text) && matches!(text.parse::<u8>(), Ok(1..=12))
}

// ==================== MATCH CLASSIFICATION ====================

/// How a matched candidate string is treated by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptClass {
    /// Purely Hangul: particle suffix rules apply, boundaries skipped.
    Korean,
    /// CJK-shaped with at least one Han/Kana character: boundaries skipped.
    Cjk,
    /// Everything else: word boundaries required on both sides.
    Latin,
}

impl ScriptClass {
    pub fn of(matched: &str) -> Self {
        if !matched.is_empty() && matched.chars().all(is_hangul) {
            ScriptClass::Korean
        } else if is_cjk_shaped(matched) && matched.chars().any(is_cjk) {
            ScriptClass::Cjk
        } else {
            ScriptClass::Latin
        }
    }

    pub fn skips_boundaries(self) -> bool {
        !matches!(self, ScriptClass::Latin)
    }
}

/// What follows a Korean match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KoreanSuffix {
    /// Copula `이다`, optionally followed by `.`; carries the suffix length in chars.
    Copula(usize),
    /// Topic/subject particle `는` or `은`.
    TopicParticle,
    None,
}

pub fn korean_suffix(rest: &[char]) -> KoreanSuffix {
    match rest {
        ['이', '다', '.', ..] => KoreanSuffix::Copula(3),
        ['이', '다', ..] => KoreanSuffix::Copula(2),
        ['는', ..] | ['은', ..] => KoreanSuffix::TopicParticle,
        _ => KoreanSuffix::None,
    }
}

const JAPANESE_PARTICLES: &[&str] = &[
    "から", "まで", "より", "の", "は", "が", "を", "に", "で", "と", "へ", "も", "や",
];

/// Japanese particle immediately following a match, if any.
pub fn japanese_particle(rest: &[char]) -> Option<&'static str> {
    JAPANESE_PARTICLES.iter().copied().find(|particle| {
        rest.len() >= particle.chars().count()
            && particle.chars().zip(rest).all(|(p, r)| p == *r)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries() {
        assert!(is_word_boundary(None));
        assert!(is_word_boundary(Some(' ')));
        assert!(is_word_boundary(Some('.')));
        assert!(is_word_boundary(Some('ひ')));
        assert!(is_word_boundary(Some('漢')));
        assert!(!is_word_boundary(Some('a')));
        assert!(!is_word_boundary(Some('7')));
        assert!(!is_word_boundary(Some('_')));
        assert!(!is_word_boundary(Some('/')));
        assert!(!is_word_boundary(Some('-')));
        // Hangul is a letter, not a boundary
        assert!(!is_word_boundary(Some('문')));
    }

    #[test]
    fn test_cjk_shape() {
        assert!(is_cjk_shaped("ひらがな"));
        assert!(is_cjk_shaped("문서"));
        assert!(is_cjk_shaped("第3章"));
        assert!(!is_cjk_shaped("hello"));
        assert!(!is_cjk_shaped(""));
    }

    #[test]
    fn test_date_and_month() {
        assert!(is_date_like("2024-01-31"));
        assert!(!is_date_like("2024-1-31"));
        assert!(!is_date_like("２０２４-01-31"));
        assert!(is_month_number("1"));
        assert!(is_month_number("09"));
        assert!(is_month_number("12"));
        assert!(!is_month_number("13"));
        assert!(!is_month_number("0"));
        assert!(!is_month_number("123"));
    }

    #[test]
    fn test_script_class() {
        assert_eq!(ScriptClass::of("문서"), ScriptClass::Korean);
        assert_eq!(ScriptClass::of("ひらがな"), ScriptClass::Cjk);
        assert_eq!(ScriptClass::of("hello"), ScriptClass::Latin);
        assert_eq!(ScriptClass::of("2024"), ScriptClass::Latin);
    }

    #[test]
    fn test_korean_suffix() {
        let rest: Vec<char> = "이다.".chars().collect();
        assert_eq!(korean_suffix(&rest), KoreanSuffix::Copula(3));
        let rest: Vec<char> = "이다 그리고".chars().collect();
        assert_eq!(korean_suffix(&rest), KoreanSuffix::Copula(2));
        let rest: Vec<char> = "는".chars().collect();
        assert_eq!(korean_suffix(&rest), KoreanSuffix::TopicParticle);
        let rest: Vec<char> = "을".chars().collect();
        assert_eq!(korean_suffix(&rest), KoreanSuffix::None);
    }

    #[test]
    fn test_japanese_particle() {
        let rest: Vec<char> = "からです".chars().collect();
        assert_eq!(japanese_particle(&rest), Some("から"));
        let rest: Vec<char> = "は良い".chars().collect();
        assert_eq!(japanese_particle(&rest), Some("は"));
        let rest: Vec<char> = " text".chars().collect();
        assert_eq!(japanese_particle(&rest), None);
    }
}
