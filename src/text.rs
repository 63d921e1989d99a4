//! Text normalization shared by the red-flag detector and the complaint matcher.
//!
//! Every comparison in the crate goes through [`normalize_text`]: lower-case,
//! diacritics stripped, whitespace collapsed. Portuguese input such as
//! "Dôr Torácica" and "dor toracica" normalize to the same string.

use std::sync::LazyLock;

use regex::Regex;

/// Token boundaries: anything that is not a letter or a digit.
static RE_TOKEN_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}]+").unwrap());

/// Normalize text for comparison.
///
/// Lower-cases, strips diacritics, collapses whitespace runs to a single
/// space and trims both ends.
pub fn normalize_text(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        fold_char(c, &mut folded);
    }
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Fold one lower-case char to its unaccented base.
/// Combining marks (U+0300..=U+036F) are dropped; ligatures expand.
fn fold_char(c: char, out: &mut String) {
    let base = match c {
        '\u{0300}'..='\u{036f}' => return,
        'æ' => {
            out.push_str("ae");
            return;
        }
        'œ' => {
            out.push_str("oe");
            return;
        }
        'ß' => {
            out.push_str("ss");
            return;
        }
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'č' | 'ĉ' | 'ċ' => 'c',
        'ď' | 'đ' => 'd',
        'é' | 'è' | 'ê' | 'ë' | 'ē' | 'ě' | 'ę' | 'ė' => 'e',
        'ğ' | 'ĝ' => 'g',
        'í' | 'ì' | 'î' | 'ï' | 'ī' | 'ı' | 'į' => 'i',
        'ł' | 'ľ' | 'ĺ' => 'l',
        'ñ' | 'ń' | 'ň' => 'n',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => 'o',
        'ř' | 'ŕ' => 'r',
        'ś' | 'š' | 'ş' | 'ș' => 's',
        'ť' | 'ţ' | 'ț' => 't',
        'ú' | 'ù' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' | 'ų' => 'u',
        'ý' | 'ÿ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        other => other,
    };
    out.push(base);
}

/// Split text into normalized word tokens (whitespace and punctuation
/// boundaries). Empty tokens are never returned.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = normalize_text(text);
    RE_TOKEN_SPLIT
        .split(&normalized)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Character n-grams of the normalized text.
pub fn char_ngrams(text: &str, n: usize) -> Vec<String> {
    if n == 0 {
        return Vec::new();
    }
    let chars: Vec<char> = normalize_text(text).chars().collect();
    chars.windows(n).map(|w| w.iter().collect()).collect()
}

/// Compute Levenshtein edit distance between two strings.
///
/// Operates on Unicode scalar values, not bytes. Two rolling rows.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0usize; n + 1];

    for (i, &a_ch) in a_chars.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &b_ch) in b_chars.iter().enumerate() {
            let cost = usize::from(a_ch != b_ch);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Normalized edit-distance similarity in [0, 1].
///
/// `1 - distance / max_len` over the normalized strings. Two empty strings
/// are identical (1.0).
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = normalize_text(a);
    let b = normalize_text(b);
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    let distance = edit_distance(&a, &b);
    (1.0 - distance as f64 / max_len as f64).clamp(0.0, 1.0)
}
