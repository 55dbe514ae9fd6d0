//! Fuzzy matching of terminal tokens against canonical header keywords.
//!
//! A token is used as a case-insensitive pattern. A token may hit several
//! keywords (`ra` hits both `OBJRA` and `FILTERA`), so each hit is scored by
//! the fraction of the keyword covered by the first match and the best
//! fraction wins.

use regex::{Regex, RegexBuilder};
use serde::Serialize;

/// Score of a single keyword against a token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordScore {
    pub keyword: String,
    pub score: Option<f64>,
}

/// Compile a token as a case-insensitive pattern. Tokens that are not valid
/// patterns are matched literally.
pub fn compile_token(token: &str) -> Regex {
    RegexBuilder::new(token)
        .case_insensitive(true)
        .build()
        .or_else(|_| {
            RegexBuilder::new(&regex::escape(token))
                .case_insensitive(true)
                .build()
        })
        .expect("escaped token is a valid pattern")
}

/// Length of the first match divided by the keyword length, or `None` when
/// the pattern does not occur in `candidate`.
pub fn match_score(pattern: &Regex, candidate: &str) -> Option<f64> {
    let m = pattern.find(candidate)?;
    let total = candidate.chars().count();
    if total == 0 {
        return Some(0.0);
    }
    Some(m.as_str().chars().count() as f64 / total as f64)
}

/// Scores of every keyword, in keyword order.
pub fn score_keywords<S: AsRef<str>>(token: &str, keywords: &[S]) -> Vec<KeywordScore> {
    let pattern = compile_token(token);
    keywords
        .iter()
        .map(|k| KeywordScore {
            keyword: k.as_ref().to_string(),
            score: match_score(&pattern, k.as_ref()),
        })
        .collect()
}

/// Best matching keyword for `token`, or `None` if no keyword matches.
///
/// Ties go to the keyword that comes first.
pub fn match_keyword<'a, S: AsRef<str>>(token: &str, keywords: &'a [S]) -> Option<&'a str> {
    let pattern = compile_token(token);
    let mut best: Option<(&'a str, f64)> = None;

    for keyword in keywords {
        let keyword = keyword.as_ref();
        let Some(score) = match_score(&pattern, keyword) else {
            continue;
        };
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((keyword, score)),
        }
    }

    best.map(|(keyword, _)| keyword)
}
