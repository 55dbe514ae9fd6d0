use clap::Args;
use serde::Serialize;

use shoc_header::matcher::{self, KeywordScore};
use shoc_header::{keywords, validation};

use super::CmdResult;

#[derive(Args)]
pub struct MatchArgs {
    /// Loosely spelled keyword (case-insensitive pattern)
    pub token: String,

    /// Candidate keywords (defaults to the canonical run keywords)
    #[arg(long = "keyword", value_name = "KEYWORD")]
    pub keywords: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MatchOutput {
    command: String,
    token: String,
    matched: Option<String>,
    scores: Vec<KeywordScore>,
}

pub fn run(args: MatchArgs) -> CmdResult<MatchOutput> {
    let token = validation::require_non_empty(&args.token, "token", "Token cannot be empty")?;

    let candidates: Vec<String> = if args.keywords.is_empty() {
        keywords::canonical()
            .names()
            .iter()
            .map(|k| k.to_string())
            .collect()
    } else {
        args.keywords.iter().map(|k| k.to_uppercase()).collect()
    };

    let matched = matcher::match_keyword(token, &candidates).map(str::to_string);
    let scores = matcher::score_keywords(token, &candidates);

    Ok((
        MatchOutput {
            command: "match".to_string(),
            token: token.to_string(),
            matched,
            scores,
        },
        0,
    ))
}
