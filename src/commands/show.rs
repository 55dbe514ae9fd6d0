use clap::Args;
use serde::Serialize;

use shoc_header::header::Card;
use shoc_header::{fits, keywords, legacy};

use super::{expand_path, CmdResult};

#[derive(Args)]
pub struct ShowArgs {
    /// FITS file
    pub file: String,
}

#[derive(Debug, Serialize)]
pub struct ShowOutput {
    command: String,
    path: String,
    cards: Vec<Card>,
    /// Run keywords the header lacks
    missing: Vec<&'static str>,
    legacy_keywords: bool,
}

pub fn run(args: ShowArgs) -> CmdResult<ShowOutput> {
    let path = expand_path(&args.file);
    let header = fits::read_header(&path)?;

    Ok((
        ShowOutput {
            command: "show".to_string(),
            path: path.display().to_string(),
            missing: keywords::missing_keywords(&header),
            legacy_keywords: legacy::has_old_keys(&header),
            cards: header.cards().to_vec(),
        },
        0,
    ))
}
