use clap::Args;
use serde::Serialize;

use shoc_header::fits;
use shoc_header::readnoise::{self, ReadNoiseCard};

use super::{expand_path, CmdResult, GlobalArgs};

#[derive(Args)]
pub struct ReadnoiseArgs {
    /// FITS file
    pub file: String,

    /// Include card comments
    #[arg(long)]
    pub comments: bool,

    /// Write RON, SENSITIV and SATURATE into the header
    #[arg(long)]
    pub write: bool,
}

#[derive(Debug, Serialize)]
pub struct ReadnoiseOutput {
    command: String,
    path: String,
    cards: Vec<ReadNoiseCard>,
    written: bool,
}

pub fn run(args: ReadnoiseArgs, global: &GlobalArgs) -> CmdResult<ReadnoiseOutput> {
    let path = expand_path(&args.file);
    let mut header = fits::read_header(&path)?;
    let table = &global.defaults.readnoise_table;

    let cards = readnoise::readnoise_dict(&header, table, args.comments)?;

    if args.write {
        readnoise::set_readnoise(&mut header, table)?;
        fits::write_header(&path, &header)?;
    }

    Ok((
        ReadnoiseOutput {
            command: "readnoise".to_string(),
            path: path.display().to_string(),
            cards,
            written: args.write,
        },
        0,
    ))
}
