use clap::Args;
use serde::Serialize;

use shoc_header::fits;
use shoc_header::legacy::{self, RenameReport};

use super::{expand_path, CmdResult};

#[derive(Args)]
pub struct ConvertArgs {
    /// FITS file
    pub file: String,

    /// Rename new keywords back to the old HIERARCH names
    #[arg(long)]
    pub reverse: bool,

    /// Report the renames without writing the file
    #[arg(long)]
    pub dry_run: bool,

    /// Log the rename table
    #[arg(long)]
    pub verbose: bool,
}

#[derive(Debug, Serialize)]
pub struct ConvertOutput {
    command: String,
    path: String,
    report: RenameReport,
    written: bool,
}

pub fn run(args: ConvertArgs) -> CmdResult<ConvertOutput> {
    let path = expand_path(&args.file);
    let mut header = fits::read_header(&path)?;

    let report = legacy::convert_old_new(&mut header, !args.reverse, args.verbose);

    let written = !args.dry_run && !report.renamed.is_empty();
    if written {
        fits::write_header(&path, &header)?;
    }

    Ok((
        ConvertOutput {
            command: "convert".to_string(),
            path: path.display().to_string(),
            report,
            written,
        },
        0,
    ))
}
