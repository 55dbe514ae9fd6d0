use chrono::Local;
use clap::Args;
use serde::Serialize;

use shoc_header::fits;
use shoc_header::update::{self, HeaderUpdate, UpdateOptions};

use super::{expand_path, CmdResult, GlobalArgs, MetadataArgs};

#[derive(Args)]
pub struct UpdateArgs {
    /// FITS file to update in place
    pub file: String,

    #[command(flatten)]
    pub metadata: MetadataArgs,

    /// Report the update without writing the file
    #[arg(long)]
    pub dry_run: bool,

    /// Log renames and keywords left unchanged
    #[arg(long)]
    pub verbose: bool,
}

#[derive(Debug, Serialize)]
pub struct UpdateOutput {
    command: String,
    path: String,
    #[serde(flatten)]
    update: HeaderUpdate,
    written: bool,
}

pub fn run(args: UpdateArgs, global: &GlobalArgs) -> CmdResult<UpdateOutput> {
    let path = expand_path(&args.file);
    let mut header = fits::read_header(&path)?;
    let terminal = args.metadata.terminal_args()?;

    let history = global.defaults.history.then(|| {
        format!(
            "Header updated by shoc-header {} on {}",
            crate::VERSION,
            Local::now().format("%Y-%m-%dT%H:%M:%S")
        )
    });

    let options = UpdateOptions {
        do_update: !args.metadata.no_update,
        strict: args.metadata.is_strict(global),
        verbose: args.verbose,
        history,
        readnoise_table: &global.defaults.readnoise_table,
    };

    let mut input = crate::tty::input_loop();
    let result = update::update_header(&mut header, &terminal, &options, &mut *input)?;

    let written = result.changed && !args.dry_run;
    if written {
        fits::write_header(&path, &header)?;
        shoc_header::log_status!("update", "Wrote {}", path.display());
    }

    Ok((
        UpdateOutput {
            command: "update".to_string(),
            path: path.display().to_string(),
            update: result,
            written,
        },
        0,
    ))
}
