use clap::Args;
use serde::Serialize;

use shoc_header::header::Metadata;
use shoc_header::{fits, resolve, update};

use super::{expand_path, CmdResult, GlobalArgs, MetadataArgs};

#[derive(Args)]
pub struct ResolveArgs {
    /// FITS file supplying header defaults
    pub file: String,

    #[command(flatten)]
    pub metadata: MetadataArgs,
}

#[derive(Debug, Serialize)]
pub struct ResolveOutput {
    command: String,
    path: String,
    info: Metadata,
    needs_update: Metadata,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    prompted: Vec<String>,
}

pub fn run(args: ResolveArgs, global: &GlobalArgs) -> CmdResult<ResolveOutput> {
    let path = expand_path(&args.file);
    let header = fits::read_header(&path)?;
    let terminal = args.metadata.terminal_args()?;

    let mut input = crate::tty::input_loop();
    let resolution = resolve::resolve_metadata(
        !args.metadata.no_update,
        &terminal,
        &header,
        args.metadata.is_strict(global),
        &mut *input,
    )?;

    let needs_update = update::needs_update(&resolution.info, &header, false);

    Ok((
        ResolveOutput {
            command: "resolve".to_string(),
            path: path.display().to_string(),
            info: resolution.info,
            needs_update,
            warnings: resolution.warnings,
            prompted: resolution.prompted,
        },
        0,
    ))
}
