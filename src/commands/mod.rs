use clap::Args;
use std::path::PathBuf;

use shoc_header::defaults::Defaults;
use shoc_header::resolve::TerminalArg;
use shoc_header::validation;

pub type CmdResult<T> = shoc_header::Result<(T, i32)>;

pub(crate) struct GlobalArgs {
    pub defaults: Defaults,
}

/// Run metadata supplied on the command line.
///
/// Named flags cover the usual keywords. Anything else goes after a `--`
/// separator as `--key value` pairs; the key is matched loosely against the
/// canonical header keywords, so `--filt` and `--filtera` both mean
/// `FILTERA`. A key with no value asks for (or assumes) one.
///
/// ```sh
/// shoc-header update run.fits --ra "03 14 15" -- --filtera "U" --observer
/// ```
#[derive(Args, Default, Debug)]
pub struct MetadataArgs {
    /// Object name
    #[arg(long)]
    pub object: Option<String>,

    /// Right ascension (HH:MM:SS)
    #[arg(long, allow_hyphen_values = true)]
    pub ra: Option<String>,

    /// Declination (DD:MM:SS)
    #[arg(long, allow_hyphen_values = true)]
    pub dec: Option<String>,

    /// Coordinate epoch
    #[arg(long)]
    pub epoch: Option<String>,

    /// Telescope
    #[arg(long)]
    pub tel: Option<String>,

    /// Filter in wheel A
    #[arg(long)]
    pub filter: Option<String>,

    /// Observer name
    #[arg(long)]
    pub observer: Option<String>,

    /// Ask for every keyword that no other source supplies
    #[arg(long)]
    pub strict: bool,

    /// Skip metadata resolution (only OBSERVAT is set)
    #[arg(long)]
    pub no_update: bool,

    /// Extra --key value pairs (after '--')
    #[arg(last = true, allow_hyphen_values = true)]
    pub extra: Vec<String>,
}

impl MetadataArgs {
    /// Every named flag, set or not, followed by the extra pairs.
    pub fn terminal_args(&self) -> shoc_header::Result<Vec<TerminalArg>> {
        let named = [
            ("object", &self.object),
            ("ra", &self.ra),
            ("dec", &self.dec),
            ("epoch", &self.epoch),
            ("tel", &self.tel),
            ("filter", &self.filter),
            ("observer", &self.observer),
        ];

        let mut args: Vec<TerminalArg> = named
            .into_iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect();
        args.extend(parse_kv_flags(&self.extra)?);
        Ok(args)
    }

    pub fn is_strict(&self, global: &GlobalArgs) -> bool {
        self.strict || global.defaults.strict
    }
}

/// Parse `--key [value]` pairs. A key directly followed by another `--key`
/// (or nothing) has no value.
fn parse_kv_flags(extra: &[String]) -> shoc_header::Result<Vec<TerminalArg>> {
    let mut pairs = Vec::new();
    let mut iter = extra.iter().peekable();

    while let Some(arg) = iter.next() {
        let key = arg.strip_prefix("--").ok_or_else(|| {
            shoc_header::Error::validation_invalid_argument(
                "extra",
                format!("Expected --key, found '{}'", arg),
                None,
                None,
            )
        })?;
        let key = validation::require_non_empty(key, "extra", "Keyword token cannot be empty")?;
        let value = iter.next_if(|next| !next.starts_with("--")).cloned();
        pairs.push((key.to_string(), value));
    }

    Ok(pairs)
}

/// Expand `~` in a user-supplied path.
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).to_string())
}

pub mod config;
pub mod convert;
pub mod matching;
pub mod readnoise;
pub mod resolve;
pub mod show;
pub mod update;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args))
    };
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (shoc_header::Result<serde_json::Value>, i32) {
    crate::tty::status("shoc-header is working...");

    match command {
        // Commands without global context
        crate::Commands::Show(args) => dispatch!(args, show),
        crate::Commands::Match(args) => dispatch!(args, matching),
        crate::Commands::Convert(args) => dispatch!(args, convert),
        crate::Commands::Config(args) => dispatch!(args, config),

        // Commands with global context
        crate::Commands::Resolve(args) => dispatch!(args, global, resolve),
        crate::Commands::Update(args) => dispatch!(args, global, update),
        crate::Commands::Readnoise(args) => dispatch!(args, global, readnoise),
    }
}
