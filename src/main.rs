use clap::{Parser, Subcommand};

use commands::GlobalArgs;

mod commands;
mod output;
mod tty;

use commands::{config, convert, matching, readnoise, resolve, show, update};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "shoc-header")]
#[command(version = VERSION)]
#[command(about = "Resolve, validate and update SHOC FITS header metadata")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show header cards and missing run keywords
    Show(show::ShowArgs),
    /// Match a loosely spelled token against header keywords
    Match(matching::MatchArgs),
    /// Resolve run metadata from flags, header defaults and prompts
    Resolve(resolve::ResolveArgs),
    /// Resolve metadata and write it into the header
    Update(update::UpdateArgs),
    /// Rename legacy HIERARCH keywords
    Convert(convert::ConvertArgs),
    /// Look up readout noise for the header's instrument configuration
    Readnoise(readnoise::ReadnoiseArgs),
    /// Manage global shoc-header configuration
    Config(config::ConfigArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let global = GlobalArgs {
        defaults: shoc_header::defaults::load_defaults(),
    };

    let (json_result, exit_code) = commands::run_json(cli.command, &global);

    if let Err(err) = output::print_json_result(json_result) {
        eprintln!("{}", err);
        return std::process::ExitCode::from(1);
    }

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
