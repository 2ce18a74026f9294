mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::commands::{Coordinate, LinkRequest};

#[derive(Parser)]
#[command(name = "rangelink", version, about = "Compact file-and-range references")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Log debug output to stderr (overridden by RANGELINK_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan markdown files and verify every RangeLink's target and range
    Check,
    /// Build a RangeLink for a range of a file
    Link {
        /// File to link to, as it should appear in the link
        path: String,
        /// Start as LINE or LINE:COLUMN (one-based)
        #[arg(value_parser = commands::parse_coordinate)]
        start: Coordinate,
        /// End as LINE or LINE:COLUMN (one-based, exclusive column); defaults to the end of the start line
        #[arg(value_parser = commands::parse_coordinate)]
        end: Option<Coordinate>,
        /// Embed the delimiters so the link decodes under any configuration
        #[arg(long)]
        portable: bool,
        /// Treat the range as a column block
        #[arg(long)]
        rectangular: bool,
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Decode a RangeLink and print its structure
    Parse {
        /// Text to decode
        candidate: String,
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the text a RangeLink refers to
    Show {
        /// RangeLink to resolve
        candidate: String,
    },
    /// Validate the delimiters in .rangelink.toml
    Validate,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    rangelink::logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Check => commands::cmd_check(),
        Commands::Link { path, start, end, portable, rectangular, json } => {
            commands::cmd_link(&LinkRequest { end, json, path, portable, rectangular, start })
        },
        Commands::Parse { candidate, json } => commands::cmd_parse(&candidate, json),
        Commands::Show { candidate } => commands::cmd_show(&candidate),
        Commands::Validate => commands::cmd_validate(),
    };

    return match result {
        Ok(code) => code,
        Err(e) => {
            rangelink::diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
    };
}
