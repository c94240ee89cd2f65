use std::fs::{self, File};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{debug, error};
use nb0::{Extraction, Nb0Error, Nb0Read, Nb0Reader};

use clap::builder::styling::*;
pub fn styles() -> clap::builder::Styles {
    Styles::styled()
        .header(AnsiColor::Green.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Cyan.on_default())
        .error(AnsiColor::Red.on_default() | Effects::BOLD)
        .valid(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .invalid(AnsiColor::Yellow.on_default() | Effects::BOLD)
}

/// tool to extract and list nb0 firmware containers
#[derive(Parser)]
#[command(author,
          version,
          name = "unnb0",
          max_term_width = 98,
          styles = styles(),
)]
struct Args {
    /// nb0 firmware path
    nb0file: PathBuf,

    /// Extract to [OUTDIR]
    #[arg(default_value = "outdir")]
    outdir: PathBuf,

    /// Enable debug output
    #[arg(short)]
    debug: bool,

    /// Print information of file and exit
    #[arg(short)]
    info: bool,
}

const MARGIN: &str = "     ";

fn main() -> ExitCode {
    let args = Args::parse();
    let level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Nb0Error::Format { expected, actual } = &e {
                debug!("FileSize is {actual} and from header it is {expected}");
                error!("{} is not a .nb0 firmware", args.nb0file.display());
            } else {
                error!("{e}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Nb0Error> {
    nb0::check_out_dir(&args.outdir)?;

    let file = match File::open(&args.nb0file) {
        Ok(file) => file,
        Err(source) => return Err(Nb0Error::Open { path: args.nb0file.clone(), source }),
    };
    let mut archive = Nb0Reader::from_reader(file)?;

    if args.info {
        // with -d every entry was already logged while reading the table
        if !args.debug {
            for entry in &archive.table.entries {
                println!("{entry}\n");
            }
        }
        return Ok(());
    }

    println!("\nExtracting to {}\n", args.outdir.display());
    fs::create_dir_all(&args.outdir)?;
    for entry in &archive.table.entries {
        let extraction =
            archive.reader.extract_to_dir(entry, &args.outdir, |written, total| {
                print_progress(written, total)
            });
        if extraction? == Extraction::Written {
            println!("\r{}{MARGIN}", entry.name);
        }
    }

    println!("\nDone...");
    Ok(())
}

/// Redraw the completion percentage of the current file in place
fn print_progress(written: u64, total: u64) {
    let percent = u128::from(written) * 100 / u128::from(total);
    print!("\r{percent}%");
    let _ = io::stdout().flush();
}
