//! Mode-table compiler binary.
//!
//! Builds every requested (sample rate, frame size) mode and writes them as
//! static C definitions to `static_modes_float.h` (or `static_modes_fixed.h`
//! when built with the `fixed_point` feature).

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use bumpalo::Bump;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use thiserror::Error;

use celt_modegen::celt::{create_modes, CustomModeFactory};
use celt_modegen::emit::{dump_header, Batch};
use celt_modegen::{DumpError, ModeDescriptor, ModeError, Word};

#[cfg(feature = "fixed_point")]
type Sample = i16;
#[cfg(not(feature = "fixed_point"))]
type Sample = f32;

/// Generate static CELT mode definitions
#[derive(Parser, Debug)]
#[command(name = "dump_modes", version, about, long_about = None)]
struct Cli {
    /// Sample rate and frame size pairs, e.g. `48000 960 48000 480`
    #[arg(value_name = "RATE FRAME_SIZE", required = true, allow_negative_numbers = true)]
    pairs: Vec<i32>,

    /// Directory the mode file is written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Also write the companion header summarizing the modes
    #[arg(long, value_name = "FILE")]
    header: Option<PathBuf>,
}

impl Cli {
    /// Group the positional values into (rate, frame size) pairs.
    fn rate_pairs(&self) -> Result<Vec<(i32, i32)>, clap::Error> {
        if self.pairs.len() % 2 != 0 {
            return Err(Cli::command().error(
                ErrorKind::WrongNumberOfValues,
                format!(
                    "expected (rate, frame size) pairs, got {} values",
                    self.pairs.len()
                ),
            ));
        }
        Ok(self
            .pairs
            .chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
            .collect())
    }
}

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Mode(#[from] ModeError),

    #[error(transparent)]
    Emit(#[from] DumpError),

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl CliError {
    fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Mode(_) => ExitCode::from(2),
            CliError::Emit(DumpError::Io(_)) | CliError::Write { .. } => ExitCode::from(3),
            CliError::Emit(_) => ExitCode::from(2),
        }
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), CliError> {
    fs::write(path, contents).map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn run(cli: &Cli, pairs: &[(i32, i32)]) -> Result<(), CliError> {
    log::info!(
        "Building {} {} modes",
        pairs.len(),
        <Sample as Word>::MODE
    );
    let modes: Vec<ModeDescriptor<Sample>> = create_modes(&CustomModeFactory, pairs)?;

    let arena = Bump::new();
    let batch = Batch::new(&arena, &modes);
    let mut body = String::new();
    batch.write_body(&mut body)?;

    let mut header = String::new();
    if cli.header.is_some() {
        dump_header(&mut header, &modes)?;
    }

    let path = cli.out_dir.join(<Sample as Word>::MODE.output_file_name());
    write_file(&path, &body)?;
    log::info!("Wrote {} modes to {}", modes.len(), path.display());

    if let Some(header_path) = &cli.header {
        write_file(header_path, &header)?;
        log::info!("Wrote header to {}", header_path.display());
    }
    log::debug!("{}", batch.stats());
    Ok(())
}

/// Print a clap error with its usage line and map it to an exit code.
fn usage_exit(err: clap::Error) -> ExitCode {
    let _ = err.print();
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
        _ => ExitCode::from(1),
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return usage_exit(err),
    };
    let pairs = match cli.rate_pairs() {
        Ok(pairs) => pairs,
        Err(err) => return usage_exit(err),
    };

    match run(&cli, &pairs) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            err.exit_code()
        }
    }
}
