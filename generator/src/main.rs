mod cli;

use std::{fs, process::ExitCode};

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use xb_generator::{Error, Options};

fn run(cli: &cli::Cli) -> Result<(), Error> {
    let input = &cli.input;
    let source = fs::read_to_string(input).map_err(|source| Error::Io {
        path: input.clone(),
        source,
    })?;

    let stem = input
        .file_stem()
        .map_or_else(|| "schema".into(), |stem| stem.to_string_lossy());
    let options = Options {
        generator: cli.generator,
        module_name: stem.to_string(),
        source_name: input
            .file_name()
            .map_or_else(|| input.display().to_string(), |n| n.to_string_lossy().into()),
        namespace: cli.namespace.clone(),
        allow_dtd: cli.allow_dtd,
    };
    let generated = xb_generator::compile(&source, &options)?;

    let output = cli
        .output_dir
        .join(format!("{stem}.{}", cli.generator.file_extension()));
    fs::write(&output, generated).map_err(|source| Error::Io {
        path: output.clone(),
        source,
    })?;
    info!("wrote {}", output.display());
    Ok(())
}

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}: {err}", cli.input.display());
            ExitCode::FAILURE
        }
    }
}
