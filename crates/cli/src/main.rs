//! hypershape command line interface

mod cli;
mod commands;
mod errors;
mod tracing;

use crate::cli::parse;
use crate::commands::Command;
use crate::errors::CliError;
use crate::tracing::TracingConfig;
use ::tracing::instrument;
use std::io::Write;

fn main() -> miette::Result<()> {
    let cli = parse();

    let tracing_config = TracingConfig {
        format: cli.log_format,
        level: cli.level.into(),
        filter: cli.log_filter,
    };
    crate::tracing::init_tracing(tracing_config)?;

    let command: Command = cli.command.into();
    run(&command)?;
    Ok(())
}

#[instrument(name = "hypershape_run", skip_all)]
fn run(command: &Command) -> Result<(), CliError> {
    let output = commands::execute(command)?;

    let target = match command {
        Command::Transform(args) => args.output.as_deref(),
        _ => None,
    };

    if let Some(path) = target {
        std::fs::write(path, with_newline(output))
            .map_err(|e| CliError::file_error("write", path, e))?;
        ::tracing::info!(path = %path.display(), "Document written");
    } else {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(with_newline(output).as_bytes())
            .and_then(|()| stdout.flush())
            .map_err(|e| CliError::file_error("write", "<stdout>", e))?;
    }
    Ok(())
}

fn with_newline(mut output: String) -> String {
    if !output.ends_with('\n') {
        output.push('\n');
    }
    output
}
