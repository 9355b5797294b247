use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use qbank_tools::cli::{Cli, Invocation};
use qbank_tools::commands::{clean, convert, tag};
use qbank_tools::error::QbankError;
use qbank_tools::logger::Logger;

/// Argument problems exit through clap so they share its status code
fn report(error: QbankError) {
    match error {
        QbankError::InvalidArguments(message) => Cli::command().error(ErrorKind::ArgumentConflict, message).exit(),
        other => Logger::error(&other.to_string()),
    }
}

fn main() {
    Logger::header(env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();

    let invocation = match cli.command.into_invocation() {
        Ok(invocation) => invocation,
        Err(e) => return report(e),
    };

    let summary = match invocation {
        Invocation::Tag(config) => tag::run(&config).map(|state| {
            format!(
                "Image tagging: {} of {} files updated, {} unchanged, {} skipped, {} failed",
                state.updated(),
                state.processed(),
                state.unchanged(),
                state.skipped().len(),
                state.failures().len()
            )
        }),
        Invocation::Clean(config) => clean::run(&config).map(|state| {
            format!(
                "Page cleanup: {} of {} files updated, {} unchanged, {} skipped, {} failed",
                state.updated(),
                state.processed(),
                state.unchanged(),
                state.skipped().len(),
                state.failures().len()
            )
        }),
        Invocation::Convert(config) => {
            let conversion = convert::run(&config);
            Ok(format!(
                "Conversion: {} converted, {} failed",
                conversion.converted.len(),
                conversion.failures.len()
            ))
        }
    };

    match summary {
        Ok(summary) => Logger::workflow_complete(&summary),
        Err(e) => report(e),
    }
}
