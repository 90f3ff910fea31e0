use clap::Parser;
use pagecheck_cli::{cli, commands, error, logger, ui};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // Argument errors use the configuration exit code; clap's own default (2)
    // would read as a timeout.
    let args = match cli::Cli::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(error::USAGE_EXIT_CODE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let result = match args.command {
        cli::Command::Check(check_args) => commands::check_execute(check_args, args.quiet).await,
        cli::Command::Backends(backends_args) => commands::backends_execute(backends_args).await,
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:?}", error::cli_error_to_miette(err));
            ExitCode::from(error::USAGE_EXIT_CODE)
        }
    }
}
