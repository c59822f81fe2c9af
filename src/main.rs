use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    versify::logging::init().context("init logging")?;

    let cli = versify::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        versify::cli::Command::Setup(args) => {
            versify::setup::run(args).await.context("setup")?;
        }
        versify::cli::Command::Convert(args) => {
            versify::convert::run(args).context("convert")?;
        }
        versify::cli::Command::Check(args) => {
            versify::check::run(args).context("check")?;
        }
        versify::cli::Command::Show(args) => {
            versify::show::run(args).context("show")?;
        }
    }

    Ok(())
}
