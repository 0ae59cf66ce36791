mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries command output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();
    let ctx = commands::Context::load(cli.config.as_deref())?;

    match cli.command {
        cli::Commands::Init { mapping } => commands::init::handle(mapping),
        cli::Commands::Detect {
            input,
            out,
            preview,
            ner,
            encoding,
        } => commands::detect::handle(
            &ctx,
            &input,
            &out,
            preview.as_deref(),
            ner.as_deref(),
            encoding,
        ),
        cli::Commands::Validate {
            input,
            out,
            mapping,
            export_csv,
        } => commands::validate::handle(&ctx, &input, &out, mapping, export_csv.as_deref()),
        cli::Commands::Apply {
            text,
            candidates,
            out,
            report,
            encoding,
        } => commands::apply::handle(&ctx, &text, &candidates, &out, &report, encoding),
        cli::Commands::Tokens { mapping, typ, json } => {
            commands::tokens::handle(&ctx, mapping, typ.as_deref(), json)
        }
    }
}
