use clap::Parser;

mod cli;
mod commands;
mod domain;
mod error;
mod services;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    commands::handle_commands(&cli)
}
