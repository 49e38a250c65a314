use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_SEV_VERSION: &str = "2.0.0-0";
pub const DEFAULT_GUEST_LOGS_DIR: &str = "/var/log/journal/guest-logs/";
pub const DEFAULT_OUTPUT_PATH: &str = "~/sev_certificate.txt";

#[derive(Parser, Debug)]
#[command(name = "sevcert", version, about = "SEV/SNP test suite certificate generator")]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(
        long,
        global = true,
        default_value = DEFAULT_SEV_VERSION,
        help = "SEV suite version tag under test"
    )]
    pub sev_version: String,
    #[arg(
        long,
        global = true,
        default_value = DEFAULT_GUEST_LOGS_DIR,
        help = "Directory holding the forwarded guest journal"
    )]
    pub guest_logs: PathBuf,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Generate {
        #[arg(
            long,
            default_value = DEFAULT_OUTPUT_PATH,
            help = "Certificate file path (~ expands to $HOME)"
        )]
        output: PathBuf,
        #[arg(long, default_value_t = false, help = "Skip writing the certificate file")]
        no_save: bool,
        #[arg(
            long,
            default_value_t = false,
            help = "Share the certificate through the pastebin service"
        )]
        publish: bool,
    },
    Environment,
    Log,
}
