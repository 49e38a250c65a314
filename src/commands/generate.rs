use crate::cli::{Cli, Commands};
use crate::domain::models::JsonOut;
use crate::services::certificate;
use crate::services::environment::{self, SystemProbes};
use crate::services::journal::JournalctlSource;
use crate::services::output;
use crate::services::text::{self, TAB_WIDTH};

pub fn handle_commands(cli: &Cli) -> anyhow::Result<()> {
    let journal = JournalctlSource::new(&cli.guest_logs);
    let probes = SystemProbes;

    match &cli.command {
        Commands::Generate {
            output: path,
            no_save,
            publish,
        } => {
            // Compose the whole document before touching any sink, so a
            // fatal error never leaves a partial certificate behind.
            let certificate = certificate::build_certificate(&journal, &probes, &cli.sev_version)?;
            let content = certificate::render_certificate(&certificate);
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&JsonOut {
                        ok: true,
                        data: &certificate
                    })?
                );
            } else {
                println!("{content}");
            }
            if !*no_save {
                output::write_certificate(&content, path, &cli.sev_version)?;
            }
            if *publish {
                let reference = output::publish_certificate(&content)?;
                println!(
                    "SEV version {} Certificate published at: {}",
                    cli.sev_version, reference
                );
            }
        }
        Commands::Environment => {
            let details = environment::test_environment_details(&journal, &probes)?;
            let details = text::expand_tabs(&details, TAB_WIDTH);
            output::print_one(cli.json, details, |d| d.clone())?;
        }
        Commands::Log => {
            let log = certificate::version_log(&journal, &cli.sev_version)?;
            output::print_one(cli.json, log, |l| l.clone())?;
        }
    }

    Ok(())
}
