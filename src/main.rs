use clap::Parser;
use clap::error::ErrorKind;

use fsnap::backup::{BackupRequest, handle_backup};
use fsnap::cli::{Args, Commands};
use fsnap::config::Config;
use fsnap::report::{ConsoleReporter, Reporter};
use fsnap::snapshot::BuildOptions;

fn fail(reporter: &dyn Reporter, message: &str, err: color_eyre::Report) -> ! {
    reporter.error(message);
    eprintln!("{:?}", err);
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => e.exit(),
            _ => {
                let _ = e.print();
                std::process::exit(1);
            }
        },
    };

    match args.command {
        Commands::Backup {
            pattern,
            out_file,
            format,
            verbose,
        } => {
            let reporter = ConsoleReporter::new(verbose);

            let config = match Config::load(args.config.as_deref()) {
                Ok(config) => config,
                Err(err) => fail(&reporter, "Could not load configuration", err),
            };
            let reporter = reporter.with_color_theme(config.ui.color.theme.clone());

            let root = match std::env::current_dir() {
                Ok(root) => root,
                Err(err) => fail(&reporter, "Could not determine working directory", err.into()),
            };
            let options = BuildOptions::new(root)
                .with_max_concurrent_reads(config.encode.max_concurrent_reads);

            let request = BackupRequest {
                pattern,
                out_file,
                format,
            };

            if let Err(err) = handle_backup(&request, &options, &reporter).await {
                fail(&reporter, "Backup failed", err);
            }
        }
    }

    Ok(())
}
