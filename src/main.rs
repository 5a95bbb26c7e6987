use anyhow::Result;
use clap::Parser;
use indicatif::MultiProgress;
use mail_reorg::cli::{self, Cli, Commands, ProgressReporter, Workflow};
use mail_reorg::config::Config;
use mail_reorg::error::ReorgError;
use std::io::{self, Write};
use std::process;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Collects one formatted event and prints it above the progress bars
struct ProgressLine {
    multi: MultiProgress,
    buf: Vec<u8>,
}

impl Write for ProgressLine {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ProgressLine {
    fn drop(&mut self) {
        let line = String::from_utf8_lossy(&self.buf);
        let line = line.trim_end_matches('\n');
        if !line.is_empty() {
            let _ = self.multi.println(line);
        }
    }
}

#[derive(Clone)]
struct ProgressLog(MultiProgress);

impl<'a> MakeWriter<'a> for ProgressLog {
    type Writer = ProgressLine;

    fn make_writer(&'a self) -> Self::Writer {
        ProgressLine {
            multi: self.0.clone(),
            buf: Vec::new(),
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        if let Some(hint) = e.downcast_ref::<ReorgError>().and_then(ReorgError::hint) {
            eprintln!("\n{}", hint);
        }
        eprintln!("\nFor help, run: mail-reorg --help");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Install default crypto provider for rustls
    // On non-Windows platforms, use aws-lc-rs; on Windows, use ring
    #[cfg(not(windows))]
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install default crypto provider"))?;

    #[cfg(windows)]
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install default crypto provider"))?;

    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("mail_reorg=debug,warn"))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("mail_reorg=info,warn"))
    };

    // Logs print above progress bars
    let multi_progress = MultiProgress::new();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(ProgressLog(multi_progress.clone()))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    let reporter = ProgressReporter::new(multi_progress);

    match cli.command {
        Commands::Organize(args) => {
            let config = Config::load(&cli.config).await?;
            cli::run_workflow(Workflow::Organize, &config, &args, &reporter).await?;
        }

        Commands::Cleanup(args) => {
            let config = Config::load(&cli.config).await?;
            cli::run_workflow(Workflow::Cleanup, &config, &args, &reporter).await?;
        }

        Commands::Prune(args) => {
            let config = Config::load(&cli.config).await?;
            cli::run_workflow(Workflow::Prune, &config, &args, &reporter).await?;
        }

        Commands::List { email } => {
            let config = Config::load(&cli.config).await?;
            cli::list_folders(&config, email.as_deref(), &reporter).await?;
        }

        Commands::InitConfig { output, force } => {
            tracing::info!("Generating example configuration file");

            if output.exists() && !force {
                return Err(ReorgError::ConfigError(format!(
                    "Configuration file already exists at {:?}. Use --force to overwrite.",
                    output
                ))
                .into());
            }

            Config::create_example(&output).await?;

            println!("Created example configuration file at: {:?}", output);
            println!("\nPlease edit this file to customize your settings.");
            println!("Key settings to review:");
            println!("  - account.email: Gmail address to log in as");
            println!("  - planning.protected_folders: Folder trees that are never touched");
            println!("  - [[categories]]: Destination folders and the legacy labels folded into them");
            println!("  - [[flatten]]: Nested containers to collapse");
            println!("  - planning.stale_labels: Labels removed by `prune`");
        }
    }

    Ok(())
}
