use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use marquee_cli::{commands, default_data_dir};
use marquee_core::RefreshOutcome;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Data directory holding the durable title store
    #[arg(long, global = true)]
    data_dir: Option<Utf8PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the stored current title
    Show,
    /// Fetch the next title and replace the stored one
    Refresh {
        #[arg(long, env = "MARQUEE_ENDPOINT")]
        endpoint: String,
        #[arg(long, default_value_t = marquee_config::DEFAULT_REFRESH_TIMEOUT.as_secs())]
        timeout_secs: u64,
    },
    /// Run one refresh as a deferred job; the exit code encodes the
    /// job result for the scheduler
    Job {
        #[arg(long, env = "MARQUEE_ENDPOINT")]
        endpoint: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).expect("default subscriber");

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };

    match cli.command {
        Commands::Show => commands::cmd_show(data_dir).await?,
        Commands::Refresh {
            endpoint,
            timeout_secs,
        } => {
            let outcome = commands::cmd_refresh(endpoint, data_dir, timeout_secs).await?;
            if let RefreshOutcome::Failure(_) = outcome {
                std::process::exit(1);
            }
        }
        Commands::Job { endpoint } => {
            let result = commands::cmd_job(endpoint, data_dir).await;
            std::process::exit(result.exit_code());
        }
    }
    Ok(())
}
