use clap::Parser;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use careledger::cli::{Cli, Commands, ConfigAction, ConsentAction};
use careledger::commands::{
    AppContext, cmd_config_show, cmd_consent_create, cmd_consent_set_status, cmd_consent_show,
    cmd_consents, cmd_patient_show, cmd_patients, cmd_stats, cmd_transactions, cmd_watch,
};
use careledger::config::Config;
use careledger::error::Result;

/// Logs go to stderr so list and JSON output stay clean
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("careledger=warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;

    if let Commands::Config {
        action: ConfigAction::Show,
    } = cli.command
    {
        return cmd_config_show(&config);
    }

    let ctx = AppContext::from_config(config)?;

    match cli.command {
        Commands::Patients { list } => cmd_patients(&ctx, list).await,
        Commands::Consents { status, list } => cmd_consents(&ctx, status, list).await,
        Commands::Transactions {
            tx_type,
            status,
            mine,
            list,
        } => cmd_transactions(&ctx, tx_type, status, mine, list).await,
        Commands::Patient { id, json } => cmd_patient_show(&ctx, &id, json).await,
        Commands::Consent { action } => match action {
            ConsentAction::Show { id, json } => cmd_consent_show(&ctx, &id, json).await,
            ConsentAction::Create { patient, purpose } => {
                cmd_consent_create(&ctx, &patient, &purpose).await
            }
            ConsentAction::SetStatus { id, status } => {
                cmd_consent_set_status(&ctx, &id, status).await
            }
        },
        Commands::Stats { json } => cmd_stats(&ctx, json).await,
        Commands::Watch { view } => cmd_watch(&ctx, view).await,
        Commands::Config { .. } => Ok(()),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
