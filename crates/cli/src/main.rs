use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gatepass_core::{
    create_session_provider, load_config, resolve_entry, validate_config, Disposition, EntryRoute,
    FlowError, GuardianSlot, HttpStudentStore, Phase, Reconciler, SanitizedConfig, Session,
    SessionProvider, StudentStore, SubmitOutcome, TicketRenderer,
};

#[derive(Parser)]
#[command(name = "gatepass")]
#[command(about = "Register for the event and download the entry ticket", version)]
struct Cli {
    /// Config file; falls back to $GATEPASS_CONFIG, then ./config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show where the signed-in student would be routed
    Status,
    /// Submit the registration form
    Register {
        /// Number of guests (0 to 2)
        #[arg(long, allow_negative_numbers = true)]
        guests: i64,
        /// Name of the first guardian, required for one or more guests
        #[arg(long)]
        guardian1: Option<String>,
        /// Name of the second guardian, required for two guests
        #[arg(long)]
        guardian2: Option<String>,
    },
    /// Generate and save the entry ticket PDF, then sign out
    Ticket {
        /// Output directory, overriding `ticket.output_dir`
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the effective configuration with secrets redacted
    Config,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .or_else(|| std::env::var("GATEPASS_CONFIG").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    if let Commands::Config = cli.command {
        let sanitized = SanitizedConfig::from(&config);
        println!("{}", serde_json::to_string_pretty(&sanitized)?);
        return Ok(());
    }

    let sessions: Arc<dyn SessionProvider> = Arc::from(
        create_session_provider(&config.session).context("Failed to create session provider")?,
    );
    info!("Using session method: {}", sessions.method_name());

    let store: Arc<dyn StudentStore> = Arc::new(
        HttpStudentStore::new(&config.store).context("Failed to create store client")?,
    );

    let session = sessions
        .current_session()
        .await
        .context("Failed to read session")?;

    match cli.command {
        Commands::Status => status(session.as_ref(), store, sessions.as_ref()).await,
        Commands::Register {
            guests,
            guardian1,
            guardian2,
        } => {
            let reconciler = Reconciler::new(store);
            register(&reconciler, session.as_ref(), sessions.as_ref(), guests, guardian1, guardian2)
                .await
        }
        Commands::Ticket { out } => {
            let dir = out.unwrap_or_else(|| config.ticket.output_dir.clone());
            let renderer = TicketRenderer::new(store, config.ticket.clone());
            ticket(&renderer, session.as_ref(), sessions.as_ref(), dir).await
        }
        Commands::Config => Ok(()),
    }
}

async fn status(
    session: Option<&Session>,
    store: Arc<dyn StudentStore>,
    sessions: &dyn SessionProvider,
) -> Result<()> {
    match resolve_entry(session, store.as_ref(), sessions, None).await {
        EntryRoute::SignIn { error: None } => println!("Not signed in."),
        EntryRoute::SignIn { error: Some(e) } => bail!("Signed out: {}", e),
        EntryRoute::Register => println!("Not registered yet. Run `gatepass register`."),
        EntryRoute::Ticket => println!("Registered. Run `gatepass ticket` to download the ticket."),
    }
    Ok(())
}

async fn register(
    reconciler: &Reconciler,
    session: Option<&Session>,
    sessions: &dyn SessionProvider,
    guests: i64,
    guardian1: Option<String>,
    guardian2: Option<String>,
) -> Result<()> {
    let identity = match reconciler.load(session).await {
        Ok(identity) => identity,
        Err(e) => return Err(fail(e, sessions).await),
    };
    println!("{} ({})", identity.name, identity.roll_no);

    if reconciler.phase() == Phase::Registered {
        let view = reconciler.view();
        println!("Already registered; details can no longer be changed.");
        println!("Guests: {}", view.draft.guest_count().unwrap_or(0));
        for slot in [GuardianSlot::First, GuardianSlot::Second] {
            let name = view.draft.guardian(slot);
            if !name.is_empty() {
                println!("Guardian {}: {}", slot.number(), name);
            }
        }
        return Ok(());
    }

    reconciler.set_guest_count(Some(guests))?;
    for (slot, name) in [(GuardianSlot::First, guardian1), (GuardianSlot::Second, guardian2)] {
        if let Some(name) = name {
            reconciler.set_guardian(slot, name)?;
        }
    }

    match reconciler.submit(session).await {
        Ok(SubmitOutcome::Submitted) => {
            println!("Registration successful. Run `gatepass ticket` to download the ticket.");
            Ok(())
        }
        Ok(SubmitOutcome::Ignored(reason)) => bail!("Submit ignored: {:?}", reason),
        Err(e) => Err(fail(e, sessions).await),
    }
}

async fn ticket(
    renderer: &TicketRenderer,
    session: Option<&Session>,
    sessions: &dyn SessionProvider,
    dir: PathBuf,
) -> Result<()> {
    let ticket = match renderer.load(session).await {
        Ok(ticket) => ticket,
        Err(e) => return Err(fail(e, sessions).await),
    };
    println!("Welcome, {}", ticket.name);

    match renderer.deliver(&ticket, &dir, sessions).await {
        Ok(path) => {
            println!("Ticket saved to {}", path.display());
            Ok(())
        }
        Err(e) => Err(fail(e, sessions).await),
    }
}

/// Report a failed operation the way its disposition asks for.
async fn fail(err: FlowError, sessions: &dyn SessionProvider) -> anyhow::Error {
    if err.kind.invalidates_session() {
        if let Err(e) = sessions.sign_out().await {
            error!("Sign-out failed: {}", e);
        }
    }

    for field in &err.field_errors {
        eprintln!("  {:?}: {}", field.field, field.message);
    }

    match err.disposition() {
        Disposition::RedirectToEntry { show_message: false } => {
            anyhow::anyhow!("Not signed in")
        }
        Disposition::RedirectToEntry { show_message: true } => {
            anyhow::anyhow!("{}", err.message)
        }
        Disposition::Inline { retryable: true } => {
            anyhow::anyhow!("{} (fix and retry)", err.message)
        }
        Disposition::Inline { retryable: false } => anyhow::anyhow!("{}", err.message),
    }
}
