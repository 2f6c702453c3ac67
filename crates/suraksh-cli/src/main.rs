use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use suraksh_application::GraphScope;
use suraksh_core::SurakshError;
use suraksh_core::backend::{
    DEFAULT_ACCOUNT_CLEARANCE, DEFAULT_EXPORT_LIMIT, DEFAULT_GRAPH_DEPTH, DEFAULT_GRAPH_LIMIT,
    DEFAULT_TEXT_CLEARANCE, DEFAULT_TOP_K, GraphExport, TextIngest,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;

use commands::ContextOptions;

#[derive(Parser)]
#[command(name = "suraksh")]
#[command(about = "Suraksh - secure intelligence vault and knowledge graph client", long_about = None)]
struct Cli {
    /// Backend API root, e.g. http://localhost:8000/api/v1
    #[arg(long, global = true, env = "SURAKSH_API_URL")]
    api_url: Option<String>,

    /// Directory holding the session and notification store
    #[arg(long, global = true, env = "SURAKSH_STORE_DIR")]
    store_dir: Option<PathBuf>,

    /// Client config file (defaults to the platform config directory)
    #[arg(long, global = true, env = "SURAKSH_CONFIG")]
    config: Option<PathBuf>,

    /// Increase log verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        username: String,
        #[arg(long, env = "SURAKSH_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an account (does not sign in)
    Register {
        username: String,
        #[arg(long)]
        email: String,
        /// Clearance level: L1, L2 or L3
        #[arg(long, default_value = DEFAULT_ACCOUNT_CLEARANCE)]
        clearance: String,
        #[arg(long, env = "SURAKSH_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Sign out and clear the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Check that the backend is reachable
    Health,
    /// Manage vault files
    Vault {
        #[command(subcommand)]
        action: VaultAction,
    },
    /// Show the knowledge graph
    Graph {
        /// Show the neighbourhood of this entity instead of the whole graph
        entity: Option<String>,
        #[arg(long, default_value_t = DEFAULT_GRAPH_DEPTH)]
        depth: u32,
        #[arg(long, default_value_t = DEFAULT_GRAPH_LIMIT)]
        limit: u32,
        #[arg(long)]
        json: bool,
    },
    /// Ingest a text snippet into the graph
    IngestText {
        /// Text to ingest; use --from-file to read it instead
        text: Option<String>,
        /// Read the text from a file, or `-` for stdin
        #[arg(long, value_name = "PATH")]
        from_file: Option<PathBuf>,
        /// Display name for the snippet
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        source_id: Option<String>,
        #[arg(long, default_value = DEFAULT_TEXT_CLEARANCE)]
        clearance: String,
        /// Index the text without extracting entities
        #[arg(long)]
        no_graph: bool,
    },
    /// Export graph nodes and edges as JSON
    Export {
        /// Only export entities from this document
        #[arg(long)]
        document: Option<String>,
        #[arg(long, default_value_t = DEFAULT_EXPORT_LIMIT)]
        limit: u32,
        /// Include nodes without any edge
        #[arg(long)]
        include_isolated: bool,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Ask a question answered from the knowledge graph
    Search {
        query: String,
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: u32,
        #[arg(long)]
        json: bool,
    },
    /// Ask a question answered from document passages with citations
    Deepsearch {
        query: String,
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: u32,
        #[arg(long)]
        json: bool,
    },
    /// Manage notifications
    Notifications {
        #[command(subcommand)]
        action: Option<NotificationAction>,
    },
    /// Follow the graph and notifications until interrupted
    Watch {
        entity: Option<String>,
        #[arg(long, default_value_t = DEFAULT_GRAPH_DEPTH)]
        depth: u32,
        #[arg(long, default_value_t = DEFAULT_GRAPH_LIMIT)]
        limit: u32,
    },
}

#[derive(Subcommand)]
enum VaultAction {
    /// List stored files
    Files {
        #[arg(long)]
        json: bool,
    },
    /// Upload a file and ingest it into the graph
    Upload {
        path: PathBuf,
        /// Store the file without extracting entities
        #[arg(long)]
        no_ingest: bool,
    },
    /// Ingest a previously uploaded file
    Ingest {
        file_id: String,
        /// Display name used in the notification
        #[arg(long)]
        name: Option<String>,
    },
    /// Delete a file
    Delete { file_id: String },
    /// Download a file
    Download {
        file_id: String,
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Subcommand)]
enum NotificationAction {
    /// List notifications, most recent first
    List {
        #[arg(long)]
        unread: bool,
        #[arg(long)]
        json: bool,
    },
    /// Mark one notification as read
    Read { id: String },
    /// Mark every notification as read
    ReadAll,
    /// Remove one notification
    Remove { id: String },
    /// Remove all notifications
    Clear,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = ContextOptions {
        api_url: cli.api_url,
        store_dir: cli.store_dir,
        config_file: cli.config,
    };

    match run(&options, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

async fn run(options: &ContextOptions, command: Commands) -> Result<()> {
    use commands::{auth, graph, notifications, search, vault, watch};

    match command {
        Commands::Login { username, password } => auth::login(options, &username, password).await,
        Commands::Register {
            username,
            email,
            clearance,
            password,
        } => auth::register(options, &username, &email, &clearance, password).await,
        Commands::Logout => auth::logout(options),
        Commands::Whoami => auth::whoami(options).await,
        Commands::Health => auth::health(options).await,
        Commands::Vault { action } => match action {
            VaultAction::Files { json } => vault::files(options, json).await,
            VaultAction::Upload { path, no_ingest } => {
                vault::upload(options, &path, !no_ingest).await
            }
            VaultAction::Ingest { file_id, name } => {
                vault::ingest(options, &file_id, name.as_deref()).await
            }
            VaultAction::Delete { file_id } => vault::delete(options, &file_id).await,
            VaultAction::Download { file_id, output } => {
                vault::download(options, &file_id, &output).await
            }
        },
        Commands::Graph {
            entity,
            depth,
            limit,
            json,
        } => graph::show(options, entity.as_deref(), depth, limit, json).await,
        Commands::IngestText {
            text,
            from_file,
            name,
            source_id,
            clearance,
            no_graph,
        } => {
            let mut request = TextIngest::new(String::new()).with_clearance(clearance);
            if let Some(name) = name {
                request = request.with_source_name(name);
            }
            if let Some(id) = source_id {
                request = request.with_source_id(id);
            }
            if no_graph {
                request = request.without_graph();
            }
            vault::ingest_text(options, text, from_file.as_deref(), request).await
        }
        Commands::Export {
            document,
            limit,
            include_isolated,
            output,
        } => {
            let export = GraphExport {
                document_id: document,
                limit,
                include_isolated,
            };
            graph::export(options, &export, output.as_deref()).await
        }
        Commands::Search { query, top_k, json } => {
            search::search(options, &query, top_k, json).await
        }
        Commands::Deepsearch { query, top_k, json } => {
            search::deep_search(options, &query, top_k, json).await
        }
        Commands::Notifications { action } => {
            match action.unwrap_or(NotificationAction::List {
                unread: false,
                json: false,
            }) {
                NotificationAction::List { unread, json } => {
                    notifications::list(options, unread, json).await
                }
                NotificationAction::Read { id } => notifications::mark_read(options, &id).await,
                NotificationAction::ReadAll => notifications::mark_all_read(options).await,
                NotificationAction::Remove { id } => notifications::remove(options, &id).await,
                NotificationAction::Clear => notifications::clear(options).await,
            }
        }
        Commands::Watch {
            entity,
            depth,
            limit,
        } => {
            let scope = match entity {
                Some(name) => GraphScope::Entity { name, depth },
                None => GraphScope::All { limit },
            };
            watch::run(options, scope).await
        }
    }
}

/// Prints a failure the way the views show it inline. Authorization failures
/// already redirected to the login hint and print nothing more.
fn report(err: &anyhow::Error) {
    match err.downcast_ref::<SurakshError>() {
        Some(domain) => {
            if let Some(message) = domain.user_message() {
                eprintln!("❌ {}", message);
            }
        }
        None => eprintln!("❌ {:#}", err),
    }
}
