//! Kanban Sync command-line client.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kanban_core::{Board, Dashboard};
use kanban_sync::kanban::{self, CardMoveInput, FavoriteInput, LoginInput, MoveCard, ToggleFavorite};
use kanban_sync::{KanbanApp, MutationError, MutationHandle, SyncConfig, metrics};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "kanban-sync", version, about = "Kanban board client")]
struct Cli {
    /// Configuration file (TOML, YAML or JSON).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print Prometheus metrics before exiting.
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Keep the credentials across runs.
        #[arg(long)]
        keep: bool,
    },
    /// List the dashboard boards.
    Boards,
    /// Show one board with its lists and cards.
    Board { id: u64 },
    /// Mark or unmark a board as favorite.
    Favorite {
        id: u64,
        #[arg(long)]
        off: bool,
    },
    /// Move a card between positions.
    Move {
        #[arg(long)]
        board: u64,
        #[arg(long)]
        card: u64,
        #[arg(long)]
        from_list: u64,
        #[arg(long)]
        from_index: usize,
        #[arg(long)]
        to_list: u64,
        #[arg(long)]
        to_index: usize,
    },
    /// Sign out and forget stored credentials.
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let recorder = if cli.metrics {
        Some(metrics::init_metrics().context("failed to install metrics recorder")?)
    } else {
        None
    };

    let config = SyncConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    let app = KanbanApp::from_config(&config).context("failed to start client")?;

    tracing::info!("Kanban Sync v{}", kanban_sync::version());

    let result = run(&app, cli.command).await;

    if let Some(handle) = recorder {
        println!("{}", handle.render());
    }
    result
}

async fn run(app: &KanbanApp, command: Command) -> Result<()> {
    match command {
        Command::Login {
            email,
            password,
            keep,
        } => {
            let input = LoginInput {
                email,
                password,
                keep_signed_in: keep,
            };
            app.login(input)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!("Signed in");
        },
        Command::Boards => {
            let dashboard: Dashboard = app
                .queries()
                .fetch_as(&kanban::resources::dashboard())
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            for board in dashboard.boards {
                let star = if board.is_favorite { "*" } else { " " };
                println!("{} {:>6}  {}", star, board.id, board.title);
            }
        },
        Command::Board { id } => {
            let board: Board = app
                .queries()
                .fetch_as(&kanban::resources::board(id))
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!("{}", board.title);
            for list in &board.lists {
                println!("  [{}] {}", list.id, list.title);
                for card in &list.cards {
                    println!("      {:>6}  {}", card.id, card.title);
                }
            }
        },
        Command::Favorite { id, off } => {
            let input = FavoriteInput {
                board_id: id,
                favorite: !off,
            };
            settle(app.mutate(ToggleFavorite, input)).await?;
            println!("Board {} updated", id);
        },
        Command::Move {
            board,
            card,
            from_list,
            from_index,
            to_list,
            to_index,
        } => {
            // The optimistic patch validates against the cached board.
            app.queries()
                .fetch(&kanban::resources::board(board))
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;

            let input = CardMoveInput {
                board_id: board,
                card_id: card,
                from_list,
                from_index,
                to_list,
                to_index,
            };
            settle(app.mutate(MoveCard, input)).await?;
            println!("Card {} moved", card);
        },
        Command::Logout => {
            app.logout().await;
            println!("Signed out");
        },
    }
    Ok(())
}

/// Waits on a spawned mutation, turning any failure into a user-facing error.
async fn settle<T>(spawned: Result<MutationHandle<T>, MutationError>) -> Result<T> {
    let outcome = match spawned {
        Ok(handle) => handle.outcome().await,
        Err(e) => Err(e),
    };
    outcome.map_err(|e| anyhow::anyhow!(e.user_message()))
}
