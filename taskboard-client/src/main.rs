//! # Taskboard Client
//!
//! Command-line front end for the task board.
//!
//! ## Usage
//!
//! ```bash
//! TASKBOARD_TOKEN=eyJ... cargo run -p taskboard-client
//! cargo run -p taskboard-client -- add "Write spec" --status doing
//! cargo run -p taskboard-client -- move <task-id> done
//! ```

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use taskboard_client::{
    api::HttpTaskApi,
    config::ConfigLoader,
    controller::TaskBoardController,
    drag::{DragReducer, DropTarget},
};
use taskboard_shared::models::task::{TaskStatus, UpdateTask};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Task board command-line client
#[derive(Parser, Debug)]
#[command(version, about = "Task board command-line client")]
struct Cli {
    /// Base URL of the task API
    #[arg(long, env = "TASKBOARD_API_URL", default_value = "http://localhost:8080")]
    api_url: String,

    /// Session token sent as a bearer credential
    #[arg(long, env = "TASKBOARD_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the board grouped by column
    Board,

    /// List tasks, one per line
    List,

    /// Create a task at the top of a column
    Add {
        title: String,

        #[arg(long, default_value = "todo")]
        status: TaskStatus,
    },

    /// Rename a task
    Rename { id: Uuid, title: String },

    /// Move a task to another column
    Move { id: Uuid, status: TaskStatus },

    /// Delete a task
    Delete { id: Uuid },

    /// Show the public auth configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskboard_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut api = HttpTaskApi::new(&cli.api_url)?;
    if let Some(token) = cli.token {
        api = api.with_token(token);
    }
    let api = Arc::new(api);

    if let Some(Command::Config) = cli.command {
        let mut loader = ConfigLoader::new();
        let config = loader
            .initialize(api.as_ref())
            .await
            .context("Failed to load public config")?;
        println!("auth url:        {}", config.auth_url);
        println!("auth public key: {}", config.auth_public_key);
        return Ok(());
    }

    let board = TaskBoardController::new(api);
    board.load().await;
    if let Some(error) = board.snapshot().await.error {
        anyhow::bail!(error);
    }

    match cli.command.unwrap_or(Command::Board) {
        Command::Board => print_board(&board).await,
        Command::List => {
            for task in board.snapshot().await.tasks {
                println!("{}\t{}\t{}\t{}", task.id, task.status, task.position, task.title);
            }
        }
        Command::Add { title, status } => {
            let task = board.create(&title, status).await?;
            println!("Created {}", task.id);
        }
        Command::Rename { id, title } => {
            let changes = UpdateTask {
                title: Some(title),
                ..Default::default()
            };
            board.update(id, changes).await?;
            print_board(&board).await;
        }
        Command::Move { id, status } => {
            let mut drag = DragReducer::new();
            let action = board
                .with_tasks(|tasks| {
                    drag.start(id, tasks);
                    drag.end(Some(DropTarget::column_id(status).as_str()), tasks)
                })
                .await;

            match action {
                Some(action) => {
                    board.update(action.task_id, action.changes).await?;
                    print_board(&board).await;
                }
                None => println!("Nothing to move"),
            }
        }
        Command::Delete { id } => {
            board.delete(id).await?;
            println!("Deleted {}", id);
        }
        Command::Config => {}
    }

    board.unmount();
    Ok(())
}

async fn print_board(board: &TaskBoardController) {
    for column in board.columns().await {
        println!("{} ({})", column.status.label(), column.tasks.len());
        for task in column.tasks {
            println!("  [{}] {}  {}", task.position, task.title, task.id);
        }
    }
}
