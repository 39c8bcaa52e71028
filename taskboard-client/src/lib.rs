//! # Taskboard Client Library
//!
//! Client side of the task board: a typed API client, the board state with
//! optimistic updates, and the drag-and-drop reducer.
//!
//! ## Modules
//!
//! - `api`: Task service client (`TaskApi`, `HttpTaskApi`)
//! - `config`: Public client configuration loader
//! - `controller`: Board controller with optimistic updates and resync
//! - `drag`: Drag gesture state machine
//! - `mock`: Scripted in-process `TaskApi`
//! - `state`: Local task collection
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskboard_client::{api::HttpTaskApi, controller::TaskBoardController};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = HttpTaskApi::new("http://localhost:8080")?.with_token("eyJ...");
//! let board = TaskBoardController::new(Arc::new(api));
//! board.load().await;
//!
//! for column in board.columns().await {
//!     println!("{}: {} tasks", column.status.label(), column.tasks.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod controller;
pub mod drag;
pub mod mock;
pub mod state;
