/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `config`: Public client configuration
/// - `tasks`: Task CRUD and batch reposition

pub mod config;
pub mod health;
pub mod tasks;
