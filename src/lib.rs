// ABOUTME: Library root for the SSH launcher host pipeline
// ABOUTME: Exposes config loading, host resolution and session launching to the binary

pub mod app;
pub mod config;
pub mod resolver;
pub mod ssh;
