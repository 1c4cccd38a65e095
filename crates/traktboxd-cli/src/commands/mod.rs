pub mod clear;
pub mod config;
pub mod export;
mod export_ui;
