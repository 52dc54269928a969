//! Keith F'em BotMeister - the Keith F'em community radio bot
//!
//! This crate provides both the Discord bot binary and the reusable pieces
//! behind it: schedule parsing and rendering, command resolution, and the
//! clients for the schedule and joke services.

pub mod bot;
pub mod config;
pub mod modules;
pub mod services;

pub use config::Config;
pub use services::Services;
