//! Bot features: schedule rendering and command resolution

pub mod commands;
pub mod schedule;
