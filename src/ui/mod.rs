//! GUI module for the Gobang game
//!
//! A native front end using egui/eframe. It draws what
//! [`crate::session::Session`] exposes and forwards clicks and keys to it.

mod app;
mod board_view;
mod theme;

pub use app::GobangApp;
