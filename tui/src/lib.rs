//! Estimator TUI - Terminal interface for the City Paint Estimator
//!
//! This crate provides a full-screen terminal chat in which the estimator
//! asks its five questions and shows the paint estimate.
//!
//! # Architecture
//!
//! - **App**: Event loop and rendering
//! - **ConductorClient**: Embedded Conductor, events up and messages down
//! - **DisplayState**: Everything on screen, derived from ConductorMessages
//! - **Theme**: Colors

pub mod app;
pub mod conductor_client;
pub mod display;
pub mod theme;

pub use app::App;
pub use conductor_client::ConductorClient;
pub use display::DisplayState;
