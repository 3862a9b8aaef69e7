//! sovereignd library - HTTP surface for the recovery demo.

pub mod render;
pub mod routes;
pub mod server;

pub use server::{app, AppState};
