//! services/station/src/console/mod.rs
//!
//! The station's terminal front-end: the line protocol, the text renderers,
//! and the interactive session that drives the inventory store.

pub mod protocol;
pub mod render;
pub mod session;

pub use session::{ConsoleSession, Prompter, Services};
