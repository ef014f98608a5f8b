#![doc = "Common types shared across the trace timestamp workspace."]

pub mod config;
pub mod error;
pub mod kind;
pub mod port;
pub mod state;
pub mod stats;
pub mod time;

pub use config::*;
pub use error::*;
pub use kind::*;
pub use port::*;
pub use state::*;
pub use stats::*;
pub use time::*;
