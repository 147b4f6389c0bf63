//! Request handlers.

pub mod analysis;
pub mod health;

pub use analysis::{analyze, compose_script, AnalyzeRequest, ScriptRequest};
pub use health::{health, ready};
