// ATLES - Truth-seeking guard for a locally hosted LLM
// Library exports

pub mod cli;
pub mod config;
pub mod errors;
pub mod guard;
pub mod logging;
pub mod patterns;
pub mod providers;
