// Guard module
// Public interface for truth-seeking decisions in front of the backend

mod client;
mod decision;

pub use client::{ConstitutionalClient, Reply};
pub use decision::{Correction, GuardDecision, TruthGuard};
