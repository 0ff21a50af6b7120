// Application layer: configuration, the UI protocol, the statistics provider,
// and the session orchestrator that turns user commands into matchup views.

pub mod app;
pub mod config;
pub mod matchup;
pub mod protocol;
pub mod provider;
