use std::sync::Arc;

use crate::{config::Config, database::Database, services::GenerationService};

pub mod auth;
pub mod health;
pub mod images;

#[derive(Clone)]
pub struct AppState {
    pub database: Database,
    pub config: Config,
    pub generator: Arc<GenerationService>,
}
