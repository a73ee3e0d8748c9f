use crate::config::Config;
use crate::db::QuizStore;
use crate::extractor::Extractor;
use crate::generator::QuizGenerator;
use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    pub store: QuizStore,
    pub extractor: Extractor,
    pub generator: QuizGenerator,
    pub config: Config,
}

impl FromRef<AppState> for QuizStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
