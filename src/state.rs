use crate::config::Config;
use crate::storage::DynStorage;

#[derive(Clone)]
pub struct AppState {
    pub storage: DynStorage,
    pub config: Config,
}
