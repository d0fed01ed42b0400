use std::sync::Arc;

use disco_service::DiscoService;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<DiscoService>,
}
impl AppState {
	/// Stores are opened lazily on the first lookup, so this never touches the filesystem.
	pub fn new(config: disco_config::Config) -> Self {
		Self { service: Arc::new(DiscoService::new(config)) }
	}
}
