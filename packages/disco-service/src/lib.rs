pub mod discovery;
pub mod relying_party;

mod error;

pub use discovery::{ChosenIdp, DiscoveryRequest, DiscoveryResponse, IdpInfo};
pub use error::{Error, Result};
pub use relying_party::{RelyingParty, SpInfo};

use tokio::sync::{Mutex, MutexGuard};

use disco_config::Config;
use disco_storage::cache::StoreCache;

pub struct DiscoService {
	pub cfg: Config,
	pub stores: StoreCache,
	request_lock: Option<Mutex<()>>,
}
impl DiscoService {
	pub fn new(cfg: Config) -> Self {
		let stores = StoreCache::new(&cfg.storage);
		let request_lock = cfg.storage.serialize_requests.then(|| Mutex::new(()));

		Self { cfg, stores, request_lock }
	}

	/// Metadata-updated signal: drops the cached store handles so the next lookup reopens them.
	pub async fn metadata_updated(&self) {
		let _serial = self.serialize().await;

		self.stores.invalidate().await;
	}

	async fn serialize(&self) -> Option<MutexGuard<'_, ()>> {
		match &self.request_lock {
			Some(lock) => Some(lock.lock().await),
			None => None,
		}
	}
}
