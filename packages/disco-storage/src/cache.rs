//! Lazily opened store handles, dropped as a unit when metadata is republished.
//!
//! The mutex guards only the handle slots. Callers get a clone of the pool and run their queries
//! without holding it, so an invalidation never waits on a slow query. A pool that was handed out
//! before [`StoreCache::invalidate`] stays usable until its last clone is dropped; the cache
//! never calls `close` on a pool that someone may still hold.

use tokio::sync::Mutex;

use crate::{
	Result,
	db::{IdpDb, SpDb},
};

pub struct StoreCache {
	idp_cfg: disco_config::IdpIndex,
	sp_cfg: disco_config::SpMetadata,
	slots: Mutex<Slots>,
}

#[derive(Default)]
struct Slots {
	idp: Option<IdpDb>,
	sp: Option<SpDb>,
}

impl StoreCache {
	pub fn new(cfg: &disco_config::Storage) -> Self {
		Self {
			idp_cfg: cfg.idp_index.clone(),
			sp_cfg: cfg.sp_metadata.clone(),
			slots: Mutex::new(Slots::default()),
		}
	}

	/// Returns the cached IdP index handle, opening it first if needed. A failed open leaves the
	/// slot empty so the next call retries.
	pub async fn idp(&self) -> Result<IdpDb> {
		let mut slots = self.slots.lock().await;

		if let Some(db) = slots.idp.as_ref() {
			return Ok(db.clone());
		}

		let db = IdpDb::connect(&self.idp_cfg).await?;

		tracing::info!(path = ?self.idp_cfg.path, "Opened IdP index.");

		slots.idp = Some(db.clone());

		Ok(db)
	}

	/// Returns the cached SP metadata handle, opening it first if needed.
	pub async fn sp(&self) -> Result<SpDb> {
		let mut slots = self.slots.lock().await;

		if let Some(db) = slots.sp.as_ref() {
			return Ok(db.clone());
		}

		let db = SpDb::connect(&self.sp_cfg).await?;

		tracing::info!(path = ?self.sp_cfg.path, "Opened SP metadata store.");

		slots.sp = Some(db.clone());

		Ok(db)
	}

	/// Forgets both handles. Idempotent.
	pub async fn invalidate(&self) {
		let (idp, sp) = {
			let mut slots = self.slots.lock().await;

			(slots.idp.take(), slots.sp.take())
		};

		tracing::info!(
			idp_was_open = idp.is_some(),
			sp_was_open = sp.is_some(),
			"Store handles invalidated."
		);
	}

	pub async fn is_idp_open(&self) -> bool {
		self.slots.lock().await.idp.is_some()
	}

	pub async fn is_sp_open(&self) -> bool {
		self.slots.lock().await.sp.is_some()
	}
}
