use std::path::Path;

use sqlx::{
	SqlitePool,
	sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::{Error, Result};

/// Read handle on the IdP full-text index.
#[derive(Clone, Debug)]
pub struct IdpDb {
	pub pool: SqlitePool,
}
impl IdpDb {
	pub async fn connect(cfg: &disco_config::IdpIndex) -> Result<Self> {
		let pool = open_read_only(&cfg.path, cfg.pool_max_conns).await?;

		Ok(Self { pool })
	}
}

/// Read handle on the SP metadata store.
#[derive(Clone, Debug)]
pub struct SpDb {
	pub pool: SqlitePool,
	pub entity_table: String,
	pub lookup_table: String,
}
impl SpDb {
	pub async fn connect(cfg: &disco_config::SpMetadata) -> Result<Self> {
		let pool = open_read_only(&cfg.path, cfg.pool_max_conns).await?;

		Ok(Self {
			pool,
			entity_table: format!("entity_{}", cfg.table_suffix),
			lookup_table: format!("lookup_{}", cfg.table_suffix),
		})
	}
}

async fn open_read_only(path: &Path, max_connections: u32) -> Result<SqlitePool> {
	let options = SqliteConnectOptions::new().filename(path).read_only(true);

	SqlitePoolOptions::new()
		.max_connections(max_connections)
		.connect_with(options)
		.await
		.map_err(|source| Error::Open { path: path.to_path_buf(), source })
}
