use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub metadata: Metadata,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub admin_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	/// Serve one lookup at a time and block invalidation until it finishes.
	#[serde(default = "default_serialize_requests")]
	pub serialize_requests: bool,
	pub idp_index: IdpIndex,
	pub sp_metadata: SpMetadata,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdpIndex {
	pub path: PathBuf,
	#[serde(default = "default_pool_max_conns")]
	pub pool_max_conns: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpMetadata {
	pub path: PathBuf,
	#[serde(default = "default_pool_max_conns")]
	pub pool_max_conns: u32,
	/// Suffix of the `entity_<suffix>` and `lookup_<suffix>` tables.
	#[serde(default = "default_table_suffix")]
	pub table_suffix: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Search {
	pub max_results: u32,
	pub max_chosen: u32,
	pub max_prioritized: u32,
	pub prioritized_keyword: String,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			max_results: 100,
			max_chosen: 10,
			max_prioritized: 10,
			prioritized_keyword: "prioritized".to_string(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Metadata {
	pub max_inflated_bytes: u64,
}
impl Default for Metadata {
	fn default() -> Self {
		Self { max_inflated_bytes: 4 * 1_024 * 1_024 }
	}
}

fn default_serialize_requests() -> bool {
	true
}

fn default_pool_max_conns() -> u32 {
	4
}

fn default_table_suffix() -> String {
	"HYBRID_EXTERNAL_SP".to_string()
}
