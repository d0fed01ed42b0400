mod error;

pub use error::{Error, Result};

use std::{
	env, fs,
	io::Write,
	path::{Path, PathBuf},
};

use flate2::{Compression, write::DeflateEncoder};
use sqlx::{
	ConnectOptions, Connection,
	sqlite::{SqliteConnectOptions, SqliteConnection},
};
use uuid::Uuid;

use disco_domain::sanitize;
use disco_storage::{
	models::{DisplayName, IdpDocument},
	schema,
};

pub const PRIORITIZED_KEYWORD: &str = "prioritized";
pub const SP_TABLE_SUFFIX: &str = "HYBRID_EXTERNAL_SP";

const IDP_INDEX_FILE: &str = "disco.db";
const SP_METADATA_FILE: &str = "sp.db";

/// One row of the IdP index, indexed the way the publishing pipeline indexes it.
#[derive(Debug, Clone)]
pub struct IdpFixture {
	pub entity_id: String,
	pub display_names: Vec<(String, String)>,
	pub feds: Vec<String>,
	pub keywords: Vec<String>,
	pub prioritized: bool,
	pub raw_json: Option<String>,
}
impl IdpFixture {
	pub fn new(entity_id: &str) -> Self {
		Self {
			entity_id: entity_id.to_string(),
			display_names: Vec::new(),
			feds: Vec::new(),
			keywords: Vec::new(),
			prioritized: false,
			raw_json: None,
		}
	}

	pub fn display_name(mut self, lang: &str, value: &str) -> Self {
		self.display_names.push((lang.to_string(), value.to_string()));

		self
	}

	pub fn fed(mut self, fed: &str) -> Self {
		self.feds.push(fed.to_string());

		self
	}

	pub fn keyword(mut self, keyword: &str) -> Self {
		self.keywords.push(keyword.to_string());

		self
	}

	pub fn prioritized(mut self) -> Self {
		self.prioritized = true;

		self
	}

	/// Stores `raw` in the `json` column verbatim instead of the serialized record.
	pub fn raw_json(mut self, raw: &str) -> Self {
		self.raw_json = Some(raw.to_string());

		self
	}

	pub fn document(&self) -> IdpDocument {
		IdpDocument {
			entity_id: self.entity_id.clone(),
			display_names: self
				.display_names
				.iter()
				.map(|(lang, value)| DisplayName { lang: lang.clone(), value: value.clone() })
				.collect(),
		}
	}

	fn json_column(&self) -> Result<String> {
		match &self.raw_json {
			Some(raw) => Ok(raw.clone()),
			None => Ok(serde_json::to_string(&self.document())?),
		}
	}

	fn feds_column(&self) -> String {
		self.feds.iter().map(|fed| sanitize::normalize_identifier(fed)).collect::<Vec<_>>().join(" ")
	}

	fn keywords_column(&self) -> String {
		let mut terms = Vec::new();

		for text in self.display_names.iter().map(|(_, value)| value).chain(self.keywords.iter()) {
			terms.extend(sanitize::normalize_free_text(text).terms().iter().cloned());
		}

		if self.prioritized {
			terms.push(PRIORITIZED_KEYWORD.to_string());
		}

		terms.join(" ")
	}
}

/// One SP metadata record, rendered as an `md:EntityDescriptor` document.
#[derive(Debug, Clone)]
pub struct SpFixture {
	pub entity_id: String,
	pub display_names: Vec<(String, String)>,
	pub logo: Option<String>,
	pub feds: Vec<String>,
	pub request_initiators: Vec<String>,
	pub discovery_responses: Vec<String>,
	pub acs_post: Vec<String>,
	pub raw_blob: Option<Vec<u8>>,
}
impl SpFixture {
	pub fn new(entity_id: &str) -> Self {
		Self {
			entity_id: entity_id.to_string(),
			display_names: Vec::new(),
			logo: None,
			feds: Vec::new(),
			request_initiators: Vec::new(),
			discovery_responses: Vec::new(),
			acs_post: Vec::new(),
			raw_blob: None,
		}
	}

	pub fn display_name(mut self, lang: &str, value: &str) -> Self {
		self.display_names.push((lang.to_string(), value.to_string()));

		self
	}

	pub fn logo(mut self, logo: &str) -> Self {
		self.logo = Some(logo.to_string());

		self
	}

	pub fn fed(mut self, fed: &str) -> Self {
		self.feds.push(fed.to_string());

		self
	}

	pub fn request_initiator(mut self, location: &str) -> Self {
		self.request_initiators.push(location.to_string());

		self
	}

	pub fn discovery_response(mut self, location: &str) -> Self {
		self.discovery_responses.push(location.to_string());

		self
	}

	pub fn acs_post(mut self, location: &str) -> Self {
		self.acs_post.push(location.to_string());

		self
	}

	/// Stores `blob` in the `md` column verbatim instead of the compressed document.
	pub fn raw_blob(mut self, blob: &[u8]) -> Self {
		self.raw_blob = Some(blob.to_vec());

		self
	}

	pub fn to_metadata_xml(&self) -> String {
		let mut xml = String::new();

		xml.push_str(&format!(
			r#"<md:EntityDescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" xmlns:mdui="urn:oasis:names:tc:SAML:metadata:ui" xmlns:wayf="http://wayf.dk/2014/08/wayf" xmlns:init="urn:oasis:names:tc:SAML:profiles:SSO:request-init" xmlns:idpdisc="urn:oasis:names:tc:SAML:profiles:SSO:idp-discovery-protocol" entityID="{}">"#,
			escape(&self.entity_id)
		));
		xml.push_str("<md:Extensions><wayf:wayf>");

		for fed in &self.feds {
			xml.push_str(&format!("<wayf:feds>{}</wayf:feds>", escape(fed)));
		}

		xml.push_str("</wayf:wayf></md:Extensions>");
		xml.push_str(
			r#"<md:SPSSODescriptor protocolSupportEnumeration="urn:oasis:names:tc:SAML:2.0:protocol"><md:Extensions>"#,
		);

		for location in &self.request_initiators {
			xml.push_str(&format!(
				r#"<init:RequestInitiator Binding="urn:oasis:names:tc:SAML:profiles:SSO:request-init" Location="{}"/>"#,
				escape(location)
			));
		}
		for (index, location) in self.discovery_responses.iter().enumerate() {
			xml.push_str(&format!(
				r#"<idpdisc:DiscoveryResponse Binding="urn:oasis:names:tc:SAML:profiles:SSO:idp-discovery-protocol" Location="{}" index="{index}"/>"#,
				escape(location)
			));
		}

		xml.push_str("<mdui:UIInfo>");

		for (lang, value) in &self.display_names {
			xml.push_str(&format!(
				r#"<mdui:DisplayName xml:lang="{}">{}</mdui:DisplayName>"#,
				escape(lang),
				escape(value)
			));
		}
		if let Some(logo) = &self.logo {
			xml.push_str(&format!(
				r#"<mdui:Logo height="60" width="60">{}</mdui:Logo>"#,
				escape(logo)
			));
		}

		xml.push_str("</mdui:UIInfo></md:Extensions>");

		for (index, location) in self.acs_post.iter().enumerate() {
			xml.push_str(&format!(
				r#"<md:AssertionConsumerService Binding="urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST" Location="{}" index="{index}"/>"#,
				escape(location)
			));
		}

		xml.push_str("</md:SPSSODescriptor></md:EntityDescriptor>");

		xml
	}

	fn md_column(&self) -> Result<Vec<u8>> {
		match &self.raw_blob {
			Some(blob) => Ok(blob.clone()),
			None => deflate(self.to_metadata_xml().as_bytes()),
		}
	}
}

/// IdP index and SP metadata store in a private temporary directory, removed on drop.
pub struct TestStores {
	dir: PathBuf,
	cleaned: bool,
}
impl TestStores {
	pub async fn new(idps: &[IdpFixture], sps: &[SpFixture]) -> Result<Self> {
		let stores = Self::empty()?;

		stores.write_idps(idps).await?;
		stores.write_sps(sps).await?;

		Ok(stores)
	}

	/// A directory without any store files, for exercising open failures.
	pub fn empty() -> Result<Self> {
		let dir = env::temp_dir().join(format!("disco_test_{}", Uuid::new_v4().simple()));

		fs::create_dir_all(&dir)?;

		Ok(Self { dir, cleaned: false })
	}

	pub fn idp_path(&self) -> PathBuf {
		self.dir.join(IDP_INDEX_FILE)
	}

	pub fn sp_path(&self) -> PathBuf {
		self.dir.join(SP_METADATA_FILE)
	}

	pub fn storage_config(&self) -> disco_config::Storage {
		disco_config::Storage {
			serialize_requests: true,
			idp_index: disco_config::IdpIndex { path: self.idp_path(), pool_max_conns: 2 },
			sp_metadata: disco_config::SpMetadata {
				path: self.sp_path(),
				pool_max_conns: 2,
				table_suffix: SP_TABLE_SUFFIX.to_string(),
			},
		}
	}

	pub fn config(&self) -> disco_config::Config {
		disco_config::Config {
			service: disco_config::Service {
				http_bind: "127.0.0.1:0".to_string(),
				admin_bind: "127.0.0.1:0".to_string(),
				log_level: "info".to_string(),
			},
			storage: self.storage_config(),
			search: disco_config::Search::default(),
			metadata: disco_config::Metadata::default(),
		}
	}

	/// Publishes a fresh IdP index, replacing any previous one atomically.
	pub async fn write_idps(&self, idps: &[IdpFixture]) -> Result<()> {
		let staging = self.staging_path();
		let mut conn = create_database(&staging).await?;

		for statement in schema::statements(&schema::render_idp_index_schema()) {
			sqlx::query(&statement).execute(&mut conn).await?;
		}
		for idp in idps {
			sqlx::query("INSERT INTO disco (entityid, feds, keywords, json) VALUES (?1, ?2, ?3, ?4)")
				.bind(sanitize::normalize_identifier(&idp.entity_id))
				.bind(idp.feds_column())
				.bind(idp.keywords_column())
				.bind(idp.json_column()?)
				.execute(&mut conn)
				.await?;
		}

		conn.close().await?;
		fs::rename(&staging, self.idp_path())?;

		Ok(())
	}

	/// Publishes a fresh SP metadata store, replacing any previous one atomically.
	pub async fn write_sps(&self, sps: &[SpFixture]) -> Result<()> {
		let staging = self.staging_path();
		let mut conn = create_database(&staging).await?;

		for statement in schema::statements(&schema::render_sp_metadata_schema(SP_TABLE_SUFFIX)) {
			sqlx::query(&statement).execute(&mut conn).await?;
		}
		for (idx, sp) in sps.iter().enumerate() {
			let id = idx as i64 + 1;

			sqlx::query(&format!("INSERT INTO entity_{SP_TABLE_SUFFIX} (id, md) VALUES (?1, ?2)"))
				.bind(id)
				.bind(sp.md_column()?)
				.execute(&mut conn)
				.await?;
			sqlx::query(&format!(
				"INSERT INTO lookup_{SP_TABLE_SUFFIX} (hash, entity_id_fk) VALUES (?1, ?2)"
			))
			.bind(disco_metadata::entity_key(&sp.entity_id))
			.bind(id)
			.execute(&mut conn)
			.await?;
		}

		conn.close().await?;
		fs::rename(&staging, self.sp_path())?;

		Ok(())
	}

	/// Removes the IdP index file, as if publishing had not happened yet.
	pub fn remove_idps(&self) -> Result<()> {
		fs::remove_file(self.idp_path())?;

		Ok(())
	}

	pub fn cleanup(mut self) -> Result<()> {
		self.cleanup_inner()
	}

	fn cleanup_inner(&mut self) -> Result<()> {
		if self.cleaned {
			return Ok(());
		}

		fs::remove_dir_all(&self.dir)?;

		self.cleaned = true;

		Ok(())
	}

	fn staging_path(&self) -> PathBuf {
		self.dir.join(format!("staging_{}.db", Uuid::new_v4().simple()))
	}
}
impl Drop for TestStores {
	fn drop(&mut self) {
		if let Err(err) = self.cleanup_inner() {
			eprintln!("Test store cleanup failed: {err}.");
		}
	}
}

pub fn deflate(raw: &[u8]) -> Result<Vec<u8>> {
	let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());

	encoder.write_all(raw)?;

	Ok(encoder.finish()?)
}

async fn create_database(path: &Path) -> Result<SqliteConnection> {
	let options = SqliteConnectOptions::new().filename(path).create_if_missing(true);
	let conn = options.connect().await.map_err(|err| {
		Error::Message(format!("Failed to create fixture database at {path:?}: {err}."))
	})?;

	Ok(conn)
}

fn escape(raw: &str) -> String {
	raw.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
		.replace('"', "&quot;")
		.replace('\'', "&apos;")
}
