//! Relying-party (SP) lookup and projection of its stored metadata.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{DiscoService, Result};
use disco_metadata::MetadataXml;
use disco_storage::queries;

const LOGO: &str = "md:SPSSODescriptor/md:Extensions/mdui:UIInfo/mdui:Logo";
const DISPLAY_NAME: &str = "md:SPSSODescriptor/md:Extensions/mdui:UIInfo/mdui:DisplayName";
const REQUEST_INITIATORS: &str =
	"md:SPSSODescriptor/md:Extensions/init:RequestInitiator/@Location";
const DISCOVERY_RESPONSES: &str =
	"md:SPSSODescriptor/md:Extensions/idpdisc:DiscoveryResponse/@Location";
const ACS_POST: &str = "md:SPSSODescriptor/md:AssertionConsumerService[@Binding='urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST']/@Location";
const FEDS: &str = "md:Extensions/wayf:wayf/wayf:feds";

/// SP attributes echoed back to the discovery page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpInfo {
	#[serde(rename = "entityID")]
	pub entity_id: String,
	#[serde(rename = "DisplayNames")]
	pub display_names: BTreeMap<String, String>,
	#[serde(rename = "Logo")]
	pub logo: String,
	#[serde(rename = "RequestInitiators")]
	pub request_initiators: Vec<String>,
	#[serde(rename = "DiscoveryResponses")]
	pub discovery_responses: Vec<String>,
	#[serde(rename = "AssertionConsumerServices")]
	pub assertion_consumer_services: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelyingParty {
	pub info: SpInfo,
	/// Federations the SP declares; the default federation filter for its lookups.
	pub feds: Vec<String>,
}

impl DiscoService {
	/// Looks up the SP by entityID. `Ok(None)` means the SP is unknown, which is not an error.
	pub async fn resolve_relying_party(&self, entity_id: &str) -> Result<Option<RelyingParty>> {
		if entity_id.is_empty() {
			return Ok(None);
		}

		let db = self.stores.sp().await?;
		let key = disco_metadata::entity_key(entity_id);
		let Some(compressed) = queries::fetch_sp_metadata(&db, &key).await? else {
			tracing::debug!(entity_id, "Relying party not found.");

			return Ok(None);
		};
		let xml = disco_metadata::decode(&compressed, self.cfg.metadata.max_inflated_bytes)?;

		Ok(Some(project(entity_id, &xml)?))
	}
}

/// Projects the discovery-relevant parts of SP metadata.
pub fn project(entity_id: &str, xml: &MetadataXml) -> Result<RelyingParty> {
	let info = SpInfo {
		entity_id: entity_id.to_string(),
		display_names: display_names(xml)?,
		logo: xml.query1(LOGO)?,
		request_initiators: xml.query_multi(REQUEST_INITIATORS)?,
		discovery_responses: xml.query_multi(DISCOVERY_RESPONSES)?,
		assertion_consumer_services: xml.query_multi(ACS_POST)?,
	};
	let feds = xml
		.query_multi(FEDS)?
		.into_iter()
		.map(|fed| fed.trim().to_string())
		.filter(|fed| !fed.is_empty())
		.collect();

	Ok(RelyingParty { info, feds })
}

// One entry per language; a language declared twice keeps its last value.
fn display_names(xml: &MetadataXml) -> Result<BTreeMap<String, String>> {
	let mut names = BTreeMap::new();

	for lang in xml.query_multi(&format!("{DISPLAY_NAME}/@xml:lang"))? {
		// The language is spliced into a predicate.
		if lang.contains(['\'', '"', '[', ']']) {
			continue;
		}

		let values = xml.query_multi(&format!("{DISPLAY_NAME}[@xml:lang='{lang}']"))?;

		if let Some(value) = values.into_iter().last() {
			names.insert(lang, value);
		}
	}

	Ok(names)
}
