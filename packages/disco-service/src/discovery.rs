//! Discovery lookup: relying-party context, chosen and prioritized IdPs, and the primary search.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{DiscoService, Result, SpInfo};
use disco_domain::{
	query::{self, Field, FtsQuery, Group},
	sanitize,
};
use disco_storage::{db::IdpDb, models::IdpDocument, queries};

/// Raw request parameters. List-valued parameters are comma-separated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DiscoveryRequest {
	#[serde(rename = "entityID", default)]
	pub entity_id: String,
	#[serde(default)]
	pub query: String,
	#[serde(default)]
	pub feds: String,
	#[serde(default)]
	pub chosen: String,
	#[serde(rename = "providerids", default)]
	pub provider_ids: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryResponse {
	/// True when no SP was named, or the named SP is known.
	pub spok: bool,
	pub chosen: Vec<ChosenIdp>,
	/// Total matches of the primary search, independent of the row limit.
	pub found: u64,
	pub rows: usize,
	/// Federation filter in effect.
	pub feds: Vec<String>,
	pub idps: Vec<IdpInfo>,
	pub logo: String,
	pub sp: SpInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdpInfo {
	#[serde(rename = "entityID")]
	pub entity_id: String,
	#[serde(rename = "DisplayNames")]
	pub display_names: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChosenIdp {
	#[serde(rename = "entityID")]
	pub entity_id: String,
	#[serde(rename = "DisplayNames")]
	pub display_names: BTreeMap<String, String>,
	/// Usable for this SP under the current federation and provider filters.
	pub relevant: bool,
}
impl ChosenIdp {
	fn new(idp: IdpInfo, relevant: bool) -> Self {
		Self { entity_id: idp.entity_id, display_names: idp.display_names, relevant }
	}
}

impl DiscoService {
	pub async fn discover(&self, req: DiscoveryRequest) -> Result<DiscoveryResponse> {
		let _serial = self.serialize().await;
		let entity_id = req.entity_id.trim();
		let relying_party = self.resolve_relying_party(entity_id).await?;
		let spok = entity_id.is_empty() || relying_party.is_some();
		let mut feds = sanitize::split_list(&req.feds);

		if feds.is_empty()
			&& let Some(rp) = relying_party.as_ref()
		{
			feds = rp.feds.clone();
		}

		let mut response = DiscoveryResponse { spok, feds, ..Default::default() };

		if let Some(rp) = relying_party.as_ref() {
			response.logo = rp.info.logo.clone();
			response.sp = rp.info.clone();
		}
		if !spok {
			tracing::debug!(entity_id, "Unknown relying party; skipping IdP search.");

			return Ok(response);
		}

		let db = self.stores.idp().await?;
		let fed_group = query::build_group(&response.feds, Field::Feds);
		let provider_group =
			query::build_group(&sanitize::split_list(&req.provider_ids), Field::EntityId);

		if relying_party.is_some() {
			response.chosen = self
				.resolve_chosen(&db, &sanitize::split_list(&req.chosen), &fed_group, &provider_group)
				.await?;
		}

		self.merge_prioritized(&db, &fed_group, &mut response.chosen).await?;

		let primary = FtsQuery::new()
			.with_free_text(sanitize::normalize_free_text(&req.query))
			.and(fed_group)
			.and(provider_group);
		let expr = primary.render();
		let found = queries::count_matches(&db, &expr).await?;

		response.found = u64::try_from(found).unwrap_or_default();
		response.idps =
			decode_rows(queries::fetch_matches(&db, &expr, self.cfg.search.max_results).await?)?;
		response.rows = response.idps.len();

		tracing::debug!(
			entity_id,
			spok,
			found = response.found,
			rows = response.rows,
			chosen = response.chosen.len(),
			"Discovery lookup completed."
		);

		Ok(response)
	}

	// Every chosen IdP that exists, flagged by whether it also passes the federation and
	// provider filters. Ordered as the caller listed them.
	async fn resolve_chosen(
		&self,
		db: &IdpDb,
		chosen_ids: &[String],
		fed_group: &Group,
		provider_group: &Group,
	) -> Result<Vec<ChosenIdp>> {
		// The caller lists its most recent choices first.
		let limit = self.cfg.search.max_chosen;
		let chosen_ids = &chosen_ids[..chosen_ids.len().min(limit as usize)];
		let chosen_group = query::build_group(chosen_ids, Field::EntityId);

		if chosen_group.is_empty() {
			return Ok(Vec::new());
		}

		let all = FtsQuery::new().and(chosen_group);
		let relevant = all.clone().and(fed_group.clone()).and(provider_group.clone());
		let records = decode_rows(queries::fetch_matches(db, &all.render(), limit).await?)?;
		let relevant_ids = decode_rows(queries::fetch_matches(db, &relevant.render(), limit).await?)?
			.into_iter()
			.map(|idp| idp.entity_id)
			.collect::<HashSet<_>>();
		let mut chosen = Vec::<ChosenIdp>::with_capacity(records.len());

		for idp in records {
			if chosen.iter().any(|existing| existing.entity_id == idp.entity_id) {
				continue;
			}

			let is_relevant = relevant_ids.contains(&idp.entity_id);

			chosen.push(ChosenIdp::new(idp, is_relevant));
		}

		chosen.sort_by_key(|idp| {
			chosen_ids.iter().position(|id| *id == idp.entity_id).unwrap_or(usize::MAX)
		});

		Ok(chosen)
	}

	// Prioritized IdPs in the current federations are always offered and always relevant.
	async fn merge_prioritized(
		&self,
		db: &IdpDb,
		fed_group: &Group,
		chosen: &mut Vec<ChosenIdp>,
	) -> Result<()> {
		let keyword = [self.cfg.search.prioritized_keyword.as_str()];
		let prioritized = FtsQuery::new()
			.and(query::build_group(&keyword, Field::Keywords))
			.and(fed_group.clone());
		let rows =
			queries::fetch_matches(db, &prioritized.render(), self.cfg.search.max_prioritized)
				.await?;

		for idp in decode_rows(rows)? {
			match chosen.iter_mut().find(|existing| existing.entity_id == idp.entity_id) {
				Some(existing) => existing.relevant = true,
				None => chosen.push(ChosenIdp::new(idp, true)),
			}
		}

		Ok(())
	}
}

/// Decodes stored IdP records. Any malformed row fails the whole batch.
pub fn decode_rows(rows: Vec<Vec<u8>>) -> Result<Vec<IdpInfo>> {
	rows.iter().map(|row| decode_row(row)).collect()
}

fn decode_row(row: &[u8]) -> Result<IdpInfo> {
	let doc: IdpDocument = serde_json::from_slice(row)?;
	let mut display_names = BTreeMap::new();

	for name in doc.display_names {
		display_names.insert(name.lang, name.value);
	}

	Ok(IdpInfo { entity_id: doc.entity_id, display_names })
}
