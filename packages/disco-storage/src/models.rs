use serde::{Deserialize, Serialize};

/// IdP record as serialized into the `json` column of the index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct IdpDocument {
	#[serde(rename = "entityid", alias = "entityID")]
	pub entity_id: String,
	#[serde(rename = "DisplayNames", alias = "displayNames", default)]
	pub display_names: Vec<DisplayName>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DisplayName {
	pub lang: String,
	pub value: String,
}
