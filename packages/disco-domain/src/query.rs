//! FTS5 expression composition.
//!
//! Filters are kept as a small tagged structure and only turned into text by [`FtsQuery::render`].
//! Every token that reaches the rendered string has already passed through
//! [`crate::sanitize`] and is emitted inside double quotes.

use crate::sanitize::{self, FreeText};

/// Indexed columns of the IdP index that a term may be qualified with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
	EntityId,
	Feds,
	Keywords,
}
impl Field {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::EntityId => "entityid",
			Self::Feds => "feds",
			Self::Keywords => "keywords",
		}
	}
}

/// OR-group of field-qualified terms for one filter dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
	field: Field,
	terms: Vec<String>,
}
impl Group {
	pub fn field(&self) -> Field {
		self.field
	}

	pub fn terms(&self) -> &[String] {
		&self.terms
	}

	pub fn is_empty(&self) -> bool {
		self.terms.is_empty()
	}

	/// Renders `(field:"a" OR field:"b")`, or `()` for a group without terms.
	///
	/// `()` is not valid FTS5 syntax. [`FtsQuery::render`] never emits an empty group.
	pub fn render(&self) -> String {
		let terms = self
			.terms
			.iter()
			.map(|term| format!("{}:{}", self.field.as_str(), quote(term)))
			.collect::<Vec<_>>();

		format!("({})", terms.join(" OR "))
	}
}

pub fn build_group<S>(values: &[S], field: Field) -> Group
where
	S: AsRef<str>,
{
	let mut terms = Vec::with_capacity(values.len());

	for value in values {
		let token = sanitize::normalize_identifier(value.as_ref());

		if token.trim().is_empty() || terms.contains(&token) {
			continue;
		}

		terms.push(token);
	}

	Group { field, terms }
}

/// Conjunction of a free-text term list and any number of OR-groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FtsQuery {
	free_text: FreeText,
	groups: Vec<Group>,
}
impl FtsQuery {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_free_text(mut self, free_text: FreeText) -> Self {
		self.free_text = free_text;

		self
	}

	pub fn and(mut self, group: Group) -> Self {
		self.groups.push(group);

		self
	}

	/// True when no dimension constrains the match set.
	pub fn is_unconstrained(&self) -> bool {
		self.free_text.is_empty() && self.groups.iter().all(Group::is_empty)
	}

	/// Renders the MATCH expression. Empty dimensions are omitted, so an unconstrained query
	/// renders to the empty string.
	pub fn render(&self) -> String {
		let mut parts = self
			.free_text
			.terms()
			.iter()
			.map(|term| format!("{}:{}*", Field::Keywords.as_str(), quote(term)))
			.collect::<Vec<_>>();

		parts.extend(self.groups.iter().filter(|group| !group.is_empty()).map(Group::render));

		parts.join(" AND ")
	}
}

fn quote(token: &str) -> String {
	format!("\"{token}\"")
}
