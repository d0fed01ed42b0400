//! Namespace-aware path projection over SAML metadata.
//!
//! Paths are evaluated relative to the document root element and use a small XPath subset:
//! `prefix:local` steps separated by `/`, an optional `[@attr='value']` predicate per step, and an
//! optional trailing `@attr` step selecting an attribute instead of element text. Element prefixes
//! are resolved through [`NAMESPACES`], so documents may bind the namespaces to any prefix they
//! like. Attribute names are compared verbatim (`xml:lang`, `Location`).

use quick_xml::{
	events::{BytesStart, Event},
	name::ResolveResult,
	reader::NsReader,
};

use crate::{Error, Result};

pub const NAMESPACES: &[(&str, &str)] = &[
	("md", "urn:oasis:names:tc:SAML:2.0:metadata"),
	("mdui", "urn:oasis:names:tc:SAML:metadata:ui"),
	("wayf", "http://wayf.dk/2014/08/wayf"),
	("init", "urn:oasis:names:tc:SAML:profiles:SSO:request-init"),
	("idpdisc", "urn:oasis:names:tc:SAML:profiles:SSO:idp-discovery-protocol"),
];

#[derive(Debug)]
pub struct MetadataXml {
	root: Element,
}
impl MetadataXml {
	pub fn parse(xml: &str) -> Result<Self> {
		let mut reader = NsReader::from_str(xml);

		reader.config_mut().trim_text(true);

		let mut stack: Vec<Element> = Vec::new();
		let mut root = None;

		loop {
			let (resolved, event) = reader.read_resolved_event().map_err(xml_error)?;
			let namespace = match resolved {
				ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
				_ => None,
			};

			match event {
				Event::Start(start) => stack.push(Element::open(namespace, &start)?),
				Event::Empty(start) => {
					let element = Element::open(namespace, &start)?;

					attach(&mut stack, &mut root, element);
				},
				Event::End(_) => {
					let Some(element) = stack.pop() else {
						return Err(Error::Xml { message: "Unbalanced end tag.".to_string() });
					};

					attach(&mut stack, &mut root, element);
				},
				Event::Text(text) =>
					if let Some(top) = stack.last_mut() {
						top.text.push_str(&text.unescape().map_err(xml_error)?);
					},
				Event::CData(data) =>
					if let Some(top) = stack.last_mut() {
						top.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
					},
				Event::Eof => break,
				_ => {},
			}
		}

		if !stack.is_empty() {
			return Err(Error::Xml { message: "Unexpected end of document.".to_string() });
		}

		root.map(|root| Self { root })
			.ok_or_else(|| Error::Xml { message: "Document has no root element.".to_string() })
	}

	/// First value matching `path`, or an empty string when nothing matches.
	pub fn query1(&self, path: &str) -> Result<String> {
		Ok(self.query_multi(path)?.into_iter().next().unwrap_or_default())
	}

	/// Every value matching `path`, in document order.
	pub fn query_multi(&self, path: &str) -> Result<Vec<String>> {
		let parsed = Path::parse(path)?;
		let mut current = vec![&self.root];

		for step in &parsed.steps {
			current = current
				.into_iter()
				.flat_map(|element| element.children.iter().filter(|child| step.matches(child)))
				.collect();
		}

		let values = match parsed.attribute.as_deref() {
			Some(attribute) => current
				.into_iter()
				.filter_map(|element| element.attribute(attribute))
				.map(str::to_string)
				.collect(),
			None => current.into_iter().map(|element| element.text.trim().to_string()).collect(),
		};

		Ok(values)
	}
}

#[derive(Debug)]
struct Element {
	namespace: Option<String>,
	local: String,
	attributes: Vec<(String, String)>,
	text: String,
	children: Vec<Element>,
}
impl Element {
	fn open(namespace: Option<String>, start: &BytesStart<'_>) -> Result<Self> {
		let local = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
		let mut attributes = Vec::new();

		for attr in start.attributes() {
			let attr = attr.map_err(|err| Error::Xml { message: err.to_string() })?;
			let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
			let value = attr.unescape_value().map_err(xml_error)?.into_owned();

			attributes.push((key, value));
		}

		Ok(Self { namespace, local, attributes, text: String::new(), children: Vec::new() })
	}

	fn attribute(&self, name: &str) -> Option<&str> {
		self.attributes.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
	}
}

struct Path {
	steps: Vec<Step>,
	attribute: Option<String>,
}
impl Path {
	fn parse(path: &str) -> Result<Self> {
		let invalid = |message: &str| Error::Path { path: path.to_string(), message: message.to_string() };
		let segments = split_segments(path);
		let mut steps = Vec::with_capacity(segments.len());
		let mut attribute = None;

		for (idx, segment) in segments.iter().enumerate() {
			if let Some(name) = segment.strip_prefix('@') {
				if idx + 1 != segments.len() {
					return Err(invalid("attribute step must be last"));
				}
				if name.is_empty() {
					return Err(invalid("attribute step needs a name"));
				}

				attribute = Some(name.to_string());

				continue;
			}

			steps.push(Step::parse(segment).map_err(|message| invalid(message))?);
		}

		if steps.is_empty() {
			return Err(invalid("path selects no element"));
		}

		Ok(Self { steps, attribute })
	}
}

struct Step {
	namespace: &'static str,
	local: String,
	predicate: Option<(String, String)>,
}
impl Step {
	fn parse(segment: &str) -> Result<Self, &'static str> {
		let (name, predicate) = match segment.split_once('[') {
			Some((name, rest)) => {
				let body = rest.strip_suffix(']').ok_or("unterminated predicate")?;

				(name, Some(parse_predicate(body)?))
			},
			None => (segment, None),
		};
		let (prefix, local) = name.split_once(':').ok_or("element step needs a prefix")?;
		let namespace = NAMESPACES
			.iter()
			.find(|(known, _)| *known == prefix)
			.map(|(_, uri)| *uri)
			.ok_or("unknown namespace prefix")?;

		if local.is_empty() {
			return Err("element step needs a local name");
		}

		Ok(Self { namespace, local: local.to_string(), predicate })
	}

	fn matches(&self, element: &Element) -> bool {
		if element.local != self.local || element.namespace.as_deref() != Some(self.namespace) {
			return false;
		}

		match &self.predicate {
			Some((name, value)) => element.attribute(name) == Some(value.as_str()),
			None => true,
		}
	}
}

fn parse_predicate(body: &str) -> Result<(String, String), &'static str> {
	let body = body.strip_prefix('@').ok_or("predicate must test an attribute")?;
	let (name, value) = body.split_once('=').ok_or("predicate needs a value")?;
	let value = value.trim();
	let unquoted = value
		.strip_prefix('\'')
		.and_then(|rest| rest.strip_suffix('\''))
		.or_else(|| value.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')))
		.ok_or("predicate value must be quoted")?;

	Ok((name.trim().to_string(), unquoted.to_string()))
}

// Splits on `/` outside of predicate brackets.
fn split_segments(path: &str) -> Vec<&str> {
	let mut segments = Vec::new();
	let mut depth = 0_usize;
	let mut start = 0;

	for (idx, ch) in path.char_indices() {
		match ch {
			'[' => depth += 1,
			']' => depth = depth.saturating_sub(1),
			'/' if depth == 0 => {
				segments.push(&path[start..idx]);

				start = idx + 1;
			},
			_ => {},
		}
	}

	segments.push(&path[start..]);

	segments.into_iter().filter(|segment| !segment.is_empty()).collect()
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
	match stack.last_mut() {
		Some(parent) => parent.children.push(element),
		None if root.is_none() => *root = Some(element),
		None => {},
	}
}

fn xml_error(err: quick_xml::Error) -> Error {
	Error::Xml { message: err.to_string() }
}
