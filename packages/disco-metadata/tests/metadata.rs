use std::io::Write;

use flate2::{Compression, write::DeflateEncoder};

use disco_metadata::{Error, MetadataXml};

const SP_METADATA: &str = include_str!("fixtures/sp_metadata.xml");

fn deflate(raw: &[u8]) -> Vec<u8> {
	let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());

	encoder.write_all(raw).expect("Failed to compress fixture.");

	encoder.finish().expect("Failed to finish compression.")
}

fn sample() -> MetadataXml {
	MetadataXml::parse(SP_METADATA).expect("Fixture metadata must parse.")
}

#[test]
fn entity_key_is_hex_sha1() {
	assert_eq!(disco_metadata::entity_key("abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
	assert_eq!(disco_metadata::entity_key(""), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
}

#[test]
fn decode_inflates_and_parses() {
	let compressed = deflate(SP_METADATA.as_bytes());
	let xml = disco_metadata::decode(&compressed, 1_024 * 1_024).expect("Failed to decode.");

	assert_eq!(
		xml.query1("md:SPSSODescriptor/md:Extensions/mdui:UIInfo/mdui:Logo")
			.expect("Valid path."),
		"https://sp.example.org/logo.png"
	);
}

#[test]
fn inflate_enforces_limit() {
	let compressed = deflate(SP_METADATA.as_bytes());
	let err = disco_metadata::inflate(&compressed, 16).expect_err("Expected size limit error.");

	assert!(matches!(err, Error::TooLarge { limit: 16 }), "Unexpected error: {err:?}");
}

#[test]
fn inflate_rejects_garbage() {
	let err = disco_metadata::inflate(&[0xff, 0xff, 0xff, 0xff], 1_024)
		.expect_err("Expected inflate error.");

	assert!(matches!(err, Error::Inflate(_)), "Unexpected error: {err:?}");
}

#[test]
fn prefixes_resolve_through_namespaces() {
	let xml = sample();

	assert_eq!(
		xml.query_multi("md:Extensions/wayf:wayf/wayf:feds").expect("Valid path."),
		vec!["WAYF", "eduGAIN"]
	);
}

#[test]
fn predicates_select_by_attribute() {
	let xml = sample();
	let base = "md:SPSSODescriptor/md:Extensions/mdui:UIInfo/mdui:DisplayName";

	assert_eq!(xml.query1(&format!("{base}[@xml:lang='en']")).expect("Valid path."), "Example & Co");
	assert_eq!(xml.query1(&format!("{base}[@xml:lang='da']")).expect("Valid path."), "Eksempel og Co");
	assert_eq!(xml.query_multi(&format!("{base}/@xml:lang")).expect("Valid path."), vec!["en", "da"]);
	assert_eq!(xml.query1(&format!("{base}[@xml:lang='sv']")).expect("Valid path."), "");
}

#[test]
fn attribute_steps_return_attribute_values() {
	let xml = sample();

	assert_eq!(
		xml.query_multi(
			"md:SPSSODescriptor/md:AssertionConsumerService[@Binding='urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST']/@Location"
		)
		.expect("Valid path."),
		vec!["https://sp.example.org/acs/post", "https://sp.example.org/acs/post2"]
	);
	assert_eq!(
		xml.query_multi("md:SPSSODescriptor/md:Extensions/init:RequestInitiator/@Location")
			.expect("Valid path."),
		vec!["https://sp.example.org/login"]
	);
}

#[test]
fn malformed_xml_is_an_error() {
	let err = MetadataXml::parse("<md:EntityDescriptor><unclosed>").expect_err("Expected error.");

	assert!(matches!(err, Error::Xml { .. }), "Unexpected error: {err:?}");
}
