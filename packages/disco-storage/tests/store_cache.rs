use disco_storage::{Error, cache::StoreCache, models::IdpDocument, queries};
use disco_testkit::{IdpFixture, SpFixture, TestStores};

fn idps() -> Vec<IdpFixture> {
	vec![
		IdpFixture::new("https://idp.alpha.example")
			.display_name("en", "Alpha University")
			.fed("fed1"),
		IdpFixture::new("https://idp.beta.example")
			.display_name("en", "Beta College")
			.fed("fed2"),
	]
}

fn entity_ids(rows: &[Vec<u8>]) -> Vec<String> {
	rows.iter()
		.map(|row| {
			serde_json::from_slice::<IdpDocument>(row).expect("Fixture row must decode.").entity_id
		})
		.collect()
}

#[tokio::test]
async fn handles_open_lazily_and_are_reused() {
	let stores = TestStores::new(&idps(), &[]).await.expect("Failed to build stores.");
	let cache = StoreCache::new(&stores.storage_config());

	assert!(!cache.is_idp_open().await);
	assert!(!cache.is_sp_open().await);

	let first = cache.idp().await.expect("Failed to open IdP index.");
	let second = cache.idp().await.expect("Failed to reuse IdP index.");

	assert!(cache.is_idp_open().await);
	assert!(!cache.is_sp_open().await);
	assert_eq!(queries::count_matches(&first, "").await.expect("Count failed."), 2);
	assert_eq!(queries::count_matches(&second, "").await.expect("Count failed."), 2);
}

#[tokio::test]
async fn open_failure_does_not_poison_the_cache() {
	let stores = TestStores::empty().expect("Failed to create store directory.");
	let cache = StoreCache::new(&stores.storage_config());
	let err = cache.idp().await.expect_err("Expected open failure for a missing index.");

	assert!(matches!(err, Error::Open { .. }), "Unexpected error: {err:?}");
	assert!(!cache.is_idp_open().await);

	stores.write_idps(&idps()).await.expect("Failed to publish index.");

	let db = cache.idp().await.expect("Retry after publishing must succeed.");

	assert_eq!(queries::count_matches(&db, "").await.expect("Count failed."), 2);
}

#[tokio::test]
async fn invalidate_reopens_against_republished_store() {
	let stores = TestStores::new(&idps(), &[SpFixture::new("https://sp.example")])
		.await
		.expect("Failed to build stores.");
	let cache = StoreCache::new(&stores.storage_config());
	let before = cache.idp().await.expect("Failed to open IdP index.");

	cache.sp().await.expect("Failed to open SP store.");

	let mut republished = idps();

	republished.push(IdpFixture::new("https://idp.gamma.example").display_name("en", "Gamma"));
	stores.write_idps(&republished).await.expect("Failed to republish index.");

	cache.invalidate().await;

	assert!(!cache.is_idp_open().await);
	assert!(!cache.is_sp_open().await);

	// A handle obtained before invalidation is still open and usable.
	assert!(queries::count_matches(&before, "").await.is_ok());

	let after = cache.idp().await.expect("Failed to reopen IdP index.");

	assert_eq!(queries::count_matches(&after, "").await.expect("Count failed."), 3);

	cache.invalidate().await;
	cache.invalidate().await;

	assert!(!cache.is_idp_open().await);
}

#[tokio::test]
async fn match_queries_filter_and_limit() {
	let stores = TestStores::new(&idps(), &[]).await.expect("Failed to build stores.");
	let cache = StoreCache::new(&stores.storage_config());
	let db = cache.idp().await.expect("Failed to open IdP index.");
	let expr = r#"keywords:"alp"* AND (feds:"fed1" OR feds:"fed3")"#;

	assert_eq!(queries::count_matches(&db, expr).await.expect("Count failed."), 1);
	assert_eq!(
		entity_ids(&queries::fetch_matches(&db, expr, 10).await.expect("Fetch failed.")),
		vec!["https://idp.alpha.example"]
	);
	assert_eq!(queries::fetch_matches(&db, "", 1).await.expect("Fetch failed.").len(), 1);
	assert_eq!(
		entity_ids(&queries::fetch_matches(&db, r#"(entityid:"https000idp0beta0example")"#, 10)
			.await
			.expect("Fetch failed.")),
		vec!["https://idp.beta.example"]
	);
}

#[tokio::test]
async fn malformed_expression_is_a_query_error() {
	let stores = TestStores::new(&idps(), &[]).await.expect("Failed to build stores.");
	let cache = StoreCache::new(&stores.storage_config());
	let db = cache.idp().await.expect("Failed to open IdP index.");
	let err = queries::count_matches(&db, "()").await.expect_err("Expected syntax error.");

	assert!(matches!(err, Error::Sqlx(_)), "Unexpected error: {err:?}");
}

#[tokio::test]
async fn sp_metadata_is_found_by_entity_key() {
	let stores = TestStores::new(&[], &[SpFixture::new("https://sp.example").logo("https://logo")])
		.await
		.expect("Failed to build stores.");
	let cache = StoreCache::new(&stores.storage_config());
	let db = cache.sp().await.expect("Failed to open SP store.");
	let found = queries::fetch_sp_metadata(&db, &disco_metadata::entity_key("https://sp.example"))
		.await
		.expect("Lookup failed.");
	let unknown_key = disco_metadata::entity_key("https://unknown.example");
	let missing = queries::fetch_sp_metadata(&db, &unknown_key).await.expect("Lookup failed.");

	assert!(found.is_some());
	assert!(missing.is_none());
}

