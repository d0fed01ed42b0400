//! Read queries against the IdP index and the SP metadata store.
//!
//! MATCH expressions are built by `disco_domain::query` and always bound as parameters. An empty
//! expression means "no full-text constraint" and selects every row.

use crate::{
	Result,
	db::{IdpDb, SpDb},
};

/// Number of index rows matching `expr`, without any row limit.
pub async fn count_matches(db: &IdpDb, expr: &str) -> Result<i64> {
	let count = if expr.is_empty() {
		sqlx::query_scalar::<_, i64>("SELECT count(*) FROM disco").fetch_one(&db.pool).await?
	} else {
		sqlx::query_scalar::<_, i64>("SELECT count(*) FROM disco WHERE disco MATCH ?1")
			.bind(expr)
			.fetch_one(&db.pool)
			.await?
	};

	Ok(count)
}

/// Serialized IdP records matching `expr`, best match first, at most `limit` rows.
pub async fn fetch_matches(db: &IdpDb, expr: &str, limit: u32) -> Result<Vec<Vec<u8>>> {
	let rows = if expr.is_empty() {
		sqlx::query_scalar::<_, Vec<u8>>("SELECT json FROM disco ORDER BY rowid LIMIT ?1")
			.bind(i64::from(limit))
			.fetch_all(&db.pool)
			.await?
	} else {
		sqlx::query_scalar::<_, Vec<u8>>(
			"SELECT json FROM disco WHERE disco MATCH ?1 ORDER BY rank, rowid LIMIT ?2",
		)
		.bind(expr)
		.bind(i64::from(limit))
		.fetch_all(&db.pool)
		.await?
	};

	Ok(rows)
}

/// Compressed metadata of the SP whose entity key is `key`, if present.
pub async fn fetch_sp_metadata(db: &SpDb, key: &str) -> Result<Option<Vec<u8>>> {
	let sql = format!(
		"\
SELECT e.md
FROM {entity} e, {lookup} l
WHERE l.hash = ?1
	AND l.entity_id_fk = e.id
LIMIT 1",
		entity = db.entity_table,
		lookup = db.lookup_table,
	);
	let md = sqlx::query_scalar::<_, Vec<u8>>(&sql).bind(key).fetch_optional(&db.pool).await?;

	Ok(md)
}
