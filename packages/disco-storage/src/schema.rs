/// Layout of the IdP index as written by the indexing pipeline.
pub fn render_idp_index_schema() -> String {
	include_str!("../../../sql/idp_index.sql").to_string()
}

/// Layout of the SP metadata store for one table suffix.
pub fn render_sp_metadata_schema(table_suffix: &str) -> String {
	include_str!("../../../sql/sp_metadata.sql").replace("<SUFFIX>", table_suffix)
}

/// Splits a rendered schema into executable statements, dropping `--` comment lines.
pub fn statements(sql: &str) -> Vec<String> {
	sql.split(';')
		.map(|statement| {
			statement
				.lines()
				.filter(|line| !line.trim_start().starts_with("--"))
				.collect::<Vec<_>>()
				.join("\n")
		})
		.filter(|statement| !statement.trim().is_empty())
		.collect()
}
