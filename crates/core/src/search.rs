//! Pagination helpers shared by list endpoints.

/// Default page size for list queries.
pub const DEFAULT_LIST_LIMIT: i64 = 20;

/// Upper bound on page size for list queries.
pub const MAX_LIST_LIMIT: i64 = 100;

/// Clamp a user-provided limit to `[1, max]`, using `default` when absent.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

/// Build an `ILIKE ... ESCAPE '\'` pattern matching `query` anywhere in a
/// column. `%`, `_` and `\` in the query match literally.
pub fn contains_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
