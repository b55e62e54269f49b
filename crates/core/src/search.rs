//! List paging and free-text matching.

pub const DEFAULT_PAGE_LIMIT: i64 = 50;
pub const MAX_PAGE_LIMIT: i64 = 500;

/// Requested page size, bounded to `1..=max`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.map_or(default, |l| l.clamp(1, max))
}

pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.map_or(0, |o| o.max(0))
}

/// `ILIKE` pattern matching `term` anywhere in a column. `%`, `_` and `\`
/// in the term match themselves.
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
