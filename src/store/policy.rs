//! Soft delete: rows are flagged, never removed, and every entity-facing read filters on the flag.

pub const DELETED_COLUMN: &str = "deleted";

/// Flag value of a live row.
pub const LIVE: i32 = 0;
/// Flag value of a soft-deleted row.
pub const DELETED: i32 = 1;

pub fn is_live(flag: i32) -> bool {
    flag == LIVE
}

/// SQL predicate selecting live rows only.
pub fn live_predicate() -> String {
    format!("\"{}\" = {}", DELETED_COLUMN, LIVE)
}
