//! Projection of extracted rows onto the declared columns of a domain.

use log::debug;

use super::metadata::{OrderMap, RenameMap};
use super::table::DataTable;

/// Rename extracted columns and reindex them to the canonical column order
///
/// The result holds exactly the columns of `order_map`, sorted by declared
/// order (undeclared last). Declared columns the extraction did not produce
/// are null-filled, extracted columns that are not declared are dropped.
pub fn project(raw: DataTable, rename_map: &RenameMap, order_map: &OrderMap) -> DataTable {
    let mut renamed = raw;
    renamed.rename_columns(|column| rename_map.get(column).map(str::to_string));

    let canonical = order_map.canonical_order();
    let missing: Vec<&String> = canonical.iter().filter(|c| !renamed.has_column(c)).collect();
    if !missing.is_empty() {
        debug!("Filling columns that were not extracted with nulls: {:?}", missing);
    }
    let dropped: Vec<&String> = renamed
        .columns()
        .iter()
        .filter(|c| !canonical.contains(c))
        .collect();
    if !dropped.is_empty() {
        debug!("Dropping extracted columns without a declared column: {:?}", dropped);
    }

    renamed.select_padded(&canonical)
}
