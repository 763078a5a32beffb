pub mod errors;
pub mod model;
pub mod snapshot;

// Re-export commonly used types
pub use errors::{ExtractionError, GraphStoreError, SnapshotError};
pub use model::{
    sort_order_from_columns, Class, ExtractionStandard, Relationship, SortOrderSpec, SourceColumn,
    SourceTable, UserRole,
};
pub use snapshot::{ColumnRef, GraphSnapshot, RelationshipNode};
