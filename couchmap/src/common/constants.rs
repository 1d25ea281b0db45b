// statement placeholders
pub const PLACEHOLDER_SELECT_FROM: &str = "$SELECT_ENTITY$";
pub const PLACEHOLDER_BUCKET: &str = "$BUCKET$";
pub const PLACEHOLDER_ENTITY: &str = "$ENTITY$";

// projection aliases for out-of-band metadata columns
pub const SELECT_ID: &str = "_ID";
pub const SELECT_CAS: &str = "_CAS";
pub const SELECT_COUNT: &str = "count";

// field carrying the entity type name, used by secondary index predicates
pub const TYPE_KEY: &str = "_class";

// query request keys
pub const N1QL_STATEMENT: &str = "statement";
pub const N1QL_ARGS: &str = "args";
pub const N1QL_SCAN_CONSISTENCY: &str = "scan_consistency";

// system keyspace holding index metadata
pub const SYSTEM_INDEXES: &str = "system:indexes";
