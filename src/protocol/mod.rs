//! Line protocol handling.
//!
//! The command parser for the session loop and the JSON snapshot format
//! used by `snapshot` and `restore`.

pub mod parser;
pub mod snapshot;

pub use parser::{parse_command, Command};
pub use snapshot::{decode_snapshot, encode_snapshot, SessionSnapshot, SnapshotError, SNAPSHOT_VERSION};
