//! Embedded SQL storage seam.
//!
//! Business modules talk to [`SQLStore`], a narrow query/exec/batch
//! interface, and never to a concrete database. [`SqliteStore`] is the
//! production implementation (bundled SQLite, WAL mode); tests usually run
//! against [`SqliteStore::open_in_memory`].

pub mod error;
pub mod sqlite;
pub mod traits;

pub use error::SQLError;
pub use sqlite::SqliteStore;
pub use traits::{Row, SQLStore, Value};
