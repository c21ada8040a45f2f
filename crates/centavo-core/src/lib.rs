//! centavo-core: embeddable core for the centavo expense ledger.
//!
//! Provides the file-backed record store (collections with cross-process
//! locking, size rotation, and corruption recovery), the settings overlay,
//! typed expense/payment records, and the chat command layer.
//!
//! # Quick Start
//!
//! ```no_run
//! use centavo_core::commands;
//! use centavo_core::{Store, StoreConfig};
//!
//! let store = Store::new(StoreConfig::new("/var/lib/centavo"));
//! let reply = commands::dispatch(&store, "gasto 15000 almuerzo");
//! println!("{reply}");
//! ```
//!
//! Collections are plain pretty-printed JSON files in one data directory;
//! any number of processes may operate on them concurrently through this
//! crate. See [`store`] for the locking and recovery guarantees.

pub mod clock;
pub mod commands;
pub mod json_ext;
pub mod money;
pub mod records;
pub mod safe_io;
pub mod settings;
pub mod store;

// Re-export commonly used types
pub use records::{Expense, PendingPayment};
pub use settings::Settings;
pub use store::{Collection, Store, StoreConfig};
