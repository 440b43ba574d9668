//! COMAR audit tracker core
//!
//! Keeps inspection findings and their corrective and preventive action
//! plans (CAPAs) in a single JSON document persisted in a local redb file.
//!
//! # Layers
//!
//! ```text
//! AuditTracker (validation, notifications)
//!     └── repository::{finding, capa, import} (pure transformers)
//!             └── StateStore (load / save / update of the whole document)
//!                     └── DocumentBackend (redb, in-memory, or detached)
//! ```

pub mod clock;
pub mod config;
pub mod logger;
pub mod notify;
pub mod repository;
pub mod stats;
pub mod storage;
pub mod store;
pub mod tracker;
pub mod validation;

pub use clock::{Clock, FixedClock, IdGenerator, SequentialIds, SystemClock, UuidGenerator};
pub use config::{Config, load_config};
pub use notify::{Notification, Notifier, NotifyLevel, RecordingNotifier, TracingNotifier};
pub use stats::DashboardSummary;
pub use storage::{DocumentBackend, RedbBackend, StorageError};
pub use store::{DEFAULT_STORAGE_KEY, StateStore, StoreError, StoreResult};
pub use tracker::AuditTracker;
