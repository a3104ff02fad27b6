pub mod derived;
pub mod domain;
pub mod lookup;
pub mod memory;
pub mod ports;
pub mod session;
pub mod store;
pub mod sync;

pub use derived::DerivedView;
pub use domain::{
    Credentials, Identity, Profile, ProfileUpdate, ReflectionEntry, SessionStatus, Severity,
    SymptomEntry,
};
pub use lookup::{GuidanceTables, LookupError, Trimester};
pub use memory::MemoryDocumentStore;
pub use ports::{AuthService, Document, DocumentStore, PortError, PortResult, SessionEvents};
pub use session::SessionTracker;
pub use store::ProfileStoreAdapter;
pub use sync::{PendingWrite, ProfileSnapshot, ProfileSynchronizer, SyncState};
