//! Persistence boundary for accounts, profiles, catalog, assessments and forms.
//!
//! Services depend only on the traits in [`r#trait`]; both backends implement
//! all of them.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use r#trait::{
    Apl01Store, Apl02Store, AssesseeStore, AssessmentStore, AssessorStore, CatalogStore, StoreError,
    Stores, UserStore,
};
