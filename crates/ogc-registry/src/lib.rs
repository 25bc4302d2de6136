//! Layer registry: persisted layer records and the reconciliation engine
//! that keeps them in sync with what services actually advertise.

pub mod engine;
pub mod model;
pub mod report;
pub mod repository;

pub use engine::{LayerPage, Pagination, RegistrationEngine, RegistrationRequest, RegistryStatistics};
pub use model::{LayerQuery, LayerRecord, LayerRecordCreate, LayerRecordUpdate};
pub use report::{
    DeletedLayer, LayerOutcome, RegistrationReport, RegistrationSummary, ServiceReport,
};
pub use repository::{LayerRepository, MemoryRepository};
