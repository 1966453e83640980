pub mod address;
pub mod bag;
pub mod domain;
pub mod guest;
pub mod ports;
pub mod projections;
pub mod reconcile;
pub mod registration;
pub mod scan_input;
pub mod store;

pub use domain::{BagArchiveEntry, LaundryState, ProductRecord, ProductStatus, ScanRecord, StoredState};
pub use ports::{
    AddressLookupService, Clock, ConfirmationService, GuestDetailsService, LocalStateStore,
    MirrorOutbox, PortError, PortResult, RemoteStateService,
};
pub use registration::ProductForm;
pub use store::{ArchiveOutcome, BrandOutcome, InventoryStore, ScanOutcome, StoreError};
