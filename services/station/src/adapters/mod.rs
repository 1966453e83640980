pub mod cep;
pub mod clock;
pub mod file_store;
pub mod guest;
pub mod laundry_api;

pub use cep::CepApiAdapter;
pub use clock::SystemClock;
pub use file_store::JsonFileStore;
pub use guest::GuestApiAdapter;
pub use laundry_api::LaundryApiAdapter;
