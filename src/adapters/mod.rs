// Adapters layer: concrete implementations of the domain ports (storage, stats CSV, case site).

pub mod csv_store;
pub mod html_extractor;
pub mod local_storage;

pub use csv_store::CsvStatsStore;
pub use html_extractor::HtmlPageExtractor;
pub use local_storage::LocalStorage;
