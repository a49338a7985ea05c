pub mod file_store;
pub mod http_analysis;
pub mod mock_analysis;

pub use file_store::JsonFileStore;
pub use http_analysis::HttpAnalysisAdapter;
pub use mock_analysis::MockAnalysisAdapter;
