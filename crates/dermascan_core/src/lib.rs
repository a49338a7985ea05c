pub mod analysis;
pub mod credentials;
pub mod domain;
pub mod error;
mod in_flight;
pub mod intake;
pub mod persistence;
pub mod ports;
pub mod result_store;
pub mod session_store;

pub use analysis::AnalysisFlow;
pub use domain::{
    AnalysisReport, AnalysisResult, AnalysisSubmission, ImageUpload, NewAnalysisResult, Product,
    RegisteredUser, Session, UserDetails,
};
pub use error::{AnalysisError, SessionError, ValidationError};
pub use intake::IntakeForm;
pub use persistence::MemoryStore;
pub use ports::{AnalysisService, KeyValueStore, PortError, PortResult};
pub use result_store::ResultStore;
pub use session_store::{AuthState, SessionStore};
