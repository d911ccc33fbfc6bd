// Application layer - Use case interactors

pub mod audit_interactor;
pub mod batch_interactor;
pub mod container;
pub mod validate_interactor;

// Re-export interactors
pub use audit_interactor::AuditInteractor;
pub use batch_interactor::BatchInteractor;
pub use container::{AppContainer, DefaultAppContainer};
pub use validate_interactor::ValidateInteractor;
