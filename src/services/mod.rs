pub mod boleta_service;
pub mod cliente_service;
pub mod dashboard_service;

pub use boleta_service::*;
pub use cliente_service::*;
pub use dashboard_service::*;
