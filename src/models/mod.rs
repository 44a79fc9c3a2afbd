pub mod boleta;
pub mod cliente;
pub mod dashboard;
pub mod pagination;
pub mod rifa_config;

pub use boleta::*;
pub use cliente::*;
pub use dashboard::*;
pub use pagination::*;
pub use rifa_config::*;
