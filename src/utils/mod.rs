pub mod formato;
pub mod numero;
pub mod qr;
pub mod validacion;

pub use formato::*;
pub use numero::*;
pub use qr::*;
pub use validacion::*;
