pub mod boleta;
pub mod cliente;
pub mod dashboard;
pub mod print;

pub use boleta::boleta_config;
pub use cliente::cliente_config;
pub use dashboard::dashboard_config;
pub use print::print_config;

use actix_web::{HttpRequest, HttpResponse};
use serde_json::json;

use crate::config::Config;

/// URL base para los links generados (QR, páginas públicas de boletas):
/// la URL pública configurada o, en su defecto, la de la conexión entrante.
pub(crate) fn base_url(req: &HttpRequest, config: &Config) -> String {
    if let Some(public_url) = &config.server.public_url {
        return public_url.trim_end_matches('/').to_string();
    }
    let info = req.connection_info();
    format!("{}://{}", info.scheme(), info.host())
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
