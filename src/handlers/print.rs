use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::config::Config;
use crate::handlers::base_url;
use crate::services::{BoletaService, DashboardService};
use crate::utils::qr_data_url;

#[utoipa::path(
    get,
    path = "/print/{numero}",
    tag = "print",
    params(("numero" = String, Path, description = "Número de boleta")),
    responses(
        (status = 200, description = "Datos de impresión de la boleta: QR, código de barras y configuración"),
        (status = 404, description = "Boleta no encontrada")
    )
)]
pub async fn obtener(
    boleta_service: web::Data<BoletaService>,
    dashboard_service: web::Data<DashboardService>,
    config: web::Data<Config>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let con_cliente = match boleta_service.obtener_con_cliente(&path).await {
        Ok(con_cliente) => con_cliente,
        Err(e) => return Ok(e.error_response()),
    };
    let rifa = match dashboard_service.get_config().await {
        Ok(rifa) => rifa,
        Err(e) => return Ok(e.error_response()),
    };

    // El QR apunta a la página pública de la boleta
    let qr_url = format!("{}/boleta/{}", base_url(&req, &config), con_cliente.boleta.numero);
    let qr = match qr_data_url(&qr_url) {
        Ok(qr) => qr,
        Err(e) => return Ok(e.error_response()),
    };
    let codigo_barras = con_cliente.boleta.codigo_barras.clone();

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": {
            "boleta": con_cliente.boleta,
            "cliente": con_cliente.cliente,
            "config": {
                "nombreRifa": rifa.nombre_rifa,
                "descripcion": rifa.descripcion,
                "premio": rifa.premio,
                "fechaSorteo": rifa.fecha_sorteo,
                "organizador": rifa.organizador,
                "precioBoleta": rifa.precio_boleta,
            },
            "qrDataUrl": qr,
            "qrUrl": qr_url,
            "codigoBarras": codigo_barras,
        }
    })))
}

pub fn print_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/print").route("/{numero}", web::get().to(obtener)));
}
