use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::external::EmailService;
use crate::models::*;
use crate::services::DashboardService;

#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "dashboard",
    responses(
        (status = 200, description = "Métricas generales de la rifa", body = DashboardMetrics)
    )
)]
pub async fn metricas(dashboard_service: web::Data<DashboardService>) -> Result<HttpResponse> {
    match dashboard_service.metricas().await {
        Ok(metricas) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": metricas
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/dashboard/config",
    tag = "dashboard",
    responses(
        (status = 200, description = "Configuración de la rifa", body = RifaConfig)
    )
)]
pub async fn get_config(dashboard_service: web::Data<DashboardService>) -> Result<HttpResponse> {
    match dashboard_service.get_config().await {
        Ok(config) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": config
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/dashboard/config",
    tag = "dashboard",
    request_body = ActualizarConfigRequest,
    responses(
        (status = 200, description = "Configuración actualizada; solo cambian los campos enviados", body = RifaConfig)
    )
)]
pub async fn update_config(
    dashboard_service: web::Data<DashboardService>,
    body: web::Json<ActualizarConfigRequest>,
) -> Result<HttpResponse> {
    match dashboard_service.update_config(body.into_inner()).await {
        Ok(config) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": config
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/dashboard/test-email",
    tag = "dashboard",
    responses(
        (status = 200, description = "Resultado de la prueba de conexión SMTP")
    )
)]
pub async fn test_email(email_service: web::Data<EmailService>) -> Result<HttpResponse> {
    let resultado = email_service.test_conexion().await;
    Ok(HttpResponse::Ok().json(json!({
        "success": resultado.success,
        "message": resultado.message
    })))
}

pub fn dashboard_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/dashboard")
            .route("", web::get().to(metricas))
            .route("/config", web::get().to(get_config))
            .route("/config", web::put().to(update_config))
            .route("/test-email", web::post().to(test_email)),
    );
}
