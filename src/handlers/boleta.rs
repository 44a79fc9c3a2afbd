use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::config::Config;
use crate::external::EmailService;
use crate::handlers::base_url;
use crate::models::*;
use crate::services::BoletaService;

#[utoipa::path(
    get,
    path = "/boletas",
    tag = "boletas",
    params(
        ("page" = Option<u32>, Query, description = "Página"),
        ("limit" = Option<u32>, Query, description = "Tamaño de página"),
        ("estado" = Option<String>, Query, description = "Filtro por estado: disponible/reservada/vendida"),
        ("search" = Option<String>, Query, description = "Búsqueda por numero"),
        ("clienteId" = Option<String>, Query, description = "Filtro por cliente")
    ),
    responses(
        (status = 200, description = "Listado paginado de boletas")
    )
)]
pub async fn listar(
    boleta_service: web::Data<BoletaService>,
    query: web::Query<BoletaQuery>,
) -> Result<HttpResponse> {
    match boleta_service.listar(&query).await {
        Ok((boletas, pagination)) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": boletas,
            "pagination": pagination
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/boletas/stats",
    tag = "boletas",
    responses(
        (status = 200, description = "Conteo de boletas por estado", body = BoletaStats)
    )
)]
pub async fn stats(boleta_service: web::Data<BoletaService>) -> Result<HttpResponse> {
    match boleta_service.count().await {
        Ok(stats) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": stats
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/boletas/{numero}",
    tag = "boletas",
    params(("numero" = String, Path, description = "Número de boleta")),
    responses(
        (status = 200, description = "Boleta con los datos de su dueño"),
        (status = 404, description = "Boleta no encontrada")
    )
)]
pub async fn obtener(
    boleta_service: web::Data<BoletaService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match boleta_service.obtener_con_cliente(&path).await {
        Ok(boleta) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": boleta
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/boletas/{numero}/vender",
    tag = "boletas",
    params(("numero" = String, Path, description = "Número de boleta")),
    request_body = VenderRequest,
    responses(
        (status = 200, description = "Boleta vendida; incluye el resultado del envío por correo"),
        (status = 400, description = "La boleta ya fue vendida"),
        (status = 404, description = "Boleta o cliente no encontrado")
    )
)]
pub async fn vender(
    boleta_service: web::Data<BoletaService>,
    email_service: web::Data<EmailService>,
    config: web::Data<Config>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<VenderRequest>,
) -> Result<HttpResponse> {
    let numero = path.into_inner();
    match boleta_service.vender(&numero, body.cliente_id).await {
        Ok((boleta, cliente)) => {
            // La venta ya está confirmada; el correo es un efecto posterior
            // de mejor esfuerzo y su resultado viaja como dato auxiliar
            let email = email_service
                .enviar_boleta(&boleta, &cliente, &base_url(&req, &config))
                .await;

            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": BoletaConCliente {
                    boleta,
                    cliente: Some(cliente),
                },
                "email": email
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/boletas/{numero}/reservar",
    tag = "boletas",
    params(("numero" = String, Path, description = "Número de boleta")),
    request_body = ReservarRequest,
    responses(
        (status = 200, description = "Boleta reservada"),
        (status = 400, description = "La boleta ya fue vendida"),
        (status = 404, description = "Boleta no encontrada")
    )
)]
pub async fn reservar(
    boleta_service: web::Data<BoletaService>,
    path: web::Path<String>,
    body: Option<web::Json<ReservarRequest>>,
) -> Result<HttpResponse> {
    let cliente_id = body.map(|b| b.cliente_id).unwrap_or(None);
    match boleta_service.reservar(&path, cliente_id).await {
        Ok(boleta) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": boleta
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/boletas/{numero}/liberar",
    tag = "boletas",
    params(("numero" = String, Path, description = "Número de boleta")),
    responses(
        (status = 200, description = "Boleta devuelta a disponible"),
        (status = 404, description = "Boleta no encontrada")
    )
)]
pub async fn liberar(
    boleta_service: web::Data<BoletaService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match boleta_service.liberar(&path).await {
        Ok(boleta) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": boleta
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/boletas/vender-lote",
    tag = "boletas",
    request_body = VenderLoteRequest,
    responses(
        (status = 200, description = "Resultado del lote: vendidas y errores por boleta", body = LoteResultado),
        (status = 400, description = "Lista de números vacía"),
        (status = 404, description = "Cliente no encontrado")
    )
)]
pub async fn vender_lote(
    boleta_service: web::Data<BoletaService>,
    email_service: web::Data<EmailService>,
    config: web::Data<Config>,
    req: HttpRequest,
    body: web::Json<VenderLoteRequest>,
) -> Result<HttpResponse> {
    let request = body.into_inner();
    if request.numeros.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "success": false,
            "error": {
                "code": "VALIDATION_ERROR",
                "message": "Debe enviar un array de números de boletas"
            }
        })));
    }

    match boleta_service
        .vender_lote(&request.numeros, request.cliente_id)
        .await
    {
        Ok((resultado, cliente)) => {
            let email = if resultado.vendidas.is_empty() {
                crate::external::EmailResult {
                    success: false,
                    message: "No enviado".to_string(),
                }
            } else {
                email_service
                    .enviar_lote(&resultado.vendidas, &cliente, &base_url(&req, &config))
                    .await
            };

            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": resultado,
                "email": email
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

pub fn boleta_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/boletas")
            .route("", web::get().to(listar))
            .route("/stats", web::get().to(stats))
            .route("/vender-lote", web::post().to(vender_lote))
            .route("/{numero}", web::get().to(obtener))
            .route("/{numero}/vender", web::put().to(vender))
            .route("/{numero}/reservar", web::put().to(reservar))
            .route("/{numero}/liberar", web::put().to(liberar)),
    );
}
