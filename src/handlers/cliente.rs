use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::*;
use crate::services::ClienteService;

#[utoipa::path(
    get,
    path = "/clientes",
    tag = "clientes",
    params(
        ("page" = Option<u32>, Query, description = "Página"),
        ("limit" = Option<u32>, Query, description = "Tamaño de página"),
        ("search" = Option<String>, Query, description = "Búsqueda por nombre, cédula, teléfono o email")
    ),
    responses(
        (status = 200, description = "Listado paginado de clientes con el resumen de sus boletas")
    )
)]
pub async fn listar(
    cliente_service: web::Data<ClienteService>,
    query: web::Query<ClienteQuery>,
) -> Result<HttpResponse> {
    match cliente_service.listar(&query).await {
        Ok((clientes, pagination)) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": clientes,
            "pagination": pagination
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/clientes/{id}",
    tag = "clientes",
    params(("id" = Uuid, Path, description = "Id del cliente")),
    responses(
        (status = 200, description = "Cliente con sus boletas", body = ClienteDetalle),
        (status = 404, description = "Cliente no encontrado")
    )
)]
pub async fn obtener(
    cliente_service: web::Data<ClienteService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match cliente_service.detalle(*path).await {
        Ok(detalle) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": detalle
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/clientes",
    tag = "clientes",
    request_body = CrearClienteRequest,
    responses(
        (status = 201, description = "Cliente registrado", body = Cliente),
        (status = 400, description = "Campos obligatorios ausentes o cédula duplicada")
    )
)]
pub async fn crear(
    cliente_service: web::Data<ClienteService>,
    body: web::Json<CrearClienteRequest>,
) -> Result<HttpResponse> {
    let request = body.into_inner();
    let cedula = request.cedula.clone();

    match cliente_service.crear(request).await {
        Ok(cliente) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": cliente
        }))),
        // Cédula repetida: se devuelve el registro existente junto con el
        // error, nunca se crea un segundo cliente
        Err(AppError::DuplicateKey(message)) => {
            let existente = match cedula {
                Some(cedula) => cliente_service
                    .get_por_cedula(&cedula)
                    .await
                    .unwrap_or(None),
                None => None,
            };
            Ok(HttpResponse::BadRequest().json(json!({
                "success": false,
                "error": {
                    "code": "DUPLICATE_KEY",
                    "message": message
                },
                "data": existente
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/clientes/{id}",
    tag = "clientes",
    params(("id" = Uuid, Path, description = "Id del cliente")),
    request_body = ActualizarClienteRequest,
    responses(
        (status = 200, description = "Cliente actualizado", body = Cliente),
        (status = 404, description = "Cliente no encontrado")
    )
)]
pub async fn actualizar(
    cliente_service: web::Data<ClienteService>,
    path: web::Path<Uuid>,
    body: web::Json<ActualizarClienteRequest>,
) -> Result<HttpResponse> {
    match cliente_service.actualizar(*path, body.into_inner()).await {
        Ok(cliente) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": cliente
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/clientes/{id}",
    tag = "clientes",
    params(("id" = Uuid, Path, description = "Id del cliente")),
    responses(
        (status = 200, description = "Cliente eliminado; sus boletas quedan disponibles"),
        (status = 404, description = "Cliente no encontrado")
    )
)]
pub async fn eliminar(
    cliente_service: web::Data<ClienteService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match cliente_service.eliminar(*path).await {
        Ok(liberadas) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Cliente eliminado",
            "boletasLiberadas": liberadas
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn cliente_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/clientes")
            .route("", web::get().to(listar))
            .route("", web::post().to(crear))
            .route("/{id}", web::get().to(obtener))
            .route("/{id}", web::put().to(actualizar))
            .route("/{id}", web::delete().to(eliminar)),
    );
}
