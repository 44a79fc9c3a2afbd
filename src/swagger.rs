use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::external::EmailResult;
use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::boleta::listar,
        handlers::boleta::stats,
        handlers::boleta::obtener,
        handlers::boleta::vender,
        handlers::boleta::reservar,
        handlers::boleta::liberar,
        handlers::boleta::vender_lote,
        handlers::cliente::listar,
        handlers::cliente::obtener,
        handlers::cliente::crear,
        handlers::cliente::actualizar,
        handlers::cliente::eliminar,
        handlers::dashboard::metricas,
        handlers::dashboard::get_config,
        handlers::dashboard::update_config,
        handlers::dashboard::test_email,
        handlers::print::obtener,
    ),
    components(schemas(
        Boleta,
        EstadoBoleta,
        BoletaConCliente,
        BoletaStats,
        VenderRequest,
        ReservarRequest,
        VenderLoteRequest,
        LoteError,
        LoteResultado,
        Cliente,
        ClienteConResumen,
        ClienteDetalle,
        CrearClienteRequest,
        ActualizarClienteRequest,
        RifaConfig,
        ActualizarConfigRequest,
        DashboardMetrics,
        TopComprador,
        PaginationInfo,
        EmailResult,
    )),
    tags(
        (name = "boletas", description = "Inventario y venta de boletas"),
        (name = "clientes", description = "Registro de compradores"),
        (name = "dashboard", description = "Métricas y configuración de la rifa"),
        (name = "print", description = "Datos de impresión de boletas")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    );
}
