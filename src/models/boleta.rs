use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Estado de una boleta dentro del ciclo de venta.
///
/// `disponible → reservada → vendida`, y cualquier estado puede volver a
/// `disponible` al liberar la boleta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EstadoBoleta {
    Disponible,
    Reservada,
    Vendida,
}

impl std::fmt::Display for EstadoBoleta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EstadoBoleta::Disponible => write!(f, "disponible"),
            EstadoBoleta::Reservada => write!(f, "reservada"),
            EstadoBoleta::Vendida => write!(f, "vendida"),
        }
    }
}

/// Una boleta numerada de la rifa.
///
/// El `numero` es único e inmutable; `clienteId` y `fechaVenta` solo están
/// presentes según el estado (vendida ⇒ ambos, disponible ⇒ ninguno).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Boleta {
    pub id: Uuid,
    pub numero: String,
    pub codigo_barras: String,
    pub estado: EstadoBoleta,
    pub cliente_id: Option<Uuid>,
    pub fecha_venta: Option<DateTime<Utc>>,
    pub vendido_por: Option<String>,
    #[serde(default)]
    pub notas: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Filtros del listado de boletas. Se aceptan como texto plano para tolerar
/// parámetros vacíos (`?estado=&search=`); un valor vacío equivale a ausente.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct BoletaQuery {
    #[serde(default, deserialize_with = "crate::models::pagination::empty_as_none")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "crate::models::pagination::empty_as_none")]
    pub limit: Option<u32>,
    pub estado: Option<String>,
    pub search: Option<String>,
    #[serde(rename = "clienteId")]
    pub cliente_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VenderRequest {
    #[serde(rename = "clienteId")]
    pub cliente_id: Uuid,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ReservarRequest {
    #[serde(rename = "clienteId")]
    pub cliente_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VenderLoteRequest {
    pub numeros: Vec<String>,
    #[serde(rename = "clienteId")]
    pub cliente_id: Uuid,
}

/// Error por boleta dentro de una venta por lote.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoteError {
    pub numero: String,
    pub error: String,
}

/// Resultado de una venta por lote: las ventas exitosas junto con los
/// errores por boleta; el fallo parcial es un resultado normal, no un error.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoteResultado {
    pub vendidas: Vec<Boleta>,
    pub errores: Vec<LoteError>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BoletaConCliente {
    #[serde(flatten)]
    pub boleta: Boleta,
    pub cliente: Option<crate::models::Cliente>,
}
