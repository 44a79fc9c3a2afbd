use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Boleta;

/// Un comprador registrado, identificado por su cédula (clave de negocio única).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Cliente {
    pub id: Uuid,
    pub nombre: String,
    pub cedula: String,
    #[serde(default)]
    pub telefono: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub direccion: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CrearClienteRequest {
    pub nombre: Option<String>,
    pub cedula: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub direccion: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ActualizarClienteRequest {
    pub nombre: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub direccion: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ClienteQuery {
    #[serde(default, deserialize_with = "crate::models::pagination::empty_as_none")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "crate::models::pagination::empty_as_none")]
    pub limit: Option<u32>,
    pub search: Option<String>,
}

/// Cliente con el resumen de sus boletas, para el listado.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClienteConResumen {
    #[serde(flatten)]
    pub cliente: Cliente,
    pub total_boletas: usize,
    pub boletas_numeros: Vec<String>,
}

/// Cliente con sus boletas completas, para el detalle.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClienteDetalle {
    #[serde(flatten)]
    pub cliente: Cliente,
    pub boletas: Vec<Boleta>,
    pub total_boletas: usize,
}
