use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use uuid::Uuid;

/// Conteo de boletas por estado.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BoletaStats {
    pub total: usize,
    pub vendidas: usize,
    pub disponibles: usize,
    pub reservadas: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopComprador {
    pub cliente_id: Uuid,
    pub nombre: String,
    pub cedula: String,
    pub cantidad: usize,
}

/// Métricas del dashboard, derivadas de las dos colecciones sin estado propio.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_boletas: usize,
    pub vendidas: usize,
    pub disponibles: usize,
    pub reservadas: usize,
    pub porcentaje_vendidas: f64,
    pub total_clientes: usize,
    pub top_compradores: Vec<TopComprador>,
    pub ventas_por_fecha: BTreeMap<String, usize>,
    pub ingreso_total: i64,
    pub precio_boleta: i64,
}
