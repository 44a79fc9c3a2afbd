use std::collections::BTreeMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    ActualizarConfigRequest, DashboardMetrics, EstadoBoleta, RifaConfig, TopComprador,
};
use crate::store::Store;

/// Métricas del dashboard y configuración de la rifa.
///
/// Las métricas son derivación pura sobre las dos colecciones; no guardan
/// estado propio.
#[derive(Clone)]
pub struct DashboardService {
    store: Arc<Store>,
}

impl DashboardService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub async fn metricas(&self) -> AppResult<DashboardMetrics> {
        let boletas = self.store.boletas().load().await?;
        let clientes = self.store.clientes().load().await?;
        let config = self.store.get_config().await?;

        let total_boletas = boletas.len();
        let vendidas = boletas
            .iter()
            .filter(|b| b.estado == EstadoBoleta::Vendida)
            .count();
        let disponibles = boletas
            .iter()
            .filter(|b| b.estado == EstadoBoleta::Disponible)
            .count();
        let reservadas = boletas
            .iter()
            .filter(|b| b.estado == EstadoBoleta::Reservada)
            .count();

        let porcentaje_vendidas = if total_boletas > 0 {
            ((vendidas as f64 / total_boletas as f64) * 100.0 * 100.0).round() / 100.0
        } else {
            0.0
        };

        // Boletas por cliente, en orden de primera aparición para que los
        // empates del top conserven un orden estable
        let mut por_cliente: Vec<(Uuid, usize)> = Vec::new();
        for boleta in boletas.iter() {
            let Some(cliente_id) = boleta.cliente_id else {
                continue;
            };
            match por_cliente.iter_mut().find(|(id, _)| *id == cliente_id) {
                Some((_, cantidad)) => *cantidad += 1,
                None => por_cliente.push((cliente_id, 1)),
            }
        }
        por_cliente.sort_by(|a, b| b.1.cmp(&a.1));
        let top_compradores: Vec<TopComprador> = por_cliente
            .into_iter()
            .take(10)
            .map(|(cliente_id, cantidad)| {
                let cliente = clientes.iter().find(|c| c.id == cliente_id);
                TopComprador {
                    cliente_id,
                    nombre: cliente
                        .map(|c| c.nombre.clone())
                        .unwrap_or_else(|| "Desconocido".to_string()),
                    cedula: cliente.map(|c| c.cedula.clone()).unwrap_or_default(),
                    cantidad,
                }
            })
            .collect();

        // Histograma de ventas por fecha calendario
        let mut ventas_por_fecha: BTreeMap<String, usize> = BTreeMap::new();
        for boleta in boletas
            .iter()
            .filter(|b| b.estado == EstadoBoleta::Vendida)
        {
            if let Some(fecha_venta) = boleta.fecha_venta {
                let fecha = fecha_venta.format("%Y-%m-%d").to_string();
                *ventas_por_fecha.entry(fecha).or_insert(0) += 1;
            }
        }

        // Estimación al precio actual; no es una auditoría de los precios
        // históricos de cada venta
        let ingreso_total = vendidas as i64 * config.precio_boleta;

        Ok(DashboardMetrics {
            total_boletas,
            vendidas,
            disponibles,
            reservadas,
            porcentaje_vendidas,
            total_clientes: clientes.len(),
            top_compradores,
            ventas_por_fecha,
            ingreso_total,
            precio_boleta: config.precio_boleta,
        })
    }

    pub async fn get_config(&self) -> AppResult<RifaConfig> {
        self.store.get_config().await
    }

    pub async fn update_config(&self, cambios: ActualizarConfigRequest) -> AppResult<RifaConfig> {
        self.store.update_config(cambios).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CrearClienteRequest;
    use crate::services::{BoletaService, ClienteService};
    use tempfile::TempDir;

    async fn setup(total: u32) -> (TempDir, DashboardService, BoletaService, ClienteService) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Store::open(dir.path()).await.unwrap());
        let boletas = BoletaService::new(store.clone());
        boletas.provisionar(total).await.unwrap();
        (
            dir,
            DashboardService::new(store.clone()),
            boletas,
            ClienteService::new(store),
        )
    }

    async fn cliente(clientes: &ClienteService, nombre: &str, cedula: &str) -> Uuid {
        clientes
            .crear(CrearClienteRequest {
                nombre: Some(nombre.to_string()),
                cedula: Some(cedula.to_string()),
                telefono: None,
                email: None,
                direccion: None,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_metricas_con_coleccion_vacia() {
        let (_dir, dashboard, _, _) = setup(0).await;

        let metricas = dashboard.metricas().await.unwrap();
        assert_eq!(metricas.total_boletas, 0);
        assert_eq!(metricas.porcentaje_vendidas, 0.0);
        assert_eq!(metricas.ingreso_total, 0);
        assert!(metricas.top_compradores.is_empty());
        assert!(metricas.ventas_por_fecha.is_empty());
    }

    #[tokio::test]
    async fn test_porcentaje_e_ingreso() {
        let (_dir, dashboard, boletas, clientes) = setup(8).await;
        let id = cliente(&clientes, "Ana", "1").await;

        boletas.vender("0000", id).await.unwrap();
        boletas.vender("0001", id).await.unwrap();
        boletas.vender("0002", id).await.unwrap();

        let metricas = dashboard.metricas().await.unwrap();
        assert_eq!(metricas.vendidas, 3);
        assert_eq!(metricas.disponibles, 5);
        // 3/8 = 37.5%
        assert_eq!(metricas.porcentaje_vendidas, 37.5);
        assert_eq!(
            metricas.ingreso_total,
            3 * RifaConfig::default().precio_boleta
        );
        assert_eq!(metricas.total_clientes, 1);

        // Las ventas de hoy quedan agrupadas bajo una única fecha
        assert_eq!(metricas.ventas_por_fecha.len(), 1);
        assert_eq!(metricas.ventas_por_fecha.values().sum::<usize>(), 3);
    }

    #[tokio::test]
    async fn test_porcentaje_redondeado_a_dos_decimales() {
        let (_dir, dashboard, boletas, clientes) = setup(3).await;
        let id = cliente(&clientes, "Ana", "1").await;
        boletas.vender("0000", id).await.unwrap();

        let metricas = dashboard.metricas().await.unwrap();
        // 1/3 = 33.333...% -> 33.33
        assert_eq!(metricas.porcentaje_vendidas, 33.33);
    }

    #[tokio::test]
    async fn test_top_compradores_orden_estable() {
        let (_dir, dashboard, boletas, clientes) = setup(10).await;
        let ana = cliente(&clientes, "Ana", "1").await;
        let beto = cliente(&clientes, "Beto", "2").await;
        let carla = cliente(&clientes, "Carla", "3").await;

        // Ana aparece primero en la colección y empata con Carla
        boletas.vender("0000", ana).await.unwrap();
        boletas.vender("0001", carla).await.unwrap();
        boletas.vender("0002", beto).await.unwrap();
        boletas.vender("0003", beto).await.unwrap();
        boletas.vender("0004", carla).await.unwrap();
        boletas.vender("0005", ana).await.unwrap();
        boletas.vender("0006", beto).await.unwrap();

        let metricas = dashboard.metricas().await.unwrap();
        let nombres: Vec<&str> = metricas
            .top_compradores
            .iter()
            .map(|t| t.nombre.as_str())
            .collect();
        // Beto 3, luego Ana y Carla con 2: el empate conserva el orden de
        // primera aparición
        assert_eq!(nombres, vec!["Beto", "Ana", "Carla"]);
        assert_eq!(metricas.top_compradores[0].cantidad, 3);
    }

    #[tokio::test]
    async fn test_comprador_sin_registro_aparece_como_desconocido() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Store::open(dir.path()).await.unwrap());
        let boletas = BoletaService::new(store.clone());
        boletas.provisionar(5).await.unwrap();
        let clientes = ClienteService::new(store.clone());
        let dashboard = DashboardService::new(store.clone());

        let id = cliente(&clientes, "Fantasma", "9").await;
        boletas.vender("0000", id).await.unwrap();

        // Vaciar la colección de clientes por fuera del servicio deja la
        // referencia huérfana en la boleta (la cascada normal la evitaría)
        store.clientes().save(Vec::new()).await.unwrap();

        let metricas = dashboard.metricas().await.unwrap();
        assert_eq!(metricas.top_compradores.len(), 1);
        assert_eq!(metricas.top_compradores[0].nombre, "Desconocido");
        assert_eq!(metricas.top_compradores[0].cedula, "");
        assert_eq!(metricas.top_compradores[0].cantidad, 1);
    }
}
