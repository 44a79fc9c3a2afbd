use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    Boleta, BoletaConCliente, BoletaQuery, BoletaStats, Cliente, EstadoBoleta, LoteError,
    LoteResultado, PaginationInfo, PaginationParams, paginar,
};
use crate::store::Store;
use crate::utils::{codigo_barras, formatear_numero};

/// Repositorio de boletas y máquina de estados de venta.
///
/// Las consultas son escaneos lineales sobre la colección en memoria, una
/// elección deliberada al tamaño objetivo (~10.000 boletas). Las transiciones
/// toman el lock de escritura del almacén antes de verificar el estado, así
/// dos ventas concurrentes del mismo numero no pueden pasar ambas la
/// verificación.
#[derive(Clone)]
pub struct BoletaService {
    store: Arc<Store>,
}

impl BoletaService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    // ==================== Consultas ====================

    pub async fn get_por_numero(&self, numero: &str) -> AppResult<Option<Boleta>> {
        let boletas = self.store.boletas().load().await?;
        Ok(boletas.into_iter().find(|b| b.numero == numero))
    }

    pub async fn get_por_id(&self, id: Uuid) -> AppResult<Option<Boleta>> {
        let boletas = self.store.boletas().load().await?;
        Ok(boletas.into_iter().find(|b| b.id == id))
    }

    pub async fn get_por_estado(&self, estado: EstadoBoleta) -> AppResult<Vec<Boleta>> {
        let boletas = self.store.boletas().load().await?;
        Ok(boletas.into_iter().filter(|b| b.estado == estado).collect())
    }

    pub async fn get_por_cliente(&self, cliente_id: Uuid) -> AppResult<Vec<Boleta>> {
        let boletas = self.store.boletas().load().await?;
        Ok(boletas
            .into_iter()
            .filter(|b| b.cliente_id == Some(cliente_id))
            .collect())
    }

    /// Boleta por numero junto con los datos de su dueño, si tiene.
    pub async fn obtener_con_cliente(&self, numero: &str) -> AppResult<BoletaConCliente> {
        let boleta = self
            .get_por_numero(numero)
            .await?
            .ok_or_else(|| AppError::NotFound("Boleta no encontrada".to_string()))?;

        let cliente = match boleta.cliente_id {
            Some(cliente_id) => {
                let clientes = self.store.clientes().load().await?;
                clientes.into_iter().find(|c| c.id == cliente_id)
            }
            None => None,
        };

        Ok(BoletaConCliente { boleta, cliente })
    }

    /// Listado con filtros por estado, cliente y busqueda por numero.
    /// Un filtro vacío (`?estado=`) cuenta como ausente.
    pub async fn listar(&self, query: &BoletaQuery) -> AppResult<(Vec<Boleta>, PaginationInfo)> {
        let mut boletas = self.store.boletas().load().await?;

        if let Some(estado) = query.estado.as_deref().filter(|s| !s.is_empty()) {
            boletas.retain(|b| b.estado.to_string() == estado);
        }
        if let Some(cliente_id) = query.cliente_id.as_deref().filter(|s| !s.is_empty()) {
            boletas.retain(|b| {
                b.cliente_id
                    .map(|id| id.to_string() == cliente_id)
                    .unwrap_or(false)
            });
        }
        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            boletas.retain(|b| b.numero.contains(search));
        }

        let params = PaginationParams::new(query.page, query.limit);
        Ok(paginar(&boletas, &params))
    }

    /// Conteo por estado; tres pasadas lineales.
    pub async fn count(&self) -> AppResult<BoletaStats> {
        let boletas = self.store.boletas().load().await?;
        Ok(BoletaStats {
            total: boletas.len(),
            vendidas: boletas
                .iter()
                .filter(|b| b.estado == EstadoBoleta::Vendida)
                .count(),
            disponibles: boletas
                .iter()
                .filter(|b| b.estado == EstadoBoleta::Disponible)
                .count(),
            reservadas: boletas
                .iter()
                .filter(|b| b.estado == EstadoBoleta::Reservada)
                .count(),
        })
    }

    // ==================== Mutaciones ====================

    /// Aplica `cambios` a la boleta con ese numero y sella `updatedAt`.
    /// Devuelve `None` si el numero no existe.
    pub async fn update_por_numero(
        &self,
        numero: &str,
        cambios: impl FnOnce(&mut Boleta),
    ) -> AppResult<Option<Boleta>> {
        let mut boletas = self.store.boletas().load().await?;
        let Some(boleta) = boletas.iter_mut().find(|b| b.numero == numero) else {
            return Ok(None);
        };

        cambios(boleta);
        boleta.updated_at = Utc::now();
        let actualizada = boleta.clone();

        self.store.boletas().save(boletas).await?;
        Ok(Some(actualizada))
    }

    /// Reserva una boleta, opcionalmente a nombre de un cliente.
    /// Reservar una boleta ya reservada solo sobreescribe el dueño.
    pub async fn reservar(&self, numero: &str, cliente_id: Option<Uuid>) -> AppResult<Boleta> {
        let _guard = self.store.lock_escritura().await;

        let boleta = self
            .get_por_numero(numero)
            .await?
            .ok_or_else(|| AppError::NotFound("Boleta no encontrada".to_string()))?;
        if boleta.estado == EstadoBoleta::Vendida {
            return Err(AppError::InvalidTransition(
                "La boleta ya fue vendida".to_string(),
            ));
        }

        let actualizada = self
            .update_por_numero(numero, |b| {
                b.estado = EstadoBoleta::Reservada;
                b.cliente_id = cliente_id;
            })
            .await?
            .ok_or_else(|| AppError::NotFound("Boleta no encontrada".to_string()))?;

        log::info!("Boleta {numero} reservada");
        Ok(actualizada)
    }

    /// Vende una boleta a un cliente. Es el único cambio de estado que
    /// representa una compra completada; la notificación por correo ocurre
    /// después, fuera de esta transición.
    pub async fn vender(&self, numero: &str, cliente_id: Uuid) -> AppResult<(Boleta, Cliente)> {
        let _guard = self.store.lock_escritura().await;

        let boleta = self
            .get_por_numero(numero)
            .await?
            .ok_or_else(|| AppError::NotFound("Boleta no encontrada".to_string()))?;
        if boleta.estado == EstadoBoleta::Vendida {
            return Err(AppError::InvalidTransition(
                "La boleta ya fue vendida".to_string(),
            ));
        }

        let cliente = self.exigir_cliente(cliente_id).await?;

        let actualizada = self
            .update_por_numero(numero, |b| {
                b.estado = EstadoBoleta::Vendida;
                b.cliente_id = Some(cliente_id);
                b.fecha_venta = Some(Utc::now());
            })
            .await?
            .ok_or_else(|| AppError::NotFound("Boleta no encontrada".to_string()))?;

        log::info!("Boleta {numero} vendida al cliente {cliente_id}");
        Ok((actualizada, cliente))
    }

    /// Venta por lote: cada numero se procesa de forma independiente y los
    /// fallos por boleta se acumulan en `errores` sin abortar el resto.
    pub async fn vender_lote(
        &self,
        numeros: &[String],
        cliente_id: Uuid,
    ) -> AppResult<(LoteResultado, Cliente)> {
        let _guard = self.store.lock_escritura().await;

        // El cliente ausente sí aborta el lote completo
        let cliente = self.exigir_cliente(cliente_id).await?;

        let mut vendidas = Vec::new();
        let mut errores = Vec::new();

        for numero in numeros {
            let boleta = match self.get_por_numero(numero).await? {
                Some(b) => b,
                None => {
                    errores.push(LoteError {
                        numero: numero.clone(),
                        error: "Boleta no encontrada".to_string(),
                    });
                    continue;
                }
            };
            if boleta.estado == EstadoBoleta::Vendida {
                errores.push(LoteError {
                    numero: numero.clone(),
                    error: "Ya vendida".to_string(),
                });
                continue;
            }

            let actualizada = self
                .update_por_numero(numero, |b| {
                    b.estado = EstadoBoleta::Vendida;
                    b.cliente_id = Some(cliente_id);
                    b.fecha_venta = Some(Utc::now());
                })
                .await?
                .ok_or_else(|| AppError::NotFound("Boleta no encontrada".to_string()))?;
            vendidas.push(actualizada);
        }

        log::info!(
            "Lote vendido al cliente {cliente_id}: {} vendidas, {} errores",
            vendidas.len(),
            errores.len()
        );
        Ok((LoteResultado { vendidas, errores }, cliente))
    }

    /// Devuelve una boleta a `disponible` sin condiciones, limpiando dueño y
    /// fecha de venta. Liberar una boleta ya disponible solo sella updatedAt.
    pub async fn liberar(&self, numero: &str) -> AppResult<Boleta> {
        let _guard = self.store.lock_escritura().await;

        let actualizada = self
            .update_por_numero(numero, |b| {
                b.estado = EstadoBoleta::Disponible;
                b.cliente_id = None;
                b.fecha_venta = None;
            })
            .await?
            .ok_or_else(|| AppError::NotFound("Boleta no encontrada".to_string()))?;

        log::info!("Boleta {numero} liberada");
        Ok(actualizada)
    }

    /// Genera el rango completo de boletas en el primer arranque.
    /// Si la colección ya tiene registros no hace nada.
    pub async fn provisionar(&self, total: u32) -> AppResult<usize> {
        let _guard = self.store.lock_escritura().await;

        let existentes = self.store.boletas().load().await?;
        if !existentes.is_empty() {
            return Ok(0);
        }

        let now = Utc::now();
        let boletas: Vec<Boleta> = (0..total)
            .map(|i| {
                let numero = formatear_numero(i);
                Boleta {
                    id: Uuid::new_v4(),
                    codigo_barras: codigo_barras(&numero),
                    numero,
                    estado: EstadoBoleta::Disponible,
                    cliente_id: None,
                    fecha_venta: None,
                    vendido_por: None,
                    notas: String::new(),
                    created_at: now,
                    updated_at: now,
                }
            })
            .collect();

        self.store.boletas().save(boletas).await?;
        log::info!("{total} boletas provisionadas");
        Ok(total as usize)
    }

    async fn exigir_cliente(&self, cliente_id: Uuid) -> AppResult<Cliente> {
        let clientes = self.store.clientes().load().await?;
        clientes
            .into_iter()
            .find(|c| c.id == cliente_id)
            .ok_or_else(|| AppError::NotFound("Cliente no encontrado".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CrearClienteRequest;
    use crate::services::ClienteService;
    use tempfile::TempDir;

    async fn setup(total: u32) -> (TempDir, BoletaService, ClienteService) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Store::open(dir.path()).await.unwrap());
        let boletas = BoletaService::new(store.clone());
        boletas.provisionar(total).await.unwrap();
        let clientes = ClienteService::new(store);
        (dir, boletas, clientes)
    }

    async fn crear_cliente(clientes: &ClienteService, cedula: &str) -> Cliente {
        clientes
            .crear(CrearClienteRequest {
                nombre: Some("Ana María Castaño".to_string()),
                cedula: Some(cedula.to_string()),
                telefono: Some("3001234567".to_string()),
                email: None,
                direccion: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_provisionar_genera_rango_completo() {
        let (_dir, boletas, _) = setup(10).await;

        let todas = boletas
            .listar(&BoletaQuery::default())
            .await
            .unwrap()
            .0;
        assert_eq!(todas.len(), 10);
        assert_eq!(todas[0].numero, "0000");
        assert_eq!(todas[9].numero, "0009");
        assert_eq!(todas[7].codigo_barras, "RIFA-0007");
        assert!(todas.iter().all(|b| b.estado == EstadoBoleta::Disponible));

        // Un segundo arranque no debe regenerar nada
        assert_eq!(boletas.provisionar(10).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_vender_cumple_invariantes() {
        let (_dir, boletas, clientes) = setup(5).await;
        let cliente = crear_cliente(&clientes, "100200300").await;

        let (vendida, duenio) = boletas.vender("0003", cliente.id).await.unwrap();
        assert_eq!(vendida.estado, EstadoBoleta::Vendida);
        assert_eq!(vendida.cliente_id, Some(cliente.id));
        assert!(vendida.fecha_venta.is_some());
        assert_eq!(duenio.id, cliente.id);
    }

    #[tokio::test]
    async fn test_vender_boleta_inexistente() {
        let (_dir, boletas, clientes) = setup(5).await;
        let cliente = crear_cliente(&clientes, "100200300").await;

        let err = boletas.vender("9999", cliente.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_vender_sin_cliente_registrado() {
        let (_dir, boletas, _) = setup(5).await;

        let err = boletas.vender("0001", Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        // La boleta no debe haber cambiado
        let boleta = boletas.get_por_numero("0001").await.unwrap().unwrap();
        assert_eq!(boleta.estado, EstadoBoleta::Disponible);
    }

    #[tokio::test]
    async fn test_vender_dos_veces_falla_con_cualquier_duenio() {
        let (_dir, boletas, clientes) = setup(5).await;
        let primero = crear_cliente(&clientes, "111").await;
        let segundo = crear_cliente(&clientes, "222").await;

        boletas.vender("0002", primero.id).await.unwrap();

        let err = boletas.vender("0002", segundo.id).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
        let err = boletas.vender("0002", primero.id).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));

        // El dueño original se conserva
        let boleta = boletas.get_por_numero("0002").await.unwrap().unwrap();
        assert_eq!(boleta.cliente_id, Some(primero.id));
    }

    #[tokio::test]
    async fn test_reservar_sobreescribe_duenio() {
        let (_dir, boletas, clientes) = setup(5).await;
        let primero = crear_cliente(&clientes, "111").await;
        let segundo = crear_cliente(&clientes, "222").await;

        let reservada = boletas.reservar("0004", Some(primero.id)).await.unwrap();
        assert_eq!(reservada.estado, EstadoBoleta::Reservada);
        assert_eq!(reservada.cliente_id, Some(primero.id));

        let reservada = boletas.reservar("0004", Some(segundo.id)).await.unwrap();
        assert_eq!(reservada.cliente_id, Some(segundo.id));

        // Reservar sin cliente también es válido
        let reservada = boletas.reservar("0004", None).await.unwrap();
        assert_eq!(reservada.cliente_id, None);
    }

    #[tokio::test]
    async fn test_reservar_vendida_falla() {
        let (_dir, boletas, clientes) = setup(5).await;
        let cliente = crear_cliente(&clientes, "111").await;

        boletas.vender("0000", cliente.id).await.unwrap();
        let err = boletas.reservar("0000", None).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn test_liberar_vuelve_al_estado_inicial() {
        let (_dir, boletas, clientes) = setup(10).await;
        let cliente = crear_cliente(&clientes, "111").await;

        let inicial = boletas.get_por_numero("0005").await.unwrap().unwrap();

        boletas.reservar("0005", Some(cliente.id)).await.unwrap();
        let liberada = boletas.liberar("0005").await.unwrap();

        // Igual a la inicial salvo updatedAt
        assert_eq!(liberada.id, inicial.id);
        assert_eq!(liberada.numero, inicial.numero);
        assert_eq!(liberada.codigo_barras, inicial.codigo_barras);
        assert_eq!(liberada.estado, EstadoBoleta::Disponible);
        assert_eq!(liberada.cliente_id, None);
        assert_eq!(liberada.fecha_venta, None);
        assert_eq!(liberada.notas, inicial.notas);
        assert_eq!(liberada.created_at, inicial.created_at);
    }

    #[tokio::test]
    async fn test_liberar_disponible_es_noop_con_sello() {
        let (_dir, boletas, _) = setup(5).await;

        let antes = boletas.get_por_numero("0001").await.unwrap().unwrap();
        let liberada = boletas.liberar("0001").await.unwrap();
        assert_eq!(liberada.estado, EstadoBoleta::Disponible);
        assert!(liberada.updated_at >= antes.updated_at);

        let err = boletas.liberar("5555").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_vender_lote_con_fallos_parciales() {
        let (_dir, boletas, clientes) = setup(5).await;
        let cliente = crear_cliente(&clientes, "111").await;

        // "0001" ya vendida, "9999" no existe, "0002" disponible
        boletas.vender("0001", cliente.id).await.unwrap();

        let numeros = vec![
            "0001".to_string(),
            "0002".to_string(),
            "9999".to_string(),
        ];
        let (resultado, _) = boletas.vender_lote(&numeros, cliente.id).await.unwrap();

        assert_eq!(resultado.vendidas.len(), 1);
        assert_eq!(resultado.vendidas[0].numero, "0002");
        assert_eq!(resultado.vendidas[0].estado, EstadoBoleta::Vendida);

        assert_eq!(resultado.errores.len(), 2);
        assert_eq!(resultado.errores[0].numero, "0001");
        assert_eq!(resultado.errores[0].error, "Ya vendida");
        assert_eq!(resultado.errores[1].numero, "9999");
        assert_eq!(resultado.errores[1].error, "Boleta no encontrada");
    }

    #[tokio::test]
    async fn test_vender_lote_sin_cliente_aborta() {
        let (_dir, boletas, _) = setup(5).await;

        let err = boletas
            .vender_lote(&["0001".to_string()], Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_count_por_estado() {
        let (_dir, boletas, clientes) = setup(6).await;
        let cliente = crear_cliente(&clientes, "111").await;

        boletas.vender("0000", cliente.id).await.unwrap();
        boletas.vender("0001", cliente.id).await.unwrap();
        boletas.reservar("0002", None).await.unwrap();

        let stats = boletas.count().await.unwrap();
        assert_eq!(
            stats,
            BoletaStats {
                total: 6,
                vendidas: 2,
                disponibles: 3,
                reservadas: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_listar_con_filtros_y_paginacion() {
        let (_dir, boletas, clientes) = setup(20).await;
        let cliente = crear_cliente(&clientes, "111").await;

        boletas.vender("0003", cliente.id).await.unwrap();
        boletas.vender("0007", cliente.id).await.unwrap();

        let (vendidas, _) = boletas
            .listar(&BoletaQuery {
                estado: Some("vendida".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(vendidas.len(), 2);

        let (del_cliente, _) = boletas
            .listar(&BoletaQuery {
                cliente_id: Some(cliente.id.to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(del_cliente.len(), 2);

        // Filtro vacío equivale a ausente
        let (todas, info) = boletas
            .listar(&BoletaQuery {
                estado: Some(String::new()),
                page: Some(2),
                limit: Some(8),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(todas.len(), 8);
        assert_eq!(todas[0].numero, "0008");
        assert_eq!(info.total, 20);
        assert_eq!(info.total_pages, 3);

        let (buscadas, _) = boletas
            .listar(&BoletaQuery {
                search: Some("001".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        // 0010..0019 más 0001
        assert_eq!(buscadas.len(), 11);
    }

    #[tokio::test]
    async fn test_get_por_estado_y_por_cliente() {
        let (_dir, boletas, clientes) = setup(5).await;
        let cliente = crear_cliente(&clientes, "111").await;

        boletas.vender("0000", cliente.id).await.unwrap();
        boletas.reservar("0001", Some(cliente.id)).await.unwrap();

        let vendidas = boletas.get_por_estado(EstadoBoleta::Vendida).await.unwrap();
        assert_eq!(vendidas.len(), 1);

        let del_cliente = boletas.get_por_cliente(cliente.id).await.unwrap();
        assert_eq!(del_cliente.len(), 2);

        let boleta = boletas.get_por_id(vendidas[0].id).await.unwrap().unwrap();
        assert_eq!(boleta.numero, "0000");
    }
}
