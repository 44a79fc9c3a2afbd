use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    ActualizarClienteRequest, Cliente, ClienteConResumen, ClienteDetalle, ClienteQuery,
    CrearClienteRequest, EstadoBoleta, PaginationInfo, PaginationParams, paginar,
};
use crate::store::Store;
use crate::utils::validar_email;

/// Repositorio de clientes.
///
/// La cédula es la clave de negocio: única entre todos los clientes. Eliminar
/// un cliente libera primero todas sus boletas, porque el almacén no impone
/// integridad referencial por sí mismo.
#[derive(Clone)]
pub struct ClienteService {
    store: Arc<Store>,
}

impl ClienteService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    // ==================== Consultas ====================

    pub async fn get_por_id(&self, id: Uuid) -> AppResult<Option<Cliente>> {
        let clientes = self.store.clientes().load().await?;
        Ok(clientes.into_iter().find(|c| c.id == id))
    }

    pub async fn get_por_cedula(&self, cedula: &str) -> AppResult<Option<Cliente>> {
        let clientes = self.store.clientes().load().await?;
        Ok(clientes.into_iter().find(|c| c.cedula == cedula))
    }

    /// Búsqueda de texto libre sobre nombre, cédula, teléfono y email.
    pub async fn buscar(&self, query: &str) -> AppResult<Vec<Cliente>> {
        let q = query.to_lowercase();
        let clientes = self.store.clientes().load().await?;
        Ok(clientes
            .into_iter()
            .filter(|c| {
                c.nombre.to_lowercase().contains(&q)
                    || c.cedula.contains(&q)
                    || c.telefono.contains(&q)
                    || c.email.to_lowercase().contains(&q)
            })
            .collect())
    }

    /// Listado paginado, cada cliente con el resumen de sus boletas.
    pub async fn listar(
        &self,
        query: &ClienteQuery,
    ) -> AppResult<(Vec<ClienteConResumen>, PaginationInfo)> {
        let clientes = match query.search.as_deref().filter(|s| !s.is_empty()) {
            Some(search) => self.buscar(search).await?,
            None => self.store.clientes().load().await?,
        };

        let boletas = self.store.boletas().load().await?;
        let con_resumen: Vec<ClienteConResumen> = clientes
            .into_iter()
            .map(|cliente| {
                let numeros: Vec<String> = boletas
                    .iter()
                    .filter(|b| b.cliente_id == Some(cliente.id))
                    .map(|b| b.numero.clone())
                    .collect();
                ClienteConResumen {
                    cliente,
                    total_boletas: numeros.len(),
                    boletas_numeros: numeros,
                }
            })
            .collect();

        let params = PaginationParams::new(query.page, query.limit);
        Ok(paginar(&con_resumen, &params))
    }

    /// Cliente con sus boletas completas.
    pub async fn detalle(&self, id: Uuid) -> AppResult<ClienteDetalle> {
        let cliente = self
            .get_por_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Cliente no encontrado".to_string()))?;

        let boletas: Vec<_> = self
            .store
            .boletas()
            .load()
            .await?
            .into_iter()
            .filter(|b| b.cliente_id == Some(cliente.id))
            .collect();

        Ok(ClienteDetalle {
            total_boletas: boletas.len(),
            boletas,
            cliente,
        })
    }

    // ==================== Mutaciones ====================

    /// Registra un cliente nuevo. La cédula duplicada es un error de clave;
    /// el registro existente nunca se reemplaza.
    pub async fn crear(&self, request: CrearClienteRequest) -> AppResult<Cliente> {
        let nombre = request
            .nombre
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                AppError::ValidationError("Nombre y cédula son obligatorios".to_string())
            })?;
        let cedula = request
            .cedula
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                AppError::ValidationError("Nombre y cédula son obligatorios".to_string())
            })?;

        let email = request.email.unwrap_or_default();
        if !email.is_empty() {
            validar_email(&email)?;
        }

        let _guard = self.store.lock_escritura().await;

        if self.get_por_cedula(&cedula).await?.is_some() {
            return Err(AppError::DuplicateKey(
                "Ya existe un cliente con esa cédula".to_string(),
            ));
        }

        let now = Utc::now();
        let cliente = Cliente {
            id: Uuid::new_v4(),
            nombre,
            cedula,
            telefono: request.telefono.unwrap_or_default(),
            email,
            direccion: request.direccion.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        let mut clientes = self.store.clientes().load().await?;
        clientes.push(cliente.clone());
        self.store.clientes().save(clientes).await?;

        log::info!("Cliente registrado: {} ({})", cliente.nombre, cliente.cedula);
        Ok(cliente)
    }

    /// Actualiza en sitio; solo los campos presentes reemplazan a los guardados.
    pub async fn actualizar(
        &self,
        id: Uuid,
        request: ActualizarClienteRequest,
    ) -> AppResult<Cliente> {
        if let Some(email) = request.email.as_deref().filter(|s| !s.is_empty()) {
            validar_email(email)?;
        }

        let _guard = self.store.lock_escritura().await;

        let mut clientes = self.store.clientes().load().await?;
        let cliente = clientes
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::NotFound("Cliente no encontrado".to_string()))?;

        if let Some(nombre) = request.nombre {
            cliente.nombre = nombre;
        }
        if let Some(telefono) = request.telefono {
            cliente.telefono = telefono;
        }
        if let Some(email) = request.email {
            cliente.email = email;
        }
        if let Some(direccion) = request.direccion {
            cliente.direccion = direccion;
        }
        cliente.updated_at = Utc::now();
        let actualizado = cliente.clone();

        self.store.clientes().save(clientes).await?;
        Ok(actualizado)
    }

    /// Elimina un cliente, liberando antes todas sus boletas para preservar
    /// el invariante de propiedad. Devuelve cuántas boletas se liberaron.
    pub async fn eliminar(&self, id: Uuid) -> AppResult<usize> {
        let _guard = self.store.lock_escritura().await;

        let mut clientes = self.store.clientes().load().await?;
        let indice = clientes
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| AppError::NotFound("Cliente no encontrado".to_string()))?;

        let mut boletas = self.store.boletas().load().await?;
        let mut liberadas = 0;
        for boleta in boletas.iter_mut().filter(|b| b.cliente_id == Some(id)) {
            boleta.estado = EstadoBoleta::Disponible;
            boleta.cliente_id = None;
            boleta.fecha_venta = None;
            boleta.updated_at = Utc::now();
            liberadas += 1;
        }
        if liberadas > 0 {
            self.store.boletas().save(boletas).await?;
        }

        clientes.remove(indice);
        self.store.clientes().save(clientes).await?;

        log::info!("Cliente {id} eliminado, {liberadas} boletas liberadas");
        Ok(liberadas)
    }
}
