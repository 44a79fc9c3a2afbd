pub mod collection;

pub use collection::Collection;

use std::path::{Path, PathBuf};

use tokio::sync::{Mutex, MutexGuard};

use crate::error::AppResult;
use crate::models::{ActualizarConfigRequest, Boleta, Cliente, RifaConfig};

/// Almacén de datos respaldado por archivos JSON.
///
/// Posee las dos colecciones (boletas, clientes) y el documento de
/// configuración de la rifa. Se abre una vez en el arranque y se comparte
/// entre los servicios vía `Arc`; no hay estado global.
///
/// Las consultas son lecturas sobre el cache; toda mutación debe tomar antes
/// [`Store::lock_escritura`] para que el ciclo leer-modificar-guardar quede
/// serializado y dos ventas concurrentes del mismo numero no pasen ambas la
/// verificación de estado.
pub struct Store {
    boletas: Collection<Boleta>,
    clientes: Collection<Cliente>,
    config_path: PathBuf,
    escritura: Mutex<()>,
}

impl Store {
    /// Abre el almacén sobre un directorio de datos, creándolo si no existe.
    pub async fn open(dir: impl AsRef<Path>) -> AppResult<Self> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await?;

        Ok(Self {
            boletas: Collection::new(dir.join("boletas.json")),
            clientes: Collection::new(dir.join("clientes.json")),
            config_path: dir.join("config.json"),
            escritura: Mutex::new(()),
        })
    }

    pub fn boletas(&self) -> &Collection<Boleta> {
        &self.boletas
    }

    pub fn clientes(&self) -> &Collection<Cliente> {
        &self.clientes
    }

    /// Serializa las mutaciones de todo el almacén.
    pub async fn lock_escritura(&self) -> MutexGuard<'_, ()> {
        self.escritura.lock().await
    }

    /// Lee la configuración de la rifa, mezclando los defaults bajo lo
    /// guardado para que los campos nuevos siempre estén presentes.
    pub async fn get_config(&self) -> AppResult<RifaConfig> {
        if tokio::fs::try_exists(&self.config_path).await? {
            let raw = tokio::fs::read_to_string(&self.config_path).await?;
            let config: RifaConfig = serde_json::from_str(&raw)?;
            Ok(config)
        } else {
            let defaults = RifaConfig::default();
            let raw = serde_json::to_string_pretty(&defaults)?;
            tokio::fs::write(&self.config_path, raw).await?;
            Ok(defaults)
        }
    }

    /// Actualiza la configuración aplicando solo los campos presentes.
    pub async fn update_config(&self, cambios: ActualizarConfigRequest) -> AppResult<RifaConfig> {
        let _guard = self.escritura.lock().await;
        let mut config = self.get_config().await?;
        config.aplicar(cambios);
        let raw = serde_json::to_string_pretty(&config)?;
        tokio::fs::write(&self.config_path, raw).await?;
        Ok(config)
    }

    /// Descarta los caches en memoria; la próxima lectura vuelve al disco.
    /// Pensado para aislamiento en tests y para recuperar mutaciones externas.
    pub async fn clear_cache(&self) {
        self.boletas.clear_cache().await;
        self.clientes.clear_cache().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_config_se_crea_con_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).await.unwrap();

        let config = store.get_config().await.unwrap();
        assert_eq!(config, RifaConfig::default());
        assert!(dir.path().join("config.json").exists());
    }

    #[tokio::test]
    async fn test_update_config_parcial() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).await.unwrap();

        let actualizada = store
            .update_config(ActualizarConfigRequest {
                precio_boleta: Some(999),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(actualizada.precio_boleta, 999);
        assert_eq!(actualizada.nombre_rifa, RifaConfig::default().nombre_rifa);

        // Releer desde disco conserva el cambio y el resto de los campos
        let releida = store.get_config().await.unwrap();
        assert_eq!(releida.precio_boleta, 999);
        assert_eq!(releida.fecha_sorteo, RifaConfig::default().fecha_sorteo);
    }

    #[tokio::test]
    async fn test_config_antigua_gana_campos_nuevos() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(
            dir.path().join("config.json"),
            r#"{"nombreRifa": "Rifa Vieja"}"#,
        )
        .await
        .unwrap();

        let store = Store::open(dir.path()).await.unwrap();
        let config = store.get_config().await.unwrap();
        assert_eq!(config.nombre_rifa, "Rifa Vieja");
        assert_eq!(config.smtp_port, 587);
    }
}
