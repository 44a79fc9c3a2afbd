use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use crate::error::AppResult;

/// Colección de registros persistida en un archivo JSON, con cache en memoria.
///
/// `load` devuelve una copia del cache si existe; si no, inicializa el archivo
/// con una lista vacía, lo lee y lo cachea. `save` sobreescribe archivo y
/// cache bajo el mismo guard de escritura, así ningún lector del proceso ve
/// una escritura a medias. Datos malformados en disco se reportan como error
/// de parseo; no hay validación de esquema ni migraciones.
pub struct Collection<T> {
    path: PathBuf,
    cache: RwLock<Option<Vec<T>>>,
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            cache: RwLock::new(None),
        }
    }

    pub async fn load(&self) -> AppResult<Vec<T>> {
        if let Some(cached) = self.cache.read().await.as_ref() {
            return Ok(cached.clone());
        }

        let mut guard = self.cache.write().await;
        // Otro lector pudo llenar el cache mientras esperábamos el guard
        if let Some(cached) = guard.as_ref() {
            return Ok(cached.clone());
        }

        if !tokio::fs::try_exists(&self.path).await? {
            tokio::fs::write(&self.path, "[]").await?;
        }

        let raw = tokio::fs::read_to_string(&self.path).await?;
        let records: Vec<T> = serde_json::from_str(&raw)?;
        *guard = Some(records.clone());
        Ok(records)
    }

    pub async fn save(&self, records: Vec<T>) -> AppResult<()> {
        let raw = serde_json::to_string_pretty(&records)?;
        let mut guard = self.cache.write().await;
        tokio::fs::write(&self.path, raw).await?;
        *guard = Some(records);
        Ok(())
    }

    pub async fn clear_cache(&self) {
        *self.cache.write().await = None;
    }
}
