use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// URL pública del servidor (para links en correos y auto-ping).
    /// Si falta, se usa la información de la conexión entrante.
    #[serde(default)]
    pub public_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            public_url: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml() -> anyhow::Result<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // Intentar leer el archivo de configuración; si no existe, usar
        // valores por defecto y variables de entorno
        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => toml::from_str(&config_str)
                .with_context(|| format!("Error al parsear el archivo {config_path}"))?,
            Err(e) if e.kind() == ErrorKind::NotFound => Config {
                server: ServerConfig::default(),
                storage: StorageConfig::default(),
            },
            Err(e) => {
                return Err(e).with_context(|| format!("No se pudo leer el archivo {config_path}"));
            }
        };

        // Las variables de entorno siempre tienen prioridad
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("PUBLIC_URL") {
            config.server.public_url = Some(v);
        }
        if let Ok(v) = env::var("DATA_DIR") {
            config.storage.data_dir = v;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toml() {
        let config: Config = toml::from_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [storage]
            data_dir = "/tmp/rifa"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.public_url, None);
        assert_eq!(config.storage.data_dir, "/tmp/rifa");
    }

    #[test]
    fn test_defaults() {
        let server = ServerConfig::default();
        assert_eq!(server.port, 3000);
        assert_eq!(StorageConfig::default().data_dir, "data");
    }
}
