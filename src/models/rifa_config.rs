use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Configuración de la rifa, persistida como documento único.
///
/// Al leer siempre se mezclan los valores por defecto bajo lo guardado
/// (`#[serde(default)]`), de modo que los campos nuevos existen aunque el
/// archivo provenga de una versión anterior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RifaConfig {
    pub nombre_rifa: String,
    pub descripcion: String,
    pub precio_boleta: i64,
    pub total_boletas: u32,
    pub fecha_sorteo: String,
    pub premio: String,
    pub organizador: String,
    pub telefono: String,
    pub logo: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_pass: String,
}

impl Default for RifaConfig {
    fn default() -> Self {
        Self {
            nombre_rifa: "Rifas El Gran Camión".to_string(),
            descripcion: "KIA Picanto 0KM 2026 - Juega el 20 de junio con la Lotería de Boyacá"
                .to_string(),
            precio_boleta: 120_000,
            total_boletas: 10_000,
            fecha_sorteo: "2026-06-20".to_string(),
            premio: "KIA Picanto 0KM 2026".to_string(),
            organizador: "Inversiones Castaño S.A.S".to_string(),
            telefono: "3217706789".to_string(),
            logo: "/img/kia.jpg".to_string(),
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_user: String::new(),
            smtp_pass: String::new(),
        }
    }
}

impl RifaConfig {
    /// Indica si hay credenciales SMTP suficientes para enviar correos.
    pub fn smtp_configurado(&self) -> bool {
        !self.smtp_host.is_empty() && !self.smtp_user.is_empty() && !self.smtp_pass.is_empty()
    }
}

/// Actualización parcial de la configuración: solo los campos presentes
/// reemplazan a los guardados.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActualizarConfigRequest {
    pub nombre_rifa: Option<String>,
    pub descripcion: Option<String>,
    pub precio_boleta: Option<i64>,
    pub total_boletas: Option<u32>,
    pub fecha_sorteo: Option<String>,
    pub premio: Option<String>,
    pub organizador: Option<String>,
    pub telefono: Option<String>,
    pub logo: Option<String>,
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_user: Option<String>,
    pub smtp_pass: Option<String>,
}

impl RifaConfig {
    /// Aplica una actualización parcial sobre la configuración actual.
    pub fn aplicar(&mut self, cambios: ActualizarConfigRequest) {
        if let Some(v) = cambios.nombre_rifa {
            self.nombre_rifa = v;
        }
        if let Some(v) = cambios.descripcion {
            self.descripcion = v;
        }
        if let Some(v) = cambios.precio_boleta {
            self.precio_boleta = v;
        }
        if let Some(v) = cambios.total_boletas {
            self.total_boletas = v;
        }
        if let Some(v) = cambios.fecha_sorteo {
            self.fecha_sorteo = v;
        }
        if let Some(v) = cambios.premio {
            self.premio = v;
        }
        if let Some(v) = cambios.organizador {
            self.organizador = v;
        }
        if let Some(v) = cambios.telefono {
            self.telefono = v;
        }
        if let Some(v) = cambios.logo {
            self.logo = v;
        }
        if let Some(v) = cambios.smtp_host {
            self.smtp_host = v;
        }
        if let Some(v) = cambios.smtp_port {
            self.smtp_port = v;
        }
        if let Some(v) = cambios.smtp_user {
            self.smtp_user = v;
        }
        if let Some(v) = cambios.smtp_pass {
            self.smtp_pass = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_se_mezclan_con_lo_guardado() {
        // Un archivo antiguo sin los campos SMTP debe cargar con los defaults
        let config: RifaConfig =
            serde_json::from_str(r#"{"nombreRifa": "Mi Rifa", "precioBoleta": 500}"#).unwrap();
        assert_eq!(config.nombre_rifa, "Mi Rifa");
        assert_eq!(config.precio_boleta, 500);
        assert_eq!(config.smtp_port, 587);
        assert_eq!(config.total_boletas, 10_000);
    }

    #[test]
    fn test_aplicar_actualizacion_parcial() {
        let mut config = RifaConfig::default();
        let nombre_original = config.nombre_rifa.clone();
        config.aplicar(ActualizarConfigRequest {
            precio_boleta: Some(999),
            ..Default::default()
        });
        assert_eq!(config.precio_boleta, 999);
        assert_eq!(config.nombre_rifa, nombre_original);
    }

    #[test]
    fn test_smtp_configurado() {
        let mut config = RifaConfig::default();
        assert!(!config.smtp_configurado());
        config.smtp_host = "smtp.example.com".to_string();
        config.smtp_user = "user".to_string();
        config.smtp_pass = "pass".to_string();
        assert!(config.smtp_configurado());
    }
}
