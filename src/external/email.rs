use std::sync::Arc;
use std::time::Duration;

use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Boleta, Cliente, RifaConfig};
use crate::store::Store;
use crate::utils::{formatear_cop, formatear_fecha_larga, qr_data_url};

/// Tiempo máximo de espera por el servidor SMTP. La transición de venta ya
/// está confirmada cuando se intenta el envío, así que un servidor colgado
/// no puede retener la respuesta indefinidamente.
const TIMEOUT_ENVIO: Duration = Duration::from_secs(10);

/// Resultado del envío de una notificación. Nunca se propaga como error de
/// la petición: acompaña la respuesta de una transición ya confirmada.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmailResult {
    pub success: bool,
    pub message: String,
}

impl EmailResult {
    fn fallo(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }

    fn enviado(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Envío de boletas por correo al cliente.
///
/// El transporte se construye en cada envío con la configuración SMTP
/// guardada, así los cambios hechos desde el dashboard aplican sin reiniciar.
#[derive(Clone)]
pub struct EmailService {
    store: Arc<Store>,
}

impl EmailService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Envía una boleta comprada al correo del cliente.
    pub async fn enviar_boleta(
        &self,
        boleta: &Boleta,
        cliente: &Cliente,
        base_url: &str,
    ) -> EmailResult {
        if cliente.email.is_empty() {
            return EmailResult::fallo("El cliente no tiene email registrado");
        }

        let config = match self.store.get_config().await {
            Ok(config) => config,
            Err(e) => return EmailResult::fallo(format!("No se pudo leer la configuración: {e}")),
        };
        if !config.smtp_configurado() {
            return EmailResult::fallo(
                "SMTP no configurado. Configure el correo en Configuración.",
            );
        }

        let qr_url = format!("{base_url}/boleta/{}", boleta.numero);
        let qr = match qr_data_url(&qr_url) {
            Ok(qr) => qr,
            Err(e) => return EmailResult::fallo(format!("No se pudo generar el QR: {e}")),
        };

        let html = plantilla_boleta(&config, boleta, cliente, &qr_url, &qr);
        let asunto = format!(
            "🎫 ¡Tu Boleta #{} - {}!",
            boleta.numero, config.nombre_rifa
        );

        let resultado = self.enviar(&config, &cliente.email, &asunto, html).await;
        if resultado.success {
            log::info!(
                "Email enviado a {} - Boleta #{}",
                cliente.email,
                boleta.numero
            );
        } else {
            log::error!(
                "Error enviando email a {}: {}",
                cliente.email,
                resultado.message
            );
        }
        resultado
    }

    /// Envía varias boletas al mismo cliente en un solo correo.
    pub async fn enviar_lote(
        &self,
        boletas: &[Boleta],
        cliente: &Cliente,
        base_url: &str,
    ) -> EmailResult {
        if cliente.email.is_empty() {
            return EmailResult::fallo("El cliente no tiene email registrado");
        }
        if boletas.is_empty() {
            return EmailResult::fallo("No enviado");
        }

        let config = match self.store.get_config().await {
            Ok(config) => config,
            Err(e) => return EmailResult::fallo(format!("No se pudo leer la configuración: {e}")),
        };
        if !config.smtp_configurado() {
            return EmailResult::fallo("SMTP no configurado");
        }

        let html = match plantilla_lote(&config, boletas, cliente, base_url) {
            Ok(html) => html,
            Err(message) => return EmailResult::fallo(message),
        };

        let numeros: Vec<String> = boletas.iter().map(|b| format!("#{}", b.numero)).collect();
        let asunto = format!(
            "🎫 Tus {} Boleta(s) {} - {}",
            boletas.len(),
            numeros.join(", "),
            config.nombre_rifa
        );

        let resultado = self.enviar(&config, &cliente.email, &asunto, html).await;
        if resultado.success {
            log::info!(
                "Email de lote enviado a {} - {} boletas",
                cliente.email,
                boletas.len()
            );
        } else {
            log::error!(
                "Error enviando email de lote a {}: {}",
                cliente.email,
                resultado.message
            );
        }
        resultado
    }

    /// Prueba la conexión con el servidor SMTP configurado.
    pub async fn test_conexion(&self) -> EmailResult {
        let config = match self.store.get_config().await {
            Ok(config) => config,
            Err(e) => return EmailResult::fallo(format!("No se pudo leer la configuración: {e}")),
        };
        if !config.smtp_configurado() {
            return EmailResult::fallo("SMTP no configurado");
        }

        let transporte = match construir_transporte(&config) {
            Ok(t) => t,
            Err(message) => return EmailResult::fallo(message),
        };

        match tokio::time::timeout(TIMEOUT_ENVIO, transporte.test_connection()).await {
            Ok(Ok(true)) => EmailResult::enviado("Conexión SMTP exitosa"),
            Ok(Ok(false)) => EmailResult::fallo("El servidor SMTP rechazó la conexión"),
            Ok(Err(e)) => EmailResult::fallo(format!("Error de conexión: {e}")),
            Err(_) => EmailResult::fallo("Tiempo de espera agotado conectando al servidor SMTP"),
        }
    }

    async fn enviar(
        &self,
        config: &RifaConfig,
        destinatario: &str,
        asunto: &str,
        html: String,
    ) -> EmailResult {
        let remitente: Address = match config.smtp_user.parse() {
            Ok(address) => address,
            Err(e) => return EmailResult::fallo(format!("Remitente SMTP inválido: {e}")),
        };
        let destino: Address = match destinatario.parse() {
            Ok(address) => address,
            Err(e) => return EmailResult::fallo(format!("Email del cliente inválido: {e}")),
        };

        let mensaje = match Message::builder()
            .from(Mailbox::new(Some(config.nombre_rifa.clone()), remitente))
            .to(Mailbox::new(Some(cliente_display(destinatario)), destino))
            .subject(asunto)
            .header(ContentType::TEXT_HTML)
            .body(html)
        {
            Ok(mensaje) => mensaje,
            Err(e) => return EmailResult::fallo(format!("No se pudo construir el correo: {e}")),
        };

        let transporte = match construir_transporte(config) {
            Ok(t) => t,
            Err(message) => return EmailResult::fallo(message),
        };

        match tokio::time::timeout(TIMEOUT_ENVIO, transporte.send(mensaje)).await {
            Ok(Ok(_)) => {
                EmailResult::enviado(format!("Correo enviado exitosamente a {destinatario}"))
            }
            Ok(Err(e)) => EmailResult::fallo(format!("Error enviando correo: {e}")),
            Err(_) => EmailResult::fallo("Tiempo de espera agotado enviando el correo"),
        }
    }
}

fn cliente_display(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

fn construir_transporte(
    config: &RifaConfig,
) -> Result<AsyncSmtpTransport<Tokio1Executor>, String> {
    let credenciales = Credentials::new(config.smtp_user.clone(), config.smtp_pass.clone());

    // Puerto 465: TLS implícito; cualquier otro: STARTTLS
    let builder = if config.smtp_port == 465 {
        AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
    }
    .map_err(|e| format!("Error de transporte SMTP: {e}"))?;

    Ok(builder
        .port(config.smtp_port)
        .credentials(credenciales)
        .build())
}

fn plantilla_boleta(
    config: &RifaConfig,
    boleta: &Boleta,
    cliente: &Cliente,
    qr_url: &str,
    qr_data_url: &str,
) -> String {
    let precio = formatear_cop(config.precio_boleta);
    let fecha_sorteo = if config.fecha_sorteo.is_empty() {
        "Por definir".to_string()
    } else {
        formatear_fecha_larga(&config.fecha_sorteo)
    };
    let fecha_compra = boleta
        .fecha_venta
        .map(|f| f.format("%d/%m/%Y %H:%M").to_string())
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><meta name="viewport" content="width=device-width, initial-scale=1.0"></head>
<body style="margin:0; padding:0; background-color:#f5f6fa; font-family:'Segoe UI', Arial, sans-serif;">
  <table width="100%" cellpadding="0" cellspacing="0" style="background-color:#f5f6fa; padding:30px 0;">
    <tr><td align="center">
      <table width="500" cellpadding="0" cellspacing="0" style="background:#ffffff; border-radius:16px; overflow:hidden;">
        <tr>
          <td style="background:linear-gradient(135deg,#6c5ce7,#a29bfe); padding:30px; text-align:center; color:white;">
            <h1 style="margin:0; font-size:28px; letter-spacing:2px;">{nombre_rifa}</h1>
            <p style="margin:8px 0 0; opacity:0.9; font-size:14px;">{descripcion}</p>
            <p style="margin:10px 0 0; font-size:16px; font-weight:700;">Premio: {premio}</p>
          </td>
        </tr>
        <tr>
          <td style="text-align:center; padding:24px; background:#f8f9ff;">
            <p style="margin:0 0 4px; color:#636e72; font-size:12px; text-transform:uppercase; letter-spacing:2px;">Número de Boleta</p>
            <h2 style="margin:0; font-size:48px; font-weight:900; color:#6c5ce7; letter-spacing:8px;">#{numero}</h2>
          </td>
        </tr>
        <tr>
          <td style="padding:24px;">
            <table width="100%" cellpadding="8" cellspacing="0">
              <tr>
                <td style="color:#636e72; font-size:14px; border-bottom:1px solid #eee;">Código</td>
                <td style="font-weight:600; font-size:14px; text-align:right; border-bottom:1px solid #eee; font-family:monospace;">{codigo_barras}</td>
              </tr>
              <tr>
                <td style="color:#636e72; font-size:14px; border-bottom:1px solid #eee;">Valor</td>
                <td style="font-weight:600; font-size:14px; text-align:right; border-bottom:1px solid #eee;">{precio}</td>
              </tr>
              <tr>
                <td style="color:#636e72; font-size:14px; border-bottom:1px solid #eee;">Fecha Sorteo</td>
                <td style="font-weight:600; font-size:14px; text-align:right; border-bottom:1px solid #eee;">{fecha_sorteo}</td>
              </tr>
              <tr>
                <td style="color:#636e72; font-size:14px;">Fecha Compra</td>
                <td style="font-weight:600; font-size:14px; text-align:right;">{fecha_compra}</td>
              </tr>
            </table>
          </td>
        </tr>
        <tr>
          <td style="padding:0 24px;">
            <div style="background:#f0f0ff; border-radius:12px; padding:16px;">
              <h3 style="margin:0 0 8px; color:#6c5ce7; font-size:14px;">Datos del Comprador</h3>
              <p style="margin:2px 0; font-size:14px;"><strong>{cliente_nombre}</strong></p>
              <p style="margin:2px 0; font-size:13px; color:#636e72;">CC: {cliente_cedula}</p>
            </div>
          </td>
        </tr>
        <tr>
          <td style="text-align:center; padding:24px;">
            <p style="margin:0 0 8px; color:#636e72; font-size:12px;">Escanea el QR para ver tu boleta</p>
            <img src="{qr_data_url}" alt="QR" width="160" height="160" style="border:2px solid #eee; border-radius:8px;">
            <p style="margin:8px 0 0; font-size:11px;"><a href="{qr_url}" style="color:#6c5ce7; text-decoration:none;">{qr_url}</a></p>
          </td>
        </tr>
        <tr>
          <td style="background:#f8f9fa; padding:16px 24px; text-align:center; border-top:1px solid #eee;">
            <p style="margin:0; font-size:12px; color:#636e72;">Organiza: <strong>{organizador}</strong> | Tel: {telefono}</p>
            <p style="margin:6px 0 0; font-size:11px; color:#a0a0a0;">Conserve este correo como comprobante de su compra.</p>
          </td>
        </tr>
      </table>
    </td></tr>
  </table>
</body>
</html>"#,
        nombre_rifa = config.nombre_rifa,
        descripcion = config.descripcion,
        premio = config.premio,
        numero = boleta.numero,
        codigo_barras = boleta.codigo_barras,
        precio = precio,
        fecha_sorteo = fecha_sorteo,
        fecha_compra = fecha_compra,
        cliente_nombre = cliente.nombre,
        cliente_cedula = cliente.cedula,
        qr_data_url = qr_data_url,
        qr_url = qr_url,
        organizador = config.organizador,
        telefono = config.telefono,
    )
}

fn plantilla_lote(
    config: &RifaConfig,
    boletas: &[Boleta],
    cliente: &Cliente,
    base_url: &str,
) -> Result<String, String> {
    let total = formatear_cop(config.precio_boleta * boletas.len() as i64);

    let mut filas = String::new();
    for boleta in boletas {
        let qr_url = format!("{base_url}/boleta/{}", boleta.numero);
        let qr = qr_data_url(&qr_url).map_err(|e| format!("No se pudo generar el QR: {e}"))?;
        filas.push_str(&format!(
            r#"<tr>
  <td style="padding:12px; text-align:center; border-bottom:1px solid #eee;">
    <span style="font-size:20px; font-weight:900; color:#6c5ce7; letter-spacing:4px;">#{numero}</span>
  </td>
  <td style="padding:12px; text-align:center; border-bottom:1px solid #eee; font-family:monospace; font-size:12px;">{codigo_barras}</td>
  <td style="padding:12px; text-align:center; border-bottom:1px solid #eee;">
    <a href="{qr_url}"><img src="{qr}" width="80" height="80" alt="QR"></a>
  </td>
</tr>"#,
            numero = boleta.numero,
            codigo_barras = boleta.codigo_barras,
            qr_url = qr_url,
            qr = qr,
        ));
    }

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><meta name="viewport" content="width=device-width, initial-scale=1.0"></head>
<body style="margin:0; padding:0; background-color:#f5f6fa; font-family:'Segoe UI', Arial, sans-serif;">
  <table width="100%" cellpadding="0" cellspacing="0" style="background-color:#f5f6fa; padding:30px 0;">
    <tr><td align="center">
      <table width="560" cellpadding="0" cellspacing="0" style="background:#fff; border-radius:16px; overflow:hidden;">
        <tr>
          <td style="background:linear-gradient(135deg,#6c5ce7,#a29bfe); padding:30px; text-align:center; color:white;">
            <h1 style="margin:0; font-size:26px;">{nombre_rifa}</h1>
            <p style="margin:8px 0 0; font-weight:700;">{premio}</p>
          </td>
        </tr>
        <tr>
          <td style="padding:24px; text-align:center;">
            <h2 style="margin:0 0 4px; color:#2d3436;">¡Hola {cliente_nombre}!</h2>
            <p style="color:#636e72;">Aquí están tus <strong>{cantidad} boleta(s)</strong></p>
            <p style="color:#6c5ce7; font-size:18px; font-weight:700;">Total: {total}</p>
          </td>
        </tr>
        <tr>
          <td style="padding:0 24px 24px;">
            <table width="100%" cellpadding="0" cellspacing="0" style="border:1px solid #eee; border-radius:8px; overflow:hidden;">
              <tr style="background:#f8f9fa;">
                <th style="padding:10px; font-size:12px; color:#636e72; text-transform:uppercase;">Boleta</th>
                <th style="padding:10px; font-size:12px; color:#636e72; text-transform:uppercase;">Código</th>
                <th style="padding:10px; font-size:12px; color:#636e72; text-transform:uppercase;">QR</th>
              </tr>
              {filas}
            </table>
          </td>
        </tr>
        <tr>
          <td style="background:#f8f9fa; padding:16px; text-align:center; border-top:1px solid #eee;">
            <p style="margin:0; font-size:12px; color:#636e72;">Organiza: <strong>{organizador}</strong> | Tel: {telefono}</p>
            <p style="margin:6px 0 0; font-size:11px; color:#a0a0a0;">Conserve este correo como comprobante.</p>
          </td>
        </tr>
      </table>
    </td></tr>
  </table>
</body>
</html>"#,
        nombre_rifa = config.nombre_rifa,
        premio = config.premio,
        cliente_nombre = cliente.nombre,
        cantidad = boletas.len(),
        total = total,
        filas = filas,
        organizador = config.organizador,
        telefono = config.telefono,
    ))
}
