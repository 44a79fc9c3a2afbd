use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{DynamicImage, ImageFormat, Luma};
use qrcode::QrCode;

use crate::error::{AppError, AppResult};

/// Genera un código QR como data URL PNG en base64, listo para embeber en
/// un correo o en la página pública de la boleta.
pub fn qr_data_url(contenido: &str) -> AppResult<String> {
    let code = QrCode::new(contenido.as_bytes())
        .map_err(|e| AppError::InternalError(format!("No se pudo generar el QR: {e}")))?;

    let imagen = code.render::<Luma<u8>>().min_dimensions(200, 200).build();

    let mut png = Vec::new();
    DynamicImage::ImageLuma8(imagen)
        .write_to(&mut std::io::Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| AppError::InternalError(format!("No se pudo codificar el QR: {e}")))?;

    Ok(format!("data:image/png;base64,{}", STANDARD.encode(&png)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qr_data_url() {
        let url = qr_data_url("https://example.com/boleta/0007").unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
        // El contenido debe ser base64 decodificable a un PNG
        let b64 = url.strip_prefix("data:image/png;base64,").unwrap();
        let bytes = STANDARD.decode(b64).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }
}
