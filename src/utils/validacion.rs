use regex::Regex;

use crate::error::{AppError, AppResult};

/// Validación mínima de forma de un email.
pub fn validar_email(email: &str) -> AppResult<()> {
    let email_regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();

    if !email_regex.is_match(email) {
        return Err(AppError::ValidationError(
            "El email no tiene un formato válido".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validar_email() {
        assert!(validar_email("cliente@example.com").is_ok());
        assert!(validar_email("a.b+c@sub.dominio.co").is_ok());
        assert!(validar_email("sin-arroba").is_err());
        assert!(validar_email("dos@@signos.com").is_err());
        assert!(validar_email("con espacios@x.com").is_err());
        assert!(validar_email("sin@punto").is_err());
    }
}
