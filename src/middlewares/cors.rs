use actix_cors::Cors;

pub fn create_cors() -> Cors {
    // El panel de administración se sirve desde cualquier origen; la API no
    // maneja credenciales de navegador
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allow_any_header()
        .max_age(3600)
}
