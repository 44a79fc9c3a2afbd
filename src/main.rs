use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local;
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;

use rifa_backend::{
    config::Config,
    external::EmailService,
    handlers,
    middlewares::create_cors,
    services::*,
    store::Store,
    swagger::swagger_config,
    tasks,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // Cargar configuración del proceso
    let config = Config::from_toml().expect("Failed to load configuration file");

    // Abrir el almacén de datos
    let store = Arc::new(
        Store::open(&config.storage.data_dir)
            .await
            .expect("Failed to open data store"),
    );

    // Crear servicios
    let boleta_service = BoletaService::new(store.clone());
    let cliente_service = ClienteService::new(store.clone());
    let dashboard_service = DashboardService::new(store.clone());
    let email_service = EmailService::new(store.clone());

    // Provisionar el rango completo de boletas en el primer arranque
    let rifa = store
        .get_config()
        .await
        .expect("Failed to read raffle config");
    boleta_service
        .provisionar(rifa.total_boletas)
        .await
        .expect("Failed to provision boletas");

    // Tareas de fondo
    tasks::spawn_all(config.server.public_url.clone());

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let host = config.server.host.clone();
    let port = config.server.port;
    let config_data = web::Data::new(config);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .app_data(config_data.clone())
            .app_data(web::Data::new(boleta_service.clone()))
            .app_data(web::Data::new(cliente_service.clone()))
            .app_data(web::Data::new(dashboard_service.clone()))
            .app_data(web::Data::new(email_service.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health))
                    .configure(handlers::boleta_config)
                    .configure(handlers::cliente_config)
                    .configure(handlers::dashboard_config)
                    .configure(handlers::print_config),
            )
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
