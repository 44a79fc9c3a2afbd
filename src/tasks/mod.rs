//! Tareas recurrentes en segundo plano.
//!
//! Por ahora solo el auto-ping que mantiene despierto el servicio en
//! plataformas que suspenden procesos inactivos (p. ej. Render). Se lanza
//! una vez en el arranque con `spawn_all`; no bloquea.

use std::time::Duration;

const INTERVALO_PING: Duration = Duration::from_secs(14 * 60);

/// Lanza todas las tareas de fondo. Cada una corre en su propio `tokio::spawn`.
pub fn spawn_all(public_url: Option<String>) {
    let Some(base) = public_url else {
        return;
    };

    let url = format!("{}/api/health", base.trim_end_matches('/'));
    tokio::spawn(async move {
        let client = reqwest::Client::new();
        loop {
            tokio::time::sleep(INTERVALO_PING).await;
            match client.get(&url).send().await {
                Ok(resp) => log::debug!("Auto-ping: {}", resp.status()),
                Err(e) => log::warn!("Auto-ping failed: {e}"),
            }
        }
    });
    log::info!("Auto-ping enabled every 14 minutes");
}
