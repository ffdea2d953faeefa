use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::ApiKey;
use crate::middleware::JwtMiddleware;
use crate::routes::{current_user, health_check, login, polka_webhook, refresh, revoke};
use crate::session::SessionManager;
use crate::store::UserStore;

/// Everything the handlers share. Built once, read-only afterwards.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionManager,
    pub users: Arc<dyn UserStore>,
    pub api_key: ApiKey,
}

pub fn run(listener: TcpListener, state: AppState) -> Result<Server, std::io::Error> {
    let codec = state.sessions.codec().clone();
    let sessions = web::Data::new(state.sessions);
    let users: web::Data<dyn UserStore> = web::Data::from(state.users);
    let api_key = web::Data::new(state.api_key);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(sessions.clone())
            .app_data(users.clone())
            .app_data(api_key.clone())
            .route("/api/healthz", web::get().to(health_check))
            .route("/api/login", web::post().to(login))
            .route("/api/refresh", web::post().to(refresh))
            .route("/api/revoke", web::post().to(revoke))
            .route("/api/polka/webhooks", web::post().to(polka_webhook))
            // Access-token protected routes
            .service(
                web::scope("/api/me")
                    .wrap(JwtMiddleware::new(codec.clone()))
                    .route("", web::get().to(current_user)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
