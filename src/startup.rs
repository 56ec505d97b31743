use crate::configuration::Settings;
use crate::cors::{AllowedOrigins, cors};
use crate::email_client::EmailClient;
use crate::routes::{health_check, send_contact_email, subscribe, subscribe_json_config};
use crate::subscriber_store::SubscriberStore;
use actix_web::dev::Server;
use actix_web::middleware::from_fn;
use actix_web::{App, HttpServer, web};
use anyhow::Context;
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(config: Settings) -> Result<Self, anyhow::Error> {
        let email_client = config
            .email_client
            .client()
            .context("Invalid email client configuration.")?;

        // Reachability is only reported; startup and later sends never wait on it.
        let verifier = email_client.clone();
        tokio::spawn(async move { verifier.verify().await });

        let store = config.subscribers.store();
        let allowed_origins = AllowedOrigins::new(config.cors.allowed_origins);

        let address = format!("{}:{}", config.application.host, config.application.port);
        let listener =
            TcpListener::bind(&address).with_context(|| format!("Failed to bind {address}"))?;
        let port = listener.local_addr()?.port();
        tracing::info!(%address, port, "Server is running");

        let server = run(listener, store, email_client, allowed_origins)?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(
    listener: TcpListener,
    store: SubscriberStore,
    email_client: EmailClient,
    allowed_origins: AllowedOrigins,
) -> Result<Server, anyhow::Error> {
    let store = web::Data::new(store);
    let email_client = web::Data::new(email_client);
    let allowed_origins = web::Data::new(allowed_origins);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(from_fn(cors))
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .service(
                web::resource("/subscribe")
                    .app_data(subscribe_json_config())
                    .route(web::post().to(subscribe)),
            )
            .route("/send-email", web::post().to(send_contact_email))
            .app_data(store.clone())
            .app_data(email_client.clone())
            .app_data(allowed_origins.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
