use crate::{
    configuration::Settings, routes::*, subscription_store::SubscriptionStore,
};
use actix_web::{dev::Server, web, web::Data, App, HttpServer};
use anyhow::Context;
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

pub struct Application {
    port: u16,
    server: Server,
    store: Data<SubscriptionStore>,
}

impl Application {
    /// Loads the subscription store and binds the listener. The server does not
    /// start accepting requests until [`Application::run_until_stopped`].
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let store = SubscriptionStore::open(&configuration.storage.subscriptions_path)
            .context("Failed to load the subscription store")?;

        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(&address)
            .with_context(|| format!("Failed to bind to {}", address))?;
        let port = listener.local_addr()?.port();

        let store = Data::new(store);
        let server = run(listener, store.clone())?;

        Ok(Self { port, server, store })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serves until the server is stopped, then flushes the store.
    pub async fn run_until_stopped(self) -> Result<(), anyhow::Error> {
        self.server.await?;
        tracing::info!("server stopped, flushing subscriptions");
        self.store
            .flush()
            .context("Failed to flush the subscription store on shutdown")?;
        Ok(())
    }
}

pub fn run(
    listener: TcpListener,
    store: Data<SubscriptionStore>,
) -> Result<Server, std::io::Error> {
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::JsonConfig::default().error_handler(subscribe_json_error_handler))
            .service(landing_page)
            .service(health_check)
            .service(subscribe)
            .service(list_subscriptions)
            .app_data(store.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
