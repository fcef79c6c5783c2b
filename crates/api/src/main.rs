use std::sync::Arc;

use almox_api::app::services::AppServices;
use almox_api::{app, config::Config};
use almox_notify::{NotificationChannel, WhatsAppChannel};
use almox_store::{Gateway, ImageStore, InMemoryGateway, InMemoryImageStore};

#[tokio::main]
async fn main() {
    almox_observability::init();

    let config = Config::from_env();

    let gateway = build_gateway(&config).await;
    let images: Arc<dyn ImageStore> = Arc::new(InMemoryImageStore::new());
    let channel: Arc<dyn NotificationChannel> =
        Arc::new(WhatsAppChannel::new(config.whatsapp_phone.clone()));

    let services = Arc::new(AppServices::new(gateway, images, channel));
    services
        .bootstrap(
            &config.admin_name,
            &config.admin_username,
            &config.admin_password,
        )
        .await
        .expect("store unreachable at startup");

    let router = app::build_app(services);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {e}", config.bind));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, router).await.unwrap();
}

#[cfg(feature = "postgres")]
async fn build_gateway(config: &Config) -> Arc<dyn Gateway> {
    use almox_store::PostgresGateway;

    match &config.database_url {
        Some(url) => {
            let gateway = PostgresGateway::connect(url)
                .await
                .expect("failed to connect to postgres");
            gateway
                .ensure_schema()
                .await
                .expect("failed to prepare schema");
            Arc::new(gateway)
        }
        None => Arc::new(InMemoryGateway::new()),
    }
}

#[cfg(not(feature = "postgres"))]
async fn build_gateway(config: &Config) -> Arc<dyn Gateway> {
    if config.database_url.is_some() {
        tracing::warn!("DATABASE_URL is set but this build lacks the postgres feature");
    }
    Arc::new(InMemoryGateway::new())
}
