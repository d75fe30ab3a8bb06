use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use dealership_inventory::build_router;
use dealership_inventory::config::{DatabaseConfig, EnvironmentConfig};
use dealership_inventory::database::DatabaseConnection;
use dealership_inventory::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging (RUST_LOG, por defecto info)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🚗 Dealership Inventory API");
    info!("==========================");

    let config = EnvironmentConfig::from_env()?;
    let db_config = DatabaseConfig::from_env()?;

    // Inicializar base de datos
    let db_connection = match DatabaseConnection::new(&db_config).await {
        Ok(conn) => conn,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };
    db_connection.run_migrations().await?;

    let addr: SocketAddr = config.server_url().parse()?;
    info!("💼 Comisión por venta: {}", config.commission_rate);

    let app = build_router(AppState::new(db_connection.pool().clone(), config));

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("🚙 Vehículos:");
    info!("   POST/GET          /api/vehicles");
    info!("   GET               /api/vehicles/facets");
    info!("   GET/PUT/DELETE    /api/vehicles/:id");
    info!("   POST              /api/vehicles/:id/sell | /api/vehicles/:id/unsell");
    info!("🧑‍💼 Vendedores:");
    info!("   POST/GET          /api/salespeople");
    info!("   GET/PUT/DELETE    /api/salespeople/:id");
    info!("   GET               /api/salespeople/:id/metrics | /api/salespeople/:id/vehicles");
    info!("🙋 Clientes:");
    info!("   POST/GET          /api/customers");
    info!("   GET/PUT/DELETE    /api/customers/:id");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
