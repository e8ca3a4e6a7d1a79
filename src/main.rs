use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use car_catalog::build_router;
use car_catalog::config::environment::{EnvironmentConfig, StoreBackend};
use car_catalog::database::{seed_if_empty, DatabaseConnection};
use car_catalog::repositories::{MemoryVehicleStore, PgVehicleRepository, VehicleStore};
use car_catalog::services::{DisabledImageHost, HostedAssetClient, ImageHost};
use car_catalog::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    info!("🚗 Car Catalog API");
    info!("================================================");

    let config = EnvironmentConfig::from_env().context("Configuración inválida")?;
    info!("⚙️ Entorno: {}", config.environment);

    // Almacén de vehículos
    let store: Arc<dyn VehicleStore> = match config.store_backend {
        StoreBackend::Postgres => {
            let db_connection = match DatabaseConnection::new_default().await {
                Ok(conn) => conn,
                Err(e) => {
                    error!("❌ Error conectando a la base de datos: {:#}", e);
                    return Err(e);
                }
            };
            db_connection.init_schema().await?;
            Arc::new(PgVehicleRepository::new(db_connection.pool().clone()))
        }
        StoreBackend::Memory => {
            warn!("🧪 Usando almacén en memoria: los datos se pierden al reiniciar");
            Arc::new(MemoryVehicleStore::new())
        }
    };

    if config.seed_sample_data {
        seed_if_empty(store.as_ref()).await?;
    }

    // Host de imágenes
    let image_host: Arc<dyn ImageHost> = match config.image_host.clone() {
        Some(host_config) => {
            info!("☁️ Host de imágenes: {} ({})", host_config.cloud_name, host_config.folder);
            Arc::new(HostedAssetClient::new(host_config)?)
        }
        None => {
            warn!("⚠️ Sin credenciales CLOUDINARY_*: las subidas de archivos fallarán");
            Arc::new(DisabledImageHost)
        }
    };

    let addr: SocketAddr = config
        .server_url()
        .parse()
        .with_context(|| format!("Dirección inválida: {}", config.server_url()))?;

    let app_state = AppState::new(config, store, image_host)?;
    let app = build_router(app_state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🚗 Endpoints - Cars:");
    info!("   GET    /api/cars - Listar vehículos");
    info!("   GET    /api/cars/:id - Obtener vehículo");
    info!("   POST   /api/cars - Crear vehículo (admin)");
    info!("   PUT    /api/cars/:id - Actualizar vehículo (admin)");
    info!("   PUT    /api/cars/:id/properties - Actualizar propiedades (admin)");
    info!("   DELETE /api/cars/:id - Eliminar vehículo (admin)");
    info!("🔑 Endpoints - Auth:");
    info!("   POST   /api/auth/admin/login - Login administrador");
    info!("   GET    /api/auth/admin/validate - Validar sesión");
    info!("   POST   /api/auth/admin/logout - Logout");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo escuchar Ctrl+C: {}", e);
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
                error!("❌ No se pudo escuchar SIGTERM: {}", e);
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
