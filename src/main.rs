use gallery_api::app::{catalog_state, create_app, remote_state};
use gallery_api::auth::create_session_token;
use gallery_api::backend::RemoteClient;
use gallery_api::config::{load_config, save_default_config, Config};
use gallery_api::constants::{CONFIG_PATH, DATABASE_PATH, DATA_DIR};
use gallery_api::database::{create_pool, init_database};
use gallery_api::logging::{init_logging, install_panic_hook};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::info;

fn build_state(config: Arc<Config>) -> gallery_api::auth::AppState {
    if config.backend.mode.is_remote() {
        let client = RemoteClient::new(&config.backend).expect("Failed to create backend client");
        info!("Serving photos from {}", config.backend.base_url);
        return remote_state(config, Arc::new(client));
    }

    std::fs::create_dir_all(&*DATA_DIR).ok();
    let pool = create_pool(&DATABASE_PATH).expect("Failed to create database pool");
    {
        let conn = pool.get().expect("Failed to get connection");
        init_database(&conn).expect("Failed to initialize database");
    }
    info!("Serving photos from catalog {:?}", *DATABASE_PATH);
    catalog_state(config, pool)
}

#[tokio::main]
async fn main() {
    if std::env::args().any(|arg| arg == "--init-config") {
        match save_default_config(&CONFIG_PATH) {
            Ok(_) => {
                println!("Default configuration saved to {:?}", *CONFIG_PATH);
                std::process::exit(0);
            }
            Err(e) => {
                eprintln!("Failed to save default configuration: {}", e);
                std::process::exit(1);
            }
        }
    }

    // Load configuration
    let config = Arc::new(load_config(&CONFIG_PATH));

    if std::env::args().any(|arg| arg == "--issue-admin-token") {
        match create_session_token(&config.security.admin_username, &config.security) {
            Ok(token) => {
                println!("{}", token);
                std::process::exit(0);
            }
            Err(e) => {
                eprintln!("Failed to issue token: {}", e);
                std::process::exit(1);
            }
        }
    }

    // Initialize logging
    init_logging();
    install_panic_hook();

    let app = create_app(build_state(Arc::clone(&config)));

    // Bind to address
    let ip: IpAddr = config.server.host.parse().unwrap_or([0, 0, 0, 0].into());
    let addr = SocketAddr::new(ip, config.server.port);
    info!("Starting gallery API on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind");

    axum::serve(listener, app).await.expect("Server failed");
}
