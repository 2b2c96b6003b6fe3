use axum::Router;
use tokio::net::TcpListener;

use anyhow::anyhow;

use speechguard::{ServerConfig, routes, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = ServerConfig::from_env().map_err(|e| anyhow!(e.to_string()))?;
    let address = config.address();
    println!("Starting server on {address}");

    // Create application state
    let app_state = AppState::new(config);

    // Create API and WebSocket routes
    let api_routes = routes::api::create_api_router();
    let ws_routes = routes::ws::create_ws_router();

    // Public root route identifying the service
    let public_routes =
        Router::new().route("/", axum::routing::get(speechguard::handlers::api::root));

    // Combine all routes: public + api + websocket
    let app = public_routes
        .merge(api_routes)
        .merge(ws_routes)
        .with_state(app_state);

    // Create listener
    let listener = TcpListener::bind(&address).await?;

    println!("Server listening on {address}");

    // Start server
    axum::serve(listener, app).await?;

    Ok(())
}
