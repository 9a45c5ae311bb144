use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use gather::notify::LogNotifier;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:data/gather.db".to_string());

    let pool = gather::db::init_pool(&database_url).await;

    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(String::as_str) == Some("create-host") {
        let (Some(name), Some(email)) = (args.get(2), args.get(3)) else {
            eprintln!("Usage: gather create-host <name> <email>");
            std::process::exit(1);
        };
        if let Err(e) = gather::cli::create_host(&pool, name, email).await {
            eprintln!("Failed to create host: {e}");
            std::process::exit(1);
        }
        return;
    }

    let secure_cookies = std::env::var("SECURE_COOKIES")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let app = gather::build_app(pool, Arc::new(LogNotifier), secure_cookies).await;

    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    let listener = TcpListener::bind(addr).await.unwrap();

    tracing::info!("listening on {}", addr);
    axum::serve(listener, app).await.unwrap();
}
