//! ChestScan HealthAI - demo web application for AI-assisted chest X-ray analysis

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chestscan::{
    api::{self, AppState},
    config::Config,
    inference::create_backend,
    models::{User, UserRole},
    services::{auth::AuthService, password::hash_password},
    store::{
        MemoryAnalysisRepository, MemorySessionRepository, MemoryUserRepository, UserRepository,
    },
    web::TemplateEngine,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chestscan=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting ChestScan HealthAI server...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Create repositories (process-local, reset on restart)
    let user_repo = MemoryUserRepository::boxed();
    let session_repo = MemorySessionRepository::boxed();
    let analysis_repo = MemoryAnalysisRepository::boxed();

    // Seed the demo accounts
    seed_demo_accounts(&user_repo).await?;
    tracing::info!("Demo accounts seeded (admin@example.com / admin123, patient@example.com / patient123)");

    // Initialize services
    let auth_service = Arc::new(AuthService::new(user_repo, session_repo));

    // Initialize the inference backend
    let inference = create_backend(&config.inference, &config.upload)?;

    // Initialize the template engine
    let templates = Arc::new(TemplateEngine::new()?);
    tracing::info!("Templates loaded");

    // Build application state
    let state = AppState {
        auth_service,
        inference,
        analysis_repo,
        upload_config: Arc::new(config.upload.clone()),
        templates,
    };

    // Build router
    let app = api::build_router(state, &config.server.cors_origin);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the demo admin and patient accounts
async fn seed_demo_accounts(user_repo: &Arc<dyn UserRepository>) -> Result<()> {
    let admin = User::new(
        "Admin User".to_string(),
        "admin@example.com".to_string(),
        hash_password("admin123")?,
        UserRole::Admin,
    );
    user_repo.create(&admin).await?;

    let patient = User::new(
        "John Doe".to_string(),
        "patient@example.com".to_string(),
        hash_password("patient123")?,
        UserRole::Patient,
    )
    .with_profile(
        Some("1990-01-01".to_string()),
        Some("123-456-7890".to_string()),
        Some("No significant medical history".to_string()),
    );
    user_repo.create(&patient).await?;

    Ok(())
}
