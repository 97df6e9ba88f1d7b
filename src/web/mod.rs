//! Web layer - rendered pages
//!
//! This module renders the site's pages with Tera templates and serves the
//! embedded static assets. Page-level access gating lives in the handlers:
//! unauthenticated visitors are redirected to the login page, and users on
//! the wrong dashboard are redirected to their own.

mod pages;

use anyhow::{Context, Result};
use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use rust_embed::RustEmbed;
use tera::Tera;

use crate::api::middleware::AppState;

pub use pages::MaybeUser;

/// Embedded page templates
#[derive(RustEmbed)]
#[folder = "templates/"]
#[include = "*.html"]
struct Templates;

/// Embedded static assets (stylesheets, page scripts)
#[derive(RustEmbed)]
#[folder = "static/"]
struct StaticAssets;

/// Template engine over the embedded templates
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Create the engine, loading every embedded template
    pub fn new() -> Result<Self> {
        let mut templates = Vec::new();
        for name in Templates::iter() {
            let file = Templates::get(&name)
                .with_context(|| format!("Missing embedded template: {}", name))?;
            let content = String::from_utf8(file.data.into_owned())
                .with_context(|| format!("Template {} is not valid UTF-8", name))?;
            templates.push((name.to_string(), content));
        }

        let mut tera = Tera::default();
        tera.add_raw_templates(templates)
            .context("Failed to parse templates")?;

        Ok(Self { tera })
    }

    /// Render a template with the given context
    pub fn render(&self, template: &str, context: &tera::Context) -> Result<String> {
        self.tera
            .render(template, context)
            .with_context(|| format!("Failed to render template: {}", template))
    }
}

/// Error shown when a page fails to render
pub struct PageError(pub anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for PageError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        tracing::error!("Page error: {:#}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong").into_response()
    }
}

/// Build the pages router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::index))
        .route("/about", get(pages::about))
        .route("/services", get(pages::services))
        .route("/contact", get(pages::contact).post(pages::contact_submit))
        .route("/login", get(pages::login_form).post(pages::login_submit))
        .route(
            "/register",
            get(pages::register_form).post(pages::register_submit),
        )
        .route("/logout", post(pages::logout))
        .route("/dashboard", get(pages::dashboard))
        .route("/admin-dashboard", get(pages::admin_dashboard))
        .route("/services/health-chatbot", get(pages::health_chatbot))
        .route("/services/xray-analysis", get(pages::xray_analysis))
}

/// GET /static/{*path} - Serve an embedded static asset
pub async fn static_asset(Path(path): Path<String>) -> Response {
    match StaticAssets::get(&path) {
        Some(content) => {
            let mime = mime_for(&path);
            ([(header::CONTENT_TYPE, mime)], content.data.into_owned()).into_response()
        }
        None => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

/// Content type by file extension
fn mime_for(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "application/javascript; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}
