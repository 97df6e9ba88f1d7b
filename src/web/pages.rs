//! Page handlers
//!
//! One handler per screen. Access checks run once per request:
//! - no session -> redirect to /login
//! - patient on the admin dashboard -> redirect to /dashboard
//! - admin on the patient dashboard -> redirect to /admin-dashboard

use axum::{
    extract::{Query, State},
    http::{header, HeaderValue},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::{Deserialize, Serialize};

use crate::api::auth::{clear_session_cookie, session_cookie};
use crate::api::middleware::{extract_session_token, AppState};
use crate::models::{AnalysisRecord, User};
use crate::services::auth::{AuthServiceError, LoginInput, RegisterInput};
use crate::web::PageError;

/// The user behind the request's session cookie, if any.
///
/// Unknown or missing tokens resolve to `None`; they are never an error.
pub struct MaybeUser(pub Option<User>);

impl axum::extract::FromRequestParts<AppState> for MaybeUser {
    type Rejection = PageError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = match extract_session_token(&parts.headers) {
            Some(token) => state.auth_service.current_user(&token).await?,
            None => None,
        };
        Ok(MaybeUser(user))
    }
}

/// Base template context with the current user
fn page_context(user: Option<&User>) -> tera::Context {
    let mut context = tera::Context::new();
    context.insert("logged_in", &user.is_some());
    if let Some(user) = user {
        context.insert("user", user);
    }
    context
}

fn render(state: &AppState, template: &str, context: &tera::Context) -> Result<Response, PageError> {
    let html = state.templates.render(template, context)?;
    Ok(Html(html).into_response())
}

// ============================================================================
// Public pages
// ============================================================================

/// GET / - Landing page
pub async fn index(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Result<Response, PageError> {
    render(&state, "index.html", &page_context(user.as_ref()))
}

/// GET /about - About page
pub async fn about(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Result<Response, PageError> {
    render(&state, "about.html", &page_context(user.as_ref()))
}

/// GET /services - Services overview
pub async fn services(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Result<Response, PageError> {
    render(&state, "services.html", &page_context(user.as_ref()))
}

/// Contact form fields
#[derive(Debug, Deserialize)]
pub struct ContactForm {
    pub name: String,
    #[allow(dead_code)]
    pub email: String,
    #[allow(dead_code)]
    pub subject: String,
    #[allow(dead_code)]
    pub message: String,
}

/// GET /contact - Contact page
pub async fn contact(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Result<Response, PageError> {
    render(&state, "contact.html", &page_context(user.as_ref()))
}

/// POST /contact - Contact form submission
///
/// Nothing is delivered anywhere; the demo acknowledges the submission.
pub async fn contact_submit(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Form(form): Form<ContactForm>,
) -> Result<Response, PageError> {
    let mut context = page_context(user.as_ref());
    context.insert("submitted", &true);
    context.insert("sender_name", &form.name);
    render(&state, "contact.html", &context)
}

// ============================================================================
// Login / register
// ============================================================================

/// Login form fields
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub registered: Option<String>,
}

/// GET /login - Login page
pub async fn login_form(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
) -> Result<Response, PageError> {
    let mut context = page_context(None);
    context.insert("registered", &query.registered.is_some());
    render(&state, "login.html", &context)
}

/// POST /login - Login submission
///
/// Invalid credentials re-render the form with an inline message. A
/// successful login sets the session cookie and redirects by role.
pub async fn login_submit(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageError> {
    let result = state
        .auth_service
        .login(LoginInput::new(form.email.clone(), form.password))
        .await?;

    match result {
        Some((user, session)) => {
            let target = if user.is_admin() {
                "/admin-dashboard"
            } else {
                "/dashboard"
            };
            let mut response = Redirect::to(target).into_response();
            response.headers_mut().insert(
                header::SET_COOKIE,
                HeaderValue::from_str(&session_cookie(&session.id))
                    .map_err(anyhow::Error::from)?,
            );
            Ok(response)
        }
        None => {
            let mut context = page_context(None);
            context.insert("error", "Invalid email or password");
            context.insert("email", &form.email);
            context.insert("registered", &false);
            render(&state, "login.html", &context)
        }
    }
}

/// Registration form fields
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(skip_serializing)]
    pub confirm_password: String,
    #[serde(default)]
    pub dob: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub medical_history: String,
}

/// GET /register - Registration page
pub async fn register_form(State(state): State<AppState>) -> Result<Response, PageError> {
    render(&state, "register.html", &page_context(None))
}

/// POST /register - Registration submission
///
/// A duplicate email or validation problem re-renders the form with the
/// message; success redirects to the login page with a confirmation banner.
pub async fn register_submit(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, PageError> {
    if form.password != form.confirm_password {
        return render_register_error(&state, &form, "Passwords do not match");
    }

    let input = RegisterInput {
        name: form.name.clone(),
        email: form.email.clone(),
        password: form.password.clone(),
        dob: non_empty(&form.dob),
        phone: non_empty(&form.phone),
        medical_history: non_empty(&form.medical_history),
    };

    match state.auth_service.register(input).await {
        Ok(_) => Ok(Redirect::to("/login?registered=1").into_response()),
        Err(AuthServiceError::EmailTaken(_)) => {
            render_register_error(&state, &form, "An account with this email already exists")
        }
        Err(AuthServiceError::ValidationError(msg)) => {
            render_register_error(&state, &form, &msg)
        }
        Err(e) => Err(e.into()),
    }
}

fn render_register_error(
    state: &AppState,
    form: &RegisterForm,
    error: &str,
) -> Result<Response, PageError> {
    let mut context = page_context(None);
    context.insert("error", error);
    context.insert("form", form);
    render(state, "register.html", &context)
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// POST /logout - Logout
pub async fn logout(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
) -> Result<Response, PageError> {
    if let Some(token) = extract_session_token(&headers) {
        state.auth_service.logout(&token).await?;
    }

    let mut response = Redirect::to("/").into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        HeaderValue::from_static(clear_session_cookie()),
    );
    Ok(response)
}

// ============================================================================
// Gated pages
// ============================================================================

/// Analysis history entry as rendered on the dashboard
#[derive(Debug, Serialize)]
struct HistoryEntry {
    report_id: String,
    result: String,
    confidence_pct: i64,
    date: String,
    download_url: Option<String>,
}

impl From<AnalysisRecord> for HistoryEntry {
    fn from(record: AnalysisRecord) -> Self {
        Self {
            report_id: record.analysis.report_id,
            result: record.analysis.prediction.to_string(),
            confidence_pct: (record.analysis.confidence * 100.0).round() as i64,
            date: record.analysis.created_at.format("%Y-%m-%d %H:%M").to_string(),
            download_url: record.analysis.report_download_url,
        }
    }
}

/// GET /dashboard - Patient dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Result<Response, PageError> {
    let user = match user {
        None => return Ok(Redirect::to("/login").into_response()),
        Some(u) if u.is_admin() => {
            return Ok(Redirect::to("/admin-dashboard").into_response())
        }
        Some(u) => u,
    };

    let history: Vec<HistoryEntry> = state
        .analysis_repo
        .list_for_user(user.id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let mut context = page_context(Some(&user));
    context.insert("history", &history);
    render(&state, "dashboard.html", &context)
}

/// Patient row as rendered on the admin dashboard
#[derive(Debug, Serialize)]
struct PatientRow {
    id: i64,
    name: String,
    email: String,
    phone: Option<String>,
    dob: Option<String>,
}

/// GET /admin-dashboard - Admin dashboard
pub async fn admin_dashboard(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Result<Response, PageError> {
    let user = match user {
        None => return Ok(Redirect::to("/login").into_response()),
        Some(u) if !u.is_admin() => return Ok(Redirect::to("/dashboard").into_response()),
        Some(u) => u,
    };

    let patients: Vec<PatientRow> = state
        .auth_service
        .list_patients()
        .await?
        .into_iter()
        .map(|p| PatientRow {
            id: p.id,
            name: p.name,
            email: p.email,
            phone: p.phone,
            dob: p.dob,
        })
        .collect();

    let total_analyses = state.analysis_repo.count().await?;
    let pneumonia_detected = state.analysis_repo.count_pneumonia().await?;

    let mut context = page_context(Some(&user));
    context.insert("patients", &patients);
    context.insert("total_patients", &patients.len());
    context.insert("total_analyses", &total_analyses);
    context.insert("pneumonia_detected", &pneumonia_detected);
    render(&state, "admin_dashboard.html", &context)
}

/// GET /services/health-chatbot - Chatbot page
pub async fn health_chatbot(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Result<Response, PageError> {
    let user = match user {
        None => return Ok(Redirect::to("/login").into_response()),
        Some(u) => u,
    };

    render(&state, "chatbot.html", &page_context(Some(&user)))
}

/// GET /services/xray-analysis - X-ray analysis page
pub async fn xray_analysis(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Result<Response, PageError> {
    let user = match user {
        None => return Ok(Redirect::to("/login").into_response()),
        Some(u) => u,
    };

    render(&state, "xray.html", &page_context(Some(&user)))
}
