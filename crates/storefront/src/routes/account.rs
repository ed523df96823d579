//! Account route handlers.
//!
//! `/perfil` doubles as the auth page: anonymous visitors see the
//! login/register forms, authenticated ones their stored profile and
//! order history. Auth failures never escape as error pages - they come
//! back as a redirect carrying the user-facing message.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::backend::{BackendError, ProfileUpdate};
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth, auth::access_token};
use crate::services::auth::{self, AuthError};
use crate::state::AppState;

/// Message for any rejected login.
const BAD_CREDENTIALS_MSG: &str = "Correo o contraseña incorrectos.";

/// Fallback message for a failed registration.
const REGISTER_FAILED_MSG: &str = "Hubo un problema al registrarte.";

// =============================================================================
// Form / Query Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub nombre: String,
    pub email: String,
    pub password: String,
}

/// Profile update form data.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub telefono: String,
    #[serde(default)]
    pub direccion: String,
    #[serde(default)]
    pub ciudad: String,
}

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Display Types
// =============================================================================

/// Stored profile display data.
#[derive(Clone, Default)]
pub struct ProfileView {
    pub nombre: String,
    pub telefono: String,
    pub direccion: String,
    pub ciudad: String,
}

/// One row of the order history.
#[derive(Clone)]
pub struct OrderRowView {
    pub order_number: String,
    pub status_label: String,
    pub total: String,
    pub date: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Account page template: auth forms when anonymous, profile + orders
/// when logged in.
#[derive(Template, WebTemplate)]
#[template(path = "account/perfil.html")]
pub struct PerfilTemplate {
    pub email: Option<String>,
    pub profile: ProfileView,
    pub orders: Vec<OrderRowView>,
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the account page.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    let Some(user) = user else {
        return PerfilTemplate {
            email: None,
            profile: ProfileView::default(),
            orders: Vec::new(),
            error: query.error,
            success: query.success,
        }
        .into_response();
    };

    // Both reads are tolerant: a backend hiccup degrades the page, it
    // does not replace it with an error view.
    let profile = match state.backend().profile(user.email.as_str()).await {
        Ok(profile) => ProfileView {
            nombre: profile.nombre,
            telefono: profile.telefono,
            direccion: profile.direccion,
            ciudad: profile.ciudad,
        },
        Err(e) => {
            tracing::warn!("Failed to fetch profile: {e}");
            ProfileView::default()
        }
    };

    let orders = match access_token(&session).await {
        Some(token) => match state.backend().orders(user.email.as_str(), &token).await {
            Ok(orders) => orders
                .iter()
                .map(|o| OrderRowView {
                    order_number: o.order_number.clone(),
                    status_label: o.status.display_name().to_string(),
                    total: o.total.format_clp(),
                    date: o.date.clone(),
                })
                .collect(),
            Err(e) => {
                tracing::warn!("Failed to fetch order history: {e}");
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    PerfilTemplate {
        email: Some(user.email.to_string()),
        profile,
        orders,
        error: query.error,
        success: query.success,
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    match auth::login(state.backend(), &session, &form.email, &form.password).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "Login successful");
            Redirect::to("/perfil").into_response()
        }
        Err(e) => {
            tracing::debug!("Login rejected: {e}");
            redirect_with_error(BAD_CREDENTIALS_MSG)
        }
    }
}

/// Handle registration form submission (auto-login on success).
#[instrument(skip(state, session, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    match auth::register(
        state.backend(),
        &session,
        &form.nombre,
        &form.email,
        &form.password,
    )
    .await
    {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "Registration successful");
            Redirect::to("/perfil").into_response()
        }
        Err(AuthError::Backend(BackendError::Status { message, .. })) if !message.is_empty() => {
            redirect_with_error(&message)
        }
        Err(e) => {
            tracing::warn!("Registration failed: {e}");
            redirect_with_error(REGISTER_FAILED_MSG)
        }
    }
}

/// Handle logout.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Response {
    if let Err(e) = auth::logout(&session).await {
        tracing::error!("Failed to clear session on logout: {e}");
    }
    Redirect::to("/").into_response()
}

/// Handle profile update form submission.
#[instrument(skip(state, form))]
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<ProfileForm>,
) -> Response {
    let update = ProfileUpdate {
        email: user.email.to_string(),
        nombre: form.nombre,
        telefono: form.telefono,
        direccion: form.direccion,
        ciudad: form.ciudad,
    };

    match state.backend().update_profile(&update).await {
        Ok(()) => {
            let url = format!(
                "/perfil?success={}",
                urlencoding::encode("Tus datos quedaron guardados.")
            );
            Redirect::to(&url).into_response()
        }
        Err(e) => {
            tracing::error!("Profile update failed: {e}");
            redirect_with_error("No pudimos guardar tus datos. Intenta nuevamente.")
        }
    }
}

fn redirect_with_error(message: &str) -> Response {
    let url = format!("/perfil?error={}", urlencoding::encode(message));
    Redirect::to(&url).into_response()
}
