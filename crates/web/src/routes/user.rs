//! Signup, login and logout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use snippetbox_core::Email;

use super::page::{PageContext, set_flash};
use crate::error::Result;
use crate::filters;
use crate::forms::{FormErrors, Validator, min_chars, not_blank};
use crate::models::session_keys;
use crate::services::auth::{AuthError, AuthService, MIN_PASSWORD_CHARS};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Signup form data.
#[derive(Debug, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login form data.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Signup page template. The password is never echoed back.
#[derive(Template, WebTemplate)]
#[template(path = "user/signup.html")]
pub struct SignupTemplate {
    pub page: PageContext,
    pub name: String,
    pub email: String,
    pub errors: FormErrors,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "user/login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
    pub email: String,
    pub errors: FormErrors,
}

// =============================================================================
// Signup
// =============================================================================

/// Display the signup form.
pub async fn signup_form(page: PageContext) -> SignupTemplate {
    SignupTemplate {
        page,
        name: String::new(),
        email: String::new(),
        errors: FormErrors::default(),
    }
}

/// Handle the signup form.
#[instrument(skip(state, session, page, form))]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    page: PageContext,
    Form(form): Form<SignupForm>,
) -> Result<Response> {
    let rerender = |errors: FormErrors, form: SignupForm, page: PageContext| {
        let template = SignupTemplate {
            page,
            name: form.name,
            email: form.email,
            errors,
        };
        (StatusCode::UNPROCESSABLE_ENTITY, template).into_response()
    };

    if let Err(errors) = validate_signup(&form) {
        return Ok(rerender(errors, form, page));
    }

    let auth = AuthService::new(state.users());
    match auth.register(&form.name, &form.email, &form.password).await {
        Ok(user_id) => {
            tracing::info!(user_id = %user_id, "User registered");
            set_flash(&session, "Your signup was successful. Please log in.").await?;
            Ok(Redirect::to("/user/login").into_response())
        }
        Err(AuthError::DuplicateEmail) => {
            let mut errors = FormErrors::default();
            errors.add("email", "Address is already in use");
            Ok(rerender(errors, form, page))
        }
        Err(AuthError::InvalidEmail(_)) => {
            let mut errors = FormErrors::default();
            errors.add("email", "This field must be a valid email address");
            Ok(rerender(errors, form, page))
        }
        Err(AuthError::WeakPassword(message)) => {
            let mut errors = FormErrors::default();
            errors.add("password", message);
            Ok(rerender(errors, form, page))
        }
        Err(e) => Err(e.into()),
    }
}

fn validate_signup(form: &SignupForm) -> std::result::Result<(), FormErrors> {
    let mut v = Validator::new();
    v.check(not_blank(&form.name), "name", "This field cannot be blank");
    v.check(not_blank(&form.email), "email", "This field cannot be blank");
    v.check(
        Email::parse(&form.email).is_ok(),
        "email",
        "This field must be a valid email address",
    );
    v.check(not_blank(&form.password), "password", "This field cannot be blank");
    v.check(
        min_chars(&form.password, MIN_PASSWORD_CHARS),
        "password",
        format!("This field must be at least {MIN_PASSWORD_CHARS} characters long"),
    );
    v.finish()
}

// =============================================================================
// Login / Logout
// =============================================================================

/// Display the login form.
pub async fn login_form(page: PageContext) -> LoginTemplate {
    LoginTemplate {
        page,
        email: String::new(),
        errors: FormErrors::default(),
    }
}

/// Handle the login form.
///
/// The session ID is renewed before the user ID is stored.
#[instrument(skip(state, session, page, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    page: PageContext,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let mut v = Validator::new();
    v.check(not_blank(&form.email), "email", "This field cannot be blank");
    v.check(not_blank(&form.password), "password", "This field cannot be blank");
    if let Err(errors) = v.finish() {
        return Ok(login_failed(page, form.email, errors));
    }

    let auth = AuthService::new(state.users());
    let user_id = match auth.authenticate(&form.email, &form.password).await {
        Ok(id) => id,
        Err(AuthError::InvalidCredentials) => {
            tracing::info!("Login failed: invalid credentials");
            let mut errors = FormErrors::default();
            errors.add_non_field("Email or Password is incorrect");
            return Ok(login_failed(page, form.email, errors));
        }
        Err(e) => return Err(e.into()),
    };

    session.cycle_id().await?;
    session
        .insert(session_keys::AUTHENTICATED_USER_ID, user_id.as_i32())
        .await?;
    tracing::info!(user_id = %user_id, "User logged in");

    Ok(Redirect::to("/snippet/create").into_response())
}

fn login_failed(page: PageContext, email: String, errors: FormErrors) -> Response {
    let template = LoginTemplate {
        page,
        email,
        errors,
    };
    (StatusCode::UNPROCESSABLE_ENTITY, template).into_response()
}

/// Log out: forget the user, renew the session ID, say goodbye.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Response> {
    session
        .remove::<i32>(session_keys::AUTHENTICATED_USER_ID)
        .await?;
    session.cycle_id().await?;
    set_flash(&session, "You've been logged out successfully!").await?;

    Ok(Redirect::to("/").into_response())
}
