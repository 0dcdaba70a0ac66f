use axum::{
    extract::{multipart::Field, rejection::JsonRejection, Multipart, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use linkhub_core::{
    AuthStatus, HubError, IconUpload, LinkRecord, LoginForm, NewLink, RequestCookies,
};
use serde_json::json;
use tracing::warn;

use crate::{
    error::{bad_form, ApiError},
    AppState,
};

// ── Cookies ──────────────────────────────────────────────────────────────────

fn request_cookies(headers: &HeaderMap) -> RequestCookies {
    RequestCookies::from_headers(
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok()),
    )
}

/// Attach every cookie queued on `jar` as a `Set-Cookie` header.
fn with_cookies(jar: &RequestCookies, response: impl IntoResponse) -> Response {
    let mut response = response.into_response();
    for cookie in jar.set_cookie_headers() {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => warn!(error = %e, "dropping unrenderable Set-Cookie header"),
        }
    }
    response
}

// ── Health ───────────────────────────────────────────────────────────────────

pub async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

// ── Auth ─────────────────────────────────────────────────────────────────────

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<LoginForm>, JsonRejection>,
) -> Response {
    let Json(form) = match body {
        Ok(form) => form,
        Err(e) => return bad_form(e),
    };
    let mut jar = request_cookies(&headers);
    match state.hub.login(&mut jar, &form) {
        Ok(()) => with_cookies(
            &jar,
            Json(json!({"success": true, "username": form.username})),
        ),
        Err(e) => ApiError(e).into_response(),
    }
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let mut jar = request_cookies(&headers);
    state.hub.logout(&mut jar);
    with_cookies(&jar, Json(json!({"success": true})))
}

pub async fn auth_status(State(state): State<AppState>, headers: HeaderMap) -> Json<AuthStatus> {
    Json(state.hub.auth_status(&request_cookies(&headers)))
}

// ── Links ────────────────────────────────────────────────────────────────────

pub async fn list_links(State(state): State<AppState>) -> Json<Vec<LinkRecord>> {
    Json(state.hub.list_links())
}

pub async fn add_link(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let jar = request_cookies(&headers);
    // Refuse before reading a possibly large upload.
    if !state.hub.auth_status(&jar).is_authenticated() {
        return ApiError(HubError::Unauthorized).into_response();
    }

    let link = match read_new_link(multipart).await {
        Ok(link) => link,
        Err(e) => return bad_form(e),
    };

    match state.hub.add_link(&jar, link) {
        Ok(record) => (
            StatusCode::CREATED,
            Json(json!({"success": "Link added successfully!", "link": record})),
        )
            .into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

pub async fn delete_link(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let jar = request_cookies(&headers);
    match state.hub.delete_link(&jar, &id) {
        Ok(_) => Json(json!({"success": "Link deleted successfully!"})).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

/// Collect `name`, `url` and the optional `icon` file from a multipart body.
/// Unknown fields are ignored.
async fn read_new_link(
    mut multipart: Multipart,
) -> Result<NewLink, axum::extract::multipart::MultipartError> {
    let mut link = NewLink::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "name" => link.name = field.text().await?,
            "url" => link.url = field.text().await?,
            "icon" => link.icon = Some(read_icon(field).await?),
            _ => {}
        }
    }
    Ok(link)
}

async fn read_icon(
    field: Field<'_>,
) -> Result<IconUpload, axum::extract::multipart::MultipartError> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().unwrap_or_default().to_string();
    let bytes = field.bytes().await?;
    Ok(IconUpload::new(file_name, content_type, bytes.to_vec()))
}
