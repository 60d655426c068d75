//! One-shot notices carried across a redirect in a signed cookie.

use anyhow::Result;
use axum::{
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect, Response},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

pub const COOKIE_NAME: &str = "flash";

/// How long an unread notice survives
const NOTICE_TTL_MINUTES: i64 = 5;

#[derive(Debug, Serialize, Deserialize)]
struct NoticeClaims {
    notices: Vec<String>,
    exp: usize,
}

pub fn encode_notices(notices: &[String], secret: &str) -> Result<String> {
    let expiration = Utc::now() + Duration::minutes(NOTICE_TTL_MINUTES);
    encode_with_expiry(notices, secret, expiration.timestamp())
}

fn encode_with_expiry(notices: &[String], secret: &str, exp: i64) -> Result<String> {
    let claims = NoticeClaims {
        notices: notices.to_vec(),
        exp: exp.max(0) as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?)
}

pub fn decode_notices(token: &str, secret: &str) -> Result<Vec<String>> {
    let data = decode::<NoticeClaims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )?;
    Ok(data.claims.notices)
}

/// Reads pending notices from the request's cookies.
///
/// `None` when no notice cookie was sent. A cookie that fails verification
/// yields `Some(vec![])` so the caller still clears it.
pub fn take_notices(headers: &HeaderMap, secret: &str) -> Option<Vec<String>> {
    let token = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix("flash="))?;

    if token.is_empty() {
        return Some(Vec::new());
    }

    match decode_notices(token, secret) {
        Ok(notices) => Some(notices),
        Err(e) => {
            tracing::debug!("Discarding notice cookie: {}", e);
            Some(Vec::new())
        }
    }
}

fn set_cookie(token: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        COOKIE_NAME,
        token,
        NOTICE_TTL_MINUTES * 60
    )
}

fn clear_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", COOKIE_NAME)
}

/// Redirects to `to`, queueing `notice` behind any notices still pending.
pub fn redirect_with_notice(headers: &HeaderMap, secret: &str, to: &str, notice: &str) -> Response {
    let mut notices = take_notices(headers, secret).unwrap_or_default();
    notices.push(notice.to_string());

    match encode_notices(&notices, secret) {
        Ok(token) => ([(header::SET_COOKIE, set_cookie(&token))], Redirect::to(to)).into_response(),
        Err(e) => {
            tracing::error!("Failed to sign notice cookie: {}", e);
            Redirect::to(to).into_response()
        }
    }
}

/// Finishes a rendered page: if the request carried a notice cookie, it has
/// now been shown and is cleared.
pub fn consume(page: impl IntoResponse, had_cookie: bool) -> Response {
    if had_cookie {
        ([(header::SET_COOKIE, clear_cookie())], page).into_response()
    } else {
        page.into_response()
    }
}
