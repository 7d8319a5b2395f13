use actix_web::{http::header, HttpRequest};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::{config::ApiCredentials, models::note::Role};

/// User and password from an `Authorization: Basic` header.
pub fn get_basic_credentials(req: &HttpRequest) -> Option<(String, String)> {
    let auth = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = auth.strip_prefix("Basic ")?;
    let decoded = String::from_utf8(STANDARD.decode(encoded.trim()).ok()?).ok()?;
    let (user, password) = decoded.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

pub fn get_role(req: &HttpRequest, credentials: Option<&ApiCredentials>) -> Role {
    match (credentials, get_basic_credentials(req)) {
        (Some(expected), Some((user, password)))
            if constant_time_eq(expected.user.as_bytes(), user.as_bytes())
                & constant_time_eq(expected.password.as_bytes(), password.as_bytes()) =>
        {
            Role::Api
        }
        _ => Role::Standard,
    }
}

/// Compares without bailing out at the first differing byte. Only the length
/// leaks.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
