use actix_web::{http::StatusCode, HttpResponse};
use derive_more::Display;
use serde_json::{json, Map, Value};

use crate::store::StoreError;

#[derive(Debug, Display)]
pub enum ServerError {
    #[display(fmt = "Note does not exist.")]
    NotFound,
    #[display(fmt = "Validation Failed")]
    Validation(Vec<Fields>),
    #[display(fmt = "{}", _0)]
    BadRequest(String),
    #[display(fmt = "Internal Error: note storage is unavailable.")]
    Persistence,
    #[display(fmt = "Internal Error: could not build a resource url.")]
    UrlGeneration,
    #[display(fmt = "Server Error: {}", _0)]
    EnvironmentError(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fields {
    Message(CommonError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommonError {
    Blank,
}

impl Fields {
    fn name(&self) -> &'static str {
        match self {
            Fields::Message(_) => "message",
        }
    }

    fn message(&self) -> &'static str {
        match self {
            Fields::Message(err) => err.message(),
        }
    }
}

impl CommonError {
    fn message(&self) -> &'static str {
        match self {
            CommonError::Blank => "This value should not be blank.",
        }
    }
}

/// `{"children": {"<field>": {"errors": [..]}}}`
fn field_errors(fields: &[Fields]) -> Value {
    let mut children = Map::new();
    for field in fields {
        let entry = children
            .entry(field.name())
            .or_insert_with(|| json!({ "errors": [] }));
        if let Some(errors) = entry["errors"].as_array_mut() {
            errors.push(json!(field.message()));
        }
    }
    json!({ "children": children })
}

// stores log their own failures with the path they were writing
impl From<StoreError> for ServerError {
    fn from(_: StoreError) -> ServerError {
        ServerError::Persistence
    }
}

impl From<actix_web::error::UrlGenerationError> for ServerError {
    fn from(err: actix_web::error::UrlGenerationError) -> ServerError {
        log::error!("{}", err);
        ServerError::UrlGeneration
    }
}

impl actix_web::error::ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::Validation(_) | ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Persistence
            | ServerError::UrlGeneration
            | ServerError::EnvironmentError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let code = self.status_code();
        let body = match self {
            ServerError::Validation(fields) => json!({
                "code": code.as_u16(),
                "message": self.to_string(),
                "errors": field_errors(fields),
            }),
            _ => json!({
                "code": code.as_u16(),
                "message": self.to_string(),
            }),
        };
        HttpResponse::build(code).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{body::to_bytes, ResponseError};

    #[actix_web::test]
    async fn not_found_body_carries_code_and_message() {
        let res = ServerError::NotFound.error_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(res.into_body()).await.unwrap();
        assert_eq!(
            serde_json::from_slice::<Value>(&body).unwrap(),
            json!({ "code": 404, "message": "Note does not exist." })
        );
    }

    #[actix_web::test]
    async fn validation_body_lists_field_errors() {
        let res =
            ServerError::Validation(vec![Fields::Message(CommonError::Blank)]).error_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(res.into_body()).await.unwrap();
        assert_eq!(
            serde_json::from_slice::<Value>(&body).unwrap(),
            json!({
                "code": 400,
                "message": "Validation Failed",
                "errors": {
                    "children": {
                        "message": { "errors": ["This value should not be blank."] }
                    }
                }
            })
        );
    }

    #[test]
    fn store_failures_become_server_errors() {
        let err: ServerError =
            StoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk gone")).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
