//! `X-API-KEY` boundary check. The service never stores the plaintext key,
//! only its SHA-256; a single shared secret stands in for the per-user
//! bearer-token extractors this style of `FromRequest` impl usually guards.

use actix_web::{dev::Payload, web, Error as ActixError, FromRequest, HttpRequest};
use sha2::{Digest, Sha256};
use std::future::{ready, Ready};

use crate::shared::api::ApiResponse;
use crate::AppState;

/// Marker extractor: present in a handler's argument list, the route is
/// rejected with `401` before the handler body runs unless the caller sent
/// a matching `X-API-KEY` header.
#[derive(Debug, Clone, Copy)]
pub struct ApiKeyAuth;

impl FromRequest for ApiKeyAuth {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            return ready(Err(actix_web::error::ErrorInternalServerError(
                "content service not configured",
            )));
        };

        let provided = req
            .headers()
            .get("X-API-KEY")
            .and_then(|v| v.to_str().ok());

        let Some(provided) = provided else {
            return ready(Err(unauthorized()));
        };

        let mut hasher = Sha256::new();
        hasher.update(provided.as_bytes());
        let digest = format!("{:x}", hasher.finalize());

        if digest == state.api_key_sha256 {
            ready(Ok(ApiKeyAuth))
        } else {
            ready(Err(unauthorized()))
        }
    }
}

fn unauthorized() -> ActixError {
    actix_web::error::InternalError::from_response(
        "missing or mismatched API key",
        ApiResponse::unauthorized("unauthorized", "missing or mismatched API key"),
    )
    .into()
}
