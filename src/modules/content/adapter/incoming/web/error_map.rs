//! Maps `CoreError`'s failure taxonomy onto the HTTP boundary's
//! `ApiResponse` envelope. One function covers every route so the taxonomy
//! only needs to be right in one place.

use actix_web::HttpResponse;

use crate::content::application::ports::incoming::error::CoreError;
use crate::shared::api::ApiResponse;

pub fn to_response(err: &CoreError) -> HttpResponse {
    let code = err.kind();
    let message = err.to_string();
    match err {
        CoreError::ContentNotFound(_)
        | CoreError::ObjectNotFound(_)
        | CoreError::StorageBackendNotFound(_) => ApiResponse::not_found(code, &message),
        CoreError::InvalidRequest(_) | CoreError::TooManyIds(_) => ApiResponse::bad_request(code, &message),
        CoreError::InvalidStatusTransition { .. } => ApiResponse::conflict(code, &message),
        CoreError::AlreadyExists(_) => ApiResponse::conflict(code, &message),
        CoreError::StorageFailure(_) => ApiResponse::bad_gateway(code, &message),
        CoreError::RepositoryFailure(_) => ApiResponse::internal_error(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use uuid::Uuid;

    #[test]
    fn not_found_maps_to_404() {
        let resp = to_response(&CoreError::ContentNotFound(Uuid::nil()));
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn invalid_status_transition_maps_to_409() {
        let resp = to_response(&CoreError::InvalidStatusTransition {
            from: "created".into(),
            to: "processed".into(),
        });
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn too_many_ids_maps_to_400_with_stable_code() {
        let err = CoreError::TooManyIds("at most 50 ids per request".into());
        assert_eq!(err.kind(), "too_many_ids");
        let resp = to_response(&err);
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn storage_failure_maps_to_502() {
        let resp = to_response(&CoreError::StorageFailure("timeout".into()));
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn repository_failure_maps_to_500() {
        let resp = to_response(&CoreError::RepositoryFailure("db down".into()));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
