//! The presigned-upload flow (`/files`): a caller reserves a content +
//! object pair, PUTs bytes straight to the backend with the returned URL,
//! then tells us it's done. Distinct from `/contents/upload`, which streams
//! bytes through this service instead.

use actix_web::{get, patch, post, web, HttpResponse, Responder};
use uuid::Uuid;

use crate::content::application::domain::entities::Object;
use crate::content::application::ports::incoming::core_service::{
    CoreService, CreateContentRequest, UpdateContentRequest,
};
use crate::content::application::ports::incoming::storage_service::{CreateObjectRequest, StorageService};
use crate::AppState;

use super::super::dto::{
    FileDetailResponse, InitFileUploadBody, InitFileUploadResponse, ObjectMetadataResponse,
    UpdateContentBody,
};
use super::super::error_map::to_response;
use super::super::extractors::ApiKeyAuth;

/// Picks the object a presigned `/files` operation should act on: the most
/// recently created, non-deleted object for the content (this flow assumes
/// one live object per content, matching the "original" half of the model;
/// derived variants are managed through `/contents/{id}/derived`).
fn current_object(objects: Vec<Object>) -> Option<Object> {
    objects
        .into_iter()
        .filter(|o| !o.is_deleted())
        .max_by_key(|o| o.created_at)
}

#[post("/files")]
pub async fn init_file_upload(
    data: web::Data<AppState>,
    _auth: ApiKeyAuth,
    body: web::Json<InitFileUploadBody>,
) -> impl Responder {
    let body = body.into_inner();

    let content = match data
        .content
        .create_content(CreateContentRequest {
            tenant_id: body.tenant_id,
            owner_id: body.owner_id,
            owner_type: body.owner_type,
            name: body.name,
            description: body.description,
            document_type: body.document_type,
            derivation_type: String::new(),
        })
        .await
    {
        Ok(content) => content,
        Err(err) => return to_response(&err),
    };

    let object = match data
        .content
        .create_object(CreateObjectRequest {
            content_id: content.id,
            storage_backend_name: body.storage_backend,
            storage_class: body.storage_class,
            file_name: body.file_name,
            object_type: body.object_type,
            variant: None,
        })
        .await
    {
        Ok(object) => object,
        Err(err) => return to_response(&err),
    };

    // An upload pipeline has now been initiated: created -> uploading.
    if let Err(err) = data
        .content
        .update_content(UpdateContentRequest {
            id: content.id,
            status: Some("uploading".to_string()),
            ..Default::default()
        })
        .await
    {
        return to_response(&err);
    }

    let upload_url = match data.content.get_upload_url(object.id).await {
        Ok(url) => url,
        Err(err) => return to_response(&err),
    };

    HttpResponse::Created().json(InitFileUploadResponse {
        content_id: content.id,
        object_id: object.id,
        upload_url,
    })
}

/// Tells the service the caller finished PUTting bytes to the presigned
/// URL: reconciles `ObjectMetadata` against a fresh `stat` of the backend
/// and advances the content to `uploaded`.
#[post("/files/{id}/complete")]
pub async fn complete_file_upload(
    data: web::Data<AppState>,
    _auth: ApiKeyAuth,
    path: web::Path<Uuid>,
) -> impl Responder {
    let content_id = path.into_inner();

    let objects = match data.content.get_objects_by_content_id(content_id).await {
        Ok(objects) => objects,
        Err(err) => return to_response(&err),
    };
    let Some(object) = current_object(objects) else {
        return to_response(&crate::content::application::ports::incoming::error::CoreError::ObjectNotFound(content_id));
    };

    if let Err(err) = data.content.update_object_meta_from_storage(object.id).await {
        return to_response(&err);
    }

    match data
        .content
        .update_content(UpdateContentRequest {
            id: content_id,
            status: Some("uploaded".to_string()),
            ..Default::default()
        })
        .await
    {
        Ok(content) => HttpResponse::Ok().json(crate::content::adapter::incoming::web::dto::ContentResponse::from(&content)),
        Err(err) => to_response(&err),
    }
}

#[patch("/files/{id}")]
pub async fn update_file(
    data: web::Data<AppState>,
    _auth: ApiKeyAuth,
    path: web::Path<Uuid>,
    body: web::Json<UpdateContentBody>,
) -> impl Responder {
    let body = body.into_inner();
    match data
        .content
        .update_content(UpdateContentRequest {
            id: path.into_inner(),
            name: body.name,
            description: body.description,
            status: body.status,
        })
        .await
    {
        Ok(content) => HttpResponse::Ok().json(crate::content::adapter::incoming::web::dto::ContentResponse::from(&content)),
        Err(err) => to_response(&err),
    }
}

#[get("/files/{id}")]
pub async fn get_file(
    data: web::Data<AppState>,
    _auth: ApiKeyAuth,
    path: web::Path<Uuid>,
) -> impl Responder {
    let content_id = path.into_inner();
    match file_detail(&data, content_id).await {
        Ok(detail) => HttpResponse::Ok().json(detail),
        Err(err) => to_response(&err),
    }
}

async fn file_detail(
    data: &web::Data<AppState>,
    content_id: Uuid,
) -> Result<FileDetailResponse, crate::content::application::ports::incoming::error::CoreError> {
    let content = data.content.get_content(content_id).await?;
    let objects = data.content.get_objects_by_content_id(content_id).await?;
    let Some(object) = current_object(objects) else {
        return Err(
            crate::content::application::ports::incoming::error::CoreError::ObjectNotFound(
                content_id,
            ),
        );
    };

    let metadata = data
        .content
        .get_object_metadata(object.id)
        .await
        .unwrap_or_default();
    let preview_url = data.content.get_preview_url(object.id).await.ok();
    let download_url = data.content.get_download_url(object.id).await.ok();

    Ok(FileDetailResponse {
        content_id: content.id,
        file_name: object.file_name,
        preview_url,
        download_url,
        metadata: ObjectMetadataResponse::from(&metadata),
        status: content.status.to_string(),
        created_at: content.created_at,
        updated_at: content.updated_at,
    })
}

#[get("/files/bulk")]
pub async fn get_files_bulk(
    data: web::Data<AppState>,
    _auth: ApiKeyAuth,
    query: web::Query<super::super::dto::BulkFilesQuery>,
) -> impl Responder {
    let ids = match query.parse_ids() {
        Ok(ids) => ids,
        Err(message) => {
            return to_response(
                &crate::content::application::ports::incoming::error::CoreError::InvalidRequest(
                    message,
                ),
            )
        }
    };

    if ids.len() > super::super::dto::MAX_BULK_IDS {
        return to_response(
            &crate::content::application::ports::incoming::error::CoreError::TooManyIds(
                format!("at most {} ids per request", super::super::dto::MAX_BULK_IDS),
            ),
        );
    }

    let mut items = Vec::new();
    let mut failed = Vec::new();
    for id in ids {
        match file_detail(&data, id).await {
            Ok(detail) => items.push(super::super::dto::BulkFileItem { id, detail }),
            Err(err) => failed.push(super::super::dto::BulkFailure {
                id,
                code: err.kind().to_string(),
                message: err.to_string(),
            }),
        }
    }

    HttpResponse::Ok().json(super::super::dto::BulkFilesResponse { items, failed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use sha2::{Digest, Sha256};

    fn state() -> web::Data<AppState> {
        let mut hasher = Sha256::new();
        hasher.update(b"testkey");
        let digest = format!("{:x}", hasher.finalize());
        web::Data::new(AppState::for_tests(digest))
    }

    #[actix_web::test]
    async fn init_upload_then_complete_then_get_round_trips() {
        let app_state = state();
        let app = test::init_service(
            App::new()
                .app_data(app_state.clone())
                .service(init_file_upload)
                .service(complete_file_upload)
                .service(get_file),
        )
        .await;

        let body = InitFileUploadBody {
            tenant_id: "t1".into(),
            owner_id: "o1".into(),
            owner_type: "user".into(),
            name: "report.pdf".into(),
            description: String::new(),
            document_type: "pdf".into(),
            file_name: "report.pdf".into(),
            object_type: "original".into(),
            storage_class: "standard".into(),
            storage_backend: "memory".into(),
        };

        let req = test::TestRequest::post()
            .uri("/files")
            .insert_header(("X-API-KEY", "testkey"))
            .set_json(&body)
            .to_request();
        let resp: InitFileUploadResponse = test::call_and_read_body_json(&app, req).await;

        // Simulate the caller PUTting bytes directly to the backend via
        // the presigned URL, out of band from this HTTP surface.
        app_state
            .content
            .upload_object(
                resp.object_id,
                Box::new(std::io::Cursor::new(b"hello world".to_vec())),
            )
            .await
            .unwrap();

        let req = test::TestRequest::post()
            .uri(&format!("/files/{}/complete", resp.content_id))
            .insert_header(("X-API-KEY", "testkey"))
            .to_request();
        let status = test::call_service(&app, req).await.status();
        assert!(status.is_success());

        let req = test::TestRequest::get()
            .uri(&format!("/files/{}", resp.content_id))
            .insert_header(("X-API-KEY", "testkey"))
            .to_request();
        let detail: FileDetailResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(detail.content_id, resp.content_id);
        assert_eq!(detail.status, "uploaded");
    }

    #[actix_web::test]
    async fn get_file_without_api_key_is_unauthorized() {
        let app = test::init_service(App::new().app_data(state()).service(get_file)).await;
        let req = test::TestRequest::get()
            .uri(&format!("/files/{}", Uuid::new_v4()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }
}
