//! Full `/contents` CRUD plus the derived-content and streamed-upload
//! surfaces. Complements `handlers::files`, which covers the
//! presigned-URL flow instead of streaming bytes through this service.

use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use futures::TryStreamExt;
use tokio::io::AsyncRead;
use tokio_util::io::{ReaderStream, StreamReader};
use uuid::Uuid;

use crate::content::application::domain::entities::ContentStatus;
use crate::content::application::ports::incoming::core_service::{
    CoreService, CreateContentRequest, DeleteContentOptions, UpdateContentRequest,
    UploadContentRequest, UploadDerivedContentRequest,
};
use crate::content::application::ports::incoming::derivation_service::{
    CreateDerivedContentRelationshipRequest, DerivationService,
};
use crate::content::application::ports::incoming::error::CoreError;
use crate::content::application::ports::incoming::storage_service::StorageService;
use crate::content::application::ports::outgoing::content_query::PageRequest as ContentPageRequest;
use crate::content::application::ports::outgoing::derived_repository::{
    DerivedContentFilter, DerivedContentSort, PageRequest as DerivedPageRequest,
};
use crate::AppState;

use super::super::dto::{
    page_bounds, CreateContentBody, CreateDerivedRelationshipBody, DeleteContentQuery,
    ListContentQuery, ListDerivedQuery, ObjectResponse, UpdateContentBody, UploadContentQuery,
    UploadDerivedContentQuery,
};
use super::super::dto::{ContentResponse, DerivedContentResponse};
use super::super::error_map::to_response;
use super::super::extractors::ApiKeyAuth;

#[post("/contents")]
pub async fn create_content(
    data: web::Data<AppState>,
    _auth: ApiKeyAuth,
    body: web::Json<CreateContentBody>,
) -> impl Responder {
    let body = body.into_inner();
    match data
        .content
        .create_content(CreateContentRequest {
            tenant_id: body.tenant_id,
            owner_id: body.owner_id,
            owner_type: body.owner_type,
            name: body.name,
            description: body.description,
            document_type: body.document_type,
            derivation_type: body.derivation_type,
        })
        .await
    {
        Ok(content) => HttpResponse::Created().json(ContentResponse::from(&content)),
        Err(err) => to_response(&err),
    }
}

#[get("/contents")]
pub async fn list_contents(
    data: web::Data<AppState>,
    _auth: ApiKeyAuth,
    query: web::Query<ListContentQuery>,
) -> impl Responder {
    let query = query.into_inner();
    let (limit, offset) = page_bounds(query.limit, query.offset);
    match data
        .content
        .list_content(
            &query.tenant_id,
            &query.owner_id,
            ContentPageRequest { limit, offset },
        )
        .await
    {
        Ok(contents) => {
            let items: Vec<ContentResponse> = contents.iter().map(ContentResponse::from).collect();
            HttpResponse::Ok().json(items)
        }
        Err(err) => to_response(&err),
    }
}

#[get("/contents/{id}")]
pub async fn get_content(
    data: web::Data<AppState>,
    _auth: ApiKeyAuth,
    path: web::Path<Uuid>,
) -> impl Responder {
    match data.content.get_content(path.into_inner()).await {
        Ok(content) => HttpResponse::Ok().json(ContentResponse::from(&content)),
        Err(err) => to_response(&err),
    }
}

#[patch("/contents/{id}")]
pub async fn update_content(
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
        Ok(content) => HttpResponse::Ok().json(ContentResponse::from(&content)),
        Err(err) => to_response(&err),
    }
}

#[delete("/contents/{id}")]
pub async fn delete_content(
    data: web::Data<AppState>,
    _auth: ApiKeyAuth,
    path: web::Path<Uuid>,
    query: web::Query<DeleteContentQuery>,
) -> impl Responder {
    match data
        .content
        .delete_content(
            path.into_inner(),
            DeleteContentOptions {
                cascade_objects: query.cascade_objects,
            },
        )
        .await
    {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => to_response(&err),
    }
}

#[get("/contents/{id}/objects")]
pub async fn list_objects(
    data: web::Data<AppState>,
    _auth: ApiKeyAuth,
    path: web::Path<Uuid>,
) -> impl Responder {
    match data.content.get_objects_by_content_id(path.into_inner()).await {
        Ok(objects) => {
            let items: Vec<ObjectResponse> = objects.iter().map(ObjectResponse::from).collect();
            HttpResponse::Ok().json(items)
        }
        Err(err) => to_response(&err),
    }
}

#[get("/contents/{id}/download")]
pub async fn download_content(
    data: web::Data<AppState>,
    _auth: ApiKeyAuth,
    path: web::Path<Uuid>,
) -> impl Responder {
    match data.content.download_content(path.into_inner()).await {
        Ok(reader) => {
            let stream = ReaderStream::new(reader);
            HttpResponse::Ok()
                .content_type("application/octet-stream")
                .streaming(stream)
        }
        Err(err) => to_response(&err),
    }
}

#[get("/contents/{id}/derived")]
pub async fn list_derived(
    data: web::Data<AppState>,
    _auth: ApiKeyAuth,
    path: web::Path<Uuid>,
    query: web::Query<ListDerivedQuery>,
) -> impl Responder {
    let query = query.into_inner();

    let mut content_statuses = Vec::new();
    for status in query.statuses() {
        match status.parse::<ContentStatus>() {
            Ok(s) => content_statuses.push(s),
            Err(message) => return to_response(&CoreError::InvalidRequest(message)),
        }
    }

    let sort = match query.sort.as_deref() {
        Some("created_at_asc") => DerivedContentSort::CreatedAtAsc,
        Some("type_variant") => DerivedContentSort::TypeVariant,
        Some("created_at_desc") | None => DerivedContentSort::CreatedAtDesc,
        Some(other) => {
            return to_response(&CoreError::InvalidRequest(format!(
                "unknown sort: {other}"
            )))
        }
    };

    let (limit, offset) = page_bounds(query.limit, query.offset);
    let filter = DerivedContentFilter {
        parent_ids: vec![path.into_inner()],
        derivation_types: query.derivation_types(),
        variants: query.variants(),
        content_statuses,
        created_after: query.created_after,
        created_before: query.created_before,
        ..Default::default()
    };

    match data
        .content
        .list_derived_content(filter, sort, DerivedPageRequest { limit, offset })
        .await
    {
        Ok(items) => {
            let items: Vec<DerivedContentResponse> =
                items.iter().map(DerivedContentResponse::from).collect();
            HttpResponse::Ok().json(items)
        }
        Err(err) => to_response(&err),
    }
}

#[post("/contents/{id}/derived")]
pub async fn create_derived_relationship(
    data: web::Data<AppState>,
    _auth: ApiKeyAuth,
    path: web::Path<Uuid>,
    body: web::Json<CreateDerivedRelationshipBody>,
) -> impl Responder {
    let body = body.into_inner();
    match data
        .content
        .create_derived_content_relationship(CreateDerivedContentRelationshipRequest {
            parent_id: path.into_inner(),
            content_id: body.content_id,
            derivation_type: body.derivation_type,
            variant: body.variant,
            derivation_params: body.derivation_params,
            processing_metadata: body.processing_metadata,
        })
        .await
    {
        Ok(derived) => HttpResponse::Created().json(DerivedContentResponse::from(&derived)),
        Err(err) => to_response(&err),
    }
}

fn body_reader(payload: web::Payload) -> Box<dyn AsyncRead + Send + Unpin> {
    let stream = payload.map_err(|e| std::io::Error::other(e.to_string()));
    Box::new(StreamReader::new(stream))
}

/// `POST /contents/upload`: create + stream bytes through in one call,
/// distinct from the presigned `/files` flow which never routes bytes
/// through this process.
#[post("/contents/upload")]
pub async fn upload_content(
    data: web::Data<AppState>,
    _auth: ApiKeyAuth,
    query: web::Query<UploadContentQuery>,
    payload: web::Payload,
) -> impl Responder {
    let query = query.into_inner();
    match data
        .content
        .upload_content(UploadContentRequest {
            tenant_id: query.tenant_id,
            owner_id: query.owner_id,
            owner_type: query.owner_type,
            name: query.name,
            document_type: query.document_type,
            mime_type: query.mime_type,
            tags: query.tags,
            custom_metadata: Default::default(),
            storage_backend_name: query.storage_backend,
            reader: body_reader(payload),
        })
        .await
    {
        Ok(content) => HttpResponse::Created().json(ContentResponse::from(&content)),
        Err(err) => to_response(&err),
    }
}

#[post("/contents/{parent_id}/derived/upload")]
pub async fn upload_derived_content(
    data: web::Data<AppState>,
    _auth: ApiKeyAuth,
    path: web::Path<Uuid>,
    query: web::Query<UploadDerivedContentQuery>,
    payload: web::Payload,
) -> impl Responder {
    let query = query.into_inner();
    match data
        .content
        .upload_derived_content(UploadDerivedContentRequest {
            parent_id: path.into_inner(),
            tenant_id: query.tenant_id,
            owner_id: query.owner_id,
            owner_type: query.owner_type,
            name: query.name,
            document_type: query.document_type,
            mime_type: query.mime_type,
            derivation_type: query.derivation_type,
            variant: query.variant,
            derivation_params: Default::default(),
            storage_backend_name: query.storage_backend,
            reader: body_reader(payload),
        })
        .await
    {
        Ok(content) => HttpResponse::Created().json(ContentResponse::from(&content)),
        Err(err) => to_response(&err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};
    use sha2::{Digest, Sha256};

    fn state() -> web::Data<AppState> {
        let mut hasher = Sha256::new();
        hasher.update(b"testkey");
        let digest = format!("{:x}", hasher.finalize());
        web::Data::new(AppState::for_tests(digest))
    }

    fn create_body() -> CreateContentBody {
        CreateContentBody {
            tenant_id: "t1".into(),
            owner_id: "o1".into(),
            owner_type: "user".into(),
            name: "report.pdf".into(),
            description: String::new(),
            document_type: "pdf".into(),
            derivation_type: String::new(),
        }
    }

    #[actix_web::test]
    async fn create_then_get_round_trips() {
        let app = test::init_service(
            App::new()
                .app_data(state())
                .service(create_content)
                .service(get_content),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/contents")
            .insert_header(("X-API-KEY", "testkey"))
            .set_json(&create_body())
            .to_request();
        let created: ContentResponse = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::get()
            .uri(&format!("/contents/{}", created.id))
            .insert_header(("X-API-KEY", "testkey"))
            .to_request();
        let fetched: ContentResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(fetched.id, created.id);
    }

    #[actix_web::test]
    async fn get_missing_content_is_404() {
        let app = test::init_service(App::new().app_data(state()).service(get_content)).await;
        let req = test::TestRequest::get()
            .uri(&format!("/contents/{}", Uuid::new_v4()))
            .insert_header(("X-API-KEY", "testkey"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn delete_then_get_is_404() {
        let app = test::init_service(
            App::new()
                .app_data(state())
                .service(create_content)
                .service(delete_content)
                .service(get_content),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/contents")
            .insert_header(("X-API-KEY", "testkey"))
            .set_json(&create_body())
            .to_request();
        let created: ContentResponse = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::delete()
            .uri(&format!("/contents/{}", created.id))
            .insert_header(("X-API-KEY", "testkey"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::get()
            .uri(&format!("/contents/{}", created.id))
            .insert_header(("X-API-KEY", "testkey"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
