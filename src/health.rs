use actix_web::{get, web, HttpResponse, Responder};
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Serialize)]
struct ReadinessResponse {
    status: &'static str,
    database: &'static str,
}

/// Liveness probe: must not depend on the repository being reachable.
#[get("/healthz")]
pub async fn healthz() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

/// READINESS PROBE. With the memory-backed repository (no `DATABASE_URL`
/// pointing at Postgres) there is nothing to ping, so readiness reduces to
/// liveness.
#[get("/healthz/ready")]
pub async fn healthz_ready(data: web::Data<AppState>) -> impl Responder {
    let database_status = match &data.db {
        Some(conn) => ping(conn).await,
        None => "ok",
    };

    if database_status == "ok" {
        HttpResponse::Ok().json(ReadinessResponse {
            status: "ok",
            database: database_status,
        })
    } else {
        HttpResponse::ServiceUnavailable().json(ReadinessResponse {
            status: "unhealthy",
            database: database_status,
        })
    }
}

async fn ping(conn: &DatabaseConnection) -> &'static str {
    match conn
        .execute(Statement::from_string(
            conn.get_database_backend(),
            "SELECT 1",
        ))
        .await
    {
        Ok(_) => "ok",
        Err(_) => "unhealthy",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};

    #[actix_web::test]
    async fn healthz_returns_ok_text_body() {
        let app = test::init_service(App::new().service(healthz)).await;
        let req = test::TestRequest::get().uri("/healthz").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        assert_eq!(body, "OK");
    }
}
