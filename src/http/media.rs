//! Read-only view of the object bucket at `/media`.

use actix_web::{get, web, HttpResponse};

use crate::error::AppResult;
use crate::storage::{content_type_for, Bucket};

#[get("/media/{tail:.*}")]
pub async fn object(tail: web::Path<String>, bucket: web::Data<Bucket>) -> AppResult<HttpResponse> {
    let bytes = bucket.read(&tail).await?;
    Ok(HttpResponse::Ok()
        .content_type(content_type_for(&tail))
        .body(bytes))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(object);
}
