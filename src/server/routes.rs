use crate::{
    error::ComicError,
    models::ComicResponse,
    pipeline::{history::display_page, validate_body, validate_theme},
    server::AppState,
};
use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::{json, Value};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .service(history)
        .service(generate_comic)
        .route("/generate-plot", web::post().to(generate_plot))
        .route("/api/generate/generate_plot", web::post().to(generate_plot))
        .route("/generate-image", web::post().to(generate_image))
        .route("/api/generate/generate_img", web::post().to(generate_image));
}

fn parse_body(body: &[u8]) -> Result<Value, ComicError> {
    serde_json::from_slice(body)
        .map_err(|e| ComicError::Validation(format!("Invalid JSON body: {}", e)))
}

#[get("/health")]
async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

async fn generate_plot(
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, ComicError> {
    let theme = validate_theme(&parse_body(&body)?)?;
    let pipeline = &state.pipeline;

    let comics = pipeline
        .with_deadline(pipeline.plot().generate(&theme))
        .await
        .map_err(|e| {
            log::error!("Plot route failed ({}): {}", e.kind(), e);
            e
        })?;

    Ok(HttpResponse::Ok().json(comics))
}

async fn generate_image(state: web::Data<AppState>, body: web::Bytes) -> HttpResponse {
    let pipeline = &state.pipeline;

    let result = match parse_body(&body).and_then(|body| validate_body(&body)) {
        Ok(request) => pipeline
            .with_deadline(pipeline.images().generate_all(request.prompts()))
            .await
            .map(|urls| (request.is_batch(), urls)),
        Err(e) => Err(e),
    };

    match result {
        Ok((true, image_urls)) => HttpResponse::Ok().json(json!({ "imageUrls": image_urls })),
        Ok((false, image_urls)) => {
            let image_url = image_urls.first().cloned();
            HttpResponse::Ok().json(json!({ "imageUrl": image_url, "imageUrls": image_urls }))
        }
        Err(e) => {
            log::error!("Image route failed ({}): {}", e.kind(), e);
            HttpResponse::InternalServerError().json(json!({
                "error": e.to_string(),
                "details": format!("{:?}", e),
            }))
        }
    }
}

#[post("/generate-comic")]
async fn generate_comic(
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, ComicError> {
    let theme = validate_theme(&parse_body(&body)?)?;
    let panels = state.pipeline.generate(&theme).await.map_err(|e| {
        log::error!("Comic route failed ({}): {}", e.kind(), e);
        e
    })?;

    Ok(HttpResponse::Ok().json(ComicResponse { panels }))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub skip: Option<usize>,
}

#[get("/history")]
async fn history(
    state: web::Data<AppState>,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse, ComicError> {
    let pipeline = &state.pipeline;
    let reader = pipeline.history();

    let page = pipeline
        .with_deadline(async {
            match (query.limit, query.skip) {
                (None, None) => reader.page(query.page.unwrap_or(0)).await,
                (limit, skip) => {
                    let limit = limit.unwrap_or(reader.page_size()).max(1);
                    let skip = skip.unwrap_or(0);
                    Ok(display_page(reader.read(limit, skip).await?, skip / limit))
                }
            }
        })
        .await
        .map_err(|e| {
            log::error!("History route failed ({}): {}", e.kind(), e);
            e
        })?;

    Ok(HttpResponse::Ok().json(page))
}
