//! HTTP handler functions for the geotag API.

use actix_web::{HttpResponse, http::header::ContentType, web};
use geotag_server_models::{ApiError, ApiHealth, PresentationParams, TagQueryParams};
use geotag_tagger::{TagConfig, TagEngine, TagError};
use geotag_tagger_models::{TagResult, TaggingRequest};

use crate::AppState;

/// `GET /health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /`
///
/// Tags a footprint passed as query parameters. Taggers are a comma
/// separated list and run with default options.
pub async fn tag_get(state: web::Data<AppState>, params: web::Query<TagQueryParams>) -> HttpResponse {
    let params = params.into_inner();
    let presentation = PresentationParams {
        pretty: params.pretty,
        wkt: params.wkt,
    };
    tag(&state, &params.into_request(), presentation).await
}

/// `PUT /`
///
/// Tags a footprint from a JSON body carrying per-tagger options.
pub async fn tag_put(
    state: web::Data<AppState>,
    body: web::Json<TaggingRequest>,
    params: web::Query<PresentationParams>,
) -> HttpResponse {
    tag(&state, &body.into_inner(), params.into_inner()).await
}

async fn tag(
    state: &AppState,
    request: &TaggingRequest,
    presentation: PresentationParams,
) -> HttpResponse {
    let config = TagConfig {
        return_geometries: presentation.wkt,
        ..TagConfig::default()
    };

    match TagEngine::new(config).tag(state.db.as_ref(), request).await {
        Ok(result) => render(&result, presentation.pretty),
        Err(err) => error_response(&err),
    }
}

fn render(result: &TagResult, pretty: bool) -> HttpResponse {
    if !pretty {
        return HttpResponse::Ok().json(result);
    }
    match serde_json::to_string_pretty(result) {
        Ok(body) => HttpResponse::Ok()
            .content_type(ContentType::json())
            .body(body),
        Err(err) => {
            log::error!("failed to serialize response: {err}");
            HttpResponse::InternalServerError().json(ApiError {
                error_message: "Serialization error".to_string(),
                error_code: 500,
            })
        }
    }
}

fn error_response(err: &TagError) -> HttpResponse {
    let status = match err {
        TagError::MissingGeometry | TagError::InvalidGeometry(_) => 400,
        _ => 500,
    };
    let body = ApiError {
        error_message: err.to_string(),
        error_code: status,
    };
    if status == 400 {
        HttpResponse::BadRequest().json(body)
    } else {
        log::error!("tagging failed: {err}");
        HttpResponse::InternalServerError().json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_errors_map_to_bad_request() {
        let response = error_response(&TagError::MissingGeometry);
        assert_eq!(response.status(), 400);
        let response = error_response(&TagError::InvalidGeometry("Invalid geometry".to_string()));
        assert_eq!(response.status(), 400);
    }

    #[test]
    fn infrastructure_errors_map_to_server_error() {
        assert_eq!(error_response(&TagError::Connection).status(), 500);
        assert_eq!(error_response(&TagError::QueryTimeout).status(), 500);
        assert_eq!(error_response(&TagError::GeometryTransform).status(), 500);
    }
}
