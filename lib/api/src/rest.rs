use actix_cors::Cors;
use actix_files::{Files, NamedFile};
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use serde::{Deserialize, Serialize};
use simrec_core::{Error, Recommendation, Recommender};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error};

/// Upper bound on names returned by `/api/search`
pub const MAX_SEARCH_RESULTS: usize = 20;

const DEFAULT_PAGE: usize = 1;
const DEFAULT_PER_PAGE: usize = 50;

#[derive(Deserialize)]
struct ListParams {
    page: Option<String>,
    per_page: Option<String>,
}

#[derive(Deserialize)]
struct SearchParams {
    q: Option<String>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
    total_movies: usize,
}

#[derive(Serialize)]
struct MoviesResponse<'a> {
    total_movies: usize,
    page: usize,
    per_page: usize,
    movies: Vec<&'a str>,
}

#[derive(Serialize)]
struct SearchResponse<'a> {
    query: String,
    total_matches: usize,
    matches: Vec<&'a str>,
}

#[derive(Serialize)]
struct RecommendResponse {
    input_movie: String,
    recommendations: Vec<Recommendation>,
}

struct StaticDir(PathBuf);

pub struct RestApi;

impl RestApi {
    pub async fn start(
        recommender: Arc<Recommender>,
        host: &str,
        port: u16,
        static_dir: Option<PathBuf>,
    ) -> std::io::Result<()> {
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            let app = App::new()
                .wrap(cors)
                .app_data(web::Data::new(recommender.clone()))
                .configure(Self::configure);

            match &static_dir {
                Some(dir) => app.configure(|cfg| Self::configure_static(cfg, dir.clone())),
                None => app,
            }
        })
        .bind((host, port))?
        .run()
        .await
    }

    /// JSON API routes; expects `web::Data<Arc<Recommender>>` in the app
    pub fn configure(cfg: &mut web::ServiceConfig) {
        cfg.route("/api", web::get().to(api_docs))
            .route("/api/health", web::get().to(health))
            .route("/api/movies", web::get().to(list_movies))
            .route("/api/search", web::get().to(search_movies))
            .route("/api/recommend", web::post().to(recommend));
    }

    /// Home page at `/` and assets under `/static`
    pub fn configure_static(cfg: &mut web::ServiceConfig, dir: PathBuf) {
        if dir.is_dir() {
            cfg.service(Files::new("/static", dir.clone()));
        }
        cfg.app_data(web::Data::new(StaticDir(dir)))
            .route("/", web::get().to(index));
    }
}

async fn index(static_dir: web::Data<StaticDir>) -> ActixResult<NamedFile> {
    Ok(NamedFile::open_async(static_dir.0.join("index.html")).await?)
}

async fn health(recommender: web::Data<Arc<Recommender>>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        message: "Movie Recommender API is running!",
        total_movies: recommender.len(),
    }))
}

async fn list_movies(
    recommender: web::Data<Arc<Recommender>>,
    query: web::Query<ListParams>,
) -> ActixResult<HttpResponse> {
    let page = parse_positive(query.page.as_deref(), DEFAULT_PAGE);
    let per_page = parse_positive(query.per_page.as_deref(), DEFAULT_PER_PAGE);
    let catalog = recommender.catalog();

    Ok(HttpResponse::Ok().json(MoviesResponse {
        total_movies: catalog.len(),
        page,
        per_page,
        movies: catalog.page(page, per_page),
    }))
}

async fn search_movies(
    recommender: web::Data<Arc<Recommender>>,
    query: web::Query<SearchParams>,
) -> ActixResult<HttpResponse> {
    let q = query.q.as_deref().unwrap_or_default().to_lowercase();
    let catalog = recommender.catalog();

    match catalog.search(&q, MAX_SEARCH_RESULTS) {
        Ok(matches) => Ok(HttpResponse::Ok().json(SearchResponse {
            total_matches: catalog.matches(&q).count(),
            matches,
            query: q,
        })),
        Err(_) => Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Please provide a search query using ?q=movie_name"
        }))),
    }
}

async fn recommend(
    recommender: web::Data<Arc<Recommender>>,
    body: web::Bytes,
) -> ActixResult<HttpResponse> {
    let movie = match parse_movie(&body) {
        Some(movie) => movie,
        None => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Please provide a movie name in the request body",
                "example": { "movie": "Avatar" }
            })));
        }
    };

    match recommender.recommend(&movie) {
        Ok(recommendations) => Ok(HttpResponse::Ok().json(RecommendResponse {
            input_movie: movie,
            recommendations,
        })),
        Err(Error::NotFound(_)) => {
            debug!("No catalog entry named {:?}", movie);
            Ok(HttpResponse::NotFound().json(serde_json::json!({
                "error": format!("Movie \"{}\" not found in database", movie),
                "suggestion": "Use /api/search?q=movie_name endpoint to find available movies"
            })))
        }
        Err(e) => {
            error!("Recommendation for {:?} failed: {}", movie, e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string()
            })))
        }
    }
}

async fn api_docs() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Movie Recommender API Documentation",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "GET /api": "API documentation (this page)",
            "GET /api/health": "Check API health status",
            "GET /api/movies?page=1&per_page=50": "Get paginated list of available movies",
            "GET /api/search?q=<query>": "Search for movies by name",
            "POST /api/recommend": "Get movie recommendations (body: {\"movie\": \"Movie Name\"})"
        },
        "example_usage": {
            "search": "/api/search?q=avatar",
            "recommend": {
                "url": "/api/recommend",
                "method": "POST",
                "body": { "movie": "Avatar" }
            }
        }
    })))
}

/// `{"movie": "<name>"}` from a raw body.
///
/// Anything else is rejected, including a `movie` that is present but not a
/// string (`3`, `null`, `true`). Those get the 400 "provide a movie name"
/// response with the example payload instead of a 404 for a stringified
/// value, since no catalog title can ever match them.
fn parse_movie(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value.get("movie")?.as_str().map(str::to_string)
}

fn parse_positive(value: Option<&str>, default: usize) -> usize {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|v| *v >= 1)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{json, Value};
    use simrec_core::{Catalog, SimilarityIndex};

    fn recommender() -> Arc<Recommender> {
        Arc::new(
            Recommender::new(
                Catalog::from_names(["Avatar", "Titanic", "Inception"]),
                SimilarityIndex::from_rows(vec![
                    vec![0.9, 0.95, 0.3],
                    vec![0.95, 1.0, 0.2],
                    vec![0.3, 0.2, 1.0],
                ])
                .unwrap(),
            )
            .unwrap(),
        )
    }

    macro_rules! app {
        () => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(recommender()))
                    .configure(RestApi::configure),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_parse_positive() {
        assert_eq!(parse_positive(None, 50), 50);
        assert_eq!(parse_positive(Some("abc"), 50), 50);
        assert_eq!(parse_positive(Some("0"), 50), 50);
        assert_eq!(parse_positive(Some("-2"), 1), 1);
        assert_eq!(parse_positive(Some("7"), 50), 7);
    }

    #[actix_web::test]
    async fn test_health() {
        let app = app!();
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "healthy");
        assert_eq!(body["total_movies"], 3);
    }

    #[actix_web::test]
    async fn test_list_movies() {
        let app = app!();

        let req = test::TestRequest::get().uri("/api/movies?page=2&per_page=2").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["movies"], json!(["Inception"]));
        assert_eq!(body["page"], 2);

        let req = test::TestRequest::get().uri("/api/movies?page=x&per_page=").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["page"], 1);
        assert_eq!(body["per_page"], 50);
        assert_eq!(body["movies"], json!(["Avatar", "Titanic", "Inception"]));

        let req = test::TestRequest::get().uri("/api/movies?page=1000").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["movies"], json!([]));
        assert_eq!(body["total_movies"], 3);
    }

    #[actix_web::test]
    async fn test_search() {
        let app = app!();

        let req = test::TestRequest::get().uri("/api/search?q=TI").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["query"], "ti");
        assert_eq!(body["total_matches"], 2);
        assert_eq!(body["matches"], json!(["Titanic", "Inception"]));

        let req = test::TestRequest::get().uri("/api/search").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get().uri("/api/search?q=").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_recommend() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/api/recommend")
            .set_json(json!({"movie": "Avatar"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["input_movie"], "Avatar");
        assert_eq!(
            body["recommendations"],
            json!([
                {"title": "Avatar", "similarity_score": 0.9},
                {"title": "Inception", "similarity_score": 0.3}
            ])
        );
    }

    #[actix_web::test]
    async fn test_recommend_not_found() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/api/recommend")
            .set_json(json!({"movie": "Not A Real Movie"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Movie \"Not A Real Movie\" not found in database");
        assert!(body["suggestion"].as_str().unwrap().contains("/api/search"));
    }

    #[actix_web::test]
    async fn test_recommend_bad_request() {
        let app = app!();

        for payload in [&b"{}"[..], b"{\"film\": \"Avatar\"}", b"not json", b"{\"movie\": 3}", b"{\"movie\": null}", b""] {
            let req = test::TestRequest::post()
                .uri("/api/recommend")
                .insert_header(("content-type", "application/json"))
                .set_payload(payload.to_vec())
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["example"], json!({"movie": "Avatar"}));
        }
    }

    #[actix_web::test]
    async fn test_docs() {
        let app = app!();
        let req = test::TestRequest::get().uri("/api").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], "Movie Recommender API Documentation");
        assert!(body["endpoints"]["POST /api/recommend"].is_string());
    }

    #[actix_web::test]
    async fn test_index_page() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>simrec</h1>").unwrap();
        let static_dir = dir.path().to_path_buf();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(recommender()))
                .configure(RestApi::configure)
                .configure(|cfg| RestApi::configure_static(cfg, static_dir.clone())),
        )
        .await;

        let req = test::TestRequest::get().uri("/").to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(&body[..], b"<h1>simrec</h1>");

        let req = test::TestRequest::get().uri("/static/index.html").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_index_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let static_dir = dir.path().join("missing");

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(recommender()))
                .configure(|cfg| RestApi::configure_static(cfg, static_dir.clone())),
        )
        .await;

        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
