use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use serde::Deserialize;
use serde_json::json;
use crate::aggregate::aggregate;
use crate::config::{TermConfig, TermOverrides};
use crate::diff::{diff, snapshot_records};
use crate::models::{Course, TimetableDocument};

#[derive(Deserialize)]
struct MergeRequest {
    courses: Vec<Course>,
    timetable: TimetableDocument,
    #[serde(default)]
    terms: TermOverrides,
}

#[derive(Deserialize)]
struct DiffRequest {
    previous: serde_json::Value,
    next: serde_json::Value,
}

/// POST /merge
/// Recibe `{courses, timetable, terms?}` y devuelve el catálogo enriquecido
/// junto con los contadores de la pasada.
async fn merge_handler(state: web::Data<TermConfig>, body: web::Json<serde_json::Value>) -> impl Responder {
    let request: MergeRequest = match serde_json::from_value(body.into_inner()) {
        Ok(r) => r,
        Err(e) => return HttpResponse::BadRequest().json(json!({"error": format!("invalid merge request: {}", e)})),
    };

    let terms = match state.merged_with(&request.terms) {
        Ok(t) => t,
        Err(e) if e.is_input_error() => return HttpResponse::BadRequest().json(json!({"error": e.to_string()})),
        Err(e) => return HttpResponse::InternalServerError().json(json!({"error": e.to_string()})),
    };

    let timetable = request.timetable.into_records();
    let courses = request.courses;
    let terms_block = terms.clone();

    // El merge es CPU puro; se saca del executor async
    let blocking = tokio::task::spawn_blocking(move || aggregate(courses, &timetable, &terms_block));
    let (merged, counters) = match blocking.await {
        Ok(res) => res,
        Err(e) => return HttpResponse::InternalServerError().json(json!({"error": format!("task join error: {}", e)})),
    };

    log::info!(
        "POST /merge: {} courses, new_sections={} new_courses={} winter_patch={}",
        merged.len(),
        counters.new_sections,
        counters.new_courses,
        counters.winter_patch
    );

    HttpResponse::Ok().json(json!({"courses": merged, "counters": counters, "terms": terms}))
}

/// POST /diff
async fn diff_handler(body: web::Json<serde_json::Value>) -> impl Responder {
    let request: DiffRequest = match serde_json::from_value(body.into_inner()) {
        Ok(r) => r,
        Err(e) => return HttpResponse::BadRequest().json(json!({"error": format!("invalid diff request: {}", e)})),
    };
    let (previous, next) = match (snapshot_records(request.previous), snapshot_records(request.next)) {
        (Some(p), Some(n)) => (p, n),
        _ => {
            return HttpResponse::BadRequest().json(json!({
                "error": "previous and next must be arrays of records or objects with a `courses` array"
            }))
        }
    };
    let result = diff(&previous, &next);
    HttpResponse::Ok().json(result)
}

async fn status_handler(state: web::Data<TermConfig>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "terms": state.get_ref(),
    }))
}

async fn help_handler() -> impl Responder {
    let example = json!({
        "courses": [{"department": "CS", "number": 101, "terms_offered": null}],
        "timetable": {"courses": [{"subj": "CS", "num": 101, "term": 202003, "period": "10"}]},
        "terms": {"current_code": 202003, "prior_code": 202001}
    });
    HttpResponse::Ok().json(json!({
        "description": "POST /merge enriches catalog courses with timetable offerings. POST /diff compares two timetable snapshots by CRN.",
        "merge_example": example,
        "diff_example": {"previous": [], "next": []},
        "note": "timetable may be the scraper envelope ({\"courses\": [...]}) or a plain array; terms are optional overrides"
    }))
}

/// Rutas del servicio; separado de `run_server` para poder montarlas en tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/merge", web::post().to(merge_handler))
        .route("/diff", web::post().to(diff_handler))
        .route("/status", web::get().to(status_handler))
        .route("/help", web::get().to(help_handler));
}

pub async fn run_server(bind_addr: &str, terms: TermConfig) -> std::io::Result<()> {
    log::info!("listening on http://{}", bind_addr);
    let state = web::Data::new(terms);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(web::JsonConfig::default().limit(64 * 1024 * 1024))
            .configure(configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}
