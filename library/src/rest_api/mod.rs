use actix_files::Files;
use actix_web::web;
use std::path::Path;

pub mod handlers;
use handlers::readings;

pub fn rest_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(web::resource("/current").route(web::get().to(readings::current)))
            .service(web::resource("/history").route(web::get().to(readings::history))),
    );
}

/// Static assets under `root`, with `index.html` answering `/`. Mount after
/// the API scope; `Files` refuses paths that climb out of `root`.
pub fn assets(root: &Path) -> Files {
    Files::new("/", root).index_file("index.html")
}
