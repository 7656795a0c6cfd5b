#![allow(dead_code)]

use actix_rt::time::delay_for;
use actix_web::{test, web, App, HttpResponse};
use futures::stream::{self, StreamExt};
use library::{AppContext, Config};
use serde_json::{json, Value};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;
use tempfile::TempDir;

/// Stand-in for the upstream devices endpoint that counts requests
pub struct Upstream {
    pub server: test::TestServer,
    hits: Arc<AtomicUsize>,
}

impl Upstream {
    pub fn respond_with(body: Value) -> Upstream {
        Upstream::start(body, 200)
    }

    pub fn failing(status: u16) -> Upstream {
        Upstream::start(Value::Null, status)
    }

    /// Sends the response headers and an opening `[`, then holds the body
    /// open for `stall` before closing the array.
    pub fn stalling(stall: Duration) -> Upstream {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let server = test::start(move || {
            let counter = counter.clone();
            App::new().route(
                "/v1/devices",
                web::get().to(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    let opening = stream::once(async {
                        Ok::<_, actix_web::Error>(web::Bytes::from_static(b"["))
                    });
                    let closing = stream::once(async move {
                        delay_for(stall).await;
                        Ok::<_, actix_web::Error>(web::Bytes::from_static(b"]"))
                    });
                    async move {
                        HttpResponse::Ok()
                            .content_type("application/json")
                            .streaming(Box::pin(opening.chain(closing)))
                    }
                }),
            )
        });
        Upstream { server, hits }
    }

    fn start(body: Value, status: u16) -> Upstream {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let server = test::start(move || {
            let body = body.clone();
            let counter = counter.clone();
            App::new().route(
                "/v1/devices",
                web::get().to(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    let body = body.clone();
                    async move {
                        if status == 200 {
                            HttpResponse::Ok().json(body)
                        } else {
                            HttpResponse::InternalServerError().finish()
                        }
                    }
                }),
            )
        });
        Upstream { server, hits }
    }

    pub fn url(&self) -> String {
        self.server.url("/v1/devices")
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

pub fn config(api_url: &str, dir: &TempDir) -> Config {
    Config {
        api_key: Some("test-api-key".to_owned()),
        app_key: Some("test-app-key".to_owned()),
        api_url: api_url.to_owned(),
        database_url: dir
            .path()
            .join("weather.db")
            .to_str()
            .unwrap()
            .to_owned(),
        static_dir: dir.path().to_path_buf(),
        fetch_interval: Duration::from_millis(50),
        ..Config::default()
    }
}

pub fn context(config: Config) -> web::Data<AppContext> {
    let app = AppContext::new(config).unwrap();
    app.store.initialize().unwrap();
    web::Data::new(app)
}

pub fn device(last_data: Value) -> Value {
    json!([{
        "macAddress": "00:0E:C6:20:0F:7B",
        "lastData": last_data,
        "info": { "name": "Backyard" }
    }])
}
