use actix_web::{middleware, web, App, HttpServer};
use std::io;

use library::{
    rest_api::{assets, rest_config},
    AppContext, Config,
};

const DEFAULT_LOG_FILTER: &str = "info,actix_server=info,actix_web=info";

fn to_io<E: std::fmt::Display>(err: E) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER))
        .init();

    let config = Config::from_env();
    let bind_address = config.bind_address.clone();
    let static_dir = config.static_dir.clone();

    // storage must be reachable before anything is served
    let app = web::Data::new(AppContext::new(config).map_err(|err| {
        log::error!("cannot open store: {}", err);
        to_io(err)
    })?);
    let first = app.startup().await.map_err(|err| {
        log::error!("cannot initialize store: {}", err);
        to_io(err)
    })?;
    log::info!("startup fetch: {:?}", first);

    let scheduler = AppContext::start_scheduler(app.clone());

    let server_app = app.clone();
    HttpServer::new(move || {
        App::new()
            // enable logger
            .wrap(middleware::Logger::default())
            .app_data(server_app.clone())
            .configure(rest_config)
            // static files
            .service(assets(&static_dir))
    })
    .bind(&bind_address)?
    .run()
    .await?;

    app.shutdown(scheduler).await;
    Ok(())
}
