//! BizSpark collector service entrypoint.
//! Boots the Axum HTTP server on Shuttle with the router from `bizspark::app()`.

use shuttle_axum::ShuttleAxum;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    bizspark::init_tracing();

    let router = bizspark::app().await?;
    Ok(router.into())
}
