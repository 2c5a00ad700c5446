//! Service entry-point: wires the webhook endpoints, health probes, and
//! OpenAPI docs onto the persistence and runner adapters.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use lineage_backend::ApiDoc;
use lineage_backend::Trace;
use lineage_backend::api::health::{HealthState, live, ready};
use lineage_backend::domain::ports::{BranchCommitCommand, BuildCommand};
use lineage_backend::domain::{BuildService, HierarchyService};
use lineage_backend::inbound::http::events::{branch_commit_event, build_event};
use lineage_backend::inbound::http::state::HttpState;
use lineage_backend::outbound::persistence::{
    DbPool, DieselLineageRepository, PoolConfig, run_migrations,
};
use lineage_backend::outbound::runner::HttpPipelineRunner;
use lineage_backend::server::AppConfig;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;

    run_migrations(&config.database_url).map_err(std::io::Error::other)?;
    info!("migrations applied");

    let pool = DbPool::new(PoolConfig::new(&config.database_url))
        .await
        .map_err(std::io::Error::other)?;

    let repository = Arc::new(DieselLineageRepository::new(pool));
    let runner = Arc::new(
        HttpPipelineRunner::new(config.runner_url.clone(), config.runner_timeout)
            .map_err(std::io::Error::other)?,
    );

    let branch_commits: Arc<dyn BranchCommitCommand> =
        Arc::new(HierarchyService::new(Arc::clone(&repository)));
    let builds: Arc<dyn BuildCommand> = Arc::new(BuildService::new(repository, runner));
    let http_state = HttpState::new(branch_commits, builds);

    let health_state = web::Data::new(HealthState::new());
    // Clone for the server factory so the probes share one state.
    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || build_app(server_health_state.clone(), http_state.clone()))
        .bind(config.bind_addr.as_str())?;

    health_state.mark_ready();
    info!(bind_addr = %config.bind_addr, "listening");
    server.run().await
}

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let api = web::scope("/api/v1")
        .app_data(web::Data::new(http_state))
        .service(branch_commit_event)
        .service(build_event);

    let app = App::new()
        .app_data(health_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app =
        app.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}
