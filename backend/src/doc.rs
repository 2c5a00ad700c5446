//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct which generates the OpenAPI specification
//! for the webhook API. The document is served by Swagger UI in debug builds.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::events::{
    BranchCommitRequestBody, BuildRequestBody, FullBuildRequestBody, IterationResponseBody,
    LegacyBuildRequestBody,
};

/// OpenAPI document for the webhook API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Build lineage API",
        description = "Webhook interface recording branch commits and built images, \
                       deriving configurations, and re-triggering release pipelines."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::events::branch_commit_event,
        crate::inbound::http::events::build_event,
        crate::api::health::ready,
        crate::api::health::live,
    ),
    components(schemas(
        BranchCommitRequestBody,
        BuildRequestBody,
        FullBuildRequestBody,
        LegacyBuildRequestBody,
        IterationResponseBody,
        Error,
        ErrorCode,
    )),
    tags(
        (name = "events", description = "Webhook event ingestion"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_references_event_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        assert!(paths.contains_key("/api/v1/events/branch-commit"));
        assert!(paths.contains_key("/api/v1/events/build"));
        assert!(paths.contains_key("/health/ready"));
    }

    #[test]
    fn openapi_document_registers_error_schema() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;

        assert!(schemas.contains_key("Error"));
        assert!(schemas.contains_key("IterationResponseBody"));
    }
}
