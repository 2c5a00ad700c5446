//! Webhook event HTTP handlers.
//!
//! ```text
//! POST /api/v1/events/branch-commit
//! POST /api/v1/events/build
//! ```
//!
//! Both endpoints are idempotent: replaying an event yields the same
//! iteration identifier and a `200 OK`. The build endpoint accepts two
//! payload shapes, the full form carrying the hierarchy context and the
//! legacy form identifying the iteration by commit hash alone; the shape is
//! resolved from the fields present.

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{BranchCommitEvent, BuildEvent, LegacyBuildEvent};
use crate::domain::{Error, IterationId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::middleware::trace::TraceId;

/// Request payload for a branch-commit event.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BranchCommitRequestBody {
    #[schema(example = "billing")]
    pub repo_name: String,
    #[schema(example = "invoices")]
    pub feature_name: String,
    #[schema(example = "feature/invoices-v2")]
    pub branch_name: String,
    #[schema(example = "0f3a9c1")]
    pub commit_hash: String,
}

/// Request payload for a build event.
///
/// Deserialized by shape: the full form requires the hierarchy fields, the
/// legacy form carries only the commit hash and image name.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(untagged)]
pub enum BuildRequestBody {
    Full(FullBuildRequestBody),
    Legacy(LegacyBuildRequestBody),
}

/// Full build payload carrying the hierarchy context.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FullBuildRequestBody {
    #[schema(example = "billing")]
    pub service_name: String,
    #[schema(example = "feature/invoices-v2")]
    pub branch_name: String,
    #[schema(example = "9b2d4e0")]
    pub merge_base_commit_hash: String,
    #[schema(example = "0f3a9c1")]
    pub commit_hash: String,
    #[schema(example = "registry.example.com/billing:0f3a9c1")]
    pub image_name: String,
}

/// Legacy build payload identifying the iteration by commit hash alone.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LegacyBuildRequestBody {
    #[schema(example = "0f3a9c1")]
    pub commit_hash: String,
    #[schema(example = "registry.example.com/billing:0f3a9c1")]
    pub image_name: String,
}

/// Response payload naming the iteration an event resolved to.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IterationResponseBody {
    pub iteration_id: IterationId,
}

fn require_non_empty(value: &str, field: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::invalid_request(format!(
            "{field} must not be empty"
        )));
    }
    Ok(())
}

fn attach_trace_id(error: Error) -> Error {
    match TraceId::current() {
        Some(id) => error.with_trace_id(id.to_string()),
        None => error,
    }
}

/// Record a branch commit, materializing its hierarchy on demand.
#[utoipa::path(
    post,
    path = "/api/v1/events/branch-commit",
    request_body = BranchCommitRequestBody,
    responses(
        (status = 200, description = "Commit recorded", body = IterationResponseBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["events"],
    operation_id = "handleBranchCommit"
)]
#[post("/events/branch-commit")]
pub async fn branch_commit_event(
    state: web::Data<HttpState>,
    payload: web::Json<BranchCommitRequestBody>,
) -> ApiResult<web::Json<IterationResponseBody>> {
    let payload = payload.into_inner();
    require_non_empty(&payload.repo_name, "repoName").map_err(attach_trace_id)?;
    require_non_empty(&payload.feature_name, "featureName").map_err(attach_trace_id)?;
    require_non_empty(&payload.branch_name, "branchName").map_err(attach_trace_id)?;
    require_non_empty(&payload.commit_hash, "commitHash").map_err(attach_trace_id)?;

    let event = BranchCommitEvent {
        repo_name: payload.repo_name,
        feature_name: payload.feature_name,
        branch_name: payload.branch_name,
        commit_hash: payload.commit_hash,
    };

    let iteration_id = state
        .branch_commits
        .handle_branch_commit(&event)
        .await
        .map_err(attach_trace_id)?;

    Ok(web::Json(IterationResponseBody { iteration_id }))
}

/// Record a built image and fan out release updates.
#[utoipa::path(
    post,
    path = "/api/v1/events/build",
    request_body = BuildRequestBody,
    responses(
        (status = 200, description = "Build recorded", body = IterationResponseBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Unknown commit", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["events"],
    operation_id = "handleBuild"
)]
#[post("/events/build")]
pub async fn build_event(
    state: web::Data<HttpState>,
    payload: web::Json<BuildRequestBody>,
) -> ApiResult<web::Json<IterationResponseBody>> {
    let iteration_id = match payload.into_inner() {
        BuildRequestBody::Full(body) => {
            require_non_empty(&body.service_name, "serviceName").map_err(attach_trace_id)?;
            require_non_empty(&body.branch_name, "branchName").map_err(attach_trace_id)?;
            require_non_empty(&body.merge_base_commit_hash, "mergeBaseCommitHash")
                .map_err(attach_trace_id)?;
            require_non_empty(&body.commit_hash, "commitHash").map_err(attach_trace_id)?;
            require_non_empty(&body.image_name, "imageName").map_err(attach_trace_id)?;

            let event = BuildEvent {
                service_name: body.service_name,
                branch_name: body.branch_name,
                merge_base_commit_hash: body.merge_base_commit_hash,
                commit_hash: body.commit_hash,
                image_name: body.image_name,
            };
            state
                .builds
                .handle_build(&event)
                .await
                .map_err(attach_trace_id)?
        }
        BuildRequestBody::Legacy(body) => {
            require_non_empty(&body.commit_hash, "commitHash").map_err(attach_trace_id)?;
            require_non_empty(&body.image_name, "imageName").map_err(attach_trace_id)?;

            let event = LegacyBuildEvent {
                commit_hash: body.commit_hash,
                image_name: body.image_name,
            };
            state
                .builds
                .handle_legacy_build(&event)
                .await
                .map_err(attach_trace_id)?
        }
    };

    Ok(web::Json(IterationResponseBody { iteration_id }))
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
