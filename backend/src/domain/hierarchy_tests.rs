//! Tests for the hierarchy factory service.

use std::sync::Arc;

use super::*;
use crate::domain::ports::{LineageRepositoryError, MockLineageRepository};

fn sample_event() -> BranchCommitEvent {
    BranchCommitEvent {
        repo_name: "repo-x".into(),
        feature_name: "feature-x".into(),
        branch_name: "branch-x".into(),
        commit_hash: "aabbccdd11-x".into(),
    }
}

#[tokio::test]
async fn branch_commit_materializes_all_four_levels() {
    let mut repo = MockLineageRepository::new();

    repo.expect_idem_service()
        .withf(|name| name == "repo-x")
        .times(1)
        .return_once(|_| Ok(ServiceId::new(1)));
    repo.expect_idem_feature()
        .withf(|name, service| name == "feature-x" && *service == ServiceId::new(1))
        .times(1)
        .return_once(|_, _| Ok(FeatureId::new(2)));
    repo.expect_idem_branch()
        .withf(|branch| {
            branch.name == "branch-x"
                && branch.merge_base_commit_hash.is_none()
                && branch.service_id == ServiceId::new(1)
                && branch.feature_id == Some(FeatureId::new(2))
        })
        .times(1)
        .return_once(|_| {
            Ok(BranchRecord {
                id: BranchId::new(3),
                service_id: ServiceId::new(1),
                feature_id: Some(FeatureId::new(2)),
                merge_base_commit_hash: None,
            })
        });
    repo.expect_idem_iteration()
        .withf(|commit, branch, image| {
            commit == "aabbccdd11-x" && *branch == BranchId::new(3) && image.is_none()
        })
        .times(1)
        .return_once(|_, _, _| Ok(IterationId::new(4)));

    let service = HierarchyService::new(Arc::new(repo));
    let iteration_id = service
        .handle_branch_commit(&sample_event())
        .await
        .expect("branch commit succeeds");

    assert_eq!(iteration_id, IterationId::new(4));
}

#[tokio::test]
async fn store_failure_stops_the_composition() {
    let mut repo = MockLineageRepository::new();

    repo.expect_idem_service()
        .times(1)
        .return_once(|_| Err(LineageRepositoryError::connection("refused")));

    let service = HierarchyService::new(Arc::new(repo));
    let error = service
        .handle_branch_commit(&sample_event())
        .await
        .expect_err("connection failure propagates");

    assert_eq!(error.code(), crate::domain::ErrorCode::ServiceUnavailable);
}
