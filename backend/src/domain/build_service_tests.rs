//! Tests for the build orchestrator.

use std::sync::Arc;

use super::*;
use crate::domain::ports::{
    IterationRecord, MockLineageRepository, MockPipelineRunner, RunnerError,
};
use crate::domain::{BranchId, ConfigId, ErrorCode, FeatureId, PipelineId, ServiceId};

fn full_event() -> BuildEvent {
    BuildEvent {
        service_name: "s".into(),
        branch_name: "b".into(),
        merge_base_commit_hash: "mb".into(),
        commit_hash: "c".into(),
        image_name: "i".into(),
    }
}

fn branch_record() -> BranchRecord {
    BranchRecord {
        id: BranchId::new(3),
        service_id: ServiceId::new(1),
        feature_id: None,
        merge_base_commit_hash: Some("mb".into()),
    }
}

/// Expectations shared by the release/notify tail of a build: branch-local
/// resolution succeeds and there are no automatic pipelines.
fn expect_release_tail(repo: &mut MockLineageRepository) {
    repo.expect_latest_branch_release_config()
        .return_once(|_, _| Ok(Some(ConfigId::new(5))));
    repo.expect_automatic_pipelines()
        .return_once(|_, _| Ok(Vec::new()));
    repo.expect_idem_release()
        .withf(|iteration, config, pipeline| {
            *iteration == IterationId::new(4)
                && *config == ConfigId::new(5)
                && pipeline.is_none()
        })
        .times(1)
        .return_once(|_, _, _| Ok(ReleaseId::new(8)));
}

#[tokio::test]
async fn full_build_materializes_sets_image_and_notifies() {
    let mut repo = MockLineageRepository::new();
    repo.expect_idem_service()
        .withf(|name| name == "s")
        .times(1)
        .return_once(|_| Ok(ServiceId::new(1)));
    repo.expect_idem_branch()
        .withf(|branch| {
            branch.name == "b" && branch.merge_base_commit_hash.as_deref() == Some("mb")
        })
        .times(1)
        .return_once(|_| Ok(branch_record()));
    repo.expect_idem_iteration()
        .withf(|commit, branch, image| {
            commit == "c" && *branch == BranchId::new(3) && *image == Some("i")
        })
        .times(1)
        .return_once(|_, _, _| Ok(IterationId::new(4)));
    repo.expect_set_iteration_image()
        .withf(|iteration, image| *iteration == IterationId::new(4) && image == "i")
        .times(1)
        .return_once(|_, _| Ok(()));
    expect_release_tail(&mut repo);

    let mut runner = MockPipelineRunner::new();
    runner
        .expect_update_release()
        .withf(|release| *release == ReleaseId::new(8))
        .times(1)
        .return_once(|_| Ok(()));

    let service = BuildService::new(Arc::new(repo), Arc::new(runner));
    let iteration_id = service
        .handle_build(&full_event())
        .await
        .expect("build succeeds");

    assert_eq!(iteration_id, IterationId::new(4));
}

#[tokio::test]
async fn automatic_pipelines_fan_out_one_release_each() {
    let mut repo = MockLineageRepository::new();
    repo.expect_idem_service().return_once(|_| Ok(ServiceId::new(1)));
    repo.expect_idem_branch().return_once(|_| Ok(branch_record()));
    repo.expect_idem_iteration()
        .return_once(|_, _, _| Ok(IterationId::new(4)));
    repo.expect_set_iteration_image().return_once(|_, _| Ok(()));
    repo.expect_latest_branch_release_config()
        .return_once(|_, _| Ok(Some(ConfigId::new(5))));
    repo.expect_automatic_pipelines()
        .withf(|branch, feature| *branch == BranchId::new(3) && feature.is_none())
        .return_once(|_, _| Ok(vec![PipelineId::new(21), PipelineId::new(22)]));

    let mut release_id = 8;
    repo.expect_idem_release().times(3).returning(move |_, _, _| {
        release_id += 1;
        Ok(ReleaseId::new(release_id))
    });

    let mut runner = MockPipelineRunner::new();
    runner.expect_update_release().times(3).returning(|_| Ok(()));

    let service = BuildService::new(Arc::new(repo), Arc::new(runner));
    service
        .handle_build(&full_event())
        .await
        .expect("build succeeds");
}

#[tokio::test]
async fn runner_failure_does_not_fail_the_build() {
    let mut repo = MockLineageRepository::new();
    repo.expect_idem_service().return_once(|_| Ok(ServiceId::new(1)));
    repo.expect_idem_branch().return_once(|_| Ok(branch_record()));
    repo.expect_idem_iteration()
        .return_once(|_, _, _| Ok(IterationId::new(4)));
    repo.expect_set_iteration_image().return_once(|_, _| Ok(()));
    expect_release_tail(&mut repo);

    let mut runner = MockPipelineRunner::new();
    runner
        .expect_update_release()
        .times(1)
        .return_once(|_| Err(RunnerError::transport("timed out")));

    let service = BuildService::new(Arc::new(repo), Arc::new(runner));
    let iteration_id = service
        .handle_build(&full_event())
        .await
        .expect("runner failure is isolated");

    assert_eq!(iteration_id, IterationId::new(4));
}

#[tokio::test]
async fn legacy_build_requires_a_known_commit() {
    let mut repo = MockLineageRepository::new();
    repo.expect_find_iteration_by_commit()
        .withf(|commit| commit == "never-seen")
        .times(1)
        .return_once(|_| Ok(None));

    let runner = MockPipelineRunner::new();
    let service = BuildService::new(Arc::new(repo), Arc::new(runner));
    let error = service
        .handle_legacy_build(&LegacyBuildEvent {
            commit_hash: "never-seen".into(),
            image_name: "i".into(),
        })
        .await
        .expect_err("unknown commit is rejected");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn legacy_build_updates_the_existing_iteration() {
    let mut repo = MockLineageRepository::new();
    repo.expect_find_iteration_by_commit()
        .return_once(|_| {
            Ok(Some(IterationRecord {
                id: IterationId::new(4),
                branch_id: BranchId::new(3),
                image_name: Some("old".into()),
            }))
        });
    repo.expect_set_iteration_image()
        .withf(|iteration, image| *iteration == IterationId::new(4) && image == "new")
        .times(1)
        .return_once(|_, _| Ok(()));
    repo.expect_find_branch()
        .withf(|branch| *branch == BranchId::new(3))
        .times(1)
        .return_once(|_| {
            Ok(Some(BranchRecord {
                id: BranchId::new(3),
                service_id: ServiceId::new(1),
                feature_id: Some(FeatureId::new(2)),
                merge_base_commit_hash: Some("mb".into()),
            }))
        });
    repo.expect_latest_branch_release_config()
        .return_once(|_, _| Ok(Some(ConfigId::new(5))));
    repo.expect_automatic_pipelines()
        .withf(|_, feature| *feature == Some(FeatureId::new(2)))
        .return_once(|_, _| Ok(Vec::new()));
    repo.expect_idem_release()
        .times(1)
        .return_once(|_, _, _| Ok(ReleaseId::new(8)));

    let mut runner = MockPipelineRunner::new();
    runner.expect_update_release().times(1).return_once(|_| Ok(()));

    let service = BuildService::new(Arc::new(repo), Arc::new(runner));
    let iteration_id = service
        .handle_legacy_build(&LegacyBuildEvent {
            commit_hash: "c".into(),
            image_name: "new".into(),
        })
        .await
        .expect("legacy build succeeds");

    assert_eq!(iteration_id, IterationId::new(4));
}
