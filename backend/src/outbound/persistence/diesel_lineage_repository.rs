//! PostgreSQL-backed `LineageRepository` implementation using Diesel ORM.
//!
//! Every save goes through the insert-or-fetch expansion in
//! [`super::idem_save`]: select by the uniqueness key, insert with
//! `ON CONFLICT DO NOTHING`, and re-select when a concurrent writer wins the
//! race. Uniqueness races therefore never surface as errors; only genuine
//! storage failures propagate through the port.
//!
//! All inbound strings are truncated at the first NUL byte before they reach
//! a query, because PostgreSQL `TEXT` cannot store NUL and equality against
//! stored rows must see the same value that was written.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{
    BranchRecord, IterationRecord, LineageRepository, LineageRepositoryError, NewBranch,
};
use crate::domain::{
    BranchId, ConfigId, ConfigPairs, FeatureId, IterationId, PipelineId, ReleaseId, ServiceId,
    truncate_at_nul,
};

use super::idem_save::idem_save;
use super::models::{
    BranchRow, IterationRow, NewBranchRow, NewConfigRow, NewFeatureRow, NewIterationRow,
    NewReleaseRow, NewServiceRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{branch, config, feature, iteration, pipeline, release, service};

/// Diesel-backed implementation of the `LineageRepository` port.
#[derive(Clone)]
pub struct DieselLineageRepository {
    pool: DbPool,
}

impl DieselLineageRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to domain lineage repository errors.
fn map_pool_error(error: PoolError) -> LineageRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            LineageRepositoryError::connection(message)
        }
    }
}

/// Map Diesel errors to domain lineage repository errors.
fn map_diesel_error(error: diesel::result::Error) -> LineageRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => LineageRepositoryError::query("record not found"),
        DieselError::QueryBuilderError(_) => {
            LineageRepositoryError::query("database query error")
        }
        DieselError::DatabaseError(kind, _) => match kind {
            DatabaseErrorKind::NotNullViolation
            | DatabaseErrorKind::CheckViolation
            | DatabaseErrorKind::ForeignKeyViolation => {
                LineageRepositoryError::constraint("database constraint violated")
            }
            DatabaseErrorKind::ClosedConnection => {
                LineageRepositoryError::connection("database connection error")
            }
            _ => LineageRepositoryError::query("database error"),
        },
        _ => LineageRepositoryError::query("database error"),
    }
}

fn row_to_branch_record(row: BranchRow) -> BranchRecord {
    BranchRecord {
        id: BranchId::from(row.branch_id),
        service_id: ServiceId::from(row.service_id),
        feature_id: row.feature_id.map(FeatureId::from),
        merge_base_commit_hash: row.merge_base_commit_hash,
    }
}

fn row_to_iteration_record(row: IterationRow) -> IterationRecord {
    IterationRecord {
        id: IterationId::from(row.iteration_id),
        branch_id: BranchId::from(row.branch_id),
        image_name: row.image_name,
    }
}

#[async_trait]
impl LineageRepository for DieselLineageRepository {
    async fn idem_service(&self, name: &str) -> Result<ServiceId, LineageRepositoryError> {
        let name = truncate_at_nul(name);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let id = idem_save!(
            &mut conn,
            table: service::table,
            id: service::service_id,
            filter: service::service_name.eq(name),
            row: NewServiceRow { service_name: name },
        );

        Ok(ServiceId::from(id))
    }

    async fn idem_feature(
        &self,
        name: &str,
        service_id: ServiceId,
    ) -> Result<FeatureId, LineageRepositoryError> {
        let name = truncate_at_nul(name);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let id = idem_save!(
            &mut conn,
            table: feature::table,
            id: feature::feature_id,
            filter: feature::feature_name
                .eq(name)
                .and(feature::service_id.eq(service_id.as_i64())),
            row: NewFeatureRow {
                feature_name: name,
                service_id: service_id.as_i64(),
            },
        );

        Ok(FeatureId::from(id))
    }

    async fn idem_branch(
        &self,
        new_branch: &NewBranch,
    ) -> Result<BranchRecord, LineageRepositoryError> {
        let name = truncate_at_nul(&new_branch.name);
        let merge_base = new_branch
            .merge_base_commit_hash
            .as_deref()
            .map(truncate_at_nul);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // The live-row uniqueness key treats NULL merge bases as equal, so
        // the select filter must spell out both shapes explicitly.
        let id = match merge_base {
            Some(hash) => idem_save!(
                &mut conn,
                table: branch::table,
                id: branch::branch_id,
                filter: branch::branch_name
                    .eq(name)
                    .and(branch::merge_base_commit_hash.eq(hash))
                    .and(branch::deleted_dt.is_null()),
                row: NewBranchRow {
                    branch_name: name,
                    merge_base_commit_hash: Some(hash),
                    service_id: new_branch.service_id.as_i64(),
                    feature_id: new_branch.feature_id.map(FeatureId::as_i64),
                },
            ),
            None => idem_save!(
                &mut conn,
                table: branch::table,
                id: branch::branch_id,
                filter: branch::branch_name
                    .eq(name)
                    .and(branch::merge_base_commit_hash.is_null())
                    .and(branch::deleted_dt.is_null()),
                row: NewBranchRow {
                    branch_name: name,
                    merge_base_commit_hash: None,
                    service_id: new_branch.service_id.as_i64(),
                    feature_id: new_branch.feature_id.map(FeatureId::as_i64),
                },
            ),
        };

        let row: BranchRow = branch::table
            .filter(branch::branch_id.eq(id))
            .select(BranchRow::as_select())
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(row_to_branch_record(row))
    }

    async fn idem_iteration<'a>(
        &self,
        commit_hash: &str,
        branch_id: BranchId,
        image_name: Option<&'a str>,
    ) -> Result<IterationId, LineageRepositoryError> {
        let commit_hash = truncate_at_nul(commit_hash);
        let image_name = image_name.map(truncate_at_nul);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let id = idem_save!(
            &mut conn,
            table: iteration::table,
            id: iteration::iteration_id,
            filter: iteration::commit_hash
                .eq(commit_hash)
                .and(iteration::branch_id.eq(branch_id.as_i64())),
            row: NewIterationRow {
                commit_hash,
                branch_id: branch_id.as_i64(),
                image_name,
            },
        );

        Ok(IterationId::from(id))
    }

    async fn idem_config(
        &self,
        pairs: &ConfigPairs,
    ) -> Result<ConfigId, LineageRepositoryError> {
        let storage = pairs.to_storage();
        let storage = truncate_at_nul(&storage);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let id = idem_save!(
            &mut conn,
            table: config::table,
            id: config::config_id,
            filter: config::key_value_pairs.eq(storage),
            row: NewConfigRow {
                key_value_pairs: storage,
            },
        );

        Ok(ConfigId::from(id))
    }

    async fn idem_release(
        &self,
        iteration_id: IterationId,
        config_id: ConfigId,
        pipeline_id: Option<PipelineId>,
    ) -> Result<ReleaseId, LineageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let id = match pipeline_id {
            Some(pipeline) => idem_save!(
                &mut conn,
                table: release::table,
                id: release::release_id,
                filter: release::iteration_id
                    .eq(iteration_id.as_i64())
                    .and(release::config_id.eq(config_id.as_i64()))
                    .and(release::pipeline_id.eq(pipeline.as_i64())),
                row: NewReleaseRow {
                    iteration_id: iteration_id.as_i64(),
                    config_id: config_id.as_i64(),
                    pipeline_id: Some(pipeline.as_i64()),
                },
            ),
            None => idem_save!(
                &mut conn,
                table: release::table,
                id: release::release_id,
                filter: release::iteration_id
                    .eq(iteration_id.as_i64())
                    .and(release::config_id.eq(config_id.as_i64()))
                    .and(release::pipeline_id.is_null()),
                row: NewReleaseRow {
                    iteration_id: iteration_id.as_i64(),
                    config_id: config_id.as_i64(),
                    pipeline_id: None,
                },
            ),
        };

        Ok(ReleaseId::from(id))
    }

    async fn set_iteration_image(
        &self,
        iteration_id: IterationId,
        image_name: &str,
    ) -> Result<(), LineageRepositoryError> {
        let image_name = truncate_at_nul(image_name);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(iteration::table)
            .filter(iteration::iteration_id.eq(iteration_id.as_i64()))
            .set(iteration::image_name.eq(image_name))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if updated == 0 {
            return Err(LineageRepositoryError::query("iteration not found"));
        }
        Ok(())
    }

    async fn find_iteration_by_commit(
        &self,
        commit_hash: &str,
    ) -> Result<Option<IterationRecord>, LineageRepositoryError> {
        let commit_hash = truncate_at_nul(commit_hash);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<IterationRow> = iteration::table
            .filter(iteration::commit_hash.eq(commit_hash))
            .order(iteration::iteration_id.desc())
            .select(IterationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_iteration_record))
    }

    async fn find_branch(
        &self,
        branch_id: BranchId,
    ) -> Result<Option<BranchRecord>, LineageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<BranchRow> = branch::table
            .filter(branch::branch_id.eq(branch_id.as_i64()))
            .select(BranchRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_branch_record))
    }

    async fn latest_branch_release_config(
        &self,
        branch_id: BranchId,
        exclude_iteration: IterationId,
    ) -> Result<Option<ConfigId>, LineageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let config_id: Option<i64> = release::table
            .inner_join(iteration::table)
            .filter(iteration::branch_id.eq(branch_id.as_i64()))
            .filter(release::iteration_id.ne(exclude_iteration.as_i64()))
            .order(release::release_id.desc())
            .select(release::config_id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(config_id.map(ConfigId::from))
    }

    async fn latest_merge_base_release_config(
        &self,
        service_id: ServiceId,
        commit_hash: &str,
    ) -> Result<Option<ConfigId>, LineageRepositoryError> {
        let commit_hash = truncate_at_nul(commit_hash);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let config_id: Option<i64> = release::table
            .inner_join(iteration::table.inner_join(branch::table))
            .filter(iteration::commit_hash.eq(commit_hash))
            .filter(branch::service_id.eq(service_id.as_i64()))
            .order(release::release_id.desc())
            .select(release::config_id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(config_id.map(ConfigId::from))
    }

    async fn automatic_pipelines(
        &self,
        branch_id: BranchId,
        feature_id: Option<FeatureId>,
    ) -> Result<Vec<PipelineId>, LineageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let query = pipeline::table
            .filter(pipeline::automatic.eq(true))
            .order(pipeline::pipeline_id.asc())
            .select(pipeline::pipeline_id);

        let ids: Vec<i64> = match feature_id {
            Some(feature) => {
                query
                    .filter(
                        pipeline::branch_id
                            .eq(branch_id.as_i64())
                            .or(pipeline::feature_id.eq(feature.as_i64())),
                    )
                    .load(&mut conn)
                    .await
            }
            None => {
                query
                    .filter(pipeline::branch_id.eq(branch_id.as_i64()))
                    .load(&mut conn)
                    .await
            }
        }
        .map_err(map_diesel_error)?;

        Ok(ids.into_iter().map(PipelineId::from).collect())
    }
}
