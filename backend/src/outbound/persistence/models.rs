//! Row types mapped onto the lineage schema.
//!
//! Only the rows the repository reads back get `Queryable` structs; the
//! idempotent saves otherwise work with ids alone.

use diesel::prelude::*;

use super::schema::{branch, config, feature, iteration, release, service};

#[derive(Debug, Insertable)]
#[diesel(table_name = service)]
pub struct NewServiceRow<'a> {
    pub service_name: &'a str,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = feature)]
pub struct NewFeatureRow<'a> {
    pub feature_name: &'a str,
    pub service_id: i64,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = branch)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BranchRow {
    pub branch_id: i64,
    pub branch_name: String,
    pub merge_base_commit_hash: Option<String>,
    pub service_id: i64,
    pub feature_id: Option<i64>,
    pub deleted_dt: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = branch)]
pub struct NewBranchRow<'a> {
    pub branch_name: &'a str,
    pub merge_base_commit_hash: Option<&'a str>,
    pub service_id: i64,
    pub feature_id: Option<i64>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = iteration)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct IterationRow {
    pub iteration_id: i64,
    pub commit_hash: String,
    pub branch_id: i64,
    pub image_name: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = iteration)]
pub struct NewIterationRow<'a> {
    pub commit_hash: &'a str,
    pub branch_id: i64,
    pub image_name: Option<&'a str>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = config)]
pub struct NewConfigRow<'a> {
    pub key_value_pairs: &'a str,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = release)]
pub struct NewReleaseRow {
    pub iteration_id: i64,
    pub config_id: i64,
    pub pipeline_id: Option<i64>,
}
