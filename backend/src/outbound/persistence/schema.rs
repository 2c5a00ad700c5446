//! Diesel schema definitions for the build-lineage tables.
//!
//! Kept in sync with the SQL migrations by hand; primary keys are named
//! after their table so joins read naturally.

diesel::table! {
    service (service_id) {
        service_id -> Int8,
        service_name -> Text,
    }
}

diesel::table! {
    feature (feature_id) {
        feature_id -> Int8,
        feature_name -> Text,
        service_id -> Int8,
    }
}

diesel::table! {
    branch (branch_id) {
        branch_id -> Int8,
        branch_name -> Text,
        merge_base_commit_hash -> Nullable<Text>,
        service_id -> Int8,
        feature_id -> Nullable<Int8>,
        deleted_dt -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    iteration (iteration_id) {
        iteration_id -> Int8,
        commit_hash -> Text,
        branch_id -> Int8,
        image_name -> Nullable<Text>,
    }
}

diesel::table! {
    config (config_id) {
        config_id -> Int8,
        key_value_pairs -> Text,
    }
}

diesel::table! {
    pipeline (pipeline_id) {
        pipeline_id -> Int8,
        pipeline_name -> Text,
        branch_id -> Nullable<Int8>,
        feature_id -> Nullable<Int8>,
        automatic -> Bool,
    }
}

diesel::table! {
    release (release_id) {
        release_id -> Int8,
        iteration_id -> Int8,
        config_id -> Int8,
        pipeline_id -> Nullable<Int8>,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(feature -> service (service_id));
diesel::joinable!(branch -> service (service_id));
diesel::joinable!(iteration -> branch (branch_id));
diesel::joinable!(release -> iteration (iteration_id));
diesel::joinable!(release -> config (config_id));
diesel::joinable!(release -> pipeline (pipeline_id));

diesel::allow_tables_to_appear_in_same_query!(
    service, feature, branch, iteration, config, pipeline, release,
);
