//! Embedded PostgreSQL bootstrap for integration tests.
//!
//! `pg-embed-setup-unpriv` defaults to `/var/tmp` for installation and data
//! directories, which sandboxed CI environments block. When the override
//! variables are absent this module points `PG_RUNTIME_DIR` and `PG_DATA_DIR`
//! at the cargo target directory for the duration of the bootstrap, and
//! serialises environment mutation so parallel tests do not race.
//!
//! Suites that need the cluster call [`cluster_handle`]. When the cluster
//! cannot start (no network to fetch binaries, locked-down filesystem) the
//! suite is skipped with a marker line unless `REQUIRE_TEST_CLUSTER` is set
//! to a truthy value, in which case setup failure is a test failure.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use pg_embedded_setup_unpriv::{BootstrapResult, ClusterHandle, TemporaryDatabase};
use uuid::Uuid;

use lineage_backend::outbound::persistence::run_migrations;

static BOOTSTRAP_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const CLUSTER_RETRIES: usize = 5;
const CLUSTER_RETRY_DELAY: Duration = Duration::from_millis(500);

fn pg_embed_target_dir() -> PathBuf {
    if let Some(target_dir) = std::env::var_os("CARGO_TARGET_DIR") {
        return PathBuf::from(target_dir).join("pg-embed");
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("target")
        .join("pg-embed")
}

fn create_unique_pg_embed_dirs() -> Result<(PathBuf, PathBuf), std::io::Error> {
    let unique = format!("bootstrap-{}-{}", std::process::id(), Uuid::new_v4());
    let base = pg_embed_target_dir().join(unique);
    let runtime_dir = base.join("install");
    let data_dir = base.join("data");

    std::fs::create_dir_all(&runtime_dir)?;
    std::fs::create_dir_all(&data_dir)?;

    Ok((runtime_dir, data_dir))
}

/// Ensures `PG_PASSWORD` stays stable across processes reusing one data
/// directory. `postgresql_embedded` generates a random password per process;
/// when the data directory already exists `initdb` is skipped and the cluster
/// keeps the original password, so later processes would fail to
/// authenticate without a stable override.
fn ensure_stable_password() {
    if std::env::var_os("PG_PASSWORD").is_none() {
        // SAFETY: called under BOOTSTRAP_LOCK before the library spawns any
        // threads, so this runs at most once per process.
        unsafe {
            std::env::set_var("PG_PASSWORD", "lineage_embedded_test");
        }
    }
}

fn require_test_cluster() -> bool {
    std::env::var("REQUIRE_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn bootstrap() -> BootstrapResult<&'static ClusterHandle> {
    let _guard = BOOTSTRAP_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    ensure_stable_password();

    let needs_override =
        std::env::var_os("PG_RUNTIME_DIR").is_none() || std::env::var_os("PG_DATA_DIR").is_none();

    let _env_guard = if needs_override {
        let (runtime_dir, data_dir) = create_unique_pg_embed_dirs()
            .map(|(runtime, data)| {
                (
                    runtime.to_string_lossy().into_owned(),
                    data.to_string_lossy().into_owned(),
                )
            })
            .unwrap_or_else(|err| panic!("create pg-embed directories: {err}"));

        Some(env_lock::lock_env([
            ("PG_RUNTIME_DIR", Some(runtime_dir)),
            ("PG_DATA_DIR", Some(data_dir)),
        ]))
    } else {
        None
    };

    let mut attempt = 1;
    loop {
        match pg_embedded_setup_unpriv::test_support::shared_cluster_handle() {
            Ok(handle) => return Ok(handle),
            Err(error) => {
                if attempt >= CLUSTER_RETRIES {
                    return Err(error);
                }
                std::thread::sleep(CLUSTER_RETRY_DELAY);
                attempt += 1;
            }
        }
    }
}

/// Returns the shared embedded cluster, or `None` when the suite should be
/// skipped because the cluster cannot start in this environment.
///
/// Set `REQUIRE_TEST_CLUSTER=1` to turn a skip into a hard failure.
pub fn cluster_handle() -> Option<&'static ClusterHandle> {
    match bootstrap() {
        Ok(handle) => Some(handle),
        Err(error) => {
            if require_test_cluster() {
                panic!("test cluster setup failed: {error}");
            }
            eprintln!("SKIP-TEST-CLUSTER: {error}");
            None
        }
    }
}

/// Provision a fresh database with migrations applied, or `None` to skip.
pub fn migrated_database() -> Option<TemporaryDatabase> {
    let cluster = cluster_handle()?;
    let database = cluster
        .temporary_database(format!("lineage_test_{}", Uuid::new_v4().simple()))
        .unwrap_or_else(|err| panic!("create temporary database: {err:?}"));
    run_migrations(database.url()).unwrap_or_else(|err| panic!("apply migrations: {err}"));
    Some(database)
}
