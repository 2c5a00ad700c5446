//! Insert-or-fetch expansion shared by the idempotent save methods.

/// Expands to the three-step idempotent save against a unique key:
///
/// 1. select the id by the unique filter;
/// 2. if absent, `INSERT ... ON CONFLICT DO NOTHING RETURNING id`;
/// 3. if the insert conflicted (a concurrent writer won), re-select.
///
/// The filter expression is expanded twice, so it must be side-effect free.
/// Callers must have `map_diesel_error` in scope; the expression evaluates to
/// the row id as `i64` or returns early with `LineageRepositoryError`.
macro_rules! idem_save {
    (
        $conn:expr,
        table: $table:path,
        id: $id:path,
        filter: $filter:expr,
        row: $row:expr $(,)?
    ) => {{
        use diesel::prelude::*;
        use diesel_async::RunQueryDsl;

        let existing: Option<i64> = $table
            .select($id)
            .filter($filter)
            .first($conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        match existing {
            Some(id) => id,
            None => {
                let inserted: Option<i64> = diesel::insert_into($table)
                    .values($row)
                    .on_conflict_do_nothing()
                    .returning($id)
                    .get_result($conn)
                    .await
                    .optional()
                    .map_err(map_diesel_error)?;

                match inserted {
                    Some(id) => id,
                    // Lost the insert race; the winner's row is visible now.
                    None => $table
                        .select($id)
                        .filter($filter)
                        .first($conn)
                        .await
                        .map_err(map_diesel_error)?,
                }
            }
        }
    }};
}

pub(crate) use idem_save;
