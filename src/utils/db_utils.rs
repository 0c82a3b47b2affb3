/// Comma-separated `?` placeholders for an `IN (...)` list or a VALUES row.
pub fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Builds `(?, ?, ...), (?, ?, ...)` for a multi-row INSERT.
pub fn values_rows(rows: usize, columns: usize) -> String {
    let row = format!("({})", placeholders(columns));
    vec![row; rows].join(", ")
}

/// True when the database rejected a write on a UNIQUE key.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

/// InnoDB `ER_LOCK_DEADLOCK`
const DEADLOCK: u16 = 1213;
/// InnoDB `ER_LOCK_WAIT_TIMEOUT`
const LOCK_WAIT_TIMEOUT: u16 = 1205;

fn is_lock_conflict_number(number: u16) -> bool {
    matches!(number, DEADLOCK | LOCK_WAIT_TIMEOUT)
}

/// True when InnoDB gave up on a transaction because another one held its locks.
pub fn is_lock_conflict(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err
            .try_downcast_ref::<sqlx::mysql::MySqlDatabaseError>()
            .is_some_and(|e| is_lock_conflict_number(e.number())),
        _ => false,
    }
}
