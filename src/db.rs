use rusqlite::Connection;
use std::path::Path;

pub const DB_FILE_NAME: &str = "seating.sqlite3";

pub fn open_db(db_path: &Path) -> anyhow::Result<Connection> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(db_path)?;
    ensure_schema(&conn)?;
    Ok(conn)
}

pub fn ensure_schema(conn: &Connection) -> anyhow::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS supervisors(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            rfid TEXT UNIQUE,
            name TEXT NOT NULL,
            dept_code TEXT NOT NULL,
            desg TEXT NOT NULL,
            emp_type TEXT,
            post TEXT,
            start_date TEXT,
            end_date TEXT
        )",
        [],
    )?;

    // Databases created before the employment and constraint fields existed
    // only carry the identity columns.
    ensure_supervisors_optional_columns(conn)?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_supervisors_name ON supervisors(name)",
        [],
    )?;
    Ok(())
}

fn ensure_supervisors_optional_columns(conn: &Connection) -> anyhow::Result<()> {
    for column in ["emp_type", "post", "start_date", "end_date"] {
        if table_has_column(conn, "supervisors", column)? {
            continue;
        }
        tracing::info!(column, "adding missing supervisors column");
        conn.execute(
            &format!("ALTER TABLE supervisors ADD COLUMN {} TEXT", column),
            [],
        )?;
    }
    Ok(())
}

pub fn table_has_column(conn: &Connection, table: &str, column: &str) -> anyhow::Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn older_table_gains_constraint_columns() {
        let conn = Connection::open_in_memory().expect("memory db");
        conn.execute(
            "CREATE TABLE supervisors(
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                rfid TEXT UNIQUE,
                name TEXT NOT NULL,
                dept_code TEXT NOT NULL,
                desg TEXT NOT NULL
            )",
            [],
        )
        .expect("legacy table");
        conn.execute(
            "INSERT INTO supervisors(rfid, name, dept_code, desg) VALUES('RF1', 'A', 'CO', 'HOD')",
            [],
        )
        .expect("legacy row");

        ensure_schema(&conn).expect("migrate");

        for column in ["emp_type", "post", "start_date", "end_date"] {
            assert!(table_has_column(&conn, "supervisors", column).expect("pragma"));
        }
        let name: String = conn
            .query_row("SELECT name FROM supervisors WHERE rfid = 'RF1'", [], |r| {
                r.get(0)
            })
            .expect("row survives");
        assert_eq!(name, "A");
    }

    #[test]
    fn schema_setup_is_idempotent() {
        let conn = Connection::open_in_memory().expect("memory db");
        ensure_schema(&conn).expect("first");
        ensure_schema(&conn).expect("second");
        assert!(table_has_column(&conn, "supervisors", "rfid").expect("pragma"));
    }
}
