use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);"
    )?;

    let version: i64 = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                address     TEXT NOT NULL UNIQUE,
                keypair     BLOB NOT NULL,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            -- sender_address is not a foreign key: senders may live on other servers.
            CREATE TABLE alerts (
                seq                 INTEGER PRIMARY KEY AUTOINCREMENT,
                recipient_user_id   TEXT NOT NULL REFERENCES users(id),
                sender_address      TEXT NOT NULL,
                payload             BLOB NOT NULL,
                timestamp           INTEGER NOT NULL
            );

            CREATE INDEX idx_alerts_recipient
                ON alerts(recipient_user_id, timestamp);

            -- to_address = '' marks public mail.
            CREATE TABLE messages (
                seq                 INTEGER PRIMARY KEY AUTOINCREMENT,
                slug                TEXT NOT NULL,
                content             BLOB NOT NULL,
                sending_user_id     TEXT NOT NULL REFERENCES users(id),
                to_address          TEXT NOT NULL DEFAULT '',
                timestamp           INTEGER NOT NULL,
                UNIQUE(slug, to_address, sending_user_id)
            );

            CREATE INDEX idx_messages_recipient
                ON messages(slug, to_address);

            CREATE INDEX idx_messages_sender
                ON messages(sending_user_id, to_address, timestamp);

            CREATE TABLE trackers (
                url         TEXT PRIMARY KEY
            );

            INSERT INTO schema_version (version) VALUES (1);
            "
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
