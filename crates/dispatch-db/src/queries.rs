use crate::models::{AddressedMailRow, AlertRow, MailRow, UserRow};
use crate::Database;
use anyhow::Result;
use rusqlite::{Connection, Row};

/// SQLite treats a negative LIMIT as "no limit".
fn sql_limit(limit: Option<u32>) -> i64 {
    limit.map(i64::from).unwrap_or(-1)
}

/// Watermarks arrive as u64 from clients; clamp rather than wrap.
fn sql_since(since: u64) -> i64 {
    i64::try_from(since).unwrap_or(i64::MAX)
}

impl Database {
    // -- Users --

    pub fn create_user(&self, id: &str, address: &str, keypair: &[u8]) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, address, keypair) VALUES (?1, ?2, ?3)",
                rusqlite::params![id, address, keypair],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_address(&self, address: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_address(conn, address))
    }

    // -- Alerts --

    pub fn insert_alert(
        &self,
        recipient_user_id: &str,
        sender_address: &str,
        payload: &[u8],
        timestamp: i64,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO alerts (recipient_user_id, sender_address, payload, timestamp) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![recipient_user_id, sender_address, payload, timestamp],
            )?;
            Ok(())
        })
    }

    /// Alerts owned by the user at `address`, newer than `since`, newest first.
    pub fn get_alerts_since(
        &self,
        address: &str,
        since: u64,
        limit: Option<u32>,
    ) -> Result<Vec<AlertRow>> {
        self.with_conn(|conn| query_alerts_since(conn, address, since, limit))
    }

    // -- Mail --

    /// Returns false when an identical row (same slug, recipient and sender)
    /// already exists.
    pub fn insert_mail(
        &self,
        slug: &str,
        content: &[u8],
        sending_user_id: &str,
        to_address: &str,
        timestamp: i64,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO messages (slug, content, sending_user_id, to_address, timestamp) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![slug, content, sending_user_id, to_address, timestamp],
            )?;
            Ok(inserted > 0)
        })
    }

    /// Every private row matching slug and recipient. Public rows never
    /// match. Callers decide what a count other than one means.
    pub fn get_mail_for_recipient(
        &self,
        slug: &str,
        to_address: &str,
    ) -> Result<Vec<AddressedMailRow>> {
        self.with_conn(|conn| query_mail_for_recipient(conn, slug, to_address))
    }

    /// Public mail from one sender, newer than `since`, newest first.
    pub fn get_public_mail_since(
        &self,
        sending_user_id: &str,
        since: u64,
        limit: Option<u32>,
    ) -> Result<Vec<MailRow>> {
        self.with_conn(|conn| query_public_mail_since(conn, sending_user_id, since, limit))
    }

    // -- Trackers --

    pub fn add_tracker(&self, url: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("INSERT OR IGNORE INTO trackers (url) VALUES (?1)", [url])?;
            Ok(())
        })
    }

    pub fn get_trackers(&self) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT url FROM trackers ORDER BY url")?;
            let rows = stmt
                .query_map([], |row| row.get(0))?
                .collect::<std::result::Result<Vec<String>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_user_by_address(conn: &Connection, address: &str) -> Result<Option<UserRow>> {
    let mut stmt =
        conn.prepare("SELECT id, address, keypair, created_at FROM users WHERE address = ?1")?;

    let row = stmt
        .query_row([address], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                address: row.get(1)?,
                keypair: row.get(2)?,
                created_at: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_alerts_since(
    conn: &Connection,
    address: &str,
    since: u64,
    limit: Option<u32>,
) -> Result<Vec<AlertRow>> {
    let mut stmt = conn.prepare(
        "SELECT a.seq, a.recipient_user_id, a.sender_address, a.payload, a.timestamp
         FROM alerts a
         JOIN users u ON a.recipient_user_id = u.id
         WHERE u.address = ?1 AND a.timestamp > ?2
         ORDER BY a.timestamp DESC, a.seq DESC
         LIMIT ?3",
    )?;

    let rows = stmt
        .query_map(
            rusqlite::params![address, sql_since(since), sql_limit(limit)],
            |row| {
                Ok(AlertRow {
                    seq: row.get(0)?,
                    recipient_user_id: row.get(1)?,
                    sender_address: row.get(2)?,
                    payload: row.get(3)?,
                    timestamp: row.get(4)?,
                })
            },
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn mail_row(row: &Row<'_>) -> rusqlite::Result<MailRow> {
    Ok(MailRow {
        seq: row.get(0)?,
        slug: row.get(1)?,
        content: row.get(2)?,
        sending_user_id: row.get(3)?,
        to_address: row.get(4)?,
        timestamp: row.get(5)?,
    })
}

fn query_mail_for_recipient(
    conn: &Connection,
    slug: &str,
    to_address: &str,
) -> Result<Vec<AddressedMailRow>> {
    let mut stmt = conn.prepare(
        "SELECT m.seq, m.slug, m.content, m.sending_user_id, m.to_address, m.timestamp,
                u.address, u.keypair
         FROM messages m
         JOIN users u ON m.sending_user_id = u.id
         WHERE m.slug = ?1 AND m.to_address = ?2 AND m.to_address <> ''",
    )?;

    let rows = stmt
        .query_map(rusqlite::params![slug, to_address], |row| {
            Ok(AddressedMailRow {
                mail: mail_row(row)?,
                sender_address: row.get(6)?,
                sender_keypair: row.get(7)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_public_mail_since(
    conn: &Connection,
    sending_user_id: &str,
    since: u64,
    limit: Option<u32>,
) -> Result<Vec<MailRow>> {
    let mut stmt = conn.prepare(
        "SELECT seq, slug, content, sending_user_id, to_address, timestamp
         FROM messages
         WHERE sending_user_id = ?1 AND to_address = '' AND timestamp > ?2
         ORDER BY timestamp DESC, seq DESC
         LIMIT ?3",
    )?;

    let rows = stmt
        .query_map(
            rusqlite::params![sending_user_id, sql_since(since), sql_limit(limit)],
            mail_row,
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_with_users() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u-alice", "alice", &[1u8; 32]).unwrap();
        db.create_user("u-bob", "bob", &[2u8; 32]).unwrap();
        db
    }

    #[test]
    fn user_lookup_is_exact_match() {
        let db = db_with_users();
        let alice = db.get_user_by_address("alice").unwrap().unwrap();
        assert_eq!(alice.id, "u-alice");
        assert_eq!(alice.keypair, vec![1u8; 32]);

        assert!(db.get_user_by_address("Alice").unwrap().is_none());
        assert!(db.get_user_by_address("alice ").unwrap().is_none());
    }

    #[test]
    fn duplicate_address_rejected() {
        let db = db_with_users();
        assert!(db.create_user("u-other", "alice", &[3u8; 32]).is_err());
    }

    #[test]
    fn address_values_are_bound_not_interpolated() {
        let db = db_with_users();
        assert!(db.get_user_by_address("' OR '1'='1").unwrap().is_none());
        assert!(db.get_alerts_since("' OR ''='", 0, None).unwrap().is_empty());
    }

    #[test]
    fn alerts_filtered_and_ordered() {
        let db = db_with_users();
        db.insert_alert("u-bob", "alice", b"one", 10).unwrap();
        db.insert_alert("u-bob", "alice", b"two", 20).unwrap();
        db.insert_alert("u-bob", "carol", b"three", 30).unwrap();
        db.insert_alert("u-alice", "bob", b"other", 40).unwrap();

        let all: Vec<Vec<u8>> = db
            .get_alerts_since("bob", 0, None)
            .unwrap()
            .into_iter()
            .map(|a| a.payload)
            .collect();
        assert_eq!(all, vec![b"three".to_vec(), b"two".to_vec(), b"one".to_vec()]);

        let newer = db.get_alerts_since("bob", 10, None).unwrap();
        assert_eq!(newer.len(), 2);
        assert!(newer.iter().all(|a| a.timestamp > 10));

        let limited = db.get_alerts_since("bob", 0, Some(1)).unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].payload, b"three");
    }

    #[test]
    fn same_second_alerts_newest_insert_first() {
        let db = db_with_users();
        db.insert_alert("u-bob", "alice", b"first", 5).unwrap();
        db.insert_alert("u-bob", "alice", b"second", 5).unwrap();

        let rows = db.get_alerts_since("bob", 0, None).unwrap();
        assert_eq!(rows[0].payload, b"second");
        assert_eq!(rows[1].payload, b"first");
    }

    #[test]
    fn huge_watermark_returns_nothing() {
        let db = db_with_users();
        db.insert_alert("u-bob", "alice", b"one", 10).unwrap();
        assert!(db.get_alerts_since("bob", u64::MAX, None).unwrap().is_empty());
    }

    #[test]
    fn duplicate_mail_row_ignored() {
        let db = db_with_users();
        assert!(db.insert_mail("slug", b"body", "u-alice", "bob", 1).unwrap());
        assert!(!db.insert_mail("slug", b"body", "u-alice", "bob", 2).unwrap());
        assert!(db.insert_mail("slug", b"body", "u-alice", "carol", 2).unwrap());

        let rows = db.get_mail_for_recipient("slug", "bob").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].sender_address, "alice");
        assert_eq!(rows[0].mail.timestamp, 1);
    }

    #[test]
    fn public_rows_never_match_recipient_lookup() {
        let db = db_with_users();
        db.insert_mail("p1", b"public", "u-alice", "", 1).unwrap();
        assert!(db.get_mail_for_recipient("p1", "").unwrap().is_empty());
    }

    #[test]
    fn public_mail_excludes_private_rows() {
        let db = db_with_users();
        db.insert_mail("p1", b"public one", "u-alice", "", 1).unwrap();
        db.insert_mail("x", b"private", "u-alice", "bob", 2).unwrap();
        db.insert_mail("p2", b"public two", "u-alice", "", 3).unwrap();
        db.insert_mail("p3", b"bob public", "u-bob", "", 4).unwrap();

        let rows = db.get_public_mail_since("u-alice", 0, None).unwrap();
        let slugs: Vec<&str> = rows.iter().map(|r| r.slug.as_str()).collect();
        assert_eq!(slugs, vec!["p2", "p1"]);

        assert!(db.get_public_mail_since("u-alice", 3, None).unwrap().is_empty());
    }

    #[test]
    fn trackers_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_trackers().unwrap().is_empty());
        db.add_tracker("tracker.example:2048").unwrap();
        db.add_tracker("tracker.example:2048").unwrap();
        db.add_tracker("alt.example:2048").unwrap();
        assert_eq!(
            db.get_trackers().unwrap(),
            vec!["alt.example:2048".to_string(), "tracker.example:2048".to_string()]
        );
    }
}
