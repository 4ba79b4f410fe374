/// Database row types — these map directly to SQLite rows.
/// The relay layer turns them into domain values (keypairs decoded, etc).

pub struct UserRow {
    pub id: String,
    pub address: String,
    pub keypair: Vec<u8>,
    pub created_at: String,
}

pub struct AlertRow {
    pub seq: i64,
    pub recipient_user_id: String,
    pub sender_address: String,
    pub payload: Vec<u8>,
    pub timestamp: i64,
}

pub struct MailRow {
    pub seq: i64,
    pub slug: String,
    pub content: Vec<u8>,
    pub sending_user_id: String,
    pub to_address: String,
    pub timestamp: i64,
}

/// Mail joined with its sending user, for single-message retrieval.
pub struct AddressedMailRow {
    pub mail: MailRow,
    pub sender_address: String,
    pub sender_keypair: Vec<u8>,
}
