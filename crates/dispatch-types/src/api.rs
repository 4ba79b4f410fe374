use serde::{Deserialize, Serialize};

// Binary fields travel as standard base64.

// -- Alerts --

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SaveAlertRequest {
    pub alert: String,
    pub from_address: String,
    pub to_address: String,
}

// -- Mail --

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SavePublicMailRequest {
    pub mail: String,
    pub from_address: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SavePrivateMailRequest {
    pub mail: String,
    pub from_address: String,
    pub to_addresses: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SavePrivateMailResponse {
    pub id: String,
}

// -- Retrieval --

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub id: String,
    pub envelope: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeedResponse {
    pub items: Vec<String>,
}

// -- Server --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub location: String,
    pub address: String,
    pub trackers: Vec<String>,
}
