// ── Wire → domain conversion ──

use secrecy::SecretString;

use sharenav_api::{ServerRecord, ShareRecord};

use crate::model::{Server, ServerId, Share, ShareId};

impl From<ServerRecord> for Server {
    fn from(record: ServerRecord) -> Self {
        Self {
            id: ServerId::new(record.id),
            name: record.name,
            active: record.active,
            session: SecretString::from(record.session),
        }
    }
}

/// Build a share listed by `server`. Shares without an id are keyed by name.
pub fn share_from_record(record: ShareRecord, server: &ServerId) -> Share {
    let id = record.id.unwrap_or_else(|| record.name.clone());
    Share {
        id: ShareId::new(id),
        name: record.name,
        server: server.clone(),
    }
}
