use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Metadata for a file stored in the managed object store.
///
/// The file content itself never passes through this API; clients upload to
/// the store directly and access private files via time-limited signed URLs.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Attachment {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub conversation_id: Uuid,
    pub file_name: String,
    pub content_type: String,
    /// Object key within the attachments bucket.
    pub storage_path: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

impl Attachment {
    pub fn new(
        owner_id: Uuid,
        conversation_id: Uuid,
        file_name: String,
        content_type: String,
        size_bytes: i64,
    ) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            owner_id,
            conversation_id,
            storage_path: format!("{}/{}/{}", owner_id, conversation_id, id),
            file_name,
            content_type,
            size_bytes,
            created_at: Utc::now(),
        }
    }
}
