use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prefix of entry IDs created from live speech transcription.
const LIVE_ID_PREFIX: &str = "live-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Model => f.write_str("model"),
        }
    }
}

/// One conversation turn, typed or spoken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptEntry {
    pub id: String,
    pub role: Role,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl TranscriptEntry {
    /// Whether this entry was produced by live transcription.
    pub fn is_live(&self) -> bool {
        self.id.starts_with(LIVE_ID_PREFIX)
    }
}

/// Running conversation transcript.
///
/// Transcription arrives in small fragments. Consecutive fragments from the
/// same speaker are merged into one entry until the other side speaks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a complete typed message. Never merged with live fragments.
    pub fn push_message(&mut self, role: Role, text: impl Into<String>) -> &TranscriptEntry {
        self.push_entry(uuid::Uuid::new_v4().to_string(), role, text.into())
    }

    /// Merge a live transcription fragment and return the entry it landed in.
    pub fn append_live(&mut self, role: Role, fragment: &str) -> &TranscriptEntry {
        let merge = self
            .entries
            .last()
            .is_some_and(|last| last.role == role && last.is_live());

        if merge {
            let last = self.entries.len() - 1;
            self.entries[last].text.push_str(fragment);
            return &self.entries[last];
        }

        let id = format!("{}{}-{}", LIVE_ID_PREFIX, role, uuid::Uuid::new_v4());
        self.push_entry(id, role, fragment.to_string())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    fn push_entry(&mut self, id: String, role: Role, text: String) -> &TranscriptEntry {
        self.entries.push(TranscriptEntry {
            id,
            role,
            text,
            created_at: Utc::now(),
        });
        &self.entries[self.entries.len() - 1]
    }
}
