use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

use crate::ai::ResourceLink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
    Archived,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
            SessionStatus::Archived => "archived",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "in_progress" => Some(SessionStatus::InProgress),
            "completed" => Some(SessionStatus::Completed),
            "archived" => Some(SessionStatus::Archived),
            _ => None,
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database row for research_sessions table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResearchSession {
    pub id: Uuid,
    pub title: String,
    pub original_question: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResearchSession {
    pub fn status(&self) -> Option<SessionStatus> {
        SessionStatus::from_db_str(&self.status)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClarificationQuestion {
    pub id: Uuid,
    pub session_id: Uuid,
    pub question_text: String,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserResponse {
    pub id: Uuid,
    pub clarification_id: Uuid,
    pub response_text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResearchResponse {
    pub id: Uuid,
    pub session_id: Uuid,
    pub summary: String,
    pub detailed_response: String,
    pub links: Json<Vec<ResourceLink>>,
    pub token_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResearchNote {
    pub id: Uuid,
    pub session_id: Uuid,
    pub note_text: String,
    pub created_at: DateTime<Utc>,
}

/// Title shown in session lists: the first 200 characters of the question.
pub fn session_title(question: &str) -> String {
    question.trim().chars().take(200).collect()
}
