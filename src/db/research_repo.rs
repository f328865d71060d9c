use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::ai::ResourceLink;
use crate::models::research::session_title;
use crate::models::{
    ClarificationQuestion, ResearchNote, ResearchResponse, ResearchSession, SessionStatus,
    UserResponse,
};

pub async fn create_session(pool: &PgPool, question: &str) -> anyhow::Result<ResearchSession> {
    let session = sqlx::query_as::<_, ResearchSession>(
        r#"
        INSERT INTO research_sessions (title, original_question, status)
        VALUES ($1, $2, 'in_progress')
        RETURNING *
        "#,
    )
    .bind(session_title(question))
    .bind(question.trim())
    .fetch_one(pool)
    .await?;

    Ok(session)
}

pub async fn get_session(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<ResearchSession>> {
    let session = sqlx::query_as::<_, ResearchSession>("SELECT * FROM research_sessions WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(session)
}

pub async fn list_sessions(pool: &PgPool, limit: i64) -> anyhow::Result<Vec<ResearchSession>> {
    let sessions = sqlx::query_as::<_, ResearchSession>(
        "SELECT * FROM research_sessions ORDER BY created_at DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(sessions)
}

pub async fn set_session_status(
    pool: &PgPool,
    id: Uuid,
    status: SessionStatus,
) -> anyhow::Result<ResearchSession> {
    let session = sqlx::query_as::<_, ResearchSession>(
        r#"
        UPDATE research_sessions
        SET status = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(status.as_str())
    .fetch_one(pool)
    .await?;

    Ok(session)
}

/// Store clarification questions in order, numbered from 1.
pub async fn insert_clarifications(
    pool: &PgPool,
    session_id: Uuid,
    questions: &[String],
) -> anyhow::Result<Vec<ClarificationQuestion>> {
    let mut tx = pool.begin().await?;
    let mut stored = Vec::with_capacity(questions.len());

    for (idx, text) in questions.iter().enumerate() {
        let q = sqlx::query_as::<_, ClarificationQuestion>(
            r#"
            INSERT INTO clarification_questions (session_id, question_text, position)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(session_id)
        .bind(text)
        .bind(i32::try_from(idx + 1)?)
        .fetch_one(&mut *tx)
        .await?;
        stored.push(q);
    }

    tx.commit().await?;
    Ok(stored)
}

pub async fn get_clarifications(
    pool: &PgPool,
    session_id: Uuid,
) -> anyhow::Result<Vec<ClarificationQuestion>> {
    let questions = sqlx::query_as::<_, ClarificationQuestion>(
        "SELECT * FROM clarification_questions WHERE session_id = $1 ORDER BY position",
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    Ok(questions)
}

/// Save (or replace) the answer to one clarification.
pub async fn upsert_user_response(
    pool: &PgPool,
    clarification_id: Uuid,
    text: &str,
) -> anyhow::Result<UserResponse> {
    let response = sqlx::query_as::<_, UserResponse>(
        r#"
        INSERT INTO user_responses (clarification_id, response_text)
        VALUES ($1, $2)
        ON CONFLICT (clarification_id) DO UPDATE SET response_text = $2
        RETURNING *
        "#,
    )
    .bind(clarification_id)
    .bind(text)
    .fetch_one(pool)
    .await?;

    Ok(response)
}

pub async fn insert_research_response(
    pool: &PgPool,
    session_id: Uuid,
    summary: &str,
    detailed_response: &str,
    links: &[ResourceLink],
    token_count: i32,
) -> anyhow::Result<ResearchResponse> {
    let response = sqlx::query_as::<_, ResearchResponse>(
        r#"
        INSERT INTO research_responses (session_id, summary, detailed_response, links, token_count)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(session_id)
    .bind(summary)
    .bind(detailed_response)
    .bind(Json(links))
    .bind(token_count)
    .fetch_one(pool)
    .await?;

    Ok(response)
}

pub async fn get_research_response(
    pool: &PgPool,
    session_id: Uuid,
) -> anyhow::Result<Option<ResearchResponse>> {
    let response = sqlx::query_as::<_, ResearchResponse>(
        "SELECT * FROM research_responses WHERE session_id = $1",
    )
    .bind(session_id)
    .fetch_optional(pool)
    .await?;

    Ok(response)
}

pub async fn insert_note(pool: &PgPool, session_id: Uuid, text: &str) -> anyhow::Result<ResearchNote> {
    let note = sqlx::query_as::<_, ResearchNote>(
        r#"
        INSERT INTO research_notes (session_id, note_text)
        VALUES ($1, $2)
        RETURNING *
        "#,
    )
    .bind(session_id)
    .bind(text)
    .fetch_one(pool)
    .await?;

    Ok(note)
}

pub async fn get_notes(pool: &PgPool, session_id: Uuid) -> anyhow::Result<Vec<ResearchNote>> {
    let notes = sqlx::query_as::<_, ResearchNote>(
        "SELECT * FROM research_notes WHERE session_id = $1 ORDER BY created_at DESC",
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    Ok(notes)
}
