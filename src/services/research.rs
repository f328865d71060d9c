use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::ai::{AnalysisGateway, ClarificationAnswer};
use crate::db::research_repo;
use crate::errors::AppError;
use crate::models::{
    ClarificationQuestion, ResearchNote, ResearchResponse, ResearchSession, SessionStatus,
    UsageContext,
};

/// Open a session for `question` and store the analyst's clarifying questions.
pub async fn start_session(
    pool: &PgPool,
    gateway: &AnalysisGateway,
    question: &str,
) -> Result<(ResearchSession, Vec<ClarificationQuestion>), AppError> {
    let question = question.trim();
    if question.is_empty() {
        return Err(AppError::BadRequest("Please enter a question.".into()));
    }

    let session = research_repo::create_session(pool, question).await?;

    let completion = gateway
        .generate_clarifications(question, UsageContext::Session(session.id))
        .await?;

    let texts: Vec<String> = completion
        .output
        .into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .collect();
    let clarifications = research_repo::insert_clarifications(pool, session.id, &texts).await?;

    tracing::info!(
        session_id = %session.id,
        questions = clarifications.len(),
        "Research session started"
    );
    Ok((session, clarifications))
}

/// Pair every clarification with its answer. Any blank or missing answer
/// rejects the whole submission.
pub fn collect_answers(
    clarifications: &[ClarificationQuestion],
    answers: &HashMap<Uuid, String>,
) -> Result<Vec<ClarificationAnswer>, AppError> {
    clarifications
        .iter()
        .map(|c| {
            let answer = answers
                .get(&c.id)
                .map(|a| a.trim())
                .filter(|a| !a.is_empty())
                .ok_or_else(|| AppError::BadRequest("Please answer all questions.".into()))?;

            Ok(ClarificationAnswer {
                question: c.question_text.clone(),
                answer: answer.to_string(),
            })
        })
        .collect()
}

/// Save the user's answers, generate the research response and complete the
/// session.
pub async fn submit_answers(
    pool: &PgPool,
    gateway: &AnalysisGateway,
    session_id: Uuid,
    answers: &HashMap<Uuid, String>,
) -> Result<ResearchResponse, AppError> {
    let session = research_repo::get_session(pool, session_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("research session {session_id}")))?;

    if research_repo::get_research_response(pool, session_id).await?.is_some() {
        return Err(AppError::BadRequest("session already has a response".into()));
    }

    let clarifications = research_repo::get_clarifications(pool, session_id).await?;
    let context = collect_answers(&clarifications, answers)?;

    for (clarification, answer) in clarifications.iter().zip(&context) {
        research_repo::upsert_user_response(pool, clarification.id, &answer.answer).await?;
    }

    let completion = gateway
        .generate_research_response(
            &session.original_question,
            &context,
            UsageContext::Session(session.id),
        )
        .await?;

    let result = completion.output;
    let token_count = i32::try_from(completion.usage.total_tokens()).unwrap_or(i32::MAX);
    let response = research_repo::insert_research_response(
        pool,
        session.id,
        &result.summary,
        &result.analysis,
        &result.links,
        token_count,
    )
    .await?;

    research_repo::set_session_status(pool, session.id, SessionStatus::Completed).await?;

    tracing::info!(session_id = %session.id, links = result.links.len(), "Research session completed");
    Ok(response)
}

pub async fn add_note(pool: &PgPool, session_id: Uuid, text: &str) -> Result<ResearchNote, AppError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::BadRequest("note is empty".into()));
    }

    if research_repo::get_session(pool, session_id).await?.is_none() {
        return Err(AppError::NotFound(format!("research session {session_id}")));
    }

    Ok(research_repo::insert_note(pool, session_id, text).await?)
}

pub async fn archive_session(pool: &PgPool, session_id: Uuid) -> Result<ResearchSession, AppError> {
    if research_repo::get_session(pool, session_id).await?.is_none() {
        return Err(AppError::NotFound(format!("research session {session_id}")));
    }

    Ok(research_repo::set_session_status(pool, session_id, SessionStatus::Archived).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(position: i32, text: &str) -> ClarificationQuestion {
        ClarificationQuestion {
            id: Uuid::new_v4(),
            session_id: Uuid::nil(),
            question_text: text.into(),
            position,
        }
    }

    #[test]
    fn test_collect_answers_in_order() {
        let qs = vec![question(1, "Horizon?"), question(2, "Risk?")];
        let answers = HashMap::from([
            (qs[1].id, " aggressive ".to_string()),
            (qs[0].id, "20 years".to_string()),
        ]);

        let context = collect_answers(&qs, &answers).unwrap();
        assert_eq!(context.len(), 2);
        assert_eq!(context[0].question, "Horizon?");
        assert_eq!(context[0].answer, "20 years");
        assert_eq!(context[1].answer, "aggressive");
    }

    #[test]
    fn test_collect_answers_rejects_blank() {
        let qs = vec![question(1, "Horizon?"), question(2, "Risk?")];
        let answers = HashMap::from([(qs[0].id, "5 years".to_string()), (qs[1].id, "  ".to_string())]);
        assert!(matches!(collect_answers(&qs, &answers), Err(AppError::BadRequest(_))));

        let missing = HashMap::from([(qs[0].id, "5 years".to_string())]);
        assert!(matches!(collect_answers(&qs, &missing), Err(AppError::BadRequest(_))));
    }
}
