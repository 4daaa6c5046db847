// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway API.
//!
//! Student routes resolve the story through the authorization gate before
//! calling the engine; the teacher overview uses the teacher path.

use std::str::FromStr;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use lectern_core::types::{ExerciseId, HealthStatus, QuestionId, StoryId, TimedPhase};

use crate::auth::CallerIdentity;
use crate::error::{ApiError, OutcomeResponse};
use crate::server::GatewayState;

type Handled = Result<OutcomeResponse, ApiError>;

/// Body of a pre-reading submission.
#[derive(Debug, Deserialize)]
pub struct PreReadingForm {
    pub exercise_id: i64,
    pub selected_answer: String,
}

/// Body of a post-reading submission. The designator may arrive as a
/// string or a number.
#[derive(Debug, Default, Deserialize)]
pub struct AnswerForm {
    #[serde(default)]
    pub answer: Option<serde_json::Value>,
}

impl AnswerForm {
    fn designator(&self) -> Option<String> {
        match self.answer.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

/// Body of a time save.
#[derive(Debug, Deserialize)]
pub struct TimeForm {
    #[serde(default)]
    pub time_spent: i64,
}

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    pub question_id: Option<String>,
}

/// Public health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub adapters: Vec<AdapterHealth>,
}

#[derive(Debug, Serialize)]
pub struct AdapterHealth {
    pub name: String,
    pub status: String,
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// GET /health
pub async fn get_public_health(State(state): State<GatewayState>) -> impl IntoResponse {
    let mut degraded = false;
    let mut adapters = Vec::with_capacity(state.health.adapters.len());
    for adapter in &state.health.adapters {
        let status = match adapter.health_check().await {
            Ok(HealthStatus::Healthy) => "healthy".to_string(),
            Ok(HealthStatus::Degraded(reason)) => {
                degraded = true;
                format!("degraded: {reason}")
            }
            Ok(HealthStatus::Unhealthy(reason)) => {
                degraded = true;
                format!("unhealthy: {reason}")
            }
            Err(e) => {
                degraded = true;
                format!("error: {e}")
            }
        };
        adapters.push(AdapterHealth {
            name: adapter.name().to_string(),
            status,
        });
    }

    let (code, status) = if degraded {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    } else {
        (StatusCode::OK, "ok")
    };
    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: state.health.start_time.elapsed().as_secs(),
            adapters,
        }),
    )
}

/// GET /v1/stories
pub async fn list_stories(
    State(state): State<GatewayState>,
    CallerIdentity(identity): CallerIdentity,
) -> Handled {
    Ok(state.engine.list_stories(&identity).await?.into())
}

/// GET /v1/stories/{id}
pub async fn entry_state(
    State(state): State<GatewayState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<i64>,
) -> Handled {
    let story = state.gate.student_story(&identity, StoryId(id)).await?;
    Ok(state.engine.entry_state(&identity, &story).await?.into())
}

/// GET /v1/stories/{id}/pre-reading
pub async fn next_exercise(
    State(state): State<GatewayState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<i64>,
) -> Handled {
    let story = state.gate.student_story(&identity, StoryId(id)).await?;
    Ok(state.engine.next_exercise(&identity, &story).await?.into())
}

/// POST /v1/stories/{id}/pre-reading
pub async fn submit_pre_reading(
    State(state): State<GatewayState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<i64>,
    payload: Result<Json<PreReadingForm>, JsonRejection>,
) -> Handled {
    let form = body(payload)?;
    let story = state.gate.student_story(&identity, StoryId(id)).await?;
    Ok(state
        .engine
        .submit_pre_reading(
            &identity,
            &story,
            ExerciseId(form.exercise_id),
            &form.selected_answer,
        )
        .await?
        .into())
}

/// GET /v1/stories/{id}/pre-reading/summary
pub async fn pre_reading_summary(
    State(state): State<GatewayState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<i64>,
) -> Handled {
    let story = state.gate.student_story(&identity, StoryId(id)).await?;
    Ok(state.engine.pre_reading_summary(&identity, &story).await?.into())
}

/// GET /v1/stories/{id}/read
pub async fn read_story(
    State(state): State<GatewayState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<i64>,
) -> Handled {
    let story = state.gate.student_story(&identity, StoryId(id)).await?;
    Ok(state.engine.read_story(&story).await?.into())
}

/// GET /v1/stories/{id}/post-reading/{index}
pub async fn post_reading_question(
    State(state): State<GatewayState>,
    CallerIdentity(identity): CallerIdentity,
    Path((id, index)): Path<(i64, usize)>,
) -> Handled {
    let story = state.gate.student_story(&identity, StoryId(id)).await?;
    Ok(state
        .engine
        .post_reading_question(&identity, &story, index)
        .await?
        .into())
}

/// POST /v1/stories/{id}/post-reading/questions/{qid}
///
/// An unreadable body counts as no selection and re-displays the question.
pub async fn submit_post_reading(
    State(state): State<GatewayState>,
    CallerIdentity(identity): CallerIdentity,
    Path((id, qid)): Path<(i64, i64)>,
    payload: Result<Json<AnswerForm>, JsonRejection>,
) -> Handled {
    let form = payload.map(|Json(form)| form).unwrap_or_default();
    let designator = form.designator();
    let story = state.gate.student_story(&identity, StoryId(id)).await?;
    Ok(state
        .engine
        .submit_post_reading(&identity, &story, QuestionId(qid), designator.as_deref())
        .await?
        .into())
}

/// GET /v1/stories/{id}/post-reading/summary
pub async fn post_reading_summary(
    State(state): State<GatewayState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<i64>,
) -> Handled {
    let story = state.gate.student_story(&identity, StoryId(id)).await?;
    Ok(state.engine.post_reading_summary(&identity, &story).await?.into())
}

/// GET /v1/stories/{id}/lookup?question_id=
pub async fn story_lookup(
    State(state): State<GatewayState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<i64>,
    Query(query): Query<LookupQuery>,
) -> Handled {
    let story = state.gate.student_story(&identity, StoryId(id)).await?;
    Ok(state
        .engine
        .story_lookup(&identity, &story, query.question_id.as_deref())
        .await?
        .into())
}

/// POST /v1/stories/{id}/lookup/{qid}
pub async fn start_lookup(
    State(state): State<GatewayState>,
    CallerIdentity(identity): CallerIdentity,
    Path((id, qid)): Path<(i64, i64)>,
) -> Handled {
    let story = state.gate.student_story(&identity, StoryId(id)).await?;
    Ok(state
        .engine
        .start_lookup(&identity, &story, QuestionId(qid))
        .await?
        .into())
}

/// POST /v1/stories/{id}/return/{index}
pub async fn return_to_question(
    State(state): State<GatewayState>,
    CallerIdentity(identity): CallerIdentity,
    Path((id, index)): Path<(i64, usize)>,
) -> Handled {
    let story = state.gate.student_story(&identity, StoryId(id)).await?;
    Ok(state.engine.return_to_question(&story, index).into())
}

/// POST /v1/stories/{id}/time/{phase}
pub async fn save_time(
    State(state): State<GatewayState>,
    CallerIdentity(identity): CallerIdentity,
    Path((id, phase)): Path<(i64, String)>,
    payload: Result<Json<TimeForm>, JsonRejection>,
) -> Handled {
    let phase = TimedPhase::from_str(&phase)
        .map_err(|_| ApiError::BadRequest(format!("unknown phase `{phase}`")))?;
    let form = body(payload)?;
    let story = state.gate.student_story(&identity, StoryId(id)).await?;
    Ok(state
        .engine
        .save_time(&identity, &story, phase, form.time_spent)
        .await?
        .into())
}

/// POST /v1/stories/{id}/reset
pub async fn reset(
    State(state): State<GatewayState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<i64>,
) -> Handled {
    let story = state.gate.student_story(&identity, StoryId(id)).await?;
    Ok(state.engine.reset(&identity, &story).await?.into())
}

/// GET /v1/teacher/stories/{id}
pub async fn teacher_overview(
    State(state): State<GatewayState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<i64>,
) -> Handled {
    let story = state.gate.teacher_story(&identity, StoryId(id)).await?;
    Ok(state.engine.teacher_overview(&story).await?.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn designator_accepts_strings_and_numbers() {
        let form: AnswerForm = serde_json::from_str(r#"{"answer": "2"}"#).unwrap();
        assert_eq!(form.designator().as_deref(), Some("2"));
        let form: AnswerForm = serde_json::from_str(r#"{"answer": 2}"#).unwrap();
        assert_eq!(form.designator().as_deref(), Some("2"));
        let form: AnswerForm = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(form.designator(), None);
        let form: AnswerForm = serde_json::from_str(r#"{"answer": null}"#).unwrap();
        assert_eq!(form.designator(), None);
    }

    #[test]
    fn time_form_defaults_to_zero() {
        let form: TimeForm = serde_json::from_str("{}").unwrap();
        assert_eq!(form.time_spent, 0);
        assert!(serde_json::from_str::<TimeForm>(r#"{"time_spent": "abc"}"#).is_err());
    }
}
