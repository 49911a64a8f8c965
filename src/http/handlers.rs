//! JSON handlers over sessions and engines.

use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::http::response::{ApiError, ApiResult};
use crate::http::server::AppState;
use crate::resilience::{BreakerSnapshot, Evaluation};
use crate::routing::RouteMatch;
use crate::security::{AuthOutcome, Decision, RateLimitSnapshot};
use crate::session::SessionId;
use crate::teaching::{
    cache, orchestration, AnswerOutcome, CacheFetch, JourneyView, PhaseEvent, QuizQuestion,
    QuizView, QUESTIONS,
};
use crate::tutor::{TutorReply, GREETING};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub sessions: usize,
}

#[derive(Serialize)]
pub struct RouteView {
    pub name: String,
    pub prefix: String,
    pub target: String,
}

#[derive(Serialize)]
pub struct SessionCreated {
    pub id: SessionId,
    pub greeting: &'static str,
}

#[derive(Deserialize)]
pub struct RouteRequest {
    pub path: String,
}

#[derive(Serialize)]
pub struct RouteResponse {
    pub path: String,
    #[serde(flatten)]
    pub result: RouteMatch,
    pub upstream_url: Option<String>,
    pub message: String,
}

#[derive(Serialize)]
pub struct SubmitResponse {
    pub decision: Decision,
    #[serde(flatten)]
    pub window: RateLimitSnapshot,
}

#[derive(Deserialize)]
pub struct EvaluateRequest {
    pub healthy: bool,
}

#[derive(Serialize)]
pub struct EvaluateResponse {
    #[serde(flatten)]
    pub evaluation: Evaluation,
    pub breaker: BreakerSnapshot,
}

#[derive(Deserialize)]
pub struct TokenRequest {
    pub token: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub outcome: AuthOutcome,
}

#[derive(Deserialize)]
pub struct AnswerRequest {
    pub option: String,
}

#[derive(Deserialize)]
pub struct AskRequest {
    pub question: String,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        sessions: state.sessions.len(),
    })
}

pub async fn list_routes(State(state): State<AppState>) -> Json<Vec<RouteView>> {
    let routes = state
        .router
        .routes()
        .iter()
        .map(|r| RouteView {
            name: r.name.clone(),
            prefix: r.prefix().to_string(),
            target: r.target.clone(),
        })
        .collect();
    Json(routes)
}

// --- Sessions ---

pub async fn create_session(
    State(state): State<AppState>,
) -> ApiResult<(StatusCode, Json<SessionCreated>)> {
    let session = state.sessions.create()?;
    Ok((
        StatusCode::CREATED,
        Json(SessionCreated {
            id: session.id,
            greeting: GREETING,
        }),
    ))
}

pub async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> ApiResult<StatusCode> {
    state.sessions.end(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Routing ---

pub async fn match_route(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Json(body): Json<RouteRequest>,
) -> ApiResult<Json<RouteResponse>> {
    state.sessions.get(&id)?;

    let result = state.router.resolve(&body.path).await;
    Ok(Json(RouteResponse {
        upstream_url: result.upstream_url(&body.path),
        message: result.describe(&body.path),
        path: body.path,
        result,
    }))
}

// --- Rate limiting ---

pub async fn rate_limit_snapshot(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> ApiResult<Json<RateLimitSnapshot>> {
    let session = state.sessions.get(&id)?;
    let snapshot = session.rate_limiter().snapshot();
    Ok(Json(snapshot))
}

pub async fn rate_limit_submit(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> ApiResult<Json<SubmitResponse>> {
    let session = state.sessions.get(&id)?;
    let mut limiter = session.rate_limiter();
    let decision = limiter.submit();
    Ok(Json(SubmitResponse {
        decision,
        window: limiter.snapshot(),
    }))
}

pub async fn rate_limit_reset(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> ApiResult<Json<RateLimitSnapshot>> {
    let session = state.sessions.get(&id)?;
    let mut limiter = session.rate_limiter();
    limiter.reset();
    Ok(Json(limiter.snapshot()))
}

// --- Circuit breaker ---

pub async fn breaker_snapshot(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> ApiResult<Json<BreakerSnapshot>> {
    let session = state.sessions.get(&id)?;
    Ok(Json(session.breaker().snapshot()))
}

pub async fn breaker_evaluate(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Json(body): Json<EvaluateRequest>,
) -> ApiResult<Json<EvaluateResponse>> {
    let session = state.sessions.get(&id)?;
    let evaluation = session.breaker().evaluate(body.healthy);
    Ok(Json(EvaluateResponse {
        evaluation,
        breaker: session.breaker().snapshot(),
    }))
}

pub async fn breaker_reset(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> ApiResult<Json<BreakerSnapshot>> {
    let session = state.sessions.get(&id)?;
    session.breaker().reset();
    Ok(Json(session.breaker().snapshot()))
}

// --- Auth & caching demos ---

pub async fn validate_token(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Json(body): Json<TokenRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let session = state.sessions.get(&id)?;
    let outcome = session.auth().validate(&body.token).await;
    Ok(Json(TokenResponse { outcome }))
}

pub async fn cache_fetch(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> ApiResult<Json<CacheFetch>> {
    let session = state.sessions.get(&id)?;
    let fetch = session.cache().fetch();
    Ok(Json(cache::serve(fetch).await))
}

pub async fn cache_purge(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> ApiResult<StatusCode> {
    let session = state.sessions.get(&id)?;
    session.cache().purge();
    Ok(StatusCode::NO_CONTENT)
}

// --- Lifecycle walkthrough & orchestration ---

pub async fn journey_view(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> ApiResult<Json<JourneyView>> {
    let session = state.sessions.get(&id)?;
    let view = session.journey().view();
    Ok(Json(view))
}

pub async fn journey_next(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> ApiResult<Json<JourneyView>> {
    let session = state.sessions.get(&id)?;
    let mut journey = session.journey();
    journey.next();
    Ok(Json(journey.view()))
}

pub async fn journey_prev(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> ApiResult<Json<JourneyView>> {
    let session = state.sessions.get(&id)?;
    let mut journey = session.journey();
    journey.prev();
    Ok(Json(journey.view()))
}

pub async fn place_order(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> ApiResult<Json<Vec<PhaseEvent>>> {
    state.sessions.get(&id)?;
    let step = Duration::from_millis(state.config.simulation.order_step_ms);
    let trace = orchestration::run(step, |event| {
        tracing::info!(session = %id, phase = ?event.phase, "Order progressed");
    })
    .await;
    Ok(Json(trace))
}

// --- Quiz ---

pub async fn quiz_questions() -> Json<Vec<QuizQuestion>> {
    Json(QUESTIONS.to_vec())
}

pub async fn quiz_view(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> ApiResult<Json<QuizView>> {
    let session = state.sessions.get(&id)?;
    let view = session.quiz().view();
    Ok(Json(view))
}

pub async fn quiz_answer(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Json(body): Json<AnswerRequest>,
) -> ApiResult<Json<AnswerOutcome>> {
    let session = state.sessions.get(&id)?;
    let outcome = session.quiz().answer(&body.option)?;
    Ok(Json(outcome))
}

pub async fn quiz_restart(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> ApiResult<Json<QuizView>> {
    let session = state.sessions.get(&id)?;
    let mut quiz = session.quiz();
    quiz.restart();
    Ok(Json(quiz.view()))
}

// --- Tutor ---

pub async fn tutor_ask(
    State(state): State<AppState>,
    Json(body): Json<AskRequest>,
) -> ApiResult<Json<TutorReply>> {
    let question = body.question.trim();
    if question.is_empty() {
        return Err(ApiError::BadRequest("question must not be empty".into()));
    }
    Ok(Json(state.tutor.ask(question).await))
}
