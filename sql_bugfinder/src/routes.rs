use crate::AppState;
use crate::analyzer::ErrorKind;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use common::models::{AnalysisResult, AnalyzeRequest, ErrorResponse};
use log::{error, info, warn};

pub const REQUEST_FAILED_MESSAGE: &str =
    "failed to analyze the SQL query, the AI service may be unavailable";

type AnalyzeErrorResponse = (StatusCode, Json<ErrorResponse>);

#[utoipa::path(post, path = "/api/v1/analyze", request_body = AnalyzeRequest, responses((status = OK, body = AnalysisResult), (status = BAD_REQUEST, body = ErrorResponse), (status = UNPROCESSABLE_ENTITY, body = ErrorResponse), (status = BAD_GATEWAY, body = ErrorResponse)), description = "Checks an SQL query against a database schema")]
#[axum::debug_handler]
pub async fn analyze(
    state: State<AppState>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, AnalyzeErrorResponse> {
    let Json(body) = body.map_err(|rejection| {
        warn!("rejected analyze request body: {rejection}");
        error_response(rejection.status(), rejection.body_text())
    })?;
    body.validate()
        .map_err(|err| error_response(StatusCode::UNPROCESSABLE_ENTITY, err.to_string()))?;

    let result = state
        .analyzer
        .analyze(&body.schema, &body.query)
        .await
        .map_err(|err| match err.kind() {
            ErrorKind::InputMissing => {
                error_response(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
            ErrorKind::RequestFailed => {
                error!("Error while handling analyze request: {err}");
                error_response(StatusCode::BAD_GATEWAY, REQUEST_FAILED_MESSAGE.to_string())
            }
        })?;

    info!("analysis finished, buggy: {}", result.is_buggy);
    Ok(Json(result))
}

fn error_response(code: StatusCode, message: String) -> AnalyzeErrorResponse {
    (
        code,
        Json(ErrorResponse {
            code: code.as_u16(),
            message,
        }),
    )
}
