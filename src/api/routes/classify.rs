use axum::extract::State;
use axum::Json;

use crate::api::state::AppState;
use crate::models::{ClassifiedMatch, MatchStats};

/// Label every player of a posted match.
pub async fn classify_match(
    State(state): State<AppState>,
    Json(stats): Json<MatchStats>,
) -> Json<ClassifiedMatch> {
    let classifier = state.classifier().await;
    let result = classifier.classify_match(&stats);

    tracing::info!(
        match_id = stats.match_id.as_deref().unwrap_or("-"),
        players = result.players.len(),
        taxonomy = %result.taxonomy_version,
        "Classified match"
    );

    Json(result)
}
