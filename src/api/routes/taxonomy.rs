use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::classify::Classifier;
use crate::models::Faction;
use crate::taxonomy::{WeaponKind, WeaponTaxonomy};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    pub nation: String,
    pub faction: Faction,
    pub infantry: usize,
    pub vehicles: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyResponse {
    pub version: String,
    pub total_weapons: usize,
    pub axis_weapons: usize,
    pub allies_weapons: usize,
    pub groups: Vec<GroupSummary>,
}

impl From<&WeaponTaxonomy> for TaxonomyResponse {
    fn from(taxonomy: &WeaponTaxonomy) -> Self {
        Self {
            version: taxonomy.version().to_string(),
            total_weapons: taxonomy.len(),
            axis_weapons: taxonomy.count(Faction::Axis),
            allies_weapons: taxonomy.count(Faction::Allies),
            groups: taxonomy
                .groups()
                .iter()
                .map(|g| GroupSummary {
                    nation: g.nation.clone(),
                    faction: g.faction,
                    infantry: g.infantry.len(),
                    vehicles: g.vehicles.len(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponResponse {
    pub weapon: String,
    pub faction: Faction,
    pub nation: String,
    pub kind: WeaponKind,
}

pub async fn get_taxonomy(State(state): State<AppState>) -> Json<TaxonomyResponse> {
    let classifier = state.classifier().await;
    Json(TaxonomyResponse::from(classifier.taxonomy()))
}

pub async fn get_weapon(
    State(state): State<AppState>,
    Path(weapon): Path<String>,
) -> Result<Json<WeaponResponse>, ApiError> {
    let classifier = state.classifier().await;
    let entry = classifier
        .taxonomy()
        .lookup(&weapon)
        .ok_or_else(|| ApiError::NotFound(format!("Weapon '{}' is not in the taxonomy", weapon)))?;

    Ok(Json(WeaponResponse {
        faction: entry.faction,
        nation: entry.nation.clone(),
        kind: entry.kind,
        weapon,
    }))
}

/// Re-read the configured taxonomy file and swap in a new classifier.
pub async fn reload_taxonomy(
    State(state): State<AppState>,
) -> Result<Json<TaxonomyResponse>, ApiError> {
    let path = state.config.taxonomy_path.clone().ok_or_else(|| {
        ApiError::BadRequest("No taxonomy_path configured; using the built-in table".to_string())
    })?;

    let taxonomy = tokio::task::spawn_blocking(move || WeaponTaxonomy::from_file(&path))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let response = TaxonomyResponse::from(&taxonomy);
    let classifier = Classifier::new(Arc::new(taxonomy), state.config.classifier);
    *state.classifier.write().await = Arc::new(classifier);

    tracing::info!("Reloaded weapon taxonomy {}", response.version);
    Ok(Json(response))
}
