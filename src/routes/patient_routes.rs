use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::cache::{PATIENTS, QueryKey};
use crate::domain::conversation::initials;
use crate::domain::entities::Patient;
use crate::domain::patient::{matches_search, validate_patient};
use crate::domain::vocab::Tone;
use crate::error::ApiError;
use crate::middleware::auth_context::AuthContext;
use crate::models::{ApiOk, AppState};
use crate::routes::shared::{cached_list, invalidate};
use crate::store::{Collection, Stored};

/// Registry default: newest first.
const NEWEST_FIRST: &str = "-created_date";
/// Picker order used by the agenda form.
const BY_NAME: &str = "nome_completo";

pub fn router() -> Router<AppState> {
    Router::new().route("/patients", get(search_patients).post(create_patient))
}

#[derive(Debug, Deserialize)]
pub struct PatientSearchQuery {
    pub search: Option<String>,
    /// `-created_date` (default) or `nome_completo`.
    pub sort: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PatientCard {
    #[serde(flatten)]
    pub patient: Stored<Patient>,
    pub initials: String,
    pub status_tone: Tone,
}

impl From<Stored<Patient>> for PatientCard {
    fn from(patient: Stored<Patient>) -> Self {
        PatientCard {
            initials: initials(&patient.data.full_name),
            status_tone: patient.data.status.tone(),
            patient,
        }
    }
}

pub async fn search_patients(
    State(state): State<AppState>,
    _auth: AuthContext,
    Query(q): Query<PatientSearchQuery>,
) -> Result<Json<ApiOk<Vec<PatientCard>>>, ApiError> {
    let order = match q.sort.as_deref().map(str::trim) {
        None | Some("") | Some(NEWEST_FIRST) => NEWEST_FIRST,
        Some(BY_NAME) => BY_NAME,
        Some(other) => {
            return Err(ApiError::validation(format!("unsupported sort: {other}")));
        }
    };

    let patients =
        cached_list::<Patient>(&state, QueryKey::new(PATIENTS).with(order), Some(order)).await?;
    let term = q.search.unwrap_or_default();

    Ok(Json(ApiOk {
        data: patients
            .into_iter()
            .filter(|p| matches_search(&p.data, &term))
            .map(PatientCard::from)
            .collect(),
    }))
}

pub async fn create_patient(
    State(state): State<AppState>,
    _auth: AuthContext,
    Json(body): Json<Patient>,
) -> Result<Json<ApiOk<Stored<Patient>>>, ApiError> {
    validate_patient(&body).map_err(ApiError::validation)?;

    let created = Collection::<Patient>::new(state.store.as_ref())
        .create(&body)
        .await?;
    invalidate(&state, &[PATIENTS]).await;

    tracing::info!(patient_id = %created.id, "patient registered");
    Ok(Json(ApiOk { data: created }))
}
