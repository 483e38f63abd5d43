use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch},
};
use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cache::{APPOINTMENTS, QueryKey};
use crate::domain::calendar::{bin_month, calendar_day, month_bounds};
use crate::domain::entities::Appointment;
use crate::domain::vocab::{AppointmentStatus, Tone};
use crate::error::ApiError;
use crate::middleware::auth_context::AuthContext;
use crate::models::{ApiOk, AppState};
use crate::routes::shared::{cached_list, invalidate};
use crate::store::{Collection, Stored};

/// Agenda reads chronologically.
const AGENDA_ORDER: &str = "data_hora";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/appointments", get(list_appointments).post(create_appointment))
        .route("/appointments/calendar", get(month_calendar))
        .route("/appointments/{appointment_id}", patch(update_appointment))
}

pub(crate) async fn load_agenda(state: &AppState) -> Result<Vec<Stored<Appointment>>, ApiError> {
    cached_list::<Appointment>(
        state,
        QueryKey::new(APPOINTMENTS).with(AGENDA_ORDER),
        Some(AGENDA_ORDER),
    )
    .await
}

#[derive(Debug, Clone, Serialize)]
pub struct AppointmentCard {
    #[serde(flatten)]
    pub appointment: Stored<Appointment>,
    pub specialty_label: String,
    pub status_tone: Tone,
}

impl From<&Stored<Appointment>> for AppointmentCard {
    fn from(a: &Stored<Appointment>) -> Self {
        AppointmentCard {
            specialty_label: a.data.specialty.label(),
            status_tone: a.data.status.tone(),
            appointment: a.clone(),
        }
    }
}

pub async fn list_appointments(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<ApiOk<Vec<AppointmentCard>>>, ApiError> {
    let agenda = load_agenda(&state).await?;
    Ok(Json(ApiOk {
        data: agenda.iter().map(AppointmentCard::from).collect(),
    }))
}

pub async fn create_appointment(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(body): Json<Appointment>,
) -> Result<Json<ApiOk<Stored<Appointment>>>, ApiError> {
    if body.patient_name.trim().is_empty() {
        return Err(ApiError::validation("patient_name is required"));
    }
    if calendar_day(&body.date_time).is_none() {
        return Err(ApiError::validation("data_hora must be an ISO date-time"));
    }

    let created = Collection::<Appointment>::new(state.store.as_ref())
        .create(&body)
        .await?;
    invalidate(&state, &[APPOINTMENTS]).await;

    tracing::info!(
        appointment_id = %created.id,
        data_hora = %created.data.date_time,
        by = %auth.user.id,
        "appointment created"
    );
    Ok(Json(ApiOk { data: created }))
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AppointmentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
    #[serde(rename = "confirmado_pelo_paciente", default, skip_serializing_if = "Option::is_none")]
    pub patient_confirmed: Option<bool>,
    #[serde(rename = "lembrete_enviado", default, skip_serializing_if = "Option::is_none")]
    pub reminder_sent: Option<bool>,
}

impl AppointmentPatch {
    fn is_empty(&self) -> bool {
        self.status.is_none() && self.patient_confirmed.is_none() && self.reminder_sent.is_none()
    }
}

pub async fn update_appointment(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(appointment_id): Path<Uuid>,
    Json(req): Json<AppointmentPatch>,
) -> Result<Json<ApiOk<Stored<Appointment>>>, ApiError> {
    if req.is_empty() {
        return Err(ApiError::validation("nothing to update"));
    }

    let updated = Collection::<Appointment>::new(state.store.as_ref())
        .update(appointment_id, &req)
        .await?;
    invalidate(&state, &[APPOINTMENTS]).await;

    tracing::info!(%appointment_id, status = %updated.data.status, "appointment updated");
    Ok(Json(ApiOk { data: updated }))
}

/* -------------------------
   Month calendar
--------------------------*/

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    /// YYYY-MM, defaults to the current month.
    pub month: Option<String>,
    pub day: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub day: u32,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct CalendarData {
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDay>,
    pub selected: NaiveDate,
    pub appointments: Vec<AppointmentCard>,
}

fn parse_month(raw: &str) -> Option<(i32, u32)> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", raw.trim()), "%Y-%m-%d").ok()?;
    Some((first.year(), first.month()))
}

/// Per-day counts for the month and the selected day's appointments.
///
/// Without an explicit day, today is selected when it falls in the month,
/// else the first.
pub fn calendar_view(
    agenda: &[Stored<Appointment>],
    year: i32,
    month: u32,
    day: Option<u32>,
    today: NaiveDate,
) -> Result<CalendarData, ApiError> {
    let (first, last) =
        month_bounds(year, month).ok_or_else(|| ApiError::validation("invalid month"))?;

    let selected = match day {
        Some(d) => NaiveDate::from_ymd_opt(year, month, d)
            .ok_or_else(|| ApiError::validation(format!("day {d} is not in {year}-{month:02}")))?,
        None if (first..=last).contains(&today) => today,
        None => first,
    };

    let buckets = bin_month(agenda, year, month);
    let appointments: Vec<AppointmentCard> = buckets
        .iter()
        .find(|b| b.date == selected)
        .map(|b| b.appointments.iter().copied().map(AppointmentCard::from).collect())
        .unwrap_or_default();

    Ok(CalendarData {
        year,
        month,
        days: buckets
            .iter()
            .map(|b| CalendarDay {
                date: b.date,
                day: b.day(),
                count: b.appointments.len(),
            })
            .collect(),
        selected,
        appointments,
    })
}

pub async fn month_calendar(
    State(state): State<AppState>,
    _auth: AuthContext,
    Query(q): Query<CalendarQuery>,
) -> Result<Json<ApiOk<CalendarData>>, ApiError> {
    let today = Utc::now().date_naive();
    let (year, month) = match q.month.as_deref() {
        Some(raw) => parse_month(raw)
            .ok_or_else(|| ApiError::validation("month must look like YYYY-MM"))?,
        None => (today.year(), today.month()),
    };

    let agenda = load_agenda(&state).await?;
    let view = calendar_view(&agenda, year, month, q.day, today)?;
    Ok(Json(ApiOk { data: view }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vocab::UserRole;
    use crate::routes::shared::testing;
    use serde_json::json;

    fn appointment(date_time: &str) -> Appointment {
        serde_json::from_value(json!({
            "patient_name": "Ana",
            "especialidade": "cardiologia",
            "data_hora": date_time
        }))
        .unwrap()
    }

    fn stored(date_time: &str) -> Stored<Appointment> {
        Stored {
            id: Uuid::new_v4(),
            created_date: Utc::now(),
            updated_date: Utc::now(),
            data: appointment(date_time),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_view_counts_every_day_and_lists_the_selected_one() {
        let agenda = vec![
            stored("2024-03-05T10:00"),
            stored("2024-03-05T15:30"),
            stored("2024-03-06T09:00"),
            stored("not a date"),
        ];

        let view = calendar_view(&agenda, 2024, 3, Some(5), date(2024, 7, 1)).unwrap();
        assert_eq!(view.days.len(), 31);
        assert_eq!(view.days[4].count, 2);
        assert_eq!(view.days[5].count, 1);
        assert_eq!(view.days.iter().map(|d| d.count).sum::<usize>(), 3);
        assert_eq!(view.selected, date(2024, 3, 5));
        assert_eq!(view.appointments.len(), 2);
        assert_eq!(view.appointments[0].specialty_label, "cardiologia");
    }

    #[test]
    fn default_selection_prefers_today_inside_the_month() {
        let agenda = vec![stored("2024-03-06T09:00")];

        let inside = calendar_view(&agenda, 2024, 3, None, date(2024, 3, 6)).unwrap();
        assert_eq!(inside.selected, date(2024, 3, 6));
        assert_eq!(inside.appointments.len(), 1);

        let outside = calendar_view(&agenda, 2024, 3, None, date(2024, 4, 2)).unwrap();
        assert_eq!(outside.selected, date(2024, 3, 1));
        assert!(outside.appointments.is_empty());
    }

    #[test]
    fn impossible_day_is_a_validation_error() {
        let err = calendar_view(&[], 2024, 2, Some(30), date(2024, 2, 1)).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest("VALIDATION_ERROR", _)));
        assert_eq!(parse_month("2024-02"), Some((2024, 2)));
        assert_eq!(parse_month("2024-13"), None);
    }

    #[tokio::test]
    async fn create_rejects_unparseable_date_and_confirm_patches_flags() {
        let state = testing::state();
        let staff = testing::signed_in("Bia", UserRole::Agent);

        let err = create_appointment(State(state.clone()), staff.clone(), Json(appointment("amanhã")))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(..)));

        let Json(created) =
            create_appointment(State(state.clone()), staff.clone(), Json(appointment("2024-03-05T10:00")))
                .await
                .unwrap();
        assert_eq!(created.data.data.status, AppointmentStatus::Scheduled);

        let Json(listed) = list_appointments(State(state.clone()), staff.clone()).await.unwrap();
        assert_eq!(listed.data.len(), 1);

        let Json(updated) = update_appointment(
            State(state.clone()),
            staff.clone(),
            Path(created.data.id),
            Json(AppointmentPatch {
                status: Some(AppointmentStatus::Confirmed),
                patient_confirmed: Some(true),
                ..AppointmentPatch::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(updated.data.data.status, AppointmentStatus::Confirmed);
        assert!(updated.data.data.patient_confirmed);
        assert_eq!(updated.data.data.date_time, "2024-03-05T10:00");

        let Json(listed) = list_appointments(State(state), staff).await.unwrap();
        assert_eq!(listed.data[0].appointment.data.status, AppointmentStatus::Confirmed);
    }
}
