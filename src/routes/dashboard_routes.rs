use axum::{Json, Router, extract::State, routing::get};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::aggregates::{
    ChannelShare, ResponseGrade, StatusCounts, avg_first_response_minutes, channel_distribution,
    count_by_status, count_on_day,
};
use crate::domain::conversation::initials;
use crate::domain::entities::{Appointment, Conversation};
use crate::domain::vocab::{Availability, Tone};
use crate::error::ApiError;
use crate::middleware::auth_context::AuthContext;
use crate::models::{ApiOk, AppState, UserProfile};
use crate::routes::appointment_routes::load_agenda;
use crate::routes::conversation_routes::{ConversationCard, load_inbox};
use crate::routes::user_routes::load_users;
use crate::store::Stored;

const RECENT_LIMIT: usize = 10;

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}

#[derive(Debug, Serialize)]
pub struct ResponseTimeCard {
    pub minutes: i64,
    pub grade: ResponseGrade,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct TeamMember {
    pub id: Uuid,
    pub full_name: String,
    pub initials: String,
    pub availability: Option<Availability>,
    pub availability_tone: Tone,
    pub active_conversations: i32,
    pub avg_rating: Option<f64>,
    pub total_handled: i32,
}

impl From<UserProfile> for TeamMember {
    fn from(u: UserProfile) -> Self {
        TeamMember {
            id: u.id,
            initials: initials(&u.full_name),
            availability_tone: u.availability.as_ref().map_or(Tone::Neutral, Availability::tone),
            availability: u.availability,
            active_conversations: u.active_conversations.unwrap_or(0),
            avg_rating: u.avg_rating,
            total_handled: u.total_handled.unwrap_or(0),
            full_name: u.full_name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardData {
    pub status_counts: StatusCounts,
    pub total_conversations: usize,
    pub appointments_today: usize,
    pub response_time: ResponseTimeCard,
    pub recent_conversations: Vec<ConversationCard>,
    pub channel_distribution: Vec<ChannelShare>,
    /// Managers only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<Vec<TeamMember>>,
}

/// Team panel rows: agents only.
pub fn team(users: Vec<UserProfile>) -> Vec<TeamMember> {
    users
        .into_iter()
        .filter(UserProfile::is_agent)
        .map(TeamMember::from)
        .collect()
}

/// Cards, recent list and channel chart from one snapshot of each
/// collection. `inbox` is newest first.
pub fn summarize(
    inbox: Vec<Stored<Conversation>>,
    agenda: &[Stored<Appointment>],
    today: NaiveDate,
) -> DashboardData {
    let convs: Vec<&Conversation> = inbox.iter().map(|c| &c.data).collect();
    let status_counts = count_by_status(convs.iter().copied());
    let minutes = avg_first_response_minutes(&convs);
    let grade = ResponseGrade::for_minutes(minutes);
    let channel_distribution = channel_distribution(&convs);
    let total_conversations = convs.len();

    DashboardData {
        status_counts,
        total_conversations,
        appointments_today: count_on_day(agenda.iter().map(|a| &a.data), today),
        response_time: ResponseTimeCard {
            minutes,
            grade,
            label: grade.label(),
        },
        channel_distribution,
        recent_conversations: inbox
            .into_iter()
            .take(RECENT_LIMIT)
            .map(ConversationCard::from)
            .collect(),
        team: None,
    }
}

pub async fn dashboard(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<ApiOk<DashboardData>>, ApiError> {
    let inbox = load_inbox(&state).await?;
    let agenda = load_agenda(&state).await?;

    let mut data = summarize(inbox, &agenda, Utc::now().date_naive());
    if auth.is_manager() {
        data.team = Some(team(load_users(&state).await?));
    }

    Ok(Json(ApiOk { data }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vocab::{Channel, UserRole};
    use crate::routes::shared::testing;
    use serde_json::{Value, json};

    fn stored<E: serde::de::DeserializeOwned>(body: Value) -> Stored<E> {
        Stored {
            id: Uuid::new_v4(),
            created_date: Utc::now(),
            updated_date: Utc::now(),
            data: serde_json::from_value(body).unwrap(),
        }
    }

    fn conv(status: &str, canal: &str, minutes: Option<f64>) -> Stored<Conversation> {
        let mut body = json!({ "patient_name": "Ana", "canal": canal, "status": status });
        if let Some(m) = minutes {
            body["tempo_primeira_resposta"] = json!(m);
        }
        stored(body)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    #[test]
    fn cards_reflect_the_whole_snapshot() {
        let inbox = vec![
            conv("aguardando", "whatsapp", Some(3.0)),
            conv("em_atendimento", "whatsapp", None),
            conv("resolvido", "email", Some(9.0)),
            conv("arquivado", "telegram", None),
        ];
        let agenda: Vec<Stored<Appointment>> = vec![
            stored(json!({ "patient_name": "Ana", "especialidade": "pediatria", "data_hora": "2024-03-05T00:00" })),
            stored(json!({ "patient_name": "Rui", "especialidade": "pediatria", "data_hora": "2024-03-04T23:59" })),
        ];

        let data = summarize(inbox, &agenda, today());
        assert_eq!(data.total_conversations, 4);
        assert_eq!(data.status_counts.total(), 4);
        assert_eq!(data.status_counts.other, 1);
        assert_eq!(data.appointments_today, 1);
        assert_eq!(data.response_time.minutes, 3);
        assert_eq!(data.response_time.grade, ResponseGrade::Excellent);
        assert_eq!(data.channel_distribution[0].channel, Channel::Whatsapp);
        assert_eq!(data.channel_distribution[0].count, 2);
        assert!(data.team.is_none());
    }

    #[test]
    fn recent_list_is_capped() {
        let inbox: Vec<_> = (0..14).map(|_| conv("aguardando", "chat", None)).collect();
        let first_id = inbox[0].id;

        let data = summarize(inbox, &[], today());
        assert_eq!(data.recent_conversations.len(), RECENT_LIMIT);
        assert_eq!(data.recent_conversations[0].conversation.id, first_id);
        assert_eq!(data.status_counts.waiting, 14);
    }

    #[test]
    fn empty_snapshot_gives_zeroed_cards() {
        let data = summarize(Vec::new(), &[], today());
        assert_eq!(data.total_conversations, 0);
        assert_eq!(data.response_time.minutes, 0);
        assert!(data.channel_distribution.is_empty());
        assert!(data.recent_conversations.is_empty());
    }

    #[test]
    fn team_lists_agents_with_defaults() {
        let mut agent = testing::signed_in("Bia Lima", UserRole::Agent).user;
        agent.availability = Some(Availability::Busy);
        let manager = testing::signed_in("Gil", UserRole::Manager).user;

        let rows = team(vec![agent, manager]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].initials, "BL");
        assert_eq!(rows[0].availability_tone, Tone::Yellow);
        assert_eq!(rows[0].active_conversations, 0);
        assert_eq!(rows[0].total_handled, 0);
    }

    #[tokio::test]
    async fn agents_get_the_dashboard_without_team() {
        let state = testing::state();
        let agent = testing::signed_in("Bia", UserRole::Agent);

        let Json(body) = dashboard(State(state), agent).await.unwrap();
        assert!(body.data.team.is_none());
        assert_eq!(body.data.total_conversations, 0);
    }
}
