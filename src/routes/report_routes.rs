use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::aggregates::{
    avg_first_response_report, avg_satisfaction, count_by_status, resolution_rate,
};
use crate::domain::conversation::initials;
use crate::domain::entities::Conversation;
use crate::error::ApiError;
use crate::middleware::auth_context::AuthContext;
use crate::models::{ApiOk, AppState, UserProfile};
use crate::routes::conversation_routes::load_inbox;
use crate::routes::shared::ensure_manager;
use crate::routes::user_routes::load_users;

pub fn router() -> Router<AppState> {
    Router::new().route("/reports", get(reports))
}

#[derive(Debug, Serialize)]
pub struct AgentTotals {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub initials: String,
    pub total_handled: i32,
}

#[derive(Debug, Serialize)]
pub struct ReportData {
    pub total_conversations: usize,
    pub resolved_conversations: usize,
    /// Percent, one decimal.
    pub resolution_rate: f64,
    /// Minutes, one decimal.
    pub avg_response_minutes: f64,
    pub active_agents: usize,
    pub avg_satisfaction: f64,
    pub agents: Vec<AgentTotals>,
}

pub fn build_report(convs: &[&Conversation], users: Vec<UserProfile>) -> ReportData {
    let agents: Vec<AgentTotals> = users
        .into_iter()
        .filter(UserProfile::is_agent)
        .map(|u| AgentTotals {
            id: u.id,
            initials: initials(&u.full_name),
            total_handled: u.total_handled.unwrap_or(0),
            full_name: u.full_name,
            email: u.email,
        })
        .collect();

    ReportData {
        total_conversations: convs.len(),
        resolved_conversations: count_by_status(convs.iter().copied()).resolved,
        resolution_rate: resolution_rate(convs),
        avg_response_minutes: avg_first_response_report(convs),
        active_agents: agents.len(),
        avg_satisfaction: avg_satisfaction(convs),
        agents,
    }
}

pub async fn reports(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<ApiOk<ReportData>>, ApiError> {
    ensure_manager(&auth, "view reports")?;

    let inbox = load_inbox(&state).await?;
    let convs: Vec<&Conversation> = inbox.iter().map(|c| &c.data).collect();
    let users = load_users(&state).await?;

    Ok(Json(ApiOk {
        data: build_report(&convs, users),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vocab::UserRole;
    use crate::routes::shared::testing;
    use serde_json::json;

    fn conv(status: &str, minutes: Option<f64>, rating: Option<u8>) -> Conversation {
        serde_json::from_value(json!({
            "patient_name": "Ana",
            "canal": "whatsapp",
            "status": status,
            "tempo_primeira_resposta": minutes,
            "satisfacao": rating
        }))
        .unwrap()
    }

    #[test]
    fn report_cards_use_one_decimal() {
        let convs = [
            conv("resolvido", Some(4.0), Some(4)),
            conv("resolvido", None, None),
            conv("resolvido", Some(3.5), Some(5)),
            conv("aguardando", Some(2.0), None),
        ];
        let refs: Vec<&Conversation> = convs.iter().collect();

        let mut agent = testing::signed_in("Bia Lima", UserRole::Agent).user;
        agent.total_handled = Some(12);
        let users = vec![agent, testing::signed_in("Gil", UserRole::Manager).user];

        let report = build_report(&refs, users);
        assert_eq!(report.total_conversations, 4);
        assert_eq!(report.resolved_conversations, 3);
        assert_eq!(report.resolution_rate, 75.0);
        // missing response time counts as zero: (4 + 0 + 3.5 + 2) / 4
        assert_eq!(report.avg_response_minutes, 2.4);
        // missing rating is skipped: (4 + 5) / 2
        assert_eq!(report.avg_satisfaction, 4.5);
        assert_eq!(report.active_agents, 1);
        assert_eq!(report.agents[0].total_handled, 12);
    }

    #[test]
    fn empty_report_is_all_zero() {
        let report = build_report(&[], Vec::new());
        assert_eq!(report.resolution_rate, 0.0);
        assert_eq!(report.avg_response_minutes, 0.0);
        assert_eq!(report.avg_satisfaction, 0.0);
        assert!(report.agents.is_empty());
    }

    #[tokio::test]
    async fn agents_cannot_open_reports() {
        let state = testing::state();
        let agent = testing::signed_in("Bia", UserRole::Agent);
        let err = reports(State(state), agent).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(..)));
    }
}
