use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::domain::aggregates::count_by_status;
use crate::domain::conversation::{DEFAULT_AGENT_NAME, initials};
use crate::domain::vocab::UserRole;
use crate::error::ApiError;
use crate::middleware::auth_context::Viewer;
use crate::models::{ApiOk, AppState};
use crate::routes::conversation_routes::load_inbox;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavItem {
    pub key: &'static str,
    pub label: &'static str,
    pub path: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct HomeData {
    pub display_name: String,
    pub initials: String,
    pub role: UserRole,
    pub navigation: Vec<NavItem>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/v1/home", get(home))
}

fn item(key: &'static str, label: &'static str, path: &'static str) -> NavItem {
    NavItem { key, label, path, badge: None }
}

/// Managers see every page; agents only the operational ones. The inbox
/// carries the waiting count when there is anything waiting.
pub fn navigation(is_manager: bool, waiting: usize) -> Vec<NavItem> {
    let mut inbox = item("inbox", "Inbox", "/inbox");
    inbox.badge = (waiting > 0).then_some(waiting);

    let mut nav = Vec::with_capacity(6);
    if is_manager {
        nav.push(item("dashboard", "Dashboard", "/dashboard"));
    }
    nav.push(inbox);
    nav.push(item("patients", "Pacientes", "/patients"));
    nav.push(item("agenda", "Agenda", "/agenda"));
    if is_manager {
        nav.push(item("reports", "Relatórios", "/reports"));
        nav.push(item("settings", "Configurações", "/settings"));
    }
    nav
}

pub async fn home(
    State(state): State<AppState>,
    viewer: Viewer,
) -> Result<Json<ApiOk<HomeData>>, ApiError> {
    let convs = load_inbox(&state).await?;
    let waiting = count_by_status(convs.iter().map(|c| &c.data)).waiting;

    let (display_name, role) = match &viewer.0 {
        Some(auth) => (auth.user.full_name.clone(), auth.user.role.clone()),
        None => (DEFAULT_AGENT_NAME.to_string(), UserRole::Agent),
    };

    Ok(Json(ApiOk {
        data: HomeData {
            initials: initials(&display_name),
            display_name,
            role,
            navigation: navigation(viewer.is_manager(), waiting),
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Conversation;
    use crate::routes::shared::testing;
    use crate::store::Collection;
    use serde_json::json;

    fn keys(nav: &[NavItem]) -> Vec<&'static str> {
        nav.iter().map(|i| i.key).collect()
    }

    #[test]
    fn managers_get_the_full_menu() {
        let nav = navigation(true, 0);
        assert_eq!(
            keys(&nav),
            ["dashboard", "inbox", "patients", "agenda", "reports", "settings"]
        );
    }

    #[test]
    fn agents_get_operational_pages_only() {
        let nav = navigation(false, 0);
        assert_eq!(keys(&nav), ["inbox", "patients", "agenda"]);
    }

    #[test]
    fn inbox_badge_only_when_something_waits() {
        assert_eq!(navigation(false, 0)[0].badge, None);
        let nav = navigation(false, 3);
        assert_eq!(nav[0].key, "inbox");
        assert_eq!(nav[0].badge, Some(3));
    }

    #[tokio::test]
    async fn anonymous_viewer_falls_back_to_agent_home() {
        let state = testing::state();
        let convs = Collection::<Conversation>::new(state.store.as_ref());
        for (name, status) in [("Ana", "aguardando"), ("Rui", "aguardando"), ("Lia", "resolvido")] {
            let body = json!({ "patient_name": name, "canal": "whatsapp", "status": status });
            convs.create(&serde_json::from_value(body).unwrap()).await.unwrap();
        }

        let Json(page) = home(State(state), Viewer(None)).await.unwrap();
        assert_eq!(page.data.display_name, "Atendente");
        assert_eq!(page.data.initials, "A");
        assert_eq!(page.data.role, UserRole::Agent);
        assert_eq!(keys(&page.data.navigation), ["inbox", "patients", "agenda"]);
        assert_eq!(page.data.navigation[0].badge, Some(2));
    }
}
