//! Admin portal operations: agent moderation and dashboard metrics.

use std::sync::Arc;

use serde_json::Value;

use crate::client::{ApiClient, RequestOptions};
use crate::envelope::ApiResponse;
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::types::{
    AdminMetrics, Agent, AgentStatus, DashboardSummary, PropertyByCity, PropertyByMonth,
    PropertyByType, TopAgent,
};

#[derive(Debug, Clone)]
pub struct AdminService {
    client: Arc<ApiClient>,
}

impl AdminService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn get_pending_agents(&self) -> ApiResponse<Vec<Agent>> {
        self.client
            .request_as("/admin/pending-agents", RequestOptions::get())
            .await
    }

    /// Every agent regardless of status.
    pub async fn get_all_agents(&self) -> ApiResponse<Vec<Agent>> {
        self.client
            .request_as("/admin/agents", RequestOptions::get())
            .await
    }

    pub async fn approve_agent(&self, agent_id: &str) -> ApiResponse<Value> {
        self.client
            .request(
                &format!("/admin/approve-agent/{agent_id}"),
                RequestOptions::method(HttpMethod::Put),
            )
            .await
    }

    pub async fn reject_agent(&self, agent_id: &str) -> ApiResponse<Value> {
        self.client
            .request(
                &format!("/admin/reject-agent/{agent_id}"),
                RequestOptions::method(HttpMethod::Put),
            )
            .await
    }

    /// Approve or reject. `Pending` (and any unrecognized status) is not a
    /// transition the backend offers and fails locally without a request.
    pub async fn update_agent_status(
        &self,
        agent_id: &str,
        status: AgentStatus,
    ) -> ApiResponse<Value> {
        match status {
            AgentStatus::Approved => self.approve_agent(agent_id).await,
            AgentStatus::Rejected => self.reject_agent(agent_id).await,
            AgentStatus::Pending | AgentStatus::Unknown => {
                ApiResponse::failure(ApiError::Validation("Invalid status".to_string()))
            }
        }
    }

    pub async fn delete_agent(&self, agent_id: &str) -> ApiResponse<Value> {
        self.client
            .request(
                &format!("/admin/delete-agent/{agent_id}"),
                RequestOptions::method(HttpMethod::Delete),
            )
            .await
    }

    pub async fn get_metrics_counts(&self) -> ApiResponse<AdminMetrics> {
        self.client
            .request_as("/admin/metrics/counts", RequestOptions::get())
            .await
    }

    pub async fn get_properties_by_month(&self) -> ApiResponse<Vec<PropertyByMonth>> {
        self.client
            .request_as("/admin/metrics/properties-by-month", RequestOptions::get())
            .await
    }

    pub async fn get_properties_by_city(&self) -> ApiResponse<Vec<PropertyByCity>> {
        self.client
            .request_as("/admin/metrics/properties-by-city", RequestOptions::get())
            .await
    }

    pub async fn get_properties_by_type(&self) -> ApiResponse<Vec<PropertyByType>> {
        self.client
            .request_as("/admin/metrics/properties-by-type", RequestOptions::get())
            .await
    }

    pub async fn get_top_agents(&self) -> ApiResponse<Vec<TopAgent>> {
        self.client
            .request_as("/admin/metrics/top-agents", RequestOptions::get())
            .await
    }

    /// Fetch metrics and pending agents concurrently and combine them.
    /// If either call fails, the metrics error is reported first.
    pub async fn get_dashboard_summary(&self) -> ApiResponse<DashboardSummary> {
        let (metrics, agents) =
            futures::join!(self.get_metrics_counts(), self.get_pending_agents());

        match (metrics, agents) {
            (
                ApiResponse::Success { data: metrics, .. },
                ApiResponse::Success {
                    data: pending_agents,
                    ..
                },
            ) => ApiResponse::success(DashboardSummary {
                metrics,
                recent_properties: Vec::new(),
                pending_agents,
                recent_activity: Vec::new(),
            }),
            (ApiResponse::Failure { error, .. }, _) | (_, ApiResponse::Failure { error, .. }) => {
                tracing::warn!(error = %error, "dashboard summary failed");
                ApiResponse::failure(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::ClientConfig;
    use crate::session::{MemorySession, SessionField, SessionStore};
    use crate::testing::FakeTransport;

    fn setup() -> (AdminService, Arc<FakeTransport>) {
        let transport = Arc::new(FakeTransport::new());
        let session = Arc::new(MemorySession::new());
        session.set_all(&[(SessionField::AdminToken, "adm".to_string())]);
        let client = ApiClient::new(&ClientConfig::new("http://api.test"), session, transport.clone());
        (AdminService::new(Arc::new(client)), transport)
    }

    fn metrics_json() -> Value {
        json!({
            "totalProperties": 120, "totalAgents": 14, "totalUsers": 950,
            "pendingAgents": 2, "publishedProperties": 90, "soldProperties": 25,
            "monthlyRevenue": 1250000.0, "websiteVisitors": 18000
        })
    }

    fn agent_json(id: &str) -> Value {
        json!({"id": id, "name": "Neha Singh", "email": "neha@brickbroker.in", "status": "PENDING"})
    }

    #[tokio::test]
    async fn pending_status_fails_without_request() {
        let (admin, transport) = setup();
        let resp = admin.update_agent_status("ag1", AgentStatus::Pending).await;
        assert_eq!(resp.error_message().as_deref(), Some("Invalid status"));
        assert!(resp.failure_data().is_none());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn unknown_status_fails_without_request() {
        let (admin, transport) = setup();
        let resp = admin.update_agent_status("ag1", AgentStatus::Unknown).await;
        assert_eq!(resp.error_message().as_deref(), Some("Invalid status"));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn status_update_picks_endpoint() {
        let (admin, transport) = setup();
        admin.update_agent_status("ag1", AgentStatus::Approved).await;
        admin.update_agent_status("ag2", AgentStatus::Rejected).await;

        let reqs = transport.requests();
        assert_eq!(reqs[0].method, HttpMethod::Put);
        assert_eq!(reqs[0].url, "http://api.test/admin/approve-agent/ag1");
        assert_eq!(reqs[1].url, "http://api.test/admin/reject-agent/ag2");
        assert_eq!(reqs[0].header("authorization"), Some("Bearer adm"));
    }

    #[tokio::test]
    async fn all_agents_has_its_own_endpoint() {
        let (admin, transport) = setup();
        transport.push_json(200, json!([agent_json("ag1")]));
        let resp = admin.get_all_agents().await;
        assert_eq!(resp.data().map(Vec::len), Some(1));
        assert_eq!(transport.requests()[0].url, "http://api.test/admin/agents");
    }

    #[tokio::test]
    async fn metrics_endpoints_decode() {
        let (admin, transport) = setup();
        transport.push_json(200, json!([{"month": "Jan", "count": 4}]));
        transport.push_json(200, json!([{"city": "Pune", "count": 7}]));
        transport.push_json(200, json!([{"type": "VILLA", "count": 3}]));
        transport.push_json(
            200,
            json!([{"id": "1", "name": "Rahul", "email": "r@b.in", "propertiesSold": 200, "totalRevenue": 9.5e7, "rating": 5.0}]),
        );

        assert_eq!(admin.get_properties_by_month().await.data().unwrap()[0].count, 4);
        assert_eq!(admin.get_properties_by_city().await.data().unwrap()[0].city, "Pune");
        assert_eq!(
            admin.get_properties_by_type().await.data().unwrap()[0].property_type,
            "VILLA"
        );
        assert_eq!(admin.get_top_agents().await.data().unwrap()[0].properties_sold, 200);

        let urls: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                "http://api.test/admin/metrics/properties-by-month",
                "http://api.test/admin/metrics/properties-by-city",
                "http://api.test/admin/metrics/properties-by-type",
                "http://api.test/admin/metrics/top-agents",
            ]
        );
    }

    #[tokio::test]
    async fn delete_agent_uses_delete() {
        let (admin, transport) = setup();
        admin.delete_agent("ag3").await;
        let req = &transport.requests()[0];
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.url, "http://api.test/admin/delete-agent/ag3");
    }

    #[tokio::test]
    async fn dashboard_summary_combines_both_calls() {
        let (admin, transport) = setup();
        transport.route_json("/admin/pending-agents", 200, json!([agent_json("ag1")]));
        transport.route_json("/admin/metrics/counts", 200, metrics_json());

        let resp = admin.get_dashboard_summary().await;
        let summary = resp.data().unwrap();
        assert_eq!(summary.metrics.total_agents, 14);
        assert_eq!(summary.pending_agents.len(), 1);
        assert!(summary.recent_properties.is_empty());
        assert!(summary.recent_activity.is_empty());
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn dashboard_summary_prefers_metrics_error() {
        let (admin, transport) = setup();
        transport.route_json("/admin/pending-agents", 500, json!({"message": "agents down"}));
        transport.route_json("/admin/metrics/counts", 503, json!({"message": "metrics down"}));

        let resp = admin.get_dashboard_summary().await;
        assert_eq!(resp.error_message().as_deref(), Some("metrics down"));
    }

    #[tokio::test]
    async fn dashboard_summary_surfaces_agents_error() {
        let (admin, transport) = setup();
        transport.route_json("/admin/metrics/counts", 200, metrics_json());
        transport.route_json("/admin/pending-agents", 403, json!({"error": "Forbidden"}));

        let resp = admin.get_dashboard_summary().await;
        assert_eq!(resp.error_message().as_deref(), Some("Forbidden"));
    }
}
