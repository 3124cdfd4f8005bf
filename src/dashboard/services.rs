use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{error, warn};

use crate::{
    auth::session::SessionStore,
    error::AuthError,
    records::{Collection, LearningPathway, RecordStore, UserRecord},
    ui::{Notice, Page, Redirect},
};

/// How many of the top-scored pathways are flagged as recommended.
const RECOMMENDED_COUNT: usize = 2;

#[derive(Debug, Clone, Serialize)]
pub struct PathwayCard {
    #[serde(flatten)]
    pub pathway: LearningPathway,
    pub recommended: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub first_name: String,
    pub user: UserRecord,
    pub pathways: Vec<PathwayCard>,
    pub market_data: Vec<Value>,
}

#[derive(Debug, Clone)]
pub enum DashboardLoad {
    Ready(DashboardView),
    Redirect(Redirect),
}

pub struct DashboardService {
    records: Arc<dyn RecordStore>,
    sessions: SessionStore,
}

impl DashboardService {
    pub fn new(records: Arc<dyn RecordStore>, sessions: SessionStore) -> Self {
        Self { records, sessions }
    }

    /// Without a readable session the only thing to show is the auth page.
    pub async fn load(&self) -> DashboardLoad {
        let user = match self.sessions.load() {
            Ok(Some(session)) => session.user,
            Ok(None) => return DashboardLoad::Redirect(Redirect::now(Page::Auth)),
            Err(e) => {
                error!(error = %e, "error loading user data");
                return DashboardLoad::Redirect(Redirect::now(Page::Auth));
            }
        };

        let pathways = rank_pathways(self.pathways().await);
        let market_data = self
            .records
            .list_records(Collection::LaborMarketData)
            .await
            .unwrap_or_else(|e| {
                error!(error = %e, "error loading market data");
                Vec::new()
            });

        DashboardLoad::Ready(DashboardView {
            first_name: user.first_name().to_string(),
            user,
            pathways,
            market_data,
        })
    }

    pub async fn enroll(&self, pathway_id: &str) -> Result<Notice, AuthError> {
        let pathway = self.find_pathway(pathway_id).await?;
        Ok(Notice::success(format!(
            "Enrolled in {}! Your personalized learning plan is being prepared.",
            pathway.title
        )))
    }

    pub async fn pathway_details(&self, pathway_id: &str) -> Result<Notice, AuthError> {
        let pathway = self.find_pathway(pathway_id).await?;
        Ok(Notice::info(describe(&pathway)))
    }

    async fn find_pathway(&self, pathway_id: &str) -> Result<LearningPathway, AuthError> {
        self.pathways()
            .await
            .into_iter()
            .find(|p| p.id == pathway_id)
            .ok_or_else(|| AuthError::NotFound("Pathway not found".into()))
    }

    /// Fetch failures are logged and read as an empty catalogue.
    async fn pathways(&self) -> Vec<LearningPathway> {
        let rows = match self.records.list_records(Collection::LearningPathways).await {
            Ok(rows) => rows,
            Err(e) => {
                error!(error = %e, "error loading pathways");
                return Vec::new();
            }
        };
        rows.into_iter()
            .filter_map(|row| match serde_json::from_value::<LearningPathway>(row) {
                Ok(p) => Some(p),
                Err(e) => {
                    warn!(error = %e, "skipping unreadable pathway");
                    None
                }
            })
            .collect()
    }
}

/// Highest AI recommendation score first; ties keep their fetched order.
pub fn rank_pathways(mut pathways: Vec<LearningPathway>) -> Vec<PathwayCard> {
    pathways.sort_by(|a, b| b.ai_recommendation_score.total_cmp(&a.ai_recommendation_score));
    pathways
        .into_iter()
        .enumerate()
        .map(|(i, pathway)| PathwayCard {
            pathway,
            recommended: i < RECOMMENDED_COUNT,
        })
        .collect()
}

fn describe(p: &LearningPathway) -> String {
    let or_dash = |v: Option<String>| v.unwrap_or_else(|| "-".into());
    format!(
        "Pathway Details:\n\n{}\n\nDuration: {} months\nLevel: NSQF {}\n\nJob Roles: {}\n\nSalary Range: {}\n\nMarket Demand: {}",
        p.title,
        or_dash(p.duration_months.map(|m| m.to_string())),
        or_dash(p.nsqf_level.map(|l| l.to_string())),
        p.job_roles.join(", "),
        p.salary_range,
        p.market_demand,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::session::Session,
        records::fake::FakeRecords,
        storage::{KeyValueStore, MemoryStore},
        ui::NoticeKind,
    };
    use serde_json::json;

    fn pathway(id: &str, title: &str, score: f64) -> Value {
        json!({
            "id": id,
            "title": title,
            "nsqf_level": 4,
            "duration_months": 6,
            "industry_sector": "Electronics",
            "skills_covered": ["soldering"],
            "market_demand": "High",
            "salary_range": "₹15,000 - ₹25,000",
            "job_roles": ["Technician", "Field Engineer"],
            "ai_recommendation_score": score
        })
    }

    fn catalogue() -> FakeRecords {
        FakeRecords::new()
            .with_rows(
                Collection::LearningPathways,
                vec![
                    pathway("p1", "Solar Installer", 0.71),
                    pathway("p2", "EV Technician", 0.93),
                    pathway("p3", "Nursing Assistant", 0.88),
                    pathway("p4", "Retail Associate", 0.40),
                ],
            )
            .with_rows(
                Collection::LaborMarketData,
                vec![json!({ "sector": "Electronics", "growth": 12 })],
            )
    }

    fn service(records: FakeRecords, logged_in: bool) -> (Arc<MemoryStore>, DashboardService) {
        let kv = Arc::new(MemoryStore::new());
        let sessions = SessionStore::new(kv.clone(), "ncvet_");
        if logged_in {
            let user: UserRecord = serde_json::from_value(json!({
                "id": "u-1",
                "email": "asha@example.com",
                "full_name": "Asha Rao"
            }))
            .unwrap();
            sessions
                .persist(&Session {
                    token: sessions.generate_token(),
                    user,
                    remember_me: false,
                })
                .unwrap();
        }
        (kv, DashboardService::new(Arc::new(records), sessions))
    }

    #[tokio::test]
    async fn no_session_redirects_to_auth() {
        let (_, svc) = service(catalogue(), false);
        match svc.load().await {
            DashboardLoad::Redirect(r) => assert_eq!(r, Redirect::now(Page::Auth)),
            DashboardLoad::Ready(_) => panic!("should not render without a session"),
        }
    }

    #[tokio::test]
    async fn corrupt_session_redirects_to_auth() {
        let (kv, svc) = service(catalogue(), false);
        kv.set("ncvet_auth_token", "t").unwrap();
        kv.set("ncvet_user_data", "[[[").unwrap();
        assert!(matches!(svc.load().await, DashboardLoad::Redirect(_)));
    }

    #[tokio::test]
    async fn pathways_sorted_and_top_two_recommended() {
        let (_, svc) = service(catalogue(), true);
        let DashboardLoad::Ready(view) = svc.load().await else {
            panic!("expected dashboard");
        };
        assert_eq!(view.first_name, "Asha");
        let ids: Vec<_> = view.pathways.iter().map(|c| c.pathway.id.as_str()).collect();
        assert_eq!(ids, ["p2", "p3", "p1", "p4"]);
        let flags: Vec<_> = view.pathways.iter().map(|c| c.recommended).collect();
        assert_eq!(flags, [true, true, false, false]);
        assert_eq!(view.market_data.len(), 1);
    }

    #[tokio::test]
    async fn failing_collections_render_empty() {
        let records = catalogue();
        records.fail(Collection::LearningPathways);
        records.fail(Collection::LaborMarketData);
        let (_, svc) = service(records, true);
        let DashboardLoad::Ready(view) = svc.load().await else {
            panic!("expected dashboard");
        };
        assert!(view.pathways.is_empty());
        assert!(view.market_data.is_empty());
    }

    #[tokio::test]
    async fn enroll_and_details() {
        let (_, svc) = service(catalogue(), true);
        let notice = svc.enroll("p2").await.unwrap();
        assert_eq!(notice.kind, NoticeKind::Success);
        assert_eq!(
            notice.message,
            "Enrolled in EV Technician! Your personalized learning plan is being prepared."
        );

        let details = svc.pathway_details("p3").await.unwrap();
        assert!(details.message.starts_with("Pathway Details:\n\nNursing Assistant"));
        assert!(details.message.contains("Duration: 6 months"));
        assert!(details.message.contains("Level: NSQF 4"));
        assert!(details.message.contains("Job Roles: Technician, Field Engineer"));

        assert!(matches!(svc.enroll("nope").await, Err(AuthError::NotFound(_))));
    }

    #[test]
    fn ties_keep_fetch_order() {
        let pathways: Vec<LearningPathway> = vec![
            serde_json::from_value(pathway("a", "A", 0.5)).unwrap(),
            serde_json::from_value(pathway("b", "B", 0.5)).unwrap(),
            serde_json::from_value(pathway("c", "C", 0.9)).unwrap(),
        ];
        let ids: Vec<_> = rank_pathways(pathways)
            .into_iter()
            .map(|c| c.pathway.id)
            .collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }
}
