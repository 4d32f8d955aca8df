use crate::domain::report::DailyReport;
use crate::domain::snapshot::BusinessSnapshot;
use crate::llm::NarrativeClient;
use crate::metrics;
use chrono::{NaiveDate, Utc};

/// Run the full pipeline: derive metrics, request the narrative, assemble
/// the report. Stateless; a narrative failure aborts the run and no partial
/// report is returned.
pub async fn run(
    client: &dyn NarrativeClient,
    as_of_date: NaiveDate,
    snapshot: BusinessSnapshot,
) -> anyhow::Result<DailyReport> {
    let derived = metrics::compute(&snapshot);

    if !derived.alerts.is_empty() {
        tracing::warn!(%as_of_date, alerts = ?derived.alerts, "metric alerts raised");
    }

    let recommendations = client.request_recommendations(&derived).await?;

    Ok(DailyReport {
        as_of_date,
        generated_at: Utc::now(),
        snapshot,
        metrics: derived,
        recommendations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::error::NarrativeServiceError;
    use crate::llm::Provider;
    use crate::metrics::DerivedMetrics;

    struct StubClient {
        reply: &'static str,
    }

    #[async_trait::async_trait]
    impl NarrativeClient for StubClient {
        fn provider(&self) -> Provider {
            Provider::Anthropic
        }

        async fn request_recommendations(
            &self,
            _metrics: &DerivedMetrics,
        ) -> anyhow::Result<String> {
            Ok(self.reply.to_string())
        }
    }

    struct OutageClient;

    #[async_trait::async_trait]
    impl NarrativeClient for OutageClient {
        fn provider(&self) -> Provider {
            Provider::Anthropic
        }

        async fn request_recommendations(
            &self,
            _metrics: &DerivedMetrics,
        ) -> anyhow::Result<String> {
            Err(NarrativeServiceError {
                provider: Provider::Anthropic,
                stage: "request",
                detail: "connection refused".to_string(),
                raw_output: None,
            }
            .into())
        }
    }

    fn snapshot() -> BusinessSnapshot {
        BusinessSnapshot {
            today_revenue: 500.0,
            today_cost: 800.0,
            today_customers: 20,
            yesterday_revenue: 1000.0,
            yesterday_cost: 600.0,
            yesterday_customers: 30,
        }
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 29).unwrap()
    }

    #[tokio::test]
    async fn run_assembles_snapshot_metrics_and_narrative() {
        let client = StubClient {
            reply: "- Cut marketing spend\n- Revisit pricing",
        };

        let report = run(&client, as_of(), snapshot()).await.unwrap();

        assert_eq!(report.as_of_date, as_of());
        assert_eq!(report.snapshot.today_revenue, 500.0);
        assert_eq!(report.metrics.profit, -300.0);
        assert_eq!(report.metrics.alerts.len(), 2);
        assert_eq!(report.recommendations, "- Cut marketing spend\n- Revisit pricing");
    }

    #[tokio::test]
    async fn run_surfaces_narrative_failure_without_a_report() {
        let err = run(&OutageClient, as_of(), snapshot()).await.unwrap_err();

        let svc = err
            .downcast_ref::<NarrativeServiceError>()
            .expect("should be a NarrativeServiceError");
        assert_eq!(svc.stage, "request");
    }

    #[tokio::test]
    async fn report_serializes_as_one_flat_record() {
        let client = StubClient { reply: "- Hold" };
        let report = run(&client, as_of(), snapshot()).await.unwrap();

        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["today_revenue"], 500.0);
        assert_eq!(v["profit"], -300.0);
        assert_eq!(v["cac_today"], 40.0);
        assert_eq!(v["recommendations"], "- Hold");
        assert!(v["alerts"].as_array().is_some());
    }
}
