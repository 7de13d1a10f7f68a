//! Gateway construction: REST against the configured backend, or in-memory sample data

use std::sync::Arc;

use iam_console_core::screens::{announcement, mail_template, my_projects};
use iam_console_core::ConsoleConfig;
use iam_console_gateway::{Endpoint, InMemoryGateway, Record, RecordGateway};

pub enum Backend {
    Rest(ConsoleConfig),
    Offline,
}

impl Backend {
    pub fn new(config: ConsoleConfig, offline: bool) -> Self {
        if offline {
            tracing::info!("Offline mode: using built-in sample data");
            Self::Offline
        } else {
            tracing::debug!("Using backend at {}", config.base_url);
            Self::Rest(config)
        }
    }

    /// Gateway for `endpoint`; `id_field` keys the offline collection.
    pub async fn gateway(
        &self,
        endpoint: Endpoint,
        id_field: &str,
    ) -> anyhow::Result<Arc<dyn RecordGateway>> {
        match self {
            Self::Rest(config) => {
                let client = config.http_client()?;
                Ok(Arc::new(config.rest_gateway(&client, endpoint)))
            }
            Self::Offline => Ok(Arc::new(sample_gateway(&endpoint.collection, id_field).await)),
        }
    }
}

async fn sample_gateway(collection: &str, id_field: &str) -> InMemoryGateway {
    match collection {
        announcement::COLLECTION => {
            InMemoryGateway::with_records(collection, id_field, sample_announcements())
        }
        mail_template::COLLECTION => {
            let gateway =
                InMemoryGateway::with_records(collection, id_field, sample_mail_templates());
            gateway
                .set_options(
                    mail_template::TYPE_FIELD,
                    vec!["registration".into(), "password-reset".into(), "notice".into()],
                )
                .await;
            gateway
        }
        my_projects::COLLECTION => {
            InMemoryGateway::with_records(collection, id_field, sample_projects())
        }
        other => {
            tracing::warn!("No sample data for collection '{other}'");
            InMemoryGateway::new(collection, id_field)
        }
    }
}

fn sample_announcements() -> Vec<Record> {
    [
        (301, "<p>Platform upgrade completed</p>", "2024-05-02 08:00:00", "COMPLETED"),
        (302, r#"<p>New login page <img src="login.png"></p>"#, "2024-05-20 09:30:00", "COMPLETED"),
        (303, "<p>Quarterly security review</p>", "2024-06-01 10:00:00", "FAILED"),
        (304, "<p>Planned maintenance window</p>", "2030-01-15 22:00:00", "WAITING"),
    ]
    .into_iter()
    .map(|(task_id, content, start_time, status)| {
        Record::new()
            .with("id", task_id - 300)
            .with(announcement::TASK_ID_FIELD, task_id)
            .with("content", content)
            .with("startTime", start_time)
            .with("status", status)
    })
    .collect()
}

fn sample_mail_templates() -> Vec<Record> {
    [
        (1, "registration", "Registration", "registration", "Welcome to the platform", true),
        (2, "reset-password", "Reset password", "password-reset", "Reset your password", true),
        (3, "maintenance", "Maintenance notice", "notice", "Scheduled maintenance", false),
    ]
    .into_iter()
    .map(|(id, code, name, kind, title, predefined)| {
        Record::new()
            .with("id", id)
            .with("code", code)
            .with("name", name)
            .with(mail_template::TYPE_FIELD, kind)
            .with("title", title)
            .with("content", format!("<p>{title}</p>"))
            .with("isPredefined", predefined)
            .with("objectVersionNumber", 1)
    })
    .collect()
}

fn sample_projects() -> Vec<Record> {
    [
        (1, "billing", "Billing & Invoices", 1),
        (2, "portal", "Customer portal", 1),
        (3, "lake", "Data lake", 2),
    ]
    .into_iter()
    .map(|(id, code, name, organization_id)| {
        Record::new()
            .with("id", id)
            .with("code", code)
            .with("name", name)
            .with(my_projects::ORGANIZATION_FILTER, organization_id)
            .with("enabled", true)
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use iam_console_core::Scope;
    use iam_console_gateway::ListQuery;

    #[tokio::test]
    async fn offline_collections_are_seeded() {
        let backend = Backend::Offline;

        let announcements = backend
            .gateway(
                announcement::endpoint(&Scope::Site),
                announcement::TASK_ID_FIELD,
            )
            .await
            .unwrap();
        let page = announcements.list_records(&ListQuery::default()).await.unwrap();
        assert_eq!(page.total_count, 4);
        let record = announcements.get_record("303").await.unwrap();
        assert_eq!(record.get_str("status"), Some("FAILED"));

        let templates = backend
            .gateway(mail_template::endpoint(&Scope::Site), "id")
            .await
            .unwrap();
        assert_eq!(
            templates.list_options(mail_template::TYPE_FIELD).await.unwrap()[0],
            "registration"
        );
    }
}
