//! Full screen flows against the in-memory gateway.

use std::sync::Arc;

use iam_console_core::notify::messages;
use iam_console_core::screens::announcement::{self, AnnouncementStatus};
use iam_console_core::screens::{mail_template, my_projects, project_link};
use iam_console_core::types::{QueryChange, SelectionMode};
use iam_console_core::{
    AnnouncementScreen, ConsoleError, MailTemplateScreen, MyProjectsWidget, NotificationLevel,
    RecordingNotifier, RefreshOutcome, Scope,
};
use iam_console_gateway::{InMemoryGateway, Record, RecordGateway};

fn announcement_gateway(count: u64) -> Arc<InMemoryGateway> {
    let records = (1..=count)
        .map(|i| {
            Record::new()
                .with("taskId", i)
                .with("content", format!("<p>Notice #{i}</p>"))
                .with("status", if i <= 3 { "WAITING" } else { "COMPLETED" })
                .with("sendTime", format!("2024-01-{i:02} 09:00:00"))
        })
        .collect();
    Arc::new(InMemoryGateway::with_records(
        announcement::COLLECTION,
        announcement::TASK_ID_FIELD,
        records,
    ))
}

#[tokio::test]
async fn seven_records_fit_on_first_page() {
    let gateway = announcement_gateway(7);
    let notifier = Arc::new(RecordingNotifier::new());
    let screen = AnnouncementScreen::new(gateway, notifier, 10);

    assert_eq!(screen.mount().await.unwrap(), RefreshOutcome::Applied);
    let snapshot = screen.list().snapshot();
    assert_eq!(snapshot.total_count, 7);
    assert_eq!(snapshot.items.len(), 7);
    assert_eq!(snapshot.display_page(), 1);
}

#[tokio::test]
async fn announcement_lifecycle() {
    let gateway = announcement_gateway(12);
    let notifier = Arc::new(RecordingNotifier::new());
    let screen = AnnouncementScreen::new(gateway.clone(), notifier.clone(), 10);
    screen.mount().await.unwrap();

    // second page
    screen
        .change_query(QueryChange::new().page(1, 10))
        .await
        .unwrap();
    assert_eq!(screen.list().snapshot().items.len(), 2);

    // markup without text is rejected locally
    screen.show_create();
    screen.set_content("<p>&nbsp;</p>");
    let rejected = screen.create(Some("2024-07-01 08:00:00")).await;
    assert!(matches!(rejected, Err(ConsoleError::Validation(_))));
    assert_eq!(gateway.records().await.len(), 12);
    assert!(screen.form().snapshot().panel_open());

    screen.set_content("<p>Scheduled maintenance</p>");
    screen.create(Some("2024-07-01 08:00:00")).await.unwrap();
    assert_eq!(gateway.records().await.len(), 13);
    assert_eq!(screen.form().snapshot().mode(), SelectionMode::None);
    assert_eq!(screen.list().snapshot().total_count, 13);

    screen
        .filter_by_status(&[AnnouncementStatus::Waiting])
        .await
        .unwrap();
    let waiting = screen.list().snapshot();
    assert_eq!(waiting.query.page_index, 0);
    assert_eq!(waiting.total_count, 3);

    let victim = waiting.items[0].clone();
    screen.delete(&victim).await.unwrap();
    assert_eq!(screen.list().snapshot().total_count, 2);

    assert_eq!(
        notifier.messages(),
        [messages::CREATE_SUCCESS, messages::DELETE_SUCCESS]
    );
}

#[tokio::test]
async fn failed_delete_leaves_page_untouched() {
    let gateway = announcement_gateway(4);
    let notifier = Arc::new(RecordingNotifier::new());
    let screen = AnnouncementScreen::new(gateway.clone(), notifier.clone(), 10);
    screen.mount().await.unwrap();
    let before = screen.list().snapshot();

    gateway.fail_next("发送中的公告不能删除").await;
    let result = screen.delete(&before.items[1]).await;
    assert!(result.is_err());
    assert_eq!(screen.list().snapshot(), before);

    let last = notifier.last().unwrap();
    assert_eq!(last.level, NotificationLevel::Error);
    assert_eq!(last.message, "发送中的公告不能删除");
}

#[tokio::test]
async fn mail_template_lifecycle() {
    let gateway = Arc::new(InMemoryGateway::with_records(
        mail_template::COLLECTION,
        "id",
        vec![Record::new()
            .with("id", 1)
            .with("code", "registered")
            .with("name", "Registered")
            .with("type", "register")
            .with("title", "Welcome")
            .with("content", "<p>Welcome</p>")
            .with("isPredefined", true)
            .with("objectVersionNumber", 1)],
    ));
    gateway
        .set_options(
            mail_template::TYPE_FIELD,
            vec!["register".to_string(), "password".to_string()],
        )
        .await;
    let notifier = Arc::new(RecordingNotifier::new());
    let screen = MailTemplateScreen::new(gateway.clone(), notifier.clone(), 10);
    screen.mount().await.unwrap();

    screen.open_create().await;
    screen.set_content("<p>Your code is {{code}}</p>");
    let created = screen
        .submit(
            Record::new()
                .with("code", "verify")
                .with("name", "Verification")
                .with("type", "password")
                .with("title", "Verification code"),
        )
        .await
        .unwrap();
    let created_id = created.id_string("id").unwrap();
    assert_eq!(screen.list().snapshot().items[0].id_string("id"), Some(created_id.clone()));

    screen.open_modify(&created).await.unwrap();
    screen.set_content("<p>Your code: {{code}}</p>");
    screen
        .submit(
            Record::new()
                .with("code", "verify")
                .with("name", "Verification")
                .with("type", "password")
                .with("title", "Your verification code"),
        )
        .await
        .unwrap();
    let stored = gateway.get_record(&created_id).await.unwrap();
    assert_eq!(stored.get_str("title"), Some("Your verification code"));
    assert_eq!(stored.get_str("content"), Some("<p>Your code: {{code}}</p>"));
    assert_eq!(stored.get_bool("isPredefined"), Some(false));

    let predefined = gateway.get_record("1").await.unwrap();
    assert!(!mail_template::can_delete(&predefined));
    assert!(screen.delete(&predefined).await.is_err());

    screen.delete(&stored).await.unwrap();
    assert_eq!(screen.list().snapshot().total_count, 1);
    assert_eq!(
        notifier.messages(),
        [
            messages::CREATE_SUCCESS,
            messages::SAVE_SUCCESS,
            "Read-only: predefined templates cannot be deleted",
            messages::DELETE_SUCCESS,
        ]
    );
}

#[tokio::test]
async fn my_projects_follow_organization() {
    let gateway = Arc::new(InMemoryGateway::with_records(
        my_projects::COLLECTION,
        "id",
        vec![
            Record::new()
                .with("id", 11)
                .with("name", "Ops")
                .with("code", "ops")
                .with("organizationId", 1),
            Record::new()
                .with("id", 12)
                .with("name", "Web")
                .with("code", "web")
                .with("organizationId", 2),
        ],
    ));
    let widget = MyProjectsWidget::new(gateway, Arc::new(RecordingNotifier::new()));

    let scope = Scope::Organization {
        id: "2".to_string(),
        name: Some("Acme".to_string()),
    };
    widget.on_scope_change(&scope).await.unwrap();
    let projects = widget.projects();
    assert_eq!(projects.len(), 1);
    assert_eq!(
        project_link(&projects[0]).as_deref(),
        Some("/?type=project&id=12&name=Web&organizationId=2")
    );
}
