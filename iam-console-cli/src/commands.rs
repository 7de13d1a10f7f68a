//! Command handlers
//!
//! Each command mounts one screen, performs one action and prints the result to
//! `out`. Notifications raised by the screen are left in the context's notifier
//! for the caller to report.

use std::io::Write;
use std::sync::Arc;

use anyhow::{anyhow, bail};
use chrono::{Local, TimeDelta};
use iam_console_core::screens::{
    announcement, mail_template, my_projects, project_link, AnnouncementStatus, TemplateSource,
};
use iam_console_core::types::QueryChange;
use iam_console_core::validation::TIMESTAMP_FORMAT;
use iam_console_core::{
    AnnouncementScreen, ListSnapshot, MailTemplateScreen, MyProjectsWidget, RecordingNotifier,
    Scope,
};
use iam_console_gateway::{Filters, Record};

use crate::backend::Backend;
use crate::cli::{AnnouncementCommand, Command, MailTemplateCommand};

pub struct Context {
    pub backend: Backend,
    pub scope: Scope,
    pub page_size: u32,
    pub notifier: Arc<RecordingNotifier>,
}

pub async fn run(ctx: &Context, command: Command, out: &mut impl Write) -> anyhow::Result<()> {
    match command {
        Command::Announcements(command) => announcements(ctx, command, out).await,
        Command::MailTemplates(command) => mail_templates(ctx, command, out).await,
        Command::Projects { org } => projects(ctx, org, out).await,
    }
}

// ============ Announcements ============

async fn announcements(
    ctx: &Context,
    command: AnnouncementCommand,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let gateway = ctx
        .backend
        .gateway(
            announcement::endpoint(&ctx.scope),
            announcement::TASK_ID_FIELD,
        )
        .await?;
    let screen = AnnouncementScreen::new(gateway, ctx.notifier.clone(), ctx.page_size);

    match command {
        AnnouncementCommand::List { page, statuses } => {
            let filters =
                Filters::new().with("status", statuses.iter().map(|s| s.as_str()));
            screen
                .change_query(
                    QueryChange::new()
                        .page(page.page - 1, ctx.page_size)
                        .filters(filters),
                )
                .await?;
            let snapshot = screen.list().snapshot();
            writeln!(out, "{:<8} {:<10} {:<20} CONTENT", "TASK", "STATUS", "SEND TIME")?;
            for record in &snapshot.items {
                let status = announcement::status_of(record)
                    .map_or("-", AnnouncementStatus::label);
                writeln!(
                    out,
                    "{:<8} {:<10} {:<20} {}",
                    record.id_string(announcement::TASK_ID_FIELD).unwrap_or_default(),
                    status,
                    record.get_str("startTime").unwrap_or("-"),
                    announcement::content_preview(record),
                )?;
            }
            write_footer(out, &snapshot)?;
        }
        AnnouncementCommand::Create {
            content,
            send_time,
            in_minutes,
        } => {
            let send_time = match (send_time, in_minutes) {
                (Some(send_time), _) => Some(send_time),
                (None, Some(minutes)) => Some(send_time_in(minutes)?),
                (None, None) => None,
            };
            screen.show_create();
            screen.set_content(content);
            let stored = screen.create(send_time.as_deref()).await?;
            writeln!(out, "{}", serde_json::to_string_pretty(&stored)?)?;
        }
        AnnouncementCommand::Delete { task_id } => {
            let record = Record::new().with(announcement::TASK_ID_FIELD, task_id);
            screen.delete(&record).await?;
        }
    }
    Ok(())
}

/// Local time `minutes` from now in the backend's timestamp format.
fn send_time_in(minutes: i64) -> anyhow::Result<String> {
    let delta = TimeDelta::try_minutes(minutes)
        .ok_or_else(|| anyhow!("--in-minutes is out of range: {minutes}"))?;
    let at = Local::now()
        .checked_add_signed(delta)
        .ok_or_else(|| anyhow!("--in-minutes is out of range: {minutes}"))?;
    Ok(at.format(TIMESTAMP_FORMAT).to_string())
}

// ============ Mail templates ============

async fn mail_templates(
    ctx: &Context,
    command: MailTemplateCommand,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let gateway = ctx
        .backend
        .gateway(mail_template::endpoint(&ctx.scope), "id")
        .await?;
    let screen = MailTemplateScreen::new(gateway, ctx.notifier.clone(), ctx.page_size);

    match command {
        MailTemplateCommand::List { page, terms } => {
            screen
                .change_query(
                    QueryChange::new()
                        .page(page.page - 1, ctx.page_size)
                        .params(terms),
                )
                .await?;
            let snapshot = screen.list().snapshot();
            writeln!(
                out,
                "{:<6} {:<20} {:<24} {:<16} SOURCE",
                "ID", "CODE", "NAME", "TYPE"
            )?;
            for record in &snapshot.items {
                writeln!(
                    out,
                    "{:<6} {:<20} {:<24} {:<16} {}",
                    record.id_string("id").unwrap_or_default(),
                    record.get_str("code").unwrap_or("-"),
                    record.get_str("name").unwrap_or("-"),
                    record.get_str(mail_template::TYPE_FIELD).unwrap_or("-"),
                    TemplateSource::of(record).label(),
                )?;
            }
            write_footer(out, &snapshot)?;
        }
        MailTemplateCommand::Show { id } => {
            screen.open_modify(&Record::new().with("id", id)).await?;
            let detail = screen.form().snapshot().selection.record.unwrap_or_default();
            screen.cancel();
            writeln!(out, "{}", serde_json::to_string_pretty(&detail)?)?;
        }
        MailTemplateCommand::Delete { id } => {
            // 预置模板的判断需要完整记录
            let record = screen.detail(&Record::new().with("id", id)).await?;
            screen.delete(&record).await?;
        }
    }
    Ok(())
}

// ============ Projects ============

async fn projects(ctx: &Context, org: Option<String>, out: &mut impl Write) -> anyhow::Result<()> {
    let Some(organization_id) = org.or_else(|| ctx.scope.organization_id().map(str::to_string))
    else {
        bail!("No organization selected: pass --org or configure an organization scope");
    };
    let gateway = ctx.backend.gateway(my_projects::endpoint(), "id").await?;
    let widget = MyProjectsWidget::new(gateway, ctx.notifier.clone());
    widget.load(&organization_id).await?;

    for project in widget.projects() {
        writeln!(
            out,
            "{:<6} {:<16} {:<24} {}",
            project.id_string("id").unwrap_or_default(),
            project.get_str("code").unwrap_or("-"),
            project.get_str("name").unwrap_or("-"),
            project_link(&project).unwrap_or_default(),
        )?;
    }
    Ok(())
}

fn write_footer(out: &mut impl Write, snapshot: &ListSnapshot) -> std::io::Result<()> {
    let page_size = u64::from(snapshot.query.page_size.max(1));
    let pages = snapshot.total_count.div_ceil(page_size).max(1);
    writeln!(
        out,
        "Page {} of {pages} ({} total)",
        snapshot.display_page(),
        snapshot.total_count
    )
}
