use anyhow::{Context, Result};
use chrono::Local;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use notification_bell::auth::{Session, SessionGate};
use notification_bell::config;
use notification_bell::domain::notifications::NotificationId;
use notification_bell::logging;
use notification_bell::services::HttpNotificationClient;
use notification_bell::widget::{
    Collaborators, ListenerFlag, LoggingRouter, NotificationBell, WidgetConfig,
};

const HELP: &str = "commands: toggle | all | outside | select <n> | show | refresh | read-all | delete <id> | logout | quit";

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = config::Settings::from_env()?;

    // Initialize logging
    logging::init_logging(&settings.env);

    tracing::info!(
        env = ?settings.env,
        api_base_url = %settings.api_base_url,
        "Starting notification bell"
    );

    let session = settings
        .api_token
        .clone()
        .map(Session::with_token)
        .unwrap_or_default();

    let client = HttpNotificationClient::new(
        &settings.api_base_url,
        session.clone(),
        settings.request_timeout_seconds,
    )?;

    // Optionally check service health (non-blocking)
    tokio::spawn({
        let client = client.clone();
        async move {
            match client.health_check().await {
                Ok(()) => tracing::info!("Notification service is healthy"),
                Err(e) => tracing::warn!(error = %e, "Notification service health check failed - polling will keep trying"),
            }
        }
    });

    let listener = ListenerFlag::new();
    let bell = NotificationBell::mount(
        Collaborators {
            service: Arc::new(client),
            auth: Arc::new(SessionGate::new(session.clone())),
            router: Arc::new(LoggingRouter),
            listener: Arc::new(listener.clone()),
        },
        WidgetConfig::from(&settings),
    );

    if !bell.is_active() {
        tracing::warn!("NOTIFICATIONS_API_TOKEN is missing or expired; the bell stays hidden");
    }

    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read command")? {
        let mut args = line.split_whitespace();
        match (args.next(), args.next()) {
            (None, _) | (Some("show"), _) => {}
            (Some("toggle"), _) => {
                bell.toggle();
            }
            (Some("all"), _) => {
                if !bell.view_all() {
                    println!("nothing more to show");
                }
            }
            (Some("outside"), _) => {
                // Only forwarded while the widget listens for it
                if listener.is_attached() {
                    bell.pointer_down_outside();
                }
            }
            (Some("select"), Some(n)) => select_nth(&bell, n).await,
            (Some("refresh"), _) => {
                bell.refresh().await;
            }
            (Some("read-all"), _) => {
                bell.mark_all_read().await;
            }
            (Some("delete"), Some(id)) => {
                bell.delete(&NotificationId::from(id)).await;
            }
            (Some("logout"), _) => session.clear(),
            (Some("quit"), _) | (Some("exit"), _) => break,
            (Some(_), _) => println!("{}", HELP),
        }
        render(&bell);
    }

    bell.unmount().await;
    Ok(())
}

async fn select_nth(bell: &NotificationBell, n: &str) {
    let Some(view) = bell.view(&Local::now()) else {
        return;
    };
    let Some(item) = n
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| view.items.get(i))
    else {
        println!("no item {} in the open list", n);
        return;
    };

    let selection = bell.select(&item.id).await;
    match selection.route {
        Some(route) => println!("-> {}", route),
        None => println!("(no related page)"),
    }
}

fn render(bell: &NotificationBell) {
    let Some(view) = bell.view(&Local::now()) else {
        println!("(signed out)");
        return;
    };

    if view.unread_count > 0 {
        println!("[bell] {} unread", view.unread_count);
    } else {
        println!("[bell]");
    }

    if !view.state.is_open() {
        return;
    }
    if view.items.is_empty() {
        println!("  No notifications");
    }
    for (i, item) in view.items.iter().enumerate() {
        let marker = if item.unread { "*" } else { " " };
        println!(
            "{:>3}. {} {} {}: {} ({})",
            i + 1,
            marker,
            item.glyph,
            item.title,
            item.message,
            item.age
        );
    }
    if view.show_view_all {
        println!("  [all] view all {} notifications", view.total);
    }
}
