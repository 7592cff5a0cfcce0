//! Timer command handler

use anyhow::{Context, bail};
use std::io::Write;
use std::sync::Arc;
use tokio::sync::watch;

use crate::config::Config;
use crate::models::Subject;
use crate::state::SharedState;
use crate::timer::{
    CompletionAlert, HttpSessionSink, SessionSink, StoreSessionSink, TimerController, TimerState,
    TimerStatus, parse_minutes,
};

pub struct TimerArgs {
    pub subject: String,
    pub minutes: Option<String>,
    pub preset: Option<usize>,
    pub local_user: Option<String>,
    pub server: Option<String>,
    pub token: Option<String>,
}

pub async fn cmd_timer(config: Config, args: TimerArgs) -> anyhow::Result<()> {
    let minutes = match (&args.minutes, args.preset) {
        (Some(text), _) => parse_minutes(text),
        (None, Some(index)) => *index
            .checked_sub(1)
            .and_then(|i| config.timer.presets.get(i))
            .with_context(|| {
                format!(
                    "Preset {index} does not exist, configured presets: {:?}",
                    config.timer.presets
                )
            })?,
        (None, None) => config.timer.default_minutes,
    };

    let alert = CompletionAlert::from(&config.timer);

    let (sink, subject): (Arc<dyn SessionSink>, Subject) = if let Some(email) = &args.local_user {
        let state = SharedState::new(config).await?;
        let user = state
            .store
            .get_user_by_email(email.trim())
            .await?
            .with_context(|| format!("No account for {email}"))?;

        let subjects = state.subject_service.list(user.id).await?;
        let subject = resolve_subject(&subjects, &args.subject)
            .with_context(|| format!("No subject matching '{}'", args.subject))?
            .clone();

        (
            Arc::new(StoreSessionSink::new(state.ledger_service.clone(), user.id)),
            subject,
        )
    } else {
        let Some(token) = args.token.or(config.timer.api_token.clone()) else {
            bail!("An API token is required: pass --token, set timer.api_token or FOCUSLEDGER_API_TOKEN");
        };
        let server = args.server.unwrap_or(config.timer.server_url.clone());
        let sink = HttpSessionSink::new(&server, token)?;

        let subjects = sink.subjects().await?;
        let subject = resolve_subject(&subjects, &args.subject)
            .with_context(|| format!("No subject matching '{}'", args.subject))?
            .clone();

        (Arc::new(sink), subject)
    };

    let controller = TimerController::new(TimerState::new(minutes), sink, alert);
    controller.select_subject(subject.id).await?;

    let mut updates = controller.subscribe();
    controller.start().await?;

    eprintln!("{minutes} minute(s) of {}. Ctrl-C to abandon.", subject.name);

    let outcome = follow(&mut updates, tokio::signal::ctrl_c(), |state| {
        draw(state, &subject.name);
    })
    .await;

    match outcome {
        Outcome::Interrupted => {
            controller.reset().await;
            eprintln!("\nTimer reset, nothing recorded.");
        }
        Outcome::Completed => {
            eprintln!();
            controller.wait_for_delivery().await;
        }
        Outcome::Closed => controller.wait_for_delivery().await,
    }

    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Completed,
    Interrupted,
    Closed,
}

/// Drives `on_update` until the run completes or `interrupt` resolves. The
/// interrupt future lives across iterations so a signal is never dropped.
async fn follow<F, T>(
    updates: &mut watch::Receiver<TimerState>,
    interrupt: F,
    mut on_update: impl FnMut(&TimerState),
) -> Outcome
where
    F: Future<Output = T>,
{
    tokio::pin!(interrupt);

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    return Outcome::Closed;
                }
                let state = updates.borrow_and_update().clone();
                on_update(&state);
                if state.status == TimerStatus::Completed {
                    return Outcome::Completed;
                }
            }
            _ = &mut interrupt => return Outcome::Interrupted,
        }
    }
}

fn draw(state: &TimerState, subject: &str) {
    let mut err = std::io::stderr();
    let _ = write!(
        err,
        "\r{}  {subject}   ",
        format_remaining(state.remaining_seconds)
    );
    let _ = err.flush();
}

fn format_remaining(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Numeric input matches an id, anything else a case-insensitive name.
fn resolve_subject<'a>(subjects: &'a [Subject], needle: &str) -> Option<&'a Subject> {
    let needle = needle.trim();
    if let Ok(id) = needle.parse::<i32>() {
        return subjects.iter().find(|s| s.id == id);
    }
    subjects
        .iter()
        .find(|s| s.name.eq_ignore_ascii_case(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(id: i32, name: &str) -> Subject {
        Subject {
            id,
            user_id: 1,
            name: name.to_string(),
            color: "#6366f1".to_string(),
            icon: None,
            created_at: "2026-03-01T00:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn test_resolve_subject() {
        let subjects = vec![subject(1, "Study"), subject(2, "Reading")];
        assert_eq!(resolve_subject(&subjects, "2").unwrap().name, "Reading");
        assert_eq!(resolve_subject(&subjects, " reading ").unwrap().id, 2);
        assert!(resolve_subject(&subjects, "9").is_none());
        assert!(resolve_subject(&subjects, "Work").is_none());
    }

    fn with_status(status: TimerStatus) -> TimerState {
        let mut state = TimerState::new(25);
        state.status = status;
        state
    }

    #[tokio::test]
    async fn test_follow_keeps_interrupt_raised_mid_update() {
        let (tx, mut rx) = watch::channel(TimerState::new(25));
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let mut stop_tx = Some(stop_tx);

        tx.send(with_status(TimerStatus::Running)).unwrap();
        let mut seen = 0;
        let outcome = follow(&mut rx, stop_rx, |_| {
            seen += 1;
            if let Some(stop) = stop_tx.take() {
                stop.send(()).unwrap();
            }
        })
        .await;

        assert_eq!(outcome, Outcome::Interrupted);
        assert_eq!(seen, 1);
        drop(tx);
    }

    #[tokio::test]
    async fn test_follow_stops_on_completion() {
        let (tx, mut rx) = watch::channel(TimerState::new(25));
        tx.send(with_status(TimerStatus::Completed)).unwrap();

        let outcome = follow(&mut rx, std::future::pending::<()>(), |_| {}).await;
        assert_eq!(outcome, Outcome::Completed);

        drop(tx);
        let outcome = follow(&mut rx, std::future::pending::<()>(), |_| {}).await;
        assert_eq!(outcome, Outcome::Closed);
    }

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(1500), "25:00");
        assert_eq!(format_remaining(61), "01:01");
        assert_eq!(format_remaining(0), "00:00");
    }
}
