use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::debug;

use super::BoardClient;
use super::session::ActivityKind;

/// Input for the client event loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientEvent {
    Activity(ActivityKind),
    Shutdown,
}

/// Run the client's timers until `events` closes or yields `Shutdown`.
///
/// Sleeps until the earliest toast or session deadline and calls
/// [`BoardClient::tick`]. Anything that moves a deadline (login, activity,
/// new toasts) wakes the loop so it re-reads the schedule.
pub async fn drive(client: Arc<BoardClient>, mut events: mpsc::Receiver<ClientEvent>) {
    loop {
        let deadline = client.next_deadline();
        tokio::select! {
            event = events.recv() => match event {
                Some(ClientEvent::Activity(kind)) => {
                    client.record_activity(kind);
                }
                Some(ClientEvent::Shutdown) | None => break,
            },
            () = client.reschedule.notified() => {}
            () = sleep_or_park(deadline) => client.tick(),
        }
    }
    debug!("client event loop stopped");
}

async fn sleep_or_park(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientSignal, LogoutReason};
    use crate::io::remote::MemoryRemote;
    use crate::model::board::BoardState;
    use crate::model::config::{SessionConfig, Settings};
    use crate::model::toast::NewToast;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    const MINUTE: Duration = Duration::from_secs(60);

    fn client(timeout_minutes: u64) -> Arc<BoardClient> {
        let settings = Settings {
            session: SessionConfig {
                timeout_minutes,
                ..Default::default()
            },
            ..Default::default()
        };
        Arc::new(BoardClient::new(settings, Arc::new(MemoryRemote::new())))
    }

    #[tokio::test(start_paused = true)]
    async fn warns_then_logs_out_after_inactivity() {
        let client = client(5);
        let mut signals = client.subscribe();
        let (_tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(drive(Arc::clone(&client), rx));

        let start = Instant::now();
        client.login(BoardState::default());

        let warning = signals.recv().await.unwrap();
        assert_eq!(warning, ClientSignal::SessionWarning { remaining: MINUTE });
        assert_eq!(start.elapsed(), MINUTE * 4);

        let logout = signals.recv().await.unwrap();
        assert_eq!(
            logout,
            ClientSignal::LoggedOut {
                reason: LogoutReason::Inactivity
            }
        );
        assert_eq!(start.elapsed(), MINUTE * 5);
        assert!(!client.is_authenticated());

        let titles: Vec<String> = client.toasts().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["Session expired".to_string()]);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn activity_events_postpone_logout() {
        let client = client(5);
        let mut signals = client.subscribe();
        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(drive(Arc::clone(&client), rx));

        let start = Instant::now();
        client.login(BoardState::default());

        tokio::time::sleep(MINUTE * 3).await;
        tx.send(ClientEvent::Activity(ActivityKind::KeyDown)).await.unwrap();

        let warning = signals.recv().await.unwrap();
        assert!(matches!(warning, ClientSignal::SessionWarning { .. }));
        assert_eq!(start.elapsed(), MINUTE * 7);

        tx.send(ClientEvent::Shutdown).await.unwrap();
        handle.await.unwrap();
        assert!(client.is_authenticated());
    }

    #[tokio::test(start_paused = true)]
    async fn toasts_expire_while_the_loop_runs() {
        let client = client(30);
        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(drive(Arc::clone(&client), rx));

        client.notify(NewToast::success("Saved"));
        tokio::time::sleep(Duration::from_millis(4900)).await;
        assert_eq!(client.toasts().len(), 1);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(client.toasts().is_empty());

        drop(tx);
        handle.await.unwrap();
    }
}
