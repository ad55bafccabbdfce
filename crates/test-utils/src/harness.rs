use std::path::PathBuf;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use examsim::engine::{
    ExamCore, Notification, Runtime, RuntimeEvent, RuntimeOptions, UserAction,
};
use examsim::errors::Result;
use examsim::exec::{ExecutionGateway, Sandbox};
use examsim::persist::{AnswerPersistence, KeyValueStore};
use examsim::types::TimeRemaining;

/// A runtime running on its own task, driven through channels.
pub struct RuntimeHarness {
    pub events: mpsc::Sender<RuntimeEvent>,
    pub notifications: mpsc::Receiver<Notification>,
    pub handle: JoinHandle<Result<ExamCore>>,
}

impl RuntimeHarness {
    /// Spawn a runtime over `gateway` and `store`.
    pub fn spawn<S: Sandbox>(
        gateway: ExecutionGateway<S>,
        store: Box<dyn KeyValueStore>,
        time_limit: TimeRemaining,
        export_dir: PathBuf,
    ) -> Self {
        let (events, event_rx) = mpsc::channel(64);
        let (notify_tx, notifications) = mpsc::channel(256);

        let core = ExamCore::new(RuntimeOptions {
            time_limit,
            export_dir,
        });
        let runtime = Runtime::new(
            core,
            event_rx,
            events.clone(),
            gateway,
            AnswerPersistence::new(store),
            notify_tx,
        );

        Self {
            events,
            notifications,
            handle: tokio::spawn(runtime.run()),
        }
    }

    pub async fn act(&self, action: UserAction) {
        self.events
            .send(RuntimeEvent::User(action))
            .await
            .expect("runtime stopped unexpectedly");
    }

    /// Receive notifications until one matches `pred`; returns it.
    pub async fn wait_for<F>(&mut self, mut pred: F) -> Notification
    where
        F: FnMut(&Notification) -> bool,
    {
        loop {
            let n = self
                .notifications
                .recv()
                .await
                .expect("notification channel closed while waiting");
            if pred(&n) {
                return n;
            }
        }
    }

    /// Ask the runtime to quit and return the final core.
    pub async fn quit(self) -> ExamCore {
        drop(self.notifications);
        let _ = self.events.send(RuntimeEvent::User(UserAction::Quit)).await;
        self.handle
            .await
            .expect("runtime task panicked")
            .expect("runtime returned an error")
    }
}
