/*
[INPUT]:  SessionCommand messages, a TaskProvider, CancellationToken
[OUTPUT]: RoundSnapshot updates (watch) and RoundEvent stream (broadcast)
[POS]:    Runtime layer - single-consumer driver that owns the machine and its timers
[UPDATE]: When adding commands or changing how generation is supervised
*/

use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::GameError;
use crate::provider::TaskProvider;
use crate::round::{RoundEvent, RoundMachine, RoundSnapshot};
use crate::task::{Choice, Task, TaskId};

const COMMAND_BUFFER: usize = 64;
const EVENT_BUFFER: usize = 256;

type Generation = JoinHandle<Result<Vec<Task>, GameError>>;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    StartRound { goal: String },
    Decide { task_id: TaskId, choice: Choice },
    TourNext,
    SkipTour,
    Reset,
}

/// Cloneable front door to a running [`GameSession`].
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    snapshots: watch::Receiver<RoundSnapshot>,
    events: broadcast::Sender<RoundEvent>,
    shutdown: CancellationToken,
}

impl SessionHandle {
    pub async fn send(&self, command: SessionCommand) -> Result<(), GameError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| GameError::SessionClosed)
    }

    pub async fn start_round(&self, goal: impl Into<String>) -> Result<(), GameError> {
        self.send(SessionCommand::StartRound { goal: goal.into() }).await
    }

    pub async fn decide(&self, task_id: TaskId, choice: Choice) -> Result<(), GameError> {
        self.send(SessionCommand::Decide { task_id, choice }).await
    }

    pub async fn tour_next(&self) -> Result<(), GameError> {
        self.send(SessionCommand::TourNext).await
    }

    pub async fn skip_tour(&self) -> Result<(), GameError> {
        self.send(SessionCommand::SkipTour).await
    }

    pub async fn reset(&self) -> Result<(), GameError> {
        self.send(SessionCommand::Reset).await
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<RoundSnapshot> {
        self.snapshots.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RoundEvent> {
        self.events.subscribe()
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

pub struct GameSession {
    machine: RoundMachine,
    provider: Arc<dyn TaskProvider>,
    commands: mpsc::Receiver<SessionCommand>,
    snapshots: watch::Sender<RoundSnapshot>,
    events: broadcast::Sender<RoundEvent>,
    shutdown: CancellationToken,
    generation: Option<Generation>,
}

impl GameSession {
    /// Start the driver on the current runtime.
    pub fn spawn(
        machine: RoundMachine,
        provider: Arc<dyn TaskProvider>,
        shutdown: CancellationToken,
    ) -> (SessionHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot_tx, snapshot_rx) = watch::channel(machine.snapshot());
        let (event_tx, _) = broadcast::channel(EVENT_BUFFER);

        let session = Self {
            machine,
            provider,
            commands: command_rx,
            snapshots: snapshot_tx,
            events: event_tx.clone(),
            shutdown: shutdown.clone(),
            generation: None,
        };
        let handle = SessionHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            events: event_tx,
            shutdown,
        };
        (handle, tokio::spawn(session.run()))
    }

    async fn run(mut self) {
        info!("game session started");
        loop {
            let wakeup = self.machine.next_wakeup();
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    debug!("game session shutdown requested");
                    break;
                }
                command = self.commands.recv() => {
                    match command {
                        Some(command) => self.handle(command),
                        None => break,
                    }
                }
                result = join_generation(&mut self.generation) => {
                    self.generation = None;
                    self.on_generated(result);
                }
                _ = sleep_until(wakeup) => {
                    self.machine.tick(Instant::now());
                }
            }
            self.publish();
        }

        if let Some(generation) = self.generation.take() {
            generation.abort();
        }
        info!("game session stopped");
    }

    fn handle(&mut self, command: SessionCommand) {
        let now = Instant::now();
        match command {
            SessionCommand::StartRound { goal } => {
                if let Err(err) = self.machine.begin_generating(&goal) {
                    warn!(error = %err, "start round rejected");
                    return;
                }
                let provider = Arc::clone(&self.provider);
                let goal = self.machine.goal().to_string();
                self.generation = Some(tokio::spawn(async move { provider.generate(&goal).await }));
            }
            SessionCommand::Decide { task_id, choice } => {
                self.machine.decide(task_id, choice, now);
            }
            SessionCommand::TourNext => {
                self.machine.tour_next(now);
            }
            SessionCommand::SkipTour => {
                self.machine.skip_tour(now);
            }
            SessionCommand::Reset => {
                if let Some(generation) = self.generation.take() {
                    debug!("aborting task generation");
                    generation.abort();
                }
                self.machine.reset();
            }
        }
    }

    fn on_generated(&mut self, result: Result<Result<Vec<Task>, GameError>, JoinError>) {
        match result {
            Ok(Ok(tasks)) => {
                info!(count = tasks.len(), goal = %self.machine.goal(), "task set ready");
                if let Err(err) = self.machine.finish_generating(tasks, Instant::now()) {
                    warn!(error = %err, "task set rejected");
                }
            }
            Ok(Err(err)) => self.machine.fail_generating(&err),
            Err(err) if err.is_cancelled() => {}
            Err(err) => {
                self.machine
                    .fail_generating(&GameError::GenerationAborted(err.to_string()));
            }
        }
    }

    fn publish(&mut self) {
        for event in self.machine.take_events() {
            // No subscribers is fine.
            let _ = self.events.send(event);
        }
        self.snapshots.send_replace(self.machine.snapshot());
    }
}

async fn join_generation(
    generation: &mut Option<Generation>,
) -> Result<Result<Vec<Task>, GameError>, JoinError> {
    match generation {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
