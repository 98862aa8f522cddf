use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use harvest_core::CollectRequest;
use harvest_logging::{harvest_debug, harvest_error};
use tokio::sync::mpsc as command_channel;
use tokio_util::sync::CancellationToken;

use crate::{
    HarvestError, HarvestEvent, HarvestProgress, HarvestSettings, Harvester, JobId, ProgressSink,
    WorldContext,
};

enum EngineCommand {
    Collect {
        job_id: JobId,
        request: CollectRequest,
    },
}

/// Runs harvest jobs one after another on a background thread.
///
/// Jobs share one world, so they never overlap. Progress and results come
/// back as [`HarvestEvent`]s. Dropping the handle cancels the running job and
/// stops the worker once its queue drains.
pub struct HarvestHandle {
    cmd_tx: command_channel::UnboundedSender<EngineCommand>,
    event_rx: mpsc::Receiver<HarvestEvent>,
    current: Arc<Mutex<Option<CancellationToken>>>,
    shutdown: CancellationToken,
}

impl HarvestHandle {
    pub fn new(settings: HarvestSettings, world: WorldContext) -> Result<Self, HarvestError> {
        let harvester = Harvester::new(settings)?;
        let (cmd_tx, mut cmd_rx) = command_channel::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel();
        let current = Arc::new(Mutex::new(None));
        let shutdown = CancellationToken::new();

        let worker = Worker {
            harvester,
            world,
            event_tx,
            current: current.clone(),
            shutdown: shutdown.clone(),
        };
        thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    harvest_error!("failed to start the harvest runtime: {err}");
                    return;
                }
            };
            runtime.block_on(async move {
                while let Some(command) = cmd_rx.recv().await {
                    worker.handle(command).await;
                }
            });
        });

        Ok(Self {
            cmd_tx,
            event_rx,
            current,
            shutdown,
        })
    }

    /// Queues a collect job. Fails only once the worker has stopped.
    pub fn submit(&self, job_id: JobId, request: CollectRequest) -> Result<(), HarvestError> {
        self.cmd_tx
            .send(EngineCommand::Collect { job_id, request })
            .map_err(|_| HarvestError::EngineStopped)
    }

    /// Cancels the job currently running, if any. Queued jobs are unaffected.
    pub fn cancel_current(&self) -> bool {
        match self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Blocks for the next event. `None` once the worker is gone.
    pub fn recv(&self) -> Option<HarvestEvent> {
        self.event_rx.recv().ok()
    }

    pub fn try_recv(&self) -> Option<HarvestEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<HarvestEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

impl Drop for HarvestHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

struct Worker {
    harvester: Harvester,
    world: WorldContext,
    event_tx: mpsc::Sender<HarvestEvent>,
    current: Arc<Mutex<Option<CancellationToken>>>,
    shutdown: CancellationToken,
}

impl Worker {
    async fn handle(&self, command: EngineCommand) {
        match command {
            EngineCommand::Collect { job_id, request } => {
                let token = self.shutdown.child_token();
                self.set_current(Some(token.clone()));
                harvest_debug!("job {job_id} started");

                let sink = ChannelProgressSink::new(job_id, self.event_tx.clone());
                let result = self
                    .harvester
                    .collect(&self.world, &request, &sink, &token)
                    .await;

                self.set_current(None);
                let _ = self.event_tx.send(HarvestEvent::Completed { job_id, result });
            }
        }
    }

    fn set_current(&self, token: Option<CancellationToken>) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = token;
    }
}

struct ChannelProgressSink {
    job_id: JobId,
    tx: mpsc::Sender<HarvestEvent>,
}

impl ChannelProgressSink {
    fn new(job_id: JobId, tx: mpsc::Sender<HarvestEvent>) -> Self {
        Self { job_id, tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, progress: HarvestProgress) {
        let _ = self.tx.send(HarvestEvent::Progress {
            job_id: self.job_id,
            progress,
        });
    }
}
