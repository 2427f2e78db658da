//! Single-writer service around a [`Viewer`].
//!
//! The viewer runs on its own task and drains an mpsc command queue, so
//! mutations are applied one at a time in arrival order. Loads and exports
//! are additionally guarded by busy flags: a second load (or export) while
//! one is in flight is rejected with [`Error::Busy`] before it is queued.
//! The flag travels with the queued command and is released by the viewer
//! task, so a caller that stops waiting does not free it early.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use extrudekit_core::{AppEvent, Error, ErrorEvent, Operation, Result, SharedBus};
use extrudekit_settings::{ParamChange, RebuildEffect};
use extrudekit_visualizer::{CameraFrame, ModelSummary, RasterExport, VectorExport};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::load::LoadRequest;
use crate::viewer::{Shortcut, Viewer, ViewerSnapshot};

const COMMAND_QUEUE_DEPTH: usize = 64;

type Reply<T> = oneshot::Sender<T>;

enum Command {
    Load(LoadRequest, BusyGuard, Reply<Result<ModelSummary>>),
    Apply(ParamChange, Reply<Result<RebuildEffect>>),
    ResetCamera(Reply<Option<CameraFrame>>),
    Refocus(Reply<Option<CameraFrame>>),
    Shortcut(Shortcut, Reply<bool>),
    Tick(f32, Reply<bool>),
    Resize(u32, u32, Reply<()>),
    ClearModel(Reply<bool>),
    Snapshot(Reply<ViewerSnapshot>),
    ExportVector(BusyGuard, Reply<Result<VectorExport>>),
    ExportRaster(BusyGuard, Reply<Result<RasterExport>>),
}

/// Holds a busy flag for as long as it lives.
///
/// Owned by the queued command, then by the viewer task while it runs the
/// operation; dropped before the reply is sent.
struct BusyGuard {
    flag: Arc<AtomicBool>,
}

impl BusyGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Cloneable handle to a running viewer task
#[derive(Clone)]
pub struct ViewerHandle {
    commands: mpsc::Sender<Command>,
    loading: Arc<AtomicBool>,
    exporting: Arc<AtomicBool>,
    bus: SharedBus,
}

impl ViewerHandle {
    /// Move `viewer` onto a new task and return a handle to it.
    ///
    /// The task ends once every handle has been dropped.
    pub fn spawn(viewer: Viewer) -> (Self, JoinHandle<()>) {
        let bus = Arc::clone(viewer.bus());
        let (commands, rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let task = tokio::spawn(run(viewer, rx));
        let handle = Self {
            commands,
            loading: Arc::new(AtomicBool::new(false)),
            exporting: Arc::new(AtomicBool::new(false)),
            bus,
        };
        (handle, task)
    }

    pub fn bus(&self) -> &SharedBus {
        &self.bus
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting.load(Ordering::Acquire)
    }

    async fn request<T>(&self, make: impl FnOnce(Reply<T>) -> Command) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(make(tx))
            .await
            .map_err(|_| Error::Stopped)?;
        rx.await.map_err(|_| Error::Stopped)
    }

    fn busy(&self, flag: &Arc<AtomicBool>, operation: Operation) -> Result<BusyGuard> {
        BusyGuard::acquire(flag).ok_or_else(|| {
            let err = Error::Busy { operation };
            warn!("{}", err);
            self.bus
                .publish(AppEvent::Error(ErrorEvent::new(err.user_message())))
                .ok();
            err
        })
    }

    pub async fn load(&self, request: LoadRequest) -> Result<ModelSummary> {
        let guard = self.busy(&self.loading, Operation::Load)?;
        self.request(|tx| Command::Load(request, guard, tx)).await?
    }

    pub async fn apply(&self, change: ParamChange) -> Result<RebuildEffect> {
        self.request(|tx| Command::Apply(change, tx)).await?
    }

    pub async fn reset_camera(&self) -> Result<Option<CameraFrame>> {
        self.request(Command::ResetCamera).await
    }

    pub async fn refocus(&self) -> Result<Option<CameraFrame>> {
        self.request(Command::Refocus).await
    }

    pub async fn shortcut(&self, shortcut: Shortcut) -> Result<bool> {
        self.request(|tx| Command::Shortcut(shortcut, tx)).await
    }

    pub async fn tick(&self, dt: f32) -> Result<bool> {
        self.request(|tx| Command::Tick(dt, tx)).await
    }

    pub async fn resize(&self, width: u32, height: u32) -> Result<()> {
        self.request(|tx| Command::Resize(width, height, tx)).await
    }

    pub async fn clear_model(&self) -> Result<bool> {
        self.request(Command::ClearModel).await
    }

    pub async fn snapshot(&self) -> Result<ViewerSnapshot> {
        self.request(Command::Snapshot).await
    }

    pub async fn export_vector(&self) -> Result<VectorExport> {
        let guard = self.busy(&self.exporting, Operation::Export)?;
        self.request(|tx| Command::ExportVector(guard, tx)).await?
    }

    pub async fn export_raster(&self) -> Result<RasterExport> {
        let guard = self.busy(&self.exporting, Operation::Export)?;
        self.request(|tx| Command::ExportRaster(guard, tx)).await?
    }
}

async fn run(mut viewer: Viewer, mut rx: mpsc::Receiver<Command>) {
    debug!("Viewer task started");
    while let Some(command) = rx.recv().await {
        // A dropped reply receiver only means the caller stopped waiting
        match command {
            Command::Load(request, guard, tx) => {
                let result = viewer.load(request).await;
                drop(guard);
                tx.send(result).ok();
            }
            Command::Apply(change, tx) => {
                tx.send(viewer.apply(change).await).ok();
            }
            Command::ResetCamera(tx) => {
                tx.send(viewer.reset_camera()).ok();
            }
            Command::Refocus(tx) => {
                tx.send(viewer.refocus()).ok();
            }
            Command::Shortcut(shortcut, tx) => {
                tx.send(viewer.handle_shortcut(shortcut)).ok();
            }
            Command::Tick(dt, tx) => {
                tx.send(viewer.tick(dt)).ok();
            }
            Command::Resize(width, height, tx) => {
                viewer.resize(width, height);
                tx.send(()).ok();
            }
            Command::ClearModel(tx) => {
                tx.send(viewer.clear_model()).ok();
            }
            Command::Snapshot(tx) => {
                tx.send(viewer.snapshot()).ok();
            }
            Command::ExportVector(guard, tx) => {
                let result = viewer.export_vector().await;
                drop(guard);
                tx.send(result).ok();
            }
            Command::ExportRaster(guard, tx) => {
                let result = viewer.export_raster().await;
                drop(guard);
                tx.send(result).ok();
            }
        }
    }
    debug!("Viewer task stopped");
}
