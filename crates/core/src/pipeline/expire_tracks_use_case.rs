use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::pipeline::track_finisher::TrackFinisher;
use crate::shared::settings::TrackSettings;
use crate::tracking::domain::expiry_policy::ExpiredTrack;
use crate::tracking::infrastructure::expiring_track_registry::ExpiringTrackRegistry;

/// Background expiry of tracks that stopped being reported.
///
/// Runs `num_workers` threads. Every `sweep_interval` each worker sweeps its
/// own partition of cameras and hands what expired to the finisher. Workers
/// sleep on a stop channel, so `stop` wakes them immediately instead of
/// waiting out the interval.
pub struct ExpireTracksUseCase<P: Send + Sync + 'static> {
    registry: Arc<ExpiringTrackRegistry<P>>,
    finisher: Arc<dyn TrackFinisher<P>>,
    num_workers: usize,
    sweep_interval: Duration,
    stop_tx: Option<Sender<()>>,
    workers: Vec<JoinHandle<()>>,
}

impl<P: Send + Sync + 'static> ExpireTracksUseCase<P> {
    pub fn new(
        registry: Arc<ExpiringTrackRegistry<P>>,
        finisher: Arc<dyn TrackFinisher<P>>,
        settings: &TrackSettings,
    ) -> Self {
        Self {
            registry,
            finisher,
            num_workers: settings.resolved_num_workers(),
            sweep_interval: settings.sweep_interval(),
            stop_tx: None,
            workers: Vec::new(),
        }
    }

    /// Spawns the workers. Calling it while already running does nothing.
    pub fn start(&mut self) -> std::io::Result<()> {
        if self.is_running() {
            return Ok(());
        }

        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(0);
        self.stop_tx = Some(stop_tx);

        for worker_id in 0..self.num_workers {
            let spawned = std::thread::Builder::new()
                .name(format!("expire-tracks-{worker_id}"))
                .spawn({
                    let registry = Arc::clone(&self.registry);
                    let finisher = Arc::clone(&self.finisher);
                    let stop_rx = stop_rx.clone();
                    let num_workers = self.num_workers;
                    let interval = self.sweep_interval;
                    move || {
                        run_worker(
                            worker_id,
                            num_workers,
                            interval,
                            &registry,
                            finisher.as_ref(),
                            &stop_rx,
                        )
                    }
                });
            match spawned {
                Ok(handle) => self.workers.push(handle),
                Err(e) => {
                    self.stop();
                    return Err(e);
                }
            }
        }

        log::info!(
            "Started {} track expiry workers (interval {:?}, lost_ttl {:?}, active_ttl {:?})",
            self.num_workers,
            self.sweep_interval,
            self.registry.policy().lost_ttl(),
            self.registry.policy().active_ttl()
        );
        Ok(())
    }

    /// Signals every worker and waits for them to exit.
    pub fn stop(&mut self) {
        // Dropping the only sender disconnects the channel, waking all workers.
        if self.stop_tx.take().is_none() {
            return;
        }
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                log::warn!("Track expiry worker panicked");
            }
        }
        log::info!("Stopped track expiry workers");
    }

    pub fn is_running(&self) -> bool {
        self.stop_tx.is_some()
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Runs one full sweep on the calling thread. Returns how many tracks
    /// were handed to the finisher.
    pub fn sweep_once(&self) -> usize {
        finish_all(self.finisher.as_ref(), self.registry.sweep())
    }
}

impl<P: Send + Sync + 'static> Drop for ExpireTracksUseCase<P> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker<P>(
    worker_id: usize,
    num_workers: usize,
    interval: Duration,
    registry: &ExpiringTrackRegistry<P>,
    finisher: &dyn TrackFinisher<P>,
    stop_rx: &Receiver<()>,
) {
    loop {
        match stop_rx.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {
                let expired = registry.sweep_partition(worker_id, num_workers);
                finish_all(finisher, expired);
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

fn finish_all<P>(finisher: &dyn TrackFinisher<P>, expired: Vec<ExpiredTrack<P>>) -> usize {
    let count = expired.len();
    for track in &expired {
        if let Err(e) = finisher.finish_track(track) {
            log::warn!(
                "Failed to finish track {} on camera {}: {e}",
                track.entry.track_id(),
                track.entry.camera_id()
            );
        }
    }
    count
}
