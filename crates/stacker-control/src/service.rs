// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Background workers driving the periodic passes of a [`StackEngine`].

use crate::engine::StackEngine;
use crossbeam_channel::{select, Receiver, Sender};
use stacker_core::SinkResult;
use stacker_lanes::PersistPlan;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Runs the sweep and persistence passes of a shared engine in the
/// background.
///
/// Three threads are spawned by [`start`](Self::start):
/// - the sweep worker, running [`StackEngine::sweep`] every sweep interval;
/// - the persistence worker, building a [`PersistPlan`] every save interval;
/// - the data writer, the only thread that hands plans to the sink.
///
/// [`stop`](Self::stop) joins all three and runs the final flush on the
/// calling thread.
pub struct StackerService {
    engine: Arc<StackEngine>,
    running: Arc<AtomicBool>,
    shutdown_tx: Option<Sender<()>>,
    handles: Vec<thread::JoinHandle<()>>,
}

impl StackerService {
    /// Creates a stopped service around `engine`.
    pub fn new(engine: Arc<StackEngine>) -> Self {
        Self {
            engine,
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx: None,
            handles: Vec::new(),
        }
    }

    /// The engine driven by this service.
    pub fn engine(&self) -> &Arc<StackEngine> {
        &self.engine
    }

    /// Returns `true` between [`start`](Self::start) and [`stop`](Self::stop).
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Spawns the background threads. Does nothing if already running.
    pub fn start(&mut self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let config = self.engine.config();
        let sweep_every = config.sweep_interval();
        let save_every = config.save_interval();

        // Dropping the sender disconnects every worker at once.
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(0);
        let (plan_tx, plan_rx) = crossbeam_channel::unbounded::<PersistPlan>();

        self.handles.push(spawn_sweep_worker(
            Arc::clone(&self.engine),
            sweep_every,
            shutdown_rx.clone(),
        ));
        self.handles.push(spawn_persist_worker(
            Arc::clone(&self.engine),
            save_every,
            plan_tx,
            shutdown_rx,
        ));
        self.handles
            .push(spawn_data_writer(Arc::clone(&self.engine), plan_rx));
        self.shutdown_tx = Some(shutdown_tx);
    }

    /// Stops the background threads and flushes the caches one last time.
    ///
    /// Returns the error of the final flush, if it failed. Stopping a
    /// service that is not running does nothing.
    pub fn stop(&mut self) -> SinkResult<()> {
        if !self.running.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        drop(self.shutdown_tx.take());
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                log::error!("A stacker worker panicked before shutdown.");
            }
        }
        self.engine.shutdown().map(|_| ())
    }
}

impl Drop for StackerService {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log::warn!("Stacker service dropped without a final save: {e}");
        }
    }
}

fn spawn_sweep_worker(
    engine: Arc<StackEngine>,
    every: Duration,
    shutdown: Receiver<()>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        log::info!("Stacker sweep thread started.");
        let ticker = crossbeam_channel::tick(every);
        loop {
            select! {
                recv(ticker) -> _ => {
                    let report = engine.sweep();
                    if report.total_evicted() > 0 {
                        log::debug!("Sweep evicted {} stale records", report.total_evicted());
                    }
                }
                recv(shutdown) -> _ => break,
            }
        }
        log::info!("Stacker sweep thread stopped.");
    })
}

fn spawn_persist_worker(
    engine: Arc<StackEngine>,
    every: Duration,
    plans: Sender<PersistPlan>,
    shutdown: Receiver<()>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        log::info!("Stacker persistence thread started.");
        let ticker = crossbeam_channel::tick(every);
        loop {
            select! {
                recv(ticker) -> _ => {
                    if plans.send(engine.plan_persist()).is_err() {
                        log::warn!("Data writer is gone, stopping persistence.");
                        break;
                    }
                }
                recv(shutdown) -> _ => break,
            }
        }
        log::info!("Stacker persistence thread stopped.");
    })
}

fn spawn_data_writer(
    engine: Arc<StackEngine>,
    plans: Receiver<PersistPlan>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        log::info!("Stacker data writer started.");
        // Ends once the persistence worker drops its sender.
        for plan in plans.iter() {
            if let Err(e) = engine.write_plan(&plan) {
                log::error!("Periodic save failed, retrying next period: {e}");
            }
        }
        log::info!("Stacker data writer stopped.");
    })
}
