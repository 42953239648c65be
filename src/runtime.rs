// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Event loop that drives the engine.
//!
//! A single task owns the [`Engine`] and waits on user intents, the
//! subdivision timer and the count-in timer. Effects returned by the engine
//! are carried out here: timers become [`Interval`]s and every tone becomes a
//! spawned task that sleeps until its offset, emits, and holds a
//! [`ToneGuard`] for the tone's duration. Stopping a timer never cancels
//! tones that are already scheduled.

use std::future;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::{self, JoinSet};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::audio::{AudioError, Tone, ToneEmitter, ToneGuard};
use crate::engine::{Effect, Engine, Intent, Snapshot};

/// Capacity of the intent channel
const INTENT_QUEUE: usize = 64;

/// Channels the presentation layer talks through
#[derive(Debug, Clone)]
pub struct RuntimeHandle {
    intents: mpsc::Sender<Intent>,
    snapshots: watch::Receiver<Snapshot>,
}

impl RuntimeHandle {
    /// Queue an intent. Returns false once the runtime has exited.
    pub async fn send(&self, intent: Intent) -> bool {
        self.intents.send(intent).await.is_ok()
    }

    /// Queue an intent without waiting. Returns false if the queue is full
    /// or the runtime has exited.
    pub fn try_send(&self, intent: Intent) -> bool {
        self.intents.try_send(intent).is_ok()
    }

    /// Latest published state
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Subscribe to state updates
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }
}

enum Event {
    Intent(Intent),
    Closed,
    ClockTick,
    CountInTick,
    ToneFailed(AudioError),
    ToneDone,
}

/// Engine event loop
pub struct Runtime {
    engine: Engine,
    emitter: Arc<dyn ToneEmitter>,
    intents: mpsc::Receiver<Intent>,
    snapshots: watch::Sender<Snapshot>,
    clock_timer: Option<Interval>,
    count_in_timer: Option<Interval>,
    tones: JoinSet<()>,
    failures_tx: mpsc::UnboundedSender<AudioError>,
    failures_rx: mpsc::UnboundedReceiver<AudioError>,
}

impl Runtime {
    /// Create a runtime and the handle used to drive it
    pub fn new(engine: Engine, emitter: Arc<dyn ToneEmitter>) -> (Self, RuntimeHandle) {
        let (intent_tx, intent_rx) = mpsc::channel(INTENT_QUEUE);
        let (snapshot_tx, snapshot_rx) = watch::channel(engine.snapshot());
        let (failures_tx, failures_rx) = mpsc::unbounded_channel();

        let runtime = Self {
            engine,
            emitter,
            intents: intent_rx,
            snapshots: snapshot_tx,
            clock_timer: None,
            count_in_timer: None,
            tones: JoinSet::new(),
            failures_tx,
            failures_rx,
        };
        let handle = RuntimeHandle {
            intents: intent_tx,
            snapshots: snapshot_rx,
        };
        (runtime, handle)
    }

    /// Run until `Quit` arrives or every handle is dropped. Returns the
    /// engine in its final state.
    pub async fn run(mut self) -> Engine {
        self.emitter.set_volume(self.engine.gain());
        self.prepare_output();
        info!("runtime started");

        loop {
            let event = self.next_event().await;
            let now = Instant::now();
            let effects = match event {
                Event::Intent(Intent::Quit) | Event::Closed => break,
                Event::Intent(intent) => {
                    debug!(?intent, "intent");
                    self.engine.apply(intent, now)
                }
                Event::ClockTick => self.engine.on_clock_tick(now),
                Event::CountInTick => self.engine.on_count_in_tick(now),
                Event::ToneFailed(e) => {
                    self.engine.set_notice(format!("Audio unavailable: {}", e));
                    Vec::new()
                }
                Event::ToneDone => continue,
            };
            self.perform(effects);
            self.snapshots.send_replace(self.engine.snapshot());
        }

        self.clock_timer = None;
        self.count_in_timer = None;
        self.tones.shutdown().await;
        info!("runtime stopped");
        self.engine
    }

    async fn next_event(&mut self) -> Event {
        tokio::select! {
            biased;
            intent = self.intents.recv() => match intent {
                Some(intent) => Event::Intent(intent),
                None => Event::Closed,
            },
            _ = next_tick(&mut self.count_in_timer) => Event::CountInTick,
            _ = next_tick(&mut self.clock_timer) => Event::ClockTick,
            Some(e) = self.failures_rx.recv() => Event::ToneFailed(e),
            Some(_) = self.tones.join_next(), if !self.tones.is_empty() => Event::ToneDone,
        }
    }

    /// Open the emitter's backend on the blocking pool so a slow device
    /// never stalls the loop or a tone task
    fn prepare_output(&self) {
        let emitter = Arc::clone(&self.emitter);
        let failures = self.failures_tx.clone();
        task::spawn_blocking(move || {
            if let Err(e) = emitter.prepare() {
                warn!(error = %e, "audio output unavailable");
                let _ = failures.send(e);
            }
        });
    }

    fn perform(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Tone { tone, delay } => {
                    let emitter = Arc::clone(&self.emitter);
                    let failures = self.failures_tx.clone();
                    self.tones.spawn(async move {
                        if !delay.is_zero() {
                            time::sleep(delay).await;
                        }
                        play(emitter, tone, failures).await;
                    });
                }
                Effect::StartClock { period } => {
                    self.clock_timer = Some(timer(period));
                }
                Effect::StopClock => {
                    self.clock_timer = None;
                }
                Effect::StartCountIn { period } => {
                    self.count_in_timer = Some(timer(period));
                }
                Effect::CancelCountIn => {
                    self.count_in_timer = None;
                }
                Effect::Volume(gain) => self.emitter.set_volume(gain),
            }
        }
    }
}

/// Emit a tone and hold it for its duration
async fn play(
    emitter: Arc<dyn ToneEmitter>,
    tone: Tone,
    failures: mpsc::UnboundedSender<AudioError>,
) {
    match ToneGuard::acquire(emitter, &tone) {
        Ok(_guard) => time::sleep(tone.duration).await,
        Err(e) => {
            warn!(error = %e, frequency = tone.frequency, "tone dropped");
            let _ = failures.send(e);
        }
    }
}

/// Interval whose first tick completes immediately
fn timer(period: std::time::Duration) -> Interval {
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(interval) => {
            interval.tick().await;
        }
        None => future::pending::<()>().await,
    }
}
