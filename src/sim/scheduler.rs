//! Fixed-rate ticking thread
//!
//! One tick runs at a time. After each tick the thread sleeps for whatever
//! is left of the interval; an overrun starts the next tick immediately and
//! the lost time is never made up.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::consts::{GAME_NAME, GAME_VERSION};

use super::world::World;

pub const THREAD_NAME: &str = "Ticking Thread";

/// Anything the scheduler can advance
pub trait Simulation: Send {
    fn update_tick(&mut self);
}

impl Simulation for Arc<World> {
    fn update_tick(&mut self) {
        World::update_tick(self);
    }
}

/// Time left to sleep after a tick took `elapsed`
pub fn sleep_time(interval: Duration, elapsed: Duration) -> Duration {
    interval.saturating_sub(elapsed)
}

#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    interval: Duration,
}

impl Scheduler {
    /// Scheduler ticking `tick_rate` times per second (a zero rate is treated as 1)
    pub fn new(tick_rate: u32) -> Self {
        Self::with_interval(Duration::from_secs(1) / tick_rate.max(1))
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start ticking `sim` on a dedicated thread
    pub fn spawn<S: Simulation + 'static>(&self, mut sim: S) -> std::io::Result<SchedulerHandle> {
        let running = Arc::new(AtomicBool::new(true));
        let faulted = Arc::new(AtomicBool::new(false));
        let interval = self.interval;

        let thread = {
            let running = Arc::clone(&running);
            let faulted = Arc::clone(&faulted);
            thread::Builder::new().name(THREAD_NAME.to_string()).spawn(move || {
                log::info!("{} started ({:?} per tick)", THREAD_NAME, interval);
                while running.load(Ordering::Acquire) {
                    let start = Instant::now();
                    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| sim.update_tick())) {
                        log::error!(
                            "{} {} crashed in thread \"{}\": {}",
                            GAME_NAME,
                            GAME_VERSION,
                            thread::current().name().unwrap_or(THREAD_NAME),
                            panic_message(payload.as_ref())
                        );
                        faulted.store(true, Ordering::Release);
                        running.store(false, Ordering::Release);
                        break;
                    }
                    let elapsed = start.elapsed();
                    if elapsed > interval {
                        log::debug!("Tick overran by {:?}", elapsed - interval);
                    }
                    thread::sleep(sleep_time(interval, elapsed));
                }
                log::info!("{} stopped", THREAD_NAME);
            })?
        };

        Ok(SchedulerHandle {
            running,
            faulted,
            thread: Some(thread),
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// Control over a running ticking thread
#[derive(Debug)]
pub struct SchedulerHandle {
    running: Arc<AtomicBool>,
    faulted: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl SchedulerHandle {
    /// Ask the loop to exit; the tick in flight still completes
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// The loop stopped because a tick panicked
    pub fn is_faulted(&self) -> bool {
        self.faulted.load(Ordering::Acquire)
    }

    /// Stop and wait for the thread to exit
    pub fn join(mut self) -> bool {
        self.stop();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
        !self.is_faulted()
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
