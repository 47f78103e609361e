//! Periodic tick driver.
//!
//! The engine exposes a pure `tick()` and owns no scheduling; the driver is
//! the repeating task that calls it. Each evaluation locks the shared
//! engine only for the duration of the tick - the lock is never held across
//! an await - and the sleep between ticks is recomputed from the engine, so
//! the first tick after a restart or resume uses the shortened
//! sub-second-remainder delay.

use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;

use super::clock::{Clock, TICK_INTERVAL};
use super::countdown::CountdownEngine;
use crate::events::Event;

/// Drives a shared [`CountdownEngine`] on the current tokio runtime.
///
/// After every evaluation the sink receives the expiry event, if one fired,
/// followed by a state snapshot.
pub struct TickDriver {
    handle: Option<JoinHandle<()>>,
}

impl TickDriver {
    pub fn spawn<C, F>(engine: Arc<Mutex<CountdownEngine<C>>>, mut sink: F) -> Self
    where
        C: Clock + Send + 'static,
        F: FnMut(Event) + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut delay = match engine.lock() {
                Ok(engine) => engine.next_tick_delay(),
                Err(_) => TICK_INTERVAL,
            };
            loop {
                tokio::time::sleep(delay).await;
                let (fired, snapshot) = {
                    let Ok(mut engine) = engine.lock() else {
                        return;
                    };
                    (engine.tick(), engine.snapshot())
                };
                if let Some(event) = fired {
                    sink(event);
                }
                sink(snapshot);
                // The sink may have re-primed the engine; pick up the
                // fresh alignment delay.
                delay = match engine.lock() {
                    Ok(engine) => engine.next_tick_delay(),
                    Err(_) => return,
                };
            }
        });
        Self {
            handle: Some(handle),
        }
    }

    /// Stop ticking. Idempotent; no further events reach the sink, and no
    /// spurious expiry fires.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for TickDriver {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::time::Duration;

    fn collecting_sink(events: Arc<Mutex<Vec<Event>>>) -> impl FnMut(Event) + Send + 'static {
        move |event| {
            if let Ok(mut events) = events.lock() {
                events.push(event);
            }
        }
    }

    fn expired_count(events: &Arc<Mutex<Vec<Event>>>) -> usize {
        events
            .lock()
            .map(|events| {
                events
                    .iter()
                    .filter(|e| matches!(e, Event::Expired { .. }))
                    .count()
            })
            .unwrap_or(0)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn fires_expiry_exactly_once() {
        let expiry = Utc::now() + chrono::Duration::milliseconds(1_200);
        let engine = Arc::new(Mutex::new(CountdownEngine::new(expiry, true)));
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut driver = TickDriver::spawn(Arc::clone(&engine), collecting_sink(events.clone()));

        // Generous deadline; the countdown itself is 1.2 s.
        for _ in 0..50 {
            if expired_count(&events) > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        // Let a few more ticks elapse to catch a double fire.
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        driver.stop();

        assert_eq!(expired_count(&events), 1);
        let engine = engine.lock().unwrap();
        assert!(!engine.is_running());
        assert_eq!(engine.remaining_ms(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn snapshots_flow_to_the_sink() {
        let expiry = Utc::now() + chrono::Duration::seconds(30);
        let engine = Arc::new(Mutex::new(CountdownEngine::new(expiry, true)));
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut driver = TickDriver::spawn(Arc::clone(&engine), collecting_sink(events.clone()));

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        driver.stop();

        let events = events.lock().unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::StateSnapshot { .. })));
        assert!(!events.iter().any(|e| matches!(e, Event::Expired { .. })));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn stop_is_idempotent_and_fires_nothing_further() {
        let expiry = Utc::now() + chrono::Duration::seconds(2);
        let engine = Arc::new(Mutex::new(CountdownEngine::new(expiry, true)));
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut driver = TickDriver::spawn(Arc::clone(&engine), collecting_sink(events.clone()));

        tokio::time::sleep(Duration::from_millis(200)).await;
        driver.stop();
        driver.stop();
        // An in-flight evaluation finishes at its next await; let it land.
        tokio::time::sleep(Duration::from_millis(100)).await;
        let seen = events.lock().unwrap().len();

        // The countdown would expire here if the driver were still alive.
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(events.lock().unwrap().len(), seen);
        assert_eq!(expired_count(&events), 0);
    }
}
