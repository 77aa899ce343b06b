//! Request sequencing and the hand-off to the display owner.
//!
//! Every submitted query runs as its own task and is tagged with a
//! sequence number. Results travel over a channel to whoever owns the
//! display, and [`StatusDisplay`] only accepts a result newer than the one it
//! already shows, so a slow earlier response never overwrites a later one.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tokio::sync::mpsc;
use tracing::debug;

use crate::{
    fetcher::WeatherFetcher,
    model::{Outcome, WeatherQuery},
    status::forecast_lines,
};

/// Status shown before the first lookup completes.
pub const IDLE_STATUS: &str = "Enter a city to check the weather";

/// A completed lookup on its way to the display owner.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub seq: u64,
    pub query: WeatherQuery,
    pub outcome: Outcome,
}

/// Submits lookups without waiting for them.
#[derive(Debug)]
pub struct Session {
    fetcher: Arc<dyn WeatherFetcher>,
    latest: AtomicU64,
    tx: mpsc::UnboundedSender<Delivery>,
}

/// Receiving end, owned by the display.
#[derive(Debug)]
pub struct Deliveries {
    rx: mpsc::UnboundedReceiver<Delivery>,
}

impl Session {
    pub fn new(fetcher: Arc<dyn WeatherFetcher>) -> (Self, Deliveries) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Self { fetcher, latest: AtomicU64::new(0), tx };
        (session, Deliveries { rx })
    }

    /// Spawn a lookup and return its sequence number. Must be called from
    /// within a tokio runtime.
    pub fn submit(&self, query: WeatherQuery) -> u64 {
        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let outcome = fetcher.fetch(&query).await;
            if tx.send(Delivery { seq, query, outcome }).is_err() {
                debug!(seq, "Display owner is gone, dropping result");
            }
        });

        seq
    }

    /// Sequence number of the most recently submitted lookup (0 if none).
    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }
}

impl Deliveries {
    /// Next completed lookup, in completion order. `None` once the session
    /// is dropped and every in-flight lookup has reported.
    pub async fn recv(&mut self) -> Option<Delivery> {
        self.rx.recv().await
    }
}

/// Display state. Only the holder of [`Deliveries`] should mutate it.
#[derive(Debug, Clone)]
pub struct StatusDisplay {
    shown_seq: u64,
    status: String,
    forecast: Vec<String>,
}

impl Default for StatusDisplay {
    fn default() -> Self {
        Self { shown_seq: 0, status: IDLE_STATUS.to_string(), forecast: Vec::new() }
    }
}

impl StatusDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `delivery` unless something newer is already on screen.
    pub fn apply(&mut self, delivery: &Delivery) -> bool {
        if delivery.seq <= self.shown_seq {
            debug!(
                seq = delivery.seq,
                shown = self.shown_seq,
                city = %delivery.query.city,
                "Discarding superseded result"
            );
            return false;
        }

        self.shown_seq = delivery.seq;
        self.status = delivery.outcome.status_line();
        self.forecast = match &delivery.outcome {
            Outcome::Success(result) => forecast_lines(result),
            Outcome::Failure { .. } => Vec::new(),
        };
        true
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn forecast(&self) -> &[String] {
        &self.forecast
    }

    pub fn shown_seq(&self) -> u64 {
        self.shown_seq
    }
}
