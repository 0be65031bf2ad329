//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use crf_model::{Column, Table};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Registry;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// One recorded tracing event.
#[derive(Debug, Clone)]
pub struct Captured {
    pub level: Level,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl Captured {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Clone, Default)]
struct CaptureLayer {
    events: Arc<Mutex<Vec<Captured>>>,
}

struct EventVisitor<'a>(&'a mut Captured);

impl Visit for EventVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.record(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record(field, format!("{value:?}"));
    }
}

impl EventVisitor<'_> {
    fn record(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.0.message = value;
        } else {
            self.0.fields.push((field.name().to_string(), value));
        }
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut captured = Captured {
            level: *event.metadata().level(),
            message: String::new(),
            fields: Vec::new(),
        };
        event.record(&mut EventVisitor(&mut captured));
        if let Ok(mut events) = self.events.lock() {
            events.push(captured);
        }
    }
}

/// Runs `f` with a subscriber that records every event.
pub fn capture<T>(f: impl FnOnce() -> T) -> (T, Vec<Captured>) {
    let layer = CaptureLayer::default();
    let events = Arc::clone(&layer.events);
    let subscriber = Registry::default().with(layer);
    let result = tracing::subscriber::with_default(subscriber, f);
    let events = events.lock().unwrap().clone();
    (result, events)
}

/// Events at `level` or more severe.
pub fn at_least(events: &[Captured], level: Level) -> Vec<&Captured> {
    events.iter().filter(|event| event.level <= level).collect()
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Builds a text table from `(name, values)` pairs.
pub fn text_table(columns: &[(&str, &[Option<&str>])]) -> Table {
    Table::new(
        columns
            .iter()
            .map(|(name, values)| Column::from_text(*name, values.iter().copied()))
            .collect(),
    )
    .unwrap()
}
