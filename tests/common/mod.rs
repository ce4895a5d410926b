//! A scripted screen whose widgets come and go on a `ManualClock` timeline.

#![allow(dead_code)]

use std::cell::Cell;
use std::sync::Arc;
use std::time::Duration;

use waitron::conditions::{Locator, Resource};
use waitron::{ConditionError, ManualClock, Poller};

#[derive(Debug, Clone)]
pub struct Widget {
    pub selector: &'static str,
    pub appears_at: Duration,
    pub shown_at: Option<Duration>,
    pub enabled_at: Option<Duration>,
    pub removed_at: Option<Duration>,
    pub text: Vec<(Duration, &'static str)>,
    pub properties: Vec<(Duration, &'static str, &'static str)>,
}

impl Widget {
    /// Present, shown and enabled from time zero.
    pub fn new(selector: &'static str) -> Self {
        Self {
            selector,
            appears_at: Duration::ZERO,
            shown_at: Some(Duration::ZERO),
            enabled_at: Some(Duration::ZERO),
            removed_at: None,
            text: Vec::new(),
            properties: Vec::new(),
        }
    }

    pub fn appears_at(mut self, at: Duration) -> Self {
        self.appears_at = at;
        self
    }

    pub fn shown_at(mut self, at: Duration) -> Self {
        self.shown_at = Some(at);
        self
    }

    pub fn never_shown(mut self) -> Self {
        self.shown_at = None;
        self
    }

    pub fn enabled_at(mut self, at: Duration) -> Self {
        self.enabled_at = Some(at);
        self
    }

    pub fn removed_at(mut self, at: Duration) -> Self {
        self.removed_at = Some(at);
        self
    }

    pub fn text_at(mut self, at: Duration, text: &'static str) -> Self {
        self.text.push((at, text));
        self
    }

    pub fn property_at(mut self, at: Duration, name: &'static str, value: &'static str) -> Self {
        self.properties.push((at, name, value));
        self
    }

    fn exists(&self, now: Duration) -> bool {
        now >= self.appears_at && self.removed_at.map_or(true, |removed| now < removed)
    }

    fn reached(at: Option<Duration>, now: Duration) -> bool {
        at.map_or(false, |at| now >= at)
    }
}

#[derive(Clone)]
pub struct Screen {
    clock: ManualClock,
    widgets: Vec<Widget>,
    raise_on_miss: bool,
    pub lookups: Cell<u32>,
}

impl Screen {
    pub fn new(clock: &ManualClock, widgets: Vec<Widget>) -> Self {
        Self {
            clock: clock.clone(),
            widgets,
            raise_on_miss: false,
            lookups: Cell::new(0),
        }
    }

    /// Reports "no match" as a not-found failure instead of an empty vector.
    pub fn raising_on_miss(mut self) -> Self {
        self.raise_on_miss = true;
        self
    }
}

impl Locator for Screen {
    type Query = &'static str;
    type Handle = WidgetHandle;

    fn find_all(&self, query: &&'static str) -> Result<Vec<WidgetHandle>, ConditionError> {
        self.lookups.set(self.lookups.get() + 1);
        let now = self.clock.elapsed();
        let found: Vec<WidgetHandle> = self
            .widgets
            .iter()
            .filter(|w| w.selector == *query && w.exists(now))
            .map(|w| WidgetHandle {
                widget: w.clone(),
                clock: self.clock.clone(),
            })
            .collect();
        if found.is_empty() && self.raise_on_miss {
            return Err(ConditionError::not_found(format!(
                "no such element: {}",
                query
            )));
        }
        Ok(found)
    }
}

#[derive(Debug, Clone)]
pub struct WidgetHandle {
    pub widget: Widget,
    clock: ManualClock,
}

impl WidgetHandle {
    fn now(&self) -> Result<Duration, ConditionError> {
        let now = self.clock.elapsed();
        if self.widget.exists(now) {
            Ok(now)
        } else {
            Err(ConditionError::stale(format!(
                "{} is no longer attached",
                self.widget.selector
            )))
        }
    }
}

impl Resource for WidgetHandle {
    fn is_displayed(&self) -> Result<bool, ConditionError> {
        let now = self.now()?;
        Ok(Widget::reached(self.widget.shown_at, now))
    }

    fn is_enabled(&self) -> Result<bool, ConditionError> {
        let now = self.now()?;
        Ok(Widget::reached(self.widget.enabled_at, now))
    }

    fn property(&self, name: &str) -> Result<Option<String>, ConditionError> {
        let now = self.now()?;
        Ok(self
            .widget
            .properties
            .iter()
            .filter(|(at, key, _)| *key == name && now >= *at)
            .last()
            .map(|(_, _, value)| value.to_string()))
    }

    fn text(&self) -> Result<String, ConditionError> {
        let now = self.now()?;
        Ok(self
            .widget
            .text
            .iter()
            .filter(|(at, _)| now >= *at)
            .last()
            .map(|(_, text)| text.to_string())
            .unwrap_or_default())
    }
}

/// A poller on the given virtual clock.
pub fn poller_on(clock: &ManualClock, timeout: Duration, interval: Duration) -> Poller {
    Poller::new(timeout)
        .polling_every(interval)
        .with_clock(Arc::new(clock.clone()))
}

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}
