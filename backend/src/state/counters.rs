use std::fmt;

use chrono::{DateTime, Local};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::state::guarded::Guarded;

/// Content categories a view can land on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Content {
    Sports,
    Entertainment,
    Business,
    Education,
}

impl Content {
    pub const ALL: [Content; 4] = [
        Content::Sports,
        Content::Entertainment,
        Content::Business,
        Content::Education,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Content::Sports => "sports",
            Content::Entertainment => "entertainment",
            Content::Business => "business",
            Content::Education => "education",
        }
    }

    /// Uniform pick over [`Content::ALL`].
    pub fn random<R: Rng>(rng: &mut R) -> Content {
        Content::ALL[rng.random_range(0..Content::ALL.len())]
    }
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The category chosen by the latest view and when it was chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    pub content: Content,
    pub at: DateTime<Local>,
}

/// Copy of the counters taken at the moment of a view event.
///
/// This is also the on-disk shape of one snapshot entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub view: u64,
    pub click: u64,
    pub content_selected: Content,
    pub time_selected: DateTime<Local>,
}

/// Consistent read of the counters. `selection` is `None` until the first view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct CounterSnapshot {
    pub view: u64,
    pub click: u64,
    pub selection: Option<Selection>,
}

#[derive(Default)]
struct Counters {
    view: u64,
    click: u64,
    selection: Option<Selection>,
}

impl Counters {
    fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            view: self.view,
            click: self.click,
            selection: self.selection,
        }
    }
}

/// Cumulative view/click counters plus the most recent selection.
///
/// Every operation runs as a single critical section: a view picks its
/// category, stamps the time and bumps `view` under one lock, so a concurrent
/// click or snapshot never sees a half-applied view.
#[derive(Default)]
pub struct CounterState {
    inner: Guarded<Counters>,
}

impl CounterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one view with a uniformly random category.
    pub fn record_view(&self) -> EventRecord {
        self.inner.update(|c| {
            let content = Content::random(&mut rand::rng());
            apply_view(c, content)
        })
    }

    /// Records one view with a caller-chosen category.
    pub fn record_view_of(&self, content: Content) -> EventRecord {
        self.inner.update(|c| apply_view(c, content))
    }

    /// Bumps `click`. Clicks attach to the aggregate, not to a specific view.
    pub fn record_click(&self) {
        self.inner.update(|c| c.click += 1);
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        self.inner.read(Counters::snapshot)
    }
}

fn apply_view(c: &mut Counters, content: Content) -> EventRecord {
    let at = crate::time::now();
    c.selection = Some(Selection { content, at });
    c.view += 1;

    EventRecord {
        view: c.view,
        click: c.click,
        content_selected: content,
        time_selected: at,
    }
}
