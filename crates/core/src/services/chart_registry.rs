use std::collections::HashMap;

use crate::models::change::RowKey;
use crate::models::chart::ChartOption;

/// A live chart instance owned by the rendering side.
pub trait ChartHandle {
    /// Release the rendering resources. Called exactly once per handle.
    fn dispose(&mut self);

    /// Re-layout after the container size changed.
    fn resize(&mut self) {}
}

/// Where charts get mounted (a DOM container, a window, a file...).
pub trait ChartSurface {
    type Handle: ChartHandle;

    /// Render `option` into the container for `key`.
    /// Returns `None` when no container exists for that key.
    fn mount(&mut self, key: &RowKey, option: &ChartOption) -> Option<Self::Handle>;
}

/// Live chart handles keyed by row.
///
/// Owned by the view that displays the rows. Replacing a handle disposes
/// the previous one first, and dropping the registry disposes everything
/// still live.
pub struct ChartRegistry<H: ChartHandle> {
    charts: HashMap<RowKey, H>,
}

impl<H: ChartHandle> ChartRegistry<H> {
    pub fn new() -> Self {
        Self {
            charts: HashMap::new(),
        }
    }

    /// Dispose the chart at `key`, if any, then store `handle` there.
    pub fn insert(&mut self, key: RowKey, handle: H) {
        self.dispose(&key);
        self.charts.insert(key, handle);
    }

    /// Dispose and forget the chart at `key`. Returns whether one existed.
    pub fn dispose(&mut self, key: &RowKey) -> bool {
        match self.charts.remove(key) {
            Some(mut old) => {
                old.dispose();
                true
            }
            None => false,
        }
    }

    pub fn dispose_all(&mut self) {
        for (_, mut chart) in self.charts.drain() {
            chart.dispose();
        }
    }

    pub fn resize_all(&mut self) {
        for chart in self.charts.values_mut() {
            chart.resize();
        }
    }

    pub fn contains(&self, key: &RowKey) -> bool {
        self.charts.contains_key(key)
    }

    pub fn get(&self, key: &RowKey) -> Option<&H> {
        self.charts.get(key)
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }
}

impl<H: ChartHandle> Default for ChartRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ChartHandle> Drop for ChartRegistry<H> {
    fn drop(&mut self) {
        self.dispose_all();
    }
}
