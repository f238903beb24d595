//! Growing visible window over the sorted, filtered sequence
//!
//! The window exposes a prefix of the result. It starts at
//! [`INITIAL_VISIBLE`] items, grows by [`GROW_STEP`] on each grow signal,
//! and goes back to the initial size whenever the query changes.

use jobtrack_common::config::WindowConfig;

/// Items visible after every new query
pub const INITIAL_VISIBLE: usize = 20;

/// Items added per grow signal
pub const GROW_STEP: usize = 20;

/// Monotonic visible-count state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleWindow {
    initial: usize,
    step: usize,
    visible: usize,
}

impl Default for VisibleWindow {
    fn default() -> Self {
        Self::with_sizes(INITIAL_VISIBLE, GROW_STEP)
    }
}

impl From<WindowConfig> for VisibleWindow {
    fn from(config: WindowConfig) -> Self {
        Self::with_sizes(config.initial, config.step)
    }
}

impl VisibleWindow {
    pub fn with_sizes(initial: usize, step: usize) -> Self {
        Self {
            initial,
            step,
            visible: initial,
        }
    }

    /// Current visible count
    pub fn visible(&self) -> usize {
        self.visible
    }

    /// Apply one grow signal
    pub fn grow(&mut self) {
        self.visible = self.visible.saturating_add(self.step);
    }

    /// Back to the initial size after a filter or sort change
    pub fn reset(&mut self) {
        self.visible = self.initial;
    }

    /// The visible prefix of `items`
    ///
    /// # Examples
    /// ```
    /// use jobtrack_engine::window::VisibleWindow;
    ///
    /// let items: Vec<u32> = (0..50).collect();
    /// let mut window = VisibleWindow::default();
    /// assert_eq!(window.slice(&items).len(), 20);
    ///
    /// window.grow();
    /// window.grow();
    /// assert_eq!(window.slice(&items).len(), 50); // capped at the total
    /// ```
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[..self.visible.min(items.len())]
    }

    /// Whether items remain beyond the window
    pub fn has_more(&self, total: usize) -> bool {
        self.visible < total
    }
}
