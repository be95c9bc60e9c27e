//! Widget-side UI state: visibility, launcher attention, and per-entry
//! overlay state.
//!
//! Visibility is a four-state machine driven by toggle events and a tick.
//! Closing is delayed to match the close animation; the delayed effect is
//! applied by [`UiStateController::tick`] only while the machine is still
//! `Closing`, so a reopen before the delay elapses structurally cancels the
//! pending hide. There is no detached timer to race against.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::display::PreparedPlot;
use crate::transcript::EntryId;

/// Delay between the close toggle and the widget actually hiding, matching
/// the fade-out animation.
pub const CLOSE_DELAY: Duration = Duration::from_millis(300);

/// Widget openness, independent of the connection state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WidgetVisibility {
    Hidden,
    /// Transient mount frame; promoted to `Visible` on the next tick.
    Opening,
    Visible,
    /// Fade-out running; hides when the close delay elapses.
    Closing,
}

/// A mounted fullscreen chart overlay: which entry it belongs to and the
/// full-size plot prepared for it. Dropped whole on close.
#[derive(Debug)]
pub struct ChartOverlay {
    pub entry: EntryId,
    pub plot: PreparedPlot,
}

/// Per-widget-instance UI state controller.
#[derive(Debug)]
pub struct UiStateController {
    visibility: WidgetVisibility,
    close_deadline: Option<Instant>,
    close_delay: Duration,
    launcher_attention: bool,
    awaiting_reply: bool,
    overlay: Option<ChartOverlay>,
    expanded_details: HashSet<EntryId>,
}

impl UiStateController {
    pub fn new() -> Self {
        Self::with_close_delay(CLOSE_DELAY)
    }

    pub fn with_close_delay(close_delay: Duration) -> Self {
        Self {
            visibility: WidgetVisibility::Hidden,
            close_deadline: None,
            close_delay,
            launcher_attention: false,
            awaiting_reply: false,
            overlay: None,
            expanded_details: HashSet::new(),
        }
    }

    // ── Visibility ────────────────────────────────────────────────────

    pub fn visibility(&self) -> WidgetVisibility {
        self.visibility
    }

    /// Whether the window occupies the screen (including while animating
    /// closed).
    pub fn is_shown(&self) -> bool {
        self.visibility != WidgetVisibility::Hidden
    }

    /// Toggle openness: opening is immediate, closing waits out the fade
    /// delay. Invoked by both the header control and the launcher.
    pub fn toggle(&mut self, now: Instant) {
        match self.visibility {
            WidgetVisibility::Hidden | WidgetVisibility::Closing => {
                self.visibility = WidgetVisibility::Opening;
                self.close_deadline = None;
            }
            WidgetVisibility::Opening | WidgetVisibility::Visible => {
                self.visibility = WidgetVisibility::Closing;
                self.close_deadline = Some(now + self.close_delay);
            }
        }
    }

    /// Launcher activation: flips the attention animation flag on every
    /// click (deliberately decoupled from visibility), then toggles.
    pub fn launcher_clicked(&mut self, now: Instant) {
        self.launcher_attention = !self.launcher_attention;
        self.toggle(now);
    }

    /// Advance time-driven transitions. The close deadline only applies
    /// while still `Closing`; a deadline left over from before a reopen is
    /// unreachable.
    pub fn tick(&mut self, now: Instant) {
        match self.visibility {
            WidgetVisibility::Opening => self.visibility = WidgetVisibility::Visible,
            WidgetVisibility::Closing => {
                if self.close_deadline.is_some_and(|deadline| now >= deadline) {
                    self.visibility = WidgetVisibility::Hidden;
                    self.close_deadline = None;
                }
            }
            _ => {}
        }
    }

    pub fn launcher_attention(&self) -> bool {
        self.launcher_attention
    }

    // ── Typing indicator ──────────────────────────────────────────────

    pub fn set_awaiting_reply(&mut self, awaiting: bool) {
        self.awaiting_reply = awaiting;
    }

    pub fn awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    // ── Fullscreen chart overlay ──────────────────────────────────────

    /// Mount the fullscreen overlay for a chart entry. An overlay already
    /// open for another chart is torn down first; each chart's own state
    /// stays independent.
    pub fn open_fullscreen(&mut self, entry: EntryId, plot: PreparedPlot) {
        self.overlay = Some(ChartOverlay { entry, plot });
    }

    /// Unmount the overlay, purging the full-size plot. Returns whether an
    /// overlay was open.
    pub fn close_fullscreen(&mut self) -> bool {
        self.overlay.take().is_some()
    }

    pub fn fullscreen(&self) -> Option<&ChartOverlay> {
        self.overlay.as_ref()
    }

    // ── RAG details panels ────────────────────────────────────────────

    /// Toggle the details panel of a RAG entry. Panels start collapsed.
    /// Returns the new expanded state.
    pub fn toggle_details(&mut self, entry: EntryId) -> bool {
        if !self.expanded_details.insert(entry) {
            self.expanded_details.remove(&entry);
            return false;
        }
        true
    }

    pub fn details_expanded(&self, entry: EntryId) -> bool {
        self.expanded_details.contains(&entry)
    }

    /// Forget all per-entry state. Used when the transcript is cleared.
    pub fn clear_entry_state(&mut self) {
        self.overlay = None;
        self.expanded_details.clear();
        self.awaiting_reply = false;
    }
}

impl Default for UiStateController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::PreparedPlot;

    fn plot() -> PreparedPlot {
        PreparedPlot {
            width: 90,
            height: 36,
            x_bounds: [0.0, 1.0],
            y_bounds: [0.0, 1.0],
            datasets: Vec::new(),
        }
    }

    #[test]
    fn open_is_immediate_close_is_delayed() {
        let mut ui = UiStateController::new();
        let t0 = Instant::now();
        assert_eq!(ui.visibility(), WidgetVisibility::Hidden);

        ui.toggle(t0);
        assert_eq!(ui.visibility(), WidgetVisibility::Opening);
        ui.tick(t0);
        assert_eq!(ui.visibility(), WidgetVisibility::Visible);

        ui.toggle(t0);
        assert_eq!(ui.visibility(), WidgetVisibility::Closing);
        ui.tick(t0 + CLOSE_DELAY / 2);
        assert_eq!(ui.visibility(), WidgetVisibility::Closing);
        ui.tick(t0 + CLOSE_DELAY);
        assert_eq!(ui.visibility(), WidgetVisibility::Hidden);
    }

    #[test]
    fn toggle_pair_before_delay_still_ends_hidden() {
        let mut ui = UiStateController::new();
        let t0 = Instant::now();
        ui.toggle(t0);
        ui.toggle(t0); // close before the open even ticked
        ui.tick(t0 + CLOSE_DELAY);
        assert_eq!(ui.visibility(), WidgetVisibility::Hidden);
    }

    #[test]
    fn stale_close_deadline_cannot_rehide_after_reopen() {
        let mut ui = UiStateController::new();
        let t0 = Instant::now();
        ui.toggle(t0); // open
        ui.tick(t0);
        ui.toggle(t0); // start closing, deadline at t0+300ms
        ui.toggle(t0 + Duration::from_millis(100)); // reopen mid-fade

        // Well past the original deadline: the widget must stay open.
        ui.tick(t0 + CLOSE_DELAY * 4);
        assert_eq!(ui.visibility(), WidgetVisibility::Visible);
    }

    #[test]
    fn launcher_attention_is_decoupled_from_visibility() {
        let mut ui = UiStateController::new();
        let t0 = Instant::now();
        assert!(!ui.launcher_attention());

        ui.launcher_clicked(t0);
        assert!(ui.launcher_attention());
        assert_eq!(ui.visibility(), WidgetVisibility::Opening);

        ui.launcher_clicked(t0);
        assert!(!ui.launcher_attention());
        assert_eq!(ui.visibility(), WidgetVisibility::Closing);
    }

    #[test]
    fn fullscreen_close_releases_the_plot() {
        let mut ui = UiStateController::new();
        ui.open_fullscreen(3, plot());
        assert_eq!(ui.fullscreen().unwrap().entry, 3);

        assert!(ui.close_fullscreen());
        assert!(ui.fullscreen().is_none(), "full-size plot must be purged");
        assert!(!ui.close_fullscreen(), "second close is a no-op");
    }

    #[test]
    fn opening_another_chart_replaces_the_overlay() {
        let mut ui = UiStateController::new();
        ui.open_fullscreen(1, plot());
        ui.open_fullscreen(2, plot());
        assert_eq!(ui.fullscreen().unwrap().entry, 2);
    }

    #[test]
    fn details_start_collapsed_and_toggle_per_entry() {
        let mut ui = UiStateController::new();
        assert!(!ui.details_expanded(7));
        assert!(ui.toggle_details(7));
        assert!(ui.details_expanded(7));
        assert!(!ui.details_expanded(8), "state is per entry");
        assert!(!ui.toggle_details(7));
        assert!(!ui.details_expanded(7));
    }

    #[test]
    fn clear_entry_state_resets_everything_but_visibility() {
        let mut ui = UiStateController::new();
        let t0 = Instant::now();
        ui.toggle(t0);
        ui.tick(t0);
        ui.open_fullscreen(1, plot());
        ui.toggle_details(2);
        ui.set_awaiting_reply(true);

        ui.clear_entry_state();
        assert!(ui.fullscreen().is_none());
        assert!(!ui.details_expanded(2));
        assert!(!ui.awaiting_reply());
        assert_eq!(ui.visibility(), WidgetVisibility::Visible);
    }
}
