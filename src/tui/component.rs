use ratatui::Frame;
use ratatui::layout::Rect;

/// A piece of the profile screen that draws itself into a `Rect`.
///
/// Props are struct fields set by the parent before rendering. `render`
/// takes `&mut self` so stateful widgets (list selection) can update
/// their presentation state during the pass.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// A component that consumes terminal events.
pub trait EventHandler {
    /// The higher-level event this component emits.
    type Event;

    /// Handle a `TuiEvent`, optionally emitting a component event.
    fn handle_event(&mut self, event: &super::event::TuiEvent) -> Option<Self::Event>;
}
