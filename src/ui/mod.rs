pub mod game_common;
pub mod snake_scene;

use crate::core::engine::Snapshot;
use ratatui::Frame;

/// Main UI drawing function.
pub fn draw_ui(frame: &mut Frame, snap: &Snapshot, muted: bool) {
    let size = frame.size();
    snake_scene::render_snake_scene(frame, size, snap, muted);
}
