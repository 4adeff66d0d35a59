//! Snake scene rendering.
//!
//! Uses half-block pixel rendering. Each board cell maps to a colored pixel;
//! pairs of vertical pixels are packed into one terminal row using the `▀`
//! (upper half block) character with fg=top, bg=bottom colors.

use super::game_common::{
    create_game_layout, render_info_panel_frame, render_modal, render_status_bar, OverlayTone,
};
use crate::core::engine::{EngineState, Snapshot};
use crate::core::types::Difficulty;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

// ── Border characters ────────────────────────────────────────────────
const BORDER_H: char = '\u{2500}'; // ─
const BORDER_V: char = '\u{2502}'; // │
const BORDER_TL: char = '\u{250C}'; // ┌
const BORDER_TR: char = '\u{2510}'; // ┐
const BORDER_BL: char = '\u{2514}'; // └
const BORDER_BR: char = '\u{2518}'; // ┘
const HALF_TOP: char = '\u{2580}'; // ▀
const FULL_BLOCK: char = '\u{2588}'; // █

// ── Colors ───────────────────────────────────────────────────────────
const HEAD_COLOR: Color = Color::Rgb(100, 255, 100);
const BODY_BRIGHT: (f64, f64, f64) = (50.0, 220.0, 50.0);
const BODY_DIM: (f64, f64, f64) = (20.0, 80.0, 20.0);
const EMPTY_BG: Color = Color::Rgb(12, 12, 18);
const BORDER_COLOR: Color = Color::Rgb(80, 80, 80);
const INFO_PANEL_WIDTH: u16 = 24;

/// Render the whole screen from one engine snapshot.
pub fn render_snake_scene(frame: &mut Frame, area: Rect, snap: &Snapshot, muted: bool) {
    let min_rows = (snap.board_height as u16).div_ceil(2) + 2;
    let layout = create_game_layout(
        frame,
        area,
        " Snake ",
        Color::LightGreen,
        min_rows,
        INFO_PANEL_WIDTH,
    );

    render_play_field(frame, layout.content, snap);

    match snap.state {
        EngineState::Idle => render_start_menu(frame, layout.content, snap),
        EngineState::Paused => render_modal(
            frame,
            layout.content,
            OverlayTone::Neutral,
            "PAUSED",
            vec![Line::from(Span::styled(
                "[Space] Resume",
                Style::default().fg(Color::DarkGray),
            ))],
        ),
        EngineState::GameOver => render_game_over(frame, layout.content, snap),
        EngineState::Running => {}
    }

    render_status_bar_content(frame, layout.status_bar, snap);
    render_info_panel(frame, layout.info_panel, snap, muted);
}

/// Interpolated color for a body segment, bright near the head.
fn body_color(index: usize, snake_len: usize) -> Color {
    let t = index as f64 / (snake_len - 1).max(1) as f64;
    let r = (BODY_BRIGHT.0 * (1.0 - t) + BODY_DIM.0 * t) as u8;
    let g = (BODY_BRIGHT.1 * (1.0 - t) + BODY_DIM.1 * t) as u8;
    let b = (BODY_BRIGHT.2 * (1.0 - t) + BODY_DIM.2 * t) as u8;
    Color::Rgb(r, g, b)
}

/// Board as a grid of optional colors, indexed `[y][x]`.
fn pixel_grid(snap: &Snapshot) -> Vec<Vec<Option<Color>>> {
    let grid_w = snap.board_width.max(0) as usize;
    let grid_h = snap.board_height.max(0) as usize;
    let mut pixels = vec![vec![None; grid_w]; grid_h];
    let mut put = |x: i16, y: i16, color: Color| {
        if let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) {
            if x < grid_w && y < grid_h {
                pixels[y][x] = Some(color);
            }
        }
    };

    if let Some(food) = snap.food {
        // Pulses with the tick count
        let pulse = ((snap.tick_count % 20) as f64 / 20.0 * std::f64::consts::PI * 2.0).sin();
        let food_g = (80.0 + pulse * 30.0) as u8;
        let food_b = (40.0 + pulse * 20.0) as u8;
        put(food.x, food.y, Color::Rgb(255, food_g, food_b));
    }

    let snake_len = snap.snake.len();
    for (i, seg) in snap.snake.iter().enumerate() {
        let color = if i == 0 {
            HEAD_COLOR
        } else {
            body_color(i, snake_len)
        };
        put(seg.x, seg.y, color);
    }
    pixels
}

fn border_span(s: String) -> Span<'static> {
    Span::styled(s, Style::default().fg(BORDER_COLOR))
}

fn render_play_field(frame: &mut Frame, area: Rect, snap: &Snapshot) {
    if area.height < 3 || area.width < 5 {
        return;
    }

    let pixels = pixel_grid(snap);
    let grid_w = snap.board_width.max(0) as usize;
    let grid_h = pixels.len();

    let content_rows = grid_h.div_ceil(2);
    let render_w = ((grid_w + 2) as u16).min(area.width);
    let inner_w = render_w as usize - 2;

    let x_off = area.x + (area.width.saturating_sub(render_w)) / 2;
    let y_off = area.y;

    // Top border with score
    {
        let score_val = snap.score.to_string();
        let label = "Score: ";
        let score_full_len = label.len() + score_val.len();
        let pad_before = inner_w.saturating_sub(score_full_len + 1);
        let pad_after = inner_w.saturating_sub(pad_before + score_full_len);

        let mut spans: Vec<Span> = vec![border_span(BORDER_TL.to_string())];
        if pad_before > 0 {
            spans.push(border_span(std::iter::repeat(BORDER_H).take(pad_before).collect()));
        }
        spans.push(Span::styled(label, Style::default().fg(BORDER_COLOR)));
        spans.push(Span::styled(score_val, Style::default().fg(Color::White)));
        if pad_after > 0 {
            spans.push(border_span(std::iter::repeat(BORDER_H).take(pad_after).collect()));
        }
        spans.push(border_span(BORDER_TR.to_string()));

        let line = Paragraph::new(Line::from(spans));
        frame.render_widget(line, Rect::new(x_off, y_off, render_w, 1));
    }

    let empty_row: Vec<Option<Color>> = vec![None; grid_w];
    for term_row in 0..content_rows {
        let top_gy = term_row * 2;
        let bot_gy = term_row * 2 + 1;
        let top_row = pixels.get(top_gy).unwrap_or(&empty_row);
        let bot_row = pixels.get(bot_gy).unwrap_or(&empty_row);

        let mut spans: Vec<Span> = vec![border_span(BORDER_V.to_string())];

        // Batch consecutive cells with the same style
        let mut cur_fg = Color::Reset;
        let mut cur_bg = Color::Reset;
        let mut cur_text = String::new();

        for (&top_c, &bot_c) in top_row.iter().zip(bot_row.iter()).take(inner_w) {
            let fg = top_c.unwrap_or(EMPTY_BG);
            let bg = bot_c.unwrap_or(EMPTY_BG);

            if fg != cur_fg || bg != cur_bg {
                if !cur_text.is_empty() {
                    spans.push(Span::styled(
                        std::mem::take(&mut cur_text),
                        Style::default().fg(cur_fg).bg(cur_bg),
                    ));
                }
                cur_fg = fg;
                cur_bg = bg;
            }
            cur_text.push(HALF_TOP);
        }
        if !cur_text.is_empty() {
            spans.push(Span::styled(
                cur_text,
                Style::default().fg(cur_fg).bg(cur_bg),
            ));
        }

        spans.push(border_span(BORDER_V.to_string()));

        let row_y = y_off + 1 + term_row as u16;
        if row_y < area.y + area.height {
            let line = Paragraph::new(Line::from(spans));
            frame.render_widget(line, Rect::new(x_off, row_y, render_w, 1));
        }
    }

    let bot_y = y_off + 1 + content_rows as u16;
    if bot_y < area.y + area.height {
        let mut s = String::new();
        s.push(BORDER_BL);
        s.extend(std::iter::repeat(BORDER_H).take(inner_w));
        s.push(BORDER_BR);
        let line = Paragraph::new(Line::from(border_span(s)));
        frame.render_widget(line, Rect::new(x_off, bot_y, render_w, 1));
    }
}

/// Difficulty picker with the best score for each level.
fn render_start_menu(frame: &mut Frame, area: Rect, snap: &Snapshot) {
    let mut body: Vec<Line> = snap
        .high_scores
        .entries()
        .into_iter()
        .map(|(difficulty, best)| difficulty_line(difficulty, best, snap.selected_difficulty))
        .collect();
    body.push(Line::from(""));
    body.push(Line::from(Span::styled(
        "[Enter] Start",
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    )));

    render_modal(frame, area, OverlayTone::Neutral, "SNAKE", body);
}

fn difficulty_line(difficulty: Difficulty, best: u32, selected: Difficulty) -> Line<'static> {
    let is_selected = difficulty == selected;
    let marker = if is_selected { "> " } else { "  " };
    let style = if is_selected {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Line::from(vec![
        Span::styled(
            format!("{}[{}] {:<7}", marker, difficulty.index() + 1, difficulty.name()),
            style,
        ),
        Span::styled(format!(" best {:>4}", best), style),
    ])
}

fn render_game_over(frame: &mut Frame, area: Rect, snap: &Snapshot) {
    let Some(run) = snap.last_run else {
        return;
    };

    let (tone, title) = if run.new_record {
        (OverlayTone::Record, "NEW RECORD!")
    } else {
        (OverlayTone::Loss, "GAME OVER")
    };
    let best = snap.high_scores.get(run.difficulty);

    let body = vec![
        Line::from(Span::styled(
            format!("The snake {}.", run.reason.describe()),
            Style::default().fg(Color::White),
        )),
        Line::from(Span::styled(
            format!("Score {}  ·  Best {} ({})", run.score, best, run.difficulty.name()),
            Style::default().fg(Color::Cyan),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "[Enter] Play again  [R] Menu",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    render_modal(frame, area, tone, title, body);
}

fn render_status_bar_content(frame: &mut Frame, area: Rect, snap: &Snapshot) {
    match snap.state {
        EngineState::Idle => render_status_bar(
            frame,
            area,
            "Ready",
            Color::LightGreen,
            &[("[Enter]", "Start"), ("[1-3]", "Difficulty"), ("[Q]", "Quit")],
        ),
        EngineState::Running => render_status_bar(
            frame,
            area,
            "Slither!",
            Color::Green,
            &[("[Arrows]", "Move"), ("[Space]", "Pause"), ("[Q]", "Quit")],
        ),
        EngineState::Paused => render_status_bar(
            frame,
            area,
            "Paused",
            Color::Yellow,
            &[("[Space]", "Resume"), ("[Q]", "Quit")],
        ),
        EngineState::GameOver => render_status_bar(
            frame,
            area,
            "Game over",
            Color::Red,
            &[("[Enter]", "Again"), ("[R]", "Menu"), ("[Q]", "Quit")],
        ),
    }
}

fn label_value(label: &'static str, value: String, value_style: Style) -> Line<'static> {
    Line::from(vec![
        Span::styled(label, Style::default().fg(Color::DarkGray)),
        Span::styled(value, value_style),
    ])
}

fn render_info_panel(frame: &mut Frame, area: Rect, snap: &Snapshot, muted: bool) {
    let inner = render_info_panel_frame(frame, area);
    let white = Style::default().fg(Color::White);

    let lines: Vec<Line> = vec![
        label_value(
            "Difficulty: ",
            snap.difficulty.name().to_string(),
            Style::default().fg(Color::Cyan),
        ),
        label_value(
            "Score: ",
            snap.score.to_string(),
            white.add_modifier(Modifier::BOLD),
        ),
        label_value(
            "Best: ",
            snap.high_scores.get(snap.difficulty).to_string(),
            white,
        ),
        Line::from(""),
        label_value(
            "Grid: ",
            format!("{}x{}", snap.board_width, snap.board_height),
            white,
        ),
        label_value("Speed: ", format!("{}ms", snap.speed_ms), white),
        label_value("Length: ", snap.snake.len().to_string(), white),
        label_value(
            "Sound: ",
            if muted { "off [M]" } else { "on [M]" }.to_string(),
            white,
        ),
        Line::from(""),
        Line::from(Span::styled(
            "Legend:",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(format!(" {FULL_BLOCK} "), Style::default().fg(HEAD_COLOR)),
            Span::styled("Head", Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(vec![
            Span::styled(
                format!(" {FULL_BLOCK} "),
                Style::default().fg(body_color(0, 2)),
            ),
            Span::styled("Body", Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(vec![
            Span::styled(
                format!(" {FULL_BLOCK} "),
                Style::default().fg(Color::Rgb(255, 80, 40)),
            ),
            Span::styled("Food", Style::default().fg(Color::DarkGray)),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines), inner);
}
