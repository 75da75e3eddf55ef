/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. The scene is drawn in world units onto a pixel canvas. Each
///      terminal cell holds two pixels stacked vertically ('▀' with
///      fg = upper pixel, bg = lower pixel), so pixels come out roughly
///      square and the 800×600 field keeps its aspect ratio.
///   2. Pixels are copied into the `front` cell buffer, text (HUD,
///      banners, message, help) is written over them.
///   3. `front` is compared with `back` (previous frame) and only changed
///      cells are emitted, batched with `queue!` and flushed once.
///   4. Swap front/back.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::physics::{FIELD_H, FIELD_W};
use crate::domain::rect::Rect;
use crate::sim::world::{Phase, WorldState};
use crate::ui::scene::{self, Canvas};

pub const TITLE: &str = "Kahina et l'Oracle Oublié";

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit background for everything outside the play field.
    const BASE_BG: Color = Color::Rgb { r: 12, g: 12, b: 22 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Never produced by composing; forces a repaint of every cell.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    const HALF_BLOCK: char = '▀';
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// One char per column; clipped at the right edge.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell { ch, fg, bg });
        }
    }

    fn put_str_centered(&mut self, y: usize, s: &str, fg: Color, bg: Color) {
        let len = s.chars().count();
        let x = self.width.saturating_sub(len) / 2;
        self.put_str(x, y, s, fg, bg);
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell { ch: ' ', fg: Color::White, bg });
        }
    }
}

// ── Viewport: world units → canvas pixels ──

/// Uniform scale that fits the whole field into `pw × ph` pixels,
/// centered on both axes.
#[derive(Clone, Copy, PartialEq, Debug)]
struct Viewport {
    scale: f32,
    ox: f32,
    oy: f32,
    pw: usize,
    ph: usize,
}

impl Viewport {
    fn fit(pw: usize, ph: usize) -> Self {
        let scale = (pw as f32 / FIELD_W).min(ph as f32 / FIELD_H);
        Viewport {
            scale,
            ox: (pw as f32 - FIELD_W * scale) / 2.0,
            oy: (ph as f32 - FIELD_H * scale) / 2.0,
            pw,
            ph,
        }
    }

    /// Pixel range `[start, end)` covered by a world interval, clipped to
    /// `0..limit`. A non-empty interval always covers at least one pixel
    /// so thin platforms never vanish at small scales.
    fn span(&self, start: f32, len: f32, offset: f32, limit: usize) -> Option<(usize, usize)> {
        let a = (offset + start * self.scale).round();
        let mut b = (offset + (start + len) * self.scale).round();
        if b <= a { b = a + 1.0; }
        let a = a.max(0.0);
        let b = b.min(limit as f32);
        if b <= a { return None; }
        Some((a as usize, b as usize))
    }

    fn x_span(&self, r: &Rect) -> Option<(usize, usize)> {
        self.span(r.x, r.w, self.ox, self.pw)
    }

    fn y_span(&self, r: &Rect) -> Option<(usize, usize)> {
        self.span(r.y, r.h, self.oy, self.ph)
    }
}

// ── PixelCanvas ──

struct PixelCanvas {
    vp: Viewport,
    pixels: Vec<Color>,
}

impl PixelCanvas {
    fn new() -> Self {
        PixelCanvas { vp: Viewport::fit(0, 0), pixels: vec![] }
    }

    fn reset(&mut self, vp: Viewport) {
        self.vp = vp;
        self.pixels.clear();
        self.pixels.resize(vp.pw * vp.ph, Cell::BASE_BG);
    }

    fn set(&mut self, x: usize, y: usize, c: Color) {
        if x < self.vp.pw && y < self.vp.ph {
            self.pixels[y * self.vp.pw + x] = c;
        }
    }

    fn get(&self, x: usize, y: usize) -> Color {
        if x < self.vp.pw && y < self.vp.ph {
            self.pixels[y * self.vp.pw + x]
        } else {
            Cell::BASE_BG
        }
    }

    /// Darken every pixel, as if a black layer of opacity `alpha/255`
    /// were laid on top.
    fn dim(&mut self, alpha: u8) {
        for p in &mut self.pixels {
            *p = darken(*p, alpha);
        }
    }
}

fn darken(c: Color, alpha: u8) -> Color {
    match c {
        Color::Rgb { r, g, b } => {
            let keep = 255 - alpha as u16;
            let f = |v: u8| (v as u16 * keep / 255) as u8;
            Color::Rgb { r: f(r), g: f(g), b: f(b) }
        }
        other => other,
    }
}

impl Canvas for PixelCanvas {
    fn fill_rect(&mut self, r: Rect, color: Color) {
        let (Some((x0, x1)), Some((y0, y1))) = (self.vp.x_span(&r), self.vp.y_span(&r)) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                self.set(x, y, color);
            }
        }
    }

    fn outline_rect(&mut self, r: Rect, color: Color) {
        let (Some((x0, x1)), Some((y0, y1))) = (self.vp.x_span(&r), self.vp.y_span(&r)) else {
            return;
        };
        for x in x0..x1 {
            self.set(x, y0, color);
            self.set(x, y1 - 1, color);
        }
        for y in y0..y1 {
            self.set(x0, y, color);
            self.set(x1 - 1, y, color);
        }
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color) {
        let vp = self.vp;
        let px = vp.ox + cx * vp.scale;
        let py = vp.oy + cy * vp.scale;
        let pr = (radius * vp.scale).max(0.5);
        let x0 = (px - pr).floor().max(0.0) as usize;
        let y0 = (py - pr).floor().max(0.0) as usize;
        let x1 = ((px + pr).ceil().max(0.0) as usize).min(vp.pw);
        let y1 = ((py + pr).ceil().max(0.0) as usize).min(vp.ph);
        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f32 + 0.5 - px;
                let dy = y as f32 + 0.5 - py;
                if dx * dx + dy * dy <= pr * pr {
                    self.set(x, y, color);
                }
            }
        }
    }
}

// ── HUD helpers ──

/// `width`-cell gauge, filled proportionally to `fraction` (0.0–1.0).
fn gauge(fraction: f32, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f32).round() as usize).min(width);
    let mut s = String::with_capacity(width * 3);
    for i in 0..width {
        s.push(if i < filled { '█' } else { '░' });
    }
    s
}

fn vision_label(world: &WorldState) -> (String, Color) {
    let v = &world.vision;
    if v.is_ready() {
        return ("Vision: READY".to_string(), Color::White);
    }
    if v.active {
        (
            format!("Vision: ACTIVE   {}", gauge(v.duration_fraction(), 10)),
            Color::Rgb { r: 80, g: 160, b: 240 },
        )
    } else {
        (
            format!("Vision: RECHARGE {}", gauge(1.0 - v.cooldown_fraction(), 10)),
            Color::DarkGrey,
        )
    }
}

// ── Renderer ──

const HUD_ROW: usize = 0;
const FIELD_ROW: usize = 1;
/// HUD + message bar + help bar
const RESERVED_ROWS: usize = 3;
/// Opacity of the end-of-game shade, out of 255.
const BANNER_SHADE: u8 = 180;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const TEXT: Color = Color::Rgb { r: 255, g: 255, b: 255 };
const WIN_TEXT: Color = Color::Rgb { r: 255, g: 215, b: 0 };
const LOSE_TEXT: Color = Color::Rgb { r: 255, g: 50, b: 50 };

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    canvas: PixelCanvas,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    keyboard_enhanced: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(32768, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            canvas: PixelCanvas::new(),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            keyboard_enhanced: false,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        // Release events make held keys exact; without them the input
        // layer falls back to a hold timeout.
        self.keyboard_enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if self.keyboard_enhanced {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        log::debug!("keyboard enhancement: {}", self.keyboard_enhanced);

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.resize(tw as usize, th as usize);
        Ok(())
    }

    /// Whether the terminal reports key releases.
    pub fn keyboard_enhanced(&self) -> bool {
        self.keyboard_enhanced
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.keyboard_enhanced {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        // Force full repaint: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);
    }

    pub fn render(&mut self, world: &WorldState, elapsed_ms: u64) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.resize(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Phase change → clean transition
        if self.last_phase != Some(world.phase) {
            self.back.cells.fill(Cell::INVALID);
            self.last_phase = Some(world.phase);
        }

        self.front.clear();
        let field_rows = self.compose_field(world, elapsed_ms);
        self.compose_hud(world);
        if world.phase.is_terminal() {
            self.compose_banner(world, field_rows);
        }
        self.compose_bottom_bars(world, field_rows);
        if world.paused {
            self.compose_pause_overlay(field_rows);
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        // Cursor position after the last printed cell, if known.
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    /// Draw the play field; returns how many terminal rows it uses.
    fn compose_field(&mut self, world: &WorldState, elapsed_ms: u64) -> usize {
        let field_rows = self.term_h.saturating_sub(RESERVED_ROWS).max(1);
        self.canvas.reset(Viewport::fit(self.term_w, field_rows * 2));

        scene::draw_world(&mut self.canvas, world, elapsed_ms);
        if world.phase.is_terminal() {
            self.canvas.dim(BANNER_SHADE);
        }

        for row in 0..field_rows {
            for col in 0..self.term_w {
                let cell = Cell {
                    ch: Cell::HALF_BLOCK,
                    fg: self.canvas.get(col, row * 2),
                    bg: self.canvas.get(col, row * 2 + 1),
                };
                self.front.set(col, FIELD_ROW + row, cell);
            }
        }
        field_rows
    }

    fn compose_hud(&mut self, world: &WorldState) {
        self.front.fill_row(HUD_ROW, HUD_BG);
        let title = format!(" {TITLE}  │ ");
        self.front.put_str(0, HUD_ROW, &title, WIN_TEXT, HUD_BG);

        let (label, color) = vision_label(world);
        let x = title.chars().count();
        self.front.put_str(x, HUD_ROW, &label, color, HUD_BG);

        let attempt = format!("Essai {} ", world.attempt);
        let ax = self.term_w.saturating_sub(attempt.chars().count());
        self.front.put_str(ax, HUD_ROW, &attempt, TEXT, HUD_BG);
    }

    fn compose_banner(&mut self, world: &WorldState, field_rows: usize) {
        let (headline, color) = match world.phase {
            Phase::Won => ("Félicitations Kahina ! L'Oracle est retrouvé !", WIN_TEXT),
            Phase::Lost => ("Kahina a échoué...", LOSE_TEXT),
            Phase::Playing => return,
        };
        let shade = darken(scene::BG_NORMAL, BANNER_SHADE);
        let mid = FIELD_ROW + field_rows / 2;
        self.front.put_str_centered(mid.saturating_sub(2), &format!("  {headline}  "), color, shade);
        self.front.put_str_centered(mid + 1, "  Appuyez sur R pour recommencer  ", TEXT, shade);
    }

    fn compose_bottom_bars(&mut self, world: &WorldState, field_rows: usize) {
        let msg_row = FIELD_ROW + field_rows;
        if !world.message.is_empty() && msg_row < self.front.height {
            let bar = Color::Rgb { r: 200, g: 180, b: 50 };
            self.front.fill_row(msg_row, bar);
            self.front.put_str(0, msg_row, &format!(" ◈ {} ", world.message), Color::Black, bar);
        }

        let help_row = msg_row + 1;
        if help_row < self.front.height {
            let help = " ←/→ A/D: Move  Space/↑/W: Jump  V: Vision  R: Recommencer  P: Pause  Esc/Q: Quit";
            self.front.put_str(0, help_row, help, Color::DarkGrey, Cell::BASE_BG);
        }
    }

    fn compose_pause_overlay(&mut self, field_rows: usize) {
        let dim = Color::Rgb { r: 40, g: 40, b: 40 };
        let hdr = Color::Rgb { r: 255, g: 220, b: 50 };
        let key_c = Color::Rgb { r: 100, g: 200, b: 255 };

        let lines: [(&str, Color); 5] = [
            ("╔══════════════════╗", hdr),
            ("║      PAUSED      ║", hdr),
            ("╚══════════════════╝", hdr),
            ("  P    Resume       ", key_c),
            ("  Esc  Quit         ", key_c),
        ];
        let top = FIELD_ROW + field_rows.saturating_sub(lines.len()) / 2;
        for (i, (text, color)) in lines.iter().enumerate() {
            self.front.put_str_centered(top + i, text, *color, dim);
        }
    }
}
