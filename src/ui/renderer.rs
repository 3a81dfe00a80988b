/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Glyph)
///   2. Compare each glyph with `back` buffer (previous frame)
///   3. Only emit terminal commands for glyphs that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The board is drawn y-up: cell (0, 0) is the bottom-left interior cell,
/// and the outer wall ring (x or y of -1 / columns / rows) frames it.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use scavenger::domain::entity::PickupKind;
use scavenger::domain::grid::Cell;
use scavenger::domain::tile::Tile;
use scavenger::sim::game::Game;
use scavenger::sim::turn::TurnState;
use scavenger::sim::world::WorldState;

use super::effects::EffectState;

// ── Glyph: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Glyph {
    ch: [u8; 4],
    ch_len: u8,
    fg: Color,
    bg: Color,
    wide: bool,    // true = this char occupies 2 terminal columns
    cont: bool,    // true = continuation of previous wide char (skip render)
}

impl Glyph {
    /// Explicit dark background for all "empty" terminal cells, used for both
    /// `Clear(ClearType::All)` and every glyph so row gaps match.
    const BASE_BG: Color = Color::Rgb { r: 18, g: 12, b: 14 };

    const BLANK: Glyph = Glyph {
        ch: [b' ', 0, 0, 0],
        ch_len: 1,
        fg: Color::White,
        bg: Glyph::BASE_BG,
        wide: false,
        cont: false,
    };

    const WIDE_CONT: Glyph = Glyph {
        ch: [0; 4],
        ch_len: 0,
        fg: Color::White,
        bg: Glyph::BASE_BG,
        wide: false,
        cont: true,
    };

    /// Sentinel used to invalidate the back buffer so every position is diff'd.
    const INVALID: Glyph = Glyph {
        ch: [b'?', 0, 0, 0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
        wide: false,
        cont: false,
    };

    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        let mut g = Self::BLANK;
        g.ch_len = c.encode_utf8(&mut g.ch).len() as u8;
        g.fg = fg;
        g.bg = Self::norm_bg(bg);
        g
    }

    fn from_char_wide(c: char, bg: Color) -> Self {
        let mut g = Self::from_char(c, Color::White, bg);
        g.wide = true;
        g
    }

    fn as_str(&self) -> &str {
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or(" ")
    }
}

// ── FrameBuffer: a 2D grid of Glyphs ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Glyph>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Glyph::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Glyph::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Glyph::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, g: Glyph) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = g;
        }
    }

    fn get(&self, x: usize, y: usize) -> Glyph {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Glyph::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Glyph::from_char(ch, fg, bg));
        }
    }

    /// Write a string centred on row `y`.
    fn put_centered(&mut self, y: usize, s: &str, fg: Color, bg: Color) {
        let len = s.chars().count();
        let x = self.width.saturating_sub(len) / 2;
        self.put_str(x, y, s, fg, bg);
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Glyph::from_char(' ', Color::White, bg));
        }
    }
}

// ── Renderer ──

/// Each board cell is two terminal columns wide.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
const MAP_COL: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 40, g: 20, b: 24 };
const CARD_BG: Color = Color::Rgb { r: 0, g: 0, b: 0 };
const FLASH_BG: Color = Color::Rgb { r: 150, g: 40, b: 30 };

/// Interior wall shades, indexed by wall variant.
const WALL_SHADES: [(u8, u8, u8); 8] = [
    (150, 100, 60), (140, 95, 55), (160, 110, 70), (130, 90, 60),
    (145, 105, 65), (155, 95, 50), (135, 100, 70), (150, 90, 55),
];

/// Which full-screen layout is up. Switching layouts forces a full repaint.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Screen {
    DayCard,
    Board,
    GameOver,
}

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_screen: Option<Screen>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_screen: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Glyph::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Glyph::INVALID);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, game: &Game, effects: &EffectState) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Glyph::INVALID);
            queue!(self.writer, SetBackgroundColor(Glyph::BASE_BG), Clear(ClearType::All))?;
        }

        let screen = match game.state() {
            TurnState::LevelSetup => Screen::DayCard,
            TurnState::GameOver => Screen::GameOver,
            TurnState::PlayerTurn | TurnState::EnemyPhase => Screen::Board,
        };
        if self.last_screen != Some(screen) {
            self.back.cells.fill(Glyph::INVALID);
            queue!(self.writer, SetBackgroundColor(Glyph::BASE_BG), Clear(ClearType::All))?;
            self.last_screen = Some(screen);
        }

        self.front.clear();
        match screen {
            Screen::DayCard => self.compose_day_card(game.level()),
            Screen::GameOver => self.compose_game_over(game.level()),
            Screen::Board => self.compose_game(game.world(), effects),
        }
        if game.is_paused() {
            self.compose_pause_overlay();
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed glyphs ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Glyph::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors; ResetColor would fall back to the terminal default.
        queue!(self.writer, SetForegroundColor(Color::White), SetBackgroundColor(Glyph::BASE_BG))?;

        for y in 0..self.front.height {
            let mut x = 0;
            while x < self.front.width {
                let g = self.front.get(x, y);
                let prev = self.back.get(x, y);

                if g.cont {
                    if g != prev { need_move = true; }
                    x += 1;
                    continue;
                }

                let cont_changed = g.wide
                    && x + 1 < self.front.width
                    && self.front.get(x + 1, y) != self.back.get(x + 1, y);

                if g == prev && !cont_changed {
                    need_move = true;
                    x += 1;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if g.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(g.fg))?;
                    last_fg = g.fg;
                }
                if g.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(g.bg))?;
                    last_bg = g.bg;
                }

                queue!(self.writer, Print(g.as_str()))?;

                if g.wide {
                    last_x = x + 1;
                    x += 2;
                } else {
                    last_x = x;
                    x += 1;
                }
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_game(&mut self, w: &WorldState, fx: &EffectState) {
        // ── HUD row ──
        self.front.fill_row(HUD_ROW, HUD_BG);
        let hud = format!(" Day {:<3}  Food {:<4}", w.level, w.player.food);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);
        if let Some(msg) = fx.message() {
            let color = if msg.starts_with('-') {
                Color::Rgb { r: 255, g: 90, b: 80 }
            } else {
                Color::Rgb { r: 120, g: 255, b: 120 }
            };
            self.front.put_str(hud.chars().count() + 1, HUD_ROW, msg, color, HUD_BG);
        }

        // ── Board, top row first ──
        let cols = w.bounds.columns;
        let rows = w.bounds.rows;
        for y in (-1..=rows).rev() {
            let row = MAP_ROW + (rows - y) as usize;
            for x in -1..=cols {
                let col = MAP_COL + (x + 1) as usize * CELL_W;
                self.compose_cell(w, fx, Cell::new(x, y), col, row);
            }
        }

        // ── Help bar ──
        let help_row = MAP_ROW + rows as usize + 3;
        let help = " Arrows/WASD: Move   P: Pause   Esc/Q: Quit";
        self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
    }

    fn put_pair(&mut self, col: usize, row: usize, c: char, fg: Color, bg: Color) {
        self.front.set(col, row, Glyph::from_char(c, fg, bg));
        self.front.set(col + 1, row, Glyph::from_char(c, fg, bg));
    }

    fn put_wide(&mut self, col: usize, row: usize, c: char, bg: Color) {
        self.front.set(col, row, Glyph::from_char_wide(c, bg));
        self.front.set(col + 1, row, Glyph::WIDE_CONT);
    }

    fn compose_cell(&mut self, w: &WorldState, fx: &EffectState, cell: Cell, col: usize, row: usize) {
        let floor_bg = match w.tiles.get(cell) {
            Some(Tile::OuterWall(v)) => {
                let shade = 70 + v * 12;
                let fg = Color::Rgb { r: shade, g: shade / 2, b: shade / 3 };
                let bg = Color::Rgb { r: shade / 2, g: shade / 4, b: shade / 5 };
                self.put_pair(col, row, '█', fg, bg);
                return;
            }
            Some(Tile::Floor(v)) => {
                let shade = 28 + v * 3;
                Color::Rgb { r: shade + 6, g: shade, b: shade - 4 }
            }
            None => Glyph::BASE_BG,
        };
        let bg = if fx.is_flashing(cell) { FLASH_BG } else { floor_bg };

        // Actors draw at their rounded interpolated position.
        if w.player.body.pos.round() == cell {
            let bg = if fx.player_hurt.is_zero() { bg } else { FLASH_BG };
            self.put_wide(col, row, '🧑', bg);
            return;
        }
        if let Some(enemy) = w.live_enemies().find(|e| e.body.pos.round() == cell) {
            let sprite = if enemy.kind == 0 { '🧟' } else { '👹' };
            self.put_wide(col, row, sprite, bg);
            return;
        }

        if let Some(wall) = w.standing_walls().find(|wall| wall.cell == cell) {
            let (r, g, b) = WALL_SHADES[wall.variant as usize % WALL_SHADES.len()];
            let fg = Color::Rgb { r, g, b };
            let ch = if wall.damaged { '▒' } else { '▓' };
            self.put_pair(col, row, ch, fg, bg);
            return;
        }
        if let Some(pickup) = w.pickup_at(cell) {
            let sprite = match pickup.kind {
                PickupKind::Food => '🍎',
                PickupKind::Soda => '🥤',
            };
            self.put_wide(col, row, sprite, bg);
            return;
        }
        if w.exit == cell {
            self.put_wide(col, row, '🚪', bg);
            return;
        }

        let dot_fg = Color::Rgb { r: 70, g: 60, b: 55 };
        self.front.set(col, row, Glyph::from_char('·', dot_fg, bg));
        self.front.set(col + 1, row, Glyph::from_char(' ', dot_fg, bg));
    }

    // ── Full-screen cards ──

    fn fill_card(&mut self) {
        for y in 0..self.front.height {
            self.front.fill_row(y, CARD_BG);
        }
    }

    fn compose_day_card(&mut self, level: u32) {
        self.fill_card();
        let mid = self.front.height / 2;
        self.front.put_centered(mid, &format!("Day {level}"), Color::White, CARD_BG);
    }

    fn compose_game_over(&mut self, days: u32) {
        self.fill_card();
        let mid = self.front.height / 2;
        let text = format!("After {days} days, you starved.");
        self.front.put_centered(mid, &text, Color::White, CARD_BG);
        let dim = Color::Rgb { r: 120, g: 120, b: 120 };
        self.front.put_centered(mid + 2, "R / Enter: Try again   Esc: Quit", dim, CARD_BG);
    }

    fn compose_pause_overlay(&mut self) {
        let dim = Color::Rgb { r: 40, g: 40, b: 40 };
        let hdr = Color::Rgb { r: 255, g: 220, b: 50 };
        let key_c = Color::Rgb { r: 100, g: 200, b: 255 };

        let box_w = 24_usize.min(self.front.width);
        let box_h = 6_usize.min(self.front.height);
        let box_x = self.front.width.saturating_sub(box_w) / 2;
        let box_y = self.front.height.saturating_sub(box_h) / 2;

        for y in box_y..box_y + box_h {
            for x in box_x..box_x + box_w {
                self.front.set(x, y, Glyph::from_char(' ', Color::Reset, dim));
            }
        }
        self.front.put_str(box_x + 8, box_y + 1, "PAUSED", hdr, dim);
        self.front.put_str(box_x + 2, box_y + 3, "P    Resume", key_c, dim);
        self.front.put_str(box_x + 2, box_y + 4, "Esc  Quit", key_c, dim);
    }
}
