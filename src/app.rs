//! The terminal host: owns the screen, feeds input into the game, and draws its render frames.

use std::io::{self, Stdout, Write};
use std::time::{Duration, Instant};

use crossterm::event::{self, DisableFocusChange, EnableFocusChange, Event};
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue};
use tracing::{debug, info, trace, warn};

use crate::asset::{AssetCatalog, AssetKey, AssetProvider, Rgb, Sprite};
use crate::audio::{AudioBackend, Mute};
use crate::constants::LOOP_TIME;
use crate::formatter;
use crate::formatting::{format_count, format_run_time};
use crate::game::state::{GameStage, Phase};
use crate::game::Game;
use crate::input::commands::GameCommand;
use crate::input::Bindings;
use crate::platform;
use crate::platform::log_buffer::LogBuffer;
use crate::profiling::{FrameStage, FrameTimings};
use crate::render::{RenderFrame, Visual};

/// Frames between timing summaries in the log.
const TIMING_LOG_PERIOD: u64 = 60 * 30;

/// Any single stage slower than this gets called out.
const SLOW_STAGE: Duration = Duration::from_millis(4);

/// Terminal columns per grid cell.
const CELL_WIDTH: u16 = 2;

/// Audio output for the terminal host.
///
/// There is no mixer behind a terminal, so clips are only resolved against the bundled assets and
/// traced. A missing clip is reported once and then skipped.
pub struct TerminalAudio {
    catalog: AssetCatalog,
    missing: Vec<String>,
}

impl TerminalAudio {
    pub fn new() -> Self {
        Self {
            catalog: AssetCatalog::new(),
            missing: Vec::new(),
        }
    }

    fn resolve(&mut self, key: AssetKey) {
        if self.catalog.audio(&key).is_some() {
            trace!(category = %key.category, name = %key.name, "Audio cue");
        } else if !self.missing.contains(&key.name) {
            debug!(category = %key.category, name = %key.name, "Audio clip unavailable, skipping");
            self.missing.push(key.name);
        }
    }
}

impl Default for TerminalAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for TerminalAudio {
    fn play_sound(&mut self, name: &str, _volume: f32) {
        self.resolve(AssetKey::sound(name));
    }

    fn play_music(&mut self, name: &str) {
        self.resolve(AssetKey::music(name));
    }

    fn stop_music(&mut self) {}
}

/// Restores the terminal however the host exits.
struct TerminalGuard {
    log: LogBuffer,
}

impl TerminalGuard {
    fn enter(out: &mut Stdout, log: LogBuffer) -> io::Result<Self> {
        log.hold();
        terminal::enable_raw_mode()?;
        execute!(out, EnterAlternateScreen, EnableFocusChange, cursor::Hide, Clear(ClearType::All))?;
        Ok(Self { log })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut out = io::stdout();
        let _ = execute!(out, ResetColor, cursor::Show, DisableFocusChange, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        if let Err(e) = self.log.release_to(io::stderr()) {
            eprintln!("Failed to flush held logs: {e}");
        }
    }
}

pub struct App {
    pub game: Game,
    bindings: Bindings,
    catalog: AssetCatalog,
    timings: FrameTimings,
    out: Stdout,
    started: Instant,
    last_frame: Instant,
    focused: bool,
    frames: u64,
    _guard: TerminalGuard,
}

impl App {
    /// Takes over the terminal. Held logs are released when the app is dropped.
    pub fn new(game: Game, log: LogBuffer) -> io::Result<Self> {
        let mut out = io::stdout();
        let guard = TerminalGuard::enter(&mut out, log)?;
        let (columns, rows) = terminal::size()?;
        debug!(columns, rows, "Terminal ready");

        Ok(Self {
            game,
            bindings: Bindings::default(),
            catalog: AssetCatalog::new(),
            timings: FrameTimings::default(),
            out,
            started: Instant::now(),
            last_frame: Instant::now(),
            focused: true,
            frames: 0,
            _guard: guard,
        })
    }

    /// Runs frames until an exit is requested.
    pub fn run(&mut self) -> io::Result<()> {
        info!(loop_time = ?LOOP_TIME, "Starting game loop");
        while self.frame()? {}
        info!(frames = self.frames, "Exiting");
        Ok(())
    }

    /// One host frame. Returns `false` once the player asked to leave.
    fn frame(&mut self) -> io::Result<bool> {
        let start = Instant::now();

        let input_start = Instant::now();
        let keep_running = self.pump_input()?;
        self.timings.record(FrameStage::Input, input_start.elapsed());
        if !keep_running {
            return Ok(false);
        }

        let dt = self.last_frame.elapsed().as_secs_f32();
        self.last_frame = Instant::now();
        let now = self.started.elapsed().as_millis() as u64;
        let game = &mut self.game;
        self.timings.measure(FrameStage::Update, || game.update(dt, now));
        formatter::advance_tick();

        let game = &self.game;
        let frame = self.timings.measure(FrameStage::Render, || game.render());
        let present_start = Instant::now();
        self.draw(&frame)?;
        self.timings.record(FrameStage::Present, present_start.elapsed());

        let elapsed = start.elapsed();
        self.timings.record(FrameStage::Total, elapsed);
        if elapsed < LOOP_TIME {
            platform::sleep(LOOP_TIME - elapsed, self.focused);
        } else {
            let slow = self.timings.slow_stages(SLOW_STAGE);
            warn!(behind = ?(elapsed - LOOP_TIME), ?slow, "Game loop behind schedule");
        }

        self.frames += 1;
        if self.frames % TIMING_LOG_PERIOD == 0 {
            for line in self.timings.summary() {
                debug!("{line}");
            }
        }
        Ok(true)
    }

    fn pump_input(&mut self) -> io::Result<bool> {
        while event::poll(Duration::ZERO)? {
            let event = event::read()?;
            match event {
                Event::FocusGained => {
                    self.focused = true;
                    debug!("Terminal focused");
                }
                Event::FocusLost => {
                    self.focused = false;
                    debug!("Terminal unfocused");
                }
                Event::Resize(columns, rows) => {
                    debug!(columns, rows, "Terminal resized");
                    queue!(self.out, Clear(ClearType::All))?;
                }
                _ => {}
            }

            match self.bindings.command_for(&event) {
                Some(GameCommand::Exit) => {
                    info!("Exit requested");
                    return Ok(false);
                }
                Some(command) => {
                    trace!(?command, "Command");
                    self.game.handle_command(command);
                }
                None => {}
            }
        }
        Ok(true)
    }

    fn sprite_color(&self, sheet: &str) -> Rgb {
        let key = AssetKey::image(sheet);
        match self.catalog.image(&key) {
            Sprite::Fallback { color } => color,
            // Bitmaps cannot be shown here; the category color stands in for them.
            Sprite::Image(_) => AssetCatalog::fallback_color(&key),
        }
    }

    fn draw(&mut self, frame: &RenderFrame) -> io::Result<()> {
        let grid = *self.game.grid();
        let (width, height) = (grid.width() as usize, grid.height() as usize);
        let mut cells: Vec<Option<(&'static str, Rgb)>> = vec![None; width * height];

        for drawable in &frame.drawables {
            let cell = drawable.position.round().as_ivec2();
            if !grid.contains(cell) {
                continue;
            }
            let painted = match &drawable.visual {
                Visual::Sprite { sheet, .. } => (glyph(sheet), self.sprite_color(sheet)),
                Visual::Warning => ("!!", fade(Rgb(255, 60, 60), drawable.alpha)),
                Visual::Number(value) => (digit(*value), Rgb(255, 255, 255)),
            };
            cells[cell.y as usize * width + cell.x as usize] = Some(painted);
        }

        queue!(self.out, cursor::MoveTo(0, 0))?;
        for y in 0..height {
            for x in 0..width {
                let soft_row = frame.hud.phase == Phase::Collection && y as i32 == grid.soft_boundary_row;
                match cells[y * width + x] {
                    Some((text, color)) => queue!(self.out, SetForegroundColor(to_color(color)), Print(text))?,
                    None if soft_row => queue!(self.out, SetForegroundColor(Color::DarkGrey), Print("··"))?,
                    None => queue!(self.out, ResetColor, Print("  "))?,
                }
            }
            queue!(self.out, ResetColor, Print("│"), cursor::MoveToNextLine(1))?;
        }
        queue!(
            self.out,
            Print("─".repeat(width * CELL_WIDTH as usize)),
            Print("┘"),
            cursor::MoveToNextLine(1)
        )?;

        self.draw_hud(frame, height as u16 + 1)?;
        self.out.flush()
    }

    fn draw_hud(&mut self, frame: &RenderFrame, row: u16) -> io::Result<()> {
        let hud = &frame.hud;
        let best = hud.best_ms.map(format_run_time).unwrap_or_else(|| "--".to_string());
        let status = format!(
            "{difficulty}  {phase:?}  souls {souls}  chain {followers}  {elapsed}  best {best}",
            difficulty = hud.difficulty,
            phase = hud.phase,
            souls = format_count(hud.souls as u64),
            followers = hud.followers,
            elapsed = format_run_time(hud.elapsed_ms),
        );
        queue!(
            self.out,
            cursor::MoveTo(0, row),
            Clear(ClearType::CurrentLine),
            Print(status)
        )?;
        if hud.phase == Phase::Escort {
            queue!(self.out, Print(format!("  pursuers {}", hud.pursuers_alive)))?;
        }

        let message = match hud.stage {
            GameStage::BeforeGame => "Press space to start".to_string(),
            GameStage::Playing => String::new(),
            GameStage::Paused { .. } => "Paused (p to resume)".to_string(),
            GameStage::Lost(reason) => format!("{reason}. Space to retry, backspace for menu"),
            GameStage::Won { time_ms } => format!("Home in {}! Space to play again", format_run_time(time_ms)),
        };
        let mute = format!(
            "sound {:<3} music {:<3}",
            on_off(!hud.mute.contains(Mute::SOUND)),
            on_off(!hud.mute.contains(Mute::MUSIC))
        );
        queue!(
            self.out,
            cursor::MoveTo(0, row + 1),
            Clear(ClearType::CurrentLine),
            SetAttribute(Attribute::Bold),
            Print(message),
            SetAttribute(Attribute::Reset),
            cursor::MoveTo(0, row + 2),
            Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::DarkGrey),
            Print(mute),
            ResetColor
        )
    }
}

fn on_off(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}

fn to_color(Rgb(r, g, b): Rgb) -> Color {
    Color::Rgb { r, g, b }
}

fn fade(Rgb(r, g, b): Rgb, alpha: f32) -> Rgb {
    let scale = |c: u8| (c as f32 * alpha.clamp(0.0, 1.0)).round() as u8;
    Rgb(scale(r), scale(g), scale(b))
}

fn digit(value: u32) -> &'static str {
    const DIGITS: [&str; 10] = [" 0", " 1", " 2", " 3", " 4", " 5", " 6", " 7", " 8", " 9"];
    DIGITS.get(value as usize).copied().unwrap_or("9+")
}

/// Two-column stand-in for a sprite sheet.
fn glyph(sheet: &str) -> &'static str {
    match sheet {
        "player/head" => "@@",
        "player/follower" => "oo",
        "enemies/soul" => "()",
        "enemies/grime_soul" => "%%",
        "enemies/tar_soul" => "##",
        "enemies/andy" => "&&",
        "enemies/nina" => "><",
        "markers/grave" => "++",
        "markers/portal" => "[]",
        "markers/boundary" => "--",
        _ if sheet.starts_with("effects/") => "**",
        _ => "??",
    }
}
