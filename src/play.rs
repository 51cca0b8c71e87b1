use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Print, ResetColor};
use crossterm::terminal::{
    self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use notify::{Event as FsEvent, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::ascii_render::{AsciiRenderer, ROW_BREAK};
use crate::clock::{Clock, RefreshClock};
use crate::config::{ColorPreference, PlayerConfig};
use crate::controller::{PlaybackController, PlaybackSnapshot};
use crate::error::PlaybackResult;
use crate::frame_store::load_frame_store;
use crate::schema::VideoMetadata;

/// Upper bound on how long the loop blocks while nothing is scheduled.
const IDLE_POLL: Duration = Duration::from_millis(100);
const STATUS_ROWS: u16 = 2;
const CONTROLS_HELP: &str = "space play/pause  \u{2190}/\u{2192} step  home/end  r restart  c colour  q quit";

#[derive(Debug, Clone)]
pub struct PlayArgs {
    pub start_frame: Option<i64>,
    pub paused: bool,
    pub refresh_hz: u32,
    pub color: ColorPreference,
    pub watch: bool,
}

impl PlayArgs {
    pub fn from_config(config: &PlayerConfig, start_frame: Option<i64>) -> Self {
        Self {
            start_frame,
            paused: config.start_paused,
            refresh_hz: config.refresh_hz,
            color: config.color,
            watch: config.watch,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    TogglePlay,
    Step(i64),
    SeekFirst,
    SeekLast,
    Restart,
    ToggleColor,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub fn run_play(path: &Path, args: PlayArgs) -> Result<()> {
    let path = canonical_path(path);
    let store = load_frame_store(&path)?;
    let frames_are_colored = store.is_colored();

    let mut controller = PlaybackController::new(RefreshClock::new(args.refresh_hz));
    controller
        .load(store)
        .with_context(|| format!("failed to load frames from {}", path.display()))?;
    if let Some(start_frame) = args.start_frame {
        controller.seek(start_frame)?;
    }
    if !args.paused {
        controller.play()?;
    }
    let mut color_mode = args.color.resolve(frames_are_colored);

    let watch = if args.watch {
        Some(spawn_watcher(&path)?)
    } else {
        None
    };

    tracing::info!(
        path = %path.display(),
        refresh_hz = args.refresh_hz,
        color_mode,
        "starting playback"
    );

    let mut stdout = io::stdout();
    let _terminal = TerminalGuard::enter()?;
    let renderer = AsciiRenderer::new();
    let mut last_snapshot: Option<PlaybackSnapshot> = None;

    loop {
        let (_, rows) = terminal::size().unwrap_or((80, 24));
        let frame_rows = rows.saturating_sub(STATUS_ROWS).max(1);

        let mut dirty = false;
        if let Some(frame) = controller.take_frame_to_present() {
            let surface = renderer.render(frame, color_mode);
            draw_frame(&mut stdout, &surface, frame_rows)?;
            dirty = true;
        }

        let snapshot = controller.snapshot();
        if dirty || last_snapshot != Some(snapshot) {
            if let Some(store) = controller.frame_store() {
                draw_status(&mut stdout, frame_rows, &snapshot, store.metadata())?;
            }
            last_snapshot = Some(snapshot);
            dirty = true;
        }
        if dirty {
            stdout.flush()?;
        }

        let wait = controller
            .clock()
            .until_next_tick()
            .map_or(IDLE_POLL, |wait| wait.min(IDLE_POLL));
        if event::poll(wait)? {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    if let Some(action) = action_for_key(key) {
                        if apply_action(&mut controller, action, &mut color_mode)? == Flow::Quit {
                            break;
                        }
                    }
                }
                Event::Resize(..) => {
                    execute!(stdout, Clear(ClearType::All))?;
                    controller.invalidate_presentation();
                }
                _ => {}
            }
        }

        if let Some((_, reload_rx)) = &watch {
            let mut changed = false;
            while reload_rx.try_recv().is_ok() {
                changed = true;
            }
            if changed && try_reload(&path, &mut controller, args.color, &mut color_mode) {
                execute!(stdout, Clear(ClearType::All))?;
            }
        }

        controller.pump();
    }

    tracing::info!("playback finished");
    Ok(())
}

pub fn action_for_key(key: KeyEvent) -> Option<PlayerAction> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c')).then_some(PlayerAction::Quit);
    }

    match key.code {
        KeyCode::Char(' ') => Some(PlayerAction::TogglePlay),
        KeyCode::Left => Some(PlayerAction::Step(-1)),
        KeyCode::Right => Some(PlayerAction::Step(1)),
        KeyCode::Home => Some(PlayerAction::SeekFirst),
        KeyCode::End => Some(PlayerAction::SeekLast),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(PlayerAction::Restart),
        KeyCode::Char('c') | KeyCode::Char('C') => Some(PlayerAction::ToggleColor),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(PlayerAction::Quit),
        _ => None,
    }
}

pub fn apply_action<C: Clock>(
    controller: &mut PlaybackController<C>,
    action: PlayerAction,
    color_mode: &mut bool,
) -> PlaybackResult<Flow> {
    match action {
        PlayerAction::TogglePlay => controller.toggle()?,
        PlayerAction::Step(delta) => controller.step(delta)?,
        PlayerAction::SeekFirst => controller.seek(0)?,
        PlayerAction::SeekLast => controller.seek(i64::MAX)?,
        PlayerAction::Restart => controller.restart()?,
        PlayerAction::ToggleColor => {
            *color_mode = !*color_mode;
            controller.invalidate_presentation();
        }
        PlayerAction::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

/// Writes one rendered frame from the top-left corner, clipped to `max_rows`.
/// A `\r` before a row break is dropped; raw mode would return the cursor.
pub fn draw_frame(out: &mut impl Write, surface: &str, max_rows: u16) -> io::Result<()> {
    let mut drawn: u16 = 0;
    let rows = surface
        .split(ROW_BREAK)
        .map(|line| line.strip_suffix('\r').unwrap_or(line));
    for line in rows.take(usize::from(max_rows)) {
        queue!(
            out,
            MoveTo(0, drawn),
            Print(line),
            ResetColor,
            Clear(ClearType::UntilNewLine)
        )?;
        drawn += 1;
    }
    // Clear rows left over from a taller previous frame.
    for row in drawn..max_rows {
        queue!(out, MoveTo(0, row), Clear(ClearType::CurrentLine))?;
    }
    Ok(())
}

pub fn status_line(snapshot: &PlaybackSnapshot) -> String {
    format!(
        "{}  [{}]  {}",
        snapshot,
        snapshot.status.label(),
        CONTROLS_HELP
    )
}

fn draw_status(
    out: &mut impl Write,
    top: u16,
    snapshot: &PlaybackSnapshot,
    metadata: &VideoMetadata,
) -> io::Result<()> {
    queue!(
        out,
        MoveTo(0, top),
        Print(status_line(snapshot)),
        Clear(ClearType::UntilNewLine),
        MoveTo(0, top + 1),
        Print(metadata.summary()),
        Clear(ClearType::UntilNewLine)
    )
}

/// Re-reads `path` and swaps it in. A file that fails to parse or validate
/// is logged and the current session keeps playing.
fn try_reload<C: Clock>(
    path: &Path,
    controller: &mut PlaybackController<C>,
    preference: ColorPreference,
    color_mode: &mut bool,
) -> bool {
    let store = match load_frame_store(path) {
        Ok(store) => store,
        Err(error) => {
            tracing::warn!(error = %format!("{error:#}"), "reload parse error");
            return false;
        }
    };

    let frames_are_colored = store.is_colored();
    if let Err(error) = controller.load(store) {
        tracing::warn!(%error, "reload rejected");
        return false;
    }

    *color_mode = preference.resolve(frames_are_colored);
    tracing::info!(path = %path.display(), "reloaded frames");
    true
}

fn spawn_watcher(path: &Path) -> Result<(RecommendedWatcher, mpsc::Receiver<()>)> {
    let (watch_tx, watch_rx) = mpsc::channel::<()>();
    let watched_path = path.to_path_buf();
    let mut watcher =
        notify::recommended_watcher(move |result: notify::Result<FsEvent>| match result {
            Ok(event) => {
                if should_reload(&event) && event_targets_path(&event, &watched_path) {
                    let _ = watch_tx.send(());
                }
            }
            Err(error) => {
                tracing::warn!(%error, "file watcher error");
            }
        })
        .context("failed to create file watcher")?;
    let watch_root = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    watcher
        .watch(&watch_root, RecursiveMode::NonRecursive)
        .with_context(|| format!("failed to watch {}", watch_root.display()))?;
    Ok((watcher, watch_rx))
}

fn should_reload(event: &FsEvent) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Any
    )
}

fn event_targets_path(event: &FsEvent, path: &Path) -> bool {
    if event.paths.is_empty() {
        return true;
    }

    event.paths.iter().any(|candidate| {
        candidate == path
            || std::fs::canonicalize(candidate)
                .map(|resolved| resolved == path)
                .unwrap_or(false)
    })
}

fn canonical_path(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Raw mode + alternate screen for the lifetime of the guard.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        terminal::enable_raw_mode().context("failed to enable raw terminal mode")?;
        let guard = Self;
        execute!(io::stdout(), EnterAlternateScreen, Hide, Clear(ClearType::All))
            .context("failed to enter alternate screen")?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), ResetColor, Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}
