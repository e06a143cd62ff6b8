// Game Mode - terminal frame loop: input, tick, draw, LED mirror
use anyhow::Result;
use crossterm::event::{
    poll, read, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use log::{debug, info, warn};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::Terminal;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::canvas::Canvas;
use crate::config::GameConfig;
use crate::led_output::{LedDevice, LedMirror};
use crate::pointer::PointerTracker;
use crate::present::CanvasView;
use crate::types::{ModeExitReason, Position};
use crate::world::World;

/// Canvas pixel size: configured values win, 0 falls back to the terminal (two pixels per row)
pub fn canvas_size(config: &GameConfig, terminal_cols: u16, terminal_rows: u16) -> (usize, usize) {
    let width = if config.canvas_width > 0 {
        config.canvas_width
    } else {
        terminal_cols as usize
    };
    let height = if config.canvas_height > 0 {
        config.canvas_height
    } else {
        terminal_rows as usize * 2
    };
    (width.max(1), height.max(1))
}

/// What a single terminal event means for the game loop
#[derive(Debug, Clone, Copy, PartialEq)]
enum InputAction {
    Pointer(u16, u16),
    Quit,
    Ignore,
}

fn classify_event(event: &Event) -> InputAction {
    match event {
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                InputAction::Pointer(mouse.column, mouse.row)
            }
            _ => InputAction::Ignore,
        },
        Event::Key(KeyEvent { code, modifiers, .. }) => match code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => InputAction::Quit,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => InputAction::Quit,
            _ => InputAction::Ignore,
        },
        Event::Resize(cols, rows) => {
            debug!("Terminal resized to {}x{}, canvas keeps its size", cols, rows);
            InputAction::Ignore
        }
        _ => InputAction::Ignore,
    }
}

fn build_led_mirror(config: &GameConfig, total_leds: usize) -> Option<LedMirror> {
    if config.wled_devices.is_empty() {
        return None;
    }

    let devices: Vec<LedDevice> = config
        .wled_devices
        .iter()
        .map(|d| LedDevice::from_config(d, total_leds))
        .collect();

    match LedMirror::new(devices, config.multi_device_fail_fast) {
        Ok(mirror) => {
            info!("Mirroring canvas to {} WLED device(s)", mirror.device_count());
            Some(mirror)
        }
        Err(e) => {
            warn!("LED mirror disabled: {:#}", e);
            None
        }
    }
}

fn log_summary(world: &World<Canvas>) {
    info!(
        "Game stopped after {} ticks: {} snake(s) alive, {} retired, player length {}{}, {} pellets left",
        world.ticks(),
        world.alive_count(),
        world.retired().len(),
        world.player().target_length(),
        if world.player().is_dead() { " (dead)" } else { "" },
        world.foods().len()
    );
}

pub fn run_game_mode(config: &GameConfig, shutdown: Arc<AtomicBool>) -> Result<ModeExitReason> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture) {
        disable_raw_mode().ok();
        return Err(e.into());
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = match Terminal::new(backend) {
        Ok(terminal) => terminal,
        Err(e) => {
            disable_raw_mode().ok();
            execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen).ok();
            return Err(e.into());
        }
    };

    let result = run_frames(&mut terminal, config, &shutdown);

    // Cleanup terminal
    terminal.show_cursor().ok();
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen).ok();

    result
}

fn run_frames<B: Backend>(
    terminal: &mut Terminal<B>,
    config: &GameConfig,
    shutdown: &AtomicBool,
) -> Result<ModeExitReason> {
    terminal.clear()?;
    terminal.hide_cursor()?;

    let area = terminal.size()?;
    let (width, height) = canvas_size(config, area.width, area.height);
    let canvas = Canvas::new(width, height, config.scale);
    let (world_width, world_height) = canvas.world_size();

    let mut pointer = PointerTracker::new(Position::new(world_width / 2.0, world_height / 2.0), config.scale);
    let mut world = World::new(canvas, world_width, world_height, config.seed);
    let mut led_mirror = build_led_mirror(config, width * height);

    info!(
        "Game started: {}x{} pixels, {:.0}x{:.0} world units, {} fps",
        width, height, world_width, world_height, config.fps
    );

    // Frame timing
    let frame_duration = Duration::from_secs_f64(1.0 / config.fps);

    loop {
        let loop_start = Instant::now();

        // Drain pending input before the tick
        while poll(Duration::from_millis(0))? {
            match classify_event(&read()?) {
                InputAction::Pointer(column, row) => pointer.update_from_cell(column, row),
                InputAction::Quit => {
                    log_summary(&world);
                    return Ok(ModeExitReason::UserQuit);
                }
                InputAction::Ignore => {}
            }
        }

        if shutdown.load(Ordering::SeqCst) {
            log_summary(&world);
            return Ok(ModeExitReason::Shutdown);
        }

        world.tick(pointer.position());

        terminal.draw(|f| {
            f.render_widget(CanvasView::new(world.surface()), f.size());
        })?;

        if let Some(mirror) = led_mirror.as_mut() {
            // Send failures are already logged per device
            if let Err(e) = mirror.send_frame(&world.surface().frame(), config.global_brightness) {
                warn!("LED frame dropped: {:#}", e);
            }
        }

        // Sleep for remaining frame time
        let elapsed = loop_start.elapsed();
        if elapsed < frame_duration {
            std::thread::sleep(frame_duration - elapsed);
        }
    }
}
