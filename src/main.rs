// What you SEE:
// • Left panel: the capture canvas. Hold Left Mouse to draw.
// • Middle panel: the plain crop, normalized to the feature grid size.
// • Right panel: the padded, clutter-filtered crop, normalized.
// • C clears the canvas. S saves both feature grids as PNG. ESC quits.
//
// Usage: scribble-grid [config.toml]

mod draw;

use std::path::{Path, PathBuf};

use anyhow::Context;
use log::{debug, info, warn};
use scribble_grid::export::save_png;
use scribble_grid::{CaptureSession, Config, FeatureCache, FrameBuffer, InputEvent, PointerSample};

use draw::{Drawer, Panel, draw_grid, draw_panel, draw_text_5x7};

const EXPORT_SCALE: u32 = 8;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(Path::new(&path))
            .with_context(|| format!("failed to load config from {path}"))?,
        None => Config::default(),
    };
    info!("capture canvas {}x{}, feature grid {}x{}",
        config.capture.width, config.capture.height,
        config.normalize.width, config.normalize.height);

    /* --- Layout ---
       Visual: three equally sized panels side by side under a HUD line. */
    let win = &config.window;
    let (pw, ph) = (config.capture.width, config.capture.height);
    let top = win.margin + win.hud_height;
    let panels: [Panel; 3] = std::array::from_fn(|i| Panel {
        left: win.margin + i * (pw + win.margin),
        top,
        width: pw,
        height: ph,
    });
    let (canvas, plain_panel, filtered_panel) = (panels[0], panels[1], panels[2]);
    let width = win.margin * 4 + pw * 3;
    let height = top + ph + win.margin;

    let mut drawer = Drawer::new("Scribble Grid", width, height)
        .context("failed to open window")?;
    let mut screen = FrameBuffer::new(width, height, win.background);

    let mut session = CaptureSession::new(&config);
    let mut features = FeatureCache::new(&config);
    let mut events: Vec<InputEvent> = Vec::new();
    let mut last_sample: Option<PointerSample> = None;

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        /* 1) Inputs → events. Moves are only forwarded when something changed;
           releasing the button always is, so the next press starts a new stroke. */
        if drawer.c_pressed_once() {
            events.push(InputEvent::Reset);
        }
        if let Some((mx, my)) = drawer.mouse_pos() {
            let (x, y) = canvas.to_local(mx, my);
            let sample = PointerSample { x, y, primary_down: drawer.left_mouse_down() };
            if last_sample != Some(sample) {
                events.push(InputEvent::Pointer(sample));
                last_sample = Some(sample);
            }
        }
        session.drain(events.drain(..))?;

        /* 2) Derived views follow the change counter. */
        if features.refresh(session.grid()) {
            debug!("features recomputed at change {}", session.change_counter());
        }

        if drawer.s_pressed_once() {
            for (name, grid) in [("plain", features.plain()), ("filtered", features.filtered())] {
                let path = PathBuf::from(format!("{name}-{}.png", session.change_counter()));
                if let Err(e) = save_png(grid, &path, EXPORT_SCALE) {
                    warn!("could not save {name} grid: {e}");
                }
            }
        }

        /* 3) Render: panels, ink, HUD. */
        screen.clear(win.background);
        for panel in panels {
            draw_panel(&mut screen, panel, win.frame, win.panel);
        }
        draw_grid(&mut screen, canvas, session.grid(), win.ink);
        draw_grid(&mut screen, plain_panel, features.plain(), win.ink);
        draw_grid(&mut screen, filtered_panel, features.filtered(), win.ink);

        let hud = format!(
            "RAW PX: {} | C CLEAR  S SAVE  | PLAIN | FILTER",
            session.grid().count_active()
        );
        draw_text_5x7(&mut screen, win.margin as i32, win.margin as i32 / 2, &hud, win.frame);

        /* 4) Present to the window. */
        drawer.present(&screen)?;
    }

    info!("bye");
    Ok(())
}
