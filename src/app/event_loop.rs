use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use tracing::{debug, info, trace};

use crate::app::{App, Effect, Message, Model, update};
use crate::files::ContentType;
use crate::session::EditorSession;
use crate::ui::style::Theme;

pub(super) struct ResizeDebouncer {
    delay_ms: u64,
    pending: Option<(u16, u16, u64)>,
}

impl ResizeDebouncer {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub(super) const fn queue(&mut self, width: u16, height: u16, now_ms: u64) {
        self.pending = Some((width, height, now_ms));
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> Option<(u16, u16)> {
        let (width, height, queued_at) = self.pending?;
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            Some((width, height))
        } else {
            None
        }
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl App {
    /// Build the initial model for a terminal of `size`.
    pub(super) fn initial_model(&self, size: (u16, u16)) -> Model {
        let mut session = EditorSession::new();
        session.set_role(self.role);
        let mut model = Model::new(session, size)
            .with_export_dir(self.export_dir.clone())
            .with_picker(self.use_picker);
        model
            .config_global_path
            .clone_from(&self.config_global_path);
        model.config_local_path.clone_from(&self.config_local_path);

        if let Some(path) = &self.initial_file {
            let effect = match ContentType::from_path(path) {
                ContentType::Json => Effect::ReadTemplate(path.clone()),
                ContentType::PlainText | ContentType::Other => Effect::ReadTextFile(path.clone()),
            };
            model.effects.push(effect);
        }
        model
    }

    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal initialization or the event loop
    /// encounters an I/O failure.
    pub fn run(&mut self) -> Result<()> {
        // Initialize terminal
        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal - stencil requires an interactive terminal")?;
        let size = terminal.size()?;
        info!(width = size.width, height = size.height, role = %self.role, "starting");

        let mut model = self.initial_model((size.width, size.height));
        model.theme = Theme::detect();
        Self::drain_effects(&mut model);

        // Main loop
        let result = Self::event_loop(&mut terminal, &mut model);

        // Restore terminal
        let _ = execute!(stdout(), DisableBracketedPaste, DisableMouseCapture);
        ratatui::restore();

        result
    }

    fn event_loop(terminal: &mut DefaultTerminal, model: &mut Model) -> Result<()> {
        let start = Instant::now();
        let mut resize_debouncer = ResizeDebouncer::new(100);
        let mut frame_idx: u64 = 0;
        let mut needs_render = true;

        execute!(stdout(), EnableMouseCapture, EnableBracketedPaste)?;

        loop {
            if model.expire_toast(Instant::now()) {
                needs_render = true;
            }

            let now_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            if let Some((width, height)) = resize_debouncer.take_ready(now_ms) {
                debug!(frame = frame_idx, width, height, "resize applied");
                *model = update(std::mem::take(model), Message::Resize(width, height));
                needs_render = true;
            }

            // Handle events
            let poll_ms = if needs_render {
                0
            } else if resize_debouncer.is_pending() {
                10
            } else {
                250
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                // Refresh timestamp after poll wait so the debouncer uses accurate times.
                let event_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                let msg =
                    Self::handle_event(&event::read()?, model, event_ms, &mut resize_debouncer);
                if let Some(msg) = msg {
                    trace!(frame = frame_idx, ?msg, "message");
                    *model = update(std::mem::take(model), msg);
                    Self::drain_effects(model);
                    needs_render = true;
                }

                // Coalesce key repeat bursts and pastes into a single render.
                let mut drained = 0_u32;
                while event::poll(Duration::from_millis(0))? {
                    let drain_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                    let msg =
                        Self::handle_event(&event::read()?, model, drain_ms, &mut resize_debouncer);
                    if let Some(msg) = msg {
                        drained += 1;
                        *model = update(std::mem::take(model), msg);
                        Self::drain_effects(model);
                        needs_render = true;
                    }
                }
                if drained > 0 {
                    trace!(frame = frame_idx, drained, "drained event burst");
                }
            }

            if needs_render {
                frame_idx += 1;
                terminal.draw(|frame| Self::view(model, frame))?;
                needs_render = false;
            }

            if model.should_quit {
                break;
            }
        }
        info!(frames = frame_idx, "exiting");
        Ok(())
    }
}
