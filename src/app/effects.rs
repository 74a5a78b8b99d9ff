use tracing::{debug, warn};

use crate::app::{App, Effect, Message, Model, update};
use crate::files;

impl App {
    /// Carry out I/O queued by `update`, feeding each result back in as a
    /// message. Results may queue further effects, so this loops until the
    /// queue is empty.
    pub(super) fn drain_effects(model: &mut Model) -> bool {
        let mut ran = false;
        loop {
            let effects = model.take_effects();
            if effects.is_empty() {
                return ran;
            }
            for effect in effects {
                ran = true;
                let msg = perform(effect);
                *model = update(std::mem::take(model), msg);
            }
        }
    }
}

/// Run one effect to completion.
pub(super) fn perform(effect: Effect) -> Message {
    match effect {
        Effect::ReadTextFile(path) => {
            debug!(path = %path.display(), "reading text file");
            match files::read_text_file(&path) {
                Ok(raw) => Message::TextFileRead(raw),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "text import failed");
                    Message::IoFailed(err.to_string())
                }
            }
        }
        Effect::ReadTemplate(path) => {
            debug!(path = %path.display(), "reading template");
            match files::read_template_file(&path) {
                Ok(raw) => Message::TemplateRead(raw),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "template read failed");
                    Message::IoFailed(err.to_string())
                }
            }
        }
        Effect::Save { pending, target } => match target.write(&pending.bytes) {
            Ok(path) => Message::SaveFinished { pending, path },
            Err(err) => {
                warn!(error = %err, "save failed");
                Message::IoFailed(err.to_string())
            }
        },
    }
}
