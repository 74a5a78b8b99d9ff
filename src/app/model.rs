use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::document::HighlightId;
use crate::editor::EditorBuffer;
use crate::files::SaveTarget;
use crate::session::{EditorSession, PendingSave, Role, View};
use crate::ui::style::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// Which pane receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Document,
    /// The Author's field list in the left panel
    Panel,
}

/// What a one-line prompt is collecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptKind {
    TemplateName,
    TemplateDescription,
    OpenTextFile,
    OpenTemplate,
    /// Destination for bytes captured when the save began
    SaveAs(PendingSave),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
}

impl Prompt {
    pub const fn new(kind: PromptKind, input: String) -> Self {
        Self { kind, input }
    }

    pub const fn title(&self) -> &'static str {
        match &self.kind {
            PromptKind::TemplateName => "Template name",
            PromptKind::TemplateDescription => "Description",
            PromptKind::OpenTextFile => "Load text file",
            PromptKind::OpenTemplate => "Load template",
            PromptKind::SaveAs(_) => "Save as",
        }
    }
}

/// I/O requested by `update` and carried out by the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ReadTextFile(PathBuf),
    ReadTemplate(PathBuf),
    Save {
        pending: PendingSave,
        target: SaveTarget,
    },
}

/// In-progress value of an inline field input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDraft {
    pub value: String,
    /// Cursor position in chars
    pub cursor: usize,
}

impl FieldDraft {
    /// A draft holding `value` with the cursor at its end.
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
            cursor: value.chars().count(),
        }
    }

    pub fn insert(&mut self, ch: char) {
        let idx = self.byte_index();
        self.value.insert(idx, ch);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let idx = self.byte_index();
        self.value.remove(idx);
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let idx = self.byte_index();
            self.value.remove(idx);
        }
    }

    pub const fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.value.chars().count());
    }

    pub const fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    fn byte_index(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.cursor)
            .map_or(self.value.len(), |(idx, _)| idx)
    }
}

/// The complete application state.
///
/// All state lives here - no global or scattered state.
pub struct Model {
    /// Document plus role, lock, and template metadata
    pub session: EditorSession,
    /// Text area used in the editable view; mirrors the document text
    pub editor: EditorBuffer,
    /// First visible line of the editable view
    pub editor_scroll_offset: usize,
    /// First visible line of the field view
    pub fields_scroll_offset: usize,
    /// Pane receiving navigation keys
    pub focus: Focus,
    /// Selected row in the Author's field list
    pub panel_selected: usize,
    /// Field with keyboard focus in the field view
    pub active_field: Option<HighlightId>,
    /// Draft values of inline inputs, keyed by field
    pub drafts: HashMap<HighlightId, FieldDraft>,
    /// One-line prompt shown above the status bar
    pub prompt: Option<Prompt>,
    /// I/O waiting to be carried out by the event loop
    pub effects: Vec<Effect>,
    /// Directory for automatic downloads and suggested save paths
    pub export_dir: PathBuf,
    /// Ask for a save path instead of downloading straight into `export_dir`
    pub use_picker: bool,
    /// Whether help overlay is visible
    pub help_visible: bool,
    /// Colors used by the UI
    pub theme: Theme,
    /// Global config path shown in help
    pub config_global_path: Option<PathBuf>,
    /// Local override path shown in help
    pub config_local_path: Option<PathBuf>,
    toast: Option<Toast>,
    /// Whether the app should quit
    pub should_quit: bool,
    /// Terminal width
    pub width: u16,
    /// Terminal height
    pub height: u16,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("state", self.session.state())
            .field("focus", &self.focus)
            .field("active_field", &self.active_field)
            .field("prompt", &self.prompt.as_ref().map(Prompt::title))
            .finish_non_exhaustive()
    }
}

impl Model {
    /// Create a model around a session.
    pub fn new(session: EditorSession, terminal_size: (u16, u16)) -> Self {
        let editor = EditorBuffer::from_text(&session.document().text());
        Self {
            session,
            editor,
            width: terminal_size.0,
            height: terminal_size.1,
            ..Self::default()
        }
    }

    pub fn with_export_dir(mut self, dir: PathBuf) -> Self {
        self.export_dir = dir;
        self
    }

    pub const fn with_picker(mut self, use_picker: bool) -> Self {
        self.use_picker = use_picker;
        self
    }

    pub const fn role(&self) -> Role {
        self.session.state().role
    }

    pub const fn view(&self) -> View {
        self.session.view()
    }

    /// Current value shown by a field's inline input.
    pub fn draft_value(&self, id: HighlightId) -> Option<String> {
        if let Some(draft) = self.drafts.get(&id) {
            return Some(draft.value.clone());
        }
        self.session
            .document()
            .highlight(id)
            .map(|h| h.source_text.clone())
    }

    /// Rows visible inside the document pane.
    pub fn document_rows(&self) -> usize {
        crate::ui::document_area(self.width, self.height).height as usize
    }

    /// Bring the editor, drafts, and focus back in line with the session
    /// after anything other than direct typing changed the document.
    pub(super) fn resync(&mut self) {
        let text = self.session.document().text();
        if self.editor.text() != text {
            self.editor.set_text(&text);
        }
        let highlights = self.session.document().highlights();
        self.drafts
            .retain(|id, _| highlights.iter().any(|h| h.id == *id && h.editable));
        if self
            .active_field
            .is_some_and(|id| self.session.document().highlight(id).is_none())
        {
            self.active_field = None;
        }
        let count = highlights.len();
        self.panel_selected = self.panel_selected.min(count.saturating_sub(1));
        if self.role() == Role::Filler || count == 0 {
            self.focus = Focus::Document;
        }
    }

    /// Focus the first editable field, as after converting or loading.
    pub(super) fn autofocus_first_editable(&mut self) {
        self.active_field = self.session.first_editable();
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + Duration::from_secs(4),
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }

    pub(super) fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }
}

// Implement Default for Model to allow std::mem::take
impl Default for Model {
    fn default() -> Self {
        Self {
            session: EditorSession::default(),
            editor: EditorBuffer::empty(),
            editor_scroll_offset: 0,
            fields_scroll_offset: 0,
            focus: Focus::Document,
            panel_selected: 0,
            active_field: None,
            drafts: HashMap::new(),
            prompt: None,
            effects: Vec::new(),
            export_dir: PathBuf::from("."),
            use_picker: true,
            help_visible: false,
            theme: Theme::default(),
            config_global_path: None,
            config_local_path: None,
            toast: None,
            should_quit: false,
            width: 80,
            height: 24,
        }
    }
}
