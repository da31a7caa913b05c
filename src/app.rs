use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;

use crate::editor::{Editor, MoveDirection};
use crate::models::{FieldKind, Template};
use crate::render::render;
use crate::repo::TemplateRepository;
use crate::system::{self, JsonFileStore};

const DOUBLE_CLICK_MS: u128 = 400;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum View {
    List,
    Editor,
    Error,
}

#[derive(Clone, Debug)]
pub(crate) struct StatusMessage {
    pub(crate) text: String,
    pub(crate) since: Instant,
}

impl StatusMessage {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            since: Instant::now(),
        }
    }
}

/// One editable input in the editor form, in display order. `Name` is the
/// template name; the per-field slots carry the field's position in the
/// template's field order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum InputSlot {
    Name,
    Label(usize),
    Tag(usize),
    Content(usize),
}

impl InputSlot {
    pub(crate) fn field_position(self) -> Option<usize> {
        match self {
            InputSlot::Name => None,
            InputSlot::Label(position)
            | InputSlot::Tag(position)
            | InputSlot::Content(position) => Some(position),
        }
    }
}

pub(crate) fn input_slots(template: &Template) -> Vec<InputSlot> {
    let mut slots = vec![InputSlot::Name];
    for (position, field) in template.fields.iter().enumerate() {
        if field.label().is_some() {
            slots.push(InputSlot::Label(position));
        }
        if field.kind() == FieldKind::Xml {
            slots.push(InputSlot::Tag(position));
        }
        slots.push(InputSlot::Content(position));
    }
    slots
}

#[derive(Clone, Debug)]
pub(crate) struct EditPane {
    pub(crate) active_input: usize,
    pub(crate) form_scroll: usize,
    pub(crate) status: Option<StatusMessage>,
}

impl EditPane {
    fn new() -> Self {
        Self {
            active_input: 0,
            form_scroll: 0,
            status: None,
        }
    }
}

pub(crate) struct App {
    pub(crate) repo: Option<TemplateRepository>,
    pub(crate) editor: Editor,
    pub(crate) view: View,
    pub(crate) list_state: ListState,
    pub(crate) list_scroll: usize,
    pub(crate) list_area: Rect,
    pub(crate) last_click: Option<(usize, Instant)>,
    pub(crate) list_status: Option<StatusMessage>,
    pub(crate) edit: EditPane,
    pub(crate) error_message: Option<String>,
    pub(crate) should_quit: bool,
}

impl App {
    pub(crate) fn load() -> Self {
        let repo = JsonFileStore::open_default()
            .and_then(|store| TemplateRepository::open(Box::new(store)));
        match repo {
            Ok(repo) => Self::with_repo(repo),
            Err(err) => Self {
                repo: None,
                editor: Editor::new(),
                view: View::Error,
                list_state: ListState::default(),
                list_scroll: 0,
                list_area: Rect::default(),
                last_click: None,
                list_status: None,
                edit: EditPane::new(),
                error_message: Some(err.to_string()),
                should_quit: false,
            },
        }
    }

    pub(crate) fn with_repo(repo: TemplateRepository) -> Self {
        let mut list_state = ListState::default();
        if !repo.list().is_empty() {
            list_state.select(Some(0));
        }
        Self {
            repo: Some(repo),
            editor: Editor::new(),
            view: View::List,
            list_state,
            list_scroll: 0,
            list_area: Rect::default(),
            last_click: None,
            list_status: None,
            edit: EditPane::new(),
            error_message: None,
            should_quit: false,
        }
    }

    pub(crate) fn on_key(&mut self, key: KeyEvent) {
        match self.view {
            View::List => self.on_key_list(key),
            View::Editor => self.on_key_editor(key),
            View::Error => self.on_key_error(key),
        }
    }

    pub(crate) fn on_mouse(&mut self, mouse: MouseEvent) {
        match self.view {
            View::List => self.on_mouse_list(mouse),
            View::Editor => {}
            View::Error => {}
        }
    }

    fn on_key_error(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn on_key_list(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Down | KeyCode::Char('j') => self.move_list(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_list(-1),
            KeyCode::Enter => self.open_selected_template(),
            KeyCode::Char('n') => {
                self.editor.new_template();
                self.enter_editor();
            }
            KeyCode::Char('d') => self.delete_selected_template(),
            _ => {}
        }
    }

    fn on_mouse_list(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        if let Some(index) = self.index_from_mouse(mouse) {
            self.list_state.select(Some(index));
            let now = Instant::now();
            if let Some((last_index, last_time)) = self.last_click {
                if last_index == index && last_time.elapsed().as_millis() <= DOUBLE_CLICK_MS {
                    self.open_selected_template();
                }
            }
            self.last_click = Some((index, now));
        }
    }

    fn on_key_editor(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('s') => self.save_template(),
                KeyCode::Char('c') => self.copy_rendered(),
                KeyCode::Char('t') => self.append_field(FieldKind::Text),
                KeyCode::Char('l') => self.append_field(FieldKind::List),
                KeyCode::Char('x') => self.append_field(FieldKind::Xml),
                KeyCode::Char('f') => self.append_field(FieldKind::Filepath),
                KeyCode::Char('d') => self.remove_active_field(),
                KeyCode::Char('k') => self.move_active_field(MoveDirection::Up),
                KeyCode::Char('j') => self.move_active_field(MoveDirection::Down),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Esc => {
                self.view = View::List;
                self.sync_list_selection();
            }
            KeyCode::Tab | KeyCode::Down => self.move_input(1),
            KeyCode::BackTab | KeyCode::Up => self.move_input(-1),
            KeyCode::Backspace => self.pop_active_char(),
            KeyCode::Enter => self.push_active_char('\n'),
            KeyCode::Char(ch) => self.push_active_char(ch),
            _ => {}
        }
    }

    fn move_list(&mut self, delta: isize) {
        let len = self.repo.as_ref().map_or(0, |repo| repo.list().len());
        if len == 0 {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, (len - 1) as isize) as usize;
        self.list_state.select(Some(next));
    }

    fn open_selected_template(&mut self) {
        let Some(repo) = self.repo.as_ref() else {
            return;
        };
        let Some(index) = self.list_state.selected() else {
            return;
        };
        let Some(id) = repo.list().get(index).map(|template| template.id.clone()) else {
            return;
        };
        self.editor.load_template(repo, &id);
        self.enter_editor();
    }

    fn delete_selected_template(&mut self) {
        let Some(index) = self.list_state.selected() else {
            return;
        };
        let id = match self
            .repo
            .as_ref()
            .and_then(|repo| repo.list().get(index))
        {
            Some(template) => template.id.clone(),
            None => return,
        };
        let Some(repo) = self.repo.as_mut() else {
            return;
        };
        match self.editor.delete(repo, &id) {
            Ok(()) => {
                tracing::info!(id = %id, "模板已删除");
                self.list_status = Some(StatusMessage::new("已删除"));
            }
            Err(err) => self.list_status = Some(StatusMessage::new(&err.to_string())),
        }
        self.sync_list_selection();
    }

    fn enter_editor(&mut self) {
        self.edit = EditPane::new();
        self.view = View::Editor;
    }

    fn sync_list_selection(&mut self) {
        let len = self.repo.as_ref().map_or(0, |repo| repo.list().len());
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        let selected = self.list_state.selected().unwrap_or(0).min(len - 1);
        self.list_state.select(Some(selected));
    }

    fn move_input(&mut self, delta: isize) {
        let Some(template) = self.editor.current() else {
            return;
        };
        let len = input_slots(template).len();
        if len == 0 {
            return;
        }
        let current = self.edit.active_input as isize;
        self.edit.active_input = (current + delta).clamp(0, (len - 1) as isize) as usize;
    }

    pub(crate) fn active_slot(&self) -> Option<InputSlot> {
        let template = self.editor.current()?;
        let slots = input_slots(template);
        let index = self.edit.active_input.min(slots.len().saturating_sub(1));
        slots.get(index).copied()
    }

    fn push_active_char(&mut self, ch: char) {
        let Some(slot) = self.active_slot() else {
            return;
        };
        let Some(template) = self.editor.current_mut() else {
            return;
        };
        match slot {
            InputSlot::Name => {
                if ch != '\n' {
                    template.name.push(ch);
                }
            }
            InputSlot::Label(position) => {
                if ch != '\n' {
                    if let Some(label) = template
                        .fields
                        .get_mut(position)
                        .and_then(|field| field.label_mut())
                    {
                        label.push(ch);
                    }
                }
            }
            InputSlot::Tag(position) => {
                if ch != '\n' {
                    if let Some(tag) = template
                        .fields
                        .get_mut(position)
                        .and_then(|field| field.tag_mut())
                    {
                        tag.push(ch);
                    }
                }
            }
            InputSlot::Content(position) => {
                if let Some(field) = template.fields.get_mut(position) {
                    field.content_mut().push(ch);
                }
            }
        }
    }

    fn pop_active_char(&mut self) {
        let Some(slot) = self.active_slot() else {
            return;
        };
        let Some(template) = self.editor.current_mut() else {
            return;
        };
        match slot {
            InputSlot::Name => {
                template.name.pop();
            }
            InputSlot::Label(position) => {
                if let Some(label) = template
                    .fields
                    .get_mut(position)
                    .and_then(|field| field.label_mut())
                {
                    label.pop();
                }
            }
            InputSlot::Tag(position) => {
                if let Some(tag) = template
                    .fields
                    .get_mut(position)
                    .and_then(|field| field.tag_mut())
                {
                    tag.pop();
                }
            }
            InputSlot::Content(position) => {
                if let Some(field) = template.fields.get_mut(position) {
                    field.content_mut().pop();
                }
            }
        }
    }

    fn append_field(&mut self, kind: FieldKind) {
        let id = self.editor.add_field(kind);
        let Some(template) = self.editor.current() else {
            return;
        };
        let Some(position) = template.fields.iter().position(|field| field.id() == id) else {
            return;
        };
        let slots = input_slots(template);
        if let Some(index) = slots
            .iter()
            .position(|slot| *slot == InputSlot::Content(position))
        {
            self.edit.active_input = index;
        }
    }

    fn remove_active_field(&mut self) {
        let Some(slot) = self.active_slot() else {
            return;
        };
        let Some(position) = slot.field_position() else {
            return;
        };
        let id = match self
            .editor
            .current()
            .and_then(|template| template.fields.get(position))
        {
            Some(field) => field.id().to_string(),
            None => return,
        };
        self.editor.remove_field(&id);
        self.clamp_active_input();
    }

    fn move_active_field(&mut self, direction: MoveDirection) {
        let Some(slot) = self.active_slot() else {
            return;
        };
        let Some(position) = slot.field_position() else {
            return;
        };
        let id = match self
            .editor
            .current()
            .and_then(|template| template.fields.get(position))
        {
            Some(field) => field.id().to_string(),
            None => return,
        };
        self.editor.move_field(&id, direction);

        // Keep the focus on the same input of the moved field.
        let Some(template) = self.editor.current() else {
            return;
        };
        let Some(new_position) = template.fields.iter().position(|field| field.id() == id) else {
            return;
        };
        let target = match slot {
            InputSlot::Name => InputSlot::Name,
            InputSlot::Label(_) => InputSlot::Label(new_position),
            InputSlot::Tag(_) => InputSlot::Tag(new_position),
            InputSlot::Content(_) => InputSlot::Content(new_position),
        };
        if let Some(index) = input_slots(template).iter().position(|s| *s == target) {
            self.edit.active_input = index;
        }
    }

    fn clamp_active_input(&mut self) {
        let Some(template) = self.editor.current() else {
            return;
        };
        let len = input_slots(template).len();
        if len == 0 {
            self.edit.active_input = 0;
        } else if self.edit.active_input >= len {
            self.edit.active_input = len - 1;
        }
    }

    fn save_template(&mut self) {
        let Some(repo) = self.repo.as_mut() else {
            return;
        };
        match self.editor.save(repo) {
            Ok(true) => {
                if let Some(template) = self.editor.current() {
                    tracing::info!(id = %template.id, name = %template.name, "模板已保存");
                }
                self.set_edit_status("已保存");
            }
            Ok(false) => self.set_edit_status("没有打开的模板"),
            Err(err) => self.set_edit_status(&err.to_string()),
        }
    }

    fn copy_rendered(&mut self) {
        let Some(template) = self.editor.current() else {
            return;
        };
        let rendered = render(&template.fields);
        if rendered.is_empty() {
            self.set_edit_status("没有可复制的内容");
            return;
        }
        match system::set_clipboard(&rendered) {
            Ok(()) => self.set_edit_status("已复制"),
            Err(err) => self.set_edit_status(&err),
        }
    }

    fn set_edit_status(&mut self, text: &str) {
        self.edit.status = Some(StatusMessage::new(text));
    }

    fn index_from_mouse(&self, mouse: MouseEvent) -> Option<usize> {
        let area = self.list_area;
        if area.width == 0 || area.height == 0 {
            return None;
        }
        if mouse.column < area.x
            || mouse.column >= area.x + area.width
            || mouse.row < area.y
            || mouse.row >= area.y + area.height
        {
            return None;
        }
        let row_offset = (mouse.row - area.y) as usize;
        let index = self.list_scroll + row_offset;
        let len = self.repo.as_ref().map_or(0, |repo| repo.list().len());
        if index >= len {
            return None;
        }
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Field;
    use crate::repo::testing::MemoryStore;

    fn app() -> App {
        let repo = TemplateRepository::open(Box::new(MemoryStore::default())).unwrap();
        App::with_repo(repo)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    #[test]
    fn slots_order_name_then_per_field_inputs() {
        let mut template = Template::new("1".to_string());
        template.fields.push(Field::new(FieldKind::Text, "1".to_string()));
        template.fields.push(Field::new(FieldKind::Xml, "2".to_string()));
        template
            .fields
            .push(Field::new(FieldKind::Filepath, "3".to_string()));

        assert_eq!(
            input_slots(&template),
            vec![
                InputSlot::Name,
                InputSlot::Label(0),
                InputSlot::Content(0),
                InputSlot::Label(1),
                InputSlot::Tag(1),
                InputSlot::Content(1),
                InputSlot::Content(2),
            ]
        );
    }

    #[test]
    fn new_template_key_opens_editor() {
        let mut app = app();
        app.on_key(key(KeyCode::Char('n')));
        assert_eq!(app.view, View::Editor);
        assert!(app.editor.is_editing());
        assert_eq!(app.active_slot(), Some(InputSlot::Name));
    }

    #[test]
    fn typing_edits_the_name_slot() {
        let mut app = app();
        app.on_key(key(KeyCode::Char('n')));
        app.on_key(key(KeyCode::Backspace));
        app.on_key(key(KeyCode::Char('A')));
        app.on_key(key(KeyCode::Char('!')));
        assert_eq!(app.editor.current().unwrap().name, "New TemplatA!");
    }

    #[test]
    fn ctrl_t_appends_text_field_and_focuses_its_content() {
        let mut app = app();
        app.on_key(key(KeyCode::Char('n')));
        app.on_key(ctrl('t'));

        let template = app.editor.current().unwrap();
        assert_eq!(template.fields.len(), 1);
        assert_eq!(template.fields[0].kind(), FieldKind::Text);
        assert_eq!(app.active_slot(), Some(InputSlot::Content(0)));
    }

    #[test]
    fn enter_inserts_newline_only_in_content_slots() {
        let mut app = app();
        app.on_key(key(KeyCode::Char('n')));
        app.on_key(key(KeyCode::Enter));
        assert!(!app.editor.current().unwrap().name.contains('\n'));

        app.on_key(ctrl('l'));
        app.on_key(key(KeyCode::Char('x')));
        app.on_key(key(KeyCode::Enter));
        app.on_key(key(KeyCode::Char('y')));
        assert_eq!(app.editor.current().unwrap().fields[0].content(), "x\ny");
    }

    #[test]
    fn ctrl_d_removes_the_focused_field() {
        let mut app = app();
        app.on_key(key(KeyCode::Char('n')));
        app.on_key(ctrl('t'));
        app.on_key(ctrl('l'));
        app.on_key(ctrl('d'));

        let template = app.editor.current().unwrap();
        assert_eq!(template.fields.len(), 1);
        assert_eq!(template.fields[0].kind(), FieldKind::Text);
    }

    #[test]
    fn ctrl_k_moves_focused_field_up_and_follows_it() {
        let mut app = app();
        app.on_key(key(KeyCode::Char('n')));
        app.on_key(ctrl('t'));
        app.on_key(ctrl('l'));
        app.on_key(ctrl('k'));

        let template = app.editor.current().unwrap();
        assert_eq!(template.fields[0].kind(), FieldKind::List);
        assert_eq!(app.active_slot(), Some(InputSlot::Content(0)));
    }

    #[test]
    fn esc_returns_to_list_without_closing_session() {
        let mut app = app();
        app.on_key(key(KeyCode::Char('n')));
        app.on_key(key(KeyCode::Esc));
        assert_eq!(app.view, View::List);
        assert!(app.editor.is_editing());
    }

    #[test]
    fn saving_then_deleting_from_list_clears_session() {
        let mut app = app();
        app.on_key(key(KeyCode::Char('n')));
        app.on_key(ctrl('s'));
        app.on_key(key(KeyCode::Esc));
        assert_eq!(app.repo.as_ref().unwrap().list().len(), 1);

        app.on_key(key(KeyCode::Char('d')));
        assert!(app.repo.as_ref().unwrap().list().is_empty());
        assert!(!app.editor.is_editing());
        assert_eq!(app.list_state.selected(), None);
    }
}
