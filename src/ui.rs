use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, List, ListItem, ListState, Paragraph, Wrap};

use crate::app::{App, InputSlot, View, input_slots};
use crate::models::{Field, FieldKind, Template};
use crate::render::render;

const STATUS_DURATION_MS: u128 = 1500;
const SLOT_HEIGHT: u16 = 3;

pub(crate) fn render_app(frame: &mut Frame, app: &mut App) {
    match app.view {
        View::List => render_list(frame, app),
        View::Editor => render_editor(frame, app),
        View::Error => render_error(frame, app),
    }
}

fn render_error(frame: &mut Frame, app: &mut App) {
    let area = frame.area();
    let message = app
        .error_message
        .clone()
        .unwrap_or_else(|| "未知错误".to_string());
    let block = Block::bordered().title("错误");
    let paragraph = Paragraph::new(message)
        .block(block)
        .style(Style::new().fg(Color::Red))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_list(frame: &mut Frame, app: &mut App) {
    let area = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Fill(1), Constraint::Length(1)])
        .split(area);

    let list_area = layout[0];
    let help_area = layout[1];

    let names: Vec<String> = app
        .repo
        .as_ref()
        .map(|repo| {
            repo.list()
                .iter()
                .map(|template| template.name.clone())
                .collect()
        })
        .unwrap_or_default();

    let title = format!("模板列表 ({})", names.len());
    let block = Block::bordered().title(title);
    let inner = inner_rect(list_area);
    app.list_area = inner;

    if names.is_empty() {
        let empty = Paragraph::new("暂无模板，按 n 新建")
            .block(block)
            .style(Style::new().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
    } else {
        let view_height = inner.height as usize;
        app.list_scroll = ensure_visible(
            app.list_scroll,
            app.list_state.selected().unwrap_or(0),
            names.len(),
            view_height,
        );

        let start = app.list_scroll;
        let end = (start + view_height).min(names.len());
        let items: Vec<ListItem> = names[start..end]
            .iter()
            .map(|name| ListItem::new(name.clone()))
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::new().bg(Color::Blue).fg(Color::White))
            .highlight_symbol("> ");

        let mut state = ListState::default();
        if let Some(selected) = app.list_state.selected() {
            if selected >= start && selected < end {
                state.select(Some(selected - start));
            }
        }
        frame.render_stateful_widget(list, list_area, &mut state);
    }

    let mut help = "↑↓/j k 选择  Enter/双击 打开  n 新建  d 删除  q 退出".to_string();
    if let Some(message) = app
        .list_status
        .as_ref()
        .filter(|msg| msg.since.elapsed().as_millis() <= STATUS_DURATION_MS)
    {
        help.push_str("  |  ");
        help.push_str(&message.text);
    }
    let help = Paragraph::new(help).style(Style::new().fg(Color::DarkGray));
    frame.render_widget(help, help_area);
}

fn render_editor(frame: &mut Frame, app: &mut App) {
    let Some(template) = app.editor.current().cloned() else {
        return;
    };

    let area = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Fill(1), Constraint::Length(1)])
        .split(area);

    let content_area = layout[0];
    let status_area = layout[1];

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(content_area);

    let form_area = horizontal[0];
    let preview_area = horizontal[1];

    render_form(frame, app, &template, form_area);

    let title = format!("预览: {}", template.name);
    let rendered = render(&template.fields);
    render_preview(frame, &title, &rendered, preview_area);

    let mut status =
        "Esc 返回  Tab/↑↓ 切换  ^T/^L/^X/^F 添加  ^D 删除  ^K/^J 移动  ^S 保存  ^C 复制"
            .to_string();
    if let Some(message) = app
        .edit
        .status
        .as_ref()
        .filter(|msg| msg.since.elapsed().as_millis() <= STATUS_DURATION_MS)
    {
        status.push_str("  |  ");
        status.push_str(&message.text);
    }
    let status = Paragraph::new(status).style(Style::new().fg(Color::DarkGray));
    frame.render_widget(status, status_area);
}

fn render_form(frame: &mut Frame, app: &mut App, template: &Template, area: Rect) {
    let block = Block::bordered().title("字段");
    let inner = inner_rect(area);
    frame.render_widget(block, area);

    let slots = input_slots(template);
    let view_capacity = (inner.height / SLOT_HEIGHT) as usize;
    app.edit.form_scroll = ensure_visible(
        app.edit.form_scroll,
        app.edit.active_input.min(slots.len().saturating_sub(1)),
        slots.len(),
        view_capacity,
    );

    let start = app.edit.form_scroll;
    let end = (start + view_capacity).min(slots.len());

    for (idx, slot) in slots[start..end].iter().enumerate() {
        let is_active = start + idx == app.edit.active_input;
        let border_style = if is_active {
            Style::new().fg(Color::Blue)
        } else {
            Style::new().fg(Color::DarkGray)
        };
        let mut value = slot_value(template, *slot);
        if is_active {
            value.push('|');
        }
        let slot_area = Rect {
            x: inner.x,
            y: inner.y + (idx as u16) * SLOT_HEIGHT,
            width: inner.width,
            height: SLOT_HEIGHT,
        };
        let slot_block = Block::bordered()
            .title(slot_title(template, *slot))
            .border_style(border_style);
        let paragraph = Paragraph::new(value)
            .block(slot_block)
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, slot_area);
    }
}

fn slot_value(template: &Template, slot: InputSlot) -> String {
    match slot {
        InputSlot::Name => template.name.clone(),
        InputSlot::Label(position) => template
            .fields
            .get(position)
            .and_then(|field| field.label())
            .unwrap_or_default()
            .to_string(),
        InputSlot::Tag(position) => match template.fields.get(position) {
            Some(Field::Xml { tag, .. }) => tag.clone(),
            _ => String::new(),
        },
        InputSlot::Content(position) => template
            .fields
            .get(position)
            .map(|field| field.content().to_string())
            .unwrap_or_default(),
    }
}

fn slot_title(template: &Template, slot: InputSlot) -> String {
    match slot {
        InputSlot::Name => "模板名称".to_string(),
        InputSlot::Label(position) => {
            let kind = template
                .fields
                .get(position)
                .map_or(FieldKind::Text, |field| field.kind());
            format!("{} · 标签", kind.name())
        }
        InputSlot::Tag(_) => "XML 标签".to_string(),
        InputSlot::Content(position) => {
            let kind = template
                .fields
                .get(position)
                .map_or(FieldKind::Text, |field| field.kind());
            format!("{} · {}", kind.name(), kind.content_hint())
        }
    }
}

fn render_preview(frame: &mut Frame, title: &str, rendered: &str, area: Rect) {
    let paragraph = Paragraph::new(rendered)
        .block(Block::bordered().title(title))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn inner_rect(area: Rect) -> Rect {
    let mut inner = area;
    if inner.width >= 2 {
        inner.x += 1;
        inner.width -= 2;
    }
    if inner.height >= 2 {
        inner.y += 1;
        inner.height -= 2;
    }
    inner
}

fn ensure_visible(
    current_scroll: usize,
    selected: usize,
    total: usize,
    view_height: usize,
) -> usize {
    if total == 0 || view_height == 0 {
        return 0;
    }
    let mut scroll = current_scroll.min(total.saturating_sub(1));
    if selected < scroll {
        scroll = selected;
    } else if selected >= scroll + view_height {
        scroll = selected + 1 - view_height;
    }
    scroll
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Field;

    #[test]
    fn ensure_visible_scrolls_selection_into_view() {
        assert_eq!(ensure_visible(0, 0, 10, 4), 0);
        assert_eq!(ensure_visible(0, 5, 10, 4), 2);
        assert_eq!(ensure_visible(5, 2, 10, 4), 2);
        assert_eq!(ensure_visible(3, 9, 10, 4), 6);
    }

    #[test]
    fn slot_titles_carry_kind_and_hint() {
        let mut template = Template::new("1".to_string());
        template.fields.push(Field::new(FieldKind::List, "1".to_string()));
        template.fields.push(Field::new(FieldKind::Xml, "2".to_string()));

        assert_eq!(
            slot_title(&template, InputSlot::Content(0)),
            "List · List Items (one per line)"
        );
        assert_eq!(slot_title(&template, InputSlot::Tag(1)), "XML 标签");
    }

    #[test]
    fn slot_value_reads_the_backing_field() {
        let mut template = Template::new("1".to_string());
        template.name = "Review".to_string();
        let mut field = Field::new(FieldKind::Xml, "1".to_string());
        field.content_mut().push_str("body");
        template.fields.push(field);

        assert_eq!(slot_value(&template, InputSlot::Name), "Review");
        assert_eq!(slot_value(&template, InputSlot::Tag(0)), "tag");
        assert_eq!(slot_value(&template, InputSlot::Content(0)), "body");
    }
}
