//! 按UID保持文档与日程记录一致的增删改操作，均不涉及I/O

use crate::{
    Error, EventRecord, Result,
    document::{CalendarDocument, Component},
    projector::{new_component, to_component},
};

fn vevent_with_uid(id: &str) -> impl FnMut(&Component) -> bool + '_ {
    move |c| c.is("vevent") && c.value("UID").trim() == id
}

fn has_vevent(document: &CalendarDocument, id: &str) -> bool {
    document.events().any(|e| e.value("UID").trim() == id)
}

/// 新增日程。id已存在时返回 [`Error::DuplicateId`]，不做任何修改
pub fn add_event(
    document: &mut CalendarDocument,
    events: &mut Vec<EventRecord>,
    record: EventRecord,
) -> Result<()> {
    if events.iter().any(|e| e.id == record.id) || has_vevent(document, &record.id) {
        tracing::warn!("拒绝新增重复的日程: {}", record.id);
        return Err(Error::DuplicateId(record.id));
    }

    document.root_mut().push_child(new_component(&record));
    events.push(record);
    Ok(())
}

/// 更新日程。找不到对应VEVENT时新建一个，记录按id替换或追加
pub fn update_event(
    document: &mut CalendarDocument,
    events: &mut Vec<EventRecord>,
    record: EventRecord,
) {
    match document
        .root_mut()
        .find_mut(&mut vevent_with_uid(&record.id))
    {
        Some(vevent) => to_component(&record, vevent),
        None => {
            tracing::debug!("日程 {} 没有对应的VEVENT，新建一个", record.id);
            document.root_mut().push_child(new_component(&record));
        }
    }

    match events.iter_mut().find(|e| e.id == record.id) {
        Some(slot) => *slot = record,
        None => events.push(record),
    }
}

/// 删除日程，不存在时什么都不做
pub fn remove_event(
    document: &mut CalendarDocument,
    events: &mut Vec<EventRecord>,
    id: &str,
) -> Option<EventRecord> {
    if document
        .root_mut()
        .remove_descendant(&mut vevent_with_uid(id))
        .is_none()
    {
        tracing::debug!("要删除的日程 {} 没有对应的VEVENT", id);
    }

    let index = events.iter().position(|e| e.id == id)?;
    Some(events.remove(index))
}

/// 没有对应VEVENT的日程id（只会出现在备用解析之后）
pub fn unbacked_ids<'a>(document: &CalendarDocument, events: &'a [EventRecord]) -> Vec<&'a str> {
    events
        .iter()
        .filter(|e| !has_vevent(document, &e.id))
        .map(|e| e.id.as_str())
        .collect()
}

/// 为所有没有VEVENT的日程补建组件，返回补建数量
pub fn materialize(document: &mut CalendarDocument, events: &[EventRecord]) -> usize {
    let mut created = 0;
    for record in events {
        if !has_vevent(document, &record.id) {
            document.root_mut().push_child(new_component(record));
            created += 1;
        }
    }
    created
}
