//! 备用解析器
//!
//! 逐行扫描，不校验嵌套，只认识 VEVENT 内的几个属性。结构化解析器
//! 失败或没有得到任何日程时才会使用，永远不会返回错误。

use chrono::{Duration, Local, NaiveDateTime, SubsecRound};

use crate::{
    EventRecord, UNTITLED_EVENT,
    datetime::decode_positional,
    projector::{CategoryPicker, generate_uid},
};

/// 解析中的日程，开始/结束时间可能尚未确定
struct PendingEvent {
    id: String,
    title: String,
    description: String,
    location: String,
    category: String,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
}

impl PendingEvent {
    fn open(category: String) -> Self {
        Self {
            id: generate_uid(),
            title: UNTITLED_EVENT.to_string(),
            description: String::new(),
            location: String::new(),
            category,
            start: None,
            end: None,
        }
    }

    fn assign(&mut self, key: &str, value: &str) {
        match key {
            "SUMMARY" => self.title = value.to_string(),
            "DESCRIPTION" => self.description = value.to_string(),
            "LOCATION" => self.location = value.to_string(),
            "UID" => self.id = value.to_string(),
            "DTSTART" => {
                self.start = decode_positional(value);
                if self.start.is_none() {
                    tracing::debug!("备用解析器无法解码DTSTART: {}", value);
                }
            }
            "DTEND" => {
                self.end = decode_positional(value).or_else(|| {
                    tracing::debug!("备用解析器无法解码DTEND: {}，使用开始时间后一小时", value);
                    let base = self
                        .start
                        .unwrap_or_else(|| Local::now().naive_local().trunc_subsecs(0));
                    Some(base + Duration::hours(1))
                });
            }
            _ => {}
        }
    }

    /// 只有开始时间确定的日程才会提交；缺少结束时间时取开始后一小时
    fn commit(self) -> Option<EventRecord> {
        let start = self.start?;
        Some(EventRecord {
            id: self.id,
            title: self.title,
            start,
            end: self.end.unwrap_or(start + Duration::hours(1)),
            description: self.description,
            location: self.location,
            category: self.category,
            all_day: false,
        })
    }
}

/// 逐行提取日程记录
pub fn parse_events(text: &str, picker: &mut dyn CategoryPicker) -> Vec<EventRecord> {
    let mut events = Vec::new();
    let mut current: Option<PendingEvent> = None;

    for line in text.split('\n') {
        let line = line.trim();

        if line == "BEGIN:VEVENT" {
            current = Some(PendingEvent::open(picker.pick()));
        } else if line == "END:VEVENT" {
            if let Some(pending) = current.take() {
                match pending.commit() {
                    Some(record) => events.push(record),
                    None => tracing::debug!("备用解析器丢弃了缺少开始时间的日程"),
                }
            }
        } else if let Some(pending) = current.as_mut() {
            if let Some((key, value)) = line.split_once(':') {
                pending.assign(key, value);
            }
        }
    }

    tracing::info!("备用解析器找到 {} 个日程", events.len());
    events
}
