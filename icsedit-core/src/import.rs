//! 两阶段导入：结构化解析优先，没有得到任何日程时交给备用解析器

use std::collections::HashSet;

use crate::{
    CalendarOptions, Error, EventRecord, ImportPath, Result,
    document::{CalendarDocument, Component, PropertyValue},
    fallback,
    parser::parse,
    projector::{CategoryPicker, to_record},
};

/// 导入结果
#[derive(Debug)]
pub enum ImportOutcome {
    /// 结构化解析成功，每条记录都有对应的VEVENT
    Structured {
        document: CalendarDocument,
        events: Vec<EventRecord>,
    },
    /// 备用解析得到的记录，没有文档
    Fallback { events: Vec<EventRecord> },
    /// 两种解析都没有得到日程
    Failed,
}

impl ImportOutcome {
    pub fn path(&self) -> Option<ImportPath> {
        match self {
            Self::Structured { .. } => Some(ImportPath::Structured),
            Self::Fallback { .. } => Some(ImportPath::Fallback),
            Self::Failed => None,
        }
    }

    /// 拆成文档、记录和解析路径。备用解析的结果配一个空文档，
    /// 失败时返回 [`Error::NoEventsFound`]
    pub fn into_parts(
        self,
        options: &CalendarOptions,
    ) -> Result<(CalendarDocument, Vec<EventRecord>, ImportPath)> {
        match self {
            Self::Structured { document, events } => {
                Ok((document, events, ImportPath::Structured))
            }
            Self::Fallback { events } => {
                let document =
                    CalendarDocument::create_empty(&options.product_id, &options.version);
                Ok((document, events, ImportPath::Fallback))
            }
            Self::Failed => Err(Error::NoEventsFound),
        }
    }
}

/// 解析ICS文本
pub fn import_ics(text: &str, picker: &mut dyn CategoryPicker) -> ImportOutcome {
    match structured(text, picker) {
        Ok((document, events)) if !events.is_empty() => {
            tracing::info!("结构化解析得到 {} 个日程", events.len());
            return ImportOutcome::Structured { document, events };
        }
        Ok(_) => tracing::warn!("结构化解析没有得到日程，尝试备用解析器"),
        Err(e) => tracing::warn!("结构化解析失败，尝试备用解析器: {}", e),
    }

    let events = fallback::parse_events(text, picker);
    if events.is_empty() {
        tracing::warn!("两种解析方式都没有得到日程");
        ImportOutcome::Failed
    } else {
        ImportOutcome::Fallback { events }
    }
}

/// 解析文档并投影所有VEVENT。没有UID的VEVENT会写回生成的UID
fn structured(
    text: &str,
    picker: &mut dyn CategoryPicker,
) -> Result<(CalendarDocument, Vec<EventRecord>)> {
    let mut document = parse(text)?;
    let mut events = Vec::new();
    let mut seen = HashSet::new();

    document.root_mut().visit_mut(&mut |component: &mut Component| {
        if !component.is("vevent") {
            return;
        }
        match to_record(component, picker) {
            Ok(record) => {
                if component.value("UID").trim().is_empty() {
                    component.set_property("UID", PropertyValue::new(record.id.clone()));
                }
                if !seen.insert(record.id.clone()) {
                    tracing::warn!("UID重复: {}，编辑时只会修改第一个", record.id);
                }
                events.push(record);
            }
            Err(e) => tracing::warn!("跳过无法解析日期的日程: {}", e),
        }
    });

    Ok((document, events))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::projector::FixedCategory;

    fn picker() -> FixedCategory {
        FixedCategory("green".into())
    }

    fn import(text: &str) -> ImportOutcome {
        import_ics(text, &mut picker())
    }

    #[test]
    fn well_formed_calendar_takes_structured_path() {
        let text = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\nUID:1\r\n\
                    SUMMARY:Standup\r\nDTSTART:20240101T090000\r\nDTEND:20240101T091500\r\n\
                    END:VEVENT\r\nEND:VCALENDAR\r\n";
        let ImportOutcome::Structured { document, events } = import(text) else {
            panic!("expected structured outcome");
        };
        assert_eq!(document.events().count(), 1);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Standup");
        assert_eq!(events[0].category, "green");
    }

    #[test]
    fn missing_uid_is_written_back() {
        let text = "BEGIN:VCALENDAR\nBEGIN:VEVENT\nSUMMARY:No id\n\
                    DTSTART:20240101T090000\nDTEND:20240101T100000\nEND:VEVENT\nEND:VCALENDAR\n";
        let ImportOutcome::Structured { document, events } = import(text) else {
            panic!("expected structured outcome");
        };
        let uid = document.events().next().unwrap().value("UID").to_string();
        assert!(uid.starts_with("event-"));
        assert_eq!(events[0].id, uid);
    }

    #[test]
    fn undecodable_event_is_dropped_but_kept_in_document() {
        let text = "BEGIN:VCALENDAR\nBEGIN:VEVENT\nUID:bad\nDTSTART:soon\nDTEND:later\nEND:VEVENT\n\
                    BEGIN:VEVENT\nUID:good\nDTSTART:20240101\nDTEND:20240102\nEND:VEVENT\n\
                    END:VCALENDAR\n";
        let ImportOutcome::Structured { document, events } = import(text) else {
            panic!("expected structured outcome");
        };
        assert_eq!(document.events().count(), 2);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "good");
        assert!(events[0].all_day);
    }

    #[test]
    fn calendar_without_events_fails() {
        let text = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nEND:VCALENDAR\r\n";
        let outcome = import(text);
        assert!(matches!(outcome, ImportOutcome::Failed));
        assert!(outcome.path().is_none());
        let err = outcome.into_parts(&CalendarOptions::default()).unwrap_err();
        assert!(matches!(err, Error::NoEventsFound));
    }

    #[test]
    fn broken_nesting_falls_back() {
        let text = "BEGIN:VCALENDAR\nBEGIN:VEVENT\nSUMMARY:Lost\nDTSTART:20240615T143000\n\
                    END:VEVENT\n";
        let outcome = import(text);
        assert_eq!(outcome.path(), Some(ImportPath::Fallback));

        let (document, events, path) = outcome.into_parts(&CalendarOptions::default()).unwrap();
        assert_eq!(path, ImportPath::Fallback);
        assert_eq!(document.events().count(), 0);
        assert_eq!(document.root().value("VERSION"), "2.0");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Lost");
        let start = NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        assert_eq!(events[0].start, start);
        assert_eq!(events[0].end, start + chrono::Duration::hours(1));
    }

    #[test]
    fn unparseable_dates_fall_back_to_positional_decode() {
        // 带空格的日期只有按位置截取才能解码
        let text = "BEGIN:VCALENDAR\nBEGIN:VEVENT\nUID:x\nDTSTART:20240615 0930\nEND:VEVENT\n\
                    END:VCALENDAR\n";
        let ImportOutcome::Fallback { events } = import(text) else {
            panic!("expected fallback outcome");
        };
        assert_eq!(events[0].id, "x");
        assert_eq!(
            events[0].start,
            NaiveDate::from_ymd_opt(2024, 6, 15)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap()
        );
    }

    #[test]
    fn garbage_fails() {
        assert!(matches!(import("hello world"), ImportOutcome::Failed));
        assert!(matches!(import(""), ImportOutcome::Failed));
    }
}
