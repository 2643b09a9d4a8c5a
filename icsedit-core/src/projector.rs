//! VEVENT组件与应用层日程记录之间的双向映射

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{NaiveDateTime, Utc};
use rand::{Rng, SeedableRng, rngs::StdRng, rngs::ThreadRng};
use uuid::Uuid;

use crate::{
    CATEGORIES, Error, EventRecord, Result, UNTITLED_EVENT,
    datetime::{IcsDate, decode_date, format_date_time},
    document::{Component, PropertyValue},
};

static LAST_STAMP: AtomicI64 = AtomicI64::new(0);

/// 单调递增的毫秒时间戳，同一毫秒内多次调用会顺延
fn monotonic_millis() -> i64 {
    let now = Utc::now().timestamp_millis();
    let mut last = LAST_STAMP.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_STAMP.compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(actual) => last = actual,
        }
    }
}

/// 生成UID：`event-<单调时间戳>-<随机后缀>`，进程内唯一
pub fn generate_uid() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("event-{}-{}", monotonic_millis(), &suffix[..9])
}

/// 导入时为日程分配分类
pub trait CategoryPicker {
    fn pick(&mut self) -> String;
}

impl<F> CategoryPicker for F
where
    F: FnMut() -> String,
{
    fn pick(&mut self) -> String {
        self()
    }
}

/// 从调色板中均匀随机选择
pub struct RandomCategory<R = ThreadRng> {
    rng: R,
}

impl RandomCategory<ThreadRng> {
    pub fn new() -> Self {
        Self { rng: rand::rng() }
    }
}

impl Default for RandomCategory<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomCategory<StdRng> {
    /// 固定种子，结果可复现
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> CategoryPicker for RandomCategory<R> {
    fn pick(&mut self) -> String {
        let index = self.rng.random_range(0..CATEGORIES.len());
        CATEGORIES[index].id.to_string()
    }
}

/// 始终返回同一个分类
#[derive(Debug, Clone)]
pub struct FixedCategory(pub String);

impl CategoryPicker for FixedCategory {
    fn pick(&mut self) -> String {
        self.0.clone()
    }
}

fn decode_property(vevent: &Component, name: &str) -> Result<IcsDate> {
    let raw = vevent.value(name);
    decode_date(raw).ok_or_else(|| Error::DateDecode {
        property: name.to_string(),
        value: raw.to_string(),
    })
}

/// VEVENT → 日程记录。DTSTART/DTEND无法解码时返回 [`Error::DateDecode`]
pub fn to_record(vevent: &Component, picker: &mut dyn CategoryPicker) -> Result<EventRecord> {
    let start = decode_property(vevent, "DTSTART")?;
    let end = decode_property(vevent, "DTEND")?;

    let all_day = start.is_date()
        || vevent
            .first("DTSTART")
            .and_then(|v| v.param("VALUE"))
            .is_some_and(|v| v.eq_ignore_ascii_case("DATE"));

    let id = match vevent.value("UID").trim() {
        "" => generate_uid(),
        uid => uid.to_string(),
    };
    let title = match vevent.value("SUMMARY") {
        "" => UNTITLED_EVENT.to_string(),
        summary => summary.to_string(),
    };

    Ok(EventRecord {
        id,
        title,
        start: start.naive(),
        end: end.naive(),
        description: vevent.value("DESCRIPTION").to_string(),
        location: vevent.value("LOCATION").to_string(),
        category: picker.pick(),
        all_day,
    })
}

fn date_time_value(dt: &NaiveDateTime) -> PropertyValue {
    PropertyValue::new(format_date_time(dt))
}

/// 日程记录 → VEVENT。分类和全天标记没有对应的ICS属性，不写入
pub fn to_component(record: &EventRecord, vevent: &mut Component) {
    vevent.set_property("UID", PropertyValue::new(record.id.clone()));
    vevent.set_property("SUMMARY", PropertyValue::new(record.title.clone()));
    vevent.set_property("DESCRIPTION", PropertyValue::new(record.description.clone()));
    vevent.set_property("LOCATION", PropertyValue::new(record.location.clone()));
    vevent.set_property("DTSTART", date_time_value(&record.start));
    vevent.set_property("DTEND", date_time_value(&record.end));
}

/// 为日程记录新建一个VEVENT
pub fn new_component(record: &EventRecord) -> Component {
    let mut vevent = Component::new("vevent");
    to_component(record, &mut vevent);
    vevent
}
