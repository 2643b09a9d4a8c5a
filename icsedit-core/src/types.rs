use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::projector::generate_uid;

/// 默认PRODID
pub const DEFAULT_PRODUCT_ID: &str = "-//ICS Calendar Viewer & Editor//EN";
/// 默认VERSION
pub const DEFAULT_VERSION: &str = "2.0";
/// 导出时的MIME类型
pub const ICS_MIME_TYPE: &str = "text/calendar;charset=utf-8";
/// 没有导入文件名时使用的默认文件名
pub const DEFAULT_FILE_NAME: &str = "calendar.ics";
/// 没有SUMMARY时的默认标题
pub const UNTITLED_EVENT: &str = "Untitled Event";

/// 日程分类（仅应用层使用，不写入ICS）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
    pub color: &'static str,
}

/// 固定的分类调色板，第一个为默认分类
pub const CATEGORIES: [Category; 7] = [
    Category { id: "blue", name: "Blue", color: "#4285F4" },
    Category { id: "red", name: "Red", color: "#EA4335" },
    Category { id: "yellow", name: "Yellow", color: "#FBBC05" },
    Category { id: "green", name: "Green", color: "#34A853" },
    Category { id: "purple", name: "Purple", color: "#8E24AA" },
    Category { id: "cyan", name: "Cyan", color: "#24C1E0" },
    Category { id: "orange", name: "Orange", color: "#F4511E" },
];

pub const DEFAULT_CATEGORY: &str = CATEGORIES[0].id;

/// 查找分类，找不到时返回默认分类
pub fn category_or_default(id: &str) -> &'static Category {
    CATEGORIES
        .iter()
        .find(|c| c.id == id)
        .unwrap_or(&CATEGORIES[0])
}

/// 应用层日程记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// 对应ICS的UID
    pub id: String,
    pub title: String,
    /// 开始时间（本地时间，无时区）
    pub start: NaiveDateTime,
    /// 结束时间（本地时间，无时区）
    pub end: NaiveDateTime,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    /// 分类，不会序列化到ICS
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub all_day: bool,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl EventRecord {
    /// 新建日程时使用的草稿：从now开始，持续一小时
    pub fn draft(now: NaiveDateTime) -> Self {
        Self {
            id: generate_uid(),
            title: "New Event".to_string(),
            start: now,
            end: now + Duration::hours(1),
            description: String::new(),
            location: String::new(),
            category: default_category(),
            all_day: false,
        }
    }
}

/// 日历配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarOptions {
    pub product_id: String,
    pub version: String,
    /// 没有导入文件名时的导出文件名
    pub default_file_name: String,
    /// 折行宽度（字节）
    pub fold_width: usize,
    /// 导出时是否为没有VEVENT的记录补建组件
    pub materialize_unbacked: bool,
}

impl Default for CalendarOptions {
    fn default() -> Self {
        Self {
            product_id: DEFAULT_PRODUCT_ID.to_string(),
            version: DEFAULT_VERSION.to_string(),
            default_file_name: DEFAULT_FILE_NAME.to_string(),
            fold_width: 75,
            materialize_unbacked: false,
        }
    }
}

/// 导入使用的解析路径
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportPath {
    Structured,
    Fallback,
}

/// 导入结果摘要
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub path: ImportPath,
    pub event_count: usize,
}

/// 导出结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
    pub file_name: String,
    pub mime_type: &'static str,
    pub content: String,
}
