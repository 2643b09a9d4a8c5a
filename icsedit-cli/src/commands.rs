use std::path::PathBuf;

use anyhow::{Result, bail};
use chrono::{Local, NaiveDate, NaiveDateTime};
use icsedit_core::{datetime::decode_date, prelude::*};

use crate::OutputArgs;

/// 命令行接受的时间格式
const DATE_TIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

/// 解析时间参数，返回时间和是否只有日期
pub fn parse_time_arg(value: &str) -> Result<(NaiveDateTime, bool)> {
    let value = value.trim();

    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok((dt, false));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok((date.and_time(chrono::NaiveTime::MIN), true));
    }
    if let Some(decoded) = decode_date(value) {
        return Ok((decoded.naive(), decoded.is_date()));
    }

    bail!("无法识别的时间格式: {}（示例: 2024-03-04 09:30 或 2024-03-04）", value)
}

fn options_for(output: &OutputArgs) -> CalendarOptions {
    CalendarOptions {
        materialize_unbacked: output.include_unbacked,
        ..Default::default()
    }
}

/// 从文件或URL导入日历
async fn load(input: &str, options: CalendarOptions) -> Result<Calendar> {
    let source = open_source(input)?;
    let mut calendar = Calendar::new(options);
    let summary = calendar
        .import_from(source.as_ref(), &mut RandomCategory::new())
        .await?;

    tracing::info!("使用{:?}解析器导入了 {} 个日程", summary.path, summary.event_count);
    println!("✓ 已导入 {} 个日程 ({:?})", summary.event_count, summary.path);

    Ok(calendar)
}

/// 导出并写入文件
async fn save(calendar: &mut Calendar, output: &OutputArgs) -> Result<()> {
    let sink = FileSink::new(output.output.as_ref().map(PathBuf::from));
    let payload = calendar.export_to(&sink).await?;
    println!("✓ ICS文件已保存到: {}", sink.target(&payload).display());

    let skipped = calendar.unbacked_ids().len();
    if skipped > 0 {
        println!("! {} 个日程没有导出，使用 --include-unbacked 一并导出", skipped);
    }

    Ok(())
}

/// 列表中的一行：id、标题、时间和分类名
fn event_line(event: &EventRecord) -> String {
    let time = if event.all_day {
        event.start.format("%Y-%m-%d").to_string()
    } else {
        format!(
            "{} - {}",
            event.start.format("%Y-%m-%d %H:%M"),
            event.end.format("%Y-%m-%d %H:%M")
        )
    };
    format!(
        "  [{}] {} ({}) #{}",
        event.id,
        event.title,
        time,
        category_or_default(&event.category).name
    )
}

/// 列出日程命令
pub async fn show_command(input: String, json: bool) -> Result<()> {
    let calendar = load(&input, CalendarOptions::default()).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(calendar.events())?);
        return Ok(());
    }

    println!("日程列表:");
    for event in calendar.events() {
        println!("{}", event_line(event));
        if !event.location.is_empty() {
            println!("    地点: {}", event.location);
        }
        if !event.description.is_empty() {
            println!("    描述: {}", event.description.replace('\n', "\n          "));
        }
    }

    Ok(())
}

/// 重新导出命令
pub async fn export_command(input: String, output: OutputArgs) -> Result<()> {
    let mut calendar = load(&input, options_for(&output)).await?;
    save(&mut calendar, &output).await
}

/// 新增日程命令参数
pub struct AddParams {
    pub input: String,
    pub title: String,
    pub start: String,
    pub end: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub id: Option<String>,
    pub output: OutputArgs,
}

/// 新增日程命令
pub async fn add_command(params: AddParams) -> Result<()> {
    let (start, start_is_date) = parse_time_arg(&params.start)?;
    let (end, end_is_date) = parse_time_arg(&params.end)?;
    if end < start {
        bail!("结束时间早于开始时间");
    }

    let mut record = EventRecord::draft(Local::now().naive_local());
    if let Some(id) = params.id {
        record.id = id;
    }
    record.title = params.title;
    record.start = start;
    record.end = end;
    record.all_day = start_is_date && end_is_date;
    record.description = params.description.unwrap_or_default();
    record.location = params.location.unwrap_or_default();

    let mut calendar = load(&params.input, options_for(&params.output)).await?;
    let id = record.id.clone();
    calendar.add_event(record)?;
    println!("✓ 已添加日程: {}", id);

    save(&mut calendar, &params.output).await
}

/// 修改日程命令参数
pub struct UpdateParams {
    pub input: String,
    pub id: String,
    pub title: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub output: OutputArgs,
}

/// 修改日程命令
pub async fn update_command(params: UpdateParams) -> Result<()> {
    let mut calendar = load(&params.input, options_for(&params.output)).await?;

    let Some(existing) = calendar.event(&params.id) else {
        bail!("日程不存在: {}", params.id);
    };
    let mut record = existing.clone();

    if let Some(title) = params.title {
        record.title = title;
    }
    if let Some(start) = params.start {
        let (start, is_date) = parse_time_arg(&start)?;
        record.start = start;
        record.all_day = is_date;
    }
    if let Some(end) = params.end {
        record.end = parse_time_arg(&end)?.0;
    }
    if let Some(description) = params.description {
        record.description = description;
    }
    if let Some(location) = params.location {
        record.location = location;
    }
    if record.end < record.start {
        bail!("结束时间早于开始时间");
    }

    calendar.update_event(record);
    println!("✓ 已更新日程: {}", params.id);

    save(&mut calendar, &params.output).await
}

/// 删除日程命令
pub async fn remove_command(input: String, id: String, output: OutputArgs) -> Result<()> {
    let mut calendar = load(&input, options_for(&output)).await?;

    match calendar.remove_event(&id) {
        Some(removed) => println!("✓ 已删除日程: {} ({})", removed.title, id),
        None => println!("日程不存在，未做修改: {}", id),
    }

    save(&mut calendar, &output).await
}

/// 生成空日历命令
pub async fn new_command(output: OutputArgs) -> Result<()> {
    let mut calendar = Calendar::new(options_for(&output));
    save(&mut calendar, &output).await
}
