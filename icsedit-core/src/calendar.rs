//! 日历会话：持有文档、日程记录和导入的文件名

use crate::{
    CalendarOptions, EventRecord, ExportPayload, ICS_MIME_TYPE, ImportSummary, Result,
    document::CalendarDocument,
    import::import_ics,
    mutation,
    projector::{CategoryPicker, new_component},
    serializer::Serializer,
    source::{CalendarSink, CalendarSource},
};

/// 一个正在编辑的日历
#[derive(Debug, Clone, Default)]
pub struct Calendar {
    document: Option<CalendarDocument>,
    events: Vec<EventRecord>,
    file_name: Option<String>,
    options: CalendarOptions,
}

impl Calendar {
    pub fn new(options: CalendarOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    /// 只有日程记录、还没有文档的日历，导出或修改时再生成文档
    pub fn with_events(options: CalendarOptions, events: Vec<EventRecord>) -> Self {
        Self {
            events,
            ..Self::new(options)
        }
    }

    pub fn document(&self) -> Option<&CalendarDocument> {
        self.document.as_ref()
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn event(&self, id: &str) -> Option<&EventRecord> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn options(&self) -> &CalendarOptions {
        &self.options
    }

    /// 导入ICS文本，成功时替换当前内容；失败时保持原状
    pub fn import(
        &mut self,
        file_name: Option<String>,
        text: &str,
        picker: &mut dyn CategoryPicker,
    ) -> Result<ImportSummary> {
        let (document, events, path) = import_ics(text, picker).into_parts(&self.options)?;

        tracing::info!(
            "导入 {} 完成: {} 个日程 ({:?})",
            file_name.as_deref().unwrap_or("<未命名>"),
            events.len(),
            path
        );

        let summary = ImportSummary {
            path,
            event_count: events.len(),
        };
        self.document = Some(document);
        self.events = events;
        self.file_name = file_name;
        Ok(summary)
    }

    /// 从外部来源读取并导入
    pub async fn import_from(
        &mut self,
        source: &dyn CalendarSource,
        picker: &mut dyn CategoryPicker,
    ) -> Result<ImportSummary> {
        let text = source.read_text().await?;
        self.import(source.file_name(), &text, picker)
    }

    /// 文档不存在时生成一个，并把现有记录全部投影进去
    fn parts(&mut self) -> (&mut CalendarDocument, &mut Vec<EventRecord>) {
        let events = &mut self.events;
        let options = &self.options;
        let document = self.document.get_or_insert_with(|| {
            tracing::debug!("生成新文档，投影 {} 个日程", events.len());
            let mut document = CalendarDocument::create_empty(&options.product_id, &options.version);
            for record in events.iter() {
                document.root_mut().push_child(new_component(record));
            }
            document
        });
        (document, events)
    }

    pub fn add_event(&mut self, record: EventRecord) -> Result<()> {
        let (document, events) = self.parts();
        mutation::add_event(document, events, record)
    }

    pub fn update_event(&mut self, record: EventRecord) {
        let (document, events) = self.parts();
        mutation::update_event(document, events, record)
    }

    pub fn remove_event(&mut self, id: &str) -> Option<EventRecord> {
        // 没有文档且没有该记录时什么都不做，不生成文档
        if self.document.is_none() && !self.events.iter().any(|e| e.id == id) {
            return None;
        }
        let (document, events) = self.parts();
        mutation::remove_event(document, events, id)
    }

    /// 没有对应VEVENT的日程id
    pub fn unbacked_ids(&self) -> Vec<&str> {
        match &self.document {
            Some(document) => mutation::unbacked_ids(document, &self.events),
            None => Vec::new(),
        }
    }

    /// 生成ICS文本
    pub fn export(&mut self) -> ExportPayload {
        let materialize = self.options.materialize_unbacked;
        let fold_width = self.options.fold_width;
        let file_name = self
            .file_name
            .clone()
            .unwrap_or_else(|| self.options.default_file_name.clone());

        let (document, events) = self.parts();
        if materialize {
            let created = mutation::materialize(document, events);
            if created > 0 {
                tracing::info!("为 {} 个日程补建了VEVENT", created);
            }
        } else {
            for id in mutation::unbacked_ids(document, events) {
                tracing::warn!("日程 {} 没有对应的VEVENT，不会被导出", id);
            }
        }

        let content = Serializer::new(fold_width).serialize(document);
        tracing::info!("导出 {}，{} 字节", file_name, content.len());

        ExportPayload {
            file_name,
            mime_type: ICS_MIME_TYPE,
            content,
        }
    }

    /// 导出并写到外部目标
    pub async fn export_to(&mut self, sink: &dyn CalendarSink) -> Result<ExportPayload> {
        let payload = self.export();
        sink.write_text(&payload).await?;
        Ok(payload)
    }
}
