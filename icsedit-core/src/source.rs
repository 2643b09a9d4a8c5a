//! 读取与写出ICS文本的外部边界，每次导入/导出只调用一次

use std::{path::PathBuf, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::{Error, ExportPayload, Result};

/// ICS文本来源
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// 读取全部文本，非法UTF-8按替换字符处理
    async fn read_text(&self) -> Result<String>;

    /// 来源对应的文件名，用作默认导出文件名
    fn file_name(&self) -> Option<String>;
}

/// 导出目标
#[async_trait]
pub trait CalendarSink: Send + Sync {
    async fn write_text(&self, payload: &ExportPayload) -> Result<()>;
}

/// 本地文件
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CalendarSource for FileSource {
    async fn read_text(&self) -> Result<String> {
        let bytes = tokio::fs::read(&self.path).await?;
        tracing::debug!("读取文件 {}，{} 字节", self.path.display(), bytes.len());
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn file_name(&self) -> Option<String> {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }
}

/// 远程ICS订阅地址
pub struct UrlSource {
    client: Client,
    url: Url,
}

impl UrlSource {
    pub fn new(url: &str) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| Error::Config(format!("Invalid URL {}: {}", url, e)))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("icsedit/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl CalendarSource for UrlSource {
    async fn read_text(&self) -> Result<String> {
        tracing::info!("下载日历: {}", self.url);
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await?
            .error_for_status()?;
        let bytes = response.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn file_name(&self) -> Option<String> {
        self.url
            .path_segments()?
            .filter(|segment| !segment.is_empty())
            .next_back()
            .map(str::to_string)
    }
}

/// 内存中的文本，服务端和测试使用
#[derive(Debug, Clone)]
pub struct TextSource {
    text: String,
    file_name: Option<String>,
}

impl TextSource {
    pub fn new(text: impl Into<String>, file_name: Option<String>) -> Self {
        Self {
            text: text.into(),
            file_name,
        }
    }
}

#[async_trait]
impl CalendarSource for TextSource {
    async fn read_text(&self) -> Result<String> {
        Ok(self.text.clone())
    }

    fn file_name(&self) -> Option<String> {
        self.file_name.clone()
    }
}

/// 写入本地文件。未指定路径时使用导出结果中的文件名
#[derive(Debug, Clone, Default)]
pub struct FileSink {
    path: Option<PathBuf>,
}

impl FileSink {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn target(&self, payload: &ExportPayload) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| PathBuf::from(&payload.file_name))
    }
}

#[async_trait]
impl CalendarSink for FileSink {
    async fn write_text(&self, payload: &ExportPayload) -> Result<()> {
        let target = self.target(payload);
        tokio::fs::write(&target, payload.content.as_bytes()).await?;
        tracing::info!("已写入 {}，{} 字节", target.display(), payload.content.len());
        Ok(())
    }
}

/// 按前缀选择来源：http(s) 地址走网络，其余视为本地路径
pub fn open_source(location: &str) -> Result<Box<dyn CalendarSource>> {
    let lower = location.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Ok(Box::new(UrlSource::new(location)?))
    } else {
        Ok(Box::new(FileSource::new(location)))
    }
}
