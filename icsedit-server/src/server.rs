use std::net::SocketAddr;

use anyhow::Result;
use tokio::net::TcpListener;

use crate::handlers::create_app;

/// 未设置或无法解析`PORT`时使用的端口
pub const DEFAULT_PORT: u16 = 3000;

/// 解析`PORT`环境变量的值
pub fn resolve_port(raw: Option<&str>) -> u16 {
    let Some(raw) = raw else {
        return DEFAULT_PORT;
    };
    raw.trim().parse().unwrap_or_else(|_| {
        tracing::warn!("无效的PORT: {:?}，使用默认端口 {}", raw, DEFAULT_PORT);
        DEFAULT_PORT
    })
}

pub async fn start_server(port: u16) -> Result<()> {
    let app = create_app();
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!("icsedit server starting on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_defaults_when_unset_or_invalid() {
        assert_eq!(resolve_port(None), DEFAULT_PORT);
        assert_eq!(resolve_port(Some("abc")), DEFAULT_PORT);
        assert_eq!(resolve_port(Some("70000")), DEFAULT_PORT);
    }

    #[test]
    fn port_parses_explicit_value() {
        assert_eq!(resolve_port(Some("8080")), 8080);
        assert_eq!(resolve_port(Some(" 9000 ")), 9000);
    }
}
