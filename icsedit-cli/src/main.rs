mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "icsedit")]
#[command(about = "ICS日历查看与编辑工具")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 启用详细日志
    #[arg(short, long)]
    verbose: bool,
}

/// 写出文件相关的参数
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// 输出文件路径（默认使用导入的文件名，或 calendar.ics）
    #[arg(short, long)]
    pub output: Option<String>,

    /// 为备用解析得到的日程补建VEVENT后一并导出
    #[arg(long)]
    pub include_unbacked: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// 导入ICS文件并列出日程
    Show {
        /// 文件路径或 http(s) 地址
        input: String,

        /// 以JSON格式输出
        #[arg(long)]
        json: bool,
    },

    /// 导入后重新生成ICS文件
    Export {
        /// 文件路径或 http(s) 地址
        input: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// 新增日程
    Add {
        /// 文件路径或 http(s) 地址
        input: String,

        /// 标题
        #[arg(short, long)]
        title: String,

        /// 开始时间（YYYY-MM-DD HH:MM，仅日期表示全天）
        #[arg(short, long)]
        start: String,

        /// 结束时间
        #[arg(short, long)]
        end: String,

        /// 描述
        #[arg(short, long)]
        description: Option<String>,

        /// 地点
        #[arg(short, long)]
        location: Option<String>,

        /// 指定UID（默认自动生成）
        #[arg(long)]
        id: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// 修改日程
    Update {
        /// 文件路径或 http(s) 地址
        input: String,

        /// 要修改的日程UID
        #[arg(long)]
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        start: Option<String>,

        #[arg(short, long)]
        end: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        location: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// 删除日程
    Remove {
        /// 文件路径或 http(s) 地址
        input: String,

        /// 要删除的日程UID
        #[arg(long)]
        id: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// 生成一个空日历
    New {
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 设置日志级别
    let log_level = if cli.verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("icsedit_cli={0},icsedit_core={0}", log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Show { input, json } => commands::show_command(input, json).await,

        Commands::Export { input, output } => commands::export_command(input, output).await,

        Commands::Add {
            input,
            title,
            start,
            end,
            description,
            location,
            id,
            output,
        } => {
            commands::add_command(commands::AddParams {
                input,
                title,
                start,
                end,
                description,
                location,
                id,
                output,
            })
            .await
        }

        Commands::Update {
            input,
            id,
            title,
            start,
            end,
            description,
            location,
            output,
        } => {
            commands::update_command(commands::UpdateParams {
                input,
                id,
                title,
                start,
                end,
                description,
                location,
                output,
            })
            .await
        }

        Commands::Remove { input, id, output } => {
            commands::remove_command(input, id, output).await
        }

        Commands::New { output } => commands::new_command(output).await,
    }
}
