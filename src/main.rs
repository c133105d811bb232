//! Voset - 语音集 TTS 工作站
//!
//! - Domain: set/, voice/, playback/ (Bounded Contexts)
//! - Application: commands, queries, ports
//! - Infrastructure: http, memory, worker, persistence, adapters, events

use std::sync::Arc;

use voset::config::{load_config, print_config};
use voset::infrastructure::adapters::{AesKeyVault, ElevenLabsClient, ElevenLabsClientConfig};
use voset::infrastructure::adapters::{FileClipStorage, RodioDeviceFactory};
use voset::infrastructure::events::EventPublisher;
use voset::infrastructure::http::{AppState, HttpServer, ServerConfig};
use voset::infrastructure::memory::{InMemoryGenerationTasks, PlaybackSessions};
use voset::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteCredentialRepository,
    SqliteMessageRepository, SqliteSetRepository,
};
use voset::infrastructure::worker::{GenerateWorker, GenerateWorkerConfig};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!(
        "{},voset={},tower_http=debug",
        config.log.level, config.log.level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .init();

    tracing::info!("Voset - 语音集 TTS 工作站");
    print_config(&config);

    // 确保数据目录存在
    tokio::fs::create_dir_all(&config.storage.audio_dir).await?;
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 初始化数据库
    let db_config = DatabaseConfig {
        database_url: config.database.database_url(),
        max_connections: config.database.max_connections,
    };
    let pool = create_pool(&db_config).await?;
    run_migrations(&pool).await?;

    // 创建 Repository 适配器
    let set_repo = Arc::new(SqliteSetRepository::new(pool.clone()));
    let message_repo = Arc::new(SqliteMessageRepository::new(pool.clone()));
    let credential_repo = Arc::new(SqliteCredentialRepository::new(pool.clone()));

    // Key Vault（密钥材料来自 VOSET_ENCRYPTION_SECRET）
    let key_vault = Arc::new(
        AesKeyVault::from_env(credential_repo.clone())
            .map_err(|e| anyhow::anyhow!("Failed to initialize key vault: {}", e))?,
    );

    // ElevenLabs 合成客户端
    let speech_config = ElevenLabsClientConfig {
        base_url: config.speech.base_url.clone(),
        timeout_secs: config.speech.timeout_secs,
    };
    let speech_engine = Arc::new(
        ElevenLabsClient::new(speech_config)
            .map_err(|e| anyhow::anyhow!("Failed to create speech client: {}", e))?,
    );

    // 音频文件存储
    let audio_storage = Arc::new(FileClipStorage::new(&config.storage.audio_dir).await?);

    // 创建事件发布器
    let event_publisher = Arc::new(EventPublisher::new());

    // 创建任务队列
    let (task_tx, task_rx) = mpsc::channel(1000);
    let generation_tasks = Arc::new(InMemoryGenerationTasks::new(task_tx));

    // 创建 GenerateWorker
    let worker_config = GenerateWorkerConfig {
        max_concurrent: config.worker.max_concurrent,
        model_id: config.speech.model_id.clone(),
    };
    let worker = GenerateWorker::new(
        worker_config,
        task_rx,
        generation_tasks.clone(),
        set_repo.clone(),
        message_repo.clone(),
        key_vault.clone(),
        speech_engine.clone(),
        audio_storage.clone(),
        event_publisher.clone(),
    );

    // 启动 Worker
    tokio::spawn(worker.run());

    // 播放会话（宿主音频输出，每个会话一个设备句柄）
    let device_factory = Arc::new(RodioDeviceFactory::new(reqwest::Client::new()));
    let playback_sessions = Arc::new(PlaybackSessions::new(device_factory));

    // 创建 HTTP 服务器
    let server_config = ServerConfig::new(&config.server.host, config.server.port);
    let state = AppState::new(
        set_repo,
        message_repo,
        audio_storage,
        key_vault,
        generation_tasks,
        playback_sessions,
        event_publisher,
        config.server.public_base_url(),
    );

    let server = HttpServer::new(server_config, state);

    tracing::info!("Starting HTTP server...");

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to listen for ctrl-c");
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
