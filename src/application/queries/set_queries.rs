//! Set Queries - 语音集相关查询

use uuid::Uuid;

/// 获取语音集详情
#[derive(Debug, Clone)]
pub struct GetSetQuery {
    pub set_id: Uuid,
}

/// 列出所有语音集
#[derive(Debug, Clone)]
pub struct ListSetsQuery;

/// 获取语音集内所有已生成音频的下载清单（导出用）
#[derive(Debug, Clone)]
pub struct GetSetAudioFilesQuery {
    pub set_id: Uuid,
}
