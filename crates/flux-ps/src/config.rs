use crate::{DemuxError, Result};
use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 默认缓冲区大小：2 MiB，足以容纳高码率视频帧
pub const DEFAULT_BUFFER_CAPACITY: usize = 2 * 1024 * 1024;

/// 文件模式每次读取的字节数
pub const DEFAULT_READ_BLOCK_SIZE: usize = 1024;

/// PS 解封装配置
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DemuxConfig {
    /// 待处理输入缓冲区容量
    pub buffer_capacity: usize,

    /// 帧缓冲区容量
    pub frame_capacity: usize,

    /// 文件模式单次读取大小
    pub read_block_size: usize,

    /// 短尾包判定：累积帧的最小字节数
    pub min_frame_size: usize,

    /// 短尾包判定：pes_length 阈值
    pub trailing_pes_threshold: usize,

    /// 是否把私有流 (0xBD) 作为事件帧输出
    pub emit_private_stream: bool,
}

impl Default for DemuxConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            frame_capacity: DEFAULT_BUFFER_CAPACITY,
            read_block_size: DEFAULT_READ_BLOCK_SIZE,
            min_frame_size: 128,
            trailing_pes_threshold: 1024,
            emit_private_stream: false,
        }
    }
}

impl DemuxConfig {
    /// 从 TOML 文件加载配置，文件不存在时使用默认值
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let config = Config::builder()
            .add_source(File::new(
                path.to_str()
                    .ok_or_else(|| DemuxError::Config("Invalid config path".to_string()))?,
                FileFormat::Toml,
            ))
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 验证配置
    pub fn validate(&self) -> Result<()> {
        if self.read_block_size == 0 {
            return Err(DemuxError::Config(
                "read_block_size must be greater than 0".to_string(),
            ));
        }

        // 容量为 0 表示延迟分配（打开文件时分配默认大小）
        if self.buffer_capacity > 0 && self.read_block_size > self.buffer_capacity {
            return Err(DemuxError::Config(format!(
                "read_block_size ({}) cannot be greater than buffer_capacity ({})",
                self.read_block_size, self.buffer_capacity
            )));
        }

        Ok(())
    }
}
