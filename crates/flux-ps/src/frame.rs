// 解封装输出类型

use crate::pts::pts_to_secs;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// 媒体类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Video,
    Audio,
    /// 非音视频的私有数据单元
    Event,
}

impl MediaType {
    /// 与播放器 SDK 约定的媒体类型标志位
    pub fn flag(&self) -> u32 {
        match self {
            Self::Video => 0x0000_0001,
            Self::Audio => 0x0000_0002,
            Self::Event => 0x0000_0004,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Event => "event",
        }
    }
}

/// 完整的访问单元（一帧）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub media_type: MediaType,

    /// 90 kHz PTS
    pub pts: Option<u64>,

    pub data: Bytes,

    /// PES 扩展字段中的私有数据
    pub reserved: Option<Bytes>,
}

impl Frame {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn timestamp_secs(&self) -> Option<f64> {
        self.pts.map(pts_to_secs)
    }
}

/// 解封装调用结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DemuxOutput {
    Frame(Frame),

    /// 数据不足，已缓存，等待下一次输入
    NeedMoreInput,

    /// 文件已读完
    EndOfStream,
}

impl DemuxOutput {
    pub fn into_frame(self) -> Option<Frame> {
        match self {
            Self::Frame(frame) => Some(frame),
            _ => None,
        }
    }
}
