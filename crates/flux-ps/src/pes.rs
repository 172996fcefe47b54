// PES 包头解析
// 所有读取都经过切片边界检查，畸形的 pes_length 不会越界

use crate::packet::read_length;
use crate::pts::{parse_timestamp, TIMESTAMP_LEN};
use crate::{DemuxError, Result};
use std::ops::Range;

/// 固定 PES 头前缀：起始码(4) + 长度(2) + 标志(2) + 头部数据长度(1)
pub const PES_FIXED_HEADER_LEN: usize = 9;

/// 合法 PES 的最小 pes_length
pub const MIN_PES_LENGTH: usize = 10;

/// 扩展字段中承载私有数据前的固定部分
pub const EXTENSION_RESERVED_OFFSET: usize = 10;

/// PTS/DTS 标志
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PtsDtsFlags {
    None,
    Forbidden,
    PtsOnly,
    PtsAndDts,
}

impl PtsDtsFlags {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0b10 => Self::PtsOnly,
            0b11 => Self::PtsAndDts,
            0b01 => Self::Forbidden,
            _ => Self::None,
        }
    }

    pub fn has_pts(&self) -> bool {
        matches!(self, Self::PtsOnly | Self::PtsAndDts)
    }
}

/// 音视频 PES 包头
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PesHeader {
    /// 起始码在窗口中的偏移
    pub offset: usize,

    pub stream_id: u8,

    /// 16 位长度字段，不含起始码与自身
    pub pes_length: usize,

    pub pts_dts_flags: PtsDtsFlags,

    pub extension_present: bool,

    /// 头部数据长度（PTS/DTS、扩展、填充）
    pub extension_size: usize,

    pub pts: Option<u64>,

    pub dts: Option<u64>,
}

impl PesHeader {
    /// 解析 `offset` 处的 PES 包头
    ///
    /// 返回 `Ok(None)` 表示窗口内数据不足，需要更多输入；
    /// 长度字段不合理时返回 `MalformedPes`，由调用方跳过起始码重新同步。
    pub fn parse(data: &[u8], offset: usize) -> Result<Option<Self>> {
        let Some(pes_length) = read_length(data, offset) else {
            return Ok(None);
        };
        if pes_length < MIN_PES_LENGTH {
            return Err(DemuxError::MalformedPes {
                offset,
                reason: "pes_length shorter than header",
            });
        }

        let Some(fixed) = data.get(offset..offset + PES_FIXED_HEADER_LEN) else {
            return Ok(None);
        };
        let stream_id = fixed[3];
        let pts_dts_flags = PtsDtsFlags::from_bits(fixed[7] >> 6);
        let extension_present = fixed[7] & 0x01 == 0x01;
        let extension_size = fixed[8] as usize;

        if extension_present && extension_size <= EXTENSION_RESERVED_OFFSET {
            return Err(DemuxError::MalformedPes {
                offset,
                reason: "extension flag set with short header data",
            });
        }
        if 3 + extension_size > pes_length {
            return Err(DemuxError::MalformedPes {
                offset,
                reason: "header data exceeds pes_length",
            });
        }

        let ts_offset = offset + PES_FIXED_HEADER_LEN;
        let (pts, dts) = match pts_dts_flags {
            PtsDtsFlags::PtsOnly if extension_size >= TIMESTAMP_LEN => {
                (parse_timestamp(data, ts_offset), None)
            }
            PtsDtsFlags::PtsAndDts if extension_size >= 2 * TIMESTAMP_LEN => (
                parse_timestamp(data, ts_offset),
                parse_timestamp(data, ts_offset + TIMESTAMP_LEN),
            ),
            PtsDtsFlags::PtsOnly | PtsDtsFlags::PtsAndDts => {
                return Err(DemuxError::MalformedPes {
                    offset,
                    reason: "timestamp field truncated",
                });
            }
            _ => (None, None),
        };

        let header = Self {
            offset,
            stream_id,
            pes_length,
            pts_dts_flags,
            extension_present,
            extension_size,
            pts,
            dts,
        };

        // 等待整包到达
        if offset + header.total_len() > data.len() {
            return Ok(None);
        }

        Ok(Some(header))
    }

    /// 整个 PES 包占用的字节数
    pub fn total_len(&self) -> usize {
        self.pes_length + 6
    }

    pub fn payload_len(&self) -> usize {
        self.pes_length - 3 - self.extension_size
    }

    /// 负载在窗口中的范围
    pub fn payload_range(&self) -> Range<usize> {
        let start = self.offset + PES_FIXED_HEADER_LEN + self.extension_size;
        start..start + self.payload_len()
    }

    pub fn payload<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        &data[self.payload_range()]
    }

    /// 扩展字段携带的私有数据（例如 SPS/PPS 等编码参数）
    pub fn reserved<'a>(&self, data: &'a [u8]) -> Option<&'a [u8]> {
        if !self.extension_present || self.extension_size <= EXTENSION_RESERVED_OFFSET {
            return None;
        }

        let start = self.offset + PES_FIXED_HEADER_LEN + EXTENSION_RESERVED_OFFSET;
        let end = self.offset + PES_FIXED_HEADER_LEN + self.extension_size;
        data.get(start..end)
    }
}
