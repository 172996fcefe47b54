// 帧组装
// 把属于同一访问单元的 PES 负载拼接成完整帧

use crate::buffer::ByteBuffer;
use crate::frame::{Frame, MediaType};
use crate::Result;
use bytes::Bytes;
use std::collections::VecDeque;
use tracing::{debug, warn};

/// 帧边界判定策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryPolicy {
    /// PTS 变化即为新帧（实时包接口）
    PtsChange,

    /// 短尾包判定（流式/文件接口）
    ///
    /// 仅为兼容 PTS 不可靠的旧录像文件：`pes_length < threshold` 且已累积超过
    /// `min_frame_size` 字节时认为一帧结束。
    SmallTrailingPes {
        threshold: usize,
        min_frame_size: usize,
    },
}

/// 一个 PES 负载单元
#[derive(Debug, Clone, Copy)]
pub struct PesUnit<'a> {
    pub media_type: MediaType,
    pub pts: Option<u64>,
    pub pes_length: usize,
    pub payload: &'a [u8],
    pub reserved: Option<&'a [u8]>,
}

/// 帧组装器
#[derive(Debug)]
pub struct FrameAssembler {
    current_frame: ByteBuffer,
    current_media_type: Option<MediaType>,
    current_pts: Option<u64>,
    current_reserved: Option<Bytes>,
}

impl FrameAssembler {
    pub fn new(frame_capacity: usize) -> Result<Self> {
        let current_frame = if frame_capacity > 0 {
            ByteBuffer::allocate(frame_capacity)?
        } else {
            ByteBuffer::default()
        };

        Ok(Self {
            current_frame,
            current_media_type: None,
            current_pts: None,
            current_reserved: None,
        })
    }

    pub fn is_allocated(&self) -> bool {
        self.current_frame.is_allocated()
    }

    /// 按需分配帧缓冲区
    pub fn ensure_allocated(&mut self, frame_capacity: usize) -> Result<()> {
        if !self.current_frame.is_allocated() {
            self.current_frame = ByteBuffer::allocate(frame_capacity)?;
        }
        Ok(())
    }

    /// 当前累积的字节数
    pub fn len(&self) -> usize {
        self.current_frame.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current_frame.is_empty()
    }

    pub fn current_media_type(&self) -> Option<MediaType> {
        self.current_media_type
    }

    pub fn current_pts(&self) -> Option<u64> {
        self.current_pts
    }

    /// 输入一个 PES 负载，完成的帧追加到 `out`
    ///
    /// 帧缓冲区溢出时丢弃当前累积的数据并返回 `CapacityExceeded`。
    pub fn push(
        &mut self,
        policy: BoundaryPolicy,
        unit: PesUnit<'_>,
        out: &mut VecDeque<Frame>,
    ) -> Result<()> {
        let media_changed = self.current_media_type != Some(unit.media_type);
        let boundary = match policy {
            BoundaryPolicy::PtsChange => {
                media_changed || (unit.pts.is_some() && unit.pts != self.current_pts)
            }
            BoundaryPolicy::SmallTrailingPes { .. } => media_changed,
        };
        if boundary {
            if let Some(frame) = self.take_frame() {
                out.push_back(frame);
            }
        }

        if self.is_empty() {
            self.current_media_type = Some(unit.media_type);
        }
        if unit.pts.is_some() {
            self.current_pts = unit.pts;
        }
        if let Some(reserved) = unit.reserved {
            self.current_reserved = Some(Bytes::copy_from_slice(reserved));
        }

        if let Err(e) = self.current_frame.append(unit.payload) {
            warn!(
                target: "ps_demuxer",
                "Frame buffer overflow, dropping {} accumulated bytes: {}",
                self.current_frame.len(),
                e
            );
            self.reset();
            return Err(e);
        }

        let complete = match (policy, unit.media_type) {
            // 私有数据单元总是独立成帧
            (_, MediaType::Event) => true,
            // 音频访问单元不会跨 PES
            (BoundaryPolicy::PtsChange, MediaType::Audio) => true,
            (BoundaryPolicy::PtsChange, MediaType::Video) => false,
            (
                BoundaryPolicy::SmallTrailingPes {
                    threshold,
                    min_frame_size,
                },
                _,
            ) => {
                let hit = unit.pes_length < threshold && self.len() > min_frame_size;
                if hit {
                    debug!(
                        target: "ps_demuxer",
                        "Small trailing PES ({} bytes) closes {} byte frame",
                        unit.pes_length,
                        self.len()
                    );
                }
                hit
            }
        };
        if complete {
            if let Some(frame) = self.take_frame() {
                out.push_back(frame);
            }
        }

        Ok(())
    }

    /// 输入结束，取出剩余的累积数据
    pub fn finish(&mut self) -> Option<Frame> {
        self.take_frame()
    }

    /// 复制当前帧并立即清空缓冲区
    fn take_frame(&mut self) -> Option<Frame> {
        if self.current_frame.is_empty() {
            return None;
        }
        let media_type = self.current_media_type?;

        let frame = Frame {
            media_type,
            pts: self.current_pts,
            data: Bytes::copy_from_slice(self.current_frame.as_slice()),
            reserved: self.current_reserved.take(),
        };
        self.current_frame.clear();

        debug!(
            target: "ps_demuxer",
            "Frame complete: {:?} {} bytes pts={:?}",
            frame.media_type,
            frame.len(),
            frame.pts
        );
        Some(frame)
    }

    /// 丢弃累积数据与时间戳状态
    pub fn reset(&mut self) {
        self.current_frame.clear();
        self.current_media_type = None;
        self.current_pts = None;
        self.current_reserved = None;
    }

    pub fn release(&mut self) {
        self.reset();
        self.current_frame.release();
    }
}
