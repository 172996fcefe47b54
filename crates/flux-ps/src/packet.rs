// PS 起始码扫描与分类
// MPEG-PS (Program Stream) 格式

/// PS 包起始码前缀
pub const PS_START_CODE: [u8; 3] = [0x00, 0x00, 0x01];

/// MPEG-2 Pack Header 固定长度（不含填充字节）
pub const PACK_HEADER_LEN: usize = 14;

/// MPEG-1 Pack Header 长度
pub const MPEG1_PACK_HEADER_LEN: usize = 12;

/// PS 包类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PsPacketType {
    /// Pack Header (0xBA)
    PackHeader,

    /// System Header (0xBB)
    SystemHeader,

    /// Program Stream Map (0xBC)
    ProgramStreamMap,

    /// Private Stream 1 / Padding (0xBD)
    PrivateStream,

    /// Audio Stream (0xC0-0xDF)
    Audio,

    /// Video Stream (0xE0-0xEF)
    Video,

    /// Unknown
    Unknown,
}

impl PsPacketType {
    pub fn from_stream_id(stream_id: u8) -> Self {
        match stream_id {
            0xBA => Self::PackHeader,
            0xBB => Self::SystemHeader,
            0xBC => Self::ProgramStreamMap,
            0xBD => Self::PrivateStream,
            0xC0..=0xDF => Self::Audio,
            0xE0..=0xEF => Self::Video,
            _ => Self::Unknown,
        }
    }

    /// 音视频 PES 包
    pub fn is_media(&self) -> bool {
        matches!(self, Self::Audio | Self::Video)
    }
}

/// 扫描到的起始码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartCode {
    pub packet_type: PsPacketType,

    /// 起始码在窗口中的偏移
    pub offset: usize,

    /// 起始码第 4 字节
    pub stream_id: u8,
}

/// 查找 `00 00 01 XX`，要求第 4 字节在窗口内
pub fn find_start_code(data: &[u8], start: usize) -> Option<usize> {
    if start >= data.len() {
        return None;
    }

    data[start..]
        .windows(4)
        .position(|w| w[..3] == PS_START_CODE)
        .map(|pos| start + pos)
}

/// 从 `start` 开始扫描下一个起始码并分类
pub fn scan(data: &[u8], start: usize) -> Option<StartCode> {
    let offset = find_start_code(data, start)?;
    let stream_id = data[offset + 3];

    Some(StartCode {
        packet_type: PsPacketType::from_stream_id(stream_id),
        offset,
        stream_id,
    })
}

/// 未找到起始码时应保留的尾部偏移：最后 3 个字节可能是被截断的起始码前缀
pub fn resync_point(data: &[u8], start: usize) -> usize {
    start.max(data.len().saturating_sub(PS_START_CODE.len()))
}

/// 读取起始码后的 16 位长度字段
pub fn read_length(data: &[u8], offset: usize) -> Option<usize> {
    let bytes = data.get(offset + 4..offset + 6)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]) as usize)
}

/// 非 PES 结构（Pack/System Header、PSM、私有流）占用的总字节数
///
/// 窗口不足以确定长度或不足以容纳整个结构时返回 `None`。
pub fn packet_len(data: &[u8], code: &StartCode) -> Option<usize> {
    let offset = code.offset;
    let len = match code.packet_type {
        PsPacketType::PackHeader => {
            let marker = *data.get(offset + 4)?;
            if marker >> 6 == 0b01 {
                // MPEG-2: 第 14 字节低 3 位为填充长度
                let stuffing = (*data.get(offset + 13)? & 0x07) as usize;
                PACK_HEADER_LEN + stuffing
            } else {
                MPEG1_PACK_HEADER_LEN
            }
        }
        PsPacketType::SystemHeader
        | PsPacketType::ProgramStreamMap
        | PsPacketType::PrivateStream
        | PsPacketType::Audio
        | PsPacketType::Video => 6 + read_length(data, offset)?,
        PsPacketType::Unknown => 1,
    };

    if offset + len > data.len() {
        return None;
    }
    Some(len)
}
