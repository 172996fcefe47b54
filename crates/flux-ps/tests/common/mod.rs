// 测试用的 PS 流构造工具
#![allow(dead_code)]

use flux_ps::{DemuxOutput, DemuxSession, Frame, MediaType};

/// 测试日志输出到 test writer
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// 一个访问单元及其 PES 分片
#[derive(Debug, Clone)]
pub struct AccessUnit {
    pub media_type: MediaType,
    pub pts: u64,
    pub fragments: Vec<Vec<u8>>,
}

impl AccessUnit {
    pub fn payload(&self) -> Vec<u8> {
        self.fragments.concat()
    }

    fn stream_id(&self) -> u8 {
        match self.media_type {
            MediaType::Video => 0xE0,
            MediaType::Audio => 0xC0,
            MediaType::Event => 0xBD,
        }
    }
}

/// 打包 33 位 PTS（PTS only，前缀 0010）
pub fn encode_pts(pts: u64) -> [u8; 5] {
    [
        0x21 | ((pts >> 29) & 0x0E) as u8,
        (pts >> 22) as u8,
        ((pts >> 14) & 0xFE) as u8 | 0x01,
        (pts >> 7) as u8,
        ((pts << 1) & 0xFE) as u8 | 0x01,
    ]
}

/// 不含 0x00 的负载，避免与起始码混淆
pub fn payload(seed: u8, len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| ((i * 7 + seed as usize) % 255) as u8 + 1)
        .collect()
}

/// MPEG-2 Pack Header，无填充
pub fn pack_header() -> Vec<u8> {
    vec![
        0x00, 0x00, 0x01, 0xBA, 0x44, 0x00, 0x04, 0x00, 0x04, 0x01, 0x01, 0x89, 0xC3, 0xF8,
    ]
}

pub fn system_header() -> Vec<u8> {
    let body = [0x80, 0x04, 0xE1, 0x04, 0xE1, 0xFF, 0xE0, 0xE0, 0x80, 0xC0, 0xC0, 0x08];
    let mut data = vec![0x00, 0x00, 0x01, 0xBB];
    data.extend_from_slice(&(body.len() as u16).to_be_bytes());
    data.extend_from_slice(&body);
    data
}

pub fn program_stream_map() -> Vec<u8> {
    let body = [
        0xE0, 0xFF, 0x00, 0x00, 0x00, 0x08, 0x1B, 0xE0, 0x00, 0x00, 0x0F, 0xC0, 0x00, 0x00,
        0x12, 0x34, 0x56, 0x78,
    ];
    let mut data = vec![0x00, 0x00, 0x01, 0xBC];
    data.extend_from_slice(&(body.len() as u16).to_be_bytes());
    data.extend_from_slice(&body);
    data
}

pub fn pes(stream_id: u8, pts: Option<u64>, payload: &[u8]) -> Vec<u8> {
    let header_data: Vec<u8> = pts.map(|p| encode_pts(p).to_vec()).unwrap_or_default();
    let flags = if pts.is_some() { 0x80 } else { 0x00 };
    let pes_length = 3 + header_data.len() + payload.len();

    let mut data = vec![0x00, 0x00, 0x01, stream_id];
    data.extend_from_slice(&(pes_length as u16).to_be_bytes());
    data.extend_from_slice(&[0x80, flags, header_data.len() as u8]);
    data.extend_from_slice(&header_data);
    data.extend_from_slice(payload);
    data
}

/// 带扩展字段的 PES：PTS(5) + 扩展固定部分(5) + 私有数据
pub fn pes_with_extension(stream_id: u8, pts: u64, reserved: &[u8], payload: &[u8]) -> Vec<u8> {
    let mut header_data = encode_pts(pts).to_vec();
    header_data.extend_from_slice(&[0x1E, 0xFF, 0xFF, 0xFF, 0xFF]);
    header_data.extend_from_slice(reserved);
    let pes_length = 3 + header_data.len() + payload.len();

    let mut data = vec![0x00, 0x00, 0x01, stream_id];
    data.extend_from_slice(&(pes_length as u16).to_be_bytes());
    data.extend_from_slice(&[0x80, 0x81, header_data.len() as u8]);
    data.extend_from_slice(&header_data);
    data.extend_from_slice(payload);
    data
}

/// 把访问单元复用成 PS 流：视频单元前插入 Pack Header，首个单元前插入系统头和 PSM
pub fn build_stream(units: &[AccessUnit]) -> Vec<u8> {
    let mut stream = Vec::new();
    for (i, unit) in units.iter().enumerate() {
        if unit.media_type == MediaType::Video || i == 0 {
            stream.extend(pack_header());
        }
        if i == 0 {
            stream.extend(system_header());
            stream.extend(program_stream_map());
        }
        for fragment in &unit.fragments {
            stream.extend(pes(unit.stream_id(), Some(unit.pts), fragment));
        }
    }
    stream
}

/// N 个视频单元（1-5 个分片）与 M 个音频单元交错
pub fn sample_units(video: usize, audio: usize) -> Vec<AccessUnit> {
    let mut units = Vec::new();
    let mut a = 0;
    for v in 0..video {
        let fragment_count = v % 5 + 1;
        let fragments = (0..fragment_count)
            .map(|f| payload((v * 5 + f) as u8, 40 + 13 * f + v))
            .collect();
        units.push(AccessUnit {
            media_type: MediaType::Video,
            pts: 3600 * (v as u64 + 1),
            fragments,
        });

        if a < audio {
            units.push(AccessUnit {
                media_type: MediaType::Audio,
                pts: 3600 * (v as u64 + 1) + 900,
                fragments: vec![payload((200 + a) as u8, 32)],
            });
            a += 1;
        }
    }
    while a < audio {
        units.push(AccessUnit {
            media_type: MediaType::Audio,
            pts: 1_000_000 + 1800 * a as u64,
            fragments: vec![payload((100 + a) as u8, 24)],
        });
        a += 1;
    }
    units
}

/// 适合短尾包判定的访问单元：大分片 + 短尾分片，音频单包超过 128 字节
pub fn legacy_units(video: usize) -> Vec<AccessUnit> {
    let mut units = Vec::new();
    for v in 0..video {
        units.push(AccessUnit {
            media_type: MediaType::Video,
            pts: 3600 * (v as u64 + 1),
            fragments: vec![
                payload(v as u8, 1500),
                payload((v + 1) as u8, 1500),
                payload((v + 2) as u8, 300 + v),
            ],
        });
        units.push(AccessUnit {
            media_type: MediaType::Audio,
            pts: 3600 * (v as u64 + 1) + 900,
            fragments: vec![payload((50 + v) as u8, 200)],
        });
    }
    units
}

/// 一个超过帧缓冲区的视频 PES，后面跟三个音频 PES
pub fn oversized_video_then_audio() -> (Vec<u8>, Vec<AccessUnit>) {
    let audio: Vec<AccessUnit> = (0..3u64)
        .map(|i| AccessUnit {
            media_type: MediaType::Audio,
            pts: 4500 + 900 * i,
            fragments: vec![payload(0x31 + i as u8, 200)],
        })
        .collect();

    let mut stream = pack_header();
    stream.extend(pes(0xE0, Some(3600), &payload(0x11, 300)));
    for unit in &audio {
        stream.extend(pes(0xC0, Some(unit.pts), &unit.payload()));
    }
    (stream, audio)
}

/// 按给定分块依次输入，取出全部帧（包含结束时的最后一帧）
pub fn demux_chunks<F>(session: &mut DemuxSession, chunks: &[&[u8]], mut demux: F) -> Vec<Frame>
where
    F: FnMut(&mut DemuxSession, &[u8]) -> flux_ps::Result<DemuxOutput>,
{
    let mut frames = Vec::new();
    for chunk in chunks {
        let mut out = demux(session, chunk).unwrap();
        while let DemuxOutput::Frame(frame) = out {
            frames.push(frame);
            out = demux(session, &[]).unwrap();
        }
    }
    while let Some(frame) = session.finish().unwrap() {
        frames.push(frame);
    }
    frames
}

/// 按固定大小切分
pub fn split_fixed(data: &[u8], size: usize) -> Vec<&[u8]> {
    data.chunks(size).collect()
}

/// 按一组切点切分
pub fn split_at_points<'a>(data: &'a [u8], points: &[usize]) -> Vec<&'a [u8]> {
    let mut chunks = Vec::new();
    let mut last = 0;
    for &p in points {
        if p > last && p < data.len() {
            chunks.push(&data[last..p]);
            last = p;
        }
    }
    chunks.push(&data[last..]);
    chunks
}

pub fn assert_frames_match(frames: &[Frame], units: &[AccessUnit]) {
    assert_eq!(frames.len(), units.len(), "frame count");
    for (i, (frame, unit)) in frames.iter().zip(units).enumerate() {
        assert_eq!(frame.media_type, unit.media_type, "media type of frame {}", i);
        assert_eq!(frame.pts, Some(unit.pts), "pts of frame {}", i);
        assert_eq!(&frame.data[..], &unit.payload()[..], "payload of frame {}", i);
    }
}
