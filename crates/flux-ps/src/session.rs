// PS 解封装会话
// 每路通道一个会话，会话之间互不共享状态

use crate::assembler::{BoundaryPolicy, FrameAssembler, PesUnit};
use crate::buffer::ByteBuffer;
use crate::config::{DemuxConfig, DEFAULT_BUFFER_CAPACITY};
use crate::frame::{DemuxOutput, Frame, MediaType};
use crate::packet::{self, PsPacketType, StartCode};
use crate::pes::PesHeader;
use crate::{DemuxError, Result};
use bytes::Bytes;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};

/// 探测媒体信息时最多读取的帧数
const MEDIA_INFO_MAX_FRAMES: usize = 30;

/// 编码参数信息（来自 PES 扩展字段）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaInfo {
    pub video: Option<Bytes>,
    pub audio: Option<Bytes>,
    pub has_video: bool,
    pub has_audio: bool,
}

/// 文件模式状态
#[derive(Debug)]
struct PsFile {
    file: File,
    path: PathBuf,
    size: u64,
    /// pending 第一个字节对应的文件偏移
    origin: u64,
}

/// 单个起始码的处理结果
enum Step {
    /// 已处理，消耗的字节数（相对起始码）
    Consumed(usize),
    /// 窗口内数据不足
    Incomplete,
    /// 帧缓冲区溢出，跳过该包后上报错误
    Overflow(usize, DemuxError),
}

/// PS 解封装会话
#[derive(Debug)]
pub struct DemuxSession {
    config: DemuxConfig,
    pending: ByteBuffer,
    assembler: FrameAssembler,
    ready: VecDeque<Frame>,
    /// 最近一次输入使用的边界策略，`finish` 据此扫描剩余数据
    policy: BoundaryPolicy,
    file: Option<PsFile>,
    closed: bool,
}

impl DemuxSession {
    /// 创建会话，容量为 0 的缓冲区延迟到打开文件时分配
    pub fn init(buffer_capacity: usize, frame_capacity: usize) -> Result<Self> {
        let defaults = DemuxConfig::default();
        let read_block_size = match buffer_capacity {
            0 => defaults.read_block_size,
            n => defaults.read_block_size.min(n),
        };

        Self::with_config(&DemuxConfig {
            buffer_capacity,
            frame_capacity,
            read_block_size,
            ..defaults
        })
    }

    pub fn with_config(config: &DemuxConfig) -> Result<Self> {
        config.validate()?;

        let pending = if config.buffer_capacity > 0 {
            ByteBuffer::allocate(config.buffer_capacity)?
        } else {
            ByteBuffer::default()
        };
        let assembler = FrameAssembler::new(config.frame_capacity)?;

        debug!(
            target: "ps_demuxer",
            "Demux session created: buffer={} frame={}",
            config.buffer_capacity,
            config.frame_capacity
        );

        Ok(Self {
            config: config.clone(),
            pending,
            assembler,
            ready: VecDeque::new(),
            policy: BoundaryPolicy::PtsChange,
            file: None,
            closed: false,
        })
    }

    pub fn config(&self) -> &DemuxConfig {
        &self.config
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// 待处理的输入字节数
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// 已完成但尚未取走的帧数
    pub fn ready_len(&self) -> usize {
        self.ready.len()
    }

    /// 释放缓冲区并关闭文件，之后所有操作返回 `InvalidHandle`
    pub fn deinit(&mut self) {
        if self.closed {
            return;
        }
        self.file = None;
        self.pending.release();
        self.assembler.release();
        self.ready.clear();
        self.closed = true;
        debug!(target: "ps_demuxer", "Demux session closed");
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(DemuxError::InvalidHandle);
        }
        Ok(())
    }

    fn ensure_buffers(&self) -> Result<()> {
        self.ensure_open()?;
        if !self.pending.is_allocated() || !self.assembler.is_allocated() {
            return Err(DemuxError::InvalidHandle);
        }
        Ok(())
    }

    fn trailing_policy(&self) -> BoundaryPolicy {
        BoundaryPolicy::SmallTrailingPes {
            threshold: self.config.trailing_pes_threshold,
            min_frame_size: self.config.min_frame_size,
        }
    }

    /// 实时包接口：PTS 变化判定帧边界
    ///
    /// 上一次调用残留的不完整数据会自动拼接在本次输入之前；
    /// 以空切片调用可取出已排队的帧。
    pub fn demux_packet(&mut self, bytes: &[u8]) -> Result<DemuxOutput> {
        self.feed(bytes, BoundaryPolicy::PtsChange)
    }

    /// 流式接口：任意分块的连续字节流，短尾包判定帧边界
    pub fn demux_stream(&mut self, bytes: &[u8]) -> Result<DemuxOutput> {
        let policy = self.trailing_policy();
        self.feed(bytes, policy)
    }

    /// 输入结束：依次返回已排队的帧以及最后一个未闭合的帧
    pub fn finish(&mut self) -> Result<Option<Frame>> {
        self.ensure_open()?;

        if !self.pending.is_empty() {
            // 先取出 pending 中所有完整的包，剩下的只有不完整的尾部
            let (_, result) = self.scan_pending(self.policy, false);
            if let Err(e) = result {
                warn!(target: "ps_demuxer", "Frame dropped while draining input: {}", e);
            }
        }
        if !self.pending.is_empty() {
            debug!(
                target: "ps_demuxer",
                "Discarding {} trailing bytes at end of input",
                self.pending.len()
            );
            self.pending.clear();
        }
        if let Some(frame) = self.assembler.finish() {
            self.ready.push_back(frame);
        }
        Ok(self.ready.pop_front())
    }

    fn feed(&mut self, mut input: &[u8], policy: BoundaryPolicy) -> Result<DemuxOutput> {
        self.ensure_buffers()?;
        self.policy = policy;

        // 中途出错时继续处理剩余输入，结束后上报第一个错误
        let mut first_err: Option<DemuxError> = None;

        loop {
            let n = input.len().min(self.pending.remaining());
            if n > 0 {
                self.pending.append(&input[..n])?;
                input = &input[n..];
            }

            // 已有完成的帧时不再扫描，未处理的数据留在 pending 中
            if self.ready.is_empty() {
                let (_, result) = self.scan_pending(policy, true);
                if let Err(e) = result {
                    first_err.get_or_insert(e);
                }
            }

            if input.is_empty() {
                break;
            }
            if self.pending.remaining() > 0 {
                continue;
            }

            if !self.ready.is_empty() {
                // 调用方没有取走已完成的帧，积压达到缓冲区容量
                warn!(
                    target: "ps_demuxer",
                    "Demux backlog full ({} bytes pending, {} frames ready), rejecting {} bytes",
                    self.pending.len(),
                    self.ready.len(),
                    input.len()
                );
                return Err(first_err.unwrap_or(DemuxError::CapacityExceeded {
                    requested: input.len(),
                    available: 0,
                }));
            }

            // 单个包超过缓冲区容量，丢弃后从剩余输入中重新同步
            warn!(
                target: "ps_demuxer",
                "Pending buffer full ({} bytes) without a complete packet, dropping buffered input",
                self.pending.len()
            );
            self.pending.clear();
            first_err.get_or_insert(DemuxError::CapacityExceeded {
                requested: input.len(),
                available: 0,
            });
        }

        if let Some(e) = first_err {
            return Err(e);
        }
        Ok(match self.ready.pop_front() {
            Some(frame) => DemuxOutput::Frame(frame),
            None => DemuxOutput::NeedMoreInput,
        })
    }

    /// 扫描 pending 中的完整结构，返回消耗的字节数与第一个错误
    ///
    /// 帧缓冲区溢出只丢弃该帧，扫描继续；消耗的字节数在出错时同样有效。
    /// `stop_at_frame` 为真时得到帧即停止，其余数据留在 pending 中。
    fn scan_pending(&mut self, policy: BoundaryPolicy, stop_at_frame: bool) -> (usize, Result<()>) {
        let emit_private = self.config.emit_private_stream;
        let window = self.pending.as_slice();
        let mut pos = 0;
        let mut result = Ok(());

        loop {
            if stop_at_frame && !self.ready.is_empty() {
                break;
            }

            let Some(code) = packet::scan(window, pos) else {
                pos = packet::resync_point(window, pos);
                break;
            };
            if code.offset > pos {
                trace!(
                    target: "ps_demuxer",
                    "Skipped {} bytes before start code",
                    code.offset - pos
                );
            }

            match Self::process_start_code(
                window,
                code,
                policy,
                emit_private,
                &mut self.assembler,
                &mut self.ready,
            ) {
                Ok(Step::Consumed(n)) => pos = code.offset + n,
                Ok(Step::Incomplete) => {
                    pos = code.offset;
                    break;
                }
                Ok(Step::Overflow(n, e)) => {
                    pos = code.offset + n;
                    if result.is_ok() {
                        result = Err(e);
                    }
                }
                Err(e @ DemuxError::MalformedPes { .. }) => {
                    warn!(target: "ps_demuxer", "{}, resynchronizing", e);
                    pos = code.offset + 4;
                }
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }

        self.pending.consume(pos);
        (pos, result)
    }

    fn process_start_code(
        window: &[u8],
        code: StartCode,
        policy: BoundaryPolicy,
        emit_private: bool,
        assembler: &mut FrameAssembler,
        ready: &mut VecDeque<Frame>,
    ) -> Result<Step> {
        let media_type = match code.packet_type {
            PsPacketType::Video => MediaType::Video,
            PsPacketType::Audio => MediaType::Audio,
            PsPacketType::PrivateStream if emit_private => {
                return Self::process_private_stream(window, code, policy, assembler, ready);
            }
            PsPacketType::Unknown => return Ok(Step::Consumed(1)),
            _ => {
                return Ok(match packet::packet_len(window, &code) {
                    Some(len) => {
                        trace!(target: "ps_demuxer", "Skip {:?} ({} bytes)", code.packet_type, len);
                        Step::Consumed(len)
                    }
                    None => Step::Incomplete,
                });
            }
        };

        let Some(header) = PesHeader::parse(window, code.offset)? else {
            return Ok(Step::Incomplete);
        };
        trace!(
            target: "ps_demuxer",
            "PES 0x{:02X} length={} pts={:?}",
            header.stream_id,
            header.pes_length,
            header.pts
        );

        let unit = PesUnit {
            media_type,
            pts: header.pts,
            pes_length: header.pes_length,
            payload: header.payload(window),
            reserved: header.reserved(window),
        };
        match assembler.push(policy, unit, ready) {
            Ok(()) => Ok(Step::Consumed(header.total_len())),
            Err(e) => Ok(Step::Overflow(header.total_len(), e)),
        }
    }

    /// 私有流整包负载作为事件帧
    fn process_private_stream(
        window: &[u8],
        code: StartCode,
        policy: BoundaryPolicy,
        assembler: &mut FrameAssembler,
        ready: &mut VecDeque<Frame>,
    ) -> Result<Step> {
        let Some(len) = packet::packet_len(window, &code) else {
            return Ok(Step::Incomplete);
        };

        // 私有流的 PES 头并不总是标准格式，解析失败时直接携带长度字段之后的全部数据
        let (payload, pts) = match PesHeader::parse(window, code.offset) {
            Ok(Some(header)) => (header.payload(window), header.pts),
            _ => (&window[code.offset + 6..code.offset + len], None),
        };

        let unit = PesUnit {
            media_type: MediaType::Event,
            pts,
            pes_length: len - 6,
            payload,
            reserved: None,
        };
        match assembler.push(policy, unit, ready) {
            Ok(()) => Ok(Step::Consumed(len)),
            Err(e) => Ok(Step::Overflow(len, e)),
        }
    }

    /// 打开 PS 文件（文件模式）
    pub fn open_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.ensure_open()?;
        let path = path.as_ref();

        self.file = None;
        if !path.exists() {
            return Err(DemuxError::NotFound(path.to_path_buf()));
        }

        let file = File::open(path)?;
        let size = file.metadata()?.len();
        if size == 0 {
            return Err(DemuxError::EmptyFile(path.to_path_buf()));
        }

        if !self.pending.is_allocated() {
            self.pending = ByteBuffer::allocate(DEFAULT_BUFFER_CAPACITY)?;
        }
        self.assembler.ensure_allocated(DEFAULT_BUFFER_CAPACITY)?;
        self.reset_state();

        info!(target: "ps_demuxer", "Opened PS file {} ({} bytes)", path.display(), size);

        self.file = Some(PsFile {
            file,
            path: path.to_path_buf(),
            size,
            origin: 0,
        });
        Ok(())
    }

    pub fn close_file(&mut self) -> Result<()> {
        self.ensure_open()?;
        if let Some(ps_file) = self.file.take() {
            debug!(target: "ps_demuxer", "Closed PS file {}", ps_file.path.display());
        }
        self.reset_state();
        Ok(())
    }

    pub fn file_size(&self) -> Option<u64> {
        self.file.as_ref().map(|f| f.size)
    }

    /// 下一次读取开始的文件偏移（第一个未消耗的字节）
    pub fn file_position(&self) -> Option<u64> {
        self.file
            .as_ref()
            .map(|f| f.origin + self.pending.len() as u64)
    }

    fn reset_state(&mut self) {
        self.pending.clear();
        self.assembler.reset();
        self.ready.clear();
    }

    /// 跳转至文件头
    pub fn goto_file_head(&mut self) -> Result<()> {
        self.goto_file_offset(0)
    }

    /// 跳转至指定位置，丢弃所有缓存数据
    pub fn goto_file_offset(&mut self, offset: u64) -> Result<()> {
        self.ensure_open()?;
        let ps_file = self.file.as_mut().ok_or(DemuxError::InvalidHandle)?;

        ps_file.file.seek(SeekFrom::Start(offset))?;
        ps_file.origin = offset;
        self.reset_state();
        Ok(())
    }

    /// 文件模式：每次返回一个完整帧
    pub fn get_next_frame(&mut self) -> Result<DemuxOutput> {
        self.ensure_buffers()?;
        if self.file.is_none() {
            return Err(DemuxError::InvalidHandle);
        }
        let policy = self.trailing_policy();
        self.policy = policy;

        loop {
            // 先处理已缓存的数据，再从文件读取
            let (consumed, result) = self.scan_pending(policy, true);
            let ps_file = self.file.as_mut().ok_or(DemuxError::InvalidHandle)?;
            ps_file.origin += consumed as u64;
            if !self.ready.is_empty() {
                // 回退到第一个未消耗的字节，下次调用从这里继续
                ps_file.file.seek(SeekFrom::Start(ps_file.origin))?;
                self.pending.clear();
            }
            result?;

            if let Some(frame) = self.ready.pop_front() {
                return Ok(DemuxOutput::Frame(frame));
            }

            let block = self.config.read_block_size.min(self.pending.remaining());
            if block == 0 {
                warn!(
                    target: "ps_demuxer",
                    "Pending buffer full ({} bytes) without a complete packet",
                    self.pending.len()
                );
                let available = self.pending.remaining();
                self.skip_pending();
                return Err(DemuxError::CapacityExceeded {
                    requested: self.config.read_block_size,
                    available,
                });
            }

            let read = match self.file.as_mut() {
                Some(ps_file) => self.pending.fill_from(&mut ps_file.file, block)?,
                None => return Err(DemuxError::InvalidHandle),
            };
            if read == 0 {
                // pending 已扫描过，剩下的是被截断的包
                if !self.pending.is_empty() {
                    debug!(
                        target: "ps_demuxer",
                        "Discarding {} trailing bytes at end of file",
                        self.pending.len()
                    );
                    self.skip_pending();
                }
                return Ok(match self.assembler.finish() {
                    Some(frame) => DemuxOutput::Frame(frame),
                    None => DemuxOutput::EndOfStream,
                });
            }
        }
    }

    /// 丢弃 pending 中的数据并同步文件起点
    fn skip_pending(&mut self) {
        if let Some(ps_file) = self.file.as_mut() {
            ps_file.origin += self.pending.len() as u64;
        }
        self.pending.clear();
    }

    /// 探测音视频编码参数，完成后回到文件头
    pub fn get_media_info(&mut self) -> Result<MediaInfo> {
        self.ensure_open()?;
        if self.file.is_none() {
            return Err(DemuxError::InvalidHandle);
        }

        let mut info = MediaInfo::default();
        let mut frames = 0;

        let mut attempts = 0;
        while attempts < MEDIA_INFO_MAX_FRAMES && !(info.has_video && info.has_audio) {
            attempts += 1;
            let frame = match self.get_next_frame() {
                Ok(DemuxOutput::Frame(frame)) => frame,
                Ok(_) => break,
                Err(e @ DemuxError::CapacityExceeded { .. }) => {
                    warn!(target: "ps_demuxer", "Skipping oversized frame while probing: {}", e);
                    continue;
                }
                Err(e) => return Err(e),
            };
            frames += 1;

            match frame.media_type {
                MediaType::Video => {
                    info.has_video = true;
                    if frame.reserved.is_some() {
                        info.video = frame.reserved;
                    }
                }
                MediaType::Audio => {
                    info.has_audio = true;
                    if frame.reserved.is_some() {
                        info.audio = frame.reserved;
                    }
                }
                MediaType::Event => {}
            }
        }

        self.goto_file_head()?;

        if frames == 0 {
            return Err(DemuxError::MediaInfoUnavailable);
        }
        Ok(info)
    }
}

impl Drop for DemuxSession {
    fn drop(&mut self) {
        self.deinit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pes(stream_id: u8, pts: Option<u64>, payload: &[u8]) -> Vec<u8> {
        let header_data: Vec<u8> = match pts {
            Some(pts) => vec![
                0x21 | ((pts >> 29) & 0x0E) as u8,
                (pts >> 22) as u8,
                ((pts >> 14) & 0xFE) as u8 | 0x01,
                (pts >> 7) as u8,
                ((pts << 1) & 0xFE) as u8 | 0x01,
            ],
            None => Vec::new(),
        };
        let flags = if pts.is_some() { 0x80 } else { 0x00 };
        let pes_length = 3 + header_data.len() + payload.len();

        let mut data = vec![0x00, 0x00, 0x01, stream_id];
        data.extend_from_slice(&(pes_length as u16).to_be_bytes());
        data.extend_from_slice(&[0x80, flags, header_data.len() as u8]);
        data.extend_from_slice(&header_data);
        data.extend_from_slice(payload);
        data
    }

    #[test]
    fn test_init_and_deinit() {
        let mut session = DemuxSession::init(4096, 4096).unwrap();
        assert!(!session.is_closed());

        session.deinit();
        assert!(session.is_closed());
        assert!(matches!(session.demux_packet(&[0x00]), Err(DemuxError::InvalidHandle)));
        assert!(matches!(session.get_next_frame(), Err(DemuxError::InvalidHandle)));
        assert!(matches!(session.finish(), Err(DemuxError::InvalidHandle)));
    }

    #[test]
    fn test_unallocated_session_rejects_stream_input() {
        let mut session = DemuxSession::init(0, 0).unwrap();
        assert!(matches!(session.demux_stream(&[0x00]), Err(DemuxError::InvalidHandle)));
    }

    #[test]
    fn test_demux_packet_pts_change() {
        let mut session = DemuxSession::init(4096, 4096).unwrap();

        let out = session.demux_packet(&pes(0xE0, Some(3600), &[1, 2, 3])).unwrap();
        assert_eq!(out, DemuxOutput::NeedMoreInput);

        let out = session.demux_packet(&pes(0xE0, Some(3600), &[4, 5])).unwrap();
        assert_eq!(out, DemuxOutput::NeedMoreInput);

        let frame = session
            .demux_packet(&pes(0xE0, Some(7200), &[6, 6]))
            .unwrap()
            .into_frame()
            .unwrap();
        assert_eq!(frame.media_type, MediaType::Video);
        assert_eq!(frame.pts, Some(3600));
        assert_eq!(&frame.data[..], &[1, 2, 3, 4, 5]);

        let last = session.finish().unwrap().unwrap();
        assert_eq!(&last.data[..], &[6, 6]);
        assert!(session.finish().unwrap().is_none());
    }

    #[test]
    fn test_partial_header_is_buffered() {
        let mut session = DemuxSession::init(4096, 4096).unwrap();
        let packet = pes(0xC0, Some(90_000), &[7; 16]);

        assert_eq!(session.demux_packet(&packet[..5]).unwrap(), DemuxOutput::NeedMoreInput);
        assert_eq!(session.pending_len(), 5);

        let frame = session.demux_packet(&packet[5..]).unwrap().into_frame().unwrap();
        assert_eq!(frame.media_type, MediaType::Audio);
        assert_eq!(frame.timestamp_secs(), Some(1.0));
        assert_eq!(session.pending_len(), 0);
    }

    #[test]
    fn test_garbage_without_start_code_keeps_tail() {
        let mut session = DemuxSession::init(4096, 4096).unwrap();
        session.demux_packet(&[0xFF; 32]).unwrap();
        assert_eq!(session.pending_len(), 3);
    }

    #[test]
    fn test_oversized_input_is_fed_in_slices() {
        let mut session = DemuxSession::init(64, 4096).unwrap();

        // 同一 PTS 的 8 个分片，总长超过 pending 容量
        let mut stream = Vec::new();
        for i in 0..8u8 {
            stream.extend(pes(0xE0, Some(3600), &[i + 1; 20]));
        }

        assert_eq!(session.demux_packet(&stream).unwrap(), DemuxOutput::NeedMoreInput);
        let frame = session.finish().unwrap().unwrap();
        assert_eq!(frame.len(), 160);
        assert_eq!(&frame.data[140..], &[8; 20]);
    }

    #[test]
    fn test_backlog_is_bounded_by_buffer() {
        let mut session = DemuxSession::init(256, 4096).unwrap();

        // 每次输入一个视频帧和一个音频帧，但从不用空输入取帧
        let mut rejected = false;
        for i in 0..20u64 {
            let mut chunk = pes(0xE0, Some(3600 * (i + 1)), &[0x11; 40]);
            chunk.extend(pes(0xC0, Some(3600 * (i + 1) + 900), &[0x22; 40]));

            match session.demux_packet(&chunk) {
                Ok(out) => assert!(matches!(out, DemuxOutput::Frame(_))),
                Err(DemuxError::CapacityExceeded { .. }) => {
                    rejected = true;
                    break;
                }
                Err(e) => panic!("unexpected error: {}", e),
            }
            assert!(session.ready_len() <= 2);
            assert!(session.pending_len() <= 256);
        }
        assert!(rejected);

        // 积压的帧仍然可以取出
        let out = session.demux_packet(&[]).unwrap();
        assert!(matches!(out, DemuxOutput::Frame(_)));
    }

    #[test]
    fn test_finish_drains_packets_after_overflow() {
        let mut session = DemuxSession::init(4096, 256).unwrap();

        let mut stream = pes(0xE0, Some(3600), &[0x11; 300]);
        for i in 0..3u8 {
            stream.extend(pes(0xC0, Some(4500 + 900 * i as u64), &[0x31 + i; 200]));
        }

        assert!(matches!(
            session.demux_packet(&stream),
            Err(DemuxError::CapacityExceeded { .. })
        ));

        let mut audio = Vec::new();
        while let Some(frame) = session.finish().unwrap() {
            audio.push(frame);
        }
        assert_eq!(audio.len(), 3);
        assert_eq!(&audio[2].data[..], &[0x33; 200]);
        assert_eq!(audio[2].pts, Some(6300));
    }

    #[test]
    fn test_packet_larger_than_buffer_fails() {
        let mut session = DemuxSession::init(32, 4096).unwrap();
        let packet = pes(0xE0, Some(1), &[0xAB; 64]);

        let result = session.demux_packet(&packet);
        assert!(matches!(result, Err(DemuxError::CapacityExceeded { .. })));

        // 会话仍然可用
        let out = session.demux_packet(&pes(0xC0, Some(2), &[1; 4])).unwrap();
        assert!(matches!(out, DemuxOutput::Frame(_) | DemuxOutput::NeedMoreInput));
    }

    #[test]
    fn test_frame_overflow_reported_and_recovered() {
        let mut session = DemuxSession::init(4096, 8).unwrap();

        let result = session.demux_packet(&pes(0xE0, Some(1), &[0xAB; 16]));
        assert!(matches!(result, Err(DemuxError::CapacityExceeded { .. })));
        assert_eq!(session.pending_len(), 0);

        let frame = session
            .demux_packet(&pes(0xC0, Some(2), &[1; 4]))
            .unwrap()
            .into_frame()
            .unwrap();
        assert_eq!(frame.media_type, MediaType::Audio);
    }

    #[test]
    fn test_private_stream_skipped_by_default() {
        let mut session = DemuxSession::init(4096, 4096).unwrap();
        let mut stream = pes(0xBD, None, &[0x55; 12]);
        stream.extend(pes(0xC0, Some(1), &[1; 4]));

        let frame = session.demux_packet(&stream).unwrap().into_frame().unwrap();
        assert_eq!(frame.media_type, MediaType::Audio);
        assert_eq!(session.demux_packet(&[]).unwrap(), DemuxOutput::NeedMoreInput);
    }

    #[test]
    fn test_private_stream_as_event() {
        let config = DemuxConfig {
            buffer_capacity: 4096,
            frame_capacity: 4096,
            emit_private_stream: true,
            ..Default::default()
        };
        let mut session = DemuxSession::with_config(&config).unwrap();

        let frame = session
            .demux_packet(&pes(0xBD, None, &[0x55; 12]))
            .unwrap()
            .into_frame()
            .unwrap();
        assert_eq!(frame.media_type, MediaType::Event);
        assert_eq!(&frame.data[..], &[0x55; 12]);
    }

    #[test]
    fn test_file_mode_requires_open_file() {
        let mut session = DemuxSession::init(4096, 4096).unwrap();
        assert!(matches!(session.get_next_frame(), Err(DemuxError::InvalidHandle)));
        assert!(matches!(session.goto_file_head(), Err(DemuxError::InvalidHandle)));
        assert!(matches!(
            session.open_file("/nonexistent/flux/ps/file.ps"),
            Err(DemuxError::NotFound(_))
        ));
    }
}
