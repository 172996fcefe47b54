// 单个 PS 文件的解封装与输出
use anyhow::{Context, Result};
use clap::ValueEnum;
use flux_ps::{DemuxConfig, DemuxError, DemuxOutput, DemuxSession, Frame, MediaType};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 解封装方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// 文件模式，逐帧读取
    File,
    /// 定长分块，短尾包判定
    Stream,
    /// 定长分块，PTS 变化判定
    Packet,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrackSummary {
    pub frames: u64,
    pub bytes: u64,
    pub first_pts: Option<u64>,
    pub last_pts: Option<u64>,
}

impl TrackSummary {
    fn record(&mut self, frame: &Frame) {
        self.frames += 1;
        self.bytes += frame.len() as u64;
        if let Some(pts) = frame.pts {
            self.first_pts.get_or_insert(pts);
            self.last_pts = Some(pts);
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DumpSummary {
    pub input: PathBuf,
    pub mode: Mode,
    pub video: TrackSummary,
    pub audio: TrackSummary,
    pub event: TrackSummary,
    /// 解封装过程中丢弃数据的次数
    pub errors: u64,
}

impl DumpSummary {
    fn new(input: &Path, mode: Mode) -> Self {
        Self {
            input: input.to_path_buf(),
            mode,
            video: TrackSummary::default(),
            audio: TrackSummary::default(),
            event: TrackSummary::default(),
            errors: 0,
        }
    }

    fn track_mut(&mut self, media_type: MediaType) -> &mut TrackSummary {
        match media_type {
            MediaType::Video => &mut self.video,
            MediaType::Audio => &mut self.audio,
            MediaType::Event => &mut self.event,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InfoReport {
    pub input: PathBuf,
    pub has_video: bool,
    pub has_audio: bool,
    pub video: Option<String>,
    pub audio: Option<String>,
}

/// 按媒体类型写出基本流文件，首次出现时创建
struct EsSink {
    out_dir: PathBuf,
    stem: String,
    writers: HashMap<MediaType, BufWriter<File>>,
}

impl EsSink {
    fn new(out_dir: &Path, input: &Path) -> Self {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        Self {
            out_dir: out_dir.to_path_buf(),
            stem,
            writers: HashMap::new(),
        }
    }

    fn output_path(&self, media_type: MediaType) -> PathBuf {
        let suffix = match media_type {
            MediaType::Video => "video.es",
            MediaType::Audio => "audio.es",
            MediaType::Event => "event.bin",
        };
        self.out_dir.join(format!("{}.{}", self.stem, suffix))
    }

    fn write(&mut self, frame: &Frame) -> Result<()> {
        if !self.writers.contains_key(&frame.media_type) {
            let path = self.output_path(frame.media_type);
            let file = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            debug!("Writing {} frames to {}", frame.media_type.as_str(), path.display());
            self.writers.insert(frame.media_type, BufWriter::new(file));
        }

        if let Some(writer) = self.writers.get_mut(&frame.media_type) {
            writer.write_all(&frame.data)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        for writer in self.writers.values_mut() {
            writer.flush()?;
        }
        Ok(())
    }
}

type DemuxFn = fn(&mut DemuxSession, &[u8]) -> flux_ps::Result<DemuxOutput>;

/// 解封装一个输入文件并写出基本流
pub fn dump_file(
    input: &Path,
    config: &DemuxConfig,
    mode: Mode,
    chunk_size: usize,
    out_dir: &Path,
) -> Result<DumpSummary> {
    let mut session = DemuxSession::with_config(config)?;
    let mut sink = EsSink::new(out_dir, input);
    let mut summary = DumpSummary::new(input, mode);

    info!("Demuxing {} ({:?} mode)", input.display(), mode);

    let mut handle = |frame: Frame, summary: &mut DumpSummary| -> Result<()> {
        sink.write(&frame)?;
        summary.track_mut(frame.media_type).record(&frame);
        Ok(())
    };

    match mode {
        Mode::File => {
            session
                .open_file(input)
                .with_context(|| format!("Failed to open {}", input.display()))?;
            loop {
                match session.get_next_frame() {
                    Ok(DemuxOutput::Frame(frame)) => handle(frame, &mut summary)?,
                    Ok(_) => break,
                    Err(e @ DemuxError::CapacityExceeded { .. }) => {
                        warn!("{}: {}", input.display(), e);
                        summary.errors += 1;
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }
        Mode::Stream | Mode::Packet => {
            let demux: DemuxFn = match mode {
                Mode::Stream => DemuxSession::demux_stream,
                _ => DemuxSession::demux_packet,
            };

            let mut reader = File::open(input)
                .with_context(|| format!("Failed to open {}", input.display()))?;
            let mut chunk = vec![0u8; chunk_size];
            loop {
                let n = reader.read(&mut chunk)?;
                if n == 0 {
                    break;
                }

                let mut out = demux(&mut session, &chunk[..n]);
                loop {
                    match out {
                        Ok(DemuxOutput::Frame(frame)) => {
                            handle(frame, &mut summary)?;
                            out = demux(&mut session, &[]);
                        }
                        Ok(_) => break,
                        Err(e @ DemuxError::CapacityExceeded { .. }) => {
                            warn!("{}: {}", input.display(), e);
                            summary.errors += 1;
                            break;
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
            }

            while let Some(frame) = session.finish()? {
                handle(frame, &mut summary)?;
            }
        }
    }

    sink.flush()?;
    info!(
        "{}: {} video / {} audio / {} event frames",
        input.display(),
        summary.video.frames,
        summary.audio.frames,
        summary.event.frames
    );
    Ok(summary)
}

/// 探测编码参数
pub fn probe_file(input: &Path, config: &DemuxConfig) -> Result<InfoReport> {
    let mut session = DemuxSession::with_config(config)?;
    session
        .open_file(input)
        .with_context(|| format!("Failed to open {}", input.display()))?;
    let info = session.get_media_info()?;

    Ok(InfoReport {
        input: input.to_path_buf(),
        has_video: info.has_video,
        has_audio: info.has_audio,
        video: info.video.map(hex::encode_upper),
        audio: info.audio.map(hex::encode_upper),
    })
}
