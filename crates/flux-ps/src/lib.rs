// flux-ps: MPEG-PS 解封装库
//
// 数据流：
// 传输层字节 -> pending 缓冲 -> 起始码扫描 -> PES 解析 -> 帧组装 -> Frame
//
// 三种调用方式共享同一套扫描/解析核心：
// - demux_packet: 实时包，PTS 变化判定帧边界
// - demux_stream: 任意分块的字节流，短尾包判定
// - get_next_frame: 文件模式，逐帧读取

pub mod assembler;
pub mod buffer;
pub mod config;
pub mod error;
pub mod frame;
pub mod packet;
pub mod pes;
pub mod pts;
pub mod session;

// 重新导出常用类型
pub use assembler::BoundaryPolicy;
pub use buffer::ByteBuffer;
pub use config::DemuxConfig;
pub use error::{DemuxError, Result};
pub use frame::{DemuxOutput, Frame, MediaType};
pub use packet::PsPacketType;
pub use session::{DemuxSession, MediaInfo};
