// PTS/DTS 解码
// 33 位时间戳，90 kHz 时钟，5 字节打包格式（每段之间有 marker bit）

/// PTS 时钟频率
pub const PTS_CLOCK_HZ: u64 = 90_000;

/// 打包时间戳字节数
pub const TIMESTAMP_LEN: usize = 5;

/// 解析 PTS/DTS
///
/// ```text
/// bits32_30 = (b1 & 0x0E) >> 1
/// bits29_15 = ((b2 << 8) | (b3 & 0xFE)) >> 1
/// bits14_0  = ((b4 << 8) | (b5 & 0xFE)) >> 1
/// ```
pub fn parse_timestamp(data: &[u8], offset: usize) -> Option<u64> {
    let b = data.get(offset..offset + TIMESTAMP_LEN)?;

    let bits32_30 = ((b[0] & 0x0E) >> 1) as u64;
    let bits29_15 = ((((b[1] as u64) << 8) | (b[2] & 0xFE) as u64) >> 1) & 0x7FFF;
    let bits14_0 = ((((b[3] as u64) << 8) | (b[4] & 0xFE) as u64) >> 1) & 0x7FFF;

    Some((bits32_30 << 30) | (bits29_15 << 15) | bits14_0)
}

/// 时间戳换算为秒
pub fn pts_to_secs(pts: u64) -> f64 {
    pts as f64 / PTS_CLOCK_HZ as f64
}
