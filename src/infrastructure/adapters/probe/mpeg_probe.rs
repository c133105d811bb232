//! MPEG Probe - 基于 symphonia 的时长解析
//!
//! 上游合成服务返回的 MPEG 音频不带容器级时长，
//! 这里解包统计 packet 时长。解析失败返回 None，不视为错误。

use std::io::Cursor;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// 解析 MPEG 数据的时长（毫秒）
pub fn mpeg_duration_ms(data: &[u8]) -> Option<u64> {
    let cursor = Cursor::new(data.to_vec());
    let stream = MediaSourceStream::new(Box::new(cursor), Default::default());

    let mut hint = Hint::new();
    hint.with_extension("mp3");

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .ok()?;

    let mut format = probed.format;
    let track = format.default_track()?;
    let track_id = track.id;
    let params = track.codec_params.clone();

    // 容器声明了帧数时直接换算
    if let (Some(n_frames), Some(sample_rate)) = (params.n_frames, params.sample_rate) {
        if sample_rate > 0 {
            return Some(n_frames * 1000 / sample_rate as u64);
        }
    }

    // 否则逐 packet 累计时长
    let time_base = params.time_base?;
    let mut total_ts = 0u64;
    while let Ok(packet) = format.next_packet() {
        if packet.track_id() == track_id {
            total_ts += packet.dur();
        }
    }

    if total_ts == 0 {
        return None;
    }

    let time = time_base.calc_time(total_ts);
    Some(time.seconds * 1000 + (time.frac * 1000.0) as u64)
}

/// 解析 MPEG 数据的时长（秒）
pub fn mpeg_duration_secs(data: &[u8]) -> Option<f64> {
    mpeg_duration_ms(data).map(|ms| ms as f64 / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_yields_none() {
        assert_eq!(mpeg_duration_ms(b"not audio at all"), None);
        assert_eq!(mpeg_duration_ms(&[]), None);
    }

    #[test]
    fn test_secs_conversion() {
        // 无有效数据时两个入口一致
        assert_eq!(mpeg_duration_secs(&[0u8; 16]), None);
    }
}
