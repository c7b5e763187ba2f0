use serde::{Deserialize, Serialize};

use crate::error::{SinkError, SinkResult};
use crate::model::format::{ChannelLayout, MediaType, PixelFormat, SampleFormat};
use crate::util::Rational;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioParams {
    pub sample_format: SampleFormat,
    pub channel_layout: ChannelLayout,
    pub sample_rate: u32,
}

impl AudioParams {
    pub fn channels(&self) -> usize {
        self.channel_layout.channels()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoParams {
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LinkMedia {
    Audio(AudioParams),
    Video(VideoParams),
}

/// Negotiated parameters of the link feeding a sink. Fixed before the sink
/// starts pulling and only ever read by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkParams {
    pub time_base: Rational,
    pub media: LinkMedia,
}

impl LinkParams {
    pub fn audio(
        sample_format: SampleFormat,
        channel_layout: ChannelLayout,
        sample_rate: u32,
        time_base: Rational,
    ) -> Self {
        Self {
            time_base,
            media: LinkMedia::Audio(AudioParams {
                sample_format,
                channel_layout,
                sample_rate,
            }),
        }
    }

    pub fn video(width: u32, height: u32, pixel_format: PixelFormat, time_base: Rational) -> Self {
        Self {
            time_base,
            media: LinkMedia::Video(VideoParams {
                width,
                height,
                pixel_format,
            }),
        }
    }

    pub fn media_type(&self) -> MediaType {
        match self.media {
            LinkMedia::Audio(_) => MediaType::Audio,
            LinkMedia::Video(_) => MediaType::Video,
        }
    }

    pub fn audio_params(&self) -> Option<&AudioParams> {
        match &self.media {
            LinkMedia::Audio(params) => Some(params),
            LinkMedia::Video(_) => None,
        }
    }

    pub fn video_params(&self) -> Option<&VideoParams> {
        match &self.media {
            LinkMedia::Video(params) => Some(params),
            LinkMedia::Audio(_) => None,
        }
    }

    pub fn validate(&self) -> SinkResult<()> {
        if !self.time_base.is_valid() {
            return Err(SinkError::invalid_argument(format!(
                "time base {} is not positive",
                self.time_base
            )));
        }
        match &self.media {
            LinkMedia::Audio(audio) => {
                if audio.sample_rate == 0 || audio.sample_rate > i32::MAX as u32 {
                    return Err(SinkError::invalid_argument(format!(
                        "unsupported sample rate {}",
                        audio.sample_rate
                    )));
                }
                if audio.channel_layout.is_empty() {
                    return Err(SinkError::invalid_argument("empty channel layout"));
                }
            }
            LinkMedia::Video(video) => {
                if video.width == 0 || video.height == 0 {
                    return Err(SinkError::invalid_argument(format!(
                        "invalid frame size {}x{}",
                        video.width, video.height
                    )));
                }
            }
        }
        Ok(())
    }
}
