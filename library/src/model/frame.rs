use crate::error::{SinkError, SinkResult};
use crate::model::format::{ChannelLayout, MediaType, PixelFormat, SampleFormat};
use crate::model::link::{AudioParams, VideoParams};

/// Owned block of audio samples. Whoever holds the value holds the only
/// handle to its storage and may write to it.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFrame {
    sample_format: SampleFormat,
    channel_layout: ChannelLayout,
    sample_rate: u32,
    nb_samples: usize,
    planes: Vec<Vec<u8>>,
    /// Presentation timestamp in the link time base; `None` when unknown.
    pub pts: Option<i64>,
}

impl AudioFrame {
    /// Allocates a zeroed frame holding `nb_samples` samples in `params` format.
    pub fn alloc(params: &AudioParams, nb_samples: usize) -> SinkResult<Self> {
        let channels = params.channels();
        let plane_len = nb_samples
            .checked_mul(params.sample_format.plane_stride(channels))
            .ok_or_else(|| SinkError::OutOfMemory(format!("{} samples", nb_samples)))?;

        let plane_count = params.sample_format.plane_count(channels);
        let mut planes = Vec::new();
        planes.try_reserve_exact(plane_count)?;
        for _ in 0..plane_count {
            let mut plane = Vec::new();
            plane.try_reserve_exact(plane_len)?;
            plane.resize(plane_len, 0);
            planes.push(plane);
        }

        Ok(Self {
            sample_format: params.sample_format,
            channel_layout: params.channel_layout,
            sample_rate: params.sample_rate,
            nb_samples,
            planes,
            pts: None,
        })
    }

    /// Wraps existing sample data. Plane count and lengths must match
    /// `nb_samples` in the given format.
    pub fn from_planes(
        params: &AudioParams,
        nb_samples: usize,
        planes: Vec<Vec<u8>>,
        pts: Option<i64>,
    ) -> SinkResult<Self> {
        let channels = params.channels();
        let expected_planes = params.sample_format.plane_count(channels);
        let expected_len = nb_samples
            .checked_mul(params.sample_format.plane_stride(channels))
            .ok_or_else(|| SinkError::OutOfMemory(format!("{} samples", nb_samples)))?;

        if planes.len() != expected_planes {
            return Err(SinkError::invalid_argument(format!(
                "expected {} planes for {} {}ch, got {}",
                expected_planes,
                params.sample_format.name(),
                channels,
                planes.len()
            )));
        }
        if let Some(bad) = planes.iter().find(|p| p.len() != expected_len) {
            return Err(SinkError::invalid_argument(format!(
                "plane holds {} bytes, expected {}",
                bad.len(),
                expected_len
            )));
        }

        Ok(Self {
            sample_format: params.sample_format,
            channel_layout: params.channel_layout,
            sample_rate: params.sample_rate,
            nb_samples,
            planes,
            pts,
        })
    }

    pub fn nb_samples(&self) -> usize {
        self.nb_samples
    }

    pub fn sample_format(&self) -> SampleFormat {
        self.sample_format
    }

    pub fn channel_layout(&self) -> ChannelLayout {
        self.channel_layout
    }

    pub fn channels(&self) -> usize {
        self.channel_layout.channels()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn planes(&self) -> &[Vec<u8>] {
        &self.planes
    }

    pub fn plane(&self, index: usize) -> Option<&[u8]> {
        self.planes.get(index).map(Vec::as_slice)
    }

    pub fn planes_mut(&mut self) -> &mut [Vec<u8>] {
        &mut self.planes
    }

    /// Shrinks the frame to its first `nb_samples` samples.
    pub fn truncate(&mut self, nb_samples: usize) {
        if nb_samples >= self.nb_samples {
            return;
        }
        let len = nb_samples * self.sample_format.plane_stride(self.channels());
        for plane in &mut self.planes {
            plane.truncate(len);
        }
        self.nb_samples = nb_samples;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame {
    width: u32,
    height: u32,
    pixel_format: PixelFormat,
    planes: Vec<Vec<u8>>,
    pub pts: Option<i64>,
}

impl VideoFrame {
    pub fn new(params: &VideoParams, planes: Vec<Vec<u8>>, pts: Option<i64>) -> SinkResult<Self> {
        if planes.len() != params.pixel_format.plane_count() {
            return Err(SinkError::invalid_argument(format!(
                "{:?} needs {} planes, got {}",
                params.pixel_format,
                params.pixel_format.plane_count(),
                planes.len()
            )));
        }
        Ok(Self {
            width: params.width,
            height: params.height,
            pixel_format: params.pixel_format,
            planes,
            pts,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    pub fn planes(&self) -> &[Vec<u8>] {
        &self.planes
    }
}

/// One unit of media moving through the sink.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Audio(AudioFrame),
    Video(VideoFrame),
}

impl Frame {
    pub fn media_type(&self) -> MediaType {
        match self {
            Frame::Audio(_) => MediaType::Audio,
            Frame::Video(_) => MediaType::Video,
        }
    }

    pub fn pts(&self) -> Option<i64> {
        match self {
            Frame::Audio(frame) => frame.pts,
            Frame::Video(frame) => frame.pts,
        }
    }

    pub fn as_audio(&self) -> Option<&AudioFrame> {
        match self {
            Frame::Audio(frame) => Some(frame),
            Frame::Video(_) => None,
        }
    }

    pub fn into_audio(self) -> Option<AudioFrame> {
        match self {
            Frame::Audio(frame) => Some(frame),
            Frame::Video(_) => None,
        }
    }
}

impl From<AudioFrame> for Frame {
    fn from(frame: AudioFrame) -> Self {
        Frame::Audio(frame)
    }
}

impl From<VideoFrame> for Frame {
    fn from(frame: VideoFrame) -> Self {
        Frame::Video(frame)
    }
}
