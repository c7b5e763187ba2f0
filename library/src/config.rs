use serde::{Deserialize, Serialize};

use crate::error::{SinkError, SinkResult};
use crate::model::format::MediaType;

/// Registered sink kinds, one per media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub media_type: MediaType,
}

pub const SINK_DESCRIPTORS: &[SinkDescriptor] = &[
    SinkDescriptor {
        name: "buffersink",
        description: "Buffer video frames, and make them available to the end of the filter graph.",
        media_type: MediaType::Video,
    },
    SinkDescriptor {
        name: "abuffersink",
        description: "Buffer audio frames, and make them available to the end of the filter graph.",
        media_type: MediaType::Audio,
    },
];

pub fn find_descriptor(name: &str) -> Option<&'static SinkDescriptor> {
    SINK_DESCRIPTORS.iter().find(|d| d.name == name)
}

pub fn descriptor_for(media_type: MediaType) -> &'static SinkDescriptor {
    match media_type {
        MediaType::Video => &SINK_DESCRIPTORS[0],
        MediaType::Audio => &SINK_DESCRIPTORS[1],
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkOptions {
    /// Instance name used in log output.
    pub name: String,
    pub media_type: MediaType,
    /// Fixed sample count served by `BufferSink::get_frame` on audio sinks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_size: Option<usize>,
}

impl SinkOptions {
    pub fn new(name: impl Into<String>, media_type: MediaType) -> Self {
        Self {
            name: name.into(),
            media_type,
            frame_size: None,
        }
    }

    pub fn with_frame_size(mut self, frame_size: usize) -> Self {
        self.frame_size = Some(frame_size);
        self
    }

    pub fn from_json(json: &str) -> SinkResult<Self> {
        let options: SinkOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn to_json(&self) -> SinkResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> SinkResult<()> {
        if self.name.trim().is_empty() {
            return Err(SinkError::invalid_argument("sink name must not be empty"));
        }
        match (self.media_type, self.frame_size) {
            (_, Some(0)) => Err(SinkError::invalid_argument("frame_size must be positive")),
            (MediaType::Video, Some(_)) => Err(SinkError::invalid_argument(
                "frame_size only applies to audio sinks",
            )),
            _ => Ok(()),
        }
    }
}
