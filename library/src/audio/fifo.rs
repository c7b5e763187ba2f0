//! Elastic FIFO of audio samples, addressed in samples rather than bytes.
//!
//! Format and channel count are fixed at construction. Storage grows on
//! demand and the backing deques keep their capacity between reads, so a
//! steady write/read pattern stops allocating after warm-up.

use std::collections::VecDeque;

use crate::error::{SinkError, SinkResult};
use crate::model::format::SampleFormat;

pub struct SampleFifo {
    sample_format: SampleFormat,
    channels: usize,
    /// Bytes per sample instant within one plane.
    stride: usize,
    planes: Vec<VecDeque<u8>>,
    nb_samples: usize,
}

impl SampleFifo {
    /// Creates an empty FIFO with room for `capacity` samples up front.
    pub fn new(sample_format: SampleFormat, channels: usize, capacity: usize) -> SinkResult<Self> {
        if channels == 0 {
            return Err(SinkError::invalid_argument("sample FIFO needs at least one channel"));
        }

        let stride = sample_format.plane_stride(channels);
        let plane_count = sample_format.plane_count(channels);
        let mut planes = Vec::with_capacity(plane_count);
        for _ in 0..plane_count {
            let mut plane = VecDeque::new();
            plane.try_reserve(capacity.saturating_mul(stride))?;
            planes.push(plane);
        }

        Ok(Self {
            sample_format,
            channels,
            stride,
            planes,
            nb_samples: 0,
        })
    }

    pub fn sample_format(&self) -> SampleFormat {
        self.sample_format
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of samples currently queued.
    pub fn size(&self) -> usize {
        self.nb_samples
    }

    pub fn is_empty(&self) -> bool {
        self.nb_samples == 0
    }

    /// Appends `nb_samples` samples, one slice per plane. Every slice must
    /// hold exactly `nb_samples` samples in the FIFO's format.
    ///
    /// Nothing is written when a slice has the wrong size or growing the
    /// storage fails.
    pub fn write<P: AsRef<[u8]>>(&mut self, src: &[P], nb_samples: usize) -> SinkResult<usize> {
        let len = self.checked_plane_len(src.len(), nb_samples)?;
        if let Some(bad) = src.iter().map(|p| p.as_ref().len()).find(|&l| l != len) {
            return Err(SinkError::invalid_argument(format!(
                "source plane holds {} bytes, expected {}",
                bad, len
            )));
        }

        for plane in &mut self.planes {
            plane.try_reserve(len)?;
        }
        for (plane, data) in self.planes.iter_mut().zip(src) {
            plane.extend(data.as_ref());
        }

        self.nb_samples += nb_samples;
        Ok(nb_samples)
    }

    /// Moves up to `nb_samples` samples from the front of the FIFO into the
    /// start of each `dst` plane. Returns how many samples were read.
    pub fn read<P: AsMut<[u8]>>(&mut self, dst: &mut [P], nb_samples: usize) -> SinkResult<usize> {
        let nb_samples = nb_samples.min(self.nb_samples);
        let len = self.checked_plane_len(dst.len(), nb_samples)?;
        if dst.iter_mut().any(|p| p.as_mut().len() < len) {
            return Err(SinkError::invalid_argument(format!(
                "destination plane smaller than {} bytes",
                len
            )));
        }

        for (plane, out) in self.planes.iter_mut().zip(dst.iter_mut()) {
            copy_front(plane, &mut out.as_mut()[..len]);
            plane.drain(..len);
        }

        self.nb_samples -= nb_samples;
        Ok(nb_samples)
    }

    pub fn reset(&mut self) {
        for plane in &mut self.planes {
            plane.clear();
        }
        self.nb_samples = 0;
    }

    fn checked_plane_len(&self, plane_count: usize, nb_samples: usize) -> SinkResult<usize> {
        if plane_count != self.planes.len() {
            return Err(SinkError::invalid_argument(format!(
                "expected {} planes, got {}",
                self.planes.len(),
                plane_count
            )));
        }
        nb_samples
            .checked_mul(self.stride)
            .ok_or_else(|| SinkError::OutOfMemory(format!("{} samples", nb_samples)))
    }
}

fn copy_front(plane: &VecDeque<u8>, out: &mut [u8]) {
    let (head, tail) = plane.as_slices();
    let from_head = out.len().min(head.len());
    out[..from_head].copy_from_slice(&head[..from_head]);
    let rest = out.len() - from_head;
    out[from_head..].copy_from_slice(&tail[..rest]);
}
