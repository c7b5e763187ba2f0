use log::trace;

use crate::audio::SampleFifo;
use crate::error::{SinkError, SinkResult};
use crate::graph::Upstream;
use crate::model::frame::AudioFrame;
use crate::model::link::AudioParams;
use crate::util::{Rational, rescale_q};

/// Queue and timestamp cursor behind fixed-size sample reads.
pub struct Rechunker {
    fifo: SampleFifo,
    params: AudioParams,
    time_base: Rational,
    /// Timestamp of the next sample to leave the queue.
    next_pts: i64,
}

impl Rechunker {
    pub fn new(params: &AudioParams, time_base: Rational, capacity: usize) -> SinkResult<Self> {
        let fifo = SampleFifo::new(params.sample_format, params.channels(), capacity)?;
        Ok(Self {
            fifo,
            params: *params,
            time_base,
            next_pts: 0,
        })
    }

    /// Samples waiting in the queue.
    pub fn buffered(&self) -> usize {
        self.fifo.size()
    }

    pub fn next_pts(&self) -> i64 {
        self.next_pts
    }

    fn duration_of(&self, nb_samples: usize) -> i64 {
        let nb_samples = i64::try_from(nb_samples).unwrap_or(i64::MAX);
        rescale_q(nb_samples, Rational::per_sample(self.params.sample_rate), self.time_base)
    }

    /// Queues a frame freshly pulled from upstream.
    ///
    /// A stamped frame moves the cursor to its pts minus whatever is already
    /// queued, since those samples play before it. A frame whose format
    /// differs from the link's is rejected and leaves the queue untouched.
    pub fn push(&mut self, frame: AudioFrame) -> SinkResult<()> {
        if frame.sample_format() != self.params.sample_format
            || frame.channel_layout() != self.params.channel_layout
            || frame.sample_rate() != self.params.sample_rate
        {
            return Err(SinkError::invalid_state(format!(
                "{} {}ch @ {}Hz frame on a {} {}ch @ {}Hz link",
                frame.sample_format().name(),
                frame.channels(),
                frame.sample_rate(),
                self.params.sample_format.name(),
                self.params.channels(),
                self.params.sample_rate
            )));
        }

        let queued = self.fifo.size();
        let resync = frame
            .pts
            .map(|pts| pts.saturating_sub(self.duration_of(queued)));

        self.fifo.write(frame.planes(), frame.nb_samples())?;

        if let Some(next_pts) = resync {
            trace!("resync next_pts={} with {} queued ahead", next_pts, queued);
            self.next_pts = next_pts;
        }
        Ok(())
    }

    /// Moves `nb_samples` queued samples into a new frame from `upstream`
    /// and advances the cursor past them.
    pub fn take<U: Upstream + ?Sized>(
        &mut self,
        upstream: &mut U,
        nb_samples: usize,
    ) -> SinkResult<AudioFrame> {
        let mut frame = upstream.get_audio_buffer(nb_samples)?;
        let read = self.fifo.read(frame.planes_mut(), nb_samples)?;
        frame.truncate(read);

        frame.pts = Some(self.next_pts);
        self.next_pts = self.next_pts.saturating_add(self.duration_of(read));
        trace!("emit {} samples pts={:?}", read, frame.pts);
        Ok(frame)
    }

    /// Drops all queued samples, returning how many there were.
    pub fn clear(&mut self) -> usize {
        let released = self.fifo.size();
        self.fifo.reset();
        released
    }
}
