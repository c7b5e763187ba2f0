use framesink::util::rescale_q;
use framesink::{
    AudioFrame, BufferSink, ChannelLayout, Frame, FrameSink, LinkParams, PixelFormat,
    QueuedSource, Rational, SampleFormat, SinkError, SinkOptions, MediaType,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn mono_link(sample_rate: u32, time_base: Rational) -> LinkParams {
    LinkParams::audio(SampleFormat::S16, ChannelLayout::MONO, sample_rate, time_base)
}

/// Mono s16 frame whose samples count up from `first`.
fn counting_frame(link: &LinkParams, first: usize, nb_samples: usize, pts: Option<i64>) -> AudioFrame {
    let data = (first..first + nb_samples)
        .flat_map(|i| (i as i16).to_le_bytes())
        .collect();
    AudioFrame::from_planes(link.audio_params().unwrap(), nb_samples, vec![data], pts).unwrap()
}

fn sample_values(frame: &AudioFrame) -> Vec<i16> {
    frame.plane(0)
        .unwrap()
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect()
}

/// Queues frames of the given sizes with contiguous content and pts.
fn source_with_sizes(link: LinkParams, sizes: &[usize]) -> QueuedSource {
    let mut source = QueuedSource::new(link);
    let mut first = 0;
    for &n in sizes {
        let pts = rescale_q(first as i64, Rational::new(1, 48000), link.time_base);
        source.push_frame(counting_frame(&link, first, n, Some(pts)));
        first += n;
    }
    source
}

#[test]
fn test_exact_multiple_emits_no_trailing_frame() {
    init_logger();
    let link = mono_link(48000, Rational::new(1, 48000));
    let mut sink = BufferSink::new(source_with_sizes(link, &[480, 500, 20])).unwrap();

    let frame = sink.read_samples(1000).unwrap();
    assert_eq!(frame.nb_samples(), 1000);
    assert_eq!(frame.pts, Some(0));

    assert!(matches!(sink.read_samples(1000), Err(SinkError::Eof)));
    assert!(matches!(sink.read_samples(1000), Err(SinkError::Eof)));
}

#[test]
fn test_rechunking_conserves_samples_and_order() {
    init_logger();
    let sizes = [7, 300, 1, 64, 1000, 33];
    let total: usize = sizes.iter().sum();

    for &n in &[1usize, 10, 64, 128, 1000, 5000] {
        let link = mono_link(48000, Rational::new(1, 48000));
        let mut sink = BufferSink::new(source_with_sizes(link, &sizes)).unwrap();

        let mut lengths = Vec::new();
        let mut values = Vec::new();
        loop {
            match sink.read_samples(n) {
                Ok(frame) => {
                    lengths.push(frame.nb_samples());
                    values.extend(sample_values(&frame));
                }
                Err(SinkError::Eof) => break,
                Err(err) => panic!("unexpected error for n={}: {}", n, err),
            }
        }

        let full = total / n;
        assert_eq!(lengths.len(), full + usize::from(total % n != 0), "n={}", n);
        assert!(lengths[..full].iter().all(|&len| len == n), "n={}", n);
        if total % n != 0 {
            assert_eq!(*lengths.last().unwrap(), total % n, "n={}", n);
        }

        let expected: Vec<i16> = (0..total).map(|i| i as i16).collect();
        assert_eq!(values, expected, "n={}", n);
    }
}

#[test]
fn test_timestamps_advance_by_chunk_duration() {
    init_logger();
    let time_base = Rational::new(1, 90000);
    let link = mono_link(44100, time_base);
    let mut source = QueuedSource::new(link);
    let mut first = 0;
    for n in [1000, 1500, 700, 2000] {
        source.push_frame(counting_frame(&link, first, n, None));
        first += n;
    }
    let mut sink = BufferSink::new(source).unwrap();

    let mut previous: Option<(i64, usize)> = None;
    while let Ok(frame) = sink.read_samples(1024) {
        let pts = frame.pts.unwrap();
        if let Some((prev_pts, prev_len)) = previous {
            let step = rescale_q(prev_len as i64, Rational::new(1, 44100), time_base);
            assert_eq!(pts, prev_pts + step);
            assert!(pts >= prev_pts);
        } else {
            assert_eq!(pts, 0);
        }
        previous = Some((pts, frame.nb_samples()));
    }
    // 5200 samples in chunks of 1024 leave 80 for the final frame.
    assert_eq!(previous.map(|(_, len)| len), Some(80));
}

#[test]
fn test_stamped_input_resynchronizes_output() {
    init_logger();
    let link = mono_link(1000, Rational::new(1, 1000));
    let mut source = QueuedSource::new(link);
    source.push_frame(counting_frame(&link, 0, 30, Some(100)));
    // Jump forward: the next frame starts 500 ticks later than expected.
    source.push_frame(counting_frame(&link, 30, 30, Some(630)));
    let mut sink = BufferSink::new(source).unwrap();

    let first = sink.read_samples(20).unwrap();
    assert_eq!(first.pts, Some(100));

    // 10 samples still queued ahead of the pts=630 frame.
    let second = sink.read_samples(20).unwrap();
    assert_eq!(second.pts, Some(620));
    assert_eq!(sink.buffered_samples(), 20);

    let third = sink.read_samples(20).unwrap();
    assert_eq!(third.pts, Some(640));
}

#[test]
fn test_short_input_drains_on_end_of_stream() {
    init_logger();
    let link = mono_link(48000, Rational::new(1, 48000));
    let mut sink = BufferSink::new(source_with_sizes(link, &[100, 50])).unwrap();

    let frame = sink.read_samples(1024).unwrap();
    assert_eq!(frame.nb_samples(), 150);
    assert_eq!(frame.pts, Some(0));
    assert_eq!(sample_values(&frame), (0..150).collect::<Vec<i16>>());

    assert!(sink.read_samples(1024).unwrap_err().is_eof());
    assert!(sink.read_samples(1024).unwrap_err().is_eof());
}

#[test]
fn test_large_frame_is_split_across_calls() {
    init_logger();
    let link = mono_link(48000, Rational::new(1, 48000));
    let mut sink = BufferSink::new(source_with_sizes(link, &[4096])).unwrap();

    for i in 0..4 {
        let frame = sink.read_samples(1024).unwrap();
        assert_eq!(frame.pts, Some(i * 1024));
    }
    assert_eq!(sink.upstream().requests(), 1);
    assert!(sink.read_samples(1024).unwrap_err().is_eof());
}

#[test]
fn test_upstream_failure_keeps_queued_samples() {
    init_logger();
    let link = mono_link(48000, Rational::new(1, 48000));
    let mut source = QueuedSource::new(link);
    source.push_frame(counting_frame(&link, 0, 300, Some(0)));
    source.push_error(SinkError::upstream("transient"));
    source.push_frame(counting_frame(&link, 300, 300, Some(300)));
    let mut sink = BufferSink::new(source).unwrap();

    assert!(matches!(sink.read_samples(500), Err(SinkError::Upstream(_))));
    assert_eq!(sink.buffered_samples(), 300);

    let frame = sink.read_samples(500).unwrap();
    assert_eq!(frame.pts, Some(0));
    assert_eq!(sample_values(&frame), (0..500).collect::<Vec<i16>>());

    let tail = sink.read_samples(500).unwrap();
    assert_eq!(tail.nb_samples(), 100);
    assert_eq!(tail.pts, Some(500));
}

#[test]
fn test_allocation_failure_is_reported_and_retryable() {
    init_logger();
    let link = mono_link(48000, Rational::new(1, 48000));
    let mut sink = BufferSink::new(source_with_sizes(link, &[256])).unwrap();

    sink.upstream_mut().set_fail_allocations(true);
    assert!(matches!(sink.read_samples(128), Err(SinkError::OutOfMemory(_))));
    assert_eq!(sink.buffered_samples(), 256);

    sink.upstream_mut().set_fail_allocations(false);
    assert_eq!(sink.read_samples(128).unwrap().pts, Some(0));
    assert_eq!(sink.read_samples(128).unwrap().pts, Some(128));
}

#[test]
fn test_planar_stereo_rechunking() {
    init_logger();
    let link = LinkParams::audio(
        SampleFormat::U8p,
        ChannelLayout::STEREO,
        8000,
        Rational::new(1, 8000),
    );
    let params = *link.audio_params().unwrap();
    let mut source = QueuedSource::new(link);
    source.push_frame(
        AudioFrame::from_planes(&params, 3, vec![vec![1, 2, 3], vec![101, 102, 103]], Some(0))
            .unwrap(),
    );
    source.push_frame(
        AudioFrame::from_planes(&params, 2, vec![vec![4, 5], vec![104, 105]], Some(3)).unwrap(),
    );
    let mut sink = BufferSink::new(source).unwrap();

    let frame = sink.read_samples(4).unwrap();
    assert_eq!(frame.planes(), &[vec![1u8, 2, 3, 4], vec![101u8, 102, 103, 104]]);
    let frame = sink.read_samples(4).unwrap();
    assert_eq!(frame.planes(), &[vec![5u8], vec![105u8]]);
    assert_eq!(frame.pts, Some(4));
}

#[test]
fn test_invalid_sample_requests() {
    init_logger();
    let link = mono_link(48000, Rational::new(1, 48000));
    let mut sink = BufferSink::new(source_with_sizes(link, &[10])).unwrap();
    assert!(matches!(sink.read_samples(0), Err(SinkError::InvalidArgument(_))));

    let video = LinkParams::video(2, 2, PixelFormat::Gray8, Rational::new(1, 30));
    let mut sink = BufferSink::new(QueuedSource::new(video)).unwrap();
    assert!(matches!(sink.read_samples(16), Err(SinkError::InvalidArgument(_))));
}

#[test]
fn test_get_frame_uses_configured_frame_size() {
    init_logger();
    let link = mono_link(48000, Rational::new(1, 48000));
    let options = SinkOptions::new("encoder", MediaType::Audio).with_frame_size(256);
    let mut sink = BufferSink::with_options(source_with_sizes(link, &[100, 400]), options).unwrap();

    let lengths: Vec<usize> = std::iter::from_fn(|| sink.get_frame().ok())
        .map(|f| f.as_audio().unwrap().nb_samples())
        .collect();
    assert_eq!(lengths, vec![256, 244]);

    let mut plain = BufferSink::new(source_with_sizes(link, &[100, 400])).unwrap();
    let frame = plain.get_frame().unwrap();
    assert_eq!(frame.as_audio().map(AudioFrame::nb_samples), Some(100));
    assert!(matches!(plain.pull(), Ok(Frame::Audio(_))));
}

#[test]
fn test_teardown_releases_sample_queue() {
    init_logger();
    let link = mono_link(48000, Rational::new(1, 48000));
    let mut sink = BufferSink::new(source_with_sizes(link, &[1000])).unwrap();
    sink.read_samples(600).unwrap();

    let report = sink.teardown();
    assert!(report.had_sample_queue);
    assert_eq!(report.released_samples, 400);
    assert!(!report.released_pending_frame);

    let again = sink.teardown();
    assert!(!again.had_sample_queue);
    assert_eq!(again.released_samples, 0);
}

#[test]
fn test_frame_not_matching_link_is_rejected() {
    init_logger();
    let link = mono_link(48000, Rational::new(1, 48000));
    let stereo = LinkParams::audio(SampleFormat::S16, ChannelLayout::STEREO, 48000, Rational::new(1, 48000));
    let data: Vec<u8> = (0..16).collect();
    let frame = AudioFrame::from_planes(stereo.audio_params().unwrap(), 4, vec![data], Some(0)).unwrap();
    let mut sink = BufferSink::new(QueuedSource::with_frames(link, vec![frame])).unwrap();

    let err = sink.read_samples(4).unwrap_err();
    assert!(err.is_invalid_state(), "got {:?}", err);
    assert_eq!(sink.buffered_samples(), 0);

    // Same layout, different rate.
    let fast = LinkParams::audio(SampleFormat::S16, ChannelLayout::MONO, 96000, Rational::new(1, 48000));
    let frame = AudioFrame::from_planes(fast.audio_params().unwrap(), 4, vec![vec![0; 8]], Some(0)).unwrap();
    let mut sink = BufferSink::new(QueuedSource::with_frames(link, vec![frame])).unwrap();
    assert!(matches!(sink.read_samples(4), Err(SinkError::InvalidState(_))));
    assert_eq!(sink.buffered_samples(), 0);
}
