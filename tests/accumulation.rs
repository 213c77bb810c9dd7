use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;

use sedimenta::{
    CaptureParams, EngineOptions, LayeringMode, PixelBuffer, Rgba, SedimentProcessor,
    Session, SyntheticSource,
};

fn slit(gray: f64) -> PixelBuffer {
    PixelBuffer::solid(4, 32, Rgba::opaque(gray, gray, gray))
}

fn processor_with_capacity(max_layers: usize) -> SedimentProcessor {
    SedimentProcessor::new(EngineOptions {
        max_layers,
        seed: 1,
        ..EngineOptions::default()
    })
    .unwrap()
}

#[test]
fn capacity_invariant_holds_for_any_append_sequence() {
    let mut p = processor_with_capacity(5);
    for i in 0..8u64 {
        p.process_slit(slit(80.0), i as f64 * 10.0, i * 33, &CaptureParams::default());
        assert!(p.store().len() <= 5);
    }
    // Exactly the last five inserted remain, oldest three evicted.
    let positions: Vec<f64> = p.store().layers().iter().map(|l| l.position).collect();
    assert_eq!(positions, vec![30.0, 40.0, 50.0, 60.0, 70.0]);
}

#[test]
fn erosion_factor_is_monotonic_over_the_session() {
    let mut p = processor_with_capacity(50);
    let mut previous: Vec<f64> = Vec::new();

    for i in 0..30u64 {
        let gray = f64::from((i % 5) as u32) * 60.0;
        p.process_slit(slit(gray), 50.0, i * 33, &CaptureParams::default());

        let current: Vec<f64> = p.store().layers().iter().map(|l| l.erosion_factor).collect();
        // Compare the suffix that survived from the previous frame.
        let evicted = (previous.len() + 1).saturating_sub(current.len());
        for (new, old) in current.iter().zip(previous.iter().skip(evicted)) {
            assert!(new >= old, "erosion decreased: {new} < {old}");
        }
        previous = current;
    }
}

#[test]
fn compaction_floors_at_one_tenth() {
    let mut p = processor_with_capacity(10);
    let params = CaptureParams {
        compaction_rate: 1000.0, // 1.0 per tick after scaling
        ..CaptureParams::default()
    };
    for i in 0..5u64 {
        p.process_slit(slit(0.0), 0.0, i * 33, &params);
    }
    for layer in p.store().layers() {
        assert!(layer.compaction >= 0.1);
    }
    assert_eq!(p.store().layers()[0].compaction, 0.1);
}

#[test]
fn zero_compaction_rate_changes_nothing_across_ticks() {
    let mut p = processor_with_capacity(10);
    let params = CaptureParams {
        compaction_rate: 0.0,
        ..CaptureParams::default()
    };
    for i in 0..40u64 {
        p.process_slit(slit(10.0), 0.0, i * 33, &params);
    }
    assert!(p.store().layers().iter().all(|l| l.compaction == 1.0));
}

#[test]
fn intensity_ordering_is_ascending_regardless_of_insertion() {
    let mut p = processor_with_capacity(20);
    // Insert out of order: intensities i*25 at evenly spaced positions.
    for (slot, i) in [7usize, 2, 9, 0, 4, 6, 1, 8, 3, 5].into_iter().enumerate() {
        p.process_slit(
            slit(i as f64 * 25.0),
            slot as f64 * 10.0,
            slot as u64 * 33,
            &CaptureParams::default(),
        );
    }
    let order = p.order_indices(LayeringMode::Intensity);
    let intensities: Vec<f64> = order
        .iter()
        .map(|&i| p.store().layers()[i].motion_intensity)
        .collect();
    let mut sorted = intensities.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(intensities, sorted);
    assert_eq!(intensities.len(), 10);
}

#[test]
fn random_ordering_is_a_permutation_of_the_store() {
    let mut p = processor_with_capacity(30);
    for i in 0..12u64 {
        p.process_slit(slit(40.0), 0.0, i * 33, &CaptureParams::default());
    }
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let order = p.store().order_indices(LayeringMode::Random, &mut rng);
    let mut sorted = order.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, (0..12).collect::<Vec<_>>());
}

#[test]
fn organic_variation_stays_in_unit_interval() {
    let mut p = processor_with_capacity(20);
    let params = CaptureParams {
        organic_factor: 100.0,
        ..CaptureParams::default()
    };
    for i in 0..200u64 {
        p.process_slit(slit(30.0), (i % 100) as f64, i * 33, &params);
    }
    // Every layer has seen at least its own capture tick, which wraps the
    // drift into [0, 1).
    for layer in p.store().layers() {
        assert!((0.0..1.0).contains(&layer.organic_variation));
    }
}

#[test]
fn stats_track_the_session() {
    let mut session = Session::new(processor_with_capacity(100));
    let mut source = SyntheticSource::new(4, 32, 25);
    session.start();
    while session.frame(&mut source, &CaptureParams::default()).is_some() {}

    let stats = session.processor().stats();
    assert_eq!(stats.layer_count, 25);
    assert_eq!(stats.oldest_layer_age, 25);
    assert!(stats.average_motion > 0.0);
    assert!(stats.wave_phase_deg >= 0.0 && stats.wave_phase_deg < 360.0);
    assert!(stats.tidal_cycle_deg >= 0.0 && stats.tidal_cycle_deg < 360.0);
}

#[test]
fn first_capture_has_zero_time_delta() {
    let mut p = processor_with_capacity(5);
    // A large first timestamp must not swing the tidal cycle.
    p.process_slit(slit(0.0), 0.0, 999_999, &CaptureParams::default());
    assert_eq!(p.clock().tidal_cycle, 0.0);
}
