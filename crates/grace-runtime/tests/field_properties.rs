//! Long-run properties of the three grid layers.

use grace_core::blur::gaussian_blur;
use grace_core::grid::Grid;
use grace_core::layer::Layer;
use grace_core::resample::resample;
use grace_core::rng::FieldRng;
use grace_runtime::accumulation::{
    AccumulationConfig, AccumulationField, ACCUMULATION_MAX, ACCUMULATION_MIN,
};
use grace_runtime::matter::{MatterConfig, MatterField};
use grace_runtime::substrate::{
    SubstrateConfig, SubstrateField, INITIAL_RANGE, INITIAL_SIGMA, SMOOTH_KEEP, SMOOTH_MIX,
    SUBSTRATE_MAX, SUBSTRATE_MIN,
};

fn pulse(size: usize, tick: usize) -> Grid {
    Grid::from_fn(size, size, |r, c| {
        if (r + c + tick) % 5 == 0 {
            0.9
        } else {
            0.0
        }
    })
}

#[test]
fn every_layer_stays_bounded_for_ten_thousand_ticks() {
    let size = 8;
    let mut substrate = SubstrateField::new(SubstrateConfig {
        size,
        fluctuation: 0.05,
        coherence_reward: 0.2,
        seed: 10,
        ..Default::default()
    })
    .unwrap();
    let mut matter = MatterField::new(MatterConfig {
        size,
        baseline_entropy: 0.3,
        ..Default::default()
    })
    .unwrap();
    let mut accumulation = AccumulationField::new(AccumulationConfig {
        size,
        accumulation_rate: 0.2,
        manifestation_threshold: 0.3,
        fluctuation: 0.05,
        seed: 11,
        ..Default::default()
    })
    .unwrap();

    for t in 0..10_000 {
        substrate.step(Some(&pulse(size, t))).unwrap();
        matter.update_from_substrate(substrate.grid()).unwrap();
        accumulation.accumulate_from_matter(matter.grid()).unwrap();
        accumulation.step();

        let s = substrate.grid();
        assert!(s.min() >= SUBSTRATE_MIN && s.max() <= SUBSTRATE_MAX, "tick {}", t);
        let m = matter.grid();
        assert!(m.min() >= 0.0 && m.max() <= 1.0, "tick {}", t);
        let a = accumulation.grid();
        assert!(a.min() >= ACCUMULATION_MIN && a.max() <= ACCUMULATION_MAX, "tick {}", t);
    }
    assert!(accumulation.events().iter().all(|e| e.strength.is_finite()));
    assert!(matter.manifestation_potential().is_finite());
}

#[test]
fn same_seed_and_inputs_reproduce_bit_for_bit() {
    let build = || {
        let substrate = SubstrateField::new(SubstrateConfig {
            size: 12,
            seed: 77,
            ..Default::default()
        })
        .unwrap();
        let accumulation = AccumulationField::new(AccumulationConfig {
            size: 12,
            manifestation_threshold: 0.02,
            seed: 78,
            ..Default::default()
        })
        .unwrap();
        (substrate, accumulation)
    };
    let (mut s1, mut a1) = build();
    let (mut s2, mut a2) = build();
    let matter = Grid::filled(12, 12, 0.95);

    for t in 0..300 {
        let p = pulse(12, t);
        s1.step(Some(&p)).unwrap();
        s2.step(Some(&p)).unwrap();
        if t % 7 == 0 {
            a1.accumulate_from_matter(&matter).unwrap();
            a2.accumulate_from_matter(&matter).unwrap();
        }
        let e1 = a1.step();
        let e2 = a2.step();
        assert_eq!(e1, e2);
        assert_eq!(s1.grid(), s2.grid());
        assert_eq!(a1.grid(), a2.grid());
        assert_eq!(
            s1.global_listening_quality().to_bits(),
            s2.global_listening_quality().to_bits()
        );
        assert_eq!(
            a1.global_accumulation().to_bits(),
            a2.global_accumulation().to_bits()
        );
    }
    assert!(a1.manifestation_count() > 0);
    assert_eq!(a1.events(), a2.events());
}

#[test]
fn matter_relaxes_to_baseline_without_input() {
    let mut matter = MatterField::new(MatterConfig {
        size: 6,
        baseline_entropy: 0.4,
        relaxation_rate: 0.05,
        ..Default::default()
    })
    .unwrap();
    let quiet = Grid::filled(6, 6, -0.1);
    let eps = 1e-6;
    let mut settled_at = None;
    for t in 0..2_000 {
        matter.update_from_substrate(&quiet).unwrap();
        let gap = (matter.grid().mean() - 0.4).abs();
        match settled_at {
            None if gap < eps => settled_at = Some(t),
            Some(_) => assert!(gap < eps, "drifted away at tick {}", t),
            None => {}
        }
    }
    assert!(settled_at.is_some());
    assert!(matter.global_extra_order().abs() < eps);
}

#[test]
fn substrate_exactly_at_threshold_gives_no_bonus() {
    let mut matter = MatterField::new(MatterConfig {
        size: 5,
        coherence_threshold: 0.06,
        baseline_entropy: 0.0,
        ..Default::default()
    })
    .unwrap();
    let at_threshold = Grid::filled(5, 5, 0.06);
    for _ in 0..100 {
        matter.update_from_substrate(&at_threshold).unwrap();
        assert!(matter.grid().as_slice().iter().all(|&c| c == 0.0));
    }
}

#[test]
fn manifestation_ticks_never_decrease() {
    let mut field = AccumulationField::new(AccumulationConfig {
        size: 10,
        manifestation_threshold: 0.2,
        accumulation_rate: 0.05,
        seed: 21,
        ..Default::default()
    })
    .unwrap();
    let matter = Grid::filled(10, 10, 1.0);
    for t in 0..600 {
        if t % 3 == 0 {
            field.accumulate_from_matter(&matter).unwrap();
        }
        field.step();
    }
    let events = field.events();
    assert!(!events.is_empty());
    assert!(events.windows(2).all(|w| w[0].tick <= w[1].tick));
    assert!(events.iter().all(|e| e.tick < 600));
}

#[test]
fn event_ticks_keep_counting_after_history_freezes() {
    let mut field = AccumulationField::new(AccumulationConfig {
        size: 10,
        manifestation_threshold: 0.2,
        accumulation_rate: 0.05,
        history_cap: 20,
        seed: 21,
        ..Default::default()
    })
    .unwrap();
    let matter = Grid::filled(10, 10, 1.0);
    for t in 0..600 {
        if t % 3 == 0 {
            field.accumulate_from_matter(&matter).unwrap();
        }
        field.step();
    }
    assert_eq!(field.history().len(), 20);
    assert_eq!(field.tick(), 600);
    let last = field.events().last().map(|e| e.tick).unwrap_or(0);
    assert!(last > 20, "last event at tick {}", last);
}

#[test]
fn cold_start_differs_from_prediction_only_by_noise() {
    let config = SubstrateConfig {
        size: 8,
        seed: 1,
        ..Default::default()
    };
    let mut field = SubstrateField::new(config.clone()).unwrap();
    field.step(None).unwrap();

    // Replay the private stream: initial draws, then one step of fluctuation.
    let mut rng = FieldRng::new(1);
    let mut state = Grid::square(8);
    rng.add_noise(state.as_mut_slice(), INITIAL_SIGMA);
    state.clamp(INITIAL_RANGE.0, INITIAL_RANGE.1);

    for v in state.as_mut_slice() {
        *v += config.baseline_presence;
    }
    let blurred = gaussian_blur(&state, config.diffusion_strength);
    for (v, b) in state.as_mut_slice().iter_mut().zip(blurred.as_slice()) {
        *v = SMOOTH_KEEP * *v + SMOOTH_MIX * b;
    }
    for v in state.as_mut_slice() {
        *v *= config.natural_decay;
    }
    let prediction = state.clone();

    let noise: Vec<f64> = (0..64).map(|_| rng.gaussian(0.0, config.fluctuation)).collect();
    for ((actual, predicted), n) in field
        .grid()
        .as_slice()
        .iter()
        .zip(prediction.as_slice())
        .zip(&noise)
    {
        let expected = (predicted + n).clamp(SUBSTRATE_MIN, SUBSTRATE_MAX);
        assert_eq!(actual.to_bits(), expected.to_bits());
    }
    assert_ne!(field.grid(), &prediction);
}

#[test]
fn saturated_accumulation_never_exceeds_bound() {
    let mut field = AccumulationField::new(AccumulationConfig {
        size: 16,
        manifestation_threshold: 0.01,
        manifestation_strength: 1.0,
        seed: 2,
        ..Default::default()
    })
    .unwrap();
    for _ in 0..2_000 {
        field.step();
        assert!(field.grid().max() <= 0.88);
    }
}

#[test]
fn mismatched_matter_shape_equals_external_resample() {
    let config = AccumulationConfig {
        size: 16,
        seed: 9,
        ..Default::default()
    };
    let mut direct = AccumulationField::new(config.clone()).unwrap();
    let mut prepared = AccumulationField::new(config).unwrap();

    let matter = Grid::from_fn(7, 7, |r, c| (r * 7 + c) as f64 / 48.0);
    direct.accumulate_from_matter(&matter).unwrap();
    prepared
        .accumulate_from_matter(&resample(&matter, 16, 16))
        .unwrap();
    assert_eq!(direct.grid(), prepared.grid());

    for _ in 0..50 {
        assert_eq!(direct.step(), prepared.step());
    }
    assert_eq!(direct.grid(), prepared.grid());
}

#[test]
fn malformed_external_input_is_rejected_without_mutation() {
    assert!(Grid::from_rows(&[vec![0.1, 0.2], vec![0.3]]).is_err());

    let mut field = AccumulationField::new(AccumulationConfig {
        size: 4,
        ..Default::default()
    })
    .unwrap();
    let before = field.grid().clone();
    let mut bad = Grid::filled(4, 4, 0.9);
    bad[(2, 1)] = f64::NAN;
    assert!(field.accumulate_from_matter(&bad).is_err());
    assert_eq!(field.grid(), &before);
}

#[test]
fn wire_grids_with_bad_shape_never_reach_a_field() {
    use grace_core::error::GraceError;

    let mut field = AccumulationField::new(AccumulationConfig {
        size: 3,
        ..Default::default()
    })
    .unwrap();
    let before = field.grid().clone();

    for json in [
        r#"{"rows":3,"cols":3,"data":[]}"#,
        r#"{"rows":0,"cols":0,"data":[]}"#,
        r#"{"rows":2,"cols":2,"data":[0.1,0.2,0.3]}"#,
    ] {
        let err = serde_json::from_str::<Grid>(json).unwrap_err();
        assert!(err.to_string().contains("grid"), "{}", err);
    }

    let empty = Grid::from_vec(0, 0, vec![]);
    assert!(matches!(empty, Err(GraceError::InvalidInputShape(_))));

    let ok: Grid = serde_json::from_str(r#"{"rows":1,"cols":1,"data":[0.9]}"#).unwrap();
    field.accumulate_from_matter(&ok).unwrap();
    assert_ne!(field.grid(), &before);
    assert_eq!(field.grid().shape(), (3, 3));
}

#[test]
fn every_push_entry_point_checks_its_input() {
    let mut bad = Grid::filled(3, 3, 0.5);
    bad[(0, 0)] = f64::INFINITY;

    let mut substrate = SubstrateField::new(SubstrateConfig {
        size: 4,
        ..Default::default()
    })
    .unwrap();
    let mut matter = MatterField::new(MatterConfig {
        size: 4,
        ..Default::default()
    })
    .unwrap();
    let s_before = substrate.grid().clone();
    let m_before = matter.grid().clone();

    assert!(substrate.step(Some(&bad)).is_err());
    assert!(substrate.absorb_ripple(&bad).is_err());
    assert!(matter.update_from_substrate(&bad).is_err());
    assert_eq!(substrate.grid(), &s_before);
    assert_eq!(substrate.tick(), 0);
    assert_eq!(matter.grid(), &m_before);
}
