//! Benchmarks for the render tick and the control-rate envelope machinery.
//!
//! Run with: cargo bench
//!
//! The render tick is the hard deadline: at 48kHz one sample must cost well
//! under 20.8µs even with every voice sounding. Control-rate advance has no
//! audio deadline but runs on the host's timer cadence, so it should stay
//! cheap under heavy retriggering.

use std::hint::black_box;
use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use polyvoice::{EnvelopeParams, Oscillator, Synth, SynthConfig, TimingPolicy, Waveform};

const SAMPLE_RATE: f32 = 48_000.0;

fn config(polyphony: usize) -> SynthConfig {
    SynthConfig {
        sample_rate: SAMPLE_RATE,
        polyphony,
        bpm: 120.0,
        volume: 1.0,
        envelope: EnvelopeParams {
            attack: 0.05,
            decay: 0.1,
            sustain_level: 0.7,
            sustain_duration: 0.2,
            release: 0.3,
            reset_gain_on_trigger: true,
        },
        timing: TimingPolicy::Seconds,
    }
}

fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for waveform in [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Triangle,
        Waveform::SawtoothUp,
        Waveform::WhiteNoise,
    ] {
        let mut osc = Oscillator::new(SAMPLE_RATE, waveform).with_frequency(440.0);
        osc.start();
        group.bench_function(format!("{waveform:?}"), |b| {
            b.iter(|| black_box(osc.render_sample()))
        });
    }

    group.finish();
}

fn bench_engine_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("synth/tick");

    for &polyphony in &[1usize, 4, 8, 16] {
        let mut synth = Synth::new(config(polyphony));
        synth.add_oscillator(Oscillator::sine(SAMPLE_RATE).with_amplitude(0.5));
        synth.add_oscillator(Oscillator::sawtooth_up(SAMPLE_RATE).with_amplitude(0.3));
        synth.start();
        let mut engine = synth.connect().expect("engine");

        // Light every voice up so the bench measures the full mixing cost.
        for i in 0..polyphony {
            synth.play_note(110.0 * (i + 1) as f32);
        }
        synth.advance(Duration::from_millis(100));

        group.bench_with_input(
            BenchmarkId::from_parameter(polyphony),
            &polyphony,
            |b, _| b.iter(|| black_box(engine.tick())),
        );
    }

    group.finish();
}

fn bench_control_advance(c: &mut Criterion) {
    let mut group = c.benchmark_group("synth/advance");

    // Rapid retriggering: every advance slice also fires a new note, so the
    // queue constantly carries fresh and superseded envelope chains.
    group.bench_function("retrigger_storm", |b| {
        let mut synth = Synth::new(config(8));
        synth.add_oscillator(Oscillator::sine(SAMPLE_RATE));
        synth.start();
        let _engine = synth.connect().expect("engine");

        b.iter(|| {
            synth.play_note(black_box(440.0));
            synth.advance(Duration::from_millis(2));
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_oscillator,
    bench_engine_tick,
    bench_control_advance
);
criterion_main!(benches);
