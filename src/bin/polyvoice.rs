//! polyvoice - demo player
//!
//! Builds a two-oscillator patch, hands the render half to the default audio
//! device, and arpeggiates an A-minor scale while ticking the control clock.
//!
//! Run with: cargo run

use std::thread;
use std::time::{Duration, Instant};

use color_eyre::eyre::{eyre, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use polyvoice::notes::{self, FrequencyRoot};
use polyvoice::{EnvelopeParams, Oscillator, Synth, SynthConfig, TimingPolicy};

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device"))?;
    let supported = device.default_output_config()?;
    if supported.sample_format() != cpal::SampleFormat::F32 {
        return Err(eyre!(
            "demo expects an f32 output format, got {:?}",
            supported.sample_format()
        ));
    }
    let channels = supported.channels() as usize;
    let sample_rate = supported.sample_rate().0 as f32;

    let mut synth = Synth::new(SynthConfig {
        sample_rate,
        polyphony: 4,
        bpm: 110.0,
        volume: 0.8,
        envelope: EnvelopeParams {
            attack: 0.05,
            decay: 0.3,
            sustain_level: 0.6,
            sustain_duration: 0.4,
            release: 1.2,
            reset_gain_on_trigger: true,
        },
        timing: TimingPolicy::Beats,
    });

    synth.add_oscillator(Oscillator::sine(sample_rate).with_amplitude(0.6));
    synth.add_oscillator(Oscillator::triangle(sample_rate).with_amplitude(0.3));
    synth.start();

    let mut engine = synth.connect()?;
    let stream = device.build_output_stream(
        &supported.into(),
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            for frame in data.chunks_mut(channels) {
                let sample = engine.tick();
                for out in frame.iter_mut() {
                    *out = sample;
                }
            }
        },
        |err| tracing::error!(%err, "output stream error"),
        None,
    )?;
    stream.play()?;

    // Ascending A-minor walk across two octaves from the note table.
    let table = notes::note_table(0, 8, FrequencyRoot::Standard);
    let key = 9; // A
    let mut melody: Vec<f32> = Vec::new();
    for octave in [3usize, 4] {
        for &degree in notes::MINOR.degrees {
            let semitone = degree + key;
            melody.push(table[octave + semitone / 12][semitone % 12]);
        }
    }
    melody.push(table[5][9]); // top A

    println!("polyvoice demo: {} notes, 4 voices", melody.len());

    let mut clock = Instant::now();
    for frequency in melody {
        synth.play_note(frequency);

        // Drive the control-rate queue while the note's envelope runs.
        let note_start = Instant::now();
        while note_start.elapsed() < Duration::from_millis(320) {
            thread::sleep(Duration::from_millis(4));
            let now = Instant::now();
            synth.advance(now - clock);
            clock = now;
        }
    }

    // Let the release tails ring out.
    let tail_start = Instant::now();
    while tail_start.elapsed() < Duration::from_secs(3) {
        thread::sleep(Duration::from_millis(4));
        let now = Instant::now();
        synth.advance(now - clock);
        clock = now;
    }

    Ok(())
}
