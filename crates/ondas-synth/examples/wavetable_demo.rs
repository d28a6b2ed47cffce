//! Wavetable oscillator walkthrough: upload, pitch sweep, frame morph.
//!
//! Run with: cargo run -p ondas-synth --example wavetable_demo

use ondas_analysis::rms;
use ondas_synth::{waveform, WavetableOscillator};

const FRAME_LEN: usize = 2048;
const BLOCK: usize = 512;

fn main() {
    // --- build a two-frame wavetable: saw morphing into sine ---
    let frames = vec![
        waveform::saw_cycle(FRAME_LEN, 0.8),
        waveform::sine_cycle(FRAME_LEN),
    ];
    let packed = waveform::pack_frames(&frames, 0);

    let mut osc = WavetableOscillator::new(FRAME_LEN);
    osc.prepare(BLOCK);
    osc.upload_wavetable_frames(&packed, frames.len(), 0)
        .expect("valid wavetable");
    osc.set_volume(0.8);

    let mut left = vec![0.0f32; BLOCK];
    let mut right = vec![0.0f32; BLOCK];

    // --- pitch sweep ---
    println!("=== Pitch sweep (saw frame) ===\n");
    println!("{:>8} {:>10} {:>12}", "octaves", "rms", "pos (smp)");
    for step in 0..=8 {
        let pitch = step as f32;
        osc.set_pitch_octaves(pitch);
        osc.render_stereo(&mut left, &mut right);
        println!(
            "{:>8.1} {:>10.4} {:>12}",
            pitch,
            rms(&left),
            osc.playback_pos() >> 32
        );
    }

    // --- frame morph at a fixed pitch ---
    println!("\n=== Frame morph saw -> sine at +2 octaves ===\n");
    osc.set_pitch_octaves(2.0);
    osc.render_stereo(&mut left, &mut right); // settle the pitch change
    osc.set_frame(1);
    println!("{:>6} {:>10}", "block", "rms");
    for block in 0..4 {
        osc.render_stereo(&mut left, &mut right);
        println!("{:>6} {:>10.4}", block, rms(&left));
    }

    println!("\nDone: both channels rendered {} samples per block.", BLOCK);
}
