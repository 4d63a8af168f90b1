//! CLI tool for inspecting a MIDI file and re-writing its notes
//!
//! Usage: smf-info <input.mid> [--verbose] [--output out.mid] [--tempo BPM] [--ppq N]

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use smfkit::smf::writer::{save, WriterConfig};
use smfkit::smf::MidiFile;

#[derive(Parser)]
#[command(author, version, about = "Inspect a Standard MIDI File", long_about = None)]
struct Cli {
    /// Path to input MIDI file
    input: PathBuf,

    /// List every channel event
    #[arg(short, long)]
    verbose: bool,

    /// Write the note events back out as a format-0 file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Tempo for the output file in BPM (defaults to the input tempo)
    #[arg(long)]
    tempo: Option<f64>,

    /// Ticks per quarter note for the output file
    #[arg(long, default_value_t = 480)]
    ppq: u16,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let midi = MidiFile::load(&cli.input);
    if let Some(err) = midi.error() {
        if err.is_format_error() {
            bail!("{} is not a usable MIDI file: {}", cli.input.display(), err);
        }
        bail!("{}: {}", cli.input.display(), err);
    }

    let notes = midi.note_events();
    let note_ons = notes.iter().filter(|e| e.is_note_on()).count();

    println!("MIDI file: {}", cli.input.display());
    println!(
        "  Format: {}, Tracks: {}, Ticks/quarter: {}",
        midi.format().as_u16(),
        midi.num_tracks(),
        midi.ticks_per_quarter()
    );
    println!(
        "  Tempo: {:.1} BPM, Duration: {:.3}s",
        midi.tempo(),
        midi.duration_seconds()
    );
    println!(
        "  Events: {} ({} note on, {} note off)",
        midi.events().len(),
        note_ons,
        notes.len() - note_ons
    );
    let segments = midi.tempo_map().points();
    if segments.len() > 1 {
        println!("  Tempo segments:");
        for point in segments {
            println!(
                "    tick {:>8} at {:>9.3}s  {:.2} BPM",
                point.tick,
                point.seconds,
                point.bpm()
            );
        }
    }

    if cli.verbose {
        println!();
        println!(
            "{:>8} {:>10}  {:<16} {:>3} {:>4} {:>4}",
            "Tick", "Seconds", "Kind", "Ch", "D1", "D2"
        );
        for event in midi.events() {
            println!(
                "{:>8} {:>10.4}  {:<16} {:>3} {:>4} {:>4}",
                event.tick_time,
                event.second_time,
                format!("{:?}", event.kind),
                event.channel,
                event.data1,
                event.data2
            );
        }
    }

    if let Some(output) = &cli.output {
        if notes.is_empty() {
            bail!("No note events in {}", cli.input.display());
        }

        let config = WriterConfig::new(cli.tempo.unwrap_or(midi.tempo()), cli.ppq);
        info!(
            "Writing {} note events at {} BPM, {} ticks/quarter",
            notes.len(),
            config.tempo_bpm,
            config.ticks_per_quarter
        );
        let written = save(output, &notes, &config)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        println!();
        println!(
            "Output MIDI: {} ({} events, {} bytes)",
            output.display(),
            notes.len(),
            written
        );
    }

    Ok(())
}
