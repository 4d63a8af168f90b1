use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use plotters::prelude::*;
use smfkit::smf::{Event, MidiFile};

const KEY_HEIGHT: f64 = 0.4;

#[derive(Parser)]
#[command(about = "Render a piano roll of a MIDI file as SVG")]
struct Args {
    /// Path to input MIDI file
    input: PathBuf,
    /// Output SVG path
    output: PathBuf,
}

/// A sounding note between its note-on and note-off.
struct NoteSpan {
    start: f64,
    end: f64,
    key: u8,
    velocity: u8,
}

/// Pair each note-on with the next note-off on the same channel and key.
/// Notes still held at the end are closed at `end_seconds`.
fn note_spans(events: &[Event], end_seconds: f64) -> Vec<NoteSpan> {
    let mut held: Vec<(u8, u8, f64, u8)> = Vec::new();
    let mut spans = Vec::new();

    for event in events {
        let Some(key) = event.key() else { continue };
        if event.is_note_on() {
            held.push((event.channel, key, event.second_time, event.data2));
        } else if event.is_note_off() {
            if let Some(pos) = held
                .iter()
                .position(|&(ch, k, _, _)| ch == event.channel && k == key)
            {
                let (_, key, start, velocity) = held.remove(pos);
                spans.push(NoteSpan {
                    start,
                    end: event.second_time,
                    key,
                    velocity,
                });
            }
        }
    }

    for (_, key, start, velocity) in held {
        spans.push(NoteSpan {
            start,
            end: end_seconds,
            key,
            velocity,
        });
    }

    spans
}

fn create_plot(args: &Args, midi: &MidiFile, spans: &[NoteSpan]) -> Result<()> {
    let root = SVGBackend::new(&args.output, (1000, 500)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_time = midi.duration_seconds().max(1.0);
    let min_key = spans.iter().map(|s| s.key).min().unwrap_or(48) as f64 - 2.0;
    let max_key = spans.iter().map(|s| s.key).max().unwrap_or(72) as f64 + 2.0;

    let title = format!(
        "{} ({:.1} BPM, {} notes)",
        args.input.display(),
        midi.tempo(),
        spans.len()
    );

    let mut chart = ChartBuilder::on(&root)
        .caption(&title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..max_time, min_key..max_key)?;

    chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc("Key")
        .x_labels(10)
        .y_labels(12)
        .draw()?;

    chart.draw_series(spans.iter().map(|span| {
        let shade = 0.3 + 0.7 * f64::from(span.velocity) / 127.0;
        let key = f64::from(span.key);
        Rectangle::new(
            [(span.start, key - KEY_HEIGHT), (span.end, key + KEY_HEIGHT)],
            BLUE.mix(shade).filled(),
        )
    }))?;

    // Tempo changes as vertical lines
    let tempo_map = midi.tempo_map();
    for change in tempo_map.changes() {
        let at = tempo_map.tick_to_seconds(change.tick);
        chart.draw_series(LineSeries::new(
            vec![(at, min_key), (at, max_key)],
            RED.stroke_width(1),
        ))?;
    }

    root.present()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    println!("MIDI Piano Roll");
    println!("===============");

    let midi = MidiFile::load(&args.input);
    if let Some(err) = midi.error() {
        bail!("{}: {}", args.input.display(), err);
    }

    let spans = note_spans(midi.events(), midi.duration_seconds());
    println!("  Notes: {}", spans.len());
    println!("  Duration: {:.2}s", midi.duration_seconds());
    println!("  Tempo changes: {}", midi.tempo_map().changes().len());

    print!("  Creating plot... ");
    create_plot(&args, &midi, &spans)?;
    println!("done");

    println!();
    println!("Output: {}", args.output.display());

    Ok(())
}
