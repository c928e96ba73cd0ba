// src/bin/audio_trim.rs

use clap::Parser;
use audio_cutter_lib::audio::{decode_artifact, probe_info, write_wav, EditOp, FileArtifact, Region};
use audio_cutter_lib::{init_tracing, EditorConfig, Selection};

/// Command-line tool for cutting or removing a region of an audio file
#[derive(Parser, Debug)]
#[command(name = "audio-trim")]
#[command(about = "Keep or delete a time range of an audio file and save it as 16-bit WAV", long_about = None)]
struct Args {
    /// Input audio file (MP3 or WAV)
    #[arg(short, long)]
    input: String,

    /// Output WAV file
    #[arg(short, long)]
    output: String,

    /// Start time in seconds
    #[arg(short, long)]
    start: f64,

    /// End time in seconds
    #[arg(short, long)]
    end: f64,

    /// Delete the range instead of keeping only it
    #[arg(short, long)]
    remove: bool,

    /// Show detailed information
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    init_tracing("warn");
    let args = Args::parse();
    let config = EditorConfig::default();

    println!("🎵 Audio Trimmer");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // Step 1: Load and inspect
    let artifact = FileArtifact::load(&args.input, &config.accepted_extensions)?;
    let info = probe_info(&artifact)?;

    println!("\n📊 Input File: {}", args.input);
    println!("   Duration: {:.2} seconds ({:.2} minutes)",
        info.duration_seconds, info.duration_seconds / 60.0);
    println!("   Sample Rate: {} Hz", info.sample_rate);
    println!("   Channels: {}", info.channels);
    println!("   Format: {}", info.format);

    // Step 2: Clamp the requested range to the file
    let mut selection = Selection::new(info.duration_seconds, Region::new(0.0, 0.0), config.nudge_step);
    selection.set_region(args.start, args.end);
    let region = selection.region();
    let op = if args.remove { EditOp::Remove } else { EditOp::Cut };

    println!("\n✂️  Region ({}):", op);
    println!("   Start: {:.2}s", region.start);
    println!("   End: {:.2}s", region.end);
    println!("   Duration: {:.2}s", region.width());

    if region != Region::new(args.start, args.end) {
        println!("   (requested {:.2}s..{:.2}s, clamped to the file)", args.start, args.end);
    }

    // Step 3: Decode audio
    println!("\n🔊 Decoding audio...");
    let start_time = std::time::Instant::now();
    let audio = decode_artifact(&artifact)?;

    if args.verbose {
        println!("   Loaded {} frames x {} channels ({:.2} MB)",
            audio.frame_count(),
            audio.channel_count(),
            (audio.frame_count() * audio.channel_count() * 4) as f64 / 1_048_576.0);
        println!("   Decode time: {:.2}s", start_time.elapsed().as_secs_f64());
    }

    // Step 4: Edit
    let edited = op.apply(&audio, region);

    if args.verbose {
        println!("   Edited to {} frames", edited.frame_count());
        println!("   New duration: {:.2}s", edited.duration_seconds());
    }

    // Step 5: Encode to WAV
    println!("\n💾 Encoding to WAV...");
    let encode_start = std::time::Instant::now();
    write_wav(&edited, &args.output)?;

    if args.verbose {
        println!("   Encode time: {:.2}s", encode_start.elapsed().as_secs_f64());
    }

    println!("\n✅ Done! Output saved to: {}", args.output);
    println!("   Total time: {:.2}s", start_time.elapsed().as_secs_f64());

    Ok(())
}
