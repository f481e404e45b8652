use std::time::Duration;

use anyhow::{bail, Result};

use elevator_core::{AppConfig, AudioManager};
use elevator_tui::sound::HostSoundBackend;

/// How long the music plays before the ding
const MUSIC_PREVIEW: Duration = Duration::from_millis(1500);
/// Let the ding ring out before the sounds are released
const DING_TAIL: Duration = Duration::from_millis(1500);

pub async fn run(config: &AppConfig) -> Result<()> {
    let options = config.elevator_options();
    if !options.audio_enabled {
        println!("Audio is disabled in the config (or by --no-audio).");
        return Ok(());
    }

    let backend = HostSoundBackend::detect(std::io::stderr());
    println!("Output {}", backend.describe());
    let mut audio = AudioManager::new(
        backend,
        true,
        options.ambient_audio_source.as_deref(),
        options.completion_audio_source.as_deref(),
    );

    if !audio.is_enabled() {
        bail!("Could not load the configured sounds, audio would be disabled");
    }

    for (name, source) in [
        ("Music", audio.ambient_source()),
        ("Ding", audio.completion_source()),
    ] {
        match source {
            Some(source) => println!("{:<6} {}", name, source),
            None => println!("{:<6} (none)", name),
        }
    }

    audio.start();
    if !audio.is_ambient_playing() {
        bail!("The output device refused to play the music, see the log");
    }
    println!("Playing music...");
    tokio::time::sleep(MUSIC_PREVIEW).await;

    audio.play_completion();
    println!("Ding!");
    tokio::time::sleep(DING_TAIL).await;
    audio.release();

    Ok(())
}
