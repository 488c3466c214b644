use std::{process::Stdio, time::Duration};

use thiserror::Error;
use tokio::process::{Child, Command};

pub const SEEK_STEP: Duration = Duration::from_secs(10);
const VOLUME_STEP: f64 = 0.1;

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("Player command is empty")]
    EmptyCommand,
    #[error("Failed to spawn player `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamSource {
    Hls(String),
    Progressive(String),
}

impl StreamSource {
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        let path = url.split(['?', '#']).next().unwrap_or_default();

        if path.to_ascii_lowercase().ends_with(".mp4") {
            Self::Progressive(url)
        } else {
            Self::Hls(url)
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Hls(url) | Self::Progressive(url) => url,
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Hls(_) => "HLS",
            Self::Progressive(_) => "MP4",
        }
    }
}

/// Playback state of the video panel, optionally mirrored by an external player process.
pub struct Player {
    source: Option<StreamSource>,
    position: Duration,
    playing: bool,
    muted: bool,
    volume: f64,
    fullscreen: bool,

    command: Option<String>,
    process: Option<Child>,
}

impl Player {
    pub fn new(command: Option<String>) -> Self {
        Self {
            source: None,
            position: Duration::ZERO,
            playing: false,
            muted: false,
            volume: 1.0,
            fullscreen: false,

            command,
            process: None,
        }
    }

    pub fn load(&mut self, source: StreamSource) -> Result<(), PlayerError> {
        log::info!("Loading {} stream {}", source.kind_label(), source.url());

        self.position = Duration::ZERO;
        self.playing = true;

        let spawn_result = match self.command.clone() {
            Some(command) => {
                self.stop_process();
                spawn_player(&command, source.url()).map(|child| self.process = Some(child))
            }
            None => Ok(()),
        };

        self.source = Some(source);

        spawn_result
    }

    pub fn source(&self) -> Option<&StreamSource> {
        self.source.as_ref()
    }

    pub fn position(&self) -> Duration {
        self.position
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn toggle_play(&mut self) {
        if self.source.is_some() {
            self.playing ^= true;
        }
    }

    pub fn replay(&mut self) {
        self.position = Duration::ZERO;
        self.playing = self.source.is_some();
    }

    pub fn rewind(&mut self) {
        self.seek(self.position.saturating_sub(SEEK_STEP));
    }

    pub fn forward(&mut self) {
        self.seek(self.position + SEEK_STEP);
    }

    pub fn toggle_mute(&mut self) {
        self.muted ^= true;
    }

    pub fn set_volume(&mut self, volume: f64) {
        self.volume = ((volume.clamp(0.0, 1.0)) * 10.0).round() / 10.0;
        self.muted = self.volume == 0.0;
    }

    pub fn adjust_volume(&mut self, steps: i32) {
        self.set_volume(self.volume + VOLUME_STEP * steps as f64);
    }

    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen ^= true;
    }

    /// Advances the timeline by wall-clock time spent playing.
    pub fn advance(&mut self, elapsed: Duration) {
        if self.playing {
            self.seek(self.position + elapsed);
        }
    }

    pub fn shutdown(&mut self) {
        self.stop_process();
    }

    fn seek(&mut self, position: Duration) {
        self.position = position;
    }

    fn stop_process(&mut self) {
        if let Some(mut process) = self.process.take() {
            if let Err(error) = process.start_kill() {
                log::warn!("Failed to stop player process: {error}");
            }
        }
    }
}

fn spawn_player(command: &str, url: &str) -> Result<Child, PlayerError> {
    let mut parts = command.split_whitespace();
    let program = parts.next().ok_or(PlayerError::EmptyCommand)?;

    Command::new(program)
        .args(parts)
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| PlayerError::Spawn {
            command: command.to_string(),
            source,
        })
}
