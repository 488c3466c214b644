use std::time::Duration;

use ratatui::{Frame, layout::Rect};

use super::{common::ApiTask, controls::Controls, resources::Resources};
use crate::{
    api::{ApiError, live::LiveApiT},
    focus::ControlId,
    player::{Player, StreamSource},
};

mod view;

pub struct Model<L: LiveApiT> {
    channels: Vec<String>,
    selected_channel: usize,
    player: Player,
    error: Option<String>,

    stream_task: ApiTask<L, (String, Result<String, ApiError>)>,
}

impl<L: LiveApiT> Model<L> {
    pub fn new(live_api: L, channels: Vec<String>, player: Player) -> Self {
        Self {
            channels,
            selected_channel: 0,
            player,
            error: None,

            stream_task: ApiTask::new(live_api),
        }
    }

    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    pub fn selected_channel(&self) -> Option<&str> {
        self.channels.get(self.selected_channel).map(String::as_str)
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.stream_task.is_running()
    }

    pub fn select_channel(&mut self, index: usize) {
        let Some(channel) = self.channels.get(index).cloned() else {
            return;
        };

        self.selected_channel = index;
        self.error = None;

        self.stream_task.restart(|live_api| async move {
            log::info!("Requesting stream of channel {channel}");
            let result = live_api.stream_url(&channel).await;
            (channel, result)
        });
    }

    /// Moves the channel selection by `steps`, wrapping around the channel list.
    pub fn cycle_channel(&mut self, steps: i32) {
        let count = self.channels.len() as i64;
        if count == 0 {
            return;
        }

        let index = (self.selected_channel as i64 + steps as i64).rem_euclid(count);
        self.select_channel(index as usize);
    }

    pub fn adjust_volume(&mut self, steps: i32) {
        self.player.adjust_volume(steps);
    }

    pub fn activate(&mut self, control: ControlId) {
        match control {
            ControlId::PlayPause => self.player.toggle_play(),
            ControlId::Replay => self.player.replay(),
            ControlId::Rewind => self.player.rewind(),
            ControlId::Forward => self.player.forward(),
            ControlId::Mute => self.player.toggle_mute(),
            ControlId::Fullscreen => self.player.toggle_fullscreen(),
            _ => {}
        }
    }

    pub async fn tick_logic(&mut self, elapsed: Duration) {
        self.player.advance(elapsed);

        let Some((channel, result)) = self.stream_task.poll().await else {
            return;
        };

        match result {
            Ok(url) => {
                if let Err(error) = self.player.load(StreamSource::from_url(url)) {
                    log::error!("Failed to start player for {channel}: {error}");
                    self.error = Some(error.to_string());
                }
            }
            Err(error) => {
                log::error!("Failed to resolve stream of {channel}: {error}");
                self.error = Some(
                    error
                        .server_message()
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("Channel {channel} is unavailable")),
                );
            }
        }
    }

    pub fn shutdown(&mut self) {
        self.stream_task.abort();
        self.player.shutdown();
    }

    pub(super) fn render(
        &self,
        controls: &Controls,
        active: bool,
        frame: &mut Frame<'_>,
        area: Rect,
        resources: &Resources,
    ) {
        view::render(self, controls, active, frame, area, resources);
    }
}
