use ratatui::{Frame, layout::Rect};

use super::{common::ApiTask, controls::Controls, resources::Resources};
use crate::api::{
    ApiError,
    common_types::{WeatherQuery, WeatherReport},
    weather::WeatherApiT,
};

mod view;

const FETCH_FAILED: &str = "Unable to fetch the weather.";

pub struct Model<W: WeatherApiT> {
    report: Option<WeatherReport>,
    error: Option<String>,

    task: ApiTask<W, Result<WeatherReport, ApiError>>,
}

impl<W: WeatherApiT> Model<W> {
    pub fn new(weather_api: W) -> Self {
        Self {
            report: None,
            error: None,

            task: ApiTask::new(weather_api),
        }
    }

    pub fn report(&self) -> Option<&WeatherReport> {
        self.report.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.task.is_running()
    }

    pub fn request(&mut self, query: WeatherQuery) {
        self.task.restart(|weather_api| async move {
            log::info!("Requesting weather for {query:?}");
            weather_api.local_weather(&query).await
        });
    }

    pub async fn tick_logic(&mut self) {
        let Some(result) = self.task.poll().await else {
            return;
        };

        match result {
            Ok(WeatherReport {
                error: Some(error), ..
            }) => {
                log::warn!("Weather service answered with an error: {error}");
                self.report = None;
                self.error = Some(error);
            }
            Ok(report) => {
                self.report = Some(report);
                self.error = None;
            }
            Err(error) => {
                log::error!("Weather request failed: {error}");
                self.report = None;
                self.error = Some(match error {
                    ApiError::Status {
                        message: Some(message),
                        ..
                    } => message,
                    _ => FETCH_FAILED.to_string(),
                });
            }
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::weather::mock::WeatherApiMock;

    async fn settle(model: &mut Model<WeatherApiMock>) {
        while model.is_loading() {
            tokio::task::yield_now().await;
            model.tick_logic().await;
        }
    }

    #[tokio::test]
    async fn test_report_and_error() {
        let mut model = Model::new(WeatherApiMock);

        model.request(WeatherQuery::City("Lyon".into()));
        settle(&mut model).await;
        assert_eq!(
            model.report().and_then(|report| report.city.as_deref()),
            Some("Lyon")
        );
        assert_eq!(model.error(), None);

        model.request(WeatherQuery::City("Nowhere".into()));
        settle(&mut model).await;
        assert!(model.report().is_none());
        assert_eq!(model.error(), Some("city not found"));
    }
}
