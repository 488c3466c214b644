use async_trait::async_trait;

use super::{
    ApiError, Backend,
    common_types::{WeatherQuery, WeatherReport},
};

#[async_trait]
pub trait WeatherApiT: Clone + Send + Sync + 'static {
    async fn local_weather(&self, query: &WeatherQuery) -> Result<WeatherReport, ApiError>;
}

#[derive(Clone)]
pub struct WeatherApi {
    backend: Backend,
}

impl WeatherApi {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl WeatherApiT for WeatherApi {
    async fn local_weather(&self, query: &WeatherQuery) -> Result<WeatherReport, ApiError> {
        let mut url = self.backend.endpoint(&["weather", "local"])?;

        match query {
            WeatherQuery::City(city) => {
                url.query_pairs_mut().append_pair("city", city);
            }
            WeatherQuery::Coordinates { lat, lon } => {
                url.query_pairs_mut()
                    .append_pair("lat", &lat.to_string())
                    .append_pair("lon", &lon.to_string());
            }
        }

        self.backend.send(self.backend.get(url, None)).await
    }
}

pub mod mock {
    use super::*;

    #[derive(Clone)]
    pub struct WeatherApiMock;

    #[async_trait]
    impl WeatherApiT for WeatherApiMock {
        async fn local_weather(&self, query: &WeatherQuery) -> Result<WeatherReport, ApiError> {
            let city = match query {
                WeatherQuery::City(city) if city.eq_ignore_ascii_case("nowhere") => {
                    return Err(ApiError::Status {
                        status: 404,
                        message: Some("city not found".into()),
                    });
                }
                WeatherQuery::City(city) => city.clone(),
                WeatherQuery::Coordinates { .. } => "Current location".into(),
            };

            Ok(WeatherReport {
                city: Some(city),
                country: Some("FR".into()),
                temperature: Some(18.4),
                description: Some("scattered clouds".into()),
                humidity: Some(62.0),
                wind_speed: Some(3.6),
                sunrise: Some("06:52".into()),
                sunset: Some("20:41".into()),
                error: None,
            })
        }
    }
}
