pub mod location;
pub mod registry;
pub mod weather;

use reqwest::Client;

use crate::errors::AgentResult;
pub use location::GetLocation;
pub use registry::{FnTool, ToolFunction, ToolRegistry};
pub use weather::GetCurrentWeather;

/// Where the lookup tools send their requests.
#[derive(Debug, Clone)]
pub struct ToolEndpoints {
    pub location_url: String,
    pub weather_url: String,
}

impl Default for ToolEndpoints {
    fn default() -> Self {
        Self {
            location_url: location::IPAPI_URL.to_string(),
            weather_url: weather::OPEN_METEO_URL.to_string(),
        }
    }
}

/// Registry with `getCurrentWeather` and `getLocation`, validated against its own catalog.
pub fn default_registry(client: Client, endpoints: &ToolEndpoints) -> AgentResult<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    registry.register(
        GetCurrentWeather::definition(),
        GetCurrentWeather::new(client.clone(), &endpoints.weather_url),
    )?;
    registry.register(
        GetLocation::definition(),
        GetLocation::new(client, &endpoints.location_url),
    )?;
    registry.validate()?;
    Ok(registry)
}
