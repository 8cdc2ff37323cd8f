use std::env;

/// Application configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub bus_type: String,
    pub nats_url: String,
    pub host: String,
    pub port: u16,
    pub customer_topic: String,
    pub consumer_group: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let bus_type = env::var("BUS_TYPE").unwrap_or_else(|_| "inmemory".to_string());

        let nats_url =
            env::var("NATS_URL").unwrap_or_else(|_| "nats://localhost:4222".to_string());

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| "8081".to_string())
            .parse()
            .map_err(|_| "PORT must be a valid u16".to_string())?;

        let customer_topic = env::var("CUSTOMER_TOPIC")
            .unwrap_or_else(|_| customer_contracts::CUSTOMER_TOPIC.to_string());

        let consumer_group = env::var("CONSUMER_GROUP")
            .unwrap_or_else(|_| customer_contracts::NOTIFICATIONS_GROUP.to_string());

        Ok(Config {
            bus_type,
            nats_url,
            host,
            port,
            customer_topic,
            consumer_group,
        })
    }
}
