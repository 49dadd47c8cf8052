use std::sync::Arc;
use wayfare_assistant::Assistant;
use wayfare_core::repository::{BookingRepository, TripRepository, UserRepository};
use wayfare_store::app_config::RateLimitConfig;
use wayfare_store::{Mailer, RedisClient, Repositories};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub trips: Arc<dyn TripRepository>,
    pub users: Arc<dyn UserRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub mailer: Arc<dyn Mailer>,
    /// Rate limiting is off without Redis.
    pub redis: Option<Arc<RedisClient>>,
    pub rate_limit: RateLimitConfig,
    pub auth: AuthConfig,
    pub frontend_url: String,
    pub assistant: Arc<Assistant>,
}

impl AppState {
    pub fn new(repos: Repositories, mailer: Arc<dyn Mailer>, auth: AuthConfig, frontend_url: String) -> Self {
        Self {
            trips: repos.trips,
            users: repos.users,
            bookings: repos.bookings,
            mailer,
            redis: None,
            rate_limit: RateLimitConfig::default(),
            auth,
            frontend_url,
            assistant: Arc::new(Assistant::default()),
        }
    }

    pub fn with_rate_limit(mut self, redis: Arc<RedisClient>, config: RateLimitConfig) -> Self {
        self.redis = Some(redis);
        self.rate_limit = config;
        self
    }
}
