use crate::Args;
use std::time::Duration;

/// Harness configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub ocr_url: String,
    pub ocr_timeout: Duration,
    pub max_file_size: usize,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            ocr_url: args.ocr_url,
            ocr_timeout: Duration::from_secs(args.ocr_timeout),
            max_file_size: args.max_file_size,
        }
    }
}
