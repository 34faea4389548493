use std::str::FromStr;

use anyhow::Result;
use log::{info, warn};

use sentry::{ClientInitGuard, ClientOptions};
use sentry_types::Dsn;

pub struct Monitoring {}

impl Monitoring {
    // Must run after the logger setup, otherwise the warning below is lost.
    // The returned guard flushes pending events when dropped.
    pub fn try_setup_sentry() -> Result<Option<ClientInitGuard>> {
        let Some(raw_dsn) = option_env!("SENTRY_DSN") else {
            warn!("sentry dsn is not provided via env variables, errors are only logged locally");
            return Ok(None);
        };

        let dsn = Dsn::from_str(raw_dsn)?;
        let opts = ClientOptions {
            release: sentry::release_name!(),
            dsn: Some(dsn),
            attach_stacktrace: true,
            debug: cfg!(debug_assertions),
            ..Default::default()
        };
        let guard = sentry::init(opts);
        info!("sentry monitoring enabled");
        Ok(Some(guard))
    }
}
