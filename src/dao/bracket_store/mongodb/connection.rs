use std::time::Duration;

use mongodb::{Client, Database, bson::doc};
use tokio::time::sleep;
use tracing::debug;

use super::{
    config::MongoConfig,
    error::{MongoDaoError, MongoResult},
};

const MAX_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Build a client from `config` and wait until its database answers a ping.
///
/// Gives up after [`MongoConfig::connect_attempts`] failed pings, doubling the pause between
/// attempts up to five seconds.
pub async fn establish_connection(config: &MongoConfig) -> MongoResult<(Client, Database)> {
    let client = Client::with_options(config.options.clone())
        .map_err(|source| MongoDaoError::ClientConstruction { source })?;
    let database = client.database(&config.database_name);

    let mut delay = config.retry_delay;
    let mut attempts = 0;
    loop {
        let Err(source) = database.run_command(doc! { "ping": 1 }).await else {
            return Ok((client, database));
        };

        attempts += 1;
        if attempts >= config.connect_attempts {
            return Err(MongoDaoError::InitialPing { attempts, source });
        }
        debug!(
            attempts,
            error = %source,
            database = %config.database_name,
            "MongoDB not reachable yet"
        );
        sleep(delay).await;
        delay = (delay * 2).min(MAX_RETRY_DELAY);
    }
}
