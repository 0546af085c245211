//! Redis-backed bucket storage.
//!
//! The GCRA decision runs as a server-side Lua script, so the read of the
//! stored TAT and the conditional write are a single atomic step no matter
//! how many processes hammer the same key. The script takes `now` from the
//! Redis server's `TIME`, never from the caller, and sets the key's expiry
//! to the persisted TAT so idle and exhausted rows vanish on their own.
//!
//! Must stay in sync with `gcra::apply`: both are renditions of the same
//! arithmetic, one per backend.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, Script};

use crate::error::RateLimitError;
use crate::gcra::EpochMillis;
use crate::storage::{Storage, UpdateResult};

/// Namespace for every bucket row.
const KEY_PREFIX: &str = "rate-limit";

/// KEYS[1] = bucket key, ARGV = period_ms, burst, delta.
/// Returns {conforming (0/1), time_to_act_ms as string}.
///
/// State is a hash with a single `tat` field holding the TAT as a
/// stringified float (millisecond resolution, fractional for weighted
/// deltas). A missing field, a non-numeric value, or a wrong-typed legacy
/// key all count as a fully idle bucket; legacy keys are replaced on the
/// next conforming write. Values travel as strings because Lua-to-Redis
/// conversion truncates numbers to integers, and they are formatted with
/// `%.17g` rather than `tostring` (`%.14g`): at epoch-millisecond magnitude
/// the default keeps only one fractional digit, which would erode
/// fractional-weight TATs write after write.
const UPDATE_SCRIPT: &str = r"
local key = KEYS[1]
local period = tonumber(ARGV[1])
local burst = tonumber(ARGV[2])
local n = tonumber(ARGV[3])

local time = redis.call('TIME')
local now = time[1] * 1000 + math.floor(time[2] / 1000)

local emission_interval = period / burst
local tolerance = emission_interval * (burst - 1)

local tat = now
local legacy = false
local stored = redis.pcall('HGET', key, 'tat')
if type(stored) == 'table' then
  legacy = true
elseif stored then
  local parsed = tonumber(stored)
  if parsed and parsed > tat then
    tat = parsed
  end
end

local new_tat = tat + emission_interval * (n - 1)
local time_to_act = new_tat - tolerance

if now < time_to_act then
  return {0, string.format('%.17g', time_to_act)}
end

new_tat = new_tat + emission_interval
if new_tat < now then
  new_tat = now
end

if legacy then
  redis.call('DEL', key)
end
redis.call('HSET', key, 'tat', string.format('%.17g', new_tat))
redis.call('PEXPIREAT', key, math.ceil(new_tat))
return {1, string.format('%.17g', new_tat - tolerance)}
";

/// Bucket storage backed by a shared Redis instance.
///
/// Construct one at startup and share it; [`ConnectionManager`] multiplexes
/// and reconnects internally, and cloning is cheap.
pub struct RedisStorage {
    conn: ConnectionManager,
    script: Script,
}

impl RedisStorage {
    /// Connect to the given Redis URL.
    pub async fn connect(url: &str) -> Result<Self, RateLimitError> {
        let client = Client::open(url).map_err(RateLimitError::backend)?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(RateLimitError::backend)?;
        Ok(Self::new(conn))
    }

    /// Wrap an existing connection manager.
    #[must_use]
    pub fn new(conn: ConnectionManager) -> Self {
        Self {
            conn,
            script: Script::new(UPDATE_SCRIPT),
        }
    }

    fn redis_key(key: &str) -> String {
        format!("{KEY_PREFIX}:{key}")
    }
}

impl fmt::Debug for RedisStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStorage").finish_non_exhaustive()
    }
}

#[async_trait]
impl Storage for RedisStorage {
    async fn update(
        &self,
        key: &str,
        period: Duration,
        burst: u32,
        delta: f64,
    ) -> Result<UpdateResult, RateLimitError> {
        let mut conn = self.conn.clone();

        let (conforming, time_to_act): (i64, String) = self
            .script
            .key(Self::redis_key(key))
            .arg(period.as_secs_f64() * 1000.0)
            .arg(burst.max(1))
            .arg(delta)
            .invoke_async(&mut conn)
            .await
            .map_err(RateLimitError::backend)?;

        let time_to_act: f64 = time_to_act.parse().map_err(RateLimitError::backend)?;

        Ok(UpdateResult {
            conforming: conforming == 1,
            time_to_act: time_to_act.ceil() as EpochMillis,
        })
    }
}
