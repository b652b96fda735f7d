use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::MultiplexedConnection;
use redis::{Client as RedisClient, Script};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::assessment::session::AssessmentSession;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("session encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("session {id} was modified concurrently (expected version {expected})")]
    Stale { id: Uuid, expected: u64 },

    #[error("session {0} no longer exists")]
    Missing(Uuid),
}

/// Holds in-flight sessions. Sessions idle for longer than the TTL are gone;
/// nothing here is durable.
///
/// `save` is a compare-and-swap on `AssessmentSession::version`: it succeeds
/// only when the stored copy still has the version the caller loaded (or is
/// absent for a version-0 session), and bumps the caller's version on success.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, id: Uuid) -> Result<Option<AssessmentSession>, StoreError>;
    async fn save(&self, session: &mut AssessmentSession) -> Result<(), StoreError>;
    async fn remove(&self, id: Uuid) -> Result<bool, StoreError>;

    fn backend(&self) -> &'static str;
}

fn check_version(
    id: Uuid,
    expected: u64,
    stored: Option<u64>,
) -> Result<(), StoreError> {
    match stored {
        Some(v) if v == expected => Ok(()),
        Some(_) => Err(StoreError::Stale { id, expected }),
        None if expected == 0 => Ok(()),
        None => Err(StoreError::Missing(id)),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-process store
// ────────────────────────────────────────────────────────────────────────────

struct Entry {
    session: AssessmentSession,
    expires_at: DateTime<Utc>,
}

pub struct MemorySessionStore {
    ttl: chrono::Duration,
    sessions: RwLock<HashMap<Uuid, Entry>>,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::hours(1)),
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

fn purge_expired(sessions: &mut HashMap<Uuid, Entry>) {
    let now = Utc::now();
    sessions.retain(|_, e| e.expires_at > now);
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: Uuid) -> Result<Option<AssessmentSession>, StoreError> {
        let mut sessions = self.sessions.write().await;
        purge_expired(&mut sessions);
        Ok(sessions.get(&id).map(|e| e.session.clone()))
    }

    async fn save(&self, session: &mut AssessmentSession) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        purge_expired(&mut sessions);
        let stored = sessions.get(&session.id).map(|e| e.session.version);
        check_version(session.id, session.version, stored)?;

        session.version += 1;
        let entry = Entry {
            session: session.clone(),
            expires_at: Utc::now() + self.ttl,
        };
        sessions.insert(session.id, entry);
        Ok(())
    }

    async fn remove(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.sessions.write().await.remove(&id).is_some())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Redis store
// ────────────────────────────────────────────────────────────────────────────

// KEYS[1] session key; ARGV[1] expected version, ARGV[2] new JSON, ARGV[3] ttl.
// Returns 1 on success, 0 when the stored version differs, -1 when the key
// is gone but a non-zero version was expected.
const CHECK_AND_SET: &str = r#"
local current = redis.call('GET', KEYS[1])
local expected = tonumber(ARGV[1])
if current then
  local stored = cjson.decode(current).version or 0
  if stored ~= expected then return 0 end
elseif expected ~= 0 then
  return -1
end
redis.call('SET', KEYS[1], ARGV[2], 'EX', ARGV[3])
return 1
"#;

/// Sessions as JSON strings under `assessment:session:<id>` with `EX ttl`.
pub struct RedisSessionStore {
    client: RedisClient,
    ttl_secs: u64,
    check_and_set: Script,
}

impl RedisSessionStore {
    pub fn new(client: RedisClient, ttl: Duration) -> Self {
        Self {
            client,
            ttl_secs: ttl.as_secs().max(1),
            check_and_set: Script::new(CHECK_AND_SET),
        }
    }

    pub fn key(id: Uuid) -> String {
        format!("assessment:session:{id}")
    }

    async fn conn(&self) -> Result<MultiplexedConnection, StoreError> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, id: Uuid) -> Result<Option<AssessmentSession>, StoreError> {
        let mut conn = self.conn().await?;
        let raw: Option<String> = redis::cmd("GET")
            .arg(Self::key(id))
            .query_async(&mut conn)
            .await?;
        raw.map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(StoreError::from)
    }

    async fn save(&self, session: &mut AssessmentSession) -> Result<(), StoreError> {
        let expected = session.version;
        let mut next = session.clone();
        next.version = expected + 1;
        let raw = serde_json::to_string(&next)?;

        let mut conn = self.conn().await?;
        let outcome: i64 = self
            .check_and_set
            .key(Self::key(session.id))
            .arg(expected)
            .arg(raw)
            .arg(self.ttl_secs)
            .invoke_async(&mut conn)
            .await?;
        match outcome {
            1 => {
                *session = next;
                Ok(())
            }
            0 => Err(StoreError::Stale {
                id: session.id,
                expected,
            }),
            _ => Err(StoreError::Missing(session.id)),
        }
    }

    async fn remove(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut conn = self.conn().await?;
        let removed: i64 = redis::cmd("DEL")
            .arg(Self::key(id))
            .query_async(&mut conn)
            .await?;
        Ok(removed > 0)
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
