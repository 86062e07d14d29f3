use crate::config::Config;
use crate::error::{AppError, Result};
use serde::Serialize;
use serde_json::json;
use surrealdb::engine::remote::http::{Client, Http};
use surrealdb::opt::auth::Root;
use surrealdb::{Response, Surreal};
use tracing::{debug, error, info};

/// Thin wrapper around the SurrealDB HTTP client.
///
/// Record keys are our own UUID strings and cross-record references are
/// stored as plain string fields, so queries project `meta::id(id) AS id`
/// and never juggle record-link values.
#[derive(Clone)]
pub struct Database {
    client: Surreal<Client>,
    pub config: Config,
}

impl Database {
    pub async fn new(config: &Config) -> Result<Self> {
        info!("Initializing database connection to {}", config.database_url);

        let address = config
            .database_url
            .trim_start_matches("http://")
            .trim_start_matches("https://");

        let client = Surreal::new::<Http>(address).await?;

        client
            .signin(Root {
                username: &config.database_username,
                password: &config.database_password,
            })
            .await?;

        client
            .use_ns(&config.database_namespace)
            .use_db(&config.database_name)
            .await?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    pub async fn verify_connection(&self) -> Result<()> {
        match self.client.query("INFO FOR DB").await {
            Ok(_) => {
                info!("Database connection verified successfully");
                Ok(())
            }
            Err(e) => {
                error!("Failed to verify database connection: {}", e);
                Err(AppError::from(e))
            }
        }
    }

    pub async fn query(&self, sql: &str) -> Result<Response> {
        self.client.query(sql).await.map_err(AppError::from)
    }

    pub async fn query_with_params<P>(&self, sql: &str, params: P) -> Result<Response>
    where
        P: Serialize + Send + 'static,
    {
        self.client
            .query(sql)
            .bind(params)
            .await
            .map_err(AppError::from)
    }

    /// Create a record under an explicit key. The serialized `id` field is
    /// stripped so it never collides with the record key itself.
    pub async fn create<T>(&self, table: &str, id: &str, data: &T) -> Result<()>
    where
        T: Serialize,
    {
        let mut content = serde_json::to_value(data)?;
        if let Some(obj) = content.as_object_mut() {
            obj.remove("id");
        }

        debug!("Creating {} record: {}", table, id);
        self.query_with_params(
            "CREATE type::thing($tb, $id) CONTENT $data",
            json!({ "tb": table, "id": id, "data": content }),
        )
        .await?;

        Ok(())
    }

    pub async fn get_by_id<T>(&self, table: &str, id: &str) -> Result<Option<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut response = self
            .query_with_params(
                "SELECT *, meta::id(id) AS id FROM type::thing($tb, $id)",
                json!({ "tb": table, "id": id }),
            )
            .await?;
        let results: Vec<T> = response.take(0)?;
        Ok(results.into_iter().next())
    }

    pub async fn update_merge(&self, table: &str, id: &str, updates: serde_json::Value) -> Result<()> {
        self.query_with_params(
            "UPDATE type::thing($tb, $id) MERGE $updates",
            json!({ "tb": table, "id": id, "updates": updates }),
        )
        .await?;
        Ok(())
    }

    pub async fn delete_by_id(&self, table: &str, id: &str) -> Result<()> {
        self.query_with_params(
            "DELETE type::thing($tb, $id)",
            json!({ "tb": table, "id": id }),
        )
        .await?;
        Ok(())
    }

    /// Run an aggregate `SELECT count() AS count ... GROUP ALL` query and
    /// unwrap the single row, defaulting to zero when nothing matched.
    pub async fn count<P>(&self, sql: &str, params: P) -> Result<i64>
    where
        P: Serialize + Send + 'static,
    {
        let mut response = self.query_with_params(sql, params).await?;
        let rows: Vec<serde_json::Value> = response.take(0)?;
        Ok(rows
            .first()
            .and_then(|v| v.get("count"))
            .and_then(|v| v.as_i64())
            .unwrap_or(0))
    }
}
