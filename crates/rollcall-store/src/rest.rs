use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use rollcall_core::config::BackendConfig;
use rollcall_core::{AttendanceRecord, CommunicationLogEntry, ParentContact, Student};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{Result, StoreError};
use crate::store::{RosterStore, ATTENDANCES, COMMUNICATION_LOGS, PARENTS, STUDENTS};

const REST_PATH: &str = "/rest/v1";

/// PostgREST client for a Supabase project.
///
/// The key is sent both as `apikey` and as a bearer token, which is what the
/// Supabase gateway expects for service and anon keys alike.
pub struct SupabaseStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SupabaseStore {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.key.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}{}/{}", self.base_url, REST_PATH, table)
    }

    fn apply_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    /// `GET /rest/v1/{table}?select=*&{column}=eq.{value}...`
    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>> {
        debug!(table, filters = filters.len(), "selecting rows");

        let builder = self
            .client
            .get(self.table_url(table))
            .query(&select_query(filters));
        let resp = self.apply_auth(builder).send().await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            warn!(table, status = status.as_u16(), body = %body, "select rejected");
            return Err(StoreError::Api {
                table: table.to_string(),
                status: status.as_u16(),
                message: body,
            });
        }

        decode_rows(table, &body)
    }
}

#[async_trait]
impl RosterStore for SupabaseStore {
    async fn students(&self) -> Result<Vec<Student>> {
        self.select(STUDENTS, &[]).await
    }

    async fn attendances_on(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>> {
        let day = date.format("%Y-%m-%d").to_string();
        self.select(ATTENDANCES, &[("record_date", day)]).await
    }

    async fn parents(&self) -> Result<Vec<ParentContact>> {
        self.select(PARENTS, &[]).await
    }

    async fn append_log(&self, entry: &CommunicationLogEntry) -> Result<()> {
        let builder = self
            .client
            .post(self.table_url(COMMUNICATION_LOGS))
            .header("Prefer", "return=minimal")
            .json(entry);
        let resp = self.apply_auth(builder).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %text, "audit insert rejected");
            return Err(StoreError::Api {
                table: COMMUNICATION_LOGS.to_string(),
                status: status.as_u16(),
                message: text,
            });
        }
        debug!(student_id = %entry.student_id, "audit row appended");
        Ok(())
    }
}

/// Query pairs for a select of all columns with equality filters.
fn select_query(filters: &[(&str, String)]) -> Vec<(String, String)> {
    std::iter::once(("select".to_string(), "*".to_string()))
        .chain(
            filters
                .iter()
                .map(|(column, value)| (column.to_string(), format!("eq.{value}"))),
        )
        .collect()
}

fn decode_rows<T: DeserializeOwned>(table: &str, body: &str) -> Result<Vec<T>> {
    serde_json::from_str(body).map_err(|e| StoreError::Decode {
        table: table.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_core::{AttendanceStatus, StudentId};

    fn store(url: &str) -> SupabaseStore {
        SupabaseStore::new(&BackendConfig {
            url: url.to_string(),
            key: "k".to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn table_url_tolerates_trailing_slash() {
        let s = store("https://demo.supabase.co/");
        assert_eq!(
            s.table_url(STUDENTS),
            "https://demo.supabase.co/rest/v1/students"
        );
    }

    #[test]
    fn select_query_uses_eq_operator() {
        let q = select_query(&[("record_date", "2026-10-19".to_string())]);
        assert_eq!(
            q,
            vec![
                ("select".to_string(), "*".to_string()),
                ("record_date".to_string(), "eq.2026-10-19".to_string()),
            ]
        );
    }

    #[test]
    fn decode_attendance_rows_with_extra_columns() {
        let body = r#"[
            {"id": 10, "student_id": 1, "record_date": "2026-10-19", "status": "未到", "check_in_time": null},
            {"id": 11, "student_id": 2, "record_date": "2026-10-19", "status": "已到", "check_in_time": "07:40"}
        ]"#;
        let rows: Vec<AttendanceRecord> = decode_rows(ATTENDANCES, body).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].student_id, StudentId::Int(1));
        assert_eq!(rows[0].status, AttendanceStatus::NotArrived);
        assert_eq!(rows[1].status, AttendanceStatus::Arrived);
    }

    #[test]
    fn decode_error_names_the_table() {
        let err = decode_rows::<Student>(STUDENTS, r#"{"message":"nope"}"#).unwrap_err();
        match err {
            StoreError::Decode { table, .. } => assert_eq!(table, STUDENTS),
            other => panic!("expected decode error, got {other:?}"),
        }
    }
}
