/*
[INPUT]:  Job/task identifiers, log file path, cursor, limit, direction
[OUTPUT]: Log pages, download probes, and raw log file bytes
[POS]:    HTTP layer - task log endpoints
[UPDATE]: When the log pagination contract or download flow changes
*/

use reqwest::header::{CONTENT_LENGTH, CONTENT_RANGE, RANGE};
use reqwest::{Method, StatusCode, Url};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::http::client::error_message;
use crate::http::{Result, TasklogClient, TasklogError};
use crate::types::{DownloadProbe, LogFileBody, LogPage, LogPageRequest};

impl TasklogClient {
    /// Fetch one page of task logs
    ///
    /// POST /api/v1/project/{project_id}/jobs/{job_id}/tasks/{task_id}/logs?cursor={n}&limit={n}&direction={older|newer}
    pub async fn fetch_task_logs(&self, req: &LogPageRequest) -> Result<LogPage> {
        let mut url = self.logs_url(&req.project_id, &req.job_id, &req.task_id, None)?;
        url.query_pairs_mut()
            .append_pair("cursor", &req.cursor.to_string())
            .append_pair("limit", &req.limit.to_string())
            .append_pair("direction", req.direction.as_str());

        debug!(
            job_id = %req.job_id,
            task_id = %req.task_id,
            cursor = req.cursor,
            limit = req.limit,
            direction = %req.direction,
            "fetching task log page"
        );

        let mut builder = self.request(Method::POST, url).json(&LogFileBody {
            file_path: req.file_path.clone(),
        });
        if let Some(timeout) = self.config().log_fetch_timeout {
            builder = builder.timeout(timeout);
        }

        let page: LogPage = self.send_json(builder).await?;
        debug!(
            lines = page.logs.len(),
            older_cursor = page.older_cursor,
            newer_cursor = page.newer_cursor,
            has_more_older = page.has_more_older,
            has_more_newer = page.has_more_newer,
            "task log page received"
        );
        Ok(page)
    }

    /// Probe a raw log file with a one-byte range request
    ///
    /// GET /api/v1/project/{project_id}/jobs/{job_id}/tasks/{task_id}/logs/download?file_path={path}
    pub async fn probe_log_download(
        &self,
        project_id: &str,
        job_id: &str,
        task_id: &str,
        file_path: &str,
    ) -> Result<DownloadProbe> {
        let url = self.download_url(project_id, job_id, task_id, file_path)?;
        let response = self
            .timed_request(Method::GET, url)
            .header(RANGE, "bytes=0-0")
            .send()
            .await?;
        let status = response.status();
        let headers = response.headers().clone();

        match status {
            StatusCode::PARTIAL_CONTENT | StatusCode::RANGE_NOT_SATISFIABLE => {
                let total_bytes = headers
                    .get(CONTENT_RANGE)
                    .and_then(|value| value.to_str().ok())
                    .and_then(content_range_total);
                Ok(DownloadProbe {
                    total_bytes,
                    supports_ranges: true,
                })
            }
            status if status.is_success() => {
                let total_bytes = headers
                    .get(CONTENT_LENGTH)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.parse().ok());
                Ok(DownloadProbe {
                    total_bytes,
                    supports_ranges: false,
                })
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(TasklogError::api_error(status, error_message(&body, status)))
            }
        }
    }

    /// Stream a raw log file into `writer`, returning the number of bytes written
    ///
    /// GET /api/v1/project/{project_id}/jobs/{job_id}/tasks/{task_id}/logs/download?file_path={path}
    pub async fn download_task_logs<W>(
        &self,
        project_id: &str,
        job_id: &str,
        task_id: &str,
        file_path: &str,
        writer: &mut W,
    ) -> Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        let url = self.download_url(project_id, job_id, task_id, file_path)?;
        let mut response = self.request(Method::GET, url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TasklogError::api_error(status, error_message(&body, status)));
        }

        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            writer.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        writer.flush().await?;

        debug!(job_id, task_id, file_path, bytes = written, "task log download complete");
        Ok(written)
    }

    fn logs_url(
        &self,
        project_id: &str,
        job_id: &str,
        task_id: &str,
        suffix: Option<&str>,
    ) -> Result<Url> {
        let mut segments = vec![
            "api", "v1", "project", project_id, "jobs", job_id, "tasks", task_id, "logs",
        ];
        segments.extend(suffix);
        self.endpoint_url(&segments)
    }

    fn download_url(
        &self,
        project_id: &str,
        job_id: &str,
        task_id: &str,
        file_path: &str,
    ) -> Result<Url> {
        let mut url = self.logs_url(project_id, job_id, task_id, Some("download"))?;
        url.query_pairs_mut().append_pair("file_path", file_path);
        Ok(url)
    }
}

/// Total size from a `Content-Range` value such as `bytes 0-0/1234` or `bytes */0`
fn content_range_total(value: &str) -> Option<u64> {
    let (_, total) = value.rsplit_once('/')?;
    total.trim().parse().ok()
}
