/*
[INPUT]:  Console base URL, job/task identifiers, log file path (env vars)
[OUTPUT]: Most recent page of task logs and one older page
[POS]:    Examples - cursor paginated log fetching
[UPDATE]: When the log pagination contract changes
*/

use tasklog_adapter::*;

/// Example: walk a task log backwards one page at a time
///
/// Reads TASKLOG_BASE_URL, TASKLOG_JOB_ID, TASKLOG_TASK_ID and TASKLOG_FILE.
#[tokio::main]
async fn main() {
    println!("=== Task Log Pagination Example ===\n");

    let base_url =
        std::env::var("TASKLOG_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());
    let client = match TasklogClient::new(&base_url) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            return;
        }
    };
    println!("✓ HTTP client created for {}\n", base_url);

    let mut req = LogPageRequest {
        project_id: std::env::var("TASKLOG_PROJECT_ID").unwrap_or_else(|_| "123".to_string()),
        job_id: std::env::var("TASKLOG_JOB_ID").unwrap_or_else(|_| "1".to_string()),
        task_id: std::env::var("TASKLOG_TASK_ID").unwrap_or_else(|_| "1".to_string()),
        file_path: std::env::var("TASKLOG_FILE").unwrap_or_else(|_| "sync.log".to_string()),
        cursor: START_CURSOR,
        limit: 100,
        direction: Direction::Older,
    };

    println!("Fetching most recent {} lines...", req.limit);
    let page = match client.fetch_task_logs(&req).await {
        Ok(page) => page,
        Err(e) => {
            println!("✗ Error: {}", e);
            return;
        }
    };
    for record in &page.logs {
        println!("[{}] {}", record.level, record.message);
    }
    println!(
        "✓ {} lines (older cursor {}, more older: {})",
        page.logs.len(),
        page.older_cursor,
        page.has_more_older
    );

    if !page.has_more_older {
        return;
    }

    req.cursor = page.older_cursor;
    println!("\nFetching the page before cursor {}...", req.cursor);
    match client.fetch_task_logs(&req).await {
        Ok(older) => println!("✓ {} older lines", older.logs.len()),
        Err(e) => println!("✗ Error: {}", e),
    }
}
