/// Current UTC time in Unix milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Random identifier for messages, notifications and crew members.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
