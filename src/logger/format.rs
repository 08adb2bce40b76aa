//! Access log lines
//!
//! [`AccessLogFormat`] is parsed once from `logging.access_log_format`; every request then
//! renders an [`AccessLogEntry`] with it. Named formats are nginx `combined` and `common`, plus
//! `json`. Anything else is a pattern of `$variables`.

use chrono::{DateTime, Local};

/// `$request` comes after the names it prefixes
const PATTERN_VARS: [&str; 12] = [
    "$remote_addr",
    "$time_local",
    "$time_iso8601",
    "$request_method",
    "$request_time",
    "$request_uri",
    "$request",
    "$status",
    "$body_bytes_sent",
    "$http_range",
    "$http_referer",
    "$http_user_agent",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessLogFormat {
    Combined,
    Common,
    Json,
    /// Pattern with `$remote_addr`, `$time_local`, `$time_iso8601`, `$request`,
    /// `$request_method`, `$request_uri`, `$request_time`, `$status`, `$body_bytes_sent`,
    /// `$http_range`, `$http_referer`, `$http_user_agent`
    Pattern(String),
}

impl AccessLogFormat {
    pub fn parse(name: &str) -> Self {
        match name {
            "combined" => Self::Combined,
            "common" => Self::Common,
            "json" => Self::Json,
            pattern => Self::Pattern(pattern.to_string()),
        }
    }
}

/// One served request
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    pub remote_addr: String,
    pub time: DateTime<Local>,
    pub method: String,
    pub path: String,
    /// Without the leading `?`
    pub query: Option<String>,
    pub http_version: String,
    pub status: u16,
    /// Declared `Content-Length`, not bytes actually written
    pub body_bytes: u64,
    pub range: Option<String>,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    /// Until the response head was ready
    pub request_time_us: u64,
}

impl AccessLogEntry {
    pub fn new(remote_addr: String, method: String, path: String) -> Self {
        Self {
            remote_addr,
            time: Local::now(),
            method,
            path,
            query: None,
            http_version: "1.1".to_string(),
            status: 200,
            body_bytes: 0,
            range: None,
            referer: None,
            user_agent: None,
            request_time_us: 0,
        }
    }

    pub fn render(&self, format: &AccessLogFormat) -> String {
        match format {
            AccessLogFormat::Common => self.common_line(),
            AccessLogFormat::Combined => format!(
                "{} \"{}\" \"{}\"",
                self.common_line(),
                dash(self.referer.as_deref()),
                dash(self.user_agent.as_deref()),
            ),
            AccessLogFormat::Json => self.json_line(),
            AccessLogFormat::Pattern(pattern) => self.expand(pattern),
        }
    }

    fn uri(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{q}", self.path),
            None => self.path.clone(),
        }
    }

    fn request_line(&self) -> String {
        format!("{} {} HTTP/{}", self.method, self.uri(), self.http_version)
    }

    fn clf_time(&self) -> String {
        self.time.format("%d/%b/%Y:%H:%M:%S %z").to_string()
    }

    fn common_line(&self) -> String {
        format!(
            "{} - - [{}] \"{}\" {} {}",
            self.remote_addr,
            self.clf_time(),
            self.request_line(),
            self.status,
            self.body_bytes,
        )
    }

    fn json_line(&self) -> String {
        serde_json::json!({
            "remote_addr": self.remote_addr,
            "time": self.time.to_rfc3339(),
            "method": self.method,
            "path": self.path,
            "query": self.query,
            "http_version": self.http_version,
            "status": self.status,
            "body_bytes": self.body_bytes,
            "range": self.range,
            "referer": self.referer,
            "user_agent": self.user_agent,
            "request_time_us": self.request_time_us,
        })
        .to_string()
    }

    /// Single left-to-right pass, so substituted values are never expanded again
    fn expand(&self, pattern: &str) -> String {
        let mut line = String::with_capacity(pattern.len());
        let mut rest = pattern;
        while let Some(pos) = rest.find('$') {
            line.push_str(&rest[..pos]);
            rest = &rest[pos..];
            match PATTERN_VARS.iter().find(|name| rest.starts_with(**name)) {
                Some(name) => {
                    line.push_str(&self.variable(name));
                    rest = &rest[name.len()..];
                }
                None => {
                    line.push('$');
                    rest = &rest[1..];
                }
            }
        }
        line.push_str(rest);
        line
    }

    fn variable(&self, name: &str) -> String {
        match name {
            "$remote_addr" => self.remote_addr.clone(),
            "$time_local" => self.clf_time(),
            "$time_iso8601" => self.time.to_rfc3339(),
            "$request_method" => self.method.clone(),
            "$request_time" => {
                #[allow(clippy::cast_precision_loss)]
                let seconds = self.request_time_us as f64 / 1_000_000.0;
                format!("{seconds:.3}")
            }
            "$request_uri" => self.uri(),
            "$request" => self.request_line(),
            "$status" => self.status.to_string(),
            "$body_bytes_sent" => self.body_bytes.to_string(),
            "$http_range" => dash(self.range.as_deref()).to_string(),
            "$http_referer" => dash(self.referer.as_deref()).to_string(),
            "$http_user_agent" => dash(self.user_agent.as_deref()).to_string(),
            _ => String::new(),
        }
    }
}

fn dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}
