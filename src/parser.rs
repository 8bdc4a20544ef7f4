//! Line parsers for Variant S/U: classify a raw line into one of several
//! known log format families and extract its ordered field list.
//!
//! Families are tried in a fixed order, first match wins, each backed by
//! a named-capture `Regex`.

use regex::Regex;
use std::sync::OnceLock;

/// One format family a line can be classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Json,
    Apache,
    Generic,
    SyslogPid,
    SyslogNoPid,
    Security,
    Raw,
}

impl Format {
    pub fn name(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Apache => "apache",
            Format::Generic => "generic",
            Format::SyslogPid => "syslog_pid",
            Format::SyslogNoPid => "syslog_no_pid",
            Format::Security => "security",
            Format::Raw => "raw",
        }
    }
}

/// A parsed row: an ordered, possibly-repeating field name/value list.
/// Field names are stable within a row but not unique across the corpus.
#[derive(Debug, Clone, Default)]
pub struct Row {
    pub format: Option<Format>,
    pub fields: Vec<(String, String)>,
}

impl Row {
    fn with(format: Format, fields: Vec<(&str, String)>) -> Self {
        Self {
            format: Some(format),
            fields: fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }

    /// Value for `name`, or `None` if this row has no such field.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

fn apache_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"^(?P<ip>\S+) - - \[(?P<timestamp>[^\]]+)\] "(?P<method>\S+) (?P<path>\S+) HTTP/[^"]+" (?P<status>\d+) (?P<size>\S+)(?: "(?P<referer>[^"]*)" "(?P<useragent>[^"]*)")?$"#,
        )
        .expect("apache regex is valid")
    })
}

fn generic_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\[(?P<timestamp>[^\]]+)\] (?P<service>\S+) (?P<level>[^:]+): (?P<message>.*)$")
            .expect("generic regex is valid")
    })
}

fn syslog_pid_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?P<month>\w{3}) +(?P<day>\d{1,2}) (?P<time>\d{2}:\d{2}:\d{2}) (?P<host>\S+) (?P<service>[^\[:]+)\[(?P<pid>\d+)\]: (?P<message>.*)$",
        )
        .expect("syslog-pid regex is valid")
    })
}

fn syslog_no_pid_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?P<month>\w{3}) +(?P<day>\d{1,2}) (?P<time>\d{2}:\d{2}:\d{2}) (?P<host>\S+) (?P<service>[^:]+): (?P<message>.*)$",
        )
        .expect("syslog-no-pid regex is valid")
    })
}

fn security_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?P<timestamp>\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}) (?P<service>[^\[:]+)\[(?P<pid>\d+)\]: (?P<message>.*)$",
        )
        .expect("security regex is valid")
    })
}

fn is_json_line(line: &str) -> bool {
    line.trim_start().starts_with('{')
}

/// Classify and parse one log line, trying format families in a fixed
/// order; first match wins.
pub fn parse_line(line: &str) -> Row {
    if is_json_line(line) {
        return Row::with(Format::Json, vec![("raw_message", line.to_string())]);
    }

    if let Some(caps) = apache_re().captures(line) {
        let mut fields = vec![
            ("ip", caps["ip"].to_string()),
            ("timestamp", caps["timestamp"].to_string()),
            ("method", caps["method"].to_string()),
            ("path", caps["path"].to_string()),
            ("status", caps["status"].to_string()),
            ("size", caps["size"].to_string()),
        ];
        if let Some(m) = caps.name("referer") {
            fields.push(("referer", m.as_str().to_string()));
        }
        if let Some(m) = caps.name("useragent") {
            fields.push(("useragent", m.as_str().to_string()));
        }
        return Row::with(Format::Apache, fields);
    }

    if let Some(caps) = generic_re().captures(line) {
        return Row::with(
            Format::Generic,
            vec![
                ("timestamp", caps["timestamp"].to_string()),
                ("service", caps["service"].to_string()),
                ("level", caps["level"].trim().to_string()),
                ("message", caps["message"].to_string()),
            ],
        );
    }

    if let Some(caps) = syslog_pid_re().captures(line) {
        let timestamp = format!("{} {} {}", &caps["month"], &caps["day"], &caps["time"]);
        return Row::with(
            Format::SyslogPid,
            vec![
                ("timestamp", timestamp),
                ("host", caps["host"].to_string()),
                ("service", caps["service"].to_string()),
                ("pid", caps["pid"].to_string()),
                ("message", caps["message"].to_string()),
            ],
        );
    }

    if let Some(caps) = syslog_no_pid_re().captures(line) {
        let timestamp = format!("{} {} {}", &caps["month"], &caps["day"], &caps["time"]);
        return Row::with(
            Format::SyslogNoPid,
            vec![
                ("timestamp", timestamp),
                ("host", caps["host"].to_string()),
                ("service", caps["service"].to_string()),
                ("message", caps["message"].to_string()),
            ],
        );
    }

    if let Some(caps) = security_re().captures(line) {
        return Row::with(
            Format::Security,
            vec![
                ("timestamp", caps["timestamp"].to_string()),
                ("service", caps["service"].to_string()),
                ("pid", caps["pid"].to_string()),
                ("message", caps["message"].to_string()),
            ],
        );
    }

    Row::with(Format::Raw, vec![("raw_message", line.to_string())])
}
