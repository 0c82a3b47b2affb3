use anyhow::{Context, Result, anyhow};
use chrono::NaiveTime;
use chrono_tz::Tz;
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub server_addr: String,

    // Rate limiting
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
    pub log_dir: String,

    /// IANA zone the school's day and report time are reckoned in
    pub timezone: Tz,

    // Daily report
    pub report_time: NaiveTime,
    pub report_recipient: String,
    pub school_name: String,

    // Mail transport
    pub smtp: SmtpConfig,
}

#[derive(Clone, Debug)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{key} has an invalid value {raw:?}: {e}")),
        None => Ok(default),
    }
}

/// Parses a local wall-clock time written as `HH:MM` (or `HH:MM:SS`).
pub fn parse_report_time(raw: &str) -> Result<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|e| anyhow!("REPORT_TIME has an invalid value {raw:?}: {e}"))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let report_time = match optional("REPORT_TIME") {
            Some(raw) => parse_report_time(&raw)?,
            None => NaiveTime::from_hms_opt(13, 30, 0).context("default report time")?,
        };

        let smtp_user = optional("SMTP_USER");
        let smtp_from = optional("SMTP_FROM")
            .or_else(|| smtp_user.clone())
            .context("SMTP_FROM or SMTP_USER must be set")?;

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            database_max_connections: parsed_or("DATABASE_MAX_CONNECTIONS", 10)?,
            jwt_secret: required("JWT_SECRET")?,

            rate_protected_per_min: parsed_or("RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: optional("API_PREFIX").unwrap_or_else(|| "/api".to_string()),
            log_dir: optional("LOG_DIR").unwrap_or_else(|| "logs".to_string()),

            timezone: parsed_or("SCHOOL_TIMEZONE", Tz::UTC)?,
            report_time,
            report_recipient: required("REPORT_RECIPIENT")?,
            school_name: optional("SCHOOL_NAME").unwrap_or_else(|| "School".to_string()),

            smtp: SmtpConfig {
                host: required("SMTP_HOST")?,
                port: parsed_or("SMTP_PORT", 587)?,
                user: smtp_user,
                password: optional("SMTP_PASSWORD"),
                from: smtp_from,
            },
        })
    }
}

#[cfg(test)]
impl Config {
    pub fn testing(jwt_secret: &str) -> Self {
        Self {
            database_url: "mysql://localhost/attendance_test".into(),
            database_max_connections: 1,
            jwt_secret: jwt_secret.into(),
            server_addr: "127.0.0.1:0".into(),
            rate_protected_per_min: 1000,
            api_prefix: "/api".into(),
            log_dir: "logs".into(),
            timezone: Tz::UTC,
            report_time: NaiveTime::from_hms_opt(13, 30, 0).unwrap(),
            report_recipient: "office@school.example".into(),
            school_name: "School".into(),
            smtp: SmtpConfig {
                host: "localhost".into(),
                port: 25,
                user: None,
                password: None,
                from: "attendance@school.example".into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_time_accepts_minutes_and_seconds() {
        assert_eq!(
            parse_report_time("13:30").unwrap(),
            NaiveTime::from_hms_opt(13, 30, 0).unwrap()
        );
        assert_eq!(
            parse_report_time(" 07:05:09 ").unwrap(),
            NaiveTime::from_hms_opt(7, 5, 9).unwrap()
        );
    }

    #[test]
    fn school_timezone_parses_iana_names() {
        // SAFETY: no other test reads this variable
        unsafe { env::set_var("SCHOOL_TIMEZONE", "Asia/Dhaka") };
        let tz = parsed_or("SCHOOL_TIMEZONE", Tz::UTC).unwrap();
        unsafe { env::set_var("SCHOOL_TIMEZONE", "Mars/Olympus") };
        let err = parsed_or("SCHOOL_TIMEZONE", Tz::UTC).unwrap_err();
        unsafe { env::remove_var("SCHOOL_TIMEZONE") };

        assert_eq!(tz, chrono_tz::Asia::Dhaka);
        assert!(err.to_string().contains("SCHOOL_TIMEZONE"));
        assert_eq!(parsed_or("SCHOOL_TIMEZONE", Tz::UTC).unwrap(), Tz::UTC);
    }

    #[test]
    fn report_time_rejects_garbage() {
        let err = parse_report_time("half past one").unwrap_err();
        assert!(err.to_string().contains("REPORT_TIME"));
    }
}
