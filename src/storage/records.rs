// src/storage/records.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A registered user. Passwords are stored verbatim; hashing belongs to an
/// authentication subsystem that is not part of this service.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password: String,
}

/// Input for `create_user`; the store assigns the id.
#[derive(Clone, Deserialize, Debug)]
pub struct NewUser {
    pub username: String,
    pub password: String,
}

/// A single tracked visit. Field names on the wire and in the backing file
/// are camelCase to stay compatible with the persisted document format.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Visitor {
    pub id: String,
    pub user_id: Option<String>,
    pub page: String,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub ip: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Input for `track_visitor`; the store assigns id and timestamp.
#[derive(Clone, Debug, Default)]
pub struct NewVisitor {
    pub user_id: Option<String>,
    pub page: String,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub ip: Option<String>,
}

/// A counting window anchored at a fixed start instant in UTC.
///
/// Declaration order matters: it is the widening order used for map keys,
/// so serialized counts always come out today, week, month, year.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Today,
    Week,
    Month,
    Year,
}

impl Period {
    /// All windows, narrowest first.
    pub const ALL: [Period; 4] = [Period::Today, Period::Week, Period::Month, Period::Year];

    pub fn as_str(self) -> &'static str {
        match self {
            Period::Today => "today",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(Period::Today),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "year" => Ok(Period::Year),
            _ => Err(()),
        }
    }
}

/// Aggregate counts keyed by window. A bulk query carries all four entries,
/// a single-period query exactly one; callers rely on the mapping shape.
pub type VisitorCounts = BTreeMap<Period, u64>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_round_trips_through_str() {
        for period in Period::ALL {
            assert_eq!(period.as_str().parse::<Period>(), Ok(period));
        }
    }

    #[test]
    fn period_rejects_unknown_values() {
        assert!("bogus".parse::<Period>().is_err());
        assert!("all".parse::<Period>().is_err());
        assert!("Today".parse::<Period>().is_err());
    }

    #[test]
    fn counts_serialize_in_widening_order() {
        let mut counts = VisitorCounts::new();
        counts.insert(Period::Year, 4);
        counts.insert(Period::Today, 1);
        counts.insert(Period::Month, 3);
        counts.insert(Period::Week, 2);

        let json = serde_json::to_string(&counts).unwrap();
        assert_eq!(json, r#"{"today":1,"week":2,"month":3,"year":4}"#);
    }

    #[test]
    fn visitor_uses_camel_case_field_names() {
        let visitor = Visitor {
            id: "v1".to_string(),
            user_id: Some("u1".to_string()),
            page: "/home".to_string(),
            referrer: None,
            user_agent: Some("curl/8.0".to_string()),
            ip: Some("127.0.0.1".to_string()),
            timestamp: Utc::now(),
        };

        let value = serde_json::to_value(&visitor).unwrap();
        assert!(value.get("userId").is_some());
        assert!(value.get("userAgent").is_some());
        assert!(value.get("user_id").is_none());
    }
}
