//! Data models for the pharmacy collections and storage
//!
//! This module contains all persisted data structures. Field names serialize
//! in camelCase so the stored JSON stays compatible with the browser-storage
//! schema the data originally lived in.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use rand::Rng;
use serde::{Deserialize, Serialize};

fn epoch() -> DateTime<Local> {
    Local.timestamp_opt(0, 0).single().unwrap_or_else(Local::now)
}

/// A registered pharmacy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pharmacy {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Street address
    pub address: String,
    /// Contact phone number
    pub phone: String,
    /// Contact email address
    pub email: String,
    /// License number
    pub license: String,
    /// When the record was created (absent in legacy data)
    #[serde(default = "epoch")]
    pub created_at: DateTime<Local>,
}

/// Data for creating a new pharmacy
#[derive(Debug, Clone, Default)]
pub struct NewPharmacy {
    /// Display name
    pub name: String,
    /// Street address
    pub address: String,
    /// Contact phone number
    pub phone: String,
    /// Contact email address
    pub email: String,
    /// License number
    pub license: String,
}

/// A wellness program offered alongside the pharmacies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WellnessProgram {
    /// Unique identifier
    pub id: String,
    /// Program name
    pub name: String,
    /// Free-form description
    pub description: String,
    /// First day of the program
    pub start_date: NaiveDate,
    /// Last day of the program (never before `start_date`)
    pub end_date: NaiveDate,
    /// Price in dollars, non-negative
    pub price: f64,
    /// When the record was created (absent in legacy data)
    #[serde(default = "epoch")]
    pub created_at: DateTime<Local>,
}

/// Data for creating a new wellness program
#[derive(Debug, Clone)]
pub struct NewWellnessProgram {
    /// Program name
    pub name: String,
    /// Free-form description
    pub description: String,
    /// First day of the program
    pub start_date: NaiveDate,
    /// Last day of the program
    pub end_date: NaiveDate,
    /// Price in dollars
    pub price: f64,
}

/// Outcome recorded in the upload audit log.
///
/// Failed imports abort before the audit entry is written, so `Success` is
/// the only value that ever reaches storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadStatus {
    /// The whole file was applied
    Success,
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "Success"),
        }
    }
}

/// One append-only audit entry describing a completed import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRecord {
    /// Unique identifier
    pub id: String,
    /// When the import completed
    pub date: DateTime<Local>,
    /// Name of the uploaded file
    pub file_name: String,
    /// Declared target collection
    #[serde(rename = "type")]
    pub upload_type: String,
    /// Number of records applied
    pub records_count: usize,
    /// Import outcome
    pub status: UploadStatus,
}

/// Target collection for an import.
///
/// Parsed from the declared upload type; anything else is treated as an
/// unrecognized target and applies zero records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportTarget {
    /// Append to the pharmacies collection
    Pharmacies,
    /// Append to the wellness programs collection
    Wellness,
    /// Declared type is not a known collection
    Unrecognized,
}

impl ImportTarget {
    /// The canonical name recorded in the audit log
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pharmacies => "pharmacies",
            Self::Wellness => "wellness",
            Self::Unrecognized => "unknown",
        }
    }
}

impl FromStr for ImportTarget {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "pharmacies" => Self::Pharmacies,
            "wellness" => Self::Wellness,
            _ => Self::Unrecognized,
        })
    }
}

/// A single chat message inside a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Unique identifier
    pub id: String,
    /// Message body
    pub text: String,
    /// Sender display name ("You" for the local user)
    pub sender: String,
    /// When the message was sent
    pub timestamp: DateTime<Local>,
}

/// A conversation with an ordered, append-only message list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Unique identifier
    pub id: String,
    /// Conversation display name
    pub name: String,
    /// Messages in send order
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    /// Body of the most recent message
    #[serde(default)]
    pub last_message: Option<String>,
    /// Timestamp of the most recent message
    #[serde(default)]
    pub last_message_time: Option<DateTime<Local>>,
    /// Unread message counter, reset on selection
    #[serde(default)]
    pub unread: u32,
}

/// A tracked prescription with its next refill date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    /// Unique identifier
    pub id: String,
    /// Medication name
    pub name: String,
    /// Dosage, e.g. "20 mg"
    pub dosage: String,
    /// Next refill date
    pub refill_date: DateTime<Local>,
    /// Attached file name, if a scan was uploaded
    #[serde(default)]
    pub file_name: Option<String>,
}

/// Singleton user profile
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Full display name
    #[serde(default)]
    pub full_name: String,
    /// Email address
    #[serde(default)]
    pub email: String,
    /// Phone number
    #[serde(default)]
    pub phone: String,
    /// Postal address or preferred city
    #[serde(default)]
    pub address: String,
    /// Last time a session loaded the profile
    #[serde(default)]
    pub last_login: Option<DateTime<Local>>,
}

/// A logged food item in the wellness diary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodEntry {
    /// Unique identifier
    pub id: String,
    /// What was eaten
    pub text: String,
}

/// One calendar day of wellness tracking, keyed by `YYYY-MM-DD`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecord {
    /// Recorded mood, empty until set
    #[serde(default)]
    pub mood: String,
    /// Glasses of water logged today
    #[serde(default)]
    pub water: u32,
    /// Daily water target
    #[serde(default = "default_water_max")]
    pub water_max: u32,
    /// Food log, append order
    #[serde(default)]
    pub foods: Vec<FoodEntry>,
}

fn default_water_max() -> u32 {
    8
}

impl Default for DailyRecord {
    fn default() -> Self {
        Self {
            mood: String::new(),
            water: 0,
            water_max: default_water_max(),
            foods: Vec::new(),
        }
    }
}

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Unique identifier generator.
///
/// Ids look like `rx_k3f9a2_1c`: a prefix, a random component and a
/// process-wide monotonic counter. Rapid successive calls can never collide,
/// unlike the creation-timestamp ids the stored data used to carry.
#[derive(Debug, Clone, Copy)]
pub struct IdGenerator;

impl IdGenerator {
    /// Generate a fresh id with the given prefix
    #[must_use]
    pub fn next(prefix: &str) -> String {
        let serial = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        let random: u32 = rand::thread_rng().gen();
        format!(
            "{}_{}_{}",
            prefix,
            to_base36(u64::from(random)),
            to_base36(serial)
        )
    }
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
