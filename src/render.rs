//! Pure rendering of collections into HTML fragments.
//!
//! Every function maps a collection (plus options) to a fragment string,
//! recomputed fully on each call. Each view renders a distinct placeholder
//! for the empty collection. No function here reads or writes storage.

use std::fmt::Write as _;

use chrono::{DateTime, Local};

use crate::analytics::AnalyticsReport;
use crate::models::{
    ChatMessage, Conversation, DailyRecord, Pharmacy, Prescription, Profile, UploadRecord,
    WellnessProgram,
};
use crate::utils::{days_until, format_date, format_naive_date, relative_time};

/// Escape text for interpolation into markup.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Table body for the pharmacies page.
#[must_use]
pub fn pharmacy_table(pharmacies: &[Pharmacy]) -> String {
    if pharmacies.is_empty() {
        return r#"<tr><td colspan="6" class="empty-message">No pharmacies registered</td></tr>"#
            .to_string();
    }
    let mut out = String::new();
    for pharmacy in pharmacies {
        let _ = write!(
            out,
            concat!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>",
                r#"<td><button class="btn-action btn-edit" data-id="{id}">Edit</button>"#,
                r#"<button class="btn-action btn-delete" data-id="{id}">Delete</button></td></tr>"#,
                "\n",
            ),
            escape_html(&pharmacy.name),
            escape_html(&pharmacy.address),
            escape_html(&pharmacy.phone),
            escape_html(&pharmacy.email),
            escape_html(&pharmacy.license),
            id = escape_html(&pharmacy.id),
        );
    }
    out
}

/// Card list for the wellness programs page.
#[must_use]
pub fn wellness_cards(programs: &[WellnessProgram]) -> String {
    if programs.is_empty() {
        return r#"<div class="empty-message">No wellness programs available</div>"#.to_string();
    }
    let mut out = String::new();
    for program in programs {
        let _ = write!(
            out,
            concat!(
                r#"<div class="wellness-card-item"><h4>{}</h4><p>{}</p>"#,
                r#"<div class="program-details">"#,
                "<span><strong>Start:</strong> {}</span>",
                "<span><strong>End:</strong> {}</span>",
                "<span><strong>Price:</strong> ${:.2}</span>",
                "</div></div>\n",
            ),
            escape_html(&program.name),
            escape_html(&program.description),
            format_naive_date(program.start_date),
            format_naive_date(program.end_date),
            program.price,
        );
    }
    out
}

/// Table body for the upload history page; callers pass entries in display
/// order (most recent first).
#[must_use]
pub fn upload_history_table(uploads: &[UploadRecord]) -> String {
    if uploads.is_empty() {
        return r#"<tr><td colspan="5" class="empty-message">No upload history</td></tr>"#
            .to_string();
    }
    let mut out = String::new();
    for upload in uploads {
        let status = upload.status.to_string();
        let _ = write!(
            out,
            concat!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td>",
                r#"<td><span class="status-badge status-{}">{}</span></td></tr>"#,
                "\n",
            ),
            format_date(&upload.date),
            escape_html(&upload.file_name),
            escape_html(&upload.upload_type),
            upload.records_count,
            status.to_lowercase(),
            status,
        );
    }
    out
}

/// Sidebar list of conversations, already sorted by the chat service.
#[must_use]
pub fn conversation_list(
    conversations: &[Conversation],
    active_id: Option<&str>,
    now: &DateTime<Local>,
) -> String {
    if conversations.is_empty() {
        return r#"<div class="empty-message">No conversations</div>"#.to_string();
    }
    let mut out = String::new();
    for conversation in conversations {
        let class = if active_id == Some(conversation.id.as_str()) {
            "conversation-item active"
        } else {
            "conversation-item"
        };
        let preview = conversation
            .last_message
            .as_deref()
            .unwrap_or("No messages yet");
        let time = conversation
            .last_message_time
            .map(|t| relative_time(&t, now))
            .unwrap_or_default();
        let badge = if conversation.unread > 0 {
            format!(r#"<span class="unread-badge">{}</span>"#, conversation.unread)
        } else {
            String::new()
        };
        let _ = write!(
            out,
            concat!(
                r#"<div class="{}"><div class="conversation-name">{}</div>"#,
                r#"<div class="conversation-preview">{}</div>"#,
                r#"<div class="conversation-time">{}</div>{}</div>"#,
                "\n",
            ),
            class,
            escape_html(&conversation.name),
            escape_html(preview),
            time,
            badge,
        );
    }
    out
}

/// Message log for the selected conversation.
#[must_use]
pub fn message_log(messages: &[ChatMessage], now: &DateTime<Local>) -> String {
    if messages.is_empty() {
        return r#"<div class="empty-message">No messages yet. Start the conversation!</div>"#
            .to_string();
    }
    let mut out = String::new();
    for message in messages {
        let direction = if message.sender == "You" {
            "message-sent"
        } else {
            "message-received"
        };
        let _ = write!(
            out,
            concat!(
                r#"<div class="message {}"><div class="message-sender">{}</div>"#,
                r#"<div class="message-text">{}</div>"#,
                r#"<div class="message-time">{}</div></div>"#,
                "\n",
            ),
            direction,
            escape_html(&message.sender),
            escape_html(&message.text),
            relative_time(&message.timestamp, now),
        );
    }
    out
}

/// Countdown label for a refill that is `days` away.
#[must_use]
pub fn countdown_text(days: i64) -> String {
    if days <= 0 {
        return "Refill due now".to_string();
    }
    if days == 1 {
        return "Refill in 1 day".to_string();
    }
    format!("Refill in {days} days")
}

/// Prescription cards with refill countdowns.
#[must_use]
pub fn prescription_cards(prescriptions: &[Prescription], now: &DateTime<Local>) -> String {
    if prescriptions.is_empty() {
        return "<p>No prescriptions yet. Add one from Upload.</p>".to_string();
    }
    let mut out = String::new();
    for prescription in prescriptions {
        let days = days_until(&prescription.refill_date, now);
        let urgency = if days <= 0 {
            " danger"
        } else if days <= 3 {
            " warn"
        } else {
            ""
        };
        let _ = write!(
            out,
            concat!(
                r#"<article class="card"><h3>{}</h3>"#,
                r#"<div class="meta">Dosage: {}</div>"#,
                r#"<div class="pill{}"><span class="countdown">{}</span></div>"#,
                r#"<div class="meta">Refill date: {}</div></article>"#,
                "\n",
            ),
            escape_html(&prescription.name),
            escape_html(&prescription.dosage),
            urgency,
            countdown_text(days),
            format_date(&prescription.refill_date),
        );
    }
    out
}

/// Stat tiles for the dashboard header.
#[must_use]
pub fn dashboard_stats(
    total_pharmacies: usize,
    active_programs: usize,
    total_uploads: usize,
    total_programs: usize,
) -> String {
    format!(
        concat!(
            r#"<div class="stat-card"><span>Total Pharmacies</span><strong>{}</strong></div>"#,
            r#"<div class="stat-card"><span>Active Programs</span><strong>{}</strong></div>"#,
            r#"<div class="stat-card"><span>Total Uploads</span><strong>{}</strong></div>"#,
            r#"<div class="stat-card"><span>Wellness Programs</span><strong>{}</strong></div>"#,
        ),
        total_pharmacies, active_programs, total_uploads, total_programs,
    )
}

/// Recent-activity table body for the dashboard.
#[must_use]
pub fn recent_activity_table(uploads: &[UploadRecord]) -> String {
    if uploads.is_empty() {
        return r#"<tr><td colspan="4" class="empty-message">No recent activity</td></tr>"#
            .to_string();
    }
    let mut out = String::new();
    for upload in uploads {
        let _ = write!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{} records</td></tr>\n",
            format_date(&upload.date),
            escape_html(&upload.upload_type),
            escape_html(&upload.file_name),
            upload.records_count,
        );
    }
    out
}

/// Programs-ending-soon table body for the dashboard.
#[must_use]
pub fn ending_soon_table(programs: &[WellnessProgram], now: &DateTime<Local>) -> String {
    if programs.is_empty() {
        return r#"<tr><td colspan="3" class="empty-message">No upcoming programs</td></tr>"#
            .to_string();
    }
    let today = now.date_naive();
    let mut out = String::new();
    for program in programs {
        let days_left = (program.end_date - today).num_days();
        let _ = write!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{} days</td></tr>\n",
            escape_html(&program.name),
            format_naive_date(program.end_date),
            days_left,
        );
    }
    out
}

/// Analytics page: stat values plus the top-upload-types table.
#[must_use]
pub fn analytics_report(report: &AnalyticsReport) -> String {
    let mut out = format!(
        concat!(
            r#"<div class="stat-card"><span>Uploads ({})</span><strong>{}</strong></div>"#,
            r#"<div class="stat-card"><span>Total Pharmacies</span><strong>{}</strong></div>"#,
            r#"<div class="stat-card"><span>New Pharmacies</span><strong>{}</strong></div>"#,
            r#"<div class="stat-card"><span>Program Value</span><strong>${:.2}</strong></div>"#,
            r#"<div class="stat-card"><span>Active Programs</span><strong>{}</strong></div>"#,
            "\n<table><tbody>",
        ),
        report.period.as_str(),
        report.uploads_in_period,
        report.total_pharmacies,
        report.new_pharmacies,
        report.total_program_value,
        report.active_programs,
    );
    if report.top_upload_types.is_empty() {
        out.push_str(r#"<tr><td colspan="3" class="empty-message">No upload data</td></tr>"#);
    } else {
        for summary in &report.top_upload_types {
            let _ = write!(
                out,
                "<tr><td>{}</td><td>{}</td><td>{} records</td></tr>",
                escape_html(&summary.name),
                summary.count,
                summary.records,
            );
        }
    }
    out.push_str("</tbody></table>");
    out
}

/// Profile card with activity stats.
#[must_use]
pub fn profile_summary(profile: &Profile, total_pharmacies: usize, total_programs: usize) -> String {
    let last_login = profile
        .last_login
        .map(|t| format_date(&t))
        .unwrap_or_else(|| "Never".to_string());
    format!(
        concat!(
            r#"<div class="profile-card"><h3>{}</h3><p>{}</p><p>{}</p><p>{}</p>"#,
            "<p>Last login: {}</p>",
            "<p>Pharmacies managed: {}</p>",
            "<p>Wellness programs: {}</p></div>",
        ),
        escape_html(&profile.full_name),
        escape_html(&profile.email),
        escape_html(&profile.phone),
        escape_html(&profile.address),
        last_login,
        total_pharmacies,
        total_programs,
    )
}

/// Wellness diary panel for one day.
#[must_use]
pub fn wellness_diary(record: &DailyRecord) -> String {
    let mood = if record.mood.is_empty() {
        "—"
    } else {
        record.mood.as_str()
    };
    let max = record.water_max.max(1);
    let pct = (f64::from(record.water) / f64::from(max) * 100.0).clamp(0.0, 100.0);
    let mut out = format!(
        concat!(
            r#"<div class="mood">Mood today: {}</div>"#,
            r#"<div class="water"><div class="water-fill" style="width:{:.0}%"></div>"#,
            "<span>{} / {}</span></div>",
            r#"<div class="food-list">"#,
        ),
        escape_html(mood),
        pct,
        record.water,
        record.water_max,
    );
    for food in &record.foods {
        let _ = write!(
            out,
            r#"<div class="food-item"><span>{}</span></div>"#,
            escape_html(&food.text)
        );
    }
    out.push_str("</div>");
    out
}
