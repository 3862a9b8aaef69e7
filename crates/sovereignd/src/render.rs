//! HTML rendering for the demo page.
//!
//! Pure formatting: every string that reaches the page passes through
//! `html_escape`, and nothing here decides anything about the run.

use html_escape::{encode_double_quoted_attribute, encode_text};
use sovereign_common::{PresentationConfig, RunRecord, StageLog};

const PAGE_TEMPLATE: &str = include_str!("../static/index.html");

/// Sidebar concept list: icon, name, caption
const CONCEPTS: &[(&str, &str, &str)] = &[
    ("🔲", "Edge AI", "Processing at the source"),
    ("📋", "Contextual AI", "Understanding the situation"),
    ("🔗", "Causal AI", "Cause-effect reasoning"),
    ("🧮", "True Reasoning", "Logical deduction"),
    ("🛡️", "Sovereign AI", "Data sovereignty"),
    ("🔒", "Privacy Preserving", "Anonymous queries"),
    ("🤖", "Agentic AI", "Autonomous action"),
    ("📚", "Continuous Learning", "Self-improvement"),
];

/// Stages rendered open on first reveal
const EXPANDED_STAGES: usize = 3;

pub fn stage_icon(stage: u8) -> &'static str {
    match stage {
        1 => "📱",
        2 => "📋",
        3 => "🔗",
        4 => "🧮",
        5 => "🛡️",
        6 => "🤖",
        7 => "👤",
        8 => "📚",
        _ => "📌",
    }
}

pub fn stage_color(stage: u8) -> &'static str {
    match stage {
        1 => "#3498db",
        2 => "#9b59b6",
        3 => "#e74c3c",
        4 => "#f39c12",
        5 => "#6c63ff",
        6 => "#27ae60",
        7 => "#16a085",
        8 => "#8e44ad",
        _ => "#2d5a87",
    }
}

/// The full page with presentation defaults filled in
pub fn page(
    presentation: &PresentationConfig,
    llm_model: &str,
    llm_enabled: bool,
    run_count: u64,
) -> String {
    let concepts: String = CONCEPTS
        .iter()
        .map(|(icon, name, desc)| {
            format!(
                "<p>{} <strong>{}</strong><br><small>{}</small></p>\n",
                icon,
                encode_text(name),
                encode_text(desc)
            )
        })
        .collect();

    PAGE_TEMPLATE
        .replace("{{INCIDENT}}", &encode_double_quoted_attribute(&presentation.default_incident))
        .replace("{{LLM_MODEL}}", &encode_text(llm_model))
        .replace("{{LLM_CHECKED}}", if llm_enabled { "checked" } else { "" })
        .replace("{{DELAY_MIN}}", &presentation.min_delay_secs.to_string())
        .replace("{{DELAY_MAX}}", &presentation.max_delay_secs.to_string())
        .replace("{{DELAY_STEP}}", &presentation.delay_step_secs.to_string())
        .replace("{{DELAY}}", &presentation.delay_secs.to_string())
        .replace("{{CONCEPTS}}", &concepts)
        .replace("{{RUN_COUNT}}", &run_count.to_string())
}

fn code_block(title: &str, body: &str) -> String {
    format!(
        "<h4>{}</h4>\n<pre class=\"code-block\">{}</pre>\n",
        encode_text(title),
        encode_text(body)
    )
}

/// One expandable timeline card for a stage entry
pub fn stage_card(log: &StageLog, expanded: bool) -> String {
    let mut html = format!(
        "<details class=\"stage-box\" style=\"border-left-color: {}\"{}>\n<summary>{} STAGE {}: {} — {}</summary>\n",
        stage_color(log.stage),
        if expanded { " open" } else { "" },
        stage_icon(log.stage),
        log.stage,
        encode_text(&log.name),
        encode_text(&log.timestamp),
    );

    html.push_str(&format!(
        "<span class=\"concept-badge\">💡 {}</span>\n<ul class=\"actions\">\n",
        encode_text(&log.concept)
    ));
    // blank lines are spacing in the terminal view only
    for action in log.actions.iter().filter(|a| !a.trim().is_empty()) {
        html.push_str(&format!("<li><code>{}</code></li>\n", encode_text(action)));
    }
    html.push_str("</ul>\n");

    if let Some(reasoning) = &log.llm_reasoning {
        html.push_str(&code_block("🧠 LLM Reasoning Output", reasoning));
    }
    if let Some(message) = &log.executive_message {
        html.push_str(&code_block("📨 Executive Notification", message));
    }

    html.push_str(&format!(
        "<div class=\"insight\">💡 <strong>Key Insight:</strong> {}</div>\n</details>\n",
        encode_text(&log.key_insight)
    ));
    html
}

/// Cards for every stage, the first few open
pub fn stage_cards(record: &RunRecord) -> Vec<String> {
    record
        .stage_logs
        .iter()
        .enumerate()
        .map(|(i, log)| stage_card(log, i < EXPANDED_STAGES))
        .collect()
}

fn metric(label: &str, value: &str) -> String {
    format!(
        "<div class=\"metric-card\"><div class=\"label\">{}</div><div class=\"value\">{}</div></div>\n",
        encode_text(label),
        encode_text(value)
    )
}

fn pretty_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

/// Final summary block shown after the last stage
pub fn summary(record: &RunRecord) -> String {
    let eta = record
        .final_solution
        .as_ref()
        .map(|s| s.timeline.tokyo_arrival.as_str())
        .unwrap_or("08:15");
    let buffer = record
        .final_solution
        .as_ref()
        .map(|s| s.buffer_time.as_str())
        .unwrap_or("20 min");

    let mut html = String::from("<hr>\n<h2>✅ MISSION RECOVERY COMPLETE</h2>\n<div class=\"metrics\">\n");
    html.push_str(&metric("Status", "SECURED"));
    html.push_str(&metric("ETA Tokyo", eta));
    html.push_str(&metric("Buffer Time", buffer));
    html.push_str(&metric("Privacy", "PROTECTED"));
    html.push_str("</div>\n<h3>🗺️ Recovery Route</h3>\n<div class=\"route\">\n");

    let route_steps = [
        ("🛫", "Paris CDG", "01:20"),
        ("✈️", "Flight JL416", "12h 25m"),
        ("🛬", "Osaka KIX", "19:45"),
        ("🚄", "Nozomi 64", "2h 15m"),
        ("🏢", "Tokyo Venue", "08:40"),
    ];
    for (icon, label, time) in route_steps {
        html.push_str(&format!(
            "<div class=\"route-step\"><div class=\"icon\">{}</div><strong>{}</strong><div>{}</div></div>\n",
            icon, label, time
        ));
    }
    html.push_str("</div>\n");

    html.push_str("<details>\n<summary>🔧 Technical Summary</summary>\n<h4>Privacy Actions</h4>\n");
    for action in &record.privacy_actions {
        html.push_str(&format!("<pre class=\"code-block\">{}</pre>\n", encode_text(&pretty_json(action))));
    }
    html.push_str("<h4>Bookings Secured</h4>\n");
    for booking in &record.bookings {
        html.push_str(&format!("<pre class=\"code-block\">{}</pre>\n", encode_text(&pretty_json(booking))));
    }
    html.push_str("</details>\n");

    html.push_str(&format!(
        "<details>\n<summary>📄 Full Execution Log (JSON)</summary>\n<pre class=\"code-block\">{}</pre>\n</details>\n",
        encode_text(&pretty_json(record))
    ));
    html
}
