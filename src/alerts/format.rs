use crate::config::MarkupMode;
use crate::filter::Rules;
use crate::models::CandidatePair;
use std::time::Duration;
use teloxide::utils::{html, markdown};

/// Whole dollars with thousands separators, e.g. `15,000`.
pub fn format_usd(amount: f64) -> String {
    if !amount.is_finite() {
        return "n/a".to_string();
    }
    let rounded = format!("{:.0}", amount.abs());
    let mut grouped = String::with_capacity(rounded.len() + rounded.len() / 3);
    for (i, ch) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0.0 && rounded != "0" {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

fn escape(text: &str, mode: MarkupMode) -> String {
    match mode {
        MarkupMode::Plain => text.to_string(),
        MarkupMode::Html => html::escape(text),
        MarkupMode::Markdown => markdown::escape(text),
    }
}

fn title(text: &str, mode: MarkupMode) -> String {
    match mode {
        MarkupMode::Plain => text.to_string(),
        MarkupMode::Html => format!("<b>{}</b>", html::escape(text)),
        MarkupMode::Markdown => format!("*{}*", markdown::escape(text)),
    }
}

fn field(label: &str, value: &str, mode: MarkupMode) -> String {
    match mode {
        MarkupMode::Plain => format!("{}: {}", label, value),
        MarkupMode::Html => format!("<b>{}:</b> {}", html::escape(label), html::escape(value)),
        MarkupMode::Markdown => format!("*{}:* {}", markdown::escape(label), markdown::escape(value)),
    }
}

pub fn format_alert(pair: &CandidatePair, mode: MarkupMode) -> String {
    let token = &pair.base_token;
    let mut lines = vec![
        title("🚀 New Pair Alert", mode),
        field("Name", &token.name, mode),
        field("Symbol", &token.symbol, mode),
        field("Mint", &token.address, mode),
        field("Liquidity", &format!("${}", format_usd(pair.liquidity_usd)), mode),
        field("Volume (24h)", &format!("${}", format_usd(pair.volume_usd)), mode),
        field("Largest holder", &format!("{:.1}%", pair.max_holder_percent()), mode),
        field("LP", &pair.lock_state.to_string(), mode),
    ];
    if let Some(ratio) = pair.volume_window_ratio {
        lines.push(field("Volume spike", &format!("{:.2}x", ratio), mode));
    }
    if let Some(url) = &pair.url {
        lines.push(field("URL", url, mode));
    }
    lines.join("\n")
}

pub fn format_startup(rules: &Rules, interval: Duration, mode: MarkupMode) -> String {
    let minutes = interval.as_secs() / 60;
    let every = if minutes > 0 && interval.as_secs() % 60 == 0 {
        format!("every {} min", minutes)
    } else {
        format!("every {} s", interval.as_secs())
    };
    let mut lines = vec![
        title("✅ Scanner started", mode),
        escape(&format!("Polling for new pairs {}", every), mode),
    ];
    for rule in rules.describe() {
        lines.push(escape(&format!("• {}", rule), mode));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LockState;
    use crate::tests::common::create_test_pair;

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(0.0), "0");
        assert_eq!(format_usd(999.4), "999");
        assert_eq!(format_usd(15000.0), "15,000");
        assert_eq!(format_usd(1234567.8), "1,234,568");
        assert_eq!(format_usd(-2500.0), "-2,500");
        assert_eq!(format_usd(f64::NAN), "n/a");
    }

    #[test]
    fn test_html_alert_escapes_values() {
        let mut pair = create_test_pair("p1", 15000.0, 20000.0, LockState::Locked, 3.0);
        pair.base_token.name = "<Evil & Co>".to_string();
        let text = format_alert(&pair, MarkupMode::Html);

        assert!(text.starts_with("<b>🚀 New Pair Alert</b>"));
        assert!(text.contains("<b>Name:</b> &lt;Evil &amp; Co&gt;"));
        assert!(text.contains("<b>Liquidity:</b> $15,000"));
        assert!(text.contains("<b>Largest holder:</b> 3.0%"));
        assert!(text.contains("<b>LP:</b> locked"));
        assert!(text.contains("https://dexscreener.com/solana/p1"));
    }

    #[test]
    fn test_markdown_alert_escapes_reserved_characters() {
        let pair = create_test_pair("p1", 15000.0, 20000.0, LockState::Burned, 3.0);
        let text = format_alert(&pair, MarkupMode::Markdown);
        assert!(text.contains("*Volume \\(24h\\):* $20,000"));
        assert!(text.contains("3\\.0%"));
    }

    #[test]
    fn test_plain_alert() {
        let mut pair = create_test_pair("p1", 15000.0, 20000.0, LockState::Burned, 3.0);
        pair.volume_window_ratio = Some(2.5);
        pair.url = None;
        let text = format_alert(&pair, MarkupMode::Plain);
        assert!(text.contains("Symbol: P1"));
        assert!(text.contains("Volume spike: 2.50x"));
        assert!(!text.contains("URL"));
    }

    #[test]
    fn test_startup_message_lists_rules() {
        let text = format_startup(&Rules::default(), Duration::from_secs(300), MarkupMode::Plain);
        assert!(text.contains("every 5 min"));
        assert!(text.contains("• liquidity >= $10000"));
        assert!(text.contains("• LP locked or burned"));
    }
}
