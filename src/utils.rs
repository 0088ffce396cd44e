use chrono::{ DateTime, Utc };

use std::io::{ self, BufRead, Write };

pub fn format_timestamp(timestamp:&DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M UTC").to_string()
}

// Destructive actions ask first; anything other than y/yes aborts.
pub fn confirm(prompt:&str) -> bool {
    print!("{} [y/N] ", prompt);
    let _ = io::stdout().flush();

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }

    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_format_as_utc() {
        let timestamp = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert_eq!(format_timestamp(&timestamp), "2023-11-14 22:13 UTC");
    }
}
