use crate::types::ChapterData;
use crate::utils;

use chrono::{ DateTime, Utc };

// Derived publication state: the explicit flag wins over a future schedule,
// and an elapsed schedule counts as published even if the flag was never set.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PublishState {
    Draft,
    Scheduled,
    Live,
}
impl PublishState {
    pub fn resolve(is_published:bool, release_date:Option<DateTime<Utc>>, now:DateTime<Utc>) -> Self {
        if is_published || release_date.map(|d| d <= now).unwrap_or(false) {
            return Self::Live;
        }

        match release_date {
            Some(_) => Self::Scheduled,
            None => Self::Draft,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PublishOption {
    Now,
    Scheduled,
    Draft,
}
impl PublishOption {
    pub fn from_str(s:&str) -> Option<Self> {
        match s {
            "now" => Some(Self::Now),
            "schedule" => Some(Self::Scheduled),
            "draft" => Some(Self::Draft),
            _ => None,
        }
    }

    // The backend reads the publish flags as strings.
    pub fn flags(&self) -> (&'static str, &'static str) {
        match self {
            Self::Now => ("true", "false"),
            Self::Scheduled => ("false", "true"),
            Self::Draft => ("false", "false"),
        }
    }
}

#[derive(Debug)]
pub struct Chapter {
    pub id: String,
    pub title: String,
    pub chapter_number: Option<f64>,
    pub content_type: Option<String>,
    pub files_count: u64,
    pub is_published: bool,
    pub release_date: Option<DateTime<Utc>>,
}
impl Chapter {
    pub fn from_data(raw:ChapterData) -> Self {
        let files_count = raw.files_count
            .or(raw.files.as_ref().map(|f| f.len() as u64))
            .unwrap_or(0);

        Self {
            id: raw.id,
            title: raw.title,
            chapter_number: raw.chapter_number,
            content_type: raw.content_type,
            files_count,
            is_published: raw.is_published,
            release_date: raw.release_date,
        }
    }

    pub fn from_response(mut raw:Vec<ChapterData>) -> Vec<Self> {
        raw.drain(..).map(|r| Self::from_data(r)).collect::<Vec<Self>>()
    }

    pub fn state(&self, now:DateTime<Utc>) -> PublishState {
        PublishState::resolve(self.is_published, self.release_date, now)
    }

    pub fn get_number(&self) -> String {
        match self.chapter_number {
            Some(n) => format!("{}", n),
            None => "-".to_string(),
        }
    }

    // The flag overrides a future schedule, so a live chapter shows "Now"
    // rather than the date it was scheduled for.
    pub fn release_display(&self, now:DateTime<Utc>) -> String {
        if self.is_published {
            return "Now".to_string();
        }

        match self.release_date {
            Some(date) if date > now => utils::format_timestamp(&date),
            _ => "N/A".to_string(),
        }
    }

    pub fn print_row(&self, now:DateTime<Utc>) {
        let published = match self.state(now) {
            PublishState::Live => "Yes",
            _ => "No",
        };

        println!("{:<8} {:<30} {:<12} {:<6} {:<10} {:<20} {}",
            self.get_number(),
            self.title,
            self.content_type.as_deref().unwrap_or("-"),
            self.files_count,
            published,
            self.release_display(now),
            self.id);
    }

    pub fn print_list(chapters:&[Self], now:DateTime<Utc>) {
        println!("{:<8} {:<30} {:<12} {:<6} {:<10} {:<20} {}",
            "#", "Title", "Type", "Files", "Published", "Release Date", "ID");
        for chapter in chapters {
            chapter.print_row(now);
        }

        if chapters.is_empty() {
            println!("No chapters found");
        }
    }
}
