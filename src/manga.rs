use crate::types::MangaData;

#[derive(Debug)]
pub struct Manga {
    pub id: String,
    pub title: String,
    pub description: String,
    pub cover_image: Option<String>,
    pub genres: Vec<String>,
    pub badge: Option<String>,
    pub rating: Option<f64>,
    pub reviews_count: Option<u64>,
}
impl Manga {
    pub fn from_data(raw:MangaData) -> Self {
        Self {
            id: raw.id,
            title: raw.title,
            description: raw.description,
            cover_image: raw.cover_image,
            genres: raw.genres,
            badge: raw.badge,
            rating: raw.rating,
            reviews_count: raw.reviews_count,
        }
    }

    pub fn from_response(mut raw:Vec<MangaData>) -> Vec<Self> {
        raw.drain(..).map(|r| Self::from_data(r)).collect::<Vec<Self>>()
    }

    pub fn print_row(&self) {
        println!("{:<26} {:<30} {}", self.id, self.title, self.genres.join(", "));
    }

    pub fn print_list(mangas:&[Self]) {
        println!("{:<26} {:<30} {}", "ID", "Title", "Genres");
        for manga in mangas {
            manga.print_row();
        }

        if mangas.is_empty() {
            println!("No mangas found");
        }
    }

    pub fn print(&self) {
        println!("{}", self.title);
        if let Some(badge) = &self.badge {
            println!("Badge: {}", badge);
        }
        if !self.genres.is_empty() {
            println!("Genres: {}", self.genres.join(", "));
        }
        if let (Some(rating), Some(reviews)) = (self.rating, self.reviews_count) {
            println!("Rating: {:.1} ({} reviews)", rating, reviews);
        }
        if let Some(cover) = &self.cover_image {
            println!("Cover: {}", cover);
        }
        if !self.description.is_empty() {
            println!("\n{}", self.description);
        }
    }
}
