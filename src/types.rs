use chrono::{ DateTime, Utc };
use serde::{ Deserialize, Serialize };

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MangaData {
    #[serde(rename="_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename="coverImage")]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub badge: Option<String>,
    pub rating: Option<f64>,
    #[serde(rename="reviewsCount")]
    pub reviews_count: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ChapterData {
    #[serde(rename="_id")]
    pub id: String,
    pub title: String,
    #[serde(rename="chapterNumber")]
    pub chapter_number: Option<f64>,
    #[serde(rename="contentType")]
    pub content_type: Option<String>,
    // The list endpoint omits the heavy files[] and sends a count instead.
    pub files: Option<Vec<ChapterFileData>>,
    #[serde(rename="filesCount")]
    pub files_count: Option<u64>,
    #[serde(rename="isPublished", default)]
    pub is_published: bool,
    #[serde(rename="releaseDate")]
    pub release_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChapterFileData {
    pub path: String,
    #[serde(rename="publicId")]
    pub public_id: String,
    pub filename: String,
    #[serde(rename="originalName")]
    pub original_name: String,
    pub mimetype: String,
    pub size: u64,
    pub pages: Option<u32>,
    pub index: usize,
}

#[derive(Debug, Serialize)]
pub struct ChapterPayload {
    pub title: String,
    #[serde(rename="chapterNumber", skip_serializing_if="Option::is_none")]
    pub chapter_number: Option<f64>,
    #[serde(rename="pageCount")]
    pub page_count: u32,
    #[serde(skip_serializing_if="Option::is_none")]
    pub files: Option<Vec<ChapterFileData>>,
    // The backend reads these as the strings "true"/"false".
    #[serde(rename="isPublished")]
    pub is_published: String,
    #[serde(rename="scheduleForLater")]
    pub schedule_for_later: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadSignatureData {
    #[serde(rename="apiKey")]
    pub api_key: String,
    pub timestamp: u64,
    pub signature: String,
    #[serde(rename="cloudName")]
    pub cloud_name: String,
}

#[derive(Debug, Deserialize)]
pub struct MediaUploadData {
    pub secure_url: String,
    pub public_id: String,
    pub pages: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionImageData {
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionData {
    #[serde(rename="_id")]
    pub id: String,
    pub title: String,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub images: Option<Vec<SuggestionImageData>>,
}

#[derive(Debug, Deserialize)]
pub struct RequestData {
    #[serde(rename="_id")]
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExchangeRateData {
    #[serde(rename="_id")]
    pub id: String,
    pub currency: String,
    pub rate: f64,
    #[serde(rename="lastUpdated")]
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AppConfigData {
    #[serde(rename="mangaAppVersion", default)]
    pub manga_app_version: String,
    #[serde(rename="exchangeRatesAppVersion", default)]
    pub exchange_rates_app_version: String,
    #[serde(rename="letscodeCppVersion", default)]
    pub letscode_cpp_version: String,
    #[serde(rename="letscodePythonBasicsVersion", default)]
    pub letscode_python_basics_version: String,
    #[serde(rename="letscodePythonBasics2Version", default)]
    pub letscode_python_basics_2_version: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiMessage {
    pub message: String,
}
