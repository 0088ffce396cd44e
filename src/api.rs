use crate::requester::{ Requester, RequesterError };
use crate::session::Session;
use crate::types::{
    AppConfigData, ChapterData, ChapterPayload, ExchangeRateData, LoginRequest,
    MangaData, RequestData, SuggestionData, UploadSignatureData,
};
use crate::upload::{ LocalFile, UploadError };

use reqwest::multipart::Form;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum APIError {
    #[error("error making request: {0}")]
    Requester(#[from] RequesterError),
    #[error("error preparing upload: {0}")]
    Upload(#[from] UploadError),
}

#[derive(Debug)]
pub struct MangaForm {
    pub title: String,
    pub description: String,
    pub genres: Vec<String>,
    pub cover: Option<LocalFile>,
}
impl MangaForm {
    fn into_form(self) -> Result<Form, APIError> {
        let mut form = Form::new()
            .text("title", self.title)
            .text("description", self.description)
            .text("genres", self.genres.join(","));

        if let Some(cover) = self.cover {
            form = form.part("coverImage", cover.to_part()?);
        }

        Ok(form)
    }
}

pub struct API {
    requester: Requester,
}
impl API {
    pub fn new(base_url:&str, session:Option<&Session>) -> Result<Self, APIError> {
        Ok(Self {
            requester: Requester::new(base_url, session.map(|s| s.token.clone()))?,
        })
    }

    pub async fn login(&self, username:&str, password:&str) -> Result<Session, APIError> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        Ok(self.requester.post_json("/manga/auth/login", &body).await?)
    }

    pub async fn get_mangas(&self, genre:Option<&str>) -> Result<Vec<MangaData>, APIError> {
        let path = match genre {
            Some(genre) => format!("/manga?genre={}", urlencoding::encode(genre)),
            None => "/manga".to_string(),
        };

        Ok(self.requester.get_json(&path).await?)
    }

    pub async fn get_genres(&self) -> Result<Vec<String>, APIError> {
        Ok(self.requester.get_json("/manga/genres").await?)
    }

    pub async fn get_manga(&self, id:&str) -> Result<MangaData, APIError> {
        Ok(self.requester.get_json(&format!("/manga/{}", id)).await?)
    }

    pub async fn get_chapters(&self, manga_id:&str) -> Result<Vec<ChapterData>, APIError> {
        Ok(self.requester.get_json(&format!("/manga/{}/chapters/all", manga_id)).await?)
    }

    pub async fn create_manga(&self, form:MangaForm) -> Result<(), APIError> {
        Ok(self.requester.post_multipart("/manga", form.into_form()?).await?)
    }

    pub async fn update_manga(&self, id:&str, form:MangaForm) -> Result<(), APIError> {
        Ok(self.requester.put_multipart(&format!("/manga/{}", id), form.into_form()?).await?)
    }

    // Cascading to chapters and their files is the backend's job; this is
    // the only request a deletion issues.
    pub async fn delete_manga(&self, id:&str) -> Result<(), APIError> {
        Ok(self.requester.delete(&format!("/manga/{}", id)).await?)
    }

    // Signatures are single-use: fetched fresh for every batch, never cached.
    pub async fn get_upload_signature(&self) -> Result<UploadSignatureData, APIError> {
        Ok(self.requester.get_json("/manga/upload-signature").await?)
    }

    pub async fn create_chapter(&self, manga_id:&str, payload:&ChapterPayload) -> Result<(), APIError> {
        Ok(self.requester.post_json_discard(&format!("/manga/{}/chapter", manga_id), payload).await?)
    }

    pub async fn update_chapter(&self, chapter_id:&str, payload:&ChapterPayload) -> Result<(), APIError> {
        Ok(self.requester.put_json(&format!("/manga/chapter/{}", chapter_id), payload).await?)
    }

    pub async fn delete_chapter(&self, chapter_id:&str) -> Result<(), APIError> {
        Ok(self.requester.delete(&format!("/manga/chapter/{}", chapter_id)).await?)
    }

    pub async fn get_suggestions(&self) -> Result<Vec<SuggestionData>, APIError> {
        Ok(self.requester.get_json("/manga/interactions/suggestions").await?)
    }

    pub async fn delete_suggestion(&self, id:&str) -> Result<(), APIError> {
        Ok(self.requester.delete(&format!("/manga/interactions/suggestions/{}", id)).await?)
    }

    pub async fn get_requests(&self) -> Result<Vec<RequestData>, APIError> {
        Ok(self.requester.get_json("/manga/interactions/requests").await?)
    }

    pub async fn delete_request(&self, id:&str) -> Result<(), APIError> {
        Ok(self.requester.delete(&format!("/manga/interactions/requests/{}", id)).await?)
    }

    pub async fn get_exchange_rates(&self) -> Result<Vec<ExchangeRateData>, APIError> {
        Ok(self.requester.get_json("/general/exchange-rates").await?)
    }

    pub async fn refresh_exchange_rates(&self) -> Result<(), APIError> {
        Ok(self.requester.post_empty("/general/exchange-rates/refresh").await?)
    }

    pub async fn get_app_config(&self) -> Result<AppConfigData, APIError> {
        Ok(self.requester.get_json("/config").await?)
    }

    pub async fn update_app_config(&self, config:&AppConfigData) -> Result<(), APIError> {
        Ok(self.requester.put_json("/config", config).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::io::{ AsyncReadExt, AsyncWriteExt };
    use tokio::net::{ TcpListener, TcpStream };

    use std::sync::{ Arc, Mutex };

    fn header_end(raw:&[u8]) -> Option<usize> {
        raw.windows(4).position(|w| w == b"\r\n\r\n")
    }

    fn content_length(headers:&str) -> usize {
        headers.lines()
            .find_map(|line| {
                let lower = line.to_lowercase();
                lower.strip_prefix("content-length:").map(|v| v.trim().to_string())
            })
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(0)
    }

    async fn read_request(socket:&mut TcpStream) -> String {
        let mut raw = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = match socket.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => n,
            };

            raw.extend_from_slice(&buf[..n]);
            if let Some(pos) = header_end(&raw) {
                let headers = String::from_utf8_lossy(&raw[..pos]).to_string();
                if raw.len() >= pos + 4 + content_length(&headers) {
                    break;
                }
            }
        }

        String::from_utf8_lossy(&raw).to_string()
    }

    // Minimal backend double: records every raw request and answers each
    // one with 200 and the given body.
    async fn spawn_backend(body:&'static str) -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let log = seen.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let request = read_request(&mut socket).await;
                log.lock().unwrap().push(request);

                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    body.len(), body);
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });

        (format!("http://{}", addr), seen)
    }

    fn session() -> Session {
        Session {
            id: "64ff00aa12".to_string(),
            username: "admin".to_string(),
            token: "session-token".to_string(),
        }
    }

    #[tokio::test]
    async fn create_chapter_tolerates_an_empty_response_body() {
        let (base, _seen) = spawn_backend("").await;
        let api = API::new(&base, Some(&session())).unwrap();

        let payload = ChapterPayload {
            title: "Chapter 1".to_string(),
            chapter_number: Some(1.0),
            page_count: 0,
            files: None,
            is_published: "false".to_string(),
            schedule_for_later: "false".to_string(),
        };

        api.create_chapter("m1", &payload).await.unwrap();
    }

    #[tokio::test]
    async fn deleting_a_manga_issues_exactly_one_request() {
        let (base, seen) = spawn_backend("").await;
        let api = API::new(&base, Some(&session())).unwrap();

        api.delete_manga("m1").await.unwrap();

        // Cascading to chapters and files is backend-owned: one DELETE for
        // the manga, nothing per chapter.
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].starts_with("DELETE /manga/m1 "));
    }

    #[tokio::test]
    async fn bearer_token_is_attached_from_the_session() {
        let (base, seen) = spawn_backend("[]").await;
        let api = API::new(&base, Some(&session())).unwrap();

        let genres = api.get_genres().await.unwrap();
        assert!(genres.is_empty());

        let seen = seen.lock().unwrap();
        assert!(seen[0].starts_with("GET /manga/genres "));
        assert!(seen[0].to_lowercase().contains("authorization: bearer session-token"));
    }
}
