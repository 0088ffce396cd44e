use crate::types::ApiMessage;

use regex::Regex;
use reqwest::{ self, Client, Method, RequestBuilder, Response, StatusCode };
use reqwest::multipart::Form;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RequesterError {
    #[error("No host found in base url")]
    NoHost,
    #[error("reqwest error {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("not authorised; run `manga-admin login` to start a session")]
    Unauthorized,
    #[error("Error from the API: {0}")]
    APIError(String),
    #[error("API returned unexpected response: {0}")]
    UnexpectedResponse(String),
}

fn get_host(url:&str) -> Option<String> {
    lazy_static! {
        static ref HOST_RE:Regex = Regex::new(r"https?://([^/]+)/?.*").unwrap();
    }

    let m = HOST_RE.captures(url)?.get(1)?.as_str().to_string();
    Some(m)
}

// Bearer-authenticated client for the backend REST API. The token comes from
// the persisted session; requests without one only succeed on public routes.
pub struct Requester {
    client: Client,
    base_url: String,
    host: String,
    token: Option<String>,
}
impl Requester {
    pub fn new(base_url:&str, token:Option<String>) -> Result<Self, RequesterError> {
        Ok(Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            host: get_host(base_url).ok_or(RequesterError::NoHost)?,
            token,
        })
    }

    fn build(&self, method:Method, path:&str) -> RequestBuilder {
        let mut req = self.client.request(method, format!("{}{}", self.base_url, path))
            .header("Host", &self.host);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        req
    }

    async fn send(&self, req:RequestBuilder) -> Result<Response, RequesterError> {
        let res = req.send().await?;
        if res.status() == StatusCode::UNAUTHORIZED {
            return Err(RequesterError::Unauthorized);
        }

        if !res.status().is_success() {
            let body = res.text().await?;
            // Validation failures carry a message field; surface it verbatim.
            let msg = serde_json::from_str::<ApiMessage>(&body)
                .map(|m| m.message)
                .unwrap_or(body);
            return Err(RequesterError::APIError(msg));
        }

        Ok(res)
    }

    async fn decode<T:DeserializeOwned>(&self, res:Response) -> Result<T, RequesterError> {
        let body = res.text().await?;
        serde_json::from_str(&body)
            .map_err(|_| RequesterError::UnexpectedResponse(body))
    }

    pub async fn get_json<T:DeserializeOwned>(&self, path:&str) -> Result<T, RequesterError> {
        let res = self.send(self.build(Method::GET, path)).await?;
        self.decode(res).await
    }

    pub async fn post_json<B:Serialize, T:DeserializeOwned>(&self, path:&str, body:&B) -> Result<T, RequesterError> {
        let res = self.send(self.build(Method::POST, path).json(body)).await?;
        self.decode(res).await
    }

    // For mutations whose response body carries nothing the client needs;
    // a successful status is enough, even with an empty body.
    pub async fn post_json_discard<B:Serialize>(&self, path:&str, body:&B) -> Result<(), RequesterError> {
        let _ = self.send(self.build(Method::POST, path).json(body)).await?;
        Ok(())
    }

    pub async fn put_json<B:Serialize>(&self, path:&str, body:&B) -> Result<(), RequesterError> {
        let _ = self.send(self.build(Method::PUT, path).json(body)).await?;
        Ok(())
    }

    pub async fn post_multipart(&self, path:&str, form:Form) -> Result<(), RequesterError> {
        let _ = self.send(self.build(Method::POST, path).multipart(form)).await?;
        Ok(())
    }

    pub async fn put_multipart(&self, path:&str, form:Form) -> Result<(), RequesterError> {
        let _ = self.send(self.build(Method::PUT, path).multipart(form)).await?;
        Ok(())
    }

    pub async fn post_empty(&self, path:&str) -> Result<(), RequesterError> {
        let _ = self.send(self.build(Method::POST, path)).await?;
        Ok(())
    }

    pub async fn delete(&self, path:&str) -> Result<(), RequesterError> {
        let _ = self.send(self.build(Method::DELETE, path)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_is_parsed_from_base_url() {
        assert_eq!(get_host("https://app-backend-alpha.vercel.app/p/manga"),
            Some("app-backend-alpha.vercel.app".to_string()));
        assert_eq!(get_host("http://localhost:5000/p/manga"),
            Some("localhost:5000".to_string()));
        assert_eq!(get_host("not a url"), None);
    }

    #[test]
    fn base_url_trailing_slash_is_normalised() {
        let requester = Requester::new("http://localhost:5000/p/manga/", None).unwrap();
        assert_eq!(requester.base_url, "http://localhost:5000/p/manga");
    }
}
