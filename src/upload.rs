use crate::types::{ ChapterFileData, MediaUploadData, UploadSignatureData };

use async_trait::async_trait;
use futures_util::future::try_join_all;
use reqwest::{ self, Client };
use reqwest::multipart::{ Form, Part };
use thiserror::Error;

use std::cell::Cell;
use std::fs;
use std::path::{ Path, PathBuf };

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("error reading local file: {0}")]
    IO(#[from] std::io::Error),
    #[error("error sending file to media host: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("file path has no filename")]
    NoFilename,
    #[error("media host rejected the upload: {0}")]
    HostError(String),
}

#[derive(Debug, Clone)]
pub struct LocalFile {
    pub path: PathBuf,
    pub filename: String,
    pub mimetype: String,
    pub size: u64,
}
impl LocalFile {
    pub fn new(path:&Path) -> Result<Self, UploadError> {
        let filename = path.file_name()
            .and_then(|n| n.to_str())
            .ok_or(UploadError::NoFilename)?
            .to_string();

        Ok(Self {
            path: path.to_path_buf(),
            filename,
            mimetype: mime_guess::from_path(path).first_or_octet_stream().essence_str().to_string(),
            size: fs::metadata(path)?.len(),
        })
    }

    pub fn to_part(&self) -> Result<Part, UploadError> {
        let body = fs::read(&self.path)?;
        let part = Part::bytes(body)
            .file_name(self.filename.clone())
            .mime_str(&self.mimetype)?;

        Ok(part)
    }
}

#[async_trait]
pub trait UploadTransport {
    async fn upload(&self, signature:&UploadSignatureData, file:&LocalFile) -> Result<MediaUploadData, UploadError>;
}

// Direct-to-host upload signed with the backend-issued credential.
pub struct MediaHost {
    client: Client,
}
impl MediaHost {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}
#[async_trait]
impl UploadTransport for MediaHost {
    async fn upload(&self, signature:&UploadSignatureData, file:&LocalFile) -> Result<MediaUploadData, UploadError> {
        let form = Form::new()
            .part("file", file.to_part()?)
            .text("api_key", signature.api_key.clone())
            .text("timestamp", signature.timestamp.to_string())
            .text("signature", signature.signature.clone());

        let url = format!("https://api.cloudinary.com/v1_1/{}/auto/upload", signature.cloud_name);
        let res = self.client.post(url)
            .multipart(form)
            .send()
            .await?;

        if !res.status().is_success() {
            let msg = res.text().await?;
            return Err(UploadError::HostError(msg));
        }

        Ok(res.json::<MediaUploadData>().await?)
    }
}

// Uploads every file in the batch concurrently with one shared signature.
// Progress is reported after each individual completion as the rounded
// percentage of finished transfers; any single failure fails the batch
// before the caller submits anything to the backend. The returned
// descriptors are in submission order regardless of completion order.
pub async fn upload_batch<T:UploadTransport>(
    transport:&T,
    signature:&UploadSignatureData,
    files:&[LocalFile],
    progress:&dyn Fn(u8),
) -> Result<Vec<ChapterFileData>, UploadError> {
    let total = files.len();
    // Transfers interleave on one task, so a plain Cell is enough bookkeeping.
    let completed = Cell::new(0usize);

    let uploads = files.iter().enumerate().map(|(index, file)| {
        let completed = &completed;
        async move {
            let res = transport.upload(signature, file).await?;
            completed.set(completed.get() + 1);
            let percent = ((completed.get() as f64 / total as f64) * 100.0).round() as u8;
            progress(percent);

            Ok::<_, UploadError>(ChapterFileData {
                path: res.secure_url,
                public_id: res.public_id,
                filename: file.filename.clone(),
                original_name: file.filename.clone(),
                mimetype: file.mimetype.clone(),
                size: file.size,
                pages: res.pages,
                index,
            })
        }
    });

    let mut descriptors = try_join_all(uploads).await?;
    // Completion order is not submission order; the index is authoritative.
    descriptors.sort_by_key(|d| d.index);
    Ok(descriptors)
}

// A paginated set reports its page count from whichever file carries one.
pub fn batch_page_count(descriptors:&[ChapterFileData]) -> u32 {
    descriptors.iter()
        .filter_map(|d| d.pages)
        .find(|pages| *pages > 0)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;
    use std::time::Duration;

    // Transport that completes after a per-file delay, or fails outright,
    // keyed on the local filename.
    struct ScriptedTransport {
        delays: Vec<(&'static str, u64)>,
        fail_on: Option<&'static str>,
    }
    #[async_trait]
    impl UploadTransport for ScriptedTransport {
        async fn upload(&self, _signature:&UploadSignatureData, file:&LocalFile) -> Result<MediaUploadData, UploadError> {
            if self.fail_on == Some(file.filename.as_str()) {
                return Err(UploadError::HostError("Invalid Signature".to_string()));
            }

            let delay = self.delays.iter()
                .find(|(name, _)| *name == file.filename)
                .map(|(_, ms)| *ms)
                .unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(delay)).await;

            Ok(MediaUploadData {
                secure_url: format!("https://media.test/{}", file.filename),
                public_id: format!("chapters/{}", file.filename),
                pages: None,
            })
        }
    }

    fn signature() -> UploadSignatureData {
        UploadSignatureData {
            api_key: "key".to_string(),
            timestamp: 1700000000,
            signature: "sig".to_string(),
            cloud_name: "test-cloud".to_string(),
        }
    }

    fn local_file(name:&str) -> LocalFile {
        LocalFile {
            path: PathBuf::from(name),
            filename: name.to_string(),
            mimetype: "image/png".to_string(),
            size: 1024,
        }
    }

    #[tokio::test]
    async fn progress_is_monotonic_and_ends_at_100() {
        let transport = ScriptedTransport {
            delays: vec![("a.png", 30), ("b.png", 10), ("c.png", 20)],
            fail_on: None,
        };
        let files = vec![local_file("a.png"), local_file("b.png"), local_file("c.png")];

        let reported = RefCell::new(Vec::new());
        let progress = |percent:u8| reported.borrow_mut().push(percent);

        upload_batch(&transport, &signature(), &files, &progress).await.unwrap();

        let reported = reported.into_inner();
        assert_eq!(reported.len(), 3);
        assert!(reported.windows(2).all(|w| w[0] <= w[1]));
        assert!(reported[..2].iter().all(|p| *p < 100));
        assert_eq!(*reported.last().unwrap(), 100);
    }

    #[tokio::test]
    async fn descriptors_keep_submission_order() {
        // c completes first, a last; the output must still be a, b, c.
        let transport = ScriptedTransport {
            delays: vec![("a.png", 50), ("b.png", 25), ("c.png", 0)],
            fail_on: None,
        };
        let files = vec![local_file("a.png"), local_file("b.png"), local_file("c.png")];

        let descriptors = upload_batch(&transport, &signature(), &files, &|_| {}).await.unwrap();

        let names = descriptors.iter().map(|d| d.filename.as_str()).collect::<Vec<&str>>();
        assert_eq!(names, vec!["a.png", "b.png", "c.png"]);
        let indexes = descriptors.iter().map(|d| d.index).collect::<Vec<usize>>();
        assert_eq!(indexes, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn single_failure_fails_the_whole_batch() {
        let transport = ScriptedTransport {
            delays: vec![("a.png", 0), ("c.png", 10)],
            fail_on: Some("b.png"),
        };
        let files = vec![local_file("a.png"), local_file("b.png"), local_file("c.png")];

        let result = upload_batch(&transport, &signature(), &files, &|_| {}).await;

        // No descriptor list means the caller never submits the chapter.
        assert!(matches!(result, Err(UploadError::HostError(_))));
    }

    #[test]
    fn page_count_comes_from_the_first_counted_file() {
        let mut descriptors = vec![
            ChapterFileData {
                path: "https://media.test/doc.pdf".to_string(),
                public_id: "chapters/doc.pdf".to_string(),
                filename: "doc.pdf".to_string(),
                original_name: "doc.pdf".to_string(),
                mimetype: "application/pdf".to_string(),
                size: 2048,
                pages: None,
                index: 0,
            },
        ];
        assert_eq!(batch_page_count(&descriptors), 0);

        descriptors[0].pages = Some(42);
        assert_eq!(batch_page_count(&descriptors), 42);
    }
}
