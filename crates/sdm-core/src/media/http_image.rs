//! Cover-art retrieval over HTTP with chunked body reads.

use async_trait::async_trait;

use super::{ImageSource, ImageStream, MediaError};

pub struct HttpImageSource {
    client: reqwest::Client,
}

impl HttpImageSource {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpImageSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn open(&self, url: &str) -> Result<Box<dyn ImageStream>, MediaError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MediaError::Status(status.as_u16()));
        }
        Ok(Box::new(HttpImageStream { response }))
    }
}

struct HttpImageStream {
    response: reqwest::Response,
}

#[async_trait]
impl ImageStream for HttpImageStream {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, MediaError> {
        Ok(self.response.chunk().await?.map(|bytes| bytes.to_vec()))
    }
}
